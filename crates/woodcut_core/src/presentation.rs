//! Cursor and aim-mode presentation state
//!
//! The gameplay core never touches cursor or input-mode state directly. It
//! reports through [`CursorPresenter`]; [`PresentationController`] is the one
//! owner of aim mode, cursor visibility, the mode alert and the crosshair.

use crate::grip::Hand;
use crate::timer::Countdown;

/// Notifications the core sends to whatever draws the cursor
pub trait CursorPresenter {
    fn set_hand_attached(&mut self, hand: Hand, attached: bool);
    fn set_looking_at_interactable(&mut self, looking: bool);
}

/// How the mouse drives aiming
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AimMode {
    /// Locked, hidden cursor; the mouse moves a crosshair and turns the view
    #[default]
    Crosshair,
    /// Free, visible cursor
    ScreenSpace,
}

impl AimMode {
    pub fn alert_text(self) -> &'static str {
        match self {
            AimMode::Crosshair => "Crosshair Mouse Active",
            AimMode::ScreenSpace => "Screen Space Mouse Active",
        }
    }
}

/// Which cursor image to show
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorIcon {
    Default,
    LeftHand,
    RightHand,
    BothHands,
    Interact,
}

/// Crosshair offset bound in each direction
pub const CROSSHAIR_LIMIT: f32 = 0.5;

/// Owner of all cursor/aim presentation state
#[derive(Clone, Debug)]
pub struct PresentationController {
    aim_mode: AimMode,
    left_attached: bool,
    right_attached: bool,
    looking_at_interactable: bool,
    alert: Countdown,
    alert_duration: f32,
    crosshair: [f32; 2],
    crosshair_sensitivity: f32,
}

impl Default for PresentationController {
    fn default() -> Self {
        Self::new(2.0, 2.0)
    }
}

impl PresentationController {
    pub fn new(alert_duration: f32, crosshair_sensitivity: f32) -> Self {
        Self {
            aim_mode: AimMode::Crosshair,
            left_attached: false,
            right_attached: false,
            looking_at_interactable: false,
            alert: Countdown::default(),
            alert_duration,
            crosshair: [0.0, 0.0],
            crosshair_sensitivity,
        }
    }

    /// Switch between crosshair and screen-space aiming and show the alert
    pub fn toggle_aim_mode(&mut self) -> AimMode {
        self.aim_mode = match self.aim_mode {
            AimMode::Crosshair => AimMode::ScreenSpace,
            AimMode::ScreenSpace => AimMode::Crosshair,
        };
        self.alert = Countdown::new(self.alert_duration);
        log::info!("{}", self.aim_mode.alert_text());
        self.aim_mode
    }

    #[inline]
    pub fn aim_mode(&self) -> AimMode {
        self.aim_mode
    }

    /// The OS cursor is shown only in screen-space mode
    pub fn cursor_visible(&self) -> bool {
        self.aim_mode == AimMode::ScreenSpace
    }

    /// The OS cursor is locked only in crosshair mode
    pub fn cursor_locked(&self) -> bool {
        self.aim_mode == AimMode::Crosshair
    }

    /// The crosshair is drawn only in crosshair mode
    pub fn crosshair_visible(&self) -> bool {
        self.aim_mode == AimMode::Crosshair
    }

    /// Text of the mode alert while it is on screen
    pub fn alert_text(&self) -> Option<&'static str> {
        self.alert.is_running().then(|| self.aim_mode.alert_text())
    }

    /// Advance the alert timer (real time)
    pub fn update(&mut self, real_dt: f32) {
        self.alert.tick(real_dt);
    }

    /// Move the crosshair by a mouse delta; ignored in screen-space mode
    ///
    /// Returns the view rotation delta (yaw, pitch) the camera should apply.
    pub fn move_crosshair(&mut self, dx: f32, dy: f32) -> Option<(f32, f32)> {
        if self.aim_mode != AimMode::Crosshair {
            return None;
        }
        let dx = dx * self.crosshair_sensitivity;
        let dy = dy * self.crosshair_sensitivity;
        self.crosshair[0] = (self.crosshair[0] + dx).clamp(-CROSSHAIR_LIMIT, CROSSHAIR_LIMIT);
        self.crosshair[1] = (self.crosshair[1] + dy).clamp(-CROSSHAIR_LIMIT, CROSSHAIR_LIMIT);
        Some((dx, -dy))
    }

    #[inline]
    pub fn crosshair(&self) -> [f32; 2] {
        self.crosshair
    }

    /// Cursor image for the current state
    pub fn cursor_icon(&self) -> CursorIcon {
        if self.looking_at_interactable {
            CursorIcon::Interact
        } else if self.left_attached && self.right_attached {
            CursorIcon::BothHands
        } else if self.left_attached {
            CursorIcon::LeftHand
        } else if self.right_attached {
            CursorIcon::RightHand
        } else {
            CursorIcon::Default
        }
    }

    pub fn hand_attached(&self, hand: Hand) -> bool {
        match hand {
            Hand::Left => self.left_attached,
            Hand::Right => self.right_attached,
        }
    }

    pub fn looking_at_interactable(&self) -> bool {
        self.looking_at_interactable
    }
}

impl CursorPresenter for PresentationController {
    fn set_hand_attached(&mut self, hand: Hand, attached: bool) {
        match hand {
            Hand::Left => self.left_attached = attached,
            Hand::Right => self.right_attached = attached,
        }
    }

    fn set_looking_at_interactable(&mut self, looking: bool) {
        self.looking_at_interactable = looking;
    }
}
