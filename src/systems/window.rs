//! Window management system
//!
//! Handles window creation, fullscreen toggle, and title updates. Cursor grab
//! and visibility follow the presentation controller's aim mode.

use std::sync::Arc;
use winit::{
    event_loop::ActiveEventLoop,
    window::{CursorGrabMode, Fullscreen, Window},
};
use woodcut_core::{AimMode, CursorIcon, PresentationController};

use crate::config::WindowConfig;

/// What the title bar shows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TitleStatus {
    pub wood_collected: Option<usize>,
    pub cursor: CursorIcon,
    pub alert: Option<&'static str>,
    pub paused: bool,
}

impl TitleStatus {
    pub fn from_presentation(presentation: &PresentationController, wood_collected: Option<usize>, paused: bool) -> Self {
        Self {
            wood_collected,
            cursor: presentation.cursor_icon(),
            alert: presentation.alert_text(),
            paused,
        }
    }

    /// Title text for a base title
    pub fn format(&self, base: &str) -> String {
        let mut title = base.to_string();
        if let Some(count) = self.wood_collected {
            title.push_str(&format!(" - Wood: {}", count));
        }
        title.push_str(&format!(" [{:?}]", self.cursor));
        if self.paused {
            title.push_str(" PAUSED");
        }
        if let Some(alert) = self.alert {
            title.push_str(&format!(" - {}", alert));
        }
        title
    }
}

/// Manages the application window and cursor state
pub struct WindowSystem {
    window: Arc<Window>,
    applied_mode: Option<AimMode>,
    base_title: String,
    last_title: String,
}

impl WindowSystem {
    /// Create window from config
    pub fn create(event_loop: &ActiveEventLoop, config: &WindowConfig) -> Result<Self, WindowError> {
        let mut attrs = Window::default_attributes()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));

        if config.fullscreen {
            attrs = attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .map_err(|e| WindowError::CreationFailed(e.to_string()))?,
        );

        Ok(Self {
            window,
            applied_mode: None,
            base_title: config.title.clone(),
            last_title: config.title.clone(),
        })
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    /// Push cursor grab and visibility when the aim mode changed
    pub fn apply_presentation(&mut self, presentation: &PresentationController) {
        let mode = presentation.aim_mode();
        if self.applied_mode == Some(mode) {
            return;
        }

        if presentation.cursor_locked() {
            let grab_result = self
                .window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Confined));
            if grab_result.is_err() {
                log::warn!("Failed to lock cursor");
            }
        } else {
            let _ = self.window.set_cursor_grab(CursorGrabMode::None);
        }
        self.window.set_cursor_visible(presentation.cursor_visible());
        self.applied_mode = Some(mode);
    }

    /// Toggle fullscreen mode
    pub fn toggle_fullscreen(&self) {
        let new_fullscreen = if self.window.fullscreen().is_some() {
            None
        } else {
            Some(Fullscreen::Borderless(None))
        };
        self.window.set_fullscreen(new_fullscreen);
    }

    /// Update window title; skipped when unchanged
    pub fn update_title(&mut self, status: &TitleStatus) {
        let title = status.format(&self.base_title);
        if title != self.last_title {
            self.window.set_title(&title);
            self.last_title = title;
        }
    }

    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }
}

#[derive(Debug)]
pub enum WindowError {
    CreationFailed(String),
}

impl std::fmt::Display for WindowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindowError::CreationFailed(msg) => write!(f, "Window creation failed: {}", msg),
        }
    }
}

impl std::error::Error for WindowError {}

#[cfg(test)]
mod tests {
    use super::*;
    use woodcut_core::{CursorPresenter, Hand};

    #[test]
    fn test_title_with_wood_count() {
        let presentation = PresentationController::default();
        let status = TitleStatus::from_presentation(&presentation, Some(3), false);
        assert_eq!(status.format("Woodcutter"), "Woodcutter - Wood: 3 [Default]");
    }

    #[test]
    fn test_title_shows_alert_and_pause() {
        let mut presentation = PresentationController::default();
        presentation.toggle_aim_mode();
        presentation.set_hand_attached(Hand::Left, true);
        let title = TitleStatus::from_presentation(&presentation, None, true).format("W");
        assert_eq!(title, "W [LeftHand] PAUSED - Screen Space Mouse Active");
    }
}
