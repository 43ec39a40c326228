//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`WOOD_SECTION__KEY`)

use figment::{Figment, providers::{Format, Toml, Env}};
use serde::{Serialize, Deserialize};
use std::path::Path;

use woodcut_core::{
    GripConfig, ImpactConfig, InteractionConfig, RespawnConfig, SessionConfig, SliceConfig, Vec3,
};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Window configuration
    #[serde(default)]
    pub window: WindowConfig,
    /// Hand engagement and constraint tuning
    #[serde(default)]
    pub grip: GripConfig,
    /// Hand rest poses and steering
    #[serde(default)]
    pub hands: HandsConfig,
    /// Walking, jumping and crouching
    #[serde(default)]
    pub player: PlayerConfig,
    /// View probe tuning
    #[serde(default)]
    pub interaction: InteractionConfig,
    /// Chop feedback tuning
    #[serde(default)]
    pub impact: ImpactConfig,
    /// Wood slicing thresholds
    #[serde(default)]
    pub slicing: SliceConfig,
    /// Lost-axe recovery
    #[serde(default)]
    pub respawn: RespawnConfig,
    /// Aim mode and crosshair
    #[serde(default)]
    pub presentation: PresentationConfig,
    /// Audio settings persistence
    #[serde(default)]
    pub audio: AudioConfig,
    /// Scene to load
    #[serde(default)]
    pub scene: SceneConfig,
    /// Debug configuration
    #[serde(default)]
    pub debug: DebugConfig,
}

impl AppConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`WOOD_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // WOOD_SLICING__VELOCITY_THRESHOLD=7 -> slicing.velocity_threshold = 7
        figment = figment.merge(Env::prefixed("WOOD_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }

    /// Tuning for a chop session
    pub fn to_session_config(&self) -> SessionConfig {
        SessionConfig {
            grip: self.grip.clone(),
            interaction: self.interaction.clone(),
            impact: self.impact.clone(),
            slicing: self.slicing.clone(),
            respawn: self.respawn.clone(),
            left_hand_rest: self.hands.left_rest,
            right_hand_rest: self.hands.right_rest,
            alert_duration: self.presentation.alert_duration,
            crosshair_sensitivity: self.presentation.crosshair_sensitivity,
        }
    }
}

/// Window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Window width in pixels
    pub width: u32,
    /// Window height in pixels
    pub height: u32,
    /// Start in fullscreen mode
    pub fullscreen: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Woodcutter".to_string(),
            width: 1280,
            height: 720,
            fullscreen: false,
        }
    }
}

/// Hand rest poses and steering
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HandsConfig {
    /// Left hand rest pose relative to the player
    pub left_rest: Vec3,
    /// Right hand rest pose relative to the player
    pub right_rest: Vec3,
    /// Eye height above the player position
    pub eye_height: f32,
    /// Distance in front of the eye the hands are steered to
    pub reach: f32,
    /// Vertical hand travel per unit of crosshair offset
    pub lift: f32,
}

impl Default for HandsConfig {
    fn default() -> Self {
        let defaults = SessionConfig::default();
        Self {
            left_rest: defaults.left_hand_rest,
            right_rest: defaults.right_hand_rest,
            eye_height: 1.6,
            reach: 0.7,
            lift: 2.0,
        }
    }
}

/// Walking, jumping and crouching
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Walking speed in m/s
    pub move_speed: f32,
    /// Walking speed while crouched
    pub crouch_speed: f32,
    /// Jump apex height in meters
    pub jump_height: f32,
    /// Gravity acting on the player (negative = down)
    pub gravity: f32,
    /// Eye height above the feet while crouched
    pub crouch_eye_height: f32,
    /// Rate the eye moves between standing and crouched height
    pub crouch_transition_speed: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            crouch_speed: 2.5,
            jump_height: 2.0,
            gravity: -9.81,
            crouch_eye_height: 0.6,
            crouch_transition_speed: 5.0,
        }
    }
}

/// Aim mode and crosshair
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationConfig {
    /// Seconds the aim-mode alert stays on screen
    pub alert_duration: f32,
    /// Crosshair movement per unit of mouse delta
    pub crosshair_sensitivity: f32,
    /// Raw mouse delta to crosshair units
    pub mouse_scale: f32,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            alert_duration: 2.0,
            crosshair_sensitivity: 2.0,
            mouse_scale: 0.001,
        }
    }
}

/// Audio settings persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Where volume settings are stored
    pub settings_path: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            settings_path: "config/settings.toml".to_string(),
        }
    }
}

/// Scene configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Path to the woodyard scene
    pub path: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            path: "scenes/woodyard.ron".to_string(),
        }
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
    /// Fixed seed for chop pitch jitter, random when unset
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            seed: None,
        }
    }
}

/// Configuration error
#[derive(Debug)]
pub struct ConfigError {
    message: String,
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError {
            message: e.to_string(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}
