//! Audio output seam and persisted volume settings

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Mixer channel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AudioChannel {
    Master,
    Music,
    Sfx,
    Dialogue,
}

impl AudioChannel {
    pub const ALL: [AudioChannel; 4] = [
        AudioChannel::Master,
        AudioChannel::Music,
        AudioChannel::Sfx,
        AudioChannel::Dialogue,
    ];

    /// Key under which the channel volume is persisted
    pub fn settings_key(self) -> &'static str {
        match self {
            AudioChannel::Master => "Volume",
            AudioChannel::Music => "MusicVolume",
            AudioChannel::Sfx => "SFXVolume",
            AudioChannel::Dialogue => "DialogueVolume",
        }
    }
}

/// Whatever actually makes sound
pub trait AudioSink {
    /// Play the chop sound at a pitch multiplier
    fn play_chop(&mut self, pitch: f32);
    /// Set a channel volume in [0, 1]
    fn set_volume(&mut self, channel: AudioChannel, volume: f32);
}

/// Sink that drops everything
#[derive(Clone, Copy, Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play_chop(&mut self, _pitch: f32) {}
    fn set_volume(&mut self, _channel: AudioChannel, _volume: f32) {}
}

/// Error reading or writing persisted settings
#[derive(Debug)]
pub enum SettingsError {
    Io(io::Error),
    Parse(toml::de::Error),
    Serialize(toml::ser::Error),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "IO error: {}", e),
            SettingsError::Parse(e) => write!(f, "Settings parse error: {}", e),
            SettingsError::Serialize(e) => write!(f, "Settings serialize error: {}", e),
        }
    }
}

impl std::error::Error for SettingsError {}

impl From<io::Error> for SettingsError {
    fn from(e: io::Error) -> Self {
        SettingsError::Io(e)
    }
}

impl From<toml::de::Error> for SettingsError {
    fn from(e: toml::de::Error) -> Self {
        SettingsError::Parse(e)
    }
}

impl From<toml::ser::Error> for SettingsError {
    fn from(e: toml::ser::Error) -> Self {
        SettingsError::Serialize(e)
    }
}

/// Key/value float persistence
pub trait SettingsStore {
    fn get_f32(&self, key: &str) -> Option<f32>;
    fn set_f32(&mut self, key: &str, value: f32);
    /// Flush to durable storage
    fn save(&mut self) -> Result<(), SettingsError>;
}

/// Settings kept in memory only
#[derive(Clone, Debug, Default)]
pub struct MemorySettingsStore {
    values: BTreeMap<String, f32>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get_f32(&self, key: &str) -> Option<f32> {
        self.values.get(key).copied()
    }

    fn set_f32(&mut self, key: &str, value: f32) {
        self.values.insert(key.to_string(), value);
    }

    fn save(&mut self) -> Result<(), SettingsError> {
        Ok(())
    }
}

/// Settings persisted as a flat TOML table
#[derive(Clone, Debug)]
pub struct TomlSettingsStore {
    path: PathBuf,
    values: BTreeMap<String, f32>,
}

impl TomlSettingsStore {
    /// Open the store at `path`; a missing file starts empty
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read_to_string(&path) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for TomlSettingsStore {
    fn get_f32(&self, key: &str) -> Option<f32> {
        self.values.get(key).copied()
    }

    fn set_f32(&mut self, key: &str, value: f32) {
        self.values.insert(key.to_string(), value);
    }

    fn save(&mut self) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, toml::to_string(&self.values)?)?;
        log::debug!("Saved settings to {}", self.path.display());
        Ok(())
    }
}

pub const DEFAULT_VOLUME: f32 = 0.5;

/// Per-channel volume levels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VolumeSettings {
    pub master: f32,
    pub music: f32,
    pub sfx: f32,
    pub dialogue: f32,
}

impl Default for VolumeSettings {
    fn default() -> Self {
        Self {
            master: DEFAULT_VOLUME,
            music: DEFAULT_VOLUME,
            sfx: DEFAULT_VOLUME,
            dialogue: DEFAULT_VOLUME,
        }
    }
}

impl VolumeSettings {
    pub fn get(&self, channel: AudioChannel) -> f32 {
        match channel {
            AudioChannel::Master => self.master,
            AudioChannel::Music => self.music,
            AudioChannel::Sfx => self.sfx,
            AudioChannel::Dialogue => self.dialogue,
        }
    }

    /// Set a channel, clamped to [0, 1]
    pub fn set(&mut self, channel: AudioChannel, volume: f32) {
        let volume = volume.clamp(0.0, 1.0);
        match channel {
            AudioChannel::Master => self.master = volume,
            AudioChannel::Music => self.music = volume,
            AudioChannel::Sfx => self.sfx = volume,
            AudioChannel::Dialogue => self.dialogue = volume,
        }
    }

    /// Read every channel, defaulting missing keys
    pub fn load(store: &dyn SettingsStore) -> Self {
        let mut settings = Self::default();
        for channel in AudioChannel::ALL {
            if let Some(v) = store.get_f32(channel.settings_key()) {
                settings.set(channel, v);
            }
        }
        settings
    }

    /// Write every channel and flush the store
    pub fn save(&self, store: &mut dyn SettingsStore) -> Result<(), SettingsError> {
        for channel in AudioChannel::ALL {
            store.set_f32(channel.settings_key(), self.get(channel));
        }
        store.save()
    }

    /// Push every channel to the sink
    pub fn apply(&self, sink: &mut dyn AudioSink) {
        for channel in AudioChannel::ALL {
            sink.set_volume(channel, self.get(channel));
        }
    }
}
