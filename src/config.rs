use crate::audio::accumulator::FlushPolicy;
use crate::defaults;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub service: ServiceConfig,
    pub slate: SlateConfig,
}

/// Audio capture configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    /// Capture device name; None uses the best default.
    pub device: Option<String>,
}

/// Transcription service configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    /// Token endpoint URL.
    pub token_url: String,
    /// Streaming relay address (host:port).
    pub relay_addr: String,
    /// Flush residual audio shorter than the minimum packet as one short
    /// final packet when a finite source ends.
    pub flush_short_final: bool,
}

/// Slate handling configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SlateConfig {
    /// Seconds between a spoken slate and the ACTION call confirming it.
    pub correlation_window_secs: u64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self { device: None }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            token_url: defaults::TOKEN_URL.to_string(),
            relay_addr: defaults::RELAY_ADDR.to_string(),
            flush_short_final: false,
        }
    }
}

impl Default for SlateConfig {
    fn default() -> Self {
        Self {
            correlation_window_secs: defaults::CORRELATION_WINDOW.as_secs(),
        }
    }
}

impl ServiceConfig {
    /// Flush policy derived from the config flag.
    pub fn flush_policy(&self) -> FlushPolicy {
        if self.flush_short_final {
            FlushPolicy::FlushShort
        } else {
            FlushPolicy::Discard
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => Ok(toml::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - SLATEWIRE_TOKEN_URL → service.token_url
    /// - SLATEWIRE_RELAY_ADDR → service.relay_addr
    /// - SLATEWIRE_AUDIO_DEVICE → audio.device
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("SLATEWIRE_TOKEN_URL")
            && !url.is_empty()
        {
            self.service.token_url = url;
        }

        if let Ok(addr) = std::env::var("SLATEWIRE_RELAY_ADDR")
            && !addr.is_empty()
        {
            self.service.relay_addr = addr;
        }

        if let Ok(device) = std::env::var("SLATEWIRE_AUDIO_DEVICE")
            && !device.is_empty()
        {
            self.audio.device = Some(device);
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/slatewire/config.toml on Linux
    #[cfg(feature = "cli")]
    pub fn default_path() -> anyhow::Result<std::path::PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("slatewire").join("config.toml"))
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    /// Serialize the configuration to TOML.
    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write the configuration to a file, creating parent directories.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }
}
