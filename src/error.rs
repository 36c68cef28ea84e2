//! Error types for slatewire.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SlatewireError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Audio capture errors
    #[error("Audio device not found: {device}")]
    AudioDeviceNotFound { device: String },

    #[error("Audio capture failed: {message}")]
    AudioCapture { message: String },

    // Session setup errors (fatal to starting a session)
    #[error("Token request failed: {message}")]
    TokenFetch { message: String },

    #[error("Failed to connect to transcription service: {message}")]
    SessionConnect { message: String },

    // Transport errors (per-packet, never fatal to the session)
    #[error("Transport send failed: {message}")]
    Transport { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, SlatewireError>;
