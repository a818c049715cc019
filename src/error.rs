//! # Error Types
//!
//! This module defines the error taxonomy shared by the compositing engine,
//! the AI collaborators, and the generation pipeline.

use thiserror::Error;

/// Main error type for adhyatmik operations
#[derive(Debug, Error)]
pub enum AdhyatmikError {
    /// The caption request was rejected before any stage ran
    #[error("Validation error: {0}")]
    Validation(String),

    /// Planning, synthesis, or placement analysis failed or returned malformed data
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Background bytes could not be decoded into a drawable image
    #[error("Asset error: {0}")]
    Asset(String),

    /// The drawing surface (canvas, font, encoder) could not be acquired
    #[error("Surface error: {0}")]
    Surface(String),

    /// Another generation is already in flight for this session
    #[error("A generation is already in progress")]
    Busy,

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AdhyatmikError {
    /// The single human-readable message shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            AdhyatmikError::Validation(_) => {
                "कृपया प्रॉम्प्ट फ़ील्ड भरें। (Please enter a caption.)".to_string()
            }
            AdhyatmikError::Upstream(msg) => format!("एक त्रुटि हुई: {}", msg),
            AdhyatmikError::Asset(_) => {
                "बैकग्राउंड इमेज लोड करने में विफल। (Failed to load the background image.)"
                    .to_string()
            }
            AdhyatmikError::Surface(_) => {
                "कैनवास कॉन्टेक्स्ट नहीं मिल सका। (Drawing surface unavailable.)".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AdhyatmikError>;
