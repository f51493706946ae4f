//! Engine error type
//!
//! Contract violations by body implementations and bad configuration surface
//! here; numeric searches never fail.

use std::fmt;

use crate::sim::{BodyHandle, PrimitiveKind};

/// Unified error type for engine operations.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineError {
    /// `advance` was called with a non-finite or non-positive interval.
    InvalidFrameTime {
        /// The rejected interval (seconds)
        frame_time: f64,
    },
    /// A body's position query returned a different primitive kind than it declared.
    PrimitiveMismatch {
        /// Offending body
        body: BodyHandle,
        /// Primitive id within that body
        primitive: usize,
        /// Kind reported by `primitive_kind`
        declared: PrimitiveKind,
        /// Kind returned by `primitive_at`
        reported: PrimitiveKind,
    },
    /// Invalid configuration parameter.
    InvalidConfiguration {
        /// Description of the invalid configuration
        reason: String,
    },
    /// Settings file could not be read.
    SettingsIo {
        /// Path that was being read
        path: String,
        /// Underlying I/O error text
        message: String,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFrameTime { frame_time } => {
                write!(f, "frame time must be positive and finite (got {frame_time})")
            }
            Self::PrimitiveMismatch {
                body,
                primitive,
                declared,
                reported,
            } => write!(
                f,
                "body {body} primitive {primitive} declared {declared:?} but reported {reported:?}"
            ),
            Self::InvalidConfiguration { reason } => {
                write!(f, "invalid configuration: {reason}")
            }
            Self::SettingsIo { path, message } => {
                write!(f, "failed to read settings from {path}: {message}")
            }
        }
    }
}

impl std::error::Error for EngineError {}
