//! Error types shared across GlowGrid crates.

use std::path::PathBuf;

/// Top-level error type for GlowGrid operations.
///
/// Domain crates keep their own precise error enums; this type is what
/// crosses crate boundaries at async entry points and in configuration code.
#[derive(Debug, thiserror::Error)]
pub enum GlowgridError {
    #[error("Edit error: {message}")]
    Edit { message: String },

    #[error("Generation error: {message}")]
    Generation { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Cancelled: {message}")]
    Cancelled { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using GlowgridError.
pub type GlowgridResult<T> = Result<T, GlowgridError>;

impl GlowgridError {
    pub fn edit(msg: impl Into<String>) -> Self {
        Self::Edit {
            message: msg.into(),
        }
    }

    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled {
            message: msg.into(),
        }
    }

    /// Whether the error came from a cooperative cancellation rather than a fault.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructor_messages() {
        let err = GlowgridError::generation("source frame is corrupt");
        assert_eq!(
            err.to_string(),
            "Generation error: source frame is corrupt"
        );
        assert!(!err.is_cancelled());
        assert!(GlowgridError::cancelled("bake stopped").is_cancelled());
    }

    #[test]
    fn test_io_conversion_is_transparent() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing pattern");
        let err: GlowgridError = io.into();
        assert_eq!(err.to_string(), "missing pattern");
    }
}
