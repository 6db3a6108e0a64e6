use glowgrid_pattern_model::{ActionKind, UnknownActionType};

/// A single action could not be applied.
///
/// The pipeline contains these: the offending action is skipped and the rest
/// of the pipeline still runs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    #[error("unknown action type '{0}'")]
    UnknownActionType(String),

    #[error("invalid parameter '{key}' for {kind}: {reason}")]
    InvalidParam {
        kind: ActionKind,
        key: String,
        reason: String,
    },
}

impl TransformError {
    pub fn invalid_param(kind: ActionKind, key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParam {
            kind,
            key: key.into(),
            reason: reason.into(),
        }
    }
}

impl From<UnknownActionType> for TransformError {
    fn from(e: UnknownActionType) -> Self {
        Self::UnknownActionType(e.0)
    }
}

/// Resolve an action type name as typed by a user or found in a file.
pub fn parse_action_kind(name: &str) -> Result<ActionKind, TransformError> {
    Ok(name.parse::<ActionKind>()?)
}
