use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelErrorKind {
    Identity,
    Tempo,
    Events,
    Scoring,
    Completion,
}

impl LevelErrorKind {
    pub(crate) fn from_code(code: &'static str) -> Self {
        match code {
            "E1001" => Self::Tempo,
            "E1101" | "E1102" => Self::Events,
            "E1201" | "E1202" | "E1203" => Self::Scoring,
            "E1301" => Self::Completion,
            "E1401" => Self::Identity,
            _ => Self::Events,
        }
    }
}

/// A level definition that cannot be played.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{code}: {message}")]
pub struct LevelError {
    pub code: &'static str,
    pub kind: LevelErrorKind,
    pub message: String,

    pub level_id: Option<String>,
    pub event_index: Option<usize>,
}

impl LevelError {
    pub(crate) fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            kind: LevelErrorKind::from_code(code),
            message: message.into(),
            level_id: None,
            event_index: None,
        }
    }

    pub fn with_level_id(mut self, level_id: impl Into<String>) -> Self {
        self.level_id = Some(level_id.into());
        self
    }

    pub fn with_event_index(mut self, event_index: usize) -> Self {
        self.event_index = Some(event_index);
        self
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid level: {0}")]
    Level(#[from] LevelError),

    #[error("no level loaded")]
    NoLevelLoaded,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_code_and_message() {
        let err = LevelError::new("E1001", "bpm must be > 0").with_level_id("7");
        assert_eq!(err.to_string(), "E1001: bpm must be > 0");
        assert_eq!(err.kind, LevelErrorKind::Tempo);
        assert_eq!(err.level_id.as_deref(), Some("7"));
    }

    #[test]
    fn codes_map_to_kinds() {
        assert_eq!(LevelErrorKind::from_code("E1102"), LevelErrorKind::Events);
        assert_eq!(LevelErrorKind::from_code("E1203"), LevelErrorKind::Scoring);
        assert_eq!(LevelErrorKind::from_code("E1301"), LevelErrorKind::Completion);
        assert_eq!(LevelErrorKind::from_code("E1401"), LevelErrorKind::Identity);
    }

    #[test]
    fn engine_error_wraps_level_error() {
        let err: EngineError = LevelError::new("E1101", "beat index must be >= 0").into();
        assert_eq!(err.to_string(), "invalid level: E1101: beat index must be >= 0");
    }
}
