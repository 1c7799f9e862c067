//! Domain error types.

use chrono::NaiveDateTime;

/// Top-level error type for tribar.
#[derive(Debug, thiserror::Error)]
pub enum TribarError {
    #[error("input not found: {path}")]
    NotFound { path: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("no price data for {symbol}")]
    NoData { symbol: String },

    #[error("timestamps not increasing at row {index}")]
    UnsortedTimestamps { index: usize },

    #[error("duplicate timestamp {timestamp} at row {index}")]
    DuplicateTimestamp {
        index: usize,
        timestamp: NaiveDateTime,
    },

    #[error("corrupt row {index}: {reason}")]
    CorruptRow { index: usize, reason: String },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&TribarError> for std::process::ExitCode {
    fn from(err: &TribarError) -> Self {
        let code: u8 = match err {
            TribarError::Io(_) | TribarError::Csv(_) => 1,
            TribarError::ConfigParse { .. }
            | TribarError::ConfigMissing { .. }
            | TribarError::ConfigInvalid { .. } => 2,
            TribarError::NotFound { .. } | TribarError::NoData { .. } => 3,
            TribarError::UnsortedTimestamps { .. }
            | TribarError::DuplicateTimestamp { .. }
            | TribarError::CorruptRow { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_location() {
        let err = TribarError::UnsortedTimestamps { index: 7 };
        assert_eq!(err.to_string(), "timestamps not increasing at row 7");

        let err = TribarError::ConfigInvalid {
            section: "barrier".into(),
            key: "take_profit".into(),
            reason: "must be non-negative".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid config value [barrier] take_profit: must be non-negative"
        );
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::other("disk gone");
        let err: TribarError = io.into();
        assert!(matches!(err, TribarError::Io(_)));
    }
}
