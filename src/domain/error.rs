//! Domain error types.

/// Top-level error type for lunatrader.
#[derive(Debug, thiserror::Error)]
pub enum LunatraderError {
    #[error("data error: {reason}")]
    Data { reason: String },

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

    #[error("unknown strategy: {reason}")]
    UnknownStrategy { reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("insufficient data for {symbol}: have {bars} bars, need {minimum}")]
    InsufficientData {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&LunatraderError> for std::process::ExitCode {
    fn from(err: &LunatraderError) -> Self {
        let code: u8 = match err {
            LunatraderError::Io(_) => 1,
            LunatraderError::ConfigParse { .. }
            | LunatraderError::ConfigMissing { .. }
            | LunatraderError::ConfigInvalid { .. } => 2,
            LunatraderError::Data { .. } => 3,
            LunatraderError::UnknownStrategy { .. } => 4,
            LunatraderError::NoData { .. } | LunatraderError::InsufficientData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
