/// Errors raised while fetching pages and applying source rules.
///
/// Pipeline drivers convert these into state `-1` debug entries instead of
/// tearing the WebSocket session down.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("no source registered for tag: {0}")]
    UnknownSource(String),

    #[error("invalid command: {0}")]
    InvalidCommand(String),

    #[error("request to {url} failed: {reason}")]
    Fetch { url: String, reason: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("invalid selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },

    #[error("invalid rule `{0}`")]
    Rule(String),

    #[error("rule `{rule}` matched nothing at {url}")]
    EmptyMatch { rule: String, url: String },
}

impl SourceError {
    /// Whether the error came from the remote site rather than the source
    /// definition itself.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::Status { .. })
    }
}
