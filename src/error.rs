use thiserror::Error;

/// Errors surfaced around the scoring engine. Scoring itself is total and
/// never returns one of these.
#[derive(Debug, Error)]
pub enum OptimizerError {
    /// The calling context requires content the draft does not carry.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A post URL did not match the `<host>/<user>/status/<id>` pattern.
    #[error("URL inválida: {0}. Ejemplo: https://x.com/user/status/123456789")]
    MalformedUrl(String),

    /// An optional enrichment provider failed.
    #[error("{provider} unavailable: {reason}")]
    EnrichmentUnavailable { provider: String, reason: String },

    #[error("config error: {0}")]
    Config(String),

    #[error("invalid trigger pattern: {0}")]
    Pattern(#[from] regex::Error),
}
