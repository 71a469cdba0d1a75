use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrderingError {
    #[error("Weight modifier collaborator failed: {0}")]
    /// A delegate injected into a modifier, e.g. a gray period provider, failed.
    ///
    /// The error is passed through untouched, an ordering pass which hits this
    /// should be abandoned rather than continued with partial weights.
    Collaborator(anyhow::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid weight settings: {0}")]
    /// The initial, minimum and maximum weights are inconsistent.
    InvalidWeights(&'static str),

    #[error("Invalid adaptive health settings: {0}")]
    /// The adaptive health multipliers or bounds are out of range.
    InvalidHealth(&'static str),

    #[error("A composite tuning policy requires at least one policy.")]
    EmptyTuningPolicies,
}
