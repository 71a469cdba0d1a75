use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("The division factor must be greater than zero.")]
    ZeroDivisionFactor,

    #[error("At least one forking delay must be provided.")]
    EmptyDelays,

    #[error("The maximum parallelism must be greater than zero.")]
    ZeroParallelism,

    #[error("A composite wait-another-result provider requires at least one provider.")]
    EmptyProviders,
}
