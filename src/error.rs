use thiserror::Error;

/// Reasons a [`crate::PascalineConfig`] is rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("a pascaline needs at least one wheel")]
    NoWheels,

    #[error("{wheel_count} wheels is more than the {max} a u128 total can hold")]
    TooManyWheels { wheel_count: usize, max: usize },

    #[error("decimal split {split_index} is outside 0..={wheel_count}")]
    SplitOutOfRange {
        split_index: usize,
        wheel_count: usize,
    },

    #[error("animation duration must be finite and positive, got {0}")]
    InvalidDuration(f64),

    #[error("carry flash duration must be finite and not negative, got {0}")]
    InvalidFlashDuration(f64),
}

/// Errors surfaced by the binary. The engine itself never fails.
#[derive(Error, Debug, miette::Diagnostic)]
pub enum PascalineError {
    #[error("invalid configuration: {0}")]
    #[diagnostic(
        code(pascaline::config),
        help("check the --wheels, --split and --duration flags")
    )]
    Config(#[from] ConfigError),

    #[error("terminal i/o failed")]
    #[diagnostic(code(pascaline::terminal))]
    Terminal(#[from] std::io::Error),

    #[error("could not set up logging: {message}")]
    #[diagnostic(code(pascaline::logging))]
    Logging { message: String },
}
