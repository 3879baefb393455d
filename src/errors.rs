use thiserror::Error;

/// Errors raised while building or running a trial.
#[derive(Error, Debug)]
pub enum MixError {
    /// A system needs at least one site.
    #[error("system must contain at least one site")]
    EmptySystem,

    /// Spin systems need at least two classes.
    #[error("need at least 2 spin classes, got {0}")]
    TooFewClasses(usize),

    /// A strength or probability parameter was outside its domain.
    #[error("invalid parameter {name} = {value}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },

    /// An acceptance probability evaluated to NaN or infinity.
    #[error("non-finite acceptance probability from {rule} (field {field})")]
    NonFiniteProbability {
        /// Update rule which produced the value.
        rule: &'static str,
        /// Argument handed to the exponential.
        field: f64,
    },

    /// A spin class index not in the alphabet.
    #[error("spin {spin} out of range for {classes} classes")]
    SpinOutOfRange {
        /// Offending spin.
        spin: usize,
        /// Number of classes in the alphabet.
        classes: usize,
    },

    /// Two things which must agree in size did not.
    #[error("size mismatch: {0} != {1}")]
    SizeMismatch(usize, usize),

    /// The requested type vector cannot be reached for this n and q.
    #[error("type vector target {target} needs n={n} divisible accordingly for q={q}")]
    IndivisibleTypeVector {
        /// Target name.
        target: &'static str,
        /// Number of sites.
        n: usize,
        /// Number of classes.
        q: usize,
    },

    /// Model parameters handed to a mode which cannot run them.
    #[error("model {model} cannot run in {mode} mode")]
    UnsupportedMode {
        /// Model name.
        model: &'static str,
        /// Mode name.
        mode: &'static str,
    },

    /// A graph referenced a site outside of its range.
    #[error("edge ({0}, {1}) out of range for graph of {2} sites")]
    InvalidGraph(usize, usize, usize),

    /// Writing results failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the crate.
pub type MixResult<T> = Result<T, MixError>;

/// Fail with `InvalidParameter` unless `value` is finite.
pub(crate) fn check_finite(name: &'static str, value: f64) -> MixResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MixError::InvalidParameter { name, value })
    }
}
