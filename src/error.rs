/// Errors observable at the library boundary.
///
/// These are the only recoverable error kinds the mining engine surfaces.
/// Worker interruption and top-K contention are not represented here: both
/// are handled internally (the former by marking a partition terminated and
/// flushing its buffer, the latter by silently dropping the candidate) since
/// neither invalidates an already-converged result.
#[derive(Debug, thiserror::Error)]
pub enum PhantomError {
    #[error("line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },

    #[error("line {line}: probability {value} for {item:?} out of range [0, 1]")]
    OutOfRangeProbability {
        line: usize,
        item: Option<String>,
        value: f64,
    },

    #[error("line {line}: non-finite value {value} for {item:?}")]
    NonFinite {
        line: usize,
        item: Option<String>,
        value: f64,
    },

    #[error("duplicate item {item:?} on line {line}")]
    DuplicateItem { line: usize, item: String },

    #[error("invalid configuration: {reason}")]
    Config { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
