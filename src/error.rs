use thiserror::Error;

pub type Result<T> = std::result::Result<T, ParseError>;

/// Everything that can go wrong while decoding a mountstats stream.
///
/// Any error aborts the whole parse: a half-decoded statistics block is
/// worse for a monitoring consumer than an explicit failure.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Device line with too few tokens or a mismatched anchor word.
    #[error("invalid device entry: {0:?}")]
    InvalidDeviceEntry(Vec<String>),

    /// A device line carried a statvers marker but the fstype is not one
    /// we can decode statistics for.
    #[error("cannot parse mount stats for fstype {0:?}")]
    UnsupportedFsType(String),

    /// Statistics line with one token; every stat line needs at least a
    /// field keyword and one value.
    #[error("not enough information for NFS stats: {0:?}")]
    TruncatedStatsLine(Vec<String>),

    /// `bytes:` group without exactly 8 fields.
    #[error("invalid NFS bytes stats: {0:?}")]
    InvalidBytesStats(Vec<String>),

    /// `events:` group without exactly 27 fields.
    #[error("invalid NFS events stats: {0:?}")]
    InvalidEventsStats(Vec<String>),

    /// `xprt:` line too short for its transport keyword.
    #[error("not enough information for NFS transport stats: {0:?}")]
    TruncatedTransportLine(Vec<String>),

    /// Transport group whose field count does not match its statvers.
    #[error("invalid NFS transport stats {version} statement: {tokens:?}")]
    InvalidTransportStats { version: String, tokens: Vec<String> },

    /// statvers value other than "1.0" or "1.1".
    #[error("unrecognized NFS transport stats version: {0:?}")]
    UnsupportedStatVersion(String),

    /// Per-operation line without exactly 9 fields.
    #[error("invalid NFS per-operation stats: {0:?}")]
    InvalidOperationStats(Vec<String>),

    /// A counter field that is not a decimal integer.
    #[error("invalid integer {token:?}: {source}")]
    InvalidInteger {
        token:  String,
        source: std::num::ParseIntError,
    },

    /// Underlying read failure, passed through untouched.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
