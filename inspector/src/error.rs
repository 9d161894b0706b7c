use core::fmt;
use core::result::Result;

/// Failure kinds of an inspection run.
///
/// Both kinds are unrecoverable for the current run; the caller observes the
/// reason and never a partial report.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The address-mapping facility could not establish a mapping for the
    /// controller's register block. No register access is attempted.
    MappingUnavailable,
    /// The controller reports more redirection entries than the fixed
    /// 0x10..=0x3F index window can address.
    RedirectionTableOverflow,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Error::MappingUnavailable => "register block mapping unavailable",
            Error::RedirectionTableOverflow => {
                "redirection table exceeds the addressable index window"
            }
        };
        f.write_str(reason)
    }
}

/// The return value that indicates a successful inspection step ([`Ok`]) or
/// failure ([`Err`]).
pub type KResult<T> = Result<T, Error>;
