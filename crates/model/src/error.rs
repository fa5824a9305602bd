use std::fmt::{self, Display};

/// The kind of error that occurred in a transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The server answered with a non-success status before any body
    /// was read.
    Rejected,
    /// The exchange failed while connecting or reading the body.
    Failure,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Rejected => write!(f, "Rejected"),
            ErrorKind::Failure => write!(f, "Transport failure"),
        }
    }
}
