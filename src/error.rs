//! Unified error type.

use std::fmt;

/// The error type returned by trellis's fallible operations.
///
/// Application-level errors (404, 422, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// failures that should stop startup loudly: a middleware declaration that
/// does not hold together, or the server socket refusing to bind.
#[derive(Debug)]
pub enum Error {
    /// `middleware()` was called with an argument of the wrong kind.
    Validation(String),

    /// A middleware name did not resolve to any module in the directory.
    Resolution {
        name: String,
    },

    /// A name resolved, but the module could not produce a usable
    /// middleware instance.
    Shape {
        name: String,
        reason: String,
    },

    /// Binding to a port or accepting a connection failed.
    Io(std::io::Error),
}

impl Error {
    /// Create an [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an [`Error::Resolution`] for `name`.
    pub fn resolution(name: impl Into<String>) -> Self {
        Self::Resolution { name: name.into() }
    }

    /// Create an [`Error::Shape`] for `name`.
    pub fn shape(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Shape { name: name.into(), reason: reason.into() }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(message) => {
                write!(f, "invalid middleware declaration: {message}")
            }
            Self::Resolution { name } => {
                write!(f, "no middleware module named `{name}`")
            }
            Self::Shape { name, reason } => {
                write!(f, "middleware module `{name}` is malformed: {reason}")
            }
            Self::Io(e) => write!(f, "io: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_display() {
        let err = Error::validation("options must be a JSON object");
        assert_eq!(
            err.to_string(),
            "invalid middleware declaration: options must be a JSON object"
        );
    }

    #[test]
    fn resolution_display() {
        let err = Error::resolution("fake");
        assert_eq!(err.to_string(), "no middleware module named `fake`");
    }

    #[test]
    fn shape_display() {
        let err = Error::shape("noclass", "does not export a middleware class");
        assert_eq!(
            err.to_string(),
            "middleware module `noclass` is malformed: does not export a middleware class"
        );
    }

    #[test]
    fn io_source_is_preserved() {
        let inner = std::io::Error::new(std::io::ErrorKind::AddrInUse, "taken");
        let err = Error::from(inner);
        assert!(std::error::Error::source(&err).is_some());
    }
}
