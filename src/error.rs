//! Error type used within crate with From for commonly used crate errors
use std::error;
use std::{fmt, io};

/// Result type used within crate
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, PartialEq, Clone)]
/// Kind of error produced
pub enum ErrorKind {
    /// Unsupported system for command being run; no USB backend feature enabled for example
    Unsupported,
    /// Unable to open the USB subsystem to list devices - check permissions
    Opening,
    /// Enumeration backend failed to list devices for a reason other than permissions
    Enumeration,
    /// libusb error
    LibUSB,
    /// nusb error
    Nusb,
    /// Error parsing a string into a value
    Parsing,
    /// Error parsing config file
    Config,
    /// [`std::io::Error`] when reading a file or writing the event stream
    Io,
    /// Invalid arg for method or cli
    InvalidArg,
    /// Error From other crate without enum variant
    Other(&'static str),
}

#[derive(Debug, PartialEq)]
/// usbwatch error which impl [`std::error`]
pub struct Error {
    /// The [`ErrorKind`]
    pub kind: ErrorKind,
    /// String description
    pub message: String,
}

impl Error {
    /// New error helper
    pub fn new(kind: ErrorKind, message: &str) -> Error {
        Error {
            kind,
            message: message.to_string(),
        }
    }

    /// The [`ErrorKind`]
    pub fn kind(&self) -> ErrorKind {
        self.kind.to_owned()
    }

    /// The description
    pub fn message(&self) -> &String {
        &self.message
    }

    /// Error came from the enumeration backend so the device list could not be read
    ///
    /// These are the only errors the watch loop will retry; anything else (output, config) ends it.
    pub fn is_enumeration(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Opening
                | ErrorKind::Enumeration
                | ErrorKind::LibUSB
                | ErrorKind::Nusb
                | ErrorKind::Unsupported
        )
    }
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if f.alternate() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{:?} Error: {}", self.kind, self.message)
        }
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Error {
            kind: ErrorKind::Io,
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error {
            kind: ErrorKind::Parsing,
            message: error.to_string(),
        }
    }
}

impl From<Error> for io::Error {
    fn from(val: Error) -> Self {
        io::Error::new(io::ErrorKind::Other, val.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_alternate_is_message_only() {
        let e = Error::new(ErrorKind::Opening, "permission denied");
        assert_eq!(format!("{:#}", e), "permission denied");
        assert_eq!(format!("{}", e), "Opening Error: permission denied");
    }

    #[test]
    fn test_is_enumeration() {
        assert!(Error::new(ErrorKind::Nusb, "gone").is_enumeration());
        assert!(Error::new(ErrorKind::Opening, "eperm").is_enumeration());
        assert!(!Error::from(io::Error::new(io::ErrorKind::BrokenPipe, "pipe")).is_enumeration());
        assert!(!Error::new(ErrorKind::Config, "bad").is_enumeration());
    }
}
