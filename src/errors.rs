//! Error management module

use std::fmt;
use std::io;
use std::sync::Arc;

/// An error raised when the input cannot be pretty-printed.
///
/// This is the only error that reaches the user: the segmenter and the fold
/// tree never fail, whatever text they get.
#[derive(Clone, Debug)]
pub enum FormatError {
    /// Low-level parse error reported by the XML reader, which includes syntax
    /// errors and mismatched end tags
    Xml(quick_xml::Error),
    /// The writer failed to write formatted XML
    Io(Arc<io::Error>),
    /// The input ended while the element with the specified name was still open
    UnclosedTag(String),
    /// An end tag with the specified name was found, but no element is open
    UnexpectedEnd(String),
    /// The input is not blank, but does not contain any element
    MissingRoot,
    /// The formatted document is not a valid UTF-8 string
    NonUtf8,
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Xml(e) => write!(f, "invalid XML: {}", e),
            Self::Io(e) => write!(f, "I/O error: {}", e),
            Self::UnclosedTag(name) => write!(f, "element `{}` is never closed", name),
            Self::UnexpectedEnd(name) => {
                write!(f, "end tag `</{}>` does not close any element", name)
            }
            Self::MissingRoot => f.write_str("missing root element"),
            Self::NonUtf8 => f.write_str("formatted document is not valid UTF-8"),
        }
    }
}

impl std::error::Error for FormatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Xml(e) => Some(e),
            Self::Io(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<quick_xml::Error> for FormatError {
    #[inline]
    fn from(err: quick_xml::Error) -> Self {
        Self::Xml(err)
    }
}

impl From<io::Error> for FormatError {
    #[inline]
    fn from(err: io::Error) -> Self {
        Self::Io(Arc::new(err))
    }
}

/// A specialized `Result` type where the error is hard-wired to [`FormatError`].
pub type Result<T> = std::result::Result<T, FormatError>;
