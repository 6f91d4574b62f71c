//! Codec error type shared by the binary and XML formats

use std::fmt;

/// Errors that can occur while saving or loading an object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerialError {
    /// The underlying stream failed to read or write
    Io(String),
    /// The stream contained bytes that do not decode to a valid value
    InvalidData(String),
    /// The XML text could not be parsed
    Xml(String),
    /// A required attribute is absent
    MissingAttribute {
        /// Element that should carry the attribute
        element: String,
        /// Attribute name
        attribute: String,
    },
    /// An attribute is present but its value does not parse
    InvalidAttribute {
        /// Element carrying the attribute
        element: String,
        /// Attribute name
        attribute: String,
        /// Raw attribute text
        value: String,
    },
    /// A required child element is absent
    MissingElement {
        /// Parent element
        parent: String,
        /// Name of the missing child
        element: String,
    },
    /// The element handed to a loader has the wrong tag
    UnexpectedElement {
        /// Tag the loader expects
        expected: String,
        /// Tag that was found
        found: String,
    },
    /// A component name that the registry does not know
    UnknownComponent(String),
}

impl SerialError {
    pub(crate) fn missing_attribute(element: &str, attribute: &str) -> Self {
        Self::MissingAttribute {
            element: element.to_string(),
            attribute: attribute.to_string(),
        }
    }

    pub(crate) fn missing_element(parent: &str, element: &str) -> Self {
        Self::MissingElement {
            parent: parent.to_string(),
            element: element.to_string(),
        }
    }
}

impl fmt::Display for SerialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::InvalidData(e) => write!(f, "Invalid data: {e}"),
            Self::Xml(e) => write!(f, "XML error: {e}"),
            Self::MissingAttribute { element, attribute } => {
                write!(f, "<{element}> is missing required attribute '{attribute}'")
            }
            Self::InvalidAttribute {
                element,
                attribute,
                value,
            } => write!(
                f,
                "<{element}> attribute '{attribute}' has invalid value '{value}'"
            ),
            Self::MissingElement { parent, element } => {
                write!(f, "<{parent}> is missing required element <{element}>")
            }
            Self::UnexpectedElement { expected, found } => {
                write!(f, "expected element <{expected}>, found <{found}>")
            }
            Self::UnknownComponent(name) => write!(f, "unknown component type '{name}'"),
        }
    }
}

impl std::error::Error for SerialError {}

impl From<std::io::Error> for SerialError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<roxmltree::Error> for SerialError {
    fn from(e: roxmltree::Error) -> Self {
        Self::Xml(e.to_string())
    }
}
