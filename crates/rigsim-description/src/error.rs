//! Errors from parsing or converting model descriptions.

use std::error::Error;
use std::fmt;

/// Errors from the description parsers and the URDF converter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DescriptionError {
    /// The text is not well-formed XML.
    Xml {
        /// Message from the XML reader.
        reason: String,
    },
    /// A required element is absent.
    MissingElement {
        /// The element that was expected.
        element: String,
        /// Where it was expected.
        context: String,
    },
    /// A required attribute is absent.
    MissingAttribute {
        /// The attribute that was expected.
        attribute: String,
        /// The element it was expected on.
        element: String,
    },
    /// An attribute or element text could not be interpreted.
    InvalidValue {
        /// What was being parsed, e.g. `joint 'hinge' <axis><xyz>`.
        field: String,
        /// The offending text.
        value: String,
    },
    /// A joint declares a type this crate does not know.
    UnknownJointType {
        /// The joint name.
        joint: String,
        /// The declared type.
        kind: String,
    },
    /// A URDF robot has no link that is not a joint child.
    NoRootLink,
    /// A joint refers to a link that is not declared.
    UndefinedLink {
        /// The joint name.
        joint: String,
        /// The missing link name.
        link: String,
    },
    /// The input is valid but uses a feature with no SDF counterpart here.
    Unsupported {
        /// Description of the unsupported feature.
        feature: String,
    },
}

impl DescriptionError {
    pub(crate) fn missing_element(element: &str, context: &str) -> Self {
        Self::MissingElement {
            element: element.to_string(),
            context: context.to_string(),
        }
    }

    pub(crate) fn missing_attribute(attribute: &str, element: &str) -> Self {
        Self::MissingAttribute {
            attribute: attribute.to_string(),
            element: element.to_string(),
        }
    }

    pub(crate) fn invalid_value(field: impl Into<String>, value: &str) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.to_string(),
        }
    }
}

impl fmt::Display for DescriptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Xml { reason } => write!(f, "malformed XML: {reason}"),
            Self::MissingElement { element, context } => {
                write!(f, "missing <{element}> element in {context}")
            }
            Self::MissingAttribute { attribute, element } => {
                write!(f, "missing '{attribute}' attribute on <{element}>")
            }
            Self::InvalidValue { field, value } => {
                write!(f, "invalid value for {field}: '{value}'")
            }
            Self::UnknownJointType { joint, kind } => {
                write!(f, "joint '{joint}' has unknown type '{kind}'")
            }
            Self::NoRootLink => write!(f, "robot has no root link"),
            Self::UndefinedLink { joint, link } => {
                write!(f, "joint '{joint}' references undefined link '{link}'")
            }
            Self::Unsupported { feature } => write!(f, "unsupported: {feature}"),
        }
    }
}

impl Error for DescriptionError {}

impl From<quick_xml::Error> for DescriptionError {
    fn from(e: quick_xml::Error) -> Self {
        Self::Xml {
            reason: e.to_string(),
        }
    }
}
