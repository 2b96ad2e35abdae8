//! A small owned XML tree built from the `quick-xml` event stream.
//!
//! SDF and URDF documents are a few kilobytes at most and their parsers
//! need random access to children (an SDF `<joint>` may list `<child>`
//! before `<parent>`), so both dialects parse into this tree first.

use indexmap::IndexMap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::DescriptionError;

/// One XML element with its attributes, child elements and text.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct XmlElement {
    /// Tag name.
    pub name: String,
    /// Attributes in document order, values unescaped.
    pub attributes: IndexMap<String, String>,
    /// Child elements in document order.
    pub children: Vec<XmlElement>,
    /// Concatenated, trimmed character data directly inside this element.
    pub text: String,
}

impl XmlElement {
    fn from_start(e: &BytesStart<'_>) -> Result<Self, DescriptionError> {
        let mut attributes = IndexMap::new();
        for attr in e.attributes() {
            let attr = attr.map_err(|err| DescriptionError::Xml {
                reason: err.to_string(),
            })?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attributes.insert(key, value);
        }
        Ok(Self {
            name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
            attributes,
            children: Vec::new(),
            text: String::new(),
        })
    }

    /// Attribute value, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Attribute value, or [`DescriptionError::MissingAttribute`].
    pub fn require_attr(&self, name: &str) -> Result<&str, DescriptionError> {
        self.attr(name)
            .ok_or_else(|| DescriptionError::missing_attribute(name, &self.name))
    }

    /// First child element with the given tag.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// First child element with the given tag, or
    /// [`DescriptionError::MissingElement`].
    pub fn require_child(&self, name: &str) -> Result<&XmlElement, DescriptionError> {
        self.child(name).ok_or_else(|| {
            let context = match self.attr("name") {
                Some(n) => format!("<{} name='{n}'>", self.name),
                None => format!("<{}>", self.name),
            };
            DescriptionError::missing_element(name, &context)
        })
    }

    /// All child elements with the given tag.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Text of the first child with the given tag.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.as_str())
    }
}

/// Parses a document and returns its root element.
///
/// Leading declarations, comments and processing instructions are
/// skipped. Content after the root element is ignored.
pub fn parse_document(text: &str) -> Result<XmlElement, DescriptionError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(ref e) => stack.push(XmlElement::from_start(e)?),
            Event::Empty(ref e) => {
                let element = XmlElement::from_start(e)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => return Ok(element),
                }
            }
            Event::End(_) => {
                let Some(element) = stack.pop() else {
                    return Err(DescriptionError::Xml {
                        reason: "unmatched closing tag".to_string(),
                    });
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => return Ok(element),
                }
            }
            Event::Text(ref t) => {
                if let Some(top) = stack.last_mut() {
                    append_text(&mut top.text, &t.unescape()?);
                } else if !t.iter().all(u8::is_ascii_whitespace) {
                    return Err(DescriptionError::Xml {
                        reason: "text outside of root element".to_string(),
                    });
                }
            }
            Event::CData(ref c) => {
                if let Some(top) = stack.last_mut() {
                    append_text(&mut top.text, &String::from_utf8_lossy(c));
                }
            }
            Event::Eof => {
                return Err(match stack.last() {
                    Some(open) => DescriptionError::Xml {
                        reason: format!("unexpected end of document inside <{}>", open.name),
                    },
                    None => DescriptionError::missing_element("root", "document"),
                });
            }
            _ => {}
        }
    }
}

fn append_text(dst: &mut String, text: &str) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    if !dst.is_empty() {
        dst.push(' ');
    }
    dst.push_str(text);
}

// ── Value parsing ───────────────────────────────────────────────

/// Parses a single float.
pub(crate) fn parse_f64(field: &str, text: &str) -> Result<f64, DescriptionError> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| DescriptionError::invalid_value(field, text))
}

/// Parses exactly `N` whitespace-separated floats.
pub(crate) fn parse_floats<const N: usize>(
    field: &str,
    text: &str,
) -> Result<[f64; N], DescriptionError> {
    let mut out = [0.0; N];
    let mut parts = text.split_whitespace();
    for slot in out.iter_mut() {
        let part = parts
            .next()
            .ok_or_else(|| DescriptionError::invalid_value(field, text))?;
        *slot = part
            .parse()
            .map_err(|_| DescriptionError::invalid_value(field, text))?;
    }
    if parts.next().is_some() {
        return Err(DescriptionError::invalid_value(field, text));
    }
    Ok(out)
}

/// Parses an SDF boolean (`true`/`false`/`1`/`0`).
pub(crate) fn parse_bool(field: &str, text: &str) -> Result<bool, DescriptionError> {
    match text.trim() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(DescriptionError::invalid_value(field, text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_nested_tree() {
        let root = parse_document(
            r#"<?xml version="1.0"?>
            <!-- comment -->
            <sdf version="1.6">
              <model name="m"><static>true</static><link name="a"/></model>
            </sdf>"#,
        )
        .unwrap();
        assert_eq!(root.name, "sdf");
        assert_eq!(root.attr("version"), Some("1.6"));
        let model = root.child("model").unwrap();
        assert_eq!(model.attr("name"), Some("m"));
        assert_eq!(model.child_text("static"), Some("true"));
        assert_eq!(model.children_named("link").count(), 1);
    }

    #[test]
    fn unescapes_attributes_and_text() {
        let root = parse_document(r#"<a n="x &amp; y">1 &lt; 2</a>"#).unwrap();
        assert_eq!(root.attr("n"), Some("x & y"));
        assert_eq!(root.text, "1 < 2");
    }

    #[test]
    fn empty_and_whitespace_documents_have_no_root() {
        for text in ["", "   \n", "<?xml version=\"1.0\"?>"] {
            assert!(matches!(
                parse_document(text),
                Err(DescriptionError::MissingElement { .. })
            ));
        }
    }

    #[test]
    fn truncated_document_is_rejected() {
        assert!(matches!(
            parse_document("<sdf><model name='x'>"),
            Err(DescriptionError::Xml { .. })
        ));
    }

    #[test]
    fn mismatched_tags_are_rejected() {
        assert!(matches!(
            parse_document("<a><b></a></b>"),
            Err(DescriptionError::Xml { .. })
        ));
    }

    #[test]
    fn float_lists_must_have_exact_arity() {
        assert_eq!(parse_floats::<3>("v", " 1 2\t3 ").unwrap(), [1.0, 2.0, 3.0]);
        assert!(parse_floats::<3>("v", "1 2").is_err());
        assert!(parse_floats::<3>("v", "1 2 3 4").is_err());
        assert!(parse_floats::<3>("v", "1 x 3").is_err());
    }

    #[test]
    fn bool_accepts_sdf_spellings() {
        assert!(parse_bool("b", "1").unwrap());
        assert!(!parse_bool("b", " false ").unwrap());
        assert!(parse_bool("b", "yes").is_err());
    }
}
