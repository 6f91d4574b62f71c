//! XML rendering and parsing helpers
//!
//! Writing goes through [`XmlElement`], a small builder whose output is fully
//! deterministic: attributes keep insertion order, floats use Rust's shortest
//! round-trip formatting and indentation is fixed at two spaces. Reading uses
//! `roxmltree` nodes.

use std::borrow::Cow;
use std::fmt::{self, Display, Write as _};
use std::str::FromStr;

use glam::Vec2;

use super::SerialError;

/// Header that precedes every full document
pub const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// A parsed element handed to loaders
pub type XmlNode<'a, 'input> = roxmltree::Node<'a, 'input>;

/// Objects with a lossless XML representation.
pub trait XmlSerialize {
    /// Build the element describing this object
    fn to_xml(&self) -> XmlElement;

    /// Replace this object's state with the one described by `node`.
    ///
    /// Missing required attributes or elements fail; missing optional ones
    /// fall back to their defaults. Unknown extras are ignored.
    fn load_xml(&mut self, node: XmlNode<'_, '_>) -> Result<(), SerialError>;

    /// Render this object as element text (no document header)
    fn save_xml(&self) -> String {
        self.to_xml().to_string()
    }
}

/// An element under construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlElement>,
}

impl XmlElement {
    /// Create an empty element
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add an attribute
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Display) -> Self {
        self.attributes.push((name.into(), value.to_string()));
        self
    }

    /// Add a child element
    #[must_use]
    pub fn child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    /// Add a child element in place
    pub fn push_child(&mut self, child: XmlElement) {
        self.children.push(child);
    }

    /// Element tag
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Look up an attribute value
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Child elements in insertion order
    #[must_use]
    pub fn children(&self) -> &[XmlElement] {
        &self.children
    }

    /// Render as a full document with the fixed header
    #[must_use]
    pub fn to_document(&self) -> String {
        format!("{XML_HEADER}\n{self}\n")
    }

    fn render(&self, out: &mut String, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        write!(out, "{indent}<{}", self.tag)?;
        for (name, value) in &self.attributes {
            write!(out, " {name}=\"{}\"", escape(value))?;
        }
        if self.children.is_empty() {
            return out.write_str(" />");
        }
        out.write_str(">")?;
        for child in &self.children {
            out.write_char('\n')?;
            child.render(out, depth + 1)?;
        }
        write!(out, "\n{indent}</{}>", self.tag)
    }
}

impl Display for XmlElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.render(&mut out, 0)?;
        f.write_str(&out)
    }
}

fn escape(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '>', '"', '\'', '\n', '\r', '\t']) {
        return Cow::Borrowed(value);
    }
    let mut out = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}

/// Build a `<Tag X=".." Y=".." />` element
#[must_use]
pub fn vec2_element(tag: &str, value: Vec2) -> XmlElement {
    XmlElement::new(tag).attr("X", value.x).attr("Y", value.y)
}

/// Parse an element built by [`vec2_element`]
pub fn parse_vec2(node: XmlNode<'_, '_>) -> Result<Vec2, SerialError> {
    Ok(Vec2::new(parse_attr(node, "X")?, parse_attr(node, "Y")?))
}

/// Fail unless `node` carries the expected tag
pub fn expect_tag(node: XmlNode<'_, '_>, tag: &str) -> Result<(), SerialError> {
    let found = node.tag_name().name();
    if found == tag {
        Ok(())
    } else {
        Err(SerialError::UnexpectedElement {
            expected: tag.to_string(),
            found: found.to_string(),
        })
    }
}

/// Fetch a required attribute's raw text
pub fn required_attr<'a>(node: XmlNode<'a, '_>, name: &str) -> Result<&'a str, SerialError> {
    node.attribute(name)
        .ok_or_else(|| SerialError::missing_attribute(node.tag_name().name(), name))
}

fn parse_value<T: FromStr>(node: XmlNode<'_, '_>, name: &str, raw: &str) -> Result<T, SerialError> {
    raw.trim()
        .parse()
        .map_err(|_| SerialError::InvalidAttribute {
            element: node.tag_name().name().to_string(),
            attribute: name.to_string(),
            value: raw.to_string(),
        })
}

/// Parse a required attribute
pub fn parse_attr<T: FromStr>(node: XmlNode<'_, '_>, name: &str) -> Result<T, SerialError> {
    let raw = required_attr(node, name)?;
    parse_value(node, name, raw)
}

/// Parse an optional attribute, falling back to `default` when absent.
///
/// A present but malformed value is still an error.
pub fn parse_attr_or<T: FromStr>(
    node: XmlNode<'_, '_>,
    name: &str,
    default: T,
) -> Result<T, SerialError> {
    match node.attribute(name) {
        Some(raw) => parse_value(node, name, raw),
        None => Ok(default),
    }
}

/// Child elements of `node`, skipping text and comments
pub fn element_children<'a, 'input>(
    node: XmlNode<'a, 'input>,
) -> impl Iterator<Item = XmlNode<'a, 'input>> {
    node.children().filter(roxmltree::Node::is_element)
}

/// First child element named `name`
pub fn optional_child<'a, 'input>(
    node: XmlNode<'a, 'input>,
    name: &str,
) -> Option<XmlNode<'a, 'input>> {
    element_children(node).find(|child| child.tag_name().name() == name)
}

/// First child element named `name`, or a missing-element error
pub fn required_child<'a, 'input>(
    node: XmlNode<'a, 'input>,
    name: &str,
) -> Result<XmlNode<'a, 'input>, SerialError> {
    optional_child(node, name)
        .ok_or_else(|| SerialError::missing_element(node.tag_name().name(), name))
}

/// Parse `text` and load its root element into `target`
pub fn load_xml_str<T: XmlSerialize + ?Sized>(target: &mut T, text: &str) -> Result<(), SerialError> {
    let doc = roxmltree::Document::parse(text)?;
    target.load_xml(doc.root_element())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_closed_element() {
        let el = XmlElement::new("Scale").attr("X", 1.5f32).attr("Y", 2.0f32);
        assert_eq!(el.to_string(), r#"<Scale X="1.5" Y="2" />"#);
    }

    #[test]
    fn test_nested_rendering_is_deterministic() {
        let el = XmlElement::new("Outer")
            .attr("Name", "a")
            .child(XmlElement::new("Inner"));
        let expected = "<Outer Name=\"a\">\n  <Inner />\n</Outer>";
        assert_eq!(el.to_string(), expected);
        assert_eq!(el.to_string(), el.clone().to_string());
    }

    #[test]
    fn test_attribute_escaping_round_trip() {
        let text = "a < b & \"c\"\nnext";
        let el = XmlElement::new("T").attr("Text", text);
        let rendered = el.to_document();
        let doc = roxmltree::Document::parse(&rendered).unwrap();
        assert_eq!(doc.root_element().attribute("Text"), Some(text));
    }

    #[test]
    fn test_required_and_optional_attributes() {
        let doc = roxmltree::Document::parse(r#"<P X="3" Bad="zz" />"#).unwrap();
        let node = doc.root_element();

        assert_eq!(parse_attr::<f32>(node, "X").unwrap(), 3.0);
        assert!(matches!(
            parse_attr::<f32>(node, "Y"),
            Err(SerialError::MissingAttribute { .. })
        ));
        assert_eq!(parse_attr_or(node, "Y", 7.0f32).unwrap(), 7.0);
        assert!(matches!(
            parse_attr_or(node, "Bad", 0i32),
            Err(SerialError::InvalidAttribute { .. })
        ));
    }

    #[test]
    fn test_required_child() {
        let doc = roxmltree::Document::parse("<A><!-- c --><B X=\"1\" Y=\"2\"/></A>").unwrap();
        let b = required_child(doc.root_element(), "B").unwrap();
        assert_eq!(parse_vec2(b).unwrap(), Vec2::new(1.0, 2.0));
        assert!(matches!(
            required_child(doc.root_element(), "C"),
            Err(SerialError::MissingElement { .. })
        ));
    }

    #[test]
    fn test_expect_tag() {
        let doc = roxmltree::Document::parse("<A />").unwrap();
        assert!(expect_tag(doc.root_element(), "A").is_ok());
        assert!(expect_tag(doc.root_element(), "B").is_err());
    }
}
