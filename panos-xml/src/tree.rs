use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use quick_xml::escape::escape;
use serde::Serialize;

/// A generic XML tree node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XmlNode {
    /// Element tag name.
    pub tag: String,
    /// XML attributes keyed by name.
    pub attributes: BTreeMap<String, String>,
    /// Child elements.
    pub children: Vec<XmlNode>,
    /// Optional text content.
    pub text: Option<String>,
}

impl XmlNode {
    /// Create a new XML node with no attributes, children, or text.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
            text: None,
        }
    }

    /// Create a leaf node holding `text`.
    pub fn with_text(tag: impl Into<String>, text: impl Into<String>) -> Self {
        let mut node = Self::new(tag);
        node.text = Some(text.into());
        node
    }

    /// Create a PAN-OS `<entry name="...">` node.
    pub fn entry(name: impl Into<String>) -> Self {
        let mut node = Self::new("entry");
        node.attributes.insert("name".to_string(), name.into());
        node
    }

    /// Create a `<tag><member>..</member>...</tag>` list node.
    pub fn member_list<I, S>(tag: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut node = Self::new(tag);
        node.children = members
            .into_iter()
            .map(|m| XmlNode::with_text("member", m))
            .collect();
        node
    }

    /// Value of the `name` attribute, if present.
    pub fn name(&self) -> Option<&str> {
        self.attributes.get("name").map(String::as_str)
    }

    /// Return the first child with the provided tag.
    pub fn get_child(&self, tag: &str) -> Option<&XmlNode> {
        self.children.iter().find(|child| child.tag == tag)
    }

    /// Walk a nested child path, returning the node at its end.
    pub fn get_path(&self, path: &[&str]) -> Option<&XmlNode> {
        let mut current = self;
        for segment in path {
            current = current.get_child(segment)?;
        }
        Some(current)
    }

    /// Walk a nested child path and return the terminal node's trimmed text.
    pub fn get_text<'a>(&'a self, path: &[&str]) -> Option<&'a str> {
        self.get_path(path)?
            .text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// All `<entry>` children.
    pub fn entries(&self) -> impl Iterator<Item = &XmlNode> {
        self.children.iter().filter(|child| child.tag == "entry")
    }

    /// The `<entry>` child whose `name` attribute equals `name` exactly.
    pub fn entry_named(&self, name: &str) -> Option<&XmlNode> {
        self.entries().find(|entry| entry.name() == Some(name))
    }

    /// Mutable variant of [`XmlNode::entry_named`].
    pub fn entry_named_mut(&mut self, name: &str) -> Option<&mut XmlNode> {
        self.children
            .iter_mut()
            .find(|child| child.tag == "entry" && child.name() == Some(name))
    }

    /// Text of every `<member>` under the child `tag`.
    ///
    /// Returns an empty list when the child is missing.
    pub fn members(&self, tag: &str) -> Vec<String> {
        let Some(list) = self.get_child(tag) else {
            return Vec::new();
        };
        list.children
            .iter()
            .filter(|c| c.tag == "member")
            .filter_map(|c| c.text.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
            .collect()
    }

    /// Gets or creates a child element with the given tag name.
    pub fn ensure_child_mut(&mut self, tag: &str) -> &mut XmlNode {
        if let Some(idx) = self.children.iter().position(|c| c.tag == tag) {
            return &mut self.children[idx];
        }
        self.children.push(XmlNode::new(tag));
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Gets or creates every element along `path`.
    pub fn ensure_path_mut(&mut self, path: &[&str]) -> &mut XmlNode {
        let mut current = self;
        for segment in path {
            current = current.ensure_child_mut(segment);
        }
        current
    }
}

impl Display for XmlNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.tag)?;
        for (key, value) in &self.attributes {
            write!(f, " {}=\"{}\"", key, escape(value.as_str()))?;
        }

        if self.children.is_empty() && self.text.is_none() {
            return write!(f, "/>");
        }

        write!(f, ">")?;
        if let Some(text) = &self.text {
            write!(f, "{}", escape(text.as_str()))?;
        }
        for child in &self.children {
            write!(f, "{}", child)?;
        }
        write!(f, "</{}>", self.tag)
    }
}
