//! Minimal document model
//!
//! The embedding application owns the real presentation tree; this crate
//! only needs enough structure to discover eligible nodes and read/write
//! their attributes. Elements live in a flat arena indexed by [`NodeId`],
//! which is also how per-node widget state is keyed.

use std::collections::HashMap;

use crate::error::{Error, Result};

/// Identity of one element within a [`Document`]. Stable for the lifetime
/// of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Arena index of this node.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// One element: a tag name, an attribute map, and text content.
#[derive(Debug, Clone, Default)]
pub struct Element {
    tag: String,
    attrs: HashMap<String, String>,
    text: String,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: HashMap::new(),
            text: String::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Builder-style text setter.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(name.into(), value.into());
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }
}

/// A container of elements. The scanner walks this arena.
#[derive(Debug, Clone, Default)]
pub struct Document {
    elements: Vec<Element>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element and return its identity.
    pub fn push(&mut self, element: Element) -> NodeId {
        let id = NodeId(self.elements.len());
        self.elements.push(element);
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Element> {
        self.elements.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.elements.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Element)> {
        self.elements.iter().enumerate().map(|(i, e)| (NodeId(i), e))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (NodeId, &mut Element)> {
        self.elements
            .iter_mut()
            .enumerate()
            .map(|(i, e)| (NodeId(i), e))
    }
}

/// Attribute test within a selector
#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrTest {
    /// `[attr]` — attribute present
    Present(String),
    /// `[attr=value]` — attribute equals value
    Equals(String, String),
}

/// A small node-discovery selector.
///
/// Supported forms: `tag`, `[attr]`, `[attr=value]`, and a tag combined
/// with one attribute test (`tag[attr=value]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    tag: Option<String>,
    attr: Option<AttrTest>,
}

impl Selector {
    /// Parse a selector string. Empty or malformed selectors are
    /// configuration errors.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(Error::Config("empty selector".to_string()));
        }

        let (tag_part, attr_part) = match input.find('[') {
            Some(open) => {
                if !input.ends_with(']') {
                    return Err(Error::Config(format!(
                        "selector {input:?}: missing closing ']'"
                    )));
                }
                (&input[..open], Some(&input[open + 1..input.len() - 1]))
            }
            None => (input, None),
        };

        let tag = match tag_part {
            "" => None,
            t => Some(t.to_string()),
        };

        let attr = match attr_part {
            None => None,
            Some("") => {
                return Err(Error::Config(format!("selector {input:?}: empty attribute test")))
            }
            Some(test) => match test.split_once('=') {
                Some((name, value)) => Some(AttrTest::Equals(
                    name.trim().to_string(),
                    value.trim().trim_matches('"').to_string(),
                )),
                None => Some(AttrTest::Present(test.trim().to_string())),
            },
        };

        Ok(Self { tag, attr })
    }

    /// Whether an element matches this selector.
    pub fn matches(&self, element: &Element) -> bool {
        if let Some(tag) = &self.tag {
            if element.tag() != tag {
                return false;
            }
        }
        match &self.attr {
            None => true,
            Some(AttrTest::Present(name)) => element.has_attr(name),
            Some(AttrTest::Equals(name, value)) => element.attr(name) == Some(value.as_str()),
        }
    }
}
