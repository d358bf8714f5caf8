use scraper::ElementRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Owned snapshot of a parsed element.
///
/// Attribute names are lowercased on capture, so markup written as
/// `NAME="x"` or `Type="RADIO"` is looked up the same way as lowercase markup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomElement {
    pub tag_name: String,
    pub attributes: HashMap<String, String>,
    pub text_content: String,
    /// Text node directly after the element, if any.
    pub trailing_text: Option<String>,
    pub children: Vec<DomElement>,
}

impl DomElement {
    pub fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_ascii_lowercase(),
            attributes: HashMap::new(),
            text_content: String::new(),
            trailing_text: None,
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.attributes
            .insert(key.to_ascii_lowercase(), value.to_string());
        self
    }

    pub fn with_text_content(mut self, text: &str) -> Self {
        self.text_content = text.to_string();
        self
    }

    pub fn with_trailing_text(mut self, text: &str) -> Self {
        self.trailing_text = Some(text.to_string());
        self
    }

    pub fn with_child(mut self, child: DomElement) -> Self {
        self.children.push(child);
        self
    }

    /// Capture an element and its element descendants from a scraper tree.
    pub fn from_element_ref(element_ref: ElementRef<'_>) -> Self {
        let element = element_ref.value();

        let attributes = element
            .attrs()
            .map(|(name, value)| (name.to_ascii_lowercase(), value.to_string()))
            .collect();

        let trailing_text = element_ref
            .next_sibling()
            .and_then(|node| node.value().as_text().map(|text| (&**text).to_string()));

        let children = element_ref
            .children()
            .filter_map(ElementRef::wrap)
            .map(DomElement::from_element_ref)
            .collect();

        Self {
            tag_name: element.name().to_ascii_lowercase(),
            attributes,
            text_content: element_ref.text().collect(),
            trailing_text,
            children,
        }
    }

    pub fn is(&self, tag_name: &str) -> bool {
        self.tag_name.eq_ignore_ascii_case(tag_name)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn attr_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.attr(name).unwrap_or(default)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    pub fn text(&self) -> &str {
        &self.text_content
    }

    pub fn trailing_text(&self) -> Option<&str> {
        self.trailing_text.as_deref()
    }

    /// Descendants whose tag is one of `tag_names`, in document order.
    pub fn find_all(&self, tag_names: &[&str]) -> Vec<&DomElement> {
        let mut found = Vec::new();
        self.collect_matching(tag_names, &mut found);
        found
    }

    /// First descendant with the given tag, in document order.
    pub fn find_first(&self, tag_name: &str) -> Option<&DomElement> {
        self.children.iter().find_map(|child| {
            if child.is(tag_name) {
                Some(child)
            } else {
                child.find_first(tag_name)
            }
        })
    }

    fn collect_matching<'a>(&'a self, tag_names: &[&str], found: &mut Vec<&'a DomElement>) {
        for child in &self.children {
            if tag_names.iter().any(|name| child.is(name)) {
                found.push(child);
            }
            child.collect_matching(tag_names, found);
        }
    }
}
