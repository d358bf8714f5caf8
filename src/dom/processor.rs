use crate::core::config::ParserConfig;
use crate::dom::DomElement;
use crate::errors::{FormError, Result};
use crate::forms::Form;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Turns raw HTML into `DomElement` snapshots and `Form`s.
pub struct DomProcessor {
    config: ParserConfig,
}

impl DomProcessor {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Snapshot of a whole document, rooted at its `<html>` element.
    pub fn parse_document(&self, html: &str) -> DomElement {
        let document = Html::parse_document(html);
        DomElement::from_element_ref(document.root_element())
    }

    /// First element of a markup fragment.
    pub fn parse_fragment(html: &str) -> Result<DomElement> {
        let fragment = Html::parse_fragment(html);
        fragment
            .root_element()
            .children()
            .find_map(ElementRef::wrap)
            .map(DomElement::from_element_ref)
            .ok_or_else(|| FormError::DomParse(format!("no element in fragment {:?}", html)))
    }

    /// Every element of a fragment whose tag is one of `tag_names`.
    pub fn fragment_elements(html: &str, tag_names: &[&str]) -> Result<Vec<DomElement>> {
        let selector = Self::selector(&tag_names.join(", "))?;
        let fragment = Html::parse_fragment(html);
        Ok(fragment
            .select(&selector)
            .map(DomElement::from_element_ref)
            .collect())
    }

    /// All forms in a document, in document order.
    pub fn forms(&self, html: &str) -> Result<Vec<Form>> {
        let selector = Self::selector("form")?;
        let document = Html::parse_document(html);

        let forms = document
            .select(&selector)
            .map(|element_ref| {
                Form::from_element_with(&DomElement::from_element_ref(element_ref), &self.config)
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(count = forms.len(), "extracted forms from document");
        Ok(forms)
    }

    /// First form in a document.
    pub fn first_form(&self, html: &str) -> Result<Form> {
        let root = self.parse_document(html);
        Form::from_element_with(&root, &self.config)
    }

    pub fn form_by_id(&self, html: &str, id: &str) -> Result<Form> {
        let selector = Self::selector("form")?;
        let document = Html::parse_document(html);

        let element_ref = document
            .select(&selector)
            .find(|element_ref| element_ref.value().attr("id") == Some(id))
            .ok_or_else(|| FormError::FormNotFound(format!("no form with id {:?}", id)))?;

        Form::from_element_with(&DomElement::from_element_ref(element_ref), &self.config)
    }

    fn selector(css: &str) -> Result<Selector> {
        Selector::parse(css).map_err(|_| FormError::DomParse(format!("invalid selector {:?}", css)))
    }
}

impl Default for DomProcessor {
    fn default() -> Self {
        Self::new(ParserConfig::default())
    }
}
