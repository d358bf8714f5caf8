use crate::core::config::ParserConfig;
use crate::core::FormControl;
use crate::dom::{DomElement, DomProcessor};
use crate::errors::{FormError, Result};
use crate::forms::parser::parse_fields;
use crate::forms::payload::Payload;
use crate::forms::{Field, Submit};
use crate::types::FieldValue;
use std::fmt;
use std::ops::{Index, IndexMut};
use tracing::debug;

/// Fields in document order, keyed by name; names may repeat.
#[derive(Debug, Clone, Default)]
pub struct FieldMap {
    entries: Vec<(String, Field)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: Field) {
        self.entries.push((field.name().to_string(), field));
    }

    /// First field stored under `name`.
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, field)| field)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.entries
            .iter_mut()
            .find(|(key, _)| key == name)
            .map(|(_, field)| field)
    }

    pub fn get_all(&self, name: &str) -> Vec<&Field> {
        self.entries
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, field)| field)
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Distinct names, in order of first appearance.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for (key, _) in &self.entries {
            if !keys.contains(&key.as_str()) {
                keys.push(key);
            }
        }
        keys
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.entries.iter().map(|(key, field)| (key.as_str(), field))
    }

    pub fn values(&self) -> impl Iterator<Item = &Field> {
        self.entries.iter().map(|(_, field)| field)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<Field> for FieldMap {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        let mut map = FieldMap::new();
        for field in iter {
            map.push(field);
        }
        map
    }
}

/// An HTML form: its target, method, and controls.
#[derive(Debug, Clone)]
pub struct Form {
    action: String,
    method: String,
    id: Option<String>,
    fields: FieldMap,
}

impl Form {
    /// First form in an HTML document or fragment.
    pub fn parse(html: &str) -> Result<Self> {
        Self::parse_with(html, &ParserConfig::default())
    }

    pub fn parse_with(html: &str, config: &ParserConfig) -> Result<Self> {
        DomProcessor::new(config.clone()).first_form(html)
    }

    /// Build from a `<form>` tag, or the first `<form>` below a container.
    pub fn from_element(element: &DomElement) -> Result<Self> {
        Self::from_element_with(element, &ParserConfig::default())
    }

    pub fn from_element_with(element: &DomElement, config: &ParserConfig) -> Result<Self> {
        let form = if element.is("form") {
            element
        } else {
            element.find_first("form").ok_or_else(|| {
                FormError::FormNotFound(format!("no <form> below <{}>", element.tag_name))
            })?
        };

        let action = form.attr_or("action", "").to_string();
        let method = form.attr_or("method", &config.default_method).to_string();
        let fields: FieldMap = parse_fields(form, config)?.into_iter().collect();

        debug!(
            fields = fields.len(),
            method = %method,
            action = %action,
            "parsed form"
        );

        Ok(Self {
            action,
            method,
            id: form.attr("id").map(str::to_string),
            fields,
        })
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    pub fn keys(&self) -> Vec<&str> {
        self.fields.keys()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.get_mut(name)
    }

    pub fn get_all(&self, name: &str) -> Vec<&Field> {
        self.fields.get_all(name)
    }

    pub fn add_field(&mut self, field: impl Into<Field>) {
        self.fields.push(field.into());
    }

    /// Parse one control from markup and append it.
    pub fn add_markup(&mut self, html: &str) -> Result<()> {
        let field = Field::parse(html)?;
        self.fields.push(field);
        Ok(())
    }

    /// Assign the value of the first field named `name`.
    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<()> {
        self.fields
            .get_mut(name)
            .ok_or_else(|| FormError::FieldNotFound(name.to_string()))?
            .set_value(value.into())
    }

    /// Submit controls in document order.
    pub fn submit_fields(&self) -> Vec<&Submit> {
        self.fields.values().filter_map(Field::as_submit).collect()
    }

    pub fn submit_field(&self, name: &str) -> Option<&Submit> {
        self.submit_fields()
            .into_iter()
            .find(|submit| submit.name() == name)
    }

    /// Serialize enabled fields into a payload.
    ///
    /// With more than one submit control, `submit` must name one of this
    /// form's own submit fields; every other submit is left out.
    pub fn serialize(&self, submit: Option<&Submit>) -> Result<Payload> {
        let submits = self.submit_fields();

        let chosen = if submits.len() > 1 {
            let submit = submit.ok_or_else(|| {
                FormError::InvalidSubmit(format!(
                    "form has {} submit fields; one must be chosen",
                    submits.len()
                ))
            })?;
            if !submits.iter().any(|own| std::ptr::eq(*own, submit)) {
                return Err(FormError::InvalidSubmit(format!(
                    "submit {:?} does not belong to this form",
                    submit.name()
                )));
            }
            Some(submit)
        } else {
            None
        };

        let mut payload = Payload::new();
        for field in self.fields.values() {
            if let (Some(chosen), Some(own)) = (chosen, field.as_submit()) {
                if !std::ptr::eq(chosen, own) {
                    debug!(name = own.name(), "excluding unchosen submit");
                    continue;
                }
            }
            if field.disabled() {
                debug!(name = field.name(), "excluding disabled field");
                continue;
            }
            payload.add(field.serialize(), field.payload_key());
        }

        Ok(payload)
    }
}

impl Index<&str> for Form {
    type Output = Field;

    fn index(&self, name: &str) -> &Field {
        match self.fields.get(name) {
            Some(field) => field,
            None => panic!("no field named {:?}", name),
        }
    }
}

impl IndexMut<&str> for Form {
    fn index_mut(&mut self, name: &str) -> &mut Field {
        match self.fields.get_mut(name) {
            Some(field) => field,
            None => panic!("no field named {:?}", name),
        }
    }
}

impl fmt::Display for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state: Vec<String> = self
            .fields
            .iter()
            .map(|(name, field)| format!("{}={}", name, field.value()))
            .collect();
        if state.is_empty() {
            write!(f, "<Form>")
        } else {
            write!(f, "<Form {}>", state.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::Input;
    use crate::testing::TestHelper;
    use crate::types::PayloadValue;

    #[test]
    fn test_fields_and_keys() {
        let form = Form::parse(TestHelper::QUEEN_FORM).unwrap();
        assert_eq!(
            form.keys(),
            vec!["vocals", "guitar", "drums", "bass", "multi", "submit"]
        );
        assert_eq!(form.len(), 7);
        assert_eq!(form.get_all("multi").len(), 2);
    }

    #[test]
    fn test_method_and_action() {
        let form = Form::parse("<form></form>").unwrap();
        assert_eq!(form.method(), "get");
        assert_eq!(form.action(), "");
        assert!(form.is_empty());

        let form = Form::parse(r#"<form method="put" action="/"></form>"#).unwrap();
        assert_eq!(form.method(), "put");
        assert_eq!(form.action(), "/");
    }

    #[test]
    fn test_default_method_from_config() {
        let config = ParserConfig {
            default_method: "post".to_string(),
            ..Default::default()
        };
        let form = Form::parse_with("<form></form>", &config).unwrap();
        assert_eq!(form.method(), "post");
    }

    #[test]
    fn test_form_from_container() {
        let root = DomProcessor::default().parse_document(TestHelper::TWO_FORM_PAGE);
        let form = Form::from_element(&root).unwrap();
        assert_eq!(form.id(), Some("search"));

        let empty = DomElement::new("div");
        assert!(matches!(
            Form::from_element(&empty),
            Err(FormError::FormNotFound(_))
        ));
    }

    #[test]
    fn test_display() {
        let form = Form::parse(TestHelper::QUEEN_FORM).unwrap();
        assert_eq!(
            form.to_string(),
            "<Form vocals=, guitar=, drums=roger, bass=, multi=multi1, multi=multi2, submit=submit>"
        );
        assert_eq!(Form::parse("<form></form>").unwrap().to_string(), "<Form>");
        assert_eq!(
            Form::parse(r#"<form><input name="drüms" value="bäss" /></form>"#)
                .unwrap()
                .to_string(),
            "<Form drüms=bäss>"
        );
    }

    #[test]
    fn test_add_field() {
        let mut form = Form::parse(TestHelper::QUEEN_FORM).unwrap();
        form.add_field(Input::parse(r#"<input name="instrument" />"#).unwrap());
        assert!(form.fields().contains("instrument"));

        form.add_markup(r#"<input name="piano" value="keys" />"#).unwrap();
        assert_eq!(form["piano"].value(), "keys");
    }

    #[test]
    fn test_add_non_field_markup_fails() {
        let mut form = Form::parse(TestHelper::QUEEN_FORM).unwrap();
        assert!(matches!(
            form.add_markup("<p>freddie</p>"),
            Err(FormError::InvalidFieldType(_))
        ));
        assert_eq!(form.len(), 7);
    }

    #[test]
    fn test_index_get_and_set() {
        let mut form = Form::parse(TestHelper::QUEEN_FORM).unwrap();
        form["vocals"].set("freddie").unwrap();
        assert_eq!(form["vocals"].value(), "freddie");

        form.set("bass", "John").unwrap();
        assert_eq!(form["bass"].value(), "John");

        form.set("drums", "John").unwrap();
        assert_eq!(form["drums"].value(), "john");

        assert!(matches!(
            form.set("keyboard", "x"),
            Err(FormError::FieldNotFound(_))
        ));
        assert!(matches!(
            form.set("drums", "ringo"),
            Err(FormError::UnknownOption { .. })
        ));
    }

    #[test]
    fn test_duplicate_plain_inputs() {
        let form =
            Form::parse(r#"<form><input name="a" value="x"/><input name="a" value="y"/></form>"#)
                .unwrap();
        assert_eq!(form.len(), 2);
        assert_eq!(form["a"].value(), "x");

        let payload = form.serialize(None).unwrap();
        assert_eq!(
            TestHelper::text_pairs(payload.data()),
            vec![("a", "x"), ("a", "y")]
        );
    }

    #[test]
    fn test_serialize() {
        let form = Form::parse(TestHelper::QUEEN_FORM).unwrap();
        let payload = form.serialize(None).unwrap();
        let multi: Vec<_> = payload
            .get_all("multi")
            .into_iter()
            .filter_map(PayloadValue::as_text)
            .collect();
        assert_eq!(multi, vec!["multi1", "multi2"]);
        assert_eq!(payload.get("submit").and_then(PayloadValue::as_text), Some("submit"));
        assert_eq!(payload.get("drums").and_then(PayloadValue::as_text), Some("roger"));
        // file input goes to its own channel
        assert!(!payload.contains("guitar"));
        assert_eq!(payload.channel("files").unwrap().len(), 1);
    }

    #[test]
    fn test_serialize_skips_disabled() {
        let form = Form::parse(
            r#"<form>
                <input name="vocals" />
                <input name="guitar" disabled />
                <input type="submit" name="submit" value="submit" />
            </form>"#,
        )
        .unwrap();
        assert!(form.get("guitar").is_some());

        let payload = form.serialize(None).unwrap();
        assert!(payload.contains("vocals"));
        assert!(!payload.contains("guitar"));
    }

    #[test]
    fn test_multi_submit_requires_choice() {
        let form = Form::parse(TestHelper::MULTI_SUBMIT_FORM).unwrap();
        assert_eq!(form.submit_fields().len(), 2);
        assert!(matches!(
            form.serialize(None),
            Err(FormError::InvalidSubmit(_))
        ));
    }

    #[test]
    fn test_multi_submit_foreign_submit() {
        let form = Form::parse(TestHelper::MULTI_SUBMIT_FORM).unwrap();
        let fake = Submit::parse(r#"<input type="submit" name="fake" />"#).unwrap();
        assert!(matches!(
            form.serialize(Some(&fake)),
            Err(FormError::InvalidSubmit(_))
        ));

        // a structurally identical copy is still not one of the form's own
        let copy = form.submit_field("submit1").unwrap().clone();
        assert!(matches!(
            form.serialize(Some(&copy)),
            Err(FormError::InvalidSubmit(_))
        ));
    }

    #[test]
    fn test_multi_submit_chosen() {
        let form = Form::parse(TestHelper::MULTI_SUBMIT_FORM).unwrap();
        let submit = form.submit_field("submit1").unwrap();
        let payload = form.serialize(Some(submit)).unwrap();
        assert_eq!(payload.get("submit1").and_then(PayloadValue::as_text), Some("value1"));
        assert!(!payload.contains("submit2"));
        assert!(payload.contains("note"));
    }

    #[test]
    fn test_single_submit_is_unfiltered() {
        let form = Form::parse(
            r#"<form><input name="q" value="rust" /><input type="submit" name="go" value="Go" /></form>"#,
        )
        .unwrap();
        let payload = form.serialize(None).unwrap();
        assert_eq!(
            TestHelper::text_pairs(payload.data()),
            vec![("q", "rust"), ("go", "Go")]
        );
    }
}
