use crate::core::{FormControl, FILES_CHANNEL};
use crate::dom::{DomElement, DomProcessor};
use crate::errors::{FormError, Result};
use crate::forms::options::{Checkbox, MultiSelect, Radio, Select};
use crate::forms::parser::build_field;
use crate::types::{FieldValue, FileHandle, Pairs, PayloadValue};
use std::collections::VecDeque;
use tracing::trace;

pub(crate) fn name_of(tag: &DomElement) -> Result<String> {
    tag.attr("name")
        .map(str::to_string)
        .ok_or_else(|| FormError::MissingName {
            tag: tag.tag_name.clone(),
        })
}

fn text_value(field: &str, value: FieldValue) -> Result<String> {
    match value {
        FieldValue::Text(text) => Ok(text),
        other => Err(FormError::invalid_value(
            field,
            format!("expected text, got {}", other.kind()),
        )),
    }
}

/// Single-line control; also the fallback for unrecognized `<input>` types.
#[derive(Debug, Clone)]
pub struct Input {
    name: String,
    tag: DomElement,
    value: Option<String>,
}

impl Input {
    pub fn new(tag: DomElement) -> Result<Self> {
        let name = name_of(&tag)?;
        let value = tag.attr("value").map(str::to_string);
        Ok(Self { name, tag, value })
    }

    pub fn parse(html: &str) -> Result<Self> {
        Self::new(DomProcessor::parse_fragment(html)?)
    }

    pub fn tag(&self) -> &DomElement {
        &self.tag
    }

    pub fn value(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }

    pub fn set(&mut self, value: impl Into<String>) {
        self.value = Some(value.into());
    }
}

impl FormControl for Input {
    fn name(&self) -> &str {
        &self.name
    }

    fn disabled(&self) -> bool {
        self.tag.has_attr("disabled")
    }

    fn value(&self) -> FieldValue {
        FieldValue::Text(Input::value(self).to_string())
    }

    fn set_value(&mut self, value: FieldValue) -> Result<()> {
        self.value = Some(text_value(&self.name, value)?);
        Ok(())
    }

    fn serialize(&self) -> Pairs {
        vec![(self.name.clone(), PayloadValue::Text(Input::value(self).to_string()))]
    }
}

/// `<input type="submit">`.
#[derive(Debug, Clone)]
pub struct Submit {
    input: Input,
}

impl Submit {
    pub fn new(tag: DomElement) -> Result<Self> {
        Ok(Self {
            input: Input::new(tag)?,
        })
    }

    pub fn parse(html: &str) -> Result<Self> {
        Self::new(DomProcessor::parse_fragment(html)?)
    }

    pub fn tag(&self) -> &DomElement {
        self.input.tag()
    }

    pub fn value(&self) -> &str {
        self.input.value()
    }
}

impl FormControl for Submit {
    fn name(&self) -> &str {
        self.input.name()
    }

    fn disabled(&self) -> bool {
        self.input.disabled()
    }

    fn value(&self) -> FieldValue {
        FormControl::value(&self.input)
    }

    fn set_value(&mut self, value: FieldValue) -> Result<()> {
        self.input.set_value(value)
    }

    fn serialize(&self) -> Pairs {
        self.input.serialize()
    }

    fn is_submit(&self) -> bool {
        true
    }
}

/// `<textarea>`; the initial value is the tag's text with trailing CR/LF removed.
#[derive(Debug, Clone)]
pub struct Textarea {
    name: String,
    tag: DomElement,
    value: String,
}

impl Textarea {
    pub fn new(tag: DomElement) -> Result<Self> {
        let name = name_of(&tag)?;
        let value = tag
            .text()
            .trim_end_matches('\r')
            .trim_end_matches('\n')
            .to_string();
        Ok(Self { name, tag, value })
    }

    pub fn parse(html: &str) -> Result<Self> {
        Self::new(DomProcessor::parse_fragment(html)?)
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl FormControl for Textarea {
    fn name(&self) -> &str {
        &self.name
    }

    fn disabled(&self) -> bool {
        self.tag.has_attr("disabled")
    }

    fn value(&self) -> FieldValue {
        FieldValue::Text(self.value.clone())
    }

    fn set_value(&mut self, value: FieldValue) -> Result<()> {
        self.value = text_value(&self.name, value)?;
        Ok(())
    }

    fn serialize(&self) -> Pairs {
        vec![(self.name.clone(), PayloadValue::Text(self.value.clone()))]
    }
}

/// `<input type="file">`, serialized into the files channel.
#[derive(Debug, Clone)]
pub struct FileInput {
    name: String,
    tag: DomElement,
    value: Option<FileHandle>,
}

impl FileInput {
    pub fn new(tag: DomElement) -> Result<Self> {
        let name = name_of(&tag)?;
        Ok(Self {
            name,
            tag,
            value: None,
        })
    }

    pub fn parse(html: &str) -> Result<Self> {
        Self::new(DomProcessor::parse_fragment(html)?)
    }

    pub fn file(&self) -> Option<&FileHandle> {
        self.value.as_ref()
    }
}

impl FormControl for FileInput {
    fn name(&self) -> &str {
        &self.name
    }

    fn disabled(&self) -> bool {
        self.tag.has_attr("disabled")
    }

    fn payload_key(&self) -> Option<&str> {
        Some(FILES_CHANNEL)
    }

    fn value(&self) -> FieldValue {
        match &self.value {
            Some(handle) => FieldValue::File(handle.clone()),
            None => FieldValue::Text(String::new()),
        }
    }

    /// Streams are stored as-is; text is a path opened for reading now.
    fn set_value(&mut self, value: FieldValue) -> Result<()> {
        let handle = match value {
            FieldValue::File(handle) => handle,
            FieldValue::Text(path) => FileHandle::open(&path)?,
            FieldValue::List(_) => {
                return Err(FormError::BadFileValue(format!(
                    "list assigned to field {:?}",
                    self.name
                )))
            }
        };
        self.value = Some(handle);
        Ok(())
    }

    fn serialize(&self) -> Pairs {
        let value = match &self.value {
            Some(handle) => PayloadValue::File(handle.clone()),
            None => PayloadValue::Text(String::new()),
        };
        vec![(self.name.clone(), value)]
    }
}

/// Closed set of form control variants.
#[derive(Debug, Clone)]
pub enum Field {
    Input(Input),
    Submit(Submit),
    FileInput(FileInput),
    Textarea(Textarea),
    Radio(Radio),
    Checkbox(Checkbox),
    Select(Select),
    MultiSelect(MultiSelect),
}

macro_rules! dispatch {
    ($self:expr, $field:ident => $body:expr) => {
        match $self {
            Field::Input($field) => $body,
            Field::Submit($field) => $body,
            Field::FileInput($field) => $body,
            Field::Textarea($field) => $body,
            Field::Radio($field) => $body,
            Field::Checkbox($field) => $body,
            Field::Select($field) => $body,
            Field::MultiSelect($field) => $body,
        }
    };
}

impl Field {
    /// Build a field from one control tag.
    ///
    /// Radio and checkbox tags become single-option groups; use the parser to
    /// merge adjacent tags sharing a name.
    pub fn from_element(tag: &DomElement) -> Result<Self> {
        let field = build_field(tag, &mut VecDeque::new())?.ok_or_else(|| {
            FormError::InvalidFieldType(format!("<{}> is not a form control", tag.tag_name))
        })?;
        trace!(name = field.name(), kind = field.kind(), "built field");
        Ok(field)
    }

    pub fn parse(html: &str) -> Result<Self> {
        Self::from_element(&DomProcessor::parse_fragment(html)?)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Field::Input(_) => "input",
            Field::Submit(_) => "submit",
            Field::FileInput(_) => "file",
            Field::Textarea(_) => "textarea",
            Field::Radio(_) => "radio",
            Field::Checkbox(_) => "checkbox",
            Field::Select(_) => "select",
            Field::MultiSelect(_) => "multiselect",
        }
    }

    pub fn as_submit(&self) -> Option<&Submit> {
        match self {
            Field::Submit(submit) => Some(submit),
            _ => None,
        }
    }

    pub fn as_checkbox_mut(&mut self) -> Option<&mut Checkbox> {
        match self {
            Field::Checkbox(checkbox) => Some(checkbox),
            _ => None,
        }
    }

    pub fn as_multi_select_mut(&mut self) -> Option<&mut MultiSelect> {
        match self {
            Field::MultiSelect(select) => Some(select),
            _ => None,
        }
    }

    /// Option values for option-bearing fields, empty otherwise.
    pub fn options(&self) -> &[String] {
        match self {
            Field::Radio(field) => field.options(),
            Field::Checkbox(field) => field.options(),
            Field::Select(field) => field.options(),
            Field::MultiSelect(field) => field.options(),
            _ => &[],
        }
    }

    /// Convenience over `set_value` accepting anything convertible.
    pub fn set(&mut self, value: impl Into<FieldValue>) -> Result<()> {
        self.set_value(value.into())
    }
}

impl FormControl for Field {
    fn name(&self) -> &str {
        dispatch!(self, field => field.name())
    }

    fn disabled(&self) -> bool {
        dispatch!(self, field => field.disabled())
    }

    fn payload_key(&self) -> Option<&str> {
        dispatch!(self, field => field.payload_key())
    }

    fn value(&self) -> FieldValue {
        dispatch!(self, field => FormControl::value(field))
    }

    fn set_value(&mut self, value: FieldValue) -> Result<()> {
        dispatch!(self, field => field.set_value(value))
    }

    fn serialize(&self) -> Pairs {
        dispatch!(self, field => field.serialize())
    }

    fn is_submit(&self) -> bool {
        dispatch!(self, field => field.is_submit())
    }
}

macro_rules! impl_from_variant {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Field {
                fn from(field: $variant) -> Self {
                    Field::$variant(field)
                }
            }
        )*
    };
}

impl_from_variant!(Input, Submit, FileInput, Textarea, Radio, Checkbox, Select, MultiSelect);
