use crate::core::config::ParserConfig;
use crate::core::FormControl;
use crate::dom::DomElement;
use crate::errors::{FormError, Result};
use crate::forms::fields::{FileInput, Input, Submit, Textarea};
use crate::forms::options::{Checkbox, MultiSelect, Radio, Select};
use crate::forms::Field;
use std::collections::VecDeque;
use tracing::{debug, trace};

/// Tags that define form controls.
pub const FIELD_TAGS: [&str; 3] = ["input", "textarea", "select"];

fn lowercase_name(tag: &DomElement) -> Option<String> {
    tag.attr("name").map(str::to_lowercase)
}

/// Pull the run of queued tags directly after `first` that share its name.
///
/// Only adjacent tags are merged: a same-named tag separated from the group by
/// any other control starts a new group.
fn group_flat_tags(first: &DomElement, queue: &mut VecDeque<&DomElement>) -> Vec<DomElement> {
    let name = lowercase_name(first);
    let mut grouped = vec![first.clone()];
    while let Some(next) = queue.front() {
        if name.is_none() || lowercase_name(next) != name {
            break;
        }
        if let Some(tag) = queue.pop_front() {
            grouped.push(tag.clone());
        }
    }
    grouped
}

pub(crate) fn build_field(tag: &DomElement, queue: &mut VecDeque<&DomElement>) -> Result<Option<Field>> {
    let field = match tag.tag_name.as_str() {
        "input" => match tag.attr_or("type", "").to_ascii_lowercase().as_str() {
            "submit" => Field::Submit(Submit::new(tag.clone())?),
            "file" => Field::FileInput(FileInput::new(tag.clone())?),
            "radio" => Field::Radio(Radio::from_tags(group_flat_tags(tag, queue))?),
            "checkbox" => Field::Checkbox(Checkbox::from_tags(group_flat_tags(tag, queue))?),
            _ => Field::Input(Input::new(tag.clone())?),
        },
        "textarea" => Field::Textarea(Textarea::new(tag.clone())?),
        "select" if tag.has_attr("multiple") => {
            Field::MultiSelect(MultiSelect::from_tag(tag.clone())?)
        }
        "select" => Field::Select(Select::from_tag(tag.clone())?),
        _ => return Ok(None),
    };
    Ok(Some(field))
}

/// Parse the controls under `root` into fields, in document order.
///
/// Unnamed controls are skipped unless `config.strict_names` is set, in which
/// case the first one aborts parsing.
pub fn parse_fields(root: &DomElement, config: &ParserConfig) -> Result<Vec<Field>> {
    let mut queue: VecDeque<&DomElement> = root.find_all(&FIELD_TAGS).into();
    let mut fields = Vec::new();

    while let Some(tag) = queue.pop_front() {
        match build_field(tag, &mut queue) {
            Ok(Some(field)) => {
                trace!(name = field.name(), kind = field.kind(), "parsed field");
                fields.push(field);
            }
            Ok(None) => {}
            Err(FormError::MissingName { tag: tag_name }) if !config.strict_names => {
                debug!(tag = %tag_name, "skipping unnamed form control");
            }
            Err(err) => return Err(err),
        }
    }

    Ok(fields)
}
