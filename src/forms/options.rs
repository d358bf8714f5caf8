//! Option-bearing fields.
//!
//! A concrete field is the composition of two independent pieces: an
//! [`OptionSource`] describing how options are discovered from markup (a flat
//! group of `<input>` tags, or `<option>` children nested in a `<select>`), and
//! a [`Selection`] describing how the chosen value is stored (one index, or a
//! sorted list of indices). Values are stored as indices into `options` so two
//! options sharing a label or value never get confused with one another.

use crate::core::FormControl;
use crate::dom::{DomElement, DomProcessor};
use crate::errors::{FormError, Result};
use crate::forms::fields::name_of;
use crate::types::{FieldValue, Pairs, PayloadValue};
use std::marker::PhantomData;

/// Options discovered from markup, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionSet {
    pub options: Vec<String>,
    pub labels: Vec<Option<String>>,
    /// Indices of options marked `checked`/`selected`.
    pub initial: Vec<usize>,
}

impl OptionSet {
    fn push(&mut self, value: String, label: Option<String>, preselected: bool) {
        if preselected {
            self.initial.push(self.options.len());
        }
        self.options.push(value);
        self.labels.push(label);
    }
}

/// How a field finds its options in markup.
pub trait OptionSource {
    fn discover(tags: &[DomElement]) -> OptionSet;

    fn disabled(tags: &[DomElement]) -> bool;

    /// Index selected when nothing is preselected (single-choice only).
    fn fallback(_options: &OptionSet) -> Option<usize> {
        None
    }
}

/// Radio and checkbox groups: one `<input>` tag per option.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatOptions;

impl OptionSource for FlatOptions {
    fn discover(tags: &[DomElement]) -> OptionSet {
        let mut set = OptionSet::default();
        for tag in tags {
            let label = tag
                .trailing_text()
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(str::to_string);
            set.push(
                tag.attr_or("value", "on").to_string(),
                label,
                tag.has_attr("checked"),
            );
        }
        set
    }

    fn disabled(tags: &[DomElement]) -> bool {
        tags.iter().all(|tag| tag.has_attr("disabled"))
    }
}

/// Selects: `<option>` tags nested under a single `<select>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NestedOptions;

impl NestedOptions {
    fn option_tags(tags: &[DomElement]) -> Vec<&DomElement> {
        tags.iter().flat_map(|tag| tag.find_all(&["option"])).collect()
    }
}

impl OptionSource for NestedOptions {
    fn discover(tags: &[DomElement]) -> OptionSet {
        let mut set = OptionSet::default();
        for option in Self::option_tags(tags) {
            // browsers submit the stripped, whitespace-collapsed text
            let text = option.text().split_whitespace().collect::<Vec<_>>().join(" ");
            let value = option.attr("value").map(str::to_string).unwrap_or_else(|| text.clone());
            set.push(value, Some(text), option.has_attr("selected"));
        }
        set
    }

    fn disabled(tags: &[DomElement]) -> bool {
        tags.iter().any(|tag| tag.has_attr("disabled"))
            || Self::option_tags(tags)
                .iter()
                .all(|option| option.has_attr("disabled"))
    }

    fn fallback(options: &OptionSet) -> Option<usize> {
        if options.options.is_empty() {
            None
        } else {
            Some(0)
        }
    }
}

/// How a field stores its chosen option(s).
pub trait Selection: Clone {
    type Output;

    fn initial(initial: &[usize], fallback: Option<usize>) -> Self;

    fn get(&self, options: &[String]) -> Self::Output;

    /// Indices of the chosen options, ascending for multi-choice storage.
    fn selected(&self) -> Vec<usize>;

    fn to_field_value(&self, options: &[String]) -> FieldValue;

    fn assign<F>(&mut self, field: &str, value: FieldValue, resolve: F) -> Result<()>
    where
        F: Fn(&str) -> Result<usize>;

    /// Serialized value when nothing is chosen; `None` emits no pair.
    fn empty_pair() -> Option<String>;
}

/// One chosen option, or none.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SingleChoice(Option<usize>);

impl Selection for SingleChoice {
    type Output = String;

    fn initial(initial: &[usize], fallback: Option<usize>) -> Self {
        SingleChoice(initial.first().copied().or(fallback))
    }

    fn get(&self, options: &[String]) -> String {
        self.0
            .and_then(|index| options.get(index))
            .cloned()
            .unwrap_or_default()
    }

    fn selected(&self) -> Vec<usize> {
        self.0.into_iter().collect()
    }

    fn to_field_value(&self, options: &[String]) -> FieldValue {
        FieldValue::Text(self.get(options))
    }

    fn assign<F>(&mut self, field: &str, value: FieldValue, resolve: F) -> Result<()>
    where
        F: Fn(&str) -> Result<usize>,
    {
        match value {
            FieldValue::Text(text) => {
                self.0 = Some(resolve(&text)?);
                Ok(())
            }
            other => Err(FormError::invalid_value(
                field,
                format!("expected a single option, got {}", other.kind()),
            )),
        }
    }

    fn empty_pair() -> Option<String> {
        Some(String::new())
    }
}

/// Any number of chosen options, kept sorted by option order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiChoice(Vec<usize>);

impl MultiChoice {
    fn normalize(&mut self) {
        self.0.sort_unstable();
        self.0.dedup();
    }
}

impl Selection for MultiChoice {
    type Output = Vec<String>;

    fn initial(initial: &[usize], _fallback: Option<usize>) -> Self {
        let mut choice = MultiChoice(initial.to_vec());
        choice.normalize();
        choice
    }

    fn get(&self, options: &[String]) -> Vec<String> {
        self.0
            .iter()
            .filter_map(|index| options.get(*index))
            .cloned()
            .collect()
    }

    fn selected(&self) -> Vec<usize> {
        self.0.clone()
    }

    fn to_field_value(&self, options: &[String]) -> FieldValue {
        FieldValue::List(self.get(options))
    }

    fn assign<F>(&mut self, field: &str, value: FieldValue, resolve: F) -> Result<()>
    where
        F: Fn(&str) -> Result<usize>,
    {
        let indices = match value {
            FieldValue::Text(text) => vec![resolve(&text)?],
            FieldValue::List(items) => items
                .iter()
                .map(|item| resolve(item))
                .collect::<Result<Vec<_>>>()?,
            FieldValue::File(_) => {
                return Err(FormError::invalid_value(
                    field,
                    "expected options, got file",
                ))
            }
        };
        self.0 = indices;
        self.normalize();
        Ok(())
    }

    fn empty_pair() -> Option<String> {
        None
    }
}

/// A field backed by a discrete set of options.
#[derive(Debug, Clone)]
pub struct OptionField<S, V> {
    name: String,
    tags: Vec<DomElement>,
    options: Vec<String>,
    labels: Vec<Option<String>>,
    selection: V,
    source: PhantomData<S>,
}

pub type Radio = OptionField<FlatOptions, SingleChoice>;
pub type Checkbox = OptionField<FlatOptions, MultiChoice>;
pub type Select = OptionField<NestedOptions, SingleChoice>;
pub type MultiSelect = OptionField<NestedOptions, MultiChoice>;

impl<S: OptionSource, V: Selection> OptionField<S, V> {
    fn build(tags: Vec<DomElement>) -> Result<Self> {
        let first = tags
            .first()
            .ok_or_else(|| FormError::InvalidFieldType("empty option group".to_string()))?;
        let name = name_of(first)?;

        let set = S::discover(&tags);
        let selection = V::initial(&set.initial, S::fallback(&set));

        Ok(Self {
            name,
            tags,
            options: set.options,
            labels: set.labels,
            selection,
            source: PhantomData,
        })
    }

    pub fn tags(&self) -> &[DomElement] {
        &self.tags
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn labels(&self) -> &[Option<String>] {
        &self.labels
    }

    /// Indices into `options` of the current selection.
    pub fn selected_indices(&self) -> Vec<usize> {
        self.selection.selected()
    }

    pub fn value(&self) -> V::Output {
        self.selection.get(&self.options)
    }

    pub fn set(&mut self, value: impl Into<FieldValue>) -> Result<()> {
        self.set_value(value.into())
    }

    /// Resolve a caller-supplied value to an option index.
    ///
    /// Option values are matched first; a label is accepted only when exactly
    /// one option carries it.
    pub fn resolve(&self, value: &str) -> Result<usize> {
        if let Some(index) = self.options.iter().position(|option| option == value) {
            return Ok(index);
        }

        let matches: Vec<usize> = self
            .labels
            .iter()
            .enumerate()
            .filter(|(_, label)| label.as_deref() == Some(value))
            .map(|(index, _)| index)
            .collect();

        match matches.as_slice() {
            [index] => Ok(*index),
            [] => Err(FormError::UnknownOption {
                value: value.to_string(),
                field: self.name.clone(),
            }),
            _ => Err(FormError::AmbiguousLabel {
                value: value.to_string(),
                field: self.name.clone(),
                matches: matches.len(),
            }),
        }
    }
}

impl<V: Selection> OptionField<FlatOptions, V> {
    /// Build from a group of `<input>` tags sharing a name.
    pub fn from_tags(tags: Vec<DomElement>) -> Result<Self> {
        Self::build(tags)
    }

    pub fn parse(html: &str) -> Result<Self> {
        Self::from_tags(DomProcessor::fragment_elements(html, &["input"])?)
    }
}

impl<V: Selection> OptionField<NestedOptions, V> {
    /// Build from a `<select>` tag and its `<option>` children.
    pub fn from_tag(tag: DomElement) -> Result<Self> {
        Self::build(vec![tag])
    }

    pub fn parse(html: &str) -> Result<Self> {
        Self::from_tag(DomProcessor::parse_fragment(html)?)
    }
}

impl<S: OptionSource> OptionField<S, MultiChoice> {
    /// Add one option to the selection.
    pub fn append(&mut self, value: &str) -> Result<()> {
        let index = self.resolve(value)?;
        if self.selection.0.contains(&index) {
            return Err(FormError::AlreadySelected {
                value: value.to_string(),
                field: self.name.clone(),
            });
        }
        self.selection.0.push(index);
        self.selection.normalize();
        Ok(())
    }

    /// Drop one option from the selection.
    pub fn remove(&mut self, value: &str) -> Result<()> {
        let index = self.resolve(value)?;
        let position = self
            .selection
            .0
            .iter()
            .position(|selected| *selected == index)
            .ok_or_else(|| FormError::NotSelected {
                value: value.to_string(),
                field: self.name.clone(),
            })?;
        self.selection.0.remove(position);
        Ok(())
    }
}

impl<S: OptionSource, V: Selection> FormControl for OptionField<S, V> {
    fn name(&self) -> &str {
        &self.name
    }

    fn disabled(&self) -> bool {
        S::disabled(&self.tags)
    }

    fn value(&self) -> FieldValue {
        self.selection.to_field_value(&self.options)
    }

    fn set_value(&mut self, value: FieldValue) -> Result<()> {
        let mut selection = self.selection.clone();
        selection.assign(&self.name, value, |item| self.resolve(item))?;
        self.selection = selection;
        Ok(())
    }

    fn serialize(&self) -> Pairs {
        let selected = self.selection.selected();
        if selected.is_empty() {
            return V::empty_pair()
                .map(|empty| vec![(self.name.clone(), PayloadValue::Text(empty))])
                .unwrap_or_default();
        }

        selected
            .into_iter()
            .filter_map(|index| self.options.get(index))
            .map(|option| (self.name.clone(), PayloadValue::Text(option.clone())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestHelper;
    use proptest::prelude::*;

    #[test]
    fn test_select_initial_and_labels() {
        let mut select = Select::parse(TestHelper::SELECT_JOHN).unwrap();
        assert_eq!(select.name(), "john");
        assert_eq!(select.options(), ["tie", "you're", "the"]);
        assert_eq!(select.selected_indices(), vec![1]);
        assert_eq!(select.value(), "you're");

        select.set("the").unwrap();
        assert_eq!(select.selected_indices(), vec![2]);

        select.set("millionaire waltz").unwrap();
        assert_eq!(select.selected_indices(), vec![2]);
        assert_eq!(select.value(), "the");
        assert_eq!(TestHelper::text_pairs(&select.serialize()), vec![("john", "the")]);
    }

    #[test]
    fn test_select_defaults_to_first_option() {
        let select = Select::parse(
            r#"<select name="john">
                <option value="tie">your mother down</option>
                <option value="you're">my best friend</option>
            </select>"#,
        )
        .unwrap();
        assert_eq!(select.selected_indices(), vec![0]);
        assert_eq!(select.value(), "tie");
    }

    #[test]
    fn test_empty_select() {
        let select = Select::parse(r#"<select name="instrument"></select>"#).unwrap();
        assert!(select.options().is_empty());
        assert_eq!(select.value(), "");
        assert_eq!(TestHelper::text_pairs(&select.serialize()), vec![("instrument", "")]);
    }

    #[test]
    fn test_option_value_defaults_to_text() {
        let select = Select::parse(r#"<select name="select"><option>  opt  </option></select>"#).unwrap();
        assert_eq!(select.options(), ["opt"]);

        let multi =
            MultiSelect::parse(r#"<select name="select" multiple><option>opt</option></select>"#)
                .unwrap();
        assert_eq!(multi.options(), ["opt"]);
        assert!(multi.value().is_empty());
    }

    #[test]
    fn test_multi_select_selected() {
        let mut select = MultiSelect::parse(
            r#"<select name="john" multiple>
                <option value="tie">your mother down</option>
                <option value="you're" selected>my best friend</option>
                <option value="the" selected>millionaire waltz</option>
            </select>"#,
        )
        .unwrap();
        assert_eq!(select.value(), vec!["you're", "the"]);

        select.remove("you're").unwrap();
        select.append("your mother down").unwrap();
        assert_eq!(select.value(), vec!["tie", "the"]);
    }

    #[test]
    fn test_radio_options_and_initial() {
        let mut radio = Radio::parse(TestHelper::RADIO_MEMBERS).unwrap();
        assert_eq!(radio.name(), "members");
        assert_eq!(radio.options(), ["mercury", "may", "taylor", "deacon"]);
        assert_eq!(radio.labels()[2].as_deref(), Some("drums"));
        // first checked tag wins
        assert_eq!(radio.value(), "mercury");

        radio.set("taylor").unwrap();
        assert_eq!(radio.selected_indices(), vec![2]);

        radio.set("bass").unwrap();
        assert_eq!(radio.value(), "deacon");
        assert_eq!(TestHelper::text_pairs(&radio.serialize()), vec![("members", "deacon")]);
    }

    #[test]
    fn test_radio_blank() {
        let radio = Radio::parse(
            r#"<input type="radio" name="member" value="mercury" />vocals<br />
               <input type="radio" name="member" value="may" />guitar<br />"#,
        )
        .unwrap();
        assert_eq!(radio.value(), "");
        assert_eq!(TestHelper::text_pairs(&radio.serialize()), vec![("member", "")]);
    }

    #[test]
    fn test_radio_rejects_list() {
        let mut radio = Radio::parse(TestHelper::RADIO_MEMBERS).unwrap();
        assert!(matches!(
            radio.set(vec!["may", "taylor"]),
            Err(FormError::InvalidValue { .. })
        ));
        assert_eq!(radio.value(), "mercury");
    }

    #[test]
    fn test_checkbox_values() {
        let mut checkbox = Checkbox::parse(TestHelper::CHECKBOX_MEMBERS).unwrap();
        assert_eq!(checkbox.name(), "member");
        assert_eq!(checkbox.value(), vec!["mercury", "deacon"]);
        assert_eq!(
            TestHelper::text_pairs(&checkbox.serialize()),
            vec![("member", "mercury"), ("member", "deacon")]
        );

        checkbox.set("taylor").unwrap();
        assert_eq!(checkbox.selected_indices(), vec![2]);

        checkbox.set(vec!["deacon", "taylor"]).unwrap();
        assert_eq!(checkbox.selected_indices(), vec![2, 3]);
        assert_eq!(checkbox.value(), vec!["taylor", "deacon"]);

        checkbox.set("drums").unwrap();
        assert_eq!(checkbox.value(), vec!["taylor"]);
    }

    #[test]
    fn test_checkbox_append_remove() {
        let mut checkbox = Checkbox::parse(TestHelper::CHECKBOX_MEMBERS).unwrap();
        checkbox.append("may").unwrap();
        assert_eq!(checkbox.value(), vec!["mercury", "may", "deacon"]);

        assert!(matches!(
            checkbox.append("guitar"),
            Err(FormError::AlreadySelected { .. })
        ));

        checkbox.remove("mercury").unwrap();
        assert_eq!(checkbox.value(), vec!["may", "deacon"]);
        assert!(matches!(
            checkbox.remove("taylor"),
            Err(FormError::NotSelected { .. })
        ));
        assert!(matches!(
            checkbox.remove("freddie"),
            Err(FormError::UnknownOption { .. })
        ));
    }

    #[test]
    fn test_checkbox_blank_serializes_nothing() {
        let checkbox = Checkbox::parse(
            r#"<input type="checkbox" name="member" value="mercury" />vocals<br />"#,
        )
        .unwrap();
        assert!(checkbox.value().is_empty());
        assert!(checkbox.serialize().is_empty());
    }

    #[test]
    fn test_flat_default_value_is_on() {
        let checkbox = Checkbox::parse(r#"<input type="checkbox" name="checkbox" />"#).unwrap();
        assert_eq!(checkbox.options(), ["on"]);
        let radio = Radio::parse(r#"<input type="radio" name="radio" />"#).unwrap();
        assert_eq!(radio.options(), ["on"]);
    }

    #[test]
    fn test_mixed_case_markup() {
        let radio = Radio::parse(
            r#"<input TYPE="RADIO" NAME="members" value="mercury" />vocals<br />
               <input type="radio" NAME="members" value="may" />guitar<br />"#,
        )
        .unwrap();
        assert_eq!(radio.name(), "members");
        assert_eq!(radio.options(), ["mercury", "may"]);
    }

    #[test]
    fn test_unknown_option() {
        let mut select = Select::parse(TestHelper::SELECT_JOHN).unwrap();
        let err = select.set("bicycle").unwrap_err();
        assert!(matches!(err, FormError::UnknownOption { ref value, ref field }
            if value == "bicycle" && field == "john"));
        assert_eq!(select.value(), "you're");
    }

    #[test]
    fn test_ambiguous_label_is_an_error() {
        let mut select = Select::parse(
            r#"<select name="dup">
                <option value="a">Same</option>
                <option value="b">Same</option>
                <option value="c">Other</option>
            </select>"#,
        )
        .unwrap();
        assert!(matches!(
            select.set("Same"),
            Err(FormError::AmbiguousLabel { matches: 2, .. })
        ));
        select.set("Other").unwrap();
        assert_eq!(select.value(), "c");
    }

    #[test]
    fn test_duplicate_option_values_keep_document_order() {
        let select = Select::parse(
            r#"<select name="dup">
                <option value="x">first</option>
                <option value="x" selected>second</option>
            </select>"#,
        )
        .unwrap();
        assert_eq!(select.options(), ["x", "x"]);
        assert_eq!(select.selected_indices(), vec![1]);
    }

    #[test]
    fn test_disabled_rules() {
        let partly = Checkbox::parse(
            r#"<input type="checkbox" name="m" value="a" />
               <input type="checkbox" name="m" value="b" disabled />"#,
        )
        .unwrap();
        assert!(!partly.disabled());

        let fully = Checkbox::parse(
            r#"<input type="checkbox" name="m" value="a" disabled />
               <input type="checkbox" name="m" value="b" disabled />"#,
        )
        .unwrap();
        assert!(fully.disabled());

        assert!(!Select::parse(TestHelper::SELECT_JOHN).unwrap().disabled());
        let root = Select::parse(
            r#"<select name="john" disabled><option value="a">a</option></select>"#,
        )
        .unwrap();
        assert!(root.disabled());
        let options = Select::parse(
            r#"<select name="john">
                <option value="a" disabled>a</option>
                <option value="b" disabled>b</option>
            </select>"#,
        )
        .unwrap();
        assert!(options.disabled());
    }

    fn select_markup(values: &[String]) -> String {
        let options: String = values
            .iter()
            .map(|value| format!(r#"<option value="{0}">label {0}</option>"#, value))
            .collect();
        format!(r#"<select name="p">{}</select>"#, options)
    }

    proptest! {
        #[test]
        fn prop_setting_an_option_reports_it_back(
            values in prop::collection::btree_set("[a-z]{1,8}", 1..8),
            pick in any::<prop::sample::Index>(),
        ) {
            let values: Vec<String> = values.into_iter().collect();
            let mut select = Select::parse(&select_markup(&values)).unwrap();
            let chosen = pick.get(&values).clone();

            select.set(chosen.as_str()).unwrap();
            prop_assert_eq!(select.value(), chosen.clone());

            select.set(format!("label {}", chosen)).unwrap();
            prop_assert_eq!(select.value(), chosen);
        }

        #[test]
        fn prop_parsing_is_idempotent(values in prop::collection::vec("[a-z]{1,8}", 0..8)) {
            let markup = select_markup(&values);
            let first = MultiSelect::parse(&markup).unwrap();
            let second = MultiSelect::parse(&markup).unwrap();
            prop_assert_eq!(first.options(), second.options());
            prop_assert_eq!(first.labels(), second.labels());
            prop_assert_eq!(first.value(), second.value());
            prop_assert_eq!(first.options(), values.as_slice());
        }
    }
}
