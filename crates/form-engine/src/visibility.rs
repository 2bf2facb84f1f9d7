//! Conditional field visibility.
//!
//! A field may carry a [`VisibilityRule`]: a list of conditions over other
//! fields' current answers, combined with `all` (AND) or `any` (OR). Fields
//! without a rule are always shown. Visibility of a group gates its whole
//! subtree: children of a hidden group are never evaluated.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::field::{FieldDefinition, FormData};
use crate::schema::FormSchema;
use crate::value::{display_string, is_falsy_or_empty, loose_eq, to_number};

/// How a rule's condition results are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Logic {
    /// Every condition must pass.
    All,
    /// At least one condition must pass.
    #[default]
    Any,
}

/// Comparison applied by a [`Condition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Equals,
    NotEquals,
    /// Substring test for strings, membership test for arrays.
    Contains,
    GreaterThan,
    LessThan,
    IsEmpty,
    IsNotEmpty,
    /// An operator this engine does not know; always passes.
    #[serde(other)]
    Unknown,
}

/// One test against another field's current answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Id of the field whose answer is tested.
    pub field: String,
    pub operator: Operator,
    #[serde(default)]
    pub value: Value,
}

impl Condition {
    pub fn new(field: impl Into<String>, operator: Operator, value: Value) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    /// Evaluate against the current answers. A missing answer behaves like an
    /// undefined value: empty, unequal to anything but null, and not numeric.
    pub fn evaluate(&self, data: &FormData) -> bool {
        let answer = data.get(&self.field);
        match self.operator {
            Operator::Equals => loose_eq(answer.unwrap_or(&Value::Null), &self.value),
            Operator::NotEquals => !loose_eq(answer.unwrap_or(&Value::Null), &self.value),
            Operator::Contains => contains(answer, &self.value),
            Operator::GreaterThan => to_number(answer) > to_number(Some(&self.value)),
            Operator::LessThan => to_number(answer) < to_number(Some(&self.value)),
            Operator::IsEmpty => is_falsy_or_empty(answer),
            Operator::IsNotEmpty => !is_falsy_or_empty(answer),
            Operator::Unknown => true,
        }
    }
}

/// Non-string, non-array answers never contain anything.
fn contains(answer: Option<&Value>, needle: &Value) -> bool {
    match answer {
        Some(Value::String(haystack)) => haystack.contains(&display_string(needle)),
        Some(Value::Array(items)) => items.iter().any(|item| loose_eq(item, needle)),
        _ => false,
    }
}

/// A boolean expression over other fields' answers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VisibilityRule {
    #[serde(default)]
    pub logic: Logic,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl VisibilityRule {
    pub fn all(conditions: Vec<Condition>) -> Self {
        Self {
            logic: Logic::All,
            conditions,
        }
    }

    pub fn any(conditions: Vec<Condition>) -> Self {
        Self {
            logic: Logic::Any,
            conditions,
        }
    }

    /// An empty condition list passes under either logic.
    pub fn evaluate(&self, data: &FormData) -> bool {
        if self.conditions.is_empty() {
            return true;
        }
        match self.logic {
            Logic::All => self.conditions.iter().all(|c| c.evaluate(data)),
            Logic::Any => self.conditions.iter().any(|c| c.evaluate(data)),
        }
    }
}

/// Whether a single field is shown, ignoring its ancestors.
pub fn is_visible(field: &FieldDefinition, data: &FormData) -> bool {
    field
        .visibility
        .as_ref()
        .is_none_or(|rule| rule.evaluate(data))
}

/// Collect the shown fields, descending into visible groups.
///
/// Traversal is depth-first pre-order: a visible group is followed by its
/// visible descendants before the next sibling. A field listed more than once
/// in one traversal is emitted only the first time.
pub fn visible_fields<'a, I>(
    fields: I,
    data: &FormData,
    schema: &'a FormSchema,
) -> Vec<&'a FieldDefinition>
where
    I: IntoIterator<Item = &'a FieldDefinition>,
{
    let mut visible = Vec::new();
    let mut seen = HashSet::new();
    for field in fields {
        collect_visible(field, data, schema, &mut visible, &mut seen);
    }
    visible
}

/// Every shown field of a form: root fields, then the pages of visible steps.
pub fn visible_form_fields<'a>(
    schema: &'a FormSchema,
    data: &FormData,
) -> Vec<&'a FieldDefinition> {
    let pages = schema
        .steps()
        .into_iter()
        .filter(|step| is_visible(step, data))
        .flat_map(|step| schema.step_fields(step));
    visible_fields(schema.root_fields().into_iter().chain(pages), data, schema)
}

fn collect_visible<'a>(
    field: &'a FieldDefinition,
    data: &FormData,
    schema: &'a FormSchema,
    visible: &mut Vec<&'a FieldDefinition>,
    seen: &mut HashSet<&'a str>,
) {
    if !field.id.is_empty() && !seen.insert(field.id.as_str()) {
        return;
    }
    if !is_visible(field, data) {
        return;
    }

    visible.push(field);

    if field.is_group() {
        for child in schema.children(field) {
            collect_visible(child, data, schema, visible, seen);
        }
    }
}
