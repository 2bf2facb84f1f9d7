//! Field validation and form/step validation reports.
//!
//! Validation errors are data, not failures: each field yields a list of
//! human-readable messages, and an empty list means the answer is valid.
//!
//! Rules per field:
//!
//! 1. Structural kinds (`divider`, `image`, `video`, `step`, `group`) are never
//!    validated.
//! 2. A required field with an empty answer reports only `"<label> is
//!    required"`; no type-specific rule runs for it.
//! 3. An empty optional answer is valid.
//! 4. Otherwise the rules of the field's kind apply.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::field::{
    DateRules, FieldDefinition, FieldKind, FileRules, FormData, NumberRules, SelectionRules,
    TextRules,
};
use crate::value::{display_string, format_number, is_blank, to_number};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid"));

const BYTES_PER_MEGABYTE: f64 = 1024.0 * 1024.0;

/// Aggregated validation result for a set of fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Messages per field id; fields without errors are absent.
    pub errors: BTreeMap<String, Vec<String>>,
    pub has_errors: bool,
}

impl ValidationReport {
    /// Messages for one field, empty when it passed.
    pub fn field_errors(&self, id: &str) -> &[String] {
        self.errors.get(id).map_or(&[], Vec::as_slice)
    }
}

/// Validate one answer against one field definition.
///
/// Deterministic and side-effect free.
pub fn validate_field(field: &FieldDefinition, value: &Value) -> Vec<String> {
    if field.kind.is_structural() {
        return Vec::new();
    }

    if is_blank(value) {
        if field.required {
            return vec![format!("{} is required", field.label)];
        }
        return Vec::new();
    }

    match &field.kind {
        FieldKind::Email => validate_email(value),
        FieldKind::Number(rules) => validate_number(rules, value),
        FieldKind::Text(rules) => validate_text(rules, value),
        FieldKind::File(rules) => validate_files(rules, value),
        FieldKind::Date(rules) => validate_date(rules, value),
        FieldKind::Checkbox(rules) => validate_selection(rules, value),
        FieldKind::Select
        | FieldKind::Radio
        | FieldKind::Textarea
        | FieldKind::Rating
        | FieldKind::GuestRepeater => Vec::new(),
        FieldKind::Image
        | FieldKind::Video
        | FieldKind::Divider
        | FieldKind::Group
        | FieldKind::Step => Vec::new(),
    }
}

/// Validate every shown field of a form.
///
/// Pass the output of [`crate::visible_fields`] so hidden fields are not
/// reported.
pub fn validate_form<'a, I>(visible: I, data: &FormData) -> ValidationReport
where
    I: IntoIterator<Item = &'a FieldDefinition>,
{
    collect_report(visible, data)
}

/// Validate the fields of a single step before advancing past it.
pub fn validate_step<'a, I>(step_fields: I, data: &FormData) -> ValidationReport
where
    I: IntoIterator<Item = &'a FieldDefinition>,
{
    collect_report(step_fields, data)
}

fn collect_report<'a, I>(fields: I, data: &FormData) -> ValidationReport
where
    I: IntoIterator<Item = &'a FieldDefinition>,
{
    let mut report = ValidationReport::default();

    for field in fields {
        if field.kind.is_structural() {
            continue;
        }
        let value = data.get(&field.id).unwrap_or(&Value::Null);
        let errors = validate_field(field, value);
        if !errors.is_empty() {
            report.errors.insert(field.id.clone(), errors);
            report.has_errors = true;
        }
    }

    report
}

fn validate_email(value: &Value) -> Vec<String> {
    let valid = value.as_str().is_some_and(|email| EMAIL_RE.is_match(email));
    if valid {
        Vec::new()
    } else {
        vec!["Please enter a valid email address".to_string()]
    }
}

fn validate_number(rules: &NumberRules, value: &Value) -> Vec<String> {
    let number = to_number(Some(value));
    if number.is_nan() {
        return vec!["Please enter a valid number".to_string()];
    }

    let mut errors = Vec::new();
    if let Some(min) = rules.min {
        if number < min {
            errors.push(format!("Value must be at least {}", format_number(min)));
        }
    }
    if let Some(max) = rules.max {
        if number > max {
            errors.push(format!("Value must be at most {}", format_number(max)));
        }
    }
    errors
}

fn validate_text(rules: &TextRules, value: &Value) -> Vec<String> {
    let text = display_string(value);
    let length = text.chars().count();
    let mut errors = Vec::new();

    if let Some(min) = rules.min_length.filter(|&min| min > 0) {
        if length < min {
            errors.push(format!("Must be at least {} characters", min));
        }
    }
    if let Some(max) = rules.max_length.filter(|&max| max > 0) {
        if length > max {
            errors.push(format!("Must be at most {} characters", max));
        }
    }
    // An uncompilable pattern is a config mistake, not a user error; skip it.
    if let Some(pattern) = rules.pattern.as_deref().filter(|p| !p.is_empty()) {
        if let Ok(regex) = Regex::new(pattern) {
            if !regex.is_match(&text) {
                errors.push(
                    rules
                        .pattern_message
                        .clone()
                        .unwrap_or_else(|| "Invalid format".to_string()),
                );
            }
        }
    }
    errors
}

fn validate_files(rules: &FileRules, value: &Value) -> Vec<String> {
    let files: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        single => vec![single],
    };

    let accepted: Option<Vec<String>> = rules
        .accepted_file_types
        .as_deref()
        .filter(|types| !types.trim().is_empty())
        .map(|types| types.split_whitespace().map(str::to_lowercase).collect());

    let mut errors = Vec::new();
    for file in files {
        let (name, size) = file_name_and_size(file);

        if let (Some(max_mb), Some(size)) = (rules.max_file_size.filter(|&mb| mb > 0.0), size) {
            if size > max_mb * BYTES_PER_MEGABYTE {
                errors.push(format!(
                    "File size must be less than {}MB",
                    format_number(max_mb)
                ));
            }
        }

        if let (Some(accepted), Some(types)) = (&accepted, &rules.accepted_file_types) {
            let extension = format!(
                ".{}",
                name.rsplit('.').next().unwrap_or_default().to_lowercase()
            );
            if !accepted.contains(&extension) {
                errors.push(format!("File type must be: {}", types));
            }
        }
    }
    errors
}

/// A file answer is `{name, size}`; a bare string is taken as a file name.
fn file_name_and_size(file: &Value) -> (&str, Option<f64>) {
    match file {
        Value::Object(map) => (
            map.get("name").and_then(Value::as_str).unwrap_or_default(),
            map.get("size").and_then(Value::as_f64),
        ),
        Value::String(name) => (name.as_str(), None),
        _ => ("", None),
    }
}

fn validate_date(rules: &DateRules, value: &Value) -> Vec<String> {
    let Some(date) = parse_date_value(value) else {
        return vec!["Please enter a valid date".to_string()];
    };

    let mut errors = Vec::new();
    if let Some(min) = rules.min_date.as_deref().and_then(parse_date_str) {
        if date < min {
            errors.push(format!("Date must be after {}", short_date(min)));
        }
    }
    if let Some(max) = rules.max_date.as_deref().and_then(parse_date_str) {
        if date > max {
            errors.push(format!("Date must be before {}", short_date(max)));
        }
    }
    errors
}

/// Dates arrive as strings, or as epoch milliseconds from some pickers.
fn parse_date_value(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::String(text) => parse_date_str(text),
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .map(|dt| dt.naive_utc()),
        _ => None,
    }
}

fn parse_date_str(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
}

fn short_date(date: NaiveDateTime) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

fn validate_selection(rules: &SelectionRules, value: &Value) -> Vec<String> {
    let selected = match value {
        Value::Array(items) => items.len(),
        _ => 1,
    };

    let mut errors = Vec::new();
    if let Some(min) = rules.min_selection.filter(|&min| min > 0) {
        if selected < min {
            errors.push(format!("Please select at least {} options", min));
        }
    }
    if let Some(max) = rules.max_selection.filter(|&max| max > 0) {
        if selected > max {
            errors.push(format!("Please select at most {} options", max));
        }
    }
    errors
}
