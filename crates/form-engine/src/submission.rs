//! Formatting answers for generic (non-booking) form submission.

use std::fmt;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::field::{FieldDefinition, FieldKind, FormData};

/// Identifier of a form config; backends use numeric or string ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormId {
    Numeric(u64),
    Text(String),
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{}", id),
            Self::Text(id) => f.write_str(id),
        }
    }
}

/// Options attached to a form config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSettings {
    #[serde(default)]
    pub include_user_agent: bool,
}

/// A form as served by the backend: identity, fields and settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormConfig {
    pub id: FormId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
    #[serde(default)]
    pub settings: FormSettings,
}

/// Body posted to a form's submission endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionData {
    pub form_id: FormId,
    pub form_name: String,
    pub fields: Map<String, Value>,
    /// RFC 3339 UTC timestamp with millisecond precision.
    pub submitted_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// Project answers onto the given fields, skipping null or missing values.
///
/// With `include_metadata` each entry is `{type, label, value}`; otherwise it
/// is the bare value.
pub fn format_form_data(
    data: &FormData,
    fields: &[FieldDefinition],
    include_metadata: bool,
) -> Map<String, Value> {
    let mut formatted = Map::new();

    for field in fields {
        let Some(value) = data.get(&field.id).filter(|value| !value.is_null()) else {
            continue;
        };
        let entry = if include_metadata {
            json!({
                "type": field.kind.type_name(),
                "label": field.label,
                "value": value,
            })
        } else {
            value.clone()
        };
        formatted.insert(field.id.clone(), entry);
    }

    formatted
}

/// Build the submission body for a form.
///
/// Answers are keyed by field id (or name when the id is empty). Guest
/// repeater answers that are not arrays are replaced with `[]`. The user agent
/// is recorded only when the form's settings ask for it.
pub fn prepare_submission_data(
    data: &FormData,
    fields: &[FieldDefinition],
    config: &FormConfig,
    user_agent: Option<&str>,
) -> SubmissionData {
    let mut submitted = Map::new();

    for field in fields {
        let Some(key) = field.key() else {
            continue;
        };
        let Some(value) = data.get(key).filter(|value| !value.is_null()) else {
            continue;
        };
        let value = match (&field.kind, value) {
            (FieldKind::GuestRepeater, Value::Array(_)) => value.clone(),
            (FieldKind::GuestRepeater, _) => Value::Array(Vec::new()),
            _ => value.clone(),
        };
        submitted.insert(key.to_string(), value);
    }

    SubmissionData {
        form_id: config.id.clone(),
        form_name: config.name.clone(),
        fields: submitted,
        submitted_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        user_agent: user_agent
            .filter(|_| config.settings.include_user_agent)
            .map(str::to_string),
    }
}
