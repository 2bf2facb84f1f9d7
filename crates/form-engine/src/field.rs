//! Field definitions -- the unit of a dynamic form.
//!
//! A field is a loosely shaped JSON object on the wire (`{"id", "type",
//! "label", ...}`) but a closed union in Rust: the `type` tag selects a
//! [`FieldKind`] variant, and type-specific constraints (bounds, patterns,
//! file rules) live only on the variant that uses them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::visibility::VisibilityRule;

/// Current answers of a form session, keyed by field id.
///
/// Insertion ordered, so values are reported in the order they were entered.
pub type FormData = Map<String, Value>;

/// A single configurable input or display unit in a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Unique id. Empty on the wire means "use `name`" (see [`Self::normalized`]).
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub required: bool,
    /// Ordered ids of the fields nested under this one (groups and steps).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<VisibilityRule>,
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl FieldDefinition {
    /// Create a field with the given id, label and kind and no other settings.
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            id: id.into(),
            name: None,
            label: label.into(),
            required: false,
            children: Vec::new(),
            visibility: None,
            kind,
        }
    }

    /// Mark the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the ordered child ids.
    pub fn with_children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.children = children.into_iter().map(Into::into).collect();
        self
    }

    /// Attach a visibility rule.
    pub fn with_visibility(mut self, rule: VisibilityRule) -> Self {
        self.visibility = Some(rule);
        self
    }

    /// Fill an empty `id` from `name`.
    pub fn normalized(mut self) -> Self {
        if self.id.is_empty() {
            if let Some(name) = &self.name {
                self.id = name.clone();
            }
        }
        self
    }

    /// The id used to look this field up, falling back to `name`.
    ///
    /// `None` when the field has neither.
    pub fn key(&self) -> Option<&str> {
        if !self.id.is_empty() {
            Some(&self.id)
        } else {
            self.name.as_deref().filter(|name| !name.is_empty())
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, FieldKind::Group)
    }

    pub fn is_step(&self) -> bool {
        matches!(self.kind, FieldKind::Step)
    }
}

/// The field type discriminator, with per-type constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Text(TextRules),
    Email,
    Number(NumberRules),
    Select,
    Radio,
    Checkbox(SelectionRules),
    Textarea,
    Date(DateRules),
    File(FileRules),
    Rating,
    Image,
    Video,
    Divider,
    /// Nests its `children` without paging.
    Group,
    /// Groups its `children` into one page of a multi-step form.
    Step,
    GuestRepeater,
}

impl FieldKind {
    /// The wire name of this kind (the `type` tag).
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Email => "email",
            Self::Number(_) => "number",
            Self::Select => "select",
            Self::Radio => "radio",
            Self::Checkbox(_) => "checkbox",
            Self::Textarea => "textarea",
            Self::Date(_) => "date",
            Self::File(_) => "file",
            Self::Rating => "rating",
            Self::Image => "image",
            Self::Video => "video",
            Self::Divider => "divider",
            Self::Group => "group",
            Self::Step => "step",
            Self::GuestRepeater => "guest_repeater",
        }
    }

    /// Layout and media kinds that never carry a user answer.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::Divider | Self::Image | Self::Video | Self::Step | Self::Group
        )
    }
}

/// Length and pattern constraints for `text` fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Message reported when `pattern` does not match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_message: Option<String>,
}

/// Inclusive bounds for `number` fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumberRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// Selection-count bounds for `checkbox` fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_selection: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_selection: Option<usize>,
}

/// Date bounds for `date` fields, as date strings (e.g. `2024-05-01`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_date: Option<String>,
}

/// Upload constraints for `file` fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRules {
    /// Space-separated extension allow-list, e.g. `".pdf .png"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_file_types: Option<String>,
    /// Maximum size per file, in megabytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_file_size: Option<f64>,
}
