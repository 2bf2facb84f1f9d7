//! Flat field list → structured form schema.
//!
//! Fields reference their children by id only, so the schema is an arena
//! (the normalized field list) plus index lists into it: an id lookup table,
//! the root-level fields, and the steps of a multi-step form.

use std::collections::{HashMap, HashSet};

use crate::error::{FormError, Result};
use crate::field::FieldDefinition;

/// Read-only structured view over a form's field list.
///
/// Built once per field list with [`FormSchema::process`]; rebuild it when the
/// field list changes.
#[derive(Debug, Clone, Default)]
pub struct FormSchema {
    fields: Vec<FieldDefinition>,
    index: HashMap<String, usize>,
    roots: Vec<usize>,
    steps: Vec<usize>,
}

impl FormSchema {
    /// Build the schema in two passes.
    ///
    /// Pass 1 fills empty ids from `name` and indexes every field by id (a
    /// later duplicate replaces an earlier one in the index). Pass 2 sorts
    /// each field into steps (`type: step`), roots (not listed in any field's
    /// `children`), or children, which are reached through their parent.
    pub fn process(fields: Vec<FieldDefinition>) -> Self {
        let fields: Vec<FieldDefinition> =
            fields.into_iter().map(FieldDefinition::normalized).collect();

        let mut index = HashMap::with_capacity(fields.len());
        for (position, field) in fields.iter().enumerate() {
            if !field.id.is_empty() {
                index.insert(field.id.clone(), position);
            }
        }

        let child_ids: HashSet<&str> = fields
            .iter()
            .flat_map(|field| field.children.iter().map(String::as_str))
            .collect();

        let mut roots = Vec::new();
        let mut steps = Vec::new();
        for (position, field) in fields.iter().enumerate() {
            if field.is_step() {
                steps.push(position);
            } else if field.id.is_empty() || !child_ids.contains(field.id.as_str()) {
                roots.push(position);
            }
        }

        Self {
            fields,
            index,
            roots,
            steps,
        }
    }

    /// Parse a JSON array of field definitions and process it.
    ///
    /// # Errors
    /// Returns `FormError::Parse` if the JSON is malformed or a field has an
    /// unknown `type`.
    pub fn from_json(json: &str) -> Result<Self> {
        let fields: Vec<FieldDefinition> = serde_json::from_str(json)?;
        Ok(Self::process(fields))
    }

    /// Look a field up by id.
    pub fn field(&self, id: &str) -> Option<&FieldDefinition> {
        self.index.get(id).map(|&position| &self.fields[position])
    }

    /// All fields in declaration order.
    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    /// Top-level, non-step fields in declaration order.
    pub fn root_fields(&self) -> Vec<&FieldDefinition> {
        self.roots.iter().map(|&position| &self.fields[position]).collect()
    }

    /// Step fields in declaration order.
    pub fn steps(&self) -> Vec<&FieldDefinition> {
        self.steps.iter().map(|&position| &self.fields[position]).collect()
    }

    pub fn has_steps(&self) -> bool {
        !self.steps.is_empty()
    }

    /// Resolve a field's `children` ids, silently omitting unknown ids.
    pub fn children(&self, field: &FieldDefinition) -> Vec<&FieldDefinition> {
        field
            .children
            .iter()
            .filter_map(|child_id| self.field(child_id))
            .collect()
    }

    /// The fields on one step's page.
    pub fn step_fields(&self, step: &FieldDefinition) -> Vec<&FieldDefinition> {
        self.children(step)
    }

    /// The fields on the step with the given id.
    ///
    /// # Errors
    /// Returns `FormError::UnknownStep` if no step has that id.
    pub fn step_fields_by_id(&self, step_id: &str) -> Result<Vec<&FieldDefinition>> {
        let step = self
            .field(step_id)
            .filter(|field| field.is_step())
            .ok_or_else(|| FormError::UnknownStep(step_id.to_string()))?;
        Ok(self.step_fields(step))
    }
}
