//! # form-engine
//!
//! Config-driven dynamic forms for public booking pages.
//!
//! A form is declared as a flat list of [`FieldDefinition`]s. The engine turns
//! that list into a navigable [`FormSchema`] (root fields, steps, group
//! nesting), decides which fields are shown for the current answers, validates
//! answers per field type, and formats them for submission.
//!
//! ## Quick start
//!
//! ```rust
//! use form_engine::{visible_fields, validate_form, FormData, FormSchema};
//!
//! let schema = FormSchema::from_json(r#"[
//!     {"id": "email", "type": "email", "label": "Email", "required": true},
//!     {"id": "company", "type": "text", "label": "Company",
//!      "visibility": {"logic": "all", "conditions": [
//!          {"field": "email", "operator": "is_not_empty"}
//!      ]}}
//! ]"#).unwrap();
//!
//! let data = FormData::new();
//! let shown = visible_fields(schema.root_fields(), &data, &schema);
//! assert_eq!(shown.len(), 1);
//!
//! let report = validate_form(shown, &data);
//! assert!(report.has_errors);
//! assert_eq!(report.errors["email"], vec!["Email is required".to_string()]);
//! ```
//!
//! ## Modules
//!
//! - [`field`]: `FieldDefinition` and the closed `FieldKind` union
//! - [`schema`]: flat field list → `FormSchema` (id index, roots, steps)
//! - [`visibility`]: visibility rules and visible-field traversal
//! - [`validation`]: per-field validation and form/step reports
//! - [`submission`]: formatting answers for generic form submission
//! - [`progress`]: saving and restoring in-progress answers
//! - [`store`]: key-value storage port with memory and file adapters
//! - [`error`]: Error types

pub mod error;
pub mod field;
pub mod progress;
pub mod schema;
pub mod store;
pub mod submission;
pub mod validation;
pub mod visibility;

mod value;

pub use error::{FormError, StoreError};
pub use field::{FieldDefinition, FieldKind, FormData};
pub use progress::{ProgressPersistence, SavedProgress};
pub use schema::FormSchema;
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use submission::{
    format_form_data, prepare_submission_data, FormConfig, FormId, FormSettings, SubmissionData,
};
pub use validation::{validate_field, validate_form, validate_step, ValidationReport};
pub use visibility::{
    is_visible, visible_fields, visible_form_fields, Condition, Logic, Operator, VisibilityRule,
};
