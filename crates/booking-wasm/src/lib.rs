//! WASM bindings for the embeddable booking widget.
//!
//! Exposes time conversion, form schema/visibility/validation and booking
//! payload assembly to JavaScript via `wasm-bindgen`. All complex types are
//! passed as JSON strings. Network calls stay on the JavaScript side; the
//! widget asks [`slots_path`] for the availability URL and fetches it itself.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p booking-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir widget/wasm/ \
//!   target/wasm32-unknown-unknown/release/booking_wasm.wasm
//! ```

use booking_engine::timezone::DATETIME_FORMAT;
use booking_engine::{BookingInput, BookingPayloadBuilder, SlotQuery};
use chrono::NaiveDate;
use form_engine::{
    prepare_submission_data, validate_field as validate_one, validate_form as validate_all,
    validate_step as validate_page, visible_form_fields, FieldDefinition, FormConfig, FormData,
    FormSchema,
};
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct StepDto {
    id: String,
    label: String,
    fields: Vec<String>,
}

#[derive(Serialize)]
struct SchemaDto {
    root_fields: Vec<String>,
    steps: Vec<StepDto>,
    has_steps: bool,
}

#[derive(Serialize)]
struct SubmissionDto<'a> {
    path: String,
    payload: &'a booking_engine::BookingPayload,
}

// ---------------------------------------------------------------------------
// JSON-in / JSON-out implementations
// ---------------------------------------------------------------------------

fn parse_date(date: &str) -> Result<NaiveDate, String> {
    booking_engine::parse_date(date).map_err(|e| e.to_string())
}

fn parse_schema(fields_json: &str) -> Result<FormSchema, String> {
    FormSchema::from_json(fields_json).map_err(|e| e.to_string())
}

fn parse_data(data_json: &str) -> Result<FormData, String> {
    serde_json::from_str(data_json).map_err(|e| format!("Invalid form data JSON: {}", e))
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

fn ids(fields: Vec<&FieldDefinition>) -> Vec<String> {
    fields.into_iter().map(|field| field.id.clone()).collect()
}

fn schema_json(fields_json: &str) -> Result<String, String> {
    let schema = parse_schema(fields_json)?;
    let steps = schema
        .steps()
        .into_iter()
        .map(|step| StepDto {
            id: step.id.clone(),
            label: step.label.clone(),
            fields: ids(schema.step_fields(step)),
        })
        .collect();

    to_json(&SchemaDto {
        root_fields: ids(schema.root_fields()),
        steps,
        has_steps: schema.has_steps(),
    })
}

fn visible_json(fields_json: &str, data_json: &str) -> Result<String, String> {
    let schema = parse_schema(fields_json)?;
    let data = parse_data(data_json)?;
    to_json(&ids(visible_form_fields(&schema, &data)))
}

fn validate_field_json(field_json: &str, value_json: &str) -> Result<String, String> {
    let field: FieldDefinition = serde_json::from_str(field_json)
        .map_err(|e| format!("Invalid field JSON: {}", e))?;
    let value: Value = serde_json::from_str(value_json)
        .map_err(|e| format!("Invalid value JSON: {}", e))?;
    to_json(&validate_one(&field.normalized(), &value))
}

fn validate_form_json(fields_json: &str, data_json: &str) -> Result<String, String> {
    let schema = parse_schema(fields_json)?;
    let data = parse_data(data_json)?;
    to_json(&validate_all(visible_form_fields(&schema, &data), &data))
}

fn validate_step_json(
    fields_json: &str,
    step_id: &str,
    data_json: &str,
) -> Result<String, String> {
    let schema = parse_schema(fields_json)?;
    let data = parse_data(data_json)?;
    let page = schema.step_fields_by_id(step_id).map_err(|e| e.to_string())?;
    to_json(&validate_page(page, &data))
}

fn submission_json(
    data_json: &str,
    config_json: &str,
    user_agent: Option<&str>,
) -> Result<String, String> {
    let data = parse_data(data_json)?;
    let mut config: FormConfig = serde_json::from_str(config_json)
        .map_err(|e| format!("Invalid form config JSON: {}", e))?;
    config.fields = config.fields.into_iter().map(FieldDefinition::normalized).collect();
    to_json(&prepare_submission_data(&data, &config.fields, &config, user_agent))
}

fn booking_json(
    input_json: &str,
    event_id: &str,
    organization_id: &str,
    fallback_timezone: &str,
) -> Result<String, String> {
    let input: BookingInput = serde_json::from_str(input_json)
        .map_err(|e| format!("Invalid booking input JSON: {}", e))?;
    let submission = BookingPayloadBuilder::new(fallback_timezone)
        .build(&input, event_id, organization_id)
        .map_err(|e| e.to_string())?;

    to_json(&SubmissionDto {
        path: submission.path(),
        payload: &submission.payload,
    })
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

fn js_err(message: String) -> JsValue {
    JsValue::from_str(&message)
}

/// Convert a local date (`YYYY-MM-DD`) and time (`HH:MM`) to a
/// `YYYY-MM-DD HH:MM:SS` UTC string. Without a timezone the time is taken as UTC.
#[wasm_bindgen(js_name = "toUtc")]
pub fn to_utc(date: &str, time: &str, timezone: Option<String>) -> Result<String, JsValue> {
    let date = parse_date(date).map_err(js_err)?;
    booking_engine::to_utc(date, time, timezone.as_deref()).map_err(|e| js_err(e.to_string()))
}

/// UTC string of the local start time plus `minutes`.
#[wasm_bindgen(js_name = "addDurationUtc")]
pub fn add_duration_utc(
    date: &str,
    time: &str,
    minutes: i32,
    timezone: Option<String>,
) -> Result<String, JsValue> {
    let date = parse_date(date).map_err(js_err)?;
    booking_engine::add_duration_utc(date, time, i64::from(minutes), timezone.as_deref())
        .map_err(|e| js_err(e.to_string()))
}

/// Wall-clock time (`YYYY-MM-DD HH:MM:SS`) of a backend UTC string in `timezone`.
#[wasm_bindgen(js_name = "toLocal")]
pub fn to_local(utc: &str, timezone: &str) -> Result<String, JsValue> {
    booking_engine::to_local(utc, timezone)
        .map(|local| local.format(DATETIME_FORMAT).to_string())
        .map_err(|e| js_err(e.to_string()))
}

/// Relative availability URL, including the query string.
#[wasm_bindgen(js_name = "slotsPath")]
pub fn slots_path(
    event_slug: &str,
    org_slug: &str,
    date: &str,
    duration: u32,
    timezone: Option<String>,
    buffer_hours: Option<u32>,
) -> Result<String, JsValue> {
    let date = parse_date(date).map_err(js_err)?;
    let mut query = SlotQuery::new(event_slug, org_slug, date, duration);
    if let Some(timezone) = timezone {
        query = query.with_timezone(timezone);
    }
    if let Some(hours) = buffer_hours {
        query = query.with_buffer_hours(hours);
    }
    Ok(query.path())
}

/// Summarize a field list: `{root_fields, steps: [{id, label, fields}], has_steps}`.
#[wasm_bindgen(js_name = "processSchema")]
pub fn process_schema(fields_json: &str) -> Result<String, JsValue> {
    schema_json(fields_json).map_err(js_err)
}

/// Ids of the fields shown for the current answers, in display order.
#[wasm_bindgen(js_name = "visibleFields")]
pub fn visible_fields(fields_json: &str, data_json: &str) -> Result<String, JsValue> {
    visible_json(fields_json, data_json).map_err(js_err)
}

/// Error messages for one field and one value (JSON array of strings).
#[wasm_bindgen(js_name = "validateField")]
pub fn validate_field(field_json: &str, value_json: &str) -> Result<String, JsValue> {
    validate_field_json(field_json, value_json).map_err(js_err)
}

/// Validate every visible field: `{errors: {id: [..]}, has_errors}`.
#[wasm_bindgen(js_name = "validateForm")]
pub fn validate_form(fields_json: &str, data_json: &str) -> Result<String, JsValue> {
    validate_form_json(fields_json, data_json).map_err(js_err)
}

/// Validate the fields of one step.
#[wasm_bindgen(js_name = "validateStep")]
pub fn validate_step(
    fields_json: &str,
    step_id: &str,
    data_json: &str,
) -> Result<String, JsValue> {
    validate_step_json(fields_json, step_id, data_json).map_err(js_err)
}

/// Generic form submission body for a form config.
#[wasm_bindgen(js_name = "prepareSubmission")]
pub fn prepare_submission(
    data_json: &str,
    config_json: &str,
    user_agent: Option<String>,
) -> Result<String, JsValue> {
    submission_json(data_json, config_json, user_agent.as_deref()).map_err(js_err)
}

/// Create-booking request: `{path, payload}`.
#[wasm_bindgen(js_name = "buildBookingPayload")]
pub fn build_booking_payload(
    input_json: &str,
    event_id: &str,
    organization_id: &str,
    fallback_timezone: &str,
) -> Result<String, JsValue> {
    booking_json(input_json, event_id, organization_id, fallback_timezone).map_err(js_err)
}
