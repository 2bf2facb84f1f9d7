//! Booking payload assembly.
//!
//! Turns the state captured by the booking form into the body posted to
//! `organizations/{orgId}/events/{eventId}/bookings`.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::dst::DstPolicy;
use crate::error::{BookingError, Result};
use crate::timezone::{add_duration_utc_with_policy, local_timezone, to_utc_with_policy};

/// What the guest entered on the booking page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingInput {
    pub name: String,
    pub email: String,
    pub notes: Option<String>,
    pub guests: Vec<GuestInput>,
    pub selected_date: Option<NaiveDate>,
    /// `"HH:MM"` in `timezone`.
    pub selected_time: Option<String>,
    /// Minutes.
    pub duration: u32,
    pub timezone: Option<String>,
    /// The slot the backend offered, when the guest picked one.
    pub slot_data: Option<SlotData>,
    /// Answers to the event's custom questions, in answer order.
    pub custom_fields: Map<String, Value>,
    pub custom_fields_metadata: HashMap<String, CustomFieldMeta>,
}

/// An additional attendee as entered. Incomplete entries are dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuestInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// A backend-resolved slot. Used verbatim when both ends are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotData {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomFieldMeta {
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomFieldEntry {
    pub field_id: String,
    pub label: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryContact {
    pub name: String,
    pub email: String,
}

/// Decoded form of [`BookingPayload::form_data`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingFormData {
    pub primary_contact: PrimaryContact,
    pub notes: String,
    pub duration: u32,
    pub timezone: String,
    pub custom_fields: Vec<CustomFieldEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Confirmed,
}

/// Body of a create-booking request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingPayload {
    /// Always null; the backend takes the event from the URL.
    pub event_id: Option<u64>,
    /// `YYYY-MM-DD HH:MM:SS` UTC.
    pub start_time: String,
    pub end_time: String,
    pub status: BookingStatus,
    /// JSON-encoded [`BookingFormData`].
    pub form_data: String,
    /// Primary contact first.
    pub guests: Vec<Guest>,
}

impl BookingPayload {
    /// Decode the `form_data` string.
    ///
    /// # Errors
    /// Returns `BookingError::Encode` if it is not valid booking form data.
    pub fn form_data(&self) -> Result<BookingFormData> {
        Ok(serde_json::from_str(&self.form_data)?)
    }
}

/// A payload addressed to its event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingSubmission {
    pub organization_id: String,
    pub event_id: String,
    pub payload: BookingPayload,
}

impl BookingSubmission {
    pub fn path(&self) -> String {
        format!(
            "organizations/{}/events/{}/bookings",
            self.organization_id, self.event_id
        )
    }
}

/// Builds booking payloads from form input.
#[derive(Debug, Clone)]
pub struct BookingPayloadBuilder {
    fallback_timezone: String,
    dst_policy: DstPolicy,
}

impl Default for BookingPayloadBuilder {
    fn default() -> Self {
        Self::new(local_timezone())
    }
}

impl BookingPayloadBuilder {
    /// `fallback_timezone` is used for conversion and recorded in `form_data`
    /// when the input has none.
    pub fn new(fallback_timezone: impl Into<String>) -> Self {
        Self {
            fallback_timezone: fallback_timezone.into(),
            dst_policy: DstPolicy::default(),
        }
    }

    pub fn with_dst_policy(mut self, policy: DstPolicy) -> Self {
        self.dst_policy = policy;
        self
    }

    pub fn fallback_timezone(&self) -> &str {
        &self.fallback_timezone
    }

    /// Build the create-booking request for an event.
    ///
    /// # Errors
    /// See [`Self::format`].
    pub fn build(
        &self,
        input: &BookingInput,
        event_id: impl Into<String>,
        organization_id: impl Into<String>,
    ) -> Result<BookingSubmission> {
        Ok(BookingSubmission {
            organization_id: organization_id.into(),
            event_id: event_id.into(),
            payload: self.format(input)?,
        })
    }

    /// Assemble the payload body.
    ///
    /// # Errors
    /// Without a complete `slot_data`, returns `BookingError::MissingSelection`
    /// when date or time is missing, or any conversion error from the timezone
    /// module.
    pub fn format(&self, input: &BookingInput) -> Result<BookingPayload> {
        let timezone = input
            .timezone
            .as_deref()
            .filter(|tz| !tz.is_empty())
            .unwrap_or(&self.fallback_timezone);
        let (start_time, end_time) = self.resolve_times(input, timezone)?;
        debug!(start = %start_time, end = %end_time, "booking times resolved");

        let form_data = BookingFormData {
            primary_contact: PrimaryContact {
                name: input.name.clone(),
                email: input.email.clone(),
            },
            notes: input.notes.clone().unwrap_or_default(),
            duration: input.duration,
            timezone: timezone.to_string(),
            custom_fields: custom_field_entries(input),
        };

        Ok(BookingPayload {
            event_id: None,
            start_time,
            end_time,
            status: BookingStatus::Confirmed,
            form_data: serde_json::to_string(&form_data)?,
            guests: guest_list(input),
        })
    }

    fn resolve_times(&self, input: &BookingInput, timezone: &str) -> Result<(String, String)> {
        if let Some(SlotData {
            start: Some(start),
            end: Some(end),
        }) = &input.slot_data
        {
            if !start.is_empty() && !end.is_empty() {
                return Ok((start.clone(), end.clone()));
            }
        }

        let date = input
            .selected_date
            .ok_or(BookingError::MissingSelection("selected date"))?;
        let time = input
            .selected_time
            .as_deref()
            .ok_or(BookingError::MissingSelection("selected time"))?;

        let start = to_utc_with_policy(date, time, Some(timezone), self.dst_policy)?;
        let end = add_duration_utc_with_policy(
            date,
            time,
            i64::from(input.duration),
            Some(timezone),
            self.dst_policy,
        )?;
        Ok((start, end))
    }
}

fn custom_field_entries(input: &BookingInput) -> Vec<CustomFieldEntry> {
    input
        .custom_fields
        .iter()
        .filter(|(_, value)| !value.is_null() && value.as_str() != Some(""))
        .map(|(field_id, value)| {
            let label = input
                .custom_fields_metadata
                .get(field_id)
                .and_then(|meta| meta.label.as_deref())
                .filter(|label| !label.is_empty())
                .unwrap_or(field_id);
            CustomFieldEntry {
                field_id: field_id.clone(),
                label: label.to_string(),
                value: value.clone(),
            }
        })
        .collect()
}

fn guest_list(input: &BookingInput) -> Vec<Guest> {
    let primary = Guest {
        name: input.name.clone(),
        email: input.email.clone(),
        phone: None,
    };

    let additional = input.guests.iter().filter_map(|guest| {
        let name = guest.name.as_deref().filter(|name| !name.is_empty())?;
        let email = guest.email.as_deref().filter(|email| !email.is_empty())?;
        Some(Guest {
            name: name.to_string(),
            email: email.to_string(),
            phone: guest.phone.clone().filter(|phone| !phone.is_empty()),
        })
    });

    std::iter::once(primary).chain(additional).collect()
}
