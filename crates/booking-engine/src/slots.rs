//! Bookable slot lookup.
//!
//! [`AvailabilityClient::get_slots`] issues one GET per query and returns the
//! backend's slots as-is. [`AvailabilityClient::get_slots_latest`] adds a
//! staleness guard for interactive use: when the guest changes date or
//! duration while a request is in flight, only the newest response is kept.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::transport::Transport;

/// Hours of notice the backend requires before a slot, unless configured.
pub const DEFAULT_BUFFER_HOURS: u32 = 1;

/// A bookable interval, as UTC instant strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingSlot {
    pub start: String,
    pub end: String,
}

/// Parameters of one availability lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotQuery {
    pub event_slug: String,
    pub org_slug: String,
    pub date: NaiveDate,
    /// Slot length in minutes.
    pub duration: u32,
    pub timezone: Option<String>,
    pub buffer_hours: u32,
}

impl SlotQuery {
    pub fn new(
        event_slug: impl Into<String>,
        org_slug: impl Into<String>,
        date: NaiveDate,
        duration: u32,
    ) -> Self {
        Self {
            event_slug: event_slug.into(),
            org_slug: org_slug.into(),
            date,
            duration,
            timezone: None,
            buffer_hours: DEFAULT_BUFFER_HOURS,
        }
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    pub fn with_buffer_hours(mut self, buffer_hours: u32) -> Self {
        self.buffer_hours = buffer_hours;
        self
    }

    /// Request path including the query string.
    pub fn path(&self) -> String {
        let mut path = format!(
            "public/organizations/{}/events/{}/available-slots?date={}&duration={}",
            self.org_slug,
            self.event_slug,
            self.date.format("%Y-%m-%d"),
            self.duration
        );
        if let Some(timezone) = self.timezone.as_deref().filter(|tz| !tz.is_empty()) {
            path.push_str("&timezone=");
            path.push_str(&urlencoding::encode(timezone));
        }
        path.push_str(&format!("&buffer_hours={}", self.buffer_hours));
        path
    }
}

/// Ticket identifying one issued query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QueryToken(u64);

/// Tracks which query was issued last.
#[derive(Debug, Default)]
pub struct LatestQueryGuard {
    latest: AtomicU64,
}

impl LatestQueryGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a token newer than every token issued before it.
    pub fn issue(&self) -> QueryToken {
        QueryToken(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Whether no newer token has been issued since `token`.
    pub fn is_latest(&self, token: QueryToken) -> bool {
        self.latest.load(Ordering::Acquire) == token.0
    }
}

/// Slot data arrives either as a bare list or wrapped in `{slots: [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum SlotsData {
    List(Vec<BookingSlot>),
    Wrapped { slots: Vec<BookingSlot> },
}

/// Availability lookups over a [`Transport`].
pub struct AvailabilityClient {
    transport: Arc<dyn Transport>,
    guard: LatestQueryGuard,
}

impl AvailabilityClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            guard: LatestQueryGuard::new(),
        }
    }

    pub fn guard(&self) -> &LatestQueryGuard {
        &self.guard
    }

    /// Fetch the slots for one query.
    ///
    /// # Errors
    /// Returns `BookingError::Transport` if the request fails or the response
    /// data is not a slot list.
    pub async fn get_slots(&self, query: &SlotQuery) -> Result<Vec<BookingSlot>> {
        let response = self.transport.get(&query.path()).await?;
        let slots = match response.data_as::<SlotsData>()? {
            SlotsData::List(slots) | SlotsData::Wrapped { slots } => slots,
        };

        debug!(
            event = %query.event_slug,
            date = %query.date,
            count = slots.len(),
            "slots fetched"
        );
        Ok(slots)
    }

    /// Fetch the slots for a query unless a newer query is issued meanwhile.
    ///
    /// Returns `Ok(None)` for a superseded query, whether its request
    /// succeeded or not.
    ///
    /// # Errors
    /// Same as [`Self::get_slots`], for the latest query only.
    pub async fn get_slots_latest(&self, query: &SlotQuery) -> Result<Option<Vec<BookingSlot>>> {
        let token = self.guard.issue();
        let result = self.get_slots(query).await;

        if !self.guard.is_latest(token) {
            warn!(
                event = %query.event_slug,
                date = %query.date,
                "discarding superseded slot response"
            );
            return Ok(None);
        }
        result.map(Some)
    }
}
