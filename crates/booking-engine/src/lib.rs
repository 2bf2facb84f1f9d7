//! # booking-engine
//!
//! Timezone-correct availability lookup and booking submission for public
//! booking pages.
//!
//! A guest picks a date and a time of day in their own timezone; the backend
//! stores UTC. This crate converts between the two with `chrono-tz` (including
//! DST gaps and overlaps), fetches bookable slots, and assembles the exact
//! create-booking payload the backend expects.
//!
//! ## Example
//!
//! ```rust
//! use booking_engine::{to_utc, add_duration_utc};
//! use chrono::NaiveDate;
//!
//! let date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
//! let start = to_utc(date, "09:00", Some("America/New_York")).unwrap();
//! let end = add_duration_utc(date, "09:00", 30, Some("America/New_York")).unwrap();
//! assert_eq!(start, "2024-07-01 13:00:00");
//! assert_eq!(end, "2024-07-01 13:30:00");
//! ```
//!
//! ## Modules
//!
//! - [`timezone`]: local date + time ↔ UTC wire strings
//! - [`dst`]: DST transition policies (compatible, reject)
//! - [`slots`]: available-slot queries with a stale-response guard
//! - [`payload`]: form input → create-booking payload
//! - [`api`]: public booking endpoints
//! - [`transport`]: backend port, response envelope, reqwest adapter
//! - [`config`]: client configuration (TOML + environment)
//! - [`error`]: Error types

pub mod api;
pub mod config;
pub mod dst;
pub mod error;
pub mod payload;
pub mod slots;
pub mod timezone;
pub mod transport;

pub use api::{OrganizationInfo, PublicBookingApi, TeamInfo, UploadResult};
pub use config::ClientConfig;
pub use dst::DstPolicy;
pub use error::{BookingError, ConfigError, Result, TransportError};
pub use payload::{
    BookingFormData, BookingInput, BookingPayload, BookingPayloadBuilder, BookingStatus,
    BookingSubmission, CustomFieldEntry, CustomFieldMeta, Guest, GuestInput, SlotData,
};
pub use slots::{AvailabilityClient, BookingSlot, LatestQueryGuard, QueryToken, SlotQuery};
pub use timezone::{
    add_duration_utc, add_duration_utc_with_policy, local_timezone, parse_date, parse_timezone,
    to_local, to_utc, to_utc_with_policy,
};
#[cfg(feature = "http")]
pub use transport::HttpTransport;
pub use transport::{ApiResponse, Transport, UploadFile};
