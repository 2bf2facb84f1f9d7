//! Tests for availability queries and the stale-response guard.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use booking_engine::slots::DEFAULT_BUFFER_HOURS;
use booking_engine::{
    ApiResponse, AvailabilityClient, BookingError, BookingSlot, LatestQueryGuard, SlotQuery,
    Transport, TransportError, UploadFile,
};
use chrono::NaiveDate;
use serde_json::{json, Value};

// ── Helpers ─────────────────────────────────────────────────────────────────

/// Records requested paths and answers every GET with a fixed envelope.
struct FixedTransport {
    data: Value,
    requested: Mutex<Vec<String>>,
}

impl FixedTransport {
    fn new(data: Value) -> Arc<Self> {
        Arc::new(Self {
            data,
            requested: Mutex::new(Vec::new()),
        })
    }

    fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for FixedTransport {
    async fn get(&self, path: &str) -> Result<ApiResponse, TransportError> {
        self.requested.lock().unwrap().push(path.to_string());
        Ok(ApiResponse {
            success: true,
            message: None,
            data: self.data.clone(),
        })
    }

    async fn post(&self, _path: &str, _body: &Value) -> Result<ApiResponse, TransportError> {
        unreachable!("slot lookups never POST")
    }

    async fn post_file(
        &self,
        _path: &str,
        _file: &UploadFile,
    ) -> Result<ApiResponse, TransportError> {
        unreachable!("slot lookups never upload")
    }
}

fn may_first() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
}

fn slot(start: &str, end: &str) -> BookingSlot {
    BookingSlot {
        start: start.to_string(),
        end: end.to_string(),
    }
}

// ── Query string ────────────────────────────────────────────────────────────

#[test]
fn query_path_encodes_timezone_and_buffer() {
    let query = SlotQuery::new("demo", "acme", may_first(), 30)
        .with_timezone("America/New_York")
        .with_buffer_hours(2);

    assert_eq!(
        query.path(),
        "public/organizations/acme/events/demo/available-slots\
         ?date=2024-05-01&duration=30&timezone=America%2FNew_York&buffer_hours=2"
    );
}

#[test]
fn query_path_without_timezone_uses_default_buffer() {
    let query = SlotQuery::new("demo", "acme", may_first(), 45);

    assert_eq!(query.buffer_hours, DEFAULT_BUFFER_HOURS);
    assert_eq!(
        query.path(),
        "public/organizations/acme/events/demo/available-slots?date=2024-05-01&duration=45&buffer_hours=1"
    );
}

// ── get_slots ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn slots_are_returned_unmodified() {
    let transport = FixedTransport::new(json!([
        {"start": "2024-05-01 13:00:00", "end": "2024-05-01 13:30:00"},
        {"start": "2024-05-01 14:00:00", "end": "2024-05-01 14:30:00"}
    ]));
    let client = AvailabilityClient::new(transport.clone());
    let query = SlotQuery::new("demo", "acme", may_first(), 30);

    let slots = client.get_slots(&query).await.unwrap();

    assert_eq!(
        slots,
        vec![
            slot("2024-05-01 13:00:00", "2024-05-01 13:30:00"),
            slot("2024-05-01 14:00:00", "2024-05-01 14:30:00"),
        ]
    );
    assert_eq!(transport.requested(), vec![query.path()]);
}

#[tokio::test]
async fn wrapped_slot_lists_are_accepted() {
    let transport = FixedTransport::new(json!({
        "slots": [{"start": "2024-05-01 09:00:00", "end": "2024-05-01 10:00:00"}]
    }));
    let client = AvailabilityClient::new(transport);

    let slots = client
        .get_slots(&SlotQuery::new("demo", "acme", may_first(), 60))
        .await
        .unwrap();
    assert_eq!(slots.len(), 1);
}

#[tokio::test]
async fn empty_day_is_an_empty_list() {
    let client = AvailabilityClient::new(FixedTransport::new(json!([])));
    let slots = client
        .get_slots(&SlotQuery::new("demo", "acme", may_first(), 30))
        .await
        .unwrap();
    assert!(slots.is_empty());
}

#[tokio::test]
async fn unexpected_data_is_a_decode_error() {
    let client = AvailabilityClient::new(FixedTransport::new(json!({"days": 3})));
    let err = client
        .get_slots(&SlotQuery::new("demo", "acme", may_first(), 30))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        BookingError::Transport(TransportError::Decode(_))
    ));
}

// ── Staleness guard ─────────────────────────────────────────────────────────

#[test]
fn guard_only_accepts_the_newest_token() {
    let guard = LatestQueryGuard::new();
    let first = guard.issue();
    assert!(guard.is_latest(first));

    let second = guard.issue();
    assert!(second > first);
    assert!(!guard.is_latest(first));
    assert!(guard.is_latest(second));
}

#[tokio::test]
async fn sequential_latest_queries_all_apply() {
    let client = AvailabilityClient::new(FixedTransport::new(json!([])));
    let query = SlotQuery::new("demo", "acme", may_first(), 30);

    assert_eq!(client.get_slots_latest(&query).await.unwrap(), Some(vec![]));
    assert_eq!(client.get_slots_latest(&query).await.unwrap(), Some(vec![]));
}

#[cfg(feature = "http")]
#[tokio::test]
async fn superseded_response_is_discarded() {
    use std::time::Duration;

    use booking_engine::{ClientConfig, HttpTransport};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    let slow_day = json!({"success": true, "data": [{"start": "a", "end": "b"}]});
    let fast_day = json!({"success": true, "data": [{"start": "c", "end": "d"}]});

    Mock::given(method("GET"))
        .and(path("/public/organizations/acme/events/demo/available-slots"))
        .and(query_param("date", "2024-05-01"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(slow_day)
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/public/organizations/acme/events/demo/available-slots"))
        .and(query_param("date", "2024-05-02"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fast_day))
        .mount(&server)
        .await;

    let config = ClientConfig {
        base_url: server.uri(),
        ..ClientConfig::default()
    };
    let client = AvailabilityClient::new(Arc::new(HttpTransport::new(&config).unwrap()));

    let older = SlotQuery::new("demo", "acme", may_first(), 30);
    let newer = SlotQuery::new("demo", "acme", NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(), 30);

    // The older query is issued first and answers last.
    let (older_result, newer_result) =
        tokio::join!(client.get_slots_latest(&older), client.get_slots_latest(&newer));

    assert_eq!(older_result.unwrap(), None);
    assert_eq!(newer_result.unwrap(), Some(vec![slot("c", "d")]));
}
