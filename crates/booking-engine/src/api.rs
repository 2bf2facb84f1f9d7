//! Public booking endpoints: organizations, teams, bookings by token, lead
//! capture, generic forms with file uploads, and booking creation.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use form_engine::{FormConfig, SubmissionData};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error, instrument};

use crate::error::Result;
use crate::payload::BookingSubmission;
use crate::transport::{ApiResponse, Transport, UploadFile};

/// Organization fields shown in breadcrumbs and headers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizationInfo {
    pub id: Value,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub logo: Option<String>,
    pub website: Option<String>,
}

/// Team fields shown in breadcrumbs and headers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamInfo {
    pub id: Value,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub organization: Option<Value>,
    pub parent_team: Option<Value>,
}

/// Outcome of uploading one file; a failed file does not stop the others.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    pub success: bool,
    /// Name of the uploaded file.
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Client for the public (guest-facing) booking API.
#[derive(Clone)]
pub struct PublicBookingApi {
    transport: Arc<dyn Transport>,
}

impl PublicBookingApi {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Organization by slug, with its teams and events.
    pub async fn organization(&self, slug: &str) -> Result<Value> {
        Ok(self.transport.get(&format!("public/organizations/{}", slug)).await?.data)
    }

    pub async fn organization_info(&self, slug: &str) -> Result<OrganizationInfo> {
        let response = self.transport.get(&format!("public/organizations/{}", slug)).await?;
        Ok(response.data_as()?)
    }

    /// Team by organization and team slug, with sub-teams and events.
    pub async fn team(&self, org_slug: &str, team_slug: &str) -> Result<Value> {
        Ok(self
            .transport
            .get(&format!("public/teams/{}/{}", org_slug, team_slug))
            .await?
            .data)
    }

    pub async fn team_info(&self, org_slug: &str, team_slug: &str) -> Result<TeamInfo> {
        let response = self
            .transport
            .get(&format!("public/teams/{}/{}", org_slug, team_slug))
            .await?;
        Ok(response.data_as()?)
    }

    /// The booking a manage/cancel link points at.
    pub async fn booking_by_token(&self, token: &str) -> Result<Value> {
        Ok(self.transport.get(&format!("public/bookings/{}", token)).await?.data)
    }

    pub async fn cancel_booking(&self, token: &str, reason: Option<&str>) -> Result<Value> {
        let body = json!({ "reason": reason });
        Ok(self
            .transport
            .post(&format!("public/bookings/{}/cancel", token), &body)
            .await?
            .data)
    }

    /// Record a guest who entered an email but has not booked yet.
    ///
    /// Best effort: failures are logged and yield `None` so the booking flow
    /// is never interrupted.
    #[instrument(skip(self, email, name))]
    pub async fn capture_lead(
        &self,
        event_slug: &str,
        email: &str,
        name: Option<&str>,
        timezone: &str,
    ) -> Option<ApiResponse> {
        let body = json!({
            "email": email,
            "name": name.filter(|name| !name.is_empty()),
            "timezone": timezone,
            "captured_at": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        });

        match self
            .transport
            .post(&format!("public/events/{}/potential-lead", event_slug), &body)
            .await
        {
            Ok(response) => {
                debug!("potential lead captured");
                Some(response)
            }
            Err(err) => {
                error!(error = %err, "failed to capture potential lead");
                None
            }
        }
    }

    /// Fetch a generic form's configuration.
    pub async fn form_config(&self, endpoint: &str) -> Result<FormConfig> {
        let response = self.transport.get(endpoint).await?;
        Ok(response.data_as()?)
    }

    pub async fn submit_form(&self, endpoint: &str, submission: &SubmissionData) -> Result<Value> {
        let body = serde_json::to_value(submission)?;
        Ok(self.transport.post(endpoint, &body).await?.data)
    }

    /// Upload files one request each, in order.
    ///
    /// Never fails as a whole: each file gets an [`UploadResult`] carrying the
    /// stored file's `url` or the error message.
    pub async fn upload_files(&self, endpoint: &str, files: &[UploadFile]) -> Vec<UploadResult> {
        let mut results = Vec::with_capacity(files.len());
        for file in files {
            let result = match self.transport.post_file(endpoint, file).await {
                Ok(response) => UploadResult {
                    success: true,
                    file: file.name.clone(),
                    url: response
                        .data
                        .get("url")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    error: None,
                },
                Err(err) => {
                    error!(file = %file.name, error = %err, "file upload failed");
                    UploadResult {
                        success: false,
                        file: file.name.clone(),
                        url: None,
                        error: Some(err.to_string()),
                    }
                }
            };
            results.push(result);
        }
        results
    }

    /// Create a booking.
    pub async fn submit_booking(&self, submission: &BookingSubmission) -> Result<Value> {
        let body = serde_json::to_value(&submission.payload)?;
        Ok(self.transport.post(&submission.path(), &body).await?.data)
    }
}
