use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::json;

use crate::api::{ApiResponse, SaveReceipt, TimesheetData};
use crate::config::SyncConfig;
use crate::error::TimesheetError;
use crate::models::{DaysMap, Period};

/// Transport-agnostic contract the autosave core saves through.
///
/// Both operations validate the period before any transport activity and are
/// idempotent for retried calls: sending the same partial map twice yields the
/// same merged result, which is what makes client-side retries safe.
pub trait SyncClient {
    /// The stored month for a period (absent months read as the empty shape).
    fn fetch_month(
        &self,
        period: Period,
    ) -> impl Future<Output = Result<TimesheetData, TimesheetError>> + Send;

    /// Persists a partial day map; returns only the post-write timestamps.
    fn save_month(
        &self,
        period: Period,
        days: &DaysMap,
    ) -> impl Future<Output = Result<SaveReceipt, TimesheetError>> + Send;
}

/// HTTP implementation of [`SyncClient`] against the timesheet endpoint.
pub struct HttpSyncClient {
    client: reqwest::Client,
    base_url: String,
    auth_id: Option<String>,
}

impl HttpSyncClient {
    pub fn new(config: &SyncConfig) -> Result<Self, TimesheetError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("timesheet-sync/0.1.0")
            .build()
            .map_err(|e| TimesheetError::Transport(format!("client build failed: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_id: config.auth_id.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/api/timesheet.php", self.base_url)
    }

    /// Query pairs shared by both endpoints; AUTH_ID rides along when the
    /// placement provided one.
    fn query(&self, period: Period) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("year", period.year.to_string()),
            ("month", period.month.to_string()),
        ];
        if let Some(auth_id) = &self.auth_id {
            pairs.push(("AUTH_ID", auth_id.clone()));
        }
        pairs
    }
}

impl SyncClient for HttpSyncClient {
    async fn fetch_month(&self, period: Period) -> Result<TimesheetData, TimesheetError> {
        period.validate()?;

        let response = self
            .client
            .get(self.endpoint())
            .query(&self.query(period))
            .send()
            .await
            .map_err(|e| TimesheetError::Transport(format!("fetch failed: {}", e)))?;

        decode_envelope(response).await
    }

    async fn save_month(
        &self,
        period: Period,
        days: &DaysMap,
    ) -> Result<SaveReceipt, TimesheetError> {
        period.validate()?;

        let response = self
            .client
            .post(self.endpoint())
            .query(&self.query(period))
            .json(&json!({ "days": days }))
            .send()
            .await
            .map_err(|e| TimesheetError::Transport(format!("save failed: {}", e)))?;

        decode_envelope(response).await
    }
}

/// Unwraps the `{success, data | error}` envelope, folding HTTP-level and
/// application-level failures into one error.
async fn decode_envelope<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, TimesheetError> {
    let status = response.status().as_u16();

    let body = response
        .text()
        .await
        .map_err(|e| TimesheetError::Transport(format!("response read failed: {}", e)))?;

    let envelope: ApiResponse<T> = match serde_json::from_str(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            return Err(TimesheetError::Server {
                status,
                message: format!("undecodable response body: {}", e),
            })
        }
    };

    if !envelope.success {
        return Err(TimesheetError::Server {
            status,
            message: envelope
                .error
                .unwrap_or_else(|| "request failed".to_string()),
        });
    }

    envelope.data.ok_or(TimesheetError::Server {
        status,
        message: "success response carried no data".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> HttpSyncClient {
        HttpSyncClient::new(&SyncConfig {
            base_url: "http://portal.example/".to_string(),
            auth_id: Some("token123".to_string()),
            request_timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        assert_eq!(client().endpoint(), "http://portal.example/api/timesheet.php");
    }

    #[test]
    fn test_query_includes_auth_id_when_present() {
        let pairs = client().query(Period::new(2025, 12));
        assert_eq!(
            pairs,
            vec![
                ("year", "2025".to_string()),
                ("month", "12".to_string()),
                ("AUTH_ID", "token123".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_period_is_validated_before_any_request() {
        // Unroutable base URL: if validation did not fire first, this would
        // come back as a transport error instead.
        let client = HttpSyncClient::new(&SyncConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            auth_id: None,
            request_timeout_secs: 1,
        })
        .unwrap();

        let err = client.fetch_month(Period::new(1999, 1)).await.unwrap_err();
        assert!(matches!(err, TimesheetError::Validation(_)));

        let err = client
            .save_month(Period::new(2025, 13), &DaysMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, TimesheetError::Validation(_)));
    }
}
