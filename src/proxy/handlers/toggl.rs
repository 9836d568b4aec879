//! Toggl time-entries proxy endpoint
//!
//! The browser sends its own API token in the body; it is turned into the
//! upstream `Authorization` header here and never stored.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::proxy::error::GatewayError;
use crate::proxy::server::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntriesRequest {
    pub api_token: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Fields of a request that passed validation
#[derive(Debug, PartialEq, Eq)]
pub struct TimeEntriesQuery<'a> {
    pub api_token: &'a str,
    pub start_date: &'a str,
    pub end_date: &'a str,
}

impl TimeEntriesRequest {
    /// All three fields present and non-empty
    pub fn validate(&self) -> Result<TimeEntriesQuery<'_>, GatewayError> {
        fn present(field: &Option<String>) -> Option<&str> {
            field.as_deref().filter(|v| !v.is_empty())
        }

        match (
            present(&self.api_token),
            present(&self.start_date),
            present(&self.end_date),
        ) {
            (Some(api_token), Some(start_date), Some(end_date)) => Ok(TimeEntriesQuery {
                api_token,
                start_date,
                end_date,
            }),
            _ => Err(GatewayError::Validation),
        }
    }
}

/// Fetch time entries in `[startDate, endDate]` on behalf of the caller
pub async fn handle_time_entries(
    State(state): State<AppState>,
    payload: Result<Json<TimeEntriesRequest>, JsonRejection>,
) -> Result<Json<Value>, GatewayError> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::warn!("Unreadable time-entries body: {}", rejection.body_text());
            TimeEntriesRequest::default()
        }
    };

    let query = request.validate().map_err(|err| {
        tracing::warn!("Time-entries request rejected: {}", err);
        err
    })?;

    tracing::info!(
        "Fetching Toggl time entries | range: {} .. {}",
        query.start_date,
        query.end_date
    );

    match state
        .upstream
        .fetch_time_entries(query.api_token, query.start_date, query.end_date)
        .await
    {
        Ok(data) => Ok(Json(data)),
        Err(err) => {
            tracing::error!("Error fetching from Toggl: {}", err);
            Err(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(api_token: Option<&str>, start: Option<&str>, end: Option<&str>) -> TimeEntriesRequest {
        TimeEntriesRequest {
            api_token: api_token.map(String::from),
            start_date: start.map(String::from),
            end_date: end.map(String::from),
        }
    }

    #[test]
    fn test_validate_complete_request() {
        let req = request(Some("tok"), Some("2024-01-01"), Some("2024-01-31"));
        assert_eq!(
            req.validate().unwrap(),
            TimeEntriesQuery {
                api_token: "tok",
                start_date: "2024-01-01",
                end_date: "2024-01-31",
            }
        );
    }

    #[test]
    fn test_validate_rejects_missing_or_empty_fields() {
        let cases = [
            request(None, Some("2024-01-01"), Some("2024-01-31")),
            request(Some(""), Some("2024-01-01"), Some("2024-01-31")),
            request(Some("tok"), None, Some("2024-01-31")),
            request(Some("tok"), Some("2024-01-01"), Some("")),
            TimeEntriesRequest::default(),
        ];
        for req in &cases {
            assert!(matches!(req.validate(), Err(GatewayError::Validation)));
        }
    }

    #[test]
    fn test_deserialize_camel_case_body() {
        let req: TimeEntriesRequest = serde_json::from_str(
            r#"{"apiToken":"tok","startDate":"2024-01-01","endDate":"2024-01-31","extra":1}"#,
        )
        .unwrap();
        assert_eq!(req.api_token.as_deref(), Some("tok"));
        assert_eq!(req.end_date.as_deref(), Some("2024-01-31"));
    }
}
