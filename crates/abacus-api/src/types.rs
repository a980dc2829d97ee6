//! Request and response types for the Abacus API

use abacus_core::EvaluationRecord;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/evaluate/single`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateRequest {
    pub expression: String,
}

/// Body of `POST /api/evaluate/batch`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEvaluateRequest {
    pub expressions: Vec<String>,
}

/// Positionally ordered batch results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEvaluateResponse {
    pub results: Vec<EvaluationRecord>,
}

/// Query string of `GET /api/evaluate/history`
///
/// Values are kept as text so that garbage falls back to the defaults
/// instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryQuery {
    pub page: Option<String>,
    #[serde(rename = "pageSize", alias = "page_size")]
    pub page_size: Option<String>,
}

impl HistoryQuery {
    pub fn page(&self) -> i64 {
        parse_or(self.page.as_deref(), abacus_core::history::DEFAULT_PAGE as i64)
    }

    pub fn page_size(&self) -> i64 {
        parse_or(self.page_size.as_deref(), abacus_core::history::DEFAULT_PAGE_SIZE as i64)
    }
}

fn parse_or(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|value| value.trim().parse().ok()).unwrap_or(default)
}

/// Standard success envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub status_code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self { status_code: 200, message: message.into(), data: Some(data) }
    }
}

/// Standard error envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub status_code: u16,
    pub message: String,
    pub description: String,
    pub error_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_query_defaults() {
        let query = HistoryQuery::default();
        assert_eq!(query.page(), 1);
        assert_eq!(query.page_size(), 10);

        let query = HistoryQuery { page: Some("x".into()), page_size: Some(" 25 ".into()) };
        assert_eq!(query.page(), 1);
        assert_eq!(query.page_size(), 25);
    }

    #[test]
    fn test_envelope_field_names() {
        let value = serde_json::to_value(ApiResponse::ok("done", 1)).unwrap();
        assert_eq!(value["statusCode"], 200);
        assert_eq!(value["message"], "done");
        assert_eq!(value["data"], 1);
    }
}
