//! REST implementation of the TravelApi trait
//!
//! Talks JSON to the travel-agent service. Non-2xx responses surface the
//! FastAPI-style `detail`/`message` body as an `ApiError::Api`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{
    ApiError, BookingConfirmation, BookingsPage, BookingsQuery, ChatReply, ChatTurnRequest, FlightBookingRequest,
    FlightSearchRequest, FlightSearchResponse, Health, HistoryPage, HistoryQuery, PlanBookingRequest, PlanRequest,
    TravelApi,
};
use crate::config::ApiConfig;
use crate::domain::TravelPlan;

/// HTTP client for the travel-agent service
pub struct HttpTravelApi {
    base_url: String,
    http: Client,
}

impl HttpTravelApi {
    /// Create a new client from configuration
    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        debug!(%config.base_url, config.timeout_ms, "from_config: called");
        let timeout = Duration::from_millis(config.timeout_ms);

        let http = Client::builder().timeout(timeout).build().map_err(ApiError::Network)?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        debug!(%path, "post_json: called");
        let response = self.http.post(self.url(path)).json(body).send().await?;
        Self::decode(response).await
    }

    async fn get_json<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        debug!(%path, params = query.len(), "get_json: called");
        let response = self.http.get(self.url(path)).query(query).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), body_len = body.len(), "decode: error response");
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: extract_error_message(&body),
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Pull a human-readable message out of an error body
///
/// The service reports failures as `{"detail": ...}` (validation and
/// handler errors) or `{"message": ...}`; anything else falls back to the
/// raw body.
fn extract_error_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| v.get("detail").or_else(|| v.get("message")))
        .and_then(|m| m.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| {
            if body.is_empty() {
                "(no response body)".to_string()
            } else {
                body.to_string()
            }
        })
}

#[async_trait]
impl TravelApi for HttpTravelApi {
    async fn chat(&self, request: ChatTurnRequest) -> Result<ChatReply, ApiError> {
        debug!(message_len = request.message.len(), "chat: called");
        self.post_json("/api/chat", &request).await
    }

    async fn search_flights(&self, request: FlightSearchRequest) -> Result<FlightSearchResponse, ApiError> {
        debug!(%request.origin, %request.destination, "search_flights: called");
        self.post_json("/api/search", &request).await
    }

    async fn generate_plan(&self, request: PlanRequest) -> Result<TravelPlan, ApiError> {
        debug!(%request.destination, request.days, "generate_plan: called");
        self.post_json("/api/plan-travel", &request).await
    }

    async fn book_flight(&self, request: FlightBookingRequest) -> Result<BookingConfirmation, ApiError> {
        debug!(%request.flight_id, "book_flight: called");
        self.post_json("/api/book", &request).await
    }

    async fn book_plan(&self, request: PlanBookingRequest) -> Result<BookingConfirmation, ApiError> {
        debug!(%request.plan.destination, "book_plan: called");
        self.post_json("/api/book-complete-plan", &request).await
    }

    async fn search_history(&self, query: HistoryQuery) -> Result<HistoryPage, ApiError> {
        debug!(query.limit, query.offset, "search_history: called");
        let mut params = vec![("limit", query.limit.to_string()), ("offset", query.offset.to_string())];
        if let Some(origin) = &query.origin {
            params.push(("origin", origin.clone()));
        }
        if let Some(destination) = &query.destination {
            params.push(("destination", destination.clone()));
        }
        if let Some(status) = query.status {
            params.push(("status", status.to_string()));
        }
        self.get_json("/api/history", &params).await
    }

    async fn bookings(&self, query: BookingsQuery) -> Result<BookingsPage, ApiError> {
        debug!(query.limit, query.offset, "bookings: called");
        let mut params = vec![("limit", query.limit.to_string()), ("offset", query.offset.to_string())];
        if let Some(status) = query.status {
            params.push(("status", status.to_string()));
        }
        self.get_json("/api/bookings", &params).await
    }

    async fn health(&self) -> Result<Health, ApiError> {
        debug!("health: called");
        self.get_json("/api/health", &[]).await
    }
}
