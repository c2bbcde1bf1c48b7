//! Agent-service client for Waypoint
//!
//! Defines the collaborator interface and its REST implementation.

use std::sync::Arc;

use tracing::debug;

pub mod client;
mod error;
mod http;
mod types;

pub use client::TravelApi;
pub use error::ApiError;
pub use http::HttpTravelApi;
pub use types::{
    BookingConfirmation, BookingsPage, BookingsQuery, ChatReply, ChatTurnRequest, FlightBookingRequest,
    FlightSearchRequest, FlightSearchResponse, Health, HistoryPage, HistoryQuery, PlanBookingRequest, PlanRequest,
};

use crate::config::ApiConfig;

/// Create a travel-agent client from configuration
pub fn create_client(config: &ApiConfig) -> Result<Arc<dyn TravelApi>, ApiError> {
    debug!(%config.base_url, "create_client: called");
    Ok(Arc::new(HttpTravelApi::from_config(config)?))
}
