//! TravelApi trait definition

use async_trait::async_trait;

use super::{
    ApiError, BookingConfirmation, BookingsPage, BookingsQuery, ChatReply, ChatTurnRequest, FlightBookingRequest,
    FlightSearchRequest, FlightSearchResponse, Health, HistoryPage, HistoryQuery, PlanBookingRequest, PlanRequest,
};
use crate::domain::TravelPlan;

/// Client for the remote travel-agent service
///
/// Each method maps to one collaborator endpoint. Calls are independent and
/// stateless; all conversation context travels in the request. Callers are
/// responsible for serializing requests per flow; the client itself places
/// no ordering constraints.
#[async_trait]
pub trait TravelApi: Send + Sync {
    /// Send one chat turn and receive the agent's reply
    async fn chat(&self, request: ChatTurnRequest) -> Result<ChatReply, ApiError>;

    /// Search for flights; the response carries the agent's reasoning trace
    async fn search_flights(&self, request: FlightSearchRequest) -> Result<FlightSearchResponse, ApiError>;

    /// Generate a complete travel plan from the accumulated brief
    async fn generate_plan(&self, request: PlanRequest) -> Result<TravelPlan, ApiError>;

    /// Book a single flight offer
    async fn book_flight(&self, request: FlightBookingRequest) -> Result<BookingConfirmation, ApiError>;

    /// Book a complete travel plan (flight + hotel)
    async fn book_plan(&self, request: PlanBookingRequest) -> Result<BookingConfirmation, ApiError>;

    /// Fetch one filtered page of search history
    async fn search_history(&self, query: HistoryQuery) -> Result<HistoryPage, ApiError>;

    /// Fetch one filtered page of bookings
    async fn bookings(&self, query: BookingsQuery) -> Result<BookingsPage, ApiError>;

    /// Check service liveness
    async fn health(&self) -> Result<Health, ApiError>;
}
