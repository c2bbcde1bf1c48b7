//! Request and response types for the agent service endpoints

use serde::{Deserialize, Serialize};

use crate::domain::{
    BookingRecord, BookingStatus, ConversationMessage, FlightOffer, PassengerDetails, SearchRecord, SearchStatus,
    ThoughtStep, TravelBrief, TravelPlan,
};

/// One chat turn: the new user text plus prior context
#[derive(Debug, Clone, Serialize)]
pub struct ChatTurnRequest {
    pub message: String,
    pub conversation_history: Vec<ConversationMessage>,
    /// Travel details extracted so far, echoed back to the service
    pub extracted_info: TravelBrief,
}

/// The agent's reply to a chat turn
///
/// The service also reports a structured readiness flag; it is deliberately
/// not consumed; readiness is decided client-side from the reply text.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    pub message: String,
    #[serde(default)]
    pub extracted_info: TravelBrief,
}

/// Flight search parameters
#[derive(Debug, Clone, Serialize)]
pub struct FlightSearchRequest {
    pub origin: String,
    pub destination: String,
    pub departure_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_date: Option<String>,
    pub passengers: u32,
    pub trip_type: String,
    pub cabin_class: String,
}

/// Search outcome: offers plus the agent's reasoning trace
#[derive(Debug, Clone, Deserialize)]
pub struct FlightSearchResponse {
    pub search_id: String,
    pub status: String,
    #[serde(default)]
    pub thoughts: Vec<ThoughtStep>,
    #[serde(default)]
    pub flights: Vec<FlightOffer>,
    #[serde(default)]
    pub message: String,
}

/// Plan generation request built from the accumulated travel brief
#[derive(Debug, Clone, Serialize)]
pub struct PlanRequest {
    pub destination: String,
    pub origin: String,
    pub budget: f64,
    pub days: u32,
    pub interests: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_date: Option<String>,
    pub passengers: u32,
}

impl PlanRequest {
    /// Build a plan request from a brief, filling in the service defaults
    pub fn from_brief(brief: &TravelBrief) -> Self {
        Self {
            destination: brief.destination.clone().unwrap_or_default(),
            origin: brief.origin.clone().unwrap_or_else(|| "Delhi".to_string()),
            budget: brief.budget.unwrap_or(50_000.0),
            days: brief.days.unwrap_or(3),
            interests: brief.interests.clone(),
            departure_date: brief.departure_date.clone(),
            passengers: brief.passengers.unwrap_or(1),
        }
    }
}

/// Booking request for a single flight offer
#[derive(Debug, Clone, Serialize)]
pub struct FlightBookingRequest {
    pub flight_id: String,
    pub passenger_details: PassengerDetails,
}

/// Booking request for a complete travel plan
#[derive(Debug, Clone, Serialize)]
pub struct PlanBookingRequest {
    pub plan: TravelPlan,
    pub passenger_details: PassengerDetails,
}

/// Booking outcome returned by the service
#[derive(Debug, Clone, Deserialize)]
pub struct BookingConfirmation {
    #[serde(default)]
    pub booking_id: String,
    pub status: String,
    #[serde(default)]
    pub confirmation_code: Option<String>,
    pub message: String,
}

/// Query for the search-history list endpoint
#[derive(Debug, Clone, Default)]
pub struct HistoryQuery {
    pub limit: u32,
    pub offset: u32,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub status: Option<SearchStatus>,
}

/// One page of search records
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryPage {
    pub items: Vec<SearchRecord>,
    pub total: u32,
}

/// Query for the bookings list endpoint
#[derive(Debug, Clone, Default)]
pub struct BookingsQuery {
    pub limit: u32,
    pub offset: u32,
    pub status: Option<BookingStatus>,
}

/// One page of booking records
#[derive(Debug, Clone, Deserialize)]
pub struct BookingsPage {
    pub items: Vec<BookingRecord>,
    pub total: u32,
}

/// Service liveness indicator
#[derive(Debug, Clone, Deserialize)]
pub struct Health {
    pub status: String,
    #[serde(default)]
    pub message: String,
}
