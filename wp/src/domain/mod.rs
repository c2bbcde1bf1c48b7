//! Core domain types for Waypoint
//!
//! Pure data: conversation messages, agent thought steps, travel plans,
//! and the server-owned search/booking record snapshots.

mod message;
mod plan;
mod records;
mod thought;

pub use message::{ConversationMessage, Role};
pub use plan::{DayActivities, FlightOffer, HotelOffer, ItineraryDay, TravelBrief, TravelPlan};
pub use records::{BookingRecord, BookingStatus, PassengerDetails, SearchRecord, SearchStatus};
pub use thought::ThoughtStep;
