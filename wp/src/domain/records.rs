//! Server-store record snapshots
//!
//! The client only ever holds read-only snapshots of these, fetched one
//! page at a time.

use serde::{Deserialize, Serialize};

/// Booking lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Confirmed => write!(f, "confirmed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Outcome status of a recorded search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    Success,
    Error,
}

impl std::fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Passenger details collected for a booking
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassengerDetails {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

impl PassengerDetails {
    /// All four fields are required for submission
    pub fn is_complete(&self) -> bool {
        !self.first_name.trim().is_empty()
            && !self.last_name.trim().is_empty()
            && !self.email.trim().is_empty()
            && !self.phone.trim().is_empty()
    }
}

/// A booking held in the server store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRecord {
    pub booking_id: String,
    #[serde(default)]
    pub booking_type: String,
    pub status: BookingStatus,
    #[serde(default)]
    pub passenger_name: String,
    #[serde(default)]
    pub passenger_email: String,
    #[serde(default)]
    pub confirmation_code: String,
    #[serde(default)]
    pub total_amount: f64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub flight_details: Option<serde_json::Value>,
    #[serde(default)]
    pub hotel_details: Option<serde_json::Value>,
}

/// A recorded flight search with any bookings made from it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRecord {
    pub search_id: String,
    pub origin: String,
    pub destination: String,
    pub departure_date: String,
    #[serde(default)]
    pub return_date: Option<String>,
    #[serde(default)]
    pub passengers: u32,
    #[serde(default)]
    pub cabin_class: String,
    pub search_status: SearchStatus,
    #[serde(default)]
    pub result_count: u32,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub bookings: Vec<BookingRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_values() {
        assert_eq!(serde_json::to_string(&BookingStatus::Confirmed).unwrap(), "\"confirmed\"");
        assert_eq!(serde_json::to_string(&SearchStatus::Success).unwrap(), "\"success\"");

        let status: BookingStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(status, BookingStatus::Cancelled);
    }

    #[test]
    fn test_passenger_details_completeness() {
        let mut details = PassengerDetails {
            first_name: "Asha".to_string(),
            last_name: "Rao".to_string(),
            email: "asha@example.com".to_string(),
            phone: String::new(),
        };
        assert!(!details.is_complete());

        details.phone = "+91 98765 43210".to_string();
        assert!(details.is_complete());

        // Whitespace-only does not count
        details.email = "   ".to_string();
        assert!(!details.is_complete());
    }
}
