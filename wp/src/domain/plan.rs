//! Travel plan types
//!
//! A `TravelPlan` is created once per plan request and held until a new one
//! replaces it or booking completes.

use serde::{Deserialize, Serialize};

/// A flight offer with a one-way fare
///
/// Round-trip cost is `price * 2` (symmetric-fare assumption); the return
/// leg is not independently modeled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlightOffer {
    #[serde(default)]
    pub flight_id: String,
    pub airline: String,
    pub flight_number: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub duration: String,
    pub price: f64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub stops: u32,
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub cabin_class: String,
}

/// A hotel offer priced per night
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HotelOffer {
    #[serde(default)]
    pub hotel_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub rating: f64,
    pub price_per_night: f64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub available_rooms: u32,
    #[serde(default)]
    pub distance_from_center: String,
}

/// Activities for one itinerary day
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DayActivities {
    #[serde(default)]
    pub morning: String,
    #[serde(default)]
    pub afternoon: String,
    #[serde(default)]
    pub evening: String,
}

/// One day of the plan's itinerary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItineraryDay {
    /// 1-indexed day number
    pub day: u32,
    pub title: String,
    pub activities: DayActivities,
}

/// A complete generated travel plan
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TravelPlan {
    pub destination: String,
    pub origin: String,
    pub departure_date: String,
    pub return_date: String,
    /// Number of nights (the service calls this `days`)
    pub days: u32,
    #[serde(default)]
    pub passengers: u32,
    pub budget: f64,
    pub total_cost: f64,
    pub remaining_budget: f64,
    pub flight: FlightOffer,
    pub hotel: HotelOffer,
    pub itinerary: Vec<ItineraryDay>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub interests: Vec<String>,
}

/// Travel details accumulated across agent replies
///
/// Each chat reply may carry extracted fields; the brief folds the most
/// recent non-empty values and supplies the service defaults for the rest
/// when building a plan request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TravelBrief {
    pub destination: Option<String>,
    pub origin: Option<String>,
    pub budget: Option<f64>,
    pub days: Option<u32>,
    pub interests: Vec<String>,
    pub departure_date: Option<String>,
    pub passengers: Option<u32>,
}

impl TravelBrief {
    /// Fold newer extracted fields into this brief
    ///
    /// `None`/empty fields in `newer` leave existing values untouched.
    pub fn merge(&mut self, newer: &TravelBrief) {
        if newer.destination.is_some() {
            self.destination = newer.destination.clone();
        }
        if newer.origin.is_some() {
            self.origin = newer.origin.clone();
        }
        if newer.budget.is_some() {
            self.budget = newer.budget;
        }
        if newer.days.is_some() {
            self.days = newer.days;
        }
        if !newer.interests.is_empty() {
            self.interests = newer.interests.clone();
        }
        if newer.departure_date.is_some() {
            self.departure_date = newer.departure_date.clone();
        }
        if newer.passengers.is_some() {
            self.passengers = newer.passengers;
        }
    }

    /// True when no field has been extracted yet
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
