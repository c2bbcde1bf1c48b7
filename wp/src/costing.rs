//! Cost derivation for travel plans
//!
//! The single source for every number shown in a cost breakdown. Views must
//! render these fields directly and never fetch or recompute a total, so the
//! displayed "Total" is always exactly the sum of the displayed line items.

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::TravelPlan;

/// Errors from cost derivation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CostError {
    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Stay must be at least one night ({departure} to {return_date})")]
    EmptyStay { departure: NaiveDate, return_date: NaiveDate },
}

/// A plan's derived cost breakdown
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostBreakdown {
    /// Outbound fare times two (symmetric-fare assumption)
    pub round_trip_flight: f64,
    /// Whole nights between departure and return
    pub nights: i64,
    pub hotel_total: f64,
    pub total: f64,
    /// May be negative; that is a displayable state, not an error
    pub remaining_budget: f64,
}

/// Whole nights between two YYYY-MM-DD dates
///
/// Zero or negative stays are invalid input and are rejected rather than
/// silently displayed.
pub fn nights_between(departure: &str, return_date: &str) -> Result<i64, CostError> {
    let departure = parse_date(departure)?;
    let return_date = parse_date(return_date)?;

    let nights = (return_date - departure).num_days();
    if nights <= 0 {
        return Err(CostError::EmptyStay { departure, return_date });
    }
    Ok(nights)
}

/// Derive a breakdown from unit prices, dates, and budget
pub fn breakdown(
    flight_price: f64,
    nightly_rate: f64,
    departure: &str,
    return_date: &str,
    budget: f64,
) -> Result<CostBreakdown, CostError> {
    let nights = nights_between(departure, return_date)?;

    let round_trip_flight = flight_price * 2.0;
    let hotel_total = nightly_rate * nights as f64;
    let total = round_trip_flight + hotel_total;

    Ok(CostBreakdown {
        round_trip_flight,
        nights,
        hotel_total,
        total,
        remaining_budget: budget - total,
    })
}

/// Derive the breakdown for a generated plan from its own unit prices
pub fn breakdown_for(plan: &TravelPlan) -> Result<CostBreakdown, CostError> {
    breakdown(
        plan.flight.price,
        plan.hotel.price_per_night,
        &plan.departure_date,
        &plan.return_date,
        plan.budget,
    )
}

fn parse_date(value: &str) -> Result<NaiveDate, CostError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| CostError::InvalidDate(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_breakdown_reference_scenario() {
        // Flight 5000, hotel 2000/night, 2024-01-10 -> 2024-01-13 is 3 nights
        let costs = breakdown(5000.0, 2000.0, "2024-01-10", "2024-01-13", 50_000.0).unwrap();

        assert_eq!(costs.round_trip_flight, 10_000.0);
        assert_eq!(costs.nights, 3);
        assert_eq!(costs.hotel_total, 6_000.0);
        assert_eq!(costs.total, 16_000.0);
        assert_eq!(costs.remaining_budget, 34_000.0);
    }

    #[test]
    fn test_negative_remaining_budget_is_valid() {
        let costs = breakdown(5000.0, 2000.0, "2024-01-10", "2024-01-13", 10_000.0).unwrap();
        assert_eq!(costs.remaining_budget, -6_000.0);
    }

    #[test]
    fn test_zero_night_stay_rejected() {
        let result = nights_between("2024-01-10", "2024-01-10");
        assert!(matches!(result, Err(CostError::EmptyStay { .. })));
    }

    #[test]
    fn test_negative_stay_rejected() {
        let result = nights_between("2024-01-13", "2024-01-10");
        assert!(matches!(result, Err(CostError::EmptyStay { .. })));
    }

    #[test]
    fn test_bad_date_rejected() {
        assert_eq!(
            nights_between("not-a-date", "2024-01-13"),
            Err(CostError::InvalidDate("not-a-date".to_string()))
        );
        assert!(nights_between("2024-01-10", "13/01/2024").is_err());
    }

    proptest! {
        /// total == 2p + rn and remaining == b - total, exactly
        #[test]
        fn prop_breakdown_is_internally_consistent(
            flight_price in 0.0f64..1_000_000.0,
            nightly_rate in 0.0f64..1_000_000.0,
            budget in 0.0f64..10_000_000.0,
            nights in 1i64..365,
        ) {
            let departure = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
            let return_date = departure + chrono::Duration::days(nights);

            let costs = breakdown(
                flight_price,
                nightly_rate,
                &departure.format("%Y-%m-%d").to_string(),
                &return_date.format("%Y-%m-%d").to_string(),
                budget,
            ).unwrap();

            prop_assert_eq!(costs.nights, nights);
            prop_assert_eq!(costs.total, flight_price * 2.0 + nightly_rate * nights as f64);
            prop_assert_eq!(costs.remaining_budget, budget - costs.total);
            // The displayed total is exactly the sum of the displayed line items
            prop_assert_eq!(costs.total, costs.round_trip_flight + costs.hotel_total);
        }
    }
}
