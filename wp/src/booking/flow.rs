//! Booking submission state machine
//!
//! Collects the four required passenger fields and submits the complete
//! plan. At most one submission is outstanding at a time; a failed
//! submission returns to the form with every entered value intact.

use tracing::{debug, warn};

use crate::api::{ApiError, BookingConfirmation, PlanBookingRequest, TravelApi};
use crate::domain::{PassengerDetails, TravelPlan};

/// Where the booking currently stands
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BookingStage {
    /// Collecting passenger details
    #[default]
    Editing,
    /// A submission is in flight
    Submitting,
    /// The booking succeeded
    Confirmed { confirmation_code: String, message: String },
}

/// Drives one plan booking
#[derive(Debug, Default)]
pub struct BookingFlow {
    details: PassengerDetails,
    stage: BookingStage,
    last_error: Option<String>,
}

impl BookingFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn details(&self) -> &PassengerDetails {
        &self.details
    }

    /// Mutable access for form editing; only meaningful while `Editing`
    pub fn details_mut(&mut self) -> &mut PassengerDetails {
        &mut self.details
    }

    pub fn stage(&self) -> &BookingStage {
        &self.stage
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// True when the submit control is enabled
    ///
    /// Requires all four fields non-empty and no submission outstanding.
    /// The server remains the authority on deeper validation.
    pub fn can_submit(&self) -> bool {
        matches!(self.stage, BookingStage::Editing) && self.details.is_complete()
    }

    /// Start a submission, handing back the passenger details to send
    pub fn begin_submit(&mut self) -> Option<PassengerDetails> {
        if !self.can_submit() {
            debug!(stage = ?self.stage, "begin_submit: not submittable, rejecting");
            return None;
        }
        self.stage = BookingStage::Submitting;
        debug!("begin_submit: submission started");
        Some(self.details.clone())
    }

    /// Apply the submission outcome
    ///
    /// Failure returns to `Editing` with entered values intact (no data
    /// loss) and surfaces a retryable error.
    pub fn complete_submit(&mut self, outcome: Result<BookingConfirmation, ApiError>) -> Result<(), ApiError> {
        match outcome {
            Ok(confirmation) => {
                debug!(status = %confirmation.status, "complete_submit: booking confirmed");
                self.last_error = None;
                self.stage = BookingStage::Confirmed {
                    confirmation_code: confirmation.confirmation_code.unwrap_or_default(),
                    message: confirmation.message,
                };
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "complete_submit: booking failed");
                self.last_error = Some(e.to_string());
                self.stage = BookingStage::Editing;
                Err(e)
            }
        }
    }

    /// Submit the plan booking and wait for the outcome
    ///
    /// Returns `Ok(false)` when submission is not currently allowed.
    pub async fn submit(&mut self, api: &dyn TravelApi, plan: &TravelPlan) -> Result<bool, ApiError> {
        let Some(passenger_details) = self.begin_submit() else {
            return Ok(false);
        };
        let request = PlanBookingRequest {
            plan: plan.clone(),
            passenger_details,
        };
        self.complete_submit(api.book_plan(request).await)?;
        Ok(true)
    }

    /// Clear the form for a new booking (e.g. when a new plan replaces the
    /// old one)
    pub fn reset(&mut self) {
        self.details = PassengerDetails::default();
        self.stage = BookingStage::Editing;
        self.last_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::mock::MockTravelApi;
    use crate::domain::{FlightOffer, HotelOffer};

    fn plan() -> TravelPlan {
        TravelPlan {
            destination: "Goa".to_string(),
            origin: "Delhi".to_string(),
            departure_date: "2024-01-10".to_string(),
            return_date: "2024-01-13".to_string(),
            days: 3,
            budget: 50_000.0,
            total_cost: 16_000.0,
            remaining_budget: 34_000.0,
            flight: FlightOffer {
                price: 5_000.0,
                ..Default::default()
            },
            hotel: HotelOffer {
                price_per_night: 2_000.0,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn fill(flow: &mut BookingFlow) {
        *flow.details_mut() = PassengerDetails {
            first_name: "Asha".to_string(),
            last_name: "Rao".to_string(),
            email: "asha@example.com".to_string(),
            phone: "+91 98765 43210".to_string(),
        };
    }

    #[tokio::test]
    async fn test_incomplete_form_cannot_submit() {
        let api = MockTravelApi::new();
        let mut flow = BookingFlow::new();
        flow.details_mut().first_name = "Asha".to_string();

        assert!(!flow.can_submit());
        assert!(!flow.submit(&api, &plan()).await.unwrap());
        assert_eq!(api.booking_calls(), 0);
    }

    #[tokio::test]
    async fn test_successful_submission_confirms() {
        let api = MockTravelApi::new();
        api.queue_plan_booking(Ok(BookingConfirmation {
            booking_id: "BK1".to_string(),
            status: "success".to_string(),
            confirmation_code: Some("CONF-7XK2".to_string()),
            message: "Complete travel plan booked successfully!".to_string(),
        }));

        let mut flow = BookingFlow::new();
        fill(&mut flow);
        assert!(flow.can_submit());

        assert!(flow.submit(&api, &plan()).await.unwrap());
        match flow.stage() {
            BookingStage::Confirmed {
                confirmation_code,
                message,
            } => {
                assert_eq!(confirmation_code, "CONF-7XK2");
                assert!(message.contains("booked successfully"));
            }
            other => panic!("expected Confirmed, got {:?}", other),
        }
        assert_eq!(api.booking_calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_submission_preserves_entered_values() {
        let api = MockTravelApi::new();
        api.queue_plan_booking(Err(ApiError::Api {
            status: 500,
            message: "booking engine down".to_string(),
        }));

        let mut flow = BookingFlow::new();
        fill(&mut flow);

        let result = flow.submit(&api, &plan()).await;
        assert!(result.is_err());

        // Back in the form with no data loss, ready for manual retry
        assert_eq!(flow.stage(), &BookingStage::Editing);
        assert_eq!(flow.details().first_name, "Asha");
        assert_eq!(flow.details().phone, "+91 98765 43210");
        assert!(flow.last_error().unwrap().contains("booking engine down"));
        assert!(flow.can_submit());
    }

    #[test]
    fn test_only_one_submission_outstanding() {
        let mut flow = BookingFlow::new();
        fill(&mut flow);

        assert!(flow.begin_submit().is_some());
        // Second begin while the first is in flight is a no-op
        assert!(flow.begin_submit().is_none());
        assert!(!flow.can_submit());
    }

    #[test]
    fn test_reset_clears_form() {
        let mut flow = BookingFlow::new();
        fill(&mut flow);
        flow.reset();
        assert_eq!(flow.details(), &PassengerDetails::default());
        assert_eq!(flow.stage(), &BookingStage::Editing);
    }
}
