//! Conversation state machine
//!
//! Serializes chat and plan requests: at most one is outstanding at any
//! time, so replies always append in the order their requests were issued
//! and no request-epoch tagging is needed. The controller is sans-io: the
//! `begin_*` methods hand a request to the caller and `complete_*` methods
//! apply the outcome. Composed async helpers sit on top.

use tracing::{debug, warn};

use crate::api::{ApiError, ChatReply, ChatTurnRequest, PlanRequest, TravelApi};
use crate::domain::{ConversationMessage, Role, TravelBrief, TravelPlan};

/// Where the conversation currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversationStage {
    /// No request outstanding, not enough information to plan
    #[default]
    Idle,
    /// A chat turn is in flight
    AwaitingReply,
    /// The latest agent reply unlocked the plan action
    ReadyToPlan,
    /// A plan request is in flight
    PlanRequested,
    /// A plan has been generated; terminal for the conversation
    PlanReady,
}

impl std::fmt::Display for ConversationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::AwaitingReply => write!(f, "awaiting_reply"),
            Self::ReadyToPlan => write!(f, "ready_to_plan"),
            Self::PlanRequested => write!(f, "plan_requested"),
            Self::PlanReady => write!(f, "plan_ready"),
        }
    }
}

/// Drives one conversation with the planning agent
///
/// Side effects are observable only through the message sequence, the
/// travel brief, and the plan slot.
#[derive(Debug, Default)]
pub struct ConversationController {
    messages: Vec<ConversationMessage>,
    stage: ConversationStage,
    brief: TravelBrief,
    plan: Option<TravelPlan>,
    last_error: Option<String>,
}

impl ConversationController {
    pub fn new() -> Self {
        Self::default()
    }

    /// The append-only message sequence, in display order
    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn stage(&self) -> ConversationStage {
        self.stage
    }

    /// The most recently generated plan, if any
    pub fn plan(&self) -> Option<&TravelPlan> {
        self.plan.as_ref()
    }

    /// Travel details accumulated from agent replies
    pub fn brief(&self) -> &TravelBrief {
        &self.brief
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// True when a new message would be accepted
    pub fn can_submit(&self) -> bool {
        matches!(self.stage, ConversationStage::Idle | ConversationStage::ReadyToPlan)
    }

    /// True when the plan-generation action is offered
    ///
    /// A fresh plan request is also accepted once a plan exists.
    pub fn can_request_plan(&self) -> bool {
        matches!(self.stage, ConversationStage::ReadyToPlan | ConversationStage::PlanReady)
    }

    /// Start a chat turn: append the user message and hand back the request
    ///
    /// Returns `None` (a no-op) for empty/whitespace text or when a request
    /// is already outstanding. The user message is appended optimistically
    /// before the call resolves and is never retracted.
    pub fn begin_message(&mut self, text: &str) -> Option<ChatTurnRequest> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            debug!("begin_message: empty input, rejecting");
            return None;
        }
        if !self.can_submit() {
            debug!(stage = %self.stage, "begin_message: request outstanding or conversation closed, rejecting");
            return None;
        }

        // Prior context only; the new message travels in its own field
        let history = self.messages.clone();
        self.messages.push(ConversationMessage::user(trimmed));
        self.stage = ConversationStage::AwaitingReply;
        debug!(history_len = history.len(), "begin_message: turn started");

        Some(ChatTurnRequest {
            message: trimmed.to_string(),
            conversation_history: history,
            extracted_info: self.brief.clone(),
        })
    }

    /// Apply the outcome of a chat turn
    ///
    /// On success the agent reply appends after the user message that caused
    /// it and readiness is re-evaluated against that latest message only. On
    /// failure the optimistic user message stays visible and the error is
    /// surfaced separately.
    pub fn complete_message(&mut self, outcome: Result<ChatReply, ApiError>) -> Result<(), ApiError> {
        match outcome {
            Ok(reply) => {
                debug!(reply_len = reply.message.len(), "complete_message: reply received");
                self.brief.merge(&reply.extracted_info);
                self.messages.push(ConversationMessage::agent(reply.message));
                self.last_error = None;
                self.stage = self.readiness_stage();
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "complete_message: chat turn failed");
                self.last_error = Some(e.to_string());
                self.stage = self.readiness_stage();
                Err(e)
            }
        }
    }

    /// Start a plan request, valid from `ReadyToPlan` (or again from
    /// `PlanReady` for a fresh plan)
    pub fn begin_plan(&mut self) -> Option<PlanRequest> {
        if !self.can_request_plan() {
            debug!(stage = %self.stage, "begin_plan: not ready, rejecting");
            return None;
        }
        self.stage = ConversationStage::PlanRequested;
        debug!("begin_plan: plan request started");
        Some(PlanRequest::from_brief(&self.brief))
    }

    /// Apply the outcome of a plan request
    ///
    /// Failure returns to `ReadyToPlan` so the plan action stays available.
    pub fn complete_plan(&mut self, outcome: Result<TravelPlan, ApiError>) -> Result<(), ApiError> {
        match outcome {
            Ok(plan) => {
                debug!(%plan.destination, "complete_plan: plan generated");
                self.plan = Some(plan);
                self.last_error = None;
                self.stage = ConversationStage::PlanReady;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "complete_plan: plan generation failed");
                self.last_error = Some(e.to_string());
                self.stage = ConversationStage::ReadyToPlan;
                Err(e)
            }
        }
    }

    /// Submit a message and wait for the reply (composed begin/complete)
    ///
    /// Returns `Ok(false)` when the message was rejected as a no-op.
    pub async fn submit_message(&mut self, api: &dyn TravelApi, text: &str) -> Result<bool, ApiError> {
        let Some(request) = self.begin_message(text) else {
            return Ok(false);
        };
        self.complete_message(api.chat(request).await)?;
        Ok(true)
    }

    /// Request plan generation and wait for it (composed begin/complete)
    ///
    /// Returns `Ok(false)` when the conversation is not ready to plan.
    pub async fn request_plan(&mut self, api: &dyn TravelApi) -> Result<bool, ApiError> {
        let Some(request) = self.begin_plan() else {
            return Ok(false);
        };
        self.complete_plan(api.generate_plan(request).await)?;
        Ok(true)
    }

    /// Readiness heuristic, evaluated against the most recent message only
    ///
    /// Earlier qualifying replies do not retroactively unlock planning.
    fn readiness_stage(&self) -> ConversationStage {
        match self.messages.last() {
            Some(last) if reply_signals_ready(last) => ConversationStage::ReadyToPlan,
            _ => ConversationStage::Idle,
        }
    }
}

/// The observed unlock signal: an agent reply containing "create"
/// (case-insensitive). Kept verbatim for service compatibility.
fn reply_signals_ready(message: &ConversationMessage) -> bool {
    message.role == Role::Agent && message.content.to_lowercase().contains("create")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::mock::MockTravelApi;
    use crate::domain::{DayActivities, FlightOffer, HotelOffer, ItineraryDay};

    fn reply(text: &str) -> ChatReply {
        ChatReply {
            message: text.to_string(),
            extracted_info: Default::default(),
        }
    }

    fn sample_plan() -> TravelPlan {
        TravelPlan {
            destination: "Goa".to_string(),
            origin: "Delhi".to_string(),
            departure_date: "2024-01-10".to_string(),
            return_date: "2024-01-13".to_string(),
            days: 3,
            passengers: 1,
            budget: 50_000.0,
            total_cost: 16_000.0,
            remaining_budget: 34_000.0,
            flight: FlightOffer {
                flight_id: "FL123".to_string(),
                airline: "IndiGo".to_string(),
                flight_number: "6E-204".to_string(),
                departure_time: "2024-01-10T08:00:00".to_string(),
                arrival_time: "2024-01-10T10:30:00".to_string(),
                duration: "2h 30m".to_string(),
                price: 5_000.0,
                currency: "INR".to_string(),
                stops: 0,
                origin: "Delhi".to_string(),
                destination: "Goa".to_string(),
                cabin_class: "economy".to_string(),
            },
            hotel: HotelOffer {
                hotel_id: "HT42".to_string(),
                name: "Seaside Resort".to_string(),
                category: "resort".to_string(),
                rating: 4.3,
                price_per_night: 2_000.0,
                currency: "INR".to_string(),
                location: "Calangute".to_string(),
                amenities: vec!["wifi".to_string(), "pool".to_string()],
                available_rooms: 5,
                distance_from_center: "1.2 km".to_string(),
            },
            itinerary: vec![ItineraryDay {
                day: 1,
                title: "Day 1 - Goa".to_string(),
                activities: DayActivities {
                    morning: "Beach walk".to_string(),
                    afternoon: "Water sports".to_string(),
                    evening: "Seafood dinner".to_string(),
                },
            }],
            summary: "A relaxed beach trip".to_string(),
            interests: vec!["relaxation".to_string()],
        }
    }

    #[tokio::test]
    async fn test_empty_and_whitespace_messages_rejected() {
        let api = MockTravelApi::new();
        let mut controller = ConversationController::new();

        assert!(!controller.submit_message(&api, "").await.unwrap());
        assert!(!controller.submit_message(&api, "   \t\n").await.unwrap());

        assert!(controller.messages().is_empty());
        assert_eq!(controller.stage(), ConversationStage::Idle);
        assert_eq!(api.chat_calls(), 0);
    }

    #[test]
    fn test_user_message_appended_optimistically() {
        let mut controller = ConversationController::new();
        let request = controller.begin_message("plan a beach trip").unwrap();

        assert_eq!(controller.stage(), ConversationStage::AwaitingReply);
        assert_eq!(controller.messages().len(), 1);
        assert_eq!(controller.messages()[0].role, Role::User);
        assert_eq!(controller.messages()[0].content, "plan a beach trip");
        // Prior context excludes the message itself
        assert!(request.conversation_history.is_empty());
    }

    #[test]
    fn test_second_message_rejected_while_outstanding() {
        let mut controller = ConversationController::new();
        assert!(controller.begin_message("first").is_some());
        assert!(controller.begin_message("second").is_none());
        assert_eq!(controller.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_readiness_unlocked_by_create_case_insensitive() {
        let api = MockTravelApi::new();
        api.queue_chat(Ok(reply("Great, I can CREATE an itinerary for you")));

        let mut controller = ConversationController::new();
        assert!(controller.submit_message(&api, "plan a beach trip").await.unwrap());

        assert_eq!(controller.stage(), ConversationStage::ReadyToPlan);
        assert!(controller.can_request_plan());
        assert_eq!(controller.messages().len(), 2);
        assert_eq!(controller.messages()[1].role, Role::Agent);
    }

    #[tokio::test]
    async fn test_readiness_evaluated_against_latest_message_only() {
        let api = MockTravelApi::new();
        api.queue_chat(Ok(reply("I can create a plan for you")));
        api.queue_chat(Ok(reply("Which month works best?")));

        let mut controller = ConversationController::new();
        controller.submit_message(&api, "beach trip").await.unwrap();
        assert_eq!(controller.stage(), ConversationStage::ReadyToPlan);

        controller.submit_message(&api, "somewhere warm").await.unwrap();
        // The earlier qualifying reply does not keep the action unlocked
        assert_eq!(controller.stage(), ConversationStage::Idle);
        assert!(!controller.can_request_plan());
    }

    #[tokio::test]
    async fn test_failed_chat_keeps_user_message_and_reports_error() {
        let api = MockTravelApi::new();
        api.queue_chat(Err(ApiError::Api {
            status: 500,
            message: "agent unavailable".to_string(),
        }));

        let mut controller = ConversationController::new();
        let result = controller.submit_message(&api, "plan a trip").await;

        assert!(result.is_err());
        // The optimistic user message was truthfully sent; it stays visible
        assert_eq!(controller.messages().len(), 1);
        assert_eq!(controller.messages()[0].content, "plan a trip");
        assert_eq!(controller.stage(), ConversationStage::Idle);
        assert!(controller.last_error().unwrap().contains("agent unavailable"));

        // Manual retry is possible
        assert!(controller.can_submit());
    }

    #[tokio::test]
    async fn test_plan_request_rejected_when_not_ready() {
        let api = MockTravelApi::new();
        let mut controller = ConversationController::new();

        assert!(!controller.request_plan(&api).await.unwrap());
        assert_eq!(api.plan_calls(), 0);
    }

    #[tokio::test]
    async fn test_plan_request_success_reaches_plan_ready() {
        let api = MockTravelApi::new();
        api.queue_chat(Ok(reply("Great, I can create an itinerary for you")));
        api.queue_plan(Ok(sample_plan()));

        let mut controller = ConversationController::new();
        controller.submit_message(&api, "plan a beach trip").await.unwrap();
        assert!(controller.request_plan(&api).await.unwrap());

        assert_eq!(controller.stage(), ConversationStage::PlanReady);
        let plan = controller.plan().unwrap();
        assert_eq!(plan.flight.price, 5_000.0);
        assert_eq!(plan.hotel.price_per_night, 2_000.0);
        assert_eq!(api.plan_calls(), 1);

        // Terminal for the conversation: no further messages
        assert!(!controller.can_submit());
        // But a fresh plan request is allowed
        assert!(controller.can_request_plan());
    }

    #[tokio::test]
    async fn test_failed_plan_returns_to_ready() {
        let api = MockTravelApi::new();
        api.queue_chat(Ok(reply("I can create that")));
        api.queue_plan(Err(ApiError::Api {
            status: 502,
            message: "planner down".to_string(),
        }));

        let mut controller = ConversationController::new();
        controller.submit_message(&api, "beach trip").await.unwrap();

        let result = controller.request_plan(&api).await;
        assert!(result.is_err());
        assert_eq!(controller.stage(), ConversationStage::ReadyToPlan);
        assert!(controller.can_request_plan());
        assert!(controller.plan().is_none());
        assert!(controller.last_error().unwrap().contains("planner down"));
    }

    #[tokio::test]
    async fn test_brief_accumulates_across_replies() {
        let api = MockTravelApi::new();
        api.queue_chat(Ok(ChatReply {
            message: "Goa sounds lovely".to_string(),
            extracted_info: TravelBrief {
                destination: Some("Goa".to_string()),
                ..Default::default()
            },
        }));
        api.queue_chat(Ok(ChatReply {
            message: "Noted, I can create a 4-day plan".to_string(),
            extracted_info: TravelBrief {
                days: Some(4),
                budget: Some(60_000.0),
                ..Default::default()
            },
        }));

        let mut controller = ConversationController::new();
        controller.submit_message(&api, "beach trip to Goa").await.unwrap();
        controller.submit_message(&api, "4 days, 60k budget").await.unwrap();

        let request = controller.begin_plan().unwrap();
        assert_eq!(request.destination, "Goa");
        assert_eq!(request.days, 4);
        assert_eq!(request.budget, 60_000.0);
    }
}
