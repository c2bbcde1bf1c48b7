//! Conversational trip planning
//!
//! Owns the message history, the plan-readiness heuristic, and the
//! plan-request trigger.

mod controller;

pub use controller::{ConversationController, ConversationStage};
