//! Plan booking submission

mod flow;

pub use flow::{BookingFlow, BookingStage};
