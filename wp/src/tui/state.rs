//! TUI application state
//!
//! Pure data structures for the TUI. No rendering logic here. The runner
//! copies component snapshots in and drains pending intents out on each
//! tick.

use crate::booking::BookingStage;
use crate::conversation::ConversationStage;
use crate::domain::{
    BookingRecord, BookingStatus, ConversationMessage, FlightOffer, PassengerDetails, SearchRecord, SearchStatus,
    ThoughtStep, TravelPlan,
};
use crate::costing::CostBreakdown;
use crate::history::{HistoryTab, SearchFilters};

/// Which view is currently displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// Flight search with the agent's reasoning trace
    Search,
    /// Conversational trip planning (default view)
    #[default]
    Chat,
    /// The generated plan and its cost breakdown
    Plan,
    /// Past searches and bookings
    History,
}

impl View {
    /// Display name for the header tabs
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Search => "Search",
            Self::Chat => "Chat",
            Self::Plan => "Plan",
            Self::History => "History",
        }
    }

    /// Cycle order for Tab navigation
    pub fn next(&self) -> Self {
        match self {
            Self::Search => Self::Chat,
            Self::Chat => Self::Plan,
            Self::Plan => Self::History,
            Self::History => Self::Search,
        }
    }
}

/// All top-level views in header order
pub const ALL_VIEWS: [View; 4] = [View::Search, View::Chat, View::Plan, View::History];

/// Searches-tab filter field being edited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Origin,
    Destination,
}

/// Interaction mode (modal)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InteractionMode {
    /// Normal navigation; the Chat view types into the chat input
    #[default]
    Normal,
    /// Editing the flight-search form
    SearchForm,
    /// Editing a Searches-tab filter value
    FilterInput { field: FilterField, buffer: String },
    /// Passenger form; `for_flight` books a single offer instead of the plan
    PassengerForm { for_flight: Option<String> },
}

/// Flight-search form buffers
#[derive(Debug, Clone, Default)]
pub struct SearchForm {
    pub origin: String,
    pub destination: String,
    pub departure_date: String,
    pub return_date: String,
    pub passengers: String,
    pub cabin_class: String,
}

impl SearchForm {
    pub const FIELD_COUNT: usize = 6;

    /// Field buffer by index, in form order
    pub fn field_mut(&mut self, index: usize) -> &mut String {
        match index {
            0 => &mut self.origin,
            1 => &mut self.destination,
            2 => &mut self.departure_date,
            3 => &mut self.return_date,
            4 => &mut self.passengers,
            _ => &mut self.cabin_class,
        }
    }

    pub fn field_label(index: usize) -> &'static str {
        match index {
            0 => "Origin",
            1 => "Destination",
            2 => "Departure (YYYY-MM-DD)",
            3 => "Return (optional)",
            4 => "Passengers",
            _ => "Cabin class",
        }
    }

    /// Minimum inputs for a search
    pub fn is_submittable(&self) -> bool {
        !self.origin.trim().is_empty()
            && !self.destination.trim().is_empty()
            && !self.departure_date.trim().is_empty()
    }
}

/// Intents against the history browser, drained by the runner
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryOp {
    SwitchTab,
    NextPage,
    PrevPage,
    SetOrigin(String),
    SetDestination(String),
    CycleStatus,
    Refresh,
}

/// TUI application state
#[derive(Debug, Default)]
pub struct AppState {
    pub current_view: View,
    pub interaction_mode: InteractionMode,
    pub should_quit: bool,
    /// Transient notice shown in the footer
    pub error: Option<String>,

    // === Search view ===
    pub search_form: SearchForm,
    pub search_field: usize,
    pub searching: bool,
    pub search_results: Vec<FlightOffer>,
    pub search_selected: usize,
    pub search_message: String,
    pub visible_thoughts: Vec<ThoughtStep>,
    pub thinking: bool,
    pub flight_confirmation: Option<String>,

    // === Chat view ===
    pub chat_input: String,
    pub messages: Vec<ConversationMessage>,
    pub stage: ConversationStage,

    // === Plan view ===
    pub plan: Option<TravelPlan>,
    pub costs: Option<CostBreakdown>,

    // === Booking form ===
    pub passenger: PassengerDetails,
    pub passenger_field: usize,
    pub booking_stage: BookingStage,

    // === History view snapshot ===
    pub history_tab: HistoryTab,
    pub search_items: Vec<SearchRecord>,
    pub booking_items: Vec<BookingRecord>,
    pub search_filters: SearchFilters,
    pub bookings_status: Option<BookingStatus>,
    pub page_label: String,
    pub can_next: bool,
    pub can_prev: bool,
    pub history_error: Option<String>,

    // === Pending intents for the runner ===
    pub pending_chat_submit: Option<String>,
    pub plan_requested: bool,
    pub search_requested: bool,
    pub booking_submit_requested: bool,
    pub flight_booking_requested: Option<String>,
    pub history_ops: Vec<HistoryOp>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Passenger form field buffer by index
    pub fn passenger_field_mut(&mut self) -> &mut String {
        match self.passenger_field {
            0 => &mut self.passenger.first_name,
            1 => &mut self.passenger.last_name,
            2 => &mut self.passenger.email,
            _ => &mut self.passenger.phone,
        }
    }

    pub fn passenger_field_label(index: usize) -> &'static str {
        match index {
            0 => "First name",
            1 => "Last name",
            2 => "Email",
            _ => "Phone",
        }
    }

    /// The chat send control is enabled only when no request is outstanding
    pub fn chat_can_send(&self) -> bool {
        matches!(self.stage, ConversationStage::Idle | ConversationStage::ReadyToPlan)
    }

    /// The plan-generation action is offered by the readiness heuristic
    pub fn plan_available(&self) -> bool {
        matches!(self.stage, ConversationStage::ReadyToPlan | ConversationStage::PlanReady)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_cycle_covers_all_views() {
        let mut view = View::Search;
        for _ in 0..ALL_VIEWS.len() {
            view = view.next();
        }
        assert_eq!(view, View::Search);
    }

    #[test]
    fn test_search_form_submittable() {
        let mut form = SearchForm::default();
        assert!(!form.is_submittable());

        form.origin = "Delhi".to_string();
        form.destination = "Goa".to_string();
        form.departure_date = "2024-01-10".to_string();
        assert!(form.is_submittable());
    }
}
