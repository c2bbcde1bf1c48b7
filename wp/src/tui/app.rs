//! TUI application - event handling and state management
//!
//! The App struct owns the AppState and handles all keyboard events.
//! It does not do any rendering - that's delegated to the views module.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use super::state::{AppState, FilterField, HistoryOp, InteractionMode, SearchForm, View};
use crate::booking::BookingStage;
use crate::history::HistoryTab;

/// TUI application
#[derive(Debug, Default)]
pub struct App {
    state: AppState,
}

impl App {
    pub fn new() -> Self {
        Self { state: AppState::new() }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    /// Handle a key event
    ///
    /// Returns true if the application should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        debug!(?key, "App::handle_key: called");
        // Transient notices clear on any key press
        self.state.clear_error();

        // Force quit works from anywhere
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }

        match self.state.interaction_mode.clone() {
            InteractionMode::Normal => self.handle_normal_key(key),
            InteractionMode::SearchForm => {
                self.handle_search_form_key(key);
                false
            }
            InteractionMode::FilterInput { field, buffer } => {
                self.handle_filter_key(key, field, buffer);
                false
            }
            InteractionMode::PassengerForm { for_flight } => {
                self.handle_passenger_key(key, for_flight);
                false
            }
        }
    }

    /// Handle key in normal mode
    fn handle_normal_key(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Tab {
            self.state.current_view = self.state.current_view.next();
            return false;
        }

        match self.state.current_view {
            View::Chat => self.handle_chat_key(key),
            View::Search => self.handle_search_key(key),
            View::Plan => return self.handle_plan_key(key),
            View::History => return self.handle_history_key(key),
        }
        false
    }

    /// Chat view: the input line is always live
    fn handle_chat_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                let input = self.state.chat_input.trim().to_string();
                if !input.is_empty() && self.state.chat_can_send() {
                    debug!(input_len = input.len(), "App::handle_chat_key: submitting message");
                    self.state.chat_input.clear();
                    self.state.pending_chat_submit = Some(input);
                }
            }
            // Generate the plan once the readiness heuristic unlocked it
            KeyCode::Char('g') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                if self.state.plan_available() {
                    debug!("App::handle_chat_key: plan generation requested");
                    self.state.plan_requested = true;
                }
            }
            KeyCode::Backspace => {
                self.state.chat_input.pop();
            }
            KeyCode::Char(c) => {
                self.state.chat_input.push(c);
            }
            _ => {}
        }
    }

    /// Search view navigation
    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('e') => {
                self.state.interaction_mode = InteractionMode::SearchForm;
            }
            KeyCode::Enter => {
                if self.state.search_form.is_submittable() && !self.state.searching {
                    self.state.search_requested = true;
                }
            }
            KeyCode::Char('j') | KeyCode::Down => {
                if !self.state.search_results.is_empty() {
                    self.state.search_selected =
                        (self.state.search_selected + 1).min(self.state.search_results.len() - 1);
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.state.search_selected = self.state.search_selected.saturating_sub(1);
            }
            KeyCode::Char('b') => {
                if let Some(offer) = self.state.search_results.get(self.state.search_selected) {
                    let flight_id = offer.flight_id.clone();
                    self.state.passenger_field = 0;
                    self.state.interaction_mode = InteractionMode::PassengerForm {
                        for_flight: Some(flight_id),
                    };
                }
            }
            KeyCode::Char('q') => self.state.should_quit = true,
            _ => {}
        }
    }

    /// Plan view
    fn handle_plan_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('b') => {
                // Booking is only offered for a generated plan and while the
                // form is editable
                if self.state.plan.is_some() && self.state.booking_stage == BookingStage::Editing {
                    self.state.passenger_field = 0;
                    self.state.interaction_mode = InteractionMode::PassengerForm { for_flight: None };
                }
                false
            }
            KeyCode::Char('q') => true,
            _ => false,
        }
    }

    /// History view: paging, tab switching, filter edits
    fn handle_history_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('t') => self.state.history_ops.push(HistoryOp::SwitchTab),
            KeyCode::Char('n') | KeyCode::Right => self.state.history_ops.push(HistoryOp::NextPage),
            KeyCode::Char('p') | KeyCode::Left => self.state.history_ops.push(HistoryOp::PrevPage),
            KeyCode::Char('f') => self.state.history_ops.push(HistoryOp::CycleStatus),
            KeyCode::Char('r') => self.state.history_ops.push(HistoryOp::Refresh),
            KeyCode::Char('o') if self.state.history_tab == HistoryTab::Searches => {
                self.state.interaction_mode = InteractionMode::FilterInput {
                    field: FilterField::Origin,
                    buffer: self.state.search_filters.origin.clone(),
                };
            }
            KeyCode::Char('d') if self.state.history_tab == HistoryTab::Searches => {
                self.state.interaction_mode = InteractionMode::FilterInput {
                    field: FilterField::Destination,
                    buffer: self.state.search_filters.destination.clone(),
                };
            }
            KeyCode::Char('q') => return true,
            _ => {}
        }
        false
    }

    /// Search form editing
    fn handle_search_form_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => {
                self.state.interaction_mode = InteractionMode::Normal;
                if key.code == KeyCode::Enter && self.state.search_form.is_submittable() && !self.state.searching {
                    self.state.search_requested = true;
                }
            }
            KeyCode::Tab | KeyCode::Down => {
                self.state.search_field = (self.state.search_field + 1) % SearchForm::FIELD_COUNT;
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.state.search_field =
                    (self.state.search_field + SearchForm::FIELD_COUNT - 1) % SearchForm::FIELD_COUNT;
            }
            KeyCode::Backspace => {
                let field = self.state.search_field;
                self.state.search_form.field_mut(field).pop();
            }
            KeyCode::Char(c) => {
                let field = self.state.search_field;
                self.state.search_form.field_mut(field).push(c);
            }
            _ => {}
        }
    }

    /// Filter value editing (Searches tab)
    fn handle_filter_key(&mut self, key: KeyEvent, field: FilterField, mut buffer: String) {
        match key.code {
            KeyCode::Esc => {
                self.state.interaction_mode = InteractionMode::Normal;
            }
            KeyCode::Enter => {
                let op = match field {
                    FilterField::Origin => HistoryOp::SetOrigin(buffer),
                    FilterField::Destination => HistoryOp::SetDestination(buffer),
                };
                self.state.history_ops.push(op);
                self.state.interaction_mode = InteractionMode::Normal;
            }
            KeyCode::Backspace => {
                buffer.pop();
                self.state.interaction_mode = InteractionMode::FilterInput { field, buffer };
            }
            KeyCode::Char(c) => {
                buffer.push(c);
                self.state.interaction_mode = InteractionMode::FilterInput { field, buffer };
            }
            _ => {}
        }
    }

    /// Passenger form editing (plan or single-flight booking)
    fn handle_passenger_key(&mut self, key: KeyEvent, for_flight: Option<String>) {
        match key.code {
            KeyCode::Esc => {
                self.state.interaction_mode = InteractionMode::Normal;
            }
            KeyCode::Enter => {
                // The submit control stays disabled until all four fields
                // are filled and nothing is outstanding
                if self.state.passenger.is_complete() {
                    match for_flight {
                        Some(flight_id) => {
                            if self.state.flight_booking_requested.is_none() {
                                self.state.flight_booking_requested = Some(flight_id);
                                self.state.interaction_mode = InteractionMode::Normal;
                            }
                        }
                        None => {
                            if self.state.booking_stage == BookingStage::Editing {
                                self.state.booking_submit_requested = true;
                            }
                        }
                    }
                }
            }
            KeyCode::Tab | KeyCode::Down => {
                self.state.passenger_field = (self.state.passenger_field + 1) % 4;
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.state.passenger_field = (self.state.passenger_field + 3) % 4;
            }
            KeyCode::Backspace => {
                self.state.passenger_field_mut().pop();
            }
            KeyCode::Char(c) => {
                self.state.passenger_field_mut().push(c);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::ConversationStage;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_chat_enter_queues_submit() {
        let mut app = App::new();
        app.state_mut().current_view = View::Chat;
        type_text(&mut app, "plan a beach trip");
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.state().pending_chat_submit.as_deref(), Some("plan a beach trip"));
        assert!(app.state().chat_input.is_empty());
    }

    #[test]
    fn test_chat_send_disabled_while_awaiting_reply() {
        let mut app = App::new();
        app.state_mut().current_view = View::Chat;
        app.state_mut().stage = ConversationStage::AwaitingReply;
        type_text(&mut app, "hello");
        app.handle_key(key(KeyCode::Enter));

        assert!(app.state().pending_chat_submit.is_none());
        // Typed text is preserved for when the reply lands
        assert_eq!(app.state().chat_input, "hello");
    }

    #[test]
    fn test_plan_shortcut_requires_readiness() {
        let mut app = App::new();
        app.state_mut().current_view = View::Chat;

        let ctrl_g = KeyEvent::new(KeyCode::Char('g'), KeyModifiers::CONTROL);
        app.handle_key(ctrl_g);
        assert!(!app.state().plan_requested);

        app.state_mut().stage = ConversationStage::ReadyToPlan;
        app.handle_key(ctrl_g);
        assert!(app.state().plan_requested);
    }

    #[test]
    fn test_passenger_form_enter_disabled_until_complete() {
        let mut app = App::new();
        app.state_mut().current_view = View::Plan;
        app.state_mut().plan = Some(Default::default());
        app.handle_key(key(KeyCode::Char('b')));
        assert!(matches!(
            app.state().interaction_mode,
            InteractionMode::PassengerForm { for_flight: None }
        ));

        app.handle_key(key(KeyCode::Enter));
        assert!(!app.state().booking_submit_requested);

        for text in ["Asha", "Rao", "asha@example.com", "9876543210"] {
            type_text(&mut app, text);
            app.handle_key(key(KeyCode::Tab));
        }
        app.handle_key(key(KeyCode::Enter));
        assert!(app.state().booking_submit_requested);
    }

    #[test]
    fn test_history_filter_edit_queues_op() {
        let mut app = App::new();
        app.state_mut().current_view = View::History;
        app.handle_key(key(KeyCode::Char('o')));
        type_text(&mut app, "Delhi");
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.state().history_ops, vec![HistoryOp::SetOrigin("Delhi".to_string())]);
        assert_eq!(app.state().interaction_mode, InteractionMode::Normal);
    }

    #[test]
    fn test_tab_cycles_views() {
        let mut app = App::new();
        assert_eq!(app.state().current_view, View::Chat);
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.state().current_view, View::Plan);
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.state().current_view, View::History);
    }
}
