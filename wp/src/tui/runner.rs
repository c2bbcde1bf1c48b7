//! TUI Runner - main loop that owns the terminal and the flow components
//!
//! The TuiRunner is responsible for:
//! - Initializing and restoring the terminal
//! - Dispatching events to App for handling
//! - Spawning background tasks for remote calls and draining their results
//! - Copying component snapshots into AppState for rendering
//!
//! Each flow keeps its own result channel and task handle; the flow's own
//! state machine guarantees at most one request is outstanding, so replies
//! apply in the order their requests were issued.

use std::sync::Arc;
use std::time::Duration;

use eyre::Result;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::Tui;
use super::app::App;
use super::events::{Event, EventHandler};
use super::state::{HistoryOp, InteractionMode, View};
use super::views;
use crate::api::{
    ApiError, BookingConfirmation, BookingsPage, ChatReply, FlightBookingRequest, FlightSearchRequest,
    FlightSearchResponse, HistoryPage, TravelApi,
};
use crate::booking::BookingFlow;
use crate::config::Config;
use crate::conversation::ConversationController;
use crate::costing;
use crate::domain::{BookingStatus, SearchStatus, TravelPlan};
use crate::history::{HistoryBrowser, HistoryTab};
use crate::thoughts::ThoughtStream;

/// Result of a history fetch, tagged with the tab it belongs to so a reply
/// is always applied to its own view
#[derive(Debug)]
enum HistoryFetch {
    Searches(Result<HistoryPage, ApiError>),
    Bookings(Result<BookingsPage, ApiError>),
}

/// TUI Runner that manages the terminal and event loop
pub struct TuiRunner {
    app: App,
    terminal: Tui,
    api: Arc<dyn TravelApi>,
    event_handler: EventHandler,

    controller: ConversationController,
    thoughts: ThoughtStream,
    booking: BookingFlow,
    browser: HistoryBrowser,

    chat_rx: Option<mpsc::Receiver<Result<ChatReply, ApiError>>>,
    chat_task: Option<JoinHandle<()>>,
    plan_rx: Option<mpsc::Receiver<Result<TravelPlan, ApiError>>>,
    plan_task: Option<JoinHandle<()>>,
    search_rx: Option<mpsc::Receiver<Result<FlightSearchResponse, ApiError>>>,
    search_task: Option<JoinHandle<()>>,
    booking_rx: Option<mpsc::Receiver<Result<BookingConfirmation, ApiError>>>,
    booking_task: Option<JoinHandle<()>>,
    flight_booking_rx: Option<mpsc::Receiver<Result<BookingConfirmation, ApiError>>>,
    flight_booking_task: Option<JoinHandle<()>>,
    history_rx: Option<mpsc::Receiver<HistoryFetch>>,
    history_task: Option<JoinHandle<()>>,

    /// The active history tab needs a (re)fetch
    history_dirty: bool,
}

impl TuiRunner {
    pub fn new(terminal: Tui, api: Arc<dyn TravelApi>, config: &Config) -> Self {
        debug!("TuiRunner::new: called");
        Self {
            app: App::new(),
            terminal,
            api,
            event_handler: EventHandler::new(Duration::from_millis(33)), // ~30 FPS
            controller: ConversationController::new(),
            thoughts: ThoughtStream::new(Duration::from_millis(config.ui.thought_reveal_ms)),
            booking: BookingFlow::new(),
            browser: HistoryBrowser::new(config.ui.page_size),
            chat_rx: None,
            chat_task: None,
            plan_rx: None,
            plan_task: None,
            search_rx: None,
            search_task: None,
            booking_rx: None,
            booking_task: None,
            flight_booking_rx: None,
            flight_booking_task: None,
            history_rx: None,
            history_task: None,
            history_dirty: true,
        }
    }

    /// Run the TUI main loop
    pub async fn run(&mut self) -> Result<()> {
        debug!("TuiRunner::run: entering main loop");
        loop {
            self.sync_state();
            self.terminal.draw(|frame| views::render(self.app.state(), frame))?;

            match self.event_handler.next().await? {
                Event::Tick => self.handle_tick(),
                Event::Key(key_event) => {
                    if self.app.handle_key(key_event) {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
            }

            if self.app.state().should_quit {
                debug!("TuiRunner::run: should_quit is true, breaking");
                break;
            }
        }

        debug!("TuiRunner::run: exiting");
        Ok(())
    }

    /// Handle tick event - start pending work and drain results
    fn handle_tick(&mut self) {
        // Pending intents queued by key handling
        if let Some(input) = self.app.state_mut().pending_chat_submit.take() {
            self.start_chat(&input);
        }
        if std::mem::take(&mut self.app.state_mut().plan_requested) {
            self.start_plan();
        }
        if std::mem::take(&mut self.app.state_mut().search_requested) {
            self.start_search();
        }
        if std::mem::take(&mut self.app.state_mut().booking_submit_requested) {
            self.start_plan_booking();
        }
        if let Some(flight_id) = self.app.state_mut().flight_booking_requested.take() {
            self.start_flight_booking(&flight_id);
        }

        let ops: Vec<HistoryOp> = std::mem::take(&mut self.app.state_mut().history_ops);
        for op in ops {
            self.apply_history_op(op);
        }

        // Completed background work
        self.drain_chat_results();
        self.drain_plan_results();
        self.drain_search_results();
        self.drain_booking_results();
        self.drain_flight_booking_results();
        self.drain_history_results();

        if self.history_dirty && self.history_task.is_none() {
            self.start_history_fetch();
        }
    }

    /// Start a chat turn (the controller rejects it if one is outstanding)
    fn start_chat(&mut self, input: &str) {
        let Some(request) = self.controller.begin_message(input) else {
            debug!("start_chat: controller rejected submission");
            return;
        };
        info!(message_len = request.message.len(), "start_chat: spawning chat task");

        let api = Arc::clone(&self.api);
        let (tx, rx) = mpsc::channel(1);
        self.chat_rx = Some(rx);
        self.chat_task = Some(tokio::spawn(async move {
            let result = api.chat(request).await;
            let _ = tx.send(result).await;
        }));
    }

    fn drain_chat_results(&mut self) {
        let Some(rx) = &mut self.chat_rx else { return };
        if let Ok(result) = rx.try_recv() {
            if let Err(e) = self.controller.complete_message(result) {
                self.app.state_mut().set_error(format!("Chat failed: {e}"));
            }
            self.chat_rx = None;
            self.chat_task = None;
        }
    }

    /// Start plan generation (valid only when the readiness heuristic fired)
    fn start_plan(&mut self) {
        let Some(request) = self.controller.begin_plan() else {
            debug!("start_plan: controller rejected plan request");
            return;
        };
        info!(%request.destination, "start_plan: spawning plan task");

        let api = Arc::clone(&self.api);
        let (tx, rx) = mpsc::channel(1);
        self.plan_rx = Some(rx);
        self.plan_task = Some(tokio::spawn(async move {
            let result = api.generate_plan(request).await;
            let _ = tx.send(result).await;
        }));
    }

    fn drain_plan_results(&mut self) {
        let Some(rx) = &mut self.plan_rx else { return };
        if let Ok(result) = rx.try_recv() {
            match self.controller.complete_plan(result) {
                Ok(()) => {
                    // A fresh plan gets a fresh booking form
                    self.booking.reset();
                    self.app.state_mut().current_view = View::Plan;
                }
                Err(e) => {
                    self.app.state_mut().set_error(format!("Plan generation failed: {e}"));
                }
            }
            self.plan_rx = None;
            self.plan_task = None;
        }
    }

    /// Start a flight search; its reply carries the agent's reasoning trace
    fn start_search(&mut self) {
        if self.search_task.is_some() {
            debug!("start_search: search already in flight, rejecting");
            return;
        }
        let form = &self.app.state().search_form;
        let return_date = {
            let trimmed = form.return_date.trim();
            if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
        };
        let request = FlightSearchRequest {
            origin: form.origin.trim().to_string(),
            destination: form.destination.trim().to_string(),
            departure_date: form.departure_date.trim().to_string(),
            trip_type: if return_date.is_some() {
                "round_trip".to_string()
            } else {
                "one_way".to_string()
            },
            return_date,
            passengers: form.passengers.trim().parse().unwrap_or(1),
            cabin_class: {
                let cabin = form.cabin_class.trim();
                if cabin.is_empty() { "economy".to_string() } else { cabin.to_string() }
            },
        };
        info!(%request.origin, %request.destination, "start_search: spawning search task");

        self.app.state_mut().searching = true;
        self.app.state_mut().search_results.clear();
        self.app.state_mut().search_selected = 0;
        self.app.state_mut().flight_confirmation = None;
        self.thoughts.set_processing(true);

        let api = Arc::clone(&self.api);
        let (tx, rx) = mpsc::channel(1);
        self.search_rx = Some(rx);
        self.search_task = Some(tokio::spawn(async move {
            let result = api.search_flights(request).await;
            let _ = tx.send(result).await;
        }));
    }

    fn drain_search_results(&mut self) {
        let Some(rx) = &mut self.search_rx else { return };
        if let Ok(result) = rx.try_recv() {
            self.thoughts.set_processing(false);
            self.app.state_mut().searching = false;
            match result {
                Ok(response) => {
                    info!(flights = response.flights.len(), "drain_search_results: search completed");
                    // The new turn replaces any still-revealing trace
                    self.thoughts.begin_turn(response.thoughts);
                    self.app.state_mut().search_results = response.flights;
                    self.app.state_mut().search_message = response.message;
                }
                Err(e) => {
                    warn!(error = %e, "drain_search_results: search failed");
                    self.app.state_mut().set_error(format!("Search failed: {e}"));
                }
            }
            self.search_rx = None;
            self.search_task = None;
        }
    }

    /// Start booking the generated plan
    fn start_plan_booking(&mut self) {
        let Some(plan) = self.controller.plan().cloned() else {
            self.app.state_mut().set_error("No plan to book");
            return;
        };
        // Copy the form into the flow; it owns submission state from here
        *self.booking.details_mut() = self.app.state().passenger.clone();
        let Some(passenger_details) = self.booking.begin_submit() else {
            debug!("start_plan_booking: flow rejected submission");
            return;
        };
        info!("start_plan_booking: spawning booking task");

        let api = Arc::clone(&self.api);
        let (tx, rx) = mpsc::channel(1);
        self.booking_rx = Some(rx);
        self.booking_task = Some(tokio::spawn(async move {
            let request = crate::api::PlanBookingRequest {
                plan,
                passenger_details,
            };
            let result = api.book_plan(request).await;
            let _ = tx.send(result).await;
        }));
    }

    fn drain_booking_results(&mut self) {
        let Some(rx) = &mut self.booking_rx else { return };
        if let Ok(result) = rx.try_recv() {
            match self.booking.complete_submit(result) {
                Ok(()) => {
                    // Close the form; the plan view shows the confirmation
                    self.app.state_mut().interaction_mode = InteractionMode::Normal;
                }
                Err(e) => {
                    // Entered values stay in the form for a manual retry
                    self.app.state_mut().set_error(format!("Booking failed: {e}"));
                }
            }
            self.booking_rx = None;
            self.booking_task = None;
        }
    }

    /// Book one flight offer from the search results
    fn start_flight_booking(&mut self, flight_id: &str) {
        if self.flight_booking_task.is_some() {
            debug!("start_flight_booking: booking already in flight, rejecting");
            return;
        }
        let request = FlightBookingRequest {
            flight_id: flight_id.to_string(),
            passenger_details: self.app.state().passenger.clone(),
        };
        info!(%request.flight_id, "start_flight_booking: spawning booking task");

        let api = Arc::clone(&self.api);
        let (tx, rx) = mpsc::channel(1);
        self.flight_booking_rx = Some(rx);
        self.flight_booking_task = Some(tokio::spawn(async move {
            let result = api.book_flight(request).await;
            let _ = tx.send(result).await;
        }));
    }

    fn drain_flight_booking_results(&mut self) {
        let Some(rx) = &mut self.flight_booking_rx else { return };
        if let Ok(result) = rx.try_recv() {
            match result {
                Ok(confirmation) => {
                    let code = confirmation.confirmation_code.unwrap_or_default();
                    self.app.state_mut().flight_confirmation =
                        Some(format!("{} (confirmation {code})", confirmation.message));
                }
                Err(e) => {
                    self.app.state_mut().set_error(format!("Flight booking failed: {e}"));
                }
            }
            self.flight_booking_rx = None;
            self.flight_booking_task = None;
        }
    }

    /// Apply one queued history intent to the browser
    fn apply_history_op(&mut self, op: HistoryOp) {
        debug!(?op, "apply_history_op: called");
        match op {
            HistoryOp::SwitchTab => {
                let next = match self.browser.active_tab() {
                    HistoryTab::Searches => HistoryTab::Bookings,
                    HistoryTab::Bookings => HistoryTab::Searches,
                };
                self.browser.switch_tab(next);
                self.history_dirty = true;
            }
            HistoryOp::NextPage => {
                if self.browser.next_page() {
                    self.history_dirty = true;
                }
            }
            HistoryOp::PrevPage => {
                if self.browser.prev_page() {
                    self.history_dirty = true;
                }
            }
            HistoryOp::SetOrigin(origin) => {
                self.browser.searches_mut().set_origin(origin);
                self.history_dirty = true;
            }
            HistoryOp::SetDestination(destination) => {
                self.browser.searches_mut().set_destination(destination);
                self.history_dirty = true;
            }
            HistoryOp::CycleStatus => {
                match self.browser.active_tab() {
                    HistoryTab::Searches => {
                        // Searches status domain: any -> success -> any
                        let next = match self.browser.searches().filters.status {
                            None => Some(SearchStatus::Success),
                            Some(_) => None,
                        };
                        self.browser.searches_mut().set_status(next);
                    }
                    HistoryTab::Bookings => {
                        // Bookings status domain: any -> confirmed -> cancelled -> pending -> any
                        let next = match self.browser.bookings().status {
                            None => Some(BookingStatus::Confirmed),
                            Some(BookingStatus::Confirmed) => Some(BookingStatus::Cancelled),
                            Some(BookingStatus::Cancelled) => Some(BookingStatus::Pending),
                            Some(BookingStatus::Pending) => None,
                        };
                        self.browser.bookings_mut().set_status(next);
                    }
                }
                self.history_dirty = true;
            }
            HistoryOp::Refresh => {
                self.history_dirty = true;
            }
        }
    }

    /// Fetch the active tab's current page in the background
    fn start_history_fetch(&mut self) {
        self.history_dirty = false;
        let api = Arc::clone(&self.api);
        let (tx, rx) = mpsc::channel(1);
        self.history_rx = Some(rx);

        match self.browser.active_tab() {
            HistoryTab::Searches => {
                let query = self.browser.searches().query();
                debug!(query.offset, "start_history_fetch: searches page");
                self.history_task = Some(tokio::spawn(async move {
                    let result = api.search_history(query).await;
                    let _ = tx.send(HistoryFetch::Searches(result)).await;
                }));
            }
            HistoryTab::Bookings => {
                let query = self.browser.bookings().query();
                debug!(query.offset, "start_history_fetch: bookings page");
                self.history_task = Some(tokio::spawn(async move {
                    let result = api.bookings(query).await;
                    let _ = tx.send(HistoryFetch::Bookings(result)).await;
                }));
            }
        }
    }

    fn drain_history_results(&mut self) {
        let Some(rx) = &mut self.history_rx else { return };
        if let Ok(fetch) = rx.try_recv() {
            // Tagged results always land in their own view, even if the
            // user switched tabs while the fetch was in flight
            match fetch {
                HistoryFetch::Searches(Ok(page)) => self.browser.apply_searches(page),
                HistoryFetch::Bookings(Ok(page)) => self.browser.apply_bookings(page),
                HistoryFetch::Searches(Err(e)) | HistoryFetch::Bookings(Err(e)) => self.browser.record_error(&e),
            }
            self.history_rx = None;
            self.history_task = None;
        }
    }

    /// Copy component snapshots into AppState for rendering
    fn sync_state(&mut self) {
        // Derive the cost breakdown once per plan snapshot; views only
        // render these numbers
        let plan = self.controller.plan().cloned();
        let costs = plan.as_ref().and_then(|p| costing::breakdown_for(p).ok());

        let state = self.app.state_mut();
        state.messages = self.controller.messages().to_vec();
        state.stage = self.controller.stage();
        state.plan = plan;
        state.costs = costs;

        state.visible_thoughts = self.thoughts.visible_steps();
        state.thinking = self.thoughts.is_processing();

        state.booking_stage = self.booking.stage().clone();

        state.history_tab = self.browser.active_tab();
        state.search_items = self.browser.searches().items.clone();
        state.booking_items = self.browser.bookings().items.clone();
        state.search_filters = self.browser.searches().filters.clone();
        state.bookings_status = self.browser.bookings().status;
        state.page_label = self.browser.page_label();
        state.can_next = self.browser.active_page().can_next();
        state.can_prev = self.browser.active_page().can_prev();
        state.history_error = self.browser.last_error().map(str::to_string);
    }
}
