//! Two-tab record browser with a shared pagination/filter mechanism
//!
//! Each tab is an independent tagged view (`SearchesView` / `BookingsView`)
//! with its own filters, page state, items, and total, switched between
//! explicitly, never shared by reference. The two status vocabularies are
//! disjoint, so switching tabs resets the outgoing tab's filters rather
//! than letting a value that is meaningless in the new tab stay applied.
//!
//! Filters and paging position are coupled: every filter edit resets that
//! tab's offset to the first page.

use tracing::{debug, warn};

use crate::api::{ApiError, BookingsPage, BookingsQuery, HistoryPage, HistoryQuery, TravelApi};
use crate::domain::{BookingRecord, BookingStatus, SearchRecord, SearchStatus};

/// Fixed page size for the life of the browser
pub const PAGE_SIZE: u32 = 20;

/// Which record kind is being browsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryTab {
    #[default]
    Searches,
    Bookings,
}

impl std::fmt::Display for HistoryTab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Searches => write!(f, "searches"),
            Self::Bookings => write!(f, "bookings"),
        }
    }
}

/// Offset-based paging over one record kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    pub limit: u32,
    pub offset: u32,
    /// Total from the most recent fetch of this view
    pub total: u32,
}

impl PageState {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            offset: 0,
            total: 0,
        }
    }

    /// "Next" is enabled while another page exists
    pub fn can_next(&self) -> bool {
        self.offset + self.limit < self.total
    }

    /// "Previous" is enabled away from the first page
    pub fn can_prev(&self) -> bool {
        self.offset > 0
    }

    /// Advance by exactly one page; no-op when next is disabled
    pub fn advance(&mut self) -> bool {
        if !self.can_next() {
            return false;
        }
        self.offset += self.limit;
        true
    }

    /// Retreat by exactly one page; no-op when previous is disabled
    pub fn retreat(&mut self) -> bool {
        if !self.can_prev() {
            return false;
        }
        self.offset -= self.limit;
        true
    }

    /// Back to the first page (filters changed)
    pub fn reset(&mut self) {
        self.offset = 0;
    }

    pub fn current_page(&self) -> u32 {
        self.offset / self.limit + 1
    }

    pub fn total_pages(&self) -> u32 {
        self.total.div_ceil(self.limit).max(1)
    }

    pub fn label(&self) -> String {
        format!("Page {} of {} ({} total)", self.current_page(), self.total_pages(), self.total)
    }
}

/// Filter fields for the Searches tab
///
/// Status domain here is only `{"", success}`; origin/destination are
/// Searches-only fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilters {
    pub origin: String,
    pub destination: String,
    pub status: Option<SearchStatus>,
}

/// The Searches tab's own state
#[derive(Debug, Clone)]
pub struct SearchesView {
    pub filters: SearchFilters,
    pub page: PageState,
    pub items: Vec<SearchRecord>,
}

impl SearchesView {
    fn new(limit: u32) -> Self {
        Self {
            filters: SearchFilters::default(),
            page: PageState::new(limit),
            items: Vec::new(),
        }
    }

    pub fn set_origin(&mut self, origin: impl Into<String>) {
        self.filters.origin = origin.into();
        self.page.reset();
    }

    pub fn set_destination(&mut self, destination: impl Into<String>) {
        self.filters.destination = destination.into();
        self.page.reset();
    }

    pub fn set_status(&mut self, status: Option<SearchStatus>) {
        self.filters.status = status;
        self.page.reset();
    }

    fn reset_filters(&mut self) {
        self.filters = SearchFilters::default();
        self.page.reset();
    }

    /// Query for the current filters and page
    pub fn query(&self) -> HistoryQuery {
        HistoryQuery {
            limit: self.page.limit,
            offset: self.page.offset,
            origin: none_if_empty(&self.filters.origin),
            destination: none_if_empty(&self.filters.destination),
            status: self.filters.status,
        }
    }

    fn apply(&mut self, page: HistoryPage) {
        self.items = page.items;
        self.page.total = page.total;
    }
}

/// The Bookings tab's own state
///
/// Status domain is `{"", confirmed, cancelled, pending}`; no other filter
/// fields exist for bookings.
#[derive(Debug, Clone)]
pub struct BookingsView {
    pub status: Option<BookingStatus>,
    pub page: PageState,
    pub items: Vec<BookingRecord>,
}

impl BookingsView {
    fn new(limit: u32) -> Self {
        Self {
            status: None,
            page: PageState::new(limit),
            items: Vec::new(),
        }
    }

    pub fn set_status(&mut self, status: Option<BookingStatus>) {
        self.status = status;
        self.page.reset();
    }

    fn reset_filters(&mut self) {
        self.status = None;
        self.page.reset();
    }

    /// Query for the current filter and page
    pub fn query(&self) -> BookingsQuery {
        BookingsQuery {
            limit: self.page.limit,
            offset: self.page.offset,
            status: self.status,
        }
    }

    fn apply(&mut self, page: BookingsPage) {
        self.items = page.items;
        self.page.total = page.total;
    }
}

fn none_if_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}

/// Browses the two record kinds without ever mixing them
#[derive(Debug)]
pub struct HistoryBrowser {
    active: HistoryTab,
    searches: SearchesView,
    bookings: BookingsView,
    last_error: Option<String>,
}

impl Default for HistoryBrowser {
    fn default() -> Self {
        Self::new(PAGE_SIZE)
    }
}

impl HistoryBrowser {
    pub fn new(page_size: u32) -> Self {
        Self {
            active: HistoryTab::Searches,
            searches: SearchesView::new(page_size),
            bookings: BookingsView::new(page_size),
            last_error: None,
        }
    }

    pub fn active_tab(&self) -> HistoryTab {
        self.active
    }

    pub fn searches(&self) -> &SearchesView {
        &self.searches
    }

    pub fn searches_mut(&mut self) -> &mut SearchesView {
        &mut self.searches
    }

    pub fn bookings(&self) -> &BookingsView {
        &self.bookings
    }

    pub fn bookings_mut(&mut self) -> &mut BookingsView {
        &mut self.bookings
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Switch tabs, resetting the outgoing tab's filters
    ///
    /// A status value valid only in the outgoing tab must never remain
    /// silently applied.
    pub fn switch_tab(&mut self, tab: HistoryTab) {
        if tab == self.active {
            return;
        }
        debug!(from = %self.active, to = %tab, "switch_tab: called");
        match self.active {
            HistoryTab::Searches => self.searches.reset_filters(),
            HistoryTab::Bookings => self.bookings.reset_filters(),
        }
        self.active = tab;
        self.last_error = None;
    }

    /// Paging state of the active tab; gating always uses the total from
    /// the most recent fetch of this tab, never the other one
    pub fn active_page(&self) -> &PageState {
        match self.active {
            HistoryTab::Searches => &self.searches.page,
            HistoryTab::Bookings => &self.bookings.page,
        }
    }

    fn active_page_mut(&mut self) -> &mut PageState {
        match self.active {
            HistoryTab::Searches => &mut self.searches.page,
            HistoryTab::Bookings => &mut self.bookings.page,
        }
    }

    /// Move the active tab to the next page; no-op once exhausted
    pub fn next_page(&mut self) -> bool {
        self.active_page_mut().advance()
    }

    /// Move the active tab to the previous page; no-op on the first page
    pub fn prev_page(&mut self) -> bool {
        self.active_page_mut().retreat()
    }

    pub fn page_label(&self) -> String {
        self.active_page().label()
    }

    /// Apply a fetched page to the Searches view
    pub fn apply_searches(&mut self, page: HistoryPage) {
        debug!(items = page.items.len(), total = page.total, "apply_searches: called");
        self.searches.apply(page);
        self.last_error = None;
    }

    /// Apply a fetched page to the Bookings view
    pub fn apply_bookings(&mut self, page: BookingsPage) {
        debug!(items = page.items.len(), total = page.total, "apply_bookings: called");
        self.bookings.apply(page);
        self.last_error = None;
    }

    /// Record a failed fetch, preserving the last good page
    pub fn record_error(&mut self, error: &ApiError) {
        warn!(%error, "record_error: list fetch failed");
        self.last_error = Some(error.to_string());
    }

    /// Fetch the active tab's current page
    ///
    /// On failure the previously displayed page is preserved and an inline
    /// error is surfaced.
    pub async fn refresh(&mut self, api: &dyn TravelApi) -> Result<(), ApiError> {
        match self.active {
            HistoryTab::Searches => match api.search_history(self.searches.query()).await {
                Ok(page) => {
                    self.apply_searches(page);
                    Ok(())
                }
                Err(e) => {
                    self.record_error(&e);
                    Err(e)
                }
            },
            HistoryTab::Bookings => match api.bookings(self.bookings.query()).await {
                Ok(page) => {
                    self.apply_bookings(page);
                    Ok(())
                }
                Err(e) => {
                    self.record_error(&e);
                    Err(e)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search_record(id: &str) -> SearchRecord {
        SearchRecord {
            search_id: id.to_string(),
            origin: "Delhi".to_string(),
            destination: "Goa".to_string(),
            departure_date: "2024-01-10".to_string(),
            return_date: Some("2024-01-13".to_string()),
            passengers: 1,
            cabin_class: "economy".to_string(),
            search_status: SearchStatus::Success,
            result_count: 5,
            created_at: "2024-01-02T10:00:00".to_string(),
            bookings: Vec::new(),
        }
    }

    fn booking_record(id: &str) -> BookingRecord {
        BookingRecord {
            booking_id: id.to_string(),
            booking_type: "complete_plan".to_string(),
            status: BookingStatus::Confirmed,
            passenger_name: "Asha Rao".to_string(),
            passenger_email: "asha@example.com".to_string(),
            confirmation_code: "CONF-1".to_string(),
            total_amount: 16_000.0,
            currency: "INR".to_string(),
            created_at: "2024-01-03T12:00:00".to_string(),
            flight_details: None,
            hotel_details: None,
        }
    }

    #[test]
    fn test_every_filter_edit_resets_offset() {
        let mut browser = HistoryBrowser::new(20);
        browser.apply_searches(HistoryPage {
            items: vec![search_record("s1")],
            total: 100,
        });

        // Every editable filter field couples to the paging position
        assert!(browser.next_page());
        browser.searches_mut().set_origin("Delhi");
        assert_eq!(browser.searches().page.offset, 0);

        assert!(browser.next_page());
        browser.searches_mut().set_destination("Goa");
        assert_eq!(browser.searches().page.offset, 0);

        assert!(browser.next_page());
        browser.searches_mut().set_status(Some(SearchStatus::Success));
        assert_eq!(browser.searches().page.offset, 0);

        browser.switch_tab(HistoryTab::Bookings);
        browser.apply_bookings(BookingsPage {
            items: vec![booking_record("b1")],
            total: 100,
        });
        assert!(browser.next_page());
        browser.bookings_mut().set_status(Some(BookingStatus::Confirmed));
        assert_eq!(browser.bookings().page.offset, 0);
    }

    #[test]
    fn test_bookings_filter_edit_leaves_searches_paging_untouched() {
        let mut browser = HistoryBrowser::new(20);
        browser.apply_searches(HistoryPage {
            items: Vec::new(),
            total: 60,
        });
        browser.next_page();
        assert_eq!(browser.searches().page.offset, 20);

        browser.switch_tab(HistoryTab::Bookings);
        browser.bookings_mut().set_status(Some(BookingStatus::Pending));

        assert_eq!(browser.searches().page.offset, 20);
    }

    #[test]
    fn test_page_gating() {
        let mut page = PageState::new(20);
        page.total = 45;

        // offset 0: previous disabled, next enabled
        assert!(!page.can_prev());
        assert!(page.can_next());

        assert!(page.advance());
        assert_eq!(page.offset, 20);
        assert!(page.can_prev());
        assert!(page.can_next());

        assert!(page.advance());
        assert_eq!(page.offset, 40);
        // offset + limit >= total: next disabled
        assert!(!page.can_next());
        assert!(page.can_prev());
        assert!(!page.advance());
        assert_eq!(page.offset, 40);

        // Exact-boundary total
        let mut exact = PageState::new(20);
        exact.total = 40;
        exact.advance();
        assert_eq!(exact.offset, 20);
        assert!(!exact.can_next());
    }

    #[test]
    fn test_page_label_scenario() {
        let mut browser = HistoryBrowser::new(20);
        browser.switch_tab(HistoryTab::Bookings);
        browser.apply_bookings(BookingsPage {
            items: Vec::new(),
            total: 45,
        });
        browser.next_page();
        browser.next_page();

        assert_eq!(browser.active_page().offset, 40);
        assert!(!browser.active_page().can_next());
        assert!(browser.active_page().can_prev());
        assert_eq!(browser.page_label(), "Page 3 of 3 (45 total)");
    }

    #[test]
    fn test_empty_results_still_show_one_page() {
        let page = PageState::new(20);
        assert_eq!(page.label(), "Page 1 of 1 (0 total)");
        assert!(!page.can_next());
        assert!(!page.can_prev());
    }

    #[test]
    fn test_tab_switch_drops_invalid_status_filter() {
        let mut browser = HistoryBrowser::new(20);
        browser.switch_tab(HistoryTab::Bookings);
        browser.bookings_mut().set_status(Some(BookingStatus::Pending));

        // "pending" has no meaning in the Searches status domain
        browser.switch_tab(HistoryTab::Searches);
        assert_eq!(browser.bookings().status, None);
        assert_eq!(browser.searches().filters.status, None);
    }

    #[test]
    fn test_tab_switch_drops_searches_only_fields() {
        let mut browser = HistoryBrowser::new(20);
        browser.searches_mut().set_origin("Delhi");
        browser.searches_mut().set_destination("Goa");

        browser.switch_tab(HistoryTab::Bookings);
        assert_eq!(browser.searches().filters, SearchFilters::default());
    }

    #[test]
    fn test_stale_total_from_other_tab_never_gates() {
        let mut browser = HistoryBrowser::new(20);
        browser.apply_searches(HistoryPage {
            items: Vec::new(),
            total: 100,
        });

        browser.switch_tab(HistoryTab::Bookings);
        browser.apply_bookings(BookingsPage {
            items: Vec::new(),
            total: 5,
        });

        // The bookings tab gates on its own total of 5, not searches' 100
        assert!(!browser.active_page().can_next());
    }

    #[test]
    fn test_queries_omit_empty_filters() {
        let mut browser = HistoryBrowser::new(20);
        let query = browser.searches().query();
        assert_eq!(query.origin, None);
        assert_eq!(query.destination, None);
        assert_eq!(query.status, None);
        assert_eq!(query.limit, 20);

        browser.searches_mut().set_origin("  Delhi ");
        let query = browser.searches().query();
        assert_eq!(query.origin.as_deref(), Some("Delhi"));
    }

    #[tokio::test]
    async fn test_failed_fetch_preserves_last_good_page() {
        use crate::api::client::mock::MockTravelApi;

        let api = MockTravelApi::new();
        api.queue_history_page(Ok(HistoryPage {
            items: vec![search_record("s1"), search_record("s2")],
            total: 2,
        }));
        api.queue_history_page(Err(ApiError::Api {
            status: 500,
            message: "store unavailable".to_string(),
        }));

        let mut browser = HistoryBrowser::new(20);
        browser.refresh(&api).await.unwrap();
        assert_eq!(browser.searches().items.len(), 2);

        let result = browser.refresh(&api).await;
        assert!(result.is_err());
        // Last good page preserved, error surfaced inline
        assert_eq!(browser.searches().items.len(), 2);
        assert_eq!(browser.searches().page.total, 2);
        assert!(browser.last_error().unwrap().contains("store unavailable"));
    }
}
