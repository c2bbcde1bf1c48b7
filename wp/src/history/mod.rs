//! Paginated, filterable browsing of past searches and bookings

mod browser;

pub use browser::{BookingsView, HistoryBrowser, HistoryTab, PageState, SearchFilters, SearchesView};
