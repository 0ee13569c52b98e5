//! City search with debounced autocomplete.
//!
//! Keystrokes re-arm a single pending timer; only the query that survives the
//! debounce window (or one submitted with Enter) reaches the geocoding API.

use std::{sync::Arc, time::Duration};
use tokio::{sync::mpsc::UnboundedSender, task::JoinHandle};

use crate::{
    app::Message,
    config::DashboardSettings,
    error::FetchError,
    model::{City, Lang},
    provider::WeatherProvider,
    render::{SearchResultsView, render_search_results},
};

/// Shorter (trimmed) queries hide the results instead of searching.
pub const MIN_QUERY_LEN: usize = 2;

/// Owns at most one pending timer. Arming cancels the previous one.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    generation: u64,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self { window, generation: 0, pending: None }
    }

    /// Cancel any pending timer and start a new one that posts
    /// `Message::SearchSettled` once `window` has elapsed.
    pub fn arm(&mut self, query: String, tx: &UnboundedSender<Message>) -> u64 {
        self.cancel();
        self.generation += 1;

        let generation = self.generation;
        let window = self.window;
        let tx = tx.clone();

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let _ = tx.send(Message::SearchSettled { generation, query });
        }));

        generation
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// True if `generation` is the timer currently pending; consumes it.
    pub fn settle(&mut self, generation: u64) -> bool {
        if generation == self.generation && self.pending.is_some() {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Idle,
    ShowingResults,
}

/// What the view has to do after a search transition.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchUpdate {
    Unchanged,
    Searching,
    Hidden,
    Results(SearchResultsView),
    Failed(String),
}

#[derive(Debug)]
pub struct SearchController {
    provider: Arc<dyn WeatherProvider>,
    debouncer: Debouncer,
    limit: usize,
    lang: Lang,
    state: SearchState,
    results: Vec<City>,
    in_flight: Option<u64>,
    requests: u64,
}

impl SearchController {
    pub fn new(provider: Arc<dyn WeatherProvider>, settings: &DashboardSettings) -> Self {
        Self {
            provider,
            debouncer: Debouncer::new(settings.debounce),
            limit: settings.search_limit,
            lang: settings.lang,
            state: SearchState::Idle,
            results: Vec::new(),
            in_flight: None,
            requests: 0,
        }
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    pub fn is_searching(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn on_input(&mut self, query: String, tx: &UnboundedSender<Message>) {
        self.debouncer.arm(query, tx);
    }

    pub fn on_settled(
        &mut self,
        generation: u64,
        query: &str,
        tx: &UnboundedSender<Message>,
    ) -> SearchUpdate {
        if !self.debouncer.settle(generation) {
            return SearchUpdate::Unchanged;
        }
        self.submit(query, tx)
    }

    /// Enter skips the debounce window and drops any pending timer.
    pub fn on_enter(&mut self, query: &str, tx: &UnboundedSender<Message>) -> SearchUpdate {
        self.debouncer.cancel();
        self.submit(query, tx)
    }

    fn submit(&mut self, query: &str, tx: &UnboundedSender<Message>) -> SearchUpdate {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            self.in_flight = None;
            return self.hide();
        }

        self.requests += 1;
        let request = self.requests;
        self.in_flight = Some(request);

        tracing::debug!(%query, request, "Searching cities");

        let provider = Arc::clone(&self.provider);
        let query = query.to_string();
        let limit = self.limit;
        let tx = tx.clone();

        tokio::spawn(async move {
            let result = provider.search_cities(&query, limit).await;
            let _ = tx.send(Message::SearchFinished { request, result });
        });

        SearchUpdate::Searching
    }

    pub fn on_results(&mut self, request: u64, result: Result<Vec<City>, FetchError>) -> SearchUpdate {
        if self.in_flight != Some(request) {
            tracing::debug!(request, "Dropping superseded search results");
            return SearchUpdate::Unchanged;
        }
        self.in_flight = None;

        match result {
            Ok(cities) => {
                tracing::debug!(count = cities.len(), "Search finished");
                let view = render_search_results(&cities, self.lang);
                self.results = cities;
                self.state = SearchState::ShowingResults;
                SearchUpdate::Results(view)
            }
            Err(err) => {
                tracing::warn!(error = %err, "City search failed");
                self.results.clear();
                self.state = SearchState::Idle;
                SearchUpdate::Failed(format!("Search failed: {err}"))
            }
        }
    }

    /// Click outside the input and the result list.
    pub fn dismiss(&mut self) -> SearchUpdate {
        match self.state {
            SearchState::ShowingResults => self.hide(),
            SearchState::Idle => SearchUpdate::Unchanged,
        }
    }

    pub fn select(&mut self, index: usize) -> Option<City> {
        if self.state != SearchState::ShowingResults {
            return None;
        }
        let city = self.results.get(index).cloned()?;
        self.hide();
        Some(city)
    }

    fn hide(&mut self) -> SearchUpdate {
        self.state = SearchState::Idle;
        self.results.clear();
        SearchUpdate::Hidden
    }
}
