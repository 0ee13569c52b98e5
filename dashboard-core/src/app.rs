//! Dashboard orchestration.
//!
//! `App` is the single owner of UI state. Every input event and every
//! background completion arrives as a [`Message`] on one channel and is
//! applied on the task that runs [`App::run`], so view mutation never happens
//! from two places at once.

use chrono::Local;
use std::{ops::ControlFlow, sync::Arc};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::{
    config::DashboardSettings,
    error::FetchError,
    geolocation::Geolocator,
    model::City,
    provider::WeatherProvider,
    render::{DashboardSnapshot, SearchResultsView, render_dashboard},
    search::{SearchController, SearchUpdate},
};

/// The rendering surface. Implementations decide how view models are shown.
pub trait DashboardView {
    fn set_loading(&mut self, visible: bool);
    fn show_search_results(&mut self, results: &SearchResultsView);
    fn hide_search_results(&mut self);
    fn show_search_error(&mut self, message: &str);
    fn set_search_text(&mut self, text: &str);
    fn paint(&mut self, snapshot: &DashboardSnapshot);
    fn show_error(&mut self, message: &str);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiState {
    pub loading_visible: bool,
    pub search_results_visible: bool,
}

/// Events produced by the front-end.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// The search input changed.
    Input(String),
    /// Enter pressed in the search input.
    Enter(String),
    /// Click outside both the input and the result list.
    ClickOutside,
    /// A search result was picked.
    SelectResult(usize),
    SelectCity(City),
    Quit,
}

#[derive(Debug)]
pub enum Message {
    Ui(UiEvent),
    SearchSettled {
        generation: u64,
        query: String,
    },
    SearchFinished {
        request: u64,
        result: Result<Vec<City>, FetchError>,
    },
    DashboardLoaded {
        selection: u64,
        result: Box<Result<DashboardSnapshot, FetchError>>,
    },
}

/// Fetch current conditions and forecast together, then build every view.
pub async fn load_dashboard(
    provider: &dyn WeatherProvider,
    city: &City,
    settings: &DashboardSettings,
) -> Result<DashboardSnapshot, FetchError> {
    let at = city.coordinates();
    let (current, samples) =
        tokio::try_join!(provider.fetch_current(at), provider.fetch_forecast(at))?;

    Ok(render_dashboard(
        city,
        &current,
        &samples,
        settings,
        &Local,
        Local::now().date_naive(),
    ))
}

/// Where the dashboard opens: the user's position if it can be named, the
/// default city otherwise.
pub async fn resolve_start_city(
    provider: &dyn WeatherProvider,
    geolocator: &dyn Geolocator,
    default_city: &City,
) -> City {
    let at = match geolocator.locate().await {
        Ok(at) => at,
        Err(err) => {
            tracing::warn!(error = %err, city = %default_city, "Geolocation failed, using default city");
            return default_city.clone();
        }
    };

    match provider.reverse_geocode(at).await {
        Ok(Some(city)) => city,
        Ok(None) => {
            tracing::info!(?at, "No place name for current position");
            City::from_coordinates(at)
        }
        Err(err) => {
            tracing::warn!(error = %err, city = %default_city, "Reverse geocoding failed, using default city");
            default_city.clone()
        }
    }
}

pub struct App<V> {
    provider: Arc<dyn WeatherProvider>,
    view: V,
    settings: DashboardSettings,
    search: SearchController,
    state: UiState,
    /// Id of the most recent selection; older responses are stale.
    active_selection: u64,
    loading_selection: Option<u64>,
    tx: UnboundedSender<Message>,
}

impl<V: DashboardView> App<V> {
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        view: V,
        settings: DashboardSettings,
    ) -> (Self, UnboundedReceiver<Message>) {
        let (tx, rx) = unbounded_channel();
        let search = SearchController::new(Arc::clone(&provider), &settings);

        let app = Self {
            provider,
            view,
            settings,
            search,
            state: UiState::default(),
            active_selection: 0,
            loading_selection: None,
            tx,
        };

        (app, rx)
    }

    /// Sender for front-ends that feed [`UiEvent`]s from another task.
    pub fn sender(&self) -> UnboundedSender<Message> {
        self.tx.clone()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn ui_state(&self) -> UiState {
        self.state
    }

    /// Pick the opening city and start loading it.
    pub async fn start(&mut self, geolocator: &dyn Geolocator) {
        let city = resolve_start_city(
            self.provider.as_ref(),
            geolocator,
            &self.settings.default_city,
        )
        .await;

        self.select_city(city);
        self.sync_loading();
    }

    pub async fn run(mut self, mut rx: UnboundedReceiver<Message>) {
        while let Some(message) = rx.recv().await {
            if self.handle(message).is_break() {
                break;
            }
        }
    }

    pub fn handle(&mut self, message: Message) -> ControlFlow<()> {
        match message {
            Message::Ui(UiEvent::Quit) => return ControlFlow::Break(()),
            Message::Ui(UiEvent::Input(query)) => self.search.on_input(query, &self.tx),
            Message::Ui(UiEvent::Enter(query)) => {
                let update = self.search.on_enter(&query, &self.tx);
                self.apply_search(update);
            }
            Message::Ui(UiEvent::ClickOutside) => {
                let update = self.search.dismiss();
                self.apply_search(update);
            }
            Message::Ui(UiEvent::SelectResult(index)) => {
                if let Some(city) = self.search.select(index) {
                    self.apply_search(SearchUpdate::Hidden);
                    self.view.set_search_text(&city.short_label());
                    self.select_city(city);
                }
            }
            Message::Ui(UiEvent::SelectCity(city)) => self.select_city(city),
            Message::SearchSettled { generation, query } => {
                let update = self.search.on_settled(generation, &query, &self.tx);
                self.apply_search(update);
            }
            Message::SearchFinished { request, result } => {
                let update = self.search.on_results(request, result);
                self.apply_search(update);
            }
            Message::DashboardLoaded { selection, result } => self.finish_load(selection, *result),
        }

        self.sync_loading();
        ControlFlow::Continue(())
    }

    /// Make `city` the active selection and load it in the background.
    pub fn select_city(&mut self, city: City) {
        self.active_selection += 1;
        let selection = self.active_selection;
        self.loading_selection = Some(selection);

        tracing::info!(%city, selection, "Selecting city");

        let provider = Arc::clone(&self.provider);
        let settings = self.settings.clone();
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let result = load_dashboard(provider.as_ref(), &city, &settings).await;
            let _ = tx.send(Message::DashboardLoaded { selection, result: Box::new(result) });
        });
    }

    fn finish_load(&mut self, selection: u64, result: Result<DashboardSnapshot, FetchError>) {
        if selection != self.active_selection {
            tracing::debug!(selection, active = self.active_selection, "Discarding stale dashboard");
            return;
        }
        self.loading_selection = None;

        match result {
            Ok(snapshot) => {
                tracing::info!(city = %snapshot.city, "Dashboard updated");
                self.view.paint(&snapshot);
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to load weather");
                self.view.show_error(&format!("Could not load weather: {err}"));
            }
        }
    }

    fn apply_search(&mut self, update: SearchUpdate) {
        match update {
            SearchUpdate::Unchanged | SearchUpdate::Searching => {}
            SearchUpdate::Hidden => {
                self.state.search_results_visible = false;
                self.view.hide_search_results();
            }
            SearchUpdate::Results(results) => {
                self.state.search_results_visible = true;
                self.view.show_search_results(&results);
            }
            SearchUpdate::Failed(message) => {
                self.state.search_results_visible = false;
                self.view.show_search_error(&message);
            }
        }
    }

    fn sync_loading(&mut self) {
        let visible = self.loading_selection.is_some() || self.search.is_searching();
        if visible != self.state.loading_visible {
            self.state.loading_visible = visible;
            self.view.set_loading(visible);
        }
    }
}
