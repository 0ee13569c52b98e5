use dashboard_core::{
    DashboardSnapshot, DashboardView, Icon, Lang, SearchResultsView, render::no_results_message,
};

fn glyph(icon: Icon) -> &'static str {
    match icon {
        Icon::Thunderstorm => "⛈",
        Icon::Drizzle => "🌦",
        Icon::Rain => "🌧",
        Icon::Snow => "❄",
        Icon::Atmosphere => "🌫",
        Icon::Clear => "☀",
        Icon::FewClouds => "⛅",
        Icon::Clouds => "☁",
    }
}

/// Prints every view to stdout as plain text.
#[derive(Debug)]
pub struct TerminalView {
    lang: Lang,
}

impl TerminalView {
    pub fn new(lang: Lang) -> Self {
        Self { lang }
    }
}

impl DashboardView for TerminalView {
    fn set_loading(&mut self, visible: bool) {
        if visible {
            println!("… loading");
        }
    }

    fn show_search_results(&mut self, results: &SearchResultsView) {
        match results {
            SearchResultsView::NoResults => println!("  ℹ {}", no_results_message(self.lang)),
            SearchResultsView::Cities(items) => {
                for (i, item) in items.iter().enumerate() {
                    println!("  {}. {}  ({})", i + 1, item.label, item.coordinates);
                }
                println!("  Type a number to pick a city.");
            }
        }
    }

    fn hide_search_results(&mut self) {}

    fn show_search_error(&mut self, message: &str) {
        println!("  ✗ {message}");
    }

    fn set_search_text(&mut self, text: &str) {
        println!("> {text}");
    }

    fn paint(&mut self, snapshot: &DashboardSnapshot) {
        let current = &snapshot.current;

        println!();
        println!(
            "{}  {} {}°C  {}   (updated {})",
            current.city,
            glyph(current.icon),
            current.temperature,
            current.description,
            chrono::Local::now().format("%H:%M"),
        );
        println!(
            "  min {}°C · max {}°C · feels like {}°C · humidity {}%",
            current.temp_min, current.temp_max, current.feels_like, current.humidity
        );

        let hourly: Vec<String> = snapshot
            .hourly
            .iter()
            .map(|h| format!("{} {} {}°C", h.label, glyph(h.icon), h.temperature))
            .collect();
        println!();
        println!("  {}", hourly.join("  │  "));

        println!();
        for day in &snapshot.weekly {
            println!(
                "  {:<10} {}  {:>3}°C / {:>3}°C  {}",
                day.weekday,
                glyph(day.icon),
                day.max,
                day.min,
                day.description
            );
        }

        println!();
        for (field, value) in &snapshot.details.fields {
            println!("  {:<10} {}", field.container_id(), value);
        }
    }

    fn show_error(&mut self, message: &str) {
        eprintln!("✗ {message}");
    }
}
