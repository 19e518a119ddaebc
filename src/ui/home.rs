use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use std::sync::Arc;
use tracing::warn;

use crate::api::CleaningApi;
use crate::error::ApiResult;
use crate::models::{MetricsSnapshot, PREVIEW_METRIC_KEYS};
use crate::session::Session;
use crate::ui::{
    components::{display_value, humanize_key, PLACEHOLDER},
    layout::ViewLayout,
    nav::Route,
    state::{Fetch, RequestScope},
    View, ViewAction,
};

pub enum HomeMsg {
    Metrics(ApiResult<MetricsSnapshot>),
}

/// Landing page with the metrics preview
pub struct HomeView {
    api: Arc<dyn CleaningApi>,
    metrics: Fetch<MetricsSnapshot>,
    requests: RequestScope<HomeMsg>,
}

impl HomeView {
    pub fn new(api: Arc<dyn CleaningApi>) -> Self {
        Self {
            api,
            metrics: Fetch::Idle,
            requests: RequestScope::new(),
        }
    }

    pub fn metrics(&self) -> &Fetch<MetricsSnapshot> {
        &self.metrics
    }

    /// The four preview cells as (label, value); anything missing is the placeholder
    pub fn metric_cells(&self) -> Vec<(String, String)> {
        PREVIEW_METRIC_KEYS
            .iter()
            .map(|key| {
                let value = self
                    .metrics
                    .loaded()
                    .and_then(|snapshot| snapshot.get(*key))
                    .map(display_value)
                    .unwrap_or_else(|| PLACEHOLDER.to_string());
                (humanize_key(key), value)
            })
            .collect()
    }

    fn load_metrics(&mut self) {
        self.metrics = Fetch::Loading;
        let api = self.api.clone();
        self.requests
            .spawn(async move { HomeMsg::Metrics(api.admin_metrics().await) });
    }

    fn apply(&mut self, message: HomeMsg) {
        match message {
            HomeMsg::Metrics(result) => {
                if let Err(e) = &result {
                    warn!("Metrics preview unavailable: {}", e);
                }
                self.metrics = Fetch::from_result(result);
            }
        }
    }

    /// Wait for every in-flight request and apply it
    pub async fn settle(&mut self) {
        while let Some(message) = self.requests.next().await {
            self.apply(message);
        }
    }

    fn render_metrics(&self, f: &mut Frame, area: Rect) {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(25); 4])
            .split(area);

        for ((label, value), cell) in self.metric_cells().into_iter().zip(cells.iter()) {
            let paragraph = Paragraph::new(vec![
                Line::from(Span::styled(label, Style::default().fg(Color::Gray))),
                Line::from(Span::styled(value, Style::default().fg(Color::White).add_modifier(Modifier::BOLD))),
            ])
            .block(Block::default().borders(Borders::ALL));
            f.render_widget(paragraph, *cell);
        }
    }
}

impl View for HomeView {
    fn route(&self) -> Route {
        Route::Home
    }

    fn render(&self, f: &mut Frame, area: Rect) {
        let view_layout = ViewLayout::new(area);
        view_layout.render_title(f, "Cleaning Service Booking");

        let sections = view_layout.split_main_content(
            Direction::Vertical,
            &[Constraint::Length(5), Constraint::Length(4), Constraint::Min(0)],
        );

        let intro = Paragraph::new(vec![
            Line::from("Book trusted cleaners, track jobs, and handle payments securely."),
            Line::from(""),
            Line::from(vec![
                Span::styled("[B]", Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)),
                Span::raw(" Book a Cleaning"),
            ]),
        ])
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(intro, sections[0]);

        self.render_metrics(f, sections[1]);

        let notice = match &self.metrics {
            Fetch::Failed(message) => Paragraph::new(format!("Metrics unavailable: {}", message))
                .style(Style::default().fg(Color::Red)),
            Fetch::Loading => Paragraph::new("Loading metrics...").style(Style::default().fg(Color::Cyan)),
            _ => Paragraph::new(""),
        };
        f.render_widget(notice.block(Block::default().borders(Borders::ALL)), view_layout.notice);

        view_layout.render_hints(f, "B: Book a Cleaning • R: Refresh metrics");
    }

    fn get_status(&self) -> String {
        self.metrics.status_text("metrics")
    }

    fn mount(&mut self, _session: &Session) {
        self.requests.cancel();
        self.load_metrics();
    }

    fn unmount(&mut self) {
        self.requests.cancel();
        self.metrics = Fetch::Idle;
    }

    fn handle_key(&mut self, key: KeyCode, _session: &mut Session) -> Result<ViewAction> {
        match key {
            KeyCode::Char('b') | KeyCode::Char('B') => Ok(ViewAction::Navigate(Route::Book)),
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.requests.cancel();
                self.load_metrics();
                Ok(ViewAction::Handled)
            }
            _ => Ok(ViewAction::Ignored),
        }
    }

    fn update(&mut self, _session: &mut Session) -> Result<()> {
        while let Some(message) = self.requests.try_next() {
            self.apply(message);
        }
        Ok(())
    }

    fn is_busy(&self) -> bool {
        self.requests.is_busy()
    }
}
