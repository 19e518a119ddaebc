use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::CleaningApi;
use crate::error::ApiResult;
use crate::models::{Booking, JobStatus, Role};
use crate::session::Session;
use crate::ui::{
    components::{format_price, format_start, render_error, render_loading_indicator, render_notice},
    layout::ViewLayout,
    nav::Route,
    state::{Fetch, Notice, RequestScope},
    View, ViewAction,
};

/// Whose bookings the dashboard lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardRole {
    Customer,
    Cleaner,
}

impl DashboardRole {
    /// `cleaner` stays cleaner, everything else is listed as a customer
    pub fn from_role(role: Role) -> Self {
        match role {
            Role::Cleaner => DashboardRole::Cleaner,
            _ => DashboardRole::Customer,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            DashboardRole::Customer => Role::Customer,
            DashboardRole::Cleaner => Role::Cleaner,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            DashboardRole::Customer => DashboardRole::Cleaner,
            DashboardRole::Cleaner => DashboardRole::Customer,
        }
    }
}

/// Reconcile a re-fetched list with the one on screen.
///
/// Ids still present keep their position, new ids are appended in incoming
/// order, ids missing from `incoming` are dropped. Field values always come
/// from `incoming`.
pub fn merge_bookings(current: &[Booking], incoming: Vec<Booking>) -> Vec<Booking> {
    let mut by_id: HashMap<String, Booking> = HashMap::with_capacity(incoming.len());
    let mut arrival: Vec<String> = Vec::with_capacity(incoming.len());
    for booking in incoming {
        if !by_id.contains_key(&booking.id) {
            arrival.push(booking.id.clone());
        }
        by_id.insert(booking.id.clone(), booking);
    }

    let mut merged: Vec<Booking> = current
        .iter()
        .filter_map(|existing| by_id.remove(&existing.id))
        .collect();
    merged.extend(arrival.into_iter().filter_map(|id| by_id.remove(&id)));
    merged
}

pub enum DashboardMsg {
    Bookings(ApiResult<Vec<Booking>>),
    Refreshed(ApiResult<Vec<Booking>>),
    StatusPosted {
        booking_id: String,
        status: JobStatus,
        result: ApiResult<()>,
    },
}

/// Bookings of the current actor, with job status updates for cleaners
pub struct DashboardView {
    api: Arc<dyn CleaningApi>,
    role: DashboardRole,
    actor_id: String,
    bookings: Fetch<Vec<Booking>>,
    selected_id: Option<String>,
    notice: Option<Notice>,
    requests: RequestScope<DashboardMsg>,
}

impl DashboardView {
    pub fn new(api: Arc<dyn CleaningApi>) -> Self {
        Self {
            api,
            role: DashboardRole::Customer,
            actor_id: String::new(),
            bookings: Fetch::Idle,
            selected_id: None,
            notice: None,
            requests: RequestScope::new(),
        }
    }

    pub fn role(&self) -> DashboardRole {
        self.role
    }

    pub fn bookings(&self) -> &Fetch<Vec<Booking>> {
        &self.bookings
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    fn selected_index(&self) -> Option<usize> {
        let bookings = self.bookings.loaded()?;
        let id = self.selected_id.as_ref()?;
        bookings.iter().position(|booking| &booking.id == id)
    }

    fn fetch_request(&self) -> impl std::future::Future<Output = ApiResult<Vec<Booking>>> + Send + 'static {
        let api = self.api.clone();
        let actor_id = self.actor_id.clone();
        let role = self.role;
        async move {
            match role {
                DashboardRole::Customer => api.customer_bookings(&actor_id).await,
                DashboardRole::Cleaner => api.cleaner_bookings(&actor_id).await,
            }
        }
    }

    fn load_bookings(&mut self) {
        self.bookings = Fetch::Loading;
        let request = self.fetch_request();
        self.requests
            .spawn(async move { DashboardMsg::Bookings(request.await) });
    }

    fn refresh_bookings(&mut self) {
        let request = self.fetch_request();
        self.requests
            .spawn(async move { DashboardMsg::Refreshed(request.await) });
    }

    /// Switch between customer and cleaner listings.
    ///
    /// The role is written back to the session; whatever was still loading for
    /// the previous role is cancelled before the new request goes out.
    pub fn switch_role(&mut self, role: DashboardRole, session: &mut Session) {
        if role == self.role {
            return;
        }
        info!("Dashboard role switched to {}", role.role());

        self.role = role;
        if let Err(e) = session.set_role(role.role()) {
            warn!("Failed to persist role: {}", e);
            self.notice = Some(Notice::Error(format!("Could not save role: {}", e)));
        }

        self.requests.cancel();
        self.selected_id = None;
        self.load_bookings();
    }

    /// POST a status for the selected booking; only available to cleaners
    pub fn advance_status(&mut self, status: JobStatus) {
        if self.role != DashboardRole::Cleaner {
            self.notice = Some(Notice::Info("Switch to cleaner to update job status".to_string()));
            return;
        }
        let Some(booking_id) = self.selected_id.clone() else {
            return;
        };

        info!("Posting status {} for booking {}", status.as_str(), booking_id);
        let api = self.api.clone();
        self.requests.spawn(async move {
            let result = api.update_booking_status(&booking_id, status).await;
            DashboardMsg::StatusPosted {
                booking_id,
                status,
                result,
            }
        });
    }

    fn move_selection(&mut self, down: bool) {
        let Some(bookings) = self.bookings.loaded() else {
            return;
        };
        if bookings.is_empty() {
            return;
        }
        let next = match self.selected_index() {
            None => 0,
            Some(index) if down => (index + 1).min(bookings.len() - 1),
            Some(index) => index.saturating_sub(1),
        };
        self.selected_id = Some(bookings[next].id.clone());
    }

    fn keep_selection_valid(&mut self) {
        if self.selected_index().is_none() {
            self.selected_id = self
                .bookings
                .loaded()
                .and_then(|bookings| bookings.first())
                .map(|booking| booking.id.clone());
        }
    }

    fn apply(&mut self, message: DashboardMsg) {
        match message {
            DashboardMsg::Bookings(result) => {
                if let Err(e) = &result {
                    warn!("Failed to load bookings: {}", e);
                }
                self.bookings = Fetch::from_result(result);
                self.keep_selection_valid();
            }
            DashboardMsg::Refreshed(Ok(incoming)) => {
                let merged = match self.bookings.loaded() {
                    Some(current) => merge_bookings(current, incoming),
                    None => incoming,
                };
                self.bookings = Fetch::Loaded(merged);
                self.keep_selection_valid();
            }
            DashboardMsg::Refreshed(Err(e)) => {
                warn!("Failed to refresh bookings: {}", e);
                self.notice = Some(Notice::Error(format!("Could not refresh bookings: {}", e)));
            }
            DashboardMsg::StatusPosted {
                booking_id,
                status,
                result: Ok(()),
            } => {
                self.notice = Some(Notice::Success(format!(
                    "Booking {} marked {}",
                    booking_id,
                    status.label()
                )));
                self.refresh_bookings();
            }
            DashboardMsg::StatusPosted {
                booking_id,
                result: Err(e),
                ..
            } => {
                warn!("Status update for booking {} failed: {}", booking_id, e);
                self.notice = Some(Notice::Error(format!("Status update failed: {}", e)));
            }
        }
    }

    /// Wait for every in-flight request and apply it
    pub async fn settle(&mut self) {
        while let Some(message) = self.requests.next().await {
            self.apply(message);
        }
    }

    fn render_bookings(&self, f: &mut Frame, area: Rect, bookings: &[Booking]) {
        let title = format!("Bookings ({})", bookings.len());
        if bookings.is_empty() {
            let empty = Paragraph::new("No bookings yet.")
                .style(Style::default().fg(Color::Gray))
                .block(Block::default().borders(Borders::ALL).title(title));
            f.render_widget(empty, area);
            return;
        }

        let items: Vec<ListItem> = bookings
            .iter()
            .map(|booking| {
                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(booking.service_type.clone(), Style::default().add_modifier(Modifier::BOLD)),
                        Span::raw(" · "),
                        Span::raw(format_start(booking.scheduled_start.as_deref())),
                    ]),
                    Line::from(Span::styled(
                        format!("{} · ${}", booking.status, format_price(booking.price_estimate)),
                        Style::default().fg(Color::Gray),
                    )),
                ])
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
            .highlight_symbol("▶ ");

        let mut state = ListState::default();
        state.select(self.selected_index());
        f.render_stateful_widget(list, area, &mut state);
    }
}

impl View for DashboardView {
    fn route(&self) -> Route {
        Route::Dashboard
    }

    fn render(&self, f: &mut Frame, area: Rect) {
        let view_layout = ViewLayout::new(area);
        view_layout.render_title(f, "My Bookings");

        let sections = view_layout.split_main_content(
            Direction::Vertical,
            &[Constraint::Length(3), Constraint::Min(0)],
        );

        let role_line = Paragraph::new(Line::from(vec![
            Span::styled("Viewing as: ", Style::default().fg(Color::Gray)),
            Span::styled(
                self.role.role().label().to_string(),
                Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  ({})", self.actor_id), Style::default().fg(Color::Gray)),
        ]))
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(role_line, sections[0]);

        match &self.bookings {
            Fetch::Idle | Fetch::Loading => render_loading_indicator(f, sections[1], "Loading bookings..."),
            Fetch::Failed(message) => render_error(f, sections[1], &format!("Failed to load bookings: {}", message)),
            Fetch::Loaded(bookings) => self.render_bookings(f, sections[1], bookings),
        }

        render_notice(f, view_layout.notice, self.notice.as_ref());
        let hints = match self.role {
            DashboardRole::Cleaner => "↑/↓: Select • T: Switch role • 1: On the way • 2: In progress • 3: Completed",
            DashboardRole::Customer => "↑/↓: Select • T: Switch role • R: Refresh",
        };
        view_layout.render_hints(f, hints);
    }

    fn get_status(&self) -> String {
        self.bookings.status_text("bookings")
    }

    fn mount(&mut self, session: &Session) {
        self.requests.cancel();
        self.role = DashboardRole::from_role(session.role());
        self.actor_id = session.user_id().to_string();
        self.selected_id = None;
        self.notice = None;
        self.load_bookings();
    }

    fn unmount(&mut self) {
        self.requests.cancel();
        self.bookings = Fetch::Idle;
    }

    fn handle_key(&mut self, key: KeyCode, session: &mut Session) -> Result<ViewAction> {
        match key {
            KeyCode::Up => self.move_selection(false),
            KeyCode::Down => self.move_selection(true),
            KeyCode::Char('t') | KeyCode::Char('T') => self.switch_role(self.role.toggled(), session),
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.requests.cancel();
                self.load_bookings();
            }
            KeyCode::Char('1') => self.advance_status(JobStatus::OnTheWay),
            KeyCode::Char('2') => self.advance_status(JobStatus::InProgress),
            KeyCode::Char('3') => self.advance_status(JobStatus::Completed),
            _ => return Ok(ViewAction::Ignored),
        }
        Ok(ViewAction::Handled)
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
