use anyhow::Result;
use chrono::{Local, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::CleaningApi;
use crate::error::ApiResult;
use crate::models::{BookingRequest, PriceEstimate, Service};
use crate::session::Session;
use crate::ui::{
    components::{format_number, format_price, lines_block, render_notice},
    form::{button_line, choice_line, FocusRing, TextField},
    layout::ViewLayout,
    nav::Route,
    state::{Fetch, Notice, RequestScope},
    View, ViewAction,
};

/// Offered when the catalog is empty or could not be loaded
pub const FALLBACK_SERVICES: [(&str, &str); 3] = [
    ("standard", "Standard Cleaning"),
    ("deep", "Deep Cleaning"),
    ("move_out", "Move-out Cleaning"),
];

pub const MIN_DURATION_HOURS: f64 = 1.0;
pub const MAX_DURATION_HOURS: f64 = 12.0;
pub const DURATION_STEP: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceOption {
    pub value: String,
    pub label: String,
}

/// Text state of the booking form, exactly as typed
#[derive(Debug, Clone, PartialEq)]
pub struct BookingForm {
    pub service_type: String,
    pub duration_hours: TextField,
    pub date: TextField,
    pub time: TextField,
    pub home_size: TextField,
    pub line1: TextField,
    pub city: TextField,
    pub state: TextField,
    pub postal_code: TextField,
}

impl Default for BookingForm {
    fn default() -> Self {
        Self {
            service_type: "standard".to_string(),
            duration_hours: TextField::new("Duration (hours)", "2"),
            date: TextField::new("Date (YYYY-MM-DD)", ""),
            time: TextField::new("Time (HH:MM)", ""),
            home_size: TextField::new("Home size", "1 bed / 1 bath"),
            line1: TextField::new("Address line 1", ""),
            city: TextField::new("City", ""),
            state: TextField::new("State", ""),
            postal_code: TextField::new("Postal Code", ""),
        }
    }
}

impl BookingForm {
    /// `date` + `time` read as local time, sent as a UTC ISO timestamp.
    /// Inputs that don't form a timestamp (empty ones included) give `None`,
    /// which is submitted as null without further checks.
    pub fn scheduled_start(&self) -> Option<String> {
        let raw = format!("{}T{}:00", self.date.value().trim(), self.time.value().trim());
        let naive = NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S").ok()?;
        let local = Local.from_local_datetime(&naive).earliest()?;
        Some(local.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    /// Empty text is 0; text that isn't a number is `None`
    pub fn duration_value(&self) -> Option<f64> {
        let text = self.duration_hours.value().trim();
        if text.is_empty() {
            return Some(0.0);
        }
        text.parse().ok()
    }

    /// Move the duration by `delta` inside the [1, 12] hint range
    pub fn step_duration(&mut self, delta: f64) {
        let current = self.duration_value().filter(|v| v.is_finite()).unwrap_or(2.0);
        let stepped = ((current + delta) / DURATION_STEP).round() * DURATION_STEP;
        let clamped = stepped.clamp(MIN_DURATION_HOURS, MAX_DURATION_HOURS);
        self.duration_hours.set_value(&format_number(clamped));
    }

    pub fn to_request(&self, customer_id: &str) -> BookingRequest {
        BookingRequest {
            customer_id: customer_id.to_string(),
            service_type: self.service_type.clone(),
            scheduled_start: self.scheduled_start(),
            duration_hours: self.duration_value(),
            home_size: self.home_size.value().to_string(),
            address_line1: self.line1.value().to_string(),
            city: self.city.value().to_string(),
            state: self.state.value().to_string(),
            postal_code: self.postal_code.value().to_string(),
        }
    }

    fn text_field_mut(&mut self, row: usize) -> Option<&mut TextField> {
        match row {
            ROW_DATE => Some(&mut self.date),
            ROW_TIME => Some(&mut self.time),
            ROW_DURATION => Some(&mut self.duration_hours),
            ROW_HOME_SIZE => Some(&mut self.home_size),
            ROW_LINE1 => Some(&mut self.line1),
            ROW_CITY => Some(&mut self.city),
            ROW_STATE => Some(&mut self.state),
            ROW_POSTAL => Some(&mut self.postal_code),
            _ => None,
        }
    }

    fn text_fields(&self) -> [(usize, &TextField); 8] {
        [
            (ROW_DATE, &self.date),
            (ROW_TIME, &self.time),
            (ROW_DURATION, &self.duration_hours),
            (ROW_HOME_SIZE, &self.home_size),
            (ROW_LINE1, &self.line1),
            (ROW_CITY, &self.city),
            (ROW_STATE, &self.state),
            (ROW_POSTAL, &self.postal_code),
        ]
    }
}

const ROW_SERVICE: usize = 0;
const ROW_DATE: usize = 1;
const ROW_TIME: usize = 2;
const ROW_DURATION: usize = 3;
const ROW_HOME_SIZE: usize = 4;
const ROW_LINE1: usize = 5;
const ROW_CITY: usize = 6;
const ROW_STATE: usize = 7;
const ROW_POSTAL: usize = 8;
const ROW_ESTIMATE: usize = 9;
const ROW_SUBMIT: usize = 10;
const ROW_COUNT: usize = 11;

pub enum BookMsg {
    Services(ApiResult<Vec<Service>>),
    Estimate(ApiResult<PriceEstimate>),
    Submitted(ApiResult<PriceEstimate>),
}

/// Booking form: catalog, estimate, submit
pub struct BookView {
    api: Arc<dyn CleaningApi>,
    services: Fetch<Vec<Service>>,
    form: BookingForm,
    focus: FocusRing,
    estimate: Fetch<Option<f64>>,
    notice: Option<Notice>,
    requests: RequestScope<BookMsg>,
}

impl BookView {
    pub fn new(api: Arc<dyn CleaningApi>) -> Self {
        Self {
            api,
            services: Fetch::Idle,
            form: BookingForm::default(),
            focus: FocusRing::new(ROW_COUNT),
            estimate: Fetch::Idle,
            notice: None,
            requests: RequestScope::new(),
        }
    }

    pub fn form(&self) -> &BookingForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut BookingForm {
        &mut self.form
    }

    pub fn services(&self) -> &Fetch<Vec<Service>> {
        &self.services
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn estimate(&self) -> &Fetch<Option<f64>> {
        &self.estimate
    }

    /// Loaded catalog, or the three fallback options when it is empty or unavailable
    pub fn service_options(&self) -> Vec<ServiceOption> {
        match self.services.loaded() {
            Some(services) if !services.is_empty() => services
                .iter()
                .map(|service| ServiceOption {
                    value: service.name.clone(),
                    label: service.display_name.clone(),
                })
                .collect(),
            _ => FALLBACK_SERVICES
                .iter()
                .map(|(value, label)| ServiceOption {
                    value: value.to_string(),
                    label: label.to_string(),
                })
                .collect(),
        }
    }

    /// Select a service by value; unknown values are ignored
    pub fn select_service(&mut self, value: &str) -> bool {
        if self.service_options().iter().any(|option| option.value == value) {
            self.form.service_type = value.to_string();
            true
        } else {
            false
        }
    }

    fn cycle_service(&mut self, forward: bool) {
        let options = self.service_options();
        if options.is_empty() {
            return;
        }
        let current = options
            .iter()
            .position(|option| option.value == self.form.service_type)
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % options.len()
        } else if current == 0 {
            options.len() - 1
        } else {
            current - 1
        };
        self.form.service_type = options[next].value.clone();
    }

    /// `Estimated Price: $84.5` once an estimate arrived
    pub fn estimate_line(&self) -> Option<String> {
        match &self.estimate {
            Fetch::Idle => None,
            Fetch::Loading => Some("Estimating...".to_string()),
            Fetch::Loaded(price) => Some(format!("Estimated Price: ${}", format_price(*price))),
            Fetch::Failed(message) => Some(format!("Estimate failed: {}", message)),
        }
    }

    fn load_services(&mut self) {
        self.services = Fetch::Loading;
        let api = self.api.clone();
        self.requests
            .spawn(async move { BookMsg::Services(api.list_services().await) });
    }

    /// POST the current form to the estimate endpoint
    pub fn request_estimate(&mut self, session: &Session) {
        let request = self.form.to_request(session.user_id());
        info!("Requesting estimate for {} as {}", request.service_type, request.customer_id);

        self.estimate = Fetch::Loading;
        let api = self.api.clone();
        self.requests
            .spawn(async move { BookMsg::Estimate(api.estimate_booking(&request).await) });
    }

    /// POST the current form to the booking-creation endpoint
    pub fn submit_booking(&mut self, session: &Session) {
        let request = self.form.to_request(session.user_id());
        info!("Submitting booking for {} as {}", request.service_type, request.customer_id);

        self.notice = Some(Notice::Info("Submitting booking...".to_string()));
        let api = self.api.clone();
        self.requests
            .spawn(async move { BookMsg::Submitted(api.create_booking(&request).await) });
    }

    fn apply(&mut self, message: BookMsg) {
        match message {
            BookMsg::Services(result) => {
                if let Err(e) = &result {
                    warn!("Service catalog unavailable, using fallback options: {}", e);
                }
                self.services = Fetch::from_result(result);
                let options = self.service_options();
                if !options.iter().any(|option| option.value == self.form.service_type) {
                    if let Some(first) = options.first() {
                        self.form.service_type = first.value.clone();
                    }
                }
            }
            BookMsg::Estimate(result) => {
                if let Err(e) = &result {
                    warn!("Estimate failed: {}", e);
                }
                self.estimate = Fetch::from_result(result.map(|estimate| estimate.price_estimate));
            }
            BookMsg::Submitted(Ok(estimate)) => {
                self.notice = Some(Notice::Success(format!(
                    "Booking submitted. Price estimate ${}",
                    format_price(estimate.price_estimate)
                )));
            }
            BookMsg::Submitted(Err(e)) => {
                warn!("Booking submission failed: {}", e);
                self.notice = Some(Notice::Error(format!("Booking failed: {}", e)));
            }
        }
    }

    /// Wait for every in-flight request and apply it
    pub async fn settle(&mut self) {
        while let Some(message) = self.requests.next().await {
            self.apply(message);
        }
    }

    fn form_lines(&self) -> Vec<Line<'static>> {
        let service_label = self
            .service_options()
            .into_iter()
            .find(|option| option.value == self.form.service_type)
            .map(|option| option.label)
            .unwrap_or_else(|| self.form.service_type.clone());

        let mut lines = vec![choice_line("Service", &service_label, self.focus.is(ROW_SERVICE))];
        for (row, field) in self.form.text_fields() {
            lines.push(field.render(self.focus.is(row)));
        }
        lines.push(Line::from(""));
        lines.push(button_line("Get Estimate", self.focus.is(ROW_ESTIMATE)));
        lines.push(button_line("Submit Booking", self.focus.is(ROW_SUBMIT)));
        lines
    }

    fn side_lines(&self) -> Vec<Line<'static>> {
        let catalog = match &self.services {
            Fetch::Loaded(services) if !services.is_empty() => format!("{} services available", services.len()),
            Fetch::Loaded(_) => "No services listed, showing defaults".to_string(),
            Fetch::Failed(message) => format!("Catalog unavailable ({}), showing defaults", message),
            Fetch::Loading => "Loading services...".to_string(),
            Fetch::Idle => String::new(),
        };

        let mut lines = vec![Line::from(Span::styled(catalog, Style::default().fg(Color::Gray)))];
        if let Some(estimate) = self.estimate_line() {
            let color = if self.estimate.error().is_some() { Color::Red } else { Color::Green };
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(estimate, Style::default().fg(color))));
        }
        lines
    }
}

impl View for BookView {
    fn route(&self) -> Route {
        Route::Book
    }

    fn render(&self, f: &mut Frame, area: Rect) {
        let view_layout = ViewLayout::new(area);
        view_layout.render_title(f, "Book a Cleaning");

        let columns = view_layout.split_main_content(
            Direction::Horizontal,
            &[Constraint::Percentage(60), Constraint::Percentage(40)],
        );
        f.render_widget(lines_block(self.form_lines(), "Booking Details"), columns[0]);
        f.render_widget(
            Paragraph::new(self.side_lines()).block(Block::default().borders(Borders::ALL).title("Estimate")),
            columns[1],
        );

        render_notice(f, view_layout.notice, self.notice.as_ref());
        view_layout.render_hints(
            f,
            "↑/↓: Field • ←/→: Service • +/-: Duration • Enter: Next / Press button",
        );
    }

    fn get_status(&self) -> String {
        if self.requests.is_busy() {
            format!("{} request(s) in flight", self.requests.in_flight())
        } else {
            self.services.status_text("services")
        }
    }

    fn mount(&mut self, _session: &Session) {
        self.requests.cancel();
        self.form = BookingForm::default();
        self.focus = FocusRing::new(ROW_COUNT);
        self.estimate = Fetch::Idle;
        self.notice = None;
        self.load_services();
    }

    fn unmount(&mut self) {
        self.requests.cancel();
    }

    fn handle_key(&mut self, key: KeyCode, session: &mut Session) -> Result<ViewAction> {
        let row = self.focus.index();
        match key {
            KeyCode::Up => self.focus.previous(),
            KeyCode::Down => self.focus.next(),
            KeyCode::Enter => match row {
                ROW_ESTIMATE => self.request_estimate(session),
                ROW_SUBMIT => self.submit_booking(session),
                _ => self.focus.next(),
            },
            KeyCode::Left if row == ROW_SERVICE => self.cycle_service(false),
            KeyCode::Right if row == ROW_SERVICE => self.cycle_service(true),
            KeyCode::Char('+') if row == ROW_DURATION => self.form.step_duration(DURATION_STEP),
            KeyCode::Char('-') if row == ROW_DURATION => self.form.step_duration(-DURATION_STEP),
            other => {
                let handled = self
                    .form
                    .text_field_mut(row)
                    .map(|field| field.handle_key(other))
                    .unwrap_or(false);
                if !handled {
                    return Ok(ViewAction::Ignored);
                }
            }
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
