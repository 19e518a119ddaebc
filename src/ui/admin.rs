use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Rect},
    style::{Color, Style},
    text::{Line, Span},
    Frame,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::CleaningApi;
use crate::error::ApiResult;
use crate::models::{MetricsSnapshot, NewService};
use crate::session::Session;
use crate::ui::{
    components::{display_value, humanize_key, lines_block, render_error, render_loading_indicator, render_notice},
    form::{button_line, FocusRing, TextField},
    layout::ViewLayout,
    nav::Route,
    state::{Fetch, Notice, RequestScope},
    View, ViewAction,
};

const ROW_NAME: usize = 0;
const ROW_DISPLAY_NAME: usize = 1;
const ROW_BASE_PRICE: usize = 2;
const ROW_CREATE: usize = 3;
const ROW_REFRESH: usize = 4;
const ROW_COUNT: usize = 5;

/// Admin form for a new catalog entry
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceForm {
    pub name: TextField,
    pub display_name: TextField,
    pub base_price: TextField,
}

impl Default for ServiceForm {
    fn default() -> Self {
        Self {
            name: TextField::new("Name", "standard"),
            display_name: TextField::new("Display name", "Standard Cleaning"),
            base_price: TextField::new("Base price", "50"),
        }
    }
}

impl ServiceForm {
    /// Empty price is 0, a price that isn't a number is sent as null; nothing else is checked
    pub fn to_service(&self) -> NewService {
        let price = self.base_price.value().trim();
        let base_price = if price.is_empty() { Some(0.0) } else { price.parse().ok() };
        NewService::with_default_multipliers(
            self.name.value().to_string(),
            self.display_name.value().to_string(),
            base_price,
        )
    }

    fn field_mut(&mut self, row: usize) -> Option<&mut TextField> {
        match row {
            ROW_NAME => Some(&mut self.name),
            ROW_DISPLAY_NAME => Some(&mut self.display_name),
            ROW_BASE_PRICE => Some(&mut self.base_price),
            _ => None,
        }
    }
}

pub enum AdminMsg {
    Metrics(ApiResult<MetricsSnapshot>),
    ServiceCreated(ApiResult<()>),
}

/// Full metrics listing plus service creation
pub struct AdminView {
    api: Arc<dyn CleaningApi>,
    metrics: Fetch<MetricsSnapshot>,
    form: ServiceForm,
    focus: FocusRing,
    notice: Option<Notice>,
    requests: RequestScope<AdminMsg>,
}

impl AdminView {
    pub fn new(api: Arc<dyn CleaningApi>) -> Self {
        Self {
            api,
            metrics: Fetch::Idle,
            form: ServiceForm::default(),
            focus: FocusRing::new(ROW_COUNT),
            notice: None,
            requests: RequestScope::new(),
        }
    }

    pub fn metrics(&self) -> &Fetch<MetricsSnapshot> {
        &self.metrics
    }

    pub fn form_mut(&mut self) -> &mut ServiceForm {
        &mut self.form
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Every metric in backend order as (label, value)
    pub fn metric_rows(&self) -> Vec<(String, String)> {
        self.metrics
            .loaded()
            .map(|snapshot| {
                snapshot
                    .iter()
                    .map(|(key, value)| (humanize_key(key), display_value(value)))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn load_metrics(&mut self) {
        self.metrics = Fetch::Loading;
        let api = self.api.clone();
        self.requests
            .spawn(async move { AdminMsg::Metrics(api.admin_metrics().await) });
    }

    /// POST the form to the service catalog
    pub fn create_service(&mut self) {
        let service = self.form.to_service();
        info!("Creating service {}", service.name);

        let api = self.api.clone();
        self.requests
            .spawn(async move { AdminMsg::ServiceCreated(api.create_service(&service).await) });
    }

    fn apply(&mut self, message: AdminMsg) {
        match message {
            AdminMsg::Metrics(result) => {
                if let Err(e) = &result {
                    warn!("Failed to load admin metrics: {}", e);
                }
                self.metrics = Fetch::from_result(result);
            }
            AdminMsg::ServiceCreated(Ok(())) => {
                self.notice = Some(Notice::Success("Service created".to_string()));
            }
            AdminMsg::ServiceCreated(Err(e)) => {
                warn!("Service creation failed: {}", e);
                self.notice = Some(Notice::Error(format!("Service creation failed: {}", e)));
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
        match &self.metrics {
            Fetch::Idle | Fetch::Loading => render_loading_indicator(f, area, "Loading metrics..."),
            Fetch::Failed(message) => render_error(f, area, &format!("Failed to load metrics: {}", message)),
            Fetch::Loaded(_) => {
                let rows = self.metric_rows();
                let lines: Vec<Line<'static>> = if rows.is_empty() {
                    vec![Line::from(Span::styled("No metrics reported", Style::default().fg(Color::Gray)))]
                } else {
                    rows.into_iter()
                        .map(|(label, value)| {
                            Line::from(vec![
                                Span::styled(format!("{}: ", label), Style::default().fg(Color::Gray)),
                                Span::styled(value, Style::default().fg(Color::White)),
                            ])
                        })
                        .collect()
                };
                f.render_widget(lines_block(lines, "Metrics"), area);
            }
        }
    }
}

impl View for AdminView {
    fn route(&self) -> Route {
        Route::Admin
    }

    fn render(&self, f: &mut Frame, area: Rect) {
        let view_layout = ViewLayout::new(area);
        view_layout.render_title(f, "Admin");

        let columns = view_layout.split_main_content(
            Direction::Horizontal,
            &[Constraint::Percentage(50), Constraint::Percentage(50)],
        );
        self.render_metrics(f, columns[0]);

        let form = vec![
            self.form.name.render(self.focus.is(ROW_NAME)),
            self.form.display_name.render(self.focus.is(ROW_DISPLAY_NAME)),
            self.form.base_price.render(self.focus.is(ROW_BASE_PRICE)),
            Line::from(""),
            button_line("Create Service", self.focus.is(ROW_CREATE)),
            button_line("Refresh Metrics", self.focus.is(ROW_REFRESH)),
        ];
        f.render_widget(lines_block(form, "New Service"), columns[1]);

        render_notice(f, view_layout.notice, self.notice.as_ref());
        view_layout.render_hints(f, "↑/↓: Field • Enter: Next / Press button");
    }

    fn get_status(&self) -> String {
        self.metrics.status_text("metrics")
    }

    fn mount(&mut self, _session: &Session) {
        self.requests.cancel();
        self.form = ServiceForm::default();
        self.focus = FocusRing::new(ROW_COUNT);
        self.notice = None;
        self.load_metrics();
    }

    fn unmount(&mut self) {
        self.requests.cancel();
        self.metrics = Fetch::Idle;
    }

    fn handle_key(&mut self, key: KeyCode, _session: &mut Session) -> Result<ViewAction> {
        let row = self.focus.index();
        match key {
            KeyCode::Up => self.focus.previous(),
            KeyCode::Down => self.focus.next(),
            KeyCode::Enter => match row {
                ROW_CREATE => self.create_service(),
                ROW_REFRESH => self.load_metrics(),
                _ => self.focus.next(),
            },
            other => {
                let handled = self
                    .form
                    .field_mut(row)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockCleaningApi;
    use crate::error::ClientError;
    use crate::session::Identity;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn session() -> Session {
        Session::ephemeral(Identity::default())
    }

    #[test]
    fn test_default_service_form() {
        let service = ServiceForm::default().to_service();
        assert_eq!(
            service,
            NewService {
                name: "standard".to_string(),
                display_name: "Standard Cleaning".to_string(),
                base_price: Some(50.0),
                hourly_multiplier: 1.0,
                flat_multiplier: 1.0,
                is_active: true,
            }
        );
    }

    #[test]
    fn test_unparseable_price_is_null() {
        let mut form = ServiceForm::default();
        form.base_price.set_value("fifty");
        let json = serde_json::to_value(form.to_service()).unwrap();
        assert!(json["base_price"].is_null());
    }

    #[tokio::test]
    async fn test_metrics_listed_in_backend_order() {
        let mut api = MockCleaningApi::new();
        api.expect_admin_metrics().returning(|| {
            Ok(json!({"users": 3, "revenue_paid": 99.5, "top_service": "deep", "pending": null})
                .as_object()
                .cloned()
                .unwrap())
        });

        let mut view = AdminView::new(Arc::new(api));
        view.mount(&session());
        view.settle().await;

        assert_eq!(
            view.metric_rows(),
            vec![
                ("users".to_string(), "3".to_string()),
                ("revenue paid".to_string(), "99.5".to_string()),
                ("top service".to_string(), "deep".to_string()),
                ("pending".to_string(), "—".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_create_service_notices() {
        let mut api = MockCleaningApi::new();
        api.expect_admin_metrics().returning(|| Ok(MetricsSnapshot::new()));
        let mut calls = 0;
        api.expect_create_service()
            .withf(|service| service.name == "eco" && service.hourly_multiplier == 1.0)
            .times(2)
            .returning(move |_| {
                calls += 1;
                if calls == 1 {
                    Ok(())
                } else {
                    Err(ClientError::Status {
                        status: 400,
                        body: "duplicate".to_string(),
                    })
                }
            });

        let mut view = AdminView::new(Arc::new(api));
        view.mount(&session());
        view.settle().await;

        view.form_mut().name.set_value("eco");
        view.create_service();
        view.settle().await;
        assert_eq!(view.notice(), Some(&Notice::Success("Service created".to_string())));

        view.create_service();
        view.settle().await;
        assert!(view.notice().unwrap().message().contains("duplicate"));
    }

    #[tokio::test]
    async fn test_metrics_failure_is_an_error_state() {
        let mut api = MockCleaningApi::new();
        api.expect_admin_metrics()
            .returning(|| Err(ClientError::BaseUrl("offline".to_string())));

        let mut view = AdminView::new(Arc::new(api));
        view.mount(&session());
        view.settle().await;

        assert!(view.metrics().error().is_some());
        assert!(view.metric_rows().is_empty());
    }
}
