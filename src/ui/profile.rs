use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    Frame,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::CleaningApi;
use crate::error::ApiResult;
use crate::models::{AuthResponse, LoginRequest, Role, SignupRequest};
use crate::session::{Identity, Session};
use crate::ui::{
    components::{lines_block, render_notice},
    form::{button_line, choice_line, FocusRing, TextField},
    layout::ViewLayout,
    nav::Route,
    state::{Notice, RequestScope},
    View, ViewAction,
};

const ROW_EMAIL: usize = 0;
const ROW_NAME: usize = 1;
const ROW_ROLE: usize = 2;
const ROW_SIGNUP: usize = 3;
const ROW_LOGIN: usize = 4;
const ROW_COUNT: usize = 5;

pub enum ProfileMsg {
    SignedUp(ApiResult<AuthResponse>),
    LoggedIn(ApiResult<AuthResponse>),
}

/// Sign up or log in; the resulting identity is saved to the session
pub struct ProfileView {
    api: Arc<dyn CleaningApi>,
    email: TextField,
    name: TextField,
    role: Role,
    focus: FocusRing,
    identity: Identity,
    notice: Option<Notice>,
    requests: RequestScope<ProfileMsg>,
}

impl ProfileView {
    pub fn new(api: Arc<dyn CleaningApi>) -> Self {
        Self {
            api,
            email: TextField::new("Email", ""),
            name: TextField::new("Name", ""),
            role: Role::Customer,
            focus: FocusRing::new(ROW_COUNT),
            identity: Identity::default(),
            notice: None,
            requests: RequestScope::new(),
        }
    }

    pub fn set_email(&mut self, email: &str) {
        self.email.set_value(email);
    }

    pub fn set_name(&mut self, name: &str) {
        self.name.set_value(name);
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn set_role(&mut self, role: Role) {
        self.role = role;
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    fn cycle_role(&mut self, forward: bool) {
        let index = Role::ALL.iter().position(|role| *role == self.role).unwrap_or(0);
        let len = Role::ALL.len();
        let next = if forward { (index + 1) % len } else { (index + len - 1) % len };
        self.role = Role::ALL[next];
    }

    /// POST the signup form
    pub fn sign_up(&mut self) {
        let request = SignupRequest {
            email: self.email.value().to_string(),
            name: self.name.value().to_string(),
            role: self.role,
        };
        info!("Signing up {} as {}", request.email, request.role);

        let api = self.api.clone();
        self.requests
            .spawn(async move { ProfileMsg::SignedUp(api.signup(&request).await) });
    }

    /// POST the email to the login endpoint
    pub fn log_in(&mut self) {
        let request = LoginRequest {
            email: self.email.value().to_string(),
        };
        info!("Logging in {}", request.email);

        let api = self.api.clone();
        self.requests
            .spawn(async move { ProfileMsg::LoggedIn(api.login(&request).await) });
    }

    fn store_identity(&mut self, response: AuthResponse, session: &mut Session, success: &str) {
        let identity = Identity::new(response.user_id, response.role);
        match session.set_identity(identity) {
            Ok(()) => self.notice = Some(Notice::Success(success.to_string())),
            Err(e) => {
                warn!("Failed to save session: {}", e);
                self.notice = Some(Notice::Error(format!("Could not save session: {}", e)));
            }
        }
        self.identity = session.identity().clone();
    }

    fn apply(&mut self, message: ProfileMsg, session: &mut Session) {
        match message {
            ProfileMsg::SignedUp(Ok(response)) => {
                self.store_identity(response, session, "Signed up. Your user id is saved locally.")
            }
            ProfileMsg::LoggedIn(Ok(response)) => self.store_identity(response, session, "Logged in."),
            ProfileMsg::SignedUp(Err(e)) => {
                warn!("Signup failed: {}", e);
                self.notice = Some(Notice::Error(format!("Signup failed: {}", e)));
            }
            ProfileMsg::LoggedIn(Err(e)) => {
                warn!("Login failed: {}", e);
                self.notice = Some(Notice::Error(format!("Login failed: {}", e)));
            }
        }
    }

    /// Wait for every in-flight request and apply it in completion order
    pub async fn settle(&mut self, session: &mut Session) {
        while let Some(message) = self.requests.next().await {
            self.apply(message, session);
        }
    }

    fn identity_lines(&self) -> Vec<Line<'static>> {
        let user = if self.identity.principal.is_guest() {
            "guest (not signed in)".to_string()
        } else {
            self.identity.principal.id().to_string()
        };
        vec![
            Line::from(vec![
                Span::styled("User id: ", Style::default().fg(Color::Gray)),
                Span::styled(user, Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
            ]),
            Line::from(vec![
                Span::styled("Role: ", Style::default().fg(Color::Gray)),
                Span::styled(self.identity.role.label().to_string(), Style::default().fg(Color::Magenta)),
            ]),
        ]
    }
}

impl View for ProfileView {
    fn route(&self) -> Route {
        Route::Profile
    }

    fn render(&self, f: &mut Frame, area: Rect) {
        let view_layout = ViewLayout::new(area);
        view_layout.render_title(f, "Profile");

        let columns = view_layout.split_main_content(
            Direction::Horizontal,
            &[Constraint::Percentage(60), Constraint::Percentage(40)],
        );

        let form = vec![
            self.email.render(self.focus.is(ROW_EMAIL)),
            self.name.render(self.focus.is(ROW_NAME)),
            choice_line("Role", self.role.label(), self.focus.is(ROW_ROLE)),
            Line::from(""),
            button_line("Sign up", self.focus.is(ROW_SIGNUP)),
            button_line("Log in", self.focus.is(ROW_LOGIN)),
        ];
        f.render_widget(lines_block(form, "Account"), columns[0]);
        f.render_widget(lines_block(self.identity_lines(), "Current Identity"), columns[1]);

        render_notice(f, view_layout.notice, self.notice.as_ref());
        view_layout.render_hints(f, "↑/↓: Field • ←/→: Role • Enter: Next / Press button");
    }

    fn get_status(&self) -> String {
        if self.requests.is_busy() {
            format!("{} request(s) in flight", self.requests.in_flight())
        } else {
            "Ready".to_string()
        }
    }

    fn mount(&mut self, session: &Session) {
        self.requests.cancel();
        self.identity = session.identity().clone();
        self.email.set_value("");
        self.name.set_value("");
        self.role = Role::Customer;
        self.focus = FocusRing::new(ROW_COUNT);
        self.notice = None;
    }

    fn unmount(&mut self) {
        self.requests.cancel();
    }

    fn handle_key(&mut self, key: KeyCode, _session: &mut Session) -> Result<ViewAction> {
        let row = self.focus.index();
        match key {
            KeyCode::Up => self.focus.previous(),
            KeyCode::Down => self.focus.next(),
            KeyCode::Enter => match row {
                ROW_SIGNUP => self.sign_up(),
                ROW_LOGIN => self.log_in(),
                _ => self.focus.next(),
            },
            KeyCode::Left if row == ROW_ROLE => self.cycle_role(false),
            KeyCode::Right if row == ROW_ROLE => self.cycle_role(true),
            other => {
                let handled = match row {
                    ROW_EMAIL => self.email.handle_key(other),
                    ROW_NAME => self.name.handle_key(other),
                    _ => false,
                };
                if !handled {
                    return Ok(ViewAction::Ignored);
                }
            }
        }
        Ok(ViewAction::Handled)
    }

    fn update(&mut self, session: &mut Session) -> Result<()> {
        while let Some(message) = self.requests.try_next() {
            self.apply(message, session);
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
    use crate::session::{Principal, SessionStore};
    use crate::ui::components::buffer_text;
    use pretty_assertions::assert_eq;
    use ratatui::{backend::TestBackend, Terminal};
    use tempfile::tempdir;

    fn auth(user_id: &str, role: Role) -> AuthResponse {
        AuthResponse {
            user_id: user_id.to_string(),
            role,
        }
    }

    #[tokio::test]
    async fn test_signup_persists_identity() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        let mut session = Session::open(store.clone()).unwrap();

        let mut api = MockCleaningApi::new();
        api.expect_signup()
            .withf(|request| {
                request.email == "ana@example.com" && request.name == "Ana" && request.role == Role::Cleaner
            })
            .times(1)
            .returning(|_| Ok(auth("u-42", Role::Cleaner)));

        let mut view = ProfileView::new(Arc::new(api));
        view.mount(&session);
        view.set_email("ana@example.com");
        view.set_name("Ana");
        view.set_role(Role::Cleaner);
        view.sign_up();
        view.settle(&mut session).await;

        assert_eq!(
            view.notice(),
            Some(&Notice::Success("Signed up. Your user id is saved locally.".to_string()))
        );
        assert_eq!(session.user_id(), "u-42");
        assert_eq!(store.load().unwrap(), Identity::new("u-42", Role::Cleaner));
    }

    #[tokio::test]
    async fn test_later_login_replaces_signup() {
        let mut session = Session::ephemeral(Identity::default());
        let mut api = MockCleaningApi::new();
        api.expect_signup().returning(|_| Ok(auth("u-1", Role::Customer)));
        api.expect_login()
            .withf(|request| request.email == "bo@example.com")
            .returning(|_| Ok(auth("u-2", Role::Admin)));

        let mut view = ProfileView::new(Arc::new(api));
        view.mount(&session);
        view.set_email("bo@example.com");
        view.sign_up();
        view.settle(&mut session).await;
        view.log_in();
        view.settle(&mut session).await;

        assert_eq!(session.identity(), &Identity::new("u-2", Role::Admin));
        assert_eq!(view.notice().map(|n| n.message()), Some("Logged in."));
    }

    #[tokio::test]
    async fn test_login_failure_keeps_identity() {
        let mut session = Session::ephemeral(Identity::default());
        let mut api = MockCleaningApi::new();
        api.expect_login().returning(|_| {
            Err(ClientError::Status {
                status: 404,
                body: "user not found".to_string(),
            })
        });

        let mut view = ProfileView::new(Arc::new(api));
        view.mount(&session);
        view.log_in();
        view.settle(&mut session).await;

        assert_eq!(session.identity().principal, Principal::Guest);
        assert!(view.notice().unwrap().is_error());
        assert!(view.notice().unwrap().message().contains("user not found"));
    }

    #[test]
    fn test_role_cycles_and_fields_edit() {
        let mut session = Session::ephemeral(Identity::default());
        let mut view = ProfileView::new(Arc::new(MockCleaningApi::new()));
        view.mount(&session);

        for c in "x@y.z".chars() {
            view.handle_key(KeyCode::Char(c), &mut session).unwrap();
        }
        view.handle_key(KeyCode::Down, &mut session).unwrap();
        view.handle_key(KeyCode::Down, &mut session).unwrap();
        view.handle_key(KeyCode::Left, &mut session).unwrap();
        assert_eq!(view.role(), Role::Admin);
        view.handle_key(KeyCode::Right, &mut session).unwrap();
        view.handle_key(KeyCode::Right, &mut session).unwrap();
        assert_eq!(view.role(), Role::Cleaner);

        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal.draw(|f| view.render(f, f.area())).unwrap();
        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("x@y.z"));
        assert!(text.contains("guest (not signed in)"));
    }
}
