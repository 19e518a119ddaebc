use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};
use std::io;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    api::{BackendClient, CleaningApi},
    models::Config,
    session::{Session, SessionStore},
    ui::{
        admin::AdminView,
        book::BookView,
        dashboard::DashboardView,
        events::{map_key, AppCommand},
        home::HomeView,
        layout::TuiLayout,
        nav::{Navigation, Route},
        profile::ProfileView,
        View, ViewAction, ViewManager,
    },
};

/// Terminal client: nav bar, one mounted view, status bar
pub struct CleanlyApp {
    pub should_quit: bool,
    navigation: Navigation,
    session: Session,
    view_manager: ViewManager,
}

impl CleanlyApp {
    pub fn new(api: Arc<dyn CleaningApi>, session: Session) -> Self {
        let views: Vec<Box<dyn View>> = vec![
            Box::new(HomeView::new(api.clone())),
            Box::new(BookView::new(api.clone())),
            Box::new(DashboardView::new(api.clone())),
            Box::new(ProfileView::new(api.clone())),
            Box::new(AdminView::new(api)),
        ];

        Self {
            should_quit: false,
            navigation: Navigation::new(Route::Home),
            session,
            view_manager: ViewManager::new(views),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn current_route(&self) -> Route {
        self.navigation.current()
    }

    /// Mount the landing view
    pub fn start(&mut self) {
        self.view_manager.mount_current(&self.session);
    }

    pub fn navigate(&mut self, route: Route) -> Result<()> {
        if route == self.navigation.current() {
            return Ok(());
        }
        self.view_manager.navigate(route, &self.session)?;
        self.navigation.set_current(route);
        Ok(())
    }

    pub fn draw(&self, f: &mut Frame) {
        let layout = TuiLayout::new(f.area());

        self.navigation.render(f, layout.nav_bar);
        self.view_manager.render_current_view(f, layout.content);

        let identity = self.session.identity();
        let identity_text = format!("{} ({})", identity.principal.id(), identity.role);
        layout.render_status_bar(f, &self.view_manager.get_current_status(), &identity_text);
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        match map_key(key) {
            AppCommand::Quit => {
                info!("Quit requested");
                self.should_quit = true;
            }
            AppCommand::NextView => self.navigate(self.navigation.next_route())?,
            AppCommand::PreviousView => self.navigate(self.navigation.previous_route())?,
            AppCommand::Goto(route) => self.navigate(route)?,
            AppCommand::View(code) => {
                match self.view_manager.handle_current_view_key(code, &mut self.session)? {
                    ViewAction::Navigate(route) => self.navigate(route)?,
                    ViewAction::Handled | ViewAction::Ignored => {}
                }
            }
            AppCommand::None => {}
        }
        Ok(())
    }

    /// Apply whatever requests finished since the last frame
    pub fn update(&mut self) -> Result<()> {
        self.view_manager.update_current_view(&mut self.session)
    }

    pub fn shutdown(&mut self) {
        self.view_manager.unmount_current();
    }
}

/// Run the terminal client until the user quits
pub async fn run_app_async(config: Config) -> Result<()> {
    let api: Arc<dyn CleaningApi> =
        Arc::new(BackendClient::new(&config).context("Failed to build backend client")?);
    let store = SessionStore::new(config.session_path.clone());
    let session = match Session::open(store.clone()) {
        Ok(session) => session,
        Err(e) => {
            warn!("Could not read session file {}, starting as guest: {}", store.path().display(), e);
            Session::fresh(store)
        }
    };

    let mut app = CleanlyApp::new(api, session);
    app.start();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    info!("Terminal client started against {}", config.backend_url);

    let result = event_loop(&mut terminal, &mut app).await;

    app.shutdown();
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    disable_raw_mode()?;
    terminal.show_cursor()?;

    result
}

async fn event_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut CleanlyApp) -> Result<()> {
    const MAX_EVENTS_PER_CYCLE: usize = 10;

    loop {
        let mut events_processed = false;
        let mut event_count = 0;

        while event_count < MAX_EVENTS_PER_CYCLE && event::poll(std::time::Duration::from_millis(0))? {
            if let Event::Key(key_event) = event::read()? {
                debug!("Key event: {:?}", key_event.code);
                app.handle_key_event(key_event)?;
                events_processed = true;
                event_count += 1;

                if app.should_quit {
                    break;
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }

        app.update()?;
        terminal.draw(|f| app.draw(f))?;

        let delay_ms = if events_processed { 8 } else { 16 };
        tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
    }
}
