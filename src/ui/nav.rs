use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Tabs},
    Frame,
};

/// Client-side routes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Book,
    Dashboard,
    Profile,
    Admin,
}

impl Route {
    /// Route table in nav bar order
    pub const ALL: [Route; 5] = [Route::Home, Route::Book, Route::Dashboard, Route::Profile, Route::Admin];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Book => "/book",
            Route::Dashboard => "/dashboard",
            Route::Profile => "/profile",
            Route::Admin => "/admin",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::Book => "Book a Cleaning",
            Route::Dashboard => "My Bookings",
            Route::Profile => "Profile",
            Route::Admin => "Admin",
        }
    }

    /// Exact path match only
    pub fn from_path(path: &str) -> Option<Route> {
        Route::ALL.into_iter().find(|route| route.path() == path)
    }

    pub fn index(&self) -> usize {
        Route::ALL.iter().position(|route| route == self).unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub route: Route,
    pub title: &'static str,
    pub active: bool,
}

/// Navigation bar state: nothing but the current route
#[derive(Debug, Clone)]
pub struct Navigation {
    current: Route,
}

impl Navigation {
    pub fn new(current: Route) -> Self {
        Self { current }
    }

    pub fn current(&self) -> Route {
        self.current
    }

    pub fn set_current(&mut self, route: Route) {
        self.current = route;
    }

    /// Links with exactly one marked active
    pub fn links(&self) -> Vec<NavLink> {
        let current_path = self.current.path();
        Route::ALL
            .into_iter()
            .map(|route| NavLink {
                route,
                title: route.title(),
                active: route.path() == current_path,
            })
            .collect()
    }

    pub fn next_route(&self) -> Route {
        Route::ALL[(self.current.index() + 1) % Route::ALL.len()]
    }

    pub fn previous_route(&self) -> Route {
        let index = self.current.index();
        Route::ALL[if index == 0 { Route::ALL.len() - 1 } else { index - 1 }]
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let links = self.links();
        let selected = links.iter().position(|link| link.active).unwrap_or(0);
        let titles: Vec<&str> = links.iter().map(|link| link.title).collect();

        let tabs = Tabs::new(titles)
            .block(Block::default().borders(Borders::ALL).title("Cleanly"))
            .style(Style::default().fg(Color::White))
            .highlight_style(Style::default().fg(Color::White).bg(Color::Blue).add_modifier(Modifier::BOLD))
            .select(selected);

        f.render_widget(tabs, area);
    }
}
