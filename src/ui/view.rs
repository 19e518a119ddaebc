use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::{prelude::Rect, Frame};
use tracing::debug;

use crate::session::Session;
use crate::ui::nav::Route;

/// What the app should do after a view handled a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewAction {
    Ignored,
    Handled,
    Navigate(Route),
}

/// View contract for all TUI views (non-async for trait object compatibility)
pub trait View {
    /// Route this view is mounted at
    fn route(&self) -> Route;

    /// Render the view
    fn render(&self, f: &mut Frame, area: Rect);

    /// Get the view status text
    fn get_status(&self) -> String;

    /// Route became current: reset local state and issue the initial reads
    fn mount(&mut self, session: &Session);

    /// Route left: cancel everything still in flight
    fn unmount(&mut self);

    /// Handle view-specific key events
    fn handle_key(&mut self, _key: KeyCode, _session: &mut Session) -> Result<ViewAction> {
        Ok(ViewAction::Ignored)
    }

    /// Apply finished requests (called every frame)
    fn update(&mut self, _session: &mut Session) -> Result<()> {
        Ok(())
    }

    /// Whether requests are still in flight
    fn is_busy(&self) -> bool {
        false
    }
}

/// Route table: one view per route, exactly one mounted
pub struct ViewManager {
    views: Vec<Box<dyn View>>,
    current_view_index: usize,
}

impl ViewManager {
    /// Create a view manager; the first view is current but not yet mounted
    pub fn new(views: Vec<Box<dyn View>>) -> Self {
        Self {
            views,
            current_view_index: 0,
        }
    }

    pub fn current_route(&self) -> Option<Route> {
        self.get_current_view().map(|view| view.route())
    }

    /// Get the current view
    pub fn get_current_view(&self) -> Option<&dyn View> {
        self.views.get(self.current_view_index).map(|v| v.as_ref())
    }

    /// Get the current view mutably
    pub fn get_current_view_mut(&mut self) -> Option<&mut (dyn View + '_)> {
        if self.current_view_index < self.views.len() {
            Some(self.views[self.current_view_index].as_mut())
        } else {
            None
        }
    }

    /// Mount the current view for the first time
    pub fn mount_current(&mut self, session: &Session) {
        if let Some(view) = self.get_current_view_mut() {
            view.mount(session);
        }
    }

    /// Unmount the current view and mount the one at `route`
    pub fn navigate(&mut self, route: Route, session: &Session) -> Result<()> {
        let index = self
            .views
            .iter()
            .position(|view| view.route() == route)
            .ok_or_else(|| anyhow::anyhow!("No view registered for {}", route.path()))?;

        if let Some(view) = self.get_current_view_mut() {
            view.unmount();
        }
        debug!("Navigating to {}", route.path());
        self.current_view_index = index;
        if let Some(view) = self.get_current_view_mut() {
            view.mount(session);
        }
        Ok(())
    }

    /// Render the current view
    pub fn render_current_view(&self, f: &mut Frame, area: Rect) {
        if let Some(view) = self.get_current_view() {
            view.render(f, area);
        }
    }

    /// Get the current view's status
    pub fn get_current_status(&self) -> String {
        self.get_current_view()
            .map(|v| v.get_status())
            .unwrap_or_else(|| "No view available".to_string())
    }

    /// Handle key event for current view
    pub fn handle_current_view_key(&mut self, key: KeyCode, session: &mut Session) -> Result<ViewAction> {
        match self.get_current_view_mut() {
            Some(view) => view.handle_key(key, session),
            None => Ok(ViewAction::Ignored),
        }
    }

    /// Update current view
    pub fn update_current_view(&mut self, session: &mut Session) -> Result<()> {
        match self.get_current_view_mut() {
            Some(view) => view.update(session),
            None => Ok(()),
        }
    }

    pub fn unmount_current(&mut self) {
        if let Some(view) = self.get_current_view_mut() {
            view.unmount();
        }
    }
}
