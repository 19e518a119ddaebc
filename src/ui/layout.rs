use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Centralized layout: nav bar, current view, status bar
pub struct TuiLayout {
    pub nav_bar: Rect,
    pub content: Rect,
    pub status_bar: Rect,
}

impl TuiLayout {
    /// Create a new layout from the given area
    pub fn new(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Nav bar
                Constraint::Min(0),    // Content
                Constraint::Length(4), // Status bar
            ])
            .split(area);

        Self {
            nav_bar: chunks[0],
            content: chunks[1],
            status_bar: chunks[2],
        }
    }

    /// Render the status bar
    pub fn render_status_bar(&self, f: &mut Frame, status_text: &str, identity_text: &str) {
        let status_content = vec![
            Line::from(vec![
                Span::styled("Tab", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
                Span::styled("/", Style::default().fg(Color::Gray)),
                Span::styled("F1-F5", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
                Span::styled(" switch views • ", Style::default().fg(Color::Gray)),
                Span::styled("Esc", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
                Span::styled(" quit • ", Style::default().fg(Color::Gray)),
                Span::styled(identity_text.to_string(), Style::default().fg(Color::Magenta)),
            ]),
            Line::from(vec![
                Span::styled("Status: ", Style::default().fg(Color::Gray)),
                Span::styled(status_text.to_string(), Style::default().fg(Color::Cyan)),
            ]),
        ];

        let paragraph = Paragraph::new(status_content)
            .block(Block::default().borders(Borders::ALL))
            .style(Style::default().fg(Color::White));

        f.render_widget(paragraph, self.status_bar);
    }
}

/// Layout inside one view: title, body, notice line, key hints
pub struct ViewLayout {
    pub title: Rect,
    pub main_content: Rect,
    pub notice: Rect,
    pub hints: Rect,
}

impl ViewLayout {
    /// Create a view layout within the given content area
    pub fn new(content_area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Min(0),    // Main content
                Constraint::Length(3), // Notice
                Constraint::Length(3), // Key hints
            ])
            .split(content_area);

        Self {
            title: chunks[0],
            main_content: chunks[1],
            notice: chunks[2],
            hints: chunks[3],
        }
    }

    /// Split main content into sections
    pub fn split_main_content(&self, direction: Direction, constraints: &[Constraint]) -> Vec<Rect> {
        Layout::default()
            .direction(direction)
            .constraints(constraints)
            .split(self.main_content)
            .to_vec()
    }

    pub fn render_title(&self, f: &mut Frame, title: &str) {
        let paragraph = Paragraph::new(title.to_string())
            .block(Block::default().borders(Borders::ALL))
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
        f.render_widget(paragraph, self.title);
    }

    pub fn render_hints(&self, f: &mut Frame, hints: &str) {
        let paragraph = Paragraph::new(hints.to_string())
            .block(Block::default().borders(Borders::ALL))
            .style(Style::default().fg(Color::Gray));
        f.render_widget(paragraph, self.hints);
    }
}
