/// UI components and formatting helpers shared by the views
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use serde_json::Value;

use crate::ui::state::Notice;

/// Shown wherever a value is missing or could not be loaded
pub const PLACEHOLDER: &str = "—";

/// Render a loading indicator
pub fn render_loading_indicator(f: &mut Frame, area: Rect, message: &str) {
    let loading = Paragraph::new(message)
        .block(Block::default().borders(Borders::ALL).title("Loading"))
        .style(Style::default().fg(Color::Yellow));

    f.render_widget(loading, area);
}

/// Render error message
pub fn render_error(f: &mut Frame, area: Rect, error: &str) {
    let error_paragraph = Paragraph::new(error)
        .block(Block::default().borders(Borders::ALL).title("Error"))
        .style(Style::default().fg(Color::Red))
        .wrap(Wrap { trim: true });

    f.render_widget(error_paragraph, area);
}

/// One-line notice, or an empty box when there is none
pub fn render_notice(f: &mut Frame, area: Rect, notice: Option<&Notice>) {
    let paragraph = match notice {
        Some(notice) => Paragraph::new(notice.message().to_string()).style(Style::default().fg(notice.color())),
        None => Paragraph::new(""),
    };
    f.render_widget(paragraph.block(Block::default().borders(Borders::ALL)), area);
}

/// Number rendering without a trailing `.0`: `84.5`, `85`
pub fn format_number(value: f64) -> String {
    format!("{}", value)
}

pub fn format_price(value: Option<f64>) -> String {
    value.map(format_number).unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Display text of an arbitrary metric value; null renders as the placeholder
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => PLACEHOLDER.to_string(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => i.to_string(),
            (_, Some(u), _) => u.to_string(),
            (_, _, Some(f)) => format_number(f),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

/// `total_bookings` -> `total bookings`; only the first underscore becomes a space
pub fn humanize_key(key: &str) -> String {
    key.replacen('_', " ", 1)
}

/// Local rendering of a backend timestamp; unparseable values are shown raw
pub fn format_start(start: Option<&str>) -> String {
    let Some(raw) = start else {
        return PLACEHOLDER.to_string();
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.with_timezone(&Local).format("%-m/%-d/%Y, %-I:%M:%S %p").to_string();
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        if let Some(local) = Local.from_local_datetime(&naive).earliest() {
            return local.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string();
        }
    }
    raw.to_string()
}

/// Bordered block of pre-built lines
pub fn lines_block(lines: Vec<Line<'static>>, title: &str) -> Paragraph<'static> {
    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .style(Style::default().fg(Color::White))
}

/// Flatten a rendered buffer into text, one line per row
#[cfg(test)]
pub(crate) fn buffer_text(buffer: &ratatui::buffer::Buffer) -> String {
    let width = buffer.area.width as usize;
    buffer
        .content
        .chunks(width)
        .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}
