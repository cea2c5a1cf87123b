//! The UI renders the page model and highlight state into the terminal.
//!
//! The top bar mimics the site navbar: the tracked desktop links in order,
//! the active one inverted. The middle strip draws the whole document to
//! scale with the viewport window marked along the left edge, so the ranking
//! decisions can be eyeballed while scrolling. The bottom bar shows keys and
//! status.

use crate::highlighter::Highlighter;
use crate::page::NavRegion;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Renders the simulator frame from the current highlighter state.
pub fn draw(f: &mut Frame, highlighter: &Highlighter, message: Option<&str>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    draw_navbar(f, highlighter, chunks[0]);
    draw_document(f, highlighter, chunks[1]);
    draw_help(f, highlighter, message, chunks[2]);
}

fn draw_navbar(f: &mut Frame, highlighter: &Highlighter, area: Rect) {
    let page = highlighter.page();
    let mut spans = Vec::new();
    for (slot, link) in page
        .links
        .iter()
        .filter(|l| l.region == NavRegion::Primary && page.is_known(&l.target))
        .enumerate()
    {
        let label = format!(" {}:{} ", slot + 1, link.target);
        let style = if link.current {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::default()
        };
        spans.push(Span::styled(label, style));
        spans.push(Span::raw(" "));
    }

    let navbar =
        Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL).title("nav"));
    f.render_widget(navbar, area);
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn draw_document(f: &mut Frame, highlighter: &Highlighter, area: Rect) {
    let page = highlighter.page();
    let rows = usize::from(area.height.saturating_sub(2)).max(1);
    let doc_height = page.document_height().max(page.viewport_height).max(1.0);
    let scale = doc_height / rows as f64;

    let window_top = highlighter.scroll_y() + page.header_height;
    let window_bottom = highlighter.scroll_y() + page.viewport_height;

    let lines: Vec<Line> = (0..rows)
        .map(|row| {
            let px = (row as f64 + 0.5) * scale;
            let in_window = px >= window_top && px < window_bottom;
            let marker = if in_window { "▌ " } else { "  " };

            let section = page
                .sections
                .iter()
                .find(|s| px >= s.top && px < s.bottom());
            let (text, is_active) = match section {
                Some(s) => {
                    let first_row = (s.top / scale) as usize;
                    let label = if row == first_row.min(rows - 1) {
                        format!("#{}", s.id)
                    } else {
                        "│".to_string()
                    };
                    (label, highlighter.active_id() == Some(s.id.as_str()))
                }
                None => (String::new(), false),
            };

            let style = if is_active {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            Line::from(vec![Span::raw(marker), Span::styled(text, style)])
        })
        .collect();

    let title = format!(
        "document ({:.0}px, viewport {:.0}px below a {:.0}px header)",
        doc_height, page.viewport_height, page.header_height
    );
    let strip = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(strip, area);
}

fn draw_help(f: &mut Frame, highlighter: &Highlighter, message: Option<&str>, area: Rect) {
    let text = message.map_or_else(
        || {
            format!(
                "y={:.0} active={} | ↑/↓: Scroll | PgUp/PgDn: Page | Home/End: Top/Bottom | 1-9: Click link | q: Quit",
                highlighter.scroll_y(),
                highlighter.active_id().unwrap_or("-"),
            )
        },
        ToString::to_string,
    );

    let help = Paragraph::new(text).block(Block::default().borders(Borders::ALL));
    f.render_widget(help, area);
}
