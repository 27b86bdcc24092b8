//! Top header: agent address, link state, last notice, and key help.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::app::{Link, Notice};
use crate::types::SystemStatus;

const HELP: &str =
    "q quit | r refresh | / filter | ↑↓ select | k kill | s suspend | c resume | o sort";

pub fn draw_header(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    agent: &str,
    link: &Link,
    notice: Option<&Notice>,
    last: Option<&SystemStatus>,
) {
    let (state, color) = match link {
        Link::Connecting => ("connecting...".to_string(), Color::Yellow),
        Link::Live => match last {
            Some(s) => (format!("live @ {}", s.timestamp), Color::Green),
            None => ("live".to_string(), Color::Green),
        },
        Link::Disconnected(why) => (format!("disconnected ({why})"), Color::Red),
    };

    let mut top = vec![
        Span::raw(format!("procdash  agent: {agent}  ")),
        Span::styled(state, Style::default().fg(color)),
    ];
    match notice {
        Some(Notice::Info(msg)) => {
            top.push(Span::raw("  "));
            top.push(Span::styled(
                msg.clone(),
                Style::default().fg(Color::Cyan),
            ));
        }
        Some(Notice::Error(msg)) => {
            top.push(Span::raw("  "));
            top.push(Span::styled(
                format!("error: {msg}"),
                Style::default().fg(Color::Red),
            ));
        }
        None => {}
    }

    let lines = vec![
        Line::from(top),
        Line::from(Span::styled(HELP, Style::default().fg(Color::DarkGray))),
    ];
    f.render_widget(
        Paragraph::new(lines)
            .block(Block::default().borders(Borders::BOTTOM)),
        area,
    );
}
