//! Memory gauge.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Gauge},
};

use crate::types::SystemStatus;
use crate::ui::util::gauge_percent;

pub fn draw_mem(f: &mut ratatui::Frame<'_>, area: Rect, s: Option<&SystemStatus>) {
    let (pct, label) = match s {
        Some(ss) => {
            let used = (ss.memory_total_gb - ss.memory_available_gb).max(0.0);
            (
                ss.memory_percent,
                format!("{used:.1} GB / {:.1} GB", ss.memory_total_gb),
            )
        }
        None => (0.0, "n/a".into()),
    };

    let g = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Memory"))
        .gauge_style(Style::default().fg(Color::Magenta))
        .percent(gauge_percent(pct))
        .label(label);
    f.render_widget(g, area);
}
