//! Disk usage gauge for the agent's configured mount.

use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Gauge},
};

use crate::types::SystemStatus;
use crate::ui::util::{gauge_percent, load_color};

pub fn draw_disk(f: &mut ratatui::Frame<'_>, area: Rect, s: Option<&SystemStatus>) {
    let (pct, label) = match s {
        Some(ss) => (
            ss.disk_percent,
            format!(
                "{:.1} GB free of {:.1} GB ({:.0}%)",
                ss.disk_free_gb, ss.disk_total_gb, ss.disk_percent
            ),
        ),
        None => (0.0, "n/a".into()),
    };

    let g = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Disk"))
        .gauge_style(Style::default().fg(load_color(pct)))
        .percent(gauge_percent(pct))
        .label(label);
    f.render_widget(g, area);
}
