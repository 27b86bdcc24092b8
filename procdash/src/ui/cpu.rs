//! CPU average sparkline.

use std::collections::VecDeque;

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Sparkline},
};

use crate::types::SystemStatus;

pub fn draw_cpu_avg_graph(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    hist: &VecDeque<u64>,
    s: Option<&SystemStatus>,
) {
    let title = if let Some(ss) = s {
        format!(
            "CPU avg (now: {:>5.1}%)  {} cores @ {:.0} MHz",
            ss.cpu_percent, ss.cpu_core_count, ss.cpu_frequency_mhz
        )
    } else {
        "CPU avg".into()
    };
    let max_points = area.width.saturating_sub(2) as usize;
    let start = hist.len().saturating_sub(max_points);
    let data: Vec<u64> = hist.iter().skip(start).cloned().collect();
    let spark = Sparkline::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .data(&data)
        .max(100)
        .style(Style::default().fg(Color::Cyan));
    f.render_widget(spark, area);
}
