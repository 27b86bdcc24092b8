//! Process table with filtering, sorting, and a selectable row.

use std::cmp::Ordering;

use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
};

use crate::types::ProcessRow;
use crate::ui::util::truncate_middle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcSortBy {
    #[default]
    CpuDesc,
    MemDesc,
}

impl ProcSortBy {
    pub fn toggle(self) -> Self {
        match self {
            Self::CpuDesc => Self::MemDesc,
            Self::MemDesc => Self::CpuDesc,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::CpuDesc => "CPU",
            Self::MemDesc => "Mem",
        }
    }
}

const COLS: [Constraint; 5] = [
    Constraint::Length(8),  // PID
    Constraint::Min(12),    // Name
    Constraint::Length(11), // Status
    Constraint::Length(8),  // CPU %
    Constraint::Length(10), // Mem MB
];

/// Rows matching `filter` (case-insensitive name substring), sorted
/// descending by the chosen metric. Rows without metrics sink to the bottom
/// and ties keep their incoming order.
pub fn visible_rows<'a>(
    procs: &'a [ProcessRow],
    filter: &str,
    sort_by: ProcSortBy,
) -> Vec<&'a ProcessRow> {
    let needle = filter.to_lowercase();
    let mut rows: Vec<&ProcessRow> = procs
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&needle))
        .collect();
    let key: fn(&ProcessRow) -> Option<f64> = match sort_by {
        ProcSortBy::CpuDesc => |p| p.cpu_percent.map(f64::from),
        ProcSortBy::MemDesc => |p| p.memory_mb,
    };
    rows.sort_by(|a, b| desc(key(a), key(b)));
    rows
}

fn desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub struct ProcessesView<'a> {
    pub rows: &'a [&'a ProcessRow],
    pub total: usize,
    pub sort_by: ProcSortBy,
    pub filter: &'a str,
    pub editing_filter: bool,
}

pub fn draw_processes(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    view: &ProcessesView<'_>,
    state: &mut TableState,
) {
    let mut title = format!(
        "Processes ({} shown, {} total) sort: {}",
        view.rows.len(),
        view.total,
        view.sort_by.label()
    );
    if view.editing_filter || !view.filter.is_empty() {
        let cursor = if view.editing_filter { "_" } else { "" };
        title.push_str(&format!("  filter: {}{cursor}", view.filter));
    }

    let name_width = area.width.saturating_sub(2 + 8 + 11 + 8 + 10 + 4) as usize;
    let body = view.rows.iter().map(|p| {
        let cpu = p
            .cpu_percent
            .map(|v| format!("{v:>5.1}"))
            .unwrap_or_else(|| "    -".into());
        let cpu_fg = match p.cpu_percent {
            Some(x) if x < 25.0 => Color::Green,
            Some(x) if x < 60.0 => Color::Yellow,
            Some(_) => Color::Red,
            None => Color::DarkGray,
        };
        let mem = p
            .memory_mb
            .map(|v| format!("{v:>8.1}"))
            .unwrap_or_else(|| "       -".into());
        Row::new(vec![
            Cell::from(p.pid.to_string())
                .style(Style::default().fg(Color::DarkGray)),
            Cell::from(truncate_middle(&p.name, name_width.max(4))),
            Cell::from(p.status.clone()),
            Cell::from(cpu).style(Style::default().fg(cpu_fg)),
            Cell::from(mem),
        ])
    });

    let header = Row::new(vec!["PID", "Name", "Status", "CPU %", "Mem MB"]).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );

    let table = Table::new(body, COLS.to_vec())
        .header(header)
        .column_spacing(1)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    f.render_stateful_widget(table, area, state);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pid: u32, name: &str, cpu: Option<f32>, mem: Option<f64>) -> ProcessRow {
        ProcessRow {
            pid,
            name: name.into(),
            status: "running".into(),
            cpu_percent: cpu,
            memory_mb: mem,
        }
    }

    fn pids(rows: &[&ProcessRow]) -> Vec<u32> {
        rows.iter().map(|p| p.pid).collect()
    }

    #[test]
    fn filter_is_case_insensitive_substring() {
        let procs = vec![
            row(1, "Firefox", Some(1.0), Some(10.0)),
            row(2, "bash", Some(2.0), Some(5.0)),
            row(3, "firefox-helper", Some(3.0), Some(1.0)),
        ];
        let rows = visible_rows(&procs, "FIRE", ProcSortBy::CpuDesc);
        assert_eq!(pids(&rows), vec![3, 1]);
        assert!(visible_rows(&procs, "zsh", ProcSortBy::CpuDesc).is_empty());
    }

    #[test]
    fn sort_by_memory_puts_degraded_last() {
        let procs = vec![
            row(1, "a", Some(9.0), Some(1.0)),
            row(2, "Unknown", None, None),
            row(3, "b", Some(0.0), Some(50.0)),
        ];
        let rows = visible_rows(&procs, "", ProcSortBy::MemDesc);
        assert_eq!(pids(&rows), vec![3, 1, 2]);
        let rows = visible_rows(&procs, "", ProcSortBy::CpuDesc);
        assert_eq!(pids(&rows), vec![1, 3, 2]);
    }

    #[test]
    fn ties_keep_incoming_order() {
        let procs = vec![
            row(5, "x", Some(1.0), None),
            row(2, "y", Some(1.0), None),
        ];
        let rows = visible_rows(&procs, "", ProcSortBy::CpuDesc);
        assert_eq!(pids(&rows), vec![5, 2]);
    }

    #[test]
    fn sort_toggles() {
        assert_eq!(ProcSortBy::CpuDesc.toggle(), ProcSortBy::MemDesc);
        assert_eq!(ProcSortBy::MemDesc.toggle(), ProcSortBy::CpuDesc);
    }
}
