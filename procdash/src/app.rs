//! App state and main loop: input handling, stream updates, process refresh, and drawing.

use std::{
    collections::VecDeque,
    io,
    time::{Duration, Instant},
};

use anyhow::Context;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    widgets::TableState,
    Terminal,
};
use tokio::sync::mpsc;
use tokio::time::sleep;
use url::Url;

use crate::api::ApiClient;
use crate::history::{pct_point, push_capped, CPU_HISTORY_CAP};
use crate::types::{ControlAction, ProcessList, ProcessRow, SystemStatus};
use crate::ui::processes::{draw_processes, visible_rows, ProcSortBy, ProcessesView};
use crate::ui::{cpu::draw_cpu_avg_graph, disks::draw_disk, header::draw_header, mem::draw_mem};
use crate::ws::{self, StreamEvent};

const TICK: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, PartialEq)]
pub enum Link {
    Connecting,
    Live,
    Disconnected(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Info(String),
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Filter,
}

/// What the event loop should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    Refresh,
    Control(u32, ControlAction),
}

pub struct App {
    base: Url,
    status: Option<SystemStatus>,
    cpu_hist: VecDeque<u64>,
    processes: Vec<ProcessRow>,
    process_count: usize,

    pub filter: String,
    pub mode: InputMode,
    pub sort_by: ProcSortBy,
    selected: usize,
    table: TableState,
    // visible rows in the last drawn table, used as page size
    page: usize,

    link: Link,
    notice: Option<Notice>,

    refresh_every: Duration,
    last_refresh: Option<Instant>,
}

impl App {
    pub fn new(base: Url, refresh_every: Duration) -> Self {
        Self {
            base,
            status: None,
            cpu_hist: VecDeque::with_capacity(CPU_HISTORY_CAP),
            processes: Vec::new(),
            process_count: 0,
            filter: String::new(),
            mode: InputMode::Normal,
            sort_by: ProcSortBy::CpuDesc,
            selected: 0,
            table: TableState::default(),
            page: 10,
            link: Link::Connecting,
            notice: None,
            refresh_every,
            last_refresh: None,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        let api = ApiClient::new(self.base.clone());
        let url = ws::ws_url(&self.base)?;
        let stream = ws::connect(&url)
            .await
            .with_context(|| format!("connecting to {url}"))?;
        let (tx, mut rx) = mpsc::channel(64);
        let reader = tokio::spawn(ws::forward_updates(stream, tx));

        // Terminal setup
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let res = self.event_loop(&mut terminal, &api, &mut rx).await;

        // Teardown
        reader.abort();
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        res
    }

    async fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        api: &ApiClient,
        rx: &mut mpsc::Receiver<StreamEvent>,
    ) -> anyhow::Result<()> {
        loop {
            // Input (non-blocking)
            while event::poll(Duration::from_millis(10))? {
                if let Event::Key(k) = event::read()? {
                    match self.handle_key(k) {
                        Some(Command::Quit) => return Ok(()),
                        Some(Command::Refresh) => self.refresh(api).await,
                        Some(Command::Control(pid, action)) => {
                            self.control(api, pid, action).await;
                            self.refresh(api).await;
                        }
                        None => {}
                    }
                }
            }

            while let Ok(ev) = rx.try_recv() {
                self.on_stream_event(ev);
            }

            if self.refresh_due() {
                self.refresh(api).await;
            }

            terminal.draw(|f| self.draw(f))?;
            sleep(TICK).await;
        }
    }

    fn refresh_due(&self) -> bool {
        self.last_refresh
            .map_or(true, |t| t.elapsed() >= self.refresh_every)
    }

    async fn refresh(&mut self, api: &ApiClient) {
        self.last_refresh = Some(Instant::now());
        match api.processes().await {
            Ok(list) => self.set_processes(list),
            Err(e) => self.notice = Some(Notice::Error(e.to_string())),
        }
    }

    async fn control(&mut self, api: &ApiClient, pid: u32, action: ControlAction) {
        self.notice = Some(match api.control(pid, action).await {
            Ok(ack) => Notice::Info(format!("{} {}", ack.pid, ack.status)),
            Err(e) => Notice::Error(format!("{} {pid}: {e}", action.path())),
        });
    }

    pub fn on_stream_event(&mut self, ev: StreamEvent) {
        match ev {
            StreamEvent::Status(s) => {
                push_capped(
                    &mut self.cpu_hist,
                    pct_point(s.cpu_percent),
                    CPU_HISTORY_CAP,
                );
                self.status = Some(s);
                self.link = Link::Live;
            }
            StreamEvent::Closed(why) => self.link = Link::Disconnected(why),
        }
    }

    pub fn set_processes(&mut self, list: ProcessList) {
        self.process_count = list.count;
        self.processes = list.processes;
        self.clamp_selection();
    }

    fn visible(&self) -> Vec<&ProcessRow> {
        visible_rows(&self.processes, &self.filter, self.sort_by)
    }

    pub fn selected_pid(&self) -> Option<u32> {
        self.visible().get(self.selected).map(|p| p.pid)
    }

    fn clamp_selection(&mut self) {
        let n = self.visible().len();
        self.selected = self.selected.min(n.saturating_sub(1));
    }

    fn move_selection(&mut self, delta: isize) {
        let n = self.visible().len();
        if n == 0 {
            self.selected = 0;
            return;
        }
        let next = self.selected as isize + delta;
        self.selected = next.clamp(0, n as isize - 1) as usize;
    }

    /// Apply a key press to the app state and report what the loop should do.
    pub fn handle_key(&mut self, k: KeyEvent) -> Option<Command> {
        if k.kind != KeyEventKind::Press {
            return None;
        }
        if self.mode == InputMode::Filter {
            match k.code {
                KeyCode::Enter | KeyCode::Esc => self.mode = InputMode::Normal,
                KeyCode::Backspace => {
                    self.filter.pop();
                    self.selected = 0;
                }
                KeyCode::Char(c) => {
                    self.filter.push(c);
                    self.selected = 0;
                }
                _ => {}
            }
            return None;
        }

        let page = self.page.max(1) as isize;
        match k.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Some(Command::Quit),
            KeyCode::Char('r') => return Some(Command::Refresh),
            KeyCode::Char('/') => self.mode = InputMode::Filter,
            KeyCode::Char('o') => {
                self.sort_by = self.sort_by.toggle();
                self.selected = 0;
            }
            KeyCode::Char('k') => {
                return self
                    .selected_pid()
                    .map(|p| Command::Control(p, ControlAction::Kill));
            }
            KeyCode::Char('s') => {
                return self
                    .selected_pid()
                    .map(|p| Command::Control(p, ControlAction::Suspend));
            }
            KeyCode::Char('c') => {
                return self
                    .selected_pid()
                    .map(|p| Command::Control(p, ControlAction::Resume));
            }
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-page),
            KeyCode::PageDown => self.move_selection(page),
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.move_selection(isize::MAX / 2),
            _ => {}
        }
        None
    }

    pub fn draw(&mut self, f: &mut ratatui::Frame<'_>) {
        let area = f.area();

        // Root rows: header, status (cpu left, mem + disk right), processes
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(6),
                Constraint::Min(6),
            ])
            .split(area);

        draw_header(
            f,
            rows[0],
            self.base.as_str(),
            &self.link,
            self.notice.as_ref(),
            self.status.as_ref(),
        );

        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(66), Constraint::Percentage(34)])
            .split(rows[1]);
        draw_cpu_avg_graph(f, top[0], &self.cpu_hist, self.status.as_ref());

        let gauges = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Length(3)])
            .split(top[1]);
        draw_mem(f, gauges[0], self.status.as_ref());
        draw_disk(f, gauges[1], self.status.as_ref());

        // borders (2) + header (1)
        self.page = rows[2].height.saturating_sub(3).max(1) as usize;

        let visible = visible_rows(&self.processes, &self.filter, self.sort_by);
        self.selected = self.selected.min(visible.len().saturating_sub(1));
        self.table
            .select((!visible.is_empty()).then_some(self.selected));
        let view = ProcessesView {
            rows: &visible,
            total: self.process_count,
            sort_by: self.sort_by,
            filter: &self.filter,
            editing_filter: self.mode == InputMode::Filter,
        };
        draw_processes(f, rows[2], &view, &mut self.table);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn row(pid: u32, name: &str, cpu: f32, mem: f64) -> ProcessRow {
        ProcessRow {
            pid,
            name: name.into(),
            status: "sleeping".into(),
            cpu_percent: Some(cpu),
            memory_mb: Some(mem),
        }
    }

    fn app() -> App {
        let mut app = App::new(
            Url::parse("http://127.0.0.1:8000").unwrap(),
            Duration::from_secs(5),
        );
        app.set_processes(ProcessList {
            count: 3,
            processes: vec![
                row(10, "nginx", 5.0, 30.0),
                row(11, "postgres", 20.0, 300.0),
                row(12, "bash", 1.0, 4.0),
            ],
        });
        app
    }

    fn status(cpu: f32) -> SystemStatus {
        SystemStatus {
            cpu_percent: cpu,
            cpu_core_count: 4,
            cpu_frequency_mhz: 2400.0,
            memory_total_gb: 8.0,
            memory_available_gb: 4.0,
            memory_percent: 50.0,
            disk_total_gb: 100.0,
            disk_free_gb: 40.0,
            disk_percent: 60.0,
            timestamp: "2024-01-01T00:00:00Z".into(),
        }
    }

    #[test]
    fn quit_keys() {
        let mut a = app();
        assert_eq!(a.handle_key(key(KeyCode::Char('q'))), Some(Command::Quit));
        assert_eq!(a.handle_key(key(KeyCode::Esc)), Some(Command::Quit));
    }

    #[test]
    fn release_events_are_ignored() {
        let mut a = app();
        let mut k = key(KeyCode::Char('q'));
        k.kind = KeyEventKind::Release;
        assert_eq!(a.handle_key(k), None);
    }

    #[test]
    fn control_targets_selected_row() {
        let mut a = app();
        // Sorted by CPU: postgres, nginx, bash.
        assert_eq!(
            a.handle_key(key(KeyCode::Char('k'))),
            Some(Command::Control(11, ControlAction::Kill))
        );
        a.handle_key(key(KeyCode::Down));
        assert_eq!(
            a.handle_key(key(KeyCode::Char('s'))),
            Some(Command::Control(10, ControlAction::Suspend))
        );
        a.handle_key(key(KeyCode::End));
        assert_eq!(
            a.handle_key(key(KeyCode::Char('c'))),
            Some(Command::Control(12, ControlAction::Resume))
        );
        a.handle_key(key(KeyCode::Down));
        assert_eq!(a.selected_pid(), Some(12));
        a.handle_key(key(KeyCode::Home));
        assert_eq!(a.selected_pid(), Some(11));
    }

    #[test]
    fn filter_mode_captures_typing() {
        let mut a = app();
        a.handle_key(key(KeyCode::Char('/')));
        assert_eq!(a.mode, InputMode::Filter);
        // 'q' and 'k' are text while filtering.
        for c in "BAs".chars() {
            assert_eq!(a.handle_key(key(KeyCode::Char(c))), None);
        }
        a.handle_key(key(KeyCode::Char('q')));
        a.handle_key(key(KeyCode::Backspace));
        a.handle_key(key(KeyCode::Enter));
        assert_eq!(a.mode, InputMode::Normal);
        assert_eq!(a.filter, "BAs");
        assert_eq!(a.selected_pid(), Some(12));
    }

    #[test]
    fn no_control_without_rows() {
        let mut a = app();
        a.filter = "nothing-matches".into();
        assert_eq!(a.handle_key(key(KeyCode::Char('k'))), None);
        assert_eq!(a.handle_key(key(KeyCode::Down)), None);
        assert_eq!(a.selected_pid(), None);
    }

    #[test]
    fn sort_toggle_reorders_selection() {
        let mut a = app();
        a.handle_key(key(KeyCode::Char('o')));
        assert_eq!(a.sort_by, ProcSortBy::MemDesc);
        assert_eq!(a.selected_pid(), Some(11));
        a.handle_key(key(KeyCode::Down));
        assert_eq!(a.selected_pid(), Some(10));
    }

    #[test]
    fn refresh_key_and_schedule() {
        let mut a = app();
        assert!(a.refresh_due());
        assert_eq!(
            a.handle_key(key(KeyCode::Char('r'))),
            Some(Command::Refresh)
        );
        a.last_refresh = Some(Instant::now());
        assert!(!a.refresh_due());
    }

    #[test]
    fn stream_events_update_link_and_history() {
        let mut a = app();
        assert_eq!(a.link, Link::Connecting);
        a.on_stream_event(StreamEvent::Status(status(12.6)));
        a.on_stream_event(StreamEvent::Status(status(40.0)));
        assert_eq!(a.link, Link::Live);
        assert_eq!(a.cpu_hist, VecDeque::from(vec![13, 40]));
        a.on_stream_event(StreamEvent::Closed("closed by agent".into()));
        assert_eq!(a.link, Link::Disconnected("closed by agent".into()));
        assert!(a.status.is_some());
    }

    #[test]
    fn shrinking_list_clamps_selection() {
        let mut a = app();
        a.handle_key(key(KeyCode::End));
        a.set_processes(ProcessList {
            count: 1,
            processes: vec![row(99, "init", 0.0, 1.0)],
        });
        assert_eq!(a.selected_pid(), Some(99));
    }
}
