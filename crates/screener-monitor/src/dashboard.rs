//! TUI Dashboard using ratatui.

use chrono::{DateTime, Local};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

use screener_core::types::{Classification, TrendDirection};
use screener_signals::SignalEvaluation;

const MAX_MESSAGES: usize = 100;

/// Dashboard state.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub strategy_name: String,
    pub provider: String,
    pub alerts_enabled: bool,
    /// Rows of the latest completed cycle.
    pub rows: Vec<SignalEvaluation>,
    pub last_updated: Option<DateTime<Local>>,
    pub cycles: usize,
    pub alerts_sent: usize,
    pub messages: Vec<String>,
}

impl DashboardState {
    /// Number of rows with the given classification.
    pub fn count(&self, classification: Classification) -> usize {
        self.rows
            .iter()
            .filter(|r| r.classification == classification)
            .count()
    }

    /// Append a log line, keeping only the most recent ones.
    pub fn push_message(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
        if self.messages.len() > MAX_MESSAGES {
            let excess = self.messages.len() - MAX_MESSAGES;
            self.messages.drain(..excess);
        }
    }
}

/// TUI Dashboard.
pub struct Dashboard {
    refresh_ms: u64,
}

impl Dashboard {
    /// Create a new dashboard.
    pub fn new(refresh_ms: u64) -> Self {
        Self { refresh_ms }
    }

    /// Run the dashboard until 'q' or Esc.
    pub fn run<F>(&self, mut get_state: F) -> io::Result<()>
    where
        F: FnMut() -> DashboardState,
    {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let res = self.run_loop(&mut terminal, &mut get_state);

        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        res
    }

    fn run_loop<B, F>(&self, terminal: &mut Terminal<B>, get_state: &mut F) -> io::Result<()>
    where
        B: Backend,
        F: FnMut() -> DashboardState,
    {
        loop {
            let state = get_state();
            terminal.draw(|f| self.ui(f, &state))?;

            if event::poll(Duration::from_millis(self.refresh_ms))? {
                if let Event::Key(key) = event::read()? {
                    if key.code == KeyCode::Char('q') || key.code == KeyCode::Esc {
                        return Ok(());
                    }
                }
            }
        }
    }

    fn ui(&self, frame: &mut Frame, state: &DashboardState) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Length(4), // Stats
                Constraint::Min(10),   // Signals
                Constraint::Length(8), // Messages
            ])
            .split(frame.area());

        self.render_header(frame, chunks[0], state);
        self.render_stats(frame, chunks[1], state);
        self.render_signals(frame, chunks[2], state);
        self.render_messages(frame, chunks[3], state);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect, state: &DashboardState) {
        let updated = state
            .last_updated
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "waiting for first cycle".to_string());

        let header = Paragraph::new(vec![Line::from(vec![
            Span::styled(
                "Signal Screener",
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(" | "),
            Span::styled(&state.strategy_name, Style::default().fg(Color::Cyan)),
            Span::raw(format!(" ({}) | Last updated: {}", state.provider, updated)),
            Span::raw(" | Press 'q' to quit"),
        ])])
        .block(Block::default().borders(Borders::ALL).title("System"));
        frame.render_widget(header, area);
    }

    fn render_stats(&self, frame: &mut Frame, area: Rect, state: &DashboardState) {
        let (alerts_label, alerts_color) = if state.alerts_enabled {
            ("on", Color::Green)
        } else {
            ("off", Color::DarkGray)
        };

        let stats = Paragraph::new(vec![Line::from(vec![
            Span::raw("BUY: "),
            Span::styled(
                state.count(Classification::Buy).to_string(),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  |  SELL: "),
            Span::styled(
                state.count(Classification::Sell).to_string(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  |  No data: "),
            Span::raw(state.count(Classification::NoData).to_string()),
            Span::raw("  |  Cycles: "),
            Span::raw(state.cycles.to_string()),
            Span::raw("  |  Alerts: "),
            Span::styled(alerts_label, Style::default().fg(alerts_color)),
            Span::raw(format!(" ({} sent)", state.alerts_sent)),
        ])])
        .block(Block::default().borders(Borders::ALL).title("Statistics"));
        frame.render_widget(stats, area);
    }

    fn render_signals(&self, frame: &mut Frame, area: Rect, state: &DashboardState) {
        let header_cells = ["Symbol", "Close", "Signal", "Action", "Details"]
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().add_modifier(Modifier::BOLD)));
        let header = Row::new(header_cells).height(1);

        let rows = state.rows.iter().map(|eval| {
            let color = signal_color(eval.classification);
            Row::new(vec![
                Cell::from(eval.symbol.clone()),
                Cell::from(
                    eval.close
                        .map(|c| format!("{:.2}", c))
                        .unwrap_or_else(|| "-".to_string()),
                ),
                Cell::from(eval.classification.label()).style(Style::default().fg(color)),
                Cell::from(eval.classification.action()),
                Cell::from(eval.summary()),
            ])
        });

        let table = Table::new(
            rows,
            [
                Constraint::Percentage(14),
                Constraint::Percentage(10),
                Constraint::Percentage(18),
                Constraint::Percentage(12),
                Constraint::Percentage(46),
            ],
        )
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("Signals"));

        frame.render_widget(table, area);
    }

    fn render_messages(&self, frame: &mut Frame, area: Rect, state: &DashboardState) {
        let messages: Vec<Line> = state
            .messages
            .iter()
            .rev()
            .take(5)
            .map(|m| Line::from(m.as_str()))
            .collect();

        let paragraph =
            Paragraph::new(messages).block(Block::default().borders(Borders::ALL).title("Log"));
        frame.render_widget(paragraph, area);
    }
}

fn signal_color(classification: Classification) -> Color {
    match classification {
        Classification::Buy => Color::Green,
        Classification::Sell => Color::Red,
        Classification::NoData => Color::DarkGray,
        Classification::TrendOnly(TrendDirection::Bullish)
        | Classification::Bias(TrendDirection::Bullish) => Color::LightGreen,
        Classification::TrendOnly(TrendDirection::Bearish)
        | Classification::Bias(TrendDirection::Bearish) => Color::LightRed,
        Classification::Avoid | Classification::Mixed => Color::Yellow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use screener_signals::SignalDetail;

    fn state() -> DashboardState {
        DashboardState {
            strategy_name: "footprint".into(),
            provider: "yahoo".into(),
            alerts_enabled: true,
            rows: vec![
                SignalEvaluation {
                    symbol: "RELIANCE".into(),
                    classification: Classification::Buy,
                    close: Some(2950.5),
                    detail: SignalDetail::MultiTimeframe { timeframes: vec![] },
                },
                SignalEvaluation::unavailable("HAL", "fetch failed"),
            ],
            last_updated: None,
            cycles: 3,
            alerts_sent: 1,
            messages: vec!["Cycle complete".into()],
        }
    }

    fn rendered(state: &DashboardState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 30)).unwrap();
        let dashboard = Dashboard::new(250);
        terminal.draw(|f| dashboard.ui(f, state)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_counts() {
        let state = state();
        assert_eq!(state.count(Classification::Buy), 1);
        assert_eq!(state.count(Classification::NoData), 1);
        assert_eq!(state.count(Classification::Sell), 0);
    }

    #[test]
    fn test_messages_are_capped() {
        let mut state = DashboardState::default();
        for i in 0..(MAX_MESSAGES + 10) {
            state.push_message(format!("line {}", i));
        }
        assert_eq!(state.messages.len(), MAX_MESSAGES);
        assert_eq!(state.messages[0], "line 10");
    }

    #[test]
    fn test_render_rows() {
        let screen = rendered(&state());
        assert!(screen.contains("RELIANCE"));
        assert!(screen.contains("2950.50"));
        assert!(screen.contains("NO_DATA"));
        assert!(screen.contains("waiting for first cycle"));
    }
}
