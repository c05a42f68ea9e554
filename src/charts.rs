use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Style};
use ratatui::symbols;
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph,
};

use crate::aggregate::Summary;
use crate::report::{display_label, format_percent};

// Hold rates are drawn as per-mille bars so the integer bar scale spans 0..=1.
const RATE_SCALE: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartView {
    Surfaces,
    HoldRate,
    Monthly,
}

impl ChartView {
    pub const ALL: [ChartView; 3] = [ChartView::Surfaces, ChartView::HoldRate, ChartView::Monthly];

    pub fn title(self) -> &'static str {
        match self {
            ChartView::Surfaces => "Number of Games by Surface",
            ChartView::HoldRate => "Serve Hold Percentage by Surface",
            ChartView::Monthly => "Number of Games per Month",
        }
    }

    pub fn next(self) -> Self {
        match self {
            ChartView::Surfaces => ChartView::HoldRate,
            ChartView::HoldRate => ChartView::Monthly,
            ChartView::Monthly => ChartView::Surfaces,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            ChartView::Surfaces => ChartView::Monthly,
            ChartView::HoldRate => ChartView::Surfaces,
            ChartView::Monthly => ChartView::HoldRate,
        }
    }
}

pub struct ChartViewer<'a> {
    summary: &'a Summary,
    view: ChartView,
    should_quit: bool,
}

impl<'a> ChartViewer<'a> {
    pub fn new(summary: &'a Summary) -> Self {
        Self {
            summary,
            view: ChartView::Surfaces,
            should_quit: false,
        }
    }

    pub fn view(&self) -> ChartView {
        self.view
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn on_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('1') => self.view = ChartView::Surfaces,
            KeyCode::Char('2') => self.view = ChartView::HoldRate,
            KeyCode::Char('3') => self.view = ChartView::Monthly,
            KeyCode::Char('n') | KeyCode::Right | KeyCode::Tab => self.view = self.view.next(),
            KeyCode::Char('p') | KeyCode::Left | KeyCode::BackTab => {
                self.view = self.view.prev()
            }
            _ => {}
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(frame.size());

        draw_chart(frame, chunks[0], self.summary, self.view);

        let position = ChartView::ALL
            .iter()
            .position(|v| *v == self.view)
            .unwrap_or(0)
            + 1;
        let footer = Paragraph::new(format!(
            "Chart {position}/{}  1-3 select  n/p next/prev  q quit",
            ChartView::ALL.len()
        ))
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(footer, chunks[1]);
    }
}

/// Opens the terminal chart viewer and blocks until the user quits.
pub fn run_chart_viewer(summary: &Summary) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut viewer = ChartViewer::new(summary);
    let res = run_viewer(&mut terminal, &mut viewer);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_viewer<B: Backend>(terminal: &mut Terminal<B>, viewer: &mut ChartViewer) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    loop {
        terminal.draw(|f| viewer.draw(f))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    viewer.on_key(key.code);
                }
            }
        }

        if viewer.should_quit() {
            return Ok(());
        }
    }
}

pub fn draw_chart(frame: &mut Frame, area: Rect, summary: &Summary, view: ChartView) {
    let block = Block::default().title(view.title()).borders(Borders::ALL);
    match view {
        ChartView::Surfaces => {
            if summary.surface_counts.is_empty() {
                render_empty(frame, area, block);
                return;
            }
            let bars = summary
                .surface_counts
                .iter()
                .map(|item| {
                    Bar::default()
                        .value(item.games as u64)
                        .label(Line::from(display_label(&item.surface).to_string()))
                        .text_value(item.games.to_string())
                        .style(Style::default().fg(Color::Cyan))
                })
                .collect::<Vec<_>>();
            let chart = BarChart::default()
                .block(block.title_bottom("Surface  /  Number of Games"))
                .data(BarGroup::default().bars(&bars))
                .bar_width(bar_width(area, bars.len()))
                .bar_gap(2);
            frame.render_widget(chart, area);
        }
        ChartView::HoldRate => {
            if summary.hold_rate_by_surface.is_empty() {
                render_empty(frame, area, block);
                return;
            }
            let bars = summary
                .hold_rate_by_surface
                .iter()
                .map(|item| {
                    Bar::default()
                        .value(rate_bar_value(item.rate))
                        .label(Line::from(display_label(&item.surface).to_string()))
                        .text_value(format_percent(item.rate))
                        .style(Style::default().fg(Color::Green))
                })
                .collect::<Vec<_>>();
            let chart = BarChart::default()
                .block(block.title_bottom(
                    "Surface  /  Hold Rate (fraction of service games held, 0 to 1)",
                ))
                .data(BarGroup::default().bars(&bars))
                .bar_width(bar_width(area, bars.len()))
                .bar_gap(2)
                .max(RATE_SCALE as u64);
            frame.render_widget(chart, area);
        }
        ChartView::Monthly => {
            if summary.games_per_month.is_empty() {
                render_empty(frame, area, block);
                return;
            }
            let points = summary
                .games_per_month
                .iter()
                .enumerate()
                .map(|(idx, item)| (idx as f64, item.games as f64))
                .collect::<Vec<_>>();
            let months = summary
                .games_per_month
                .iter()
                .map(|item| item.month.to_string())
                .collect::<Vec<_>>();
            let max_labels = usize::from(area.width / 9).max(2);
            let x_labels = thin_labels(&months, max_labels)
                .into_iter()
                .map(Span::raw)
                .collect::<Vec<_>>();

            let top = points.iter().map(|(_, y)| *y).fold(0.0, f64::max);
            let y_max = (top * 1.1).ceil().max(1.0);
            let y_labels = vec![
                Span::raw("0"),
                Span::raw(format!("{:.0}", y_max / 2.0)),
                Span::raw(format!("{y_max:.0}")),
            ];

            let datasets = vec![
                Dataset::default()
                    .name("games")
                    .marker(symbols::Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(Color::Cyan))
                    .data(&points),
                Dataset::default()
                    .marker(symbols::Marker::Dot)
                    .graph_type(GraphType::Scatter)
                    .style(Style::default().fg(Color::Yellow))
                    .data(&points),
            ];
            let chart = Chart::new(datasets)
                .block(block)
                .x_axis(
                    Axis::default()
                        .title("Month")
                        .bounds([0.0, (points.len().saturating_sub(1)).max(1) as f64])
                        .labels(x_labels),
                )
                .y_axis(
                    Axis::default()
                        .title("Number of Games")
                        .bounds([0.0, y_max])
                        .labels(y_labels),
                );
            frame.render_widget(chart, area);
        }
    }
}

fn render_empty(frame: &mut Frame, area: Rect, block: Block) {
    frame.render_widget(Paragraph::new("no data").block(block), area);
}

/// Bar height for a hold rate, clamped to the chart's fixed 0..=1 range.
pub fn rate_bar_value(rate: f64) -> u64 {
    (rate.clamp(0.0, 1.0) * RATE_SCALE).round() as u64
}

fn bar_width(area: Rect, bars: usize) -> u16 {
    let inner = area.width.saturating_sub(2);
    let slots = u16::try_from(bars.max(1)).unwrap_or(u16::MAX);
    (inner / slots).saturating_sub(2).clamp(3, 20)
}

/// Evenly spaced subset of axis labels, always keeping the first and last.
///
/// The axis spreads labels evenly, so the step between kept labels must
/// divide the point span exactly or labels drift off their points. The
/// largest such subset of at most `max` labels is returned.
pub fn thin_labels(labels: &[String], max: usize) -> Vec<String> {
    let n = labels.len();
    if n <= max {
        return labels.to_vec();
    }
    if max < 2 {
        return labels.iter().take(1).cloned().collect();
    }
    let span = n - 1;
    let gaps = (1..max).rev().find(|gaps| span % gaps == 0).unwrap_or(1);
    labels.iter().step_by(span / gaps).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thin_labels_keeps_ends() {
        let labels = (1..=12).map(|m| format!("2024-{m:02}")).collect::<Vec<_>>();
        assert_eq!(thin_labels(&labels, 4), vec!["2024-01", "2024-12"]);
        assert_eq!(thin_labels(&labels[..3], 4), labels[..3].to_vec());
        assert_eq!(thin_labels(&labels, 1), vec!["2024-01"]);
    }

    #[test]
    fn thinned_labels_sit_on_data_points() {
        let labels = (0..13).map(|i| format!("m{i}")).collect::<Vec<_>>();
        assert_eq!(thin_labels(&labels, 5), vec!["m0", "m3", "m6", "m9", "m12"]);
        assert_eq!(thin_labels(&labels, 6), vec!["m0", "m3", "m6", "m9", "m12"]);
        assert_eq!(thin_labels(&labels, 8), vec!["m0", "m2", "m4", "m6", "m8", "m10", "m12"]);
    }

    #[test]
    fn rate_bars_use_fixed_unit_scale() {
        assert_eq!(rate_bar_value(0.0), 0);
        assert_eq!(rate_bar_value(0.6667), 667);
        assert_eq!(rate_bar_value(1.0), 1000);
        assert_eq!(rate_bar_value(1.5), 1000);
    }
}
