use std::{io, time::Duration};
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Bar, BarChart, BarGroup, Block, Borders, BorderType, Paragraph, Gauge, Padding},
};
use stitchline_core::{
    Bucket, BucketOrder, DatedRecord, RecordRepository, ReportQuery, ReportUseCase, SummaryStats,
    TimeSeriesAggregator,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::report::format_value;

// --- THEME ---
struct Theme {
    primary: Color,
    muted: Color,
    text: Color,
    bar: Color,
    warn: Color,
}

const THEME: Theme = Theme {
    primary: Color::Cyan,
    muted: Color::DarkGray,
    text: Color::White,
    bar: Color::Green,
    warn: Color::Red,
};

const MAX_BAR_WIDTH: usize = 10;

pub struct ChartApp {
    records: Vec<DatedRecord>,
    pub query: ReportQuery,
    aggregator: TimeSeriesAggregator,
    pub buckets: Vec<Bucket>,
    pub summary: SummaryStats,
    pub metric_index: usize,
    pub error: Option<String>,
}

impl ChartApp {
    /// `records` must already be scoped to the query's period.
    pub fn new(records: Vec<DatedRecord>, query: ReportQuery, aggregator: TimeSeriesAggregator) -> Self {
        let mut app = Self {
            records,
            query,
            aggregator,
            buckets: Vec::new(),
            summary: SummaryStats::default(),
            metric_index: 0,
            error: None,
        };
        app.refresh();
        app
    }

    /// Recomputes buckets and summary after any selection change.
    pub fn refresh(&mut self) {
        let result = self
            .aggregator
            .aggregate(&self.records, self.query.granularity, &self.query.metrics)
            .and_then(|buckets| {
                let summary = self
                    .aggregator
                    .summarize(&buckets, &self.query.metrics, self.query.primary.as_deref())?;
                Ok((buckets, summary))
            });

        match result {
            Ok((buckets, summary)) => {
                self.buckets = buckets;
                self.summary = summary;
                self.error = None;
            }
            Err(e) => {
                self.buckets.clear();
                self.summary = SummaryStats::default();
                self.error = Some(e.to_string());
            }
        }
    }

    pub fn current_metric(&self) -> Option<&str> {
        self.query.metrics.get(self.metric_index).map(String::as_str)
    }

    pub fn next_metric(&mut self) {
        if !self.query.metrics.is_empty() && self.metric_index < self.query.metrics.len() - 1 {
            self.metric_index += 1;
        }
    }

    pub fn previous_metric(&mut self) {
        if self.metric_index > 0 {
            self.metric_index -= 1;
        }
    }

    pub fn cycle_granularity(&mut self) {
        self.query.granularity = self.query.granularity.next();
        self.refresh();
    }

    pub fn toggle_order(&mut self) {
        let order = match self.aggregator.order() {
            BucketOrder::Chronological => BucketOrder::Lexicographic,
            BucketOrder::Lexicographic => BucketOrder::Chronological,
        };
        self.aggregator = TimeSeriesAggregator::new(order);
        self.refresh();
    }
}

pub fn run<R: RecordRepository>(repo: &R, query: ReportQuery, aggregator: TimeSeriesAggregator) -> Result<()> {
    // Data setup
    let records = ReportUseCase::new(repo, aggregator).scoped_records(&query)?;

    if records.is_empty() {
        println!("No records in this period.");
        return Ok(());
    }

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = ChartApp::new(records, query, aggregator);

    // Main loop
    loop {
        terminal.draw(|f| ui(f, &app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => break,
                        KeyCode::Left | KeyCode::Char('h') => app.previous_metric(),
                        KeyCode::Right | KeyCode::Char('l') => app.next_metric(),
                        KeyCode::Char('g') => app.cycle_granularity(),
                        KeyCode::Char('o') => app.toggle_order(),
                        _ => {}
                    }
                }
            }
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}

fn ui(frame: &mut Frame, app: &ChartApp) {
    let size = frame.area();

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Chart + sidebar
            Constraint::Length(1), // Footer
        ])
        .split(size);

    let Some(metric) = app.current_metric() else {
        frame.render_widget(
            Paragraph::new("No metrics selected").alignment(Alignment::Center),
            main_layout[1],
        );
        return;
    };

    // --- Header ---
    let header_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(20),
            Constraint::Min(1),
            Constraint::Length(40),
        ])
        .split(main_layout[0]);

    let app_title = Paragraph::new(Span::styled("STITCHLINE", Style::default().fg(THEME.primary).add_modifier(Modifier::BOLD)))
        .block(Block::default().padding(Padding::new(0, 0, 1, 0)));
    frame.render_widget(app_title, header_layout[0]);

    let last = app.query.metrics.len().saturating_sub(1);
    let nav_text = Line::from(vec![
        Span::styled(" < ", Style::default().fg(if app.metric_index > 0 { THEME.text } else { THEME.muted })),
        Span::styled(format!("{} · {}", metric, app.query.granularity), Style::default().fg(THEME.text).add_modifier(Modifier::BOLD)),
        Span::styled(" > ", Style::default().fg(if app.metric_index < last { THEME.text } else { THEME.muted })),
    ]);
    let nav = Paragraph::new(nav_text).alignment(Alignment::Right).block(Block::default().padding(Padding::new(0, 0, 1, 0)));
    frame.render_widget(nav, header_layout[2]);

    frame.render_widget(
        Block::default().borders(Borders::BOTTOM).border_style(Style::default().fg(THEME.muted)),
        main_layout[0],
    );

    // --- Content ---
    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(75),
            Constraint::Length(1),
            Constraint::Percentage(25),
        ])
        .split(main_layout[1]);

    if let Some(err) = &app.error {
        frame.render_widget(
            Paragraph::new(err.as_str()).style(Style::default().fg(THEME.warn)).alignment(Alignment::Center),
            content_chunks[0],
        );
    } else {
        draw_chart(frame, app, metric, content_chunks[0]);
    }
    draw_info_panel(frame, app, metric, content_chunks[2]);

    // --- Footer ---
    let help = Line::from(vec![
        Span::styled("METRIC: ", Style::default().fg(THEME.muted)),
        Span::styled("←/→ ", Style::default().fg(THEME.text)),
        Span::styled("GROUP: ", Style::default().fg(THEME.muted)),
        Span::styled("g ", Style::default().fg(THEME.text)),
        Span::styled("ORDER: ", Style::default().fg(THEME.muted)),
        Span::styled("o ", Style::default().fg(THEME.text)),
        Span::styled("QUIT: ", Style::default().fg(THEME.muted)),
        Span::styled("q", Style::default().fg(THEME.text)),
    ]);
    frame.render_widget(Paragraph::new(help).alignment(Alignment::Center), main_layout[2]);
}

fn draw_chart(frame: &mut Frame, app: &ChartApp, metric: &str, area: Rect) {
    let bar_width = bar_width(&app.buckets);

    let bar_items: Vec<Bar> = app
        .buckets
        .iter()
        .map(|bucket| {
            let value = bucket.value(metric);
            Bar::default()
                .label(truncate_label(&bucket.label, bar_width))
                .value(value.max(0.0).round() as u64)
                .style(Style::default().fg(THEME.bar))
                .text_value(if value != 0.0 { format_value(value) } else { String::new() })
        })
        .collect();

    let chart_block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(THEME.muted))
        .title(format!(" {} per {} ", metric, app.query.granularity));

    let chart = BarChart::default()
        .block(chart_block)
        .bar_width(bar_width as u16)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bar_items));

    frame.render_widget(chart, area);
}

fn draw_info_panel(frame: &mut Frame, app: &ChartApp, metric: &str, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(10), // Stats
            Constraint::Min(1),     // Consistency
        ])
        .split(area);

    let stats = app.summary.metric(metric).cloned().unwrap_or_default();

    let info_text = vec![
        Line::from(vec![Span::styled("Overview", Style::default().add_modifier(Modifier::BOLD))]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Total:    ", Style::default().fg(THEME.muted)),
            Span::styled(format_value(stats.total), Style::default().fg(THEME.bar).add_modifier(Modifier::BOLD)),
        ]),
        Line::from(vec![
            Span::styled("Peak:     ", Style::default().fg(THEME.muted)),
            Span::styled(format_value(stats.peak), Style::default().fg(THEME.text)),
        ]),
        Line::from(vec![
            Span::styled("Average:  ", Style::default().fg(THEME.muted)),
            Span::styled(format!("{:.2}", stats.average), Style::default().fg(THEME.text)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Buckets:  ", Style::default().fg(THEME.muted)),
            Span::styled(app.summary.bucket_count.to_string(), Style::default().fg(THEME.text)),
        ]),
    ];

    let info_block = Paragraph::new(info_text)
        .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded).border_style(Style::default().fg(THEME.muted)).title(" Summary "));
    frame.render_widget(info_block, chunks[0]);

    // Consistency only exists for the primary metric; otherwise show average vs peak
    let ratio = stats
        .consistency_ratio
        .unwrap_or(if stats.peak > 0.0 { stats.average / stats.peak } else { 0.0 });
    let gauge = Gauge::default()
        .block(Block::default().title(" Consistency ").borders(Borders::ALL).border_type(BorderType::Rounded).border_style(Style::default().fg(THEME.muted)))
        .gauge_style(Style::default().fg(if ratio < 0.5 { THEME.warn } else { THEME.bar }))
        .ratio(ratio.clamp(0.0, 1.0))
        .label(format!("{:.0}% of peak", ratio * 100.0));

    frame.render_widget(gauge, chunks[1]);
}

fn bar_width(buckets: &[Bucket]) -> usize {
    buckets
        .iter()
        .map(|b| b.label.width())
        .max()
        .unwrap_or(3)
        .clamp(3, MAX_BAR_WIDTH)
}

fn truncate_label(label: &str, width: usize) -> String {
    if label.width() <= width {
        return label.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in label.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        out.push(c);
    }
    out
}
