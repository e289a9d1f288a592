//! Ratatui-based terminal dashboard.
//!
//! The dashboard is the terminal rendition of the parameter form: edit the
//! model inputs on the left, run the model, and browse the returned series
//! with their statistics. Scenarios saved here live in memory for the session
//! and can be exported to JSON.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};

use crate::api::{ModelApi, ModelClient, SourceSystem};
use crate::app::pipeline::{RunOutput, run_model};
use crate::cli::TuiArgs;
use crate::domain::ModelParams;
use crate::error::AppError;
use crate::results::{Series, format_currency, format_signed_percent, period_axis, summarize_series};
use crate::scenario::{Scenario, ScenarioStore, predefined_scenarios, write_export_json};

mod form;
mod plotters_chart;

use form::FormField;
use plotters_chart::{SeriesPlottersChart, fmt_axis_value};

const DEFAULT_PURPOSE: &str = "Terminal Dashboard";

/// Start the dashboard.
pub fn run(args: TuiArgs) -> Result<(), AppError> {
    let params = crate::app::resolve_params(&args.source)?;
    let purpose = if args.purpose.trim().is_empty() {
        DEFAULT_PURPOSE.to_string()
    } else {
        args.purpose
    };

    // A missing endpoint is shown in the status line; the form still works.
    let (api, status) = match ModelClient::from_env() {
        Ok(client) => (
            Some(Box::new(client) as Box<dyn ModelApi>),
            "Ready. Press r to run the model.".to_string(),
        ),
        Err(e) => (None, format!("Model API unavailable: {e}")),
    };

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::runtime(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(api, params, purpose);
    app.status = status;
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::runtime(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::runtime(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Mode {
    Browse,
    /// Typing a value for the selected field.
    EditField(String),
    /// Typing the name a scenario is saved under.
    NameScenario(String),
}

struct App {
    api: Option<Box<dyn ModelApi>>,
    params: ModelParams,
    purpose: String,
    selected_field: usize,
    mode: Mode,
    status: String,
    run: Option<RunOutput>,
    selected_series: usize,
    store: ScenarioStore,
    next_saved: usize,
    next_predefined: usize,
}

impl App {
    fn new(api: Option<Box<dyn ModelApi>>, params: ModelParams, purpose: String) -> Self {
        Self {
            api,
            params,
            purpose,
            selected_field: 0,
            mode: Mode::Browse,
            status: String::new(),
            run: None,
            selected_series: 0,
            store: ScenarioStore::new(),
            next_saved: 0,
            next_predefined: 0,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::runtime(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::runtime(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::runtime(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if key.code == KeyCode::Char('r') && self.mode == Mode::Browse {
                        // Show the pending state before the blocking call.
                        self.status = "Running model...".to_string();
                        terminal
                            .draw(|f| self.draw(f))
                            .map_err(|e| AppError::runtime(format!("Terminal draw error: {e}")))?;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the dashboard should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match self.mode.clone() {
            Mode::EditField(buf) => {
                self.handle_field_edit(code, buf);
                return false;
            }
            Mode::NameScenario(buf) => {
                self.handle_name_edit(code, buf);
                return false;
            }
            Mode::Browse => {}
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => self.selected_field = self.selected_index().saturating_sub(1),
            KeyCode::Down => {
                if self.selected_index() + 1 < self.fields().len() {
                    self.selected_field = self.selected_index() + 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Enter => {
                let field = self.field();
                self.mode = Mode::EditField(field.raw(&self.params));
                self.status = format!("Editing {}. Enter to apply, Esc to cancel.", field.label());
            }
            KeyCode::Char('r') => self.run_model(),
            KeyCode::Tab => self.cycle_series(),
            KeyCode::Char('s') => {
                self.mode = Mode::NameScenario(format!("Scenario {}", self.store.len() + 1));
                self.status = "Scenario name. Enter to save, Esc to cancel.".to_string();
            }
            KeyCode::Char('l') => self.load_next_saved(),
            KeyCode::Char('p') => self.load_next_predefined(),
            KeyCode::Char('e') => self.export(),
            _ => {}
        }

        false
    }

    fn handle_field_edit(&mut self, code: KeyCode, mut buf: String) {
        match code {
            KeyCode::Esc => {
                self.mode = Mode::Browse;
                self.status = "Edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.mode = Mode::Browse;
                let field = self.field();
                self.status = match field.apply_text(&mut self.params, &buf) {
                    Ok(()) => format!("{}: {}", field.label(), field.display(&self.params)),
                    Err(e) => e.to_string(),
                };
            }
            KeyCode::Backspace => {
                buf.pop();
                self.mode = Mode::EditField(buf);
            }
            KeyCode::Char(c) => {
                buf.push(c);
                self.mode = Mode::EditField(buf);
            }
            _ => {}
        }
    }

    fn handle_name_edit(&mut self, code: KeyCode, mut buf: String) {
        match code {
            KeyCode::Esc => {
                self.mode = Mode::Browse;
                self.status = "Save canceled.".to_string();
            }
            KeyCode::Enter => {
                self.mode = Mode::Browse;
                self.save_scenario(buf.trim());
            }
            KeyCode::Backspace => {
                buf.pop();
                self.mode = Mode::NameScenario(buf);
            }
            KeyCode::Char(c) => {
                buf.push(c);
                self.mode = Mode::NameScenario(buf);
            }
            _ => {}
        }
    }

    /// Form rows; the lease block grows and shrinks with the parameters.
    fn fields(&self) -> Vec<FormField> {
        FormField::all(&self.params)
    }

    /// Selection clamped to the current rows (a loaded scenario may have fewer leases).
    fn selected_index(&self) -> usize {
        self.selected_field.min(self.fields().len().saturating_sub(1))
    }

    fn field(&self) -> FormField {
        self.fields()
            .get(self.selected_index())
            .copied()
            .unwrap_or(FormField::Capex)
    }

    fn adjust_field(&mut self, delta: i32) {
        let field = self.field();
        field.adjust(&mut self.params, delta);
        self.status = format!("{}: {}", field.label(), field.display(&self.params));
    }

    fn run_model(&mut self) {
        let Some(api) = &self.api else {
            self.status = "Model API unavailable; set the model endpoint and restart.".to_string();
            return;
        };

        match run_model(api.as_ref(), &self.params, &self.purpose, SourceSystem::Dashboard) {
            Ok(run) => {
                self.status = format!(
                    "{} | {} rows | {} series",
                    run.outputs.model_name,
                    run.table.rows.len(),
                    run.series.len()
                );
                self.selected_series = 0;
                self.run = Some(run);
            }
            Err(e) => {
                tracing::warn!(error = %e, "dashboard run failed");
                self.status = format!("Error: {e}");
            }
        }
    }

    fn cycle_series(&mut self) {
        let n = self.run.as_ref().map(|r| r.series.len()).unwrap_or(0);
        if n == 0 {
            self.status = "No series to show; run the model first.".to_string();
            return;
        }
        self.selected_series = (self.selected_series + 1) % n;
        if let Some(series) = self.current_series() {
            self.status = format!("Series: {}", series.label);
        }
    }

    fn current_series(&self) -> Option<&Series> {
        self.run.as_ref().and_then(|r| r.series.get(self.selected_series))
    }

    fn save_scenario(&mut self, name: &str) {
        let mut scenario = Scenario::new(name, "Saved from the terminal dashboard", self.params.clone())
            .with_call_purpose(self.purpose.clone());
        // Results only belong to a scenario if they were computed from these inputs.
        if let Some(run) = self.run.as_ref().filter(|r| r.params == self.params) {
            scenario = scenario.with_result(run.scenario_result());
        }

        self.status = match self.store.save(scenario) {
            Ok(saved) => format!("Saved scenario '{}'", saved.name),
            Err(e) => e.to_string(),
        };
    }

    fn load_next_saved(&mut self) {
        let list = self.store.list();
        if list.is_empty() {
            self.status = "No saved scenarios yet (press s to save).".to_string();
            return;
        }
        let scenario = &list[self.next_saved % list.len()];
        self.params = scenario.parameters.clone();
        if !scenario.call_purpose.is_empty() {
            self.purpose = scenario.call_purpose.clone();
        }
        self.status = format!("Loaded scenario '{}'. Press r to run.", scenario.name);
        self.next_saved = (self.next_saved + 1) % list.len();
    }

    fn load_next_predefined(&mut self) {
        let all = predefined_scenarios();
        if all.is_empty() {
            return;
        }
        let scenario = &all[self.next_predefined % all.len()];
        self.params = scenario.parameters.clone();
        self.status = format!("{}: {}", scenario.name, scenario.description);
        self.next_predefined = (self.next_predefined + 1) % all.len();
    }

    fn export(&mut self) {
        if self.store.is_empty() {
            self.status = "Nothing to export; save a scenario first.".to_string();
            return;
        }
        let path = crate::app::default_export_path();
        self.status = match write_export_json(&path, &self.store.to_export()) {
            Ok(()) => format!("Exported {} scenarios to {}", self.store.len(), path.display()),
            Err(e) => format!("Export failed: {e}"),
        };
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("fpm", Style::default().fg(Color::Cyan)),
            Span::raw(" | Financial Planning Model dashboard"),
        ]));

        lines.push(Line::from(Span::styled(
            format!(
                "purpose: {} | line item: {} | saved scenarios: {}",
                self.purpose,
                self.params.line_item,
                self.store.len()
            ),
            Style::default().fg(Color::Gray),
        )));

        if let Some(run) = &self.run {
            lines.push(Line::from(Span::styled(
                format!(
                    "client: {} | model: {} | project: {} | computed {}",
                    run.outputs.client_name,
                    run.outputs.model_name,
                    run.outputs.project_name,
                    run.computed_at.format("%H:%M:%S")
                ),
                Style::default().fg(Color::Gray),
            )));
        }

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(44), Constraint::Min(0)])
            .split(area);

        self.draw_form(frame, columns[0]);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(8)])
            .split(columns[1]);

        self.draw_chart(frame, right[0]);
        self.draw_stats(frame, right[1]);
    }

    fn draw_form(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = self
            .fields()
            .iter()
            .map(|f| ListItem::new(format!("{:<18} {}", f.label(), f.display(&self.params))))
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Parameters").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_index()));
        frame.render_stateful_widget(list, area, &mut state);

        let prompt = match &self.mode {
            Mode::Browse => None,
            Mode::EditField(buf) => Some(format!("{}: {buf}_", self.field().label())),
            Mode::NameScenario(buf) => Some(format!("Name: {buf}_")),
        };
        if let Some(prompt) = prompt {
            let hint = Paragraph::new(prompt).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
            let rect = Rect {
                x: area.x + 2,
                y: area.y + area.height.saturating_sub(2),
                width: area.width.saturating_sub(4),
                height: 1,
            };
            frame.render_widget(Clear, rect);
            frame.render_widget(hint, rect);
        }
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = match self.current_series() {
            Some(s) => format!(
                "{} ({}/{})",
                s.label,
                self.selected_series + 1,
                self.run.as_ref().map(|r| r.series.len()).unwrap_or(0)
            ),
            None => "Results".to_string(),
        };
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let data = self.run.as_ref().and_then(|r| chart_data(&r.series, self.selected_series));
        let Some(data) = data else {
            let msg = if self.run.is_some() {
                "The model returned no numeric series."
            } else {
                "Press r to run the model."
            };
            let p = Paragraph::new(msg).style(Style::default().fg(Color::Yellow));
            frame.render_widget(p, inner);
            return;
        };

        let (chart_rect, insets) = chart_layout(inner);
        let widget = SeriesPlottersChart {
            line: &data.line,
            context: &data.context,
            x_labels: &data.x_labels,
            x_bounds: data.x_bounds,
            y_bounds: data.y_bounds,
            y_label: "value",
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, &data);
        }
    }

    fn draw_stats(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Statistics").borders(Borders::ALL);
        let lines = match self.current_series().and_then(summarize_series) {
            Some(summary) => stats_lines(&summary.stats),
            None => vec![Line::from(Span::styled("-", Style::default().fg(Color::Gray)))],
        };
        frame.render_widget(Paragraph::new(Text::from(lines)).block(block), area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ field  ←/→ adjust  Enter edit  r run  Tab series  s save  l load  p preset  e export  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn stats_lines(stats: &crate::results::SeriesStats) -> Vec<Line<'static>> {
    let change = stats
        .percent_change
        .map(format_signed_percent)
        .unwrap_or_else(|| "N/A".to_string());
    let trend_color = match stats.trend {
        crate::results::Trend::Growing => Color::Green,
        crate::results::Trend::Declining => Color::Red,
        crate::results::Trend::Flat => Color::Gray,
    };
    vec![
        Line::from(format!(
            "min {}   max {}   mean {}",
            format_currency(stats.min),
            format_currency(stats.max),
            format_currency(stats.mean)
        )),
        Line::from(format!(
            "first {}   last {}   change {}",
            format_currency(stats.first),
            format_currency(stats.last),
            format_currency(stats.change)
        )),
        Line::from(vec![
            Span::raw(format!("{} points   ", stats.count)),
            Span::styled(
                format!("{} ({change} over period)", stats.trend.label()),
                Style::default().fg(trend_color).add_modifier(Modifier::BOLD),
            ),
        ]),
    ]
}

/// Chart inputs for the selected series; `None` when nothing is plottable.
struct ChartData {
    line: Vec<(f64, f64)>,
    context: Vec<Vec<(f64, f64)>>,
    x_labels: Vec<String>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

fn chart_data(series: &[Series], selected: usize) -> Option<ChartData> {
    let current = series.get(selected).filter(|s| !s.is_empty())?;

    // Every series is placed by period on one shared axis.
    let axis = period_axis(series);
    let to_xy = |s: &Series| -> Vec<(f64, f64)> {
        s.axis_points(&axis)
            .into_iter()
            .filter(|(_, y)| y.is_finite())
            .collect()
    };

    let line = to_xy(current);
    let context: Vec<Vec<(f64, f64)>> = series
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != selected)
        .map(|(_, s)| to_xy(s))
        .collect();

    // A single period still needs a non-empty x range.
    let x_bounds = [-0.25, (axis.len().max(2) - 1) as f64 + 0.25];
    let x_labels = axis;

    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(_, y) in line.iter().chain(context.iter().flatten()) {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !y_min.is_finite() || !y_max.is_finite() {
        return None;
    }
    if y_max <= y_min {
        let half = (y_min.abs() * 0.05).max(1.0);
        y_min -= half;
        y_max += half;
    }
    let pad = (y_max - y_min) * 0.05;

    Some(ChartData {
        line,
        context,
        x_labels,
        x_bounds,
        y_bounds: [y_min - pad, y_max + pad],
    })
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 8,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10 || inner.height <= insets.top + insets.bottom + 5 {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(frame: &mut ratatui::Frame<'_>, inner: Rect, chart: Rect, insets: AxisInsets, data: &ChartData) {
    let style = Style::default().fg(Color::Gray);
    let [x0, x1] = data.x_bounds;

    // One label per period under its x position.
    for (i, label) in data.x_labels.iter().enumerate() {
        let u = (i as f64 - x0) / (x1 - x0);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label_len = label.chars().count() as u16;
        let start = x.saturating_sub(label_len / 2);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 || start + label_len > inner.x + inner.width {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label.clone()).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let ticks = 5usize;
    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = data.y_bounds[0] + u * (data.y_bounds[1] - data.y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = fmt_axis_value(y_val);
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label_len);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new("period")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }
}
