//! Ratatui-based terminal UI.
//!
//! Left: the property form (two searchable selectors, area, age slider plus a
//! numeric age field, bedrooms stepper, action buttons). Right: the result
//! panel. Network calls run on worker threads and report back over a channel,
//! so the event loop never blocks on the backend.

use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use chrono::Utc;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};
use tracing::{info, warn};

use crate::app::pipeline::Services;
use crate::domain::{PredictionInput, RawEstimate, Report};
use crate::error::AppError;
use crate::form::{
    AGE_MAX, FormController, FormField, FormPhase, SearchableSelector, SubmitOutcome,
    SubmitRejection,
};
use crate::report::{format_band, format_price, info_rows, percent_bar};
use crate::results::ResultPanel;

mod trend_chart;

use trend_chart::TrendChart;

const POPUP_MAX_ROWS: u16 = 8;

/// Start the TUI.
pub fn run(services: Services) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::terminal(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(services);
    app.load_lists(false);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen, mouse) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::terminal(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture) {
            let _ = disable_raw_mode();
            return Err(AppError::terminal(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Locality,
    PropertyType,
    Area,
    AgeSlider,
    AgeInput,
    Bedrooms,
    Estimate,
    Save,
    Export,
}

const FOCUS_ORDER: [Focus; 9] = [
    Focus::Locality,
    Focus::PropertyType,
    Focus::Area,
    Focus::AgeSlider,
    Focus::AgeInput,
    Focus::Bedrooms,
    Focus::Estimate,
    Focus::Save,
    Focus::Export,
];

impl Focus {
    fn next(self) -> Self {
        let idx = FOCUS_ORDER.iter().position(|f| *f == self).unwrap_or(0);
        FOCUS_ORDER[(idx + 1) % FOCUS_ORDER.len()]
    }

    fn prev(self) -> Self {
        let idx = FOCUS_ORDER.iter().position(|f| *f == self).unwrap_or(0);
        FOCUS_ORDER[(idx + FOCUS_ORDER.len() - 1) % FOCUS_ORDER.len()]
    }

    fn for_field(field: FormField) -> Self {
        match field {
            FormField::Locality => Focus::Locality,
            FormField::PropertyType => Focus::PropertyType,
            FormField::Area => Focus::Area,
            FormField::Age => Focus::AgeInput,
            FormField::Bedrooms => Focus::Bedrooms,
        }
    }
}

enum WorkerMsg {
    Lists(Result<(Vec<String>, Vec<String>), AppError>),
    Estimate(Result<RawEstimate, AppError>),
}

#[derive(Debug, Clone, Copy)]
struct PopupHit {
    owner: Focus,
    area: Rect,
    offset: usize,
}

/// Screen regions from the last draw, for mouse hit-testing.
#[derive(Debug, Default)]
struct HitMap {
    fields: Vec<(Rect, Focus)>,
    popup: Option<PopupHit>,
}

struct App {
    services: Services,
    form: FormController,
    panel: ResultPanel,
    focus: Focus,
    status: String,
    pending: Option<PredictionInput>,
    tx: Sender<WorkerMsg>,
    rx: Receiver<WorkerMsg>,
    hits: HitMap,
}

impl App {
    fn new(services: Services) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            services,
            form: FormController::new(),
            panel: ResultPanel::new(),
            focus: Focus::Locality,
            status: String::new(),
            pending: None,
            tx,
            rx,
            hits: HitMap::default(),
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            while let Ok(msg) = self.rx.try_recv() {
                self.apply_worker_msg(msg);
                needs_redraw = true;
            }

            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::terminal(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::terminal(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::terminal(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Mouse(mouse) => {
                    if mouse.kind == MouseEventKind::Down(MouseButton::Left) {
                        self.handle_click(mouse.column, mouse.row);
                        needs_redraw = true;
                    }
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn load_lists(&mut self, force_refresh: bool) {
        self.form.begin_lists_load();
        self.status = "Loading localities and property types...".to_string();

        let cache = self.services.cache.clone();
        let tx = self.tx.clone();
        let spawned = thread::Builder::new()
            .name("list-load".to_string())
            .spawn(move || {
                let result = cache
                    .fetch_lists(force_refresh)
                    .map(|lists| (lists.locations, lists.property_types));
                let _ = tx.send(WorkerMsg::Lists(result));
            });
        if let Err(e) = spawned {
            self.apply_lists(Err(AppError::network(format!("Failed to start list load: {e}"))));
        }
    }

    fn submit(&mut self) {
        self.close_selectors();
        match self.form.begin_submit() {
            Ok(input) => {
                self.status = "Estimating...".to_string();
                let predictor = self.services.predictor();
                let tx = self.tx.clone();
                let request = input.clone();
                self.pending = Some(input);

                let spawned = thread::Builder::new()
                    .name("predict".to_string())
                    .spawn(move || {
                        let _ = tx.send(WorkerMsg::Estimate(predictor.predict(&request)));
                    });
                if let Err(e) = spawned {
                    self.apply_estimate(Err(AppError::network(format!("Failed to start request: {e}"))));
                }
            }
            Err(SubmitRejection::Invalid(err)) => {
                self.focus = Focus::for_field(err.field);
                self.status = err.message;
            }
            Err(SubmitRejection::InFlight) => {
                self.status = "An estimate is already in progress".to_string();
            }
        }
    }

    fn apply_worker_msg(&mut self, msg: WorkerMsg) {
        match msg {
            WorkerMsg::Lists(result) => self.apply_lists(result),
            WorkerMsg::Estimate(result) => self.apply_estimate(result),
        }
    }

    fn apply_lists(&mut self, result: Result<(Vec<String>, Vec<String>), AppError>) {
        self.status = match &result {
            Ok((locations, property_types)) => format!(
                "Loaded {} localities, {} property types",
                locations.len(),
                property_types.len()
            ),
            Err(err) => format!("Could not load lists: {err}"),
        };
        self.form.finish_lists_load(result);
    }

    fn apply_estimate(&mut self, result: Result<RawEstimate, AppError>) {
        let Some(input) = self.pending.take() else {
            warn!("estimate arrived with no pending request");
            return;
        };
        match self.form.finish_submit(&input, result) {
            SubmitOutcome::Estimated(report) => {
                info!(locality = %report.locality, estimated = report.estimated, "estimate shown");
                self.status = format!("Estimated price: {}", format_price(report.estimated));
                self.panel.show(report);
            }
            SubmitOutcome::Failed(message) => {
                self.status = format!("Prediction failed: {message}");
            }
            SubmitOutcome::Rejected(_) => {}
        }
    }

    fn save(&mut self) {
        self.status = match self.panel.save(&self.services.history, Utc::now()) {
            Ok(message) => message,
            Err(err) => format!("Save failed: {err}"),
        };
    }

    fn export(&mut self) {
        self.status = match self.panel.export(&self.services.config.export_dir, Utc::now()) {
            Ok(message) => message,
            Err(err) => format!("Download failed: {err}"),
        };
    }

    /// Returns true to quit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') | KeyCode::Char('q') => return true,
                KeyCode::Char('s') => self.save(),
                KeyCode::Char('e') => self.export(),
                KeyCode::Char('r') => self.load_lists(true),
                _ => {}
            }
            return false;
        }

        match key.code {
            KeyCode::Tab => {
                self.set_focus(self.focus.next());
                return false;
            }
            KeyCode::BackTab => {
                self.set_focus(self.focus.prev());
                return false;
            }
            _ => {}
        }

        match self.focus {
            Focus::Locality | Focus::PropertyType => self.handle_selector_key(key.code),
            Focus::Area => match key.code {
                KeyCode::Char(c) => self.form.area_push(c),
                KeyCode::Backspace => self.form.area_backspace(),
                KeyCode::Enter => self.submit(),
                _ => {}
            },
            Focus::AgeSlider => match key.code {
                KeyCode::Left | KeyCode::Char('-') => self.form.step_age(-1),
                KeyCode::Right | KeyCode::Char('+') => self.form.step_age(1),
                KeyCode::PageDown => self.form.step_age(-5),
                KeyCode::PageUp => self.form.step_age(5),
                KeyCode::Home => self.form.set_age(0),
                KeyCode::End => self.form.set_age(AGE_MAX as i64),
                KeyCode::Enter => self.submit(),
                _ => {}
            },
            Focus::AgeInput => match key.code {
                KeyCode::Char(c) => self.form.age_push(c),
                KeyCode::Backspace => self.form.age_backspace(),
                KeyCode::Up => self.form.step_age(1),
                KeyCode::Down => self.form.step_age(-1),
                KeyCode::Enter => {
                    self.form.commit_age_input();
                    self.submit();
                }
                _ => {}
            },
            Focus::Bedrooms => match key.code {
                KeyCode::Left | KeyCode::Down | KeyCode::Char('-') => self.form.decrement_bedrooms(),
                KeyCode::Right | KeyCode::Up | KeyCode::Char('+') => self.form.increment_bedrooms(),
                KeyCode::Enter => self.submit(),
                _ => {}
            },
            Focus::Estimate => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
                    self.submit();
                }
            }
            Focus::Save => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
                    self.save();
                }
            }
            Focus::Export => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
                    self.export();
                }
            }
        }
        false
    }

    fn handle_selector_key(&mut self, code: KeyCode) {
        let Some(selector) = self.selector_mut(self.focus) else {
            return;
        };
        match code {
            KeyCode::Char(c) => selector.type_char(c),
            KeyCode::Backspace => selector.backspace(),
            KeyCode::Down => selector.move_down(),
            KeyCode::Up => selector.move_up(),
            KeyCode::Esc => selector.cancel(),
            KeyCode::Enter => {
                if selector.is_open() {
                    selector.commit();
                } else {
                    self.submit();
                }
            }
            _ => {}
        }
    }

    fn handle_click(&mut self, column: u16, row: u16) {
        let pos = Position::new(column, row);

        if let Some(popup) = self.hits.popup {
            if popup.area.contains(pos) {
                let first_row = popup.area.y + 1;
                let last_row = popup.area.y + popup.area.height.saturating_sub(1);
                if row >= first_row && row < last_row {
                    let index = popup.offset + (row - first_row) as usize;
                    if let Some(selector) = self.selector_mut(popup.owner) {
                        selector.click(index);
                    }
                }
                return;
            }
        }

        let target = self
            .hits
            .fields
            .iter()
            .find(|(rect, _)| rect.contains(pos))
            .map(|(_, focus)| *focus);

        let Some(focus) = target else {
            self.close_selectors();
            return;
        };

        self.set_focus(focus);
        match focus {
            Focus::Locality | Focus::PropertyType => {
                if let Some(selector) = self.selector_mut(focus) {
                    if !selector.is_open() {
                        selector.open();
                    }
                }
            }
            Focus::Estimate => self.submit(),
            Focus::Save => self.save(),
            Focus::Export => self.export(),
            _ => {}
        }
    }

    fn set_focus(&mut self, focus: Focus) {
        if focus == self.focus {
            return;
        }
        if let Some(selector) = self.selector_mut(self.focus) {
            selector.blur();
        }
        if self.focus == Focus::AgeInput {
            self.form.commit_age_input();
        }
        self.focus = focus;
    }

    fn close_selectors(&mut self) {
        self.form.locality.blur();
        self.form.property_type.blur();
    }

    fn selector(&self, focus: Focus) -> Option<&SearchableSelector> {
        match focus {
            Focus::Locality => Some(&self.form.locality),
            Focus::PropertyType => Some(&self.form.property_type),
            _ => None,
        }
    }

    fn selector_mut(&mut self, focus: Focus) -> Option<&mut SearchableSelector> {
        match focus {
            Focus::Locality => Some(&mut self.form.locality),
            Focus::PropertyType => Some(&mut self.form.property_type),
            _ => None,
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        self.hits = HitMap::default();

        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(42), Constraint::Percentage(58)])
            .split(chunks[1]);

        self.draw_form(frame, body[0]);
        self.draw_result(frame, body[1]);
        self.draw_footer(frame, chunks[2]);
        self.draw_popup(frame, size);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let phase = match self.form.phase() {
            FormPhase::Idle => "idle",
            FormPhase::ListsLoading => "loading lists",
            FormPhase::Ready => "ready",
            FormPhase::Submitting => "estimating",
            FormPhase::Error => "error",
        };
        let line = Line::from(vec![
            Span::styled("homeprice", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw(" - home price estimator"),
            Span::styled(
                format!("  | api: {} | {phase}", self.services.client.base_url()),
                Style::default().fg(Color::Gray),
            ),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_form(&mut self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Property").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(2),
                Constraint::Min(0),
            ])
            .split(inner);

        let loading = self.form.phase() == FormPhase::ListsLoading;
        let locality = selector_text(&self.form.locality, "Select locality", loading);
        let property_type = selector_text(&self.form.property_type, "Select property type", loading);
        self.draw_field(frame, rows[0], Focus::Locality, "Locality", locality);
        self.draw_field(frame, rows[1], Focus::PropertyType, "Property Type", property_type);

        let area_text = Line::from(format!("{}{}", self.form.area_input(), self.cursor(Focus::Area)));
        self.draw_field(frame, rows[2], Focus::Area, "Area (sq ft)", area_text);

        let age_cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(10)])
            .split(rows[3]);
        let bar_width = age_cols[0].width.saturating_sub(4) as usize;
        let slider = Line::from(Span::styled(
            slider_bar(self.form.age(), AGE_MAX, bar_width),
            Style::default().fg(Color::Cyan),
        ));
        self.draw_field(frame, age_cols[0], Focus::AgeSlider, "Age of Property (yrs)", slider);
        let age_text = Line::from(format!("{}{}", self.form.age_input(), self.cursor(Focus::AgeInput)));
        self.draw_field(frame, age_cols[1], Focus::AgeInput, "Years", age_text);

        let bedrooms = Line::from(vec![
            Span::styled(" - ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!(" {} ", self.form.bedrooms()),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(" + ", Style::default().fg(Color::Gray)),
        ]);
        self.draw_field(frame, rows[4], Focus::Bedrooms, "Bedrooms", bedrooms);

        let buttons = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(40),
                Constraint::Percentage(30),
                Constraint::Percentage(30),
            ])
            .split(rows[5]);
        let estimate_label = if self.form.phase() == FormPhase::Submitting {
            "Estimating..."
        } else {
            "Estimate Price"
        };
        self.draw_button(frame, buttons[0], Focus::Estimate, estimate_label);
        self.draw_button(frame, buttons[1], Focus::Save, "Save");
        self.draw_button(frame, buttons[2], Focus::Export, "Download");

        if let Some(err) = self.form.field_error() {
            let p = Paragraph::new(err.message.as_str()).style(Style::default().fg(Color::Red));
            frame.render_widget(p, rows[6]);
        } else if let Some(err) = self.form.error() {
            let p = Paragraph::new(format!("Prediction failed: {err}"))
                .style(Style::default().fg(Color::Red));
            frame.render_widget(p, rows[6]);
        }
    }

    fn draw_field(&mut self, frame: &mut ratatui::Frame<'_>, area: Rect, focus: Focus, title: &str, content: Line<'_>) {
        let p = Paragraph::new(content).block(
            Block::default()
                .title(title.to_string())
                .borders(Borders::ALL)
                .border_style(self.border_style(focus)),
        );
        frame.render_widget(p, area);
        self.hits.fields.push((area, focus));
    }

    fn draw_button(&mut self, frame: &mut ratatui::Frame<'_>, area: Rect, focus: Focus, label: &str) {
        let style = if self.focus == focus {
            Style::default().fg(Color::Black).bg(Color::Yellow)
        } else {
            Style::default()
        };
        let p = Paragraph::new(Span::styled(label.to_string(), style))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).border_style(self.border_style(focus)));
        frame.render_widget(p, area);
        self.hits.fields.push((area, focus));
    }

    fn draw_popup(&mut self, frame: &mut ratatui::Frame<'_>, screen: Rect) {
        let owner = self.focus;
        let Some(anchor) = self
            .hits
            .fields
            .iter()
            .find(|(_, f)| *f == owner)
            .map(|(rect, _)| *rect)
        else {
            return;
        };
        let Some(selector) = self.selector(owner) else {
            return;
        };
        if !selector.is_open() {
            return;
        }

        let matches: Vec<String> = selector.filtered().into_iter().map(str::to_string).collect();
        let highlight = selector.highlight();
        let top = anchor.y + anchor.height;
        let wanted = (matches.len().max(1) as u16).min(POPUP_MAX_ROWS) + 2;
        let height = wanted.min(screen.height.saturating_sub(top));
        if height < 3 {
            return;
        }
        let area = Rect {
            x: anchor.x,
            y: top,
            width: anchor.width,
            height,
        };
        let visible = (height - 2) as usize;
        let offset = popup_offset(highlight, visible);

        let items: Vec<ListItem> = if matches.is_empty() {
            vec![ListItem::new(Span::styled("No matches", Style::default().fg(Color::DarkGray)))]
        } else {
            matches
                .iter()
                .enumerate()
                .skip(offset)
                .take(visible)
                .map(|(i, option)| {
                    let style = if i == highlight {
                        Style::default().fg(Color::Black).bg(Color::White)
                    } else {
                        Style::default()
                    };
                    ListItem::new(Span::styled(option.clone(), style))
                })
                .collect()
        };

        frame.render_widget(Clear, area);
        frame.render_widget(
            List::new(items).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow)),
            ),
            area,
        );
        self.hits.popup = Some(PopupHit { owner, area, offset });
    }

    fn draw_result(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Estimated Price").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some(report) = self.panel.report() else {
            let text = Text::from(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "No Prediction Yet",
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "Fill in the property details and press Enter to estimate.",
                    Style::default().fg(Color::Gray),
                )),
            ]);
            frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), inner);
            return;
        };

        let contribution_rows = report.contributions.len() as u16 + 1;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(6),
                Constraint::Length(contribution_rows),
                Constraint::Min(0),
            ])
            .split(inner);

        frame.render_widget(Paragraph::new(price_lines(report)), chunks[0]);

        let info: Vec<Line> = info_rows(report)
            .into_iter()
            .map(|(label, value)| {
                Line::from(vec![
                    Span::styled(format!("{label:<16} "), Style::default().fg(Color::Gray)),
                    Span::raw(value),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(info), chunks[1]);

        let bar_width = (chunks[2].width as usize).saturating_sub(18).min(30);
        let mut contributions = vec![Line::from(Span::styled(
            "Feature contributions",
            Style::default().add_modifier(Modifier::BOLD),
        ))];
        contributions.extend(report.contributions.iter().map(|c| {
            Line::from(vec![
                Span::raw(format!("{:<10} ", c.name)),
                Span::styled(percent_bar(c.percentage, bar_width), Style::default().fg(Color::Green)),
                Span::raw(format!(" {:>3}%", c.percentage)),
            ])
        }));
        frame.render_widget(Paragraph::new(contributions), chunks[2]);

        let trend_block = Block::default().title("Trend").borders(Borders::TOP);
        let trend_inner = trend_block.inner(chunks[3]);
        frame.render_widget(trend_block, chunks[3]);
        frame.render_widget(TrendChart { series: &report.timeseries }, trend_inner);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "Tab move  Enter estimate  ^S save  ^E download  ^R reload lists  ^Q quit";
        let status_style = if self.form.phase() == FormPhase::Error {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::Yellow)
        };
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(self.status.as_str(), status_style),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn border_style(&self, focus: Focus) -> Style {
        if self.focus == focus {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        }
    }

    fn cursor(&self, focus: Focus) -> &'static str {
        if self.focus == focus { "▏" } else { "" }
    }
}

fn price_lines(report: &Report) -> Text<'static> {
    Text::from(vec![
        Line::from(Span::styled(
            format!("₹ {}", format_price(report.estimated)),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("Confidence: {}", format_band(report)),
            Style::default().fg(Color::Gray),
        )),
    ])
}

/// What a closed or open selector shows in its field.
fn selector_text(selector: &SearchableSelector, placeholder: &str, loading: bool) -> Line<'static> {
    if selector.is_open() {
        return Line::from(vec![
            Span::raw(selector.query().to_string()),
            Span::styled("▏", Style::default().fg(Color::Yellow)),
        ]);
    }
    match selector.value() {
        Some(value) => Line::from(value.to_string()),
        None if loading => Line::from(Span::styled("Loading...", Style::default().fg(Color::DarkGray))),
        None => Line::from(Span::styled(placeholder.to_string(), Style::default().fg(Color::DarkGray))),
    }
}

/// Text slider: track `─`, filled `━`, knob `●`.
fn slider_bar(value: u32, max: u32, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let knob = ((value.min(max) as f64 / max.max(1) as f64) * (width - 1) as f64).round() as usize;
    (0..width)
        .map(|i| match i.cmp(&knob) {
            std::cmp::Ordering::Less => '━',
            std::cmp::Ordering::Equal => '●',
            std::cmp::Ordering::Greater => '─',
        })
        .collect()
}

/// First visible popup row so the highlight stays on screen.
fn popup_offset(highlight: usize, visible: usize) -> usize {
    if visible == 0 || highlight < visible {
        0
    } else {
        highlight + 1 - visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_cycles_both_ways() {
        let mut focus = Focus::Locality;
        for _ in 0..FOCUS_ORDER.len() {
            focus = focus.next();
        }
        assert_eq!(focus, Focus::Locality);
        assert_eq!(Focus::Locality.prev(), Focus::Export);
        assert_eq!(Focus::for_field(FormField::Age), Focus::AgeInput);
    }

    #[test]
    fn slider_knob_tracks_value() {
        assert_eq!(slider_bar(0, 50, 5), "●────");
        assert_eq!(slider_bar(50, 50, 5), "━━━━●");
        assert_eq!(slider_bar(25, 50, 5), "━━●──");
        assert_eq!(slider_bar(10, 50, 0), "");
    }

    #[test]
    fn popup_scrolls_to_keep_highlight_visible() {
        assert_eq!(popup_offset(0, 8), 0);
        assert_eq!(popup_offset(7, 8), 0);
        assert_eq!(popup_offset(8, 8), 1);
        assert_eq!(popup_offset(20, 8), 13);
    }
}
