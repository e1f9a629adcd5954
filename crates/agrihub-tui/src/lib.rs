// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use agrihub_app::{
    AppCommand, AppMode, AppState, AssessmentFailure, AssessmentReply, BarDataset, ChatFailure,
    ChatReply, ChatRequest, ChatTranscript, ComparisonCharts, ComparisonTable, Crop, CropColumn,
    Generation, NO_SELECTION_MESSAGE, PredictionPayload, QualityBand, SORT_HIGHLIGHT_DURATION,
    SUGGESTIONS, SampleProfile, SoilField, SoilForm, SoilReading, SoilResultView, SortDirection,
    SubmitState, TabKind, comparison_charts, crop_details, resolve_prediction,
};
use anyhow::{Context, Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Gauge, Paragraph, Row, Table, Tabs, Wrap};
use ratatui::{Frame, Terminal};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use time::OffsetDateTime;

const STATUS_CLEAR_DELAY: Duration = Duration::from_secs(4);
const POLL_INTERVAL: Duration = Duration::from_millis(120);
const BAR_WIDTH: usize = 24;
const TYPING_INDICATOR: &str = "...";

/// Data source behind the views. Blocking calls run wherever `spawn_*`
/// puts them; the defaults run inline and report through the channel.
pub trait AppRuntime {
    fn load_crops(&mut self) -> Result<Vec<Crop>>;
    fn ask(&mut self, message: &str) -> ChatReply;
    fn assess_soil(&mut self, reading: &SoilReading) -> AssessmentReply;

    /// Crops to chart, in the order they were checked.
    fn compare_crops(&mut self, checked: &[&Crop]) -> Result<Vec<Crop>> {
        Ok(checked.iter().map(|crop| (*crop).clone()).collect())
    }

    fn prediction(&mut self) -> Option<PredictionPayload> {
        None
    }

    /// Serialized prediction payload; ignored when `prediction` is set.
    fn prediction_attribute(&mut self) -> Option<String> {
        None
    }

    fn spawn_chat(&mut self, request: ChatRequest, tx: Sender<InternalEvent>) -> Result<()> {
        let reply = self.ask(&request.message);
        tx.send(InternalEvent::ChatReply {
            generation: request.generation,
            reply,
        })
        .map_err(|_| anyhow!("chat event channel closed"))
    }

    fn spawn_assessment(
        &mut self,
        generation: Generation,
        reading: SoilReading,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let reply = self.assess_soil(&reading);
        tx.send(InternalEvent::SoilAssessed { generation, reply })
            .map_err(|_| anyhow!("soil event channel closed"))
    }

    fn spawn_load_crops(&mut self, token: u64, tx: Sender<InternalEvent>) -> Result<()> {
        let crops = self.load_crops().map_err(|error| format!("{error:#}"));
        tx.send(InternalEvent::CropsLoaded { token, crops })
            .map_err(|_| anyhow!("catalogue event channel closed"))
    }

    fn spawn_compare(
        &mut self,
        token: u64,
        checked: Vec<Crop>,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let refs: Vec<&Crop> = checked.iter().collect();
        let crops = self
            .compare_crops(&refs)
            .map_err(|error| format!("{error:#}"));
        tx.send(InternalEvent::CropsCompared { token, crops })
            .map_err(|_| anyhow!("comparison event channel closed"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InternalEvent {
    ClearStatus {
        token: u64,
    },
    ClearSortHighlight {
        token: u64,
    },
    ChatReply {
        generation: Generation,
        reply: ChatReply,
    },
    SoilAssessed {
        generation: Generation,
        reply: AssessmentReply,
    },
    /// Errors arrive already rendered with their context chain.
    CropsLoaded {
        token: u64,
        crops: std::result::Result<Vec<Crop>, String>,
    },
    CropsCompared {
        token: u64,
        crops: std::result::Result<Vec<Crop>, String>,
    },
}

#[derive(Debug, Default)]
struct ComparisonView {
    table: ComparisonTable,
    sort_column: usize,
    show_detail: bool,
    charts: Option<ComparisonCharts>,
    yield_chart: Option<BarDataset>,
    load_token: u64,
    loading: bool,
    compare_token: u64,
}

#[derive(Debug, Default)]
struct ChatView {
    transcript: ChatTranscript,
    input: String,
    suggestion: usize,
}

#[derive(Debug, Default)]
struct SoilView {
    form: SoilForm,
    submit: SubmitState,
    generation: Generation,
    pending: Option<Generation>,
    result: Option<SoilResultView>,
    error: Option<String>,
}

#[derive(Debug, Default)]
struct ViewData {
    comparison: ComparisonView,
    chat: ChatView,
    soil: SoilView,
    status_token: u64,
}

pub fn run_app<R: AppRuntime>(state: &mut AppState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();
    load_view_data(state, runtime, &mut view_data, &internal_tx);

    let result = (|| -> Result<()> {
        loop {
            process_internal_events(state, &mut view_data, &internal_tx, &internal_rx);
            terminal
                .draw(|frame| render(frame, state, &view_data))
                .context("draw frame")?;

            if event::poll(POLL_INTERVAL).context("poll terminal events")?
                && let Event::Key(key) = event::read().context("read terminal event")?
                && handle_key_event(state, runtime, &mut view_data, &internal_tx, key)
            {
                break;
            }
        }
        Ok(())
    })();

    disable_raw_mode().context("disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen).context("leave alternate screen")?;
    terminal.show_cursor().context("show cursor")?;

    result
}

fn load_view_data<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    reload_crops(state, runtime, view_data, internal_tx);
    let payload = runtime.prediction();
    let attribute = runtime.prediction_attribute();
    view_data.comparison.yield_chart = resolve_prediction(payload.as_ref(), attribute.as_deref());
}

fn reload_crops<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    view_data.comparison.load_token = view_data.comparison.load_token.wrapping_add(1);
    view_data.comparison.loading = true;
    let token = view_data.comparison.load_token;
    if let Err(error) = runtime.spawn_load_crops(token, internal_tx.clone()) {
        view_data.comparison.loading = false;
        tracing::warn!(error = %format!("{error:#}"), "crop catalogue load not started");
        emit_status(state, view_data, internal_tx, format!("load failed: {error:#}"));
    }
}

fn apply_loaded_crops(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    token: u64,
    crops: std::result::Result<Vec<Crop>, String>,
) {
    if token != view_data.comparison.load_token {
        tracing::debug!(token, "dropping superseded crop catalogue");
        return;
    }
    view_data.comparison.loading = false;
    match crops {
        Ok(crops) => {
            let count = crops.len();
            view_data.comparison.table.replace_crops(crops);
            tracing::debug!(count, "loaded crop catalogue");
            emit_status(state, view_data, internal_tx, format!("{count} crops loaded"));
        }
        Err(error) => {
            tracing::warn!(%error, "crop catalogue load failed");
            emit_status(state, view_data, internal_tx, format!("load failed: {error}"));
        }
    }
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    internal_rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = internal_rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } => {
                if token == view_data.status_token {
                    state.dispatch(AppCommand::ClearStatus);
                }
            }
            InternalEvent::ClearSortHighlight { token } => {
                view_data.comparison.table.clear_highlight(token);
            }
            InternalEvent::ChatReply { generation, reply } => {
                view_data
                    .chat
                    .transcript
                    .resolve(generation, reply, OffsetDateTime::now_utc());
            }
            InternalEvent::SoilAssessed { generation, reply } => {
                apply_assessment(state, view_data, internal_tx, generation, reply);
            }
            InternalEvent::CropsLoaded { token, crops } => {
                apply_loaded_crops(state, view_data, internal_tx, token, crops);
            }
            InternalEvent::CropsCompared { token, crops } => {
                apply_comparison(state, view_data, internal_tx, token, crops);
            }
        }
    }
}

fn schedule_event(internal_tx: &Sender<InternalEvent>, delay: Duration, event: InternalEvent) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(delay);
        let _ = sender.send(event);
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    view_data.status_token = view_data.status_token.wrapping_add(1);
    let token = view_data.status_token;
    state.dispatch(AppCommand::SetStatus(message.into()));
    schedule_event(
        internal_tx,
        STATUS_CLEAR_DELAY,
        InternalEvent::ClearStatus { token },
    );
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if state.show_help {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
            state.dispatch(AppCommand::ToggleHelp);
        }
        return false;
    }

    if state.mode == AppMode::Input {
        match state.active_tab {
            TabKind::Chat => handle_chat_input_key(state, runtime, view_data, internal_tx, key),
            TabKind::Soil => handle_soil_input_key(state, runtime, view_data, internal_tx, key),
            TabKind::Comparison => {
                state.dispatch(AppCommand::ExitToNav);
            }
        }
        return false;
    }

    match key.code {
        KeyCode::Tab => {
            state.dispatch(AppCommand::NextTab);
            return false;
        }
        KeyCode::BackTab => {
            state.dispatch(AppCommand::PrevTab);
            return false;
        }
        KeyCode::Char('?') => {
            state.dispatch(AppCommand::ToggleHelp);
            return false;
        }
        KeyCode::Char(digit @ '1'..='3') => {
            let index = digit as usize - '1' as usize;
            state.dispatch(AppCommand::SelectTab(TabKind::ALL[index]));
            return false;
        }
        _ => {}
    }

    match state.active_tab {
        TabKind::Comparison => handle_comparison_key(state, runtime, view_data, internal_tx, key),
        TabKind::Chat => handle_chat_nav_key(state, runtime, view_data, internal_tx, key),
        TabKind::Soil => handle_soil_nav_key(state, runtime, view_data, internal_tx, key),
    }
    false
}

fn handle_comparison_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let last_column = CropColumn::ALL.len() - 1;
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => view_data.comparison.table.move_selection(1),
        KeyCode::Char('k') | KeyCode::Up => view_data.comparison.table.move_selection(-1),
        KeyCode::Char('g') => view_data.comparison.table.move_selection(isize::MIN / 2),
        KeyCode::Char('G') => view_data.comparison.table.move_selection(isize::MAX / 2),
        KeyCode::Char('h') | KeyCode::Left => {
            view_data.comparison.sort_column = view_data.comparison.sort_column.saturating_sub(1);
        }
        KeyCode::Char('l') | KeyCode::Right => {
            view_data.comparison.sort_column = (view_data.comparison.sort_column + 1).min(last_column);
        }
        KeyCode::Char('s') => activate_sort(state, view_data, internal_tx),
        KeyCode::Enter => {
            view_data.comparison.show_detail = !view_data.comparison.show_detail;
        }
        KeyCode::Char(' ') => {
            let Some(crop) = view_data.comparison.table.selected_crop() else {
                return;
            };
            let (id, name) = (crop.id, crop.name.clone());
            let message = if view_data.comparison.table.toggle_checked(id) {
                format!("checked {name}")
            } else {
                format!("unchecked {name}")
            };
            emit_status(state, view_data, internal_tx, message);
        }
        KeyCode::Char('a') => {
            view_data.comparison.table.check_all();
            emit_status(state, view_data, internal_tx, "all crops checked");
        }
        KeyCode::Char('x') => {
            view_data.comparison.table.clear_checked();
            view_data.comparison.charts = None;
            view_data.comparison.compare_token = view_data.comparison.compare_token.wrapping_add(1);
            emit_status(state, view_data, internal_tx, "selection cleared");
        }
        KeyCode::Char('c') => compare_checked(state, runtime, view_data, internal_tx),
        KeyCode::Char('v') => {
            let filter = view_data.comparison.table.filter().next();
            view_data.comparison.table.set_filter(filter);
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("season: {}", filter.label()),
            );
        }
        KeyCode::Char('r') => reload_crops(state, runtime, view_data, internal_tx),
        _ => {}
    }
}

fn activate_sort(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let Some(column) = CropColumn::from_index(view_data.comparison.sort_column) else {
        return;
    };
    let outcome = view_data.comparison.table.activate_sort(column);
    if !outcome.moved.is_empty() {
        schedule_event(
            internal_tx,
            SORT_HIGHLIGHT_DURATION,
            InternalEvent::ClearSortHighlight {
                token: outcome.highlight_token,
            },
        );
    }
    emit_status(state, view_data, internal_tx, outcome.status());
}

fn compare_checked<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let checked: Vec<Crop> = view_data
        .comparison
        .table
        .checked_crops()
        .into_iter()
        .cloned()
        .collect();
    view_data.comparison.compare_token = view_data.comparison.compare_token.wrapping_add(1);
    if checked.is_empty() {
        view_data.comparison.charts = None;
        emit_status(state, view_data, internal_tx, NO_SELECTION_MESSAGE);
        return;
    }
    let token = view_data.comparison.compare_token;
    if let Err(error) = runtime.spawn_compare(token, checked, internal_tx.clone()) {
        tracing::warn!(error = %format!("{error:#}"), "crop comparison not started");
        emit_status(state, view_data, internal_tx, format!("{error:#}"));
    }
}

fn apply_comparison(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    token: u64,
    crops: std::result::Result<Vec<Crop>, String>,
) {
    if token != view_data.comparison.compare_token {
        tracing::debug!(token, "dropping superseded comparison");
        return;
    }
    let charts = crops.and_then(|crops| {
        comparison_charts(&crops.iter().collect::<Vec<_>>()).map_err(|error| format!("{error:#}"))
    });
    match charts {
        Ok(charts) => {
            let count = charts.profit.bars.len();
            view_data.comparison.charts = Some(charts);
            emit_status(state, view_data, internal_tx, format!("comparing {count} crops"));
        }
        Err(error) => {
            tracing::warn!(%error, "crop comparison failed");
            view_data.comparison.charts = None;
            emit_status(state, view_data, internal_tx, error);
        }
    }
}

fn handle_chat_nav_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Char('i') => {
            state.dispatch(AppCommand::EnterInput);
        }
        KeyCode::Char('j') | KeyCode::Down => {
            view_data.chat.suggestion = (view_data.chat.suggestion + 1) % SUGGESTIONS.len();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            view_data.chat.suggestion =
                (view_data.chat.suggestion + SUGGESTIONS.len() - 1) % SUGGESTIONS.len();
        }
        KeyCode::Enter => {
            view_data.chat.input = SUGGESTIONS[view_data.chat.suggestion].to_owned();
            submit_chat(state, runtime, view_data, internal_tx);
        }
        _ => {}
    }
}

fn handle_chat_input_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Esc => {
            state.dispatch(AppCommand::ExitToNav);
        }
        KeyCode::Enter => submit_chat(state, runtime, view_data, internal_tx),
        KeyCode::Backspace => {
            view_data.chat.input.pop();
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            view_data.chat.input.push(ch);
        }
        _ => {}
    }
}

fn submit_chat<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let now = OffsetDateTime::now_utc();
    let Some(request) = view_data.chat.transcript.begin(&view_data.chat.input, now) else {
        return;
    };
    view_data.chat.input.clear();

    let generation = request.generation;
    if let Err(error) = runtime.spawn_chat(request, internal_tx.clone()) {
        tracing::warn!(error = %format!("{error:#}"), "chat dispatch failed");
        view_data
            .chat
            .transcript
            .resolve(generation, Err(ChatFailure::Transport), now);
        emit_status(state, view_data, internal_tx, format!("{error:#}"));
    }
}

fn handle_soil_nav_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let profile = match key.code {
        KeyCode::Char('h') => Some(SampleProfile::High),
        KeyCode::Char('m') => Some(SampleProfile::Medium),
        KeyCode::Char('l') => Some(SampleProfile::Low),
        _ => None,
    };
    if let Some(profile) = profile {
        view_data.soil.form.fill(profile);
        view_data.soil.error = None;
        emit_status(
            state,
            view_data,
            internal_tx,
            format!("loaded {} profile", profile.label()),
        );
        return;
    }

    match key.code {
        KeyCode::Char('i') => {
            state.dispatch(AppCommand::EnterInput);
        }
        KeyCode::Char('j') | KeyCode::Down => view_data.soil.form.focus_next(),
        KeyCode::Char('k') | KeyCode::Up => view_data.soil.form.focus_prev(),
        KeyCode::Enter | KeyCode::Char('s') => {
            submit_soil(state, runtime, view_data, internal_tx);
        }
        _ => {}
    }
}

fn handle_soil_input_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Esc => {
            state.dispatch(AppCommand::ExitToNav);
        }
        KeyCode::Tab | KeyCode::Down => view_data.soil.form.focus_next(),
        KeyCode::BackTab | KeyCode::Up => view_data.soil.form.focus_prev(),
        KeyCode::Backspace => view_data.soil.form.pop_char(),
        KeyCode::Enter => submit_soil(state, runtime, view_data, internal_tx),
        KeyCode::Char(ch) => view_data.soil.form.push_char(ch),
        _ => {}
    }
}

fn submit_soil<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let reading = match view_data.soil.form.reading() {
        Ok(reading) => reading,
        Err(error) => {
            let message = format!("{error:#}");
            view_data.soil.error = Some(message.clone());
            emit_status(state, view_data, internal_tx, message);
            return;
        }
    };

    view_data.soil.generation = view_data.soil.generation.next();
    let generation = view_data.soil.generation;
    view_data.soil.pending = Some(generation);
    view_data.soil.submit = SubmitState::Processing;
    view_data.soil.error = None;

    if let Err(error) = runtime.spawn_assessment(generation, reading, internal_tx.clone()) {
        tracing::warn!(error = %format!("{error:#}"), "soil dispatch failed");
        apply_assessment(
            state,
            view_data,
            internal_tx,
            generation,
            Err(AssessmentFailure::Unavailable),
        );
    }
}

fn apply_assessment(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    generation: Generation,
    reply: AssessmentReply,
) {
    if view_data.soil.pending != Some(generation) {
        tracing::debug!(generation = generation.get(), "dropping stale soil assessment");
        return;
    }
    view_data.soil.pending = None;
    view_data.soil.submit = SubmitState::Idle;

    match reply {
        Ok(assessment) => {
            let view = SoilResultView::from_assessment(&assessment);
            let message = format!("soil fertility {}", view.fertility_text);
            view_data.soil.result = Some(view);
            view_data.soil.error = None;
            emit_status(state, view_data, internal_tx, message);
        }
        Err(failure) => {
            tracing::warn!(?failure, "soil assessment failed");
            view_data.soil.error = Some(failure.user_message());
        }
    }
}

fn render(frame: &mut Frame<'_>, state: &AppState, view_data: &ViewData) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let titles: Vec<String> = TabKind::ALL.iter().map(|tab| tab.label().to_owned()).collect();
    let selected = TabKind::ALL
        .iter()
        .position(|tab| *tab == state.active_tab)
        .unwrap_or(0);
    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title("agrihub"))
        .select(selected)
        .highlight_style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, chunks[0]);

    match state.active_tab {
        TabKind::Comparison => render_comparison(frame, chunks[1], &view_data.comparison),
        TabKind::Chat => render_chat(frame, chunks[1], state, &view_data.chat),
        TabKind::Soil => render_soil(frame, chunks[1], state, &view_data.soil),
    }

    frame.render_widget(Paragraph::new(status_text(state)), chunks[2]);

    if state.show_help {
        let area = centered_rect(60, 70, frame.area());
        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(help_text())
                .block(Block::default().borders(Borders::ALL).title("help"))
                .wrap(Wrap { trim: false }),
            area,
        );
    }
}

fn render_comparison(frame: &mut Frame<'_>, area: Rect, view: &ComparisonView) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(68), Constraint::Percentage(32)])
        .split(area);

    let table = &view.table;
    let mut header_cells = vec![Cell::from("")];
    header_cells.extend(CropColumn::ALL.iter().map(|column| {
        let style = if column.index() == view.sort_column {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        Cell::from(header_label(*column, table)).style(style)
    }));

    let rows: Vec<Row<'_>> = table
        .visible_rows()
        .into_iter()
        .enumerate()
        .map(|(index, crop)| {
            let mark = if table.is_checked(crop.id) { "[x]" } else { "[ ]" };
            let mut cells = vec![Cell::from(mark)];
            cells.extend(CropColumn::ALL.iter().map(|column| Cell::from(column.display(crop))));
            let style = if table.is_highlighted(crop.id) {
                Style::default().bg(Color::Yellow).fg(Color::Black)
            } else if index == table.selected_index() {
                Style::default().bg(Color::DarkGray)
            } else {
                Style::default()
            };
            Row::new(cells).style(style)
        })
        .collect();

    let mut widths = vec![Constraint::Length(3)];
    widths.extend(CropColumn::ALL.iter().map(|_| Constraint::Min(6)));
    let mut title = format!(
        "crops {}/{}  season:{}  checked:{}",
        table.visible_rows().len(),
        table.crops().len(),
        table.filter().label(),
        table.checked_crops().len(),
    );
    if view.loading {
        title.push_str("  loading...");
    }
    let widget = Table::new(rows, widths)
        .header(Row::new(header_cells))
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(widget, chunks[0]);

    frame.render_widget(
        Paragraph::new(side_panel_text(view))
            .block(Block::default().borders(Borders::ALL).title("details"))
            .wrap(Wrap { trim: false }),
        chunks[1],
    );
}

fn header_label(column: CropColumn, table: &ComparisonTable) -> String {
    let active = table
        .sort_state()
        .active()
        .filter(|active| active.column == column.index());
    match active.map(|active| active.direction) {
        Some(SortDirection::Asc) => format!("{} ↑", column.label()),
        Some(SortDirection::Desc) => format!("{} ↓", column.label()),
        None => column.label().to_owned(),
    }
}

fn side_panel_text(view: &ComparisonView) -> String {
    let mut sections = Vec::new();
    if view.show_detail
        && let Some(crop) = view.table.selected_crop()
    {
        sections.push(detail_text(crop));
    }
    if let Some(charts) = &view.charts {
        sections.push(bar_chart_text(&charts.profit, BAR_WIDTH));
        sections.push(bar_chart_text(&charts.roi, BAR_WIDTH));
    }
    if let Some(chart) = &view.yield_chart {
        sections.push(bar_chart_text(chart, BAR_WIDTH));
    }
    if sections.is_empty() {
        return "enter: details  space: check  c: compare".to_owned();
    }
    sections.join("\n\n")
}

fn detail_text(crop: &Crop) -> String {
    let mut lines = vec![crop.name.clone()];
    lines.extend(
        crop_details(crop)
            .into_iter()
            .map(|(label, value)| format!("{label}: {value}")),
    );
    lines.join("\n")
}

/// Horizontal text bars scaled to the largest magnitude. Negative values
/// draw with a lighter block.
fn bar_chart_text(dataset: &BarDataset, width: usize) -> String {
    let max = dataset.max_magnitude();
    let label_width = dataset
        .bars
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);

    let mut lines = vec![dataset.title.clone()];
    for (label, value) in &dataset.bars {
        let length = if max > 0.0 {
            ((value.abs() / max) * width as f64).round() as usize
        } else {
            0
        };
        let glyph = if *value < 0.0 { "░" } else { "█" };
        lines.push(format!(
            "{label:<label_width$} {} {}",
            glyph.repeat(length),
            dataset.format.render(*value)
        ));
    }
    lines.join("\n")
}

fn render_chat(frame: &mut Frame<'_>, area: Rect, state: &AppState, view: &ChatView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(SUGGESTIONS.len() as u16 + 2),
        ])
        .split(area);

    let transcript = transcript_text(&view.transcript);
    let visible = chunks[0].height.saturating_sub(2);
    let line_count = transcript.lines().count().min(u16::MAX as usize) as u16;
    frame.render_widget(
        Paragraph::new(transcript)
            .block(Block::default().borders(Borders::ALL).title("chat"))
            .wrap(Wrap { trim: false })
            .scroll((line_count.saturating_sub(visible), 0)),
        chunks[0],
    );

    let editing = state.mode == AppMode::Input;
    let input = if editing {
        format!("{}▏", view.input)
    } else {
        view.input.clone()
    };
    let input_style = if editing {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    frame.render_widget(
        Paragraph::new(input)
            .style(input_style)
            .block(Block::default().borders(Borders::ALL).title("message")),
        chunks[1],
    );

    let lines: Vec<Line<'_>> = SUGGESTIONS
        .iter()
        .enumerate()
        .map(|(index, suggestion)| {
            if index == view.suggestion {
                Line::from(Span::styled(
                    format!("> {suggestion}"),
                    Style::default().add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(format!("  {suggestion}"))
            }
        })
        .collect();
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("suggestions")),
        chunks[2],
    );
}

fn transcript_text(transcript: &ChatTranscript) -> String {
    let mut lines: Vec<String> = transcript
        .messages()
        .iter()
        .map(|message| format!("{}: {}", message.role.label(), message.body))
        .collect();
    if transcript.typing() {
        lines.push(format!("bot: {TYPING_INDICATOR}"));
    }
    lines.join("\n")
}

fn render_soil(frame: &mut Frame<'_>, area: Rect, state: &AppState, view: &SoilView) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let title = if state.mode == AppMode::Input {
        "soil reading (editing)"
    } else {
        "soil reading"
    };
    frame.render_widget(
        Paragraph::new(soil_form_text(view))
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: false }),
        chunks[0],
    );

    let result_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(chunks[1]);

    if let Some(result) = &view.result {
        let color = match result.band {
            QualityBand::High => Color::Green,
            QualityBand::Medium => Color::Yellow,
            QualityBand::Low => Color::Red,
        };
        frame.render_widget(
            Gauge::default()
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(result.band.css_class()),
                )
                .gauge_style(Style::default().fg(color))
                .percent(result.bar_percent)
                .label(result.score_text.clone()),
            result_chunks[0],
        );
    }
    frame.render_widget(
        Paragraph::new(soil_result_text(view))
            .block(Block::default().borders(Borders::ALL).title("assessment"))
            .wrap(Wrap { trim: false }),
        result_chunks[1],
    );
}

fn soil_form_text(view: &SoilView) -> String {
    let focused = view.form.focused();
    let mut lines: Vec<String> = SoilField::ALL
        .iter()
        .map(|field| {
            let marker = if *field == focused { ">" } else { " " };
            format!("{marker} {}: {}", field.label(), view.form.value(*field))
        })
        .collect();
    lines.push(String::new());
    lines.push(format!("[ {} ]", view.submit.button_label()));
    lines.join("\n")
}

fn soil_result_text(view: &SoilView) -> String {
    let mut lines = Vec::new();
    if let Some(error) = &view.error {
        lines.push(error.clone());
        lines.push(String::new());
    }
    if let Some(result) = &view.result {
        lines.push(format!(
            "fertility: {} ({})",
            result.fertility_text, result.fertility_class
        ));
        lines.push(format!("score: {}", result.score_text));
        lines.push(String::new());
        lines.push("suitable crops:".to_owned());
        lines.extend(result.crops.iter().map(|crop| format!("  {crop}")));
    }
    if lines.is_empty() {
        return "load a sample (h/m/l) or enter a reading, then submit".to_owned();
    }
    lines.join("\n")
}

fn status_text(state: &AppState) -> String {
    let mode = match state.mode {
        AppMode::Nav => "NAV",
        AppMode::Input => "INPUT",
    };
    let hints = match (state.active_tab, state.mode) {
        (_, AppMode::Input) => "enter: submit  esc: nav",
        (TabKind::Comparison, _) => "h/l: column  s: sort  space: check  c: compare  ?: help",
        (TabKind::Chat, _) => "i: type  j/k: suggestion  enter: ask  ?: help",
        (TabKind::Soil, _) => "h/m/l: sample  i: edit  enter: assess  ?: help",
    };
    match &state.status_line {
        Some(status) => format!("{mode} | {status} | {hints}"),
        None => format!("{mode} | {hints}"),
    }
}

fn help_text() -> String {
    [
        "global",
        "  tab/shift+tab  switch tab",
        "  1 2 3          comparison, chat, soil",
        "  ?              toggle help",
        "  ctrl+q         quit",
        "",
        "comparison",
        "  j/k g/G        move row",
        "  h/l            choose column",
        "  s              sort column (toggles direction)",
        "  enter          crop details",
        "  space a x      check, check all, clear",
        "  c              compare checked crops",
        "  v              cycle season filter",
        "  r              reload crops",
        "",
        "chat",
        "  i              type a message, enter to send",
        "  j/k enter      ask a suggested question",
        "",
        "soil",
        "  h/m/l          load high/medium/low sample",
        "  i              edit fields (tab moves)",
        "  enter          assess soil health",
    ]
    .join("\n")
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
