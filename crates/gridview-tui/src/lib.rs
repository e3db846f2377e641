// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use gridview_app::{
    FetchStatus, FilterAttribute, FilterSpec, GridCommand, GridEvent, GridState, Record,
    RecordField,
};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tracing::{debug, error};

const POLL_INTERVAL: Duration = Duration::from_millis(120);
const STATUS_TTL: Duration = Duration::from_secs(4);
const SORT_ARROW: &str = "↑";
const INPUT_CURSOR: &str = "▏";

/// Supplies the record collection to the UI loop.
pub trait GridRuntime {
    fn source_label(&self) -> String;
    fn fetch_records(&mut self) -> Result<Vec<Record>>;

    /// Starts the one-shot fetch. The result must arrive on `tx` as
    /// [`InternalEvent::RecordsFetched`] or [`InternalEvent::FetchFailed`].
    fn spawn_fetch(&mut self, tx: Sender<InternalEvent>) -> Result<()> {
        let event = match self.fetch_records() {
            Ok(records) => InternalEvent::RecordsFetched(records),
            Err(error) => InternalEvent::FetchFailed(format!("{error:#}")),
        };
        tx.send(event)
            .map_err(|_| anyhow!("fetch event channel closed"))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    RecordsFetched(Vec<Record>),
    FetchFailed(String),
}

/// Startup settings for the UI that are not part of the grid state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UiOptions {
    /// Where the filter attribute selector starts.
    pub filter_attribute: FilterAttribute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum InputFocus {
    #[default]
    Table,
    Search,
    Filter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableCommand {
    MoveRow(isize),
    MoveColumn(isize),
    SortSelectedColumn,
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    GotoPage(usize),
    FocusSearch,
    FocusFilter,
    CycleFilterAttribute(isize),
    ClearQuery,
    ToggleHelp,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct ViewData {
    focus: InputFocus,
    search_input: String,
    filter_attribute: FilterAttribute,
    filter_input: String,
    selected_row: usize,
    selected_col: usize,
    help_visible: bool,
    status_token: u64,
    source_label: String,
}

pub fn run_app<R: GridRuntime>(
    state: &mut GridState,
    runtime: &mut R,
    options: UiOptions,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let result = match Terminal::new(backend).context("create terminal") {
        Ok(mut terminal) => run_loop(&mut terminal, state, runtime, options, next_key_event),
        Err(error) => Err(error),
    };

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

/// Returns on quit or on the first draw or input error; the caller restores
/// the terminal either way.
fn run_loop<B, R, F>(
    terminal: &mut Terminal<B>,
    state: &mut GridState,
    runtime: &mut R,
    options: UiOptions,
    mut next_key: F,
) -> Result<()>
where
    B: Backend,
    R: GridRuntime,
    F: FnMut() -> Result<Option<KeyEvent>>,
{
    let mut view_data = ViewData {
        source_label: runtime.source_label(),
        filter_attribute: options.filter_attribute,
        ..ViewData::default()
    };
    let (internal_tx, internal_rx) = mpsc::channel();

    let loading = format!("loading records from {}", view_data.source_label);
    state.dispatch(GridCommand::SetStatus(loading));
    if let Err(error) = runtime.spawn_fetch(internal_tx.clone()) {
        let _ = internal_tx.send(InternalEvent::FetchFailed(format!("{error:#}")));
    }

    loop {
        process_internal_events(state, &mut view_data, &internal_tx, &internal_rx);

        terminal
            .draw(|frame| render(frame, state, &view_data))
            .context("draw frame")?;

        if let Some(key) = next_key()?
            && handle_key_event(state, &mut view_data, &internal_tx, key)
        {
            return Ok(());
        }
    }
}

fn next_key_event() -> Result<Option<KeyEvent>> {
    if !event::poll(POLL_INTERVAL).context("poll event")? {
        return Ok(None);
    }
    match event::read().context("read event")? {
        Event::Key(key) => Ok(Some(key)),
        _ => Ok(None),
    }
}

fn process_internal_events(
    state: &mut GridState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(GridCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::RecordsFetched(records) => {
                dispatch_grid(state, view_data, tx, GridCommand::Load(records));
            }
            InternalEvent::FetchFailed(message) => {
                error!(source = %view_data.source_label, error = %message, "record fetch failed");
                dispatch_grid(state, view_data, tx, GridCommand::FetchFailed(message));
            }
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_TTL);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut GridState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    dispatch_grid(
        state,
        view_data,
        internal_tx,
        GridCommand::SetStatus(message.into()),
    );
}

fn dispatch_grid(
    state: &mut GridState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: GridCommand,
) {
    let events = state.dispatch(command);
    if events.iter().any(|event| {
        matches!(
            event,
            GridEvent::ViewChanged { .. } | GridEvent::PageChanged(_)
        )
    }) {
        clamp_selected_row(state, view_data);
    }
    if events
        .iter()
        .any(|event| matches!(event, GridEvent::StatusUpdated(_)))
    {
        view_data.status_token = view_data.status_token.saturating_add(1);
        schedule_status_clear(internal_tx, view_data.status_token);
    }
}

fn clamp_selected_row(state: &GridState, view_data: &mut ViewData) {
    let rows = state.page_slice().len();
    view_data.selected_row = view_data.selected_row.min(rows.saturating_sub(1));
}

fn handle_key_event(
    state: &mut GridState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            view_data.help_visible = false;
        }
        return false;
    }

    match view_data.focus {
        InputFocus::Search => handle_search_key(state, view_data, internal_tx, key),
        InputFocus::Filter => handle_filter_key(state, view_data, internal_tx, key),
        InputFocus::Table => {
            if let Some(command) = table_command_for_key(key) {
                apply_table_command(state, view_data, internal_tx, command);
            }
        }
    }
    false
}

fn handle_search_key(
    state: &mut GridState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Esc => view_data.focus = InputFocus::Table,
        KeyCode::Enter => {
            view_data.focus = InputFocus::Table;
            let query = view_data.search_input.clone();
            debug!(query = %query, "search submitted");
            dispatch_grid(state, view_data, internal_tx, GridCommand::Search(query));
        }
        KeyCode::Backspace => {
            view_data.search_input.pop();
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            view_data.search_input.push(ch);
        }
        _ => {}
    }
}

fn handle_filter_key(
    state: &mut GridState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Esc => view_data.focus = InputFocus::Table,
        KeyCode::Tab => view_data.filter_attribute = view_data.filter_attribute.cycle(1),
        KeyCode::BackTab => view_data.filter_attribute = view_data.filter_attribute.cycle(-1),
        KeyCode::Enter => {
            view_data.focus = InputFocus::Table;
            let spec = FilterSpec::new(view_data.filter_attribute, view_data.filter_input.clone());
            debug!(
                attribute = spec.attribute.as_str(),
                value = %spec.value,
                "filter submitted"
            );
            dispatch_grid(state, view_data, internal_tx, GridCommand::Filter(spec));
        }
        KeyCode::Backspace => {
            view_data.filter_input.pop();
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            view_data.filter_input.push(ch);
        }
        _ => {}
    }
}

fn table_command_for_key(key: KeyEvent) -> Option<TableCommand> {
    match (key.code, key.modifiers) {
        (KeyCode::Char('j'), _) | (KeyCode::Down, _) => Some(TableCommand::MoveRow(1)),
        (KeyCode::Char('k'), _) | (KeyCode::Up, _) => Some(TableCommand::MoveRow(-1)),
        (KeyCode::Char('h'), _) | (KeyCode::Left, _) => Some(TableCommand::MoveColumn(-1)),
        (KeyCode::Char('l'), _) | (KeyCode::Right, _) => Some(TableCommand::MoveColumn(1)),
        (KeyCode::Char('s'), KeyModifiers::NONE) | (KeyCode::Enter, _) => {
            Some(TableCommand::SortSelectedColumn)
        }
        (KeyCode::Char(']'), _) | (KeyCode::PageDown, _) => Some(TableCommand::NextPage),
        (KeyCode::Char('['), _) | (KeyCode::PageUp, _) => Some(TableCommand::PrevPage),
        (KeyCode::Char('g'), _) | (KeyCode::Home, _) => Some(TableCommand::FirstPage),
        (KeyCode::Char('G'), _) | (KeyCode::End, _) => Some(TableCommand::LastPage),
        (KeyCode::Char(digit @ '1'..='9'), _) => digit
            .to_digit(10)
            .map(|page| TableCommand::GotoPage(page as usize)),
        (KeyCode::Char('/'), _) => Some(TableCommand::FocusSearch),
        (KeyCode::Char('f'), KeyModifiers::NONE) => Some(TableCommand::FocusFilter),
        (KeyCode::Char('a'), KeyModifiers::NONE) => Some(TableCommand::CycleFilterAttribute(1)),
        (KeyCode::Char('A'), _) => Some(TableCommand::CycleFilterAttribute(-1)),
        (KeyCode::Char('x'), KeyModifiers::NONE) => Some(TableCommand::ClearQuery),
        (KeyCode::Char('?'), _) => Some(TableCommand::ToggleHelp),
        _ => None,
    }
}

fn apply_table_command(
    state: &mut GridState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: TableCommand,
) {
    match command {
        TableCommand::MoveRow(delta) => {
            let rows = state.page_slice().len();
            if rows == 0 {
                view_data.selected_row = 0;
                return;
            }
            let next = (view_data.selected_row as isize + delta).clamp(0, rows as isize - 1);
            view_data.selected_row = next as usize;
        }
        TableCommand::MoveColumn(delta) => {
            let last = RecordField::ALL.len() as isize - 1;
            view_data.selected_col =
                (view_data.selected_col as isize + delta).clamp(0, last) as usize;
        }
        TableCommand::SortSelectedColumn => {
            let key = selected_field(view_data);
            dispatch_grid(state, view_data, internal_tx, GridCommand::Sort(key));
        }
        TableCommand::NextPage => {
            dispatch_grid(state, view_data, internal_tx, GridCommand::NextPage);
        }
        TableCommand::PrevPage => {
            dispatch_grid(state, view_data, internal_tx, GridCommand::PrevPage);
        }
        TableCommand::FirstPage => {
            dispatch_grid(state, view_data, internal_tx, GridCommand::SetPage(1));
        }
        TableCommand::LastPage => {
            let last = state.total_pages().max(1);
            dispatch_grid(state, view_data, internal_tx, GridCommand::SetPage(last));
        }
        TableCommand::GotoPage(page) => {
            let total = state.total_pages();
            if page > total {
                emit_status(
                    state,
                    view_data,
                    internal_tx,
                    format!("no page {page} ({total} pages)"),
                );
                return;
            }
            dispatch_grid(state, view_data, internal_tx, GridCommand::SetPage(page));
        }
        TableCommand::FocusSearch => view_data.focus = InputFocus::Search,
        TableCommand::FocusFilter => view_data.focus = InputFocus::Filter,
        TableCommand::CycleFilterAttribute(delta) => {
            view_data.filter_attribute = view_data.filter_attribute.cycle(delta);
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("filter by {}", view_data.filter_attribute.as_str()),
            );
        }
        TableCommand::ClearQuery => {
            view_data.search_input.clear();
            view_data.filter_input.clear();
            view_data.filter_attribute = FilterAttribute::None;
            dispatch_grid(
                state,
                view_data,
                internal_tx,
                GridCommand::Filter(FilterSpec::default()),
            );
            dispatch_grid(
                state,
                view_data,
                internal_tx,
                GridCommand::Search(String::new()),
            );
        }
        TableCommand::ToggleHelp => view_data.help_visible = !view_data.help_visible,
    }
}

fn selected_field(view_data: &ViewData) -> RecordField {
    RecordField::ALL
        .get(view_data.selected_col)
        .copied()
        .unwrap_or(RecordField::Id)
}

fn render(frame: &mut ratatui::Frame<'_>, state: &GridState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(frame.area());

    render_controls(frame, layout[0], view_data);
    render_table(frame, layout[1], state, view_data);

    let pages = Paragraph::new(page_buttons_line(state))
        .wrap(Wrap { trim: true })
        .block(Block::default().title("pages").borders(Borders::ALL));
    frame.render_widget(pages, layout[2]);

    let status = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[3]);

    if view_data.help_visible {
        let area = centered_rect(64, 60, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_controls(frame: &mut ratatui::Frame<'_>, area: Rect, view_data: &ViewData) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(50),
            Constraint::Length(18),
            Constraint::Min(10),
        ])
        .split(area);

    let search = Paragraph::new(input_text(
        &view_data.search_input,
        view_data.focus == InputFocus::Search,
    ))
    .block(control_block("search (/)", view_data.focus == InputFocus::Search));
    frame.render_widget(search, columns[0]);

    let attribute = Paragraph::new(format!("◂ {} ▸", view_data.filter_attribute.as_str()))
        .block(control_block("attribute (a)", false));
    frame.render_widget(attribute, columns[1]);

    let value = Paragraph::new(input_text(
        &view_data.filter_input,
        view_data.focus == InputFocus::Filter,
    ))
    .block(control_block("filter (f)", view_data.focus == InputFocus::Filter));
    frame.render_widget(value, columns[2]);
}

fn control_block(title: &str, focused: bool) -> Block<'_> {
    let style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(style)
}

fn input_text(value: &str, focused: bool) -> String {
    if focused {
        format!("{value}{INPUT_CURSOR}")
    } else {
        value.to_owned()
    }
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &GridState,
    view_data: &ViewData,
) {
    let title = table_title(state);
    if state.page_slice().is_empty() {
        let empty = Paragraph::new(empty_table_text(state))
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(empty, area);
        return;
    }

    let header_cells = RecordField::ALL
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let mut style = Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD);
            if index == view_data.selected_col {
                style = style.fg(Color::Cyan).add_modifier(Modifier::UNDERLINED);
            }
            Cell::from(header_label(*field, state)).style(style)
        });
    let header = Row::new(header_cells);

    let rows = state
        .page_slice()
        .iter()
        .enumerate()
        .map(|(row_index, record)| {
            let style = if row_index == view_data.selected_row {
                Style::default().bg(Color::DarkGray)
            } else {
                Style::default()
            };
            let cells = RecordField::ALL
                .iter()
                .map(|field| Cell::from(cell_text(record, *field)))
                .collect::<Vec<_>>();
            Row::new(cells).style(style)
        });

    let widths = [
        Constraint::Length(6),
        Constraint::Percentage(35),
        Constraint::Min(20),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(table, area);
}

fn header_label(field: RecordField, state: &GridState) -> String {
    if state.sort_key() == Some(field) {
        format!("{} {SORT_ARROW}", field.label())
    } else {
        field.label().to_owned()
    }
}

/// Single-line rendering; bodies often carry hard line breaks.
fn cell_text(record: &Record, field: RecordField) -> String {
    record
        .field_text(field)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn table_title(state: &GridState) -> String {
    let rows = state.view().len();
    let shown = state.page_slice().len();
    let first = state.first_row_number();
    let range = if shown == 0 {
        "0".to_owned()
    } else {
        format!("{first}-{}", first + shown - 1)
    };
    format!(
        "records {range} of {rows} | page {}/{} | {}",
        state.current_page(),
        state.total_pages(),
        state.active_query().label()
    )
}

fn empty_table_text(state: &GridState) -> String {
    match state.fetch_status() {
        FetchStatus::Pending => "loading…".to_owned(),
        FetchStatus::Failed(message) => format!("no records: {message}"),
        FetchStatus::Loaded if state.full().is_empty() => "source returned no records".to_owned(),
        FetchStatus::Loaded if state.view().is_empty() => "no matching records".to_owned(),
        FetchStatus::Loaded => format!("page {} is empty", state.current_page()),
    }
}

fn page_buttons_line(state: &GridState) -> Line<'static> {
    let total = state.total_pages();
    if total == 0 {
        return Line::from(Span::styled(
            "no pages",
            Style::default().fg(Color::DarkGray),
        ));
    }
    let spans = state
        .page_numbers()
        .flat_map(|page| {
            let style = if page == state.current_page() {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            [Span::styled(format!(" {page} "), style), Span::raw(" ")]
        })
        .collect::<Vec<_>>();
    Line::from(spans)
}

fn status_text(state: &GridState, view_data: &ViewData) -> String {
    let (mode, hints) = match view_data.focus {
        InputFocus::Table => (
            "TABLE",
            "j/k h/l | s sort | [ ] g/G 1-9 pages | / search | f filter a attr | x clear | ? help | ctrl+q",
        ),
        InputFocus::Search => ("SEARCH", "enter apply | esc cancel"),
        InputFocus::Filter => ("FILTER", "tab attribute | enter apply | esc cancel"),
    };
    match &state.status_line {
        Some(status) => format!("{mode} | {status} | {hints}"),
        None => format!("{mode} | {hints}"),
    }
}

fn help_overlay_text() -> &'static str {
    "j/k, up/down     move row\n\
     h/l, left/right  move column\n\
     s, enter         sort by selected column (ascending)\n\
     ] / [            next / previous page\n\
     g / G            first / last page\n\
     1-9              jump to page\n\
     /                edit search, enter to apply\n\
     f                edit filter value, tab cycles attribute\n\
     a / A            cycle filter attribute\n\
     x                clear search and filter\n\
     ?                toggle help\n\
     ctrl+q           quit"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
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
        .split(popup_layout[1])[1]
}
