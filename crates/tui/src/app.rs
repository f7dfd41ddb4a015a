use std::{
    cmp, io,
    path::{Path, PathBuf},
    thread,
    time::Duration,
};

use anyhow::{Context, Result};
use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use quartet_core::{
    document::SAVE_FILE_NAME,
    equipment::{self, CharacterTab, EquipmentRow},
    slots::DEFAULT_SAVES_SUFFIX,
    AppConfig, EditorError, ItemCatalog, SlotSession,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

const TICK_RATE: Duration = Duration::from_millis(250);
const MAX_PATH_LEN: usize = 1024;
const LABEL_WIDTH: usize = 14;

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    muted: Color,
    selection_bg: Color,
    success: Color,
    warning: Color,
    danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            selection_bg: Color::DarkGray,
            success: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Slots,
    Equipment,
}

/// Text prompt standing in for a native directory chooser.
#[derive(Debug, Clone)]
struct FolderPromptModal {
    input: String,
    /// Cursor position in characters.
    cursor: usize,
}

impl FolderPromptModal {
    fn new(initial: String) -> Self {
        let cursor = initial.chars().count();
        Self {
            input: initial,
            cursor,
        }
    }

    fn len(&self) -> usize {
        self.input.chars().count()
    }

    fn byte_index(&self, cursor: usize) -> usize {
        self.input
            .char_indices()
            .nth(cursor)
            .map(|(idx, _)| idx)
            .unwrap_or(self.input.len())
    }

    fn move_cursor(&mut self, delta: isize) {
        let next = self.cursor as isize + delta;
        self.cursor = next.clamp(0, self.len() as isize) as usize;
    }

    fn move_home(&mut self) {
        self.cursor = 0;
    }

    fn move_end(&mut self) {
        self.cursor = self.len();
    }

    fn insert(&mut self, ch: char) {
        if self.input.len() >= MAX_PATH_LEN || ch.is_control() {
            return;
        }
        let at = self.byte_index(self.cursor);
        self.input.insert(at, ch);
        self.cursor += 1;
    }

    fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.input.remove(at);
    }

    fn delete(&mut self) {
        if self.cursor < self.len() {
            let at = self.byte_index(self.cursor);
            self.input.remove(at);
        }
    }

    fn clear(&mut self) {
        self.input.clear();
        self.cursor = 0;
    }

    fn path(&self) -> PathBuf {
        expand_home(self.input.trim())
    }
}

/// Drop-down list for one equipment row.
#[derive(Debug, Clone)]
struct OptionPickerModal {
    row: usize,
    cursor: usize,
    offset: usize,
}

#[derive(Debug, Clone)]
struct Alert {
    header: String,
    message: String,
}

enum AppEvent {
    Input(Event),
    Tick,
}

/// Terminal front-end over [`SlotSession`].
pub struct EditorApp {
    config: AppConfig,
    catalog: ItemCatalog,
    session: SlotSession,
    tabs: Vec<CharacterTab>,
    focus: Focus,
    slot_cursor: usize,
    tab_index: usize,
    row_cursor: usize,
    picker: Option<OptionPickerModal>,
    picker_height: usize,
    folder_prompt: Option<FolderPromptModal>,
    alerts: Vec<Alert>,
    status: String,
    theme: Theme,
    quit_armed: bool,
    should_quit: bool,
}

impl EditorApp {
    pub fn new(config: AppConfig, catalog: ItemCatalog) -> Self {
        Self {
            config,
            catalog,
            session: SlotSession::new(),
            tabs: Vec::new(),
            focus: Focus::Slots,
            slot_cursor: 0,
            tab_index: 0,
            row_cursor: 0,
            picker: None,
            picker_height: 1,
            folder_prompt: None,
            alerts: Vec::new(),
            status: "No slot loaded.".to_string(),
            theme: Theme::default(),
            quit_armed: false,
            should_quit: false,
        }
    }

    /// Queue a modal alert for `err`.
    pub fn report(&mut self, err: EditorError) {
        warn!(header = %err.header(), "{err}");
        self.alerts.push(Alert {
            header: err.header(),
            message: err.to_string(),
        });
    }

    pub async fn run(&mut self) -> Result<()> {
        self.use_default_folder();

        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx);

        let result = loop {
            if let Err(err) = terminal.draw(|frame| self.draw(frame)) {
                break Err(err).context("failed to draw frame");
            }
            if self.should_quit {
                break Ok(());
            }
            match event_rx.recv().await {
                Some(AppEvent::Input(event)) => self.handle_input(event),
                Some(AppEvent::Tick) => {}
                None => break Ok(()),
            }
        };

        restore_terminal(&mut terminal)?;
        info!("Editor closed");
        result
    }

    fn set_status(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.status = format!("[{}] {}", Local::now().format("%H:%M:%S"), message);
    }

    fn slot_label(&self) -> String {
        let name = self
            .session
            .current_slot()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "?".to_string());
        format!("{name}/{SAVE_FILE_NAME}")
    }

    fn use_default_folder(&mut self) {
        let Some(root) = self.config.saves_root() else {
            self.report(EditorError::DefaultRootMissing {
                path: PathBuf::from("~").join(DEFAULT_SAVES_SUFFIX),
            });
            return;
        };
        let result = self
            .session
            .use_default_root(&root)
            .map(|slots| slots.first().cloned());
        self.after_scan(result);
    }

    fn open_folder(&mut self, path: PathBuf) {
        let result = self
            .session
            .open_folder(&path)
            .map(|slots| slots.first().cloned());
        self.after_scan(result);
    }

    fn after_scan(&mut self, result: Result<Option<PathBuf>, EditorError>) {
        match result {
            Ok(first) => {
                self.slot_cursor = 0;
                self.focus = Focus::Slots;
                if let Some(first) = first {
                    self.load_slot(&first);
                }
            }
            Err(err) => self.report(err),
        }
    }

    fn load_slot(&mut self, slot: &Path) {
        match self.session.load_slot(slot) {
            Ok(document) => {
                self.tabs = equipment::build_tabs(document, &self.catalog);
                self.tab_index = 0;
                self.row_cursor = 0;
                if let Some(index) = self.session.slots().iter().position(|path| path == slot) {
                    self.slot_cursor = index;
                }
                self.set_status(format!("Loaded {}", self.slot_label()));
            }
            Err(err) => {
                error!(slot = %slot.display(), "Slot load failed: {err}");
                self.report(err);
            }
        }
    }

    fn rebuild_tabs(&mut self) {
        self.tabs = match self.session.document_mut() {
            Some(document) => equipment::build_tabs(document, &self.catalog),
            None => Vec::new(),
        };
        self.tab_index = self.tab_index.min(self.tabs.len().saturating_sub(1));
    }

    fn save(&mut self) {
        match self.session.save() {
            Ok(report) => {
                let backup = report
                    .backup
                    .file_name()
                    .map(|name| name.to_string_lossy().to_string())
                    .unwrap_or_default();
                self.set_status(format!("Saved + backup created: {backup}"));
            }
            Err(err) => self.report(err),
        }
    }

    fn reload(&mut self) {
        match self.session.reload() {
            Ok(_) => {
                self.rebuild_tabs();
                self.set_status(format!("Reloaded {}", self.slot_label()));
            }
            Err(err) => self.report(err),
        }
    }

    fn apply_pick(&mut self, row: usize, option: usize) {
        let Some(tab) = self.tabs.get_mut(self.tab_index) else {
            return;
        };
        let Some(document) = self.session.document_mut() else {
            return;
        };
        match equipment::apply_selection(document, tab, row, option) {
            Ok(true) => self.set_status(format!("Modified {} (unsaved)", self.slot_label())),
            Ok(false) => {}
            Err(err) => self.report(err),
        }
    }

    fn current_row(&self) -> Option<&EquipmentRow> {
        self.tabs.get(self.tab_index)?.rows.get(self.row_cursor)
    }

    fn handle_input(&mut self, event: Event) {
        let Event::Key(key) = event else {
            return;
        };
        if key.kind != KeyEventKind::Press {
            return;
        }
        if !self.alerts.is_empty() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                self.alerts.remove(0);
            }
        } else if self.folder_prompt.is_some() {
            self.handle_folder_prompt_key(key);
        } else if self.picker.is_some() {
            self.handle_picker_key(key);
        } else {
            self.handle_key(key);
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        let quit_requested = matches!(key.code, KeyCode::Char('q') | KeyCode::Esc);
        if !quit_requested {
            self.quit_armed = false;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                if self.session.is_dirty() && !self.quit_armed {
                    self.quit_armed = true;
                    self.set_status(format!(
                        "{} has unsaved changes. Press q again to quit without saving.",
                        self.slot_label()
                    ));
                } else {
                    self.should_quit = true;
                }
            }
            KeyCode::Char('o') => self.open_folder_prompt(),
            KeyCode::Char('d') => self.use_default_folder(),
            KeyCode::Char('s') => self.save(),
            KeyCode::Char('r') => self.reload(),
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    Focus::Slots => Focus::Equipment,
                    Focus::Equipment => Focus::Slots,
                };
            }
            KeyCode::Left | KeyCode::Char('h') => self.move_tab(-1),
            KeyCode::Right | KeyCode::Char('l') => self.move_tab(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1),
            KeyCode::Enter => match self.focus {
                Focus::Slots => {
                    if let Some(slot) = self.session.slots().get(self.slot_cursor).cloned() {
                        self.load_slot(&slot);
                    }
                }
                Focus::Equipment => self.open_picker(),
            },
            _ => {}
        }
    }

    fn move_tab(&mut self, delta: isize) {
        if self.tabs.is_empty() {
            return;
        }
        let len = self.tabs.len() as isize;
        self.tab_index = (self.tab_index as isize + delta).rem_euclid(len) as usize;
    }

    fn move_cursor(&mut self, delta: isize) {
        match self.focus {
            Focus::Slots => {
                self.slot_cursor = step(self.slot_cursor, delta, self.session.slots().len());
            }
            Focus::Equipment => {
                let rows = self
                    .tabs
                    .get(self.tab_index)
                    .map(|tab| tab.rows.len())
                    .unwrap_or(0);
                self.row_cursor = step(self.row_cursor, delta, rows);
            }
        }
    }

    fn open_folder_prompt(&mut self) {
        let initial = self
            .session
            .saves_root()
            .filter(|root| root.is_dir())
            .map(Path::to_path_buf)
            .or_else(dirs::home_dir)
            .map(|path| path.display().to_string())
            .unwrap_or_default();
        self.folder_prompt = Some(FolderPromptModal::new(initial));
    }

    fn handle_folder_prompt_key(&mut self, key: KeyEvent) {
        let mut submit = None;
        let mut cancel = false;
        if let Some(prompt) = self.folder_prompt.as_mut() {
            match key.code {
                KeyCode::Esc => cancel = true,
                KeyCode::Enter => submit = Some(prompt.path()),
                KeyCode::Left => prompt.move_cursor(-1),
                KeyCode::Right => prompt.move_cursor(1),
                KeyCode::Home => prompt.move_home(),
                KeyCode::End => prompt.move_end(),
                KeyCode::Backspace => prompt.backspace(),
                KeyCode::Delete => prompt.delete(),
                KeyCode::Char('u') if key.modifiers == KeyModifiers::CONTROL => prompt.clear(),
                KeyCode::Char(ch) => {
                    if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
                        prompt.insert(ch);
                    }
                }
                _ => {}
            }
        }

        if cancel {
            self.folder_prompt = None;
        } else if let Some(path) = submit {
            self.folder_prompt = None;
            self.open_folder(path);
        }
    }

    fn open_picker(&mut self) {
        let Some(selected) = self.current_row().map(EquipmentRow::selected) else {
            return;
        };
        self.picker = Some(OptionPickerModal {
            row: self.row_cursor,
            cursor: selected,
            offset: 0,
        });
    }

    fn handle_picker_key(&mut self, key: KeyEvent) {
        let Some(mut picker) = self.picker.take() else {
            return;
        };
        let total = self
            .tabs
            .get(self.tab_index)
            .and_then(|tab| tab.rows.get(picker.row))
            .map(|row| row.options().len())
            .unwrap_or(0);
        let page = self.picker_height.max(1) as isize;

        match key.code {
            KeyCode::Esc => return,
            KeyCode::Enter => {
                self.apply_pick(picker.row, picker.cursor);
                return;
            }
            KeyCode::Up | KeyCode::Char('k') => picker.cursor = step(picker.cursor, -1, total),
            KeyCode::Down | KeyCode::Char('j') => picker.cursor = step(picker.cursor, 1, total),
            KeyCode::PageUp => picker.cursor = step(picker.cursor, -page, total),
            KeyCode::PageDown => picker.cursor = step(picker.cursor, page, total),
            KeyCode::Home => picker.cursor = 0,
            KeyCode::End => picker.cursor = total.saturating_sub(1),
            _ => {}
        }
        self.picker = Some(picker);
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(8), Constraint::Length(4)])
            .split(area);
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(24), Constraint::Min(30)])
            .split(chunks[0]);

        self.render_slot_list(frame, body[0]);
        self.render_editor(frame, body[1]);
        self.render_status(frame, chunks[1]);

        if self.picker.is_some() {
            self.render_picker(frame);
        }
        if let Some(prompt) = &self.folder_prompt {
            self.render_folder_prompt(frame, prompt);
        }
        if let Some(alert) = self.alerts.first() {
            self.render_alert(frame, alert);
        }
    }

    fn pane_block(&self, title: String, focus: Focus) -> Block<'static> {
        let border = if self.focus == focus {
            Style::default().fg(self.theme.accent)
        } else {
            Style::default().fg(self.theme.muted)
        };
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(title)
    }

    fn render_slot_list(&self, frame: &mut Frame, area: Rect) {
        let loaded = self.session.current_slot();
        let items: Vec<ListItem> = self
            .session
            .slots()
            .iter()
            .map(|path| {
                let name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().to_string())
                    .unwrap_or_else(|| path.display().to_string());
                let marker = if Some(path.as_path()) == loaded {
                    Span::styled("● ", Style::default().fg(self.theme.success))
                } else {
                    Span::raw("  ")
                };
                ListItem::new(Line::from(vec![
                    marker,
                    Span::styled(name, Style::default().fg(self.theme.primary_fg)),
                ]))
            })
            .collect();

        let mut state = ListState::default();
        if !items.is_empty() {
            state.select(Some(self.slot_cursor.min(items.len() - 1)));
        }
        let list = List::new(items)
            .block(self.pane_block("Slots".to_string(), Focus::Slots))
            .highlight_style(Style::default().bg(self.theme.selection_bg));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn render_editor(&self, frame: &mut Frame, area: Rect) {
        let Some(document) = self.session.document() else {
            let hint = Paragraph::new(vec![
                Line::from("No slot loaded."),
                Line::from(""),
                Line::from("Press o to open a saves folder or slot folder,"),
                Line::from("or d to use the default saves folder."),
            ])
            .block(self.pane_block("Equipment".to_string(), Focus::Equipment))
            .wrap(Wrap { trim: true });
            frame.render_widget(hint, area);
            return;
        };

        let mut title = self.slot_label();
        if document.is_dirty() {
            title.push_str(" *");
        }
        let block = self.pane_block(title, Focus::Equipment);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(6)])
            .split(inner);

        let titles: Vec<String> = if self.tabs.is_empty() {
            vec!["No Characters".to_string()]
        } else {
            self.tabs.iter().map(|tab| tab.title.clone()).collect()
        };
        let tabs = Tabs::new(titles)
            .select(self.tab_index)
            .block(Block::default().borders(Borders::BOTTOM))
            .style(Style::default().fg(self.theme.muted))
            .highlight_style(
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, chunks[0]);

        let Some(tab) = self.tabs.get(self.tab_index) else {
            let empty = Paragraph::new("No party.characters entries found.")
                .style(Style::default().fg(self.theme.muted));
            frame.render_widget(empty, chunks[1]);
            return;
        };

        let mut lines: Vec<Line> = Vec::with_capacity(tab.rows.len() * 2 + 2);
        lines.push(Line::from(""));
        for (idx, row) in tab.rows.iter().enumerate() {
            let focused = self.focus == Focus::Equipment && idx == self.row_cursor;
            let marker = if focused {
                Span::styled(
                    "▶ ",
                    Style::default()
                        .fg(self.theme.accent)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                Span::raw("  ")
            };
            let label = format!("{}:", row.slot().label());
            let option = row.selected_option();
            let value_style = if Some(row.selected()) == row.unknown_index() {
                Style::default().fg(self.theme.warning)
            } else if option.is_empty() {
                Style::default().fg(self.theme.muted)
            } else {
                Style::default().fg(self.theme.primary_fg)
            };
            lines.push(Line::from(vec![
                marker,
                Span::styled(
                    format!("{label:<LABEL_WIDTH$}"),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("[ {} ▾ ]", EquipmentRow::display(option)), value_style),
            ]));
            lines.push(Line::from(""));
        }
        if let Some(row) = self.current_row() {
            lines.push(Line::from(Span::styled(
                format!(
                    "{} · {} options",
                    row.slot().category().key(),
                    row.options().len()
                ),
                Style::default().fg(self.theme.muted),
            )));
        }
        frame.render_widget(Paragraph::new(lines), chunks[1]);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let key = |label: &'static str| {
            Span::styled(label, Style::default().add_modifier(Modifier::BOLD))
        };
        let help = Line::from(vec![
            key("o"),
            Span::raw(" open  "),
            key("d"),
            Span::raw(" default  "),
            key("s"),
            Span::raw(" save  "),
            key("r"),
            Span::raw(" reload  "),
            key("Tab"),
            Span::raw(" focus  "),
            key("←/→"),
            Span::raw(" character  "),
            key("Enter"),
            Span::raw(" choose  "),
            key("q"),
            Span::raw(" quit"),
        ]);
        let paragraph = Paragraph::new(vec![Line::from(self.status.clone()), help])
            .block(Block::default().borders(Borders::ALL).title("Status"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_picker(&mut self, frame: &mut Frame) {
        let Some(picker) = self.picker.as_mut() else {
            return;
        };
        let Some(row) = self
            .tabs
            .get(self.tab_index)
            .and_then(|tab| tab.rows.get(picker.row))
        else {
            return;
        };

        let frame_area = frame.size();
        let width = cmp::max(
            row.options()
                .iter()
                .map(|option| EquipmentRow::display(option).chars().count())
                .max()
                .unwrap_or(0) as u16
                + 6,
            32,
        );
        let height = (row.options().len() as u16 + 2).min(frame_area.height.saturating_sub(4));
        let area = centered_rect(width, height.max(3), frame_area);
        self.picker_height = area.height.saturating_sub(2) as usize;

        let items: Vec<ListItem> = row
            .options()
            .iter()
            .enumerate()
            .map(|(idx, option)| {
                let style = if Some(idx) == row.unknown_index() {
                    Style::default().fg(self.theme.warning)
                } else if option.is_empty() {
                    Style::default().fg(self.theme.muted)
                } else {
                    Style::default().fg(self.theme.primary_fg)
                };
                let current = if idx == row.selected() { "✓ " } else { "  " };
                ListItem::new(Line::from(vec![
                    Span::raw(current),
                    Span::styled(EquipmentRow::display(option).to_string(), style),
                ]))
            })
            .collect();

        let mut state = ListState::default()
            .with_offset(picker.offset)
            .with_selected(Some(picker.cursor));
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.theme.accent))
                    .title(row.slot().label()),
            )
            .highlight_style(Style::default().bg(self.theme.selection_bg));

        frame.render_widget(Clear, area);
        frame.render_stateful_widget(list, area, &mut state);
        picker.offset = state.offset();
    }

    fn render_folder_prompt(&self, frame: &mut Frame, prompt: &FolderPromptModal) {
        let frame_area = frame.size();
        let width = cmp::max(cmp::min(80_u16, frame_area.width.saturating_sub(4)), 24_u16);
        let height = 7_u16.min(frame_area.height.saturating_sub(2)).max(5_u16);
        let area = centered_rect(width, height, frame_area);

        frame.render_widget(Clear, area);

        // Keep the cursor on screen for long paths.
        let visible = area.width.saturating_sub(4) as usize;
        let skip = prompt.cursor.saturating_sub(visible);
        let shown: String = prompt.input.chars().skip(skip).take(visible).collect();

        let input_line = Line::from(vec![
            Span::styled("> ", Style::default().fg(self.theme.accent)),
            Span::raw(shown),
        ]);
        let helper = Line::from(vec![
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" open  "),
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" cancel  "),
            Span::styled("Ctrl-U", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" clear"),
        ]);

        let paragraph = Paragraph::new(vec![
            Line::from("Saves root or slot folder:"),
            input_line,
            Line::from(""),
            helper,
        ])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Choose Quartet Saves Root or Slot Folder"),
        );
        frame.render_widget(paragraph, area);

        let cursor_x = (area.x + 3 + (prompt.cursor - skip) as u16)
            .min(area.x + area.width.saturating_sub(2));
        frame.set_cursor(cursor_x, area.y + 2);
    }

    fn render_alert(&self, frame: &mut Frame, alert: &Alert) {
        let frame_area = frame.size();
        let width = cmp::min(70_u16, frame_area.width.saturating_sub(4)).max(24);
        let height = 9_u16.min(frame_area.height.saturating_sub(2)).max(5);
        let area = centered_rect(width, height, frame_area);

        frame.render_widget(Clear, area);
        let mut lines = vec![
            Line::from(Span::styled(
                alert.header.clone(),
                Style::default()
                    .fg(self.theme.danger)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        lines.extend(alert.message.lines().map(|line| Line::from(line.to_string())));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Enter to dismiss",
            Style::default().fg(self.theme.muted),
        )));

        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.theme.danger))
                    .title("Quartet Save Editor"),
            )
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

fn step(current: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (current as isize + delta).clamp(0, len as isize - 1) as usize
}

fn expand_home(input: &str) -> PathBuf {
    if input == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    if let Some(rest) = input.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(input)
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
