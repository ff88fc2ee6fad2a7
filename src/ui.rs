use std::io::{stdout, Stdout};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use color_eyre::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use unicode_width::UnicodeWidthChar;

use crate::image;
use crate::memory_entry::{self, FieldErrors, MemoryEntry};
use crate::memory_store::{filter_entries, ImportPolicy, MemoryStore};
use crate::music::MusicPlayer;
use crate::slideshow::{Effect, Slideshow};

pub enum Action {
    Write,
    Edit(String),
    Delete(String),
    ToggleFavorite(String),
    Search,
    ToggleFavoritesFilter,
    Export,
    Import,
    Relive,
    Quit,
}

/// Validated form output; `image` is already an encoded data URL (or the
/// preserved original when editing without choosing a new file).
pub struct MemoryDraft {
    pub title: String,
    pub date: String,
    pub description: String,
    pub tags: Vec<String>,
    pub image: Option<String>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum FormField {
    Title,
    Date,
    Description,
    Tags,
    ImagePath,
}

const FORM_FIELDS: [FormField; 5] = [
    FormField::Title,
    FormField::Date,
    FormField::Description,
    FormField::Tags,
    FormField::ImagePath,
];

pub struct UI {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    selected: usize,
    query: String,
    favorites_only: bool,
}

impl UI {
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;

        Ok(UI {
            terminal,
            selected: 0,
            query: String::new(),
            favorites_only: false,
        })
    }

    pub fn display(&mut self, store: &MemoryStore) -> Result<()> {
        let filtered = filter_entries(store.entries(), &self.query, self.favorites_only);
        self.selected = self.selected.min(filtered.len().saturating_sub(1));
        let selected = self.selected;
        let query = self.query.clone();
        let favorites_only = self.favorites_only;
        let store_empty = store.is_empty();

        self.terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .margin(1)
                .constraints(
                    [
                        Constraint::Length(3),
                        Constraint::Min(0),
                        Constraint::Length(3),
                    ]
                    .as_ref(),
                )
                .split(f.area());

            let mut header = vec![Line::from(Span::styled(
                "Vaulted Memories",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ))];
            let mut filter_bits = vec![format!("{} shown", filtered.len())];
            if !query.trim().is_empty() {
                filter_bits.push(format!("search: \"{}\"", query.trim()));
            }
            if favorites_only {
                filter_bits.push("favorites only".to_string());
            }
            header.push(Line::from(Span::styled(
                filter_bits.join("  ·  "),
                Style::default().fg(Color::DarkGray),
            )));
            f.render_widget(
                Paragraph::new(header).alignment(Alignment::Center),
                chunks[0],
            );

            if filtered.is_empty() {
                let message = if store_empty {
                    "No memories yet. Press w to write your first memory!"
                } else {
                    "No memories match the current filter."
                };
                f.render_widget(
                    Paragraph::new(message)
                        .alignment(Alignment::Center)
                        .block(Block::default().borders(Borders::ALL).title("Memories")),
                    chunks[1],
                );
            } else {
                let items: Vec<ListItem> = filtered.iter().map(|m| memory_card(m)).collect();
                let list = List::new(items)
                    .block(Block::default().borders(Borders::ALL).title("Memories"))
                    .highlight_style(Style::default().add_modifier(Modifier::BOLD))
                    .highlight_symbol("> ");
                f.render_stateful_widget(
                    list,
                    chunks[1],
                    &mut ListState::default().with_selected(Some(selected)),
                );
            }

            let controls = key_hints(&[
                ("w", "write"),
                ("e", "edit"),
                ("d", "delete"),
                ("f", "favorite"),
                ("s", "search"),
                ("v", "favorites"),
                ("x", "export"),
                ("i", "import"),
                ("r", "relive"),
                ("q", "quit"),
            ]);
            f.render_widget(
                Paragraph::new(controls)
                    .style(Style::default().fg(Color::Yellow))
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true }),
                chunks[2],
            );
        })?;

        Ok(())
    }

    pub fn handle_input(&mut self, store: &MemoryStore) -> Result<Option<Action>> {
        let filtered = filter_entries(store.entries(), &self.query, self.favorites_only);
        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('w') => return Ok(Some(Action::Write)),
                KeyCode::Char('q') => return Ok(Some(Action::Quit)),
                KeyCode::Char('s') => return Ok(Some(Action::Search)),
                KeyCode::Char('v') => return Ok(Some(Action::ToggleFavoritesFilter)),
                KeyCode::Char('x') => return Ok(Some(Action::Export)),
                KeyCode::Char('i') => return Ok(Some(Action::Import)),
                KeyCode::Char('r') => return Ok(Some(Action::Relive)),
                KeyCode::Up => self.selected = self.selected.saturating_sub(1),
                KeyCode::Down => {
                    if self.selected + 1 < filtered.len() {
                        self.selected += 1;
                    }
                }
                KeyCode::Char('e') if !filtered.is_empty() => {
                    return Ok(Some(Action::Edit(filtered[self.selected].id.clone())));
                }
                KeyCode::Char('d') if !filtered.is_empty() => {
                    return Ok(Some(Action::Delete(filtered[self.selected].id.clone())));
                }
                KeyCode::Char('f') if !filtered.is_empty() => {
                    return Ok(Some(Action::ToggleFavorite(
                        filtered[self.selected].id.clone(),
                    )));
                }
                _ => {}
            }
        }
        Ok(None)
    }

    pub fn toggle_favorites_filter(&mut self) {
        self.favorites_only = !self.favorites_only;
    }

    /// Search prompt; the query is applied live to the list until changed.
    /// Submitting an empty query clears the filter.
    pub fn prompt_search(&mut self) -> Result<()> {
        let current = self.query.clone();
        if let Some(query) = self.prompt_line("Search (title, description, tags)", &current)? {
            self.query = query;
            self.selected = 0;
        }
        Ok(())
    }

    /// Single-line input prompt. `Some` on Enter, `None` on Esc.
    pub fn prompt_line(&mut self, title: &str, initial: &str) -> Result<Option<String>> {
        let mut value = initial.to_string();

        loop {
            let shown = value.clone();
            let block_title = title.to_string();
            self.terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .margin(1)
                    .constraints(
                        [
                            Constraint::Length(3),
                            Constraint::Length(3),
                            Constraint::Min(1),
                        ]
                        .as_ref(),
                    )
                    .split(f.area());

                let input = Paragraph::new(shown)
                    .block(Block::default().borders(Borders::ALL).title(block_title));
                f.render_widget(input, chunks[1]);

                let instructions = Paragraph::new("Enter: Submit, Esc: Cancel")
                    .style(Style::default().fg(Color::Yellow))
                    .alignment(Alignment::Center);
                f.render_widget(instructions, chunks[2]);
            })?;

            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Enter => return Ok(Some(value)),
                    KeyCode::Esc => return Ok(None),
                    KeyCode::Char(c) => {
                        value.push(c);
                    }
                    KeyCode::Backspace => {
                        value.pop();
                    }
                    _ => {}
                }
            }
        }
    }

    /// Modal message, dismissed by any key.
    pub fn alert(&mut self, message: &str) -> Result<()> {
        loop {
            let shown = message.to_string();
            self.terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .margin(1)
                    .constraints(
                        [
                            Constraint::Length(3),
                            Constraint::Min(3),
                            Constraint::Length(3),
                        ]
                        .as_ref(),
                    )
                    .split(f.area());

                let body = Paragraph::new(shown)
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true })
                    .block(Block::default().borders(Borders::ALL));
                f.render_widget(body, chunks[1]);

                let instructions = Paragraph::new("Press any key to continue")
                    .style(Style::default().fg(Color::Yellow))
                    .alignment(Alignment::Center);
                f.render_widget(instructions, chunks[2]);
            })?;

            if let Event::Key(_) = event::read()? {
                return Ok(());
            }
        }
    }

    pub fn confirm(&mut self, message: &str) -> Result<bool> {
        loop {
            let shown = message.to_string();
            self.terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .margin(1)
                    .constraints(
                        [
                            Constraint::Length(3),
                            Constraint::Min(3),
                            Constraint::Length(3),
                        ]
                        .as_ref(),
                    )
                    .split(f.area());

                let body = Paragraph::new(shown)
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true })
                    .block(Block::default().borders(Borders::ALL));
                f.render_widget(body, chunks[1]);

                let instructions = Paragraph::new("y: Yes, n/Esc: No")
                    .style(Style::default().fg(Color::Yellow))
                    .alignment(Alignment::Center);
                f.render_widget(instructions, chunks[2]);
            })?;

            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('y') | KeyCode::Char('Y') => return Ok(true),
                    KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => return Ok(false),
                    _ => {}
                }
            }
        }
    }

    /// Merge policy for a parsed import: replace the collection or prepend
    /// the imported entries ahead of it.
    pub fn import_policy(&mut self) -> Result<Option<ImportPolicy>> {
        loop {
            self.terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .margin(1)
                    .constraints(
                        [
                            Constraint::Length(3),
                            Constraint::Min(3),
                            Constraint::Length(3),
                        ]
                        .as_ref(),
                    )
                    .split(f.area());

                let body = Paragraph::new(
                    "Replace current memories with the imported ones,\n\
                     or add the imported ones in front of them?",
                )
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title("Import"));
                f.render_widget(body, chunks[1]);

                let instructions = Paragraph::new("r: Replace, p: Prepend, Esc: Cancel")
                    .style(Style::default().fg(Color::Yellow))
                    .alignment(Alignment::Center);
                f.render_widget(instructions, chunks[2]);
            })?;

            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('r') => return Ok(Some(ImportPolicy::Replace)),
                    KeyCode::Char('p') => return Ok(Some(ImportPolicy::Prepend)),
                    KeyCode::Esc => return Ok(None),
                    _ => {}
                }
            }
        }
    }

    /// Create/edit form. Returns `None` on cancel. On edit, leaving the
    /// image path empty keeps the entry's original image.
    pub fn memory_form(&mut self, existing: Option<&MemoryEntry>) -> Result<Option<MemoryDraft>> {
        let heading = if existing.is_some() {
            "Edit Memory"
        } else {
            "New Memory"
        };
        let mut title = existing.map(|e| e.title.clone()).unwrap_or_default();
        let mut date = existing
            .map(|e| e.date.clone())
            .unwrap_or_else(memory_entry::today);
        let mut description = existing.map(|e| e.description.clone()).unwrap_or_default();
        let mut tags = existing.map(|e| e.tags.join(", ")).unwrap_or_default();
        let mut image_path = String::new();
        let original_image = existing.and_then(|e| e.image.clone());
        let mut focus = 0usize;
        let mut errors = FieldErrors::default();

        loop {
            let view = FormView {
                heading,
                title: title.clone(),
                date: date.clone(),
                description: description.clone(),
                tags: tags.clone(),
                image_path: image_path.clone(),
                focus: FORM_FIELDS[focus],
                errors: errors.clone(),
                has_original_image: original_image.is_some(),
            };
            self.terminal.draw(|f| draw_form(f, &view))?;

            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Esc => return Ok(None),
                    KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        errors = memory_entry::validate(&title, &date, &description);
                        let mut draft_image = original_image.clone();
                        let path = image_path.trim();
                        if !path.is_empty() {
                            match image::encode_file(Path::new(path)) {
                                Ok(url) => draft_image = Some(url),
                                Err(e) => errors.image = Some(e.to_string()),
                            }
                        }
                        if errors.is_empty() {
                            return Ok(Some(MemoryDraft {
                                title: title.trim().to_string(),
                                date: date.trim().to_string(),
                                description: description.trim().to_string(),
                                tags: memory_entry::parse_tags(&tags),
                                image: draft_image,
                            }));
                        }
                    }
                    KeyCode::Tab => focus = (focus + 1) % FORM_FIELDS.len(),
                    KeyCode::BackTab => {
                        focus = (focus + FORM_FIELDS.len() - 1) % FORM_FIELDS.len();
                    }
                    KeyCode::Down => focus = (focus + 1) % FORM_FIELDS.len(),
                    KeyCode::Up => focus = (focus + FORM_FIELDS.len() - 1) % FORM_FIELDS.len(),
                    KeyCode::Enter => {
                        if FORM_FIELDS[focus] == FormField::Description {
                            description.push('\n');
                        } else {
                            focus = (focus + 1) % FORM_FIELDS.len();
                        }
                    }
                    KeyCode::Char(c) => match FORM_FIELDS[focus] {
                        FormField::Title => title.push(c),
                        FormField::Date => date.push(c),
                        FormField::Description => description.push(c),
                        FormField::Tags => tags.push(c),
                        FormField::ImagePath => image_path.push(c),
                    },
                    KeyCode::Backspace => {
                        match FORM_FIELDS[focus] {
                            FormField::Title => title.pop(),
                            FormField::Date => date.pop(),
                            FormField::Description => description.pop(),
                            FormField::Tags => tags.pop(),
                            FormField::ImagePath => image_path.pop(),
                        };
                    }
                    _ => {}
                }
            }
        }
    }

    /// The relive screen: autoplay over the stored collection with shuffle,
    /// reverse, loop, captions, effects, thumbnails and background music.
    pub fn relive(&mut self, store: &MemoryStore) -> Result<()> {
        let entries = store.entries();
        let mut rng = rand::thread_rng();

        if entries.is_empty() {
            self.alert("No memories to relive yet. Add your first memory first!")?;
            return Ok(());
        }

        let mut show = Slideshow::new(entries.len(), Instant::now());
        show.start(Instant::now(), &mut rng);
        let mut music = MusicPlayer::new();
        let mut chrome = true;
        let mut status: Option<String> = None;

        loop {
            let now = Instant::now();
            show.tick(now, &mut rng);
            let phase = show.phase(now);
            self.terminal.draw(|f| {
                draw_relive(f, entries, &show, &music, chrome, status.as_deref(), phase)
            })?;

            if !event::poll(Duration::from_millis(50))? {
                continue;
            }
            if let Event::Key(key) = event::read()? {
                let now = Instant::now();
                match key.code {
                    KeyCode::Esc | KeyCode::Char('q') => break,
                    KeyCode::Char(' ') => {
                        if show.is_playing() {
                            show.stop();
                            music.pause();
                        } else {
                            show.start(now, &mut rng);
                            music.play();
                        }
                    }
                    KeyCode::Right => show.next_manual(now, &mut rng),
                    KeyCode::Left => show.prev_manual(now, &mut rng),
                    KeyCode::Char('s') => show.toggle_shuffle(&mut rng),
                    KeyCode::Char('l') => show.toggle_loop(),
                    KeyCode::Char('r') => show.toggle_reverse(),
                    KeyCode::Char('c') => show.toggle_captions(),
                    KeyCode::Char('f') => chrome = !chrome,
                    KeyCode::Char('d') => match download_current(entries, &show) {
                        Ok(message) => status = Some(message),
                        Err(message) => self.alert(&message)?,
                    },
                    KeyCode::Char('m') => {
                        if let Some(path) = self.prompt_line("Music file path", "")? {
                            let path = path.trim().to_string();
                            if !path.is_empty() {
                                match music.load(Path::new(&path)) {
                                    Ok(()) => {
                                        status = Some(format!(
                                            "Loaded {}",
                                            music.track_name().unwrap_or(path)
                                        ));
                                    }
                                    Err(e) => self.alert(&format!("Could not load music: {e}"))?,
                                }
                            }
                        }
                    }
                    KeyCode::Char('n') => {
                        if let Err(e) = music.toggle() {
                            self.alert(&e.to_string())?;
                        }
                    }
                    KeyCode::Char('L') => {
                        if let Err(e) = music.toggle_loop() {
                            self.alert(&format!("Could not reload music: {e}"))?;
                        }
                    }
                    KeyCode::Char('+') | KeyCode::Char('=') => {
                        music.set_volume(music.volume() + 0.05);
                    }
                    KeyCode::Char('-') => music.set_volume(music.volume() - 0.05),
                    KeyCode::Char('[') => {
                        show.set_interval_ms(show.interval_ms().saturating_sub(500), now);
                    }
                    KeyCode::Char(']') => show.set_interval_ms(show.interval_ms() + 500, now),
                    KeyCode::Char(c @ '1'..='9') => {
                        let idx = c as usize - '1' as usize;
                        if idx < entries.len() {
                            show.jump(idx, now, &mut rng);
                        }
                    }
                    _ => {}
                }
            }
        }

        Ok(())
    }
}

impl Drop for UI {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}

fn memory_card(m: &MemoryEntry) -> ListItem<'static> {
    let mut header = Vec::new();
    if m.favorite {
        header.push(Span::styled("★ ", Style::default().fg(Color::Yellow)));
    }
    header.push(Span::styled(
        m.title.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    ));
    header.push(Span::styled(
        format!("  {}", m.display_date()),
        Style::default().fg(Color::DarkGray),
    ));
    if image::valid_image(&m.image).is_some() {
        header.push(Span::styled("  [image]", Style::default().fg(Color::Green)));
    }

    let description = m.description.lines().next().unwrap_or("").to_string();
    let mut lines = vec![Line::from(header), Line::from(Span::raw(description))];
    if !m.tags.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("Tags: {}", m.tags.join(", ")),
            Style::default().fg(Color::Magenta),
        )));
    }
    lines.push(Line::from(""));
    ListItem::new(lines)
}

fn key_hints(hints: &[(&str, &str)]) -> Line<'static> {
    let mut spans = Vec::new();
    for (i, (key, label)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(
            (*key).to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(format!(" {label}")));
    }
    Line::from(spans)
}

struct FormView {
    heading: &'static str,
    title: String,
    date: String,
    description: String,
    tags: String,
    image_path: String,
    focus: FormField,
    errors: FieldErrors,
    has_original_image: bool,
}

fn draw_form(f: &mut Frame, view: &FormView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(2),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(6),
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Length(2),
            ]
            .as_ref(),
        )
        .split(f.area());

    let heading = Paragraph::new(view.heading)
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    f.render_widget(heading, chunks[0]);

    draw_field(f, chunks[1], "Title", &view.title, view.focus == FormField::Title);
    draw_field_error(f, chunks[2], &view.errors.title);
    draw_field(
        f,
        chunks[3],
        "Date (YYYY-MM-DD)",
        &view.date,
        view.focus == FormField::Date,
    );
    draw_field_error(f, chunks[4], &view.errors.date);
    draw_field(
        f,
        chunks[5],
        "Description",
        &view.description,
        view.focus == FormField::Description,
    );
    draw_field_error(f, chunks[6], &view.errors.description);
    draw_field(
        f,
        chunks[7],
        "Tags (comma-separated)",
        &view.tags,
        view.focus == FormField::Tags,
    );
    let image_title = if view.has_original_image {
        "Image path (leave empty to keep current image)"
    } else {
        "Image path (optional)"
    };
    draw_field(
        f,
        chunks[8],
        image_title,
        &view.image_path,
        view.focus == FormField::ImagePath,
    );
    draw_field_error(f, chunks[9], &view.errors.image);

    let instructions = Paragraph::new("Tab/Up/Down: Switch field, Ctrl+S: Save, Esc: Cancel")
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center);
    f.render_widget(instructions, chunks[10]);
}

fn draw_field(f: &mut Frame, area: Rect, title: &str, value: &str, focused: bool) {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let field = Paragraph::new(value.to_string())
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(title.to_string()),
        );
    f.render_widget(field, area);
}

fn draw_field_error(f: &mut Frame, area: Rect, error: &Option<String>) {
    if let Some(message) = error {
        f.render_widget(
            Paragraph::new(message.clone()).style(Style::default().fg(Color::Red)),
            area,
        );
    }
}

fn effect_color(effect: Effect) -> Color {
    match effect {
        Effect::ZoomIn => Color::Cyan,
        Effect::ZoomOut => Color::Blue,
        Effect::PanLeft => Color::Magenta,
        Effect::PanRight => Color::Green,
        Effect::Fade => Color::Yellow,
    }
}

fn draw_relive(
    f: &mut Frame,
    entries: &[MemoryEntry],
    show: &Slideshow,
    music: &MusicPlayer,
    chrome: bool,
    status: Option<&str>,
    phase: f64,
) {
    let constraints: Vec<Constraint> = if chrome {
        vec![
            Constraint::Min(5),
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Length(3),
        ]
    } else {
        vec![Constraint::Min(5)]
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(constraints)
        .split(f.area());

    draw_slide(f, chunks[0], entries, show);

    if !chrome {
        return;
    }

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(effect_color(show.effect())))
        .ratio(phase)
        .label("");
    f.render_widget(gauge, chunks[1]);

    draw_thumbnails(f, chunks[2], entries, show);

    let mut state_bits = vec![
        if show.is_playing() {
            "playing".to_string()
        } else {
            "paused".to_string()
        },
        format!("every {:.1}s", show.interval_ms() as f64 / 1000.0),
        format!("effect: {}", show.effect().label()),
    ];
    if let Some((pos, total)) = show.position() {
        state_bits.insert(1, format!("{pos}/{total}"));
    }
    if show.shuffle_on() {
        state_bits.push("shuffle".to_string());
    }
    if !show.loop_on() {
        state_bits.push("loop off".to_string());
    }
    if show.reversed() {
        state_bits.push("reverse".to_string());
    }
    if !show.captions_on() {
        state_bits.push("captions off".to_string());
    }
    match music.track_name() {
        Some(name) => state_bits.push(format!(
            "♪ {name} {} {:.0}%{}",
            if music.is_playing() { "playing" } else { "paused" },
            music.volume() * 100.0,
            if music.loop_on() { "" } else { " (no loop)" }
        )),
        None => state_bits.push("♪ none".to_string()),
    }

    let footer = vec![
        Line::from(Span::styled(
            status
                .map(str::to_string)
                .unwrap_or_else(|| state_bits.join("  ·  ")),
            Style::default().fg(Color::DarkGray),
        )),
        key_hints(&[
            ("space", "play/pause"),
            ("←/→", "nav"),
            ("s", "shuffle"),
            ("l", "loop"),
            ("r", "reverse"),
            ("c", "captions"),
            ("f", "fullscreen"),
            ("d", "download"),
            ("m", "music"),
            ("n", "music play"),
            ("L", "music loop"),
            ("+/-", "volume"),
            ("[/]", "speed"),
            ("q", "back"),
        ]),
    ];
    f.render_widget(
        Paragraph::new(footer)
            .style(Style::default().fg(Color::Yellow))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        chunks[3],
    );
}

fn draw_slide(f: &mut Frame, area: Rect, entries: &[MemoryEntry], show: &Slideshow) {
    let Some(idx) = show.current_index() else {
        f.render_widget(
            Paragraph::new("…")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL)),
            area,
        );
        return;
    };
    let memory = &entries[idx];
    let accent = effect_color(show.effect());

    let mut lines = Vec::new();
    match image::valid_image(&memory.image) {
        Some(_) => lines.push(Line::from(Span::styled(
            "▞▚ photo ▞▚",
            Style::default().fg(accent),
        ))),
        None => lines.push(Line::from(Span::styled(
            "░▒▓ gradient backdrop ▓▒░",
            Style::default().fg(Color::DarkGray),
        ))),
    }
    lines.push(Line::from(""));

    if show.captions_on() {
        lines.push(Line::from(Span::styled(
            memory.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            memory.display_date(),
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::from(""));
        for text_line in memory.description.lines() {
            lines.push(Line::from(text_line.to_string()));
        }
        if !memory.tags.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                memory.tags.join(" · "),
                Style::default().fg(Color::Magenta),
            )));
        }
    }

    let slide = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent)),
        );
    f.render_widget(slide, area);
}

fn draw_thumbnails(f: &mut Frame, area: Rect, entries: &[MemoryEntry], show: &Slideshow) {
    let active = show.current_index();
    let mut spans = Vec::new();
    for (idx, memory) in entries.iter().enumerate() {
        let label = format!(" {}:{} ", idx + 1, truncate_to_width(&memory.title, 12));
        let style = if active == Some(idx) {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(label, style));
        spans.push(Span::raw(" "));
    }
    f.render_widget(
        Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn truncate_to_width(text: &str, max_width: usize) -> String {
    let mut out = String::new();
    let mut width = 0;
    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > max_width {
            break;
        }
        out.push(ch);
        width += ch_width;
    }
    out
}

/// Writes the current slide's image to the downloads directory. `Err` carries
/// the user-visible message for slides with no valid image.
fn download_current(
    entries: &[MemoryEntry],
    show: &Slideshow,
) -> std::result::Result<String, String> {
    let Some(idx) = show.current_index() else {
        return Err("No slide to download".to_string());
    };
    let memory = &entries[idx];
    let bytes = image::valid_image(&memory.image)
        .and_then(image::decode_data_url)
        .ok_or_else(|| "This slide has no image to download".to_string())?;
    let dir = dirs::download_dir().unwrap_or_else(|| PathBuf::from("."));
    let path = dir.join(image::download_file_name(&memory.title));
    std::fs::write(&path, bytes).map_err(|e| format!("Could not save image: {e}"))?;
    Ok(format!("Saved image to {}", path.display()))
}
