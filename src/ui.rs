use anyhow::Result;
use car_inventory::{Car, CarForm};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

const LABEL_WIDTH: u16 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Brand,
    Model,
    Year,
    Price,
    Table,
}

impl Focus {
    pub const FIELDS: [Focus; 4] = [Focus::Brand, Focus::Model, Focus::Year, Focus::Price];

    pub fn next(&self) -> Self {
        match self {
            Focus::Brand => Focus::Model,
            Focus::Model => Focus::Year,
            Focus::Year => Focus::Price,
            Focus::Price => Focus::Table,
            Focus::Table => Focus::Brand,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Focus::Brand => Focus::Table,
            Focus::Model => Focus::Brand,
            Focus::Year => Focus::Model,
            Focus::Price => Focus::Year,
            Focus::Table => Focus::Price,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Focus::Brand => "brand",
            Focus::Model => "model",
            Focus::Year => "year",
            Focus::Price => "price",
            Focus::Table => "cars",
        }
    }
}

pub struct App {
    pub form: CarForm,
    pub focus: Focus,
    pub state: TableState,
    pub should_quit: bool,
}

impl App {
    pub fn new(form: CarForm) -> Self {
        let mut app = Self {
            form,
            focus: Focus::Brand,
            state: TableState::default(),
            should_quit: false,
        };
        app.clamp_selection();
        app
    }

    pub fn selected_car(&self) -> Option<&Car> {
        self.state.selected().and_then(|i| self.form.cars().get(i))
    }

    /// Id handed to the delete command; `None` when no row is selected.
    pub fn selected_id(&self) -> Option<i64> {
        self.selected_car().map(|car| car.id)
    }

    fn field_mut(&mut self, focus: Focus) -> Option<&mut String> {
        let input = &mut self.form.input;
        match focus {
            Focus::Brand => Some(&mut input.brand),
            Focus::Model => Some(&mut input.model),
            Focus::Year => Some(&mut input.year),
            Focus::Price => Some(&mut input.price),
            Focus::Table => None,
        }
    }

    fn field(&self, focus: Focus) -> &str {
        let input = &self.form.input;
        match focus {
            Focus::Brand => input.brand.as_str(),
            Focus::Model => input.model.as_str(),
            Focus::Year => input.year.as_str(),
            Focus::Price => input.price.as_str(),
            Focus::Table => "",
        }
    }

    pub fn submit_add(&mut self) {
        if self.form.submit_add().is_ok() {
            self.focus = Focus::Brand;
            // Highlight the row just added (appended by rowid order)
            let len = self.form.cars().len();
            self.state.select(len.checked_sub(1));
        }
        self.clamp_selection();
    }

    pub fn delete_selected(&mut self) {
        let selected = self.selected_id();
        if self.form.submit_delete(selected).is_ok() {
            self.clamp_selection();
        }
    }

    pub fn reload(&mut self) {
        if self.form.reload().is_ok() {
            self.form.clear_notice();
        }
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let len = self.form.cars().len();
        let selected = match self.state.selected() {
            _ if len == 0 => None,
            Some(i) if i >= len => Some(len - 1),
            Some(i) => Some(i),
            None => Some(0),
        };
        self.state.select(selected);
    }

    pub fn next(&mut self) {
        let len = self.form.cars().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.form.cars().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Esc
            || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
        {
            self.should_quit = true;
            return;
        }

        match key.code {
            KeyCode::Tab => {
                self.focus = self.focus.next();
                return;
            }
            KeyCode::BackTab => {
                self.focus = self.focus.previous();
                return;
            }
            KeyCode::F(5) => {
                self.reload();
                return;
            }
            _ => {}
        }

        if self.focus == Focus::Table {
            match key.code {
                KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Down | KeyCode::Char('j') => self.next(),
                KeyCode::Up | KeyCode::Char('k') => self.previous(),
                KeyCode::Home => {
                    if !self.form.cars().is_empty() {
                        self.state.select(Some(0));
                    }
                }
                KeyCode::End => {
                    let len = self.form.cars().len();
                    self.state.select(len.checked_sub(1));
                }
                KeyCode::Char('d') | KeyCode::Delete => self.delete_selected(),
                _ => {}
            }
            return;
        }

        let focus = self.focus;
        match key.code {
            KeyCode::Enter => self.submit_add(),
            KeyCode::Up => self.focus = focus.previous(),
            KeyCode::Down => self.focus = focus.next(),
            KeyCode::Backspace => {
                if let Some(field) = self.field_mut(focus) {
                    field.pop();
                }
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                if let Some(field) = self.field_mut(focus) {
                    field.push(c);
                }
            }
            _ => {}
        }
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    while !app.should_quit {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                app.handle_key(key);
            }
        }
    }
    Ok(())
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(6), // Input fields
            Constraint::Min(0),    // Car table
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);
    render_fields(f, chunks[1], app);
    render_table(f, chunks[2], app);
    render_status_bar(f, chunks[3], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let header_text = vec![Line::from(vec![
        Span::styled(
            "car management system",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("Cars: {}", app.form.cars().len()),
            Style::default().fg(Color::White),
        ),
        Span::raw("  |  "),
        Span::styled(
            app.form.store().path().display().to_string(),
            Style::default().fg(Color::DarkGray),
        ),
    ])];

    let header = Paragraph::new(header_text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(header, area);
}

fn render_fields(f: &mut Frame, area: Rect, app: &App) {
    let lines: Vec<Line> = Focus::FIELDS
        .iter()
        .map(|field| {
            let focused = *field == app.focus;
            let label_style = if focused {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Line::from(vec![
                Span::styled(
                    format!("{:<width$}", field.title(), width = LABEL_WIDTH as usize),
                    label_style,
                ),
                Span::raw(app.field(*field).to_string()),
            ])
        })
        .collect();

    let border_color = if app.focus == Focus::Table {
        Color::White
    } else {
        Color::Yellow
    };
    let fields = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .title(" add car (Enter) "),
    );
    f.render_widget(fields, area);

    if let Some(row) = Focus::FIELDS.iter().position(|field| *field == app.focus) {
        let typed = app.field(app.focus).chars().count() as u16;
        f.set_cursor(area.x + 1 + LABEL_WIDTH + typed, area.y + 1 + row as u16);
    }
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["id", "brand", "model", "year", "price"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.form.cars().iter().map(|car| {
        let cells = vec![
            Cell::from(car.id.to_string()),
            Cell::from(truncate(&car.brand, 24)),
            Cell::from(truncate(&car.model, 30)),
            Cell::from(car.year.to_string()),
            Cell::from(format!("{:.2}", car.price)).style(Style::default().fg(Color::Green)),
        ];

        Row::new(cells).height(1)
    });

    let border_color = if app.focus == Focus::Table {
        Color::Yellow
    } else {
        Color::White
    };
    let table = Table::new(
        rows,
        [
            Constraint::Length(8),
            Constraint::Length(26),
            Constraint::Length(32),
            Constraint::Length(6),
            Constraint::Length(14),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .title(" cars "),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = Vec::new();

    if let Some(notice) = app.form.notice() {
        let color = if notice.is_error() {
            Color::Red
        } else {
            Color::Green
        };
        status_spans.push(Span::styled(
            format!(" {} ", notice.text()),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
        status_spans.push(Span::raw("|"));
    }

    status_spans.push(Span::raw(" "));
    status_spans.push(Span::styled("Tab", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Focus | "));
    status_spans.push(Span::styled("Enter", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Add | "));
    status_spans.push(Span::styled("d", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Delete | "));
    status_spans.push(Span::styled("F5", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Reload | "));
    status_spans.push(Span::styled("Esc", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use car_inventory::CarStore;
    use ratatui::backend::TestBackend;
    use tempfile::TempDir;

    fn temp_app() -> (TempDir, App) {
        let dir = TempDir::new().unwrap();
        let store = CarStore::open(dir.path().join("cars.db")).unwrap();
        let app = App::new(CarForm::load(store).unwrap());
        (dir, app)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn add_car(app: &mut App, fields: [&str; 4]) {
        app.focus = Focus::Brand;
        for (i, value) in fields.iter().enumerate() {
            type_text(app, value);
            if i < 3 {
                press(app, KeyCode::Tab);
            }
        }
        press(app, KeyCode::Enter);
    }

    #[test]
    fn test_focus_cycles_both_ways() {
        let mut focus = Focus::Brand;
        for _ in 0..5 {
            focus = focus.next();
        }
        assert_eq!(focus, Focus::Brand);
        assert_eq!(Focus::Brand.previous(), Focus::Table);
    }

    #[test]
    fn test_typing_and_submitting_adds_car() {
        let (_dir, mut app) = temp_app();

        add_car(&mut app, ["Toyota", "Corolla", "2020", "24999.99"]);

        assert_eq!(app.form.cars().len(), 1);
        assert_eq!(app.selected_car().unwrap().brand, "Toyota");
        assert_eq!(app.focus, Focus::Brand);
        assert!(app.form.input.brand.is_empty());
    }

    #[test]
    fn test_backspace_edits_focused_field() {
        let (_dir, mut app) = temp_app();
        type_text(&mut app, "Fordd");
        press(&mut app, KeyCode::Backspace);

        assert_eq!(app.form.input.brand, "Ford");
    }

    #[test]
    fn test_rejected_add_keeps_fields() {
        let (_dir, mut app) = temp_app();

        add_car(&mut app, ["Toyota", "Corolla", "1800", "1"]);

        assert!(app.form.cars().is_empty());
        assert_eq!(app.form.input.year, "1800");
        assert_eq!(
            app.form.notice().unwrap().text(),
            "year must be between 1900 and 2026"
        );
    }

    #[test]
    fn test_delete_with_empty_table_asks_for_selection() {
        let (_dir, mut app) = temp_app();
        app.focus = Focus::Table;

        press(&mut app, KeyCode::Char('d'));

        assert_eq!(app.form.notice().unwrap().text(), "please select a car first");
    }

    #[test]
    fn test_delete_selected_row() {
        let (_dir, mut app) = temp_app();
        add_car(&mut app, ["Toyota", "Corolla", "2020", "1"]);
        add_car(&mut app, ["Honda", "Civic", "2019", "1"]);
        app.focus = Focus::Table;
        press(&mut app, KeyCode::Home);

        press(&mut app, KeyCode::Delete);

        assert_eq!(app.form.cars().len(), 1);
        assert_eq!(app.form.cars()[0].brand, "Honda");
        assert_eq!(app.state.selected(), Some(0));
    }

    #[test]
    fn test_navigation_wraps() {
        let (_dir, mut app) = temp_app();
        add_car(&mut app, ["Toyota", "Corolla", "2020", "1"]);
        add_car(&mut app, ["Honda", "Civic", "2019", "1"]);
        app.focus = Focus::Table;
        app.state.select(Some(1));

        press(&mut app, KeyCode::Down);
        assert_eq!(app.state.selected(), Some(0));
        press(&mut app, KeyCode::Up);
        assert_eq!(app.state.selected(), Some(1));
    }

    #[test]
    fn test_q_only_quits_from_table() {
        let (_dir, mut app) = temp_app();
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
        assert_eq!(app.form.input.brand, "q");

        app.focus = Focus::Table;
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_escape_quits() {
        let (_dir, mut app) = temp_app();
        press(&mut app, KeyCode::Esc);
        assert!(app.should_quit);
    }

    #[test]
    fn test_render_shows_cars_and_notice() {
        let (_dir, mut app) = temp_app();
        add_car(&mut app, ["Toyota", "Corolla", "2020", "24999.99"]);
        add_car(&mut app, ["Toyota", "Corolla", "2020", "1"]);

        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|f| ui(f, &mut app)).unwrap();

        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(screen.contains("Corolla"));
        assert!(screen.contains("24999.99"));
        assert!(screen.contains("this car already exists"));
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("Citroën", 10), "Citroën");
        assert_eq!(truncate("Mercedes Benz", 8), "Merce...");
    }
}
