use std::io;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs, Wrap};

use voltrix_admin::api::ApiClient;
use voltrix_admin::config::Config;
use voltrix_admin::forms::{Form, GroupForm, MatchForm, TournamentForm};
use voltrix_admin::logging;
use voltrix_admin::model::EntityId;
use voltrix_admin::session::{Guard, SessionStore, default_session_path};
use voltrix_admin::state::{AppState, Command, Delta, InputMode, Screen, apply_delta};
use voltrix_admin::views::{
    DetailBody, DetailTab, LoadState, group_choice_label, group_rows, match_rows,
    overview_fields, player_rows, stage_choice_label, stage_rows, team_rows, tournament_rows,
};
use voltrix_admin::worker;

#[derive(Parser)]
#[command(name = "voltrix_admin", version, about = "Terminal control room for PUBG Mobile tournaments")]
struct Cli {
    /// Open this tournament's detail screen on start.
    #[arg(long, value_name = "ID", allow_negative_numbers = true)]
    tournament: Option<EntityId>,

    #[command(subcommand)]
    command: Option<SessionCommand>,
}

#[derive(Subcommand)]
enum SessionCommand {
    /// Store a bearer token for the dashboard.
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        token: String,
    },
    /// Forget the stored token.
    Logout,
    /// Show who is signed in.
    Whoami,
}

struct App {
    state: AppState,
    session: Arc<SessionStore>,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<Command>>,
}

impl App {
    fn new(
        session: Arc<SessionStore>,
        cmd_tx: Option<mpsc::Sender<Command>>,
        export_path: String,
        start_tournament: Option<EntityId>,
    ) -> Self {
        let state = AppState::new(session.display_name(), export_path);
        let mut app = Self {
            state,
            session,
            should_quit: false,
            cmd_tx,
        };
        if app.session.guard() == Guard::Allow {
            let cmd = match start_tournament {
                Some(id) => app.state.open_tournament(id),
                None => app.state.enter_screen(Screen::Overview),
            };
            app.send(cmd);
        }
        app
    }

    fn send(&mut self, cmd: Option<Command>) {
        let Some(cmd) = cmd else {
            return;
        };
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[WARN] Worker unavailable");
            return;
        };
        if tx.send(cmd).is_err() {
            self.state.push_log("[WARN] Worker stopped; request dropped");
        }
    }

    fn go(&mut self, screen: Screen) {
        if self.session.guard() == Guard::RedirectToLogin {
            self.state.logout(&self.session.display_name());
            self.state.push_log("[WARN] Session missing, sign in again");
            return;
        }
        let cmd = self.state.enter_screen(screen);
        self.send(cmd);
    }

    fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        if self.state.help_overlay {
            match key.code {
                KeyCode::Char('?') | KeyCode::Esc => self.state.help_overlay = false,
                KeyCode::Char('q') => self.should_quit = true,
                _ => {}
            }
            return;
        }
        if self.state.screen == Screen::Login {
            self.on_login_key(key);
            return;
        }
        if self.state.input_mode == InputMode::Form {
            self.on_form_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') => self.go(Screen::Overview),
            KeyCode::Char('2') => self.go(Screen::Tournaments),
            KeyCode::Char('3') => self.go(Screen::Teams),
            KeyCode::Char('4') => self.go(Screen::Players),
            KeyCode::Char('5') => self.go(Screen::Live),
            KeyCode::Enter => {
                if self.state.screen == Screen::Tournaments {
                    let cmd = self.state.open_selected_tournament();
                    self.send(cmd);
                }
            }
            KeyCode::Char('b') | KeyCode::Esc => match self.state.screen {
                Screen::TournamentDetail => self.go(Screen::Tournaments),
                Screen::Overview => {}
                _ => self.go(Screen::Overview),
            },
            KeyCode::Char('j') | KeyCode::Down => self.state.move_selection(true),
            KeyCode::Char('k') | KeyCode::Up => self.state.move_selection(false),
            KeyCode::Char('l') | KeyCode::Right | KeyCode::Tab => self.state.cycle_tab(true),
            KeyCode::Char('h') | KeyCode::Left | KeyCode::BackTab => self.state.cycle_tab(false),
            KeyCode::Char('n') => {
                if self.state.has_form() {
                    self.state.input_mode = InputMode::Form;
                }
            }
            KeyCode::Char('r') => {
                let cmd = self.state.start_load();
                self.send(cmd);
            }
            KeyCode::Char('x') => {
                let cmd = self.state.export_roster();
                if cmd.is_some() {
                    self.state.push_log("[INFO] Roster export started");
                }
                self.send(cmd);
            }
            KeyCode::Char('O') => self.logout(),
            KeyCode::Char('?') => self.state.help_overlay = true,
            _ => {}
        }
    }

    fn on_form_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.state.input_mode = InputMode::Browse,
            KeyCode::Enter => {
                let cmd = self.state.submit_form();
                self.send(cmd);
            }
            KeyCode::Left => self.state.cycle_selector(false),
            KeyCode::Right => self.state.cycle_selector(true),
            code => edit_form(self.state.active_form_mut(), code),
        }
    }

    fn on_login_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Enter => self.login(),
            code => edit_form(Some(&mut self.state.login), code),
        }
    }

    fn login(&mut self) {
        let Some((token, username)) = self.state.login.credentials() else {
            return;
        };
        match self.session.save(&token, &username) {
            Ok(()) => {
                let cmd = self.state.login_succeeded(&username);
                self.send(cmd);
            }
            Err(err) => {
                log::error!("saving session failed: {err:#}");
                self.state.push_log(format!("[WARN] Could not save session: {err}"));
            }
        }
    }

    fn logout(&mut self) {
        if let Err(err) = self.session.clear() {
            log::warn!("clearing session failed: {err:#}");
        }
        self.state.logout(&self.session.display_name());
    }
}

fn edit_form(form: Option<&mut dyn Form>, code: KeyCode) {
    let Some(form) = form else {
        return;
    };
    match code {
        KeyCode::Tab | KeyCode::Down => form.focus_next(),
        KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
        KeyCode::Backspace => form.backspace(),
        KeyCode::Char(c) => form.input_char(c),
        _ => {}
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let cli = Cli::parse();
    if let Some(command) = cli.command {
        logging::init_stderr_logger();
        return run_session_command(command);
    }

    let config = Config::from_env()?;
    logging::init_file_logger(&config.log_path)?;
    log::info!("dashboard starting against {}", config.api_base);

    let session = Arc::new(SessionStore::open(config.session_path.clone()));
    let api: Arc<dyn voltrix_admin::api::Backend> =
        Arc::new(ApiClient::new(&config.api_base, session.clone())?);

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    worker::spawn_worker(api, tx, cmd_rx);

    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new(session, Some(cmd_tx), config.export_path, cli.tournament);
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        log::error!("dashboard loop failed: {err}");
        eprintln!("error: {err}");
    }
    log::info!("dashboard stopped");
    Ok(())
}

fn run_session_command(command: SessionCommand) -> Result<()> {
    let session = SessionStore::open(default_session_path());
    match command {
        SessionCommand::Login { username, token } => {
            if username.trim().is_empty() || token.trim().is_empty() {
                anyhow::bail!("username and token must not be empty");
            }
            session.save(token.trim(), username.trim())?;
            println!("Signed in as {}", username.trim());
        }
        SessionCommand::Logout => {
            session.clear()?;
            println!("Signed out");
        }
        SessionCommand::Whoami => match session.guard() {
            Guard::Allow => println!("{}", session.display_name()),
            Guard::RedirectToLogin => println!("Not signed in"),
        },
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.on_key(key);
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    if app.state.screen == Screen::Login {
        render_login(frame, chunks[1], &app.state);
    } else {
        let body = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(5)])
            .split(chunks[1]);
        match app.state.screen {
            Screen::Overview => render_overview(frame, body[0]),
            Screen::Tournaments => render_tournaments(frame, body[0], &app.state),
            Screen::TournamentDetail => render_detail(frame, body[0], &app.state),
            Screen::Teams => render_teams(frame, body[0], &app.state),
            Screen::Players => render_players(frame, body[0], &app.state),
            Screen::Live => render_live(frame, body[0]),
            Screen::Login => {}
        }
        let console = Paragraph::new(console_text(&app.state))
            .block(Block::default().title("Console").borders(Borders::ALL));
        frame.render_widget(console, body[1]);
    }

    let footer = Paragraph::new(footer_text(&app.state))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[2]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let line1 = format!(
        " /\\  /  VOLTRIX ADMIN | {} | {}",
        state.screen.title(),
        state.username
    );
    let line2 = " \\ \\/   PUBG MOBILE · PRODUCTION PANEL".to_string();
    format!("{line1}\n{line2}")
}

fn footer_text(state: &AppState) -> String {
    if state.screen == Screen::Login {
        return "Tab Next field | Enter Sign in | Esc Quit".to_string();
    }
    if state.input_mode == InputMode::Form {
        return "Type to edit | Tab/Shift-Tab Field | ←/→ Select | Enter Submit | Esc Leave form"
            .to_string();
    }
    match state.screen {
        Screen::Tournaments => {
            "1-5 Screens | j/k Move | Enter Open | n New tournament | r Reload | O Logout | ? Help | q Quit".to_string()
        }
        Screen::TournamentDetail => {
            "b Back | h/l Tabs | j/k Move | n Edit form | r Reload | ? Help | q Quit".to_string()
        }
        Screen::Teams => {
            "1-5 Screens | j/k Move | n New team | r Reload | O Logout | ? Help | q Quit".to_string()
        }
        Screen::Players => {
            "1-5 Screens | j/k Move | x Export roster | r Reload | O Logout | ? Help | q Quit"
                .to_string()
        }
        _ => "1 Overview | 2 Tournaments | 3 Teams | 4 Players | 5 Live | O Logout | ? Help | q Quit"
            .to_string(),
    }
}

fn render_login(frame: &mut Frame, area: Rect, state: &AppState) {
    let popup = centered_rect(50, 40, area);
    let masked = "*".repeat(state.login.token.chars().count());
    let lines = form_lines(
        state.login.labels(),
        &[state.login.username.clone(), masked],
        None,
        state.login.focus,
        true,
    );
    let mut text = vec![
        Line::from("Paste the operator token issued by the production server."),
        Line::from(""),
    ];
    text.extend(lines);
    let login = Paragraph::new(text)
        .block(Block::default().title("Sign in").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    frame.render_widget(login, popup);
}

fn render_overview(frame: &mut Frame, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(1)])
        .split(area);
    let intro = Paragraph::new(
        "Manage PUBG Mobile tournaments, teams and live production overlays from one panel.",
    )
    .style(Style::default().fg(Color::Gray));
    frame.render_widget(intro, rows[0]);

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(rows[1]);
    let content = [
        (
            "Tournaments",
            "Create, configure and schedule PUBG Mobile tournaments from one place.",
            "2  Open tournaments",
        ),
        (
            "Teams & Players",
            "Maintain team tags, rosters and player IDs ready for production.",
            "3  Manage teams",
        ),
        (
            "Live Production",
            "Connect observer tools, killfeed and casting overlays.",
            "5  Live tools",
        ),
    ];
    for (area, (title, description, link)) in cards.iter().zip(content) {
        render_card(frame, *area, title, description, Some(link));
    }
}

fn render_live(frame: &mut Frame, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Ratio(1, 2),
            Constraint::Ratio(1, 2),
        ])
        .split(area);
    let intro = Paragraph::new("Connect observer tools, killfeed and casting overlays from one panel.")
        .style(Style::default().fg(Color::Gray));
    frame.render_widget(intro, rows[0]);

    let cards = [
        ("Observer Overlay", "Coming soon…"),
        ("Killfeed Controller", "Coming soon…"),
        ("Scorebug & Lower Thirds", "Coming soon…"),
        ("WebSocket Status", "Live server: ws://localhost:4000"),
    ];
    for (row_idx, pair) in cards.chunks(2).enumerate() {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)])
            .split(rows[row_idx + 1]);
        for (area, (title, description)) in cols.iter().zip(pair) {
            render_card(frame, *area, title, description, None);
        }
    }
}

fn render_card(frame: &mut Frame, area: Rect, title: &str, description: &str, link: Option<&str>) {
    let mut text = vec![Line::from(description.to_string())];
    if let Some(link) = link {
        text.push(Line::from(""));
        text.push(Line::from(Span::styled(
            link.to_string(),
            Style::default().fg(Color::Cyan),
        )));
    }
    let card = Paragraph::new(text)
        .block(Block::default().title(title.to_string()).borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    frame.render_widget(card, area);
}

/// Renders the non-ready states of a load; returns the data once ready.
fn render_load_state<'a, T>(frame: &mut Frame, area: Rect, load: &'a LoadState<T>) -> Option<&'a T> {
    let message = match load {
        LoadState::Ready(data) => return Some(data),
        LoadState::Idle => Paragraph::new("Press r to load").style(dim()),
        LoadState::Loading => Paragraph::new("Loading…").style(dim()),
        LoadState::Error(message) => {
            Paragraph::new(message.as_str()).style(Style::default().fg(Color::Red))
        }
    };
    frame.render_widget(message.block(Block::default().borders(Borders::ALL)), area);
    None
}

/// Splits off a one-line banner row when `banner` is set.
fn with_banner(frame: &mut Frame, area: Rect, banner: Option<&String>) -> Rect {
    let Some(banner) = banner else {
        return area;
    };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);
    let text = Paragraph::new(banner.as_str())
        .style(Style::default().fg(Color::White).bg(Color::Red));
    frame.render_widget(text, rows[0]);
    rows[1]
}

fn split_with_form(area: Rect) -> (Rect, Rect) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(30), Constraint::Length(38)])
        .split(area);
    (cols[0], cols[1])
}

fn render_tournaments(frame: &mut Frame, area: Rect, state: &AppState) {
    let view = &state.tournaments;
    let Some(items) = render_load_state(frame, area, &view.load) else {
        return;
    };
    let area = with_banner(frame, area, view.banner.as_ref());
    let (list_area, form_area) = split_with_form(area);

    render_table(
        frame,
        list_area,
        "Tournaments",
        ["Name", "Timezone", "Format"],
        [Constraint::Min(20), Constraint::Length(16), Constraint::Length(10)],
        &tournament_rows(items),
        view.selected,
        "No tournaments found yet.",
    );

    let form = &view.form;
    let values = [
        form.name.clone(),
        form.timezone.clone(),
        form.format.label().to_string(),
    ];
    render_form(
        frame,
        form_area,
        "Create tournament",
        form_lines(
            form.labels(),
            &values,
            Some(TournamentForm::FORMAT_FIELD),
            form.focus,
            state.input_mode == InputMode::Form,
        ),
        view.create_in_flight(),
    );
}

fn render_teams(frame: &mut Frame, area: Rect, state: &AppState) {
    let view = &state.teams;
    let Some(items) = render_load_state(frame, area, &view.load) else {
        return;
    };
    let area = with_banner(frame, area, view.banner.as_ref());
    let (list_area, form_area) = split_with_form(area);

    render_table(
        frame,
        list_area,
        "Teams",
        ["Tag", "Name", "Country"],
        [Constraint::Length(8), Constraint::Min(20), Constraint::Length(10)],
        &team_rows(items),
        view.selected,
        "No teams yet.",
    );

    let form = &view.form;
    let values = [form.tag.clone(), form.name.clone(), form.country.clone()];
    render_form(
        frame,
        form_area,
        "Create team",
        form_lines(
            form.labels(),
            &values,
            None,
            form.focus,
            state.input_mode == InputMode::Form,
        ),
        view.create_in_flight(),
    );
}

fn render_players(frame: &mut Frame, area: Rect, state: &AppState) {
    let view = &state.players;
    let Some(roster) = render_load_state(frame, area, &view.load) else {
        return;
    };
    render_table(
        frame,
        area,
        "Players",
        ["IGN", "PUBG ID", "Team", "Country"],
        [
            Constraint::Min(16),
            Constraint::Length(14),
            Constraint::Length(8),
            Constraint::Length(10),
        ],
        &player_rows(roster),
        view.selected,
        "No players yet.",
    );
}

fn render_detail(frame: &mut Frame, area: Rect, state: &AppState) {
    let view = &state.detail;
    let (tournament, bundle) = match view.body() {
        DetailBody::Ready(tournament, bundle) => (tournament, bundle),
        DetailBody::InvalidId => {
            render_notice(frame, area, "Invalid tournament id.", Color::Red);
            return;
        }
        DetailBody::Loading => {
            render_notice(frame, area, "Loading tournament…", Color::DarkGray);
            return;
        }
        DetailBody::Failed(message) => {
            render_notice(frame, area, message, Color::Red);
            return;
        }
        DetailBody::NotFound => {
            render_notice(frame, area, "Tournament not found.", Color::Yellow);
            return;
        }
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let titles: Vec<&str> = DetailTab::ALL.iter().map(|tab| tab.label()).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .title(format!("{} (ID {})", tournament.name, tournament.id))
                .borders(Borders::ALL),
        )
        .select(view.tab.index())
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, rows[0]);

    let body = with_banner(frame, rows[1], view.banner.as_ref());
    let editing = state.input_mode == InputMode::Form;
    match view.tab {
        DetailTab::Overview => {
            let description = tournament
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .unwrap_or("No description yet.");
            let mut text = vec![
                Line::from(Span::styled(
                    tournament.name.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(description.to_string()),
                Line::from(""),
            ];
            for (label, value) in overview_fields(tournament) {
                text.push(Line::from(format!("{label:<12} {value}")));
            }
            text.push(Line::from(""));
            text.push(Line::from(format!(
                "{} stages · {} groups · {} matches",
                bundle.stages.len(),
                bundle.groups.len(),
                bundle.matches.len()
            )));
            let overview = Paragraph::new(text)
                .block(Block::default().title("Overview").borders(Borders::ALL))
                .wrap(Wrap { trim: true });
            frame.render_widget(overview, body);
        }
        DetailTab::Stages => {
            let (list_area, form_area) = split_with_form(body);
            render_table(
                frame,
                list_area,
                "Stages",
                ["Order", "Name", "Type", "ID"],
                [
                    Constraint::Length(6),
                    Constraint::Min(16),
                    Constraint::Length(12),
                    Constraint::Length(8),
                ],
                &stage_rows(&bundle.stages),
                view.selected,
                "No stages yet.",
            );
            let form = &view.stage_form;
            render_form(
                frame,
                form_area,
                "Create stage",
                form_lines(
                    form.labels(),
                    &[form.name.clone(), form.kind.clone()],
                    None,
                    form.focus,
                    editing,
                ),
                view.create_in_flight(),
            );
        }
        DetailTab::Groups => {
            let (list_area, form_area) = split_with_form(body);
            render_table(
                frame,
                list_area,
                "Groups",
                ["Name", "Code", "Stage", "ID"],
                [
                    Constraint::Min(14),
                    Constraint::Length(6),
                    Constraint::Length(16),
                    Constraint::Length(8),
                ],
                &group_rows(bundle),
                view.selected,
                "No groups yet.",
            );
            let form = &view.group_form;
            let values = [
                stage_choice_label(Some(bundle), form.stage_id),
                form.name.clone(),
            ];
            render_form(
                frame,
                form_area,
                "Create group",
                form_lines(
                    form.labels(),
                    &values,
                    Some(GroupForm::STAGE_FIELD),
                    form.focus,
                    editing,
                ),
                view.create_in_flight(),
            );
        }
        DetailTab::Matches => {
            let (list_area, form_area) = split_with_form(body);
            render_table(
                frame,
                list_area,
                "Matches",
                ["Name", "Map", "Group", "ID"],
                [
                    Constraint::Min(14),
                    Constraint::Length(10),
                    Constraint::Length(14),
                    Constraint::Length(8),
                ],
                &match_rows(bundle),
                view.selected,
                "No matches yet.",
            );
            let form = &view.match_form;
            let values = [
                group_choice_label(Some(bundle), form.group_id),
                form.name.clone(),
            ];
            render_form(
                frame,
                form_area,
                "Create match",
                form_lines(
                    form.labels(),
                    &values,
                    Some(MatchForm::GROUP_FIELD),
                    form.focus,
                    editing,
                ),
                view.create_in_flight(),
            );
        }
    }
}

fn render_notice(frame: &mut Frame, area: Rect, text: &str, color: Color) {
    let notice = Paragraph::new(text.to_string())
        .style(Style::default().fg(color))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(notice, area);
}

#[allow(clippy::too_many_arguments)]
fn render_table<const N: usize>(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    headers: [&str; N],
    widths: [Constraint; N],
    rows: &[[String; N]],
    selected: usize,
    empty: &str,
) {
    let block = Block::default()
        .title(format!("{title} ({})", rows.len()))
        .borders(Borders::ALL);
    if rows.is_empty() {
        let empty = Paragraph::new(empty.to_string()).style(dim()).block(block);
        frame.render_widget(empty, area);
        return;
    }

    let visible = area.height.saturating_sub(3) as usize;
    let (start, end) = visible_range(selected, rows.len(), visible.max(1));
    let body = rows[start..end].iter().enumerate().map(|(offset, row)| {
        let style = if start + offset == selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        Row::new(row.iter().map(|cell| Cell::from(cell.clone()))).style(style)
    });
    let table = Table::new(body, widths)
        .header(Row::new(headers).style(Style::default().add_modifier(Modifier::BOLD)))
        .block(block);
    frame.render_widget(table, area);
}

fn form_lines(
    labels: &[&str],
    values: &[String],
    selector: Option<usize>,
    focus: usize,
    editing: bool,
) -> Vec<Line<'static>> {
    labels
        .iter()
        .zip(values)
        .enumerate()
        .map(|(idx, (label, value))| {
            let focused = editing && idx == focus;
            let shown = if selector == Some(idx) {
                format!("‹ {value} ›")
            } else if focused {
                format!("{value}_")
            } else {
                value.clone()
            };
            let style = if focused {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(format!("{label:<16}"), dim()),
                Span::styled(shown, style),
            ])
        })
        .collect()
}

fn render_form(frame: &mut Frame, area: Rect, title: &str, mut lines: Vec<Line<'static>>, busy: bool) {
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        if busy { "Saving…" } else { "n edit · Enter submit" },
        dim(),
    )));
    let form = Paragraph::new(lines)
        .block(Block::default().title(title.to_string()).borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    frame.render_widget(form, area);
}

fn dim() -> Style {
    Style::default().fg(Color::DarkGray)
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    let skip = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(skip)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Voltrix Admin - Help",
        "",
        "Screens:",
        "  1            Control room",
        "  2            Tournaments",
        "  3            Teams",
        "  4            Players",
        "  5            Live production",
        "",
        "Lists:",
        "  j/k or ↑/↓   Move",
        "  Enter        Open tournament",
        "  b / Esc      Back",
        "  h/l or Tab   Switch tournament tabs",
        "  r            Reload",
        "  x            Export roster (players)",
        "",
        "Forms:",
        "  n            Edit the create form",
        "  Tab          Next field",
        "  ←/→          Change selection",
        "  Enter        Submit",
        "  Esc          Leave form",
        "",
        "  O            Sign out",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
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

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
