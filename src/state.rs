use std::collections::VecDeque;

use crate::api::RequestFailed;
use crate::export::ExportReport;
use crate::forms::{Form, LoginForm, TournamentForm};
use crate::load::{PlayerRoster, TournamentBundle};
use crate::model::{EntityId, NewTeam, NewTournament, Team, Tournament};
use crate::views::{
    DetailCreate, DetailCreated, DetailTab, LoadTicket, PlayersView, TeamsView,
    TournamentDetailView, TournamentsView,
};

pub const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Overview,
    Tournaments,
    TournamentDetail,
    Teams,
    Players,
    Live,
}

impl Screen {
    pub fn title(self) -> &'static str {
        match self {
            Screen::Login => "Sign in",
            Screen::Overview => "Control Room",
            Screen::Tournaments => "Tournaments",
            Screen::TournamentDetail => "Tournament",
            Screen::Teams => "Teams",
            Screen::Players => "Players",
            Screen::Live => "Live Production",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Browse,
    Form,
}

/// Work for the background worker. Every network command carries the ticket
/// of the view that asked for it.
#[derive(Debug, Clone)]
pub enum Command {
    LoadTournaments(LoadTicket),
    LoadTeams(LoadTicket),
    LoadPlayers(LoadTicket),
    LoadTournamentDetail {
        ticket: LoadTicket,
        tournament_id: EntityId,
    },
    CreateTournament {
        ticket: LoadTicket,
        body: NewTournament,
    },
    CreateTeam {
        ticket: LoadTicket,
        body: NewTeam,
    },
    CreateInTournament {
        ticket: LoadTicket,
        request: DetailCreate,
    },
    ExportRoster {
        path: String,
        roster: PlayerRoster,
    },
}

impl Command {
    pub fn ticket(&self) -> Option<&LoadTicket> {
        match self {
            Command::LoadTournaments(ticket)
            | Command::LoadTeams(ticket)
            | Command::LoadPlayers(ticket)
            | Command::LoadTournamentDetail { ticket, .. }
            | Command::CreateTournament { ticket, .. }
            | Command::CreateTeam { ticket, .. }
            | Command::CreateInTournament { ticket, .. } => Some(ticket),
            Command::ExportRoster { .. } => None,
        }
    }
}

#[derive(Debug)]
pub enum Delta {
    Tournaments {
        ticket: u64,
        result: Result<Vec<Tournament>, RequestFailed>,
    },
    Teams {
        ticket: u64,
        result: Result<Vec<Team>, RequestFailed>,
    },
    Players {
        ticket: u64,
        result: Result<PlayerRoster, RequestFailed>,
    },
    TournamentDetail {
        ticket: u64,
        result: Result<TournamentBundle, RequestFailed>,
    },
    TournamentCreated {
        ticket: u64,
        result: Result<Tournament, RequestFailed>,
    },
    TeamCreated {
        ticket: u64,
        result: Result<Team, RequestFailed>,
    },
    CreatedInTournament {
        ticket: u64,
        result: Result<DetailCreated, RequestFailed>,
    },
    ExportFinished {
        path: String,
        result: Result<ExportReport, String>,
    },
    Log(String),
}

pub struct AppState {
    pub screen: Screen,
    pub username: String,
    pub login: LoginForm,
    pub tournaments: TournamentsView,
    pub teams: TeamsView,
    pub players: PlayersView,
    pub detail: TournamentDetailView,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    pub input_mode: InputMode,
    pub export_path: String,
    next_ticket: u64,
}

impl AppState {
    pub fn new(username: impl Into<String>, export_path: impl Into<String>) -> Self {
        Self {
            screen: Screen::Login,
            username: username.into(),
            login: LoginForm::default(),
            tournaments: TournamentsView::new(),
            teams: TeamsView::new(),
            players: PlayersView::default(),
            detail: TournamentDetailView::new(0),
            logs: VecDeque::new(),
            help_overlay: false,
            input_mode: InputMode::Browse,
            export_path: export_path.into(),
            next_ticket: 0,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn issue_ticket(&mut self) -> LoadTicket {
        self.next_ticket += 1;
        LoadTicket::new(self.next_ticket)
    }

    /// Switches screens, cancelling whatever the old screen still had in
    /// flight, and returns the load the new screen needs.
    pub fn enter_screen(&mut self, screen: Screen) -> Option<Command> {
        self.cancel_screen(self.screen);
        self.screen = screen;
        self.input_mode = InputMode::Browse;
        self.start_load()
    }

    pub fn open_tournament(&mut self, tournament_id: EntityId) -> Option<Command> {
        self.cancel_screen(self.screen);
        self.detail = TournamentDetailView::new(tournament_id);
        self.screen = Screen::TournamentDetail;
        self.input_mode = InputMode::Browse;
        self.start_load()
    }

    pub fn open_selected_tournament(&mut self) -> Option<Command> {
        let id = self.tournaments.selected_item()?.id;
        self.open_tournament(id)
    }

    /// Starts (or restarts) the current screen's load.
    pub fn start_load(&mut self) -> Option<Command> {
        match self.screen {
            Screen::Tournaments => {
                let ticket = self.issue_ticket();
                self.tournaments.begin_load(ticket.clone());
                Some(Command::LoadTournaments(ticket))
            }
            Screen::Teams => {
                let ticket = self.issue_ticket();
                self.teams.begin_load(ticket.clone());
                Some(Command::LoadTeams(ticket))
            }
            Screen::Players => {
                let ticket = self.issue_ticket();
                self.players.begin_load(ticket.clone());
                Some(Command::LoadPlayers(ticket))
            }
            Screen::TournamentDetail => {
                let ticket = self.issue_ticket();
                if !self.detail.begin_load(ticket.clone()) {
                    return None;
                }
                Some(Command::LoadTournamentDetail {
                    ticket,
                    tournament_id: self.detail.tournament_id,
                })
            }
            Screen::Login | Screen::Overview | Screen::Live => None,
        }
    }

    fn cancel_screen(&mut self, screen: Screen) {
        match screen {
            Screen::Tournaments => self.tournaments.cancel(),
            Screen::Teams => self.teams.cancel(),
            Screen::Players => self.players.cancel(),
            Screen::TournamentDetail => self.detail.cancel(),
            Screen::Login | Screen::Overview | Screen::Live => {}
        }
    }

    pub fn cancel_all(&mut self) {
        self.tournaments.cancel();
        self.teams.cancel();
        self.players.cancel();
        self.detail.cancel();
    }

    pub fn move_selection(&mut self, forward: bool) {
        match (self.screen, forward) {
            (Screen::Tournaments, true) => self.tournaments.select_next(),
            (Screen::Tournaments, false) => self.tournaments.select_prev(),
            (Screen::Teams, true) => self.teams.select_next(),
            (Screen::Teams, false) => self.teams.select_prev(),
            (Screen::Players, true) => self.players.select_next(),
            (Screen::Players, false) => self.players.select_prev(),
            (Screen::TournamentDetail, true) => self.detail.select_next(),
            (Screen::TournamentDetail, false) => self.detail.select_prev(),
            _ => {}
        }
    }

    /// Tab switching on the detail screen; no request is made.
    pub fn cycle_tab(&mut self, forward: bool) {
        if self.screen != Screen::TournamentDetail {
            return;
        }
        let tab = if forward {
            self.detail.tab.next()
        } else {
            self.detail.tab.prev()
        };
        self.detail.select_tab(tab);
    }

    /// Whether the current screen has a form to edit.
    pub fn has_form(&self) -> bool {
        match self.screen {
            Screen::Login | Screen::Tournaments | Screen::Teams => true,
            Screen::TournamentDetail => self.detail.tab != DetailTab::Overview,
            Screen::Overview | Screen::Players | Screen::Live => false,
        }
    }

    pub fn active_form_mut(&mut self) -> Option<&mut dyn Form> {
        match self.screen {
            Screen::Login => Some(&mut self.login),
            Screen::Tournaments => Some(&mut self.tournaments.form),
            Screen::Teams => Some(&mut self.teams.form),
            Screen::TournamentDetail => self.detail.active_form_mut(),
            Screen::Overview | Screen::Players | Screen::Live => None,
        }
    }

    /// Left/right on a selector field of the active form.
    pub fn cycle_selector(&mut self, forward: bool) {
        match self.screen {
            Screen::Tournaments if self.tournaments.form.focus == TournamentForm::FORMAT_FIELD => {
                self.tournaments.form.cycle_format(forward);
            }
            Screen::TournamentDetail => self.detail.cycle_selector(forward),
            _ => {}
        }
    }

    /// Submits the active create form. `None` when validation skipped it or
    /// a create is already in flight.
    pub fn submit_form(&mut self) -> Option<Command> {
        let next = self.next_ticket + 1;
        let mut issued = false;
        let ticket = || {
            issued = true;
            LoadTicket::new(next)
        };
        let command = match self.screen {
            Screen::Tournaments => self
                .tournaments
                .start_create(ticket)
                .map(|(ticket, body)| Command::CreateTournament { ticket, body }),
            Screen::Teams => self
                .teams
                .start_create(ticket)
                .map(|(ticket, body)| Command::CreateTeam { ticket, body }),
            Screen::TournamentDetail => self
                .detail
                .start_create(ticket)
                .map(|(ticket, request)| Command::CreateInTournament { ticket, request }),
            _ => None,
        };
        if issued {
            self.next_ticket = next;
        }
        command
    }

    /// Accepts a finished login; returns the overview's (empty) load.
    pub fn login_succeeded(&mut self, username: &str) -> Option<Command> {
        self.username = username.to_string();
        self.login.reset();
        self.push_log(format!("[INFO] Signed in as {username}"));
        self.enter_screen(Screen::Overview)
    }

    pub fn logout(&mut self, fallback_name: &str) {
        self.cancel_all();
        self.username = fallback_name.to_string();
        self.login.reset();
        self.screen = Screen::Login;
        self.input_mode = InputMode::Browse;
        self.push_log("[INFO] Signed out");
    }

    pub fn export_roster(&mut self) -> Option<Command> {
        if self.screen != Screen::Players {
            return None;
        }
        match self.players.load.ready() {
            Some(roster) => Some(Command::ExportRoster {
                path: self.export_path.clone(),
                roster: roster.clone(),
            }),
            None => {
                self.push_log("[WARN] Roster not loaded yet");
                None
            }
        }
    }
}

fn stale(what: &str, ticket: u64) {
    log::debug!("dropping stale {what} result (ticket {ticket})");
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::Tournaments { ticket, result } => {
            let failed = result.is_err();
            if !state.tournaments.accept_load(ticket, result) {
                stale("tournaments", ticket);
            } else if failed {
                state.push_log("[WARN] Failed to load tournaments");
            }
        }
        Delta::Teams { ticket, result } => {
            let failed = result.is_err();
            if !state.teams.accept_load(ticket, result) {
                stale("teams", ticket);
            } else if failed {
                state.push_log("[WARN] Failed to load teams");
            }
        }
        Delta::Players { ticket, result } => {
            let failed = result.is_err();
            if !state.players.accept_load(ticket, result) {
                stale("players", ticket);
            } else if failed {
                state.push_log("[WARN] Failed to load players");
            }
        }
        Delta::TournamentDetail { ticket, result } => {
            let failed = result.is_err();
            if !state.detail.accept_load(ticket, result) {
                stale("tournament detail", ticket);
            } else if failed {
                state.push_log(format!(
                    "[WARN] Failed to load tournament {}",
                    state.detail.tournament_id
                ));
            }
        }
        Delta::TournamentCreated { ticket, result } => {
            let name = result.as_ref().ok().map(|t| t.name.clone());
            if !state.tournaments.accept_created(ticket, result) {
                stale("tournament create", ticket);
                return;
            }
            match name {
                Some(name) => state.push_log(format!("[INFO] Created tournament {name}")),
                None => state.push_log("[WARN] Failed to create tournament."),
            }
        }
        Delta::TeamCreated { ticket, result } => {
            let tag = result.as_ref().ok().map(|t| t.tag.clone());
            if !state.teams.accept_created(ticket, result) {
                stale("team create", ticket);
                return;
            }
            match tag {
                Some(tag) => state.push_log(format!("[INFO] Created team {tag}")),
                None => state.push_log("[WARN] Failed to create team."),
            }
        }
        Delta::CreatedInTournament { ticket, result } => {
            let line = match &result {
                Ok(DetailCreated::Stage(stage)) => format!("[INFO] Created stage {}", stage.name),
                Ok(DetailCreated::Group(group)) => format!("[INFO] Created group {}", group.name),
                Ok(DetailCreated::Match(record)) => {
                    format!("[INFO] Created match {}", record.name)
                }
                Err(err) => format!("[WARN] {err}"),
            };
            if !state.detail.accept_created(ticket, result) {
                stale("tournament create", ticket);
                return;
            }
            state.push_log(line);
        }
        Delta::ExportFinished { path, result } => match result {
            Ok(report) => state.push_log(format!(
                "[INFO] Roster exported to {path} ({} teams, {} players)",
                report.teams, report.players
            )),
            Err(err) => state.push_log(format!("[WARN] Export failed: {err}")),
        },
        Delta::Log(msg) => state.push_log(msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn console_is_bounded() {
        let mut state = AppState::new("VOLTRIX", "roster.xlsx");
        for idx in 0..(MAX_LOGS + 25) {
            state.push_log(format!("[INFO] line {idx}"));
        }
        assert_eq!(state.logs.len(), MAX_LOGS);
        assert_eq!(state.logs.front().map(String::as_str), Some("[INFO] line 25"));
    }

    #[test]
    fn static_screens_issue_no_load() {
        let mut state = AppState::new("VOLTRIX", "roster.xlsx");
        assert!(state.enter_screen(Screen::Overview).is_none());
        assert!(state.enter_screen(Screen::Live).is_none());
    }

    #[test]
    fn invalid_tournament_id_sends_nothing() {
        let mut state = AppState::new("VOLTRIX", "roster.xlsx");
        assert!(state.open_tournament(0).is_none());
        assert!(state.open_tournament(-3).is_none());
        assert_eq!(state.screen, Screen::TournamentDetail);
    }

    #[test]
    fn leaving_a_screen_cancels_its_ticket() {
        let mut state = AppState::new("VOLTRIX", "roster.xlsx");
        let cmd = state.enter_screen(Screen::Teams).unwrap();
        let ticket = cmd.ticket().unwrap().clone();
        state.enter_screen(Screen::Overview);
        assert!(ticket.is_cancelled());
    }

    #[test]
    fn skipped_submission_does_not_consume_a_ticket() {
        let mut state = AppState::new("VOLTRIX", "roster.xlsx");
        state.enter_screen(Screen::Teams);
        let before = state.next_ticket;
        assert!(state.submit_form().is_none());
        assert_eq!(state.next_ticket, before);
    }
}
