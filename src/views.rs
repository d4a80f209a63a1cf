use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Local};

use crate::api::RequestFailed;
use crate::forms::{Form, GroupForm, MatchForm, StageForm, Submit, TeamForm, TournamentForm, cycle_choice};
use crate::load::{PlayerRoster, TournamentBundle};
use crate::lookup::{build_lookup, parent_label, stages_in_order};
use crate::model::{
    Entity, EntityId, Group, Match, NewGroup, NewMatch, NewStage, PLACEHOLDER_DASH,
    PLACEHOLDER_NOT_SET, PLACEHOLDER_UNKNOWN, Stage, Team, Tournament, or_placeholder,
};

/// Handle a view holds for one in-flight request. Cancelling it stops the
/// worker from starting or reporting the request, and a result carrying a
/// ticket the view no longer holds is dropped.
#[derive(Debug, Clone)]
pub struct LoadTicket {
    id: u64,
    cancelled: Arc<AtomicBool>,
}

impl LoadTicket {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

fn hold(slot: &mut Option<LoadTicket>, ticket: LoadTicket) {
    if let Some(previous) = slot.replace(ticket) {
        previous.cancel();
    }
}

fn release(slot: &mut Option<LoadTicket>) {
    if let Some(ticket) = slot.take() {
        ticket.cancel();
    }
}

// Consumes the slot only when `id` is the ticket still held.
fn redeem(slot: &mut Option<LoadTicket>, id: u64) -> bool {
    match slot {
        Some(ticket) if ticket.id() == id && !ticket.is_cancelled() => {
            *slot = None;
            true
        }
        _ => false,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Idle,
    Loading,
    Ready(T),
    Error(String),
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        LoadState::Idle
    }
}

impl<T> LoadState<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            LoadState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn ready_mut(&mut self) -> Option<&mut T> {
        match self {
            LoadState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }
}

pub fn load_error_message<T: Entity>() -> String {
    format!("Failed to load {}", T::PLURAL)
}

pub fn create_error_message(noun: &str) -> String {
    format!("Failed to create {noun}.")
}

pub const DETAIL_LOAD_ERROR: &str = "Failed to load tournament data.";
pub const PLAYERS_LOAD_ERROR: &str = "Failed to load players";

/// Appends `record` unless a record with its id is already held, and returns
/// the record's index either way.
fn append_once<T: Entity>(items: &mut Vec<T>, record: T) -> usize {
    match items.iter().position(|item| item.id() == record.id()) {
        Some(idx) => idx,
        None => {
            items.push(record);
            items.len() - 1
        }
    }
}

fn step(selected: usize, total: usize, forward: bool) -> usize {
    if total == 0 {
        return 0;
    }
    if forward {
        (selected + 1).min(total - 1)
    } else {
        selected.saturating_sub(1)
    }
}

/// A flat entity list with a create form (tournaments, teams).
#[derive(Debug)]
pub struct ListView<T, F> {
    pub load: LoadState<Vec<T>>,
    pub banner: Option<String>,
    pub selected: usize,
    pub form: F,
    load_ticket: Option<LoadTicket>,
    create_ticket: Option<LoadTicket>,
    // Created while a reload was pending; merged into the next loaded list.
    unmerged: Vec<T>,
}

pub type TournamentsView = ListView<Tournament, TournamentForm>;
pub type TeamsView = ListView<Team, TeamForm>;

impl<T, F> Default for ListView<T, F>
where
    T: Entity,
    F: Form + Submit + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, F> ListView<T, F>
where
    T: Entity,
    F: Form + Submit + Default,
{
    pub fn new() -> Self {
        Self {
            load: LoadState::Idle,
            banner: None,
            selected: 0,
            form: F::default(),
            load_ticket: None,
            create_ticket: None,
            unmerged: Vec::new(),
        }
    }

    pub fn items(&self) -> &[T] {
        self.load.ready().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn begin_load(&mut self, ticket: LoadTicket) {
        hold(&mut self.load_ticket, ticket);
        self.load = LoadState::Loading;
        self.banner = None;
    }

    /// Returns `false` when the result belongs to a ticket this view dropped.
    pub fn accept_load(&mut self, ticket_id: u64, result: Result<Vec<T>, RequestFailed>) -> bool {
        if !redeem(&mut self.load_ticket, ticket_id) {
            return false;
        }
        self.load = match result {
            Ok(mut items) => {
                for record in self.unmerged.drain(..) {
                    append_once(&mut items, record);
                }
                LoadState::Ready(items)
            }
            Err(_) => LoadState::Error(load_error_message::<T>()),
        };
        self.selected = self.selected.min(self.items().len().saturating_sub(1));
        true
    }

    pub fn create_in_flight(&self) -> bool {
        self.create_ticket.is_some()
    }

    /// Validates the form and claims a ticket for the POST. `None` means
    /// nothing should be sent: a required field is blank, the list is not
    /// loaded, or an earlier create is still in flight.
    pub fn start_create(
        &mut self,
        ticket: impl FnOnce() -> LoadTicket,
    ) -> Option<(LoadTicket, F::Body)> {
        if self.create_ticket.is_some() || self.load.ready().is_none() {
            return None;
        }
        let body = self.form.submission()?;
        let ticket = ticket();
        self.banner = None;
        self.create_ticket = Some(ticket.clone());
        Some((ticket, body))
    }

    /// A confirmed record is added exactly once. When a reload is running it
    /// is held back and merged into whatever list that reload produces.
    pub fn accept_created(&mut self, ticket_id: u64, result: Result<T, RequestFailed>) -> bool {
        if !redeem(&mut self.create_ticket, ticket_id) {
            return false;
        }
        match result {
            Ok(record) => {
                match self.load.ready_mut() {
                    Some(items) => self.selected = append_once(items, record),
                    None => self.unmerged.push(record),
                }
                self.form.reset();
            }
            Err(_) => self.banner = Some(create_error_message(T::SINGULAR)),
        }
        true
    }

    pub fn select_next(&mut self) {
        self.selected = step(self.selected, self.items().len(), true);
    }

    pub fn select_prev(&mut self) {
        self.selected = step(self.selected, self.items().len(), false);
    }

    pub fn selected_item(&self) -> Option<&T> {
        self.items().get(self.selected)
    }

    pub fn cancel(&mut self) {
        release(&mut self.load_ticket);
        release(&mut self.create_ticket);
        self.unmerged.clear();
        if self.load.is_loading() {
            self.load = LoadState::Idle;
        }
    }
}

#[derive(Debug, Default)]
pub struct PlayersView {
    pub load: LoadState<PlayerRoster>,
    pub selected: usize,
    load_ticket: Option<LoadTicket>,
}

impl PlayersView {
    pub fn begin_load(&mut self, ticket: LoadTicket) {
        hold(&mut self.load_ticket, ticket);
        self.load = LoadState::Loading;
    }

    pub fn accept_load(
        &mut self,
        ticket_id: u64,
        result: Result<PlayerRoster, RequestFailed>,
    ) -> bool {
        if !redeem(&mut self.load_ticket, ticket_id) {
            return false;
        }
        self.load = match result {
            Ok(roster) => LoadState::Ready(roster),
            Err(_) => LoadState::Error(PLAYERS_LOAD_ERROR.to_string()),
        };
        let total = self.load.ready().map_or(0, |r| r.players.len());
        self.selected = self.selected.min(total.saturating_sub(1));
        true
    }

    pub fn select_next(&mut self) {
        let total = self.load.ready().map_or(0, |r| r.players.len());
        self.selected = step(self.selected, total, true);
    }

    pub fn select_prev(&mut self) {
        let total = self.load.ready().map_or(0, |r| r.players.len());
        self.selected = step(self.selected, total, false);
    }

    pub fn cancel(&mut self) {
        release(&mut self.load_ticket);
        if self.load.is_loading() {
            self.load = LoadState::Idle;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailTab {
    Overview,
    Stages,
    Groups,
    Matches,
}

impl DetailTab {
    pub const ALL: [DetailTab; 4] = [
        DetailTab::Overview,
        DetailTab::Stages,
        DetailTab::Groups,
        DetailTab::Matches,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DetailTab::Overview => "Overview",
            DetailTab::Stages => "Stages",
            DetailTab::Groups => "Groups",
            DetailTab::Matches => "Matches",
        }
    }

    pub fn index(self) -> usize {
        match self {
            DetailTab::Overview => 0,
            DetailTab::Stages => 1,
            DetailTab::Groups => 2,
            DetailTab::Matches => 3,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailCreate {
    Stage(NewStage),
    Group(NewGroup),
    Match(NewMatch),
}

impl DetailCreate {
    pub fn noun(&self) -> &'static str {
        match self {
            DetailCreate::Stage(_) => Stage::SINGULAR,
            DetailCreate::Group(_) => Group::SINGULAR,
            DetailCreate::Match(_) => Match::SINGULAR,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailCreated {
    Stage(Stage),
    Group(Group),
    Match(Match),
}

/// What the detail body shows, in priority order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DetailBody<'a> {
    InvalidId,
    Loading,
    Failed(&'a str),
    NotFound,
    Ready(&'a Tournament, &'a TournamentBundle),
}

#[derive(Debug)]
pub struct TournamentDetailView {
    pub tournament_id: EntityId,
    pub load: LoadState<TournamentBundle>,
    pub tab: DetailTab,
    pub banner: Option<String>,
    pub selected: usize,
    pub stage_form: StageForm,
    pub group_form: GroupForm,
    pub match_form: MatchForm,
    load_ticket: Option<LoadTicket>,
    create_ticket: Option<(LoadTicket, &'static str)>,
    unmerged: Vec<DetailCreated>,
}

impl TournamentDetailView {
    pub fn new(tournament_id: EntityId) -> Self {
        Self {
            tournament_id,
            load: LoadState::Idle,
            tab: DetailTab::Overview,
            banner: None,
            selected: 0,
            stage_form: StageForm::default(),
            group_form: GroupForm::default(),
            match_form: MatchForm::default(),
            load_ticket: None,
            create_ticket: None,
            unmerged: Vec::new(),
        }
    }

    pub fn has_valid_id(&self) -> bool {
        self.tournament_id > 0
    }

    /// Every fresh load starts on the overview tab. Returns `false` (and sends
    /// nothing) for ids that cannot exist.
    pub fn begin_load(&mut self, ticket: LoadTicket) -> bool {
        if !self.has_valid_id() {
            ticket.cancel();
            return false;
        }
        hold(&mut self.load_ticket, ticket);
        self.load = LoadState::Loading;
        self.tab = DetailTab::Overview;
        self.banner = None;
        self.selected = 0;
        true
    }

    pub fn accept_load(
        &mut self,
        ticket_id: u64,
        result: Result<TournamentBundle, RequestFailed>,
    ) -> bool {
        if !redeem(&mut self.load_ticket, ticket_id) {
            return false;
        }
        self.load = match result {
            Ok(mut bundle) => {
                for created in self.unmerged.drain(..) {
                    merge_created(&mut bundle, created);
                }
                LoadState::Ready(bundle)
            }
            Err(_) => LoadState::Error(DETAIL_LOAD_ERROR.to_string()),
        };
        true
    }

    pub fn body(&self) -> DetailBody<'_> {
        if !self.has_valid_id() {
            return DetailBody::InvalidId;
        }
        match &self.load {
            LoadState::Idle | LoadState::Loading => DetailBody::Loading,
            LoadState::Error(message) => DetailBody::Failed(message),
            LoadState::Ready(bundle) => match &bundle.tournament {
                Some(tournament) => DetailBody::Ready(tournament, bundle),
                None => DetailBody::NotFound,
            },
        }
    }

    pub fn bundle(&self) -> Option<&TournamentBundle> {
        self.load.ready()
    }

    pub fn select_tab(&mut self, tab: DetailTab) {
        if self.tab != tab {
            self.tab = tab;
            self.selected = 0;
        }
    }

    pub fn row_count(&self) -> usize {
        let Some(bundle) = self.bundle() else {
            return 0;
        };
        match self.tab {
            DetailTab::Overview => 0,
            DetailTab::Stages => bundle.stages.len(),
            DetailTab::Groups => bundle.groups.len(),
            DetailTab::Matches => bundle.matches.len(),
        }
    }

    pub fn select_next(&mut self) {
        self.selected = step(self.selected, self.row_count(), true);
    }

    pub fn select_prev(&mut self) {
        self.selected = step(self.selected, self.row_count(), false);
    }

    /// Stage ids in display order, as offered by the group form.
    pub fn stage_options(&self) -> Vec<EntityId> {
        self.bundle()
            .map(|b| stages_in_order(&b.stages).iter().map(|s| s.id).collect())
            .unwrap_or_default()
    }

    pub fn group_options(&self) -> Vec<EntityId> {
        self.bundle()
            .map(|b| b.groups.iter().map(|g| g.id).collect())
            .unwrap_or_default()
    }

    /// The form of the current tab; the overview has none.
    pub fn active_form_mut(&mut self) -> Option<&mut dyn Form> {
        match self.tab {
            DetailTab::Overview => None,
            DetailTab::Stages => Some(&mut self.stage_form),
            DetailTab::Groups => Some(&mut self.group_form),
            DetailTab::Matches => Some(&mut self.match_form),
        }
    }

    /// Cycles the parent selector when it has focus.
    pub fn cycle_selector(&mut self, forward: bool) {
        match self.tab {
            DetailTab::Groups if self.group_form.focus == GroupForm::STAGE_FIELD => {
                let options = self.stage_options();
                self.group_form.stage_id = cycle_choice(self.group_form.stage_id, &options, forward);
            }
            DetailTab::Matches if self.match_form.focus == MatchForm::GROUP_FIELD => {
                let options = self.group_options();
                self.match_form.group_id = cycle_choice(self.match_form.group_id, &options, forward);
            }
            _ => {}
        }
    }

    pub fn create_in_flight(&self) -> bool {
        self.create_ticket.is_some()
    }

    /// Validates the current tab's form. `None` means nothing is sent.
    pub fn start_create(
        &mut self,
        ticket: impl FnOnce() -> LoadTicket,
    ) -> Option<(LoadTicket, DetailCreate)> {
        if self.create_ticket.is_some() {
            return None;
        }
        if !matches!(self.body(), DetailBody::Ready(..)) {
            return None;
        }
        let request = match self.tab {
            DetailTab::Overview => None,
            DetailTab::Stages => self
                .stage_form
                .submission(self.tournament_id)
                .map(DetailCreate::Stage),
            DetailTab::Groups => self.group_form.submission().map(DetailCreate::Group),
            DetailTab::Matches => self.match_form.submission().map(DetailCreate::Match),
        }?;
        let ticket = ticket();
        self.banner = None;
        self.create_ticket = Some((ticket.clone(), request.noun()));
        Some((ticket, request))
    }

    pub fn accept_created(
        &mut self,
        ticket_id: u64,
        result: Result<DetailCreated, RequestFailed>,
    ) -> bool {
        let noun = match &self.create_ticket {
            Some((ticket, noun)) if ticket.id() == ticket_id && !ticket.is_cancelled() => *noun,
            _ => return false,
        };
        self.create_ticket = None;

        let created = match result {
            Ok(created) => created,
            Err(_) => {
                self.banner = Some(create_error_message(noun));
                return true;
            }
        };
        match &created {
            DetailCreated::Stage(_) => self.stage_form.reset(),
            DetailCreated::Group(_) => self.group_form.reset(),
            DetailCreated::Match(_) => self.match_form.reset(),
        }
        match self.load.ready_mut() {
            Some(bundle) => merge_created(bundle, created),
            None => self.unmerged.push(created),
        }
        true
    }

    pub fn cancel(&mut self) {
        release(&mut self.load_ticket);
        if let Some((ticket, _)) = self.create_ticket.take() {
            ticket.cancel();
        }
        self.unmerged.clear();
        if self.load.is_loading() {
            self.load = LoadState::Idle;
        }
    }
}

fn merge_created(bundle: &mut TournamentBundle, created: DetailCreated) {
    match created {
        DetailCreated::Stage(stage) => {
            append_once(&mut bundle.stages, stage);
        }
        DetailCreated::Group(group) => {
            append_once(&mut bundle.groups, group);
        }
        DetailCreated::Match(record) => {
            append_once(&mut bundle.matches, record);
        }
    }
}

pub fn tournament_rows(tournaments: &[Tournament]) -> Vec<[String; 3]> {
    tournaments
        .iter()
        .map(|t| {
            [
                t.name.clone(),
                or_placeholder(t.timezone.as_deref(), PLACEHOLDER_DASH).to_string(),
                or_placeholder(t.format_type.as_deref(), PLACEHOLDER_DASH).to_string(),
            ]
        })
        .collect()
}

pub fn team_rows(teams: &[Team]) -> Vec<[String; 3]> {
    teams
        .iter()
        .map(|t| {
            [
                t.tag.clone(),
                t.name.clone(),
                or_placeholder(t.country.as_deref(), PLACEHOLDER_DASH).to_string(),
            ]
        })
        .collect()
}

/// IGN, PUBG ID, team tag, country.
pub fn player_rows(roster: &PlayerRoster) -> Vec<[String; 4]> {
    let teams = build_lookup(&roster.players, &roster.teams, |p| p.team_id);
    roster
        .players
        .iter()
        .map(|p| {
            [
                p.ign.clone(),
                or_placeholder(p.pubg_id.as_deref(), PLACEHOLDER_DASH).to_string(),
                parent_label(&teams, p.team_id, |t| t.tag.as_str(), PLACEHOLDER_DASH),
                or_placeholder(p.country.as_deref(), PLACEHOLDER_DASH).to_string(),
            ]
        })
        .collect()
}

/// Order, name, format, id; sorted by `order`.
pub fn stage_rows(stages: &[Stage]) -> Vec<[String; 4]> {
    stages_in_order(stages)
        .into_iter()
        .map(|s| {
            [
                format!("#{}", s.order),
                s.name.clone(),
                or_placeholder(s.kind.as_deref(), "Standard").to_string(),
                format!("ID {}", s.id),
            ]
        })
        .collect()
}

/// Name, code, stage, id.
pub fn group_rows(bundle: &TournamentBundle) -> Vec<[String; 4]> {
    let stages = build_lookup(&bundle.groups, &bundle.stages, |g| Some(g.stage_id));
    bundle
        .groups
        .iter()
        .map(|g| {
            [
                g.name.clone(),
                or_placeholder(g.code.as_deref(), PLACEHOLDER_DASH).to_string(),
                parent_label(&stages, Some(g.stage_id), |s| s.name.as_str(), PLACEHOLDER_UNKNOWN),
                format!("ID {}", g.id),
            ]
        })
        .collect()
}

/// Name, map, group, id.
pub fn match_rows(bundle: &TournamentBundle) -> Vec<[String; 4]> {
    let groups = build_lookup(&bundle.matches, &bundle.groups, |m| m.group_id);
    bundle
        .matches
        .iter()
        .map(|m| {
            let name = match m.number {
                Some(number) if m.name.trim().is_empty() => format!("Match {number}"),
                _ => m.name.clone(),
            };
            [
                name,
                or_placeholder(m.map.as_deref(), PLACEHOLDER_DASH).to_string(),
                parent_label(&groups, m.group_id, |g| g.name.as_str(), PLACEHOLDER_UNKNOWN),
                format!("ID {}", m.id),
            ]
        })
        .collect()
}

/// Label/value pairs for the overview tab.
pub fn overview_fields(tournament: &Tournament) -> Vec<(&'static str, String)> {
    vec![
        (
            "Timezone",
            or_placeholder(tournament.timezone.as_deref(), PLACEHOLDER_NOT_SET).to_string(),
        ),
        (
            "Format",
            or_placeholder(tournament.format_type.as_deref(), PLACEHOLDER_NOT_SET).to_string(),
        ),
        (
            "Prize pool",
            or_placeholder(tournament.prize_pool.as_deref(), PLACEHOLDER_NOT_SET).to_string(),
        ),
        ("Created", format_created(tournament.created_at.as_deref())),
    ]
}

pub fn format_created(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return PLACEHOLDER_UNKNOWN.to_string();
    };
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
            .to_string(),
        Err(_) => raw.replace('T', " "),
    }
}

/// Display label for a selector value: the option's name or the prompt.
pub fn stage_choice_label(bundle: Option<&TournamentBundle>, stage_id: Option<EntityId>) -> String {
    stage_id
        .and_then(|id| bundle?.stages.iter().find(|s| s.id == id))
        .map(|s| s.name.clone())
        .unwrap_or_else(|| "Select stage...".to_string())
}

pub fn group_choice_label(bundle: Option<&TournamentBundle>, group_id: Option<EntityId>) -> String {
    group_id
        .and_then(|id| bundle?.groups.iter().find(|g| g.id == id))
        .map(|g| g.name.clone())
        .unwrap_or_else(|| "Select group...".to_string())
}
