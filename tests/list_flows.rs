mod common;

use serde_json::{Value, json};

use voltrix_admin::state::{AppState, Command, Delta, Screen, apply_delta};
use voltrix_admin::views::{LoadState, player_rows, team_rows, tournament_rows};
use voltrix_admin::worker::run_command;

use common::{FakeApi, pump};

fn teams_api() -> FakeApi {
    let mut api = FakeApi::default();
    api.gets.insert(
        "/teams".to_string(),
        json!([{"id": 1, "tag": "VTX", "name": "Voltrix", "country": "ID"}]),
    );
    api
}

#[test]
fn team_create_appends_and_resets_form() {
    let mut api = teams_api();
    api.posts.insert(
        "/teams/create".to_string(),
        json!({"team": {"id": 2, "tag": "AUR", "name": "Aurora"}}),
    );
    let mut state = AppState::new("ops", "roster.xlsx");
    let cmd = state.enter_screen(Screen::Teams);
    pump(&mut state, &api, cmd);

    state.teams.form.tag = "AUR".to_string();
    state.teams.form.name = " Aurora ".to_string();
    let cmd = state.submit_form();
    pump(&mut state, &api, cmd);

    let rows = team_rows(state.teams.items());
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1], ["AUR".to_string(), "Aurora".to_string(), "-".to_string()]);
    assert_eq!(state.teams.form.tag, "");
    assert_eq!(state.teams.selected, 1);

    let posted = api.posted();
    assert_eq!(
        posted,
        vec![(
            "/teams/create".to_string(),
            json!({"tag": "AUR", "name": "Aurora"})
        )]
    );
}

fn team_ids(state: &AppState) -> Vec<i64> {
    state.teams.items().iter().map(|t| t.id).collect()
}

fn aurora_api() -> FakeApi {
    teams_api().with_post(
        "/teams/create",
        json!({"id": 2, "tag": "AUR", "name": "Aurora"}),
    )
}

#[test]
fn create_landing_after_reload_that_has_it_is_not_duplicated() {
    let mut api = aurora_api();
    let mut state = AppState::new("ops", "roster.xlsx");
    let cmd = state.enter_screen(Screen::Teams);
    pump(&mut state, &api, cmd);

    state.teams.form.tag = "AUR".to_string();
    state.teams.form.name = "Aurora".to_string();
    let create = state.submit_form();
    let reload = state.start_load();
    api.gets.insert(
        "/teams".to_string(),
        json!([
            {"id": 1, "tag": "VTX", "name": "Voltrix"},
            {"id": 2, "tag": "AUR", "name": "Aurora"}
        ]),
    );
    pump(&mut state, &api, reload);
    pump(&mut state, &api, create);

    assert_eq!(team_ids(&state), vec![1, 2]);
    assert_eq!(state.teams.selected, 1);
    assert_eq!(state.teams.form.tag, "");
    assert!(!state.teams.create_in_flight());
}

#[test]
fn create_landing_during_reload_is_kept_for_the_next_list() {
    let mut api = aurora_api();
    let mut state = AppState::new("ops", "roster.xlsx");
    let cmd = state.enter_screen(Screen::Teams);
    pump(&mut state, &api, cmd);

    state.teams.form.tag = "AUR".to_string();
    state.teams.form.name = "Aurora".to_string();
    let create = state.submit_form();
    let reload = state.start_load();
    pump(&mut state, &api, create);
    assert_eq!(state.teams.load, LoadState::Loading);
    assert_eq!(state.teams.form.tag, "");
    assert_eq!(state.teams.banner, None);

    api.gets.remove("/teams");
    pump(&mut state, &api, reload);
    assert_eq!(
        state.teams.load,
        LoadState::Error("Failed to load teams".to_string())
    );

    api.gets.insert(
        "/teams".to_string(),
        json!([{"id": 1, "tag": "VTX", "name": "Voltrix"}]),
    );
    let again = state.start_load();
    pump(&mut state, &api, again);
    assert_eq!(team_ids(&state), vec![1, 2]);
}

#[test]
fn team_with_empty_name_is_never_posted() {
    let api = teams_api();
    let mut state = AppState::new("ops", "roster.xlsx");
    let cmd = state.enter_screen(Screen::Teams);
    pump(&mut state, &api, cmd);

    state.teams.form.tag = "AUR".to_string();
    assert!(state.submit_form().is_none());
    assert!(api.posted().is_empty());
    assert_eq!(state.teams.form.tag, "AUR");
    assert_eq!(state.teams.form.name, "");
    assert_eq!(state.teams.items().len(), 1);
}

#[test]
fn failed_team_create_shows_banner_over_list() {
    let api = teams_api();
    let mut state = AppState::new("ops", "roster.xlsx");
    let cmd = state.enter_screen(Screen::Teams);
    pump(&mut state, &api, cmd);

    state.teams.form.tag = "AUR".to_string();
    state.teams.form.name = "Aurora".to_string();
    let cmd = state.submit_form();
    pump(&mut state, &api, cmd);

    assert_eq!(state.teams.banner.as_deref(), Some("Failed to create team."));
    assert_eq!(state.teams.items().len(), 1);
    assert_eq!(state.teams.form.name, "Aurora");
    assert!(!state.teams.create_in_flight());
}

#[test]
fn tournament_load_failure_uses_static_message() {
    let api = FakeApi::default();
    let mut state = AppState::new("ops", "roster.xlsx");
    let cmd = state.enter_screen(Screen::Tournaments);
    pump(&mut state, &api, cmd);

    assert_eq!(
        state.tournaments.load,
        LoadState::Error("Failed to load tournaments".to_string())
    );
    state.tournaments.form.name = "Spring Cup".to_string();
    assert!(state.submit_form().is_none());
    assert_eq!(state.logs.back().map(String::as_str), Some("[WARN] Failed to load tournaments"));
}

#[test]
fn tournament_create_sends_defaults() {
    let mut api = FakeApi::default();
    api.gets.insert("/tournaments".to_string(), Value::Null);
    api.posts.insert(
        "/tournaments/create".to_string(),
        json!({"id": 3, "name": "Spring Cup", "timezone": "UTC", "formatType": "Squad"}),
    );
    let mut state = AppState::new("ops", "roster.xlsx");
    let cmd = state.enter_screen(Screen::Tournaments);
    pump(&mut state, &api, cmd);
    assert!(state.tournaments.items().is_empty());

    state.tournaments.form.name = "Spring Cup".to_string();
    let cmd = state.submit_form();
    pump(&mut state, &api, cmd);

    let rows = tournament_rows(state.tournaments.items());
    assert_eq!(rows, vec![["Spring Cup".to_string(), "UTC".to_string(), "Squad".to_string()]]);
    let posted = api.posted();
    assert_eq!(
        posted[0].1,
        json!({"name": "Spring Cup", "timezone": "UTC", "formatType": "Squad"})
    );
}

#[test]
fn players_resolve_team_tags() {
    let mut api = FakeApi::default();
    api.gets.insert(
        "/players".to_string(),
        json!([
            {"id": 1, "ign": "Ghost", "pubgId": 5550001, "teamId": 4, "country": "ID"},
            {"id": 2, "ign": "Nova", "pubgId": "", "teamId": 99}
        ]),
    );
    api.gets.insert(
        "/teams".to_string(),
        json!([{"id": 4, "tag": "VTX", "name": "Voltrix"}]),
    );
    let mut state = AppState::new("ops", "roster.xlsx");
    let cmd = state.enter_screen(Screen::Players);
    pump(&mut state, &api, cmd);

    let rows = player_rows(state.players.load.ready().unwrap());
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0], ["Ghost", "5550001", "VTX", "ID"].map(String::from));
    assert_eq!(rows[1], ["Nova", "-", "-", "-"].map(String::from));
}

#[test]
fn players_fail_when_teams_fail() {
    let mut api = FakeApi::default();
    api.gets.insert("/players".to_string(), json!([]));
    let mut state = AppState::new("ops", "roster.xlsx");
    let cmd = state.enter_screen(Screen::Players);
    pump(&mut state, &api, cmd);
    assert_eq!(
        state.players.load,
        LoadState::Error("Failed to load players".to_string())
    );
}

#[test]
fn result_after_leaving_the_screen_is_ignored() {
    let api = teams_api();
    let mut state = AppState::new("ops", "roster.xlsx");
    let cmd = state.enter_screen(Screen::Teams).unwrap();
    state.enter_screen(Screen::Overview);
    assert!(cmd.ticket().unwrap().is_cancelled());

    apply_delta(&mut state, run_command(&api, &cmd));
    assert_eq!(state.teams.load, LoadState::Idle);
}

#[test]
fn roster_export_reports_to_console() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roster.xlsx");
    let mut api = FakeApi::default();
    api.gets.insert(
        "/players".to_string(),
        json!([{"id": 1, "ign": "Ghost", "teamId": 4}]),
    );
    api.gets.insert(
        "/teams".to_string(),
        json!([{"id": 4, "tag": "VTX", "name": "Voltrix"}]),
    );
    let mut state = AppState::new("ops", path.display().to_string());

    assert!(state.export_roster().is_none(), "only from the players screen");

    let cmd = state.enter_screen(Screen::Players);
    pump(&mut state, &api, cmd);
    let cmd = state.export_roster();
    assert!(matches!(cmd, Some(Command::ExportRoster { .. })));
    pump(&mut state, &api, cmd);

    assert!(path.exists());
    let last = state.logs.back().cloned().unwrap_or_default();
    assert!(last.starts_with("[INFO] Roster exported to"), "{last}");
    assert!(last.ends_with("(1 teams, 1 players)"), "{last}");
}

#[test]
fn worker_log_lines_reach_the_console() {
    let mut state = AppState::new("ops", "roster.xlsx");
    apply_delta(&mut state, Delta::Log("[INFO] hello".to_string()));
    assert_eq!(state.logs.back().map(String::as_str), Some("[INFO] hello"));
}
