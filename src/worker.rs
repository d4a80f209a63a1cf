use std::env;
use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use crate::api::{Backend, RequestFailed, create};
use crate::export;
use crate::load;
use crate::model::{Group, Match, Stage, Team, Tournament};
use crate::state::{Command, Delta};
use crate::views::{DetailCreate, DetailCreated};

/// Runs commands from the UI on a fetch pool and reports each outcome as one
/// delta. The thread exits when the command sender is dropped.
pub fn spawn_worker(api: Arc<dyn Backend>, tx: Sender<Delta>, cmd_rx: Receiver<Command>) {
    thread::spawn(move || {
        let pool = build_fetch_pool();
        for cmd in cmd_rx {
            if let Some(ticket) = cmd.ticket()
                && ticket.is_cancelled()
            {
                log::debug!("skipping cancelled command (ticket {})", ticket.id());
                continue;
            }

            let api = api.clone();
            let tx = tx.clone();
            let job = move || {
                let delta = run_command(api.as_ref(), &cmd);
                if let Some(ticket) = cmd.ticket()
                    && ticket.is_cancelled()
                {
                    log::debug!("dropping result of cancelled ticket {}", ticket.id());
                    return;
                }
                let _ = tx.send(delta);
            };
            if let Some(pool) = pool.as_ref() {
                pool.spawn(job);
            } else {
                thread::spawn(job);
            }
        }
        log::info!("worker stopped");
    });
}

/// Executes one command synchronously.
pub fn run_command(api: &dyn Backend, cmd: &Command) -> Delta {
    match cmd {
        Command::LoadTournaments(ticket) => Delta::Tournaments {
            ticket: ticket.id(),
            result: load::load_tournaments(api),
        },
        Command::LoadTeams(ticket) => Delta::Teams {
            ticket: ticket.id(),
            result: load::load_teams(api),
        },
        Command::LoadPlayers(ticket) => Delta::Players {
            ticket: ticket.id(),
            result: load::load_player_roster(api),
        },
        Command::LoadTournamentDetail {
            ticket,
            tournament_id,
        } => Delta::TournamentDetail {
            ticket: ticket.id(),
            result: load::load_tournament_bundle(api, *tournament_id),
        },
        Command::CreateTournament { ticket, body } => Delta::TournamentCreated {
            ticket: ticket.id(),
            result: create::<Tournament, _>(api, "/tournaments/create", body)
                .map(|created| created.into_inner()),
        },
        Command::CreateTeam { ticket, body } => Delta::TeamCreated {
            ticket: ticket.id(),
            result: create::<Team, _>(api, "/teams/create", body).map(|created| created.into_inner()),
        },
        Command::CreateInTournament { ticket, request } => Delta::CreatedInTournament {
            ticket: ticket.id(),
            result: create_in_tournament(api, request),
        },
        Command::ExportRoster { path, roster } => Delta::ExportFinished {
            path: path.clone(),
            result: export::export_roster(Path::new(path), roster).map_err(|err| {
                log::error!("roster export to {path} failed: {err:#}");
                format!("{err:#}")
            }),
        },
    }
}

fn create_in_tournament(
    api: &dyn Backend,
    request: &DetailCreate,
) -> Result<DetailCreated, RequestFailed> {
    Ok(match request {
        DetailCreate::Stage(body) => {
            DetailCreated::Stage(create::<Stage, _>(api, "/stages/create", body)?.into_inner())
        }
        DetailCreate::Group(body) => {
            DetailCreated::Group(create::<Group, _>(api, "/groups/create", body)?.into_inner())
        }
        DetailCreate::Match(body) => {
            DetailCreated::Match(create::<Match, _>(api, "/matches/create", body)?.into_inner())
        }
    })
}

fn build_fetch_pool() -> Option<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(fetch_parallelism())
        .thread_name(|idx| format!("voltrix-fetch-{idx}"))
        .build()
        .ok()
}

fn fetch_parallelism() -> usize {
    env::var("FETCH_PARALLELISM")
        .ok()
        .and_then(|val| val.parse::<usize>().ok())
        .unwrap_or(6)
        .clamp(2, 32)
}
