use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use voltrix_admin::load::{PlayerRoster, TournamentBundle};
use voltrix_admin::lookup::build_lookup;
use voltrix_admin::model::{Group, Match, Player, Stage, Team};
use voltrix_admin::views::{group_rows, match_rows, player_rows, stage_rows};

fn sample_roster(teams: i64, per_team: i64) -> PlayerRoster {
    let teams_list = (1..=teams)
        .map(|id| Team {
            id,
            tag: format!("T{id:03}"),
            name: format!("Team {id}"),
            country: (id % 3 == 0).then(|| "ID".to_string()),
        })
        .collect();
    let players = (1..=teams * per_team)
        .map(|id| Player {
            id,
            ign: format!("player{id}"),
            pubg_id: Some(format!("{}", 5_000_000 + id)),
            country: None,
            // Every tenth player points at a team that was never fetched.
            team_id: Some(if id % 10 == 0 { teams + 1 } else { (id - 1) / per_team + 1 }),
        })
        .collect();
    PlayerRoster {
        players,
        teams: teams_list,
    }
}

fn sample_bundle(stages: i64, groups_per_stage: i64, matches_per_group: i64) -> TournamentBundle {
    let stage_list: Vec<Stage> = (1..=stages)
        .rev()
        .map(|id| Stage {
            id,
            name: format!("Stage {id}"),
            order: id,
            tournament_id: 42,
            kind: None,
            created_at: None,
        })
        .collect();
    let mut groups = Vec::new();
    let mut matches = Vec::new();
    for stage in 1..=stages {
        for g in 0..groups_per_stage {
            let group_id = stage * 100 + g;
            groups.push(Group {
                id: group_id,
                name: format!("Group {group_id}"),
                code: None,
                stage_id: stage,
            });
            for m in 0..matches_per_group {
                matches.push(Match {
                    id: group_id * 100 + m,
                    name: format!("Match {}", m + 1),
                    map: Some("Erangel".to_string()),
                    number: Some(m + 1),
                    group_id: Some(group_id),
                });
            }
        }
    }
    TournamentBundle {
        tournament: None,
        stages: stage_list,
        groups,
        matches,
    }
}

fn bench_lookup_build(c: &mut Criterion) {
    let roster = sample_roster(64, 5);
    c.bench_function("team_lookup_build", |b| {
        b.iter(|| {
            let lookup = build_lookup(
                black_box(&roster.players),
                black_box(&roster.teams),
                |p| p.team_id,
            );
            black_box(lookup.len());
        })
    });
}

fn bench_player_rows(c: &mut Criterion) {
    let roster = sample_roster(64, 5);
    c.bench_function("player_rows", |b| {
        b.iter(|| {
            let rows = player_rows(black_box(&roster));
            black_box(rows.len());
        })
    });
}

fn bench_detail_rows(c: &mut Criterion) {
    let bundle = sample_bundle(4, 8, 12);
    c.bench_function("detail_rows", |b| {
        b.iter(|| {
            let stages = stage_rows(black_box(&bundle.stages));
            let groups = group_rows(black_box(&bundle));
            let matches = match_rows(black_box(&bundle));
            black_box(stages.len() + groups.len() + matches.len());
        })
    });
}

criterion_group!(benches, bench_lookup_build, bench_player_rows, bench_detail_rows);
criterion_main!(benches);
