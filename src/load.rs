use crate::api::{Backend, RequestFailed, get_list, get_optional};
use crate::model::{EntityId, Group, Match, Player, Stage, Team, Tournament};

/// Everything the tournament detail screen shows, fetched in one fan-out.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TournamentBundle {
    /// `None` when the API answered `null` for the tournament itself.
    pub tournament: Option<Tournament>,
    pub stages: Vec<Stage>,
    pub groups: Vec<Group>,
    pub matches: Vec<Match>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlayerRoster {
    pub players: Vec<Player>,
    pub teams: Vec<Team>,
}

pub fn load_tournaments(api: &dyn Backend) -> Result<Vec<Tournament>, RequestFailed> {
    get_list(api, "/tournaments")
}

pub fn load_teams(api: &dyn Backend) -> Result<Vec<Team>, RequestFailed> {
    get_list(api, "/teams")
}

/// Four concurrent GETs; the bundle exists only if all of them succeed.
pub fn load_tournament_bundle(
    api: &dyn Backend,
    tournament_id: EntityId,
) -> Result<TournamentBundle, RequestFailed> {
    let ((tournament, stages), (groups, matches)) = rayon::join(
        || {
            rayon::join(
                || get_optional::<Tournament>(api, &format!("/tournaments/{tournament_id}")),
                || get_list::<Stage>(api, &format!("/stages/by-tournament/{tournament_id}")),
            )
        },
        || {
            rayon::join(
                || get_list::<Group>(api, &format!("/groups/by-tournament/{tournament_id}")),
                || get_list::<Match>(api, &format!("/matches/by-tournament/{tournament_id}")),
            )
        },
    );

    Ok(TournamentBundle {
        tournament: tournament?,
        stages: stages?,
        groups: groups?,
        matches: matches?,
    })
}

pub fn load_player_roster(api: &dyn Backend) -> Result<PlayerRoster, RequestFailed> {
    let (players, teams) = rayon::join(
        || get_list::<Player>(api, "/players"),
        || get_list::<Team>(api, "/teams"),
    );
    Ok(PlayerRoster {
        players: players?,
        teams: teams?,
    })
}
