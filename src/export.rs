use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::load::PlayerRoster;
use crate::lookup::{build_lookup, parent_label};
use crate::model::{PLACEHOLDER_DASH, or_placeholder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportReport {
    pub teams: usize,
    pub players: usize,
}

/// Writes the roster as a two-sheet workbook (`Teams`, `Players`).
pub fn export_roster(path: &Path, roster: &PlayerRoster) -> Result<ExportReport> {
    let mut teams_rows = vec![vec![
        "ID".to_string(),
        "Tag".to_string(),
        "Name".to_string(),
        "Country".to_string(),
    ]];
    for team in &roster.teams {
        teams_rows.push(vec![
            team.id.to_string(),
            team.tag.clone(),
            team.name.clone(),
            or_placeholder(team.country.as_deref(), PLACEHOLDER_DASH).to_string(),
        ]);
    }

    let teams = build_lookup(&roster.players, &roster.teams, |p| p.team_id);
    let mut players_rows = vec![vec![
        "ID".to_string(),
        "IGN".to_string(),
        "PUBG ID".to_string(),
        "Team".to_string(),
        "Country".to_string(),
    ]];
    for player in &roster.players {
        players_rows.push(vec![
            player.id.to_string(),
            player.ign.clone(),
            or_placeholder(player.pubg_id.as_deref(), PLACEHOLDER_DASH).to_string(),
            parent_label(&teams, player.team_id, |t| t.tag.as_str(), PLACEHOLDER_DASH),
            or_placeholder(player.country.as_deref(), PLACEHOLDER_DASH).to_string(),
        ]);
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create export dir {}", parent.display()))?;
    }

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Teams").context("name Teams sheet")?;
    write_rows(sheet, &teams_rows)?;

    let sheet = workbook.add_worksheet();
    sheet.set_name("Players").context("name Players sheet")?;
    write_rows(sheet, &players_rows)?;

    workbook
        .save(path)
        .with_context(|| format!("save workbook {}", path.display()))?;
    log::info!(
        "roster exported to {} ({} teams, {} players)",
        path.display(),
        roster.teams.len(),
        roster.players.len()
    );

    Ok(ExportReport {
        teams: roster.teams.len(),
        players: roster.players.len(),
    })
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Player, Team};

    #[test]
    fn export_writes_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("roster.xlsx");
        let roster = PlayerRoster {
            players: vec![Player {
                id: 1,
                ign: "Ghost".to_string(),
                pubg_id: Some("5550001".to_string()),
                country: None,
                team_id: Some(4),
            }],
            teams: vec![Team {
                id: 4,
                tag: "VTX".to_string(),
                name: "Voltrix".to_string(),
                country: Some("ID".to_string()),
            }],
        };
        let report = export_roster(&path, &roster).unwrap();
        assert_eq!(report, ExportReport { teams: 1, players: 1 });
        assert!(path.exists());
    }
}
