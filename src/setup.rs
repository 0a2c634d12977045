use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use log::info;
use serde::{Deserialize, Serialize};

use crate::schedule;
use crate::store::SeasonStore;
use crate::team::{Ratings, Team};

const DAYS_BETWEEN_GAMEWEEKS: i64 = 7;

// Team, attack, defense, overall.
const PREMIER_LEAGUE: &[(&str, i64, i64, i64)] = &[
    ("Arsenal", 85, 80, 83),
    ("Manchester City", 95, 85, 90),
    ("Manchester United", 75, 70, 73),
    ("Liverpool", 88, 82, 85),
    ("Chelsea", 78, 75, 77),
    ("Tottenham", 80, 65, 73),
    ("Newcastle United", 70, 75, 73),
    ("Brighton", 68, 72, 70),
    ("Aston Villa", 75, 70, 73),
    ("West Ham", 65, 68, 67),
    ("Crystal Palace", 60, 70, 65),
    ("Fulham", 70, 65, 68),
    ("Wolves", 58, 72, 65),
    ("Everton", 55, 65, 60),
    ("Brentford", 72, 62, 67),
    ("Nottingham Forest", 58, 68, 63),
    ("Luton Town", 50, 55, 53),
    ("Burnley", 52, 60, 56),
    ("Sheffield United", 45, 50, 48),
    ("Bournemouth", 62, 58, 60),
];

pub fn premier_league_teams() -> Vec<Team> {
    PREMIER_LEAGUE
        .iter()
        .map(|(name, attack, defense, overall)| {
            Team::new(*name, Ratings::new(*attack, *defense, *overall))
        })
        .collect()
}

/// Shape of a JSON season setup file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonSetup {
    #[serde(default)]
    pub season_label: Option<String>,
    #[serde(default)]
    pub user_team: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    pub teams: Vec<Team>,
}

impl SeasonSetup {
    pub fn builtin() -> Self {
        Self {
            season_label: None,
            user_team: None,
            start_date: NaiveDate::from_ymd_opt(2024, 8, 16),
            teams: premier_league_teams(),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read season setup {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("parse season setup {}", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let setup: SeasonSetup = serde_json::from_str(raw).context("invalid setup json")?;
        if setup.teams.len() < 2 {
            return Err(anyhow!("a season needs at least two teams"));
        }
        Ok(setup)
    }

    /// Registers the teams, generates a double round robin and picks the user team.
    ///
    /// `season_label` and `user_team` from the file win over the fallbacks.
    pub fn build_store(&self, season_label: &str, user_team: &str) -> Result<SeasonStore> {
        let label = self.season_label.as_deref().unwrap_or(season_label);
        let mut store = SeasonStore::new(label);
        for team in &self.teams {
            store
                .add_team(&team.name, team.ratings)
                .with_context(|| format!("add team {}", team.name))?;
        }

        let user = self.user_team.as_deref().unwrap_or(user_team);
        if store.team(user).is_some() {
            store.assign_user_team(user)?;
        } else {
            log::warn!("user team {user} is not in the league, playing without one");
        }

        let names: Vec<String> = self.teams.iter().map(|t| t.name.clone()).collect();
        let mut fixtures = schedule::double_round_robin(&names);
        if let Some(start) = self.start_date {
            fixtures = schedule::with_dates(fixtures, start, DAYS_BETWEEN_GAMEWEEKS);
        }
        let ids = schedule::load_into(&mut store, &fixtures).context("load fixtures")?;

        info!(
            "season {label}: {} teams, {} fixtures",
            store.teams().len(),
            ids.len()
        );
        Ok(store)
    }
}
