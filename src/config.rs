use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use log::warn;

use crate::match_sim::SimLevel;

pub const DEFAULT_SEASON_LABEL: &str = "2024-25";
pub const DEFAULT_USER_TEAM: &str = "Sheffield United";

/// Tuning knobs for the match simulator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimConfig {
    /// Rating bonus applied to the home side.
    pub home_advantage: i32,
    /// Half-width of the uniform rating noise used by the basic level.
    pub randomness: i32,
    /// Hard cap on goals per side, applied by every level.
    pub max_goals: u8,
    /// Scoring chances per side for the rating level.
    pub chances: u32,
    /// Gameweeks after this one apply the late-season fatigue penalty.
    pub fatigue_after_gameweek: u32,
    pub base_goals: f64,
    pub goals_stddev: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            home_advantage: 5,
            randomness: 15,
            max_goals: 7,
            chances: 10,
            fatigue_after_gameweek: 30,
            base_goals: 1.3,
            goals_stddev: 0.9,
        }
    }
}

impl SimConfig {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            home_advantage: env_parse("SIM_HOME_ADVANTAGE")
                .unwrap_or(d.home_advantage)
                .clamp(0, 30),
            randomness: env_parse("SIM_RANDOMNESS")
                .unwrap_or(d.randomness)
                .clamp(0, 50),
            max_goals: env_parse("SIM_MAX_GOALS")
                .unwrap_or(d.max_goals)
                .clamp(1, 20),
            chances: env_parse("SIM_CHANCES").unwrap_or(d.chances).clamp(1, 40),
            fatigue_after_gameweek: env_parse("SIM_FATIGUE_AFTER_GW")
                .unwrap_or(d.fatigue_after_gameweek),
            ..d
        }
    }
}

/// Settings for a command-line season run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub sim: SimConfig,
    pub level: SimLevel,
    pub seed: Option<u64>,
    pub season_label: String,
    pub user_team: String,
    pub setup_path: Option<PathBuf>,
}

impl RunConfig {
    /// Loads `.env.local` and `.env` (if present) and reads settings from the environment.
    pub fn load() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");

        Self {
            sim: SimConfig::from_env(),
            level: opt_env("SIM_LEVEL")
                .map(|raw| SimLevel::from_name(&raw))
                .unwrap_or_default(),
            seed: env_parse("SIM_SEED"),
            season_label: opt_env("SEASON_LABEL")
                .unwrap_or_else(|| DEFAULT_SEASON_LABEL.to_string()),
            user_team: opt_env("USER_TEAM").unwrap_or_else(|| DEFAULT_USER_TEAM.to_string()),
            setup_path: opt_env("SEASON_SETUP").map(PathBuf::from),
        }
    }
}

pub fn opt_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .and_then(|val| if val.trim().is_empty() { None } else { Some(val) })
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = opt_env(key)?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("ignoring unparseable {key}={raw}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SimConfig;

    #[test]
    fn defaults_match_league_constants() {
        let cfg = SimConfig::default();
        assert_eq!(cfg.home_advantage, 5);
        assert_eq!(cfg.randomness, 15);
        assert_eq!(cfg.max_goals, 7);
        assert_eq!(cfg.chances, 10);
        assert_eq!(cfg.fatigue_after_gameweek, 30);
    }
}
