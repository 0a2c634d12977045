use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    #[serde(rename = "H")]
    Home,
    #[serde(rename = "D")]
    Draw,
    #[serde(rename = "A")]
    Away,
}

impl Outcome {
    pub fn as_char(self) -> char {
        match self {
            Outcome::Home => 'H',
            Outcome::Draw => 'D',
            Outcome::Away => 'A',
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

pub fn classify_outcome(home_goals: u8, away_goals: u8) -> Outcome {
    if home_goals > away_goals {
        Outcome::Home
    } else if home_goals < away_goals {
        Outcome::Away
    } else {
        Outcome::Draw
    }
}

/// A result seen from one side, regardless of venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    Win,
    Draw,
    Loss,
}

impl Verdict {
    pub fn from_goals(goals_for: u8, goals_against: u8) -> Self {
        match goals_for.cmp(&goals_against) {
            std::cmp::Ordering::Greater => Verdict::Win,
            std::cmp::Ordering::Equal => Verdict::Draw,
            std::cmp::Ordering::Less => Verdict::Loss,
        }
    }

    /// Form-guide letter.
    pub fn letter(self) -> char {
        match self {
            Verdict::Win => 'W',
            Verdict::Draw => 'D',
            Verdict::Loss => 'L',
        }
    }

    pub fn points(self) -> u32 {
        match self {
            Verdict::Win => 3,
            Verdict::Draw => 1,
            Verdict::Loss => 0,
        }
    }

    /// +1 for a win, -1 for a loss.
    pub fn trend(self) -> f64 {
        match self {
            Verdict::Win => 1.0,
            Verdict::Draw => 0.0,
            Verdict::Loss => -1.0,
        }
    }
}

/// Win/draw/loss probabilities from the home side's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeProbs {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

impl OutcomeProbs {
    pub fn uniform() -> Self {
        Self {
            home: 1.0 / 3.0,
            draw: 1.0 / 3.0,
            away: 1.0 / 3.0,
        }
    }

    /// All mass on one outcome.
    pub fn certain(outcome: Outcome) -> Self {
        let mut p = Self {
            home: 0.0,
            draw: 0.0,
            away: 0.0,
        };
        *p.slot_mut(outcome) = 1.0;
        p
    }

    /// Builds a triple from whole percentages. The draw share absorbs the rounding
    /// residue so that `total()` is exactly 1.0 whenever home + away >= 0.5.
    pub fn from_percent(home: u8, away: u8) -> Self {
        let home = f64::from(home) / 100.0;
        let away = f64::from(away) / 100.0;
        Self {
            home,
            draw: 1.0 - (home + away),
            away,
        }
    }

    /// Relative frequencies of `outcomes`; uniform when there are none.
    pub fn observed<'a, I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = &'a Outcome>,
    {
        let mut counts = Self {
            home: 0.0,
            draw: 0.0,
            away: 0.0,
        };
        let mut n = 0usize;
        for outcome in outcomes {
            *counts.slot_mut(*outcome) += 1.0;
            n += 1;
        }
        if n == 0 {
            return Self::uniform();
        }
        let n = n as f64;
        Self {
            home: counts.home / n,
            draw: counts.draw / n,
            away: counts.away / n,
        }
    }

    pub fn total(&self) -> f64 {
        (self.home + self.away) + self.draw
    }

    pub fn get(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::Home => self.home,
            Outcome::Draw => self.draw,
            Outcome::Away => self.away,
        }
    }

    fn slot_mut(&mut self, outcome: Outcome) -> &mut f64 {
        match outcome {
            Outcome::Home => &mut self.home,
            Outcome::Draw => &mut self.draw,
            Outcome::Away => &mut self.away,
        }
    }

    pub fn most_likely(&self) -> Outcome {
        if self.home >= self.draw && self.home >= self.away {
            Outcome::Home
        } else if self.draw >= self.away {
            Outcome::Draw
        } else {
            Outcome::Away
        }
    }

    /// Squared distance to the realised outcome, summed over the three slots.
    pub fn brier(&self, actual: Outcome) -> f64 {
        let hit = Self::certain(actual);
        (self.home - hit.home).powi(2)
            + (self.draw - hit.draw).powi(2)
            + (self.away - hit.away).powi(2)
    }

    pub fn log_loss(&self, actual: Outcome) -> f64 {
        -self.get(actual).clamp(1e-12, 1.0).ln()
    }
}

/// Running average of forecast quality over a stream of (forecast, result) pairs.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ForecastScore {
    pub samples: usize,
    brier_sum: f64,
    log_loss_sum: f64,
    hits: usize,
}

impl ForecastScore {
    pub fn record(&mut self, forecast: &OutcomeProbs, actual: Outcome) {
        self.samples += 1;
        self.brier_sum += forecast.brier(actual);
        self.log_loss_sum += forecast.log_loss(actual);
        if forecast.most_likely() == actual {
            self.hits += 1;
        }
    }

    pub fn brier(&self) -> f64 {
        self.mean(self.brier_sum)
    }

    pub fn log_loss(&self) -> f64 {
        self.mean(self.log_loss_sum)
    }

    pub fn accuracy(&self) -> f64 {
        self.mean(self.hits as f64)
    }

    fn mean(&self, sum: f64) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            sum / self.samples as f64
        }
    }
}

impl<'a> FromIterator<(&'a OutcomeProbs, Outcome)> for ForecastScore {
    fn from_iter<T: IntoIterator<Item = (&'a OutcomeProbs, Outcome)>>(iter: T) -> Self {
        let mut score = Self::default();
        for (forecast, actual) in iter {
            score.record(forecast, actual);
        }
        score
    }
}
