use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GeoduelError;
use crate::format::{format_usd, group_thousands};

// --- Country ---

/// One comparable country. Built once by the data provider and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub name: String,
    pub population: u64,
    /// Square kilometres.
    pub area: f64,
    /// Current USD. Estimated from population when the GDP source has no value.
    pub gdp: f64,
    /// Flag image URL (PNG preferred, SVG fallback).
    pub flag: String,
    /// ISO 3166-1 alpha-3 code, alpha-2 fallback, empty when unknown.
    pub code: String,
}

// --- Game modes ---

/// The comparison dimension for a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    #[default]
    Population,
    Area,
    Gdp,
}

impl GameMode {
    pub const ALL: [GameMode; 3] = [GameMode::Population, GameMode::Area, GameMode::Gdp];

    /// Storage / wire key.
    pub fn key(self) -> &'static str {
        match self {
            GameMode::Population => "population",
            GameMode::Area => "area",
            GameMode::Gdp => "gdp",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GameMode::Population => "Population",
            GameMode::Area => "Area",
            GameMode::Gdp => "GDP",
        }
    }

    /// Caption shown under a revealed value.
    pub fn value_text(self) -> &'static str {
        match self {
            GameMode::Population => "population",
            GameMode::Area => "km² area",
            GameMode::Gdp => "USD GDP",
        }
    }

    pub fn value_of(self, country: &Country) -> f64 {
        match self {
            GameMode::Population => country.population as f64,
            GameMode::Area => country.area,
            GameMode::Gdp => country.gdp,
        }
    }

    pub fn format(self, value: f64) -> String {
        match self {
            GameMode::Population | GameMode::Area => group_thousands(value),
            GameMode::Gdp => format_usd(value),
        }
    }

    /// `value_of` followed by `format`.
    pub fn display_value(self, country: &Country) -> String {
        self.format(self.value_of(country))
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GameMode {
    type Err = GeoduelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        GameMode::ALL
            .into_iter()
            .find(|mode| mode.key() == wanted)
            .ok_or_else(|| GeoduelError::UnknownMode(s.to_string()))
    }
}

// --- Per-mode scores ---

/// High scores for all three modes, as sent to the score sync endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeScores {
    pub population: u32,
    pub area: u32,
    pub gdp: u32,
}

impl ModeScores {
    pub fn get(&self, mode: GameMode) -> u32 {
        match mode {
            GameMode::Population => self.population,
            GameMode::Area => self.area,
            GameMode::Gdp => self.gdp,
        }
    }

    pub fn set(&mut self, mode: GameMode, value: u32) {
        match mode {
            GameMode::Population => self.population = value,
            GameMode::Area => self.area = value,
            GameMode::Gdp => self.gdp = value,
        }
    }
}

/// Text offered to the player for sharing a finished session.
pub fn share_text(score: u32, mode: GameMode) -> String {
    format!(
        "I scored {score} in the Country {} game! Can you beat my score?",
        mode.label()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Country {
        Country {
            name: "Iceland".into(),
            population: 372_520,
            area: 103_000.0,
            gdp: 27_840_000_000.0,
            flag: "https://flagcdn.com/w320/is.png".into(),
            code: "ISL".into(),
        }
    }

    #[test]
    fn value_of_selects_matching_field() {
        let c = sample();
        assert_eq!(GameMode::Population.value_of(&c), 372_520.0);
        assert_eq!(GameMode::Area.value_of(&c), 103_000.0);
        assert_eq!(GameMode::Gdp.value_of(&c), 27_840_000_000.0);
    }

    #[test]
    fn display_value_uses_mode_format() {
        let c = sample();
        assert_eq!(GameMode::Population.display_value(&c), "372,520");
        assert_eq!(GameMode::Area.display_value(&c), "103,000");
        assert_eq!(GameMode::Gdp.display_value(&c), "$27.84 billion");
    }

    #[test]
    fn modes_parse_from_key_case_insensitively() {
        assert_eq!("population".parse::<GameMode>(), Ok(GameMode::Population));
        assert_eq!("AREA".parse::<GameMode>(), Ok(GameMode::Area));
        assert_eq!(" Gdp ".parse::<GameMode>(), Ok(GameMode::Gdp));
        assert_eq!(
            "height".parse::<GameMode>(),
            Err(GeoduelError::UnknownMode("height".into()))
        );
    }

    #[test]
    fn mode_serializes_as_key() {
        assert_eq!(serde_json::to_string(&GameMode::Gdp).unwrap(), "\"gdp\"");
        for mode in GameMode::ALL {
            let json = serde_json::to_value(mode).unwrap();
            assert_eq!(json, serde_json::Value::String(mode.key().to_string()));
        }
    }

    #[test]
    fn mode_scores_get_set() {
        let mut scores = ModeScores::default();
        scores.set(GameMode::Area, 7);
        assert_eq!(scores.get(GameMode::Area), 7);
        assert_eq!(scores.get(GameMode::Population), 0);
    }

    #[test]
    fn value_captions_name_units() {
        assert_eq!(GameMode::Population.value_text(), "population");
        assert_eq!(GameMode::Area.value_text(), "km² area");
        assert_eq!(GameMode::Gdp.value_text(), "USD GDP");
    }

    #[test]
    fn share_text_names_the_mode() {
        assert_eq!(
            share_text(12, GameMode::Gdp),
            "I scored 12 in the Country GDP game! Can you beat my score?"
        );
    }
}
