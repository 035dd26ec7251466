use std::fmt;

use clap::ValueEnum;

/// Season types in the order the orchestrator walks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum)]
pub enum SeasonType {
    PreSeason,
    Playoffs,
    RegularSeason,
    AllStar,
    PlayIn,
    Ist,
}

impl SeasonType {
    pub const ALL: [SeasonType; 6] = [
        SeasonType::PreSeason,
        SeasonType::Playoffs,
        SeasonType::RegularSeason,
        SeasonType::AllStar,
        SeasonType::PlayIn,
        SeasonType::Ist,
    ];

    /// Value of the `SeasonType` query parameter.
    pub fn as_param(self) -> &'static str {
        match self {
            SeasonType::PreSeason => "Pre Season",
            SeasonType::Playoffs => "Playoffs",
            SeasonType::RegularSeason => "Regular Season",
            SeasonType::AllStar => "All Star",
            SeasonType::PlayIn => "PlayIn",
            SeasonType::Ist => "IST",
        }
    }
}

impl fmt::Display for SeasonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum PerMode {
    #[default]
    #[value(name = "Totals", alias = "totals")]
    Totals,
    #[value(name = "PerGame", alias = "per-game")]
    PerGame,
}

impl PerMode {
    /// Value of the `PerMode` query parameter.
    pub fn as_param(self) -> &'static str {
        match self {
            PerMode::Totals => "Totals",
            PerMode::PerGame => "PerGame",
        }
    }
}

impl fmt::Display for PerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param())
    }
}

/// One fetch-and-store task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkUnit {
    pub season: String,
    pub season_type: SeasonType,
    pub per_mode: PerMode,
}

impl WorkUnit {
    pub fn new(season: impl Into<String>, season_type: SeasonType, per_mode: PerMode) -> Self {
        Self {
            season: season.into(),
            season_type,
            per_mode,
        }
    }

    /// Deterministic object key; re-ingesting the same unit overwrites it.
    pub fn object_key(&self) -> String {
        format!(
            "nba__{}_{}_{}.csv",
            self.season,
            self.season_type.as_param(),
            self.per_mode.as_param()
        )
    }
}

impl fmt::Display for WorkUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "season={} season_type={} per_mode={}",
            self.season, self.season_type, self.per_mode
        )
    }
}
