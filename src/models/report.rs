//! Analysis output: per-match results and the batch report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Counters, FavoriteUnits, MapId, MatchId, ParticipantId, Team, WinningTeam};

/// One of the six weighted performance categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Battlefield,
    Combat,
    Economy,
    Teamwork,
    Strategy,
    Firepower,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Category; 6] = [
        Category::Battlefield,
        Category::Combat,
        Category::Economy,
        Category::Teamwork,
        Category::Strategy,
        Category::Firepower,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Category::Battlefield => "battlefield",
            Category::Combat => "combat",
            Category::Economy => "economy",
            Category::Teamwork => "teamwork",
            Category::Strategy => "strategy",
            Category::Firepower => "firepower",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// One value per category. Used for category scores, style ratios and
/// playstyle dimensions alike.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub battlefield: f64,
    pub combat: f64,
    pub economy: f64,
    pub teamwork: f64,
    pub strategy: f64,
    pub firepower: f64,
}

impl CategoryBreakdown {
    /// Every category set to `value`.
    pub fn uniform(value: f64) -> Self {
        Self {
            battlefield: value,
            combat: value,
            economy: value,
            teamwork: value,
            strategy: value,
            firepower: value,
        }
    }

    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Battlefield => self.battlefield,
            Category::Combat => self.combat,
            Category::Economy => self.economy,
            Category::Teamwork => self.teamwork,
            Category::Strategy => self.strategy,
            Category::Firepower => self.firepower,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut f64 {
        match category {
            Category::Battlefield => &mut self.battlefield,
            Category::Combat => &mut self.combat,
            Category::Economy => &mut self.economy,
            Category::Teamwork => &mut self.teamwork,
            Category::Strategy => &mut self.strategy,
            Category::Firepower => &mut self.firepower,
        }
    }

    /// Apply `f` to every category.
    pub fn map(&self, mut f: impl FnMut(f64) -> f64) -> Self {
        let mut out = *self;
        for category in Category::ALL {
            *out.get_mut(category) = f(self.get(category));
        }
        out
    }

    /// Add another breakdown category by category.
    pub fn accumulate(&mut self, other: &CategoryBreakdown) {
        for category in Category::ALL {
            *self.get_mut(category) += other.get(category);
        }
    }

    /// Categories paired with their values, in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        Category::ALL.into_iter().map(|c| (c, self.get(c)))
    }
}

/// The target participant's result in one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

/// Per-team superlative badges, one per raw stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MedalKind {
    Destruction,
    Losses,
    DamageDealt,
    DamageReceived,
    SupplyPointsConsumed,
    SupplyPointsConsumedFromAllies,
    SupplyPointsConsumedByAllies,
    TotalSpawnedUnitScore,
    TotalRefundedUnitScore,
}

impl MedalKind {
    /// Medal kinds in award order.
    pub const ALL: [MedalKind; 9] = [
        MedalKind::Destruction,
        MedalKind::Losses,
        MedalKind::DamageDealt,
        MedalKind::DamageReceived,
        MedalKind::SupplyPointsConsumed,
        MedalKind::SupplyPointsConsumedFromAllies,
        MedalKind::SupplyPointsConsumedByAllies,
        MedalKind::TotalSpawnedUnitScore,
        MedalKind::TotalRefundedUnitScore,
    ];

    /// The counter this medal is awarded on.
    pub fn value(&self, counters: &Counters) -> f64 {
        match self {
            MedalKind::Destruction => counters.destruction_score,
            MedalKind::Losses => counters.losses_score,
            MedalKind::DamageDealt => counters.damage_dealt,
            MedalKind::DamageReceived => counters.damage_received,
            MedalKind::SupplyPointsConsumed => counters.supply_points_consumed,
            MedalKind::SupplyPointsConsumedFromAllies => {
                counters.supply_points_consumed_from_allies
            }
            MedalKind::SupplyPointsConsumedByAllies => counters.supply_points_consumed_by_allies,
            MedalKind::TotalSpawnedUnitScore => counters.total_spawned_unit_score,
            MedalKind::TotalRefundedUnitScore => counters.total_refunded_unit_score,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            MedalKind::Destruction => "⚔️",
            MedalKind::Losses => "☠️",
            MedalKind::DamageDealt => "💥",
            MedalKind::DamageReceived => "🧱",
            MedalKind::SupplyPointsConsumed => "🍔",
            MedalKind::SupplyPointsConsumedFromAllies => "🐱",
            MedalKind::SupplyPointsConsumedByAllies => "🚑",
            MedalKind::TotalSpawnedUnitScore => "🛒",
            MedalKind::TotalRefundedUnitScore => "💸",
        }
    }
}

/// A medal awarded in one match, with the winning value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medal {
    pub kind: MedalKind,
    pub value: f64,
    pub icon: String,
}

impl Medal {
    pub fn new(kind: MedalKind, value: f64) -> Self {
        Self {
            kind,
            value,
            icon: kind.icon().to_string(),
        }
    }
}

/// One participant as shown in a match roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub id: ParticipantId,
    pub name: String,
    pub team: Team,
    pub is_target: bool,
    pub level: Option<u32>,

    /// Rating after the match
    pub rating: Option<f64>,

    /// Rating change, when both ratings are known
    pub rating_gain: Option<f64>,

    /// Destruction as a percentage of the match maximum
    pub destruction_pct: f64,

    /// Losses as a percentage of the match maximum
    pub losses_pct: f64,

    /// Objectives as a percentage of the match maximum
    pub objectives_pct: f64,

    /// Destruction over losses
    pub kd: f64,

    /// Sort key: (destruction - losses) / 1000 + objectives
    pub score: f64,

    pub counters: Counters,
    pub medals: Vec<Medal>,
    pub favorite_units: FavoriteUnits,
    pub self_damage: f64,
}

impl RosterEntry {
    pub fn has_medal(&self, kind: MedalKind) -> bool {
        self.medals.iter().any(|m| m.kind == kind)
    }
}

/// Analysis of one match from the target's point of view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub id: MatchId,

    /// Match-level Win Contribution Score
    pub wcs: f64,

    pub breakdown: CategoryBreakdown,

    /// The target's team, sorted by score
    pub ally: Vec<RosterEntry>,

    /// The opposing team, sorted by score
    pub enemy: Vec<RosterEntry>,

    pub outcome: Outcome,
    pub is_win: bool,

    /// True only for a declared draw
    pub is_draw: bool,

    /// False when the target was not found in this match
    pub target_located: bool,

    pub end_reason: Option<i64>,
    pub end_time: Option<i64>,

    /// `end_time` as a UTC timestamp (RFC 3339 in JSON)
    pub ended_at: Option<DateTime<Utc>>,

    pub map_id: Option<MapId>,
    pub duration_secs: Option<i64>,

    /// Duration as `"{m}m {s}s"`
    pub duration_display: Option<String>,

    pub winner: WinningTeam,

    /// True when the winner was inferred from rating deltas
    pub winner_inferred: bool,
}

/// Seconds since the Unix epoch as a UTC timestamp.
pub fn timestamp_utc(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(secs, 0)
}

/// A duration in seconds rendered as `"{m}m {s}s"`.
pub fn format_duration(secs: i64) -> String {
    format!("{}m {}s", secs / 60, secs % 60)
}

impl MatchResult {
    /// The target's own roster entry, if located.
    pub fn target_entry(&self) -> Option<&RosterEntry> {
        self.ally.iter().find(|p| p.is_target)
    }
}

/// Overall level of an aggregate WCS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WcsLevel {
    Legendary,
    Elite,
    Good,
    Average,
    Below,
    Poor,
}

impl std::fmt::Display for WcsLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WcsLevel::Legendary => write!(f, "legendary"),
            WcsLevel::Elite => write!(f, "elite"),
            WcsLevel::Good => write!(f, "good"),
            WcsLevel::Average => write!(f, "average"),
            WcsLevel::Below => write!(f, "below"),
            WcsLevel::Poor => write!(f, "poor"),
        }
    }
}

/// Recent-form indicator. Display only; never fed back into WCS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Rising,
    Falling,
    Steady,
}

/// Descriptive playstyle label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleLabel {
    IronFist,
    Tactician,
    TeamCore,
    ObjHunter,
    Frontliner,
    Logistics,
    Berserker,
    Dominator,
    Efficient,
    Collaborator,
    PointRush,
    HeavyFire,
    Economist,
    Balanced,
}

impl StyleLabel {
    pub fn name(&self) -> &'static str {
        match self {
            StyleLabel::IronFist => "Iron Fist",
            StyleLabel::Tactician => "Tactician",
            StyleLabel::TeamCore => "Team Core",
            StyleLabel::ObjHunter => "Obj Hunter",
            StyleLabel::Frontliner => "Frontliner",
            StyleLabel::Logistics => "Logistics",
            StyleLabel::Berserker => "Berserker",
            StyleLabel::Dominator => "Dominator",
            StyleLabel::Efficient => "Efficient",
            StyleLabel::Collaborator => "Collaborator",
            StyleLabel::PointRush => "Point Rush",
            StyleLabel::HeavyFire => "Heavy Fire",
            StyleLabel::Economist => "Economist",
            StyleLabel::Balanced => "Balanced",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            StyleLabel::IronFist => "🗡️",
            StyleLabel::Tactician => "🛡️",
            StyleLabel::TeamCore => "🚑",
            StyleLabel::ObjHunter => "🎯",
            StyleLabel::Frontliner => "💪",
            StyleLabel::Logistics => "🔄",
            StyleLabel::Berserker => "🔥",
            StyleLabel::Dominator => "⚔️",
            StyleLabel::Efficient => "💎",
            StyleLabel::Collaborator => "🤝",
            StyleLabel::PointRush => "🏁",
            StyleLabel::HeavyFire => "💥",
            StyleLabel::Economist => "💰",
            StyleLabel::Balanced => "📊",
        }
    }
}

/// Six relative-ratio dimensions (0-100) and the best-matching label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaystyleProfile {
    pub dimensions: CategoryBreakdown,
    pub label: StyleLabel,

    /// English display name of `label`
    pub label_name: String,

    pub label_icon: String,
}

impl PlaystyleProfile {
    pub fn new(dimensions: CategoryBreakdown, label: StyleLabel) -> Self {
        Self {
            dimensions,
            label,
            label_name: label.name().to_string(),
            label_icon: label.icon().to_string(),
        }
    }
}

/// Full analysis of a match batch for one target participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub target: ParticipantId,

    /// Display name from the first match where the target is named
    pub target_name: Option<String>,

    /// Rating after the first (most recent) match
    pub current_rating: Option<f64>,

    pub matches: Vec<MatchResult>,

    /// Aggregate Win Contribution Score
    pub wcs: f64,

    pub breakdown: CategoryBreakdown,
    pub level: WcsLevel,
    pub playstyle: PlaystyleProfile,
    pub wins: u32,

    /// Wins over matches, rounded to a whole percent
    pub win_rate: u32,

    /// The two medals the target earned most often
    pub top_medals: Vec<MedalKind>,

    pub trend: Trend,

    /// Favourite units summed across the whole batch
    pub favorite_units: Option<FavoriteUnits>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_breakdown_get_and_map() {
        let mut scores = CategoryBreakdown::uniform(50.0);
        *scores.get_mut(Category::Combat) = 80.0;

        assert_eq!(scores.get(Category::Combat), 80.0);
        assert_eq!(scores.get(Category::Economy), 50.0);

        let halved = scores.map(|v| v / 2.0);
        assert_eq!(halved.combat, 40.0);
        assert_eq!(halved.firepower, 25.0);
    }

    #[test]
    fn test_category_breakdown_accumulate() {
        let mut total = CategoryBreakdown::default();
        total.accumulate(&CategoryBreakdown::uniform(1.5));
        total.accumulate(&CategoryBreakdown::uniform(0.5));

        assert!(total.iter().all(|(_, v)| v == 2.0));
        assert_eq!(total.iter().count(), 6);
    }

    #[test]
    fn test_medal_kind_value() {
        let counters = Counters {
            destruction_score: 100.0,
            supply_points_consumed_by_allies: 35.0,
            ..Default::default()
        };

        assert_eq!(MedalKind::Destruction.value(&counters), 100.0);
        assert_eq!(MedalKind::SupplyPointsConsumedByAllies.value(&counters), 35.0);
        assert_eq!(MedalKind::Losses.value(&counters), 0.0);
    }

    #[test]
    fn test_medal_kind_serialization() {
        let json = serde_json::to_string(&MedalKind::TotalRefundedUnitScore).unwrap();
        assert_eq!(json, "\"TotalRefundedUnitScore\"");
    }

    #[test]
    fn test_enum_serialization() {
        assert_eq!(serde_json::to_string(&WcsLevel::Legendary).unwrap(), "\"legendary\"");
        assert_eq!(serde_json::to_string(&StyleLabel::IronFist).unwrap(), "\"iron_fist\"");
        assert_eq!(serde_json::to_string(&Category::Firepower).unwrap(), "\"firepower\"");
        assert_eq!(serde_json::to_string(&Outcome::Draw).unwrap(), "\"draw\"");
    }

    #[test]
    fn test_display_helpers() {
        let ended = timestamp_utc(1_718_000_000).unwrap();
        assert_eq!(ended.to_rfc3339(), "2024-06-10T06:13:20+00:00");
        assert_eq!(format_duration(1265), "21m 5s");
        assert_eq!(format_duration(59), "0m 59s");
    }

    #[test]
    fn test_medal_and_profile_carry_display_text() {
        let medal = Medal::new(MedalKind::DamageDealt, 4200.0);
        assert_eq!(medal.icon, "💥");

        let profile =
            PlaystyleProfile::new(CategoryBreakdown::uniform(50.0), StyleLabel::PointRush);
        assert_eq!(profile.label_name, "Point Rush");
        assert_eq!(profile.label_icon, "🏁");
    }

    #[test]
    fn test_wcs_level_display() {
        assert_eq!(format!("{}", WcsLevel::Elite), "elite");
        assert_eq!(format!("{}", WcsLevel::Poor), "poor");
    }
}
