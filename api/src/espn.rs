//! ESPN scoreboard wire types. Every field is optional; mapping to the
//! domain model happens in `normalize`.
use serde::{Deserialize, Deserializer};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Scoreboard  (site v2 API)
// ---------------------------------------------------------------------------

/// One league's scoreboard document.
///
/// Events stay as raw JSON here and are decoded one at a time during
/// normalization, so a single oddly-shaped event cannot fail the whole league.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct ScoreboardResponse {
    pub events: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct EspnEvent {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "shortName")]
    pub short_name: Option<String>,
    pub date: Option<String>, // ISO 8601, minute precision ("2026-10-18T17:00Z")
    pub status: Option<EspnStatus>,
    pub competitions: Option<Vec<EspnCompetition>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct EspnCompetition {
    pub competitors: Option<Vec<EspnCompetitor>>,
    pub status: Option<EspnStatus>,
    pub venue: Option<EspnVenue>,
    pub broadcasts: Option<Vec<EspnBroadcast>>,
    pub odds: Option<Vec<EspnOdds>>,
    pub situation: Option<EspnSituation>,
    pub attendance: Option<u32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnStatus {
    #[serde(rename = "type")]
    pub status_type: Option<EspnStatusType>,
    pub period: Option<u32>,
    #[serde(rename = "displayClock")]
    pub display_clock: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnStatusType {
    pub name: Option<String>, // "STATUS_SCHEDULED", "STATUS_IN_PROGRESS", "STATUS_FINAL"
    pub description: Option<String>,
    pub detail: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct EspnCompetitor {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(rename = "homeAway")]
    pub home_away: Option<String>, // "home" | "away"
    pub team: Option<EspnTeam>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub score: Option<String>, // ESPN sends scores as strings, but not everywhere
    pub records: Option<Vec<EspnRecord>>,
    pub linescores: Option<Vec<EspnLineScore>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnTeam {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
    #[serde(rename = "shortDisplayName")]
    pub short_display_name: Option<String>,
    pub abbreviation: Option<String>,
    pub color: Option<String>,
    pub logo: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnRecord {
    #[serde(rename = "type")]
    pub record_type: Option<String>,
    pub summary: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnLineScore {
    pub value: Option<f64>,
    #[serde(rename = "displayValue")]
    pub display_value: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnVenue {
    #[serde(rename = "fullName")]
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnBroadcast {
    pub names: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnOdds {
    pub details: Option<String>,
    #[serde(rename = "overUnder", default, deserialize_with = "string_or_number")]
    pub over_under: Option<String>,
}

/// Live game state. Football and baseball populate disjoint subsets.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct EspnSituation {
    // football
    #[serde(default, deserialize_with = "string_or_number")]
    pub possession: Option<String>, // team id of the side with the ball
    #[serde(rename = "downDistanceText")]
    pub down_distance_text: Option<String>,
    #[serde(rename = "possessionText")]
    pub possession_text: Option<String>,
    // baseball
    pub batter: Option<EspnSituationPlayer>,
    pub balls: Option<u8>,
    pub strikes: Option<u8>,
    pub outs: Option<u8>,
    #[serde(rename = "onFirst")]
    pub on_first: Option<bool>,
    #[serde(rename = "onSecond")]
    pub on_second: Option<bool>,
    #[serde(rename = "onThird")]
    pub on_third: Option<bool>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnSituationPlayer {
    pub athlete: Option<EspnAthlete>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnAthlete {
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
}

/// Accept `"7"`, `7` or `7.5` for fields ESPN is inconsistent about.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
