//! Mapping: ESPN wire types → clean domain types.
//!
//! This is the only place that knows the feed's shape. Anything that looks odd
//! in one event drops that event (with a warning) and leaves the rest of the
//! batch alone.
use chrono::{DateTime, NaiveDateTime, Utc};
use log::warn;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::espn::{
    EspnCompetition, EspnCompetitor, EspnEvent, EspnLineScore, EspnSituation, EspnStatus,
    ScoreboardResponse,
};
use crate::{
    BaseballSituation, FootballSituation, Game, GameStatus, League, LeagueFamily, Odds,
    Possession, Situation, TeamLine,
};

/// Why a single event was left out of a normalized batch.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("malformed event: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("event has no id")]
    MissingId,
    #[error("event {0} has no competition")]
    NoCompetition(String),
    #[error("event {0} has no status block")]
    NoStatus(String),
    #[error("event {id} has no {side} competitor")]
    MissingCompetitor { id: String, side: &'static str },
    #[error("event {id}: {side} competitor has no team name")]
    MissingTeam { id: String, side: &'static str },
}

/// Turn one league's scoreboard into games. A document without `events` is an
/// empty scoreboard, not an error.
pub fn normalize(payload: &ScoreboardResponse, league: League) -> Vec<Game> {
    let Some(events) = payload.events.as_deref() else {
        return Vec::new();
    };

    events
        .iter()
        .enumerate()
        .filter_map(|(idx, raw)| match normalize_event(raw, league) {
            Ok(game) => Some(game),
            Err(e) => {
                warn!("{league}: skipping event #{idx}: {e}");
                None
            }
        })
        .collect()
}

pub fn normalize_event(raw: &Value, league: League) -> Result<Game, EventError> {
    let event = EspnEvent::deserialize(raw)?;

    let id = event
        .id
        .clone()
        .filter(|id| !id.is_empty())
        .ok_or(EventError::MissingId)?;

    let competition: &EspnCompetition = event
        .competitions
        .as_deref()
        .and_then(<[EspnCompetition]>::first)
        .ok_or_else(|| EventError::NoCompetition(id.clone()))?;

    let status = competition
        .status
        .as_ref()
        .or(event.status.as_ref())
        .map(map_status)
        .ok_or_else(|| EventError::NoStatus(id.clone()))?;

    let competitors = competition.competitors.as_deref().unwrap_or_default();
    let home_raw = find_side(competitors, "home", &id)?;
    let away_raw = find_side(competitors, "away", &id)?;
    let home = map_team(home_raw, league, "home", &id)?;
    let away = map_team(away_raw, league, "away", &id)?;

    let situation = competition
        .situation
        .as_ref()
        .and_then(|s| map_situation(s, league, &home.id, &away.id));

    Ok(Game {
        name: event.name.clone().unwrap_or_default(),
        short_name: event.short_name.clone().unwrap_or_default(),
        start_time: event.date.as_deref().and_then(parse_event_date),
        venue: competition
            .venue
            .as_ref()
            .and_then(|v| v.full_name.clone()),
        broadcast: competition
            .broadcasts
            .as_deref()
            .and_then(<[_]>::first)
            .and_then(|b| b.names.as_deref())
            .and_then(<[String]>::first)
            .cloned(),
        attendance: competition.attendance.filter(|a| *a > 0),
        odds: competition
            .odds
            .as_deref()
            .and_then(<[_]>::first)
            .map(|o| Odds {
                details: o.details.clone(),
                over_under: o.over_under.clone(),
            }),
        id,
        league,
        home,
        away,
        status,
        situation,
    })
}

fn find_side<'a>(
    competitors: &'a [EspnCompetitor],
    side: &'static str,
    id: &str,
) -> Result<&'a EspnCompetitor, EventError> {
    competitors
        .iter()
        .find(|c| c.home_away.as_deref() == Some(side))
        .ok_or_else(|| EventError::MissingCompetitor { id: id.to_owned(), side })
}

fn map_team(
    c: &EspnCompetitor,
    league: League,
    side: &'static str,
    id: &str,
) -> Result<TeamLine, EventError> {
    let team = c.team.as_ref();
    let name = team
        .and_then(|t| t.display_name.clone())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| EventError::MissingTeam { id: id.to_owned(), side })?;

    let abbreviation = team
        .and_then(|t| t.abbreviation.clone())
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| fallback_abbreviation(&name));

    Ok(TeamLine {
        id: team
            .and_then(|t| t.id.clone())
            .or_else(|| c.id.clone())
            .unwrap_or_default(),
        color: parse_team_color(team.and_then(|t| t.color.as_deref()), league.default_color()),
        logo: team.and_then(|t| t.logo.clone()),
        score: c.score.clone().unwrap_or_else(|| "0".to_string()),
        record: c
            .records
            .as_deref()
            .and_then(<[_]>::first)
            .and_then(|r| r.summary.clone())
            .filter(|s| !s.is_empty()),
        line_scores: c
            .linescores
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(format_line_score)
            .collect(),
        name,
        abbreviation,
    })
}

fn map_status(s: &EspnStatus) -> GameStatus {
    let status_type = s.status_type.as_ref();
    GameStatus {
        description: status_type
            .and_then(|t| t.description.clone())
            .unwrap_or_default(),
        detail: status_type.and_then(|t| t.detail.clone()).unwrap_or_default(),
        completed: status_type.and_then(|t| t.completed).unwrap_or(false),
        period: s.period.unwrap_or(0),
        clock: s.display_clock.clone().unwrap_or_default(),
    }
}

fn map_situation(s: &EspnSituation, league: League, home_id: &str, away_id: &str) -> Option<Situation> {
    match league.family() {
        LeagueFamily::Football => {
            let situation = FootballSituation {
                possession: s
                    .possession
                    .as_deref()
                    .filter(|p| !p.is_empty())
                    .map(|p| resolve_possession(p, home_id, away_id)),
                down_distance: s.down_distance_text.clone().filter(|t| !t.is_empty()),
                field_position: s.possession_text.clone().filter(|t| !t.is_empty()),
            };
            (situation != FootballSituation::default()).then_some(Situation::Football(situation))
        }
        LeagueFamily::Baseball => {
            let situation = BaseballSituation {
                batter: s
                    .batter
                    .as_ref()
                    .and_then(|b| b.athlete.as_ref())
                    .and_then(|a| a.display_name.clone()),
                balls: s.balls,
                strikes: s.strikes,
                outs: s.outs,
                on_first: s.on_first.unwrap_or(false),
                on_second: s.on_second.unwrap_or(false),
                on_third: s.on_third.unwrap_or(false),
            };
            (situation != BaseballSituation::default()).then_some(Situation::Baseball(situation))
        }
        LeagueFamily::Basketball | LeagueFamily::Hockey => None,
    }
}

fn resolve_possession(team_id: &str, home_id: &str, away_id: &str) -> Possession {
    if !home_id.is_empty() && team_id == home_id {
        Possession::Home
    } else if !away_id.is_empty() && team_id == away_id {
        Possession::Away
    } else {
        Possession::Unknown
    }
}

/// ESPN team colors are bare 6-digit hex ("00338d"). Anything else gets the
/// league color.
pub fn parse_team_color(raw: Option<&str>, fallback: u32) -> u32 {
    raw.filter(|s| s.len() == 6 && s.bytes().all(|b| b.is_ascii_hexdigit()))
        .and_then(|s| u32::from_str_radix(s, 16).ok())
        .unwrap_or(fallback)
}

pub fn fallback_abbreviation(name: &str) -> String {
    name.chars().take(3).collect::<String>().to_uppercase()
}

fn format_line_score(ls: &EspnLineScore) -> String {
    if let Some(display) = ls.display_value.as_ref().filter(|d| !d.is_empty()) {
        return display.clone();
    }
    match ls.value {
        Some(v) if v.fract() == 0.0 => format!("{}", v as i64),
        Some(v) => v.to_string(),
        None => "-".to_string(),
    }
}

fn parse_event_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%MZ")
                .ok()
                .map(|naive| naive.and_utc())
        })
}
