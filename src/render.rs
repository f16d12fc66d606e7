//! Game → presentation payload. Pure; no I/O, no registry access.
use scoreboard_api::{Game, GamePhase, League, Possession, Situation};

#[derive(Debug, Clone, PartialEq)]
pub struct PresentationPayload {
    pub game_id: String,
    pub league: League,
    pub title: String,
    pub phase: GamePhase,
    pub color: u32,
    pub fields: Vec<PayloadField>,
    pub footer: String,
}

impl PresentationPayload {
    pub fn field(&self, name: &str) -> Option<&PayloadField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PayloadField {
    pub name: String,
    pub value: String,
    /// Short enough to sit next to its neighbours instead of on its own row.
    pub inline: bool,
}

impl PayloadField {
    fn inline(name: &str, value: impl Into<String>) -> Self {
        Self { name: name.to_string(), value: value.into(), inline: true }
    }

    fn block(name: &str, value: impl Into<String>) -> Self {
        Self { name: name.to_string(), value: value.into(), inline: false }
    }
}

pub fn render_game(game: &Game) -> PresentationPayload {
    let mut fields = vec![
        PayloadField::inline("Score", score_line(game)),
        PayloadField::inline("Status", status_text(game)),
    ];

    let records = (game.away.record.as_deref(), game.home.record.as_deref());
    if records.0.is_some() || records.1.is_some() {
        fields.push(PayloadField::inline(
            "Records",
            format!("{} / {}", records.0.unwrap_or("-"), records.1.unwrap_or("-")),
        ));
    }
    if let Some(table) = score_breakdown(game) {
        fields.push(PayloadField::block("Line Score", table));
    }
    if let Some(text) = situation_text(game) {
        fields.push(PayloadField::block("Situation", text));
    }
    if let Some(venue) = &game.venue {
        fields.push(PayloadField::inline("Venue", venue.clone()));
    }
    if let Some(broadcast) = &game.broadcast {
        fields.push(PayloadField::inline("Broadcast", broadcast.clone()));
    }
    if let Some(odds) = odds_text(game) {
        fields.push(PayloadField::inline("Odds", odds));
    }
    if let Some(attendance) = game.attendance {
        fields.push(PayloadField::inline("Attendance", attendance.to_string()));
    }

    PresentationPayload {
        game_id: game.id.clone(),
        league: game.league,
        title: format!("{} @ {}", game.away.abbreviation, game.home.abbreviation),
        phase: game.phase(),
        color: game.home.color,
        fields,
        footer: game.league.display_name().to_string(),
    }
}

fn score_line(game: &Game) -> String {
    format!(
        "{} {} - {} {}",
        game.away.abbreviation, game.away.score, game.home.score, game.home.abbreviation
    )
}

/// "Q3 - 7:42" while the clock is running, otherwise ESPN's own detail line.
pub fn status_text(game: &Game) -> String {
    let status = &game.status;
    if game.is_live() && !status.clock.is_empty() {
        return format!("{} - {}", game.league.period_name(status.period), status.clock);
    }
    if status.detail.is_empty() {
        return game.phase().label().to_string();
    }
    status.detail.clone()
}

/// Fixed-width per-period table, or `None` before any period has a score.
pub fn score_breakdown(game: &Game) -> Option<String> {
    if game.away.line_scores.is_empty() {
        return None;
    }

    let away_cols = game.league.line_score_columns(&game.away.line_scores);
    let home_cols = game.league.line_score_columns(&game.home.line_scores);

    let mut header = format!("{:<6}", "Team");
    for (label, _) in &away_cols {
        header.push_str(&format!(" {label:>3}"));
    }
    header.push_str(&format!(" {:>5}", "Total"));

    let mut away_row = format!("{:<6}", game.away.abbreviation);
    for (_, value) in &away_cols {
        away_row.push_str(&format!(" {value:>3}"));
    }
    away_row.push_str(&format!(" {:>5}", game.away.score));

    let mut home_row = format!("{:<6}", game.home.abbreviation);
    for idx in 0..away_cols.len() {
        let value = home_cols.get(idx).map(|(_, v)| *v).unwrap_or("-");
        home_row.push_str(&format!(" {value:>3}"));
    }
    home_row.push_str(&format!(" {:>5}", game.home.score));

    let rule = "-".repeat(header.chars().count());
    Some([header, rule, away_row, home_row].join("\n"))
}

pub fn situation_text(game: &Game) -> Option<String> {
    let mut parts = Vec::new();
    match game.situation.as_ref()? {
        Situation::Football(s) => {
            if let Some(possession) = s.possession {
                let team = match possession {
                    Possession::Home => game.home.abbreviation.as_str(),
                    Possession::Away => game.away.abbreviation.as_str(),
                    Possession::Unknown => "Unknown",
                };
                parts.push(format!("{team} has possession"));
            }
            if let Some(down) = &s.down_distance {
                parts.push(down.clone());
            }
            if let Some(spot) = &s.field_position {
                parts.push(format!("Ball on {spot}"));
            }
        }
        Situation::Baseball(s) => {
            if let Some(batter) = &s.batter {
                parts.push(format!("At Bat: {batter}"));
            }
            if let (Some(balls), Some(strikes)) = (s.balls, s.strikes) {
                parts.push(format!("Count: {balls}-{strikes}, {} out(s)", s.outs.unwrap_or(0)));
            }
            let bases = s.occupied_bases();
            if !bases.is_empty() {
                parts.push(format!("Runners on: {}", bases.join(", ")));
            }
        }
    }
    (!parts.is_empty()).then(|| parts.join("\n"))
}

fn odds_text(game: &Game) -> Option<String> {
    let odds = game.odds.as_ref()?;
    match (odds.details.as_deref(), odds.over_under.as_deref()) {
        (Some(line), Some(total)) => Some(format!("{line} (O/U {total})")),
        (Some(line), None) => Some(line.to_string()),
        (None, Some(total)) => Some(format!("O/U {total}")),
        (None, None) => None,
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use scoreboard_api::{Game, GameStatus, League, TeamLine};

    pub fn game(id: &str, league: League, away: &str, home: &str) -> Game {
        Game {
            id: id.to_string(),
            league,
            name: String::new(),
            short_name: String::new(),
            home: TeamLine {
                id: "1".into(),
                name: "Home Team".into(),
                abbreviation: "HOM".into(),
                color: league.default_color(),
                score: home.to_string(),
                ..Default::default()
            },
            away: TeamLine {
                id: "2".into(),
                name: "Away Team".into(),
                abbreviation: "AWY".into(),
                color: league.default_color(),
                score: away.to_string(),
                ..Default::default()
            },
            status: GameStatus {
                description: "In Progress".into(),
                detail: "In Progress".into(),
                completed: false,
                period: 1,
                clock: "12:00".into(),
            },
            start_time: None,
            venue: None,
            broadcast: None,
            attendance: None,
            odds: None,
            situation: None,
        }
    }

    pub fn finished(mut game: Game) -> Game {
        game.status.completed = true;
        game.status.description = "Final".into();
        game.status.detail = "Final".into();
        game
    }
}
