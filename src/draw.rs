use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Paragraph, Tabs};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::render::{PresentationPayload, render_game, status_text};
use crate::state::board::Card;
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::ui::layout::LayoutAreas;
use scoreboard_api::{Game, GamePhase};

static TABS: &[&str; 2] = &["Scoreboard", "Tracked"];

const CARD_WIDTH: u16 = 40;

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let result = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }

        match app.state.active_tab {
            MenuItem::Scoreboard => draw_scoreboard(f, layout.main, app),
            MenuItem::Tracked => draw_tracked(f, layout.main, app),
            MenuItem::Help => draw_help(f, layout.main),
        }

        if let Some(logs) = layout.logs {
            draw_logs(f, logs);
        }
        draw_status_bar(f, layout.status, app);
        draw_loading_spinner(f, f.area(), app, loading);
    });

    if let Err(e) = result {
        log::error!("draw failed: {e}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = match app.state.active_tab {
        MenuItem::Scoreboard => 0,
        MenuItem::Tracked => 1,
        MenuItem::Help => 0,
    };

    let titles: Vec<Line> = TABS
        .iter()
        .map(|t| match *t {
            "Tracked" => Line::from(format!("Tracked ({})", app.state.board.tracked.len())),
            _ => Line::from(*t),
        })
        .collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new("Help: ? ")
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

fn draw_scoreboard(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Scoreboard ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let scoreboard = &app.state.scoreboard;
    let Some(league) = scoreboard.current_league() else {
        draw_centered(f, inner, "No leagues enabled. Check SCORETRACK_LEAGUES.");
        return;
    };

    let [header, key_legend, content] =
        Layout::vertical([Constraint::Length(1), Constraint::Length(1), Constraint::Fill(1)])
            .areas(inner);

    let mut league_spans = Vec::new();
    for (idx, l) in scoreboard.leagues.iter().enumerate() {
        let style = if idx == scoreboard.selected_league {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        league_spans.push(Span::styled(format!(" {} ", l.display_name()), style));
    }
    if let Some(loaded) = scoreboard.loaded_at.get(&league) {
        league_spans.push(Span::styled(
            format!("  updated {}", loaded.format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(league_spans)), header);
    f.render_widget(
        Paragraph::new("Keys: h/l=league  j/k=move  Enter=track game  t=track league  T=track all  r/R=refresh  s=stop")
            .style(Style::default().fg(Color::DarkGray)),
        key_legend,
    );

    let Some(games) = scoreboard.games.get(&league) else {
        draw_centered(f, content, &format!("Loading {} scores...", league.display_name()));
        return;
    };
    if games.is_empty() {
        draw_centered(f, content, &format!("No {} games scheduled today.", league.display_name()));
        return;
    }

    let mut list_area = content;
    if content.width >= CARD_WIDTH * 2 + 10 {
        let [left, right] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Length(CARD_WIDTH)]).areas(content);
        list_area = left;
        if let Some(selected) = games.get(scoreboard.selected_game) {
            let payload = render_game(selected);
            let height = card_height(&payload).min(right.height);
            draw_card(f, Rect::new(right.x, right.y, right.width, height), &payload, None);
        }
    }

    let lines: Vec<Line> = games
        .iter()
        .enumerate()
        .map(|(idx, game)| {
            let selected = idx == scoreboard.selected_game;
            let tracked = app.state.board.is_tracked(&game.id);
            scoreboard_line(idx + 1, game, selected, tracked)
        })
        .collect();

    // Keep the cursor visible on long slates.
    let rows = list_area.height as usize;
    let skip = scoreboard.selected_game.saturating_sub(rows.saturating_sub(1));
    f.render_widget(Paragraph::new(lines).scroll((skip as u16, 0)), list_area);
}

fn scoreboard_line(number: usize, game: &Game, selected: bool, tracked: bool) -> Line<'static> {
    let marker = if selected { ">" } else { " " };
    let star = if tracked { "*" } else { " " };
    let status = match game.phase() {
        GamePhase::Scheduled => game
            .start_time
            .map(|t| t.with_timezone(&chrono::Local).format("%a %I:%M %p").to_string())
            .unwrap_or_else(|| status_text(game)),
        _ => status_text(game),
    };

    let style = phase_style(game.phase());
    let style = if selected { style.add_modifier(Modifier::BOLD) } else { style };
    Line::from(vec![
        Span::raw(format!("{marker}{star}{number:>2}. ")),
        Span::styled(
            format!(
                "{:<4} {:>3}  @  {:<4} {:>3}   ",
                game.away.abbreviation, game.away.score, game.home.abbreviation, game.home.score
            ),
            style,
        ),
        Span::styled(status, Style::default().fg(Color::Gray)),
    ])
}

fn draw_tracked(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Tracked Games ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let cards = &app.state.board.cards;
    if cards.is_empty() {
        draw_centered(
            f,
            inner,
            "Nothing tracked. Press t on the Scoreboard tab to track a league, Enter for one game.",
        );
        return;
    }

    let columns = (inner.width / CARD_WIDTH).max(1) as usize;
    let column_areas = Layout::horizontal(vec![Constraint::Fill(1); columns]).split(inner);

    let mut offsets = vec![0u16; columns];
    for (idx, card) in cards.iter().enumerate() {
        let col = idx % columns;
        let column = column_areas[col];
        let height = card_height(&card.payload);
        let y = offsets[col];
        if y + height > column.height {
            continue;
        }
        let rect = Rect::new(column.x, column.y + y, column.width, height);
        let selected = idx == app.state.board.selected;
        let tracked = app.state.board.is_tracked(&card.payload.game_id);
        draw_card(f, rect, &card.payload, Some(CardView { card, selected, tracked }));
        offsets[col] += height;
    }
}

fn card_lines(payload: &PresentationPayload) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for field in &payload.fields {
        if field.inline {
            lines.push(Line::from(vec![
                Span::styled(format!("{}: ", field.name), Style::default().fg(Color::Gray)),
                Span::raw(field.value.clone()),
            ]));
        } else {
            lines.push(Line::from(Span::styled(
                field.name.clone(),
                Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD),
            )));
            lines.extend(field.value.lines().map(|l| Line::from(l.to_string())));
        }
    }
    lines
}

fn card_height(payload: &PresentationPayload) -> u16 {
    card_lines(payload).len() as u16 + 2
}

/// Board-only details drawn around a card's payload.
struct CardView<'a> {
    card: &'a Card,
    selected: bool,
    tracked: bool,
}

fn draw_card(f: &mut Frame, area: Rect, payload: &PresentationPayload, view: Option<CardView>) {
    let (badge, badge_style) = match payload.phase {
        GamePhase::Live => ("● LIVE", Style::default().fg(Color::Red)),
        GamePhase::Final => ("✔ FINAL", Style::default().fg(Color::Green)),
        GamePhase::Scheduled => ("◷ SCHEDULED", Style::default().fg(Color::Cyan)),
    };

    let selected = view.as_ref().is_some_and(|v| v.selected);
    let stale = view.as_ref().is_some_and(|v| !v.tracked && payload.phase != GamePhase::Final);
    let border = match (selected, stale) {
        (true, _) => Color::Yellow,
        (false, true) => Color::DarkGray,
        (false, false) => card_color(payload.color),
    };
    let mut footer = payload.footer.clone();
    if let Some(CardView { card, .. }) = view {
        footer = format!(
            "{footer} · {} r{} · {}",
            card.handle,
            card.revision,
            card.updated_at.format("%H:%M:%S")
        );
    }
    if stale {
        footer = format!("{footer} · not updating");
    }

    let block = default_border(border)
        .title(Line::from(vec![
            Span::styled(format!(" {badge} "), badge_style),
            Span::styled(format!("{} ", payload.title), Style::default().add_modifier(Modifier::BOLD)),
        ]))
        .title_bottom(Line::from(format!(" {footer} ")).right_aligned());
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(Paragraph::new(card_lines(payload)), inner);
}

/// Team colors straight from the feed; near-black ones are lifted so the
/// border stays visible on dark terminals.
fn card_color(rgb: u32) -> Color {
    let (r, g, b) = ((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8);
    if u16::from(r) + u16::from(g) + u16::from(b) < 60 {
        return Color::Gray;
    }
    Color::Rgb(r, g, b)
}

fn phase_style(phase: GamePhase) -> Style {
    match phase {
        GamePhase::Live => Style::default().fg(Color::White),
        GamePhase::Final => Style::default().fg(Color::DarkGray),
        GamePhase::Scheduled => Style::default().fg(Color::Cyan),
    }
}

fn draw_help(f: &mut Frame, area: Rect) {
    let block = default_border(Color::DarkGray).title(" Help ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = [
        ("q / Ctrl-c", "quit"),
        ("1 / 2", "Scoreboard / Tracked tab"),
        ("? / Esc", "open / close this help"),
        ("h l", "previous / next league"),
        ("j k", "move cursor"),
        ("Enter", "track the selected game"),
        ("t / T", "track every active game in this league / all leagues"),
        ("r / R", "refresh this league / all leagues"),
        ("x", "dismiss the selected card and stop tracking it"),
        ("s", "stop tracking everything"),
        ("f", "full screen"),
        ("\"", "toggle log pane"),
    ];
    let lines: Vec<Line> = rows
        .iter()
        .map(|(key, what)| {
            Line::from(vec![
                Span::styled(format!("{key:>12}  "), Style::default().fg(Color::Yellow)),
                Span::raw(*what),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::White))
        .style_debug(Style::default().fg(Color::DarkGray))
        .output_target(false)
        .output_file(false)
        .output_line(false);
    f.render_widget(logs, area);
}

fn draw_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = Vec::new();
    if let Some((report, at)) = &app.state.last_pass {
        spans.push(Span::styled(
            format!(
                " pass {}: {} tracked, {} pushed, {} evicted ",
                at.format("%H:%M:%S"),
                report.tracked,
                report.pushed(),
                report.evicted()
            ),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if let Some(error) = &app.state.last_error {
        spans.push(Span::styled(format!(" {error} "), Style::default().fg(Color::Red)));
    } else if let Some(notice) = app.state.notices.front() {
        spans.push(Span::styled(format!(" {notice} "), Style::default().fg(Color::Green)));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_centered(f: &mut Frame, area: Rect, msg: &str) {
    f.render_widget(
        Paragraph::new(msg.to_string())
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        area,
    );
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}
