//! Layout and drawing: playfield, sidebar, game-over summary.

use crate::app::Screen;
use crate::game::{Cell, RoundController};
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};
use std::time::Instant;
use tachyonfx::{Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx};

/// Each grid cell is drawn two terminal columns wide, one row tall.
const CELL_WIDTH: u16 = 2;
const SIDEBAR_WIDTH: u16 = 20;
/// Duration of the game-over summary fade-in in ms.
const OVER_FADE_MS: u32 = 400;

/// Playfield size in terminal cells (border included) for given grid dimensions.
fn playfield_pixel_size(width: u16, height: u16) -> (u16, u16) {
    (width * CELL_WIDTH + 2, height + 2)
}

/// Draw the current screen. While the game-over summary is up, the final
/// board stays visible underneath the popup.
pub fn draw(
    frame: &mut Frame,
    screen: Screen,
    round: &RoundController,
    theme: &Theme,
    best_score: u32,
    new_best: bool,
    area: Rect,
    over_effect: &mut Option<Effect>,
    over_effect_time: &mut Option<Instant>,
    now: Instant,
) {
    draw_game(frame, round, theme, best_score, area);
    if screen == Screen::GameOver {
        draw_game_over(
            frame,
            round,
            theme,
            best_score,
            new_best,
            area,
            over_effect,
            over_effect_time,
            now,
        );
    }
}

/// Playfield + sidebar, centered in the terminal.
fn draw_game(
    frame: &mut Frame,
    round: &RoundController,
    theme: &Theme,
    best_score: u32,
    area: Rect,
) {
    let field = round.field();
    let (pw, ph) = playfield_pixel_size(field.width as u16, field.height as u16);
    let total_w = pw + SIDEBAR_WIDTH;

    let horiz_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);

    let vert_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(ph),
            Constraint::Fill(1),
        ])
        .split(horiz_chunks[1]);

    let active_area = vert_chunks[1];
    let (playfield_area, sidebar_area) = {
        let inner = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(pw), Constraint::Length(SIDEBAR_WIDTH)])
            .split(active_area);
        (inner[0], inner[1])
    };

    draw_playfield(frame, round, theme, playfield_area);
    draw_sidebar(frame, round, theme, best_score, sidebar_area);
}

fn draw_playfield(frame: &mut Frame, round: &RoundController, theme: &Theme, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(" blockfall ", theme.title));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let buf = frame.buffer_mut();
    for (y, row) in round.field().rows().iter().enumerate() {
        for (x, &cell) in row.iter().enumerate() {
            let color = match cell {
                Cell::Empty => theme.bg,
                Cell::Locked => theme.locked,
                Cell::Active => theme.active,
            };
            let rx = inner.x + (x as u16) * CELL_WIDTH;
            let ry = inner.y + y as u16;
            if rx + CELL_WIDTH <= inner.x + inner.width && ry < inner.y + inner.height {
                buf.set_string(rx, ry, "  ", Style::default().bg(color));
            }
        }
    }
}

fn draw_sidebar(
    frame: &mut Frame,
    round: &RoundController,
    theme: &Theme,
    best_score: u32,
    area: Rect,
) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!(" Score  {}", round.score()),
            Style::default().fg(theme.main_fg).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!(" Best   {}", best_score.max(round.score())),
            Style::default().fg(theme.main_fg),
        )),
        Line::from(""),
        Line::from(Span::styled(" ←/→  move", Style::default().fg(theme.main_fg))),
        Line::from(Span::styled(" ↑    rotate", Style::default().fg(theme.main_fg))),
        Line::from(Span::styled(" ↓    drop", Style::default().fg(theme.main_fg))),
        Line::from(Span::styled(" q    quit", Style::default().fg(theme.main_fg))),
    ];
    let p = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
    );
    p.render(area, frame.buffer_mut());
}

/// Game-over summary popup with a short fade-in over the final board.
fn draw_game_over(
    frame: &mut Frame,
    round: &RoundController,
    theme: &Theme,
    best_score: u32,
    new_best: bool,
    area: Rect,
    over_effect: &mut Option<Effect>,
    over_effect_time: &mut Option<Instant>,
    now: Instant,
) {
    let popup_w = 30u16;
    let popup_h = if new_best { 9u16 } else { 8u16 };
    let popup = Rect {
        x: area.x + area.width.saturating_sub(popup_w) / 2,
        y: area.y + area.height.saturating_sub(popup_h) / 2,
        width: popup_w.min(area.width),
        height: popup_h.min(area.height),
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Game Over ",
            Style::default().fg(Color::White).bg(Color::Red),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(" Score: {} ", round.score()),
            Style::default().fg(theme.main_fg),
        )),
        Line::from(Span::styled(
            format!(" Best: {} ", best_score),
            Style::default().fg(theme.main_fg),
        )),
    ];
    if new_best {
        lines.push(Line::from(Span::styled(
            " New record! ",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " R — Restart    Q — Quit ",
        Style::default().fg(theme.main_fg),
    )));

    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
            .title(Span::styled(" blockfall ", theme.title)),
    );
    p.render(popup, frame.buffer_mut());

    // TachyonFX fade-in: created on the first frame after the transition.
    let delta = over_effect_time
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u128::from(u32::MAX)) as u32;
    *over_effect_time = Some(now);

    if over_effect.is_none() {
        let effect = fx::fade_from(theme.bg, theme.bg, (OVER_FADE_MS, Interpolation::Linear))
            .with_area(popup);
        *over_effect = Some(effect);
    }
    if let Some(effect) = over_effect {
        frame.render_effect(effect, popup, TfxDuration::from_millis(delta_ms));
    }
}
