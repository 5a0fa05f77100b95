use hushbox_core::{EngineCommand, EngineHandle, FadeOut, TimerPhase};
use ratatui::{
    Frame,
    crossterm::event::KeyCode,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::{
    router::{RouteAction, RouteHandler},
    state::AppState,
    states::TimerPreset,
};

#[derive(Debug, Clone)]
pub struct TimerRoute;

impl RouteHandler for TimerRoute {
    fn render(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        draw_timer_panel(frame, area, state);
    }

    fn handle_input(
        &mut self,
        key: KeyCode,
        state: &mut AppState,
        handle: &EngineHandle,
    ) -> anyhow::Result<RouteAction> {
        let view = &mut state.timer;
        match key {
            KeyCode::Up => view.prev(),
            KeyCode::Down => view.next(),
            KeyCode::Char(c) if c.is_ascii_digit() => {
                if view.selected() == Some(TimerPreset::Custom) {
                    view.push_digit(c);
                }
            }
            KeyCode::Backspace => {
                view.custom_minutes.pop();
            }
            KeyCode::Enter => match view.selected_minutes() {
                Some(minutes) => handle.cmd_tx.send(EngineCommand::SetTimer(minutes))?,
                None => log::warn!("Type a number of minutes first"),
            },
            KeyCode::Char('p') => handle.cmd_tx.send(EngineCommand::ToggleTimerPause)?,
            KeyCode::Char('r') => handle.cmd_tx.send(EngineCommand::RestartTimer)?,
            KeyCode::Char('c') => handle.cmd_tx.send(EngineCommand::ClearTimer)?,
            KeyCode::Char('f') => {
                handle
                    .cmd_tx
                    .send(EngineCommand::SetFadeOut(view.next_fade_out()))?;
            }
            _ => {}
        }
        Ok(RouteAction::None)
    }

    fn name(&self) -> &str {
        "Timer"
    }

    fn help_items(&self, _state: &AppState) -> Vec<(&str, &str)> {
        vec![
            ("Enter", "Start"),
            ("P", "Pause/Resume"),
            ("R", "Restart"),
            ("C", "Clear"),
            ("F", "Fade"),
        ]
    }
}

pub fn draw_timer_panel(f: &mut Frame, area: Rect, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(24), Constraint::Min(20)])
        .split(area);

    draw_presets(f, chunks[0], state);
    draw_countdown(f, chunks[1], state);
}

fn draw_presets(f: &mut Frame, area: Rect, state: &AppState) {
    let view = &state.timer;
    let items: Vec<ListItem> = view
        .presets
        .iter()
        .map(|preset| {
            let label = match preset {
                TimerPreset::Custom if !view.custom_minutes.is_empty() => {
                    format!("Custom: {} min", view.custom_minutes)
                }
                _ => preset.label(),
            };
            ListItem::new(label)
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(" Sleep Timer ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");

    let mut list_state = view.list_state.clone();
    f.render_stateful_widget(list, area, &mut list_state);
}

fn draw_countdown(f: &mut Frame, area: Rect, state: &AppState) {
    let view = &state.timer;
    let (phase, color) = match view.phase {
        TimerPhase::Idle => ("Not set", Color::DarkGray),
        TimerPhase::Running if view.elapsed => ("Done", Color::Gray),
        TimerPhase::Running => ("Running", Color::Green),
        TimerPhase::Paused => ("Paused", Color::Yellow),
        TimerPhase::Fading => ("Fading out", Color::Magenta),
    };
    let fade = match view.fade_out {
        FadeOut::Off => "Off (hard stop)".to_string(),
        other => other.to_string(),
    };

    let text = vec![
        Line::from(Span::styled(
            view.remaining_label(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(phase, Style::default().fg(color))),
        Line::from(""),
        Line::from(vec![
            Span::styled("Fade out: ", Style::default().fg(Color::Gray)),
            Span::styled(fade, Style::default().fg(Color::Cyan)),
        ]),
    ];

    let paragraph = Paragraph::new(text).block(Block::default().borders(Borders::ALL));
    f.render_widget(paragraph, area);
}
