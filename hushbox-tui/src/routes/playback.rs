use hushbox_core::{EngineCommand, EngineHandle, TimerPhase};
use ratatui::{
    Frame,
    crossterm::event::KeyCode,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
};

use crate::{
    router::{RouteAction, RouteHandler},
    state::AppState,
    states::AudioState,
};

#[derive(Debug, Clone)]
pub struct PlaybackRoute;

impl RouteHandler for PlaybackRoute {
    fn render(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        draw_playback_panel(frame, area, state);
    }

    fn handle_input(
        &mut self,
        key: KeyCode,
        state: &mut AppState,
        handle: &EngineHandle,
    ) -> anyhow::Result<RouteAction> {
        match key {
            KeyCode::Up => {
                handle
                    .cmd_tx
                    .send(EngineCommand::SetVolume(state.audio.volume_up()))?;
            }
            KeyCode::Down => {
                handle
                    .cmd_tx
                    .send(EngineCommand::SetVolume(state.audio.volume_down()))?;
            }
            KeyCode::Char('p') => handle.cmd_tx.send(EngineCommand::Play)?,
            KeyCode::Char('s') => handle.cmd_tx.send(EngineCommand::Pause)?,
            _ => {}
        }
        Ok(RouteAction::None)
    }

    fn name(&self) -> &str {
        "Playback"
    }

    fn help_items(&self, _state: &AppState) -> Vec<(&str, &str)> {
        vec![
            ("Space", "Play/Pause"),
            ("↑/↓", "Volume"),
            ("Tab", "Switch Tab"),
            ("Q", "Quit"),
        ]
    }
}

/// Draw the playback panel
pub fn draw_playback_panel(f: &mut Frame, area: Rect, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Now playing info
            Constraint::Length(3), // Progress bar
            Constraint::Length(3), // Volume
            Constraint::Min(0),
        ])
        .split(area);

    draw_now_playing(f, chunks[0], state);
    draw_progress(f, chunks[1], &state.audio);
    draw_volume(f, chunks[2], &state.audio);
}

fn draw_now_playing(f: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .title(" 🎵 Now Playing ")
        .borders(Borders::ALL)
        .border_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

    let inner = block.inner(area);
    f.render_widget(block, area);

    let audio = &state.audio;
    let status = if audio.loading.is_some() {
        Span::styled("Loading...", Style::default().fg(Color::Yellow))
    } else if audio.is_playing {
        Span::styled("▶ Playing", Style::default().fg(Color::Green))
    } else {
        Span::styled("⏸ Paused", Style::default().fg(Color::Gray))
    };

    let mut timer_line = vec![Span::styled(
        format!("Sleep timer: {}", state.timer.remaining_label()),
        Style::default().fg(Color::DarkGray),
    )];
    if state.timer.phase == TimerPhase::Fading {
        timer_line.push(Span::styled("  fading", Style::default().fg(Color::Magenta)));
    }

    let text = vec![
        Line::from(Span::styled(
            audio.current.name.clone(),
            Style::default().fg(Color::White).bold(),
        )),
        Line::from(Span::styled(
            audio.current.duration.clone().unwrap_or_default(),
            Style::default().fg(Color::Gray),
        )),
        Line::from(status),
        Line::from(timer_line),
    ];

    f.render_widget(Paragraph::new(text), inner);
}

fn draw_progress(f: &mut Frame, area: Rect, audio: &AudioState) {
    let label = format!(
        "{} / {}",
        AudioState::format_time(audio.position_ms),
        AudioState::format_time(audio.duration_ms)
    );

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::DarkGray))
        .ratio(audio.progress())
        .label(label);

    f.render_widget(gauge, area);
}

fn draw_volume(f: &mut Frame, area: Rect, audio: &AudioState) {
    let gauge = Gauge::default()
        .block(Block::default().title(" Volume ").borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Green).bg(Color::DarkGray))
        .percent(u16::from(audio.volume))
        .label(format!("{}%", audio.volume));

    f.render_widget(gauge, area);
}
