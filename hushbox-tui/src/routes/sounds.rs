use hushbox_core::{EngineCommand, EngineHandle};
use ratatui::{
    Frame,
    crossterm::event::KeyCode,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};

use crate::{
    router::{RouteAction, RouteHandler},
    state::{AppState, InputMode},
    states::CatalogRow,
};

/// Sound catalog; Enter plays the selection, `a` adds a custom track
#[derive(Debug, Clone)]
pub struct SoundsRoute;

impl RouteHandler for SoundsRoute {
    fn render(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        draw_sounds_panel(frame, area, state);
    }

    fn handle_input(
        &mut self,
        key: KeyCode,
        state: &mut AppState,
        handle: &EngineHandle,
    ) -> anyhow::Result<RouteAction> {
        match key {
            KeyCode::Up => state.catalog.prev(),
            KeyCode::Down => state.catalog.next(),
            KeyCode::Enter => {
                if let Some(sound) = state.catalog.selected_sound() {
                    handle.cmd_tx.send(EngineCommand::SelectSound(sound.clone()))?;
                }
            }
            KeyCode::Char('a') => return Ok(RouteAction::Push(Box::new(CustomTrackRoute))),
            _ => {}
        }
        Ok(RouteAction::None)
    }

    fn name(&self) -> &str {
        "Sounds"
    }

    fn help_items(&self, _state: &AppState) -> Vec<(&str, &str)> {
        vec![
            ("Enter", "Play/Toggle"),
            ("A", "Custom Track"),
            ("Tab", "Switch Tab"),
            ("Q", "Quit"),
        ]
    }
}

/// Text input for a custom track URL, drawn over the sound list
#[derive(Debug, Clone)]
pub struct CustomTrackRoute;

impl RouteHandler for CustomTrackRoute {
    fn render(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        draw_sounds_panel(frame, area, state);
        draw_input_dialog(frame, area, state);
    }

    fn handle_input(
        &mut self,
        key: KeyCode,
        state: &mut AppState,
        handle: &EngineHandle,
    ) -> anyhow::Result<RouteAction> {
        match key {
            KeyCode::Char(c) => state.catalog.input.push(c),
            KeyCode::Backspace => {
                state.catalog.input.pop();
            }
            KeyCode::Enter => {
                let url = state.catalog.take_input();
                handle.cmd_tx.send(EngineCommand::AddCustomTrack(url))?;
                return Ok(RouteAction::Pop);
            }
            KeyCode::Esc => return Ok(RouteAction::Pop),
            _ => {}
        }
        Ok(RouteAction::None)
    }

    fn name(&self) -> &str {
        "Custom Track"
    }

    fn on_enter(&mut self, state: &mut AppState, _handle: &EngineHandle) -> anyhow::Result<()> {
        state.input_mode = InputMode::Editing;
        state.catalog.input.clear();
        Ok(())
    }

    fn on_exit(&mut self, state: &mut AppState, _handle: &EngineHandle) -> anyhow::Result<()> {
        state.input_mode = InputMode::Normal;
        Ok(())
    }

    fn help_items(&self, _state: &AppState) -> Vec<(&str, &str)> {
        vec![("Enter", "Add"), ("Esc", "Cancel")]
    }
}

pub fn draw_sounds_panel(f: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .title(" Sounds ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let current = &state.audio.current.locator;
    let items: Vec<ListItem> = state
        .catalog
        .rows
        .iter()
        .map(|row| match row {
            CatalogRow::Header(name) => ListItem::new(Line::from(Span::styled(
                name.clone(),
                Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::BOLD),
            ))),
            CatalogRow::Sound(sound) => {
                let marker = if &sound.locator == current {
                    if state.audio.loading.is_some() {
                        "… "
                    } else if state.audio.is_playing {
                        "▶ "
                    } else {
                        "⏸ "
                    }
                } else {
                    "  "
                };
                ListItem::new(Line::from(vec![
                    Span::styled(marker, Style::default().fg(Color::Green)),
                    Span::raw(sound.name.clone()),
                    Span::styled(
                        format!("  {}", sound.duration.as_deref().unwrap_or("")),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]))
            }
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");

    // Rendering needs a mutable ListState for the scroll offset.
    let mut list_state = state.catalog.list_state.clone();
    f.render_stateful_widget(list, area, &mut list_state);
}

fn draw_input_dialog(f: &mut Frame, area: Rect, state: &AppState) {
    let popup = centered_rect(area, 70, 5);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .title(" Add a SoundCloud track ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let text = vec![
        Line::from(vec![
            Span::raw(state.catalog.input.clone()),
            Span::styled("█", Style::default().fg(Color::Yellow)),
        ]),
        Line::from(Span::styled(
            "Paste a link and press Enter",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    f.render_widget(Paragraph::new(text), inner);
}

fn centered_rect(area: Rect, percent_x: u16, height: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
