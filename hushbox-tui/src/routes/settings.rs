use hushbox_core::{EngineCommand, EngineHandle};
use ratatui::{
    Frame,
    crossterm::event::KeyCode,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

use crate::{
    router::{RouteAction, RouteHandler},
    state::AppState,
    states::SettingsOption,
};

#[derive(Debug, Clone)]
pub struct SettingsRoute;

impl RouteHandler for SettingsRoute {
    fn render(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        draw_settings_panel(frame, area, state);
    }

    fn handle_input(
        &mut self,
        key: KeyCode,
        state: &mut AppState,
        handle: &EngineHandle,
    ) -> anyhow::Result<RouteAction> {
        match key {
            KeyCode::Up => state.settings.prev_item(),
            KeyCode::Down => state.settings.next_item(),
            KeyCode::Enter | KeyCode::Right => match state.settings.selected() {
                Some(SettingsOption::FadeOut) => {
                    handle
                        .cmd_tx
                        .send(EngineCommand::SetFadeOut(state.timer.next_fade_out()))?;
                }
                Some(SettingsOption::Layout) => {
                    handle
                        .cmd_tx
                        .send(EngineCommand::SetLayout(state.audio.layout.toggled()))?;
                }
                None => {}
            },
            _ => {}
        }
        Ok(RouteAction::None)
    }

    fn name(&self) -> &str {
        "Settings"
    }
}

pub fn draw_settings_panel(f: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .title(" Settings ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    f.render_widget(block, area);

    let items: Vec<ListItem> = state
        .settings
        .items
        .iter()
        .enumerate()
        .map(|(i, setting)| {
            let is_selected = state.settings.selected_index == i;

            let value = match setting {
                SettingsOption::FadeOut => state.timer.fade_out.to_string(),
                SettingsOption::Layout => state.audio.layout.to_string(),
            };

            let prefix = if is_selected { "▶ " } else { "  " };
            let style = if is_selected {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };

            ListItem::new(Line::from(vec![
                Span::styled(format!("{}{}", prefix, setting), style),
                Span::raw(" "),
                Span::styled(format!("[{}]", value), Style::default().fg(Color::Cyan)),
            ]))
        })
        .collect();

    f.render_widget(List::new(items), inner);
}
