use hushbox_core::EngineHandle;
use ratatui::{
    Frame,
    crossterm::event::KeyCode,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders},
};
use tui_logger::{TuiLoggerWidget, TuiWidgetEvent, TuiWidgetState};

use crate::{
    router::{RouteAction, RouteHandler},
    state::AppState,
};

pub struct LogRoute {
    widget_state: TuiWidgetState,
}

impl std::fmt::Debug for LogRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogRoute").finish_non_exhaustive()
    }
}

impl LogRoute {
    pub fn new() -> Self {
        Self {
            widget_state: TuiWidgetState::new(),
        }
    }
}

impl RouteHandler for LogRoute {
    fn render(&self, frame: &mut Frame, area: Rect, _state: &AppState) {
        let widget = TuiLoggerWidget::default()
            .block(
                Block::default()
                    .title(" 📋 Log (PgUp/PgDn to Scroll) ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .style_error(Style::default().fg(Color::Red))
            .style_warn(Style::default().fg(Color::Yellow))
            .style_info(Style::default().fg(Color::Cyan))
            .style_debug(Style::default().fg(Color::Green))
            .style_trace(Style::default().fg(Color::Magenta))
            .state(&self.widget_state);

        frame.render_widget(widget, area);
    }

    fn handle_input(
        &mut self,
        key: KeyCode,
        _state: &mut AppState,
        _handle: &EngineHandle,
    ) -> anyhow::Result<RouteAction> {
        match key {
            KeyCode::PageUp | KeyCode::Up => self.widget_state.transition(TuiWidgetEvent::PrevPageKey),
            KeyCode::PageDown | KeyCode::Down => {
                self.widget_state.transition(TuiWidgetEvent::NextPageKey)
            }
            KeyCode::End => self.widget_state.transition(TuiWidgetEvent::EscapeKey),
            _ => {}
        }
        Ok(RouteAction::None)
    }

    fn name(&self) -> &str {
        "Log"
    }
}
