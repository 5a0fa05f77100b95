use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::{
    router::{Router, tab_names},
    state::AppState,
};

/// Draw the TUI interface
pub fn draw(f: &mut Frame, state: &AppState, router: &Router) {
    // Sidebar on the left, current route on the right
    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .margin(1)
        .constraints([Constraint::Length(15), Constraint::Min(40)])
        .split(f.area());

    draw_sidebar(f, main_chunks[0], router);
    draw_main_content(f, main_chunks[1], state, router);
}

fn draw_sidebar(f: &mut Frame, area: Rect, router: &Router) {
    let block = Block::default()
        .title(" Navigation ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    f.render_widget(block, area);

    let active = router.root_name();
    let nav_text: Vec<Line> = tab_names()
        .iter()
        .map(|tab| {
            let is_active = *tab == active;
            let prefix = if is_active { "▶ " } else { "  " };
            let style = if is_active {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            Line::from(Span::styled(format!("{}{}", prefix, tab), style))
        })
        .collect();

    f.render_widget(Paragraph::new(nav_text), inner);
}

fn draw_main_content(f: &mut Frame, area: Rect, state: &AppState, router: &Router) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Route content
            Constraint::Length(3), // Controls info
            Constraint::Length(3), // Status bar
        ])
        .split(area);

    router.current().render(f, chunks[0], state);
    draw_controls(f, chunks[1], state, router);
    draw_status(f, chunks[2], state);
}

fn draw_controls(f: &mut Frame, area: Rect, state: &AppState, router: &Router) {
    let mut spans = Vec::new();
    for (key, action) in router.current().help_items(state) {
        spans.push(Span::styled(
            format!(" {} ", key),
            Style::default().fg(Color::Black).bg(Color::Cyan),
        ));
        spans.push(Span::raw(format!(" {}  ", action)));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .block(Block::default().title(" Controls ").borders(Borders::ALL));
    f.render_widget(paragraph, area);
}

fn draw_status(f: &mut Frame, area: Rect, state: &AppState) {
    let audio = &state.audio;
    let style = if audio.error_message.is_some() {
        Style::default().fg(Color::Red)
    } else if audio.ready {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Yellow)
    };

    let line = Line::from(vec![
        Span::styled(audio.status_message.clone(), style),
        Span::styled(
            format!("  │ {} player", audio.layout),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let paragraph =
        Paragraph::new(line).block(Block::default().title(" Status ").borders(Borders::ALL));
    f.render_widget(paragraph, area);
}
