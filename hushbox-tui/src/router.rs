use anyhow::Result;
use hushbox_core::EngineHandle;
use ratatui::{Frame, crossterm::event::KeyCode, layout::Rect};

use crate::{
    routes::{
        log::LogRoute, playback::PlaybackRoute, settings::SettingsRoute, sounds::SoundsRoute,
        timer::TimerRoute,
    },
    state::AppState,
};

/// Trait that all routes must implement
pub trait RouteHandler: std::fmt::Debug {
    /// Render this route's UI
    fn render(&self, frame: &mut Frame, area: Rect, state: &AppState);

    /// Handle keyboard input for this route
    fn handle_input(
        &mut self,
        key: KeyCode,
        state: &mut AppState,
        handle: &EngineHandle,
    ) -> Result<RouteAction>;

    /// Get the display name for breadcrumbs/navigation
    fn name(&self) -> &str;

    /// Optional: Called when entering this route
    fn on_enter(&mut self, _state: &mut AppState, _handle: &EngineHandle) -> Result<()> {
        Ok(())
    }

    /// Optional: Called when leaving this route
    fn on_exit(&mut self, _state: &mut AppState, _handle: &EngineHandle) -> Result<()> {
        Ok(())
    }

    fn help_items(&self, _state: &AppState) -> Vec<(&str, &str)> {
        vec![("Space", "Play/Pause"), ("Tab", "Switch Tab"), ("Q", "Quit")]
    }
}

/// Actions that can be returned from route handlers
#[derive(Debug)]
pub enum RouteAction {
    /// Do nothing, stay on current route
    None,
    /// Go back to previous route
    Pop,
    /// Navigate to a new route
    Push(Box<dyn RouteHandler>),
    /// Replace current route with a new one
    Replace(Box<dyn RouteHandler>),
    /// Quit the application
    Quit,
}

/// Router manages the navigation stack
pub struct Router {
    /// Stack of route handlers, last element is current route
    stack: Vec<Box<dyn RouteHandler>>,
}

impl Router {
    pub fn new(initial_route: Box<dyn RouteHandler>) -> Self {
        Self {
            stack: vec![initial_route],
        }
    }

    /// Get current route (top of stack)
    pub fn current(&self) -> &dyn RouteHandler {
        self.stack
            .last()
            .expect("Stack should never be empty")
            .as_ref()
    }

    /// Get mutable reference to current route
    pub fn current_mut(&mut self) -> &mut Box<dyn RouteHandler> {
        self.stack.last_mut().expect("Stack should never be empty")
    }

    /// Name of the tab the stack is rooted at
    pub fn root_name(&self) -> &str {
        self.stack.first().map_or("", |route| route.name())
    }

    /// Execute a route action; returns true when the app should quit
    pub fn execute_action(
        &mut self,
        action: RouteAction,
        state: &mut AppState,
        handle: &EngineHandle,
    ) -> Result<bool> {
        match action {
            RouteAction::None => Ok(false),
            RouteAction::Pop => {
                self.pop(state, handle)?;
                Ok(false)
            }
            RouteAction::Push(route) => {
                self.push(route, state, handle)?;
                Ok(false)
            }
            RouteAction::Replace(route) => {
                self.replace(route, state, handle)?;
                Ok(false)
            }
            RouteAction::Quit => Ok(true),
        }
    }

    /// Navigate to a new route (push onto stack)
    pub fn push(
        &mut self,
        mut route: Box<dyn RouteHandler>,
        state: &mut AppState,
        handle: &EngineHandle,
    ) -> Result<()> {
        route.on_enter(state, handle)?;
        self.stack.push(route);
        Ok(())
    }

    /// Go back (pop from stack)
    pub fn pop(&mut self, state: &mut AppState, handle: &EngineHandle) -> Result<()> {
        // Keep at least one route in the stack
        if self.stack.len() > 1 {
            if let Some(mut route) = self.stack.pop() {
                route.on_exit(state, handle)?;
            }
        }
        Ok(())
    }

    /// Clear the stack and show `route` (tab switching)
    pub fn replace(
        &mut self,
        mut route: Box<dyn RouteHandler>,
        state: &mut AppState,
        handle: &EngineHandle,
    ) -> Result<()> {
        while let Some(mut old_route) = self.stack.pop() {
            old_route.on_exit(state, handle)?;
        }
        route.on_enter(state, handle)?;
        self.stack.push(route);
        Ok(())
    }

    /// Get the depth of navigation
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

/// Get a route handler for a given tab name
pub fn route_for_name(name: &str) -> Box<dyn RouteHandler> {
    match name {
        "Sounds" => Box::new(SoundsRoute),
        "Timer" => Box::new(TimerRoute),
        "Settings" => Box::new(SettingsRoute),
        "Log" => Box::new(LogRoute::new()),
        _ => Box::new(PlaybackRoute),
    }
}

/// Get all main tab names in order
pub fn tab_names() -> &'static [&'static str] {
    &["Playback", "Sounds", "Timer", "Settings", "Log"]
}
