use hushbox_core::{FadeOut, TimerPhase};
use ratatui::widgets::ListState;

/// Entries of the timer menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPreset {
    Minutes(u32),
    Custom,
}

impl TimerPreset {
    pub fn all() -> Vec<TimerPreset> {
        [15, 30, 45, 60]
            .into_iter()
            .map(TimerPreset::Minutes)
            .chain(std::iter::once(TimerPreset::Custom))
            .collect()
    }

    pub fn label(&self) -> String {
        match self {
            TimerPreset::Minutes(m) => format!("{} min", m),
            TimerPreset::Custom => "Custom".to_string(),
        }
    }
}

/// Sleep timer state mirrored from the engine
#[derive(Debug, Clone)]
pub struct TimerView {
    pub remaining_ms: Option<u64>,
    pub phase: TimerPhase,
    pub fade_out: FadeOut,
    pub elapsed: bool,
    pub presets: Vec<TimerPreset>,
    pub list_state: ListState,
    /// Digits typed for a custom duration
    pub custom_minutes: String,
}

impl TimerView {
    pub fn new(fade_out: FadeOut) -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self {
            remaining_ms: None,
            phase: TimerPhase::Idle,
            fade_out,
            elapsed: false,
            presets: TimerPreset::all(),
            list_state,
            custom_minutes: String::new(),
        }
    }

    pub fn next(&mut self) {
        let i = self.list_state.selected().map_or(0, |i| (i + 1) % self.presets.len());
        self.list_state.select(Some(i));
    }

    pub fn prev(&mut self) {
        let len = self.presets.len();
        let i = self.list_state.selected().map_or(0, |i| (i + len - 1) % len);
        self.list_state.select(Some(i));
    }

    pub fn selected(&self) -> Option<TimerPreset> {
        self.presets.get(self.list_state.selected()?).copied()
    }

    /// Minutes the selected entry stands for, if any
    pub fn selected_minutes(&self) -> Option<u32> {
        match self.selected()? {
            TimerPreset::Minutes(m) => Some(m),
            TimerPreset::Custom => self.custom_minutes.parse().ok().filter(|m| *m > 0),
        }
    }

    pub fn push_digit(&mut self, c: char) {
        if c.is_ascii_digit() && self.custom_minutes.len() < 4 {
            self.custom_minutes.push(c);
        }
    }

    /// Countdown as MM:SS, or a dash with no timer set
    pub fn remaining_label(&self) -> String {
        match self.remaining_ms {
            Some(ms) => {
                let secs = ms / 1000;
                format!("{:02}:{:02}", secs / 60, secs % 60)
            }
            None => "--:--".to_string(),
        }
    }

    pub fn next_fade_out(&self) -> FadeOut {
        self.fade_out.next()
    }
}
