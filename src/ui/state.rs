use serde::{Deserialize, Serialize};
use std::fmt;

/// Interaction state of a text input. Selects the background box and drives
/// surrogate visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionState {
    #[default]
    Default,
    Focused,
    Disabled,
}

impl InteractionState {
    pub const ALL: [InteractionState; 3] = [
        InteractionState::Default,
        InteractionState::Focused,
        InteractionState::Disabled,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            InteractionState::Default => "default",
            InteractionState::Focused => "focused",
            InteractionState::Disabled => "disabled",
        }
    }

    /// Applies a trigger. Blur and enable both land on `Default`, whatever the
    /// prior state; disable always wins over focus.
    pub const fn next(self, trigger: StateTrigger) -> Self {
        match trigger {
            StateTrigger::Focus => InteractionState::Focused,
            StateTrigger::Blur | StateTrigger::Enable => InteractionState::Default,
            StateTrigger::Disable => InteractionState::Disabled,
        }
    }
}

impl fmt::Display for InteractionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateTrigger {
    /// Native focus event.
    Focus,
    /// Native blur event.
    Blur,
    Disable,
    Enable,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(triggers: &[StateTrigger]) -> InteractionState {
        triggers
            .iter()
            .fold(InteractionState::default(), |state, trigger| state.next(*trigger))
    }

    #[test]
    fn starts_in_default() {
        assert_eq!(run(&[]), InteractionState::Default);
    }

    #[test]
    fn follows_last_focus_or_blur() {
        use StateTrigger::*;
        assert_eq!(run(&[Focus]), InteractionState::Focused);
        assert_eq!(run(&[Focus, Blur]), InteractionState::Default);
        assert_eq!(run(&[Focus, Blur, Focus]), InteractionState::Focused);
        assert_eq!(run(&[Blur, Blur]), InteractionState::Default);
    }

    #[test]
    fn disable_overrides_focus() {
        use StateTrigger::*;
        assert_eq!(run(&[Focus, Disable]), InteractionState::Disabled);
        assert_eq!(run(&[Disable, Enable]), InteractionState::Default);
        assert_eq!(run(&[Disable, Blur]), InteractionState::Default);
    }

    #[test]
    fn every_state_has_a_distinct_name() {
        let names: Vec<_> = InteractionState::ALL.iter().map(|s| s.name()).collect();
        assert_eq!(names, ["default", "focused", "disabled"]);
    }
}
