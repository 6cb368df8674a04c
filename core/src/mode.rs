use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AppMode {
    #[default]
    Game,
    Edit,
    Placement,
}

impl AppMode {
    pub fn label(self) -> &'static str {
        match self {
            AppMode::Game => "game",
            AppMode::Edit => "edit",
            AppMode::Placement => "placement",
        }
    }
}

impl fmt::Display for AppMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ModeError {
    #[error("already in {0} mode")]
    AlreadyActive(AppMode),
    #[error("cannot leave {current} mode while an operation is running")]
    Busy { current: AppMode },
    #[error("an operation is already running")]
    OperationRunning,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModeChange {
    pub from: AppMode,
    pub to: AppMode,
}

/// Single owner of the current mode plus the in-flight operation guard.
/// Edit and Placement are mutually exclusive because only one mode exists.
#[derive(Clone, Debug, Default)]
pub struct ModeMachine {
    current: AppMode,
    busy: bool,
}

impl ModeMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> AppMode {
        self.current
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn transition(&mut self, to: AppMode) -> Result<ModeChange, ModeError> {
        if self.busy {
            return Err(ModeError::Busy {
                current: self.current,
            });
        }
        if self.current == to {
            return Err(ModeError::AlreadyActive(to));
        }
        let change = ModeChange {
            from: self.current,
            to,
        };
        self.current = to;
        Ok(change)
    }

    /// Enters `mode`, or returns to Game when `mode` is already active.
    pub fn toggle(&mut self, mode: AppMode) -> Result<ModeChange, ModeError> {
        if self.current == mode {
            self.transition(AppMode::Game)
        } else {
            self.transition(mode)
        }
    }

    /// Marks a long operation (generation, bulk placement) as running.
    pub fn begin_operation(&mut self) -> Result<(), ModeError> {
        if self.busy {
            return Err(ModeError::OperationRunning);
        }
        self.busy = true;
        Ok(())
    }

    pub fn end_operation(&mut self) {
        self.busy = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_returns_to_game() {
        let mut modes = ModeMachine::new();
        let change = modes.toggle(AppMode::Edit).expect("enter edit");
        assert_eq!(change.from, AppMode::Game);
        let change = modes.toggle(AppMode::Placement).expect("switch");
        assert_eq!(change, ModeChange { from: AppMode::Edit, to: AppMode::Placement });
        modes.toggle(AppMode::Placement).expect("leave");
        assert_eq!(modes.current(), AppMode::Game);
    }

    #[test]
    fn busy_blocks_transitions_and_reentry() {
        let mut modes = ModeMachine::new();
        modes.begin_operation().expect("start");
        assert_eq!(modes.begin_operation(), Err(ModeError::OperationRunning));
        assert_eq!(
            modes.transition(AppMode::Edit),
            Err(ModeError::Busy { current: AppMode::Game })
        );
        modes.end_operation();
        assert!(modes.transition(AppMode::Edit).is_ok());
        assert_eq!(modes.transition(AppMode::Edit), Err(ModeError::AlreadyActive(AppMode::Edit)));
    }
}
