//! Phase state machine.
//!
//! ```text
//! Init -> GateChecked -> ContextBuilt -> CallbackExecuted -> ResultReconciled -> Terminal(Pass)
//!                                                         \-> Terminal(Pass | Fail)   (detect)
//! any non-terminal state -> Terminal(Error)
//! ```

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Detect,
    Build,
    Generate,
}

impl Phase {
    pub fn name(self) -> &'static str {
        match self {
            Phase::Detect => "detect",
            Phase::Build => "build",
            Phase::Generate => "generate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    Pass,
    Fail,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Init,
    GateChecked,
    ContextBuilt,
    CallbackExecuted,
    ResultReconciled,
    Terminal(Terminal),
}

impl State {
    pub fn is_terminal(self) -> bool {
        matches!(self, State::Terminal(_))
    }

    pub fn can_advance_to(self, next: State) -> bool {
        match (self, next) {
            (from, State::Terminal(Terminal::Error)) => !from.is_terminal(),
            (State::Init, State::GateChecked)
            | (State::GateChecked, State::ContextBuilt)
            | (State::ContextBuilt, State::CallbackExecuted)
            | (State::CallbackExecuted, State::ResultReconciled)
            | (State::CallbackExecuted, State::Terminal(Terminal::Pass | Terminal::Fail))
            | (State::ResultReconciled, State::Terminal(Terminal::Pass)) => true,
            _ => false,
        }
    }
}

/// Tracks one phase invocation through the state machine.
#[derive(Debug)]
pub(crate) struct Machine {
    phase: Phase,
    state: State,
    history: Vec<State>,
}

impl Machine {
    pub fn new(phase: Phase) -> Self {
        Self {
            phase,
            state: State::Init,
            history: vec![State::Init],
        }
    }

    pub fn advance(&mut self, next: State) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal {} transition {:?} -> {:?}",
            self.phase.name(),
            self.state,
            next
        );
        debug!(phase = self.phase.name(), from = ?self.state, to = ?next, "phase transition");
        self.state = next;
        self.history.push(next);
    }

    pub fn history(&self) -> &[State] {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_path_is_legal() {
        let path = [
            State::Init,
            State::GateChecked,
            State::ContextBuilt,
            State::CallbackExecuted,
            State::ResultReconciled,
            State::Terminal(Terminal::Pass),
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_advance_to(pair[1]), "{:?}", pair);
        }
    }

    #[test]
    fn callback_cannot_run_before_gate() {
        assert!(!State::Init.can_advance_to(State::ContextBuilt));
        assert!(!State::Init.can_advance_to(State::CallbackExecuted));
        assert!(!State::GateChecked.can_advance_to(State::CallbackExecuted));
    }

    #[test]
    fn terminal_states_are_final() {
        for t in [Terminal::Pass, Terminal::Fail, Terminal::Error] {
            assert!(!State::Terminal(t).can_advance_to(State::Terminal(Terminal::Error)));
            assert!(!State::Terminal(t).can_advance_to(State::Init));
        }
    }

    #[test]
    fn fail_only_follows_callback() {
        assert!(State::CallbackExecuted.can_advance_to(State::Terminal(Terminal::Fail)));
        assert!(!State::ResultReconciled.can_advance_to(State::Terminal(Terminal::Fail)));
    }
}
