//! Session state machine.

use std::fmt;

/// Where a session is in the audit-remediate loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Obtaining the level-0 draft
    Initial,
    /// Running checks and aggregating
    Evaluating,
    /// Building instructions and requesting a rewrite
    Escalating,
    /// Candidate released (terminal)
    Passed,
    /// Refusal released after exhaustion or generation failure (terminal)
    Fallback,
    /// Rejected without remediation: empty input or input-mode audit (terminal)
    Rejected,
}

/// Illegal state transition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    /// No edge between the two states
    #[error("illegal session transition {from} -> {to}")]
    IllegalTransition {
        /// Current state
        from: SessionState,
        /// Requested state
        to: SessionState,
    },
}

impl SessionState {
    /// Whether no further transition is possible.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionState::Passed | SessionState::Fallback | SessionState::Rejected
        )
    }

    /// Whether `self -> to` is an edge of the machine.
    pub fn can_transition(self, to: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, to),
            (Initial, Evaluating)
                | (Initial, Fallback)
                | (Evaluating, Passed)
                | (Evaluating, Escalating)
                | (Evaluating, Fallback)
                | (Evaluating, Rejected)
                | (Escalating, Evaluating)
                | (Escalating, Fallback)
        )
    }

    /// Move to `to`, or report the illegal edge.
    pub fn transition(self, to: SessionState) -> Result<SessionState, StateError> {
        if self.can_transition(to) {
            Ok(to)
        } else {
            Err(StateError::IllegalTransition { from: self, to })
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Initial => write!(f, "initial"),
            SessionState::Evaluating => write!(f, "evaluating"),
            SessionState::Escalating => write!(f, "escalating"),
            SessionState::Passed => write!(f, "passed"),
            SessionState::Fallback => write!(f, "fallback"),
            SessionState::Rejected => write!(f, "rejected"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SessionState::*;

    const ALL: [SessionState; 6] = [Initial, Evaluating, Escalating, Passed, Fallback, Rejected];

    #[test]
    fn test_happy_path() {
        let state = Initial.transition(Evaluating).unwrap();
        let state = state.transition(Escalating).unwrap();
        let state = state.transition(Evaluating).unwrap();
        let state = state.transition(Passed).unwrap();
        assert!(state.is_terminal());
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        for from in [Passed, Fallback, Rejected] {
            for to in ALL {
                assert!(from.transition(to).is_err(), "{} -> {}", from, to);
            }
        }
    }

    #[test]
    fn test_escalating_cannot_pass_directly() {
        assert_eq!(
            Escalating.transition(Passed),
            Err(StateError::IllegalTransition {
                from: Escalating,
                to: Passed
            })
        );
    }

    #[test]
    fn test_initial_only_evaluates_or_falls_back() {
        let exits: Vec<SessionState> = ALL.into_iter().filter(|s| Initial.can_transition(*s)).collect();
        assert_eq!(exits, vec![Evaluating, Fallback]);
    }
}
