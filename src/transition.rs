use std::fmt::Debug;

use serde::Serialize;

/// A closed set of lifecycle states with an explicit table of the states
/// each one may move to.
pub trait Status: Copy + Eq + Debug + 'static {
    fn allowed(self) -> &'static [Self];

    fn is_terminal(self) -> bool {
        self.allowed().is_empty()
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Transition<S> {
    pub from: S,
    pub to: S,
    pub changed: bool,
}

impl<S: Status> Transition<S> {
    /// Checks `from -> to` against the table. Requesting the current state
    /// again is accepted and reported as unchanged.
    pub fn validate(from: S, to: S) -> Option<Transition<S>> {
        if from == to {
            return Some(Transition {
                from,
                to,
                changed: false,
            });
        }

        if from.allowed().contains(&to) {
            return Some(Transition {
                from,
                to,
                changed: true,
            });
        }

        None
    }
}
