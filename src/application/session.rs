//! Session state machine: a cursor walking the leaves of an allocation tree.
//!
//! The cursor only moves forward on an accepted amount and back by one leaf
//! on a go-back request. Leaves already entered are walked again after a
//! correction (revisited) without being prompted, unless the cursor is
//! rewound onto them explicitly.

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::application::input::{LeafInput, ReviewInput};
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::AllocationTree;

/// What the session expects next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Ask for the amount invested in this leaf
    Prompt(Index),
    /// Already entered; show it and move on
    Revisit(Index),
    /// Past the last leaf: go back or finish
    Review,
    Finished,
}

/// Outcome of feeding input to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Advanced,
    Rewound,
    /// Go-back requested on the first leaf; nothing moved
    AtStart,
    Finished,
}

#[derive(Debug)]
pub struct Session {
    tree: AllocationTree,
    leaves: Vec<Index>,
    cursor: usize,
    /// Number of leaves entered at least once (leaves before it are visited)
    frontier: usize,
    /// Leaf the cursor was explicitly rewound onto
    rewound_to: Option<usize>,
    finished: bool,
}

impl Session {
    pub fn new(tree: AllocationTree) -> Self {
        let leaves = tree.leaves();
        Self {
            tree,
            leaves,
            cursor: 0,
            frontier: 0,
            rewound_to: None,
            finished: false,
        }
    }

    pub fn tree(&self) -> &AllocationTree {
        &self.tree
    }

    pub fn into_tree(self) -> AllocationTree {
        self.tree
    }

    pub fn leaves(&self) -> &[Index] {
        &self.leaves
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn step(&self) -> Step {
        if self.finished {
            return Step::Finished;
        }
        match self.leaves.get(self.cursor) {
            None => Step::Review,
            Some(&leaf) if self.cursor < self.frontier && self.rewound_to != Some(self.cursor) => {
                Step::Revisit(leaf)
            }
            Some(&leaf) => Step::Prompt(leaf),
        }
    }

    /// Apply input for the leaf under the cursor.
    #[instrument(level = "debug", skip(self))]
    pub fn submit(&mut self, input: LeafInput) -> ApplicationResult<Transition> {
        let Step::Prompt(leaf) = self.step() else {
            return Err(ApplicationError::SessionState("a leaf value"));
        };
        match input {
            LeafInput::Amount(value) => {
                self.tree.set_invested(leaf, value)?;
                self.cursor += 1;
                self.frontier = self.frontier.max(self.cursor);
                self.rewound_to = None;
                debug!("advanced to {}/{}", self.cursor, self.leaves.len());
                Ok(Transition::Advanced)
            }
            LeafInput::GoBack if self.cursor == 0 => Ok(Transition::AtStart),
            LeafInput::GoBack => {
                self.rewind();
                Ok(Transition::Rewound)
            }
        }
    }

    /// Move past a revisited leaf.
    pub fn skip_revisit(&mut self) -> ApplicationResult<Transition> {
        let Step::Revisit(_) = self.step() else {
            return Err(ApplicationError::SessionState("a revisit"));
        };
        self.cursor += 1;
        Ok(Transition::Advanced)
    }

    /// Answer the review step after the last leaf.
    #[instrument(level = "debug", skip(self))]
    pub fn review(&mut self, input: ReviewInput) -> ApplicationResult<Transition> {
        if self.step() != Step::Review {
            return Err(ApplicationError::SessionState("a review answer"));
        }
        match input {
            ReviewInput::GoBack if !self.leaves.is_empty() => {
                self.rewind();
                Ok(Transition::Rewound)
            }
            _ => {
                self.finished = true;
                Ok(Transition::Finished)
            }
        }
    }

    fn rewind(&mut self) {
        self.cursor -= 1;
        self.rewound_to = Some(self.cursor);
        debug!("rewound to {}", self.cursor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_leaf_session() -> Session {
        let mut tree = AllocationTree::new();
        let root = tree.insert_node("Total", 300.0, None);
        for name in ["A", "B", "C"] {
            tree.insert_node(name, 100.0, Some(root));
        }
        Session::new(tree)
    }

    #[test]
    fn given_new_session_when_stepping_then_prompts_first_leaf() {
        let session = three_leaf_session();
        assert_eq!(session.step(), Step::Prompt(session.leaves()[0]));
    }

    #[test]
    fn given_go_back_on_first_leaf_when_submitting_then_stays() {
        let mut session = three_leaf_session();
        assert_eq!(session.submit(LeafInput::GoBack).unwrap(), Transition::AtStart);
        assert_eq!(session.cursor(), 0);
    }

    #[test]
    fn given_rewind_twice_when_reentering_then_later_leaf_is_revisited() {
        let mut session = three_leaf_session();
        session.submit(LeafInput::Amount(10.0)).unwrap();
        session.submit(LeafInput::Amount(20.0)).unwrap();
        // at C: go back twice to A
        session.submit(LeafInput::GoBack).unwrap();
        assert_eq!(session.step(), Step::Prompt(session.leaves()[1]));
        session.submit(LeafInput::GoBack).unwrap();
        assert_eq!(session.step(), Step::Prompt(session.leaves()[0]));

        session.submit(LeafInput::Amount(15.0)).unwrap();

        assert_eq!(session.step(), Step::Revisit(session.leaves()[1]));
        session.skip_revisit().unwrap();
        assert_eq!(session.step(), Step::Prompt(session.leaves()[2]));
    }

    #[test]
    fn given_review_go_back_when_answering_then_last_leaf_prompted() {
        let mut session = three_leaf_session();
        for value in [1.0, 2.0, 3.0] {
            session.submit(LeafInput::Amount(value)).unwrap();
        }
        assert_eq!(session.step(), Step::Review);

        assert_eq!(session.review(ReviewInput::GoBack).unwrap(), Transition::Rewound);
        assert_eq!(session.step(), Step::Prompt(session.leaves()[2]));

        session.submit(LeafInput::Amount(3.0)).unwrap();
        assert_eq!(session.review(ReviewInput::Finish).unwrap(), Transition::Finished);
        assert_eq!(session.step(), Step::Finished);
        assert!(session.is_finished());
    }

    #[test]
    fn given_wrong_step_when_submitting_then_session_state_error() {
        let mut session = three_leaf_session();
        assert!(matches!(
            session.review(ReviewInput::Finish),
            Err(ApplicationError::SessionState(_))
        ));
        assert!(matches!(
            session.skip_revisit(),
            Err(ApplicationError::SessionState(_))
        ));
    }
}
