use std::collections::VecDeque;

use crate::curriculum::{ConceptId, Curriculum};

/// Learner state over a validated [`Curriculum`]: which concepts are known,
/// which are unlockable, and the optional goal selection.
///
/// All vectors run in table order. Mutations follow a silent no-op contract:
/// a rejected request leaves state untouched and returns `false`, nothing
/// panics and nothing errors. `unlockable` is derived state, refreshed by a
/// full [`recompute`](Self::recompute) pass after every applied mutation
/// rather than maintained incrementally.
#[derive(Debug, Clone)]
pub struct Progress {
    curriculum: Curriculum,
    known: Vec<bool>,
    unlockable: Vec<bool>,
    goal: Option<ConceptId>,
}

impl Progress {
    /// Starts a learner at the curriculum's initially-known seed set.
    pub fn new(curriculum: Curriculum) -> Self {
        let n = curriculum.len();
        let mut progress = Self {
            curriculum,
            known: vec![false; n],
            unlockable: vec![false; n],
            goal: None,
        };
        progress.reset();
        progress
    }

    pub fn curriculum(&self) -> &Curriculum {
        &self.curriculum
    }

    /// `false` for ids not present in the table.
    pub fn is_known(&self, id: ConceptId) -> bool {
        self.curriculum.index_of(id).is_some_and(|i| self.known[i])
    }

    /// `false` for ids not present in the table.
    pub fn is_unlockable(&self, id: ConceptId) -> bool {
        self.curriculum.index_of(id).is_some_and(|i| self.unlockable[i])
    }

    /// Known flags in table order.
    pub fn known(&self) -> &[bool] {
        &self.known
    }

    /// Derived unlockable flags in table order.
    pub fn unlockable(&self) -> &[bool] {
        &self.unlockable
    }

    pub fn goal(&self) -> Option<ConceptId> {
        self.goal
    }

    /// Requests `known(id) = value`, gated for the forward direction:
    /// false→true applies only when the concept is unlockable or has no
    /// prereqs; true→false always applies. A request matching the current
    /// state is accepted without effect. Learning the goal concept clears the
    /// goal (a learned concept cannot remain a goal).
    ///
    /// Returns whether the requested state is in effect after the call.
    pub fn set_known(&mut self, id: ConceptId, value: bool) -> bool {
        let Some(i) = self.curriculum.index_of(id) else {
            tracing::debug!(id = id.0, "set_known rejected: unknown concept id");
            return false;
        };
        if self.known[i] == value {
            return true;
        }
        if value {
            let has_prereqs = !self.curriculum.concepts()[i].prereqs.is_empty();
            if has_prereqs && !self.unlockable[i] {
                tracing::debug!(id = id.0, "set_known rejected: prereqs not met");
                return false;
            }
            if self.goal == Some(id) {
                self.goal = None;
            }
        }
        self.known[i] = value;
        self.recompute();
        true
    }

    /// Toggles the goal selection. Selecting the current goal again clears
    /// it; selecting a different concept replaces it. Known concepts and ids
    /// not in the table are rejected.
    ///
    /// Returns whether the request applied.
    pub fn set_goal(&mut self, id: ConceptId) -> bool {
        let Some(i) = self.curriculum.index_of(id) else {
            tracing::debug!(id = id.0, "set_goal rejected: unknown concept id");
            return false;
        };
        if self.known[i] {
            tracing::debug!(id = id.0, "set_goal rejected: concept already known");
            return false;
        }
        if self.goal == Some(id) {
            self.goal = None;
            tracing::debug!(id = id.0, "goal cleared");
        } else {
            self.goal = Some(id);
            tracing::debug!(id = id.0, "goal selected");
        }
        true
    }

    pub fn clear_goal(&mut self) {
        self.goal = None;
    }

    /// The unlearned concepts standing between the learner and the goal.
    ///
    /// Breadth-first walk from the goal along prereq edges, visiting each
    /// concept at most once and collecting every visited concept that is not
    /// known (the goal itself included). Known concepts are traversed but not
    /// collected, so an unlearned ancestor behind a learned concept still
    /// shows up. Empty when no goal is set.
    ///
    /// The result is a reachable set in BFS visitation order, not a
    /// topologically sorted study plan; consumers treat it as a set.
    pub fn path_to_goal(&self) -> Vec<ConceptId> {
        let Some(goal) = self.goal else {
            return Vec::new();
        };
        let Some(start) = self.curriculum.index_of(goal) else {
            return Vec::new();
        };

        let mut visited = vec![false; self.curriculum.len()];
        let mut queue = VecDeque::new();
        let mut path = Vec::new();
        visited[start] = true;
        queue.push_back(start);
        while let Some(i) = queue.pop_front() {
            if !self.known[i] {
                path.push(self.curriculum.concepts()[i].id);
            }
            for p in &self.curriculum.concepts()[i].prereqs {
                let pi = self.curriculum.index_of(*p).unwrap_or(i);
                if !visited[pi] {
                    visited[pi] = true;
                    queue.push_back(pi);
                }
            }
        }
        path
    }

    /// Re-derives `unlockable` for every concept in one pass:
    /// `unlockable(n) = !known(n) && prereqs(n).all(known)`.
    ///
    /// Runs automatically after each applied mutation; calling it again is
    /// harmless.
    pub fn recompute(&mut self) {
        for (i, concept) in self.curriculum.concepts().iter().enumerate() {
            self.unlockable[i] = !self.known[i]
                && concept
                    .prereqs
                    .iter()
                    .all(|p| self.curriculum.index_of(*p).is_some_and(|pi| self.known[pi]));
        }
    }

    /// Back to the curriculum's defaults: only the initially-known seed set
    /// is known, no goal.
    pub fn reset(&mut self) {
        self.known.fill(false);
        for id in self.curriculum.initially_known() {
            if let Some(i) = self.curriculum.index_of(*id) {
                self.known[i] = true;
            }
        }
        self.goal = None;
        self.recompute();
    }
}
