//! Session orchestration for the cascading selector.
//!
//! The controller is pure: operations mutate the store and hand back the
//! load requests the caller must run. Results come back through
//! [`SelectionController::resolve`] with the ticket that travelled out on
//! the request, which is how late responses for abandoned branches are
//! recognized and dropped.

use super::level::Level;
use super::node::Node;
use super::store::{HierarchyStore, LoadRequest, SelectedPath};

/// Result of a select call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    /// Selection applied. `load` carries the child fetch to run, absent at
    /// the leaf level.
    Applied { load: Option<LoadRequest> },
    /// The id was not among the level's current options. Nothing changed.
    /// This is the guard against clicks landing on a stale list.
    Rejected,
}

/// Result of delivering a load response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    Applied,
    /// A newer request for the level superseded this one; it was dropped.
    Stale,
}

/// Owns one browsing session's hierarchy state.
#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    store: HierarchyStore,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &HierarchyStore {
        &self.store
    }

    /// Issues the root fetch. Also serves as a root refresh.
    pub fn start(&mut self) -> LoadRequest {
        let ticket = self.store.begin_load(Level::Exam);
        LoadRequest {
            level: Level::Exam,
            parent_id: None,
            ticket,
        }
    }

    /// Selects a row by id at `level`.
    ///
    /// Everything below the level is cleared before the child fetch is
    /// issued, so stale descendants are never visible while the new branch
    /// loads. Selecting the already-selected row runs the same cascade,
    /// which makes it a branch refresh.
    pub fn select(&mut self, level: Level, node_id: &str) -> SelectOutcome {
        let Some(node) = self
            .store
            .options(level)
            .iter()
            .find(|n| n.id == node_id)
            .cloned()
        else {
            return SelectOutcome::Rejected;
        };

        self.store.set_selected(level, node.clone());
        self.store.clear_below(level);

        let load = level.child().map(|child| {
            let ticket = self.store.begin_load(child);
            LoadRequest {
                level: child,
                parent_id: Some(node.id.clone()),
                ticket,
            }
        });
        SelectOutcome::Applied { load }
    }

    /// Delivers a load result for `level`.
    ///
    /// Dropped unless `ticket` is still the level's live load. On failure
    /// the prior options stay and the level carries a retryable error.
    pub fn resolve(
        &mut self,
        level: Level,
        ticket: u64,
        result: Result<Vec<Node>, String>,
    ) -> ResolveOutcome {
        if !self.store.is_live(level, ticket) {
            return ResolveOutcome::Stale;
        }
        match result {
            Ok(nodes) => self.store.finish_load(level, nodes),
            Err(message) => self.store.fail_load(level, message),
        }
        ResolveOutcome::Applied
    }

    /// Re-issues the load for `level` with a fresh ticket.
    ///
    /// Returns `None` when the level's parent has no selection to key the
    /// fetch on.
    pub fn retry(&mut self, level: Level) -> Option<LoadRequest> {
        let parent_id = match level.parent() {
            Some(parent) => Some(self.store.selected(parent)?.id.clone()),
            None => None,
        };
        let ticket = self.store.begin_load(level);
        Some(LoadRequest {
            level,
            parent_id,
            ticket,
        })
    }

    /// Clears the session back to the post-startup state. Root options are
    /// kept; they do not depend on any selection.
    pub fn reset(&mut self) {
        self.store.reset();
    }

    pub fn is_complete(&self) -> bool {
        self.store.is_complete()
    }

    pub fn selected_path(&self) -> Option<SelectedPath> {
        self.store.selected_path()
    }
}
