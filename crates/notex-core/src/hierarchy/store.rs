//! In-memory model of the six ranked levels.
//!
//! Each level holds the currently loaded candidate rows, the current
//! selection, and load bookkeeping. Child loads resolve out-of-band and are
//! matched back by ticket; a resolution whose ticket no longer matches the
//! level's live load is stale and must be dropped, so a slow response for an
//! abandoned branch can never overwrite the options of the branch the user
//! has since moved to.

use enum_map::EnumMap;

use super::level::Level;
use super::node::Node;

/// Load lifecycle for one level's options.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    /// No request outstanding.
    #[default]
    Idle,
    /// A request tagged with this ticket is in flight.
    Loading { ticket: u64 },
    /// The last request failed; prior options are kept and retry is offered.
    Failed { message: String },
}

/// A child-list fetch the caller must run.
///
/// `ticket` travels with the request and comes back with the result; the
/// store only accepts the result while the ticket is still the level's live
/// load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub level: Level,
    /// Parent row id the children hang off; `None` for the root fetch.
    pub parent_id: Option<String>,
    pub ticket: u64,
}

/// One level's slot: options, selection, load bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct LevelSlot {
    pub options: Vec<Node>,
    pub selected: Option<Node>,
    pub load: LoadState,
    /// Monotonic ticket source. Survives clearing so tickets never repeat
    /// within a session.
    seq: u64,
}

impl LevelSlot {
    fn mint_ticket(&mut self) -> u64 {
        self.seq += 1;
        self.load = LoadState::Loading { ticket: self.seq };
        self.seq
    }

    fn clear(&mut self) {
        self.options.clear();
        self.selected = None;
        self.load = LoadState::Idle;
    }
}

/// The six selected rows of a complete drill-down, root to leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedPath {
    pub exam: Node,
    pub course: Node,
    pub subject: Node,
    pub unit: Node,
    pub chapter: Node,
    pub topic: Node,
}

/// Per-level state for one browsing session.
#[derive(Debug, Clone, Default)]
pub struct HierarchyStore {
    slots: EnumMap<Level, LevelSlot>,
}

impl HierarchyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn options(&self, level: Level) -> &[Node] {
        &self.slots[level].options
    }

    pub fn selected(&self, level: Level) -> Option<&Node> {
        self.slots[level].selected.as_ref()
    }

    pub fn load_state(&self, level: Level) -> &LoadState {
        &self.slots[level].load
    }

    pub fn is_loading(&self, level: Level) -> bool {
        matches!(self.slots[level].load, LoadState::Loading { .. })
    }

    /// True iff every level has a selection.
    pub fn is_complete(&self) -> bool {
        Level::all().iter().all(|l| self.slots[*l].selected.is_some())
    }

    /// Selected rows from the root down to the deepest selected level.
    pub fn path(&self) -> Vec<(Level, &Node)> {
        Level::all()
            .iter()
            .filter_map(|l| self.slots[*l].selected.as_ref().map(|n| (*l, n)))
            .collect()
    }

    /// The full six-row path, present only when the selection is complete.
    pub fn selected_path(&self) -> Option<SelectedPath> {
        Some(SelectedPath {
            exam: self.slots[Level::Exam].selected.clone()?,
            course: self.slots[Level::Course].selected.clone()?,
            subject: self.slots[Level::Subject].selected.clone()?,
            unit: self.slots[Level::Unit].selected.clone()?,
            chapter: self.slots[Level::Chapter].selected.clone()?,
            topic: self.slots[Level::Topic].selected.clone()?,
        })
    }

    /// Marks a fresh load for `level` and returns its ticket. Any prior
    /// in-flight load for the level becomes stale.
    pub(crate) fn begin_load(&mut self, level: Level) -> u64 {
        self.slots[level].mint_ticket()
    }

    /// Replaces the options after a successful load.
    pub(crate) fn finish_load(&mut self, level: Level, nodes: Vec<Node>) {
        let slot = &mut self.slots[level];
        slot.options = nodes;
        slot.load = LoadState::Idle;
    }

    /// Records a failed load. Prior options stay untouched.
    pub(crate) fn fail_load(&mut self, level: Level, message: String) {
        self.slots[level].load = LoadState::Failed { message };
    }

    /// True while `ticket` is the live load for `level`.
    pub(crate) fn is_live(&self, level: Level, ticket: u64) -> bool {
        matches!(self.slots[level].load, LoadState::Loading { ticket: t } if t == ticket)
    }

    pub(crate) fn set_selected(&mut self, level: Level, node: Node) {
        self.slots[level].selected = Some(node);
    }

    /// Clears selection, options and load state at every level strictly
    /// below `level`, keeping the downward-null shape of the selection.
    pub(crate) fn clear_below(&mut self, level: Level) {
        for below in level.below() {
            self.slots[*below].clear();
        }
    }

    /// Returns to the post-startup state: nothing selected anywhere, only
    /// the root options kept.
    pub(crate) fn reset(&mut self) {
        for level in Level::all() {
            if level.is_root() {
                self.slots[*level].selected = None;
            } else {
                self.slots[*level].clear();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_root(names: &[&str]) -> HierarchyStore {
        let mut store = HierarchyStore::new();
        let ticket = store.begin_load(Level::Exam);
        assert!(store.is_live(Level::Exam, ticket));
        store.finish_load(
            Level::Exam,
            names.iter().map(|n| Node::root(format!("{n}-id"), *n)).collect(),
        );
        store
    }

    /// Fresh store: nothing selected, nothing loaded, not complete.
    #[test]
    fn test_new_store_is_empty() {
        let store = HierarchyStore::new();
        for level in Level::all() {
            assert!(store.options(*level).is_empty());
            assert!(store.selected(*level).is_none());
            assert_eq!(*store.load_state(*level), LoadState::Idle);
        }
        assert!(!store.is_complete());
        assert!(store.path().is_empty());
    }

    /// Tickets are unique per level even across clears.
    #[test]
    fn test_tickets_survive_clearing() {
        let mut store = HierarchyStore::new();
        let first = store.begin_load(Level::Course);
        store.clear_below(Level::Exam);
        let second = store.begin_load(Level::Course);
        assert!(second > first);
    }

    /// A cleared level drops its in-flight load: the old ticket is dead.
    #[test]
    fn test_clear_below_kills_live_loads() {
        let mut store = store_with_root(&["JEE"]);
        let ticket = store.begin_load(Level::Subject);
        assert!(store.is_live(Level::Subject, ticket));

        store.clear_below(Level::Exam);
        assert!(!store.is_live(Level::Subject, ticket));
        assert_eq!(*store.load_state(Level::Subject), LoadState::Idle);
    }

    /// Failure keeps whatever options were loaded before.
    #[test]
    fn test_fail_load_keeps_prior_options() {
        let mut store = store_with_root(&["JEE", "NEET"]);
        assert_eq!(store.options(Level::Exam).len(), 2);

        let retry = store.begin_load(Level::Exam);
        store.fail_load(Level::Exam, "catalog unreachable".to_string());

        assert!(!store.is_live(Level::Exam, retry));
        assert_eq!(store.options(Level::Exam).len(), 2);
        assert_eq!(
            *store.load_state(Level::Exam),
            LoadState::Failed {
                message: "catalog unreachable".to_string()
            }
        );
    }

    /// selected_path is all-or-nothing.
    #[test]
    fn test_selected_path_requires_all_levels() {
        let mut store = store_with_root(&["JEE"]);
        store.set_selected(Level::Exam, Node::root("e", "JEE"));
        assert!(store.selected_path().is_none());

        store.set_selected(Level::Course, Node::child("c", "Main", "e"));
        store.set_selected(Level::Subject, Node::child("s", "Physics", "c"));
        store.set_selected(Level::Unit, Node::child("u", "Mechanics", "s"));
        store.set_selected(Level::Chapter, Node::child("ch", "Kinematics", "u"));
        store.set_selected(Level::Topic, Node::child("t", "Projectile Motion", "ch"));

        let path = store.selected_path().unwrap();
        assert_eq!(path.exam.name, "JEE");
        assert_eq!(path.topic.name, "Projectile Motion");
        assert!(store.is_complete());
        assert_eq!(store.path().len(), 6);
    }

    /// reset keeps the root options but drops everything else.
    #[test]
    fn test_reset_keeps_root_options() {
        let mut store = store_with_root(&["JEE", "NEET"]);
        store.set_selected(Level::Exam, Node::root("JEE-id", "JEE"));
        let ticket = store.begin_load(Level::Course);
        store.finish_load(Level::Course, vec![Node::child("m", "Main", "JEE-id")]);
        assert!(!store.is_live(Level::Course, ticket));
        store.set_selected(Level::Course, Node::child("m", "Main", "JEE-id"));

        store.reset();

        assert_eq!(store.options(Level::Exam).len(), 2);
        assert!(store.selected(Level::Exam).is_none());
        assert!(store.options(Level::Course).is_empty());
        assert!(store.selected(Level::Course).is_none());
        assert!(!store.is_complete());
    }
}
