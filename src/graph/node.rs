//! Graph nodes: a stored action plus traversal bookkeeping.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Stable index of a node inside its [`Dag`](super::Dag).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in insertion order.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Work fired once per traversal when all of a node's parents have fired.
///
/// Any `FnMut() + Send` closure is an `Exec`.
pub trait Exec: Send {
    /// Runs the action.
    fn exec(&mut self);
}

impl<F: FnMut() + Send> Exec for F {
    fn exec(&mut self) {
        self();
    }
}

pub(crate) struct Node {
    action: Mutex<Box<dyn Exec>>,
    pub(crate) label: Option<String>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent_count: usize,
    visited: AtomicUsize,
}

impl Node {
    pub(crate) fn new(label: Option<String>, action: Box<dyn Exec>) -> Self {
        Self {
            action: Mutex::new(action),
            label,
            children: Vec::new(),
            parent_count: 0,
            visited: AtomicUsize::new(0),
        }
    }

    /// Counts one arrival on the exclusive path. Returns true when the node
    /// becomes ready.
    pub(crate) fn arrive_mut(&mut self) -> bool {
        let visited = self.visited.get_mut();
        *visited += 1;
        *visited == self.parent_count
    }

    /// Counts one arrival from any thread. The last parent to arrive sees
    /// `true`, and the count is reset for the next traversal.
    #[cfg_attr(not(feature = "parallel"), allow(dead_code))]
    pub(crate) fn arrive(&self) -> bool {
        let seen = self.visited.fetch_add(1, Ordering::AcqRel) + 1;
        if seen == self.parent_count {
            self.visited.store(0, Ordering::Release);
            true
        } else {
            false
        }
    }

    pub(crate) fn settle(&mut self) {
        *self.visited.get_mut() = 0;
    }

    pub(crate) fn with_action(&mut self, f: impl FnOnce(&mut dyn Exec)) {
        let action = self.action.get_mut().unwrap_or_else(PoisonError::into_inner);
        f(&mut **action);
    }

    #[cfg_attr(not(feature = "parallel"), allow(dead_code))]
    pub(crate) fn fire(&self) {
        self.action
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .exec();
    }

    pub(crate) fn visited(&self) -> usize {
        self.visited.load(Ordering::Acquire)
    }

    pub(crate) fn describe(&self, id: NodeId) -> String {
        match &self.label {
            Some(label) => format!("{id} ({label})"),
            None => id.to_string(),
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("label", &self.label)
            .field("children", &self.children)
            .field("parent_count", &self.parent_count)
            .field("visited", &self.visited())
            .finish_non_exhaustive()
    }
}
