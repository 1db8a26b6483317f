//! Dependency graph construction, validation and serial traversal.

use super::node::{Exec, Node, NodeId};
use crate::config::{ExecConfig, ExecMode};
use crate::error::{Error, Result};
use std::fmt;
use std::ops::Shr;

/// A graph of actions ordered by dependency edges.
///
/// Nodes live in an arena and are addressed by [`NodeId`]. A node fires once
/// per traversal, after every parent has fired. Roots are registered with
/// [`Dag::add_root`]; the graph itself counts as their one parent.
///
/// Build the graph completely before executing it. Every traversal starts
/// from zeroed arrival counts, so the same graph can be executed any number
/// of times and a stalled node never carries a partial count into the next
/// run.
///
/// # Launch order
///
/// Ordering covers when actions are *invoked*, not when work they hand off
/// completes. An action that enqueues asynchronous device work and returns
/// must itself wait on whatever its parents enqueued before consuming it.
///
/// # Cycles
///
/// Nodes on a cycle, and nodes below them, never reach their parent count
/// and silently never fire, on every run.
/// Call [`Dag::check`] (or run with `validate: true`) to reject such graphs.
///
/// # Example
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use trueno_simt::graph::Dag;
///
/// let log = Arc::new(Mutex::new(Vec::new()));
/// let mut dag = Dag::new();
/// let nodes: Vec<_> = ["a", "b", "c"]
///     .into_iter()
///     .map(|name| {
///         let log = Arc::clone(&log);
///         dag.add_labeled_node(name, move || log.lock().unwrap().push(name))
///     })
///     .collect();
/// dag.add_root(nodes[0]);
/// dag.at(nodes[0]) >> nodes[1] >> nodes[2];
///
/// dag.exec();
/// assert_eq!(*log.lock().unwrap(), ["a", "b", "c"]);
/// ```
#[derive(Default)]
pub struct Dag {
    pub(crate) nodes: Vec<Node>,
    pub(crate) roots: Vec<NodeId>,
}

impl Dag {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an unconnected node and returns its id.
    pub fn add_node(&mut self, action: impl Exec + 'static) -> NodeId {
        self.push(None, Box::new(action))
    }

    /// Adds an unconnected node with a label shown in logs and errors.
    pub fn add_labeled_node(&mut self, label: impl Into<String>, action: impl Exec + 'static) -> NodeId {
        self.push(Some(label.into()), Box::new(action))
    }

    fn push(&mut self, label: Option<String>, action: Box<dyn Exec>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(label, action));
        id
    }

    /// Starts every traversal at `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this graph.
    pub fn add_root(&mut self, id: NodeId) {
        self.nodes[id.0].parent_count += 1;
        self.roots.push(id);
    }

    /// Records that `child` depends on `parent`.
    ///
    /// # Panics
    ///
    /// Panics if either id does not belong to this graph.
    pub fn add_edge(&mut self, parent: NodeId, child: NodeId) {
        assert!(child.0 < self.nodes.len(), "node {child} is not in this graph");
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent_count += 1;
    }

    /// Edge-building cursor at `id`, for `dag.at(a) >> b >> c`.
    pub fn at(&mut self, id: NodeId) -> NodeRef<'_> {
        NodeRef { dag: self, id }
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Registered roots in registration order.
    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Direct dependents of `id` in edge order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Number of arrivals `id` waits for, including root registration.
    #[must_use]
    pub fn parent_count(&self, id: NodeId) -> usize {
        self.nodes[id.0].parent_count
    }

    /// Label given at creation, if any.
    #[must_use]
    pub fn label(&self, id: NodeId) -> Option<&str> {
        self.nodes[id.0].label.as_deref()
    }

    /// Depth-first traversal from every root.
    ///
    /// Each visit counts one arrival at a node. On the arrival that matches
    /// its parent count, `enter` runs with the node's action, the children
    /// are visited in edge order, then `exit` runs and the node's count
    /// resets. Uses an explicit stack, so graph depth is not bounded by the
    /// thread's stack size.
    pub fn forward_traverse<E, X>(&mut self, mut enter: E, mut exit: X)
    where
        E: FnMut(NodeId, &mut dyn Exec),
        X: FnMut(NodeId),
    {
        self.reset_visits();
        let mut stack: Vec<(NodeId, usize)> = Vec::new();
        for root in self.roots.clone() {
            if self.visit(root, &mut enter) {
                stack.push((root, 0));
            }

            while let Some(frame) = stack.last_mut() {
                let (id, next) = *frame;
                if let Some(&child) = self.nodes[id.0].children.get(next) {
                    frame.1 += 1;
                    if self.visit(child, &mut enter) {
                        stack.push((child, 0));
                    }
                } else {
                    stack.pop();
                    exit(id);
                    self.nodes[id.0].settle();
                }
            }
        }
    }

    /// Zeroes every arrival count left over from a stalled traversal.
    pub(crate) fn reset_visits(&mut self) {
        for node in &mut self.nodes {
            node.settle();
        }
    }

    fn visit<E>(&mut self, id: NodeId, enter: &mut E) -> bool
    where
        E: FnMut(NodeId, &mut dyn Exec),
    {
        let node = &mut self.nodes[id.0];
        if !node.arrive_mut() {
            return false;
        }
        crate::trace!("dag", "fire {}", node.describe(id));
        node.with_action(|action| enter(id, action));
        true
    }

    /// Runs every action once, in dependency order, on the calling thread.
    pub fn exec(&mut self) {
        crate::time_scope!("dag", format!("exec {} nodes", self.nodes.len()));
        self.forward_traverse(|_, action| action.exec(), |_| {});
    }

    /// Checks that every node fires exactly once per traversal.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cycle`] naming a node on a dependency cycle, or
    /// [`Error::Unreachable`] naming a node that would never fire.
    pub fn check(&self) -> Result<()> {
        if let Some(node) = self.find_cycle() {
            crate::error!("dag", "cycle through {}", self.nodes[node].describe(NodeId(node)));
            return Err(Error::Cycle { node });
        }

        let mut arrived = vec![0usize; self.nodes.len()];
        let mut fired = vec![false; self.nodes.len()];
        let mut ready: Vec<usize> = Vec::new();
        let mut arrive = |id: usize, ready: &mut Vec<usize>| {
            arrived[id] += 1;
            if arrived[id] == self.nodes[id].parent_count {
                ready.push(id);
            }
        };

        for root in &self.roots {
            arrive(root.0, &mut ready);
        }
        while let Some(id) = ready.pop() {
            fired[id] = true;
            for child in &self.nodes[id].children {
                arrive(child.0, &mut ready);
            }
        }

        match fired.iter().position(|&f| !f) {
            Some(node) => {
                crate::error!("dag", "{} never fires", self.nodes[node].describe(NodeId(node)));
                Err(Error::Unreachable { node })
            }
            None => Ok(()),
        }
    }

    /// Index of a node on a cycle, if any.
    fn find_cycle(&self) -> Option<usize> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            New,
            Open,
            Done,
        }

        let mut marks = vec![Mark::New; self.nodes.len()];
        let mut stack: Vec<(usize, usize)> = Vec::new();
        for start in 0..self.nodes.len() {
            if marks[start] != Mark::New {
                continue;
            }
            marks[start] = Mark::Open;
            stack.push((start, 0));

            while let Some(frame) = stack.last_mut() {
                let (id, next) = *frame;
                match self.nodes[id].children.get(next) {
                    Some(child) => {
                        frame.1 += 1;
                        match marks[child.0] {
                            Mark::Open => return Some(child.0),
                            Mark::New => {
                                marks[child.0] = Mark::Open;
                                stack.push((child.0, 0));
                            }
                            Mark::Done => {}
                        }
                    }
                    None => {
                        marks[id] = Mark::Done;
                        stack.pop();
                    }
                }
            }
        }
        None
    }

    /// Executes according to `config`.
    ///
    /// Logging is switched on when `config.debug` is set or, failing that,
    /// when `TRUENO_SIMT_DEBUG` names a level.
    ///
    /// # Errors
    ///
    /// Returns the [`Dag::check`] error when validation is on, or
    /// [`Error::ThreadPool`] if a dedicated pool cannot be built.
    pub fn run(&mut self, config: &ExecConfig) -> Result<()> {
        if config.debug {
            crate::debug::enable();
        } else {
            crate::debug::init_from_env();
        }
        if config.validate {
            self.check()?;
        }

        match config.mode {
            ExecMode::Serial => {
                self.exec();
                Ok(())
            }
            ExecMode::Parallel => self.exec_parallel_on(config.threads),
        }
    }

    #[cfg(not(feature = "parallel"))]
    #[allow(clippy::unnecessary_wraps)]
    fn exec_parallel_on(&mut self, _threads: usize) -> Result<()> {
        crate::warn!("dag", "built without the `parallel` feature, running serially");
        self.exec();
        Ok(())
    }
}

impl fmt::Debug for Dag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dag")
            .field("nodes", &self.nodes)
            .field("roots", &self.roots)
            .finish()
    }
}

/// Edge-building cursor returned by [`Dag::at`].
///
/// `cursor >> b` adds the edge `cursor → b` and moves the cursor to `b`.
pub struct NodeRef<'a> {
    dag: &'a mut Dag,
    id: NodeId,
}

impl NodeRef<'_> {
    /// Node the cursor is at.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }
}

impl<'a> Shr<NodeId> for NodeRef<'a> {
    type Output = NodeRef<'a>;

    fn shr(self, child: NodeId) -> NodeRef<'a> {
        self.dag.add_edge(self.id, child);
        NodeRef { dag: self.dag, id: child }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<&'static str>>>;

    fn recorder(dag: &mut Dag, log: &Log, name: &'static str) -> NodeId {
        let log = Arc::clone(log);
        dag.add_labeled_node(name, move || log.lock().unwrap().push(name))
    }

    fn position(log: &[&str], name: &str) -> usize {
        log.iter().position(|n| *n == name).unwrap()
    }

    /// a → b, a → c, b → d, c → d
    fn diamond(log: &Log) -> Dag {
        let mut dag = Dag::new();
        let a = recorder(&mut dag, log, "a");
        let b = recorder(&mut dag, log, "b");
        let c = recorder(&mut dag, log, "c");
        let d = recorder(&mut dag, log, "d");
        dag.add_root(a);
        dag.at(a) >> b >> d;
        dag.at(a) >> c >> d;
        dag
    }

    #[test]
    fn test_diamond_fires_each_node_once_in_order() {
        let log = Log::default();
        let mut dag = diamond(&log);
        dag.exec();

        let log = log.lock().unwrap();
        assert_eq!(log.len(), 4);
        assert_eq!(log[0], "a");
        assert!(position(&log, "b") < position(&log, "d"));
        assert!(position(&log, "c") < position(&log, "d"));
        assert_eq!(log.iter().filter(|n| **n == "d").count(), 1);
    }

    #[test]
    fn test_serial_order_is_depth_first() {
        let log = Log::default();
        let mut dag = diamond(&log);
        dag.exec();
        assert_eq!(*log.lock().unwrap(), ["a", "b", "c", "d"]);
    }

    #[test]
    fn test_reexecution_has_no_leaked_state() {
        let log = Log::default();
        let mut dag = diamond(&log);
        dag.exec();
        dag.exec();
        dag.exec();
        let log = log.lock().unwrap();
        assert_eq!(log.len(), 12);
        for name in ["a", "b", "c", "d"] {
            assert_eq!(log.iter().filter(|n| **n == name).count(), 3);
        }
        assert!(dag.nodes.iter().all(|node| node.visited() == 0));
    }

    #[test]
    fn test_enter_exit_bracket_children() {
        let log = Log::default();
        let mut dag = diamond(&log);
        let mut enters = Vec::new();
        let mut exits = Vec::new();
        dag.forward_traverse(|id, _| enters.push(id.index()), |id| exits.push(id.index()));
        assert_eq!(enters, [0, 1, 2, 3]);
        // d exits inside c, which exits inside a
        assert_eq!(exits, [1, 3, 2, 0]);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_multiple_roots() {
        let log = Log::default();
        let mut dag = Dag::new();
        let a = recorder(&mut dag, &log, "a");
        let b = recorder(&mut dag, &log, "b");
        let join = recorder(&mut dag, &log, "join");
        dag.add_root(a);
        dag.add_root(b);
        dag.add_edge(a, join);
        dag.add_edge(b, join);
        dag.exec();
        assert_eq!(*log.lock().unwrap(), ["a", "b", "join"]);
        assert_eq!(dag.parent_count(a), 1);
        assert_eq!(dag.parent_count(join), 2);
    }

    #[test]
    fn test_accessors() {
        let log = Log::default();
        let dag = diamond(&log);
        assert_eq!(dag.len(), 4);
        assert!(!dag.is_empty());
        assert_eq!(dag.roots(), [NodeId(0)]);
        assert_eq!(dag.children(NodeId(0)), [NodeId(1), NodeId(2)]);
        assert_eq!(dag.parent_count(NodeId(3)), 2);
        assert_eq!(dag.label(NodeId(2)), Some("c"));
        assert!(Dag::new().is_empty());
    }

    #[test]
    fn test_node_ref_chain() {
        let mut dag = Dag::new();
        let ids: Vec<_> = (0..4).map(|_| dag.add_node(|| {})).collect();
        let end = dag.at(ids[0]) >> ids[1] >> ids[2] >> ids[3];
        assert_eq!(end.id(), ids[3]);
        assert_eq!(dag.children(ids[1]), [ids[2]]);
        assert_eq!(dag.label(ids[1]), None);
    }

    #[test]
    fn test_check_accepts_dag() {
        let dag = diamond(&Log::default());
        assert!(dag.check().is_ok());
        assert!(Dag::new().check().is_ok());
    }

    #[test]
    fn test_check_detects_cycle() {
        let mut dag = Dag::new();
        let a = dag.add_node(|| {});
        let b = dag.add_node(|| {});
        let c = dag.add_node(|| {});
        dag.add_root(a);
        dag.at(a) >> b >> c >> b;
        assert!(matches!(dag.check(), Err(Error::Cycle { node: 1 })));
    }

    #[test]
    fn test_cycle_stalls_branch_silently() {
        let log = Log::default();
        let mut dag = Dag::new();
        let a = recorder(&mut dag, &log, "a");
        let b = recorder(&mut dag, &log, "b");
        let c = recorder(&mut dag, &log, "c");
        dag.add_root(a);
        dag.at(a) >> b >> c >> b;
        for _ in 0..4 {
            dag.exec();
        }
        assert_eq!(*log.lock().unwrap(), ["a", "a", "a", "a"]);
    }

    #[test]
    fn test_stalled_node_stays_stalled_across_runs() {
        let log = Log::default();
        let mut dag = Dag::new();
        let a = recorder(&mut dag, &log, "a");
        let orphan = recorder(&mut dag, &log, "orphan");
        let b = recorder(&mut dag, &log, "b");
        dag.add_root(a);
        dag.add_edge(orphan, b);
        dag.add_edge(a, b);
        for _ in 0..3 {
            dag.exec();
            assert_eq!(dag.nodes[b.index()].visited(), 1);
        }
        assert_eq!(*log.lock().unwrap(), ["a", "a", "a"]);
    }

    #[test]
    fn test_check_detects_unreachable() {
        let mut dag = Dag::new();
        let a = dag.add_node(|| {});
        let orphan = dag.add_node(|| {});
        let b = dag.add_node(|| {});
        dag.add_root(a);
        dag.add_edge(orphan, b);
        dag.add_edge(a, b);
        assert!(matches!(dag.check(), Err(Error::Unreachable { node: 1 })));
    }

    #[test]
    fn test_run_serial_with_validation() {
        let log = Log::default();
        let mut dag = diamond(&log);
        let config = ExecConfig {
            validate: true,
            ..ExecConfig::serial()
        };
        dag.run(&config).unwrap();
        assert_eq!(log.lock().unwrap().len(), 4);
    }

    #[test]
    fn test_run_rejects_cycle_before_firing() {
        let log = Log::default();
        let mut dag = Dag::new();
        let a = recorder(&mut dag, &log, "a");
        let b = recorder(&mut dag, &log, "b");
        dag.add_root(a);
        dag.at(a) >> b >> a;
        let err = dag.run(&ExecConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Cycle { .. }));
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_debug_format() {
        let dag = diamond(&Log::default());
        let text = format!("{dag:?}");
        assert!(text.contains("parent_count: 2"));
        assert!(text.contains("Some(\"d\")"));
    }

    #[test]
    #[should_panic(expected = "not in this graph")]
    fn test_edge_to_foreign_node_panics() {
        let mut dag = Dag::new();
        let a = dag.add_node(|| {});
        dag.add_edge(a, NodeId(5));
    }
}
