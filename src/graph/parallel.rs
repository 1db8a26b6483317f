//! Concurrent traversal on rayon.
//!
//! Arrival counts are atomics. The parent whose arrival completes a child's
//! count spawns that child onto the scope, so independent branches run on
//! different workers and a child always observes its parents' effects.

use super::dag::Dag;
use super::node::NodeId;
use crate::error::{Error, Result};

impl Dag {
    /// Runs every action once, firing independent branches concurrently on
    /// the current rayon pool. Returns when every reachable node has fired.
    pub fn exec_parallel(&mut self) {
        crate::time_scope!("dag", format!("exec_parallel {} nodes", self.nodes.len()));
        self.reset_visits();
        let dag: &Self = self;
        rayon::scope(|scope| {
            for &root in &dag.roots {
                dag.spawn_if_ready(scope, root);
            }
        });
    }

    fn spawn_if_ready<'s>(&'s self, scope: &rayon::Scope<'s>, id: NodeId) {
        if self.nodes[id.0].arrive() {
            scope.spawn(move |scope| self.fire(scope, id));
        }
    }

    fn fire<'s>(&'s self, scope: &rayon::Scope<'s>, id: NodeId) {
        let node = &self.nodes[id.0];
        crate::trace!("dag", "fire {} on {:?}", node.describe(id), rayon::current_thread_index());
        node.fire();
        for &child in &node.children {
            self.spawn_if_ready(scope, child);
        }
    }

    /// Parallel traversal on a dedicated pool of `threads` workers, or on
    /// the global pool when `threads` is 0.
    pub(crate) fn exec_parallel_on(&mut self, threads: usize) -> Result<()> {
        if threads == 0 {
            self.exec_parallel();
            return Ok(());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("trueno-simt-{i}"))
            .build()
            .map_err(|e| Error::ThreadPool(e.to_string()))?;
        crate::debug!("dag", "running on a dedicated pool of {threads} threads");
        pool.install(|| self.exec_parallel());
        Ok(())
    }
}
