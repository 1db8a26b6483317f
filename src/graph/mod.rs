//! Task dependency graphs.
//!
//! A [`Dag`] owns nodes holding [`Exec`] actions and the edges between them.
//! Traversal fires a node once all of its parents have fired: serially with
//! [`Dag::exec`], or concurrently with `Dag::exec_parallel` when the
//! `parallel` feature is enabled.

mod dag;
mod node;
#[cfg(feature = "parallel")]
mod parallel;

pub use dag::{Dag, NodeRef};
pub use node::{Exec, NodeId};
