//! Graph construction: the call-dependency graph feeding the SCC pass, and
//! the interprocedural call/return edge tables feeding the distance pass.

pub mod call_graph;
pub mod scc;

pub use call_graph::CallSite;
pub use scc::DependencyGraph;
