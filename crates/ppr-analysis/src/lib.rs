//! Graph analysis over PPR product lines.
//!
//! Provides the graph builder ([`graph::build`]), path and density queries,
//! utilization ratios with targeted reachability, and recurring-structure
//! detection (strongly connected components and DFS chains).

pub mod error;
pub mod graph;
pub mod query;
pub mod recurrence;
pub mod utilization;
