//! Reusable UI components.

/// Interactive triple graph.
pub mod triple_graph;
