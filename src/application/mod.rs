//! Application layer containing the funding convergence engine.
//!
//! `FundingEngine` gates on node readiness, runs the impersonate, approve and
//! transfer steps in order (each under a bounded retry), and then validates
//! the node's state with fresh reads.

pub mod node;
pub mod orchestrator;
pub mod readiness;
pub mod reconciler;
pub mod retry;
pub mod steps;
