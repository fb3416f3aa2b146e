//! Domain types: token amounts, account roles, the target state, step
//! outcomes and the ports the engine drives the node through.

pub mod address;
pub mod amount;
pub mod outcome;
pub mod ports;
pub mod target;
