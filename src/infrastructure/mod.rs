//! Adapters behind the domain ports: a child-process command runner, an HTTP
//! JSON-RPC liveness probe, and an in-memory node for rehearsals and tests.

pub mod http_probe;
pub mod in_memory;
pub mod process;
