//! Telnet arcade (workspace facade crate).
//!
//! Re-exports the member crates under one name:
//! `telnet_arcade::{core, input, server, term, types}`.

pub use telnet_arcade_core as core;
pub use telnet_arcade_input as input;
pub use telnet_arcade_server as server;
pub use telnet_arcade_term as term;
pub use telnet_arcade_types as types;
