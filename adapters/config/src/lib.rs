#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Configuration adapter.
//!
//! Parses the brace-delimited node text format used by survey definition
//! files and loads the experiment catalog, narrative templates and global
//! reward multipliers out of it. Parse errors abort loading; loader-level
//! problems (unknown experiment ids, malformed numbers) degrade to warnings
//! so that one bad entry never takes the rest of the file down with it.

mod loader;
mod node;

pub use loader::{load_catalog, load_multipliers};
pub use node::{ConfigError, ConfigNode};
