//! Workspace umbrella crate.
//!
//! Re-exports the individual workspace crates so host applications can depend
//! on `playback-bridge-workspace` alone and reach the bridge traits, the
//! runtime helpers and the playback core through one path.

pub use bridge_traits;
pub use core_playback;
pub use core_runtime;
