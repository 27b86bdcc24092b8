//! UI module root: exposes drawing functions for individual panels.

pub mod cpu;
pub mod disks;
pub mod header;
pub mod mem;
pub mod processes;
pub mod util;
