//! Shared BPF plumbing for execlog
//!
//! This crate provides the pieces of the bridge that talk to the BPF
//! subsystem directly:
//! - Memlock rlimit removal
//! - Blocking ring-buffer event streaming
//! - Build utilities for compiling the probe object

pub mod rlimit;
pub mod stream;

#[cfg(feature = "build")]
pub mod build;

pub use rlimit::bump_memlock_rlimit;
pub use stream::{EventStream, ReadError, StreamCloser};
