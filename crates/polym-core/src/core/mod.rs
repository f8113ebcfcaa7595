//! # Core Module
//!
//! Foundation utilities for the polymerization workflow: the canonical
//! artifact vocabulary shared between controller and external tools, the
//! stage-directory abstraction that keeps every attempt isolated on disk,
//! and the synchronous external-command substrate.
//!
//! ## Architecture
//!
//! - **Artifacts** ([`artifacts`]) - Canonical file names exchanged with the
//!   external tools (`data.lmps`, `min.lmps`, `temp.lmps`, ...)
//! - **Staging** ([`stage`]) - Isolated working directories with
//!   collision-safe creation, input staging, output propagation, and a
//!   registry that sweeps or retains them as one bookkeeping step
//! - **Execution** ([`exec`]) - Blocking invocation of external executables
//!   from parsed command templates, with optional stdout capture

pub mod artifacts;
pub mod exec;
pub mod stage;
