//! # Polymatic Core Library
//!
//! A modernized implementation of the Polymatic simulated polymerization loop:
//! a controller that grows a molecular network bond by bond, delegating the
//! chemistry to external tools (a bond-formation/topology script and a
//! molecular simulation engine) while owning the retry, rollback, scheduling,
//! and staging-directory bookkeeping around them.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to ensure a
//! clear separation of concerns, making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Stateless building blocks: canonical
//!   artifact names, isolated stage directories with collision-safe creation
//!   and registry-driven cleanup, and synchronous invocation of external
//!   commands.
//!
//! - **[`engine`]: The Logic Core.** This layer interprets tool outcomes into
//!   typed results, tracks loop state (committed bonds, rollback), and runs
//!   the bounded bond-attempt cycle with its perturbation retries.
//!
//! - **[`workflows`]: The Public API.** The highest-level, user-facing layer.
//!   It ties the `engine` and `core` together into the complete
//!   polymerization procedure, from initialization through finalization. It
//!   provides a simple and powerful entry point for end-users of the library.

pub mod core;
pub mod engine;
pub mod workflows;
