//! # Workflows Module
//!
//! High-level entry points that tie the engine and core layers together into
//! complete procedures.
//!
//! ## Overview
//!
//! Workflows are the top-level API of the library. The polymerization
//! workflow ([`polymerize`]) owns the whole run: initialization of the
//! working intermediate, the step-0 relaxation, the bond-accumulation loop
//! with its periodic equilibration cycles, rollback on attempt exhaustion,
//! and finalization of the output structure. Callers provide an immutable
//! configuration and an optional progress callback and receive a run report;
//! every fatal condition surfaces as an error.

pub mod polymerize;
