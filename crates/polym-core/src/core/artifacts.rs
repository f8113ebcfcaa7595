//! Canonical artifact names exchanged with the external tools.
//!
//! Every stage directory uses the same small vocabulary of file names, so the
//! instruction scripts handed to the simulation engine can refer to their
//! inputs and outputs without any per-stage templating.

/// Structure a simulation pass runs on, and the bonding tool's output.
pub const STAGE_STRUCTURE: &str = "data.lmps";

/// Working structure of a bond step, input to the bonding tool.
pub const BOND_INPUT: &str = "init.lmps";

/// Output of an energy-minimization pass.
pub const MINIMIZED: &str = "min.lmps";

/// Output of a molecular-dynamics pass.
pub const DYNAMICS: &str = "md.lmps";

/// Rolling intermediate state at the workspace root, updated after every
/// committed relaxation or equilibration.
pub const INTERMEDIATE: &str = "temp.lmps";

/// Terminal output of the run, produced by finalization.
pub const FINAL: &str = "final.lmps";

/// Captured stdout of the simulation engine, one per stage.
pub const ENGINE_LOG: &str = "out";
