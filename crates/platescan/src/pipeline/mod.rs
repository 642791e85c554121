//! Plate analysis pipeline.
//!
//! This module wires the stages together and owns the stage boundaries:
//! partition -> sample (pass 1) -> normalize -> estimate + tile annotation
//! (pass 2) -> overlay -> assemble.
//!
//! The pass barrier is a type boundary: pass 2 consumes a [`NormalizedPlate`],
//! which can only be built from a complete [`SampledPlate`]. Algorithmic
//! primitives live in `crate::grid`, `crate::sampling`, `crate::normalize`,
//! `crate::estimate`, and `crate::annotate`.

mod estimate_pass;
mod run;
mod sample_pass;

pub(crate) use sample_pass::{NormalizedPlate, SampledPlate};

pub(crate) use run::run;
