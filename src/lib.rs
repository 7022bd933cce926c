//! dscbridge — reconcile declarative desired state through PowerShell DSC.
//!
//! Desired state is mapped onto a DSC resource schema, turned into a
//! self-contained PowerShell script around `Invoke-DscResource`, run through an
//! interpreter, and the JSON answer is reshaped into canonical records.

pub mod cli;
pub mod codegen;
pub mod core;
pub mod error;
pub mod transport;
