// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Framewerk — Core types and error definitions shared across all crates.

pub mod classify;
pub mod config;
pub mod error;
pub mod naming;
pub mod types;

pub use classify::{ErrorClass, classify_error};
pub use config::ServiceConfig;
pub use error::{ExecutionError, FramewerkError, Result, TransformFault, ValidationError};
pub use types::*;
