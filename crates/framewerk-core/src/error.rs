// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Framewerk.

use thiserror::Error;

/// A transform chain was rejected before any image data was touched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    #[error("operation {name} takes {expected} parameter(s), got {got}")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
}

/// Why a single transform refused its input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformFault {
    #[error("image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("parameter is not a finite number: {0}")]
    NonFiniteParameter(f64),
}

/// A validated pipeline stopped part-way through.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecutionError {
    #[error("step {index} ({name}) failed: {cause}")]
    StepFailed {
        index: usize,
        name: String,
        #[source]
        cause: TransformFault,
    },
}

/// Top-level error type for all Framewerk operations.
#[derive(Debug, Error)]
pub enum FramewerkError {
    // -- Pipeline errors --
    #[error("invalid transform chain: {0}")]
    Validation(#[from] ValidationError),

    #[error("transform pipeline failed: {0}")]
    Execution(#[from] ExecutionError),

    // -- Image codec errors --
    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("failed to encode image: {0}")]
    Encode(String),

    // -- Request / storage --
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("object not found: {0}")]
    NotFound(String),

    #[error("object storage error: {0}")]
    Storage(String),

    #[error("server error: {0}")]
    Server(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, FramewerkError>;
