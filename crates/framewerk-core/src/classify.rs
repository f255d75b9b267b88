// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Error classification for the request boundary.
//
// Every error is either the caller's fault (bad chain, bad image, bad body),
// a missing object, or ours. The class drives the HTTP status; nothing here
// retries.

use crate::error::FramewerkError;

/// Who is responsible for a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Malformed chain, undecodable image, or unreadable request body.
    Client,
    /// The source object does not exist.
    NotFound,
    /// A transform, codec, or storage failure on our side.
    Server,
}

impl ErrorClass {
    /// HTTP status code that surfaces this class.
    pub fn status_code(self) -> u16 {
        match self {
            ErrorClass::Client => 400,
            ErrorClass::NotFound => 404,
            ErrorClass::Server => 500,
        }
    }
}

/// Classify a `FramewerkError` into an `ErrorClass`.
pub fn classify_error(err: &FramewerkError) -> ErrorClass {
    match err {
        FramewerkError::Validation(_) => ErrorClass::Client,
        FramewerkError::Decode(_) => ErrorClass::Client,
        FramewerkError::InvalidRequest(_) => ErrorClass::Client,
        FramewerkError::Serialization(_) => ErrorClass::Client,

        FramewerkError::NotFound(_) => ErrorClass::NotFound,

        FramewerkError::Execution(_) => ErrorClass::Server,
        FramewerkError::Encode(_) => ErrorClass::Server,
        FramewerkError::Storage(_) => ErrorClass::Server,
        FramewerkError::Server(_) => ErrorClass::Server,

        FramewerkError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => ErrorClass::NotFound,
            _ => ErrorClass::Server,
        },
    }
}
