// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// framewerk-pipeline — image transformation core for Framewerk.
//
// Provides the transform registry (the closed set of named operations and
// their arity), the six builtin transforms, the validated ordered pipeline,
// width-driven resize, and the decode/encode boundary.

pub mod codec;
pub mod pipeline;
pub mod registry;
pub mod resize;
pub mod transform;

// Re-export the primary types so callers can use `framewerk_pipeline::Pipeline` etc.
pub use codec::{JPEG_CONTENT_TYPE, decode, encode_jpeg};
pub use framewerk_core::types::{Chain, Operation};
pub use pipeline::Pipeline;
pub use registry::{TransformEntry, TransformKind, TransformRegistry};
pub use resize::resize_to_width;
pub use transform::Transform;
