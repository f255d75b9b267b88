// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Validated transform pipeline.
//
// Construction checks every operation of a chain against a registry and binds
// its parameter; execution then runs the bound transforms in chain order, each
// consuming the previous output. Validation never touches pixels, and
// execution never looks at names.

use framewerk_core::error::{ExecutionError, ValidationError};
use framewerk_core::types::Chain;
use image::DynamicImage;
use tracing::{debug, info, instrument, warn};

use crate::registry::TransformRegistry;
use crate::transform::Transform;

/// One bound step of a pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Step {
    name: &'static str,
    transform: Transform,
}

/// A chain that passed validation, ready to run against an image.
///
/// ```ignore
/// let chain: Chain = serde_json::from_str(r#"[{"AdjustBrightness": 20}, {"Grayscale": null}]"#)?;
/// let pipeline = Pipeline::new(&chain)?;
/// let edited = pipeline.execute(image)?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    steps: Vec<Step>,
}

impl Pipeline {
    // -- Construction ---------------------------------------------------------

    /// Validate `chain` against the builtin registry.
    pub fn new(chain: &Chain) -> Result<Self, ValidationError> {
        Self::with_registry(chain, TransformRegistry::builtin())
    }

    /// Validate `chain` against `registry`.
    ///
    /// Fails on the first operation (in chain order) whose name is unknown or
    /// whose parameter count differs from the declared arity. Nothing is
    /// returned on failure.
    #[instrument(skip_all, fields(steps = chain.len()))]
    pub fn with_registry(
        chain: &Chain,
        registry: &TransformRegistry,
    ) -> Result<Self, ValidationError> {
        let steps = chain
            .iter()
            .map(|op| {
                let entry = registry
                    .lookup(op.name())
                    .ok_or_else(|| ValidationError::UnknownOperation(op.name().to_string()))?;
                let transform = entry.kind().bind(op.param()).ok_or_else(|| {
                    ValidationError::ArityMismatch {
                        name: op.name().to_string(),
                        expected: entry.arity(),
                        got: op.param_count(),
                    }
                })?;
                Ok(Step {
                    name: entry.name(),
                    transform,
                })
            })
            .collect::<Result<Vec<_>, ValidationError>>()
            .inspect_err(|err| warn!(error = %err, "transform chain rejected"))?;

        debug!(steps = steps.len(), "transform chain validated");
        Ok(Self { steps })
    }

    // -- Accessors ------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step names in execution order.
    pub fn operation_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.steps.iter().map(|step| step.name)
    }

    /// Bound transforms in execution order.
    pub fn transforms(&self) -> impl Iterator<Item = Transform> + '_ {
        self.steps.iter().map(|step| step.transform)
    }

    // -- Execution ------------------------------------------------------------

    /// Run every step in order and return the final image.
    ///
    /// An empty pipeline hands `image` back untouched. The first failing step
    /// aborts the run; its index and name are reported and no image is
    /// returned.
    #[instrument(skip_all, fields(steps = self.steps.len(), width = image.width(), height = image.height()))]
    pub fn execute(&self, image: DynamicImage) -> Result<DynamicImage, ExecutionError> {
        let mut current = image;
        for (index, step) in self.steps.iter().enumerate() {
            debug!(index, name = step.name, "running step");
            current = step.transform.apply(current).map_err(|cause| {
                warn!(index, name = step.name, error = %cause, "transform step failed");
                ExecutionError::StepFailed {
                    index,
                    name: step.name.to_string(),
                    cause,
                }
            })?;
        }
        info!(
            width = current.width(),
            height = current.height(),
            "pipeline complete"
        );
        Ok(current)
    }
}
