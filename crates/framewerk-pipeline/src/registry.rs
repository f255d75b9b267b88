// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Transform registry: the closed table of operation names a chain may use,
// with the parameter arity each one declares.

use crate::transform::Transform;

/// The operations Framewerk knows how to run, without their parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformKind {
    Grayscale,
    AdjustBrightness,
    AdjustSaturation,
    AdjustContrast,
    Blur,
    AdjustGamma,
}

impl TransformKind {
    /// Wire name, matched case-sensitively against chain entries.
    pub const fn name(self) -> &'static str {
        match self {
            TransformKind::Grayscale => "Grayscale",
            TransformKind::AdjustBrightness => "AdjustBrightness",
            TransformKind::AdjustSaturation => "AdjustSaturation",
            TransformKind::AdjustContrast => "AdjustContrast",
            TransformKind::Blur => "Blur",
            TransformKind::AdjustGamma => "AdjustGamma",
        }
    }

    /// Number of parameters the operation takes.
    pub const fn arity(self) -> usize {
        match self {
            TransformKind::Grayscale => 0,
            TransformKind::AdjustBrightness
            | TransformKind::AdjustSaturation
            | TransformKind::AdjustContrast
            | TransformKind::Blur
            | TransformKind::AdjustGamma => 1,
        }
    }

    /// Attach a parameter, producing a runnable [`Transform`].
    ///
    /// Returns `None` when the parameter's presence does not match the arity.
    pub fn bind(self, param: Option<f64>) -> Option<Transform> {
        let transform = match (self, param) {
            (TransformKind::Grayscale, None) => Transform::Grayscale,
            (TransformKind::AdjustBrightness, Some(percentage)) => {
                Transform::AdjustBrightness { percentage }
            }
            (TransformKind::AdjustSaturation, Some(percentage)) => {
                Transform::AdjustSaturation { percentage }
            }
            (TransformKind::AdjustContrast, Some(percentage)) => {
                Transform::AdjustContrast { percentage }
            }
            (TransformKind::Blur, Some(sigma)) => Transform::Blur { sigma },
            (TransformKind::AdjustGamma, Some(gamma)) => Transform::AdjustGamma { gamma },
            _ => return None,
        };
        Some(transform)
    }
}

/// A single registry row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformEntry {
    kind: TransformKind,
}

impl TransformEntry {
    pub const fn new(kind: TransformKind) -> Self {
        Self { kind }
    }

    pub const fn kind(&self) -> TransformKind {
        self.kind
    }

    pub const fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub const fn arity(&self) -> usize {
        self.kind.arity()
    }
}

static BUILTIN_ENTRIES: [TransformEntry; 6] = [
    TransformEntry::new(TransformKind::Grayscale),
    TransformEntry::new(TransformKind::AdjustBrightness),
    TransformEntry::new(TransformKind::AdjustSaturation),
    TransformEntry::new(TransformKind::AdjustContrast),
    TransformEntry::new(TransformKind::Blur),
    TransformEntry::new(TransformKind::AdjustGamma),
];

static BUILTIN: TransformRegistry = TransformRegistry::new(&BUILTIN_ENTRIES);

/// Read-only table of supported operations.
///
/// The builtin registry is a `static`; requests share it without locking.
#[derive(Debug, Clone, Copy)]
pub struct TransformRegistry {
    entries: &'static [TransformEntry],
}

impl TransformRegistry {
    /// A registry over an explicit set of entries, e.g. to expose a subset of
    /// the builtin operations.
    pub const fn new(entries: &'static [TransformEntry]) -> Self {
        Self { entries }
    }

    /// Every operation Framewerk ships.
    pub fn builtin() -> &'static TransformRegistry {
        &BUILTIN
    }

    pub fn lookup(&self, name: &str) -> Option<&TransformEntry> {
        self.entries.iter().find(|entry| entry.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(TransformEntry::name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
