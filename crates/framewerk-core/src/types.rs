// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types: operations, ordered chains, and request/response bodies.

use std::fmt;

use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

/// One named transform with its optional scalar parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    name: String,
    param: Option<f64>,
}

impl Operation {
    pub fn new(name: impl Into<String>, param: Option<f64>) -> Self {
        Self {
            name: name.into(),
            param,
        }
    }

    /// An operation that carries no parameter.
    pub fn bare(name: impl Into<String>) -> Self {
        Self::new(name, None)
    }

    /// An operation with a single numeric parameter.
    pub fn with_param(name: impl Into<String>, param: f64) -> Self {
        Self::new(name, Some(param))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn param(&self) -> Option<f64> {
        self.param
    }

    /// Number of parameters supplied (0 or 1).
    pub fn param_count(&self) -> usize {
        usize::from(self.param.is_some())
    }
}

/// Ordered list of operations. Names may repeat; order is execution order.
///
/// On the wire a chain is either a list of single-entry objects
/// (`[{"Grayscale": null}, {"Blur": 1.5}]`) or one object whose entries are
/// read in document order (`{"Grayscale": null, "Blur": 1.5}`). `null` means
/// "no parameter".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chain(Vec<Operation>);

impl Chain {
    pub fn new(operations: Vec<Operation>) -> Self {
        Self(operations)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Operation> {
        self.0.iter()
    }

    pub fn operations(&self) -> &[Operation] {
        &self.0
    }
}

impl FromIterator<Operation> for Chain {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Chain {
    type Item = &'a Operation;
    type IntoIter = std::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// -- Wire format --------------------------------------------------------------

/// Serializes an operation as `{"<name>": <param|null>}`.
struct SingleEntry<'a>(&'a Operation);

impl Serialize for SingleEntry<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.0.name, &self.0.param)?;
        map.end()
    }
}

impl Serialize for Chain {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for op in &self.0 {
            seq.serialize_element(&SingleEntry(op))?;
        }
        seq.end()
    }
}

/// A list element: an object with exactly one `name: param` entry.
struct ListStep(Operation);

impl<'de> Deserialize<'de> for ListStep {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StepVisitor;

        impl<'de> Visitor<'de> for StepVisitor {
            type Value = ListStep;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object with exactly one operation entry")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<ListStep, A::Error> {
                let (name, param) = map
                    .next_entry::<String, Option<f64>>()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;
                if map.next_key::<IgnoredAny>()?.is_some() {
                    return Err(de::Error::custom(format!(
                        "chain step for {name} has more than one entry"
                    )));
                }
                Ok(ListStep(Operation::new(name, param)))
            }
        }

        deserializer.deserialize_map(StepVisitor)
    }
}

impl<'de> Deserialize<'de> for Chain {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ChainVisitor;

        impl<'de> Visitor<'de> for ChainVisitor {
            type Value = Chain;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a list of single-entry operation objects or an operation object")
            }

            fn visit_unit<E: de::Error>(self) -> Result<Chain, E> {
                Ok(Chain::default())
            }

            fn visit_none<E: de::Error>(self) -> Result<Chain, E> {
                Ok(Chain::default())
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Chain, A::Error> {
                let mut ops = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(ListStep(op)) = seq.next_element()? {
                    ops.push(op);
                }
                Ok(Chain(ops))
            }

            // Entries arrive in document order; never collect into a HashMap here.
            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Chain, A::Error> {
                let mut ops = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, param)) = map.next_entry::<String, Option<f64>>()? {
                    ops.push(Operation::new(name, param));
                }
                Ok(Chain(ops))
            }
        }

        deserializer.deserialize_any(ChainVisitor)
    }
}

// -- Request / response bodies ------------------------------------------------

/// Body of an editor request.
///
/// Field names accept camelCase, the PascalCase names older clients send, and
/// snake_case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRequest {
    /// Bucket holding the source object.
    #[serde(alias = "Bucket")]
    pub bucket: String,
    /// Key of the source object.
    #[serde(alias = "Object")]
    pub object: String,
    /// Transforms to apply, in order.
    #[serde(default, alias = "Chain")]
    pub chain: Chain,
    /// Bucket the result is written to.
    #[serde(alias = "Output")]
    pub output: String,
    /// Path segment inserted between the source directory and the file name.
    #[serde(default, alias = "OutputPath", alias = "output_path")]
    pub output_path: String,
}

/// Body of a resize request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeRequest {
    #[serde(alias = "Bucket")]
    pub bucket: String,
    #[serde(alias = "Object")]
    pub object: String,
    /// Target width in pixels; height follows the aspect ratio.
    #[serde(alias = "Width")]
    pub width: u32,
    #[serde(alias = "Output")]
    pub output: String,
    #[serde(default, alias = "OutputPath", alias = "output_path")]
    pub output_path: String,
}

/// Lifecycle of the HTTP listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerStatus {
    Stopped,
    Starting,
    Running,
}

/// Location of a stored result: `{ "object": <key>, "bucket": <bucket> }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    pub object: String,
    pub bucket: String,
}
