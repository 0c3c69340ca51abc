use std::collections::BTreeMap;

use crate::animation::value::Value;
use crate::foundation::core::TargetId;
use crate::foundation::error::ScrollweaveResult;

/// Host-side property writer (DOM style/transform, GPU uniforms, ...).
pub trait PropertySink {
    /// Write one property. A failure is isolated to this write.
    fn apply(&mut self, target: TargetId, property: &str, value: &Value) -> ScrollweaveResult<()>;
}

impl<F> PropertySink for F
where
    F: FnMut(TargetId, &str, &Value) -> ScrollweaveResult<()>,
{
    fn apply(&mut self, target: TargetId, property: &str, value: &Value) -> ScrollweaveResult<()> {
        self(target, property, value)
    }
}

/// A property write or evaluation that failed during a frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyFailure {
    /// Target being animated.
    pub target: TargetId,
    /// Property name.
    pub property: String,
    /// Rendered error.
    pub message: String,
}

/// In-memory sink recording the latest value of every property.
#[derive(Clone, Debug, Default)]
pub struct PropertyStore {
    values: BTreeMap<(TargetId, String), Value>,
    writes: u64,
}

impl PropertyStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest value written to `property` of `target`.
    pub fn get(&self, target: impl Into<TargetId>, property: &str) -> Option<&Value> {
        self.values.get(&(target.into(), property.to_owned()))
    }

    /// Latest scalar value, if the property holds a number.
    pub fn scalar(&self, target: impl Into<TargetId>, property: &str) -> Option<f64> {
        self.get(target, property).and_then(Value::as_scalar)
    }

    /// Total writes received.
    pub fn writes(&self) -> u64 {
        self.writes
    }

    /// Number of distinct properties written.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// `true` before the first write.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl PropertySink for PropertyStore {
    fn apply(&mut self, target: TargetId, property: &str, value: &Value) -> ScrollweaveResult<()> {
        self.writes += 1;
        self.values
            .insert((target, property.to_owned()), value.clone());
        Ok(())
    }
}
