//! Manual override gate.
//!
//! Every persisted score travels as a `(value, manual)` pair. A manual pair is
//! authoritative input for the rest of the pipeline and is never written by a
//! recompute; a computed pair is overwritten on every run, including with `None`
//! when its inputs disappear.

use serde::{Deserialize, Serialize};

use super::domain::ScoreField;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scored<T> {
    #[serde(default)]
    pub value: Option<T>,
    #[serde(default)]
    pub manual: bool,
}

impl<T> Default for Scored<T> {
    fn default() -> Self {
        Self {
            value: None,
            manual: false,
        }
    }
}

impl<T: Copy> Scored<T> {
    pub const fn computed(value: Option<T>) -> Self {
        Self {
            value,
            manual: false,
        }
    }

    pub const fn manual(value: T) -> Self {
        Self {
            value: Some(value),
            manual: true,
        }
    }

    pub fn value(&self) -> Option<T> {
        self.value
    }

    pub fn is_manual(&self) -> bool {
        self.manual
    }

    /// Write `computed` unless the field is pinned.
    pub fn apply(&mut self, computed: Option<T>) -> GateOutcome {
        if self.manual {
            return GateOutcome::Preserved;
        }
        self.value = computed;
        GateOutcome::Written
    }

    pub fn release(&mut self) {
        self.manual = false;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateOutcome {
    Written,
    Preserved,
}

/// Which fields a recompute wrote and which it left to the trainer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateReport {
    pub written: Vec<ScoreField>,
    pub preserved: Vec<ScoreField>,
}

impl GateReport {
    pub fn record(&mut self, field: ScoreField, outcome: GateOutcome) {
        match outcome {
            GateOutcome::Written => self.written.push(field),
            GateOutcome::Preserved => self.preserved.push(field),
        }
    }

    pub fn was_preserved(&self, field: ScoreField) -> bool {
        self.preserved.contains(&field)
    }
}
