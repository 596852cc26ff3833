// ── Variables ──
//
// Integer and state variables. Definitions give id and name; values
// arrive from a separate fetch and then from `_1` events.

use chrono::NaiveDateTime;
use isy_api::VariableKind;
use serde::Serialize;

/// Registry key for a variable: `"<type code>:<id>"`.
pub fn variable_key(kind: VariableKind, id: &str) -> String {
    format!("{}:{id}", kind.code())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    pub id: String,
    pub name: String,
    pub kind: VariableKind,
    pub value: Option<f64>,
    pub init: Option<f64>,
    /// Controller-local time of the last value change.
    pub last_changed: Option<NaiveDateTime>,
}

impl Variable {
    pub fn new(kind: VariableKind, id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            value: None,
            init: None,
            last_changed: None,
        }
    }

    pub fn key(&self) -> String {
        variable_key(self.kind, &self.id)
    }

    /// Store a new value. Unconditional: callers decide whether to notify.
    pub fn set_value(&mut self, value: Option<f64>, timestamp: Option<NaiveDateTime>) {
        self.value = value;
        if timestamp.is_some() {
            self.last_changed = timestamp;
        }
    }
}
