//! Consecutive snapshot comparison.
//!
//! Every current record is matched against the previous snapshot by
//! direction and flight number. Unmatched records are new legs and pass
//! through bare; matched records are compared structurally and are either
//! suppressed (identical) or annotated with their predecessor and the list of
//! patch operations turning one into the other.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::flight::FlightRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOp {
    Add,
    Remove,
    Replace,
}

/// One structural change between two JSON documents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatchOperation {
    pub op: PatchOp,
    /// JSON pointer to the changed member.
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// A current record together with what changed since the previous poll.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffedFlight {
    #[serde(flatten)]
    pub flight: FlightRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<FlightRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<PatchOperation>,
}

impl DiffedFlight {
    /// A leg seen for the first time.
    pub fn new_leg(flight: FlightRecord) -> Self {
        Self {
            flight,
            previous: None,
            changes: Vec::new(),
        }
    }

    pub fn is_new(&self) -> bool {
        self.previous.is_none()
    }
}

/// Compares `current` against `previous`, keeping the order of `current`.
///
/// When several previous records share a key, the first one wins.
pub fn find_changes(
    previous: &[FlightRecord],
    current: &[FlightRecord],
) -> serde_json::Result<Vec<DiffedFlight>> {
    let mut diffed = Vec::new();

    for record in current {
        let Some(prior) = previous.iter().find(|p| p.key() == record.key()) else {
            diffed.push(DiffedFlight::new_leg(record.clone()));
            continue;
        };

        let changes = compare(&serde_json::to_value(prior)?, &serde_json::to_value(record)?);
        if changes.is_empty() {
            continue;
        }

        diffed.push(DiffedFlight {
            flight: record.clone(),
            previous: Some(prior.clone()),
            changes,
        });
    }

    Ok(diffed)
}

/// Structural diff of two JSON values as an ordered list of patch operations.
///
/// Objects are compared member by member, recursing into nested objects;
/// removals and replacements follow the member order of `old`, additions the
/// member order of `new`. Any other differing values are replaced whole.
pub fn compare(old: &Value, new: &Value) -> Vec<PatchOperation> {
    let mut ops = Vec::new();
    compare_at("", old, new, &mut ops);
    ops
}

fn compare_at(path: &str, old: &Value, new: &Value, ops: &mut Vec<PatchOperation>) {
    match (old, new) {
        (Value::Object(old), Value::Object(new)) => compare_objects(path, old, new, ops),
        _ if old != new => ops.push(PatchOperation {
            op: PatchOp::Replace,
            path: path.to_string(),
            value: Some(new.clone()),
        }),
        _ => {}
    }
}

fn compare_objects(
    path: &str,
    old: &Map<String, Value>,
    new: &Map<String, Value>,
    ops: &mut Vec<PatchOperation>,
) {
    for (key, old_value) in old {
        let member = format!("{path}/{}", escape_pointer_token(key));
        match new.get(key) {
            Some(new_value) => compare_at(&member, old_value, new_value, ops),
            None => ops.push(PatchOperation {
                op: PatchOp::Remove,
                path: member,
                value: None,
            }),
        }
    }

    for (key, new_value) in new {
        if !old.contains_key(key) {
            ops.push(PatchOperation {
                op: PatchOp::Add,
                path: format!("{path}/{}", escape_pointer_token(key)),
                value: Some(new_value.clone()),
            });
        }
    }
}

fn escape_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}
