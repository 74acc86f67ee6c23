use std::cmp::Ordering;

use chrono::NaiveDateTime;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::DEFAULT_CATEGORY;

/// Version assumed for data files written before versions were recorded.
pub const LEGACY_VERSION: &str = "1.0.0";

/// Stand-in creation time for notes that never recorded one.
const EPOCH_TIMESTAMP: &str = "1970-01-01T00:00:00";

struct Migration {
    version: &'static str,
    name: &'static str,
    apply: fn(&mut Map<String, Value>),
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "1.1.0",
        name: "split_timestamps",
        apply: split_timestamps,
    },
    Migration {
        version: "1.2.0",
        name: "normalize_notes",
        apply: normalize_notes,
    },
];

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("top-level value is not an object")]
    NotAnObject,

    #[error("version {found} is newer than {latest}")]
    UnsupportedVersion { found: String, latest: String },
}

/// What a migration run did to a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub from: String,
    pub applied: Vec<&'static str>,
    /// True when the document differs from what was read, either because
    /// steps ran or because the version tag was re-stamped.
    pub changed: bool,
}

/// The schema version written by this build.
pub fn latest_version() -> &'static str {
    MIGRATIONS.last().map_or(LEGACY_VERSION, |migration| migration.version)
}

/// A version tag compared segment by segment as numbers.
///
/// Non-numeric segments (the legacy `1.0.x`) count as zero, as do missing
/// trailing segments, so `1.1` == `1.1.0` and `1.10.0` > `1.9.0`.
#[derive(Debug, Clone)]
pub struct SchemaVersion(Vec<u32>);

impl SchemaVersion {
    pub fn parse(tag: &str) -> Self {
        Self(
            tag.trim()
                .split('.')
                .map(|segment| segment.parse().unwrap_or(0))
                .collect(),
        )
    }
}

impl Ord for SchemaVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.0.len().max(other.0.len());
        (0..len)
            .map(|i| {
                let lhs = self.0.get(i).copied().unwrap_or(0);
                let rhs = other.0.get(i).copied().unwrap_or(0);
                lhs.cmp(&rhs)
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for SchemaVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SchemaVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for SchemaVersion {}

/// Upgrade a raw data document to the latest schema in place.
///
/// Steps run in declared order, each one only when the document's version is
/// older than the step's target. The result is stamped with
/// [`latest_version`]. Only a document that is not a JSON object, or one from
/// a newer build, is rejected.
pub fn run_migrations(doc: &mut Value) -> Result<MigrationReport, SchemaError> {
    let root = doc.as_object_mut().ok_or(SchemaError::NotAnObject)?;
    let from = stored_version(root);
    let latest = latest_version();

    let mut current = SchemaVersion::parse(&from);
    if current > SchemaVersion::parse(latest) {
        return Err(SchemaError::UnsupportedVersion {
            found: from,
            latest: latest.to_string(),
        });
    }

    let mut applied = Vec::new();
    for migration in MIGRATIONS {
        let target = SchemaVersion::parse(migration.version);
        if current < target {
            tracing::info!(
                "Applying migration {}: {} (data file at {})",
                migration.version,
                migration.name,
                from
            );
            (migration.apply)(root);
            current = target;
            applied.push(migration.version);
        }
    }

    let changed = !applied.is_empty() || root.get("version").and_then(Value::as_str) != Some(latest);
    root.insert("version".into(), Value::String(latest.to_string()));

    Ok(MigrationReport {
        from,
        applied,
        changed,
    })
}

fn stored_version(root: &Map<String, Value>) -> String {
    match root.get("version") {
        Some(Value::String(tag)) => tag.clone(),
        Some(Value::Number(number)) => number.to_string(),
        _ => LEGACY_VERSION.to_string(),
    }
}

struct ParentInfo {
    id: Value,
    category: Value,
}

/// Depth-first visit of every note object under `notes`, subs included.
/// Non-object entries and non-array `subs` are skipped.
fn walk_notes<F>(notes: &mut Value, parent: Option<&ParentInfo>, visit: &mut F)
where
    F: FnMut(&mut Map<String, Value>, Option<&ParentInfo>),
{
    let Some(notes) = notes.as_array_mut() else {
        return;
    };
    for note in notes.iter_mut() {
        let Some(fields) = note.as_object_mut() else {
            continue;
        };
        visit(fields, parent);

        let info = ParentInfo {
            id: fields.get("id").cloned().unwrap_or(Value::Null),
            category: fields.get("category").cloned().unwrap_or(Value::Null),
        };
        if let Some(subs) = fields.get_mut("subs") {
            walk_notes(subs, Some(&info), visit);
        }
    }
}

// ============================================================
// Steps
// ============================================================

/// 1.0.x → 1.1.0: `timestamp` becomes `created_timestamp`, and the mark
/// timestamp and sub-note list appear.
fn split_timestamps(root: &mut Map<String, Value>) {
    let Some(notes) = root.get_mut("notes") else {
        return;
    };
    walk_notes(notes, None, &mut |note, _| {
        let Some(timestamp) = note.remove("timestamp") else {
            return;
        };
        note.insert("created_timestamp".into(), timestamp);
        note.insert("marked_timestamp".into(), Value::Null);
        note.entry("subs").or_insert_with(|| Value::Array(Vec::new()));
    });
}

/// 1.1.0 → 1.2.0: fill every field the typed model relies on and make the
/// id counter cover every id present.
fn normalize_notes(root: &mut Map<String, Value>) {
    let notes = root
        .entry("notes")
        .or_insert_with(|| Value::Array(Vec::new()));

    let mut highest_id = 0;
    walk_notes(notes, None, &mut |note, parent| {
        if let Some(id) = note.get("id").and_then(Value::as_u64) {
            highest_id = highest_id.max(id);
        }
        if !note.get("checked").is_some_and(Value::is_boolean) {
            note.insert("checked".into(), Value::Bool(false));
        }
        if !note.get("subs").is_some_and(Value::is_array) {
            note.insert("subs".into(), Value::Array(Vec::new()));
        }
        if !note.get("category").is_some_and(Value::is_string) {
            let category = parent
                .map(|parent| parent.category.clone())
                .filter(Value::is_string)
                .unwrap_or_else(|| Value::String(String::new()));
            note.insert("category".into(), category);
        }
        if !note
            .get("importance")
            .is_some_and(|importance| importance.is_null() || importance.is_i64())
        {
            note.insert("importance".into(), Value::Null);
        }
        if !note.get("note").is_some_and(Value::is_string) {
            note.insert("note".into(), Value::String(String::new()));
        }
        if !note.get("created_timestamp").is_some_and(is_timestamp) {
            note.insert(
                "created_timestamp".into(),
                Value::String(EPOCH_TIMESTAMP.to_string()),
            );
        }
        if !note
            .get("marked_timestamp")
            .is_some_and(|marked| marked.is_null() || is_timestamp(marked))
        {
            note.insert("marked_timestamp".into(), Value::Null);
        }
        match parent {
            Some(parent) if !parent.id.is_null() => {
                note.insert("parent".into(), parent.id.clone());
            }
            _ => {
                note.remove("parent");
            }
        }
    });

    let max_id = root
        .get("max_id")
        .and_then(Value::as_u64)
        .unwrap_or(0)
        .max(highest_id);
    root.insert("max_id".into(), Value::from(max_id));

    if !root.get("last_category").is_some_and(Value::is_string) {
        root.insert(
            "last_category".into(),
            Value::String(DEFAULT_CATEGORY.to_string()),
        );
    }
}

fn is_timestamp(value: &Value) -> bool {
    value
        .as_str()
        .is_some_and(|text| text.parse::<NaiveDateTime>().is_ok())
}
