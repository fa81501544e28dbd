use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// One persisted entity: a JSON object with at least an integer `id`.
pub type Record = serde_json::Map<String, JsonValue>;

/// Field every record carries.
pub const ID_FIELD: &str = "id";

/// Positive integer id, unique within a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(u64);

impl RecordId {
    pub const FIRST: RecordId = RecordId(1);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    /// The id after this one; `None` once the id space is used up.
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }

    /// Integer-prefix coercion of an id taken from a path or query string.
    ///
    /// Surrounding whitespace is ignored and the leading decimal digits are
    /// used, so `"12"` and `" 12abc"` both give 12. Text without a leading
    /// digit coerces to nothing, which matches no record.
    pub fn coerce(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let digits = trimmed
            .strip_prefix('+')
            .unwrap_or(trimmed);
        let end = digits
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(digits.len());

        digits[..end].parse::<u64>().ok().map(Self)
    }

    /// Id stored in a record, if it is a positive integer.
    pub fn of(record: &Record) -> Option<Self> {
        record.get(ID_FIELD).and_then(Self::from_json)
    }

    /// Positive integer held in a JSON number. Whole floats such as `2.0`
    /// count as the integer they equal.
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        let id = match value.as_u64() {
            Some(id) => id,
            None => {
                let float = value.as_f64()?;
                if float.fract() != 0.0 || float < 1.0 || float >= u64::MAX as f64 {
                    return None;
                }
                float as u64
            }
        };

        (id > 0).then_some(Self(id))
    }
}

impl From<u64> for RecordId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<RecordId> for JsonValue {
    fn from(id: RecordId) -> Self {
        JsonValue::from(id.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Builds a record from a `json!` object literal; anything else yields an empty record.
pub fn record_from(value: JsonValue) -> Record {
    match value {
        JsonValue::Object(map) => map,
        _ => Record::new(),
    }
}
