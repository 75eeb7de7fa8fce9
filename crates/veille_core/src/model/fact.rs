//! Fact domain model and write-side validation.
//!
//! # Responsibility
//! - Define the persisted `Fact` record and its JSON wire shape.
//! - Define write inputs (`FactDraft`, `FactPatch`) and their validation.
//!
//! # Invariants
//! - `fact` and `techno` are non-blank after any create or update.
//! - `techno` holds at most [`TECHNO_MAX_CHARS`] characters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned fact identifier.
pub type FactId = i64;

/// Column width of `fact.techno`.
pub const TECHNO_MAX_CHARS: usize = 255;

const BLANK_MESSAGE: &str = "This value should not be blank.";

/// Persisted fact record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
    pub id: FactId,
    /// Free-form text of the fact.
    pub fact: String,
    /// Technology tag used for filtering and grouping.
    pub techno: String,
    /// Creation time, millisecond precision.
    #[serde(rename = "dateEnregistrement", with = "rfc3339_millis")]
    pub date_enregistrement: DateTime<Utc>,
}

/// `2023-11-14T22:13:20.120Z`: always three fractional digits and `Z`.
mod rfc3339_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// Complete set of mutable fields, used by create and full replace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactDraft {
    pub fact: String,
    pub techno: String,
}

impl FactDraft {
    pub fn new(fact: impl Into<String>, techno: impl Into<String>) -> Self {
        Self {
            fact: fact.into(),
            techno: techno.into(),
        }
    }

    /// Validates the draft, collecting every failing field.
    pub fn validate(&self) -> Result<(), FactValidationError> {
        let mut violations = Vec::new();

        if self.fact.trim().is_empty() {
            violations.push(FieldViolation::new("fact", BLANK_MESSAGE));
        }

        if self.techno.trim().is_empty() {
            violations.push(FieldViolation::new("techno", BLANK_MESSAGE));
        } else if self.techno.chars().count() > TECHNO_MAX_CHARS {
            violations.push(FieldViolation::new(
                "techno",
                format!(
                    "This value is too long. It should have {TECHNO_MAX_CHARS} characters or less."
                ),
            ));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(FactValidationError { violations })
        }
    }

    /// Returns whether either required field is blank.
    pub fn has_blank_field(&self) -> bool {
        self.fact.trim().is_empty() || self.techno.trim().is_empty()
    }
}

impl From<&Fact> for FactDraft {
    fn from(value: &Fact) -> Self {
        Self::new(value.fact.clone(), value.techno.clone())
    }
}

/// Partial update: `None` fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FactPatch {
    #[serde(default)]
    pub fact: Option<String>,
    #[serde(default)]
    pub techno: Option<String>,
}

impl FactPatch {
    /// Merges this patch over `current`, producing the draft to validate.
    pub fn apply_to(&self, current: &Fact) -> FactDraft {
        FactDraft {
            fact: self.fact.clone().unwrap_or_else(|| current.fact.clone()),
            techno: self.techno.clone().unwrap_or_else(|| current.techno.clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fact.is_none() && self.techno.is_none()
    }
}

/// One failed constraint on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

impl FieldViolation {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validation failure carrying every violated field constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactValidationError {
    pub violations: Vec<FieldViolation>,
}

impl Display for FactValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let parts = self
            .violations
            .iter()
            .map(|violation| format!("{}: {}", violation.field, violation.message))
            .collect::<Vec<_>>();
        write!(f, "invalid fact: {}", parts.join("; "))
    }
}

impl Error for FactValidationError {}
