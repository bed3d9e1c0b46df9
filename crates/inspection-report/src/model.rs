//! Form data model
//!
//! Field names serialize in camelCase. The Portuguese names used by the
//! existing frontend payloads (`empresa`, `executadoPor`, ...) are accepted
//! as aliases.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Identifier of a stored form
pub type FormId = i64;

/// Top-level inspection record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormHeader {
    pub id: FormId,
    #[serde(alias = "empresa")]
    pub company: String,
    pub area: String,
    #[serde(alias = "data")]
    pub date: NaiveDate,
    #[serde(alias = "hora", deserialize_with = "time_of_day::deserialize")]
    pub time: NaiveTime,
    #[serde(alias = "executadoPor")]
    pub executed_by: String,
}

/// One inspected electrical-installation item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistRow {
    #[serde(alias = "standard")]
    pub standard_ref: String,
    pub description: String,
    pub condition: String,
    #[serde(default)]
    pub fe: String,
    #[serde(default)]
    pub nper: String,
    #[serde(default)]
    pub comment: Option<String>,
    /// Base64-encoded image
    #[serde(default)]
    pub photo: Option<String>,
    /// Opaque audio payload, never rendered
    #[serde(default)]
    pub audio: Option<String>,
}

/// One compliance-document check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentationRow {
    #[serde(alias = "standard")]
    pub standard_ref: String,
    pub description: String,
    pub condition: String,
    #[serde(default)]
    pub comment: Option<String>,
    /// Base64-encoded image
    #[serde(default)]
    pub photo: Option<String>,
    /// Opaque audio payload, never rendered
    #[serde(default)]
    pub audio: Option<String>,
    /// Opaque PDF payload, never rendered
    #[serde(default)]
    pub pdf: Option<String>,
}

/// Everything the renderer needs for one form, in storage order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormRecord {
    #[serde(alias = "form")]
    pub header: FormHeader,
    #[serde(default)]
    pub checklist_items: Vec<ChecklistRow>,
    #[serde(default)]
    pub documentation_items: Vec<DocumentationRow>,
}

/// Times arrive either as `HH:MM:SS` (database) or `HH:MM` (form input)
pub mod time_of_day {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&text, "%H:%M:%S%.f")
            .or_else(|_| NaiveTime::parse_from_str(&text, "%H:%M"))
            .map_err(|_| de::Error::custom(format!("invalid time of day: {text}")))
    }
}
