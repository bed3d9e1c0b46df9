//! Report configuration
//!
//! Only the human-visible strings are configurable. Page geometry, offsets,
//! column widths and font sizes are fixed by the report layout.

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::columns::TableKind;

/// Errors raised while loading a configuration override
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid {field} format string: {format:?}")]
    Format { field: &'static str, format: String },
}

/// Titles, labels and date/time formats of the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportConfig {
    pub checklist_title: String,
    pub documentation_title: String,
    pub company_label: String,
    pub date_label: String,
    pub time_label: String,
    pub area_label: String,
    pub executed_by_label: String,
    /// chrono format string for the form date
    pub date_format: String,
    /// chrono format string for the form time
    pub time_format: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            checklist_title: "CHECK LIST DAS INSTALAÇÕES ELÉTRICAS".to_string(),
            documentation_title: "CHECK LIST PARA VERIFICAÇÃO DA DOCUMENTAÇÃO".to_string(),
            company_label: "EMPRESA:".to_string(),
            date_label: "DATA:".to_string(),
            time_label: "HORA:".to_string(),
            area_label: "ÁREA:".to_string(),
            executed_by_label: "EXECUTADO POR:".to_string(),
            date_format: "%d/%m/%Y".to_string(),
            time_format: "%H:%M".to_string(),
        }
    }
}

impl ReportConfig {
    /// Parse a configuration override
    ///
    /// Missing keys keep their default value. Format strings are checked
    /// here so that rendering never meets an invalid one.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that both format strings are valid chrono patterns
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_format("date", &self.date_format)?;
        check_format("time", &self.time_format)?;
        Ok(())
    }

    /// Section title for a table
    pub fn title(&self, kind: TableKind) -> &str {
        match kind {
            TableKind::Checklist => &self.checklist_title,
            TableKind::Documentation => &self.documentation_title,
        }
    }
}

fn check_format(field: &'static str, format: &str) -> Result<(), ConfigError> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(ConfigError::Format {
            field,
            format: format.to_string(),
        });
    }
    Ok(())
}
