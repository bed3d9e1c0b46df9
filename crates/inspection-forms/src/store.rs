//! Form storage
//!
//! A form is a header plus its checklist and documentation items. Items keep
//! the order in which they were supplied.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{NaiveDate, NaiveTime};
use inspection_report::{
    time_of_day, ChecklistRow, DocumentationRow, FormHeader, FormId, FormRecord,
};
use log::debug;
use serde::Deserialize;

use crate::StoreError;

/// Source of forms for rendering
pub trait FormStore: Send + Sync {
    /// Fetch a header and both item lists in one read
    fn get_form_for_render(&self, id: FormId) -> Result<FormRecord, StoreError>;
}

impl<T: FormStore + ?Sized> FormStore for Arc<T> {
    fn get_form_for_render(&self, id: FormId) -> Result<FormRecord, StoreError> {
        (**self).get_form_for_render(id)
    }
}

/// A form to be created
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewForm {
    #[serde(alias = "empresa")]
    pub company: String,
    pub area: String,
    #[serde(alias = "data")]
    pub date: NaiveDate,
    #[serde(alias = "hora", deserialize_with = "time_of_day::deserialize")]
    pub time: NaiveTime,
    #[serde(alias = "executadoPor")]
    pub executed_by: String,
    #[serde(default)]
    pub checklist_items: Vec<ChecklistRow>,
    #[serde(default)]
    pub documentation_items: Vec<DocumentationRow>,
}

/// Header fields to change; `None` keeps the stored value
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormHeaderPatch {
    #[serde(alias = "empresa")]
    pub company: Option<String>,
    pub area: Option<String>,
    #[serde(alias = "data")]
    pub date: Option<NaiveDate>,
    #[serde(alias = "hora", deserialize_with = "optional_time")]
    pub time: Option<NaiveTime>,
    #[serde(alias = "executadoPor")]
    pub executed_by: Option<String>,
}

/// Replacement for a stored form
///
/// Header fields are patched; both item lists are replaced wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormUpdate {
    #[serde(default, alias = "formData")]
    pub header: FormHeaderPatch,
    #[serde(default)]
    pub checklist_items: Vec<ChecklistRow>,
    #[serde(default)]
    pub documentation_items: Vec<DocumentationRow>,
}

fn optional_time<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapped(#[serde(deserialize_with = "time_of_day::deserialize")] NaiveTime);

    Ok(Option::<Wrapped>::deserialize(deserializer)?.map(|Wrapped(time)| time))
}

#[derive(Debug)]
struct Tables {
    next_id: FormId,
    forms: BTreeMap<FormId, FormRecord>,
}

/// Thread-safe in-memory form store
///
/// Every operation takes the lock once, so a form is always created,
/// replaced or removed as a whole.
#[derive(Debug)]
pub struct InMemoryFormStore {
    tables: RwLock<Tables>,
}

impl Default for InMemoryFormStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryFormStore {
    /// Create an empty store; the first form gets id 1
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables {
                next_id: 1,
                forms: BTreeMap::new(),
            }),
        }
    }

    /// Insert a form with its items and return the new id
    pub fn create_form(&self, form: NewForm) -> Result<FormId, StoreError> {
        validate_text("company", &form.company)?;
        validate_text("area", &form.area)?;
        validate_text("executedBy", &form.executed_by)?;

        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let id = tables.next_id;
        tables.next_id += 1;

        let record = FormRecord {
            header: FormHeader {
                id,
                company: form.company,
                area: form.area,
                date: form.date,
                time: form.time,
                executed_by: form.executed_by,
            },
            checklist_items: form.checklist_items,
            documentation_items: form.documentation_items,
        };
        debug!(
            "Created form {} with {} checklist and {} documentation items",
            id,
            record.checklist_items.len(),
            record.documentation_items.len()
        );
        tables.forms.insert(id, record);

        Ok(id)
    }

    /// Fetch a form with its items
    pub fn get_form(&self, id: FormId) -> Result<FormRecord, StoreError> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        tables
            .forms
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound { id })
    }

    /// Patch the header and replace both item lists
    pub fn update_form(&self, id: FormId, update: FormUpdate) -> Result<(), StoreError> {
        let patch = update.header;
        for (field, value) in [
            ("company", &patch.company),
            ("area", &patch.area),
            ("executedBy", &patch.executed_by),
        ] {
            if let Some(value) = value {
                validate_text(field, value)?;
            }
        }

        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let record = tables
            .forms
            .get_mut(&id)
            .ok_or(StoreError::NotFound { id })?;

        let header = &mut record.header;
        if let Some(company) = patch.company {
            header.company = company;
        }
        if let Some(area) = patch.area {
            header.area = area;
        }
        if let Some(date) = patch.date {
            header.date = date;
        }
        if let Some(time) = patch.time {
            header.time = time;
        }
        if let Some(executed_by) = patch.executed_by {
            header.executed_by = executed_by;
        }
        record.checklist_items = update.checklist_items;
        record.documentation_items = update.documentation_items;

        debug!("Updated form {}", id);
        Ok(())
    }

    /// Remove a form and its items
    pub fn delete_form(&self, id: FormId) -> Result<(), StoreError> {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        if tables.forms.remove(&id).is_none() {
            return Err(StoreError::NotFound { id });
        }
        debug!("Deleted form {}", id);
        Ok(())
    }

    /// All form headers ordered by id
    pub fn list_forms(&self) -> Vec<FormHeader> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        tables
            .forms
            .values()
            .map(|record| record.header.clone())
            .collect()
    }
}

impl FormStore for InMemoryFormStore {
    fn get_form_for_render(&self, id: FormId) -> Result<FormRecord, StoreError> {
        self.get_form(id)
    }
}

fn validate_text(field: &str, value: &str) -> Result<(), StoreError> {
    if value.trim().is_empty() {
        return Err(StoreError::Invalid(format!("{field} is required")));
    }
    Ok(())
}
