use chrono::{DateTime, SubsecRound, Utc};
use reshop_shared::text::check_required_field;
use reshop_shared::FieldError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// One item dropped off for recycling
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecyclingRecord {
    pub item_name: String,
    pub weight_kg: f64,
    pub timestamp: DateTime<Utc>,
}

/// Recycled weight for one item name
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecycledItem {
    pub item_name: String,
    pub weight_kg: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RecyclingStats {
    pub items_recycled: usize,
    pub total_weight_kg: f64,
    /// Alphabetical by item name
    pub by_item: Vec<RecycledItem>,
}

/// Append-only log of recycled drop-offs
#[derive(Debug, Clone, Default)]
pub struct RecyclingLog {
    entries: Vec<RecyclingRecord>,
}

impl RecyclingLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        item_name: impl Into<String>,
        weight_kg: f64,
        timestamp: DateTime<Utc>,
    ) -> Result<&RecyclingRecord, RecyclingError> {
        let item_name = item_name.into();
        check_required_field("item name", &item_name)?;
        if !weight_kg.is_finite() || weight_kg <= 0.0 {
            return Err(RecyclingError::InvalidWeight(weight_kg));
        }

        info!("Recycled '{}' ({} kg)", item_name, weight_kg);
        self.entries.push(RecyclingRecord {
            item_name,
            weight_kg,
            timestamp: timestamp.trunc_subsecs(0),
        });
        Ok(&self.entries[self.entries.len() - 1])
    }

    pub fn entries(&self) -> &[RecyclingRecord] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_weight_kg(&self) -> f64 {
        self.entries.iter().map(|r| r.weight_kg).sum()
    }

    pub fn stats(&self) -> RecyclingStats {
        let mut by_name: BTreeMap<&str, f64> = BTreeMap::new();
        for record in &self.entries {
            *by_name.entry(record.item_name.as_str()).or_default() += record.weight_kg;
        }

        RecyclingStats {
            items_recycled: self.entries.len(),
            total_weight_kg: self.total_weight_kg(),
            by_item: by_name
                .into_iter()
                .map(|(item_name, weight_kg)| RecycledItem {
                    item_name: item_name.to_string(),
                    weight_kg,
                })
                .collect(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RecyclingError {
    #[error("Recycled weight must be a positive number of kilograms, got {0}")]
    InvalidWeight(f64),

    #[error(transparent)]
    InvalidField(#[from] FieldError),
}
