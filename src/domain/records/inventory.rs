//! Warehouse inventory record

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthTier {
    #[default]
    Healthy,
    Warning,
    Critical,
}

impl HealthTier {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "HEALTHY",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for HealthTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: Uuid,
    pub name: String,
    pub brand: String,
    pub spec: String,
    pub quantity: f64,
    pub unit: String,
    pub expiry_date: NaiveDate,
    pub health: HealthTier,
    pub price: f64,
}

impl InventoryItem {
    /// True once the expiry date has been reached
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expiry_date <= today
    }
}
