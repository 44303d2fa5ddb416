use serde::{Deserialize, Serialize};

/// Price rules shared by purchases, trade-ins and loyalty redemption
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PricingConfig {
    /// Discount for verified students, in percent of the base price
    pub student_discount_percent: u32,

    /// Share of the catalog price credited for a trade-in, in percent
    pub trade_in_percent: u32,

    /// Loyalty points needed for one currency unit of discount
    pub points_per_currency_unit: u32,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            student_discount_percent: 20,
            trade_in_percent: 40,
            points_per_currency_unit: 10,
        }
    }
}

/// Severity classes used by the repair cost estimator
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DamageSeverity {
    /// Small cracks, loose parts
    Minor,
    /// Screen replacement, battery issues
    Moderate,
    /// Motherboard repair, water damage
    Major,
}

impl DamageSeverity {
    pub fn base_cost(self) -> u32 {
        match self {
            DamageSeverity::Minor => 500,
            DamageSeverity::Moderate => 1500,
            DamageSeverity::Major => 3000,
        }
    }
}

/// Integer price calculations. All results truncate toward zero.
#[derive(Debug, Clone, Default)]
pub struct PricingEngine {
    config: PricingConfig,
}

impl PricingEngine {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Price charged to a verified student
    pub fn student_price(&self, base_price: u32) -> u32 {
        let percent = self.config.student_discount_percent.min(100);
        apply_percent(base_price, 100 - percent)
    }

    /// Price to charge for one unit, given whether the student discount applies
    pub fn unit_price(&self, base_price: u32, student_discount: bool) -> u32 {
        if student_discount {
            self.student_price(base_price)
        } else {
            base_price
        }
    }

    /// Loyalty points credited when an item bought at `catalog_price` is traded in
    pub fn trade_in_value(&self, catalog_price: u32) -> u32 {
        apply_percent(catalog_price, self.config.trade_in_percent)
    }

    /// Currency discount granted for redeeming `points`
    pub fn redemption_discount(&self, points: u32) -> u32 {
        match self.config.points_per_currency_unit {
            0 => 0,
            rate => points / rate,
        }
    }

    /// Rough repair quote; warranty coverage halves the base cost
    pub fn repair_estimate(&self, severity: DamageSeverity, under_warranty: bool) -> u32 {
        let base = severity.base_cost();
        if under_warranty {
            base / 2
        } else {
            base
        }
    }
}

fn apply_percent(amount: u32, percent: u32) -> u32 {
    let scaled = u64::from(amount) * u64::from(percent) / 100;
    u32::try_from(scaled).unwrap_or(u32::MAX)
}
