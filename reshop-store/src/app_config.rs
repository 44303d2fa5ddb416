use reshop_catalog::PricingConfig;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub business_rules: BusinessRules,
    pub notifications: NotificationConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DataConfig {
    pub path: String,
    /// Seed the demo catalog when the loaded inventory is empty
    pub seed_catalog: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: "shop_data.txt".to_string(),
            seed_catalog: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BusinessRules {
    pub student_discount_percent: u32,
    pub points_per_purchase: u32,
    /// 100 points at the default rate of 10 buy a discount of 10
    pub points_per_currency_unit: u32,
    pub trade_in_percent: u32,
    pub low_stock_threshold: u32,
    pub reorder_target: u32,
    pub popular_items_limit: usize,
    pub allow_backward_transitions: bool,
}

impl Default for BusinessRules {
    fn default() -> Self {
        Self {
            student_discount_percent: 20,
            points_per_purchase: 10,
            points_per_currency_unit: 10,
            trade_in_percent: 40,
            low_stock_threshold: 5,
            reorder_target: 10,
            popular_items_limit: 10,
            allow_backward_transitions: true,
        }
    }
}

impl BusinessRules {
    pub fn pricing(&self) -> PricingConfig {
        PricingConfig {
            student_discount_percent: self.student_discount_percent,
            trade_in_percent: self.trade_in_percent,
            points_per_currency_unit: self.points_per_currency_unit,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NotificationConfig {
    /// Recipient of repair updates for requests without a technician
    pub repair_desk: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            repair_desk: "repairs@campus-shop.local".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Shipped defaults; every key also has a serde default
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Machine-local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. `RESHOP__DATA__PATH=/tmp/shop.txt`
            .add_source(config::Environment::with_prefix("RESHOP").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
