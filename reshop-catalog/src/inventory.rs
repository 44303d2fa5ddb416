use crate::item::{Item, NewItem};
use crate::pricing::PricingEngine;
use reshop_shared::text::check_field;
use reshop_shared::{FieldError, ItemId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Aggregate stock figures for the inventory status screen
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InventoryStatus {
    pub total_units: u64,
    pub total_value: u64,
}

/// Authoritative stock and pricing state.
///
/// Items live in insertion order and are never removed; an item's id is its
/// position. All mutations go through `&mut self`, so a single owner
/// serializes access.
#[derive(Debug, Clone, Default)]
pub struct InventoryLedger {
    items: Vec<Item>,
    pricing: PricingEngine,
}

impl InventoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pricing(pricing: PricingEngine) -> Self {
        Self {
            items: Vec::new(),
            pricing,
        }
    }

    pub fn pricing(&self) -> &PricingEngine {
        &self.pricing
    }

    pub fn set_pricing(&mut self, pricing: PricingEngine) {
        self.pricing = pricing;
    }

    /// Append a new item. Duplicate names are allowed.
    pub fn add_item(&mut self, new_item: NewItem) -> Result<ItemId, InventoryError> {
        check_field("name", &new_item.name)?;
        check_field("condition", new_item.condition.as_str())?;
        check_field("category", &new_item.category)?;

        let id = ItemId::from_index(self.items.len())
            .ok_or_else(|| InventoryError::InvalidArgument("inventory is full".to_string()))?;

        info!(
            "Added item {} '{}' ({}) price={} stock={}",
            id, new_item.name, new_item.condition, new_item.price, new_item.stock
        );

        self.items.push(Item {
            id,
            name: new_item.name,
            condition: new_item.condition,
            price: new_item.price,
            stock: new_item.stock,
            category: new_item.category,
        });

        Ok(id)
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.get(id.index())
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add `amount` units to an item's stock and return the new level.
    ///
    /// Negative amounts and unknown ids are both argument errors; the stock
    /// is left untouched in either case.
    pub fn restock(&mut self, id: ItemId, amount: i64) -> Result<u32, InventoryError> {
        if amount < 0 {
            return Err(InventoryError::InvalidArgument(format!(
                "restock amount must not be negative, got {}",
                amount
            )));
        }

        let item = self.items.get_mut(id.index()).ok_or_else(|| {
            InventoryError::InvalidArgument(format!("no item with id {}", id))
        })?;

        let new_stock = u32::try_from(amount)
            .ok()
            .and_then(|amount| item.stock.checked_add(amount))
            .ok_or_else(|| {
                InventoryError::InvalidArgument(format!("restock of {} overflows stock", amount))
            })?;

        item.stock = new_stock;
        info!("Restocked {} '{}' by {}: stock={}", id, item.name, amount, new_stock);

        Ok(new_stock)
    }

    /// Sell one unit and return the price to charge.
    ///
    /// `student_discount` must only be set once the caller has verified the
    /// buyer's student status.
    pub fn purchase(&mut self, id: ItemId, student_discount: bool) -> Result<u32, InventoryError> {
        let item = self
            .items
            .get_mut(id.index())
            .ok_or(InventoryError::NotFound(id))?;

        if item.stock == 0 {
            return Err(InventoryError::OutOfStock {
                id,
                name: item.name.clone(),
            });
        }

        item.stock -= 1;
        let price = self.pricing.unit_price(item.price, student_discount);

        info!(
            "Sold one '{}' ({}) for {} (student discount: {}), {} left",
            item.name, id, price, student_discount, item.stock
        );

        Ok(price)
    }

    /// Case-insensitive substring match on item names, in insertion order
    pub fn search(&self, term: &str) -> Vec<&Item> {
        let needle = term.to_lowercase();
        let results: Vec<&Item> = self
            .items
            .iter()
            .filter(|item| item.name.to_lowercase().contains(&needle))
            .collect();

        debug!("Search for {:?} matched {} items", term, results.len());
        results
    }

    pub fn status(&self) -> InventoryStatus {
        self.items.iter().fold(InventoryStatus::default(), |mut acc, item| {
            acc.total_units += u64::from(item.stock);
            acc.total_value += item.stock_value();
            acc
        })
    }

    /// Items whose stock is strictly below `threshold`
    pub fn low_stock(&self, threshold: u32) -> Vec<&Item> {
        self.items.iter().filter(|item| item.stock < threshold).collect()
    }

    /// Top up every low-stock item to `target` units.
    ///
    /// Returns the id and number of units added for each item touched.
    pub fn reorder_low_stock(&mut self, threshold: u32, target: u32) -> Vec<(ItemId, u32)> {
        let mut reordered = Vec::new();

        for item in self.items.iter_mut().filter(|item| item.stock < threshold) {
            let added = target.saturating_sub(item.stock);
            if added == 0 {
                continue;
            }
            item.stock += added;
            info!("Reordered {} units of '{}' ({})", added, item.name, item.id);
            reordered.push((item.id, added));
        }

        reordered
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("Item not found: {0}")]
    NotFound(ItemId),

    #[error("Item out of stock: {name} ({id})")]
    OutOfStock {
        id: ItemId,
        name: String,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    InvalidField(#[from] FieldError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{demo_catalog, Condition};

    fn ledger_with(items: Vec<NewItem>) -> InventoryLedger {
        let mut ledger = InventoryLedger::new();
        for item in items {
            ledger.add_item(item).unwrap();
        }
        ledger
    }

    #[test]
    fn test_purchase_until_out_of_stock() {
        let mut ledger = ledger_with(vec![NewItem::new(
            "Laptop",
            Condition::New,
            5000,
            1,
            "Electronics",
        )]);

        // First unit sells at full price
        assert_eq!(ledger.purchase(ItemId(0), false).unwrap(), 5000);
        assert_eq!(ledger.get(ItemId(0)).unwrap().stock, 0);

        // Second attempt fails and leaves stock alone
        let result = ledger.purchase(ItemId(0), false);
        assert!(matches!(result, Err(InventoryError::OutOfStock { .. })));
        assert_eq!(ledger.get(ItemId(0)).unwrap().stock, 0);
    }

    #[test]
    fn test_purchase_with_student_discount() {
        let mut ledger = ledger_with(demo_catalog());

        assert_eq!(ledger.purchase(ItemId(0), true).unwrap(), 800);
        assert_eq!(ledger.get(ItemId(0)).unwrap().stock, 9);
    }

    #[test]
    fn test_purchase_unknown_item() {
        let mut ledger = InventoryLedger::new();
        assert!(matches!(
            ledger.purchase(ItemId(3), false),
            Err(InventoryError::NotFound(ItemId(3)))
        ));
    }

    #[test]
    fn test_restock() {
        let mut ledger = ledger_with(demo_catalog());

        assert_eq!(ledger.restock(ItemId(4), 7).unwrap(), 10);

        // Negative amount is rejected and stock is unchanged
        let result = ledger.restock(ItemId(4), -5);
        assert!(matches!(result, Err(InventoryError::InvalidArgument(_))));
        assert_eq!(ledger.get(ItemId(4)).unwrap().stock, 10);

        // Unknown id is an argument error as well
        assert!(matches!(
            ledger.restock(ItemId(99), 1),
            Err(InventoryError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_restock_overflow() {
        let mut ledger = ledger_with(vec![NewItem::new("Cable", Condition::New, 5, u32::MAX, "Parts")]);
        assert!(ledger.restock(ItemId(0), 1).is_err());
        assert_eq!(ledger.get(ItemId(0)).unwrap().stock, u32::MAX);
    }

    #[test]
    fn test_duplicate_names_get_distinct_ids() {
        let mut ledger = InventoryLedger::new();
        let new_id = ledger
            .add_item(NewItem::new("Phone", Condition::New, 700, 2, "Electronics"))
            .unwrap();
        let used_id = ledger
            .add_item(NewItem::new("Phone", Condition::Used, 250, 4, "Electronics"))
            .unwrap();

        assert_ne!(new_id, used_id);
        assert_eq!(ledger.search("phone").len(), 2);
    }

    #[test]
    fn test_add_item_rejects_delimiter() {
        let mut ledger = InventoryLedger::new();
        let result = ledger.add_item(NewItem::new("Lamp|Desk", Condition::New, 20, 1, "Furniture"));

        assert!(matches!(result, Err(InventoryError::InvalidField(_))));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_search_is_case_insensitive_and_ordered() {
        let ledger = ledger_with(demo_catalog());

        let names: Vec<&str> = ledger.search("SH").iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Bookshelf"]);

        let names: Vec<&str> = ledger.search("t").iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Laptop", "Smartphone", "Tablet"]);

        assert!(ledger.search("projector").is_empty());
    }

    #[test]
    fn test_status_and_low_stock() {
        let mut ledger = ledger_with(demo_catalog());

        let status = ledger.status();
        assert_eq!(status.total_units, 41);
        assert_eq!(status.total_value, 10000 + 7500 + 250 + 2400 + 240);

        let low: Vec<ItemId> = ledger.low_stock(5).iter().map(|i| i.id).collect();
        assert_eq!(low, vec![ItemId(4)]);

        let reordered = ledger.reorder_low_stock(5, 10);
        assert_eq!(reordered, vec![(ItemId(4), 7)]);
        assert_eq!(ledger.get(ItemId(4)).unwrap().stock, 10);
    }
}
