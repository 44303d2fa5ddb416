use reshop_shared::ItemId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Physical condition of a catalog item.
///
/// The same product in different conditions is listed as separate items,
/// each with its own id, price and stock.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Condition {
    New,
    Refurbished,
    Used,
    Other(String),
}

impl Condition {
    /// Parse a condition label, ignoring case and surrounding whitespace.
    /// Unknown labels are kept verbatim as [`Condition::Other`].
    pub fn parse(label: &str) -> Self {
        let trimmed = label.trim();
        match trimmed.to_lowercase().as_str() {
            "new" => Condition::New,
            "refurbished" => Condition::Refurbished,
            "used" => Condition::Used,
            _ => Condition::Other(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Condition::New => "New",
            Condition::Refurbished => "Refurbished",
            Condition::Used => "Used",
            Condition::Other(label) => label,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A purchasable catalog entry and its stock level
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub condition: Condition,
    /// Base price in whole currency units
    pub price: u32,
    pub stock: u32,
    pub category: String,
}

impl Item {
    pub fn is_available(&self) -> bool {
        self.stock > 0
    }

    /// Value of the units on hand at catalog price
    pub fn stock_value(&self) -> u64 {
        u64::from(self.price) * u64::from(self.stock)
    }
}

/// Fields of an item before the ledger assigns it an id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewItem {
    pub name: String,
    pub condition: Condition,
    pub price: u32,
    pub stock: u32,
    pub category: String,
}

impl NewItem {
    pub fn new(
        name: impl Into<String>,
        condition: Condition,
        price: u32,
        stock: u32,
        category: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            condition,
            price,
            stock,
            category: category.into(),
        }
    }
}

/// Starter catalog used when a shop opens with an empty inventory
pub fn demo_catalog() -> Vec<NewItem> {
    vec![
        NewItem::new("Laptop", Condition::New, 1000, 10, "Electronics"),
        NewItem::new("Smartphone", Condition::Refurbished, 500, 15, "Electronics"),
        NewItem::new("Desk Chair", Condition::Used, 50, 5, "Furniture"),
        NewItem::new("Tablet", Condition::New, 300, 8, "Electronics"),
        NewItem::new("Bookshelf", Condition::New, 80, 3, "Furniture"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_parsing() {
        assert_eq!(Condition::parse("NEW"), Condition::New);
        assert_eq!(Condition::parse(" refurbished "), Condition::Refurbished);
        assert_eq!(Condition::parse("Used"), Condition::Used);
        assert_eq!(Condition::parse("For parts"), Condition::Other("For parts".to_string()));
        assert_eq!(Condition::parse("For parts").as_str(), "For parts");
    }

    #[test]
    fn test_stock_value() {
        let item = Item {
            id: ItemId(0),
            name: "Tablet".to_string(),
            condition: Condition::New,
            price: 300,
            stock: 8,
            category: "Electronics".to_string(),
        };
        assert!(item.is_available());
        assert_eq!(item.stock_value(), 2400);
    }
}
