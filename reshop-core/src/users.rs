use reshop_catalog::InventoryLedger;
use reshop_order::Technician;
use reshop_shared::text::{check_field, check_required_field};
use reshop_shared::{FieldError, ItemId, Masked};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use tracing::info;

/// Highest repair expertise level a technician can hold
pub const MAX_EXPERTISE: u8 = 5;

/// School IDs are seven digits, issued from 2000000 upwards
pub const STUDENT_ID_RANGE: RangeInclusive<u32> = 2_000_000..=2_999_999;

/// Check a school ID as typed at the counter
pub fn verify_student_id(raw_id: &str) -> bool {
    raw_id
        .trim()
        .parse::<u32>()
        .map(|id| STUDENT_ID_RANGE.contains(&id))
        .unwrap_or(false)
}

/// A registered shop customer. Staff with a non-zero expertise also take repair jobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub password: Masked<String>,
    pub is_student: bool,
    pub loyalty_points: u32,
    /// Items bought and still eligible for trade-in, oldest first
    pub purchase_history: Vec<ItemId>,
    /// 0 for customers, 1-5 for technicians
    pub repair_expertise: u8,
}

impl User {
    pub fn new(username: impl Into<String>, password: impl Into<String>, is_student: bool) -> Self {
        Self {
            username: username.into(),
            password: Masked::new(password.into()),
            is_student,
            loyalty_points: 0,
            purchase_history: Vec::new(),
            repair_expertise: 0,
        }
    }

    pub fn is_technician(&self) -> bool {
        self.repair_expertise > 0
    }
}

/// Result of a points redemption
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Redemption {
    pub points_redeemed: u32,
    pub discount: u32,
    pub remaining_points: u32,
}

/// Result of an accepted trade-in
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TradeIn {
    pub item_id: ItemId,
    pub item_name: Option<String>,
    pub value: u32,
    pub loyalty_points: u32,
}

/// Registered users in registration order
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: Vec<User>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        username: &str,
        password: &str,
        is_student: bool,
    ) -> Result<&User, UserError> {
        self.insert(User::new(username, password, is_student))
    }

    /// Insert a fully populated user, e.g. one read back from the data file
    pub fn insert(&mut self, user: User) -> Result<&User, UserError> {
        check_required_field("username", &user.username)?;
        check_field("password", user.password.expose())?;
        if user.repair_expertise > MAX_EXPERTISE {
            return Err(UserError::InvalidArgument(format!(
                "repair expertise must be between 0 and {}, got {}",
                MAX_EXPERTISE, user.repair_expertise
            )));
        }
        if self.get(&user.username).is_some() {
            return Err(UserError::Duplicate(user.username));
        }

        info!("Registered user '{}' (student: {})", user.username, user.is_student);
        self.users.push(user);
        Ok(&self.users[self.users.len() - 1])
    }

    pub fn get(&self, username: &str) -> Option<&User> {
        self.users.iter().find(|u| u.username == username)
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Look up a user by credentials
    pub fn authenticate(&self, username: &str, password: &str) -> Option<&User> {
        self.get(username)
            .filter(|user| user.password.expose() == password)
    }

    /// Set a user's technician level; 0 removes them from the pool
    pub fn set_repair_expertise(&mut self, username: &str, level: u8) -> Result<(), UserError> {
        if level > MAX_EXPERTISE {
            return Err(UserError::InvalidArgument(format!(
                "repair expertise must be between 0 and {}, got {}",
                MAX_EXPERTISE, level
            )));
        }
        let user = self.get_mut(username)?;
        user.repair_expertise = level;
        info!("Repair expertise of '{}' set to {}", username, level);
        Ok(())
    }

    /// Technician pool in registration order
    pub fn technicians(&self) -> Vec<Technician> {
        self.users
            .iter()
            .filter(|u| u.is_technician())
            .map(|u| Technician::new(u.username.clone(), u.repair_expertise))
            .collect()
    }

    pub fn award_points(&mut self, username: &str, points: u32) -> Result<u32, UserError> {
        let user = self.get_mut(username)?;
        user.loyalty_points = user.loyalty_points.saturating_add(points);
        Ok(user.loyalty_points)
    }

    /// Credit a completed purchase: remember the item and add loyalty points
    pub fn record_purchase(&mut self, username: &str, item_id: ItemId, points: u32) -> Result<u32, UserError> {
        let user = self.get_mut(username)?;
        user.purchase_history.push(item_id);
        user.loyalty_points = user.loyalty_points.saturating_add(points);
        Ok(user.loyalty_points)
    }

    /// Spend loyalty points for a discount on a later purchase
    pub fn redeem_points(
        &mut self,
        username: &str,
        points: i64,
        ledger: &InventoryLedger,
    ) -> Result<Redemption, UserError> {
        let points = u32::try_from(points).map_err(|_| {
            UserError::InvalidArgument(format!("points to redeem must be a non-negative number, got {}", points))
        })?;

        let user = self.get_mut(username)?;
        if points > user.loyalty_points {
            return Err(UserError::InsufficientPoints {
                requested: points,
                available: user.loyalty_points,
            });
        }

        user.loyalty_points -= points;
        let discount = ledger.pricing().redemption_discount(points);
        info!("'{}' redeemed {} points for a discount of {}", username, points, discount);

        Ok(Redemption {
            points_redeemed: points,
            discount,
            remaining_points: user.loyalty_points,
        })
    }

    /// Trade in an entry of the purchase history for loyalty points.
    ///
    /// The value is a share of the item's current catalog price; an id the
    /// catalog no longer knows is worth nothing but is still consumed.
    pub fn trade_in(
        &mut self,
        username: &str,
        history_index: usize,
        ledger: &InventoryLedger,
    ) -> Result<TradeIn, UserError> {
        let user = self.get_mut(username)?;
        if history_index >= user.purchase_history.len() {
            return Err(UserError::InvalidArgument(format!(
                "purchase history has {} entries, no entry {}",
                user.purchase_history.len(),
                history_index
            )));
        }

        let item_id = user.purchase_history.remove(history_index);
        let item = ledger.get(item_id);
        let value = item
            .map(|item| ledger.pricing().trade_in_value(item.price))
            .unwrap_or(0);
        user.loyalty_points = user.loyalty_points.saturating_add(value);

        info!("'{}' traded in {} for {} points", username, item_id, value);

        Ok(TradeIn {
            item_id,
            item_name: item.map(|item| item.name.clone()),
            value,
            loyalty_points: user.loyalty_points,
        })
    }

    fn get_mut(&mut self, username: &str) -> Result<&mut User, UserError> {
        self.users
            .iter_mut()
            .find(|u| u.username == username)
            .ok_or_else(|| UserError::NotFound(username.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Username already exists: {0}")]
    Duplicate(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Insufficient loyalty points: requested {requested}, available {available}")]
    InsufficientPoints {
        requested: u32,
        available: u32,
    },

    #[error(transparent)]
    InvalidField(#[from] FieldError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use reshop_catalog::demo_catalog;

    fn demo_ledger() -> InventoryLedger {
        let mut ledger = InventoryLedger::new();
        for item in demo_catalog() {
            ledger.add_item(item).unwrap();
        }
        ledger
    }

    #[test]
    fn test_register_and_authenticate() {
        let mut users = UserDirectory::new();
        users.register("maria", "s3cret", true).unwrap();

        assert!(users.authenticate("maria", "s3cret").is_some());
        assert!(users.authenticate("maria", "wrong").is_none());
        assert!(users.authenticate("nobody", "s3cret").is_none());

        // Duplicate username
        assert!(matches!(
            users.register("maria", "other", false),
            Err(UserError::Duplicate(_))
        ));
        // Blank username and delimiter in password
        assert!(users.register(" ", "pw", false).is_err());
        assert!(users.register("leo", "pa|ss", false).is_err());
        assert_eq!(users.len(), 1);
    }

    #[test]
    fn test_technician_pool_in_registration_order() {
        let mut users = UserDirectory::new();
        users.register("zed", "pw", false).unwrap();
        users.register("amy", "pw", false).unwrap();
        users.register("customer", "pw", true).unwrap();
        users.set_repair_expertise("zed", 3).unwrap();
        users.set_repair_expertise("amy", 3).unwrap();

        let pool = users.technicians();
        let names: Vec<&str> = pool.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["zed", "amy"]);

        assert!(users.set_repair_expertise("amy", 6).is_err());
        users.set_repair_expertise("zed", 0).unwrap();
        assert_eq!(users.technicians().len(), 1);
    }

    #[test]
    fn test_redeem_points() {
        let ledger = demo_ledger();
        let mut users = UserDirectory::new();
        users.register("maria", "pw", true).unwrap();
        users.award_points("maria", 150).unwrap();

        let redemption = users.redeem_points("maria", 100, &ledger).unwrap();
        assert_eq!(redemption.discount, 10);
        assert_eq!(redemption.remaining_points, 50);

        assert!(matches!(
            users.redeem_points("maria", 51, &ledger),
            Err(UserError::InsufficientPoints { requested: 51, available: 50 })
        ));
        assert!(matches!(
            users.redeem_points("maria", -1, &ledger),
            Err(UserError::InvalidArgument(_))
        ));
        assert_eq!(users.get("maria").unwrap().loyalty_points, 50);
    }

    #[test]
    fn test_trade_in() {
        let ledger = demo_ledger();
        let mut users = UserDirectory::new();
        users.register("maria", "pw", false).unwrap();
        users.record_purchase("maria", ItemId(0), 10).unwrap();
        users.record_purchase("maria", ItemId(3), 10).unwrap();

        // Laptop at 1000 trades in for 40%
        let trade = users.trade_in("maria", 0, &ledger).unwrap();
        assert_eq!(trade.item_id, ItemId(0));
        assert_eq!(trade.item_name.as_deref(), Some("Laptop"));
        assert_eq!(trade.value, 400);
        assert_eq!(trade.loyalty_points, 420);

        let user = users.get("maria").unwrap();
        assert_eq!(user.purchase_history, vec![ItemId(3)]);

        assert!(users.trade_in("maria", 5, &ledger).is_err());
    }

    #[test]
    fn test_trade_in_unknown_item_is_worth_nothing() {
        let ledger = InventoryLedger::new();
        let mut users = UserDirectory::new();
        users.register("leo", "pw", false).unwrap();
        users.record_purchase("leo", ItemId(42), 0).unwrap();

        let trade = users.trade_in("leo", 0, &ledger).unwrap();
        assert_eq!(trade.value, 0);
        assert!(trade.item_name.is_none());
        assert!(users.get("leo").unwrap().purchase_history.is_empty());
    }

    #[test]
    fn test_verify_student_id() {
        assert!(verify_student_id("2000000"));
        assert!(verify_student_id(" 2456789 "));
        assert!(verify_student_id("2999999"));

        assert!(!verify_student_id("1999999"));
        assert!(!verify_student_id("3000000"));
        assert!(!verify_student_id("20000"));
        assert!(!verify_student_id("abc"));
        assert!(!verify_student_id(""));
    }

    #[test]
    fn test_password_is_masked_in_debug() {
        let user = User::new("maria", "s3cret", true);
        let rendered = format!("{:?}", user);
        assert!(!rendered.contains("s3cret"));
    }
}
