use crate::error::ShopError;
use chrono::{DateTime, SubsecRound, Utc};
use reshop_catalog::{
    demo_catalog, Condition, DamageSeverity, InventoryLedger, InventoryStatus, Item, NewItem,
    PricingEngine,
};
use reshop_core::{verify_student_id, Notification, Notifier, Redemption, TradeIn, User, UserDirectory};
use reshop_order::{
    Assignment, PopularItem, RecyclingLog, RecyclingRecord, RecyclingStats, RepairRequest,
    RepairStatus, RepairTracker, SalesSummary, StatusChange, TransactionLog,
};
use reshop_shared::models::events::{PurchaseCompletedEvent, RepairStatusChangedEvent};
use reshop_shared::{ItemId, RepairId};
use reshop_store::app_config::{BusinessRules, Config, NotificationConfig};
use reshop_store::{DataFile, ShopSnapshot};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

/// What the buyer gets back from a successful purchase
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Receipt {
    pub item_id: ItemId,
    pub item_name: String,
    pub condition: Condition,
    pub price: u32,
    pub student_discount: bool,
    pub loyalty_points_earned: u32,
    pub loyalty_points_total: u32,
    pub timestamp: DateTime<Utc>,
}

impl Receipt {
    /// Change owed for `payment`, or `None` if it does not cover the price
    pub fn change_for(&self, payment: u32) -> Option<u32> {
        payment.checked_sub(self.price)
    }
}

/// Dashboard figures for the admin view
#[derive(Debug, Clone, Serialize)]
pub struct ShopOverview {
    pub inventory: InventoryStatus,
    pub low_stock: Vec<ItemId>,
    pub sales: SalesSummary,
    pub popular_items: Vec<PopularItem>,
    pub open_repairs: usize,
    pub queued_repairs: usize,
    pub registered_users: usize,
    pub recycling: RecyclingStats,
}

/// The shop's whole in-memory state and the operations the front end calls.
///
/// Constructed once per session with [`Shop::open`] and persisted with
/// [`Shop::save`]. Every operation takes `&mut self`, so one owner drives
/// the shop at a time.
pub struct Shop {
    state: ShopSnapshot,
    rules: BusinessRules,
    notifications: NotificationConfig,
    data_file: DataFile,
    notifier: Box<dyn Notifier>,
}

impl Shop {
    /// Load the configured data file and build the shop around it.
    ///
    /// An unreadable or corrupt file is logged and the shop starts empty.
    pub fn open(config: &Config, notifier: Box<dyn Notifier>) -> Self {
        let data_file = DataFile::new(&config.data.path);
        let snapshot = match data_file.load() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Could not load {}: {}. Starting empty.", data_file.path().display(), e);
                ShopSnapshot::default()
            }
        };

        let mut shop = Self::from_snapshot(snapshot, config, notifier);
        if config.data.seed_catalog && shop.state.inventory.is_empty() {
            shop.seed_catalog();
        }
        shop
    }

    pub fn from_snapshot(mut state: ShopSnapshot, config: &Config, notifier: Box<dyn Notifier>) -> Self {
        state
            .inventory
            .set_pricing(PricingEngine::new(config.business_rules.pricing()));
        state
            .repairs
            .set_allow_backward_transitions(config.business_rules.allow_backward_transitions);

        Self {
            state,
            rules: config.business_rules.clone(),
            notifications: config.notifications.clone(),
            data_file: DataFile::new(&config.data.path),
            notifier,
        }
    }

    fn seed_catalog(&mut self) {
        for item in demo_catalog() {
            if let Err(e) = self.state.inventory.add_item(item) {
                warn!("Skipping demo catalog item: {}", e);
            }
        }
        info!("Seeded demo catalog with {} items", self.state.inventory.len());
    }

    pub fn inventory(&self) -> &InventoryLedger {
        &self.state.inventory
    }

    pub fn transactions(&self) -> &TransactionLog {
        &self.state.transactions
    }

    pub fn repairs(&self) -> &RepairTracker {
        &self.state.repairs
    }

    pub fn users(&self) -> &UserDirectory {
        &self.state.users
    }

    pub fn rules(&self) -> &BusinessRules {
        &self.rules
    }

    // Inventory

    pub fn add_item(&mut self, item: NewItem) -> Result<ItemId, ShopError> {
        Ok(self.state.inventory.add_item(item)?)
    }

    pub fn restock(&mut self, id: ItemId, amount: i64) -> Result<u32, ShopError> {
        Ok(self.state.inventory.restock(id, amount)?)
    }

    pub fn search(&self, term: &str) -> Vec<&Item> {
        self.state.inventory.search(term)
    }

    pub fn inventory_status(&self) -> InventoryStatus {
        self.state.inventory.status()
    }

    pub fn low_stock_items(&self) -> Vec<&Item> {
        self.state.inventory.low_stock(self.rules.low_stock_threshold)
    }

    pub fn reorder_low_stock(&mut self) -> Vec<(ItemId, u32)> {
        self.state.inventory
            .reorder_low_stock(self.rules.low_stock_threshold, self.rules.reorder_target)
    }

    // Users and loyalty

    pub fn register(&mut self, username: &str, password: &str, is_student: bool) -> Result<(), ShopError> {
        self.state.users.register(username, password, is_student)?;
        Ok(())
    }

    pub fn authenticate(&self, username: &str, password: &str) -> Option<&User> {
        self.state.users.authenticate(username, password)
    }

    pub fn set_repair_expertise(&mut self, username: &str, level: u8) -> Result<(), ShopError> {
        Ok(self.state.users.set_repair_expertise(username, level)?)
    }

    pub fn redeem_points(&mut self, username: &str, points: i64) -> Result<Redemption, ShopError> {
        Ok(self.state.users.redeem_points(username, points, &self.state.inventory)?)
    }

    pub fn trade_in(&mut self, username: &str, history_index: usize) -> Result<TradeIn, ShopError> {
        Ok(self.state.users.trade_in(username, history_index, &self.state.inventory)?)
    }

    /// Requests currently assigned to a technician, for their dashboard
    pub fn repairs_assigned_to<'a>(&'a self, username: &'a str) -> Vec<&'a RepairRequest> {
        self.state.repairs.assigned_to(username).collect()
    }

    // Sales

    /// Check a school ID presented at the counter for the student discount
    pub fn verify_student_id(&self, raw_id: &str) -> bool {
        verify_student_id(raw_id)
    }

    /// Sell one unit of `item_id` to `username`.
    ///
    /// `student_verified` is the outcome of [`Shop::verify_student_id`] or an
    /// equivalent front-end check; the discount applies only if the account is
    /// also flagged as a student.
    pub fn purchase(
        &mut self,
        username: &str,
        item_id: ItemId,
        student_verified: bool,
    ) -> Result<Receipt, ShopError> {
        let is_student = self
            .state
            .users
            .get(username)
            .map(|user| user.is_student)
            .ok_or_else(|| reshop_core::UserError::NotFound(username.to_string()))?;
        let student_discount = is_student && student_verified;

        let price = self.state.inventory.purchase(item_id, student_discount)?;
        let item = self
            .state
            .inventory
            .get(item_id)
            .ok_or(reshop_catalog::InventoryError::NotFound(item_id))?;
        let (item_name, condition) = (item.name.clone(), item.condition.clone());

        let now = Utc::now().trunc_subsecs(0);
        self.state.transactions.record_sale(item_id, item_name.clone(), price, now);

        let points = self.rules.points_per_purchase;
        let total_points = self.state.users.record_purchase(username, item_id, points)?;

        let event = PurchaseCompletedEvent {
            event_id: Uuid::new_v4(),
            username: username.to_string(),
            item_id,
            item_name: item_name.clone(),
            price,
            loyalty_points_earned: points,
            timestamp: now.timestamp(),
        };
        self.send(Notification::purchase_receipt(&event));

        Ok(Receipt {
            item_id,
            item_name,
            condition,
            price,
            student_discount,
            loyalty_points_earned: points,
            loyalty_points_total: total_points,
            timestamp: now,
        })
    }

    pub fn sales_summary(&self) -> SalesSummary {
        self.state.transactions.sales_summary()
    }

    pub fn total_revenue(&self) -> u64 {
        self.state.transactions.total_revenue()
    }

    pub fn popular_items(&self) -> Vec<PopularItem> {
        self.state
            .transactions
            .popularity_ranking(self.rules.popular_items_limit)
    }

    // Repairs

    pub fn submit_repair(&mut self, item_name: &str, issue: &str) -> Result<RepairId, ShopError> {
        Ok(self.state.repairs.submit(item_name, issue, Utc::now())?)
    }

    pub fn update_repair_status(&mut self, id: RepairId, raw_status: &str) -> Result<StatusChange, ShopError> {
        let change = self.state.repairs.update_status(id, raw_status)?;
        self.notify_repair(id, change.from, change.to);
        Ok(change)
    }

    pub fn enqueue_repair(&mut self, id: RepairId, complexity: u8) -> Result<(), ShopError> {
        Ok(self.state.repairs.enqueue_for_assignment(id, complexity)?)
    }

    /// Hand the oldest queued request to the best-matching technician
    pub fn assign_next_repair(&mut self) -> Result<Assignment, ShopError> {
        let pool = self.state.users.technicians();
        let assignment = self.state.repairs.assign_next(&pool)?;
        self.notify_repair(assignment.id, assignment.previous_status, RepairStatus::Assigned);
        Ok(assignment)
    }

    pub fn repair_estimate(&self, severity: DamageSeverity, under_warranty: bool) -> u32 {
        self.state.inventory.pricing().repair_estimate(severity, under_warranty)
    }

    // Recycling

    pub fn recycle_item(&mut self, item_name: &str, weight_kg: f64) -> Result<RecyclingRecord, ShopError> {
        Ok(self
            .state
            .recycling
            .record(item_name, weight_kg, Utc::now())?
            .clone())
    }

    pub fn recycling(&self) -> &RecyclingLog {
        &self.state.recycling
    }

    pub fn recycling_stats(&self) -> RecyclingStats {
        self.state.recycling.stats()
    }

    // Reporting and persistence

    pub fn overview(&self) -> ShopOverview {
        ShopOverview {
            inventory: self.inventory_status(),
            low_stock: self.low_stock_items().iter().map(|item| item.id).collect(),
            sales: self.sales_summary(),
            popular_items: self.popular_items(),
            open_repairs: self
                .state
                .repairs
                .requests()
                .iter()
                .filter(|r| r.status != RepairStatus::Completed)
                .count(),
            queued_repairs: self.state.repairs.queue_len(),
            registered_users: self.state.users.len(),
            recycling: self.recycling_stats(),
        }
    }

    /// Write the whole state to the configured data file
    pub fn save(&self) -> Result<(), ShopError> {
        Ok(self.data_file.save(&self.state)?)
    }

    fn notify_repair(&self, id: RepairId, from: RepairStatus, to: RepairStatus) {
        let Some(request) = self.state.repairs.get(id) else {
            return;
        };

        let event = RepairStatusChangedEvent {
            event_id: Uuid::new_v4(),
            repair_id: id,
            item_name: request.item_name.clone(),
            from_status: from.to_string(),
            to_status: to.to_string(),
            technician: request.assigned_technician.clone(),
            timestamp: Utc::now().timestamp(),
        };
        let recipient = request
            .assigned_technician
            .clone()
            .unwrap_or_else(|| self.notifications.repair_desk.clone());

        self.send(Notification::repair_status(&event, recipient));
    }

    fn send(&self, notification: Notification) {
        if let Err(e) = self.notifier.notify(&notification) {
            warn!("Failed to notify {}: {}", notification.recipient, e);
        }
    }
}
