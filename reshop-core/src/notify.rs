use reshop_shared::models::events::{PurchaseCompletedEvent, RepairStatusChangedEvent};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};

/// A message for the shop's outbound mail channel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

impl Notification {
    pub fn purchase_receipt(event: &PurchaseCompletedEvent) -> Self {
        Self {
            recipient: event.username.clone(),
            subject: format!("Receipt: {}", event.item_name),
            body: format!(
                "Item: {}\nPrice: P{}\nLoyalty points earned: {}\nThank you for your purchase!",
                event.item_name, event.price, event.loyalty_points_earned
            ),
        }
    }

    pub fn repair_status(event: &RepairStatusChangedEvent, recipient: impl Into<String>) -> Self {
        let mut body = format!(
            "Repair {} for '{}' moved from {} to {}.",
            event.repair_id, event.item_name, event.from_status, event.to_status
        );
        if let Some(technician) = &event.technician {
            body.push_str(&format!("\nTechnician: {}", technician));
        }

        Self {
            recipient: recipient.into(),
            subject: format!("Repair update: {}", event.item_name),
            body,
        }
    }
}

/// Delivery hook for purchase and repair notifications.
///
/// The shop calls this after the state change has been applied; a delivery
/// failure never rolls the change back.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Writes notifications to the log instead of sending them
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        tracing::info!(
            recipient = %notification.recipient,
            subject = %notification.subject,
            "Simulating email sent"
        );
        Ok(())
    }
}

/// Keeps every notification in memory, for tests and previews
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        // A panic while pushing cannot leave the list half-written
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .map_err(|_| NotifyError::Delivery("recording notifier lock poisoned".to_string()))?
            .push(notification.clone());
        Ok(())
    }
}

impl<N: Notifier + ?Sized> Notifier for std::sync::Arc<N> {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        (**self).notify(notification)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}
