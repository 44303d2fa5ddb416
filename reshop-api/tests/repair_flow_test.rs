use reshop_api::{ErrorKind, Shop};
use reshop_catalog::DamageSeverity;
use reshop_core::RecordingNotifier;
use reshop_order::RepairStatus;
use reshop_shared::RepairId;
use reshop_store::app_config::Config;
use std::sync::Arc;

fn open_shop(dir: &tempfile::TempDir, allow_backward: bool) -> (Shop, Arc<RecordingNotifier>) {
    let mut config = Config::default();
    config.data.path = dir.path().join("shop_data.txt").display().to_string();
    config.data.seed_catalog = false;
    config.business_rules.allow_backward_transitions = allow_backward;

    let notifier = Arc::new(RecordingNotifier::new());
    let shop = Shop::open(&config, Box::new(notifier.clone()));
    (shop, notifier)
}

fn add_technician(shop: &mut Shop, name: &str, level: u8) {
    shop.register(name, "pw", false).unwrap();
    shop.set_repair_expertise(name, level).unwrap();
}

#[test]
fn test_status_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let (mut shop, notifier) = open_shop(&dir, true);

    let id = shop.submit_repair("Phone", "cracked screen").unwrap();
    assert_eq!(id, RepairId(0));
    assert_eq!(shop.repairs().get(id).unwrap().status, RepairStatus::Pending);

    let change = shop.update_repair_status(id, "IN PROGRESS").unwrap();
    assert_eq!(change.from, RepairStatus::Pending);
    assert_eq!(change.to, RepairStatus::InProgress);

    shop.update_repair_status(id, "completed").unwrap();
    assert_eq!(shop.repairs().get(id).unwrap().status, RepairStatus::Completed);

    // Unassigned requests report to the repair desk
    let sent = notifier.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].recipient, "repairs@campus-shop.local");
    assert!(sent[1].body.contains("In Progress to Completed"));
}

#[test]
fn test_invalid_status_leaves_request_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let (mut shop, notifier) = open_shop(&dir, true);
    let id = shop.submit_repair("Phone", "cracked screen").unwrap();

    let err = shop.update_repair_status(id, "archived").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidStatus);
    assert_eq!(shop.repairs().get(id).unwrap().status, RepairStatus::Pending);

    let err = shop.update_repair_status(RepairId(9), "completed").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    assert!(notifier.sent().is_empty());
}

#[test]
fn test_backward_transition_follows_config() {
    let dir = tempfile::tempdir().unwrap();
    let (mut strict, _) = open_shop(&dir, false);
    let id = strict.submit_repair("Laptop", "no power").unwrap();
    strict.update_repair_status(id, "completed").unwrap();

    let err = strict.update_repair_status(id, "pending").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);
    assert_eq!(strict.repairs().get(id).unwrap().status, RepairStatus::Completed);

    let other = tempfile::tempdir().unwrap();
    let (mut lenient, _) = open_shop(&other, true);
    let id = lenient.submit_repair("Laptop", "no power").unwrap();
    lenient.update_repair_status(id, "completed").unwrap();
    lenient.update_repair_status(id, "pending").unwrap();
    assert_eq!(lenient.repairs().get(id).unwrap().status, RepairStatus::Pending);
}

#[test]
fn test_completed_while_queued_stays_completed() {
    let dir = tempfile::tempdir().unwrap();
    let (mut shop, notifier) = open_shop(&dir, false);
    add_technician(&mut shop, "amy", 3);

    let id = shop.submit_repair("Laptop", "no power").unwrap();
    shop.enqueue_repair(id, 3).unwrap();
    shop.update_repair_status(id, "completed").unwrap();

    let err = shop.assign_next_repair().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);

    let request = shop.repairs().get(id).unwrap();
    assert_eq!(request.status, RepairStatus::Completed);
    assert!(request.assigned_technician.is_none());
    assert_eq!(shop.repairs().queue_len(), 0);
    assert!(shop.repairs_assigned_to("amy").is_empty());

    // Only the status update was announced
    assert_eq!(notifier.sent().len(), 1);
}

#[test]
fn test_assignment_picks_closest_expertise() {
    let dir = tempfile::tempdir().unwrap();
    let (mut shop, notifier) = open_shop(&dir, true);
    add_technician(&mut shop, "amy", 1);
    add_technician(&mut shop, "bob", 4);
    add_technician(&mut shop, "cat", 5);

    let easy = shop.submit_repair("Tablet", "loose hinge").unwrap();
    let hard = shop.submit_repair("Laptop", "board failure").unwrap();
    shop.enqueue_repair(hard, 4).unwrap();
    shop.enqueue_repair(easy, 2).unwrap();

    // FIFO: the hard job was queued first
    let first = shop.assign_next_repair().unwrap();
    assert_eq!(first.id, hard);
    assert_eq!(first.technician, "bob");
    assert_eq!(first.previous_status, RepairStatus::Pending);

    let second = shop.assign_next_repair().unwrap();
    assert_eq!(second.id, easy);
    assert_eq!(second.technician, "amy");

    let request = shop.repairs().get(hard).unwrap();
    assert_eq!(request.status, RepairStatus::Assigned);
    assert_eq!(request.assigned_technician.as_deref(), Some("bob"));

    let for_bob: Vec<RepairId> = shop.repairs_assigned_to("bob").iter().map(|r| r.id).collect();
    assert_eq!(for_bob, vec![hard]);

    let sent = notifier.sent();
    assert_eq!(sent[0].recipient, "bob");
    assert!(sent[0].body.contains("Technician: bob"));

    let err = shop.assign_next_repair().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_empty_pool_keeps_request_queued() {
    let dir = tempfile::tempdir().unwrap();
    let (mut shop, notifier) = open_shop(&dir, true);
    let id = shop.submit_repair("Phone", "battery swelling").unwrap();
    shop.enqueue_repair(id, 3).unwrap();

    let err = shop.assign_next_repair().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoTechnicianAvailable);
    assert_eq!(shop.repairs().queue_len(), 1);
    assert_eq!(shop.repairs().get(id).unwrap().status, RepairStatus::Pending);
    assert!(notifier.sent().is_empty());

    // Once someone is on shift the same request goes out
    add_technician(&mut shop, "amy", 2);
    let assignment = shop.assign_next_repair().unwrap();
    assert_eq!(assignment.id, id);
    assert_eq!(assignment.technician, "amy");
    assert_eq!(shop.repairs().queue_len(), 0);
}

#[test]
fn test_enqueue_rejects_bad_input() {
    let dir = tempfile::tempdir().unwrap();
    let (mut shop, _) = open_shop(&dir, true);
    let id = shop.submit_repair("Phone", "battery swelling").unwrap();

    assert_eq!(shop.enqueue_repair(id, 0).unwrap_err().kind(), ErrorKind::InvalidArgument);
    assert_eq!(shop.enqueue_repair(id, 6).unwrap_err().kind(), ErrorKind::InvalidArgument);
    assert_eq!(shop.enqueue_repair(RepairId(3), 2).unwrap_err().kind(), ErrorKind::NotFound);

    shop.enqueue_repair(id, 2).unwrap();
    assert_eq!(shop.enqueue_repair(id, 2).unwrap_err().kind(), ErrorKind::InvalidArgument);

    assert_eq!(
        shop.submit_repair("Phone", "bad|issue").unwrap_err().kind(),
        ErrorKind::InvalidArgument
    );
}

#[test]
fn test_repair_estimate() {
    let dir = tempfile::tempdir().unwrap();
    let (shop, _) = open_shop(&dir, true);

    assert_eq!(shop.repair_estimate(DamageSeverity::Minor, false), 500);
    assert_eq!(shop.repair_estimate(DamageSeverity::Major, false), 3000);
    assert_eq!(shop.repair_estimate(DamageSeverity::Moderate, true), 750);
}
