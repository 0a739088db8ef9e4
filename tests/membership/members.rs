use home_inventory::InventoryError;
use uuid::Uuid;

use crate::support::Fixture;

#[test]
fn owner_adds_member() {
    let fx = Fixture::new();
    let inventory = fx.inventory("alice");

    let member = fx.engine.add_member(inventory.id, " bob ", "alice").unwrap();

    assert_eq!(member.user_id, "bob");
    assert_eq!(member.inventory_id, inventory.id);
    assert_eq!(fx.members(&inventory), vec!["alice", "bob"]);
    assert_eq!(fx.catalog.list_user_inventories("bob").unwrap(), vec![inventory]);
}

#[test]
fn adding_twice_conflicts_without_duplicating() {
    let fx = Fixture::new();
    let inventory = fx.inventory("alice");
    fx.engine.add_member(inventory.id, "bob", "alice").unwrap();

    let again = fx.engine.add_member(inventory.id, "bob", "alice").unwrap_err();
    assert!(matches!(again, InventoryError::Conflict(_)));
    assert_eq!(again.status_code(), 409);

    let shouting = fx.engine.add_member(inventory.id, "BOB", "alice");
    assert!(matches!(shouting, Err(InventoryError::Conflict(_))));

    assert_eq!(fx.members(&inventory), vec!["alice", "bob"]);
}

#[test]
fn add_member_guards() {
    let fx = Fixture::new();
    let inventory = fx.inventory("alice");
    fx.engine.add_member(inventory.id, "bob", "alice").unwrap();

    let blank = fx.engine.add_member(inventory.id, "", "alice");
    assert!(matches!(blank, Err(InventoryError::Validation(_))));

    let missing = fx.engine.add_member(Uuid::new_v4(), "carol", "alice");
    assert!(matches!(missing, Err(InventoryError::NotFound(_))));

    let by_member = fx.engine.add_member(inventory.id, "carol", "bob");
    assert!(matches!(by_member, Err(InventoryError::Forbidden(_))));

    // Blank ids are rejected before anything is looked up.
    let blank_unknown = fx.engine.add_member(Uuid::new_v4(), "  ", "alice");
    assert!(matches!(blank_unknown, Err(InventoryError::Validation(_))));

    assert_eq!(fx.members(&inventory), vec!["alice", "bob"]);
}

#[test]
fn member_can_leave() {
    let fx = Fixture::new();
    let inventory = fx.inventory("alice");
    fx.engine.add_member(inventory.id, "bob", "alice").unwrap();

    fx.engine.remove_member(inventory.id, "bob", "Bob").unwrap();

    assert_eq!(fx.members(&inventory), vec!["alice"]);
}

#[test]
fn owner_can_remove_others() {
    let fx = Fixture::new();
    let inventory = fx.inventory("alice");
    fx.engine.add_member(inventory.id, "bob", "alice").unwrap();

    fx.engine.remove_member(inventory.id, "bob", "alice").unwrap();

    assert_eq!(fx.members(&inventory), vec!["alice"]);
}

#[test]
fn owner_cannot_be_removed() {
    let fx = Fixture::new();
    let inventory = fx.inventory("alice");
    fx.engine.add_member(inventory.id, "bob", "alice").unwrap();

    let leave = fx.engine.remove_member(inventory.id, "alice", "alice").unwrap_err();
    assert!(matches!(leave, InventoryError::Validation(_)));
    assert_eq!(leave.status_code(), 400);

    let kicked = fx.engine.remove_member(inventory.id, "ALICE", "bob");
    assert!(matches!(kicked, Err(InventoryError::Validation(_))));

    assert_eq!(fx.members(&inventory), vec!["alice", "bob"]);
}

#[test]
fn members_cannot_remove_each_other() {
    let fx = Fixture::new();
    let inventory = fx.inventory("alice");
    fx.engine.add_member(inventory.id, "bob", "alice").unwrap();
    fx.engine.add_member(inventory.id, "carol", "alice").unwrap();

    let err = fx.engine.remove_member(inventory.id, "carol", "bob").unwrap_err();
    assert!(matches!(err, InventoryError::Forbidden(_)));
    assert_eq!(fx.members(&inventory), vec!["alice", "bob", "carol"]);
}

#[test]
fn removing_unknown_member_or_inventory_is_not_found() {
    let fx = Fixture::new();
    let inventory = fx.inventory("alice");

    let no_member = fx.engine.remove_member(inventory.id, "zoe", "alice");
    assert!(matches!(no_member, Err(InventoryError::NotFound(_))));

    let no_inventory = fx.engine.remove_member(Uuid::new_v4(), "zoe", "zoe");
    assert!(matches!(no_inventory, Err(InventoryError::NotFound(_))));
}

#[test]
fn former_owner_can_leave_after_transfer() {
    let fx = Fixture::new();
    let inventory = fx.inventory("alice");
    fx.engine
        .transfer_ownership(inventory.id, "bob", "alice")
        .unwrap();

    fx.engine.remove_member(inventory.id, "alice", "alice").unwrap();

    assert_eq!(fx.owner(&inventory), "bob");
    assert_eq!(fx.members(&inventory), vec!["bob"]);
}
