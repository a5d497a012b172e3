//! Integration tests for the role write path
//!
//! Exercises the post-save hook end to end: create, update, rename, destroy,
//! against both the in-memory and the file-backed store.

use permset_core::capability::{identifiers, CapabilityRef, PermissionSetResolver};
use permset_core::errors::{PermsetError, Result};
use permset_core::registry::{PermissionRegistry, RoleConfiguration};
use permset_core::role::validation::TAKEN;
use permset_core::store::{FileStore, MemoryStore, RoleStore};
use permset_core::{RoleForm, RoleRepository, SaveOutcome};
use tempfile::TempDir;

#[derive(Default)]
struct RecordingRegistry {
    calls: Vec<(String, Vec<String>)>,
}

impl PermissionRegistry for RecordingRegistry {
    fn assign_permissions(&mut self, role_name: &str, handles: Vec<CapabilityRef>) -> Result<()> {
        self.calls.push((role_name.to_string(), identifiers(&handles)));
        Ok(())
    }
}

fn memory_repo() -> RoleRepository<MemoryStore, RecordingRegistry> {
    RoleRepository::new(
        MemoryStore::migrated(),
        PermissionSetResolver::with_builtin_catalog(),
        RecordingRegistry::default(),
    )
}

fn file_repo(temp: &TempDir) -> RoleRepository<FileStore, RoleConfiguration> {
    let store = FileStore::create(temp.path().join("db")).unwrap();
    store.migrate().unwrap();
    RoleRepository::new(
        store,
        PermissionSetResolver::with_builtin_catalog(),
        RoleConfiguration::new(),
    )
}

#[test]
fn test_create_with_sets_triggers_exactly_one_sync() {
    let mut repo = memory_repo();
    let orders = repo.create_permission_set("Orders", "OrderManagement", None).unwrap();
    let products = repo.create_permission_set("Products", "ProductDisplay", None).unwrap();

    let outcome = repo
        .save(RoleForm::create("fulfillment").permission_sets(vec![orders.id, products.id]))
        .unwrap();

    assert!(outcome.is_saved());
    assert_eq!(
        repo.registry().calls,
        vec![(
            "fulfillment".to_string(),
            vec!["OrderManagement".to_string(), "ProductDisplay".to_string()]
        )]
    );
}

#[test]
fn test_base_role_save_still_syncs() {
    // The post-save hook applies to every role; only bootstrap filters base roles
    let mut repo = memory_repo();
    let set = repo.create_permission_set("Super", "SuperUser", None).unwrap();

    repo.save(RoleForm::create("admin").permission_sets(vec![set.id])).unwrap();

    assert_eq!(repo.registry().calls.len(), 1);
    assert_eq!(repo.registry().calls[0].0, "admin");
}

#[test]
fn test_rejected_save_makes_no_call() {
    let mut repo = memory_repo();
    repo.save(RoleForm::create("Manager")).unwrap();

    let outcome = repo.save(RoleForm::create("MANAGER")).unwrap();

    match outcome {
        SaveOutcome::Rejected(errors) => assert_eq!(errors.on("name"), vec![TAKEN]),
        SaveOutcome::Saved(role) => panic!("Expected rejection, saved {:?}", role),
    }
    assert_eq!(repo.registry().calls.len(), 1);
    assert_eq!(repo.roles().unwrap().len(), 1);
}

#[test]
fn test_update_without_set_list_keeps_associations() {
    let mut repo = memory_repo();
    let set = repo.create_permission_set("Stock", "StockDisplay", None).unwrap();
    let role = repo
        .save(RoleForm::create("stocker").permission_sets(vec![set.id]))
        .unwrap()
        .role()
        .cloned()
        .unwrap();

    repo.save(RoleForm::update(&role).name("stock-keeper")).unwrap();

    let calls = &repo.registry().calls;
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1], ("stock-keeper".to_string(), vec!["StockDisplay".to_string()]));
}

#[test]
fn test_update_with_empty_list_clears_and_syncs_empty() {
    let mut repo = memory_repo();
    let set = repo.create_permission_set("Stock", "StockDisplay", None).unwrap();
    let role = repo
        .save(RoleForm::create("stocker").permission_sets(vec![set.id]))
        .unwrap()
        .role()
        .cloned()
        .unwrap();

    repo.save(RoleForm::update(&role).permission_sets(vec![])).unwrap();

    assert!(repo.permission_sets_for(&role).unwrap().is_empty());
    assert_eq!(repo.registry().calls[1], ("stocker".to_string(), vec![]));
}

#[test]
fn test_attach_then_save_syncs_attached_set() {
    let mut repo = memory_repo();
    let role = repo.save(RoleForm::create("support")).unwrap().role().cloned().unwrap();
    let set = repo.create_permission_set("Users", "UserDisplay", None).unwrap();

    repo.attach_permission_set(role.id, set.id).unwrap();
    assert_eq!(repo.registry().calls.len(), 1);

    repo.save(RoleForm::update(&role)).unwrap();
    assert_eq!(repo.registry().calls[1].1, vec!["UserDisplay".to_string()]);
}

#[test]
fn test_unresolvable_set_is_persisted_before_error() {
    let mut repo = memory_repo();
    let bogus = repo.create_permission_set("Bogus", "DoesNotExist", None).unwrap();

    let result = repo.save(RoleForm::create("broken").permission_sets(vec![bogus.id]));

    assert!(matches!(result, Err(PermsetError::PermissionSetNotFound(ref id)) if id == "DoesNotExist"));
    let role = repo.find_role_by_name("broken").unwrap().unwrap();
    assert_eq!(repo.permission_sets_for(&role).unwrap().len(), 1);
    assert!(repo.registry().calls.is_empty());
}

#[test]
fn test_destroy_leaves_permission_sets() {
    let mut repo = memory_repo();
    let set = repo.create_permission_set("Orders", "OrderDisplay", None).unwrap();
    let role = repo
        .save(RoleForm::create("viewer").permission_sets(vec![set.id]))
        .unwrap()
        .role()
        .cloned()
        .unwrap();

    assert!(repo.destroy(role.id).unwrap());

    assert!(repo.find_role(role.id).unwrap().is_none());
    assert!(repo.store().role_permissions().unwrap().is_empty());
    assert_eq!(repo.permission_sets().unwrap().len(), 1);
    assert!(!repo.destroy(role.id).unwrap());
}

#[test]
fn test_file_backed_lifecycle_survives_reopen() {
    let temp = TempDir::new().unwrap();
    let mut repo = file_repo(&temp);
    let set = repo.create_permission_set("Orders", "OrderManagement", Some("full order access")).unwrap();
    repo.save(RoleForm::create("orders").permission_sets(vec![set.id])).unwrap();

    assert_eq!(
        repo.registry().identifiers_for("orders").unwrap(),
        vec!["OrderManagement"]
    );

    let reopened = FileStore::open(temp.path().join("db")).unwrap();
    let role = reopened.find_role_by_name("orders").unwrap().unwrap();
    let sets = reopened.permission_sets_for(role.id).unwrap();
    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].description.as_deref(), Some("full order access"));
}

#[test]
fn test_file_backed_uniqueness_is_case_insensitive() {
    let temp = TempDir::new().unwrap();
    let mut repo = file_repo(&temp);
    repo.save(RoleForm::create("Warehouse")).unwrap();

    let outcome = repo.save(RoleForm::create("warehouse")).unwrap();

    assert!(!outcome.is_saved());
    assert_eq!(repo.roles().unwrap().len(), 1);
}
