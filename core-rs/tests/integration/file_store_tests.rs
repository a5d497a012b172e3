//! Integration tests for the file-backed store
//!
//! One JSON document per table under the data directory.

use permset_core::errors::PermsetError;
use permset_core::store::{
    Connector, FileConnector, FileStore, PermissionSetRef, Role, RolePermission, RoleStore,
    ALL_TABLES, PERMISSION_SETS_TABLE, ROLES_TABLE, ROLE_PERMISSIONS_TABLE,
};
use std::fs;
use tempfile::TempDir;

fn migrated_store() -> (FileStore, TempDir) {
    let temp = TempDir::new().unwrap();
    let store = FileStore::create(temp.path().join("db")).unwrap();
    store.migrate().unwrap();
    (store, temp)
}

#[test]
fn test_migrate_reports_created_tables() {
    let temp = TempDir::new().unwrap();
    let store = FileStore::create(temp.path().join("db")).unwrap();

    let created = store.migrate().unwrap();
    assert_eq!(created.len(), ALL_TABLES.len());

    for table in ALL_TABLES {
        assert!(store.data_dir().join(format!("{}.json", table)).exists());
    }
    assert!(store.migrate().unwrap().is_empty());
}

#[test]
fn test_migrate_fills_in_partial_schema() {
    let (store, _temp) = migrated_store();
    fs::remove_file(store.data_dir().join(format!("{}.json", ROLE_PERMISSIONS_TABLE))).unwrap();

    assert!(!store.has_table(ROLE_PERMISSIONS_TABLE).unwrap());
    assert_eq!(store.migrate().unwrap(), vec![ROLE_PERMISSIONS_TABLE.to_string()]);
    assert!(store.has_table(ROLE_PERMISSIONS_TABLE).unwrap());
}

#[test]
fn test_migrate_keeps_existing_rows() {
    let (mut store, _temp) = migrated_store();
    store.insert_role(Role::new("keeper")).unwrap();

    store.migrate().unwrap();

    assert_eq!(store.roles().unwrap().len(), 1);
}

#[test]
fn test_query_before_migrate_is_statement_invalid() {
    let temp = TempDir::new().unwrap();
    let store = FileStore::create(temp.path().join("db")).unwrap();

    let err = store.roles().unwrap_err();
    match err {
        PermsetError::StatementInvalid(message) => assert!(message.contains(ROLES_TABLE)),
        other => panic!("Expected StatementInvalid, got {:?}", other),
    }
}

#[test]
fn test_permission_sets_for_joins_in_association_order() {
    let (mut store, _temp) = migrated_store();
    let role = store.insert_role(Role::new("editor")).unwrap();
    let a = store.insert_permission_set(PermissionSetRef::new("A", "A")).unwrap();
    let b = store.insert_permission_set(PermissionSetRef::new("B", "B")).unwrap();
    store.insert_role_permission(RolePermission::new(role.id, b.id)).unwrap();
    store.insert_role_permission(RolePermission::new(role.id, a.id)).unwrap();

    let sets: Vec<_> = store
        .permission_sets_for(role.id)
        .unwrap()
        .into_iter()
        .map(|s| s.set)
        .collect();

    assert_eq!(sets, vec!["B", "A"]);
}

#[test]
fn test_deleted_ids_are_not_reused() {
    let (mut store, _temp) = migrated_store();
    let first = store.insert_role(Role::new("first")).unwrap();
    store.delete_role(first.id).unwrap();

    let second = store.insert_role(Role::new("second")).unwrap();

    assert!(second.id > first.id);
}

#[test]
fn test_table_file_is_camel_case_json() {
    let (mut store, _temp) = migrated_store();
    store
        .insert_permission_set(PermissionSetRef::new("Orders", "OrderDisplay").with_description("read only"))
        .unwrap();

    let raw = fs::read_to_string(store.data_dir().join(format!("{}.json", PERMISSION_SETS_TABLE))).unwrap();

    assert!(raw.contains("\"createdAt\""));
    assert!(raw.contains("\"description\": \"read only\""));
}

#[test]
fn test_connector_sees_writes_from_other_handles() {
    let (mut store, _temp) = migrated_store();
    let connector = FileConnector::new(Some(store.data_dir().to_path_buf()));

    store.insert_role(Role::new("late")).unwrap();

    let connected = connector.connect().unwrap();
    assert!(connected.find_role_by_name("late").unwrap().is_some());
}

#[test]
fn test_open_requires_existing_directory() {
    let temp = TempDir::new().unwrap();
    let err = FileStore::open(temp.path().join("missing")).unwrap_err();
    assert!(matches!(err, PermsetError::NoDatabase(_)));
}
