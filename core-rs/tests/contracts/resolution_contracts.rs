//! Permission Set Resolution Contract Tests
//!
//! Identifiers resolve through the registered lookup table only. Nothing is
//! derived from the identifier text itself.

use permset_core::capability::{identifiers, CapabilityHandle, PermissionSetResolver, StaticPermissionSet};
use permset_core::errors::PermsetError;

fn resolver_with(ids: &[&str]) -> PermissionSetResolver {
    let mut resolver = PermissionSetResolver::new();
    for id in ids {
        resolver.register_static(StaticPermissionSet::new(*id, vec![]));
    }
    resolver
}

/// WHY: Resolved handles keep the order of the input identifiers
/// REASON: The registry receives sets in association order
/// BREAKS: Deterministic registry contents across syncs
#[test]
fn resolve_all_preserves_order_and_duplicates() {
    let resolver = resolver_with(&["A", "B", "C"]);

    let handles = resolver.resolve_all(["C", "A", "C", "B"]).unwrap();

    assert_eq!(identifiers(&handles), vec!["C", "A", "C", "B"]);
}

/// WHY: One unknown identifier fails the whole resolution
/// REASON: A partial list would sync a role with fewer permissions than stored
/// BREAKS: Registry would silently diverge from the database
#[test]
fn resolve_all_fails_fast_on_unknown() {
    let resolver = resolver_with(&["A", "B"]);

    let err = resolver.resolve_all(["A", "Missing", "B"]).unwrap_err();

    assert!(matches!(err, PermsetError::PermissionSetNotFound(ref id) if id == "Missing"));
}

/// WHY: Lookup is exact, with no case folding or namespace guessing
/// REASON: Only registered identifiers may become capabilities
/// BREAKS: Arbitrary stored strings could reach unintended handles
#[test]
fn lookup_is_exact() {
    let resolver = resolver_with(&["OrderDisplay"]);

    assert!(resolver.resolve("OrderDisplay").is_ok());
    for near_miss in ["orderdisplay", "ORDERDISPLAY", " OrderDisplay", "Spree::OrderDisplay"] {
        assert!(resolver.resolve(near_miss).is_err(), "{} resolved", near_miss);
    }
}

/// WHY: An empty identifier list resolves to an empty handle list
#[test]
fn empty_input_resolves_empty() {
    let resolver = PermissionSetResolver::new();
    let handles = resolver.resolve_all(Vec::<String>::new()).unwrap();
    assert!(handles.is_empty());
}

/// WHY: Re-registering an identifier replaces its factory
/// REASON: Extensions loaded later override earlier registrations
#[test]
fn later_registration_wins() {
    let mut resolver = PermissionSetResolver::with_builtin_catalog();
    let replaced = resolver.register_static(StaticPermissionSet::new(
        "OrderDisplay",
        vec![permset_core::Grant::new("display", "Invoice")],
    ));

    assert!(replaced);
    let handle = resolver.resolve("OrderDisplay").unwrap();
    assert_eq!(handle.grants().len(), 1);
    assert_eq!(handle.grants()[0].subject, "Invoice");
}
