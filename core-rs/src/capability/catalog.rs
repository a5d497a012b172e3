//! Built-in permission sets shipped with the commerce platform
//!
//! These are registered into every [`PermissionSetResolver`] created with
//! [`PermissionSetResolver::with_builtin_catalog`]. Extension manifests can add
//! more, or replace one of these by registering the same identifier.
//!
//! [`PermissionSetResolver`]: super::resolver::PermissionSetResolver
//! [`PermissionSetResolver::with_builtin_catalog`]: super::resolver::PermissionSetResolver::with_builtin_catalog

use once_cell::sync::Lazy;

use super::handle::{Grant, StaticPermissionSet};

const CONFIGURATION_SUBJECTS: &[&str] = &[
    "GeneralSettings",
    "TaxCategory",
    "TaxRate",
    "Zone",
    "Country",
    "State",
    "PaymentMethod",
    "Taxonomy",
    "ShippingMethod",
    "ShippingCategory",
    "StockLocation",
    "RefundReason",
    "ReimbursementType",
    "ReturnReason",
    "Store",
];

const ORDER_SUBJECTS: &[&str] = &[
    "Order",
    "Payment",
    "Shipment",
    "Adjustment",
    "LineItem",
    "ReturnAuthorization",
    "CustomerReturn",
    "Reimbursement",
    "ReturnItem",
    "Refund",
];

const PRODUCT_SUBJECTS: &[&str] = &[
    "Product",
    "Image",
    "Variant",
    "OptionValue",
    "ProductProperty",
    "OptionType",
    "Property",
    "Taxonomy",
    "Taxon",
    "Classification",
];

const PROMOTION_SUBJECTS: &[&str] = &[
    "Promotion",
    "PromotionRule",
    "PromotionAction",
    "PromotionCategory",
    "PromotionCode",
];

fn each(action: &str, subjects: &[&str]) -> Vec<Grant> {
    subjects.iter().map(|s| Grant::new(action, *s)).collect()
}

fn set(identifier: &str, grants: Vec<Grant>) -> StaticPermissionSet {
    StaticPermissionSet::new(identifier, grants)
}

static BUILTIN: Lazy<Vec<StaticPermissionSet>> = Lazy::new(|| {
    vec![
        set("SuperUser", vec![Grant::new("manage", "all")]),
        set(
            "DefaultCustomer",
            vec![
                Grant::new("display", "Country"),
                Grant::new("display", "State"),
                Grant::new("display", "Product"),
                Grant::new("display", "Taxon"),
                Grant::new("display", "Taxonomy"),
                Grant::new("create", "Order"),
                Grant::new("update", "User"),
            ],
        ),
        set(
            "DashboardDisplay",
            vec![Grant::new("admin", "Dashboard"), Grant::new("home", "Dashboard")],
        ),
        set("OrderDisplay", {
            let mut grants = each("display", ORDER_SUBJECTS);
            grants.push(Grant::new("admin", "Order"));
            grants
        }),
        set("OrderManagement", each("manage", ORDER_SUBJECTS)),
        set("ProductDisplay", {
            let mut grants = each("display", PRODUCT_SUBJECTS);
            grants.push(Grant::new("admin", "Product"));
            grants
        }),
        set("ProductManagement", each("manage", PRODUCT_SUBJECTS)),
        set(
            "StockDisplay",
            vec![
                Grant::new("display", "StockItem"),
                Grant::new("display", "StockLocation"),
                Grant::new("admin", "StockItem"),
            ],
        ),
        set(
            "StockManagement",
            vec![
                Grant::new("manage", "StockItem"),
                Grant::new("display", "StockLocation"),
            ],
        ),
        set(
            "RestrictedStockManagement",
            vec![
                Grant::new("manage", "StockItem"),
                Grant::new("display", "StockLocation"),
                Grant::new("transfer", "StockItem"),
            ],
        ),
        set(
            "UserDisplay",
            vec![
                Grant::new("display", "User"),
                Grant::new("display", "Address"),
                Grant::new("display", "StoreCredit"),
                Grant::new("display", "Role"),
            ],
        ),
        set(
            "UserManagement",
            vec![
                Grant::new("manage", "User"),
                Grant::new("manage", "StoreCredit"),
                Grant::new("display", "Role"),
            ],
        ),
        set("PromotionDisplay", each("display", PROMOTION_SUBJECTS)),
        set("PromotionManagement", each("manage", PROMOTION_SUBJECTS)),
        set("ConfigurationDisplay", each("display", CONFIGURATION_SUBJECTS)),
        set("ConfigurationManagement", each("manage", CONFIGURATION_SUBJECTS)),
        set(
            "ReportDisplay",
            vec![Grant::new("display", "Report"), Grant::new("admin", "Report")],
        ),
    ]
});

/// Built-in permission sets, in catalog order
pub fn builtin() -> &'static [StaticPermissionSet] {
    &BUILTIN
}
