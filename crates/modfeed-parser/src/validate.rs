//! Post-pipeline validation.
//!
//! Validation decides VALIDATED vs REJECTED. It never errors the job:
//! the worker records the outcome either way and the importer reacts to
//! it. Reasons are collected in full so a log line shows everything wrong
//! with a record at once, not just the first failure.

use modfeed_core::{Gender, ItemFields};
use modfeed_db::VendorRow;

/// Returns every reason the parsed layer is unfit for the catalog.
/// An empty list means the record is validated.
#[must_use]
pub fn validate(vendor: &VendorRow, is_dropped: bool, parsed: &ItemFields) -> Vec<&'static str> {
    let mut reasons = Vec::new();

    if is_dropped {
        reasons.push("record dropped from feed");
    }
    if vendor.catalog_vendor_id.is_none() {
        reasons.push("vendor not linked to a catalog vendor");
    }

    if is_blank(parsed.name.as_deref()) {
        reasons.push("missing name");
    }
    if is_blank(parsed.description.as_deref()) {
        reasons.push("missing description");
    }
    if is_blank(parsed.brand.as_deref()) {
        reasons.push("unmapped brand");
    }
    if is_blank(parsed.category.as_deref()) {
        reasons.push("unmapped category");
    }
    match parsed.gender.as_deref() {
        None => reasons.push("missing gender"),
        Some(code) if Gender::from_code(code).is_none() => reasons.push("invalid gender code"),
        Some(_) => {}
    }
    if !parsed.has_images() {
        reasons.push("no stored images");
    }
    match parsed.currency.as_deref() {
        None => reasons.push("missing currency"),
        Some(c) if c.len() != 3 => reasons.push("invalid currency code"),
        Some(_) => {}
    }
    if parsed.regular_price.is_none() {
        reasons.push("missing regular price");
    }
    if is_blank(parsed.url.as_deref()) {
        reasons.push("missing buy url");
    }
    if is_blank(parsed.vendor.as_deref()) {
        reasons.push("missing vendor");
    }

    reasons
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}
