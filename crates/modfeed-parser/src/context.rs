//! Per-record context passed to every parse module.

use modfeed_db::{TaxonomyMappingRow, VendorRow};

use crate::aliases::AliasSet;

/// Everything a parse module may read besides the record's own layers.
///
/// Modules are pure over this context: the worker does all database work
/// up front (loading the vendor, get-or-creating mapping rows) and hands
/// the results in by reference, so the module chain itself never awaits.
#[derive(Debug, Clone, Copy)]
pub struct ParseContext<'a> {
    pub vendor: &'a VendorRow,
    /// Stable per-vendor item key, used for hosted redirect URLs.
    pub item_key: &'a str,
    /// Site origin for hosted redirect links, e.g. `https://modfeed.example`.
    pub site_base_url: &'a str,
    /// Mapping row for the record's raw brand value, when the record has one.
    pub brand_mapping: Option<&'a TaxonomyMappingRow>,
    /// Mapping row for the record's raw category value, when the record has
    /// one.
    pub category_mapping: Option<&'a TaxonomyMappingRow>,
    pub aliases: &'a AliasSet,
}
