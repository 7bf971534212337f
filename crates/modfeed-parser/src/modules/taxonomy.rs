//! Brand and category mapping modules.
//!
//! Both modules work the same way: the worker has already get-or-created
//! the mapping row for the record's raw value, and the module copies the
//! curated canonical name and id into the parsed layer. An uncurated row
//! clears both fields, which makes validation reject the record until an
//! operator resolves the backlog entry.

use modfeed_core::ItemFields;
use modfeed_db::TaxonomyMappingRow;

use crate::context::ParseContext;

use super::ParseModule;

pub struct BrandMapper;

impl ParseModule for BrandMapper {
    fn name(&self) -> &'static str {
        "brand_mapper"
    }

    fn apply(&self, ctx: &ParseContext<'_>, _scraped: &ItemFields, parsed: &mut ItemFields) {
        let (name, id) = resolve(ctx.brand_mapping);
        parsed.brand = name;
        parsed.brand_id = id;
    }
}

pub struct CategoryMapper;

impl ParseModule for CategoryMapper {
    fn name(&self) -> &'static str {
        "category_mapper"
    }

    fn apply(&self, ctx: &ParseContext<'_>, _scraped: &ItemFields, parsed: &mut ItemFields) {
        let (name, id) = resolve(ctx.category_mapping);
        parsed.category = name;
        parsed.category_id = id;
    }
}

fn resolve(mapping: Option<&TaxonomyMappingRow>) -> (Option<String>, Option<i64>) {
    match mapping {
        Some(row) if row.is_curated() => (row.canonical_name.clone(), row.canonical_id),
        _ => (None, None),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn mapping(canonical: Option<&str>, canonical_id: Option<i64>) -> TaxonomyMappingRow {
        TaxonomyMappingRow {
            id: 7,
            kind: "brand".to_string(),
            vendor_id: 1,
            raw_value: "ACME Co".to_string(),
            canonical_name: canonical.map(str::to_string),
            canonical_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn curated_mapping_copies_name_and_id() {
        let row = mapping(Some("Acme"), Some(42));
        assert_eq!(resolve(Some(&row)), (Some("Acme".to_string()), Some(42)));
    }

    #[test]
    fn uncurated_mapping_clears_both() {
        let row = mapping(None, None);
        assert_eq!(resolve(Some(&row)), (None, None));
    }

    #[test]
    fn absent_mapping_clears_both() {
        assert_eq!(resolve(None), (None, None));
    }

    #[test]
    fn curated_name_without_id_still_applies() {
        // Canonical entities created lazily by the importer may not have a
        // catalog id at curation time.
        let row = mapping(Some("Acme"), None);
        assert_eq!(resolve(Some(&row)), (Some("Acme".to_string()), None));
    }
}
