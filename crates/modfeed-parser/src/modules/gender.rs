//! Gender normalization.

use modfeed_core::{Gender, ItemFields};

use crate::context::ParseContext;

use super::ParseModule;

/// Resolves the scraped gender signal to a canonical `M`/`W`/`U` code.
///
/// An already-valid code passes through (case-insensitively). Otherwise the
/// gender alias table is matched against, in order: the scraped gender text,
/// the raw product URL, the name, the description. First match wins; no
/// match clears the field.
pub struct GenderMapper;

impl ParseModule for GenderMapper {
    fn name(&self) -> &'static str {
        "gender_mapper"
    }

    fn apply(&self, ctx: &ParseContext<'_>, scraped: &ItemFields, parsed: &mut ItemFields) {
        parsed.gender = resolve_gender(ctx, scraped);
    }
}

fn resolve_gender(ctx: &ParseContext<'_>, scraped: &ItemFields) -> Option<String> {
    if let Some(raw) = scraped.gender.as_deref() {
        let code = raw.trim().to_ascii_uppercase();
        if Gender::from_code(&code).is_some() {
            return Some(code);
        }
    }

    let candidates = [
        scraped.gender.as_deref(),
        scraped.url.as_deref(),
        scraped.name.as_deref(),
        scraped.description.as_deref(),
    ];
    for text in candidates.into_iter().flatten() {
        if let Some(key) = ctx.aliases.gender.first_match(text) {
            return Some(key.to_string());
        }
    }
    None
}
