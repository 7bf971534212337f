//! Color and pattern resolution from free-text option descriptions.

use modfeed_core::ItemFields;

use crate::context::ParseContext;

use super::ParseModule;

/// Resolves canonical color and pattern keys from the scraped free-text
/// option field.
///
/// Unlike gender this collects every match: `"Navy striped"` yields the
/// color `navy` and the pattern `striped` in one pass. No match leaves the
/// respective field `None` (missing options are not a validation failure).
pub struct OptionMapper;

impl ParseModule for OptionMapper {
    fn name(&self) -> &'static str {
        "option_mapper"
    }

    fn apply(&self, ctx: &ParseContext<'_>, scraped: &ItemFields, parsed: &mut ItemFields) {
        let text = scraped
            .colors
            .as_ref()
            .map(|v| v.join(" "))
            .unwrap_or_default();
        parsed.colors = non_empty(ctx.aliases.color.all_matches(&text));
        parsed.patterns = non_empty(ctx.aliases.pattern.all_matches(&text));
    }
}

fn non_empty(matches: Vec<String>) -> Option<Vec<String>> {
    if matches.is_empty() {
        None
    } else {
        Some(matches)
    }
}
