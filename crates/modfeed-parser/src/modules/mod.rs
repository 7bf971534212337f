//! The ordered parse-module pipeline.
//!
//! Each module is a pure, synchronous transform from the immutable
//! `scraped` layer (plus [`ParseContext`]) into the `parsed` layer being
//! built. The pipeline order is declared statically in [`pipeline`];
//! there is no runtime registration.

mod buy_url;
mod gender;
mod options;
mod price;
mod taxonomy;

pub use buy_url::BuildBuyUrl;
pub use gender::GenderMapper;
pub use options::OptionMapper;
pub use price::PriceNormalizer;
pub use taxonomy::{BrandMapper, CategoryMapper};

use modfeed_core::ItemFields;

use crate::context::ParseContext;

/// One step of the parse pipeline.
///
/// Modules read from `scraped` (the untouched input layer) and the context,
/// and write their resolved fields into `parsed`. A module that cannot
/// resolve its field sets it to `None` rather than leaving a stale value.
pub trait ParseModule: Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, ctx: &ParseContext<'_>, scraped: &ItemFields, parsed: &mut ItemFields);
}

static PIPELINE: [&(dyn ParseModule); 6] = [
    &BuildBuyUrl,
    &BrandMapper,
    &CategoryMapper,
    &GenderMapper,
    &PriceNormalizer,
    &OptionMapper,
];

/// The module list in execution order.
#[must_use]
pub fn pipeline() -> &'static [&'static dyn ParseModule] {
    &PIPELINE
}

/// Runs the full pipeline over one record's scraped layer.
///
/// The parsed layer starts as a copy of `scraped`, so fields no module
/// claims (sku, stock, images, ...) carry through unchanged.
#[must_use]
pub fn run_modules(ctx: &ParseContext<'_>, scraped: &ItemFields) -> ItemFields {
    let mut parsed = scraped.clone();
    for module in pipeline() {
        module.apply(ctx, scraped, &mut parsed);
        tracing::trace!(module = module.name(), "module applied");
    }
    parsed
}
