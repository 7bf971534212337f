//! Price resolution.
//!
//! Feeds disagree about which of the three price tokens they emit: some
//! send only a flat current price, some a regular/discount pair, some all
//! three. This module folds whatever arrived into a single
//! `{regular_price, discount_price, is_discount}` triple and validates the
//! currency code.

use modfeed_core::ItemFields;
use rust_decimal::Decimal;

use crate::context::ParseContext;

use super::ParseModule;

pub struct PriceNormalizer;

impl ParseModule for PriceNormalizer {
    fn name(&self) -> &'static str {
        "price_normalizer"
    }

    fn apply(&self, _ctx: &ParseContext<'_>, scraped: &ItemFields, parsed: &mut ItemFields) {
        let resolved = resolve_prices(
            scraped.price,
            scraped.regular_price,
            scraped.discount_price,
            scraped.currency.as_deref(),
        );
        parsed.regular_price = resolved.regular;
        parsed.discount_price = resolved.discount;
        parsed.is_discount = resolved.is_discount;
        parsed.currency = resolved.currency;
        // The flat token is an input only; it never survives into parsed.
        parsed.price = None;
    }
}

#[derive(Debug, Default, PartialEq)]
struct ResolvedPrices {
    regular: Option<Decimal>,
    discount: Option<Decimal>,
    is_discount: Option<bool>,
    currency: Option<String>,
}

fn resolve_prices(
    price: Option<Decimal>,
    regular: Option<Decimal>,
    discount: Option<Decimal>,
    currency: Option<&str>,
) -> ResolvedPrices {
    let Some(currency) = currency.filter(|c| is_valid_currency(c)) else {
        return ResolvedPrices::default();
    };

    // Which fields arrived decides their meaning: a flat price next to a
    // regular price is the discounted one; a lone discount price is really
    // just the current price.
    let (reg, disc) = match (price, regular, discount) {
        (Some(p), None, None) => (Some(p), None),
        (None, Some(r), None) => (Some(r), None),
        (None, None, Some(d)) => (Some(d), None),
        (Some(p), Some(r), None) => (Some(r), Some(p)),
        (Some(p), None, Some(d)) => (Some(p), Some(d)),
        (None, Some(r), Some(d)) | (Some(_), Some(r), Some(d)) => (Some(r), Some(d)),
        (None, None, None) => (None, None),
    };

    let Some(reg) = reg else {
        return ResolvedPrices::default();
    };

    match disc {
        Some(d) if d > reg => ResolvedPrices::default(),
        Some(d) if d == reg => ResolvedPrices {
            regular: Some(reg),
            discount: None,
            is_discount: Some(false),
            currency: Some(currency.to_string()),
        },
        Some(d) => ResolvedPrices {
            regular: Some(reg),
            discount: Some(d),
            is_discount: Some(true),
            currency: Some(currency.to_string()),
        },
        None => ResolvedPrices {
            regular: Some(reg),
            discount: None,
            is_discount: Some(false),
            currency: Some(currency.to_string()),
        },
    }
}

fn is_valid_currency(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic())
}

#[cfg(test)]
#[path = "price_test.rs"]
mod price_test;
