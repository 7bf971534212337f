use rust_decimal::Decimal;

use super::{resolve_prices, ResolvedPrices};

fn d(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

#[test]
fn lone_flat_price_becomes_regular() {
    let got = resolve_prices(Some(d(129_900)), None, None, Some("SEK"));
    assert_eq!(got.regular, Some(d(129_900)));
    assert_eq!(got.discount, None);
    assert_eq!(got.is_discount, Some(false));
    assert_eq!(got.currency.as_deref(), Some("SEK"));
}

#[test]
fn lone_regular_price_stands() {
    let got = resolve_prices(None, Some(d(129_900)), None, Some("SEK"));
    assert_eq!(got.regular, Some(d(129_900)));
    assert_eq!(got.is_discount, Some(false));
}

#[test]
fn lone_discount_price_becomes_regular_without_discount() {
    let got = resolve_prices(None, None, Some(d(99_900)), Some("SEK"));
    assert_eq!(got.regular, Some(d(99_900)));
    assert_eq!(got.discount, None);
    assert_eq!(got.is_discount, Some(false));
}

#[test]
fn flat_beside_regular_is_the_discounted_price() {
    let got = resolve_prices(Some(d(99_900)), Some(d(129_900)), None, Some("SEK"));
    assert_eq!(got.regular, Some(d(129_900)));
    assert_eq!(got.discount, Some(d(99_900)));
    assert_eq!(got.is_discount, Some(true));
}

#[test]
fn flat_beside_discount_is_the_regular_price() {
    let got = resolve_prices(Some(d(129_900)), None, Some(d(99_900)), Some("SEK"));
    assert_eq!(got.regular, Some(d(129_900)));
    assert_eq!(got.discount, Some(d(99_900)));
    assert_eq!(got.is_discount, Some(true));
}

#[test]
fn regular_and_discount_pair_wins_over_flat() {
    let got = resolve_prices(
        Some(d(111_100)),
        Some(d(129_900)),
        Some(d(99_900)),
        Some("SEK"),
    );
    assert_eq!(got.regular, Some(d(129_900)));
    assert_eq!(got.discount, Some(d(99_900)));
    assert_eq!(got.is_discount, Some(true));
}

#[test]
fn discount_above_regular_invalidates_both() {
    let got = resolve_prices(None, Some(d(99_900)), Some(d(129_900)), Some("SEK"));
    assert_eq!(got, ResolvedPrices::default());
}

#[test]
fn discount_equal_to_regular_is_no_discount() {
    let got = resolve_prices(None, Some(d(99_900)), Some(d(99_900)), Some("SEK"));
    assert_eq!(got.regular, Some(d(99_900)));
    assert_eq!(got.discount, None);
    assert_eq!(got.is_discount, Some(false));
}

#[test]
fn missing_currency_clears_everything() {
    let got = resolve_prices(Some(d(129_900)), None, None, None);
    assert_eq!(got, ResolvedPrices::default());
}

#[test]
fn malformed_currency_clears_everything() {
    for bad in ["SE", "SEKK", "S3K", "kr "] {
        let got = resolve_prices(Some(d(129_900)), None, None, Some(bad));
        assert_eq!(got, ResolvedPrices::default(), "currency {bad:?}");
    }
}

#[test]
fn no_prices_at_all_resolves_to_nothing() {
    let got = resolve_prices(None, None, None, Some("SEK"));
    assert_eq!(got, ResolvedPrices::default());
}
