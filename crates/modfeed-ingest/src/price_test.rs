use rust_decimal::Decimal;
use std::str::FromStr;

use super::*;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).expect("valid test decimal")
}

// ---------------------------------------------------------------------------
// Currency recognition
// ---------------------------------------------------------------------------

#[test]
fn swedish_display_price_with_trailing_code() {
    assert_eq!(parse_price("1 299 SEK"), (Some(dec("1299")), Some("SEK".to_string())));
}

#[test]
fn leading_code_with_comma_thousands() {
    assert_eq!(parse_price("SEK 1,299"), (Some(dec("1299")), Some("SEK".to_string())));
}

#[test]
fn kr_symbol_maps_to_sek() {
    assert_eq!(parse_price("129 kr"), (Some(dec("129")), Some("SEK".to_string())));
    assert_eq!(parse_price("129 KR"), (Some(dec("129")), Some("SEK".to_string())));
}

#[test]
fn euro_dollar_pound_symbols() {
    assert_eq!(parse_price("€12.99"), (Some(dec("12.99")), Some("EUR".to_string())));
    assert_eq!(parse_price("$49"), (Some(dec("49")), Some("USD".to_string())));
    assert_eq!(parse_price("£ 20.50"), (Some(dec("20.50")), Some("GBP".to_string())));
}

#[test]
fn lowercase_code_is_uppercased() {
    assert_eq!(parse_price("999 nok"), (Some(dec("999")), Some("NOK".to_string())));
}

#[test]
fn amount_without_currency_keeps_currency_none() {
    assert_eq!(parse_price("1200.00"), (Some(dec("1200.00")), None));
}

// ---------------------------------------------------------------------------
// Separator normalization
// ---------------------------------------------------------------------------

#[test]
fn european_decimal_comma() {
    assert_eq!(parse_price("1.299,00 kr"), (Some(dec("1299.00")), Some("SEK".to_string())));
}

#[test]
fn english_thousands_with_decimal_point() {
    assert_eq!(parse_price("1,299.00 SEK"), (Some(dec("1299.00")), Some("SEK".to_string())));
}

#[test]
fn lone_comma_with_two_decimals_is_decimal() {
    assert_eq!(parse_price("12,99"), (Some(dec("12.99")), None));
}

#[test]
fn lone_point_with_three_digits_is_thousands() {
    assert_eq!(parse_price("1.299"), (Some(dec("1299")), None));
}

#[test]
fn repeated_separators_are_thousands() {
    assert_eq!(parse_price("1,299,000"), (Some(dec("1299000")), None));
}

#[test]
fn non_breaking_space_thousands() {
    assert_eq!(parse_price("1\u{a0}299 SEK"), (Some(dec("1299")), Some("SEK".to_string())));
}

// ---------------------------------------------------------------------------
// Failure cases
// ---------------------------------------------------------------------------

#[test]
fn unparseable_token_fails_both() {
    assert_eq!(parse_price("invalid"), (None, None));
}

#[test]
fn empty_and_whitespace_fail() {
    assert_eq!(parse_price(""), (None, None));
    assert_eq!(parse_price("   "), (None, None));
}

#[test]
fn conflicting_currency_codes_fail_the_token() {
    assert_eq!(parse_price("USD 100 SEK"), (None, None));
}

#[test]
fn stray_words_fail_the_token() {
    assert_eq!(parse_price("about 100 SEK"), (None, None));
}
