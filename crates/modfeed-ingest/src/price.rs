//! Price token parsing.
//!
//! Vendor feeds deliver prices as display strings: `"1 299 SEK"`,
//! `"SEK 1,299"`, `"1.299,00 kr"`, `"€12.99"`. [`parse_price`] turns one
//! such token into an amount and an ISO-4217-ish currency code, or
//! `(None, None)` when the token cannot be interpreted.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Parses one price token into `(amount, currency)`.
///
/// Recognizes 3-letter currency codes anywhere in the token, plus the
/// symbols `kr` (→ SEK), `€` (→ EUR), `$` (→ USD), and `£` (→ GBP).
/// Thousands separators (space, NBSP, and a separator followed by exactly
/// three digits) are stripped; a decimal comma is normalized to a point.
///
/// Failure — no digits, an unparseable amount, or two conflicting currency
/// codes — yields `(None, None)`. An amount without any currency signal
/// yields `(Some(amount), None)`.
#[must_use]
pub fn parse_price(token: &str) -> (Option<Decimal>, Option<String>) {
    let token = token.trim();
    if token.is_empty() {
        return (None, None);
    }

    let currency = match extract_currency(token) {
        Ok(currency) => currency,
        Err(()) => return (None, None),
    };

    let Some(amount) = extract_amount(token) else {
        return (None, None);
    };

    (Some(amount), currency)
}

/// Finds the currency signal in a token. `Err(())` marks a contradictory
/// token (two different codes), which fails the whole parse.
fn extract_currency(token: &str) -> Result<Option<String>, ()> {
    let mut found: Option<String> = None;

    let mut push = |code: String| -> Result<(), ()> {
        match &found {
            Some(existing) if *existing != code => Err(()),
            Some(_) => Ok(()),
            None => {
                found = Some(code);
                Ok(())
            }
        }
    };

    for symbol_run in token.split(|c: char| c.is_ascii_digit() || c.is_whitespace()) {
        for c in symbol_run.chars() {
            match c {
                '€' => push("EUR".to_string())?,
                '$' => push("USD".to_string())?,
                '£' => push("GBP".to_string())?,
                _ => {}
            }
        }
    }

    for run in token.split(|c: char| !c.is_alphabetic()) {
        if run.is_empty() {
            continue;
        }
        if run.eq_ignore_ascii_case("kr") {
            push("SEK".to_string())?;
        } else if run.len() == 3 && run.chars().all(|c| c.is_ascii_alphabetic()) {
            push(run.to_ascii_uppercase())?;
        } else {
            // Any other word makes the token suspect, e.g. "invalid".
            return Err(());
        }
    }

    Ok(found)
}

/// Extracts the numeric amount, normalizing separators.
fn extract_amount(token: &str) -> Option<Decimal> {
    // Keep only digits and candidate separators; spaces and NBSPs are
    // always thousands separators and dropped outright.
    let raw: String = token
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();

    if !raw.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let has_point = raw.contains('.');
    let has_comma = raw.contains(',');

    let normalized = match (has_point, has_comma) {
        (false, false) => raw,
        (true, true) => {
            // The separator appearing last is the decimal one.
            let last_point = raw.rfind('.').unwrap_or(0);
            let last_comma = raw.rfind(',').unwrap_or(0);
            let (decimal_sep, thousands_sep) = if last_point > last_comma {
                ('.', ',')
            } else {
                (',', '.')
            };
            raw.chars()
                .filter(|&c| c != thousands_sep)
                .map(|c| if c == decimal_sep { '.' } else { c })
                .collect()
        }
        (true, false) => normalize_single_separator(&raw, '.'),
        (false, true) => normalize_single_separator(&raw, ','),
    };

    Decimal::from_str(&normalized).ok()
}

/// Resolves a token with one separator kind: several occurrences or exactly
/// three trailing digits mean thousands grouping; otherwise it is the
/// decimal separator.
fn normalize_single_separator(raw: &str, sep: char) -> String {
    let occurrences = raw.matches(sep).count();
    let digits_after = raw
        .rsplit(sep)
        .next()
        .map_or(0, |tail| tail.chars().take_while(char::is_ascii_digit).count());

    if occurrences > 1 || digits_after == 3 {
        raw.chars().filter(|&c| c != sep).collect()
    } else {
        raw.chars().map(|c| if c == sep { '.' } else { c }).collect()
    }
}

#[cfg(test)]
#[path = "price_test.rs"]
mod price_test;
