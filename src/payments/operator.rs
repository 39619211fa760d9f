//! Operator detection from subscriber number prefixes.
//!
//! Pure classification, no I/O. An undetectable number is a normal outcome
//! (`Operator::Unknown`), not an error; callers decide whether that blocks
//! the flow.

use crate::payments::types::Operator;

/// Cameroon country calling code, folded into every normalized number.
pub const COUNTRY_PREFIX: &str = "237";

/// Minimum digits a subscriber number must keep after the country prefix.
pub const MIN_LOCAL_DIGITS: usize = 8;

/// Two-digit MTN prefixes, checked before the Orange table. The tables are
/// disjoint, so order does not change the result; keeping MTN first preserves
/// the audited check order.
const MTN_TWO_DIGIT: [&str; 8] = ["50", "51", "52", "53", "54", "65", "67", "68"];
const ORANGE_TWO_DIGIT: [&str; 6] = ["55", "56", "57", "58", "59", "69"];

/// Strips everything but digits, then drops one leading country prefix if
/// present (with or without a "+").
pub fn local_digits(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.strip_prefix(COUNTRY_PREFIX) {
        Some(rest) => rest.to_string(),
        None => digits,
    }
}

/// Maps a raw phone string to its mobile-money operator.
pub fn detect(raw: &str) -> Operator {
    let local = local_digits(raw);
    if local.len() < MIN_LOCAL_DIGITS {
        return Operator::Unknown;
    }

    let first_two = &local[..2];
    let first = &local[..1];

    if MTN_TWO_DIGIT.contains(&first_two) || matches!(first, "7" | "8") {
        return Operator::Mtn;
    }
    if ORANGE_TWO_DIGIT.contains(&first_two) || first == "9" {
        return Operator::Orange;
    }
    Operator::Unknown
}
