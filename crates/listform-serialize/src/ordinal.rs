//! Ordinal path segments
//!
//! Entry positions are written as lower-case English words so flattened paths
//! never contain numeric segments. Tens and units are joined without a space
//! (`thirtyfour`). Positions above 99 fall back to decimal digits.

const ONES: [&str; 10] = [
    "", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine",
];

const TEENS: [&str; 10] = [
    "ten",
    "eleven",
    "twelve",
    "thirteen",
    "fourteen",
    "fifteen",
    "sixteen",
    "seventeen",
    "eighteen",
    "nineteen",
];

const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

/// Word form of a position
///
/// ```
/// use listform_serialize::ordinal;
///
/// assert_eq!(ordinal(1), "one");
/// assert_eq!(ordinal(34), "thirtyfour");
/// assert_eq!(ordinal(120), "120");
/// ```
#[must_use]
pub fn ordinal(n: usize) -> String {
    match n {
        0 => "zero".to_string(),
        1..=9 => ONES[n].to_string(),
        10..=19 => TEENS[n - 10].to_string(),
        20..=99 => format!("{}{}", TENS[n / 10], ONES[n % 10]),
        _ => n.to_string(),
    }
}

/// Position denoted by an ordinal segment
///
/// Accepts exactly what [`ordinal`] produces.
#[must_use]
pub fn parse_ordinal(segment: &str) -> Option<usize> {
    if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
        return segment.parse().ok().filter(|n| *n > 99);
    }
    (0..=99).find(|n| ordinal(*n) == segment)
}
