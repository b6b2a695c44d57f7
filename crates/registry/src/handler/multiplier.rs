//! Numeric multiplier suffixes: `10k` is `10000`, `2m` is `2000000`.

/// Multiplier for `c` (one chunk width).
pub const MULTIPLIER_C: i128 = 16;
/// Multiplier for `h` (hundred).
pub const MULTIPLIER_H: i128 = 100;
/// Multiplier for `r` (one region width).
pub const MULTIPLIER_R: i128 = 512;
/// Multiplier for `k` (thousand).
pub const MULTIPLIER_K: i128 = 1_000;
/// Multiplier for `m` (million).
pub const MULTIPLIER_M: i128 = 1_000_000;

/// Multiplier for one suffix character, case-insensitive.
pub fn multiplier_for(c: char) -> Option<i128> {
	match c.to_ascii_lowercase() {
		'c' => Some(MULTIPLIER_C),
		'h' => Some(MULTIPLIER_H),
		'r' => Some(MULTIPLIER_R),
		'k' => Some(MULTIPLIER_K),
		'm' => Some(MULTIPLIER_M),
		_ => None,
	}
}

/// Splits trailing multiplier characters off `text`.
///
/// Scans right to left, multiplying while characters are multipliers, and
/// stops at the first one that is not. Returns the remaining literal and the
/// cumulative factor, or `None` if the factor overflows.
pub fn split_multiplier(text: &str) -> Option<(&str, i128)> {
	let mut factor: i128 = 1;
	let mut end = text.len();
	for (idx, c) in text.char_indices().rev() {
		let Some(m) = multiplier_for(c) else {
			break;
		};
		factor = factor.checked_mul(m)?;
		end = idx;
	}
	Some((&text[..end], factor))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn splits_single_suffix() {
		assert_eq!(split_multiplier("10k"), Some(("10", 1_000)));
		assert_eq!(split_multiplier("5C"), Some(("5", 16)));
		assert_eq!(split_multiplier("3"), Some(("3", 1)));
	}

	#[test]
	fn suffixes_compound_until_first_digit() {
		assert_eq!(split_multiplier("2kh"), Some(("2", 100_000)));
		assert_eq!(split_multiplier("1k2m"), Some(("1k2", 1_000_000)));
	}

	#[test]
	fn suffix_only_leaves_empty_literal() {
		assert_eq!(split_multiplier("k"), Some(("", 1_000)));
		assert_eq!(split_multiplier(""), Some(("", 1)));
	}

	#[test]
	fn overflow_is_reported() {
		assert_eq!(split_multiplier("1mmmmmmmmm"), None);
	}
}
