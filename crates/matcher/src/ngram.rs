use rustc_hash::FxHashSet;

/// Score reported for an empty input or an empty candidate.
pub const NO_MATCH: f64 = 0.0;

fn folded(s: &str) -> Vec<char> {
	s.chars().flat_map(char::to_lowercase).collect()
}

fn contains(haystack: &[char], needle: &[char]) -> bool {
	needle.len() <= haystack.len() && haystack.windows(needle.len()).any(|w| w == needle)
}

/// Counts the `n`-gram windows of `a` that also occur somewhere in `b`.
///
/// Matching is case-insensitive and counts repeated windows of `a` once per
/// occurrence. When either string is shorter than `n` there are no windows to
/// compare, so the overlap is `1` if one string contains the other and `0`
/// otherwise.
pub fn overlap(a: &str, b: &str, n: usize) -> usize {
	let n = n.max(1);
	let a = folded(a);
	let b = folded(b);
	if a.is_empty() || b.is_empty() {
		return 0;
	}
	if a.len() < n || b.len() < n {
		return usize::from(contains(&a, &b) || contains(&b, &a));
	}

	let grams: FxHashSet<&[char]> = b.windows(n).collect();
	a.windows(n).filter(|w| grams.contains(w)).count()
}

/// Relative confidence that `input` refers to `candidate`.
///
/// Equal to `overlap(input, candidate) / overlap(candidate, candidate)`.
/// A string scored against itself yields `1.0`. Returns [`NO_MATCH`] when
/// either side is empty.
pub fn score(input: &str, candidate: &str, n: usize) -> f64 {
	let total = overlap(candidate, candidate, n);
	if total == 0 {
		return NO_MATCH;
	}
	overlap(input, candidate, n) as f64 / total as f64
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn self_score_is_one() {
		for s in ["add", "multiplication", "complicated-multiplication", "x"] {
			assert_eq!(score(s, s, 3), 1.0, "{s}");
		}
	}

	#[test]
	fn empty_fragment_scores_sentinel() {
		assert_eq!(score("", "add", 3), NO_MATCH);
		assert_eq!(score("add", "", 3), NO_MATCH);
		assert_eq!(score("", "", 3), NO_MATCH);
	}

	#[test]
	fn superstring_input_can_exceed_one() {
		assert!(score("abcdabcd", "abcd", 3) > 1.0);
	}

	#[test]
	fn case_is_ignored() {
		assert_eq!(overlap("MULTI", "multi", 3), 3);
	}

	#[test]
	fn short_strings_fall_back_to_containment() {
		assert_eq!(overlap("ad", "add", 3), 1);
		assert_eq!(overlap("zz", "add", 3), 0);
		assert_eq!(score("a", "add", 3), 1.0);
	}

	#[test]
	fn zero_gram_len_is_clamped() {
		assert_eq!(overlap("ab", "ba", 0), 2);
	}
}
