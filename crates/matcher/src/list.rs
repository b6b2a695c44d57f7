use std::cmp::Ordering;

use crate::{Config, Match, score};

/// Scores every haystack against `needle` and returns the surviving matches
/// ordered by descending score, then alphabetically by haystack text.
pub fn match_list<S: AsRef<str>>(needle: &str, haystacks: &[S], config: &Config) -> Vec<Match> {
	let mut matches: Vec<Match> = haystacks
		.iter()
		.enumerate()
		.filter_map(|(index, haystack)| {
			let score = score(needle, haystack.as_ref(), config.gram_len);
			(score > 0.0 && score >= config.min_score).then_some(Match {
				index: index as u32,
				score,
			})
		})
		.collect();

	matches.sort_by(|a, b| {
		b.score
			.total_cmp(&a.score)
			.then_with(|| cmp_text(haystacks[a.index as usize].as_ref(), haystacks[b.index as usize].as_ref()))
			.then_with(|| a.index.cmp(&b.index))
	});
	if let Some(max) = config.max_results {
		matches.truncate(max);
	}
	matches
}

/// Returns the highest ranked haystack, if any scores above zero.
pub fn best_match<'a, S: AsRef<str>>(needle: &str, haystacks: &'a [S], config: &Config) -> Option<&'a str> {
	match_list(needle, haystacks, config)
		.first()
		.map(|m| haystacks[m.index as usize].as_ref())
}

fn cmp_text(a: &str, b: &str) -> Ordering {
	a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}
