//! Completion of partial command lines.

use trellis_invocation::{Settings, User};
use trellis_matcher::{Config, match_list};
use trellis_registry::{ChildMatch, NodeRef, VirtualTree};

use crate::tokenizer::Token;

/// Candidates for the token under the cursor at the end of the input.
///
/// When the input ends in whitespace the cursor starts a new, empty token.
/// Unresolvable or inaccessible prefixes yield nothing.
pub(crate) fn complete(
	tree: &VirtualTree,
	tokens: &[Token],
	input_len: usize,
	user: &dyn User,
	settings: &Settings,
) -> Vec<String> {
	let (done, fragment) = match tokens.split_last() {
		Some((last, rest)) if last.end == input_len => (rest, Some(last)),
		_ => (tokens, None),
	};

	let mut node = tree.root();
	let mut consumed = 0;
	while let Some(token) = done.get(consumed) {
		if node.is_command() {
			break;
		}
		let ChildMatch::One(child) = node.match_child(&token.text) else {
			return Vec::new();
		};
		node = child;
		consumed += 1;
	}
	if !node.is_accessible_by(user) {
		return Vec::new();
	}

	let text = fragment.map_or("", |token| token.text.as_str());
	if node.is_command() {
		return complete_argument(node, &done[consumed..], fragment, settings.gram_length);
	}
	let names: Vec<&str> = node
		.children()
		.filter(|child| child.does_match_user(user))
		.map(|child| child.name())
		.collect();
	rank(text, &names, settings.gram_length)
}

fn complete_argument(command: NodeRef<'_>, done: &[Token], fragment: Option<&Token>, gram_len: usize) -> Vec<String> {
	let params = command.params();
	if let Some((name, value)) = fragment.and_then(Token::pair) {
		let Some(param) = params.iter().find(|p| p.matches_name(name)) else {
			return Vec::new();
		};
		return rank(value, &param.examples_for(value), gram_len)
			.into_iter()
			.map(|value| format!("{name}={value}"))
			.collect();
	}

	let mut filled = vec![false; params.len()];
	let mut positional = 0;
	for token in done {
		match token.pair() {
			Some((name, _)) => {
				if let Some(index) = params.iter().position(|p| p.matches_name(name)) {
					filled[index] = true;
				}
			}
			None => positional += 1,
		}
	}
	for (filled, param) in filled.iter_mut().zip(params) {
		if positional == 0 {
			break;
		}
		if !*filled && !param.is_contextual() {
			*filled = true;
			positional -= 1;
		}
	}

	let text = fragment.map_or("", |token| token.text.as_str());
	let open: Vec<_> = params.iter().zip(&filled).filter(|(_, filled)| !**filled).map(|(p, _)| p).collect();
	let mut out = match open.iter().find(|p| !p.is_contextual()) {
		Some(next) => rank(text, &next.examples_for(text), gram_len),
		None => Vec::new(),
	};
	if !text.is_empty() {
		let lower = text.to_lowercase();
		out.extend(
			open.iter()
				.filter(|p| p.name().to_lowercase().starts_with(&lower))
				.map(|p| format!("{}=", p.name())),
		);
	}
	out
}

/// Orders candidates by fuzzy score against `fragment`, then alphabetically.
/// An empty fragment keeps every candidate in alphabetical order.
fn rank<S: AsRef<str>>(fragment: &str, candidates: &[S], gram_len: usize) -> Vec<String> {
	if fragment.is_empty() {
		let mut all: Vec<String> = candidates.iter().map(|c| c.as_ref().to_string()).collect();
		all.sort_by_cached_key(|c| c.to_lowercase());
		all.dedup();
		return all;
	}
	match_list(fragment, candidates, &Config::with_gram_len(gram_len))
		.into_iter()
		.map(|m| candidates[m.index as usize].as_ref().to_string())
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_fragment_lists_alphabetically() {
		assert_eq!(rank("", &["true", "false", "Maybe"], 3), vec!["false", "Maybe", "true"]);
	}

	#[test]
	fn fragment_ranks_by_score() {
		let ranked = rank("mul", &["add", "multiplication", "mul"], 3);
		assert_eq!(ranked, vec!["mul", "multiplication"]);
	}
}
