//! Walking the tree and binding tokens to parameters.

use trellis_invocation::{Args, ExecutionContext, Settings, User};
use trellis_matcher::{Config, match_list};
use trellis_registry::{ChildMatch, NodeRef, VirtualTree};

use crate::error::DispatchError;
use crate::tokenizer::Token;

/// Descends from the root while tokens name children.
///
/// Stops at the first command, or at a category when the tokens run out.
/// Returns the node reached and the number of tokens consumed.
pub(crate) fn walk<'t>(
	tree: &'t VirtualTree,
	tokens: &[Token],
	user: &dyn User,
	settings: &Settings,
) -> Result<(NodeRef<'t>, usize), DispatchError> {
	let mut node = tree.root();
	let mut consumed = 0;
	while let Some(token) = tokens.get(consumed) {
		if node.is_command() {
			break;
		}
		let child = match node.match_child(&token.text) {
			ChildMatch::One(child) => Some(child),
			ChildMatch::Ambiguous(candidates) => {
				let mut visible: Vec<_> = candidates.into_iter().filter(|c| c.is_accessible_by(user)).collect();
				if visible.len() > 1 {
					if settings.debug_matching {
						tracing::debug!(token = %token.text, parent = node.path(), count = visible.len(), "ambiguous child");
					}
					return Err(DispatchError::Ambiguous {
						input: token.text.clone(),
						candidates: visible.iter().map(|c| c.name().to_string()).collect(),
					});
				}
				visible.pop()
			}
			ChildMatch::None => None,
		};
		match child {
			Some(child) => {
				if settings.debug_matching {
					tracing::debug!(token = %token.text, node = child.path(), "matched child");
				}
				node = child;
				consumed += 1;
			}
			None => {
				if settings.debug_matching {
					tracing::debug!(token = %token.text, parent = node.path(), "no child matched");
				}
				return Err(DispatchError::UnknownCommand {
					input: token.text.clone(),
					suggestions: suggest(node, &token.text, user, settings),
				});
			}
		}
	}
	Ok((node, consumed))
}

/// Names of accessible children of `node` that fuzzily resemble `input`.
pub(crate) fn suggest(node: NodeRef<'_>, input: &str, user: &dyn User, settings: &Settings) -> Vec<String> {
	let names: Vec<&str> = node
		.children()
		.filter(|child| child.is_accessible_by(user))
		.map(|child| child.name())
		.collect();
	let config = Config {
		gram_len: settings.gram_length,
		min_score: settings.suggestion_threshold,
		max_results: Some(settings.max_suggestions),
	};
	match_list(input, &names, &config)
		.into_iter()
		.map(|m| names[m.index as usize].to_string())
		.collect()
}

/// Fails with the outermost node on the path `user` may not use.
pub(crate) fn check_access(node: NodeRef<'_>, user: &dyn User, hide_node: bool) -> Result<(), DispatchError> {
	let path: Vec<_> = node.ancestors().collect();
	match path.into_iter().rev().find(|n| !n.does_match_user(user)) {
		Some(denied) => {
			tracing::debug!(user = user.name(), node = denied.path(), permission = denied.permission(), "permission denied");
			Err(DispatchError::PermissionDenied {
				node: (!hide_node).then(|| denied.path().to_string()),
			})
		}
		None => Ok(()),
	}
}

/// Lists the children of a category that `user` may use.
pub(crate) fn help(node: NodeRef<'_>, user: &dyn User) -> String {
	let mut lines = Vec::new();
	if !node.is_root() {
		lines.push(format!("{}: {}", node.path(), node.description()));
	}
	let children: Vec<_> = node.children().filter(|child| child.does_match_user(user)).collect();
	if children.is_empty() {
		lines.push("no commands available".to_string());
	}
	for child in children {
		lines.push(format!("  {}", child.summary()));
	}
	lines.join("\n")
}

/// Binds argument tokens to the parameters of `command`.
///
/// `name=value` tokens go first, the last one winning for a repeated name.
/// Plain tokens then fill the remaining non-contextual parameters in
/// declaration order. A parameter left without text comes from the
/// context, then its default.
pub(crate) fn bind(command: NodeRef<'_>, tokens: &[Token], context: &ExecutionContext) -> Result<Args, DispatchError> {
	let params = command.params();
	let mut slots: Vec<Option<&str>> = vec![None; params.len()];
	let mut positional = Vec::new();

	for token in tokens {
		let Some((name, value)) = token.pair() else {
			positional.push(token.text.as_str());
			continue;
		};
		let Some(index) = params.iter().position(|p| p.matches_name(name)) else {
			return Err(DispatchError::UnknownParameter {
				command: command.path().to_string(),
				name: name.to_string(),
			});
		};
		slots[index] = Some(value);
	}

	let mut positional = positional.into_iter();
	for (slot, param) in slots.iter_mut().zip(params) {
		if slot.is_none() && !param.is_contextual() {
			match positional.next() {
				Some(text) => *slot = Some(text),
				None => break,
			}
		}
	}
	let extra: Vec<String> = positional.map(str::to_string).collect();
	if !extra.is_empty() {
		return Err(DispatchError::TooManyArguments {
			command: command.path().to_string(),
			extra,
		});
	}

	let mut args = Args::new();
	for (slot, param) in slots.into_iter().zip(params) {
		let value = match slot {
			Some(text) => param.parse(text)?,
			None => match param.resolve_context(context) {
				Some(value) => value,
				None => match param.default_value() {
					Some(value) => value?,
					None => {
						return Err(DispatchError::MissingArgument {
							command: command.path().to_string(),
							parameter: param.name().to_string(),
						});
					}
				},
			},
		};
		args.insert(param.name(), value);
	}
	Ok(args)
}
