//! Declaration name normalization.

/// Converts a PascalCase or camelCase name to kebab-case.
///
/// Inserts `-` before every uppercase character except the first, lowercases
/// everything, and strips leading dashes. Blank input is returned unchanged.
/// The conversion is idempotent and runs once, when a declaration is created.
///
/// ```
/// assert_eq!(trellis_registry::normalize("IMineDiamondsForFun"), "i-mine-diamonds-for-fun");
/// assert_eq!(trellis_registry::normalize("complicatedMultiplication"), "complicated-multiplication");
/// ```
pub fn normalize(name: &str) -> String {
	if name.trim().is_empty() {
		return name.to_string();
	}

	let mut out = String::with_capacity(name.len() + 4);
	for (i, c) in name.chars().enumerate() {
		if i > 0 && c.is_uppercase() {
			out.push('-');
		}
		out.extend(c.to_lowercase());
	}
	out.trim_start_matches('-').to_string()
}
