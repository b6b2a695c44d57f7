//! Splitting a command line into tokens.

/// One token of a command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
	/// Token text with quotes removed.
	pub text: String,
	/// Byte offset in `text` of the first `=` outside quotes, if any.
	pub assign: Option<usize>,
	/// Byte offset of the token start in the input.
	pub start: usize,
	/// Byte offset just past the token in the input.
	pub end: usize,
	/// Whether any part of the token was quoted.
	pub quoted: bool,
}

impl Token {
	/// Unquoted positional token.
	pub fn plain(text: &str, start: usize) -> Self {
		Self {
			text: text.to_string(),
			assign: None,
			start,
			end: start + text.len(),
			quoted: false,
		}
	}

	/// Splits a `name=value` token.
	pub fn pair(&self) -> Option<(&str, &str)> {
		self.assign.map(|pos| (&self.text[..pos], &self.text[pos + 1..]))
	}
}

/// Turns a command line into tokens.
pub trait Tokenizer: Send + Sync {
	fn tokenize(&self, input: &str) -> Vec<Token>;
}

impl<F> Tokenizer for F
where
	F: Fn(&str) -> Vec<Token> + Send + Sync,
{
	fn tokenize(&self, input: &str) -> Vec<Token> {
		self(input)
	}
}

/// Whitespace-separated tokens with `"` and `'` quoting.
///
/// A quote opens a span only at the start of a token or right after its
/// first unquoted `=`, so `s1="x y"` binds `x y` to `s1` while `don't` stays
/// a plain word. An `=` inside quotes never makes a token a `name=value`
/// pair. An unterminated quote runs to the end of the input.
#[derive(Debug, Default, Clone, Copy)]
pub struct QuotedTokenizer;

impl Tokenizer for QuotedTokenizer {
	fn tokenize(&self, input: &str) -> Vec<Token> {
		let mut out = Vec::new();
		let mut chars = input.char_indices().peekable();
		loop {
			while chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
			let Some(&(start, _)) = chars.peek() else {
				break;
			};

			let mut text = String::new();
			let mut assign = None;
			let mut quote = None;
			let mut quoted = false;
			let mut end = input.len();
			while let Some(&(idx, c)) = chars.peek() {
				match quote {
					Some(q) if c == q => quote = None,
					Some(_) => text.push(c),
					None if c.is_whitespace() => {
						end = idx;
						break;
					}
					None if (c == '"' || c == '\'')
						&& ((text.is_empty() && !quoted) || assign.is_some_and(|pos: usize| pos + 1 == text.len())) =>
					{
						quote = Some(c);
						quoted = true;
					}
					None => {
						if c == '=' && assign.is_none() {
							assign = Some(text.len());
						}
						text.push(c);
					}
				}
				chars.next();
			}
			out.push(Token {
				text,
				assign,
				start,
				end,
				quoted,
			});
		}
		out
	}
}
