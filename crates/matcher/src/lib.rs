//! Character n-gram fuzzy scoring.
//!
//! Scores are relative confidences rather than probabilities:
//! [`score`] divides the overlap of the input with a candidate by the
//! candidate's overlap with itself. An input that repeats the candidate's
//! grams can therefore score above `1.0`.
//!
//! ```
//! use trellis_matcher::{Config, match_list};
//!
//! let matches = match_list("multiply", &["add", "multiplication"], &Config::default());
//! assert_eq!(matches[0].index, 1);
//! ```

mod list;
mod ngram;

pub use list::{best_match, match_list};
pub use ngram::{NO_MATCH, overlap, score};

/// Default gram length.
pub const DEFAULT_GRAM_LEN: usize = 3;

/// Scoring configuration shared by all list operations.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
	/// Number of characters per gram. Values below 1 are treated as 1.
	pub gram_len: usize,
	/// Candidates scoring below this value are dropped. Zero scores are always dropped.
	pub min_score: f64,
	/// Keep at most this many matches after sorting.
	pub max_results: Option<usize>,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			gram_len: DEFAULT_GRAM_LEN,
			min_score: 0.0,
			max_results: None,
		}
	}
}

impl Config {
	/// Returns a config with the given gram length and defaults otherwise.
	pub fn with_gram_len(gram_len: usize) -> Self {
		Self {
			gram_len,
			..Self::default()
		}
	}
}

/// One scored candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Match {
	/// Index of the candidate in the haystack slice.
	pub index: u32,
	/// Relative score, see [`score`].
	pub score: f64,
}
