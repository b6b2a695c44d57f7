//! Dispatcher settings.
//!
//! Settings load from TOML with kebab-case keys; every key is optional:
//!
//! ```toml
//! debug-matching = true
//! sync-timeout-ms = 2000
//! gram-length = 3
//! suggestion-threshold = 0.3
//! max-suggestions = 5
//! hide-denied-node = false
//! feedback = true
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
	/// Error reading a settings file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// Error parsing TOML syntax or types.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// A value is out of its allowed range.
	#[error("invalid value for {key}: {reason}")]
	Invalid {
		key: &'static str,
		reason: String,
	},
}

/// Snapshot of dispatcher behavior switches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Settings {
	/// Emit per-node matching traces.
	pub debug_matching: bool,
	/// Deadline for commands marshalled onto the main context.
	pub sync_timeout_ms: u64,
	/// Gram length used by the fuzzy matcher.
	pub gram_length: usize,
	/// Minimum fuzzy score for unknown-command suggestions.
	pub suggestion_threshold: f64,
	/// Maximum number of unknown-command suggestions.
	pub max_suggestions: usize,
	/// Leave the denied node's path out of permission-denied messages.
	pub hide_denied_node: bool,
	/// Call [`crate::User::feedback`] after each dispatch.
	pub feedback: bool,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			debug_matching: false,
			sync_timeout_ms: 5_000,
			gram_length: 3,
			suggestion_threshold: 0.3,
			max_suggestions: 5,
			hide_denied_node: false,
			feedback: true,
		}
	}
}

impl Settings {
	/// Parses settings from a TOML document.
	pub fn from_toml_str(source: &str) -> Result<Self, SettingsError> {
		let settings: Self = toml::from_str(source)?;
		settings.validate()?;
		Ok(settings)
	}

	/// Loads settings from a TOML file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
		let path = path.as_ref();
		let source = std::fs::read_to_string(path).map_err(|error| SettingsError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		let settings = Self::from_toml_str(&source)?;
		tracing::debug!(path = %path.display(), "loaded dispatcher settings");
		Ok(settings)
	}

	/// Deadline for sync commands.
	pub fn sync_timeout(&self) -> Duration {
		Duration::from_millis(self.sync_timeout_ms)
	}

	fn validate(&self) -> Result<(), SettingsError> {
		if self.gram_length == 0 {
			return Err(SettingsError::Invalid {
				key: "gram-length",
				reason: "must be at least 1".to_string(),
			});
		}
		if !self.suggestion_threshold.is_finite() || self.suggestion_threshold < 0.0 {
			return Err(SettingsError::Invalid {
				key: "suggestion-threshold",
				reason: format!("{} is not a non-negative number", self.suggestion_threshold),
			});
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn empty_document_yields_defaults() {
		assert_eq!(Settings::from_toml_str("").unwrap(), Settings::default());
	}

	#[test]
	fn partial_document_overrides_keys() {
		let settings = Settings::from_toml_str("debug-matching = true\nsync-timeout-ms = 250\n").unwrap();
		assert_eq!(
			settings,
			Settings {
				debug_matching: true,
				sync_timeout_ms: 250,
				..Settings::default()
			}
		);
		assert_eq!(settings.sync_timeout(), Duration::from_millis(250));
	}

	#[test]
	fn unknown_keys_are_rejected() {
		assert!(matches!(Settings::from_toml_str("debug = true"), Err(SettingsError::Toml(_))));
	}

	#[test]
	fn zero_gram_length_is_invalid() {
		let err = Settings::from_toml_str("gram-length = 0").unwrap_err();
		assert!(matches!(err, SettingsError::Invalid { key: "gram-length", .. }));
	}

	#[test]
	fn load_reads_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("dispatch.toml");
		std::fs::write(&path, "max-suggestions = 2\nfeedback = false\n").unwrap();
		let settings = Settings::load(&path).unwrap();
		assert_eq!(settings.max_suggestions, 2);
		assert!(!settings.feedback);
	}

	#[test]
	fn load_reports_missing_file() {
		let err = Settings::load("/nonexistent/trellis/dispatch.toml").unwrap_err();
		assert!(matches!(err, SettingsError::Io { .. }));
	}
}
