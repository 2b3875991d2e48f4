//! Serving mode

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// How the dev server produces pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Mode {
	/// Serve source files as they are
	#[default]
	Csr,
	/// Render HTML pages on every request
	Ssr,
	/// Serve the output of a static build
	Ssg,
}

impl Mode {
	pub fn as_str(&self) -> &'static str {
		match self {
			Mode::Csr => "csr",
			Mode::Ssr => "ssr",
			Mode::Ssg => "ssg",
		}
	}
}

impl fmt::Display for Mode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Mode {
	type Err = SettingsError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"csr" => Ok(Mode::Csr),
			"ssr" => Ok(Mode::Ssr),
			"ssg" => Ok(Mode::Ssg),
			_ => Err(SettingsError::UnknownMode(s.to_string())),
		}
	}
}

impl TryFrom<String> for Mode {
	type Error = SettingsError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		value.parse()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("csr", Mode::Csr)]
	#[case("SSR", Mode::Ssr)]
	#[case(" Ssg ", Mode::Ssg)]
	fn test_parse_mode(#[case] input: &str, #[case] expected: Mode) {
		assert_eq!(input.parse::<Mode>().unwrap(), expected);
	}

	#[rstest]
	fn test_unknown_mode() {
		let err = "spa".parse::<Mode>().unwrap_err();
		assert_eq!(err.to_string(), "unknown mode \"spa\" (expected csr, ssr or ssg)");
	}

	#[rstest]
	fn test_display_round_trips() {
		for mode in [Mode::Csr, Mode::Ssr, Mode::Ssg] {
			assert_eq!(mode.to_string().parse::<Mode>().unwrap(), mode);
		}
	}
}
