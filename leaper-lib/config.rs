//! User configuration.
//!
//! ```toml
//! decorate-all   = false
//! detected-pairs = ["()", "[]", "{}", "<>", "``", "''", "\"\""]
//!
//! [decoration]
//! outline-color = "editorBracketMatch.border"
//! outline-width = "1px"
//! outline-style = "solid"
//! font-weight   = "bolder"
//! ```

use leaper_core::Tendril;
use serde::{
  Deserialize,
  Serialize,
};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
  #[error("invalid leaper config: {0}")]
  BadConfig(#[from] toml::de::Error),
}

/// How a tracked closing side is decorated. Values are passed to the host
/// untouched; `None` leaves the property to the host's default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct DecorationStyle {
  pub outline_color:    Option<String>,
  pub outline_width:    Option<String>,
  pub outline_style:    Option<String>,
  pub font_weight:      Option<String>,
  pub color:            Option<String>,
  pub background_color: Option<String>,
}

impl Default for DecorationStyle {
  fn default() -> Self {
    Self {
      outline_color:    Some("editorBracketMatch.border".into()),
      outline_width:    Some("1px".into()),
      outline_style:    Some("solid".into()),
      font_weight:      Some("bolder".into()),
      color:            None,
      background_color: None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Config {
  pub decorate_all:   bool,
  pub detected_pairs: Vec<String>,
  pub decoration:     DecorationStyle,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      decorate_all:   false,
      detected_pairs: ["()", "[]", "{}", "<>", "``", "''", "\"\""]
        .into_iter()
        .map(String::from)
        .collect(),
      decoration:     DecorationStyle::default(),
    }
  }
}

impl Config {
  pub fn from_toml(source: &str) -> Result<Self> {
    Ok(toml::from_str(source)?)
  }

  /// The usable entries of `detected_pairs`.
  pub fn detected_pairs(&self) -> DetectedPairs {
    DetectedPairs::new(&self.detected_pairs)
  }
}

/// Validated set of two-character pairs.
///
/// Each side must be a single UTF-16 code unit, so that `close = open + 1`
/// holds for every tracked pair.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DetectedPairs {
  pairs: Vec<Tendril>,
}

impl DetectedPairs {
  pub fn new<S: AsRef<str>>(entries: &[S]) -> Self {
    let mut pairs: Vec<Tendril> = Vec::with_capacity(entries.len());
    for entry in entries {
      let entry = entry.as_ref();
      let mut chars = entry.chars();
      let valid = match (chars.next(), chars.next(), chars.next()) {
        (Some(open), Some(close), None) => open.len_utf16() == 1 && close.len_utf16() == 1,
        _ => false,
      };
      if !valid {
        tracing::warn!(entry, "ignoring detected pair: expected two single-unit characters");
        continue;
      }
      if !pairs.iter().any(|pair| pair.as_str() == entry) {
        pairs.push(entry.into());
      }
    }
    Self { pairs }
  }

  pub fn contains(&self, text: &str) -> bool {
    self.pairs.iter().any(|pair| pair.as_str() == text)
  }

  pub fn len(&self) -> usize {
    self.pairs.len()
  }

  pub fn is_empty(&self) -> bool {
    self.pairs.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &str> {
    self.pairs.iter().map(Tendril::as_str)
  }
}
