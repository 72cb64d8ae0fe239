//! Default Configuration
//!
//! Interpolation delimiters and their validation.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static UNUSABLE_INTERPOLATION_REGEXPS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"^\s*$").expect("valid regex"),      // empty
        Regex::new(r"[<>]").expect("valid regex"),       // html tag
        Regex::new(r"^[{}]$").expect("valid regex"),     // lone brace
        Regex::new(r"&(#|[a-z])").expect("valid regex"), // character reference
        Regex::new(r"^//").expect("valid regex"),        // comment
    ]
});

/// Interpolation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpolationConfig {
    pub start: String,
    pub end: String,
}

impl InterpolationConfig {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        InterpolationConfig {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Builds a config from `[start, end]` markers; `None` yields `{{ }}`.
    pub fn from_array(markers: Option<&[String]>) -> Result<Self, String> {
        match markers {
            None => Ok(Self::default()),
            Some(m) => {
                if m.len() != 2 {
                    return Err("Expected 'interpolation' to be an array, [start, end].".to_string());
                }
                let config = InterpolationConfig::new(m[0].clone(), m[1].clone());
                config.validate()?;
                Ok(config)
            }
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        for regexp in UNUSABLE_INTERPOLATION_REGEXPS.iter() {
            if regexp.is_match(&self.start) || regexp.is_match(&self.end) {
                return Err(format!(
                    "['{}', '{}'] contains unusable interpolation symbol.",
                    self.start, self.end
                ));
            }
        }
        Ok(())
    }
}

impl Default for InterpolationConfig {
    fn default() -> Self {
        InterpolationConfig::new("{{", "}}")
    }
}
