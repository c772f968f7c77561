//! Repository reference parsing
//!
//! Accepts `owner/repo`, `https://github.com/owner/repo`,
//! `git@github.com:owner/repo`, each with an optional `.git` suffix.

use crate::error::{OutlierError, Result};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Owner and name of a hosted repository
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
}

fn url_patterns() -> &'static [Regex; 2] {
    static PATTERNS: OnceLock<[Regex; 2]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r"^https?://github\.com/([^/]+)/([^/]+)").expect("valid https pattern"),
            Regex::new(r"^git@github\.com:([^/]+)/([^/]+)").expect("valid ssh pattern"),
        ]
    })
}

impl RepositoryRef {
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.strip_suffix(".git").unwrap_or(input);

        for pattern in url_patterns() {
            if let Some(caps) = pattern.captures(input) {
                return Ok(Self {
                    owner: caps[1].to_string(),
                    name: caps[2].to_string(),
                });
            }
        }

        match input.split_once('/') {
            Some((owner, name)) if !owner.trim().is_empty() && !name.trim().is_empty() => {
                Ok(Self {
                    owner: owner.trim().to_string(),
                    name: name.trim().to_string(),
                })
            }
            _ => Err(OutlierError::Validation(format!(
                "Invalid repository format: {} (expected owner/repo or GitHub URL)",
                input
            ))),
        }
    }

    /// `owner/name`, the key records are stored under
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
