use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Token accepted for public-only filtering
pub const VISIBILITY_PUBLIC: &str = "public";
/// Token accepted for private-only filtering
pub const VISIBILITY_PRIVATE: &str = "private";
/// Token accepted for no visibility filtering
pub const VISIBILITY_ALL: &str = "all";

/// Repository visibility class used for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Only public repositories
    Public,
    /// Only private repositories
    Private,
    /// Every repository
    All,
}

impl Default for Visibility {
    fn default() -> Self {
        Self::All
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = VisibilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_visibility(s).as_str() {
            VISIBILITY_PUBLIC => Ok(Visibility::Public),
            VISIBILITY_PRIVATE => Ok(Visibility::Private),
            VISIBILITY_ALL => Ok(Visibility::All),
            _ => Err(VisibilityError::InvalidVisibility(s.to_string())),
        }
    }
}

impl Visibility {
    /// Canonical lowercase token
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => VISIBILITY_PUBLIC,
            Visibility::Private => VISIBILITY_PRIVATE,
            Visibility::All => VISIBILITY_ALL,
        }
    }
}

/// Errors raised while building a visibility filter
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VisibilityError {
    #[error("Invalid visibility '{0}'. Supported values are: public, private, all")]
    InvalidVisibility(String),
}

/// Trim and lowercase a visibility token. An empty token means `all`.
pub fn normalize_visibility(raw: &str) -> String {
    let normalized = raw.trim().to_lowercase();
    if normalized.is_empty() {
        VISIBILITY_ALL.to_string()
    } else {
        normalized
    }
}

/// Whether `raw` names one of the supported visibility tokens.
///
/// The empty string is rejected here even though it normalizes to `all`.
pub fn is_valid_visibility(raw: &str) -> bool {
    matches!(
        raw.trim().to_lowercase().as_str(),
        VISIBILITY_PUBLIC | VISIBILITY_PRIVATE | VISIBILITY_ALL
    )
}

/// Visibility filter built from a user supplied token.
///
/// Deserialization goes through [`VisibilityFilter::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VisibilityFilter {
    filter: String,
}

impl Default for VisibilityFilter {
    fn default() -> Self {
        Self {
            filter: VISIBILITY_ALL.to_string(),
        }
    }
}

impl VisibilityFilter {
    /// Normalize and validate `raw`
    pub fn new(raw: &str) -> Result<Self, VisibilityError> {
        let normalized = normalize_visibility(raw);
        if !is_valid_visibility(&normalized) {
            return Err(VisibilityError::InvalidVisibility(raw.to_string()));
        }
        Ok(Self { filter: normalized })
    }

    /// Store `raw` verbatim, skipping normalization and validation.
    ///
    /// Filters built this way with an unknown token include every repository.
    pub fn unchecked(raw: impl Into<String>) -> Self {
        Self { filter: raw.into() }
    }

    /// The stored token
    pub fn as_str(&self) -> &str {
        &self.filter
    }

    /// Parsed visibility, `None` for an unrecognized stored token
    pub fn visibility(&self) -> Option<Visibility> {
        match self.filter.as_str() {
            VISIBILITY_PUBLIC => Some(Visibility::Public),
            VISIBILITY_PRIVATE => Some(Visibility::Private),
            VISIBILITY_ALL => Some(Visibility::All),
            _ => None,
        }
    }

    pub fn should_include_repository(&self, is_private: bool) -> bool {
        match self.visibility() {
            Some(Visibility::All) => true,
            Some(Visibility::Public) => !is_private,
            Some(Visibility::Private) => is_private,
            // unknown tokens fail open
            None => true,
        }
    }
}

impl From<Visibility> for VisibilityFilter {
    fn from(visibility: Visibility) -> Self {
        Self {
            filter: visibility.as_str().to_string(),
        }
    }
}

impl TryFrom<String> for VisibilityFilter {
    type Error = VisibilityError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(&raw)
    }
}

impl From<VisibilityFilter> for String {
    fn from(filter: VisibilityFilter) -> Self {
        filter.filter
    }
}

impl fmt::Display for VisibilityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.filter)
    }
}
