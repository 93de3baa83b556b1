//! Repository name matching.
//!
//! A pattern is tried as a regular expression first, then as a shell glob,
//! then as a plain substring. The first tier that matches wins.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Which rule accepted a name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchTier {
    /// The pattern compiled as a regex that found a match in the name
    Regex,
    /// The pattern is a glob that matched the whole name
    Glob,
    /// The name contains the pattern verbatim
    Literal,
}

impl fmt::Display for MatchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchTier::Regex => write!(f, "regex"),
            MatchTier::Glob => write!(f, "glob"),
            MatchTier::Literal => write!(f, "literal"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("Invalid regex pattern '{pattern}': {message}")]
    InvalidRegex { pattern: String, message: String },
}

/// A successfully compiled regular expression
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    regex: Regex,
}

impl CompiledPattern {
    pub fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

/// Compile `pattern` as a regular expression. The empty pattern matches everything.
pub fn compile_regex(pattern: &str) -> Result<CompiledPattern, PatternError> {
    Regex::new(pattern)
        .map(|regex| CompiledPattern { regex })
        .map_err(|e| PatternError::InvalidRegex {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
}

const REGEX_ONLY_CHARS: &[char] = &['^', '$', '+', '(', ')', '[', ']', '{', '}', '|', '\\'];

/// True when `pattern` uses glob wildcards and nothing that only makes sense as a regex.
///
/// A `.` directly followed by `*` or `?` is the regex "any character" form, so
/// `test-.*` is a regex while `*.rs` stays a glob.
pub fn is_glob_only(pattern: &str) -> bool {
    has_glob_wildcard(pattern)
        && !pattern.contains(REGEX_ONLY_CHARS)
        && !has_regex_dot_quantifier(pattern)
}

fn has_regex_dot_quantifier(pattern: &str) -> bool {
    pattern
        .as_bytes()
        .windows(2)
        .any(|pair| pair[0] == b'.' && matches!(pair[1], b'*' | b'?'))
}

fn has_glob_wildcard(pattern: &str) -> bool {
    pattern.contains(['*', '?'])
}

/// A pattern with its regex and glob forms compiled once
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    raw: String,
    regex: Option<Regex>,
    glob: Option<glob::Pattern>,
}

impl PatternMatcher {
    pub fn new(pattern: impl Into<String>) -> Self {
        let raw = pattern.into();
        let regex = Regex::new(&raw).ok();
        let glob = if has_glob_wildcard(&raw) {
            glob::Pattern::new(&raw).ok()
        } else {
            None
        };

        Self { raw, regex, glob }
    }

    pub fn pattern(&self) -> &str {
        &self.raw
    }

    /// The first tier accepting `name`, if any
    pub fn classify(&self, name: &str) -> Option<MatchTier> {
        if self.regex.as_ref().is_some_and(|re| re.is_match(name)) {
            return Some(MatchTier::Regex);
        }

        if self.glob.as_ref().is_some_and(|g| g.matches(name)) {
            return Some(MatchTier::Glob);
        }

        if name.contains(self.raw.as_str()) {
            return Some(MatchTier::Literal);
        }

        None
    }

    pub fn matches(&self, name: &str) -> bool {
        self.classify(name).is_some()
    }
}

/// Which tier, if any, accepts `name` under `pattern`
pub fn classify_match(name: &str, pattern: &str) -> Option<MatchTier> {
    PatternMatcher::new(pattern).classify(name)
}

/// Whether `name` matches `pattern` under any tier
pub fn matches_pattern(name: &str, pattern: &str) -> bool {
    classify_match(name, pattern).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_pattern_examples() {
        let cases = [
            ("test-repo", "test-*", true),
            ("prod-repo", "test-*", false),
            ("test-repo-123", "test-repo-[0-9]+", true),
            ("test-repo-abc", "test-repo-[0-9]+", false),
            ("test-repo", "test", true),
            ("prod-repo", "test", false),
        ];

        for (name, pattern, expected) in cases {
            assert_eq!(
                matches_pattern(name, pattern),
                expected,
                "name={} pattern={}",
                name,
                pattern
            );
        }
    }

    #[test]
    fn test_regex_tier_uses_search_semantics() {
        assert_eq!(classify_match("my-api-service", "api"), Some(MatchTier::Regex));
        assert_eq!(classify_match("api-gateway", "^api"), Some(MatchTier::Regex));
        assert_eq!(classify_match("my-api", "^api"), None);
    }

    #[test]
    fn test_glob_tier_when_regex_misses() {
        // "*-service" is not a valid regex (leading repetition)
        assert!(Regex::new("*-service").is_err());
        assert_eq!(classify_match("user-service", "*-service"), Some(MatchTier::Glob));
        assert_eq!(classify_match("user-service-old", "*-service"), None);

        assert_eq!(classify_match("a", "?"), Some(MatchTier::Glob));
        assert_eq!(classify_match("ab", "?"), None);
    }

    #[test]
    fn test_literal_tier_when_pattern_is_not_a_regex() {
        // unbalanced bracket fails both regex and glob compilation
        assert_eq!(classify_match("legacy[v1", "[v1"), Some(MatchTier::Literal));
        assert_eq!(classify_match("legacy", "[v1"), None);
    }

    #[test]
    fn test_empty_pattern_matches_everything() {
        assert!(matches_pattern("anything", ""));
        assert!(matches_pattern("", ""));

        let compiled = compile_regex("").unwrap();
        assert!(compiled.is_match("whatever"));
    }

    #[test]
    fn test_compile_regex_reports_invalid_syntax() {
        let err = compile_regex("[invalid").unwrap_err();
        let PatternError::InvalidRegex { pattern, message } = err;
        assert_eq!(pattern, "[invalid");
        assert!(!message.is_empty());

        assert!(compile_regex("test-.*").unwrap().is_match("test-public"));
    }

    #[test]
    fn test_is_glob_only() {
        assert!(is_glob_only("test-*"));
        assert!(is_glob_only("excluded-*"));
        assert!(is_glob_only("repo-?"));
        assert!(!is_glob_only("test-.*"));
        assert!(is_glob_only("*.rs"));
        assert!(!is_glob_only("^test-*"));
        assert!(!is_glob_only("[abc]*"));
        assert!(!is_glob_only("plain"));
        assert!(!is_glob_only("svc.?-api"));
        assert!(is_glob_only("*.tar.gz"));
    }

    #[test]
    fn test_cached_matcher_agrees_with_fresh_compilation() {
        let patterns = ["test-*", "test-repo-[0-9]+", "test", "[v1", "", "*-x"];
        let names = ["test-repo", "test-repo-123", "prod", "a[v1", "y-x", ""];

        for pattern in patterns {
            let matcher = PatternMatcher::new(pattern);
            assert_eq!(matcher.pattern(), pattern);
            for name in names {
                assert_eq!(
                    matcher.classify(name),
                    classify_match(name, pattern),
                    "name={} pattern={}",
                    name,
                    pattern
                );
            }
        }
    }
}
