use serde::Serialize;
use thiserror::Error;

use crate::domain::entities::repository::VisibilityRepository;
use crate::domain::value_objects::name_pattern::{
    compile_regex, is_glob_only, PatternError, PatternMatcher,
};
use crate::domain::value_objects::visibility::{VisibilityError, VisibilityFilter};

/// Errors raised while building a [`RepositoryFilter`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// Unknown visibility token
    #[error(transparent)]
    Visibility(#[from] VisibilityError),

    /// The name pattern looks like a regex but does not compile
    #[error(transparent)]
    Pattern(#[from] PatternError),
}

/// Visibility, name and exclusion rules applied to repository listings
#[derive(Debug, Clone, Serialize)]
pub struct RepositoryFilter {
    visibility_filter: VisibilityFilter,
    name_pattern: Option<String>,
    exclude_patterns: Vec<String>,
    include_archived: bool,
    include_forks: bool,
    #[serde(skip)]
    name_matcher: Option<PatternMatcher>,
    #[serde(skip)]
    exclude_matchers: Vec<PatternMatcher>,
}

impl Default for RepositoryFilter {
    fn default() -> Self {
        Self::from_parts(VisibilityFilter::default(), None, Vec::new())
    }
}

impl RepositoryFilter {
    /// Build a filter, validating the visibility token and the name pattern.
    ///
    /// An empty name pattern is treated as absent. A name pattern made only of
    /// glob wildcards is accepted without regex validation. Exclude patterns are
    /// never validated; invalid ones still match through the glob and literal tiers.
    pub fn new(
        visibility: &str,
        name_pattern: Option<&str>,
        exclude_patterns: Vec<String>,
    ) -> Result<Self, FilterError> {
        let visibility_filter = VisibilityFilter::new(visibility)?;

        let name_pattern = name_pattern.filter(|p| !p.is_empty());
        if let Some(pattern) = name_pattern {
            if !is_glob_only(pattern) {
                compile_regex(pattern)?;
            }
        }

        Ok(Self::from_parts(
            visibility_filter,
            name_pattern.map(str::to_string),
            exclude_patterns,
        ))
    }

    /// Build a filter from an already constructed visibility filter without validation
    pub fn from_parts(
        visibility_filter: VisibilityFilter,
        name_pattern: Option<String>,
        exclude_patterns: Vec<String>,
    ) -> Self {
        let name_matcher = name_pattern.as_deref().map(PatternMatcher::new);
        let exclude_matchers = exclude_patterns
            .iter()
            .map(|p| PatternMatcher::new(p.as_str()))
            .collect();

        Self {
            visibility_filter,
            name_pattern,
            exclude_patterns,
            include_archived: true,
            include_forks: true,
            name_matcher,
            exclude_matchers,
        }
    }

    /// Keep or drop archived repositories. Filters keep them unless told otherwise.
    pub fn with_archived(mut self, include: bool) -> Self {
        self.include_archived = include;
        self
    }

    /// Keep or drop forks. Filters keep them unless told otherwise.
    pub fn with_forks(mut self, include: bool) -> Self {
        self.include_forks = include;
        self
    }

    pub fn visibility_filter(&self) -> &VisibilityFilter {
        &self.visibility_filter
    }

    pub fn name_pattern(&self) -> Option<&str> {
        self.name_pattern.as_deref()
    }

    pub fn exclude_patterns(&self) -> &[String] {
        &self.exclude_patterns
    }

    pub fn includes_archived(&self) -> bool {
        self.include_archived
    }

    pub fn includes_forks(&self) -> bool {
        self.include_forks
    }

    /// Whether `repo` passes archive, fork, visibility, name and exclusion rules.
    /// Exclusion wins.
    pub fn should_include_repository(&self, repo: &VisibilityRepository) -> bool {
        if (repo.is_archived && !self.include_archived) || (repo.is_fork && !self.include_forks) {
            return false;
        }

        if !self
            .visibility_filter
            .should_include_repository(repo.is_private)
        {
            return false;
        }

        if let Some(matcher) = &self.name_matcher {
            if !matcher.matches(&repo.name) {
                return false;
            }
        }

        !self
            .exclude_matchers
            .iter()
            .any(|matcher| matcher.matches(&repo.name))
    }

    /// Keep the repositories accepted by this filter, preserving their order
    pub fn filter_repositories(&self, repos: &[VisibilityRepository]) -> Vec<VisibilityRepository> {
        repos
            .iter()
            .filter(|repo| self.should_include_repository(repo))
            .cloned()
            .collect()
    }

    /// One line description, e.g. `visibility=private, pattern=prod-.*, exclude=a-*,b-*`
    pub fn filter_summary(&self) -> String {
        let mut parts = vec![format!("visibility={}", self.visibility_filter)];

        if let Some(pattern) = &self.name_pattern {
            parts.push(format!("pattern={}", pattern));
        }

        if !self.exclude_patterns.is_empty() {
            parts.push(format!("exclude={}", self.exclude_patterns.join(",")));
        }

        let skipped: Vec<&str> = [
            (!self.include_archived).then_some("archived"),
            (!self.include_forks).then_some("forks"),
        ]
        .into_iter()
        .flatten()
        .collect();
        if !skipped.is_empty() {
            parts.push(format!("skip={}", skipped.join(",")));
        }

        parts.join(", ")
    }
}
