//! Wildcard module-name patterns.
//!
//! This module selects which cataloged modules are inspected by matching
//! their bare names against user patterns.

use regex::{Regex, RegexBuilder};

use crate::error::{LibcheckError, Result};
use crate::module::ModuleRecord;

/// A compiled wildcard pattern.
#[derive(Debug, Clone)]
pub struct NamePattern {
    /// The pattern as the user wrote it.
    pub source: String,
    regex: Regex,
}

impl NamePattern {
    /// Compile a pattern where `*` matches any run of characters and `?`
    /// matches exactly one.
    ///
    /// The result matches anywhere inside a name, ignoring case.
    pub fn new(pattern: &str) -> Result<Self> {
        let mut re = String::from("^.*");
        for c in pattern.chars() {
            match c {
                '*' => re.push_str(".*"),
                '?' => re.push('.'),
                other => re.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
            }
        }
        re.push_str(".*$");

        let regex = RegexBuilder::new(&re)
            .case_insensitive(true)
            .build()
            .map_err(|e| LibcheckError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

/// Selects modules whose name matches any of a set of patterns.
///
/// # Example
///
/// ```
/// use libcheck::filter::PatternFilter;
///
/// let filter = PatternFilter::new(["Foo.*", "Bar.Service"]).unwrap();
///
/// assert!(filter.matches("Foo.Core"));
/// assert!(filter.matches("XFoo.Core"));
/// assert!(filter.matches("bar.service.client"));
/// assert!(!filter.matches("Baz"));
/// ```
#[derive(Debug, Clone)]
pub struct PatternFilter {
    patterns: Vec<NamePattern>,
}

impl PatternFilter {
    /// Compile all patterns. At least one is required.
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| NamePattern::new(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        if patterns.is_empty() {
            return Err(LibcheckError::NoPatterns);
        }
        Ok(Self { patterns })
    }

    pub fn patterns(&self) -> &[NamePattern] {
        &self.patterns
    }

    /// Whether `name` matches at least one pattern.
    pub fn matches(&self, name: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(name))
    }

    /// The records to inspect, in input order.
    pub fn select<'a, I>(&self, records: I) -> Vec<&'a ModuleRecord>
    where
        I: IntoIterator<Item = &'a ModuleRecord>,
    {
        records
            .into_iter()
            .filter(|r| self.matches(r.name()))
            .collect()
    }
}
