//! Group results by URL into named buckets.
//!
//! A [`BucketCollection`] is built from an ordered list of
//! [`BucketDefinition`]s. Every result added to the collection is tested
//! against the definitions in order and lands in the bucket of the first one
//! whose rule matches its URL. Results matching no rule land in the catch-all
//! bucket, so each result ends up in exactly one bucket.
//!
//! Definitions are written `LABEL=PREFIX` to match URLs starting with a prefix,
//! or `LABEL=~REGEX` to match URLs against a regular expression:
//! ```rust
//! use korra::bucket::{BucketCollection, BucketDefinition};
//! use korra::result::AttackResult;
//! use std::time::Duration;
//!
//! let definitions = vec![
//!     "api=http://localhost/api/".parse::<BucketDefinition>().unwrap(),
//!     "images=~\\.(png|jpg)$".parse::<BucketDefinition>().unwrap(),
//! ];
//! let mut collection = BucketCollection::new(definitions).unwrap();
//! collection.add_results(&[
//!     AttackResult::new("http://localhost/api/users", 200, Duration::from_millis(10)),
//!     AttackResult::new("http://localhost/logo.png", 200, Duration::from_millis(5)),
//!     AttackResult::new("http://localhost/", 200, Duration::from_millis(15)),
//! ]);
//! assert_eq!(collection.buckets()[0].results.len(), 1);
//! assert_eq!(collection.buckets()[1].results.len(), 1);
//! assert_eq!(collection.catch_all_bucket().unwrap().results.len(), 1);
//! ```

use itertools::Itertools;
use regex::{Regex, RegexSet};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::result::AttackResult;
use crate::KorraError;

/// How a bucket decides whether a URL belongs to it.
#[derive(Debug, Clone)]
pub enum BucketRule {
    /// URLs starting with this string.
    Prefix(String),
    /// URLs matching this regular expression anywhere.
    Pattern(Regex),
}
impl BucketRule {
    /// The rule as a regular expression, prefixes are escaped and anchored.
    fn as_regex(&self) -> String {
        match self {
            BucketRule::Prefix(prefix) => format!("^{}", regex::escape(prefix)),
            BucketRule::Pattern(pattern) => pattern.as_str().to_string(),
        }
    }
}
impl fmt::Display for BucketRule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BucketRule::Prefix(prefix) => f.write_str(prefix),
            BucketRule::Pattern(pattern) => write!(f, "~{}", pattern.as_str()),
        }
    }
}

/// A labelled rule, one per named bucket.
#[derive(Debug, Clone)]
pub struct BucketDefinition {
    pub label: String,
    pub rule: BucketRule,
}
impl BucketDefinition {
    pub fn new(label: &str, rule: BucketRule) -> Self {
        BucketDefinition {
            label: label.to_string(),
            rule,
        }
    }
}
/// Allow `--bucket LABEL=PREFIX` and `--bucket LABEL=~REGEX` from the command line.
impl FromStr for BucketDefinition {
    type Err = KorraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |detail: String| KorraError::InvalidOption {
            option: "--bucket".to_string(),
            value: s.to_string(),
            detail,
        };
        let (label, rule) = match s.find('=') {
            Some(position) => (s[..position].trim(), &s[position + 1..]),
            None => return Err(invalid("expected LABEL=PREFIX or LABEL=~REGEX".to_string())),
        };
        if label.is_empty() {
            return Err(invalid("bucket label must not be empty".to_string()));
        }
        let rule = match rule.strip_prefix('~') {
            Some(pattern) => {
                BucketRule::Pattern(Regex::new(pattern).map_err(|e| invalid(e.to_string()))?)
            }
            None if rule.is_empty() => {
                return Err(invalid("bucket rule must not be empty".to_string()))
            }
            None => BucketRule::Prefix(rule.to_string()),
        };
        Ok(BucketDefinition::new(label, rule))
    }
}
impl fmt::Display for BucketDefinition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}={}", self.label, self.rule)
    }
}

/// A named partition of results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bucket {
    pub label: String,
    /// Results in the order they were added.
    pub results: Vec<AttackResult>,
    /// How many results were seen for each exact URL.
    pub urls: BTreeMap<String, usize>,
}
impl Bucket {
    pub fn new(label: &str) -> Self {
        Bucket {
            label: label.to_string(),
            ..Default::default()
        }
    }

    fn add(&mut self, result: &AttackResult) {
        *self.urls.entry(result.url.clone()).or_insert(0) += 1;
        self.results.push(result.clone());
    }
}
impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Named buckets, in definition order, plus a catch-all.
///
/// The collection accumulates: adding the same results twice stores them
/// twice. Build a new collection for each report.
#[derive(Debug, Clone)]
pub struct BucketCollection {
    rules: RegexSet,
    buckets: Vec<Bucket>,
    catch_all: Bucket,
}
impl BucketCollection {
    /// Label of the bucket holding results that match no definition.
    pub const CATCH_ALL: &'static str = "Remaining";

    pub fn new(definitions: Vec<BucketDefinition>) -> Result<Self, KorraError> {
        let rules = RegexSet::new(definitions.iter().map(|d| d.rule.as_regex())).map_err(|e| {
            KorraError::InvalidOption {
                option: "--bucket".to_string(),
                value: definitions.iter().join(" "),
                detail: e.to_string(),
            }
        })?;
        let buckets = definitions.iter().map(|d| Bucket::new(&d.label)).collect();
        Ok(BucketCollection {
            rules,
            buckets,
            catch_all: Bucket::new(BucketCollection::CATCH_ALL),
        })
    }

    /// Index of the first definition matching `url`, if any.
    pub fn matching(&self, url: &str) -> Option<usize> {
        self.rules.matches(url).iter().next()
    }

    /// Sort results into buckets, appending to what was added before.
    pub fn add_results(&mut self, results: &[AttackResult]) {
        for result in results {
            match self.matching(&result.url) {
                Some(index) => self.buckets[index].add(result),
                None => self.catch_all.add(result),
            }
        }
        trace!(
            "added {} results, {} unmatched so far",
            results.len(),
            self.catch_all.results.len()
        );
    }

    /// Named buckets in definition order, including empty ones.
    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    /// The catch-all bucket, or `None` while every result matched a definition.
    pub fn catch_all_bucket(&self) -> Option<&Bucket> {
        if self.catch_all.results.is_empty() {
            None
        } else {
            Some(&self.catch_all)
        }
    }
}
