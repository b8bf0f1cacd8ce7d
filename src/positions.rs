//! Positional regex rules applied to path segments.
//!
//! A [`RegexPositions`] map keys rules by a signed segment index counted from
//! the end of a file's relative path: `0` is the file name, `1` its parent
//! directory and so on. Indices are reduced modulo the segment count of each
//! file, so one map applies uniformly to files at different depths and
//! negative indices count from the outermost segment.

use crate::error::{FinderError, Result};
use anyhow::{bail, Context};
use regex::{Captures, Regex};
use std::collections::HashMap;

/// Rule attached to one position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionRule {
    /// Extract named capture groups; a failed match may exclude the file.
    Pattern(String),
    /// Ordered `(label, pattern)` candidates. The first matching candidate
    /// sets the row's `info` field.
    Classifier(Vec<(String, String)>),
}

/// Insertion-ordered map from raw segment index to rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegexPositions {
    entries: Vec<(i64, PositionRule)>,
}

impl RegexPositions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the rule at `index`. A replaced rule keeps its
    /// original place in iteration order.
    pub fn insert(&mut self, index: i64, rule: PositionRule) {
        match self.entries.iter_mut().find(|(i, _)| *i == index) {
            Some(entry) => entry.1 = rule,
            None => self.entries.push((index, rule)),
        }
    }

    /// Builder form of [`insert`](Self::insert) for a single pattern.
    pub fn pattern(mut self, index: i64, pattern: impl Into<String>) -> Self {
        self.insert(index, PositionRule::Pattern(pattern.into()));
        self
    }

    /// Builder form of [`insert`](Self::insert) for a classifier.
    pub fn classifier<I, L, P>(mut self, index: i64, candidates: I) -> Self
    where
        I: IntoIterator<Item = (L, P)>,
        L: Into<String>,
        P: Into<String>,
    {
        let candidates = candidates
            .into_iter()
            .map(|(label, pattern)| (label.into(), pattern.into()))
            .collect();
        self.insert(index, PositionRule::Classifier(candidates));
        self
    }

    /// Append a classifier candidate at `index`, creating the classifier if
    /// needed. Replaces a single-pattern rule at the same index.
    pub fn push_class(&mut self, index: i64, label: impl Into<String>, pattern: impl Into<String>) {
        let candidate = (label.into(), pattern.into());
        match self.entries.iter_mut().find(|(i, _)| *i == index) {
            Some((_, PositionRule::Classifier(candidates))) => candidates.push(candidate),
            Some(entry) => entry.1 = PositionRule::Classifier(vec![candidate]),
            None => self
                .entries
                .push((index, PositionRule::Classifier(vec![candidate]))),
        }
    }

    /// Append every entry of `other`, later entries replacing earlier ones.
    pub fn extend(&mut self, other: RegexPositions) {
        for (index, rule) in other.entries {
            self.insert(index, rule);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, &PositionRule)> {
        self.entries.iter().map(|(i, rule)| (*i, rule))
    }

    /// Rules keyed by effective position for a path of `segment_count`
    /// segments. On collision the later entry wins.
    pub fn effective(&self, segment_count: usize) -> HashMap<usize, &PositionRule> {
        let mut effective = HashMap::new();
        if segment_count == 0 {
            return effective;
        }
        let count = segment_count as i64;
        for (index, rule) in &self.entries {
            effective.insert(index.rem_euclid(count) as usize, rule);
        }
        effective
    }
}

/// Regexes compiled on first use and reused for the rest of one query.
#[derive(Debug, Default)]
pub struct PatternCache {
    compiled: HashMap<String, Regex>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiled form of `pattern`, compiling it if this is its first use.
    pub fn get(&mut self, pattern: &str) -> Result<&Regex> {
        if !self.compiled.contains_key(pattern) {
            let regex = Regex::new(pattern).map_err(|source| FinderError::Pattern {
                pattern: pattern.to_string(),
                source,
            })?;
            self.compiled.insert(pattern.to_string(), regex);
        }
        Ok(&self.compiled[pattern])
    }

    /// Whether `pattern` has a leading-anchor match in `segment`.
    pub fn is_match_start(&mut self, pattern: &str, segment: &str) -> Result<bool> {
        Ok(match_start(self.get(pattern)?, segment).is_some())
    }

    /// Named groups of the leading-anchor match of `pattern` in `segment`,
    /// or `None` when it does not match.
    pub fn named_captures(
        &mut self,
        pattern: &str,
        segment: &str,
    ) -> Result<Option<Vec<(String, Option<String>)>>> {
        let regex = self.get(pattern)?;
        Ok(match_start(regex, segment).map(|caps| named_groups(regex, &caps)))
    }
}

/// Match `regex` at the start of `haystack` without requiring it to consume
/// the whole string.
///
/// Leftmost-first search returns the earliest starting match, so a match
/// anchored at offset 0 exists exactly when the leftmost match starts there.
pub fn match_start<'h>(regex: &Regex, haystack: &'h str) -> Option<Captures<'h>> {
    regex
        .captures(haystack)
        .filter(|caps| caps.get(0).map_or(false, |m| m.start() == 0))
}

/// Named groups of a match. Groups that did not participate yield `None`.
pub fn named_groups(regex: &Regex, caps: &Captures<'_>) -> Vec<(String, Option<String>)> {
    regex
        .capture_names()
        .flatten()
        .map(|name| {
            (
                name.to_string(),
                caps.name(name).map(|m| m.as_str().to_string()),
            )
        })
        .collect()
}

/// Parse a `POS=REGEX` command-line argument.
pub fn parse_pattern_arg(arg: &str) -> anyhow::Result<(i64, String)> {
    let (position, pattern) = arg
        .split_once('=')
        .with_context(|| format!("Expected POS=REGEX, got: {}", arg))?;
    let position = parse_position(position)?;
    Ok((position, pattern.to_string()))
}

/// Parse a `POS:LABEL=REGEX` command-line argument.
pub fn parse_classifier_arg(arg: &str) -> anyhow::Result<(i64, String, String)> {
    let (head, pattern) = arg
        .split_once('=')
        .with_context(|| format!("Expected POS:LABEL=REGEX, got: {}", arg))?;
    let (position, label) = head
        .split_once(':')
        .with_context(|| format!("Expected POS:LABEL=REGEX, got: {}", arg))?;
    if label.is_empty() {
        bail!("Empty classifier label in: {}", arg);
    }
    Ok((parse_position(position)?, label.to_string(), pattern.to_string()))
}

fn parse_position(position: &str) -> anyhow::Result<i64> {
    position
        .trim()
        .parse()
        .with_context(|| format!("Invalid segment position: {:?}", position))
}
