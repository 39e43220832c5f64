// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Hint-Pruned Multi-Regex Matcher
 * Classifies bodies against large pattern tables without paying the
 * full regex cost for non-candidate inputs
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::warn;

use crate::errors::{EngineError, EngineResult};

/// Set-wide matching flags. Applied uniformly to every pattern in a set,
/// never per-entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchConfig {
    #[serde(default)]
    pub case_insensitive: bool,

    /// Let `.` match newlines, for patterns spanning rendered source
    #[serde(default)]
    pub dot_matches_newline: bool,

    /// Minimum length for a derived hint to be worth keeping
    #[serde(default = "default_min_hint_len")]
    pub min_hint_len: usize,
}

fn default_min_hint_len() -> usize {
    2
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            case_insensitive: false,
            dot_matches_newline: false,
            min_hint_len: default_min_hint_len(),
        }
    }
}

/// One pattern with its classification tags and pruning hint. Immutable
/// once the set is built.
#[derive(Debug, Clone)]
pub struct PatternEntry {
    pub pattern: String,
    pub is_literal: bool,
    pub tags: BTreeSet<String>,
    /// Literal substring guaranteed to appear in any text the pattern can
    /// match; None means the pattern is always attempted
    pub hint: Option<String>,
}

/// One match produced by a query. Owned by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub matched_text: String,
    pub pattern_index: usize,
    pub tags: BTreeSet<String>,
}

enum CompiledKind {
    Regex(Regex),
    /// Case-folded when the set is case-insensitive
    Literal(String),
}

struct CompiledEntry {
    kind: CompiledKind,
    entry: PatternEntry,
    /// Hint pre-folded to match the folded haystack
    hint_folded: Option<String>,
}

/// Builder for a pattern set. Entries keep declaration order, which is
/// also the order query results are yielded in.
#[derive(Default)]
pub struct PatternSetBuilder {
    entries: Vec<(String, bool, BTreeSet<String>, Option<String>)>,
}

impl PatternSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn regex(mut self, pattern: impl Into<String>, tags: &[&str]) -> Self {
        self.entries
            .push((pattern.into(), false, to_tag_set(tags), None));
        self
    }

    /// Regex entry with an explicit hint, overriding derivation
    pub fn regex_with_hint(
        mut self,
        pattern: impl Into<String>,
        tags: &[&str],
        hint: impl Into<String>,
    ) -> Self {
        self.entries
            .push((pattern.into(), false, to_tag_set(tags), Some(hint.into())));
        self
    }

    pub fn literal(mut self, needle: impl Into<String>, tags: &[&str]) -> Self {
        self.entries
            .push((needle.into(), true, to_tag_set(tags), None));
        self
    }

    /// Compile the set. A malformed pattern fails here, never during
    /// scanning.
    pub fn build(self, config: MatchConfig) -> EngineResult<MultiPatternMatcher> {
        let mut compiled = Vec::with_capacity(self.entries.len());
        let mut hintless = Vec::new();

        for (index, (pattern, is_literal, tags, explicit_hint)) in
            self.entries.into_iter().enumerate()
        {
            let (kind, hint) = if is_literal {
                let folded = fold(&pattern, config.case_insensitive);
                let hint = explicit_hint.or_else(|| Some(pattern.clone()));
                (CompiledKind::Literal(folded), hint)
            } else {
                let regex = RegexBuilder::new(&pattern)
                    .case_insensitive(config.case_insensitive)
                    .dot_matches_new_line(config.dot_matches_newline)
                    .build()
                    .map_err(|err| EngineError::InvalidPattern {
                        pattern: pattern.clone(),
                        reason: err.to_string(),
                    })?;
                let hint =
                    explicit_hint.or_else(|| derive_hint(&pattern, config.min_hint_len));
                (CompiledKind::Regex(regex), hint)
            };

            if hint.is_none() {
                hintless.push(index);
            }

            let hint_folded = hint
                .as_deref()
                .map(|h| fold(h, config.case_insensitive));

            compiled.push(CompiledEntry {
                kind,
                entry: PatternEntry {
                    pattern,
                    is_literal,
                    tags,
                    hint,
                },
                hint_folded,
            });
        }

        if !hintless.is_empty() {
            // Non-fatal: some patterns are legitimately broad, but each one
            // pays full matching cost on every body
            let offenders: Vec<&str> = hintless
                .iter()
                .map(|&i| compiled[i].entry.pattern.as_str())
                .collect();
            warn!(
                "{} pattern(s) have no hint and will be attempted on every body: {:?}",
                offenders.len(),
                offenders
            );
        }

        Ok(MultiPatternMatcher {
            config,
            compiled,
            hintless,
        })
    }
}

fn to_tag_set(tags: &[&str]) -> BTreeSet<String> {
    tags.iter().map(|t| t.to_string()).collect()
}

fn fold(s: &str, case_insensitive: bool) -> String {
    if case_insensitive {
        s.to_ascii_lowercase()
    } else {
        s.to_string()
    }
}

/// Compiled pattern set. Read-only after construction; safe to share
/// across concurrent scans without locking.
pub struct MultiPatternMatcher {
    config: MatchConfig,
    compiled: Vec<CompiledEntry>,
    hintless: Vec<usize>,
}

impl MultiPatternMatcher {
    pub fn builder() -> PatternSetBuilder {
        PatternSetBuilder::new()
    }

    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &PatternEntry> {
        self.compiled.iter().map(|c| &c.entry)
    }

    /// Diagnostic: patterns that will be attempted against every body
    /// because no hint could be supplied or derived
    pub fn hintless_patterns(&self) -> Vec<&str> {
        self.hintless
            .iter()
            .map(|&i| self.compiled[i].entry.pattern.as_str())
            .collect()
    }

    /// Lazily yield the first match of each entry present in `body`, in
    /// declaration order. Entries whose hint is absent from the body are
    /// never attempted.
    pub fn query<'a>(&'a self, body: &'a str) -> MatchIter<'a> {
        let folded_body = if self.config.case_insensitive {
            Some(body.to_ascii_lowercase())
        } else {
            None
        };
        MatchIter {
            matcher: self,
            body,
            folded_body,
            next_index: 0,
        }
    }

    /// First accepted match, if any
    pub fn find(&self, body: &str) -> Option<MatchResult> {
        self.query(body).next()
    }
}

pub struct MatchIter<'a> {
    matcher: &'a MultiPatternMatcher,
    body: &'a str,
    folded_body: Option<String>,
    next_index: usize,
}

impl<'a> Iterator for MatchIter<'a> {
    type Item = MatchResult;

    fn next(&mut self) -> Option<MatchResult> {
        while self.next_index < self.matcher.compiled.len() {
            let index = self.next_index;
            self.next_index += 1;

            let compiled = &self.matcher.compiled[index];
            let haystack = self.folded_body.as_deref().unwrap_or(self.body);

            if let Some(hint) = &compiled.hint_folded {
                if !haystack.contains(hint.as_str()) {
                    continue;
                }
            }

            match &compiled.kind {
                CompiledKind::Regex(regex) => {
                    if let Some(found) = regex.find(self.body) {
                        return Some(MatchResult {
                            matched_text: found.as_str().to_string(),
                            pattern_index: index,
                            tags: compiled.entry.tags.clone(),
                        });
                    }
                }
                CompiledKind::Literal(needle) => {
                    if let Some(pos) = haystack.find(needle.as_str()) {
                        // ASCII folding preserves byte offsets
                        let end = pos + needle.len();
                        return Some(MatchResult {
                            matched_text: self.body[pos..end].to_string(),
                            pattern_index: index,
                            tags: compiled.entry.tags.clone(),
                        });
                    }
                }
            }
        }
        None
    }
}

/// Extract the longest literal run guaranteed to appear in anything the
/// pattern matches. Group contents are ignored entirely, a top-level
/// alternation means no substring is guaranteed at all, and characters
/// under `?`, `*` or `{` quantifiers are dropped from their run.
fn derive_hint(pattern: &str, min_len: usize) -> Option<String> {
    let mut runs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut chars = pattern.chars().peekable();

    fn flush(current: &mut String, runs: &mut Vec<String>) {
        if !current.is_empty() {
            runs.push(std::mem::take(current));
        }
    }

    while let Some(c) = chars.next() {
        if depth > 0 {
            match c {
                '\\' => {
                    chars.next();
                }
                '(' => depth += 1,
                ')' => depth -= 1,
                '[' => {
                    while let Some(inner) = chars.next() {
                        if inner == '\\' {
                            chars.next();
                        } else if inner == ']' {
                            break;
                        }
                    }
                }
                _ => {}
            }
            continue;
        }

        match c {
            '\\' => {
                // Escapes may be classes (\w, \s); end the run and stay
                // conservative even for escaped literals
                chars.next();
                flush(&mut current, &mut runs);
            }
            '(' => {
                flush(&mut current, &mut runs);
                depth = 1;
            }
            '[' => {
                flush(&mut current, &mut runs);
                while let Some(inner) = chars.next() {
                    if inner == '\\' {
                        chars.next();
                    } else if inner == ']' {
                        break;
                    }
                }
            }
            '|' => return None,
            '*' | '?' => {
                current.pop();
                flush(&mut current, &mut runs);
            }
            '{' => {
                current.pop();
                flush(&mut current, &mut runs);
                for inner in chars.by_ref() {
                    if inner == '}' {
                        break;
                    }
                }
            }
            '+' | '.' | '^' | '$' | ')' => {
                flush(&mut current, &mut runs);
            }
            _ => current.push(c),
        }
    }
    flush(&mut current, &mut runs);

    runs.into_iter()
        .filter(|run| run.chars().count() >= min_len)
        .max_by_key(|run| run.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ci_config() -> MatchConfig {
        MatchConfig {
            case_insensitive: true,
            dot_matches_newline: true,
            ..MatchConfig::default()
        }
    }

    #[test]
    fn test_derive_hint_from_php_pattern() {
        assert_eq!(derive_hint(r"<\?php .*?\?>", 2), Some("php ".to_string()));
    }

    #[test]
    fn test_derive_hint_ignores_groups() {
        assert_eq!(
            derive_hint(r"(^|\W)import java\.", 2),
            Some("import java".to_string())
        );
        assert_eq!(derive_hint(r"(^|\W)def .*?\(.*?\):(\n|\r)", 2), Some("def ".to_string()));
    }

    #[test]
    fn test_derive_hint_drops_optional_chars() {
        // 'b' is optional, so only "a" and "cd" are guaranteed
        assert_eq!(derive_hint("ab?cd", 2), Some("cd".to_string()));
    }

    #[test]
    fn test_derive_hint_top_level_alternation_yields_none() {
        assert_eq!(derive_hint("foo|bar", 2), None);
    }

    #[test]
    fn test_malformed_pattern_fails_at_build() {
        let result = PatternSetBuilder::new()
            .regex(r"<%(unclosed", &["ASP"])
            .build(MatchConfig::default());
        assert!(matches!(result, Err(EngineError::InvalidPattern { .. })));
    }

    #[test]
    fn test_hint_prunes_pattern_attempts() {
        // The regex alone would match, but the explicit hint is absent
        let matcher = PatternSetBuilder::new()
            .regex_with_hint(r"echo .*;", &["PHP"], "<?php")
            .build(MatchConfig::default())
            .unwrap();

        let body = "echo $variable;";
        assert!(matcher.query(body).next().is_none());

        // Same pattern without the hint restriction accepts the body
        let unhinted = PatternSetBuilder::new()
            .regex_with_hint(r"echo .*;", &["PHP"], "echo")
            .build(MatchConfig::default())
            .unwrap();
        assert!(unhinted.query(body).next().is_some());
    }

    #[test]
    fn test_results_in_declaration_order() {
        let matcher = PatternSetBuilder::new()
            .regex(r"bbb\d", &["second"])
            .regex(r"aaa\d", &["first"])
            .build(MatchConfig::default())
            .unwrap();

        let results: Vec<MatchResult> = matcher.query("aaa1 and then bbb2").collect();
        assert_eq!(results.len(), 2);
        // Declaration order, not body position order
        assert_eq!(results[0].matched_text, "bbb2");
        assert_eq!(results[0].pattern_index, 0);
        assert_eq!(results[1].matched_text, "aaa1");
    }

    #[test]
    fn test_first_match_per_entry_only() {
        let matcher = PatternSetBuilder::new()
            .regex(r"x=\d", &["tag"])
            .build(MatchConfig::default())
            .unwrap();

        let results: Vec<MatchResult> = matcher.query("x=1 x=2 x=3").collect();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].matched_text, "x=1");
    }

    #[test]
    fn test_query_reinvokable_on_same_body() {
        let matcher = PatternSetBuilder::new()
            .literal("needle", &["tag"])
            .build(MatchConfig::default())
            .unwrap();

        let body = "hay needle hay";
        assert_eq!(matcher.query(body).count(), 1);
        assert_eq!(matcher.query(body).count(), 1);
    }

    #[test]
    fn test_case_insensitive_literals_and_hints() {
        let matcher = PatternSetBuilder::new()
            .literal("<Title>Index of /", &["dir"])
            .build(ci_config())
            .unwrap();

        let result = matcher.find("<TITLE>INDEX OF /var/www</TITLE>").unwrap();
        assert_eq!(result.matched_text, "<TITLE>INDEX OF /");
    }

    #[test]
    fn test_derived_hints_never_change_the_match_set() {
        // The same patterns built twice: once with derived hints, once
        // with derivation disabled so every regex runs on every body.
        // Pruning is only an optimization, so both must agree everywhere.
        let patterns: &[&str] = &[
            r"<\?php .*?\?>",
            r"<% .*?%>",
            r"<%@ .*?%>",
            r"(^|\W)import java\.",
            r"(^|\W)def .*?\(.*?\):(\n|\r)",
            r"#!/bin/",
        ];

        let build = |min_hint_len: usize| {
            let mut builder = PatternSetBuilder::new();
            for pattern in patterns {
                builder = builder.regex(*pattern, &["tag"]);
            }
            builder
                .build(MatchConfig {
                    case_insensitive: true,
                    dot_matches_newline: true,
                    min_hint_len,
                })
                .unwrap()
        };

        let hinted = build(2);
        let unhinted = build(usize::MAX);
        assert!(hinted.hintless_patterns().is_empty());
        assert_eq!(unhinted.hintless_patterns().len(), patterns.len());

        let corpus: &[&str] = &[
            "<html><?php echo $secret; ?></html>",
            "<html><% Response.Write x %></html>",
            "<%@ Page Language=\"C#\" %>",
            "\nimport java.util.List;\n",
            "def handler(request):\nreturn 1\n",
            "#!/bin/sh\nexit 0\n",
            "<html>nothing suspicious here</html>",
            // Near-misses: hint text present without a full match
            "the word php appears but no opener",
            "import javascript modules",
            "",
        ];

        for body in corpus {
            let pruned: Vec<(usize, String)> = hinted
                .query(body)
                .map(|m| (m.pattern_index, m.matched_text))
                .collect();
            let full: Vec<(usize, String)> = unhinted
                .query(body)
                .map(|m| (m.pattern_index, m.matched_text))
                .collect();
            assert_eq!(pruned, full, "match sets diverge on body {body:?}");
        }
    }

    #[test]
    fn test_hintless_diagnostic() {
        let matcher = PatternSetBuilder::new()
            .regex(r"a|b", &["broad"])
            .regex(r"specific_token\d+", &["narrow"])
            .build(MatchConfig::default())
            .unwrap();

        assert_eq!(matcher.hintless_patterns(), vec!["a|b"]);
    }

    #[test]
    fn test_tags_carried_through() {
        let matcher = PatternSetBuilder::new()
            .regex(r"<% .*?%>", &["ASP", "JSP"])
            .build(ci_config())
            .unwrap();

        let result = matcher.find("body <% Response.Write x %> end").unwrap();
        assert!(result.tags.contains("ASP"));
        assert!(result.tags.contains("JSP"));
    }
}
