// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Single-Pass Literal Multi-Matcher
 * Aho-Corasick scan over dozens of needles at O(body + matches),
 * independent of needle count
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};

use crate::errors::{EngineError, EngineResult};

/// One literal hit, yielded in first-occurrence order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstringMatch<'a> {
    pub needle_index: usize,
    pub needle: &'a str,
    pub start: usize,
}

/// Compiled literal needle set. Read-only after construction.
pub struct SubstringMultiMatcher {
    automaton: AhoCorasick,
    needles: Vec<String>,
}

impl SubstringMultiMatcher {
    pub fn new<I, S>(needles: I) -> EngineResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::build(needles, false)
    }

    pub fn new_case_insensitive<I, S>(needles: I) -> EngineResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::build(needles, true)
    }

    fn build<I, S>(needles: I, case_insensitive: bool) -> EngineResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let needles: Vec<String> = needles.into_iter().map(Into::into).collect();
        let automaton = AhoCorasickBuilder::new()
            .match_kind(MatchKind::Standard)
            .ascii_case_insensitive(case_insensitive)
            .build(&needles)
            .map_err(|err| EngineError::InvalidNeedles(err.to_string()))?;
        Ok(Self { automaton, needles })
    }

    pub fn len(&self) -> usize {
        self.needles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.needles.is_empty()
    }

    /// Scan the body once and lazily yield every needle occurrence in the
    /// order it appears in the body
    pub fn query<'a>(&'a self, body: &'a str) -> impl Iterator<Item = SubstringMatch<'a>> + 'a {
        self.automaton.find_iter(body).map(move |found| {
            let index = found.pattern().as_usize();
            SubstringMatch {
                needle_index: index,
                needle: self.needles[index].as_str(),
                start: found.start(),
            }
        })
    }

    /// First occurrence of any needle; absence is an ordinary branch
    pub fn find<'a>(&'a self, body: &'a str) -> Option<SubstringMatch<'a>> {
        self.query(body).next()
    }

    pub fn matches_any(&self, body: &str) -> bool {
        self.automaton.is_match(body)
    }
}
