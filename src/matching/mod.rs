// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Response Matching Engine
 * Multi-pattern classification of response bodies
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

pub mod false_positive;
pub mod multi_in;
pub mod multi_re;

pub use false_positive::ClassificationFilter;
pub use multi_in::{SubstringMatch, SubstringMultiMatcher};
pub use multi_re::{MatchConfig, MatchResult, MultiPatternMatcher, PatternEntry, PatternSetBuilder};
