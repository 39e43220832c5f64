// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Detection Pattern Tables
 * Declarative pattern/tag tables consumed by the matching engine. New
 * detectors extend these tables, not the engine's control flow.
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use once_cell::sync::Lazy;

use crate::matching::{MatchConfig, MultiPatternMatcher, PatternSetBuilder, SubstringMultiMatcher};

pub const PHP: &str = "PHP";
pub const ASP: &str = "ASP";
pub const JSP: &str = "JSP";
pub const ASPX: &str = "ASPX";
pub const UNKNOWN: &str = "Unknown";
pub const SHELL: &str = "Shell script";
pub const JAVA: &str = "Java";
pub const RUBY: &str = "Ruby";
pub const PYTHON: &str = "Python";
pub const GROOVY: &str = "Groovy";

/// Server-side source code leaked into response bodies, tagged with the
/// language family. The \n and \r variants of the PHP/ASP openers are
/// kept separate so every entry derives a usable hint.
pub static SOURCE_CODE: &[(&str, &[&str])] = &[
    (r"<\?php .*?\?>", &[PHP]),
    (r"<\?php\n.*?\?>", &[PHP]),
    (r"<\?php\r.*?\?>", &[PHP]),
    (r"<% .*?%>", &[ASP, JSP]),
    (r"<%\n.*?%>", &[ASP, JSP]),
    (r"<%\r.*?%>", &[ASP, JSP]),
    (r"<%@ .*?%>", &[ASPX]),
    (r"<%@\n.*?%>", &[ASPX]),
    (r"<%@\r.*?%>", &[ASPX]),
    (r"<asp:.*?%>", &[ASPX]),
    (r"<jsp:.*?>", &[JSP]),
    (r"<%! .*%>", &[JSP]),
    (r"<%!\n.*%>", &[JSP]),
    (r"<%!\r.*%>", &[JSP]),
    (r"<%=.*%>", &[JSP, PHP, RUBY]),
    (r"<!--\s*%.*?%(--)?>", &[PHP]),
    (r"<!--\s*\?.*?\?(--)?>", &[ASP, JSP]),
    (r"<!--\s*jsp:.*?(--)?>", &[JSP]),
    (r"#include <", &[UNKNOWN]),
    (r"#!/usr/", &[SHELL]),
    (r"#!/opt/", &[SHELL]),
    (r"#!/bin/", &[SHELL]),
    (r"(^|\W)import java\.", &[JAVA]),
    (r"(^|\W)public class \w{1,60}\s?\{\s.*\Wpublic", &[JAVA]),
    (r"(^|\W)package\s\w+;", &[JAVA]),
    (r"<!--g:render", &[GROOVY]),
    (r"(^|\W)def .*?\(.*?\):(\n|\r)", &[PYTHON]),
    (
        r"(^|\W)class \w{1,60}\s*<?\s*[a-zA-Z0-9_:]{0,90}.*?\W(def|validates)\s.*?\send($|\W)",
        &[RUBY],
    ),
];

/// Known file contents leaked by traversal and local file read flaws:
/// /etc/passwd (Linux and AIX), boot.ini, win.ini, scripts
pub static FILE_PATTERNS: &[&str] = &[
    "root:x:0:0:",
    "daemon:x:1:1:",
    ":/bin/bash",
    ":/bin/sh",
    "root:!:x:0:0:",
    "daemon:!:x:1:1:",
    ":usr/bin/ksh",
    "[boot loader]",
    "default=multi(",
    "[operating systems]",
    "[fonts]",
    "<?php",
    "#!/",
];

/// Markers emitted by web servers rendering a directory listing
pub static DIR_INDEXING: &[&str] = &[
    "<title>Index of /",
    "<a href=\"?C=N;O=D\">Name</a>",
    "<A HREF=\"?M=A\">Last modified</A>",
    "Last modified</a>",
    "Parent Directory</a>",
    "Directory Listing for",
    "<TITLE>Folder Listing.",
    "<table summary=\"Directory Listing\" ",
    "- Browsing directory ",
    // IIS 6.0 and 7.0
    "\">[To Parent Directory]</a><br><br>",
];

/// Response headers common enough that their presence says nothing about
/// the application. Lowercase; compared case-insensitively.
pub static COMMON_HEADERS: &[&str] = &[
    "accept-ranges",
    "access-control-allow-credentials",
    "access-control-allow-headers",
    "access-control-allow-methods",
    "access-control-allow-origin",
    "access-control-expose-headers",
    "access-control-max-age",
    "age",
    "allow",
    "alt-svc",
    "cache-control",
    "connection",
    "content-disposition",
    "content-encoding",
    "content-language",
    "content-length",
    "content-location",
    "content-range",
    "content-security-policy",
    "content-type",
    "date",
    "etag",
    "expires",
    "keep-alive",
    "last-modified",
    "link",
    "location",
    "p3p",
    "pragma",
    "proxy-authenticate",
    "referrer-policy",
    "retry-after",
    "server",
    "set-cookie",
    "strict-transport-security",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "vary",
    "via",
    "warning",
    "www-authenticate",
    "x-aspnet-version",
    "x-aspnetmvc-version",
    "x-cache",
    "x-cache-lookup",
    "x-content-type-options",
    "x-frame-options",
    "x-pad",
    "x-powered-by",
    "x-ua-compatible",
    "x-varnish",
    "x-xss-protection",
];

static SOURCE_CODE_MATCHER: Lazy<MultiPatternMatcher> = Lazy::new(|| {
    let mut builder = PatternSetBuilder::new();
    for (pattern, langs) in SOURCE_CODE {
        builder = builder.regex(*pattern, langs);
    }
    let config = MatchConfig {
        case_insensitive: true,
        dot_matches_newline: true,
        ..MatchConfig::default()
    };
    builder.build(config).expect("SOURCE_CODE table compiles")
});

static FILE_PATTERN_MATCHER: Lazy<SubstringMultiMatcher> = Lazy::new(|| {
    SubstringMultiMatcher::new(FILE_PATTERNS.iter().copied())
        .expect("FILE_PATTERNS table compiles")
});

static DIR_INDEXING_MATCHER: Lazy<SubstringMultiMatcher> = Lazy::new(|| {
    SubstringMultiMatcher::new(DIR_INDEXING.iter().copied())
        .expect("DIR_INDEXING table compiles")
});

pub fn source_code_matcher() -> &'static MultiPatternMatcher {
    &SOURCE_CODE_MATCHER
}

pub fn file_pattern_matcher() -> &'static SubstringMultiMatcher {
    &FILE_PATTERN_MATCHER
}

pub fn dir_indexing_matcher() -> &'static SubstringMultiMatcher {
    &DIR_INDEXING_MATCHER
}

pub fn is_common_header(name: &str) -> bool {
    let lowered = name.to_ascii_lowercase();
    COMMON_HEADERS.contains(&lowered.as_str())
}
