// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Engine Data Types
 * HTTP boundary types, mutants and probe outcomes
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::TransportError;

/// Finding severity, ordered from most to least urgent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Critical => write!(f, "CRITICAL"),
            Severity::High => write!(f, "HIGH"),
            Severity::Medium => write!(f, "MEDIUM"),
            Severity::Low => write!(f, "LOW"),
            Severity::Info => write!(f, "INFO"),
        }
    }
}

/// A request as the engine sees it: enough to derive injection points and
/// to hand a transport something it can send. Parsing real traffic into
/// this shape is the caller's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpRequest {
    pub method: String,
    pub url: Url,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    #[serde(default)]
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn get(url: Url) -> Self {
        Self {
            method: "GET".to_string(),
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Names of the injectable query parameters, in URL order
    pub fn parameter_names(&self) -> Vec<String> {
        self.url
            .query_pairs()
            .map(|(name, _)| name.into_owned())
            .collect()
    }
}

/// A response body plus the metadata the detectors care about
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub url: Url,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(url: Url, status: u16, headers: Vec<(String, String)>, body: String) -> Self {
        Self {
            url,
            status,
            headers,
            body,
        }
    }

    /// Case-insensitive header lookup. Absence is an ordinary branch, not
    /// an error.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    pub fn is_text_or_html(&self) -> bool {
        match self.content_type() {
            Some(ct) => {
                let ct = ct.to_ascii_lowercase();
                ct.starts_with("text/") || ct.contains("html") || ct.contains("xml")
            }
            // No content type declared, assume text so we do not skip bodies
            None => true,
        }
    }

    /// URL truncated to its directory: scheme, host and path up to the
    /// last slash, query and fragment stripped. Used as the key for
    /// once-per-directory gating.
    pub fn domain_path(&self) -> String {
        let mut url = self.url.clone();
        url.set_query(None);
        url.set_fragment(None);
        let dir = match url.path().rfind('/') {
            Some(idx) => url.path()[..=idx].to_string(),
            None => "/".to_string(),
        };
        url.set_path(&dir);
        url.to_string()
    }
}

/// One crafted test input: the original request with a payload substituted
/// into exactly one injection point. One mutant maps to one probe send.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mutant {
    pub request: HttpRequest,
    /// Name of the parameter the payload was injected into
    pub token_name: String,
    pub payload: String,
}

impl Mutant {
    pub fn new(request: HttpRequest, token_name: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            request,
            token_name: token_name.into(),
            payload: payload.into(),
        }
    }

    /// Generate one mutant per (injectable parameter x payload)
    pub fn create_mutants<S: AsRef<str>>(request: &HttpRequest, payloads: &[S]) -> Vec<Mutant> {
        let mut mutants = Vec::new();
        for param in request.parameter_names() {
            for payload in payloads {
                mutants.push(Mutant::new(
                    request.clone(),
                    param.clone(),
                    payload.as_ref().to_string(),
                ));
            }
        }
        mutants
    }

    /// The request URL with the payload substituted into the target
    /// parameter
    pub fn mutated_url(&self) -> Url {
        let pairs: Vec<(String, String)> = self
            .request
            .url
            .query_pairs()
            .map(|(name, value)| {
                if name == self.token_name.as_str() {
                    (name.into_owned(), self.payload.clone())
                } else {
                    (name.into_owned(), value.into_owned())
                }
            })
            .collect();

        let mut url = self.request.url.clone();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        url
    }

    /// Human-readable injection location for finding descriptions
    pub fn found_at(&self) -> String {
        format!(
            "\"{}\", using HTTP method {}. The modified parameter was \"{}\"",
            self.request.url, self.request.method, self.token_name
        )
    }
}

/// The result of sending one mutant. The Result field guarantees that a
/// probe carries either a response or a transport error, never both and
/// never neither.
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub mutant: Mutant,
    pub result: Result<HttpResponse, TransportError>,
}

impl ProbeOutcome {
    pub fn success(mutant: Mutant, response: HttpResponse) -> Self {
        Self {
            mutant,
            result: Ok(response),
        }
    }

    pub fn failure(mutant: Mutant, error: TransportError) -> Self {
        Self {
            mutant,
            result: Err(error),
        }
    }

    pub fn response(&self) -> Option<&HttpResponse> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&TransportError> {
        self.result.as_ref().err()
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}
