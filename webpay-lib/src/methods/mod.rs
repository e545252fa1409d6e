//! Payment Method Identifiers
//!
//! A merchant names the payment methods it accepts with plain strings. Each
//! string is either a token from a small fixed registry (`basic-card`, ...) or
//! an absolute URL on a secure origin that hosts a payment method manifest.
//! Anything else is rejected here, before any network work happens.
//!
//! # Example
//!
//! ```
//! use webpay_lib::methods::{classify, MethodIdentifier, StandardMethod};
//!
//! let id = classify("basic-card").unwrap();
//! assert_eq!(id, MethodIdentifier::Standard(StandardMethod::BasicCard));
//!
//! let id = classify("https://bobpay.com/webpay").unwrap();
//! assert!(id.is_url());
//!
//! assert!(classify("Basic-Card").is_err());
//! assert!(classify("/webpay").is_err());
//! ```

use std::collections::HashSet;
use std::fmt;

use url::{Host, Url};

use crate::{Result, WebPayError};

/// Registered non-URL payment method tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StandardMethod {
    /// `basic-card`
    BasicCard,
    /// `interledger`
    Interledger,
    /// `payee-credit-transfer`
    PayeeCreditTransfer,
    /// `payer-credit-transfer`
    PayerCreditTransfer,
}

impl StandardMethod {
    /// Every registered token.
    pub const ALL: [StandardMethod; 4] = [
        Self::BasicCard,
        Self::Interledger,
        Self::PayeeCreditTransfer,
        Self::PayerCreditTransfer,
    ];

    /// The token as it appears in a payment request.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BasicCard => "basic-card",
            Self::Interledger => "interledger",
            Self::PayeeCreditTransfer => "payee-credit-transfer",
            Self::PayerCreditTransfer => "payer-credit-transfer",
        }
    }

    /// Case-sensitive lookup in the registry.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == token)
    }
}

impl fmt::Display for StandardMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified payment method identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MethodIdentifier {
    /// Member of the fixed token registry.
    Standard(StandardMethod),
    /// Absolute secure URL of a payment method manifest.
    Url(Url),
}

impl MethodIdentifier {
    /// True for URL-based methods.
    pub fn is_url(&self) -> bool {
        matches!(self, Self::Url(_))
    }

    /// The manifest URL, for URL-based methods.
    pub fn as_url(&self) -> Option<&Url> {
        match self {
            Self::Url(url) => Some(url),
            Self::Standard(_) => None,
        }
    }
}

/// Returns true when `url` may carry payment manifests.
///
/// `https` always qualifies. Plain `http` is accepted only for loopback hosts
/// so that local test servers can stand in for real origins.
pub fn is_secure_url(url: &Url) -> bool {
    match url.scheme() {
        "https" => true,
        "http" => match url.host() {
            Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
            Some(Host::Ipv4(ip)) => ip.is_loopback(),
            Some(Host::Ipv6(ip)) => ip.is_loopback(),
            None => false,
        },
        _ => false,
    }
}

/// Classifies one raw method string.
///
/// Pure: no I/O and no side effects.
pub fn classify(raw: &str) -> Result<MethodIdentifier> {
    if raw.is_empty() {
        return Err(WebPayError::rejected(raw, "empty identifier"));
    }
    // The URL parser silently strips surrounding whitespace.
    if raw.trim() != raw {
        return Err(WebPayError::rejected(raw, "surrounding whitespace"));
    }

    match Url::parse(raw) {
        Ok(url) => {
            if !is_secure_url(&url) {
                return Err(WebPayError::rejected(raw, "URL scheme is not secure"));
            }
            if url.host_str().map_or(true, str::is_empty) {
                return Err(WebPayError::rejected(raw, "URL has no host"));
            }
            if !url.username().is_empty() || url.password().is_some() {
                return Err(WebPayError::rejected(raw, "URL carries credentials"));
            }
            Ok(MethodIdentifier::Url(url))
        }
        Err(_) => StandardMethod::from_token(raw)
            .map(MethodIdentifier::Standard)
            .ok_or_else(|| WebPayError::rejected(raw, "not a registered method or absolute URL")),
    }
}

/// A method the merchant asked for, with the exact string it used.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestedMethod {
    raw: String,
    id: MethodIdentifier,
}

impl RequestedMethod {
    /// Classify `raw`, keeping the original string for output.
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        let id = classify(&raw)?;
        Ok(Self { raw, id })
    }

    /// The string as the merchant supplied it.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The classified identifier.
    pub fn identifier(&self) -> &MethodIdentifier {
        &self.id
    }

    /// The manifest URL, for URL-based methods.
    pub fn url(&self) -> Option<&Url> {
        self.id.as_url()
    }

    /// The registry token, for standard methods.
    pub fn standard(&self) -> Option<StandardMethod> {
        match self.id {
            MethodIdentifier::Standard(m) => Some(m),
            MethodIdentifier::Url(_) => None,
        }
    }

    /// Whether an app-declared method name refers to this method.
    ///
    /// URL methods compare as parsed URLs, so `https://bobpay.com` and
    /// `https://bobpay.com/` are the same method. Tokens compare exactly.
    pub fn matches_declared(&self, declared: &str) -> bool {
        if self.raw == declared {
            return true;
        }
        match &self.id {
            MethodIdentifier::Url(url) => Url::parse(declared).is_ok_and(|d| &d == url),
            MethodIdentifier::Standard(_) => false,
        }
    }
}

impl fmt::Display for RequestedMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A merchant's method list after classification.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassifiedMethods {
    /// Usable methods, in first-occurrence order.
    pub accepted: Vec<RequestedMethod>,
    /// Strings that were neither a registered token nor a secure URL.
    pub rejected: Vec<String>,
}

impl ClassifiedMethods {
    /// URL-based methods among the accepted ones.
    pub fn url_methods(&self) -> impl Iterator<Item = (&RequestedMethod, &Url)> {
        self.accepted.iter().filter_map(|m| m.url().map(|url| (m, url)))
    }
}

/// Classifies a merchant's method list.
///
/// Exact duplicates collapse to their first occurrence and rejected entries
/// are set aside with a debug log.
pub fn classify_requested<I, S>(methods: I) -> ClassifiedMethods
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen = HashSet::new();
    let mut out = ClassifiedMethods::default();
    for raw in methods {
        let raw = raw.into();
        if !seen.insert(raw.clone()) {
            continue;
        }
        match RequestedMethod::new(raw.clone()) {
            Ok(method) => out.accepted.push(method),
            Err(err) => {
                tracing::debug!("dropping requested method: {err}");
                out.rejected.push(raw);
            }
        }
    }
    out
}
