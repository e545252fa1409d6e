//! Parsed manifest records.

use std::collections::{BTreeSet, HashSet};

use url::{Origin, Url};

use crate::verifier::Fingerprint;

/// The only related-application platform that carries native app identity.
pub const PLAY_PLATFORM: &str = "play";

/// Which origins may use a payment method without being its default application.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SupportedOrigins {
    /// `"supported_origins": "*"`
    All,
    /// An explicit list. Empty means no origin is supported through this clause.
    Set(HashSet<Origin>),
}

impl SupportedOrigins {
    /// An empty origin set.
    pub fn none() -> Self {
        Self::Set(HashSet::new())
    }

    /// Whether `origin` is covered by this policy.
    pub fn allows(&self, origin: &Origin) -> bool {
        match self {
            Self::All => true,
            Self::Set(origins) => origins.contains(origin),
        }
    }

    /// True for an empty explicit set.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Set(origins) if origins.is_empty())
    }
}

impl Default for SupportedOrigins {
    fn default() -> Self {
        Self::none()
    }
}

/// Document hosted at a payment method URL.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PaymentMethodManifest {
    /// Web app manifests of the method's default applications, in document order.
    pub default_applications: Vec<Url>,
    /// Policy for apps that are not default applications.
    pub supported_origins: SupportedOrigins,
}

/// One `related_applications` entry of a web app manifest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelatedApplication {
    /// Store platform; only [`PLAY_PLATFORM`] entries are actionable.
    pub platform: String,
    /// Package name of the native app.
    pub package_id: String,
    /// Lowest acceptable installed version code.
    pub min_version: Option<i64>,
    /// Accepted signing-certificate fingerprints.
    pub fingerprints: BTreeSet<Fingerprint>,
}

impl RelatedApplication {
    /// A `play` entry with no version gate and no fingerprints yet.
    pub fn play(package_id: impl Into<String>) -> Self {
        Self {
            platform: PLAY_PLATFORM.to_string(),
            package_id: package_id.into(),
            min_version: None,
            fingerprints: BTreeSet::new(),
        }
    }

    /// Set the minimum version code.
    pub fn with_min_version(mut self, min_version: i64) -> Self {
        self.min_version = Some(min_version);
        self
    }

    /// Add an accepted fingerprint.
    pub fn with_fingerprint(mut self, fingerprint: Fingerprint) -> Self {
        self.fingerprints.insert(fingerprint);
        self
    }

    /// True for `play` entries.
    pub fn is_play(&self) -> bool {
        self.platform == PLAY_PLATFORM
    }

    /// Whether this entry can ever verify an installed app.
    pub fn has_trust_anchor(&self) -> bool {
        self.is_play() && !self.fingerprints.is_empty()
    }
}

/// Document describing native apps related to a payment method.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WebAppManifest {
    /// Entries in document order.
    pub related_applications: Vec<RelatedApplication>,
}

impl WebAppManifest {
    /// Entries that can verify an installed app.
    pub fn play_applications(&self) -> impl Iterator<Item = &RelatedApplication> {
        self.related_applications
            .iter()
            .filter(|app| app.has_trust_anchor())
    }

    /// True when no entry can verify anything.
    pub fn is_inert(&self) -> bool {
        self.play_applications().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_origins_allows() {
        let bobpay = Url::parse("https://bobpay.com").unwrap().origin();
        let alicepay = Url::parse("https://alicepay.com").unwrap().origin();

        assert!(SupportedOrigins::All.allows(&bobpay));

        let set = SupportedOrigins::Set([bobpay.clone()].into_iter().collect());
        assert!(set.allows(&bobpay));
        assert!(!set.allows(&alicepay));
        assert!(!set.is_empty());

        assert!(SupportedOrigins::default().is_empty());
        assert!(!SupportedOrigins::default().allows(&bobpay));
    }

    #[test]
    fn test_manifest_without_fingerprints_is_inert() {
        let manifest = WebAppManifest {
            related_applications: vec![
                RelatedApplication::play("com.bobpay"),
                RelatedApplication {
                    platform: "itunes".into(),
                    package_id: "123456".into(),
                    min_version: None,
                    fingerprints: [Fingerprint::new([1; 32])].into_iter().collect(),
                },
            ],
        };
        assert!(manifest.is_inert());

        let manifest = WebAppManifest {
            related_applications: vec![
                RelatedApplication::play("com.bobpay").with_fingerprint(Fingerprint::new([1; 32]))
            ],
        };
        assert_eq!(manifest.play_applications().count(), 1);
    }
}
