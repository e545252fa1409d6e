//! Default-application verification.
//!
//! An installed app is a method's default application when a web app manifest
//! reachable from the method's manifest names it by package, its version is
//! recent enough and it is signed with one of the listed certificates. A
//! manifest may list several fingerprints per package (key rotation) and the
//! same package under different fingerprints in different manifests (dev and
//! prod channels); one shared fingerprint is enough.

mod fingerprint;

pub use fingerprint::Fingerprint;

use crate::catalog::InstalledApp;
use crate::manifest::{RelatedApplication, WebAppManifest};
use crate::{Result, WebPayError};

/// Check `app` against one declaration, reporting the first failed check.
pub fn verify_default_application(app: &InstalledApp, decl: &RelatedApplication) -> Result<()> {
    if !decl.is_play() {
        return Err(WebPayError::mismatch(
            &app.package_name,
            format!("platform {:?} is not verifiable", decl.platform),
        ));
    }
    if app.package_name != decl.package_id {
        return Err(WebPayError::mismatch(
            &app.package_name,
            format!("declaration is for {}", decl.package_id),
        ));
    }
    if let Some(min_version) = decl.min_version {
        if app.version_code < min_version {
            return Err(WebPayError::mismatch(
                &app.package_name,
                format!(
                    "version {} is below minimum {}",
                    app.version_code, min_version
                ),
            ));
        }
    }
    if app
        .signing_fingerprints
        .is_disjoint(&decl.fingerprints)
    {
        return Err(WebPayError::mismatch(
            &app.package_name,
            "no signing certificate matches a declared fingerprint",
        ));
    }
    Ok(())
}

/// Boolean form of [`verify_default_application`].
pub fn is_default_application_of(app: &InstalledApp, decl: &RelatedApplication) -> bool {
    verify_default_application(app, decl).is_ok()
}

/// True when any entry of `manifest` verifies `app`.
///
/// Mismatches against entries for the app's own package are logged at debug
/// level; entries for other packages are skipped silently.
pub fn verifies_app(app: &InstalledApp, manifest: &WebAppManifest) -> bool {
    let mut verified = false;
    for decl in &manifest.related_applications {
        match verify_default_application(app, decl) {
            Ok(()) => verified = true,
            Err(err) if decl.package_id == app.package_name => {
                tracing::debug!("{err}");
            }
            Err(_) => {}
        }
    }
    verified
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WebPayErrorCode;

    const BOBPAY_CERT: &[u8] = &[
        0x30, 0x82, 0x01, 0x0a, 0x02, 0x82, 0x01, 0x01, 0x00, 0xc3, 0x5e, 0x10, 0x2f, 0x77, 0x91,
        0x4a, 0xb8, 0x22, 0x6d, 0x0e,
    ];

    fn bobpay_app() -> InstalledApp {
        InstalledApp::new("com.bobpay", 5, "Bob Pay").with_signing_certificate(BOBPAY_CERT)
    }

    fn bobpay_decl() -> RelatedApplication {
        RelatedApplication::play("com.bobpay")
            .with_min_version(1)
            .with_fingerprint(Fingerprint::of_certificate(BOBPAY_CERT))
    }

    #[test]
    fn test_matching_app_verifies() {
        assert!(is_default_application_of(&bobpay_app(), &bobpay_decl()));
    }

    #[test]
    fn test_wrong_signature_rejected() {
        let app = InstalledApp::new("com.bobpay", 5, "Bob Pay").with_signing_certificate(&[0x00]);
        let err = verify_default_application(&app, &bobpay_decl()).unwrap_err();
        assert_eq!(err.code(), WebPayErrorCode::VerificationMismatch);
        assert!(err.to_string().contains("fingerprint"));
    }

    #[test]
    fn test_any_shared_fingerprint_is_enough() {
        let decl = bobpay_decl()
            .with_fingerprint(Fingerprint::new([7; 32]))
            .with_fingerprint(Fingerprint::new([9; 32]));
        assert!(is_default_application_of(&bobpay_app(), &decl));

        let rotated = InstalledApp::new("com.bobpay", 5, "Bob Pay")
            .with_signing_fingerprint(Fingerprint::new([9; 32]));
        assert!(is_default_application_of(&rotated, &decl));
    }

    #[test]
    fn test_min_version_gate() {
        let old = InstalledApp::new("com.bobpay", 0, "Bob Pay").with_signing_certificate(BOBPAY_CERT);
        assert!(!is_default_application_of(&old, &bobpay_decl()));

        let exact =
            InstalledApp::new("com.bobpay", 1, "Bob Pay").with_signing_certificate(BOBPAY_CERT);
        assert!(is_default_application_of(&exact, &bobpay_decl()));

        let mut ungated = bobpay_decl();
        ungated.min_version = None;
        assert!(is_default_application_of(&old, &ungated));
    }

    #[test]
    fn test_package_and_platform_must_match() {
        let mut decl = bobpay_decl();
        decl.package_id = "com.alicepay".into();
        assert!(!is_default_application_of(&bobpay_app(), &decl));

        let mut decl = bobpay_decl();
        decl.platform = "itunes".into();
        assert!(!is_default_application_of(&bobpay_app(), &decl));
    }

    #[test]
    fn test_declaration_without_fingerprints_never_verifies() {
        let decl = RelatedApplication::play("com.bobpay");
        assert!(!is_default_application_of(&bobpay_app(), &decl));
    }

    #[test]
    fn test_verifies_app_scans_all_entries() {
        let manifest = WebAppManifest {
            related_applications: vec![
                RelatedApplication::play("com.bobpay.dev")
                    .with_fingerprint(Fingerprint::new([3; 32])),
                bobpay_decl(),
            ],
        };
        assert!(verifies_app(&bobpay_app(), &manifest));

        let dev = InstalledApp::new("com.bobpay.dev", 1, "Bob Pay Dev")
            .with_signing_fingerprint(Fingerprint::new([3; 32]));
        assert!(verifies_app(&dev, &manifest));

        let stranger = InstalledApp::new("com.bobpay", 5, "Bob Pay")
            .with_signing_fingerprint(Fingerprint::new([3; 32]));
        assert!(!verifies_app(&stranger, &manifest));
    }
}
