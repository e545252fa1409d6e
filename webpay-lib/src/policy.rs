//! Supported-origins policy.
//!
//! Rules, in order:
//!
//! 1. A method's verified default application is always allowed.
//! 2. `"supported_origins": "*"` allows every app.
//! 3. An explicit list allows apps verified at one of the listed origins.
//! 4. Everything else is denied.
//!
//! An app's origins are those of the URL methods that verified it as their
//! default application. An app with no such relationship has no origin and
//! only rules 1 and 2 can apply to it.

use url::Origin;

use crate::catalog::InstalledApp;
use crate::manifest::SupportedOrigins;
use crate::{Result, WebPayError};

/// Evaluate the policy, reporting why access was denied.
pub fn check_allowed(
    app: &InstalledApp,
    method: &str,
    app_origins: &[Origin],
    policy: &SupportedOrigins,
    is_default_application: bool,
) -> Result<()> {
    if is_default_application {
        return Ok(());
    }
    match policy {
        SupportedOrigins::All => Ok(()),
        SupportedOrigins::Set(origins) if origins.is_empty() => Err(WebPayError::denied(
            method,
            &app.package_name,
            "method supports no other origins",
        )),
        SupportedOrigins::Set(_) if app_origins.is_empty() => Err(WebPayError::denied(
            method,
            &app.package_name,
            "app has no verified origin",
        )),
        SupportedOrigins::Set(origins) => {
            if app_origins.iter().any(|origin| origins.contains(origin)) {
                Ok(())
            } else {
                let listed = app_origins
                    .iter()
                    .map(Origin::ascii_serialization)
                    .collect::<Vec<_>>()
                    .join(", ");
                Err(WebPayError::denied(
                    method,
                    &app.package_name,
                    format!("origin {listed} is not supported"),
                ))
            }
        }
    }
}

/// Boolean form of [`check_allowed`].
pub fn is_allowed(
    app: &InstalledApp,
    method: &str,
    app_origins: &[Origin],
    policy: &SupportedOrigins,
    is_default_application: bool,
) -> bool {
    check_allowed(app, method, app_origins, policy, is_default_application).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    const METHOD: &str = "https://alicepay.com/webpay";

    fn origin(s: &str) -> Origin {
        Url::parse(s).unwrap().origin()
    }

    fn app() -> InstalledApp {
        InstalledApp::new("com.bobpay", 1, "Bob Pay")
    }

    #[test]
    fn test_default_application_always_allowed() {
        assert!(is_allowed(&app(), METHOD, &[], &SupportedOrigins::none(), true));
    }

    #[test]
    fn test_wildcard_allows_without_origin() {
        assert!(is_allowed(&app(), METHOD, &[], &SupportedOrigins::All, false));
    }

    #[test]
    fn test_origin_set_membership() {
        let policy = SupportedOrigins::Set([origin("https://bobpay.com")].into_iter().collect());

        assert!(is_allowed(&app(), METHOD, &[origin("https://bobpay.com/")], &policy, false));
        assert!(is_allowed(
            &app(),
            METHOD,
            &[origin("https://charliepay.com"), origin("https://bobpay.com")],
            &policy,
            false
        ));

        let err = check_allowed(&app(), METHOD, &[origin("https://evil.com")], &policy, false)
            .unwrap_err();
        assert_eq!(err.code(), crate::WebPayErrorCode::PolicyDenied);
        assert!(err.to_string().contains("https://evil.com"));

        assert!(!is_allowed(&app(), METHOD, &[], &policy, false));
    }

    #[test]
    fn test_empty_set_denies() {
        assert!(!is_allowed(
            &app(),
            METHOD,
            &[origin("https://bobpay.com")],
            &SupportedOrigins::none(),
            false
        ));
    }

    #[test]
    fn test_port_is_part_of_origin() {
        let policy =
            SupportedOrigins::Set([origin("https://bobpay.com:8443")].into_iter().collect());
        assert!(!is_allowed(&app(), METHOD, &[origin("https://bobpay.com")], &policy, false));
    }
}
