//! Payment Manifests
//!
//! Two JSON documents drive trust decisions:
//!
//! - The **payment method manifest**, hosted at a URL payment method, lists the
//!   web app manifests of the method's default applications and the origins
//!   allowed to use the method without being a default application.
//!
//! ```json
//! {
//!   "default_applications": ["https://bobpay.com/app.json"],
//!   "supported_origins": ["https://alicepay.com"]
//! }
//! ```
//!
//! - The **web app manifest** identifies native apps by package name, minimum
//!   version and signing-certificate fingerprints.
//!
//! ```json
//! {
//!   "related_applications": [{
//!     "platform": "play",
//!     "id": "com.bobpay",
//!     "min_version": "1",
//!     "fingerprints": [{"type": "sha256_cert", "value": "79:5C:8E:...:2C:F0"}]
//!   }]
//! }
//! ```

mod parser;
mod types;

pub use parser::{parse_method_manifest, parse_web_app_manifest};
pub use types::{
    PaymentMethodManifest, RelatedApplication, SupportedOrigins, WebAppManifest, PLAY_PLATFORM,
};
