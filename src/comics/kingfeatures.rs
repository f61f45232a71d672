//! King Features strips (Blondie, Rhymes with Orange, Zits, ...).
//!
//! Each strip has its own site whose front page shows today's strip. The
//! image is not linked directly: the page includes a generated script
//! reference of the form
//!
//! ```text
//! https://safr.kingfeatures.com/idn/cnfeed/zone/js/content.php?file=<base64>
//! ```
//!
//! where the `file` parameter is the base64-encoded absolute image URL,
//! sometimes percent-encoded on top. Most payloads use the standard
//! alphabet; a few use the URL-safe one.

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};
use url::Url;

static CONTENT_SCRIPT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"safr\.kingfeatures\.com/idn/cnfeed/zone/js/content\.php\?file=([A-Za-z0-9+/=%_-]+)")
        .expect("static regex is valid")
});

// The feed is inconsistent about trailing `=` padding.
const PAYLOAD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

const PAYLOAD_URL_SAFE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Front page of a strip's own site, e.g. `http://blondie.com/`.
pub fn fetch_url(site: &str) -> String {
    format!("http://{site}/")
}

/// Decode the image URL hidden in the first content script reference.
///
/// # Arguments
///
/// * `content` - The front page HTML of the strip's site
///
/// # Returns
///
/// The normalized absolute image URL, or `None` when the page has no
/// content script or its payload does not decode to an http(s) URL.
pub fn find_image(content: &str) -> Option<String> {
    let encoded = CONTENT_SCRIPT.captures(content)?.get(1)?.as_str();
    let image = decode_payload(encoded)?;
    debug!(%encoded, %image, "Decoded King Features payload");
    Some(image)
}

fn decode_payload(encoded: &str) -> Option<String> {
    let unescaped = urlencoding::decode(encoded).ok()?;
    let bytes = match PAYLOAD
        .decode(unescaped.as_bytes())
        .or_else(|_| PAYLOAD_URL_SAFE.decode(unescaped.as_bytes()))
    {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, %encoded, "King Features payload is not base64");
            return None;
        }
    };
    let decoded = String::from_utf8(bytes).ok()?;
    let decoded = decoded.trim();

    match Url::parse(decoded) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url.to_string()),
        _ => {
            warn!(%decoded, "King Features payload is not an absolute URL");
            None
        }
    }
}
