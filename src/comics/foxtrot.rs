//! FoxTrot.
//!
//! Since going Sunday-only the site front page carries the latest strip.
//! The image is easiest to find in the page's JSON-LD metadata, where the
//! `image` property is a URL string, an `ImageObject` with a `url`, or an
//! array of either.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::debug;

pub const FRONT_PAGE: &str = "https://foxtrot.com/";

static LD_JSON: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#).expect("static selector is valid")
});

/// First absolute image URL found in any JSON-LD block on the page.
///
/// # Returns
///
/// `None` when no block parses or none names an http(s) image, which the
/// caller reports as "not published" on the days FoxTrot skips.
pub fn find_image(content: &str) -> Option<String> {
    let document = Html::parse_document(content);
    document.select(&LD_JSON).find_map(|script| {
        let raw = script.text().collect::<String>();
        match serde_json::from_str::<Value>(&raw) {
            Ok(json) => image_in(&json),
            Err(e) => {
                debug!(error = %e, "Skipping unparseable JSON-LD block");
                None
            }
        }
    })
}

fn image_in(json: &Value) -> Option<String> {
    match json {
        Value::Array(items) => items.iter().find_map(image_in),
        Value::Object(map) => {
            if let Some(image) = map.get("image").and_then(image_url) {
                return Some(image);
            }
            // Yoast-style pages nest everything under `@graph`.
            map.get("@graph").and_then(image_in)
        }
        _ => None,
    }
}

fn image_url(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if s.starts_with("http") => Some(s.clone()),
        Value::Object(map) => map.get("url").and_then(image_url),
        Value::Array(items) => items.iter().find_map(image_url),
        _ => None,
    }
}
