//! Dinosaur Comics, from qwantz.com.
//!
//! The index page shows the most recent strip as `<img class="comic">` with
//! a path relative to the site root. New strips only appear on weekdays.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::warn;
use url::Url;

pub const INDEX_PAGE: &str = "http://www.qwantz.com/index.php";

static COMIC_IMAGE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("img.comic[src]").expect("static selector is valid"));

/// Absolute URL of the strip image, resolved against the index page.
pub fn find_image(content: &str) -> Option<String> {
    let base = Url::parse(INDEX_PAGE).ok()?;
    let document = Html::parse_document(content);
    let src = document
        .select(&COMIC_IMAGE)
        .filter_map(|img| img.value().attr("src"))
        .next()?;

    match base.join(src) {
        Ok(resolved) => Some(resolved.to_string()),
        Err(e) => {
            warn!(error = %e, %src, "Unresolvable Dinosaur Comics image path");
            None
        }
    }
}
