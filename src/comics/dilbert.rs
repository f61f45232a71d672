//! Dilbert.
//!
//! The front page always carries the latest strip, so the fetch URL does not
//! depend on the date. The strip URL is the `data-image` attribute of the
//! first `.comic-item-container`.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};

pub const FRONT_PAGE: &str = "http://www.dilbert.com/";

static COMIC_CONTAINER: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".comic-item-container[data-image]").expect("static selector is valid")
});

/// Strip URL from the first non-empty `data-image`, made absolute.
pub fn find_image(content: &str) -> Option<String> {
    let document = Html::parse_document(content);
    document
        .select(&COMIC_CONTAINER)
        .filter_map(|el| el.value().attr("data-image"))
        .map(str::trim)
        .find(|src| !src.is_empty())
        .map(|src| {
            // Older pages used protocol-relative asset URLs.
            if let Some(rest) = src.strip_prefix("//") {
                format!("https://{rest}")
            } else {
                src.to_string()
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_image_from_data_attribute() {
        let html = r#"<div class="comic-item-container js-comic js-comic-container-1"
            data-id="2018-06-27"
            data-image="https://assets.amuniversal.com/cfa39b00b39601365f19005056a9545d"
            data-title="Dilbert Comic for 2018-06-27"></div>"#;

        assert_eq!(
            find_image(html).as_deref(),
            Some("https://assets.amuniversal.com/cfa39b00b39601365f19005056a9545d")
        );
    }

    #[test]
    fn test_find_image_protocol_relative() {
        let html = r#"<div class="comic-item-container" data-image="//assets.amuniversal.com/abc123"></div>"#;
        assert_eq!(
            find_image(html).as_deref(),
            Some("https://assets.amuniversal.com/abc123")
        );
    }

    #[test]
    fn test_find_image_absent() {
        let html = r#"<div class="comic-item-container" data-image=""></div>"#;
        assert_eq!(find_image(html), None);
    }
}
