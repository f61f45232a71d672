//! GoComics strips.
//!
//! Every GoComics strip lives under a date-embedded path such as
//! `http://www.gocomics.com/9chickweedlane/2018/06/27/`. The strip itself
//! is the `<img>` inside the page's `picture.item-comic-image` element,
//! served from `assets.amuniversal.com` with an absolute URL.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::debug;

static COMIC_IMAGE: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("picture.item-comic-image img[src]").expect("static selector is valid")
});

/// Page URL for `slug` on `date`.
pub fn fetch_url(slug: &str, date: NaiveDate) -> String {
    format!(
        "http://www.gocomics.com/{}/{:04}/{:02}/{:02}/",
        slug,
        date.year(),
        date.month(),
        date.day()
    )
}

/// First absolute strip image URL on the page, if any.
pub fn find_image(content: &str) -> Option<String> {
    let document = Html::parse_document(content);
    let src = document
        .select(&COMIC_IMAGE)
        .filter_map(|img| img.value().attr("src"))
        .find(|src| src.starts_with("http://") || src.starts_with("https://"))?;
    debug!(%src, "Found GoComics strip image");
    Some(src.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_url_embeds_zero_padded_date() {
        let date = NaiveDate::from_ymd_opt(2018, 6, 27).unwrap();
        assert_eq!(
            fetch_url("9chickweedlane", date),
            "http://www.gocomics.com/9chickweedlane/2018/06/27/"
        );

        let date = NaiveDate::from_ymd_opt(2019, 1, 5).unwrap();
        assert_eq!(
            fetch_url("calvinandhobbes", date),
            "http://www.gocomics.com/calvinandhobbes/2019/01/05/"
        );
    }

    #[test]
    fn test_find_image_reads_comic_picture() {
        let html = r#"<html><body>
            <picture class="gc-avatar"><img src="https://avatar.amuniversal.com/chickweed.png"></picture>
            <picture class="item-comic-image">
              <img class="img-fluid" src="https://assets.amuniversal.com/e2a3c500c015013663ff005056a9545d" alt="9 Chickweed Lane">
            </picture>
        </body></html>"#;

        assert_eq!(
            find_image(html).as_deref(),
            Some("https://assets.amuniversal.com/e2a3c500c015013663ff005056a9545d")
        );
    }

    #[test]
    fn test_find_image_skips_relative_sources() {
        let html = r#"<picture class="item-comic-image"><img src="/assets/placeholder.png"></picture>"#;
        assert_eq!(find_image(html), None);
    }

    #[test]
    fn test_find_image_missing_picture() {
        assert_eq!(find_image("<html><body><p>Not found</p></body></html>"), None);
    }
}
