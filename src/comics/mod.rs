//! Comic sources: where each strip lives and how to pull today's image out
//! of its page.
//!
//! A [`Comic`] pairs a [`Publisher`] (URL template plus extraction rule)
//! with a [`Schedule`] (which weekdays the strip does not run). Dispatch is
//! a `match` on the publisher tag, so adding a site means adding a variant
//! and a submodule with `find_image`.
//!
//! # Supported Publishers
//!
//! | Publisher | Module | Fetch URL | Extraction |
//! |-----------|--------|-----------|------------|
//! | GoComics | [`gocomics`] | date-embedded path | `picture.item-comic-image img` |
//! | King Features | [`kingfeatures`] | site root | base64 `file` parameter of a script reference |
//! | Dilbert | [`dilbert`] | front page | `data-image` attribute |
//! | Dinosaur Comics | [`qwantz`] | index page | `img.comic`, resolved to absolute |
//! | FoxTrot | [`foxtrot`] | front page | JSON-LD `image` property |

use chrono::{Datelike, NaiveDate, Weekday};
use tracing::{debug, instrument};

use crate::error::ComicError;
use crate::utils::truncate_for_log;

pub mod dilbert;
pub mod foxtrot;
pub mod gocomics;
pub mod kingfeatures;
pub mod qwantz;
pub mod registry;

/// The site a strip is published on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Publisher {
    /// GoComics strip identified by its URL slug.
    GoComics(&'static str),
    /// King Features strip identified by its own site host.
    KingFeatures(&'static str),
    /// dilbert.com front page.
    Dilbert,
    /// Ryan North's qwantz.com index page.
    DinosaurComics,
    /// foxtrot.com, which only runs new strips on Sundays.
    FoxTrot,
}

/// Weekdays on which a strip does not appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    Daily,
    /// Never runs on these days. Decided from the date alone.
    Skips(&'static [Weekday]),
    /// Usually absent on these days. Only consulted when the page has no
    /// recognizable image.
    Irregular(&'static [Weekday]),
}

impl Schedule {
    fn skips(&self, day: Weekday) -> bool {
        matches!(self, Schedule::Skips(days) if days.contains(&day))
    }

    fn usually_absent(&self, day: Weekday) -> bool {
        match self {
            Schedule::Daily => false,
            Schedule::Skips(days) | Schedule::Irregular(days) => days.contains(&day),
        }
    }
}

/// One registered comic strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comic {
    key: &'static str,
    publisher: Publisher,
    schedule: Schedule,
}

impl Comic {
    pub const fn new(key: &'static str, publisher: Publisher, schedule: Schedule) -> Self {
        Self {
            key,
            publisher,
            schedule,
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Page to fetch for `date`. Returned even on days the strip skips.
    ///
    /// # Arguments
    ///
    /// * `date` - The reference date; only GoComics embeds it in the path
    ///
    /// # Returns
    ///
    /// An absolute `http(s)` URL for the strip's page.
    pub fn fetch_url(&self, date: NaiveDate) -> String {
        match self.publisher {
            Publisher::GoComics(slug) => gocomics::fetch_url(slug, date),
            Publisher::KingFeatures(site) => kingfeatures::fetch_url(site),
            Publisher::Dilbert => dilbert::FRONT_PAGE.to_string(),
            Publisher::DinosaurComics => qwantz::INDEX_PAGE.to_string(),
            Publisher::FoxTrot => foxtrot::FRONT_PAGE.to_string(),
        }
    }

    /// `false` when the schedule rules out `date` without looking at any page.
    pub fn publishes_on(&self, date: NaiveDate) -> bool {
        !self.schedule.skips(date.weekday())
    }

    /// Pull the image URL for `date` out of fetched page `content`.
    ///
    /// # Errors
    ///
    /// - [`ComicError::NotPublishedToday`] when the schedule skips `date`, or
    ///   when no image was found and the strip is usually absent that weekday.
    /// - [`ComicError::ExtractionFailed`] when no image was found otherwise.
    #[instrument(level = "debug", skip(self, content), fields(key = self.key, bytes = content.len()))]
    pub fn extract_image(&self, content: &str, date: NaiveDate) -> Result<String, ComicError> {
        if !self.publishes_on(date) {
            return Err(self.not_published(date));
        }

        let found = match self.publisher {
            Publisher::GoComics(_) => gocomics::find_image(content),
            Publisher::KingFeatures(_) => kingfeatures::find_image(content),
            Publisher::Dilbert => dilbert::find_image(content),
            Publisher::DinosaurComics => qwantz::find_image(content),
            Publisher::FoxTrot => foxtrot::find_image(content),
        };

        match found {
            Some(image) => {
                debug!(%image, "Extracted strip image");
                Ok(image)
            }
            None if self.schedule.usually_absent(date.weekday()) => Err(self.not_published(date)),
            None => {
                debug!(preview = %truncate_for_log(content, 300), "No strip image in page");
                Err(ComicError::ExtractionFailed {
                    key: self.key.to_string(),
                })
            }
        }
    }

    fn not_published(&self, date: NaiveDate) -> ComicError {
        ComicError::NotPublishedToday {
            key: self.key.to_string(),
            date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WEEKDAYS_ONLY: Comic = Comic::new(
        "dinosaur-comics",
        Publisher::DinosaurComics,
        Schedule::Skips(&[Weekday::Sat, Weekday::Sun]),
    );
    const SUNDAYS_ONLY: Comic = Comic::new(
        "foxtrot",
        Publisher::FoxTrot,
        Schedule::Skips(&[
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
        ]),
    );
    const MOSTLY_WEEKDAYS: Comic = Comic::new(
        "breaking-cat-news",
        Publisher::GoComics("breaking-cat-news"),
        Schedule::Irregular(&[Weekday::Sat, Weekday::Sun]),
    );

    const FOXTROT_PAGE: &str = r#"<script type="application/ld+json">{"image": "https://foxtrot.com/wp-content/uploads/2018/06/ft180624.png"}</script>"#;
    const QWANTZ_PAGE: &str = r#"<img src="comics/comic2-3331.png" class="comic">"#;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // 2018-06-23 was a Saturday.
    fn saturday() -> NaiveDate {
        date(2018, 6, 23)
    }

    fn sunday() -> NaiveDate {
        date(2018, 6, 24)
    }

    fn wednesday() -> NaiveDate {
        date(2018, 6, 27)
    }

    #[test]
    fn test_weekend_gate_ignores_content() {
        for day in [saturday(), sunday()] {
            assert!(!WEEKDAYS_ONLY.publishes_on(day));
            // Even a page with a perfectly good image is not used.
            let result = WEEKDAYS_ONLY.extract_image(QWANTZ_PAGE, day);
            assert!(matches!(result, Err(ComicError::NotPublishedToday { .. })));
            let result = WEEKDAYS_ONLY.extract_image("", day);
            assert!(matches!(result, Err(ComicError::NotPublishedToday { .. })));
        }
    }

    #[test]
    fn test_weekend_gate_allows_weekdays() {
        for d in 25..=29 {
            let day = date(2018, 6, d);
            assert!(WEEKDAYS_ONLY.publishes_on(day), "{day} should publish");
            assert_eq!(
                WEEKDAYS_ONLY.extract_image(QWANTZ_PAGE, day).unwrap(),
                "http://www.qwantz.com/comics/comic2-3331.png"
            );
        }
    }

    #[test]
    fn test_sunday_only_strip() {
        for d in 25..=30 {
            let day = date(2018, 6, d);
            let result = SUNDAYS_ONLY.extract_image(FOXTROT_PAGE, day);
            assert!(
                matches!(result, Err(ComicError::NotPublishedToday { .. })),
                "{day} should not publish"
            );
        }

        assert_eq!(
            SUNDAYS_ONLY.extract_image(FOXTROT_PAGE, sunday()).unwrap(),
            "https://foxtrot.com/wp-content/uploads/2018/06/ft180624.png"
        );
    }

    #[test]
    fn test_missing_image_on_published_day_is_failure() {
        let result = WEEKDAYS_ONLY.extract_image("<html></html>", wednesday());
        assert!(matches!(result, Err(ComicError::ExtractionFailed { ref key }) if key == "dinosaur-comics"));
    }

    #[test]
    fn test_irregular_schedule_only_applies_when_image_missing() {
        // The page is still fetched and used on an irregular day.
        assert!(MOSTLY_WEEKDAYS.publishes_on(saturday()));
        let page = r#"<picture class="item-comic-image"><img src="https://assets.amuniversal.com/bcn"></picture>"#;
        assert_eq!(
            MOSTLY_WEEKDAYS.extract_image(page, saturday()).unwrap(),
            "https://assets.amuniversal.com/bcn"
        );

        let result = MOSTLY_WEEKDAYS.extract_image("<html></html>", saturday());
        assert!(matches!(result, Err(ComicError::NotPublishedToday { .. })));

        let result = MOSTLY_WEEKDAYS.extract_image("<html></html>", wednesday());
        assert!(matches!(result, Err(ComicError::ExtractionFailed { .. })));
    }

    #[test]
    fn test_fetch_url_on_gated_day() {
        assert_eq!(SUNDAYS_ONLY.fetch_url(wednesday()), "https://foxtrot.com/");
        assert_eq!(
            MOSTLY_WEEKDAYS.fetch_url(saturday()),
            "http://www.gocomics.com/breaking-cat-news/2018/06/23/"
        );
    }
}
