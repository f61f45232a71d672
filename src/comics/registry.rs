//! The fixed table of comics subscribers can ask for, keyed by the short
//! lowercase name used in subscription text.

use std::collections::HashMap;

use chrono::Weekday;
use once_cell::sync::Lazy;

use super::{Comic, Publisher, Schedule};
use crate::error::ComicError;

const WEEKENDS: &[Weekday] = &[Weekday::Sat, Weekday::Sun];
const ALL_BUT_SUNDAY: &[Weekday] = &[
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

const COMICS: &[Comic] = &[
    Comic::new("9chickweedlane", Publisher::GoComics("9chickweedlane"), Schedule::Daily),
    Comic::new("arloandjanis", Publisher::GoComics("arloandjanis"), Schedule::Daily),
    Comic::new("bignate", Publisher::GoComics("bignate"), Schedule::Daily),
    Comic::new(
        "breaking-cat-news",
        Publisher::GoComics("breaking-cat-news"),
        Schedule::Irregular(WEEKENDS),
    ),
    Comic::new("calvinandhobbes", Publisher::GoComics("calvinandhobbes"), Schedule::Daily),
    Comic::new(
        "forbetterorforworse",
        Publisher::GoComics("forbetterorforworse"),
        Schedule::Daily,
    ),
    Comic::new("pickles", Publisher::GoComics("pickles"), Schedule::Daily),
    Comic::new("blondie", Publisher::KingFeatures("blondie.com"), Schedule::Daily),
    Comic::new(
        "rhymeswithorange",
        Publisher::KingFeatures("rhymeswithorange.com"),
        Schedule::Daily,
    ),
    Comic::new("zits", Publisher::KingFeatures("zitscomics.com"), Schedule::Daily),
    Comic::new("dilbert", Publisher::Dilbert, Schedule::Daily),
    Comic::new("dinosaur-comics", Publisher::DinosaurComics, Schedule::Skips(WEEKENDS)),
    Comic::new("foxtrot", Publisher::FoxTrot, Schedule::Skips(ALL_BUT_SUNDAY)),
];

static REGISTRY: Lazy<HashMap<&'static str, &'static Comic>> =
    Lazy::new(|| COMICS.iter().map(|comic| (comic.key(), comic)).collect());

/// Look up the comic registered under `key`.
///
/// # Errors
///
/// [`ComicError::UnknownComic`] when nothing is registered for `key`.
pub fn resolve(key: &str) -> Result<&'static Comic, ComicError> {
    REGISTRY
        .get(key)
        .copied()
        .ok_or_else(|| ComicError::UnknownComic(key.to_string()))
}

/// Every registered key, sorted.
pub fn keys() -> Vec<&'static str> {
    let mut keys: Vec<_> = REGISTRY.keys().copied().collect();
    keys.sort_unstable();
    keys
}
