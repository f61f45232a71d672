//! Builds one digest email per subscriber.
//!
//! For every subscriber, in order, each comic key is resolved, fetched and
//! scraped independently. Whatever happens to one comic ends up as a single
//! line in that subscriber's digest; nothing here aborts the run.
//!
//! # Per-comic steps
//!
//! 1. Resolve the key in the [`registry`]
//! 2. Skip the fetch when the comic's schedule rules out the date
//! 3. Fetch the page through the [`ComicFetcher`]
//! 4. Extract the strip image from the page

use chrono::NaiveDate;
use tracing::{debug, info, instrument, warn};

use crate::comics::registry;
use crate::error::ComicError;
use crate::fetch::ComicFetcher;
use crate::models::{Digest, DigestLine, OutboundMessage, Subscription};

/// Turns subscriptions into outbound messages for one reference date.
#[derive(Debug)]
pub struct DigestBuilder<'a, F> {
    date: NaiveDate,
    sender: &'a str,
    fetcher: &'a F,
}

impl<'a, F> DigestBuilder<'a, F>
where
    F: ComicFetcher,
{
    /// # Arguments
    ///
    /// * `date` - Reference date for schedules, page URLs and the subject line
    /// * `sender` - `From` address for every message
    /// * `fetcher` - Source of page content, shared by all subscribers
    pub fn new(date: NaiveDate, sender: &'a str, fetcher: &'a F) -> Self {
        Self {
            date,
            sender,
            fetcher,
        }
    }

    /// One message per subscriber, in subscription order, even when none of
    /// their comics could be found.
    ///
    /// Per-comic failures never escape; they become lines in the digest.
    ///
    /// # Returns
    ///
    /// Exactly `subscriptions.len()` messages, ready for a [`crate::outputs::mail::MailSender`].
    #[instrument(level = "info", skip_all, fields(date = %self.date, subscribers = subscriptions.len()))]
    pub async fn build_digests(&self, subscriptions: &[Subscription]) -> Vec<OutboundMessage> {
        let mut messages = Vec::with_capacity(subscriptions.len());

        for subscription in subscriptions {
            let digest = self.build_digest(subscription).await;
            info!(
                recipient = %digest.recipient,
                comics = digest.lines.len(),
                images = digest.image_count(),
                "Built digest"
            );
            messages.push(OutboundMessage::new(self.sender, &digest, self.date));
        }

        messages
    }

    /// Digest lines for one subscriber, one per comic key.
    #[instrument(level = "info", skip_all, fields(recipient = %subscription.email))]
    pub async fn build_digest(&self, subscription: &Subscription) -> Digest {
        let mut digest = Digest::new(subscription.email.clone());

        for key in &subscription.comics {
            let outcome = self.find_comic(key).await;
            if let Err(e) = &outcome {
                match e {
                    ComicError::NotPublishedToday { .. } => debug!(%key, "Not published today"),
                    other => warn!(%key, error = %other, "Couldn't find comic"),
                }
            }
            digest.push(DigestLine::from_outcome(key, outcome));
        }

        digest
    }

    /// Resolve, fetch and scrape a single comic.
    async fn find_comic(&self, key: &str) -> Result<String, ComicError> {
        let comic = registry::resolve(key)?;

        if !comic.publishes_on(self.date) {
            return Err(ComicError::NotPublishedToday {
                key: key.to_string(),
                date: self.date,
            });
        }

        let url = comic.fetch_url(self.date);
        debug!(%key, %url, "Fetching comic page");
        let content = self
            .fetcher
            .get_content(&url)
            .await
            .map_err(|source| ComicError::FetchFailure {
                key: key.to_string(),
                source,
            })?;

        comic.extract_image(&content, self.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_subscriptions;
    use crate::fetch::testing::FakeFetcher;
    use pretty_assertions::assert_eq;

    const SENDER: &str = "comics@blairconrad.com";

    const DILBERT_IMAGE: &str = "https://assets.amuniversal.com/cfa39b00b39601365f19005056a9545d";
    const CHICKWEED_IMAGE: &str = "https://assets.amuniversal.com/e2a3c500c015013663ff005056a9545d";
    const CALVIN_SUNDAY_IMAGE: &str = "https://assets.amuniversal.com/65839a905f980136408e005056a9545d";
    const BLONDIE_IMAGE: &str = "http://safr.kingfeatures.com/Blondie/2018/04/Blondie.20180410_900.gif";
    const RHYMES_IMAGE: &str =
        "http://safr.kingfeatures.com/RhymesWithOrange/2018/04/Rhymes_with_Orange.20180410_900.gif";
    const FOXTROT_IMAGE: &str = "https://foxtrot.com/wp-content/uploads/2018/06/ft180624.png";

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2018, 6, d).unwrap()
    }

    // Wednesday
    fn weekday() -> NaiveDate {
        date(27)
    }

    fn dilbert_page() -> String {
        format!(r#"<div class="comic-item-container js-comic" data-image="{DILBERT_IMAGE}"></div>"#)
    }

    fn gocomics_page(image: &str) -> String {
        format!(r#"<picture class="item-comic-image"><img src="{image}"></picture>"#)
    }

    fn kingfeatures_page(payload: &str) -> String {
        format!(
            r#"<script src="https://safr.kingfeatures.com/idn/cnfeed/zone/js/content.php?file={payload}"></script>"#
        )
    }

    fn qwantz_page() -> String {
        r#"<img src="comics/comic2-3331.png" class="comic">"#.to_string()
    }

    fn foxtrot_page() -> String {
        format!(r#"<script type="application/ld+json">{{"image": "{FOXTROT_IMAGE}"}}</script>"#)
    }

    fn fetcher_for(date: NaiveDate) -> FakeFetcher {
        let chickweed = format!(
            "http://www.gocomics.com/9chickweedlane/{}/",
            date.format("%Y/%m/%d")
        );
        let calvin = format!(
            "http://www.gocomics.com/calvinandhobbes/{}/",
            date.format("%Y/%m/%d")
        );
        FakeFetcher::new()
            .with_page("http://www.dilbert.com/", &dilbert_page())
            .with_page(&chickweed, &gocomics_page(CHICKWEED_IMAGE))
            .with_page(&calvin, &gocomics_page(CALVIN_SUNDAY_IMAGE))
            .with_page(
                "http://blondie.com/",
                &kingfeatures_page(
                    "aHR0cDovL3NhZnIua2luZ2ZlYXR1cmVzLmNvbS9CbG9uZGllLzIwMTgvMDQvQmxvbmRpZS4yMDE4MDQxMF85MDAuZ2lm",
                ),
            )
            .with_page(
                "http://rhymeswithorange.com/",
                &kingfeatures_page(
                    "aHR0cDovL3NhZnIua2luZ2ZlYXR1cmVzLmNvbS9SaHltZXNXaXRoT3JhbmdlLzIwMTgvMDQvUmh5bWVzX3dpdGhfT3JhbmdlLjIwMTgwNDEwXzkwMC5naWY=",
                ),
            )
            .with_page("http://www.qwantz.com/index.php", &qwantz_page())
            .with_page("https://foxtrot.com/", &foxtrot_page())
    }

    async fn build(text: &str, date: NaiveDate, fetcher: &FakeFetcher) -> Vec<OutboundMessage> {
        let subscriptions = parse_subscriptions(text).unwrap();
        DigestBuilder::new(date, SENDER, fetcher)
            .build_digests(&subscriptions)
            .await
    }

    #[tokio::test]
    async fn test_one_subscriber_two_comics() {
        let fetcher = fetcher_for(weekday());
        let mails = build("a@x.com: dilbert, 9chickweedlane", weekday(), &fetcher).await;

        assert_eq!(mails.len(), 1);
        assert_eq!(mails[0].sender(), SENDER);
        assert_eq!(mails[0].recipient(), "a@x.com");
        assert!(mails[0].body().contains(DILBERT_IMAGE));
        assert!(mails[0].body().contains(CHICKWEED_IMAGE));
    }

    #[tokio::test]
    async fn test_two_subscribers_one_comic_each() {
        let fetcher = fetcher_for(weekday());
        let mails = build("a@x.com: 9chickweedlane; b@y.com: dilbert", weekday(), &fetcher).await;

        assert_eq!(mails.len(), 2);
        assert_eq!(mails[0].recipient(), "a@x.com");
        assert!(mails[0].body().contains(CHICKWEED_IMAGE));
        assert!(!mails[0].body().contains(DILBERT_IMAGE));
        assert_eq!(mails[1].recipient(), "b@y.com");
        assert!(mails[1].body().contains(DILBERT_IMAGE));
        assert!(!mails[1].body().contains(CHICKWEED_IMAGE));
    }

    #[tokio::test]
    async fn test_king_features_comics() {
        let fetcher = fetcher_for(weekday());
        let mails = build("a@x.com: blondie, rhymeswithorange", weekday(), &fetcher).await;

        assert_eq!(mails.len(), 1);
        assert!(mails[0].body().contains(BLONDIE_IMAGE), "it should have Blondie");
        assert!(mails[0].body().contains(RHYMES_IMAGE), "it should have Rhymes with Orange");
    }

    #[tokio::test]
    async fn test_queries_fetcher_with_correct_url() {
        for (comic, expected_url) in [
            ("dilbert", "http://www.dilbert.com/"),
            ("blondie", "http://blondie.com/"),
            ("9chickweedlane", "http://www.gocomics.com/9chickweedlane/2018/06/27/"),
        ] {
            let fetcher = FakeFetcher::new();
            build(&format!("a@x.com: {comic}"), weekday(), &fetcher).await;
            assert_eq!(fetcher.requested(), vec![expected_url.to_string()]);
        }
    }

    #[tokio::test]
    async fn test_dinosaur_comics_on_weekend_not_published() {
        for day in [date(23), date(24)] {
            let fetcher = fetcher_for(day);
            let mails = build("a@x.com: dinosaur-comics", day, &fetcher).await;

            assert_eq!(mails.len(), 1);
            let body = mails[0].body();
            assert!(!body.contains("Couldn't find comic for dinosaur-comics."));
            assert!(body.contains("Comic dinosaur-comics wasn't published today."));
            assert!(fetcher.requested().is_empty(), "it should not have looked for the comic");
        }
    }

    #[tokio::test]
    async fn test_dinosaur_comics_on_weekday_includes_comic() {
        for d in 25..=29 {
            let day = date(d);
            let fetcher = fetcher_for(day);
            let mails = build("a@x.com: dinosaur-comics", day, &fetcher).await;

            assert_eq!(mails.len(), 1);
            let body = mails[0].body();
            assert!(!body.contains("Couldn't find comic for dinosaur-comics."));
            assert!(!body.contains("Comic dinosaur-comics wasn't published today."));
            assert!(body.contains("http://www.qwantz.com/comics/comic2-3331.png"));
        }
    }

    #[tokio::test]
    async fn test_foxtrot_on_anything_but_sunday_not_published() {
        for d in 25..=30 {
            let day = date(d);
            let fetcher = fetcher_for(day);
            let mails = build("a@x.com: foxtrot", day, &fetcher).await;

            assert_eq!(mails.len(), 1);
            let body = mails[0].body();
            assert!(!body.contains("Couldn't find comic for foxtrot."));
            assert!(body.contains("Comic foxtrot wasn't published today."));
        }
    }

    #[tokio::test]
    async fn test_foxtrot_on_sunday_includes_comic() {
        let fetcher = fetcher_for(date(24));
        let mails = build("a@x.com: foxtrot", date(24), &fetcher).await;

        let body = mails[0].body();
        assert!(!body.contains("Couldn't find comic for foxtrot."));
        assert!(!body.contains("Comic foxtrot wasn't published today."));
        assert!(body.contains(FOXTROT_IMAGE));
    }

    #[tokio::test]
    async fn test_calvin_and_hobbes_on_sunday() {
        let fetcher = fetcher_for(date(24));
        let mails = build("a@x.com: calvinandhobbes", date(24), &fetcher).await;

        let body = mails[0].body();
        assert!(!body.contains("Couldn't find comic for calvinandhobbes."));
        assert!(body.contains(CALVIN_SUNDAY_IMAGE));
    }

    #[tokio::test]
    async fn test_unknown_comic_does_not_abort_digest() {
        let fetcher = fetcher_for(weekday());
        let mails = build("a@x.com: garfield, dilbert", weekday(), &fetcher).await;

        assert_eq!(mails.len(), 1);
        assert_eq!(
            mails[0].body(),
            format!(
                "<p>Couldn't find comic for garfield.</p>\n<p><img src=\"{DILBERT_IMAGE}\"></p>"
            )
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_becomes_not_found_line() {
        // Nothing registered for blondie.com, so the fetch fails.
        let fetcher = FakeFetcher::new().with_page("http://www.dilbert.com/", &dilbert_page());
        let mails = build("a@x.com: blondie, dilbert", weekday(), &fetcher).await;

        let body = mails[0].body();
        assert!(body.contains("Couldn't find comic for blondie."));
        assert!(body.contains(DILBERT_IMAGE));
    }

    #[tokio::test]
    async fn test_extraction_failure_becomes_not_found_line() {
        let fetcher = FakeFetcher::new().with_page("http://www.dilbert.com/", "<html>redesigned</html>");
        let mails = build("a@x.com: dilbert", weekday(), &fetcher).await;

        assert_eq!(mails[0].body(), "<p>Couldn't find comic for dilbert.</p>");
    }

    #[tokio::test]
    async fn test_every_subscriber_gets_a_message() {
        let fetcher = FakeFetcher::new();
        let mails = build("a@x.com: garfield; b@y.com: dilbert; c@z.com:", weekday(), &fetcher).await;

        let recipients: Vec<_> = mails.iter().map(|m| m.recipient()).collect();
        assert_eq!(recipients, vec!["a@x.com", "b@y.com", "c@z.com"]);
        assert_eq!(mails[2].body(), "");
    }

    #[tokio::test]
    async fn test_line_order_matches_subscription_order() {
        let fetcher = fetcher_for(date(24));
        let subscription = Subscription {
            email: "a@x.com".to_string(),
            comics: vec![
                "foxtrot".to_string(),
                "garfield".to_string(),
                "dinosaur-comics".to_string(),
                "calvinandhobbes".to_string(),
            ],
        };

        let digest = DigestBuilder::new(date(24), SENDER, &fetcher)
            .build_digest(&subscription)
            .await;

        assert_eq!(
            digest.lines,
            vec![
                DigestLine::Image(FOXTROT_IMAGE.to_string()),
                DigestLine::NotFound("garfield".to_string()),
                DigestLine::NotPublished("dinosaur-comics".to_string()),
                DigestLine::Image(CALVIN_SUNDAY_IMAGE.to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_duplicate_urls_are_fetched_per_subscriber() {
        let fetcher = fetcher_for(weekday());
        build("a@x.com: dilbert; b@y.com: dilbert", weekday(), &fetcher).await;

        assert_eq!(
            fetcher.requested(),
            vec!["http://www.dilbert.com/".to_string(), "http://www.dilbert.com/".to_string()]
        );
    }
}
