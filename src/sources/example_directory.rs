use async_trait::async_trait;
use log::debug;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::SourceError;
use crate::record::{Record, DEFAULT_CATEGORY};
use crate::source::{RecordStream, Source};

const BASE: &str = "https://example-eg-directory.test/maintenance";
const PAGES: u32 = 5;

// Point `BASE` at a real, permitted domain before running in production, and check the
// site's robots.txt and terms first.
pub struct ExampleDirectory {
    base: String,
}

struct Card {
    name: Option<String>,
    phone: Option<String>,
    city: Option<String>,
    address: Option<String>,
    category: Option<String>,
    href: Option<String>,
}

struct Selectors {
    card: Selector,
    name: Selector,
    phone: Selector,
    city: Selector,
    address: Selector,
    category: Selector,
    details: Selector,
}

impl ExampleDirectory {
    pub fn new() -> Self {
        Self::with_base(BASE)
    }

    pub fn with_base(base: impl Into<String>) -> Self {
        ExampleDirectory { base: base.into() }
    }

    fn parse_error(&self, url: &str, reason: impl ToString) -> SourceError {
        SourceError::Parse {
            source_name: self.name().to_string(),
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    fn selectors(&self, url: &str) -> Result<Selectors, SourceError> {
        let sel = |css: &str| Selector::parse(css).map_err(|e| self.parse_error(url, e));
        Ok(Selectors {
            card: sel("div.listing-card")?,
            name: sel(".name")?,
            phone: sel(".phone")?,
            city: sel(".city")?,
            address: sel(".address")?,
            category: sel(".category")?,
            details: sel("a.details")?,
        })
    }
}

impl Default for ExampleDirectory {
    fn default() -> Self {
        Self::new()
    }
}

fn first_text(card: &ElementRef, selector: &Selector) -> Option<String> {
    card.select(selector)
        .next()
        .map(|el| el.text().collect::<String>())
}

#[async_trait]
impl Source for ExampleDirectory {
    fn name(&self) -> &str {
        "example_directory"
    }

    async fn seed_urls(&self) -> Result<Vec<String>, SourceError> {
        Ok((1..=PAGES)
            .map(|page| format!("{}?page={}", self.base, page))
            .collect())
    }

    fn parse(&self, content: &str, origin_url: &str) -> Result<RecordStream, SourceError> {
        let selectors = self.selectors(origin_url)?;
        let document = Html::parse_document(content);

        let cards: Vec<Card> = document
            .select(&selectors.card)
            .map(|card| Card {
                name: first_text(&card, &selectors.name),
                phone: first_text(&card, &selectors.phone),
                city: first_text(&card, &selectors.city),
                address: first_text(&card, &selectors.address),
                category: first_text(&card, &selectors.category),
                href: card
                    .select(&selectors.details)
                    .next()
                    .and_then(|a| a.value().attr("href"))
                    .map(str::to_string),
            })
            .collect();
        debug!("{} cards on {}", cards.len(), origin_url);

        let source = self.name().to_string();
        let origin = origin_url.to_string();
        let base = Url::parse(origin_url).ok();

        Ok(Box::new(cards.into_iter().filter_map(move |card| {
            let item_url = card
                .href
                .and_then(|href| match &base {
                    Some(base) => base.join(&href).ok().map(|u| u.to_string()),
                    None => Some(href),
                })
                .filter(|u| !u.trim().is_empty())
                .unwrap_or_else(|| origin.clone());

            Record::new(source.clone(), item_url).map(|record| {
                record
                    .with_name(card.name)
                    .with_phone(card.phone)
                    .with_city(card.city)
                    .with_address(card.address)
                    .with_category(card.category.or_else(|| Some(DEFAULT_CATEGORY.to_string())))
            })
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <div class="listing-card">
            <span class="name">Ahmed Plumbing</span>
            <span class="phone">0100 123 4567</span>
            <span class="city">Giza </span>
            <span class="address">12 Pyramids St</span>
            <span class="category">Plumbing</span>
            <a class="details" href="/tech/42">More</a>
          </div>
          <div class="listing-card">
            <span class="name">Nour AC Repair</span>
          </div>
          <div class="other-card"><span class="name">Ignored</span></div>
        </body></html>
    "#;

    #[tokio::test]
    async fn seeds_are_five_paginated_pages() {
        let seeds = ExampleDirectory::new().seed_urls().await.unwrap();
        assert_eq!(seeds.len(), 5);
        assert_eq!(seeds[0], "https://example-eg-directory.test/maintenance?page=1");
        assert_eq!(seeds[4], "https://example-eg-directory.test/maintenance?page=5");
    }

    #[test]
    fn parses_listing_cards() {
        let origin = "https://example-eg-directory.test/maintenance?page=1";
        let records: Vec<Record> = ExampleDirectory::new().parse(PAGE, origin).unwrap().collect();
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.source(), "example_directory");
        assert_eq!(first.url(), "https://example-eg-directory.test/tech/42");
        assert_eq!(first.name.as_deref(), Some("Ahmed Plumbing"));
        assert_eq!(first.phone.as_deref(), Some("0100 123 4567"));
        assert_eq!(first.city.as_deref(), Some("Giza "));
        assert_eq!(first.category.as_deref(), Some("Plumbing"));

        let second = &records[1];
        assert_eq!(second.url(), origin);
        assert_eq!(second.phone, None);
        assert_eq!(second.category.as_deref(), Some(DEFAULT_CATEGORY));
    }

    #[test]
    fn page_without_cards_yields_nothing() {
        let mut stream = ExampleDirectory::new()
            .parse("<html></html>", "https://example-eg-directory.test/maintenance?page=2")
            .unwrap();
        assert!(stream.next().is_none());
    }
}
