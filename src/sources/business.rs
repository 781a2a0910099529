// src/sources/business.rs - Directory scrapers for business leads
use std::sync::Arc;

use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::{info, warn};

use crate::error::Result;
use crate::fetch::Fetcher;
use crate::models::{LeadKind, RawRecord};

use super::{url_encode, SourceAdapter};

fn record(pairs: Vec<(&str, String)>) -> RawRecord {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

fn select_text(element: scraper::ElementRef<'_>, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .next()
        .map(|e| e.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}

fn select_attr(element: scraper::ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
    element
        .select(selector)
        .next()
        .and_then(|e| e.value().attr(attr))
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Google Maps

pub struct GoogleMaps {
    fetcher: Arc<Fetcher>,
}

impl GoogleMaps {
    pub fn new(fetcher: Arc<Fetcher>) -> Self {
        Self { fetcher }
    }

    // Html is !Send, so parsing stays in a sync helper and never crosses an
    // await point.
    fn parse_results(html: &str, industry: &str, location: &str, count: usize) -> Vec<RawRecord> {
        let document = Html::parse_document(html);
        let card = Selector::parse("div.Nv2PK, div[role='article']").unwrap();
        let name_sel = Selector::parse("div.qBF1Pd, .fontHeadlineSmall").unwrap();
        let detail_sel = Selector::parse("div.W4Efsd").unwrap();
        let link_sel = Selector::parse("a[href]").unwrap();

        let mut records = Vec::new();
        for element in document.select(&card).take(count) {
            let Some(name) = select_text(element, &name_sel) else {
                continue;
            };
            let address = element
                .select(&detail_sel)
                .nth(1)
                .map(|e| e.text().collect::<String>())
                .map(|t| t.split('·').next().unwrap_or(&t).trim().to_string())
                .unwrap_or_default();
            let website = select_attr(element, &link_sel, "href").unwrap_or_default();

            records.push(record(vec![
                ("Name", name),
                ("Address", address),
                ("Website", website),
                ("Industry", industry.to_string()),
                ("Location", location.to_string()),
            ]));
        }
        records
    }
}

#[async_trait]
impl SourceAdapter for GoogleMaps {
    fn id(&self) -> &'static str {
        "google_maps"
    }

    fn kind(&self) -> LeadKind {
        LeadKind::Business
    }

    async fn fetch(&self, industry: &str, location: &str, count: usize) -> Result<Vec<RawRecord>> {
        let query = url_encode(&format!("{} in {}", industry, location));
        let url = format!("https://www.google.com/maps/search/{}", query);
        info!("Searching Google Maps for {} in {}", industry, location);

        let html = self.fetcher.get_text(&url).await?;
        let records = Self::parse_results(&html, industry, location, count);
        info!("google_maps: {} listings parsed", records.len());
        Ok(records)
    }
}

// ---------------------------------------------------------------------------
// Yelp

pub struct Yelp {
    fetcher: Arc<Fetcher>,
}

impl Yelp {
    pub fn new(fetcher: Arc<Fetcher>) -> Self {
        Self { fetcher }
    }

    fn parse_listing(html: &str, count: usize) -> Vec<(String, Option<String>)> {
        let document = Html::parse_document(html);
        let name_sel = Selector::parse("div[class*='businessName'] a, h3 a[href^='/biz/']").unwrap();

        document
            .select(&name_sel)
            .take(count)
            .map(|a| {
                let name = a.text().collect::<String>().trim().to_string();
                let link = a
                    .value()
                    .attr("href")
                    .map(|h| format!("https://www.yelp.com{}", h));
                (name, link)
            })
            .filter(|(name, _)| !name.is_empty())
            .collect()
    }

    fn parse_detail(html: &str) -> (Option<String>, Option<String>, Option<String>) {
        let document = Html::parse_document(html);
        let address_sel = Selector::parse("address").unwrap();
        let phone_sel = Selector::parse("p[class*='css-1p9ibgf']").unwrap();
        let website_sel = Selector::parse("a[href^='https://www.yelp.com/biz_redir']").unwrap();

        let address = document
            .select(&address_sel)
            .next()
            .map(|e| {
                e.text()
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .filter(|t| !t.is_empty());

        let phone = document
            .select(&phone_sel)
            .map(|e| e.text().collect::<String>().trim().to_string())
            .find(|t| t.len() > 6 && t.chars().any(|c| c.is_ascii_digit()));

        let website = document
            .select(&website_sel)
            .next()
            .and_then(|e| e.value().attr("href"))
            .map(str::to_string);

        (address, phone, website)
    }
}

#[async_trait]
impl SourceAdapter for Yelp {
    fn id(&self) -> &'static str {
        "yelp"
    }

    fn kind(&self) -> LeadKind {
        LeadKind::Business
    }

    async fn fetch(&self, industry: &str, location: &str, count: usize) -> Result<Vec<RawRecord>> {
        let url = format!(
            "https://www.yelp.com/search?find_desc={}&find_loc={}",
            url_encode(industry),
            url_encode(location)
        );
        info!("Searching Yelp for {} in {}", industry, location);

        let html = self.fetcher.get_text(&url).await?;
        let listings = Self::parse_listing(&html, count);

        let mut records = Vec::new();
        for (name, link) in listings {
            let (mut address, mut phone, mut website) = (None, None, None);
            if let Some(link) = link {
                // Detail pages carry the contact data; rate-limited per call
                self.fetcher.pause().await;
                match self.fetcher.get_text(&link).await {
                    Ok(detail_html) => {
                        let parsed = Self::parse_detail(&detail_html);
                        address = parsed.0;
                        phone = parsed.1;
                        website = parsed.2;
                    }
                    Err(e) => warn!("yelp: detail fetch failed for {}: {}", name, e),
                }
            }

            records.push(record(vec![
                ("Name", name),
                ("Address", address.unwrap_or_default()),
                ("Phone", phone.unwrap_or_default()),
                ("Website", website.unwrap_or_default()),
                ("Industry", industry.to_string()),
                ("Location", location.to_string()),
            ]));
        }

        info!("yelp: {} listings parsed", records.len());
        Ok(records)
    }
}

// ---------------------------------------------------------------------------
// Yellow Pages

pub struct YellowPages {
    fetcher: Arc<Fetcher>,
}

impl YellowPages {
    pub fn new(fetcher: Arc<Fetcher>) -> Self {
        Self { fetcher }
    }

    fn parse_results(html: &str, industry: &str, location: &str, count: usize) -> Vec<RawRecord> {
        let document = Html::parse_document(html);
        let result_sel = Selector::parse("div.result").unwrap();
        let name_sel = Selector::parse("a.business-name").unwrap();
        let street_sel = Selector::parse("div.street-address").unwrap();
        let locality_sel = Selector::parse("div.locality").unwrap();
        let phone_sel = Selector::parse("div.phones").unwrap();
        let website_sel = Selector::parse("a.track-visit-website").unwrap();

        let mut records = Vec::new();
        for element in document.select(&result_sel).take(count) {
            let Some(name) = select_text(element, &name_sel) else {
                continue;
            };
            let address = match (
                select_text(element, &street_sel),
                select_text(element, &locality_sel),
            ) {
                (Some(street), Some(locality)) => format!("{}, {}", street, locality),
                (Some(street), None) => street,
                _ => String::new(),
            };
            let phone = select_text(element, &phone_sel).unwrap_or_default();
            let website = select_attr(element, &website_sel, "href").unwrap_or_default();

            records.push(record(vec![
                ("Name", name),
                ("Address", address),
                ("Phone", phone),
                ("Website", website),
                ("Industry", industry.to_string()),
                ("Location", location.to_string()),
            ]));
        }
        records
    }
}

#[async_trait]
impl SourceAdapter for YellowPages {
    fn id(&self) -> &'static str {
        "yellow_pages"
    }

    fn kind(&self) -> LeadKind {
        LeadKind::Business
    }

    async fn fetch(&self, industry: &str, location: &str, count: usize) -> Result<Vec<RawRecord>> {
        let url = format!(
            "https://www.yellowpages.com/search?search_terms={}&geo_location_terms={}",
            url_encode(industry),
            url_encode(location)
        );
        info!("Searching Yellow Pages for {} in {}", industry, location);

        let html = self.fetcher.get_text(&url).await?;
        let records = Self::parse_results(&html, industry, location, count);
        info!("yellow_pages: {} listings parsed", records.len());
        Ok(records)
    }
}

// ---------------------------------------------------------------------------
// Better Business Bureau

pub struct BetterBusinessBureau {
    fetcher: Arc<Fetcher>,
}

impl BetterBusinessBureau {
    pub fn new(fetcher: Arc<Fetcher>) -> Self {
        Self { fetcher }
    }

    fn parse_listing(html: &str, count: usize) -> Vec<(String, Option<String>)> {
        let document = Html::parse_document(html);
        let title_sel = Selector::parse("h3.result-title a, a.bpr-search-result-name").unwrap();

        document
            .select(&title_sel)
            .take(count)
            .map(|a| {
                let name = a.text().collect::<String>().trim().to_string();
                let link = a.value().attr("href").map(|h| {
                    if h.starts_with("http") {
                        h.to_string()
                    } else {
                        format!("https://www.bbb.org{}", h)
                    }
                });
                (name, link)
            })
            .filter(|(name, _)| !name.is_empty())
            .collect()
    }

    fn parse_detail(html: &str) -> (Option<String>, Option<String>, Option<String>, Option<String>) {
        let document = Html::parse_document(html);
        let address_sel = Selector::parse("div.dtm-address").unwrap();
        let phone_sel = Selector::parse("div.dtm-phone").unwrap();
        let website_sel = Selector::parse("a.dtm-url").unwrap();
        let rating_sel = Selector::parse("div.rating, span.bpr-letter-grade").unwrap();

        let flat_text = |sel: &Selector| {
            document
                .select(sel)
                .next()
                .map(|e| {
                    e.text()
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .filter(|t| !t.is_empty())
        };

        let address = flat_text(&address_sel);
        let phone = flat_text(&phone_sel);
        let website = document
            .select(&website_sel)
            .next()
            .and_then(|e| e.value().attr("href"))
            .map(str::to_string);
        let rating = flat_text(&rating_sel);

        (address, phone, website, rating)
    }
}

#[async_trait]
impl SourceAdapter for BetterBusinessBureau {
    fn id(&self) -> &'static str {
        "better_business_bureau"
    }

    fn kind(&self) -> LeadKind {
        LeadKind::Business
    }

    async fn fetch(&self, industry: &str, location: &str, count: usize) -> Result<Vec<RawRecord>> {
        let url = format!(
            "https://www.bbb.org/search?filter_category={}&filter_city={}",
            url_encode(industry),
            url_encode(location)
        );
        info!("Searching BBB for {} in {}", industry, location);

        let html = self.fetcher.get_text(&url).await?;
        let listings = Self::parse_listing(&html, count);

        let mut records = Vec::new();
        for (name, link) in listings {
            let (mut address, mut phone, mut website, mut rating) = (None, None, None, None);
            if let Some(link) = link {
                self.fetcher.pause().await;
                match self.fetcher.get_text(&link).await {
                    Ok(detail_html) => {
                        let parsed = Self::parse_detail(&detail_html);
                        address = parsed.0;
                        phone = parsed.1;
                        website = parsed.2;
                        rating = parsed.3;
                    }
                    Err(e) => warn!("better_business_bureau: detail fetch failed for {}: {}", name, e),
                }
            }

            records.push(record(vec![
                ("Name", name),
                ("Address", address.unwrap_or_default()),
                ("Phone", phone.unwrap_or_default()),
                ("Website", website.unwrap_or_default()),
                ("BBB Rating", rating.unwrap_or_default()),
                ("Industry", industry.to_string()),
                ("Location", location.to_string()),
            ]));
        }

        info!("better_business_bureau: {} listings parsed", records.len());
        Ok(records)
    }
}

// ---------------------------------------------------------------------------
// Chambers of Commerce

pub struct ChambersOfCommerce {
    fetcher: Arc<Fetcher>,
}

impl ChambersOfCommerce {
    pub fn new(fetcher: Arc<Fetcher>) -> Self {
        Self { fetcher }
    }

    fn parse_directory(html: &str, industry: &str, location: &str, count: usize) -> Vec<RawRecord> {
        let document = Html::parse_document(html);
        // GrowthZone is the common chamber directory platform
        let card_sel = Selector::parse("div.gz-list-card, div.mn-listing, li.directory-item").unwrap();
        let name_sel = Selector::parse("h5 a, h2.mn-title a, a.card-header").unwrap();
        let address_sel = Selector::parse("li.gz-card-address, div.mn-address1, span.address").unwrap();
        let phone_sel = Selector::parse("li.gz-card-phone, div.mn-phone1, span.phone").unwrap();
        let website_sel = Selector::parse("li.gz-card-website a, a.mn-weblink").unwrap();

        let mut records = Vec::new();
        for element in document.select(&card_sel).take(count) {
            let Some(name) = select_text(element, &name_sel) else {
                continue;
            };
            records.push(record(vec![
                ("Name", name),
                ("Address", select_text(element, &address_sel).unwrap_or_default()),
                ("Phone", select_text(element, &phone_sel).unwrap_or_default()),
                ("Website", select_attr(element, &website_sel, "href").unwrap_or_default()),
                ("Industry", industry.to_string()),
                ("Location", location.to_string()),
            ]));
        }
        records
    }
}

#[async_trait]
impl SourceAdapter for ChambersOfCommerce {
    fn id(&self) -> &'static str {
        "chambers_of_commerce"
    }

    fn kind(&self) -> LeadKind {
        LeadKind::Business
    }

    async fn fetch(&self, industry: &str, location: &str, count: usize) -> Result<Vec<RawRecord>> {
        let slug: String = location
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        let url = format!(
            "https://www.{}chamber.org/directory/search?q={}",
            slug,
            url_encode(industry)
        );
        info!("Searching Chamber of Commerce directory for {} in {}", industry, location);

        let html = self.fetcher.get_text(&url).await?;
        let records = Self::parse_directory(&html, industry, location, count);
        info!("chambers_of_commerce: {} listings parsed", records.len());
        Ok(records)
    }
}

// ---------------------------------------------------------------------------
// Indeed (companies discovered via job postings)

pub struct Indeed {
    fetcher: Arc<Fetcher>,
}

impl Indeed {
    pub fn new(fetcher: Arc<Fetcher>) -> Self {
        Self { fetcher }
    }

    fn parse_results(html: &str, industry: &str, count: usize) -> Vec<RawRecord> {
        let document = Html::parse_document(html);
        let card_sel = Selector::parse("div.job_seen_beacon").unwrap();
        let company_sel = Selector::parse("span.companyName, span[data-testid='company-name']").unwrap();
        let title_sel = Selector::parse("h2.jobTitle").unwrap();
        let location_sel = Selector::parse("div.companyLocation, div[data-testid='text-location']").unwrap();
        let salary_sel = Selector::parse("div.salary-snippet, div.metadata.salary-snippet-container").unwrap();

        let mut seen = std::collections::HashSet::new();
        let mut records = Vec::new();
        for card in document.select(&card_sel) {
            if records.len() >= count {
                break;
            }
            let Some(company) = select_text(card, &company_sel) else {
                continue;
            };
            // One record per company, not per posting
            if !seen.insert(company.clone()) {
                continue;
            }
            records.push(record(vec![
                ("Company", company),
                ("Recent Job Posting", select_text(card, &title_sel).unwrap_or_default()),
                ("Location", select_text(card, &location_sel).unwrap_or_default()),
                ("Estimated Salary", select_text(card, &salary_sel).unwrap_or_default()),
                ("Industry", industry.to_string()),
            ]));
        }
        records
    }
}

#[async_trait]
impl SourceAdapter for Indeed {
    fn id(&self) -> &'static str {
        "indeed"
    }

    fn kind(&self) -> LeadKind {
        LeadKind::Business
    }

    async fn fetch(&self, industry: &str, location: &str, count: usize) -> Result<Vec<RawRecord>> {
        let url = format!(
            "https://www.indeed.com/jobs?q={}&l={}",
            url_encode(industry),
            url_encode(location)
        );
        info!("Searching Indeed for {} companies in {}", industry, location);

        let html = self.fetcher.get_text(&url).await?;
        let records = Self::parse_results(&html, industry, count);
        info!("indeed: {} companies parsed", records.len());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yellow_pages_parses_result_cards() {
        let html = r#"
            <html><body>
              <div class="result">
                <a class="business-name">Blue Bonnet Bakery</a>
                <div class="street-address">100 Congress Ave</div>
                <div class="locality">Austin, TX 78701</div>
                <div class="phones">(512) 555-0134</div>
                <a class="track-visit-website" href="https://bluebonnet.com"></a>
              </div>
              <div class="result">
                <a class="business-name">Dough &amp; Co</a>
                <div class="phones">(512) 555-0188</div>
              </div>
            </body></html>"#;
        let records = YellowPages::parse_results(html, "bakery", "Austin", 10);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["Name"], "Blue Bonnet Bakery");
        assert_eq!(records[0]["Address"], "100 Congress Ave, Austin, TX 78701");
        assert_eq!(records[0]["Phone"], "(512) 555-0134");
        assert_eq!(records[0]["Website"], "https://bluebonnet.com");
        assert_eq!(records[1]["Name"], "Dough & Co");
        assert_eq!(records[1]["Address"], "");
    }

    #[test]
    fn yellow_pages_honors_count_limit() {
        let html = r#"
            <div class="result"><a class="business-name">A</a></div>
            <div class="result"><a class="business-name">B</a></div>
            <div class="result"><a class="business-name">C</a></div>"#;
        let records = YellowPages::parse_results(html, "bakery", "Austin", 2);
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn indeed_deduplicates_companies_across_postings() {
        let html = r#"
            <div class="job_seen_beacon">
              <span class="companyName">Dough &amp; Co</span>
              <h2 class="jobTitle">Head Baker</h2>
              <div class="companyLocation">Austin, TX</div>
            </div>
            <div class="job_seen_beacon">
              <span class="companyName">Dough &amp; Co</span>
              <h2 class="jobTitle">Pastry Chef</h2>
            </div>
            <div class="job_seen_beacon">
              <span class="companyName">Crumb Town</span>
              <h2 class="jobTitle">Cashier</h2>
            </div>"#;
        let records = Indeed::parse_results(html, "bakery", 10);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["Company"], "Dough & Co");
        assert_eq!(records[0]["Recent Job Posting"], "Head Baker");
        assert_eq!(records[1]["Company"], "Crumb Town");
    }

    #[test]
    fn yelp_detail_page_extracts_contact_fields() {
        let html = r#"
            <html><body>
              <address><p>100 Congress Ave</p><p>Austin, TX 78701</p></address>
              <p class="css-1p9ibgf">(512) 555-0134</p>
              <a href="https://www.yelp.com/biz_redir?url=https%3A%2F%2Fbluebonnet.com">site</a>
            </body></html>"#;
        let (address, phone, website) = Yelp::parse_detail(html);
        assert_eq!(address.as_deref(), Some("100 Congress Ave, Austin, TX 78701"));
        assert_eq!(phone.as_deref(), Some("(512) 555-0134"));
        assert!(website.unwrap().contains("biz_redir"));
    }
}
