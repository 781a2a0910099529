// src/sources/institutional.rs - Registries and directories for institutions
use std::sync::Arc;

use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::info;

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

fn text_of(element: scraper::ElementRef<'_>, selector: &Selector) -> String {
    element
        .select(selector)
        .next()
        .map(|e| e.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

fn href_of(element: scraper::ElementRef<'_>, selector: &Selector) -> String {
    element
        .select(selector)
        .next()
        .and_then(|e| e.value().attr("href"))
        .unwrap_or_default()
        .to_string()
}

fn location_slug(location: &str) -> String {
    location
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

// ---------------------------------------------------------------------------
// Government websites - city/state department directory

pub struct GovernmentWebsites {
    fetcher: Arc<Fetcher>,
}

impl GovernmentWebsites {
    pub fn new(fetcher: Arc<Fetcher>) -> Self {
        Self { fetcher }
    }

    fn parse_directory(html: &str, industry: &str, location: &str, count: usize) -> Vec<RawRecord> {
        let document = Html::parse_document(html);
        let row_sel = Selector::parse("li.department, div.dept-listing, tr.department-row").unwrap();
        let name_sel = Selector::parse("a, h3").unwrap();
        let phone_sel = Selector::parse("span.phone, td.phone").unwrap();
        let email_sel = Selector::parse("a[href^='mailto:']").unwrap();

        let mut records = Vec::new();
        for row in document.select(&row_sel).take(count) {
            let name = text_of(row, &name_sel);
            if name.is_empty() {
                continue;
            }
            let email = href_of(row, &email_sel)
                .trim_start_matches("mailto:")
                .to_string();
            records.push(record(vec![
                ("Organization", name),
                ("Type", "Government".to_string()),
                ("Phone", text_of(row, &phone_sel)),
                ("Contact Email", email),
                ("Website", href_of(row, &name_sel)),
                ("Industry", industry.to_string()),
                ("Location", location.to_string()),
            ]));
        }
        records
    }
}

#[async_trait]
impl SourceAdapter for GovernmentWebsites {
    fn id(&self) -> &'static str {
        "government_websites"
    }

    fn kind(&self) -> LeadKind {
        LeadKind::Institutional
    }

    async fn fetch(&self, industry: &str, location: &str, count: usize) -> Result<Vec<RawRecord>> {
        let url = format!(
            "https://www.{}.gov/departments?topic={}",
            location_slug(location),
            url_encode(industry)
        );
        info!("Searching government directory for {} in {}", industry, location);

        let html = self.fetcher.get_text(&url).await?;
        let records = Self::parse_directory(&html, industry, location, count);
        info!("government_websites: {} departments parsed", records.len());
        Ok(records)
    }
}

// ---------------------------------------------------------------------------
// Association directories

pub struct AssociationDirectories {
    fetcher: Arc<Fetcher>,
}

impl AssociationDirectories {
    pub fn new(fetcher: Arc<Fetcher>) -> Self {
        Self { fetcher }
    }

    fn parse_directory(html: &str, industry: &str, location: &str, count: usize) -> Vec<RawRecord> {
        let document = Html::parse_document(html);
        let card_sel = Selector::parse("div.association-card, li.assoc-entry").unwrap();
        let name_sel = Selector::parse("h3 a, a.assoc-name").unwrap();
        let address_sel = Selector::parse("span.address").unwrap();
        let members_sel = Selector::parse("span.member-count").unwrap();
        let founded_sel = Selector::parse("span.founded").unwrap();

        let mut records = Vec::new();
        for card in document.select(&card_sel).take(count) {
            let name = text_of(card, &name_sel);
            if name.is_empty() {
                continue;
            }
            records.push(record(vec![
                ("Organization", name),
                ("Type", "Association".to_string()),
                ("Address", text_of(card, &address_sel)),
                ("Website", href_of(card, &name_sel)),
                ("Members", text_of(card, &members_sel)),
                ("Founded", text_of(card, &founded_sel)),
                ("Industry", industry.to_string()),
                ("Location", location.to_string()),
            ]));
        }
        records
    }
}

#[async_trait]
impl SourceAdapter for AssociationDirectories {
    fn id(&self) -> &'static str {
        "association_directories"
    }

    fn kind(&self) -> LeadKind {
        LeadKind::Institutional
    }

    async fn fetch(&self, industry: &str, location: &str, count: usize) -> Result<Vec<RawRecord>> {
        let url = format!(
            "https://www.directoryofassociations.com/search?industry={}&location={}",
            url_encode(industry),
            url_encode(location)
        );
        info!("Searching association directories for {} in {}", industry, location);

        let html = self.fetcher.get_text(&url).await?;
        let records = Self::parse_directory(&html, industry, location, count);
        info!("association_directories: {} associations parsed", records.len());
        Ok(records)
    }
}

// ---------------------------------------------------------------------------
// Guidestar / Candid - nonprofit registry

pub struct Guidestar {
    fetcher: Arc<Fetcher>,
}

impl Guidestar {
    pub fn new(fetcher: Arc<Fetcher>) -> Self {
        Self { fetcher }
    }

    fn parse_results(html: &str, industry: &str, location: &str, count: usize) -> Vec<RawRecord> {
        let document = Html::parse_document(html);
        let row_sel = Selector::parse("div.search-result, article.org-result").unwrap();
        let name_sel = Selector::parse("h3 a, a.org-name").unwrap();
        let address_sel = Selector::parse("p.address, span.org-address").unwrap();
        let ein_sel = Selector::parse("span.ein").unwrap();
        let revenue_sel = Selector::parse("span.revenue").unwrap();

        let mut records = Vec::new();
        for row in document.select(&row_sel).take(count) {
            let name = text_of(row, &name_sel);
            if name.is_empty() {
                continue;
            }
            records.push(record(vec![
                ("Organization", name),
                ("Address", text_of(row, &address_sel)),
                ("Tax ID", text_of(row, &ein_sel)),
                ("Annual Revenue", text_of(row, &revenue_sel)),
                ("Website", href_of(row, &name_sel)),
                ("Industry", industry.to_string()),
                ("Location", location.to_string()),
            ]));
        }
        records
    }
}

#[async_trait]
impl SourceAdapter for Guidestar {
    fn id(&self) -> &'static str {
        "guidestar"
    }

    fn kind(&self) -> LeadKind {
        LeadKind::Institutional
    }

    async fn fetch(&self, industry: &str, location: &str, count: usize) -> Result<Vec<RawRecord>> {
        let url = format!(
            "https://www.guidestar.org/search?q={}&state={}",
            url_encode(industry),
            url_encode(location)
        );
        info!("Searching Guidestar for {} nonprofits in {}", industry, location);

        let html = self.fetcher.get_text(&url).await?;
        let records = Self::parse_results(&html, industry, location, count);
        info!("guidestar: {} organizations parsed", records.len());
        Ok(records)
    }
}

// ---------------------------------------------------------------------------
// Charity Navigator

pub struct CharityNavigator {
    fetcher: Arc<Fetcher>,
}

impl CharityNavigator {
    pub fn new(fetcher: Arc<Fetcher>) -> Self {
        Self { fetcher }
    }

    fn parse_results(html: &str, industry: &str, location: &str, count: usize) -> Vec<RawRecord> {
        let document = Html::parse_document(html);
        let card_sel = Selector::parse("div.charity-result, li.search-result").unwrap();
        let name_sel = Selector::parse("h3 a, a.charity-name").unwrap();
        let address_sel = Selector::parse("p.location, span.charity-location").unwrap();
        let rating_sel = Selector::parse("span.rating, div.encompass-rating").unwrap();

        let mut records = Vec::new();
        for card in document.select(&card_sel).take(count) {
            let name = text_of(card, &name_sel);
            if name.is_empty() {
                continue;
            }
            records.push(record(vec![
                ("Organization", name),
                ("Type", "Nonprofit".to_string()),
                ("Address", text_of(card, &address_sel)),
                ("Rating", text_of(card, &rating_sel)),
                ("Website", href_of(card, &name_sel)),
                ("Industry", industry.to_string()),
                ("Location", location.to_string()),
            ]));
        }
        records
    }
}

#[async_trait]
impl SourceAdapter for CharityNavigator {
    fn id(&self) -> &'static str {
        "charity_navigator"
    }

    fn kind(&self) -> LeadKind {
        LeadKind::Institutional
    }

    async fn fetch(&self, industry: &str, location: &str, count: usize) -> Result<Vec<RawRecord>> {
        let url = format!(
            "https://www.charitynavigator.org/search?q={}&location={}",
            url_encode(industry),
            url_encode(location)
        );
        info!("Searching Charity Navigator for {} nonprofits in {}", industry, location);

        let html = self.fetcher.get_text(&url).await?;
        let records = Self::parse_results(&html, industry, location, count);
        info!("charity_navigator: {} charities parsed", records.len());
        Ok(records)
    }
}

// ---------------------------------------------------------------------------
// Educational directories

pub struct EducationalDirectories {
    fetcher: Arc<Fetcher>,
}

impl EducationalDirectories {
    pub fn new(fetcher: Arc<Fetcher>) -> Self {
        Self { fetcher }
    }

    fn parse_results(html: &str, industry: &str, location: &str, count: usize) -> Vec<RawRecord> {
        let document = Html::parse_document(html);
        let card_sel = Selector::parse("div.school-card, li.institution").unwrap();
        let name_sel = Selector::parse("h3 a, a.school-name").unwrap();
        let address_sel = Selector::parse("span.address, p.school-address").unwrap();
        let phone_sel = Selector::parse("span.phone").unwrap();
        let type_sel = Selector::parse("span.school-type").unwrap();
        let students_sel = Selector::parse("span.enrollment").unwrap();

        let mut records = Vec::new();
        for card in document.select(&card_sel).take(count) {
            let name = text_of(card, &name_sel);
            if name.is_empty() {
                continue;
            }
            records.push(record(vec![
                ("Institution", name),
                ("Type", text_of(card, &type_sel)),
                ("Address", text_of(card, &address_sel)),
                ("Phone", text_of(card, &phone_sel)),
                ("Students", text_of(card, &students_sel)),
                ("Website", href_of(card, &name_sel)),
                ("Industry", industry.to_string()),
                ("Location", location.to_string()),
            ]));
        }
        records
    }
}

#[async_trait]
impl SourceAdapter for EducationalDirectories {
    fn id(&self) -> &'static str {
        "educational_directories"
    }

    fn kind(&self) -> LeadKind {
        LeadKind::Institutional
    }

    async fn fetch(&self, industry: &str, location: &str, count: usize) -> Result<Vec<RawRecord>> {
        let url = format!(
            "https://www.collegesimply.com/search?major={}&near={}",
            url_encode(industry),
            url_encode(location)
        );
        info!("Searching educational directories for {} programs in {}", industry, location);

        let html = self.fetcher.get_text(&url).await?;
        let records = Self::parse_results(&html, industry, location, count);
        info!("educational_directories: {} institutions parsed", records.len());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn government_directory_parses_departments() {
        let html = r#"
            <ul>
              <li class="department">
                <a href="https://www.austin.gov/health">Department of Public Health</a>
                <span class="phone">(512) 555-0160</span>
                <a href="mailto:health@austin.gov">email us</a>
              </li>
              <li class="department"><span class="phone">(512) 555-0161</span></li>
            </ul>"#;
        let records = GovernmentWebsites::parse_directory(html, "health", "Austin", 10);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["Organization"], "Department of Public Health");
        assert_eq!(records[0]["Contact Email"], "health@austin.gov");
        assert_eq!(records[0]["Type"], "Government");
    }

    #[test]
    fn educational_results_carry_institution_column() {
        let html = r#"
            <div class="school-card">
              <h3><a href="https://example.edu">Austin Culinary Institute</a></h3>
              <span class="school-type">Technical Institute</span>
              <span class="address">200 Campus Dr, Austin</span>
              <span class="enrollment">1200</span>
            </div>"#;
        let records = EducationalDirectories::parse_results(html, "culinary", "Austin", 10);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["Institution"], "Austin Culinary Institute");
        assert_eq!(records[0]["Students"], "1200");
    }

    #[test]
    fn charity_results_respect_count() {
        let html = r#"
            <div class="charity-result"><h3><a>A</a></h3></div>
            <div class="charity-result"><h3><a>B</a></h3></div>
            <div class="charity-result"><h3><a>C</a></h3></div>"#;
        let records = CharityNavigator::parse_results(html, "food", "Austin", 2);
        assert_eq!(records.len(), 2);
    }
}
