// src/sources/personal.rs - Contact-enrichment APIs and people directories
use std::sync::Arc;

use async_trait::async_trait;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::info;

use crate::error::{Error, Result};
use crate::fetch::Fetcher;
use crate::models::{LeadKind, RawRecord};

use super::{url_encode, SourceAdapter};

fn record(pairs: Vec<(&str, String)>) -> RawRecord {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

fn json_str(value: &Value, keys: &[&str]) -> String {
    let mut current = value;
    for key in keys {
        current = &current[*key];
    }
    match current {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn require_key(key: &Option<String>, source: &str) -> Result<String> {
    key.clone()
        .ok_or_else(|| Error::adapter(source, "no API key configured"))
}

/// Candidate company domain for domain-scoped enrichment APIs, derived from
/// the query the same way the directory sites slug their URLs.
fn candidate_domain(industry: &str, location: &str) -> String {
    let slug = |s: &str| -> String {
        s.to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect()
    };
    format!("{}-{}.com", slug(industry), slug(location))
}

// ---------------------------------------------------------------------------
// Hunter.io - domain email search

pub struct HunterIo {
    fetcher: Arc<Fetcher>,
    api_key: Option<String>,
}

impl HunterIo {
    pub fn new(fetcher: Arc<Fetcher>, api_key: Option<String>) -> Self {
        Self { fetcher, api_key }
    }

    fn map_response(body: &Value, industry: &str, location: &str, count: usize) -> Vec<RawRecord> {
        let domain = json_str(body, &["data", "domain"]);
        let Some(emails) = body["data"]["emails"].as_array() else {
            return Vec::new();
        };

        emails
            .iter()
            .take(count)
            .filter_map(|entry| {
                let first = json_str(entry, &["first_name"]);
                let last = json_str(entry, &["last_name"]);
                let name = format!("{} {}", first, last).trim().to_string();
                if name.is_empty() {
                    return None;
                }
                Some(record(vec![
                    ("Name", name),
                    ("Email", json_str(entry, &["value"])),
                    ("Position", json_str(entry, &["position"])),
                    ("Email Confidence", json_str(entry, &["confidence"])),
                    ("Domain", domain.clone()),
                    ("Industry", industry.to_string()),
                    ("Location", location.to_string()),
                ]))
            })
            .collect()
    }
}

#[async_trait]
impl SourceAdapter for HunterIo {
    fn id(&self) -> &'static str {
        "hunter_io"
    }

    fn kind(&self) -> LeadKind {
        LeadKind::Personal
    }

    async fn fetch(&self, industry: &str, location: &str, count: usize) -> Result<Vec<RawRecord>> {
        let api_key = require_key(&self.api_key, self.id())?;
        let domain = candidate_domain(industry, location);
        let url = format!(
            "https://api.hunter.io/v2/domain-search?domain={}&limit={}&api_key={}",
            domain,
            count.min(100),
            api_key
        );
        info!("Searching Hunter.io contacts for {} in {}", industry, location);

        let body = self.fetcher.get_json(&url, None).await?;
        let records = Self::map_response(&body, industry, location, count);
        info!("hunter_io: {} contacts mapped", records.len());
        Ok(records)
    }
}

// ---------------------------------------------------------------------------
// Apollo.io - people search

pub struct ApolloIo {
    fetcher: Arc<Fetcher>,
    api_key: Option<String>,
}

impl ApolloIo {
    pub fn new(fetcher: Arc<Fetcher>, api_key: Option<String>) -> Self {
        Self { fetcher, api_key }
    }

    fn map_response(body: &Value, industry: &str, location: &str, count: usize) -> Vec<RawRecord> {
        let Some(people) = body["people"].as_array() else {
            return Vec::new();
        };

        people
            .iter()
            .take(count)
            .filter_map(|person| {
                let name = json_str(person, &["name"]);
                if name.is_empty() {
                    return None;
                }
                Some(record(vec![
                    ("Name", name),
                    ("Title", json_str(person, &["title"])),
                    ("Company", json_str(person, &["organization", "name"])),
                    ("Email", json_str(person, &["email"])),
                    ("Phone", json_str(person, &["phone"])),
                    ("LinkedIn", json_str(person, &["linkedin_url"])),
                    ("Industry", industry.to_string()),
                    ("Location", location.to_string()),
                ]))
            })
            .collect()
    }
}

#[async_trait]
impl SourceAdapter for ApolloIo {
    fn id(&self) -> &'static str {
        "apollo_io"
    }

    fn kind(&self) -> LeadKind {
        LeadKind::Personal
    }

    async fn fetch(&self, industry: &str, location: &str, count: usize) -> Result<Vec<RawRecord>> {
        let api_key = require_key(&self.api_key, self.id())?;
        let body = serde_json::json!({
            "api_key": api_key,
            "q_keywords": industry,
            "person_locations": [location],
            "per_page": count.min(100),
        });
        info!("Searching Apollo.io contacts for {} in {}", industry, location);

        let response = self
            .fetcher
            .post_json("https://api.apollo.io/v1/mixed_people/search", &body)
            .await?;
        let records = Self::map_response(&response, industry, location, count);
        info!("apollo_io: {} contacts mapped", records.len());
        Ok(records)
    }
}

// ---------------------------------------------------------------------------
// Clearbit - company discovery

pub struct Clearbit {
    fetcher: Arc<Fetcher>,
    api_key: Option<String>,
}

impl Clearbit {
    pub fn new(fetcher: Arc<Fetcher>, api_key: Option<String>) -> Self {
        Self { fetcher, api_key }
    }

    fn map_response(body: &Value, industry: &str, location: &str, count: usize) -> Vec<RawRecord> {
        let Some(results) = body["results"].as_array() else {
            return Vec::new();
        };

        results
            .iter()
            .take(count)
            .filter_map(|company| {
                let name = json_str(company, &["name"]);
                if name.is_empty() {
                    return None;
                }
                Some(record(vec![
                    ("Company", name),
                    ("Domain", json_str(company, &["domain"])),
                    ("Employees", json_str(company, &["metrics", "employees"])),
                    ("Annual Revenue", json_str(company, &["metrics", "estimatedAnnualRevenue"])),
                    ("Year Founded", json_str(company, &["foundedYear"])),
                    ("Website", json_str(company, &["site", "url"])),
                    ("Industry", industry.to_string()),
                    ("Location", location.to_string()),
                ]))
            })
            .collect()
    }
}

#[async_trait]
impl SourceAdapter for Clearbit {
    fn id(&self) -> &'static str {
        "clearbit"
    }

    fn kind(&self) -> LeadKind {
        LeadKind::Personal
    }

    async fn fetch(&self, industry: &str, location: &str, count: usize) -> Result<Vec<RawRecord>> {
        let api_key = require_key(&self.api_key, self.id())?;
        let url = format!(
            "https://discovery.clearbit.com/v1/companies/search?query={}",
            url_encode(&format!("tags:{} location:{}", industry, location))
        );
        info!("Searching Clearbit companies for {} in {}", industry, location);

        let bearer = format!("Bearer {}", api_key);
        let body = self
            .fetcher
            .get_json(&url, Some(("Authorization", &bearer)))
            .await?;
        let records = Self::map_response(&body, industry, location, count);
        info!("clearbit: {} companies mapped", records.len());
        Ok(records)
    }
}

// ---------------------------------------------------------------------------
// ZoomInfo - contact search

pub struct ZoomInfo {
    fetcher: Arc<Fetcher>,
    api_key: Option<String>,
}

impl ZoomInfo {
    pub fn new(fetcher: Arc<Fetcher>, api_key: Option<String>) -> Self {
        Self { fetcher, api_key }
    }

    fn map_response(body: &Value, industry: &str, location: &str, count: usize) -> Vec<RawRecord> {
        let Some(contacts) = body["data"].as_array() else {
            return Vec::new();
        };

        contacts
            .iter()
            .take(count)
            .filter_map(|contact| {
                let first = json_str(contact, &["firstName"]);
                let last = json_str(contact, &["lastName"]);
                let name = format!("{} {}", first, last).trim().to_string();
                if name.is_empty() {
                    return None;
                }
                Some(record(vec![
                    ("Name", name),
                    ("Title", json_str(contact, &["jobTitle"])),
                    ("Company", json_str(contact, &["company", "name"])),
                    ("Email", json_str(contact, &["email"])),
                    ("Phone", json_str(contact, &["phone"])),
                    ("Revenue", json_str(contact, &["company", "revenueRange"])),
                    ("Employees", json_str(contact, &["company", "employeeRange"])),
                    ("Industry", industry.to_string()),
                    ("Location", location.to_string()),
                ]))
            })
            .collect()
    }
}

#[async_trait]
impl SourceAdapter for ZoomInfo {
    fn id(&self) -> &'static str {
        "zoominfo"
    }

    fn kind(&self) -> LeadKind {
        LeadKind::Personal
    }

    async fn fetch(&self, industry: &str, location: &str, count: usize) -> Result<Vec<RawRecord>> {
        let api_key = require_key(&self.api_key, self.id())?;
        let url = format!(
            "https://api.zoominfo.com/search/contact?industry={}&location={}&rpp={}",
            url_encode(industry),
            url_encode(location),
            count.min(100)
        );
        info!("Searching ZoomInfo contacts for {} in {}", industry, location);

        let bearer = format!("Bearer {}", api_key);
        let body = self
            .fetcher
            .get_json(&url, Some(("Authorization", &bearer)))
            .await?;
        let records = Self::map_response(&body, industry, location, count);
        info!("zoominfo: {} contacts mapped", records.len());
        Ok(records)
    }
}

// ---------------------------------------------------------------------------
// LinkedIn - public people search (no API key; heavily rate limited)

pub struct LinkedIn {
    fetcher: Arc<Fetcher>,
}

impl LinkedIn {
    pub fn new(fetcher: Arc<Fetcher>) -> Self {
        Self { fetcher }
    }

    fn parse_results(html: &str, industry: &str, location: &str, count: usize) -> Vec<RawRecord> {
        let document = Html::parse_document(html);
        let card_sel = Selector::parse("li.reusable-search__result-container, div.entity-result").unwrap();
        let name_sel = Selector::parse("span[aria-hidden='true'], span.entity-result__title-text a").unwrap();
        let title_sel = Selector::parse("div.entity-result__primary-subtitle").unwrap();
        let link_sel = Selector::parse("a.app-aware-link[href*='/in/']").unwrap();

        let mut records = Vec::new();
        for card in document.select(&card_sel).take(count) {
            let name = card
                .select(&name_sel)
                .next()
                .map(|e| e.text().collect::<String>().trim().to_string())
                .unwrap_or_default();
            if name.is_empty() {
                continue;
            }
            let title = card
                .select(&title_sel)
                .next()
                .map(|e| e.text().collect::<String>().trim().to_string())
                .unwrap_or_default();
            let profile = card
                .select(&link_sel)
                .next()
                .and_then(|e| e.value().attr("href"))
                .unwrap_or_default()
                .to_string();

            records.push(record(vec![
                ("Name", name),
                ("Title", title),
                ("LinkedIn", profile),
                ("Industry", industry.to_string()),
                ("Location", location.to_string()),
            ]));
        }
        records
    }
}

#[async_trait]
impl SourceAdapter for LinkedIn {
    fn id(&self) -> &'static str {
        "linkedin"
    }

    fn kind(&self) -> LeadKind {
        LeadKind::Personal
    }

    async fn fetch(&self, industry: &str, location: &str, count: usize) -> Result<Vec<RawRecord>> {
        let url = format!(
            "https://www.linkedin.com/search/results/people/?keywords={}",
            url_encode(&format!("{} {}", industry, location))
        );
        info!("Searching LinkedIn for {} professionals in {}", industry, location);

        let html = self.fetcher.get_text(&url).await?;
        let records = Self::parse_results(&html, industry, location, count);
        info!("linkedin: {} profiles parsed", records.len());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_is_an_adapter_error() {
        let fetcher = Arc::new(
            Fetcher::new(&[], 5, std::time::Duration::from_millis(0)).unwrap(),
        );
        let adapter = HunterIo::new(fetcher, None);
        let err = tokio_test::block_on(adapter.fetch("bakery", "Austin", 5)).unwrap_err();
        assert!(matches!(err, Error::Adapter { .. }));
    }

    #[test]
    fn hunter_response_maps_to_raw_records() {
        let body = serde_json::json!({
            "data": {
                "domain": "bakery-austin.com",
                "emails": [
                    {
                        "value": "ada.deane@bakery-austin.com",
                        "first_name": "Ada",
                        "last_name": "Deane",
                        "position": "Owner",
                        "confidence": 93
                    },
                    { "value": "noname@bakery-austin.com" }
                ]
            }
        });
        let records = HunterIo::map_response(&body, "bakery", "Austin", 10);
        // The nameless entry is dropped at the adapter boundary
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["Name"], "Ada Deane");
        assert_eq!(records[0]["Email"], "ada.deane@bakery-austin.com");
        assert_eq!(records[0]["Email Confidence"], "93");
    }

    #[test]
    fn apollo_response_maps_people() {
        let body = serde_json::json!({
            "people": [{
                "name": "Ada Deane",
                "title": "VP of Sales",
                "email": "ada@doughco.com",
                "organization": { "name": "Dough & Co" },
                "linkedin_url": "https://linkedin.com/in/ada-deane"
            }]
        });
        let records = ApolloIo::map_response(&body, "bakery", "Austin", 10);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["Company"], "Dough & Co");
        assert_eq!(records[0]["Title"], "VP of Sales");
    }

    #[test]
    fn zoominfo_response_joins_first_and_last_name() {
        let body = serde_json::json!({
            "data": [{
                "firstName": "Ada",
                "lastName": "Deane",
                "jobTitle": "CEO",
                "company": { "name": "Dough & Co", "employeeRange": "11-50" }
            }]
        });
        let records = ZoomInfo::map_response(&body, "bakery", "Austin", 10);
        assert_eq!(records[0]["Name"], "Ada Deane");
        assert_eq!(records[0]["Employees"], "11-50");
    }

    #[test]
    fn candidate_domain_is_sluggified() {
        assert_eq!(candidate_domain("Pet Grooming", "San Antonio"), "petgrooming-sanantonio.com");
    }
}
