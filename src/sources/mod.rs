// src/sources/mod.rs - Source adapter seam and registry
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ApiKeys;
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::models::{LeadKind, RawRecord};

mod business;
mod institutional;
mod personal;

/// One external directory or API. Adapters are independent collaborators:
/// given a query they return raw field mappings, nothing else. May return
/// fewer records than requested.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn id(&self) -> &'static str;
    fn kind(&self) -> LeadKind;
    async fn fetch(&self, industry: &str, location: &str, count: usize) -> Result<Vec<RawRecord>>;
}

/// Default adapter order per lead kind. Sequential runs honor this order; it
/// is also the grouping order for export sheets.
pub fn source_ids_for_kind(kind: LeadKind) -> &'static [&'static str] {
    match kind {
        LeadKind::Business => &[
            "google_maps",
            "yelp",
            "yellow_pages",
            "better_business_bureau",
            "chambers_of_commerce",
            "indeed",
        ],
        LeadKind::Personal => &["linkedin", "zoominfo", "hunter_io", "apollo_io", "clearbit"],
        LeadKind::Institutional => &[
            "government_websites",
            "association_directories",
            "guidestar",
            "charity_navigator",
            "educational_directories",
        ],
    }
}

/// Keys and the fetcher are injected at construction; adapters never read
/// the environment themselves.
pub fn build_adapter(
    id: &str,
    fetcher: Arc<Fetcher>,
    keys: &ApiKeys,
) -> Option<Arc<dyn SourceAdapter>> {
    let adapter: Arc<dyn SourceAdapter> = match id {
        "google_maps" => Arc::new(business::GoogleMaps::new(fetcher)),
        "yelp" => Arc::new(business::Yelp::new(fetcher)),
        "yellow_pages" => Arc::new(business::YellowPages::new(fetcher)),
        "better_business_bureau" => Arc::new(business::BetterBusinessBureau::new(fetcher)),
        "chambers_of_commerce" => Arc::new(business::ChambersOfCommerce::new(fetcher)),
        "indeed" => Arc::new(business::Indeed::new(fetcher)),
        "linkedin" => Arc::new(personal::LinkedIn::new(fetcher)),
        "zoominfo" => Arc::new(personal::ZoomInfo::new(fetcher, keys.zoominfo.clone())),
        "hunter_io" => Arc::new(personal::HunterIo::new(fetcher, keys.hunter_io.clone())),
        "apollo_io" => Arc::new(personal::ApolloIo::new(fetcher, keys.apollo_io.clone())),
        "clearbit" => Arc::new(personal::Clearbit::new(fetcher, keys.clearbit.clone())),
        "government_websites" => Arc::new(institutional::GovernmentWebsites::new(fetcher)),
        "association_directories" => Arc::new(institutional::AssociationDirectories::new(fetcher)),
        "guidestar" => Arc::new(institutional::Guidestar::new(fetcher)),
        "charity_navigator" => Arc::new(institutional::CharityNavigator::new(fetcher)),
        "educational_directories" => Arc::new(institutional::EducationalDirectories::new(fetcher)),
        _ => return None,
    };
    Some(adapter)
}

/// True when the id is registered for any kind at all.
pub fn is_known_source(id: &str) -> bool {
    [
        LeadKind::Business,
        LeadKind::Personal,
        LeadKind::Institutional,
    ]
    .iter()
    .any(|kind| source_ids_for_kind(*kind).contains(&id))
}

pub(crate) fn url_encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
