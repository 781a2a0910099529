// src/normalizer.rs - Raw field mappings -> canonical Lead records
use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::models::{Contact, Lead, LeadKind, RawRecord};

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap()
    })
}

/// Per-source mapping from raw column names to the fixed Lead fields. Raw
/// keys are matched case-insensitively; alias lists are in priority order;
/// anything unmatched lands in `extra`.
struct FieldTable {
    name: &'static [&'static str],
    email: &'static [&'static str],
    phone: &'static [&'static str],
    address: &'static [&'static str],
    website: &'static [&'static str],
}

const DEFAULT_TABLE: FieldTable = FieldTable {
    name: &["name", "business name", "title", "full name"],
    email: &["email", "e-mail", "contact email"],
    phone: &["phone", "phone number", "telephone"],
    address: &["address", "street address"],
    website: &["website", "url", "link"],
};

/// Sources whose records are keyed on something other than "Name". Column
/// names mirror what each directory actually returns.
fn field_table(source_id: &str) -> FieldTable {
    match source_id {
        "indeed" | "clearbit" => FieldTable {
            name: &["company", "name"],
            email: &["contact email", "email"],
            ..DEFAULT_TABLE
        },
        "government_websites" | "association_directories" | "charity_navigator" | "guidestar" => {
            FieldTable {
                name: &["organization", "name"],
                email: &["contact email", "email"],
                ..DEFAULT_TABLE
            }
        }
        "educational_directories" => FieldTable {
            name: &["institution", "name"],
            email: &["admin email", "contact email", "email"],
            ..DEFAULT_TABLE
        },
        // Personal sources carry a job "Title" column that must not be
        // mistaken for a display name.
        "hunter_io" | "apollo_io" | "zoominfo" | "linkedin" => FieldTable {
            name: &["name", "full name"],
            website: &["website", "domain", "url", "linkedin"],
            ..DEFAULT_TABLE
        },
        _ => DEFAULT_TABLE,
    }
}

/// Empty strings and the scrapers' "N/A" placeholder both mean "no value".
fn usable(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("n/a") {
        None
    } else {
        Some(trimmed)
    }
}

/// Scan one alias list in priority order against the raw record. Returns the
/// first usable value and remembers which raw key supplied it.
fn resolve<'a>(
    raw: &'a RawRecord,
    aliases: &[&str],
    consumed: &mut HashSet<&'a str>,
) -> Option<String> {
    for alias in aliases {
        for (key, value) in raw {
            if key.to_lowercase() == *alias {
                if let Some(value) = usable(value) {
                    consumed.insert(key.as_str());
                    return Some(value.to_string());
                }
                // Present but empty still counts as consumed so the empty
                // string never reappears in `extra`.
                consumed.insert(key.as_str());
            }
        }
    }
    None
}

/// Pure mapping from one raw record to a Lead. Fails when no usable name
/// field exists; the caller drops such records instead of emitting a
/// half-populated lead.
pub fn normalize(raw: &RawRecord, source_id: &str, kind: LeadKind) -> Result<Lead> {
    let table = field_table(source_id);
    let mut consumed: HashSet<&str> = HashSet::new();

    let name = resolve(raw, table.name, &mut consumed)
        .ok_or_else(|| Error::validation(source_id, "record has no usable name field"))?;
    // Scraped email columns routinely hold junk like "email us"; anything
    // that does not look like an address is treated as absent.
    let email =
        resolve(raw, table.email, &mut consumed).filter(|e| email_regex().is_match(e));
    let phone = resolve(raw, table.phone, &mut consumed);
    let address = resolve(raw, table.address, &mut consumed);
    let website = resolve(raw, table.website, &mut consumed);

    let mut extra: BTreeMap<String, String> = BTreeMap::new();
    for (key, value) in raw {
        if consumed.contains(key.as_str()) {
            continue;
        }
        if let Some(value) = usable(value) {
            extra.insert(key.clone(), value.to_string());
        }
    }

    Ok(Lead {
        kind,
        name,
        contact: Contact { email, phone },
        address,
        website,
        sources: vec![source_id.to_string()],
        extra,
    })
}
