// src/dedupe.rs - Cross-source duplicate detection and merging
use tracing::debug;

use crate::models::Lead;

/// Collapse leads that describe the same real-world entity. Two leads match
/// when their names are equal case-insensitively AND at least one of
/// email/phone/address is equal (absent fields never match). No single
/// secondary field is reliably present across all sources, hence the weak
/// multi-key rule.
///
/// The earliest-seen lead survives as primary; duplicates fill its missing
/// fields and union into its `extra` and provenance. Output preserves
/// first-seen order of the survivors.
///
/// A merge can enrich a survivor with a field that now bridges it to another
/// survivor (email matched one record, phone the other), so passes repeat
/// until no further collapse happens.
pub fn dedupe(mut leads: Vec<Lead>) -> Vec<Lead> {
    loop {
        let before = leads.len();
        leads = dedupe_pass(leads);
        if leads.len() == before {
            return leads;
        }
    }
}

fn dedupe_pass(leads: Vec<Lead>) -> Vec<Lead> {
    let mut merged: Vec<Lead> = Vec::with_capacity(leads.len());

    for lead in leads {
        match merged.iter_mut().find(|kept| is_same_entity(kept, &lead)) {
            Some(primary) => {
                debug!("Merging duplicate lead '{}'", lead.name);
                merge_into(primary, lead);
            }
            None => merged.push(lead),
        }
    }

    merged
}

fn is_same_entity(a: &Lead, b: &Lead) -> bool {
    if !eq_fold(&a.name, &b.name) {
        return false;
    }
    opt_eq_fold(&a.contact.email, &b.contact.email)
        || opt_eq_fold(&a.contact.phone, &b.contact.phone)
        || opt_eq_fold(&a.address, &b.address)
}

fn eq_fold(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

fn opt_eq_fold(a: &Option<String>, b: &Option<String>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => eq_fold(a, b),
        _ => false,
    }
}

/// Fill whatever the primary is missing from the duplicate. Primary wins on
/// every collision, so the final field set does not depend on which of two
/// equal-name records arrived first.
fn merge_into(primary: &mut Lead, duplicate: Lead) {
    if primary.contact.email.is_none() {
        primary.contact.email = duplicate.contact.email;
    }
    if primary.contact.phone.is_none() {
        primary.contact.phone = duplicate.contact.phone;
    }
    if primary.address.is_none() {
        primary.address = duplicate.address;
    }
    if primary.website.is_none() {
        primary.website = duplicate.website;
    }
    for source in &duplicate.sources {
        primary.add_source(source);
    }
    for (key, value) in duplicate.extra {
        primary.extra.entry(key).or_insert(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Contact, LeadKind};
    use std::collections::BTreeMap;

    fn lead(name: &str, email: Option<&str>, phone: Option<&str>, source: &str) -> Lead {
        Lead {
            kind: LeadKind::Business,
            name: name.to_string(),
            contact: Contact {
                email: email.map(str::to_string),
                phone: phone.map(str::to_string),
            },
            address: None,
            website: None,
            sources: vec![source.to_string()],
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn name_match_alone_does_not_merge() {
        let out = dedupe(vec![
            lead("Acme Bakery", Some("a@acme.com"), None, "yelp"),
            lead("acme bakery", Some("b@acme.com"), None, "google_maps"),
        ]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn name_plus_email_merges_and_fills_missing_fields() {
        let mut first = lead("Acme Bakery", Some("hi@acme.com"), None, "yelp");
        first.extra.insert("Rating".into(), "4.5".into());
        let mut second = lead("ACME BAKERY", Some("HI@acme.com"), Some("+1-555-0100"), "google_maps");
        second.website = Some("https://acme.com".into());
        second.extra.insert("Rating".into(), "4.0".into());
        second.extra.insert("Hours".into(), "7-5".into());

        let out = dedupe(vec![first, second]);
        assert_eq!(out.len(), 1);
        let merged = &out[0];
        assert_eq!(merged.name, "Acme Bakery");
        assert_eq!(merged.contact.phone.as_deref(), Some("+1-555-0100"));
        assert_eq!(merged.website.as_deref(), Some("https://acme.com"));
        // Primary wins on extra collisions, duplicate's novel keys union in
        assert_eq!(merged.extra.get("Rating").map(String::as_str), Some("4.5"));
        assert_eq!(merged.extra.get("Hours").map(String::as_str), Some("7-5"));
        assert_eq!(merged.sources, vec!["yelp", "google_maps"]);
    }

    #[test]
    fn phone_or_address_also_count_as_identity_keys() {
        let out = dedupe(vec![
            lead("Acme", None, Some("+1-555-0100"), "yelp"),
            lead("Acme", None, Some("+1-555-0100"), "yellow_pages"),
        ]);
        assert_eq!(out.len(), 1);

        let mut a = lead("Acme", None, None, "yelp");
        a.address = Some("1 Main St".into());
        let mut b = lead("Acme", None, None, "bbb");
        b.address = Some("1 main st".into());
        assert_eq!(dedupe(vec![a, b]).len(), 1);
    }

    #[test]
    fn dedupe_is_idempotent() {
        let input = vec![
            lead("Acme", Some("a@acme.com"), None, "yelp"),
            lead("Acme", Some("a@acme.com"), Some("+1-555-0100"), "google_maps"),
            lead("Other Shop", None, Some("+1-555-0199"), "yelp"),
        ];
        let once = dedupe(input);
        let names_once: Vec<_> = once.iter().map(|l| l.name.clone()).collect();
        let twice = dedupe(once.clone());
        let names_twice: Vec<_> = twice.iter().map(|l| l.name.clone()).collect();
        assert_eq!(names_once, names_twice);
        assert_eq!(once.len(), twice.len());
        for (a, b) in once.iter().zip(twice.iter()) {
            assert_eq!(a.contact, b.contact);
            assert_eq!(a.extra, b.extra);
            assert_eq!(a.sources, b.sources);
        }
    }

    #[test]
    fn merge_outcome_field_set_is_order_insensitive() {
        let mut a = lead("Acme", Some("a@acme.com"), Some("+1-555-0100"), "yelp");
        a.extra.insert("Rating".into(), "4.5".into());
        let mut b = lead("acme", Some("a@acme.com"), None, "google_maps");
        b.website = Some("https://acme.com".into());
        b.extra.insert("Hours".into(), "7-5".into());

        let ab = dedupe(vec![a.clone(), b.clone()]);
        let ba = dedupe(vec![b, a]);
        assert_eq!(ab.len(), 1);
        assert_eq!(ba.len(), 1);

        // Which record is primary differs, but the set of populated fields
        // and keys must not.
        assert_eq!(ab[0].contact.email, ba[0].contact.email);
        assert_eq!(ab[0].contact.phone, ba[0].contact.phone);
        assert_eq!(ab[0].website, ba[0].website);
        let keys_ab: Vec<_> = ab[0].extra.keys().collect();
        let keys_ba: Vec<_> = ba[0].extra.keys().collect();
        assert_eq!(keys_ab, keys_ba);
        let mut src_ab = ab[0].sources.clone();
        let mut src_ba = ba[0].sources.clone();
        src_ab.sort();
        src_ba.sort();
        assert_eq!(src_ab, src_ba);
    }

    #[test]
    fn record_bridging_two_survivors_collapses_them_in_one_call() {
        // First two records share a name but no contact field, so they stay
        // apart until the third record links them through its email and
        // phone. One call must already reach the fixed point.
        let out = dedupe(vec![
            lead("Acme", Some("a@acme.com"), None, "yelp"),
            lead("Acme", None, Some("+1-555-0100"), "yellow_pages"),
            lead("Acme", Some("a@acme.com"), Some("+1-555-0100"), "google_maps"),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].contact.email.as_deref(), Some("a@acme.com"));
        assert_eq!(out[0].contact.phone.as_deref(), Some("+1-555-0100"));
        assert_eq!(out[0].sources, vec!["yelp", "google_maps", "yellow_pages"]);

        let again = dedupe(out.clone());
        assert_eq!(again.len(), 1);
    }

    #[test]
    fn output_preserves_first_seen_order() {
        let out = dedupe(vec![
            lead("Zebra Cakes", Some("z@z.com"), None, "yelp"),
            lead("Acme", Some("a@acme.com"), None, "yelp"),
            lead("zebra cakes", Some("z@z.com"), None, "google_maps"),
            lead("Midtown Oven", None, Some("+1-555-0111"), "yelp"),
        ]);
        let names: Vec<_> = out.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Zebra Cakes", "Acme", "Midtown Oven"]);
    }
}
