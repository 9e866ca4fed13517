//! OpenSearch feed parsing.
//!
//! The hub returns an Atom-ish feed serialized as JSON. Two quirks matter:
//! `entry` is an object rather than an array when there is exactly one
//! result, and the download/preview links are distinguished by their `rel`
//! attribute (absent for the product itself, `"icon"` for the quicklook).
//! Link resolution is by `rel`, never by position in the list.

use super::types::{ProductType, SceneResult};
use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

/// Failures while interpreting a catalog response body.
#[derive(Debug, Error)]
pub enum FeedParseError {
    #[error("response is not valid feed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("entry {id} has no {kind} link")]
    MissingLink { id: String, kind: &'static str },

    #[error("entry {id} has no parsable acquisition date in summary {summary:?}")]
    MissingDate { id: String, summary: String },
}

#[derive(Debug, Deserialize)]
struct FeedDocument {
    feed: Feed,
}

#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(rename = "opensearch:totalResults")]
    #[allow(dead_code)]
    total_results: String,
    #[serde(default)]
    entry: Option<OneOrMany<Entry>>,
}

/// A single entry deserializes as a bare object, not a one-element array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

#[derive(Debug, Deserialize)]
struct Entry {
    id: String,
    title: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    link: Vec<Link>,
}

#[derive(Debug, Deserialize)]
struct Link {
    #[serde(default)]
    rel: Option<String>,
    href: String,
}

/// Parses a raw catalog response body into scene results.
///
/// An empty feed (zero results) parses to an empty vector; it is the
/// caller's signal to redraw a candidate.
pub fn parse_feed(body: &[u8]) -> Result<Vec<SceneResult>, FeedParseError> {
    let document: FeedDocument = serde_json::from_slice(body)?;

    let entries = match document.feed.entry {
        Some(entries) => entries.into_vec(),
        None => return Ok(Vec::new()),
    };

    entries.into_iter().map(scene_from_entry).collect()
}

fn scene_from_entry(entry: Entry) -> Result<SceneResult, FeedParseError> {
    let product_type = if entry.title.contains("L2A") {
        ProductType::Level2A
    } else {
        ProductType::Level1C
    };

    // The product link carries no rel attribute; everything else does.
    let download_url = entry
        .link
        .iter()
        .find(|l| l.rel.is_none())
        .map(|l| l.href.clone())
        .ok_or_else(|| FeedParseError::MissingLink {
            id: entry.id.clone(),
            kind: "download",
        })?;

    let preview_url = entry
        .link
        .iter()
        .find(|l| l.rel.as_deref() == Some("icon"))
        .map(|l| l.href.clone())
        .ok_or_else(|| FeedParseError::MissingLink {
            id: entry.id.clone(),
            kind: "preview",
        })?;

    let acquisition_date = acquisition_date_from_summary(&entry.summary).ok_or_else(|| {
        FeedParseError::MissingDate {
            id: entry.id.clone(),
            summary: entry.summary.clone(),
        }
    })?;

    Ok(SceneResult {
        id: entry.id,
        title: entry.title,
        acquisition_date,
        product_type,
        preview_url,
        download_url,
    })
}

/// Extracts the acquisition date from an entry summary such as
/// `"Date: 2020-01-05T11:04:41.024Z, Instrument: MSI, ..."`.
fn acquisition_date_from_summary(summary: &str) -> Option<NaiveDate> {
    let after = summary.strip_prefix("Date: ").or_else(|| {
        summary
            .find("Date: ")
            .map(|i| &summary[i + "Date: ".len()..])
    })?;
    let date_part = after.split('T').next()?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_json(title: &str, id: &str) -> String {
        format!(
            r#"{{
                "title": "{title}",
                "id": "{id}",
                "summary": "Date: 2020-01-05T11:04:41.024Z, Instrument: MSI, Satellite: Sentinel-2",
                "link": [
                    {{"href": "https://hub.example.com/odata/Products('{id}')/$value"}},
                    {{"rel": "alternative", "href": "https://hub.example.com/odata/Products('{id}')/"}},
                    {{"rel": "icon", "href": "https://hub.example.com/odata/Products('{id}')/Quicklook/$value"}}
                ]
            }}"#
        )
    }

    fn feed_json(total: u32, entries: &[String]) -> Vec<u8> {
        let entry_field = match entries.len() {
            0 => String::new(),
            1 => format!(r#", "entry": {}"#, entries[0]),
            _ => format!(r#", "entry": [{}]"#, entries.join(",")),
        };
        format!(
            r#"{{"feed": {{"opensearch:totalResults": "{total}"{entry_field}}}}}"#
        )
        .into_bytes()
    }

    #[test]
    fn empty_feed_parses_to_no_scenes() {
        let scenes = parse_feed(&feed_json(0, &[])).unwrap();
        assert!(scenes.is_empty());
    }

    #[test]
    fn single_entry_object_is_accepted() {
        // One result serializes `entry` as an object, not a one-element array
        let scenes =
            parse_feed(&feed_json(1, &[entry_json("S2A_MSIL1C_20200105", "aaa")])).unwrap();
        assert_eq!(scenes.len(), 1);
        assert_eq!(scenes[0].id, "aaa");
        assert_eq!(scenes[0].product_type, ProductType::Level1C);
    }

    #[test]
    fn multiple_entries_preserve_catalog_order() {
        let scenes = parse_feed(&feed_json(
            2,
            &[
                entry_json("S2A_MSIL1C_20200105", "first"),
                entry_json("S2B_MSIL2A_20200107", "second"),
            ],
        ))
        .unwrap();
        assert_eq!(scenes.len(), 2);
        assert_eq!(scenes[0].id, "first");
        assert_eq!(scenes[1].id, "second");
        assert_eq!(scenes[1].product_type, ProductType::Level2A);
    }

    #[test]
    fn links_resolved_by_rel_not_position() {
        // Icon link listed first; download must still resolve to the rel-less link
        let entry = r#"{
            "title": "S2A_MSIL1C_20200105",
            "id": "xyz",
            "summary": "Date: 2020-01-05T11:04:41.024Z, Instrument: MSI",
            "link": [
                {"rel": "icon", "href": "https://hub.example.com/icon"},
                {"href": "https://hub.example.com/product"}
            ]
        }"#;
        let scenes = parse_feed(&feed_json(1, &[entry.to_string()])).unwrap();
        assert_eq!(scenes[0].download_url, "https://hub.example.com/product");
        assert_eq!(scenes[0].preview_url, "https://hub.example.com/icon");
    }

    #[test]
    fn missing_preview_link_is_an_error() {
        let entry = r#"{
            "title": "S2A_MSIL1C_20200105",
            "id": "xyz",
            "summary": "Date: 2020-01-05T11:04:41.024Z",
            "link": [{"href": "https://hub.example.com/product"}]
        }"#;
        let result = parse_feed(&feed_json(1, &[entry.to_string()]));
        assert!(matches!(
            result,
            Err(FeedParseError::MissingLink { kind: "preview", .. })
        ));
    }

    #[test]
    fn acquisition_date_extracted_from_summary() {
        let date = acquisition_date_from_summary(
            "Date: 2019-11-30T09:15:00.000Z, Instrument: MSI, Size: 1.1 GB",
        )
        .unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2019, 11, 30).unwrap());
    }

    #[test]
    fn garbage_summary_is_rejected() {
        assert!(acquisition_date_from_summary("Instrument: MSI").is_none());
        assert!(acquisition_date_from_summary("Date: not-a-date").is_none());
    }

    #[test]
    fn non_json_body_is_a_parse_error() {
        assert!(matches!(
            parse_feed(b"<html>service unavailable</html>"),
            Err(FeedParseError::Json(_))
        ));
    }
}
