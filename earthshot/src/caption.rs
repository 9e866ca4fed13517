//! Caption text for finished acquisitions.
//!
//! The library produces the descriptive core ("NIR-R-G image of Chile
//! (-33.45, -70.67) from the 5th of January, 2020 (atm corr)"); any
//! platform-specific decoration (hashtags, links) belongs to the caller.

use crate::pipeline::Acquisition;
use chrono::Datelike;

/// Formats the caption for an acquisition.
///
/// `region` is the display name from the geocoding collaborator; `None`
/// means the point resolved to no named territory.
pub fn format_caption(acquisition: &Acquisition, region: Option<&str>) -> String {
    let date = acquisition.scene.acquisition_date;
    let day = date.day();
    let prefix = if acquisition.band_set.is_false_colour() {
        "NIR-R-G image"
    } else {
        "Image"
    };
    let place = region.unwrap_or("international waters");

    let mut caption = format!(
        "{prefix} of {place} ({lat:.2}, {lon:.2}) from the {day}{suffix} of {month}, {year}",
        lat = acquisition.candidate.latitude,
        lon = acquisition.candidate.longitude,
        suffix = ordinal_suffix(day),
        month = date.format("%B"),
        year = date.year(),
    );
    if acquisition.band_set.is_atmospherically_corrected() {
        caption.push_str(" (atm corr)");
    }
    caption
}

/// English ordinal suffix for a day of month.
pub fn ordinal_suffix(day: u32) -> &'static str {
    match day % 100 {
        11..=13 => "th",
        _ => match day % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bands::BandSet;
    use crate::catalog::{ProductType, SceneResult};
    use crate::sampler::Candidate;
    use chrono::{Duration, NaiveDate, TimeZone, Utc};
    use image::RgbImage;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn acquisition(false_colour: bool, corrected: bool) -> Acquisition {
        let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let mut rng = SmallRng::seed_from_u64(1);
        Acquisition {
            image: RgbImage::new(2, 2),
            candidate: Candidate {
                latitude: -33.456,
                longitude: -70.671,
                window_start: start,
                window_end: start + Duration::days(60),
            },
            scene: SceneResult {
                id: "s1".into(),
                title: "S2A".into(),
                acquisition_date: NaiveDate::from_ymd_opt(2020, 1, 5).unwrap(),
                product_type: if corrected {
                    ProductType::Level2A
                } else {
                    ProductType::Level1C
                },
                preview_url: "https://hub/icon".into(),
                download_url: "https://hub/$value".into(),
            },
            band_set: BandSet::choose(&mut rng, corrected, if false_colour { 1.0 } else { 0.0 }),
            attempts: 1,
        }
    }

    #[test]
    fn true_colour_caption() {
        let caption = format_caption(&acquisition(false, false), Some("Chile"));
        assert_eq!(
            caption,
            "Image of Chile (-33.46, -70.67) from the 5th of January, 2020"
        );
    }

    #[test]
    fn false_colour_caption_is_labelled() {
        let caption = format_caption(&acquisition(true, false), Some("Chile"));
        assert!(caption.starts_with("NIR-R-G image of Chile"));
    }

    #[test]
    fn corrected_caption_carries_marker() {
        let caption = format_caption(&acquisition(false, true), Some("Chile"));
        assert!(caption.ends_with("(atm corr)"));
    }

    #[test]
    fn unnamed_region_falls_back() {
        let caption = format_caption(&acquisition(false, false), None);
        assert!(caption.contains("international waters"));
    }

    #[test]
    fn ordinal_suffixes() {
        assert_eq!(ordinal_suffix(1), "st");
        assert_eq!(ordinal_suffix(2), "nd");
        assert_eq!(ordinal_suffix(3), "rd");
        assert_eq!(ordinal_suffix(4), "th");
        assert_eq!(ordinal_suffix(11), "th");
        assert_eq!(ordinal_suffix(12), "th");
        assert_eq!(ordinal_suffix(13), "th");
        assert_eq!(ordinal_suffix(21), "st");
        assert_eq!(ordinal_suffix(22), "nd");
        assert_eq!(ordinal_suffix(23), "rd");
        assert_eq!(ordinal_suffix(31), "st");
    }
}
