//! Spectral band selection.

use rand::Rng;

/// The spectral bands the compositor can consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    /// Blue (~490 nm)
    B02,
    /// Green (~560 nm)
    B03,
    /// Red (~665 nm)
    B04,
    /// Near infrared (~842 nm)
    B08,
}

impl Band {
    /// File name for this band under the given processing level's layout.
    /// Level-2A products store 10 m bands with a resolution suffix.
    pub fn file_name(&self, atmospherically_corrected: bool) -> String {
        let stem = match self {
            Band::B02 => "B02",
            Band::B03 => "B03",
            Band::B04 => "B04",
            Band::B08 => "B08",
        };
        if atmospherically_corrected {
            format!("{stem}_10m.jp2")
        } else {
            format!("{stem}.jp2")
        }
    }
}

/// The ordered three-band stack for one composite, chosen once per scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandSet {
    bands: [Band; 3],
    false_colour: bool,
    atmospherically_corrected: bool,
}

impl BandSet {
    /// Chooses the band stack for a scene.
    ///
    /// Defaults to true colour (red, green, blue). With probability
    /// `false_colour_probability` the red slot is replaced by near infrared,
    /// shifting the stack to NIR-R-G. The coin is flipped exactly once; the
    /// result is recorded so captioning downstream can label the image.
    pub fn choose<R: Rng + ?Sized>(
        rng: &mut R,
        atmospherically_corrected: bool,
        false_colour_probability: f64,
    ) -> Self {
        let false_colour = rng.gen_bool(false_colour_probability.clamp(0.0, 1.0));
        let bands = if false_colour {
            [Band::B08, Band::B04, Band::B03]
        } else {
            [Band::B04, Band::B03, Band::B02]
        };
        Self {
            bands,
            false_colour,
            atmospherically_corrected,
        }
    }

    /// Bands in channel order (red slot first).
    pub fn bands(&self) -> [Band; 3] {
        self.bands
    }

    /// Whether near infrared was substituted into the red slot.
    pub fn is_false_colour(&self) -> bool {
        self.false_colour
    }

    /// Whether the file names follow the Level-2A convention.
    pub fn is_atmospherically_corrected(&self) -> bool {
        self.atmospherically_corrected
    }

    /// The three band file names, in stack order.
    pub fn file_names(&self) -> [String; 3] {
        self.bands
            .map(|b| b.file_name(self.atmospherically_corrected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn zero_probability_always_true_colour() {
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..100 {
            let set = BandSet::choose(&mut rng, false, 0.0);
            assert!(!set.is_false_colour());
            assert_eq!(set.bands(), [Band::B04, Band::B03, Band::B02]);
        }
    }

    #[test]
    fn unit_probability_always_false_colour() {
        let mut rng = SmallRng::seed_from_u64(2);
        for _ in 0..100 {
            let set = BandSet::choose(&mut rng, false, 1.0);
            assert!(set.is_false_colour());
            assert_eq!(set.bands(), [Band::B08, Band::B04, Band::B03]);
        }
    }

    #[test]
    fn false_colour_rate_tracks_probability() {
        let mut rng = SmallRng::seed_from_u64(3);
        let hits = (0..10_000)
            .filter(|_| BandSet::choose(&mut rng, false, 0.2).is_false_colour())
            .count();
        // 0.2 +/- generous tolerance
        assert!((1500..2500).contains(&hits), "hits = {hits}");
    }

    #[test]
    fn level1c_file_names() {
        let mut rng = SmallRng::seed_from_u64(4);
        let set = BandSet::choose(&mut rng, false, 0.0);
        assert_eq!(
            set.file_names(),
            ["B04.jp2".to_string(), "B03.jp2".to_string(), "B02.jp2".to_string()]
        );
    }

    #[test]
    fn level2a_file_names_carry_resolution_suffix() {
        let mut rng = SmallRng::seed_from_u64(5);
        let set = BandSet::choose(&mut rng, true, 1.0);
        assert_eq!(
            set.file_names(),
            [
                "B08_10m.jp2".to_string(),
                "B04_10m.jp2".to_string(),
                "B03_10m.jp2".to_string()
            ]
        );
    }
}
