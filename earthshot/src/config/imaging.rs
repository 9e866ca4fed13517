//! Preview gating and compositing configuration.

/// Minimum fraction of preview pixels with a non-zero channel mean.
pub const DEFAULT_PREVIEW_THRESHOLD: f64 = 0.9;

/// Probability of substituting near-infrared for red (false colour).
pub const DEFAULT_FALSE_COLOUR_PROBABILITY: f64 = 0.2;

/// Side length of the square target pixel grid for composites.
pub const DEFAULT_TARGET_SIZE: u32 = 2196;

/// Configuration for preview validation and band compositing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagingConfig {
    /// Accept threshold for the preview coverage gate, in `[0, 1]`.
    pub preview_threshold: f64,
    /// Probability of producing a NIR-R-G false-colour composite.
    pub false_colour_probability: f64,
    /// Target pixel grid `(width, height)` every band is resampled to.
    pub target_shape: (u32, u32),
}

impl ImagingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preview_threshold(mut self, threshold: f64) -> Self {
        self.preview_threshold = threshold;
        self
    }

    pub fn with_false_colour_probability(mut self, probability: f64) -> Self {
        self.false_colour_probability = probability;
        self
    }

    pub fn with_target_shape(mut self, width: u32, height: u32) -> Self {
        self.target_shape = (width, height);
        self
    }
}

impl Default for ImagingConfig {
    fn default() -> Self {
        Self {
            preview_threshold: DEFAULT_PREVIEW_THRESHOLD,
            false_colour_probability: DEFAULT_FALSE_COLOUR_PROBABILITY,
            target_shape: (DEFAULT_TARGET_SIZE, DEFAULT_TARGET_SIZE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ImagingConfig::default();
        assert!((config.preview_threshold - 0.9).abs() < f64::EPSILON);
        assert!((config.false_colour_probability - 0.2).abs() < f64::EPSILON);
        assert_eq!(config.target_shape, (2196, 2196));
    }

    #[test]
    fn builder_overrides() {
        let config = ImagingConfig::new()
            .with_preview_threshold(0.8)
            .with_false_colour_probability(0.0)
            .with_target_shape(512, 512);
        assert!((config.preview_threshold - 0.8).abs() < f64::EPSILON);
        assert!((config.false_colour_probability).abs() < f64::EPSILON);
        assert_eq!(config.target_shape, (512, 512));
    }
}
