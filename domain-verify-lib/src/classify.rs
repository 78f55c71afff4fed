//! Status classification.
//!
//! Maps a layer's raw findings onto the user-facing status. Pure and
//! stateless, so every layer and every test can call it directly.

use crate::types::{Availability, Layer, VerificationStatus};

/// Confidence at or above which a non-authoritative layer reports a firm
/// `available` / `taken` instead of the `likely_*` variants.
pub const FIRM_CONFIDENCE: u8 = 85;

/// Derive the status for `(available, confidence, layer)`.
///
/// Layer 3 is authoritative: it always collapses to `available` or `taken`
/// whatever the confidence. An undetermined availability on the earlier
/// layers reports `checking`.
pub fn classify(available: Availability, confidence: u8, layer: Layer) -> VerificationStatus {
    if layer == Layer::Authoritative {
        return if available.is_available() {
            VerificationStatus::Available
        } else {
            VerificationStatus::Taken
        };
    }

    match (available, confidence >= FIRM_CONFIDENCE) {
        (Availability::Unknown, _) => VerificationStatus::Checking,
        (Availability::Available, true) => VerificationStatus::Available,
        (Availability::Taken, true) => VerificationStatus::Taken,
        (Availability::Available, false) => VerificationStatus::LikelyAvailable,
        (Availability::Taken, false) => VerificationStatus::LikelyTaken,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_boundary() {
        assert_eq!(
            classify(Availability::Available, 85, Layer::Instant),
            VerificationStatus::Available
        );
        assert_eq!(
            classify(Availability::Available, 84, Layer::Instant),
            VerificationStatus::LikelyAvailable
        );
        assert_eq!(
            classify(Availability::Taken, 85, Layer::Fast),
            VerificationStatus::Taken
        );
        assert_eq!(
            classify(Availability::Taken, 70, Layer::Fast),
            VerificationStatus::LikelyTaken
        );
    }

    #[test]
    fn test_authoritative_layer_ignores_confidence() {
        for confidence in [0, 50, 84, 85, 100] {
            assert_eq!(
                classify(Availability::Taken, confidence, Layer::Authoritative),
                VerificationStatus::Taken
            );
            assert_eq!(
                classify(Availability::Available, confidence, Layer::Authoritative),
                VerificationStatus::Available
            );
        }
        // tri-state collapses on the authoritative layer
        assert_eq!(
            classify(Availability::Unknown, 100, Layer::Authoritative),
            VerificationStatus::Taken
        );
    }

    #[test]
    fn test_unknown_is_checking() {
        assert_eq!(
            classify(Availability::Unknown, 99, Layer::Instant),
            VerificationStatus::Checking
        );
        assert_eq!(
            classify(Availability::Unknown, 0, Layer::Fast),
            VerificationStatus::Checking
        );
    }

    #[test]
    fn test_deterministic_across_calls() {
        let first = classify(Availability::Available, 70, Layer::Fast);
        for _ in 0..100 {
            classify(Availability::Taken, 99, Layer::Authoritative);
            assert_eq!(classify(Availability::Available, 70, Layer::Fast), first);
        }
    }
}
