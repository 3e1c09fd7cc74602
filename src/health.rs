/// Below this much reclaimable junk the score is 0.
pub const SCORE_FLOOR_BYTES: u64 = 10 * 1024 * 1024;

/// At or above this much reclaimable junk the score is 100.
pub const SCORE_CEILING_BYTES: u64 = 1024 * 1024 * 1024;

/// Map reclaimable bytes to a 0-100 score on a logarithmic curve, so the
/// first hundred megabytes weigh more than the last.
pub fn health_score(bytes: u64) -> u8 {
    if bytes < SCORE_FLOOR_BYTES {
        return 0;
    }
    if bytes >= SCORE_CEILING_BYTES {
        return 100;
    }
    let score = 100.0 * (bytes as f64).ln() / (SCORE_CEILING_BYTES as f64).ln();
    score.round().clamp(0.0, 100.0) as u8
}
