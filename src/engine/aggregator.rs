//! Judge score aggregation
//!
//! Turns a complete panel of raw scores into a dive's judged total. With
//! fewer than [`TRIM_THRESHOLD`] judges every score counts; from that size
//! on, exactly one lowest and one highest score are dropped before summing.
//! The result does not depend on the order in which judges scored.

use crate::constants::TRIM_THRESHOLD;
use crate::error::{AppError, AppResult};
use crate::utils::validate_score;

/// Aggregate a full panel of raw scores
pub fn aggregate(raw_scores: &[f64], judge_count: usize) -> AppResult<f64> {
    if judge_count == 0 {
        return Err(AppError::InvalidScore(
            "a panel needs at least one judge".to_string(),
        ));
    }
    if raw_scores.len() != judge_count {
        return Err(AppError::InvalidScore(format!(
            "expected {} scores, got {}",
            judge_count,
            raw_scores.len()
        )));
    }
    for &score in raw_scores {
        validate_score(score).map_err(|msg| AppError::InvalidScore(format!("{}: {}", msg, score)))?;
    }

    if judge_count < TRIM_THRESHOLD {
        return Ok(raw_scores.iter().sum());
    }

    let mut sorted = raw_scores.to_vec();
    sorted.sort_by(f64::total_cmp);
    Ok(sorted[1..sorted.len() - 1].iter().sum())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_judges_sum_everything() {
        assert_eq!(aggregate(&[6.0, 7.0, 7.5], 3).unwrap(), 20.5);
    }

    #[test]
    fn test_five_judges_drop_high_and_low() {
        assert_eq!(aggregate(&[9.0, 6.5, 7.0, 7.5, 10.0], 5).unwrap(), 23.5);
    }

    #[test]
    fn test_trim_removes_one_of_duplicate_extremes() {
        // sum 38.0 - min 7.0 - max 8.5
        assert_eq!(aggregate(&[7.0, 7.0, 8.5, 8.5, 7.0], 5).unwrap(), 22.5);
        assert_eq!(aggregate(&[5.0, 5.0, 5.0, 5.0, 5.0], 5).unwrap(), 15.0);
    }

    #[test]
    fn test_order_does_not_matter() {
        let a = aggregate(&[8.0, 6.0, 7.5, 9.5, 7.0, 6.5, 8.5], 7).unwrap();
        let b = aggregate(&[9.5, 8.5, 8.0, 7.5, 7.0, 6.5, 6.0], 7).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, 37.5);
    }

    #[test]
    fn test_small_panels_match_plain_sum() {
        for count in 1..TRIM_THRESHOLD {
            let scores: Vec<f64> = (0..count).map(|i| 5.0 + i as f64 * 0.5).collect();
            let expected: f64 = scores.iter().sum();
            assert_eq!(aggregate(&scores, count).unwrap(), expected);
        }
    }

    #[test]
    fn test_rejects_wrong_panel_size() {
        assert!(matches!(
            aggregate(&[6.0, 7.0], 3),
            Err(AppError::InvalidScore(_))
        ));
        assert!(matches!(aggregate(&[], 0), Err(AppError::InvalidScore(_))));
    }

    #[test]
    fn test_rejects_out_of_range_and_off_grid() {
        assert!(matches!(
            aggregate(&[6.0, 7.0, 10.5], 3),
            Err(AppError::InvalidScore(_))
        ));
        assert!(matches!(
            aggregate(&[6.0, 7.2, 8.0], 3),
            Err(AppError::InvalidScore(_))
        ));
    }
}
