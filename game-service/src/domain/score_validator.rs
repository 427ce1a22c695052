use shared::{Result, ServiceError};

pub const DEFAULT_DURATION_SECS: i32 = 30;

const MIN_DURATION_SECS: i32 = 1;
const MAX_DURATION_SECS: i32 = 60;

/// Stateless submission check: range bounds on the reported fields plus a
/// hard ceiling on sustained taps per second.
pub struct ScoreValidator {
    max_taps_per_second: u32,
}

impl ScoreValidator {
    pub fn new(max_taps_per_second: u32) -> Self {
        Self {
            max_taps_per_second,
        }
    }

    pub fn validate(&self, score: i64, taps: i32, duration: i32) -> Result<()> {
        if score < 0 {
            return Err(ServiceError::InvalidInput(
                "Score must not be negative".to_string(),
            ));
        }

        if taps < 0 {
            return Err(ServiceError::InvalidInput(
                "Tap count must not be negative".to_string(),
            ));
        }

        if !(MIN_DURATION_SECS..=MAX_DURATION_SECS).contains(&duration) {
            return Err(ServiceError::InvalidInput(format!(
                "Duration must be between {} and {} seconds",
                MIN_DURATION_SECS, MAX_DURATION_SECS
            )));
        }

        // The ceiling is computed from the client-reported duration.
        let max_possible_taps = i64::from(duration) * i64::from(self.max_taps_per_second);
        if i64::from(taps) > max_possible_taps {
            return Err(ServiceError::SuspiciousScore(format!(
                "{} taps exceeds the ceiling of {} for a {}s session",
                taps, max_possible_taps, duration
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_taps_at_ceiling() {
        let validator = ScoreValidator::new(10);
        assert!(validator.validate(1000, 300, 30).is_ok());
    }

    #[test]
    fn test_rejects_taps_above_ceiling() {
        let validator = ScoreValidator::new(10);
        let result = validator.validate(1000, 301, 30);
        assert!(matches!(result, Err(ServiceError::SuspiciousScore(_))));
    }

    #[test]
    fn test_ceiling_scales_with_duration() {
        let validator = ScoreValidator::new(10);
        assert!(validator.validate(0, 600, 60).is_ok());
        assert!(validator.validate(0, 601, 60).is_err());
        assert!(validator.validate(0, 10, 1).is_ok());
        assert!(validator.validate(0, 11, 1).is_err());
    }

    #[test]
    fn test_rejects_out_of_range_duration() {
        let validator = ScoreValidator::new(10);
        assert!(matches!(
            validator.validate(10, 5, 0),
            Err(ServiceError::InvalidInput(_))
        ));
        assert!(matches!(
            validator.validate(10, 5, 61),
            Err(ServiceError::InvalidInput(_))
        ));
        assert!(validator.validate(10, 5, 1).is_ok());
        assert!(validator.validate(10, 5, 60).is_ok());
    }

    #[test]
    fn test_rejects_negative_score_and_taps() {
        let validator = ScoreValidator::new(10);
        assert!(matches!(
            validator.validate(-1, 5, 30),
            Err(ServiceError::InvalidInput(_))
        ));
        assert!(matches!(
            validator.validate(10, -1, 30),
            Err(ServiceError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_zero_taps_always_plausible() {
        let validator = ScoreValidator::new(10);
        assert!(validator.validate(0, 0, 30).is_ok());
    }

    #[test]
    fn test_configured_rate_changes_ceiling() {
        let validator = ScoreValidator::new(5);
        assert!(validator.validate(0, 150, 30).is_ok());
        assert!(validator.validate(0, 151, 30).is_err());
    }
}
