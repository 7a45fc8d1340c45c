/// Configuration validation for threshold secret sharing.
use crate::Error;

/// Validates threshold configuration parameters.
///
/// A threshold below two would hand the secret to every single share holder,
/// and a threshold above the number of shares could never be met; both are
/// rejected rather than clamped.
pub fn validate_threshold_config(threshold: usize, n: usize) -> Result<(), Error> {
    if threshold < 2 || threshold > n {
        return Err(Error::invalid_threshold(threshold, n));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_threshold_config() {
        assert!(validate_threshold_config(2, 2).is_ok());
        assert!(validate_threshold_config(3, 5).is_ok());
        assert!(validate_threshold_config(20, 20).is_ok());
    }

    #[test]
    fn test_invalid_threshold_config() {
        // threshold < 2
        assert_eq!(
            validate_threshold_config(1, 5),
            Err(Error::invalid_threshold(1, 5))
        );
        assert!(validate_threshold_config(0, 5).is_err());

        // threshold > n
        assert!(validate_threshold_config(6, 5).is_err());
        assert!(validate_threshold_config(2, 1).is_err());
        assert!(validate_threshold_config(2, 0).is_err());
    }
}
