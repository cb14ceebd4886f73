//! Custom validation functions for configuration.

use validator::ValidationError;

/// Validate that a module id looks like a well-known registry id:
/// lowercase, dot-separated, no leading punctuation.
pub fn validate_module_id(id: &str) -> Result<(), ValidationError> {
    let re = regex::Regex::new("^[a-z][a-z0-9._-]*$")
        .map_err(|_| ValidationError::new("invalid_regex"))?;

    if !id.is_empty() && id.len() <= 64 && re.is_match(id) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_module_id"))
    }
}

/// Validate that a given value is a power of two.
pub fn validate_power_of_two(value: u32) -> Result<(), ValidationError> {
    if value.is_power_of_two() {
        Ok(())
    } else {
        Err(ValidationError::new("must_be_power_of_two"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_id_shapes() {
        assert!(validate_module_id("skarv.alloc").is_ok());
        assert!(validate_module_id("vendor.alloc-hw_2").is_ok());
        assert!(validate_module_id("").is_err());
        assert!(validate_module_id("Skarv.Alloc").is_err());
        assert!(validate_module_id(".alloc").is_err());
    }

    #[test]
    fn power_of_two() {
        assert!(validate_power_of_two(64).is_ok());
        assert!(validate_power_of_two(1).is_ok());
        assert!(validate_power_of_two(48).is_err());
        assert!(validate_power_of_two(0).is_err());
    }
}
