//! Validation helpers for DTOs.

use validator::ValidationError;

use crate::state::player::RegistrationStatus;

const PLAYER_ID_MAX_LENGTH: usize = 64;

/// Validates that a player id is non-empty, trimmed, and reasonably short.
pub fn validate_player_id(id: &str) -> Result<(), ValidationError> {
    if id.trim().is_empty() {
        let mut err = ValidationError::new("player_id_empty");
        err.message = Some("Player id must not be empty".into());
        return Err(err);
    }

    if id.trim() != id {
        let mut err = ValidationError::new("player_id_whitespace");
        err.message = Some("Player id must not carry leading or trailing whitespace".into());
        return Err(err);
    }

    if id.len() > PLAYER_ID_MAX_LENGTH {
        let mut err = ValidationError::new("player_id_length");
        err.message = Some(
            format!(
                "Player id must be at most {PLAYER_ID_MAX_LENGTH} characters (got {})",
                id.len()
            )
            .into(),
        );
        return Err(err);
    }

    Ok(())
}

/// Validates that a display name carries at least one visible character.
pub fn validate_display_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut err = ValidationError::new("name_empty");
        err.message = Some("Name must not be empty".into());
        return Err(err);
    }
    Ok(())
}

/// Validates that an upstream registration status is one of the known wire
/// values (`registered`, `waitlist`, `canceled`).
pub fn validate_registration_status(value: &str) -> Result<(), ValidationError> {
    if RegistrationStatus::parse(value).is_none() {
        let mut err = ValidationError::new("registration_status_unknown");
        err.message = Some(
            format!("Unknown registration status `{value}` (expected registered, waitlist or canceled)")
                .into(),
        );
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_player_id_valid() {
        assert!(validate_player_id("p-001").is_ok());
        assert!(validate_player_id("4f2c").is_ok());
    }

    #[test]
    fn test_validate_player_id_invalid() {
        assert!(validate_player_id("").is_err());
        assert!(validate_player_id("   ").is_err());
        assert!(validate_player_id(" p1").is_err()); // leading whitespace
        assert!(validate_player_id(&"x".repeat(65)).is_err()); // too long
    }

    #[test]
    fn test_validate_display_name() {
        assert!(validate_display_name("Alice").is_ok());
        assert!(validate_display_name("").is_err());
        assert!(validate_display_name("   ").is_err());
    }

    #[test]
    fn test_validate_registration_status() {
        assert!(validate_registration_status("registered").is_ok());
        assert!(validate_registration_status("waitlist").is_ok());
        assert!(validate_registration_status("canceled").is_ok());
        assert!(validate_registration_status("cancelled").is_err());
        assert!(validate_registration_status("").is_err());
    }
}
