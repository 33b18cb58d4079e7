//! Validation helpers for DTOs.

use validator::ValidationError;

/// Longest team name accepted, in characters.
pub const MAX_TEAM_NAME_CHARS: usize = 64;

/// Validates a team name: at most [`MAX_TEAM_NAME_CHARS`] characters and no
/// control characters. Empty names are allowed and mean "keep the current name".
///
/// # Examples
///
/// ```ignore
/// validate_team_name("Red Foxes")   // Ok
/// validate_team_name("")            // Ok
/// validate_team_name("Red\nFoxes")  // Err - control character
/// ```
pub fn validate_team_name(name: &str) -> Result<(), ValidationError> {
    let length = name.chars().count();
    if length > MAX_TEAM_NAME_CHARS {
        let mut err = ValidationError::new("team_name_length");
        err.message = Some(
            format!("Team name must be at most {MAX_TEAM_NAME_CHARS} characters (got {length})")
                .into(),
        );
        return Err(err);
    }

    if name.chars().any(char::is_control) {
        let mut err = ValidationError::new("team_name_format");
        err.message = Some("Team name must not contain control characters".into());
        return Err(err);
    }

    Ok(())
}
