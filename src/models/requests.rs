//! Request DTOs
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

/// Longest bio accepted after trimming, in characters
pub const MAX_BIO_LENGTH: usize = 1024;

/// Request body for PUT /users/:id/bio
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateBioRequest {
    /// New bio; surrounding whitespace is dropped before storing
    pub bio: String,
}

impl UpdateBioRequest {
    /// The bio as it will be stored.
    pub fn trimmed_bio(&self) -> &str {
        self.bio.trim()
    }

    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.trimmed_bio().chars().count() > MAX_BIO_LENGTH {
            return Some(format!(
                "Bio exceeds maximum length of {} characters",
                MAX_BIO_LENGTH
            ));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_bio_deserialize() {
        let req: UpdateBioRequest = serde_json::from_str(r#"{"bio": "  new  "}"#).unwrap();
        assert_eq!(req.bio, "  new  ");
        assert_eq!(req.trimmed_bio(), "new");
    }

    #[test]
    fn test_missing_bio_is_rejected() {
        assert!(serde_json::from_str::<UpdateBioRequest>("{}").is_err());
        assert!(serde_json::from_str::<UpdateBioRequest>(r#"{"bio": 5}"#).is_err());
    }

    #[test]
    fn test_validate_length() {
        let ok = UpdateBioRequest {
            bio: format!("  {}  ", "x".repeat(MAX_BIO_LENGTH)),
        };
        assert!(ok.validate().is_none());

        let too_long = UpdateBioRequest {
            bio: "x".repeat(MAX_BIO_LENGTH + 1),
        };
        assert!(too_long.validate().is_some());
    }
}
