pub mod accounts;
pub mod publications;

use crate::error::AppError;

/// Identifiers are opaque strings on the wire but must parse as UUIDs
/// before any store lookup.
pub(crate) fn validate_id(id: &str) -> Result<(), AppError> {
    uuid::Uuid::parse_str(id)
        .map(|_| ())
        .map_err(|_| AppError::Validation("identifier not valid".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuids_pass_validation() {
        let id = uuid::Uuid::now_v7().to_string();
        assert!(validate_id(&id).is_ok());
    }

    #[test]
    fn arbitrary_strings_fail_validation() {
        assert!(validate_id("not-an-id").is_err());
        assert!(validate_id("").is_err());
    }
}
