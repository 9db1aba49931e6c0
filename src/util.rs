use thiserror::Error;

const MAX_RECORD_ID_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid record id {id:?}: {reason}")]
pub struct InvalidRecordId {
    pub id: String,
    pub reason: &'static str,
}

/// Validate that a deal/proposal id is safe to splice into a backend URL path
/// (no traversal, no query or fragment characters).
pub fn validate_record_id(id: &str) -> Result<(), InvalidRecordId> {
    let invalid = |reason| {
        Err(InvalidRecordId {
            id: id.to_string(),
            reason,
        })
    };

    if id.is_empty() || id.len() > MAX_RECORD_ID_LEN {
        return invalid("must be 1-64 characters");
    }

    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return invalid("only ASCII letters, digits, '-' and '_' allowed");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_record_id() {
        assert!(validate_record_id("a1B2-c3_d4").is_ok());
        assert!(validate_record_id("").is_err());
        assert!(validate_record_id("../etc/passwd").is_err());
        assert!(validate_record_id("abc?x=1").is_err());
        assert!(validate_record_id(&"a".repeat(65)).is_err());
    }
}
