use crate::db::StoreError;

/// Failure taxonomy of the session and dashboard services.
#[derive(Debug, thiserror::Error)]
pub enum SrsError {
    #[error("not found: {0}")]
    NotFound(String),
    /// Legitimate empty state, rendered as "nothing to do" rather than an error.
    #[error("{0}")]
    NoContent(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for SrsError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => Self::NotFound(what),
            StoreError::Conflict { learner_id, item_id } => Self::Conflict(format!(
                "progress for item {item_id} of learner {learner_id} was modified concurrently"
            )),
            StoreError::Unavailable(message) => Self::Unavailable(message),
            StoreError::Corrupt(message) => Self::Unavailable(format!("corrupt data: {message}")),
            StoreError::Sqlx(err) => Self::Unavailable(err.to_string()),
        }
    }
}

const MAX_LEARNER_ID_LEN: usize = 64;

pub fn validate_learner_id(learner_id: &str) -> Result<(), SrsError> {
    let valid_chars = learner_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if learner_id.is_empty() || learner_id.len() > MAX_LEARNER_ID_LEN || !valid_chars {
        return Err(SrsError::InvalidInput(format!(
            "learnerId must be 1-{MAX_LEARNER_ID_LEN} characters of [A-Za-z0-9_-]"
        )));
    }
    Ok(())
}

pub fn validate_answer(answer: &str) -> Result<(), SrsError> {
    if answer.trim().is_empty() {
        return Err(SrsError::InvalidInput("answer must not be empty".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_learner_id_rules() {
        assert!(validate_learner_id("alice_01-x").is_ok());
        assert!(validate_learner_id("").is_err());
        assert!(validate_learner_id("has space").is_err());
        assert!(validate_learner_id("猫").is_err());
        assert!(validate_learner_id(&"a".repeat(65)).is_err());
    }

    #[test]
    fn test_conflict_maps_through() {
        let err: SrsError = StoreError::Conflict {
            learner_id: "alice".into(),
            item_id: 3,
        }
        .into();
        assert!(matches!(err, SrsError::Conflict(_)));
    }
}
