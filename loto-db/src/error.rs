use thiserror::Error;

/// Errors raised by the draw model, row parsing and prize classification.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LotoError {
    /// A row field is missing or cannot be coerced/validated.
    #[error("Champ '{field}' invalide : {reason}")]
    Parse { field: String, reason: String },

    /// Ticket or draw violates the 5-of-49 + chance rules, or an empty statistics window.
    #[error("Entrée invalide : {0}")]
    InvalidInput(String),

    /// A computed rank has no matching payout in the draw record.
    #[error("Données incohérentes : {0}")]
    DataIntegrity(String),
}

impl LotoError {
    pub fn parse(field: impl Into<String>, reason: impl Into<String>) -> Self {
        LotoError::Parse {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Name of the offending field, for parse errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            LotoError::Parse { field, .. } => Some(field),
            _ => None,
        }
    }
}

pub type LotoResult<T> = Result<T, LotoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_names_field() {
        let err = LotoError::parse("boule_3", "valeur 50 hors limites (1-49)");
        assert_eq!(err.field(), Some("boule_3"));
        assert!(err.to_string().contains("boule_3"));
        assert!(err.to_string().contains("hors limites"));
    }

    #[test]
    fn test_other_errors_have_no_field() {
        assert_eq!(LotoError::InvalidInput("x".to_string()).field(), None);
        assert_eq!(LotoError::DataIntegrity("x".to_string()).field(), None);
    }
}
