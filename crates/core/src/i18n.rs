use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Languages served by the rate catalog. Every localized field must carry
/// both; partial localization is rejected at construction time instead of
/// surfacing as blank text at render time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ca,
    Es,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::Ca => "ca",
            Language::Es => "es",
        }
    }
}

impl std::str::FromStr for Language {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ca" => Ok(Language::Ca),
            "es" => Ok(Language::Es),
            other => Err(DomainError::InvariantViolation(format!(
                "unsupported language code: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub ca: String,
    pub es: String,
}

impl LocalizedText {
    pub fn new(ca: impl Into<String>, es: impl Into<String>) -> Result<Self, DomainError> {
        let text = Self { ca: ca.into(), es: es.into() };
        if text.ca.trim().is_empty() || text.es.trim().is_empty() {
            return Err(DomainError::InvariantViolation(
                "localized text requires both ca and es values".to_owned(),
            ));
        }
        Ok(text)
    }

    pub fn get(&self, language: Language) -> &str {
        match language {
            Language::Ca => &self.ca,
            Language::Es => &self.es,
        }
    }
}
