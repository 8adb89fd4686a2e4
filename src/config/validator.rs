use thiserror::Error;

use crate::agents::config::{AgentConfig, LlmProviderConfig, NotesConfig, StoreBackend, StoreConfig};
use crate::config::{ServerSettings, Settings};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

pub struct ConfigValidator;

impl ConfigValidator {
    /// Collect every violation instead of stopping at the first
    pub fn validate(settings: &Settings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        errors.extend(Self::validate_server(&settings.server));
        errors.extend(Self::validate_llm(&settings.llm));
        errors.extend(Self::validate_agent(&settings.agent));
        errors.extend(Self::validate_store(&settings.store));
        errors.extend(Self::validate_notes(&settings.notes));

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_server(server: &ServerSettings) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if server.host.is_empty() {
            errors.push(ValidationError::MissingField("server.host".to_string()));
        }

        if server.port == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        errors
    }

    fn validate_llm(llm: &LlmProviderConfig) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if llm.api_key_env.is_empty() {
            errors.push(ValidationError::MissingField("llm.api_key_env".to_string()));
        }

        if llm.timeout_seconds == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "llm.timeout_seconds".to_string(),
                reason: "Timeout must be greater than 0".to_string(),
            });
        }

        if let Some(temp) = llm.temperature {
            if !(0.0..=2.0).contains(&temp) {
                errors.push(ValidationError::InvalidValue {
                    field: "llm.temperature".to_string(),
                    reason: "Temperature must be between 0.0 and 2.0".to_string(),
                });
            }
        }

        errors
    }

    fn validate_agent(agent: &AgentConfig) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if agent.model.trim().is_empty() {
            errors.push(ValidationError::MissingField("agent.model".to_string()));
        }

        if agent.system_instruction.trim().is_empty() {
            errors.push(ValidationError::MissingField(
                "agent.system_instruction".to_string(),
            ));
        }

        errors
    }

    fn validate_store(store: &StoreConfig) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if store.backend == StoreBackend::File && store.file_path.is_empty() {
            errors.push(ValidationError::MissingField("store.file_path".to_string()));
        }

        errors
    }

    fn validate_notes(notes: &NotesConfig) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if notes.max_results_per_query == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "notes.max_results_per_query".to_string(),
                reason: "Must be at least 1".to_string(),
            });
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 8000,
                cors_origins: vec![],
            },
            llm: LlmProviderConfig::default(),
            agent: AgentConfig::default(),
            store: StoreConfig::default(),
            notes: NotesConfig::default(),
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(ConfigValidator::validate(&settings()).is_ok());
    }

    #[test]
    fn test_reports_every_violation() {
        let mut s = settings();
        s.server.port = 0;
        s.agent.model = String::new();
        s.notes.max_results_per_query = 0;

        let errors = ConfigValidator::validate(&s).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_temperature_range() {
        let mut s = settings();
        s.llm.temperature = Some(3.5);
        assert!(ConfigValidator::validate(&s).is_err());
    }
}
