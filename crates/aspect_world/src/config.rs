//! Engine configuration.

use aspect_component::{EntityWidth, GenerationPolicy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("max_entities must be at least 1")]
    ZeroMaxEntities,
    #[error("max_entities {max} exceeds the {width:?} capacity of {capacity}")]
    MaxEntitiesExceedsWidth {
        max: u64,
        width: EntityWidth,
        capacity: u64,
    },
    #[error("max_component_types must be at least 1")]
    ZeroComponentTypes,
}

/// How much checking entity arguments receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Reject the invalid sentinel and out-of-range ids, and report absent
    /// entities as errors everywhere.
    #[default]
    Strict,
    /// Skip sentinel and range checks. Membership queries (`has`, `any`,
    /// `has_all`, `remove`, `try_get`) on absent entities answer "no" instead
    /// of failing.
    Release,
}

/// Construction-time options of an [`Engine`](crate::Engine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Integer width of entity identifiers.
    pub width: EntityWidth,
    /// How identifiers are generated.
    pub generator: GenerationPolicy,
    /// Maximum number of live entities; also the exclusive upper bound of
    /// generated ids. Defaults to the width's capacity.
    pub max_entities: Option<u64>,
    /// Maximum number of distinct component types held at once.
    pub max_component_types: usize,
    /// Initial capacity of the pack table.
    pub initial_pack_capacity: usize,
    pub validation: ValidationMode,
    /// Seed for the random generator. Drawn from OS entropy when absent.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: EntityWidth::default(),
            generator: GenerationPolicy::default(),
            max_entities: None,
            max_component_types: i16::MAX as usize - 1,
            initial_pack_capacity: 1,
            validation: ValidationMode::default(),
            seed: None,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON document and validate it.
    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_width(mut self, width: EntityWidth) -> Self {
        self.width = width;
        self
    }

    #[must_use]
    pub fn with_generator(mut self, generator: GenerationPolicy) -> Self {
        self.generator = generator;
        self
    }

    #[must_use]
    pub fn with_max_entities(mut self, max: u64) -> Self {
        self.max_entities = Some(max);
        self
    }

    #[must_use]
    pub fn with_max_component_types(mut self, max: usize) -> Self {
        self.max_component_types = max;
        self
    }

    #[must_use]
    pub fn with_initial_pack_capacity(mut self, capacity: usize) -> Self {
        self.initial_pack_capacity = capacity;
        self
    }

    #[must_use]
    pub fn with_validation(mut self, validation: ValidationMode) -> Self {
        self.validation = validation;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Shorthand for release-mode validation.
    #[must_use]
    pub fn release(self) -> Self {
        self.with_validation(ValidationMode::Release)
    }

    /// Exclusive upper bound of entity identifiers.
    #[must_use]
    pub fn entity_limit(&self) -> u64 {
        self.max_entities.unwrap_or(self.width.capacity())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(max) = self.max_entities {
            if max == 0 {
                return Err(ConfigError::ZeroMaxEntities);
            }
            let capacity = self.width.capacity();
            if max > capacity {
                return Err(ConfigError::MaxEntitiesExceedsWidth {
                    max,
                    width: self.width,
                    capacity,
                });
            }
        }
        if self.max_component_types == 0 {
            return Err(ConfigError::ZeroComponentTypes);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.width, EntityWidth::Int32);
        assert_eq!(config.generator, GenerationPolicy::Random);
        assert_eq!(config.entity_limit(), i32::MAX as u64 - 1);
        assert_eq!(config.max_component_types, 32_766);
        assert_eq!(config.initial_pack_capacity, 1);
        assert_eq!(config.validation, ValidationMode::Strict);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::new()
            .with_width(EntityWidth::Int16)
            .with_generator(GenerationPolicy::Incremental)
            .with_max_entities(100)
            .with_seed(3)
            .release();
        assert_eq!(config.entity_limit(), 100);
        assert_eq!(config.validation, ValidationMode::Release);
        assert_eq!(config.seed, Some(3));
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config =
            EngineConfig::from_json(r#"{ "width": "int16", "generator": "incremental" }"#).unwrap();
        assert_eq!(config.width, EntityWidth::Int16);
        assert_eq!(config.generator, GenerationPolicy::Incremental);
        assert_eq!(config.entity_limit(), 32_766);
        assert_eq!(config.initial_pack_capacity, 1);
    }

    #[test]
    fn test_from_json_rejects_bad_documents() {
        assert!(matches!(
            EngineConfig::from_json(r#"{ "width": "int12" }"#),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            EngineConfig::from_json(r#"{ "width": "int16", "max_entities": 40000 }"#),
            Err(ConfigError::MaxEntitiesExceedsWidth { max: 40_000, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        assert!(matches!(
            EngineConfig::new().with_max_entities(0).validate(),
            Err(ConfigError::ZeroMaxEntities)
        ));
        assert!(matches!(
            EngineConfig::new().with_max_component_types(0).validate(),
            Err(ConfigError::ZeroComponentTypes)
        ));
    }
}
