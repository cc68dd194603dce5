use serde::{Deserialize, Serialize};

/// Hard ceiling on ancestor climbing, independent of configuration
pub const MAX_CLIMB_DEPTH: usize = 32;

/// Configuration for context extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinderConfig {
    /// Maximum words in the context window
    pub word_budget: usize,

    /// How many ancestor levels widening may climb while under budget
    pub max_climb_depth: usize,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            word_budget: 400,
            max_climb_depth: 3,
        }
    }
}

impl FinderConfig {
    #[must_use]
    pub fn with_budget(word_budget: usize) -> Self {
        Self {
            word_budget,
            ..Default::default()
        }
    }

    /// Keep to the selection's own siblings, never climb
    #[must_use]
    pub fn local_only(word_budget: usize) -> Self {
        Self {
            word_budget,
            max_climb_depth: 0,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.word_budget == 0 {
            return Err("word_budget must be > 0".to_string());
        }

        if self.max_climb_depth > MAX_CLIMB_DEPTH {
            return Err(format!(
                "max_climb_depth ({}) cannot exceed {MAX_CLIMB_DEPTH}",
                self.max_climb_depth
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        assert!(FinderConfig::default().validate().is_ok());
        assert!(FinderConfig::local_only(10).validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        assert!(FinderConfig::with_budget(0).validate().is_err());

        let deep = FinderConfig {
            word_budget: 10,
            max_climb_depth: MAX_CLIMB_DEPTH + 1,
        };
        assert!(deep.validate().is_err());
    }
}
