use serde::Deserialize;

/// Model options a user can define as a unit for one provider tier in
/// `config.toml`, e.g. under `[models.reasoning]`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ModelProfile {
    pub model: Option<String>,
    /// Base URL of an OpenAI-compatible API.
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub temperature: Option<f32>,
}

/// Fully resolved settings for one tier.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub model: String,
    pub base_url: String,
    pub api_key: Option<String>,
    pub temperature: f32,
}

impl ModelProfile {
    /// Layers `overrides` (usually taken from the environment) on top of this
    /// profile and falls back to `default_model` for anything still unset.
    pub fn resolve(self, overrides: ModelProfile, default_model: &str) -> ModelConfig {
        ModelConfig {
            model: non_empty(overrides.model)
                .or(non_empty(self.model))
                .unwrap_or_else(|| default_model.to_string()),
            base_url: non_empty(overrides.base_url)
                .or(non_empty(self.base_url))
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key: non_empty(overrides.api_key).or(non_empty(self.api_key)),
            temperature: overrides.temperature.or(self.temperature).unwrap_or(0.0),
        }
    }
}

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

// Blank values in `.env` files mean "unset".
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn overrides_win_and_blanks_fall_through() {
        let file = ModelProfile {
            model: Some("deepseek-reasoner".to_string()),
            base_url: Some("https://api.deepseek.com".to_string()),
            api_key: Some("file-key".to_string()),
            temperature: None,
        };
        let env = ModelProfile {
            model: Some(String::new()),
            base_url: None,
            api_key: Some("env-key".to_string()),
            temperature: Some(0.3),
        };

        assert_eq!(
            file.resolve(env, "o1-mini"),
            ModelConfig {
                model: "deepseek-reasoner".to_string(),
                base_url: "https://api.deepseek.com".to_string(),
                api_key: Some("env-key".to_string()),
                temperature: 0.3,
            }
        );
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let resolved = ModelProfile::default().resolve(ModelProfile::default(), "gpt-4o");
        assert_eq!(resolved.model, "gpt-4o");
        assert_eq!(resolved.base_url, DEFAULT_BASE_URL);
        assert_eq!(resolved.api_key, None);
    }
}
