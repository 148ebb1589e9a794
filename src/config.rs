use std::env;

/// Application-level configuration for the client core.
///
/// Values are read from environment variables with the same defaults the
/// web client shipped with, so a desktop or test harness can override the
/// notes endpoint or the application salt without code changes.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Fixed application salt mixed into every derived key.
    pub app_salt: String,
    /// Server endpoint that receives the notes POST.
    pub notes_endpoint: String,
    /// Prefix under which encrypted entries are stored.
    pub namespace: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        // Don't fail if .env doesn't exist
        dotenvy::dotenv().ok();

        AppConfig {
            app_salt: env::var("RISKASSESS_APP_SALT")
                .unwrap_or_else(|_| "RiskAssessmentApp2025".to_string()),
            notes_endpoint: env::var("RISKASSESS_NOTES_ENDPOINT")
                .unwrap_or_else(|_| "http://127.0.0.1:5000/save_notes".to_string()),
            namespace: env::var("RISKASSESS_NAMESPACE").unwrap_or_else(|_| "secure_".to_string()),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            app_salt: "RiskAssessmentApp2025".to_string(),
            notes_endpoint: "http://127.0.0.1:5000/save_notes".to_string(),
            namespace: "secure_".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_shipped_constants() {
        let config = AppConfig::default();
        assert_eq!(config.app_salt, "RiskAssessmentApp2025");
        assert_eq!(config.namespace, "secure_");
        assert!(config.notes_endpoint.ends_with("/save_notes"));
    }
}
