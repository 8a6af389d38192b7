// config.rs
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    // Generative model configuration
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
}

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

impl Config {
    pub fn init() -> Config {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let jwt_secret = std::env::var("JWT_SECRET_KEY").expect("JWT_SECRET_KEY must be set");

        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(8000);

        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        // GOOGLE_GEMINI_API_KEY is accepted as an alias
        let gemini_api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .or_else(|| std::env::var("GOOGLE_GEMINI_API_KEY").ok())
            .filter(|key| !key.trim().is_empty());
        let gemini_model = std::env::var("GEMINI_MODEL")
            .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string());
        let gemini_base_url = std::env::var("GEMINI_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string());

        Config {
            database_url,
            jwt_secret,
            port,
            allowed_origins,
            gemini_api_key,
            gemini_model,
            gemini_base_url,
        }
    }

    /// Server key first, then whatever the caller supplied.
    pub fn resolve_api_key(&self, provided: Option<&str>) -> Option<String> {
        self.gemini_api_key.clone().or_else(|| {
            provided
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .map(str::to_string)
        })
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests(gemini_api_key: Option<&str>) -> Config {
        Config {
            database_url: "postgres://localhost/ecosort".to_string(),
            jwt_secret: "test-secret".to_string(),
            port: 8000,
            allowed_origins: vec!["http://localhost:3000".to_string()],
            gemini_api_key: gemini_api_key.map(str::to_string),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_key_wins_over_provided_key() {
        let config = Config::for_tests(Some("server-key"));
        assert_eq!(config.resolve_api_key(Some("user-key")).as_deref(), Some("server-key"));
    }

    #[test]
    fn provided_key_used_when_server_key_missing() {
        let config = Config::for_tests(None);
        assert_eq!(config.resolve_api_key(Some(" user-key ")).as_deref(), Some("user-key"));
        assert_eq!(config.resolve_api_key(Some("   ")), None);
        assert_eq!(config.resolve_api_key(None), None);
    }
}
