use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub storage: StorageConfig,
    pub turnstile: TurnstileConfig,
    pub rate_limit: RateLimitConfig,
    pub upload: UploadConfig,
    pub swagger: SwaggerConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

/// R2/S3 storage configuration.
///
/// Every credential is optional at load time so the server can start without them;
/// uploads are refused with a configuration error until they are all present.
#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    /// S3 API endpoint (e.g. `https://<account>.r2.cloudflarestorage.com`)
    pub endpoint: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub bucket: Option<String>,
    /// Base URL under which stored objects are publicly reachable
    pub public_url: Option<String>,
    pub region: String,
    pub timeout: Duration,
}

/// Resolved storage settings, only obtainable when nothing is missing.
#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub endpoint: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket: String,
    pub public_url: String,
    pub region: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct TurnstileConfig {
    pub secret_key: Option<String>,
    /// Public site key handed to clients; never used by the server itself
    pub site_key: Option<String>,
    pub verify_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
    pub sweep_interval: Duration,
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub max_file_size: u64,
    pub temp_dir: PathBuf,
    /// Insert a random segment into object keys to avoid same-millisecond collisions
    pub unique_keys: bool,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            storage: StorageConfig::from_env()?,
            turnstile: TurnstileConfig::from_env()?,
            rate_limit: RateLimitConfig::from_env()?,
            upload: UploadConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
        })
    }

    /// Names of the server-side settings an upload cannot proceed without.
    pub fn missing_settings(&self) -> Vec<&'static str> {
        let mut missing = self.storage.missing_settings();
        if self.turnstile.secret_key.is_none() {
            missing.push("TURNSTILE_SECRET_KEY");
        }
        missing
    }
}

/// Reads an optional variable, treating an empty value as unset.
fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, String> {
    match optional_var(name) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|_| format!("{} must be a valid number", name)),
        None => Ok(default),
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl StorageConfig {
    const DEFAULT_REGION: &'static str = "auto";
    const DEFAULT_TIMEOUT_SECS: u64 = 60;

    pub fn from_env() -> Result<Self, String> {
        let timeout_secs = parse_var("STORAGE_TIMEOUT_SECS", Self::DEFAULT_TIMEOUT_SECS)?;

        Ok(Self {
            endpoint: optional_var("R2_ENDPOINT"),
            access_key_id: optional_var("R2_ACCESS_KEY_ID"),
            secret_access_key: optional_var("R2_SECRET_ACCESS_KEY"),
            bucket: optional_var("R2_BUCKET_NAME"),
            public_url: optional_var("R2_PUBLIC_URL"),
            region: optional_var("R2_REGION").unwrap_or_else(|| Self::DEFAULT_REGION.to_string()),
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn missing_settings(&self) -> Vec<&'static str> {
        [
            ("R2_ENDPOINT", &self.endpoint),
            ("R2_ACCESS_KEY_ID", &self.access_key_id),
            ("R2_SECRET_ACCESS_KEY", &self.secret_access_key),
            ("R2_BUCKET_NAME", &self.bucket),
            ("R2_PUBLIC_URL", &self.public_url),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| name)
        .collect()
    }

    /// Returns the complete settings, or `None` while anything is missing.
    pub fn settings(&self) -> Option<StorageSettings> {
        Some(StorageSettings {
            endpoint: self.endpoint.clone()?,
            access_key_id: self.access_key_id.clone()?,
            secret_access_key: self.secret_access_key.clone()?,
            bucket: self.bucket.clone()?,
            public_url: self.public_url.clone()?,
            region: self.region.clone(),
            timeout: self.timeout,
        })
    }
}

impl TurnstileConfig {
    pub const DEFAULT_VERIFY_URL: &'static str =
        "https://challenges.cloudflare.com/turnstile/v0/siteverify";
    const DEFAULT_TIMEOUT_SECS: u64 = 10;

    pub fn from_env() -> Result<Self, String> {
        let timeout_secs = parse_var("CAPTCHA_TIMEOUT_SECS", Self::DEFAULT_TIMEOUT_SECS)?;

        Ok(Self {
            secret_key: optional_var("TURNSTILE_SECRET_KEY"),
            site_key: optional_var("TURNSTILE_SITE_KEY"),
            verify_url: optional_var("TURNSTILE_VERIFY_URL")
                .unwrap_or_else(|| Self::DEFAULT_VERIFY_URL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl RateLimitConfig {
    const DEFAULT_MAX_REQUESTS: u32 = 10;
    const DEFAULT_WINDOW_SECS: u64 = 60 * 60; // 1 hour
    const DEFAULT_SWEEP_SECS: u64 = 60;
    /// Longest accepted window; keeps `now + window` within chrono's range
    pub const MAX_WINDOW_SECS: u64 = 366 * 24 * 60 * 60;

    pub fn from_env() -> Result<Self, String> {
        Self::new(
            parse_var("RATE_LIMIT_MAX_REQUESTS", Self::DEFAULT_MAX_REQUESTS)?,
            parse_var("RATE_LIMIT_WINDOW_SECS", Self::DEFAULT_WINDOW_SECS)?,
            parse_var("RATE_LIMIT_SWEEP_SECS", Self::DEFAULT_SWEEP_SECS)?,
        )
    }

    pub fn new(max_requests: u32, window_secs: u64, sweep_secs: u64) -> Result<Self, String> {
        if window_secs == 0 || window_secs > Self::MAX_WINDOW_SECS {
            return Err(format!(
                "RATE_LIMIT_WINDOW_SECS must be between 1 and {}",
                Self::MAX_WINDOW_SECS
            ));
        }
        if sweep_secs == 0 {
            return Err("RATE_LIMIT_SWEEP_SECS must be greater than zero".to_string());
        }

        Ok(Self {
            max_requests,
            window: Duration::from_secs(window_secs),
            sweep_interval: Duration::from_secs(sweep_secs),
        })
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: Self::DEFAULT_MAX_REQUESTS,
            window: Duration::from_secs(Self::DEFAULT_WINDOW_SECS),
            sweep_interval: Duration::from_secs(Self::DEFAULT_SWEEP_SECS),
        }
    }
}

impl UploadConfig {
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 200 * 1024 * 1024; // 200MB

    pub fn from_env() -> Result<Self, String> {
        let max_file_size = parse_var("MAX_FILE_SIZE", Self::DEFAULT_MAX_FILE_SIZE)?;

        let temp_dir = optional_var("UPLOAD_TEMP_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(env::temp_dir);

        let unique_keys = optional_var("UPLOAD_UNIQUE_KEYS")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            max_file_size,
            temp_dir,
            unique_keys,
        })
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: Self::DEFAULT_MAX_FILE_SIZE,
            temp_dir: env::temp_dir(),
            unique_keys: false,
        }
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = optional_var("SWAGGER_USERNAME");
        let password = optional_var("SWAGGER_PASSWORD");
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Rockdrop API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "File drop with bot check and object storage".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_storage() -> StorageConfig {
        StorageConfig {
            endpoint: Some("http://localhost:9000".to_string()),
            access_key_id: Some("key".to_string()),
            secret_access_key: Some("secret".to_string()),
            bucket: Some("drops".to_string()),
            public_url: Some("https://files.example.com".to_string()),
            region: "auto".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_storage_settings_complete() {
        let storage = complete_storage();
        assert!(storage.missing_settings().is_empty());

        let settings = storage.settings().unwrap();
        assert_eq!(settings.bucket, "drops");
        assert_eq!(settings.public_url, "https://files.example.com");
    }

    #[test]
    fn test_storage_settings_missing() {
        let storage = StorageConfig {
            bucket: None,
            public_url: None,
            ..complete_storage()
        };

        assert_eq!(
            storage.missing_settings(),
            vec!["R2_BUCKET_NAME", "R2_PUBLIC_URL"]
        );
        assert!(storage.settings().is_none());
    }

    #[test]
    fn test_missing_settings_include_captcha_secret() {
        let config = Config {
            app: AppConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
                cors_allowed_origins: vec!["*".to_string()],
            },
            storage: complete_storage(),
            turnstile: TurnstileConfig {
                secret_key: None,
                site_key: Some("site".to_string()),
                verify_url: TurnstileConfig::DEFAULT_VERIFY_URL.to_string(),
                timeout: Duration::from_secs(10),
            },
            rate_limit: RateLimitConfig::default(),
            upload: UploadConfig::default(),
            swagger: SwaggerConfig {
                username: None,
                password: None,
                title: "t".to_string(),
                version: "v".to_string(),
                description: "d".to_string(),
            },
        };

        assert_eq!(config.missing_settings(), vec!["TURNSTILE_SECRET_KEY"]);
    }

    #[test]
    fn test_default_max_file_size_is_200_mib() {
        assert_eq!(UploadConfig::DEFAULT_MAX_FILE_SIZE, 209_715_200);
    }

    #[test]
    fn test_rate_limit_window_bounds() {
        let config = RateLimitConfig::new(10, 3600, 60).unwrap();
        assert_eq!(config.window, Duration::from_secs(3600));

        assert!(RateLimitConfig::new(10, RateLimitConfig::MAX_WINDOW_SECS, 60).is_ok());
        assert!(RateLimitConfig::new(10, 0, 60).is_err());
        assert!(RateLimitConfig::new(10, 1_000_000_000_000_000, 60).is_err());
        assert!(RateLimitConfig::new(10, 3600, 0).is_err());
    }
}
