/// Configuration management for the API server
///
/// Loaded once in `main` from environment variables (and a `.env` file, if
/// present). Handlers never read the environment themselves.
///
/// # Environment Variables
///
/// - `API_HOST`: host to bind to (default: 0.0.0.0)
/// - `API_PORT`: port to bind to (default: 8080)
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
/// - `JWT_SECRET`: token signing key (default: built-in development key, with a warning)
/// - `CORS_ORIGINS`: comma-separated allowed origins, `*` for any (default: *)
/// - `REQUEST_TIMEOUT_SECS`: per-request deadline (default: 30)
/// - `RUN_MIGRATIONS`: apply embedded migrations on start (default: true)
/// - `RUST_LOG`: log filter; `LOG_FORMAT=json` switches to JSON lines
///
/// # Example
///
/// ```no_run
/// use kanban_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; `["*"]` allows any
    pub cors_origins: Vec<String>,

    /// Requests running longer than this are dropped with 408
    pub request_timeout: Duration,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub run_migrations: bool,
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// `None` falls back to the built-in development key
    pub secret: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Fails if `DATABASE_URL` is missing or a numeric/boolean variable does
    /// not parse.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL environment variable is required")?;

        Ok(Self {
            api: ApiConfig {
                host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_var("API_PORT", 8080)?,
                cors_origins: parse_origins(
                    &env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string()),
                ),
                request_timeout: Duration::from_secs(parse_var("REQUEST_TIMEOUT_SECS", 30)?),
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 10)?,
                run_migrations: parse_var("RUN_MIGRATIONS", true)?,
            },
            jwt: JwtConfig {
                secret: env::var("JWT_SECRET").ok().filter(|s| !s.is_empty()),
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Whether any origin may call the API
    pub fn cors_permissive(&self) -> bool {
        self.api.cors_origins.iter().any(|o| o == "*")
    }
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", name, value)),
        Err(_) => Ok(default),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(origins: &[&str]) -> Config {
        Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                cors_origins: origins.iter().map(|o| o.to_string()).collect(),
                request_timeout: Duration::from_secs(30),
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/test".to_string(),
                max_connections: 10,
                run_migrations: false,
            },
            jwt: JwtConfig { secret: None },
        }
    }

    #[test]
    fn test_bind_address() {
        assert_eq!(config(&["*"]).bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins("https://a.example, https://b.example,,"),
            vec!["https://a.example", "https://b.example"]
        );
        assert!(config(&["*"]).cors_permissive());
        assert!(!config(&["https://a.example"]).cors_permissive());
    }
}
