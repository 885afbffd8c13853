//! Server configuration

use shared::kitchen::WaitThresholds;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// JWT secret for staff authentication
    pub jwt_secret: String,
    /// Max PostgreSQL pool connections
    pub db_max_connections: u32,
    /// Allowed browser origin (None = any origin)
    pub cors_origin: Option<String>,
    /// Kitchen wait-time thresholds
    pub kitchen: WaitThresholds,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from any key lookup (env vars in production)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BoxError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "development".into());
        let defaults = WaitThresholds::default();

        let kitchen = WaitThresholds {
            warning_minutes: parse_or(&lookup, "KITCHEN_WARNING_MINUTES", defaults.warning_minutes)?,
            late_minutes: parse_or(&lookup, "KITCHEN_LATE_MINUTES", defaults.late_minutes)?,
        };
        if kitchen.warning_minutes >= kitchen.late_minutes {
            return Err("KITCHEN_WARNING_MINUTES must be lower than KITCHEN_LATE_MINUTES".into());
        }

        Ok(Self {
            database_url: lookup("DATABASE_URL").ok_or("DATABASE_URL must be set")?,
            http_port: parse_or(&lookup, "HTTP_PORT", 8080)?,
            jwt_secret: require_secret(&lookup, "JWT_SECRET", &environment)?,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            cors_origin: lookup("CORS_ORIGIN").filter(|s| !s.is_empty()),
            environment,
            kitchen,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

/// Require a secret: must be set and non-empty in non-development environments.
fn require_secret<F>(lookup: &F, name: &str, environment: &str) -> Result<String, BoxError>
where
    F: Fn(&str) -> Option<String>,
{
    let val = match lookup(name) {
        Some(v) => v,
        None => {
            if environment != "development" {
                return Err(format!("{name} must be set in {environment} environment").into());
            }
            format!("dev-{name}-not-for-production")
        }
    };
    if val.is_empty() && environment != "development" {
        return Err(format!("{name} must not be empty in {environment} environment").into());
    }
    Ok(val)
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T, BoxError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| format!("{name} has an invalid value: '{raw}'").into()),
        _ => Ok(default),
    }
}
