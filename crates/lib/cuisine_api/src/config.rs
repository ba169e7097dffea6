//! API server configuration.

use cuisine_core::auth::AuthError;
use cuisine_core::mail::SmtpConfig;
use cuisine_core::meals::DEFAULT_MEALDB_BASE_URL;

use crate::services::auth::resolve_jwt_secret_from;

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:3100").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub pg_connection_url: String,
    /// JWT signing secret.
    pub jwt_secret: String,
    /// Public URL of the web client, used in password-reset links.
    pub app_url: String,
    /// TheMealDB API root.
    pub mealdb_base_url: String,
    /// Outgoing mail. `None` logs mail instead of sending it.
    pub smtp: Option<SmtpConfig>,
}

impl ApiConfig {
    /// Reads configuration from environment variables.
    ///
    /// | Variable                     | Default                                    |
    /// |------------------------------|--------------------------------------------|
    /// | `BIND_ADDR`                  | `127.0.0.1:3100`                           |
    /// | `DATABASE_URL`               | `postgres://localhost:5432/cuisine`        |
    /// | `JWT_SECRET` / `AUTH_SECRET` | required                                   |
    /// | `APP_URL`                    | `http://localhost:3000`                    |
    /// | `MEALDB_BASE_URL`            | `https://www.themealdb.com/api/json/v1/1`  |
    /// | `SMTP_HOST`                  | unset (mail is logged only)                |
    /// | `SMTP_PORT`                  | `587`                                      |
    /// | `SMTP_USERNAME` / `SMTP_PASSWORD` | unset                                 |
    /// | `SMTP_FROM`                  | `Cuisine Quest <noreply@localhost>`        |
    /// | `SMTP_TLS`                   | `true`                                     |
    pub fn from_env() -> Result<Self, AuthError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`ApiConfig::from_env`] over an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AuthError> {
        let get = |var: &str, default: &str| {
            lookup(var)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Ok(Self {
            bind_addr: get("BIND_ADDR", "127.0.0.1:3100"),
            pg_connection_url: get("DATABASE_URL", "postgres://localhost:5432/cuisine"),
            jwt_secret: resolve_jwt_secret_from(&lookup)?,
            app_url: get("APP_URL", "http://localhost:3000"),
            mealdb_base_url: get("MEALDB_BASE_URL", DEFAULT_MEALDB_BASE_URL),
            smtp: smtp_from_lookup(&lookup)?,
        })
    }
}

/// Default sender for outgoing mail.
pub const DEFAULT_SMTP_FROM: &str = "Cuisine Quest <noreply@localhost>";

fn smtp_from_lookup(
    lookup: &impl Fn(&str) -> Option<String>,
) -> Result<Option<SmtpConfig>, AuthError> {
    let Some(host) = lookup("SMTP_HOST").filter(|h| !h.trim().is_empty()) else {
        return Ok(None);
    };

    let port = match lookup("SMTP_PORT") {
        Some(p) => p
            .trim()
            .parse()
            .map_err(|_| AuthError::Config(format!("SMTP_PORT is not a port number: {p}")))?,
        None => 587,
    };
    let tls = match lookup("SMTP_TLS").map(|v| v.trim().to_ascii_lowercase()) {
        None => true,
        Some(v) => !matches!(v.as_str(), "false" | "0" | "no" | "off"),
    };

    Ok(Some(SmtpConfig {
        host,
        port,
        username: lookup("SMTP_USERNAME").filter(|v| !v.is_empty()),
        password: lookup("SMTP_PASSWORD").filter(|v| !v.is_empty()),
        from: lookup("SMTP_FROM").unwrap_or_else(|| DEFAULT_SMTP_FROM.to_string()),
        tls,
    }))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var: &str| vars.get(var).cloned()
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let config = ApiConfig::from_lookup(lookup(&[("JWT_SECRET", "s")])).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:3100");
        assert_eq!(config.pg_connection_url, "postgres://localhost:5432/cuisine");
        assert_eq!(config.jwt_secret, "s");
        assert_eq!(config.app_url, "http://localhost:3000");
        assert_eq!(config.mealdb_base_url, DEFAULT_MEALDB_BASE_URL);
        assert!(config.smtp.is_none());
    }

    #[test]
    fn missing_secret_is_an_error() {
        assert!(matches!(
            ApiConfig::from_lookup(lookup(&[("BIND_ADDR", "0.0.0.0:80")])),
            Err(AuthError::Config(_))
        ));
    }

    #[test]
    fn smtp_settings_are_read_when_host_is_set() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("AUTH_SECRET", "s"),
            ("SMTP_HOST", "smtp.example.com"),
            ("SMTP_PORT", "2525"),
            ("SMTP_USERNAME", "mailer"),
            ("SMTP_PASSWORD", "hunter2"),
            ("SMTP_TLS", "false"),
        ]))
        .unwrap();
        let smtp = config.smtp.unwrap();
        assert_eq!(smtp.host, "smtp.example.com");
        assert_eq!(smtp.port, 2525);
        assert_eq!(smtp.username.as_deref(), Some("mailer"));
        assert_eq!(smtp.password.as_deref(), Some("hunter2"));
        assert_eq!(smtp.from, DEFAULT_SMTP_FROM);
        assert!(!smtp.tls);
    }

    #[test]
    fn bad_smtp_port_is_an_error() {
        let result = ApiConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "s"),
            ("SMTP_HOST", "smtp.example.com"),
            ("SMTP_PORT", "smtp"),
        ]));
        assert!(matches!(result, Err(AuthError::Config(_))));
    }
}
