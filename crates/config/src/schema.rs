use serde::{Deserialize, Serialize};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;
pub const ANY_ORIGIN: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Falls back to `tasks.db` under the asset directory when unset.
    #[serde(alias = "databaseUrl")]
    pub database_url: Option<String>,
    pub cors: CorsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database_url: None,
            cors: CorsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    #[serde(alias = "allowedOrigins")]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![ANY_ORIGIN.to_string()],
        }
    }
}

impl CorsConfig {
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.is_empty() || self.allowed_origins.iter().any(|o| o == ANY_ORIGIN)
    }
}

impl Config {
    /// Parses a config file body, falling back to defaults when it is not valid JSON.
    pub fn from_raw(raw: &str) -> Self {
        match serde_json::from_str::<Config>(raw) {
            Ok(config) => config.normalized(),
            Err(err) => {
                tracing::warn!("Invalid config file, using defaults: {}", err);
                Config::default()
            }
        }
    }

    pub fn normalized(mut self) -> Self {
        let host = self.host.trim();
        self.host = if host.is_empty() {
            DEFAULT_HOST.to_string()
        } else {
            host.to_string()
        };
        self.database_url = self
            .database_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());
        self.cors.allowed_origins = self
            .cors
            .allowed_origins
            .iter()
            .map(|origin| origin.trim().trim_end_matches('/').to_string())
            .filter(|origin| !origin.is_empty())
            .collect();
        self
    }

    /// Applies `HOST`, `BACKEND_PORT`/`PORT`, `DATABASE_URL` and
    /// `TASKS_CORS_ORIGINS` on top of the file values.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST").filter(|h| !h.trim().is_empty()) {
            self.host = host.trim().to_string();
        }

        if let Some(raw) = lookup("BACKEND_PORT").or_else(|| lookup("PORT")) {
            match parse_port(&raw) {
                Some(port) => self.port = port,
                None => tracing::warn!(value = %raw.trim(), "Ignoring invalid port override"),
            }
        }

        if let Some(url) = lookup("DATABASE_URL").filter(|u| !u.trim().is_empty()) {
            self.database_url = Some(url.trim().to_string());
        }

        if let Some(origins) = lookup("TASKS_CORS_ORIGINS") {
            self.cors.allowed_origins = origins.split(',').map(str::to_string).collect();
        }

        *self = std::mem::take(self).normalized();
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Accepts ports wrapped in ANSI escape codes, as some process managers emit them.
pub fn parse_port(raw: &str) -> Option<u16> {
    let cleaned = String::from_utf8(strip_ansi_escapes::strip(raw.as_bytes())).ok()?;
    cleaned.trim().parse::<u16>().ok()
}
