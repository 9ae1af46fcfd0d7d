//! # ماژول تنظیمات (Configuration)
//!
//! این ماژول مسئول خوندن و مدیریت تنظیمات سرویس هست.
//!
//! ## مفاهیم Rust:
//! - **Structs**: ساختار داده‌ای برای نگهداری تنظیمات
//! - **Default Trait**: مقادیر پیش‌فرض
//! - **Serde**: سریالایز/دسریالایز
//! - **Builder Pattern**: ساخت تدریجی آبجکت
//!
//! ## متغیرهای محیطی
//! - `HOST`, `PORT`
//! - `CONNECT_STRING`: قالب اتصال با `{database}` (مثلا `sqlite://data/{database}.db`)
//! - `KNOWN_REPOS`: لیست ریپوهای مجاز با کاما
//! - `KNOWN_REPOS_FILE`: فایل JSON شامل آرایه‌ای از اسم ریپوها
//! - `REQUEST_TIMEOUT_SECS`: سقف زمان هر درخواست
//! - `ROUTE_PREFIX`: پیشوند مسیر endpoint
//! - `ENVIRONMENT`: development / testing / production

use std::{collections::HashSet, env, fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// جایی که اسم ریپو داخل قالب اتصال قرار میگیره
pub const DATABASE_PLACEHOLDER: &str = "{database}";

/// مسیر health check (بدون `/`)
pub const HEALTH_ROUTE: &str = "health";

/// تنظیمات اصلی برنامه
///
/// # مثال
/// ```rust
/// use repo_traffic::config::Config;
///
/// let config = Config::default();
/// println!("Port: {}", config.port);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// آدرس هاست سرور
    pub host: String,

    /// پورت سرور
    pub port: u16,

    /// قالب آدرس اتصال به دیتابیس هر ریپو
    pub connect_string: String,

    /// ریپوهایی که اجازه query دارن
    pub known_repos: Vec<String>,

    /// سقف زمان کل درخواست (ثانیه)
    pub request_timeout_secs: u64,

    /// پیشوند مسیر، بدون `/` اول
    pub route_prefix: String,

    /// محیط اجرا (development, production)
    pub environment: Environment,
}

/// محیط اجرای برنامه
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// محیط توسعه - لاگ خوانا
    #[default]
    Development,

    /// محیط تست
    Testing,

    /// محیط تولید - لاگ JSON
    Production,
}

impl Environment {
    /// آیا در محیط تولید هستیم؟
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl From<String> for Environment {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            "testing" | "test" => Environment::Testing,
            _ => Environment::Development,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            connect_string: "sqlite://data/{database}.db".to_string(),
            known_repos: Vec::new(),
            request_timeout_secs: 200,
            route_prefix: "traffic".to_string(),
            environment: Environment::Development,
        }
    }
}

impl Config {
    /// ساخت تنظیمات از متغیرهای محیطی
    ///
    /// # Errors
    /// خطا برمیگردونه اگه فایل `KNOWN_REPOS_FILE` خونده یا parse نشه
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let get_env = |key: &str, default: &str| -> String {
            env::var(key).unwrap_or_else(|_| default.to_string())
        };

        let parse_env = |key: &str, default: u64| -> u64 {
            env::var(key)
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default)
        };

        // اول فایل، بعد لیست کاما‌دار
        let mut known_repos = match env::var("KNOWN_REPOS_FILE") {
            Ok(path) => load_repos_file(path)?,
            Err(_) => Vec::new(),
        };
        if let Ok(list) = env::var("KNOWN_REPOS") {
            known_repos.extend(split_repo_list(&list));
        }

        let port = u16::try_from(parse_env("PORT", u64::from(defaults.port)))
            .map_err(|_| AppError::Config("PORT must fit in 16 bits".to_string()))?;

        Ok(Self {
            host: get_env("HOST", &defaults.host),
            port,
            connect_string: get_env("CONNECT_STRING", &defaults.connect_string),
            known_repos,
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs),
            route_prefix: get_env("ROUTE_PREFIX", &defaults.route_prefix)
                .trim_matches('/')
                .to_string(),
            environment: get_env("ENVIRONMENT", "development").into(),
        })
    }

    /// اعتبارسنجی تنظیمات
    ///
    /// # Errors
    /// - قالب اتصال `{database}` نداشته باشه
    /// - پورت یا timeout صفر باشه
    /// - پیشوند مسیر خالی باشه، پارامتر مسیر داشته باشه یا با `health` یکی باشه
    pub fn validate(&self) -> Result<()> {
        if !self.connect_string.contains(DATABASE_PLACEHOLDER) {
            return Err(AppError::Config(format!(
                "CONNECT_STRING must contain the {DATABASE_PLACEHOLDER} placeholder"
            )));
        }

        if self.port == 0 {
            return Err(AppError::Config("PORT cannot be 0".to_string()));
        }

        if self.request_timeout_secs == 0 {
            return Err(AppError::Config(
                "REQUEST_TIMEOUT_SECS cannot be 0".to_string(),
            ));
        }

        if self.route_prefix.is_empty() || self.route_prefix.contains(':') {
            return Err(AppError::Config(
                "ROUTE_PREFIX must be a non-empty static path".to_string(),
            ));
        }

        // `/health` مسیر ثابت router هست
        if self.route_prefix == HEALTH_ROUTE {
            return Err(AppError::Config(format!(
                "ROUTE_PREFIX cannot be `{HEALTH_ROUTE}`"
            )));
        }

        Ok(())
    }

    /// آدرس کامل سرور
    #[must_use]
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// سقف زمان درخواست به صورت `Duration`
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// آدرس اتصال دیتابیس یک ریپو
    ///
    /// فقط اولین `{database}` جایگزین میشه.
    #[must_use]
    pub fn connect_string_for(&self, repo: &str) -> String {
        self.connect_string.replacen(DATABASE_PLACEHOLDER, repo, 1)
    }

    /// لیست مجاز به صورت Set برای جستجوی سریع
    #[must_use]
    pub fn repo_allowlist(&self) -> HashSet<String> {
        self.known_repos.iter().cloned().collect()
    }
}

/// خوندن فایل JSON لیست ریپوها
fn load_repos_file(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let raw = fs::read_to_string(path)?;
    let repos: Vec<String> = serde_json::from_str(&raw)?;
    Ok(repos)
}

/// جدا کردن لیست کاما‌دار و حذف مقادیر خالی
fn split_repo_list(list: &str) -> impl Iterator<Item = String> + '_ {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

// =====================================
// Builder Pattern
// =====================================
/// ساخت Config با Builder Pattern
///
/// # مثال
/// ```rust
/// use repo_traffic::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .port(8080)
///     .known_repos(["site", "docs"])
///     .build();
/// ```
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// ساخت builder جدید
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// تنظیم پورت
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// تنظیم هاست
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// تنظیم قالب اتصال
    #[must_use]
    pub fn connect_string(mut self, template: impl Into<String>) -> Self {
        self.config.connect_string = template.into();
        self
    }

    /// تنظیم لیست ریپوهای مجاز
    #[must_use]
    pub fn known_repos<I, S>(mut self, repos: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.known_repos = repos.into_iter().map(Into::into).collect();
        self
    }

    /// تنظیم سقف زمان درخواست
    #[must_use]
    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    /// تنظیم پیشوند مسیر
    #[must_use]
    pub fn route_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.route_prefix = prefix.into().trim_matches('/').to_string();
        self
    }

    /// تنظیم محیط
    #[must_use]
    pub fn environment(mut self, env: Environment) -> Self {
        self.config.environment = env;
        self
    }

    /// ساخت Config نهایی
    #[must_use]
    pub fn build(self) -> Config {
        self.config
    }

    /// ساخت Config با اعتبارسنجی
    ///
    /// # Errors
    /// خطا برمیگردونه اگه اعتبارسنجی fail بشه
    pub fn build_validated(self) -> Result<Config> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}
