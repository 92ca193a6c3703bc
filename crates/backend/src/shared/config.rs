use once_cell::sync::OnceCell;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub amo: AmoConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AmoConfig {
    /// Базовый URL аккаунта AmoCRM, например "https://example.amocrm.ru"
    pub base_url: String,
    /// Долгоживущий токен для заголовка Authorization: Bearer
    pub secret_token: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[amo]
base_url = "https://example.amocrm.ru"
secret_token = ""

[server]
port = 3000
"#;

static CONFIG: OnceCell<Config> = OnceCell::new();

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
///
/// Env-переменные AMO_BASE_URL и AMO_SECRET_TOKEN перекрывают файл.
pub fn load_config() -> anyhow::Result<Config> {
    let mut config = load_config_file()?;
    apply_overrides(
        &mut config,
        std::env::var("AMO_BASE_URL").ok(),
        std::env::var("AMO_SECRET_TOKEN").ok(),
    );
    Ok(config)
}

fn load_config_file() -> anyhow::Result<Config> {
    // Try to find config.toml next to the executable
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                let config: Config = toml::from_str(&contents)?;
                return Ok(config);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    // Fall back to default config
    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}

fn apply_overrides(config: &mut Config, base_url: Option<String>, secret_token: Option<String>) {
    if let Some(base_url) = base_url {
        config.amo.base_url = base_url;
    }
    if let Some(secret_token) = secret_token {
        config.amo.secret_token = secret_token;
    }
}

/// Загружает конфигурацию один раз на старте процесса
pub fn init() -> anyhow::Result<&'static Config> {
    let config = load_config()?;
    Ok(CONFIG.get_or_init(|| config))
}

/// Доступ к конфигурации после `init()`
pub fn get() -> &'static Config {
    CONFIG.get().expect("config is not initialized, call config::init() first")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config: Result<Config, _> = toml::from_str(DEFAULT_CONFIG);
        assert!(config.is_ok());
        let config = config.unwrap();
        assert_eq!(config.amo.base_url, "https://example.amocrm.ru");
        assert_eq!(config.amo.secret_token, "");
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_env_overrides_replace_file_values() {
        let mut config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        apply_overrides(
            &mut config,
            Some("https://school.amocrm.ru".into()),
            Some("token-123".into()),
        );
        assert_eq!(config.amo.base_url, "https://school.amocrm.ru");
        assert_eq!(config.amo.secret_token, "token-123");
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_missing_overrides_keep_file_values() {
        let mut config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        apply_overrides(&mut config, None, None);
        assert_eq!(config.amo.base_url, "https://example.amocrm.ru");
    }
}
