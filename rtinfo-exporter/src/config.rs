use crate::error::ExporterError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::{error, info, warn};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExporterConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,
    pub push: Option<PushConf>,
    pub mqtt: Option<MqttConf>,
}

/// Réception de snapshots via POST /snapshot.
/// Section absente = push désactivé ; section présente = push protégé par clé.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PushConf {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MqttConf {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_topic")]
    pub topic: String,
    pub client_id: Option<String>,
}

fn default_listen() -> String { "0.0.0.0:9110".into() }
fn default_metrics_path() -> String { "/metrics".into() }
fn default_topic() -> String { "rtinfo/fleet/snapshot@v1".into() }
fn default_true() -> bool { true }
fn default_api_key_env() -> String { "RTINFO_EXPORTER_API_KEY".into() }

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            metrics_path: default_metrics_path(),
            push: None,
            mqtt: None,
        }
    }
}

impl ExporterConfig {
    pub fn push_enabled(&self) -> bool {
        self.push.as_ref().map(|p| p.enabled).unwrap_or(false)
    }

    /// Clé API attendue pour le push, lue dans l'env au moment de l'appel.
    /// None si la variable est absente ou vide : le push est alors refusé.
    pub fn push_api_key(&self) -> Option<String> {
        let var = &self.push.as_ref()?.api_key_env;
        std::env::var(var).ok().filter(|k| !k.is_empty())
    }

    /// Route du scrape, toujours préfixée par '/'
    pub fn metrics_route(&self) -> String {
        let path = self.metrics_path.trim();
        if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        }
    }

    /// Le chemin de scrape ne doit pas masquer une route d'administration
    /// ni contenir de syntaxe de route axum (`{param}`, `{*rest}`, `:param`)
    pub fn validate(&self) -> crate::error::Result<()> {
        const RESERVED: [&str; 4] = ["/health", "/system/health", "/hosts", "/snapshot"];
        let path = self.metrics_route();
        if path == "/" {
            return Err(ExporterError::Config("metrics_path must not be empty".into()));
        }
        if RESERVED.contains(&path.as_str()) {
            return Err(ExporterError::Config(format!("metrics_path {path} is reserved")));
        }
        if path.contains(['{', '}', '*']) || path.split('/').any(|seg| seg.starts_with(':')) {
            return Err(ExporterError::Config(format!(
                "metrics_path {path} must be a literal path"
            )));
        }
        Ok(())
    }

    fn apply_env_overrides(mut self) -> Self {
        if let Ok(listen) = std::env::var("RTINFO_EXPORTER_LISTEN") {
            if !listen.trim().is_empty() {
                self.listen = listen;
            }
        }
        self
    }
}

pub fn parse_config(txt: &str) -> crate::error::Result<ExporterConfig> {
    if txt.trim().is_empty() {
        return Ok(ExporterConfig::default());
    }
    Ok(serde_yaml::from_str(txt)?)
}

pub async fn read_config_file(path: &Path) -> crate::error::Result<ExporterConfig> {
    let txt = fs::read_to_string(path).await?;
    parse_config(&txt)
}

pub async fn load_config() -> ExporterConfig {
    let path = std::env::var("RTINFO_EXPORTER_CONFIG").unwrap_or_else(|_| "exporter.yaml".into());
    let cfg = if Path::new(&path).exists() {
        match read_config_file(Path::new(&path)).await {
            Ok(cfg) => {
                info!("[config] loaded {path}");
                cfg
            }
            Err(e) => {
                error!("[config] config illisible ({path}): {e}");
                ExporterConfig::default()
            }
        }
    } else {
        warn!("[config] pas de {path}, usage config par défaut");
        ExporterConfig::default()
    };
    cfg.apply_env_overrides()
}
