// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CONFIGURAÇÃO DA APLICAÇÃO E DO RUNTIME
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Marcadores de arquivo, persistência, advisor remoto e runtime Tokio.
// Todas as configurações podem ser definidas via .env
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::path::PathBuf;

use crate::parser::{DEFAULT_NARRATION_MARKER, DEFAULT_TITLES_MARKERS};
use crate::project::DEFAULT_ROOT_PROJECT_NAME;
use crate::store::DEFAULT_MAX_SNAPSHOT_CHARS;

/// Modelo padrão do advisor
pub const DEFAULT_ADVISOR_MODEL: &str = "gpt-4.1-mini";

/// Endpoint padrão (API compatível com OpenAI)
pub const DEFAULT_ADVISOR_BASE_URL: &str = "https://api.openai.com/v1";

/// Configuração do advisor remoto.
#[derive(Debug, Clone, PartialEq)]
pub struct AdvisorConfig {
    /// Chave da API. Sem chave o advisor fica desligado.
    pub api_key: Option<String>,
    /// Modelo de chat
    pub model: String,
    /// URL base (sem `/chat/completions`)
    pub base_url: String,
    /// Timeout de cada chamada, em segundos
    pub timeout_secs: u64,
    /// Temperatura das chamadas
    pub temperature: f32,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_ADVISOR_MODEL.to_string(),
            base_url: DEFAULT_ADVISOR_BASE_URL.to_string(),
            timeout_secs: 60,
            temperature: 0.1,
        }
    }
}

impl AdvisorConfig {
    /// Verifica se há chave configurada
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().map(|k| !k.trim().is_empty()).unwrap_or(false)
    }
}

/// Configuração da aplicação.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Pasta raiz padrão do CLI
    pub script_root: Option<PathBuf>,
    /// Marcador do arquivo de narração
    pub narration_marker: String,
    /// Marcadores do arquivo de títulos/descrição
    pub titles_markers: Vec<String>,
    /// Teto dos snapshots, em caracteres
    pub snapshot_max_chars: usize,
    /// Diretório da persistência local
    pub store_dir: PathBuf,
    /// Nome reserva para arquivos sem contexto de pasta
    pub root_project_fallback: String,
    /// Advisor remoto
    pub advisor: AdvisorConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            script_root: None,
            narration_marker: DEFAULT_NARRATION_MARKER.to_string(),
            titles_markers: DEFAULT_TITLES_MARKERS.iter().map(|m| m.to_string()).collect(),
            snapshot_max_chars: DEFAULT_MAX_SNAPSHOT_CHARS,
            store_dir: PathBuf::from("./.script-sections"),
            root_project_fallback: DEFAULT_ROOT_PROJECT_NAME.to_string(),
            advisor: AdvisorConfig::default(),
        }
    }
}

/// Carrega a configuração a partir das variáveis de ambiente.
///
/// Variáveis suportadas:
/// - `SCRIPT_ROOT`: pasta raiz padrão
/// - `NARRATION_MARKER`: marcador da narração (padrão: `03_Texto_Narrado`)
/// - `TITLES_MARKERS`: marcadores de títulos, separados por vírgula
/// - `SNAPSHOT_MAX_CHARS`: teto dos snapshots (padrão: 5000000)
/// - `STORE_DIR`: diretório da persistência (padrão: `./.script-sections`)
/// - `ROOT_PROJECT_FALLBACK`: nome reserva (padrão: `Projeto Principal`)
/// - `ADVISOR_API_KEY`, `ADVISOR_MODEL`, `ADVISOR_BASE_URL`,
///   `ADVISOR_TIMEOUT_SECS`, `ADVISOR_TEMPERATURE`
///
/// # Exemplo
///
/// ```rust,ignore
/// // .env
/// NARRATION_MARKER=NARRACAO
/// SNAPSHOT_MAX_CHARS=100000
///
/// let config = load_app_config();
/// assert_eq!(config.narration_marker, "NARRACAO");
/// ```
pub fn load_app_config() -> AppConfig {
    load_app_config_from(|key| std::env::var(key).ok())
}

/// Mesmo que [`load_app_config`], com uma função de busca customizada.
pub fn load_app_config_from<F>(lookup: F) -> AppConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = AppConfig::default();
    let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    if let Some(root) = get("SCRIPT_ROOT") {
        log::info!("📦 SCRIPT_ROOT={}", root);
        config.script_root = Some(PathBuf::from(root));
    }

    if let Some(marker) = get("NARRATION_MARKER") {
        log::info!("📦 NARRATION_MARKER={}", marker);
        config.narration_marker = marker;
    }

    if let Some(markers) = get("TITLES_MARKERS") {
        let parsed: Vec<String> = markers
            .split(',')
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();
        if !parsed.is_empty() {
            log::info!("📦 TITLES_MARKERS={:?}", parsed);
            config.titles_markers = parsed;
        }
    }

    if let Some(max) = get("SNAPSHOT_MAX_CHARS").and_then(|v| v.parse::<usize>().ok()) {
        if max > 0 {
            config.snapshot_max_chars = max;
            log::info!("📦 SNAPSHOT_MAX_CHARS={}", max);
        }
    }

    if let Some(dir) = get("STORE_DIR") {
        log::info!("📦 STORE_DIR={}", dir);
        config.store_dir = PathBuf::from(dir);
    }

    if let Some(name) = get("ROOT_PROJECT_FALLBACK") {
        log::info!("📦 ROOT_PROJECT_FALLBACK={}", name);
        config.root_project_fallback = name;
    }

    // Advisor: a chave nunca é logada
    config.advisor.api_key = get("ADVISOR_API_KEY");

    if let Some(model) = get("ADVISOR_MODEL") {
        log::info!("📦 ADVISOR_MODEL={}", model);
        config.advisor.model = model;
    }

    if let Some(url) = get("ADVISOR_BASE_URL") {
        log::info!("📦 ADVISOR_BASE_URL={}", url);
        config.advisor.base_url = url.trim_end_matches('/').to_string();
    }

    if let Some(secs) = get("ADVISOR_TIMEOUT_SECS").and_then(|v| v.parse::<u64>().ok()) {
        if secs > 0 {
            config.advisor.timeout_secs = secs;
            log::info!("📦 ADVISOR_TIMEOUT_SECS={}", secs);
        }
    }

    if let Some(temp) = get("ADVISOR_TEMPERATURE").and_then(|v| v.parse::<f32>().ok()) {
        if (0.0..=2.0).contains(&temp) {
            config.advisor.temperature = temp;
            log::info!("📦 ADVISOR_TEMPERATURE={}", temp);
        }
    }

    if config.advisor.is_configured() {
        log::info!("🤖 Advisor: {} @ {}", config.advisor.model, config.advisor.base_url);
    } else {
        log::info!("🤖 Advisor desligado (ADVISOR_API_KEY ausente)");
    }

    config
}

/// Cria o runtime Tokio de thread única.
///
/// Todo I/O é aguardado em sequência em uma só thread lógica; o divisor
/// de seções é síncrono e roda dentro dela.
///
/// # Exemplo
///
/// ```rust,ignore
/// fn main() -> anyhow::Result<()> {
///     let runtime = create_runtime()?;
///     runtime.block_on(async { /* ... */ })
/// }
/// ```
pub fn create_runtime() -> std::io::Result<tokio::runtime::Runtime> {
    log::debug!("🚀 Criando runtime Tokio (current_thread)");
    tokio::runtime::Builder::new_current_thread().enable_all().build()
}
