// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ESTADO DA APLICAÇÃO
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Objeto explícito com ciclo de vida:
//
//   AppState::new → init (restaura snapshot, reescaneia pasta salva)
//                 → dispatch(Command)* → dispose (salva tudo)
//
// Todo erro de comando vira uma `Notification` e é devolvido ao chamador;
// nenhum deles encerra o processo.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

mod command;

pub use command::{Command, Notification, NotificationLevel, Outcome, SectionRef};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::advisor::{inject_markers, validate_ranges, AdvisorError, BoundaryAdvisor, LineRange, OpenAiAdvisor};
use crate::clipboard::{ClipboardError, ClipboardSink};
use crate::config::AppConfig;
use crate::parser::{FileSelector, SectionSplitter};
use crate::project::{FolderScanner, Project, ProjectAssembler, ScanError};
use crate::provider::{FolderProvider, LocalFolderProvider, ProviderError};
use crate::store::{KeyValueStore, LocalStore, SnapshotStore, StoreError};
use crate::types::{Section, SourceFile};
use crate::usage::{UsageRecord, UsageTracker};
use crate::utils::{DurationLog, Stopwatch, TimedAction, Timing};

/// Chave do snapshot do workspace
pub const WORKSPACE_SNAPSHOT_KEY: &str = "workspace";

/// Chave do handle da pasta raiz
pub const ROOT_HANDLE_KEY: &str = "root_folder";

/// Erros de comando
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Clipboard(#[from] ClipboardError),

    #[error(transparent)]
    Advisor(#[from] AdvisorError),

    #[error("projeto não encontrado: {0}")]
    ProjectNotFound(String),

    #[error("seção {index} não existe no projeto {project}")]
    SectionNotFound { project: String, index: usize },

    #[error("arquivo {file} não existe no projeto {project}")]
    FileNotFound { project: String, file: String },

    #[error("nenhuma pasta no workspace")]
    NoFolder,

    #[error("advisor indisponível (defina ADVISOR_API_KEY)")]
    AdvisorUnavailable,
}

/// Snapshot persistido do workspace
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSnapshot {
    #[serde(default)]
    pub root: Option<String>,
    pub projects: BTreeMap<String, Project>,
    #[serde(default)]
    pub current_project: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Colaboradores externos usados pelo estado
pub struct AppServices {
    pub provider: Arc<dyn FolderProvider>,
    pub store: Arc<dyn KeyValueStore>,
    pub clipboard: Arc<dyn ClipboardSink>,
    pub advisor: Option<Arc<dyn BoundaryAdvisor>>,
}

impl AppServices {
    /// Serviços reais: disco local, store em `store_dir`, clipboard e advisor conforme config
    pub fn from_config(config: &AppConfig) -> Self {
        let advisor: Option<Arc<dyn BoundaryAdvisor>> = if config.advisor.is_configured() {
            match OpenAiAdvisor::new(config.advisor.clone()) {
                Ok(advisor) => Some(Arc::new(advisor)),
                Err(e) => {
                    log::warn!("⚠️  Advisor desligado: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Self {
            provider: Arc::new(LocalFolderProvider::new()),
            store: Arc::new(LocalStore::new(config.store_dir.clone())),
            clipboard: default_clipboard(),
            advisor,
        }
    }
}

#[cfg(feature = "clipboard")]
fn default_clipboard() -> Arc<dyn ClipboardSink> {
    Arc::new(crate::clipboard::SystemClipboard)
}

#[cfg(not(feature = "clipboard"))]
fn default_clipboard() -> Arc<dyn ClipboardSink> {
    Arc::new(crate::clipboard::MemoryClipboard::new())
}

/// Nome de arquivo seguro a partir de um título
fn export_file_name(title: &str) -> String {
    let name: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}.txt", name)
}

/// Estado da aplicação
pub struct AppState {
    config: AppConfig,
    scanner: FolderScanner,
    snapshots: SnapshotStore,
    clipboard: Arc<dyn ClipboardSink>,
    advisor: Option<Arc<dyn BoundaryAdvisor>>,
    projects: BTreeMap<String, Project>,
    current_project: Option<String>,
    root: Option<PathBuf>,
    usage: UsageTracker,
    notifications: Vec<Notification>,
    timing: DurationLog,
}

impl AppState {
    /// Cria o estado sem tocar em I/O; chame `init` em seguida
    pub fn new(config: AppConfig, services: AppServices) -> Self {
        let assembler = ProjectAssembler::new(
            FileSelector::new(&config.narration_marker),
            SectionSplitter::standard(),
            &config.root_project_fallback,
        );
        let scanner = FolderScanner::new(services.provider, assembler);
        let snapshots = SnapshotStore::new(services.store, config.snapshot_max_chars);

        Self {
            config,
            scanner,
            snapshots,
            clipboard: services.clipboard,
            advisor: services.advisor,
            projects: BTreeMap::new(),
            current_project: None,
            root: None,
            usage: UsageTracker::new(),
            notifications: Vec::new(),
            timing: DurationLog::new(),
        }
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // CICLO DE VIDA
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Restaura histórico e snapshot; reescaneia a pasta salva se ainda acessível.
    ///
    /// Falhas viram notificações. Uma pasta inacessível continua salva até
    /// `RemoveFolder`.
    pub async fn init(&mut self) {
        match UsageTracker::load(&self.snapshots).await {
            Ok(usage) => self.usage = usage,
            Err(e) => self.notify(Notification::warning(format!("Histórico não carregado: {}", e))),
        }

        match self.snapshots.load::<WorkspaceSnapshot>(WORKSPACE_SNAPSHOT_KEY).await {
            Ok(Some(snapshot)) => self.restore(snapshot),
            Ok(None) => {}
            Err(e) => self.notify(Notification::warning(format!("Snapshot não carregado: {}", e))),
        }

        let handle = match self.snapshots.get_handle(ROOT_HANDLE_KEY).await {
            Ok(handle) => handle,
            Err(e) => {
                self.notify(Notification::warning(format!("Pasta salva ilegível: {}", e)));
                None
            }
        };

        if let Some(path) = handle {
            let path = PathBuf::from(path);
            match self.scan_folder(&path).await {
                Ok(_) => {}
                Err(AppError::Scan(ScanError::Provider(e))) => {
                    self.root = Some(path.clone());
                    self.notify(Notification::warning(format!(
                        "Pasta {} inacessível ({}). Ela continua salva até ser removida.",
                        path.display(),
                        e
                    )));
                }
                Err(e) => self.notify(Notification::error(e.to_string())),
            }
        }

        log::info!("🟢 Workspace pronto: {} projetos", self.projects.len());
    }

    /// Salva snapshot e histórico e encerra o estado.
    ///
    /// Retorna as notificações pendentes.
    pub async fn dispose(mut self) -> Vec<Notification> {
        if !self.projects.is_empty() || self.root.is_some() {
            self.save_workspace_quietly().await;
        }
        if let Err(e) = self.usage.persist(&self.snapshots).await {
            self.notify(Notification::error(format!("Histórico não salvo: {}", e)));
        }
        log::info!("🔴 Workspace encerrado ({})", self.timing);
        self.notifications
    }

    fn restore(&mut self, snapshot: WorkspaceSnapshot) {
        let mut projects = snapshot.projects;
        for project in projects.values_mut() {
            self.scanner.assembler().rebuild(project);
        }
        self.projects = projects;
        self.root = snapshot.root.map(PathBuf::from);
        self.current_project = snapshot
            .current_project
            .filter(|name| self.projects.contains_key(name));
        log::info!(
            "♻️  Snapshot de {} restaurado ({} projetos)",
            snapshot.timestamp,
            self.projects.len()
        );
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // ACESSO
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn projects(&self) -> &BTreeMap<String, Project> {
        &self.projects
    }

    pub fn project(&self, name: &str) -> Option<&Project> {
        self.projects.get(name)
    }

    pub fn current_project(&self) -> Option<&Project> {
        self.current_project.as_deref().and_then(|n| self.projects.get(n))
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn usage(&self) -> &UsageTracker {
        &self.usage
    }

    /// Registro de uso de uma seção
    pub fn usage_of(&self, project: &str, section: &Section) -> Option<&UsageRecord> {
        self.usage.get(&section.key(project))
    }

    pub fn timing(&self) -> &DurationLog {
        &self.timing
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Retira as notificações pendentes
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    fn notify(&mut self, notification: Notification) {
        match notification.level {
            NotificationLevel::Info => log::info!("{}", notification.message),
            NotificationLevel::Warning => log::warn!("⚠️  {}", notification.message),
            NotificationLevel::Error => log::error!("❌ {}", notification.message),
        }
        self.notifications.push(notification);
    }

    fn project_ref(&self, name: &str) -> Result<&Project, AppError> {
        self.projects
            .get(name)
            .ok_or_else(|| AppError::ProjectNotFound(name.to_string()))
    }

    fn section(&self, section: &SectionRef) -> Result<&Section, AppError> {
        self.project_ref(&section.project)?
            .sections
            .get(section.index)
            .ok_or_else(|| AppError::SectionNotFound {
                project: section.project.clone(),
                index: section.index,
            })
    }

    fn file(&self, project: &str, file: &str) -> Result<&SourceFile, AppError> {
        self.project_ref(project)?
            .file(file)
            .ok_or_else(|| AppError::FileNotFound {
                project: project.to_string(),
                file: file.to_string(),
            })
    }

    fn advisor(&self) -> Result<Arc<dyn BoundaryAdvisor>, AppError> {
        self.advisor.clone().ok_or(AppError::AdvisorUnavailable)
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // DISPATCH
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Executa um comando.
    pub async fn dispatch(&mut self, command: Command) -> Result<Outcome, AppError> {
        log::debug!("▶️  {}", command.name());

        let result = match command {
            Command::ScanFolder { path } => self.scan_folder(&path).await,
            Command::Rescan => match self.root.clone() {
                Some(root) => self.scan_folder(&root).await,
                None => Err(AppError::NoFolder),
            },
            Command::SelectProject { name } => self.select_project(&name),
            Command::CopySection(section) => self.copy_section(&section).await,
            Command::CopyFile { project, file } => self.copy_file(&project, &file).await,
            Command::ExportSection { section, dir } => self.export_section(&section, &dir).await,
            Command::TranslateSection { section, language } => {
                self.translate_section(&section, &language).await
            }
            Command::SuggestBoundaries { project, file } => self.suggest_boundaries(&project, &file).await,
            Command::AcceptSuggestions { project, file, ranges } => {
                self.accept_suggestions(&project, &file, &ranges).await
            }
            Command::ShowMetadata { project } => self.show_metadata(&project),
            Command::ClearProjectHistory { project } => self.clear_project_history(&project).await,
            Command::ClearAllHistory => self.clear_all_history().await,
            Command::RemoveFolder => self.remove_folder().await,
            Command::SaveWorkspace => self
                .save_workspace()
                .await
                .map(|chars| Outcome::WorkspaceSaved { chars }),
        };

        if let Err(e) = &result {
            self.notify(Notification::error(e.to_string()));
        }
        result
    }

    async fn scan_folder(&mut self, path: &Path) -> Result<Outcome, AppError> {
        let outcome = self.scanner.scan(path).await?;
        self.timing.record(Timing {
            action: TimedAction::Scan,
            elapsed_ms: outcome.report.elapsed_ms,
        });

        self.projects = outcome.projects;
        self.root = Some(path.to_path_buf());
        let keep_current = self
            .current_project
            .as_ref()
            .map(|n| self.projects.contains_key(n))
            .unwrap_or(false);
        if !keep_current {
            self.current_project = self.projects.keys().next().cloned();
        }

        if let Err(e) = self
            .snapshots
            .put_handle(ROOT_HANDLE_KEY, &path.display().to_string())
            .await
        {
            self.notify(Notification::warning(format!("Pasta não salva: {}", e)));
        }

        for warning in &outcome.report.warnings {
            log::warn!("⚠️  {}: {}", warning.path, warning.message);
        }
        if !outcome.report.warnings.is_empty() {
            let message = format!("{} arquivos não puderam ser lidos", outcome.report.warnings.len());
            self.notify(Notification::warning(message));
        }

        self.save_workspace_quietly().await;
        self.notify(Notification::info(format!("📂 {}", outcome.report.summary())));
        Ok(Outcome::Scanned(outcome.report))
    }

    fn select_project(&mut self, name: &str) -> Result<Outcome, AppError> {
        self.project_ref(name)?;
        self.current_project = Some(name.to_string());
        Ok(Outcome::ProjectSelected(name.to_string()))
    }

    async fn copy_section(&mut self, section: &SectionRef) -> Result<Outcome, AppError> {
        let (text, key) = {
            let found = self.section(section)?;
            (found.body.clone(), found.key(&section.project))
        };

        self.clipboard.write(&text).await?;
        let record = self.usage.record(&key).clone();

        if let Err(e) = self.usage.persist(&self.snapshots).await {
            self.notify(Notification::warning(format!("Histórico não salvo: {}", e)));
        }
        self.notify(Notification::info(format!("✅ Texto copiado ({}x)", record.count)));

        Ok(Outcome::Copied {
            chars: text.chars().count(),
            usage: Some(record),
        })
    }

    async fn copy_file(&mut self, project: &str, file: &str) -> Result<Outcome, AppError> {
        let content = self.file(project, file)?.content.clone();
        self.clipboard.write(&content).await?;
        self.notify(Notification::info(format!("✅ Arquivo \"{}\" copiado!", file)));

        Ok(Outcome::Copied {
            chars: content.chars().count(),
            usage: None,
        })
    }

    async fn export_section(&mut self, section: &SectionRef, dir: &Path) -> Result<Outcome, AppError> {
        let (path, body) = {
            let found = self.section(section)?;
            (dir.join(export_file_name(&found.title)), found.body.clone())
        };

        self.scanner.provider().write_text(&path, &body).await?;
        self.notify(Notification::info(format!("Arquivo salvo: {}", path.display())));
        Ok(Outcome::Exported(path))
    }

    async fn translate_section(&mut self, section: &SectionRef, language: &str) -> Result<Outcome, AppError> {
        let advisor = self.advisor()?;
        let body = self.section(section)?.body.clone();

        let subject = format!("{}#{}", section.project, section.index);
        let watch = Stopwatch::start(TimedAction::Translate, subject);
        let translated = advisor.translate(&body, language).await?;
        self.timing.record(watch.finish());

        Ok(Outcome::Translated(translated))
    }

    async fn suggest_boundaries(&mut self, project: &str, file: &str) -> Result<Outcome, AppError> {
        let advisor = self.advisor()?;
        let (content, line_count) = {
            let found = self.file(project, file)?;
            (found.content.clone(), found.line_count())
        };

        let watch = Stopwatch::start(TimedAction::Suggest, file);
        let ranges = advisor.suggest_boundaries(&content).await?;
        self.timing.record(watch.finish());

        let ranges = validate_ranges(&ranges, line_count)?;
        self.notify(Notification::info(format!("🤖 {} seções sugeridas", ranges.len())));
        Ok(Outcome::Suggestions(ranges))
    }

    async fn accept_suggestions(
        &mut self,
        project: &str,
        file: &str,
        ranges: &[LineRange],
    ) -> Result<Outcome, AppError> {
        let root = self.root.clone().ok_or(AppError::NoFolder)?;
        let (content, relative_path) = {
            let found = self.file(project, file)?;
            (found.content.clone(), found.relative_path.clone())
        };

        let injection = inject_markers(&content, ranges, self.scanner.assembler().splitter().table())?;

        // Grava antes de alterar a memória: em caso de falha nada muda
        self.scanner
            .provider()
            .write_text(&root.join(&relative_path), &injection.content)
            .await?;

        let sections = {
            let assembler = self.scanner.assembler();
            let target = self
                .projects
                .get_mut(project)
                .ok_or_else(|| AppError::ProjectNotFound(project.to_string()))?;
            if let Some(source) = target.file_mut(file) {
                source.replace_content(injection.content);
            }
            assembler.rebuild(target);
            target.sections.len()
        };

        self.save_workspace_quietly().await;
        self.notify(Notification::info(format!(
            "🏷️  {} marcadores aplicados em {}",
            injection.injected, file
        )));

        Ok(Outcome::SuggestionsApplied {
            injected: injection.injected,
            skipped: injection.skipped,
            sections,
        })
    }

    fn show_metadata(&mut self, project: &str) -> Result<Outcome, AppError> {
        let metadata = self.project_ref(project)?.video_metadata(&self.config.titles_markers);
        Ok(Outcome::Metadata(metadata))
    }

    async fn clear_project_history(&mut self, project: &str) -> Result<Outcome, AppError> {
        let removed = self.usage.clear_project(project);
        self.usage.persist(&self.snapshots).await?;
        self.notify(Notification::info(format!("Histórico de {} limpo", project)));
        Ok(Outcome::HistoryCleared { removed })
    }

    async fn clear_all_history(&mut self) -> Result<Outcome, AppError> {
        let removed = self.usage.clear_all();
        self.usage.persist(&self.snapshots).await?;
        self.notify(Notification::info("Todo o histórico foi limpo"));
        Ok(Outcome::HistoryCleared { removed })
    }

    async fn remove_folder(&mut self) -> Result<Outcome, AppError> {
        self.snapshots.delete_handle(ROOT_HANDLE_KEY).await?;
        self.snapshots.remove(WORKSPACE_SNAPSHOT_KEY).await?;

        let removed = self.root.take();
        self.projects.clear();
        self.current_project = None;

        if let Some(root) = removed {
            self.notify(Notification::info(format!("Pasta {} removida", root.display())));
        }
        Ok(Outcome::FolderRemoved)
    }

    fn snapshot(&self) -> WorkspaceSnapshot {
        WorkspaceSnapshot {
            root: self.root.as_ref().map(|r| r.display().to_string()),
            projects: self.projects.clone(),
            current_project: self.current_project.clone(),
            timestamp: Utc::now(),
        }
    }

    /// Salva o snapshot; acima do teto nada é gravado
    async fn save_workspace(&mut self) -> Result<usize, AppError> {
        let snapshot = self.snapshot();
        Ok(self.snapshots.save(WORKSPACE_SNAPSHOT_KEY, &snapshot).await?)
    }

    /// Salvamento automático: falhas viram notificação
    async fn save_workspace_quietly(&mut self) {
        if let Err(e) = self.save_workspace().await {
            let message = match e {
                AppError::Store(StoreError::CapacityExceeded { .. }) => {
                    format!("⚠️ Dados muito grandes, snapshot não salvo: {}", e)
                }
                other => format!("Erro ao salvar dados localmente: {}", other),
            };
            self.notify(Notification::warning(message));
        }
    }
}
