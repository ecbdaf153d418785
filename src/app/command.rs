// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// COMANDOS, RESULTADOS E NOTIFICAÇÕES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::advisor::LineRange;
use crate::parser::VideoMetadata;
use crate::project::ScanReport;
use crate::usage::UsageRecord;

/// Referência a uma seção: projeto + posição na lista de seções do projeto
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SectionRef {
    pub project: String,
    pub index: usize,
}

impl SectionRef {
    pub fn new(project: &str, index: usize) -> Self {
        Self {
            project: project.to_string(),
            index,
        }
    }
}

/// Ação do usuário, independente de qualquer interface
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Escaneia uma pasta raiz e substitui todos os projetos
    ScanFolder { path: PathBuf },
    /// Escaneia de novo a raiz salva
    Rescan,
    /// Troca o projeto atual
    SelectProject { name: String },
    /// Copia o corpo de uma seção e registra o uso
    CopySection(SectionRef),
    /// Copia o conteúdo bruto de um arquivo (sem registro de uso)
    CopyFile { project: String, file: String },
    /// Grava o corpo de uma seção em `<título>.txt` dentro da pasta dada
    ExportSection { section: SectionRef, dir: PathBuf },
    /// Traduz o corpo de uma seção (o resultado não entra nos projetos)
    TranslateSection { section: SectionRef, language: String },
    /// Pede ao advisor intervalos para um arquivo
    SuggestBoundaries { project: String, file: String },
    /// Aplica intervalos confirmados: injeta marcadores e recalcula seções
    AcceptSuggestions {
        project: String,
        file: String,
        ranges: Vec<LineRange>,
    },
    /// Extrai os metadados do arquivo de títulos/descrição
    ShowMetadata { project: String },
    /// Limpa o histórico de cópias de um projeto
    ClearProjectHistory { project: String },
    /// Limpa todo o histórico de cópias
    ClearAllHistory,
    /// Remove a pasta raiz do workspace (handle, projetos e snapshot)
    RemoveFolder,
    /// Salva o snapshot do workspace
    SaveWorkspace,
}

impl Command {
    /// Nome curto do comando (para logs)
    pub fn name(&self) -> &'static str {
        match self {
            Command::ScanFolder { .. } => "ScanFolder",
            Command::Rescan => "Rescan",
            Command::SelectProject { .. } => "SelectProject",
            Command::CopySection(_) => "CopySection",
            Command::CopyFile { .. } => "CopyFile",
            Command::ExportSection { .. } => "ExportSection",
            Command::TranslateSection { .. } => "TranslateSection",
            Command::SuggestBoundaries { .. } => "SuggestBoundaries",
            Command::AcceptSuggestions { .. } => "AcceptSuggestions",
            Command::ShowMetadata { .. } => "ShowMetadata",
            Command::ClearProjectHistory { .. } => "ClearProjectHistory",
            Command::ClearAllHistory => "ClearAllHistory",
            Command::RemoveFolder => "RemoveFolder",
            Command::SaveWorkspace => "SaveWorkspace",
        }
    }
}

/// Resultado de um comando bem-sucedido
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Scanned(ScanReport),
    ProjectSelected(String),
    Copied {
        chars: usize,
        /// Registro de uso atualizado (só para seções)
        usage: Option<UsageRecord>,
    },
    Exported(PathBuf),
    Translated(String),
    Suggestions(Vec<LineRange>),
    SuggestionsApplied {
        injected: usize,
        skipped: usize,
        sections: usize,
    },
    Metadata(Option<VideoMetadata>),
    HistoryCleared { removed: usize },
    FolderRemoved,
    WorkspaceSaved { chars: usize },
}

/// Nível de uma notificação
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

/// Mensagem transitória para o usuário
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            at: Utc::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, message)
    }
}
