// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PROVIDER DE PASTAS E ARQUIVOS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Colaborador externo que lista pastas e lê arquivos como texto.
//
// Implementações:
// - `LocalFolderProvider`: sistema de arquivos via tokio::fs
// - `MemoryFolderProvider`: árvore em memória (testes, benchmarks)
//
// O conteúdo nunca é inspecionado: toda extensão aceita é lida como UTF-8
// (bytes inválidos viram U+FFFD).
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;

/// Extensões aceitas para inclusão em um projeto
pub const ACCEPTED_EXTENSIONS: &[&str] = &[
    "txt", "md", "markdown", "rtf", "doc", "docx", "pdf", "srt", "vtt", "sub", "fountain", "fdx",
];

/// Verifica se o nome tem uma extensão aceita (case-insensitive)
pub fn is_accepted_file(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| ACCEPTED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Erros do provider
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// Acesso negado ou revogado
    #[error("permissão negada: {0}")]
    PermissionDenied(String),

    /// Caminho inexistente
    #[error("não encontrado: {0}")]
    NotFound(String),

    /// Outro erro de I/O
    #[error("erro de leitura em {path}: {message}")]
    Io { path: String, message: String },
}

impl ProviderError {
    fn from_io(path: &Path, err: std::io::Error) -> Self {
        let path = path.display().to_string();
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            _ => Self::Io {
                path,
                message: err.to_string(),
            },
        }
    }

    /// Verifica se é erro de permissão
    pub fn is_permission(&self) -> bool {
        matches!(self, Self::PermissionDenied(_))
    }
}

/// Tipo de entrada de uma pasta
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EntryKind {
    /// Arquivo
    File,
    /// Subpasta
    Folder,
}

/// Uma entrada listada em uma pasta
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderEntry {
    pub kind: EntryKind,
    pub name: String,
}

impl FolderEntry {
    pub fn file(name: &str) -> Self {
        Self {
            kind: EntryKind::File,
            name: name.to_string(),
        }
    }

    pub fn folder(name: &str) -> Self {
        Self {
            kind: EntryKind::Folder,
            name: name.to_string(),
        }
    }
}

/// Conteúdo lido de um arquivo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    /// Texto decodificado
    pub content: String,
    /// Tamanho em bytes
    pub size: u64,
    /// Última modificação
    pub modified: Option<DateTime<Utc>>,
}

/// Trait do provider de pastas.
///
/// Caminhos são `Path` absolutos (local) ou relativos à raiz virtual (memória).
#[async_trait]
pub trait FolderProvider: Send + Sync {
    /// Nome do provider (para logs)
    fn name(&self) -> &'static str;

    /// Lista as entradas de uma pasta, ordenadas por nome
    async fn list_entries(&self, folder: &Path) -> Result<Vec<FolderEntry>, ProviderError>;

    /// Lê um arquivo como texto
    async fn read_text(&self, file: &Path) -> Result<FileContent, ProviderError>;

    /// Sobrescreve um arquivo inteiro
    async fn write_text(&self, file: &Path, content: &str) -> Result<(), ProviderError>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PROVIDER: Sistema de arquivos local
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Provider sobre o sistema de arquivos local
#[derive(Debug, Clone, Default)]
pub struct LocalFolderProvider;

impl LocalFolderProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FolderProvider for LocalFolderProvider {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn list_entries(&self, folder: &Path) -> Result<Vec<FolderEntry>, ProviderError> {
        let mut reader = tokio::fs::read_dir(folder)
            .await
            .map_err(|e| ProviderError::from_io(folder, e))?;

        let mut entries = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|e| ProviderError::from_io(folder, e))?
        {
            let file_type = match entry.file_type().await {
                Ok(t) => t,
                Err(e) => {
                    log::warn!("⚠️  Ignorando entrada {:?}: {}", entry.path(), e);
                    continue;
                }
            };
            let name = entry.file_name().to_string_lossy().to_string();

            if file_type.is_dir() {
                entries.push(FolderEntry::folder(&name));
            } else if file_type.is_file() {
                entries.push(FolderEntry::file(&name));
            }
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn read_text(&self, file: &Path) -> Result<FileContent, ProviderError> {
        let bytes = tokio::fs::read(file)
            .await
            .map_err(|e| ProviderError::from_io(file, e))?;
        let modified = tokio::fs::metadata(file)
            .await
            .ok()
            .and_then(|m| m.modified().ok())
            .map(DateTime::<Utc>::from);

        Ok(FileContent {
            size: bytes.len() as u64,
            content: String::from_utf8_lossy(&bytes).into_owned(),
            modified,
        })
    }

    async fn write_text(&self, file: &Path, content: &str) -> Result<(), ProviderError> {
        tokio::fs::write(file, content)
            .await
            .map_err(|e| ProviderError::from_io(file, e))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PROVIDER: Em memória
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Árvore de arquivos em memória, indexada por caminho (`Raiz/Projeto/arquivo.txt`).
///
/// Pastas existem implicitamente a partir dos caminhos dos arquivos.
#[derive(Debug, Default)]
pub struct MemoryFolderProvider {
    files: RwLock<BTreeMap<PathBuf, String>>,
    denied: RwLock<HashSet<PathBuf>>,
    read_delay: Option<Duration>,
}

impl MemoryFolderProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cria o provider a partir de pares (caminho, conteúdo)
    pub fn with_files<'a, I>(files: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let map = files
            .into_iter()
            .map(|(path, content)| (PathBuf::from(path), content.to_string()))
            .collect();
        Self {
            files: RwLock::new(map),
            ..Default::default()
        }
    }

    /// Atraso artificial em cada leitura (simula I/O lento)
    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = Some(delay);
        self
    }

    /// Adiciona ou substitui um arquivo
    pub async fn insert(&self, path: &str, content: &str) {
        self.files
            .write()
            .await
            .insert(PathBuf::from(path), content.to_string());
    }

    /// Remove um arquivo
    pub async fn remove(&self, path: &str) -> bool {
        self.files.write().await.remove(Path::new(path)).is_some()
    }

    /// Faz leituras e listagens deste caminho falharem com permissão negada
    pub async fn deny(&self, path: &str) {
        self.denied.write().await.insert(PathBuf::from(path));
    }

    /// Conteúdo atual de um arquivo
    pub async fn content(&self, path: &str) -> Option<String> {
        self.files.read().await.get(Path::new(path)).cloned()
    }

    async fn check_access(&self, path: &Path) -> Result<(), ProviderError> {
        if self.denied.read().await.contains(path) {
            return Err(ProviderError::PermissionDenied(path.display().to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl FolderProvider for MemoryFolderProvider {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn list_entries(&self, folder: &Path) -> Result<Vec<FolderEntry>, ProviderError> {
        self.check_access(folder).await?;

        let files = self.files.read().await;
        let mut entries: Vec<FolderEntry> = Vec::new();
        let mut found = false;

        for path in files.keys() {
            let Ok(rest) = path.strip_prefix(folder) else {
                continue;
            };
            let mut components = rest.components();
            let Some(first) = components.next() else {
                continue;
            };
            found = true;

            let name = first.as_os_str().to_string_lossy().to_string();
            let entry = if components.next().is_some() {
                FolderEntry::folder(&name)
            } else {
                FolderEntry::file(&name)
            };
            if !entries.contains(&entry) {
                entries.push(entry);
            }
        }

        if !found {
            return Err(ProviderError::NotFound(folder.display().to_string()));
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn read_text(&self, file: &Path) -> Result<FileContent, ProviderError> {
        if let Some(delay) = self.read_delay {
            tokio::time::sleep(delay).await;
        }
        self.check_access(file).await?;

        let files = self.files.read().await;
        let content = files
            .get(file)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(file.display().to_string()))?;

        Ok(FileContent {
            size: content.len() as u64,
            content,
            modified: None,
        })
    }

    async fn write_text(&self, file: &Path, content: &str) -> Result<(), ProviderError> {
        self.check_access(file).await?;
        self.files
            .write()
            .await
            .insert(file.to_path_buf(), content.to_string());
        Ok(())
    }
}
