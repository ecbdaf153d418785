// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SCANNER DE PASTAS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Lê a raiz e suas subpastas imediatas pelo provider e entrega as entradas ao
// montador. Os projetos só são publicados depois do scan inteiro.
//
// Cada raiz tem um estado `Idle | Scanning`: um segundo scan da mesma raiz
// enquanto o primeiro está em andamento é rejeitado.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use super::{Project, ProjectAssembler, ScanEntry};
use crate::provider::{is_accepted_file, EntryKind, FolderProvider, ProviderError};
use crate::types::SourceFile;
use crate::utils::{Stopwatch, TimedAction};

/// Erros de scan
#[derive(Debug, Error)]
pub enum ScanError {
    /// Já existe um scan em andamento para a mesma raiz
    #[error("scan já em andamento para {0}")]
    AlreadyScanning(String),

    /// A raiz não pôde ser listada
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Estado de scan de uma raiz
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanState {
    /// Nenhum scan em andamento
    Idle,
    /// Scan em andamento
    Scanning {
        /// Início do scan
        started_at: DateTime<Utc>,
    },
}

impl ScanState {
    /// Verifica se há scan em andamento
    pub fn is_scanning(&self) -> bool {
        matches!(self, ScanState::Scanning { .. })
    }

    /// Verifica se uma transição é válida
    pub fn can_transition_to(&self, target: &ScanState) -> bool {
        matches!(
            (self, target),
            (ScanState::Idle, ScanState::Scanning { .. }) | (ScanState::Scanning { .. }, ScanState::Idle)
        )
    }
}

/// Registro de scans em andamento, por raiz.
#[derive(Debug, Clone, Default)]
pub struct ScanRegistry {
    states: Arc<Mutex<HashMap<PathBuf, ScanState>>>,
}

impl ScanRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Estado atual de uma raiz
    pub fn state(&self, root: &Path) -> ScanState {
        let states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        states.get(root).cloned().unwrap_or(ScanState::Idle)
    }

    /// Marca a raiz como em scan. O estado volta a `Idle` quando o ticket é descartado.
    pub fn try_begin(&self, root: &Path) -> Result<ScanTicket, ScanError> {
        let mut states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        let current = states.get(root).cloned().unwrap_or(ScanState::Idle);
        let next = ScanState::Scanning {
            started_at: Utc::now(),
        };

        if !current.can_transition_to(&next) {
            return Err(ScanError::AlreadyScanning(root.display().to_string()));
        }

        states.insert(root.to_path_buf(), next);
        Ok(ScanTicket {
            root: root.to_path_buf(),
            states: Arc::clone(&self.states),
        })
    }
}

/// Posse do estado `Scanning` de uma raiz
#[derive(Debug)]
pub struct ScanTicket {
    root: PathBuf,
    states: Arc<Mutex<HashMap<PathBuf, ScanState>>>,
}

impl Drop for ScanTicket {
    fn drop(&mut self) {
        let mut states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        states.insert(self.root.clone(), ScanState::Idle);
    }
}

/// Arquivo ou pasta que não pôde ser lido durante o scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanWarning {
    pub path: String,
    pub message: String,
}

/// Resumo de um scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub projects: usize,
    pub files: usize,
    pub sections: usize,
    pub skipped: usize,
    pub warnings: Vec<ScanWarning>,
    pub elapsed_ms: u128,
}

impl ScanReport {
    /// Formata um resumo curto
    pub fn summary(&self) -> String {
        format!(
            "{} projetos, {} arquivos, {} seções ({} avisos, {}ms)",
            self.projects,
            self.files,
            self.sections,
            self.warnings.len(),
            self.elapsed_ms
        )
    }
}

/// Resultado completo de um scan
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub projects: BTreeMap<String, Project>,
    pub report: ScanReport,
}

/// Escaneia uma raiz e monta os projetos.
pub struct FolderScanner {
    provider: Arc<dyn FolderProvider>,
    assembler: ProjectAssembler,
    registry: ScanRegistry,
}

impl FolderScanner {
    pub fn new(provider: Arc<dyn FolderProvider>, assembler: ProjectAssembler) -> Self {
        Self {
            provider,
            assembler,
            registry: ScanRegistry::new(),
        }
    }

    pub fn provider(&self) -> &Arc<dyn FolderProvider> {
        &self.provider
    }

    pub fn assembler(&self) -> &ProjectAssembler {
        &self.assembler
    }

    pub fn registry(&self) -> &ScanRegistry {
        &self.registry
    }

    /// Escaneia a raiz e suas subpastas imediatas.
    ///
    /// Só falha se a raiz não puder ser listada ou já estiver em scan;
    /// arquivos e subpastas ilegíveis viram avisos no relatório.
    pub async fn scan(&self, root: &Path) -> Result<ScanOutcome, ScanError> {
        let _ticket = self.registry.try_begin(root)?;
        let watch = Stopwatch::start(TimedAction::Scan, root.display().to_string());
        log::info!("🔍 Escaneando {} (provider: {})", root.display(), self.provider.name());

        let mut report = ScanReport::default();
        let mut entries = Vec::new();

        for entry in self.provider.list_entries(root).await? {
            match entry.kind {
                EntryKind::File => {
                    self.read_entry(root, Path::new(&entry.name), &mut entries, &mut report)
                        .await;
                }
                EntryKind::Folder => {
                    let folder = root.join(&entry.name);
                    let children = match self.provider.list_entries(&folder).await {
                        Ok(children) => children,
                        Err(e) => {
                            log::warn!("⚠️  Subpasta ignorada {}: {}", folder.display(), e);
                            report.warnings.push(ScanWarning {
                                path: folder.display().to_string(),
                                message: e.to_string(),
                            });
                            continue;
                        }
                    };

                    for child in children.iter().filter(|c| c.kind == EntryKind::File) {
                        let relative = Path::new(&entry.name).join(&child.name);
                        self.read_entry(root, &relative, &mut entries, &mut report).await;
                    }
                }
            }
        }

        report.files = entries.len();
        let projects = self.assembler.assemble(root, entries);
        report.projects = projects.len();
        report.sections = projects.values().map(|p| p.sections.len()).sum();
        report.elapsed_ms = watch.finish().elapsed_ms;

        log::info!("✅ Scan concluído: {}", report.summary());
        Ok(ScanOutcome { projects, report })
    }

    async fn read_entry(
        &self,
        root: &Path,
        relative: &Path,
        entries: &mut Vec<ScanEntry>,
        report: &mut ScanReport,
    ) {
        let name = relative
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        if !is_accepted_file(&name) {
            log::debug!("Ignorando arquivo não aceito: {}", relative.display());
            report.skipped += 1;
            return;
        }

        let full_path = root.join(relative);
        match self.provider.read_text(&full_path).await {
            Ok(content) => {
                let relative_str = relative.display().to_string();
                let file = SourceFile {
                    name,
                    content: content.content,
                    size: content.size,
                    modified: content.modified,
                    relative_path: relative_str,
                };
                entries.push(ScanEntry {
                    relative_path: relative.to_path_buf(),
                    file,
                });
            }
            Err(e) => {
                log::warn!("⚠️  Arquivo ilegível {}: {}", full_path.display(), e);
                report.warnings.push(ScanWarning {
                    path: full_path.display().to_string(),
                    message: e.to_string(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MemoryFolderProvider;
    use std::time::Duration;

    fn scanner(provider: MemoryFolderProvider) -> FolderScanner {
        FolderScanner::new(Arc::new(provider), ProjectAssembler::default())
    }

    #[test]
    fn test_scan_state_transitions() {
        let scanning = ScanState::Scanning { started_at: Utc::now() };
        assert!(ScanState::Idle.can_transition_to(&scanning));
        assert!(scanning.can_transition_to(&ScanState::Idle));
        assert!(!scanning.can_transition_to(&scanning.clone()));
        assert!(!ScanState::Idle.can_transition_to(&ScanState::Idle));
    }

    #[test]
    fn test_ticket_resets_state_on_drop() {
        let registry = ScanRegistry::new();
        let root = Path::new("Raiz");

        let ticket = registry.try_begin(root).unwrap();
        assert!(registry.state(root).is_scanning());
        assert!(matches!(registry.try_begin(root), Err(ScanError::AlreadyScanning(_))));
        assert!(registry.try_begin(Path::new("Outra")).is_ok());

        drop(ticket);
        assert_eq!(registry.state(root), ScanState::Idle);
        assert!(registry.try_begin(root).is_ok());
    }

    #[tokio::test]
    async fn test_scan_builds_projects() {
        let provider = MemoryFolderProvider::with_files([
            ("Raiz/Demo/03_Texto_Narrado.txt", "ATO I - A Queda\nTexto um.\n\nATO II - A Redenção\nTexto dois."),
            ("Raiz/Demo/capa.png", "binário"),
            ("Raiz/Outro/notas.md", "## Nota\ncorpo"),
            ("Raiz/solto.txt", "sem cabeçalho"),
        ]);

        let outcome = scanner(provider).scan(Path::new("Raiz")).await.unwrap();

        assert_eq!(outcome.report.projects, 3);
        assert_eq!(outcome.report.files, 3);
        assert_eq!(outcome.report.sections, 3);
        assert_eq!(outcome.report.skipped, 1);
        assert!(outcome.report.warnings.is_empty());

        let demo = &outcome.projects["Demo"];
        assert_eq!(demo.sections.len(), 2);
        assert_eq!(demo.files[0].relative_path, Path::new("Demo").join("03_Texto_Narrado.txt").display().to_string());
        assert!(outcome.projects.contains_key("Raiz"));
    }

    #[tokio::test]
    async fn test_unreadable_file_does_not_abort_scan() {
        let provider = MemoryFolderProvider::with_files([
            ("Raiz/A/bom.txt", "CENA 1 - Ok\ntexto"),
            ("Raiz/A/ruim.txt", "CENA 2 - Ruim\ntexto"),
            ("Raiz/B/outro.txt", "CENA 1 - B\ntexto"),
        ]);
        provider.deny("Raiz/A/ruim.txt").await;

        let outcome = scanner(provider).scan(Path::new("Raiz")).await.unwrap();

        assert_eq!(outcome.report.warnings.len(), 1);
        assert!(outcome.report.warnings[0].path.contains("ruim.txt"));
        assert_eq!(outcome.projects["A"].files.len(), 1);
        assert_eq!(outcome.projects["B"].sections.len(), 1);
    }

    #[tokio::test]
    async fn test_denied_root_fails() {
        let provider = MemoryFolderProvider::with_files([("Raiz/a.txt", "x")]);
        provider.deny("Raiz").await;

        let err = scanner(provider).scan(Path::new("Raiz")).await.unwrap_err();
        assert!(matches!(err, ScanError::Provider(ProviderError::PermissionDenied(_))));
    }

    #[tokio::test]
    async fn test_concurrent_scan_of_same_root_is_rejected() {
        let provider = MemoryFolderProvider::with_files([("Raiz/P/a.txt", "ATO I - A\nx")])
            .with_read_delay(Duration::from_millis(50));
        let scanner = scanner(provider);
        let root = Path::new("Raiz");

        let (first, second) = futures::join!(scanner.scan(root), scanner.scan(root));

        assert!(first.is_ok());
        assert!(matches!(second, Err(ScanError::AlreadyScanning(_))));
        assert_eq!(scanner.registry().state(root), ScanState::Idle);

        assert!(scanner.scan(root).await.is_ok());
    }
}
