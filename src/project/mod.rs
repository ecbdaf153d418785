// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PROJETOS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Agrupa arquivos escaneados por subpasta imediata da raiz e recalcula as
// seções de cada projeto (seletor → divisor).
//
//   Raiz/
//   ├── solto.txt            → projeto "Raiz" (ou nome reserva)
//   └── Projeto A/
//       └── 03_Texto_Narrado → projeto "Projeto A"
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

mod scanner;

pub use scanner::{
    FolderScanner, ScanError, ScanOutcome, ScanRegistry, ScanReport, ScanState, ScanTicket,
    ScanWarning,
};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use crate::parser::{extract_video_metadata, is_titles_file, FileSelector, SectionSplitter, VideoMetadata};
use crate::types::{Section, SourceFile};

/// Nome reserva quando não há contexto de pasta
pub const DEFAULT_ROOT_PROJECT_NAME: &str = "Projeto Principal";

/// Coleção nomeada de arquivos de uma mesma pasta.
///
/// `sections` é um cache derivado de `files` e nunca é serializado:
/// snapshots guardam só os arquivos e as seções são recalculadas ao carregar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Nome da pasta do projeto
    pub name: String,
    /// Caminho da pasta
    pub path: String,
    /// Arquivos em ordem de nome
    pub files: Vec<SourceFile>,
    /// Seções derivadas
    #[serde(skip)]
    pub sections: Vec<Section>,
}

impl Project {
    /// Cria um projeto sem arquivos
    pub fn new(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            files: Vec::new(),
            sections: Vec::new(),
        }
    }

    /// Recalcula todas as seções a partir dos arquivos
    pub fn rebuild_sections(&mut self, selector: &FileSelector, splitter: &SectionSplitter) {
        self.sections = selector.sections_for(&self.files, splitter);
    }

    /// Busca um arquivo pelo nome
    pub fn file(&self, name: &str) -> Option<&SourceFile> {
        self.files.iter().find(|f| f.name == name)
    }

    /// Busca um arquivo pelo nome (mutável)
    pub fn file_mut(&mut self, name: &str) -> Option<&mut SourceFile> {
        self.files.iter_mut().find(|f| f.name == name)
    }

    /// Total de palavras das seções
    pub fn total_words(&self) -> usize {
        self.sections.iter().map(|s| s.word_count).sum()
    }

    /// Metadados do vídeo, se o projeto tiver arquivo de títulos/descrição
    pub fn video_metadata<S: AsRef<str>>(&self, titles_markers: &[S]) -> Option<VideoMetadata> {
        self.files
            .iter()
            .find(|f| is_titles_file(&f.name, titles_markers))
            .map(|f| extract_video_metadata(&f.content))
    }
}

/// Um arquivo lido durante o scan, com o caminho relativo à raiz
#[derive(Debug, Clone)]
pub struct ScanEntry {
    /// Caminho relativo à raiz (`Projeto/arquivo.txt` ou `arquivo.txt`)
    pub relative_path: PathBuf,
    /// Arquivo lido
    pub file: SourceFile,
}

impl ScanEntry {
    /// Subpasta imediata que contém o arquivo, se houver
    pub fn containing_folder(&self) -> Option<String> {
        let components: Vec<Component> = self.relative_path.components().collect();
        if components.len() < 2 {
            return None;
        }
        match components[components.len() - 2] {
            Component::Normal(name) => Some(name.to_string_lossy().to_string()),
            _ => None,
        }
    }
}

/// Monta projetos a partir das entradas de um scan.
#[derive(Debug, Clone)]
pub struct ProjectAssembler {
    selector: FileSelector,
    splitter: SectionSplitter,
    fallback_name: String,
}

impl Default for ProjectAssembler {
    fn default() -> Self {
        Self::new(FileSelector::default(), SectionSplitter::standard(), DEFAULT_ROOT_PROJECT_NAME)
    }
}

impl ProjectAssembler {
    pub fn new(selector: FileSelector, splitter: SectionSplitter, fallback_name: &str) -> Self {
        Self {
            selector,
            splitter,
            fallback_name: fallback_name.to_string(),
        }
    }

    pub fn selector(&self) -> &FileSelector {
        &self.selector
    }

    pub fn splitter(&self) -> &SectionSplitter {
        &self.splitter
    }

    /// Recalcula as seções de um projeto com o seletor e o divisor do montador
    pub fn rebuild(&self, project: &mut Project) {
        project.rebuild_sections(&self.selector, &self.splitter);
    }

    /// Nome do projeto para arquivos soltos na raiz.
    ///
    /// Nunca coincide com o nome de uma subpasta.
    fn root_project_name(&self, root_name: &str, folders: &BTreeMap<String, Vec<SourceFile>>) -> String {
        let mut name = if root_name.trim().is_empty() {
            self.fallback_name.clone()
        } else {
            root_name.to_string()
        };
        while folders.contains_key(&name) {
            name.push_str(" (raiz)");
        }
        name
    }

    /// Agrupa as entradas por pasta e calcula as seções de cada projeto.
    ///
    /// A ordem dos arquivos dentro de um projeto segue a ordem das entradas.
    pub fn assemble(&self, root: &Path, entries: Vec<ScanEntry>) -> BTreeMap<String, Project> {
        let root_name = root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let mut folders: BTreeMap<String, Vec<SourceFile>> = BTreeMap::new();
        let mut loose: Vec<SourceFile> = Vec::new();
        for entry in entries {
            match entry.containing_folder() {
                Some(folder) => folders.entry(folder).or_default().push(entry.file),
                None => loose.push(entry.file),
            }
        }

        let mut projects: BTreeMap<String, Project> = BTreeMap::new();
        if !loose.is_empty() {
            let name = self.root_project_name(&root_name, &folders);
            let mut project = Project::new(&name, &root.display().to_string());
            project.files = loose;
            projects.insert(name, project);
        }
        for (folder, files) in folders {
            let mut project = Project::new(&folder, &root.join(&folder).display().to_string());
            project.files = files;
            projects.insert(folder, project);
        }

        for project in projects.values_mut() {
            self.rebuild(project);
            log::debug!(
                "📁 Projeto '{}': {} arquivos, {} seções",
                project.name,
                project.files.len(),
                project.sections.len()
            );
        }

        projects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::DEFAULT_TITLES_MARKERS;

    fn entry(relative: &str, content: &str) -> ScanEntry {
        let path = PathBuf::from(relative);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        ScanEntry {
            file: SourceFile::new(&name, relative, content),
            relative_path: path,
        }
    }

    #[test]
    fn test_groups_by_containing_folder() {
        let entries = vec![
            entry("solto.txt", "ATO I - Solto\nx"),
            entry("Alpha/03_Texto_Narrado.txt", "ATO I - A\ny"),
            entry("Alpha/notas.txt", "ATO I - Notas\nz"),
            entry("Beta/roteiro.md", "CENA 1 - B\nw"),
        ];
        let projects = ProjectAssembler::default().assemble(Path::new("/scripts/Canal"), entries);

        let names: Vec<&str> = projects.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Alpha", "Beta", "Canal"]);

        let alpha = &projects["Alpha"];
        assert_eq!(alpha.files.len(), 2);
        assert_eq!(alpha.sections.len(), 1);
        assert_eq!(alpha.sections[0].source_file, "03_Texto_Narrado.txt");
        assert_eq!(alpha.path, Path::new("/scripts/Canal").join("Alpha").display().to_string());

        assert_eq!(projects["Canal"].files[0].name, "solto.txt");
    }

    #[test]
    fn test_root_files_without_folder_context_use_fallback() {
        let projects = ProjectAssembler::default().assemble(Path::new(""), vec![entry("a.txt", "")]);
        assert!(projects.contains_key(DEFAULT_ROOT_PROJECT_NAME));
    }

    #[test]
    fn test_root_named_like_subfolder_stays_separate() {
        let entries = vec![
            entry("solto.txt", "ATO I - Solto\nx"),
            entry("Demo/03_Texto_Narrado.txt", "ATO I - Narrado\ny"),
        ];
        let projects = ProjectAssembler::default().assemble(Path::new("/tmp/Demo"), entries);

        assert_eq!(projects.len(), 2);

        let folder = &projects["Demo"];
        assert_eq!(folder.path, Path::new("/tmp/Demo").join("Demo").display().to_string());
        assert_eq!(folder.files.len(), 1);
        assert_eq!(folder.sections[0].title, "ATO I - Narrado");

        let root = &projects["Demo (raiz)"];
        assert_eq!(root.name, "Demo (raiz)");
        assert_eq!(root.path, "/tmp/Demo");
        assert_eq!(root.files[0].name, "solto.txt");
        assert_eq!(root.sections[0].title, "ATO I - Solto");
    }

    #[test]
    fn test_assemble_is_idempotent() {
        let make = || {
            vec![
                entry("P/03_Texto_Narrado.txt", "HOOK (0:00)\nisca\nATO I - A Queda\ntexto"),
                entry("P/b.txt", "nada"),
            ]
        };
        let assembler = ProjectAssembler::default();
        let first = assembler.assemble(Path::new("/r"), make());
        let second = assembler.assemble(Path::new("/r"), make());

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first["P"].sections).unwrap(),
            serde_json::to_string(&second["P"].sections).unwrap()
        );
    }

    #[test]
    fn test_removing_narration_recomputes_from_all_files() {
        let assembler = ProjectAssembler::default();
        let mut projects = assembler.assemble(
            Path::new("/r"),
            vec![
                entry("P/03_Texto_Narrado.txt", "ATO I - Narrado\nx"),
                entry("P/a.txt", "CENA 1 - A\ny"),
                entry("P/b.txt", "CENA 2 - B\nz"),
            ],
        );

        let project = projects.get_mut("P").unwrap();
        assert_eq!(project.sections.len(), 1);

        project.files.retain(|f| f.name != "03_Texto_Narrado.txt");
        assembler.rebuild(project);

        let titles: Vec<&str> = project.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["CENA 1 - A", "CENA 2 - B"]);
    }

    #[test]
    fn test_snapshot_skips_sections() {
        let mut project = Project::new("P", "/r/P");
        project.files.push(SourceFile::new("a.txt", "P/a.txt", "ATO I - A\nx"));
        ProjectAssembler::default().rebuild(&mut project);
        assert_eq!(project.sections.len(), 1);

        let json = serde_json::to_string(&project).unwrap();
        let restored: Project = serde_json::from_str(&json).unwrap();
        assert!(restored.sections.is_empty());
        assert_eq!(restored.files, project.files);
    }

    #[test]
    fn test_video_metadata() {
        let mut project = Project::new("P", "/r/P");
        assert!(project.video_metadata(DEFAULT_TITLES_MARKERS).is_none());

        project
            .files
            .push(SourceFile::new("05_Titulo_Descricao.txt", "P/05_Titulo_Descricao.txt", "OPÇÃO 1:\nTítulo"));
        let meta = project.video_metadata(DEFAULT_TITLES_MARKERS).unwrap();
        assert_eq!(meta.titles[0].as_deref(), Some("Título"));
    }
}
