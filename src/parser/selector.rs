// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SELETOR DE ARQUIVOS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Decide quais arquivos de um projeto alimentam o divisor:
// - existe arquivo de narração (nome contém o marcador) => só ele (o primeiro)
// - caso contrário => todos, na ordem do projeto
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use super::splitter::SectionSplitter;
use crate::types::{Section, SourceFile};

/// Marcador padrão do arquivo de narração
pub const DEFAULT_NARRATION_MARKER: &str = "03_Texto_Narrado";

/// Arquivos escolhidos para a divisão em seções
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection<'a> {
    /// Arquivo de narração encontrado: fonte única
    Narration(&'a SourceFile),
    /// Sem narração: todos os arquivos
    AllFiles(&'a [SourceFile]),
}

impl<'a> Selection<'a> {
    /// Arquivos selecionados, na ordem em que serão divididos
    pub fn files(&self) -> Vec<&'a SourceFile> {
        match self {
            Selection::Narration(file) => vec![*file],
            Selection::AllFiles(files) => files.iter().collect(),
        }
    }

    /// Verifica se a seleção veio do arquivo de narração
    pub fn is_narration(&self) -> bool {
        matches!(self, Selection::Narration(_))
    }
}

/// Aplica a regra de prioridade do arquivo de narração.
#[derive(Debug, Clone)]
pub struct FileSelector {
    narration_marker: String,
}

impl Default for FileSelector {
    fn default() -> Self {
        Self::new(DEFAULT_NARRATION_MARKER)
    }
}

impl FileSelector {
    /// Cria um seletor com um marcador específico
    pub fn new(narration_marker: &str) -> Self {
        Self {
            narration_marker: narration_marker.to_string(),
        }
    }

    /// Marcador usado para identificar a narração
    pub fn narration_marker(&self) -> &str {
        &self.narration_marker
    }

    /// Verifica se o nome é de um arquivo de narração
    pub fn is_narration(&self, file_name: &str) -> bool {
        !self.narration_marker.is_empty() && file_name.contains(&self.narration_marker)
    }

    /// Escolhe os arquivos que alimentam o divisor
    pub fn select<'a>(&self, files: &'a [SourceFile]) -> Selection<'a> {
        match files.iter().find(|f| self.is_narration(&f.name)) {
            Some(file) => Selection::Narration(file),
            None => Selection::AllFiles(files),
        }
    }

    /// Seleciona e divide: seções do projeto, em ordem de arquivo.
    pub fn sections_for(&self, files: &[SourceFile], splitter: &SectionSplitter) -> Vec<Section> {
        let selection = self.select(files);
        if let Selection::Narration(file) = selection {
            log::debug!("📜 Usando arquivo de narração: {}", file.name);
        }

        selection
            .files()
            .into_iter()
            .flat_map(|file| splitter.split(&file.content, &file.name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, content: &str) -> SourceFile {
        SourceFile::new(name, &format!("Demo/{}", name), content)
    }

    #[test]
    fn test_narration_file_wins() {
        let files = vec![
            file("01_Notas.txt", "ATO I - Notas\nnão usar"),
            file("03_Texto_Narrado.txt", "ATO I - A Queda\nTexto um."),
            file("04_Broll.txt", "CENA 1 - Rua\nimagens"),
        ];
        let selector = FileSelector::default();

        assert!(selector.select(&files).is_narration());

        let sections = selector.sections_for(&files, &SectionSplitter::standard());
        assert_eq!(sections.len(), 1);
        assert!(sections.iter().all(|s| s.source_file == "03_Texto_Narrado.txt"));
    }

    #[test]
    fn test_first_narration_file_when_several() {
        let files = vec![
            file("03_Texto_Narrado_v2.txt", "ATO I - Versão dois\nx"),
            file("03_Texto_Narrado.txt", "ATO I - Versão um\ny"),
        ];

        match FileSelector::default().select(&files) {
            Selection::Narration(f) => assert_eq!(f.name, "03_Texto_Narrado_v2.txt"),
            other => panic!("seleção inesperada: {:?}", other),
        }
    }

    #[test]
    fn test_all_files_without_narration() {
        let files = vec![
            file("a.txt", "ATO I - Um\nx\nATO II - Dois\ny"),
            file("b.txt", "sem cabeçalhos"),
            file("c.txt", "CENA 1 - Três\nz"),
        ];
        let sections = FileSelector::default().sections_for(&files, &SectionSplitter::standard());

        let sources: Vec<&str> = sections.iter().map(|s| s.source_file.as_str()).collect();
        assert_eq!(sources, vec!["a.txt", "a.txt", "c.txt"]);
        assert_eq!(sections[2].ordinal, 0);
    }

    #[test]
    fn test_custom_marker() {
        let selector = FileSelector::new("NARRACAO");
        assert!(selector.is_narration("final_NARRACAO.md"));
        assert!(!selector.is_narration("03_Texto_Narrado.txt"));
    }

    #[test]
    fn test_empty_project() {
        let files: Vec<SourceFile> = vec![];
        assert_eq!(FileSelector::default().select(&files), Selection::AllFiles(&[]));
    }
}
