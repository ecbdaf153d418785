// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TIPOS COMPARTILHADOS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tipo de seção reconhecido pela tabela de cabeçalhos.
///
/// Os nomes serializados são exatamente as tags usadas pelo roteiro
/// (inclusive com acentos), para que snapshots antigos continuem legíveis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SectionType {
    /// `OPENING - ...`
    #[serde(rename = "OPENING")]
    Opening,
    /// `HOOK (0:00) ...`
    #[serde(rename = "HOOK")]
    Hook,
    /// `ATO I - ...` / `ACT ONE - ...`
    #[serde(rename = "ATO")]
    Ato,
    /// `CHAPTER ONE - ...`
    #[serde(rename = "CHAPTER")]
    Chapter,
    /// `CAPÍTULO 3 - ...`
    #[serde(rename = "CAPÍTULO")]
    Capitulo,
    /// `PART 2 - ...`
    #[serde(rename = "PART")]
    Part,
    /// `PARTE 2 - ...`
    #[serde(rename = "PARTE")]
    Parte,
    /// `CONCLUSÃO` / `CONCLUSION`
    #[serde(rename = "CONCLUSÃO")]
    Conclusao,
    /// `SCENE 4 - ...`
    #[serde(rename = "SCENE")]
    Scene,
    /// `CENA 4 - ...`
    #[serde(rename = "CENA")]
    Cena,
    /// Cabeçalho markdown `## ...` ou `### ...`
    #[serde(rename = "HEADING")]
    Heading,
    /// Marcador injetado após aceitar sugestões do advisor: `[SECTION n] ...`
    #[serde(rename = "SECTION")]
    Marker,
}

impl SectionType {
    /// Tag textual do tipo (igual à forma serializada).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Opening => "OPENING",
            Self::Hook => "HOOK",
            Self::Ato => "ATO",
            Self::Chapter => "CHAPTER",
            Self::Capitulo => "CAPÍTULO",
            Self::Part => "PART",
            Self::Parte => "PARTE",
            Self::Conclusao => "CONCLUSÃO",
            Self::Scene => "SCENE",
            Self::Cena => "CENA",
            Self::Heading => "HEADING",
            Self::Marker => "SECTION",
        }
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Um trecho lógico de narração detectado dentro de um arquivo.
///
/// Seções são sempre recalculadas a partir do conteúdo do arquivo;
/// nunca são alteradas no lugar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    /// Linha do cabeçalho, já sem espaços nas bordas
    pub title: String,
    /// Tipo da regra que reconheceu o cabeçalho
    #[serde(rename = "type")]
    pub section_type: SectionType,
    /// Texto capturado depois do número/separador, sem marcadores decorativos
    #[serde(default)]
    pub label: Option<String>,
    /// Nome do arquivo de origem
    pub source_file: String,
    /// Linha do cabeçalho (1-based)
    pub line_number: usize,
    /// Corpo da seção até o próximo cabeçalho, sem espaços nas bordas
    pub body: String,
    /// Palavras do corpo
    pub word_count: usize,
    /// Caracteres do corpo (incluindo quebras de linha internas)
    pub char_count: usize,
    /// Posição da seção dentro do arquivo (0-based)
    pub ordinal: usize,
}

impl Section {
    /// Chave usada pelo histórico de cópias.
    pub fn key(&self, project: &str) -> SectionKey {
        SectionKey::new(project, &self.title)
    }

    /// Cabeçalho seguido do corpo, como aparece no arquivo.
    pub fn full_text(&self) -> String {
        if self.body.is_empty() {
            self.title.clone()
        } else {
            format!("{}\n{}", self.title, self.body)
        }
    }

    /// Verifica se a seção não tem corpo
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Identidade de uma seção para o histórico: (projeto, título exato).
///
/// Editar o título no arquivo gera uma seção "nova" para o histórico.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SectionKey {
    /// Nome do projeto
    pub project: String,
    /// Título exato da seção
    pub title: String,
}

impl SectionKey {
    /// Cria uma nova chave
    pub fn new(project: &str, title: &str) -> Self {
        Self {
            project: project.to_string(),
            title: title.to_string(),
        }
    }
}

/// Um documento de texto lido de uma pasta de projeto.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceFile {
    /// Nome do arquivo (sem diretório)
    pub name: String,
    /// Conteúdo decodificado como UTF-8
    pub content: String,
    /// Tamanho em bytes
    pub size: u64,
    /// Última modificação, quando o provider informa
    #[serde(default)]
    pub modified: Option<DateTime<Utc>>,
    /// Caminho relativo à raiz escaneada (ex: `Projeto/03_Texto_Narrado.txt`)
    pub relative_path: String,
}

impl SourceFile {
    /// Cria um arquivo em memória; o tamanho é derivado do conteúdo.
    pub fn new(name: &str, relative_path: &str, content: &str) -> Self {
        Self {
            name: name.to_string(),
            content: content.to_string(),
            size: content.len() as u64,
            modified: None,
            relative_path: relative_path.to_string(),
        }
    }

    /// Substitui o conteúdo inteiro do arquivo
    pub fn replace_content(&mut self, content: String) {
        self.size = content.len() as u64;
        self.content = content;
        self.modified = Some(Utc::now());
    }

    /// Número de linhas do conteúdo
    pub fn line_count(&self) -> usize {
        self.content.lines().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_type_serializes_with_accents() {
        let json = serde_json::to_string(&SectionType::Conclusao).unwrap();
        assert_eq!(json, "\"CONCLUSÃO\"");

        let parsed: SectionType = serde_json::from_str("\"CAPÍTULO\"").unwrap();
        assert_eq!(parsed, SectionType::Capitulo);
        assert_eq!(SectionType::Marker.to_string(), "SECTION");
    }

    #[test]
    fn test_section_full_text() {
        let section = Section {
            title: "ATO I - A Queda".into(),
            section_type: SectionType::Ato,
            label: Some("A Queda".into()),
            source_file: "roteiro.txt".into(),
            line_number: 1,
            body: "Texto um.".into(),
            word_count: 2,
            char_count: 9,
            ordinal: 0,
        };

        assert_eq!(section.full_text(), "ATO I - A Queda\nTexto um.");
        assert_eq!(section.key("Demo"), SectionKey::new("Demo", "ATO I - A Queda"));
    }

    #[test]
    fn test_source_file_replace_content() {
        let mut file = SourceFile::new("a.txt", "Demo/a.txt", "um\ndois");
        assert_eq!(file.line_count(), 2);

        file.replace_content("três".into());
        assert_eq!(file.size, "três".len() as u64);
        assert!(file.modified.is_some());
    }
}
