// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// METADADOS DO VÍDEO (arquivo de títulos/descrição)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Formato esperado:
//
//   OPÇÃO 1:
//   Primeiro título
//   ...
//   DESCRIÇÃO PARA YOUTUBE:
//
//   Texto da descrição
//   ━━━━━━━━━━━━
//   IDEIA PARA THUMBNAIL:
//
//   Texto da thumbnail (até o fim do arquivo)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Número máximo de opções de título
pub const MAX_TITLE_OPTIONS: usize = 5;

/// Marcadores padrão do arquivo de títulos/descrição
pub const DEFAULT_TITLES_MARKERS: &[&str] = &["05_Titulo_Descricao", "05_Titulo_Descrição"];

static TITLE_OPTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^OP[ÇC][ÃA]O\s+(?P<number>\d+)\s*:\s*(?P<rest>.*)$").expect("regex de opção inválida")
});

static DESCRIPTION_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^DESCRI[ÇC][ÃA]O\s+PARA\s+YOUTUBE\s*:\s*(?P<rest>.*)$")
        .expect("regex de descrição inválida")
});

static THUMBNAIL_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^IDEIA\s+PARA\s+THUMBNAIL\s*:\s*(?P<rest>.*)$").expect("regex de thumbnail inválida")
});

/// Dados estruturados do arquivo de títulos/descrição.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    /// Opções de título indexadas pelo número da opção (1 => posição 0)
    pub titles: Vec<Option<String>>,
    /// Bloco de descrição
    pub description: Option<String>,
    /// Bloco de ideia para thumbnail
    pub thumbnail: Option<String>,
}

impl VideoMetadata {
    /// Títulos presentes, na ordem das opções
    pub fn title_options(&self) -> impl Iterator<Item = (usize, &str)> {
        self.titles
            .iter()
            .enumerate()
            .filter_map(|(i, t)| t.as_deref().map(|t| (i + 1, t)))
    }

    /// Retorna true se nada foi extraído
    pub fn is_empty(&self) -> bool {
        self.titles.iter().all(Option::is_none) && self.description.is_none() && self.thumbnail.is_none()
    }
}

/// Verifica se o nome do arquivo é o de títulos/descrição
pub fn is_titles_file<S: AsRef<str>>(file_name: &str, markers: &[S]) -> bool {
    markers
        .iter()
        .any(|m| !m.as_ref().is_empty() && file_name.contains(m.as_ref()))
}

fn is_divider(line: &str) -> bool {
    line.starts_with('━')
}

fn finish_block(lines: &[&str]) -> Option<String> {
    let text = lines.join("\n");
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Bloco em coleta
enum Block {
    None,
    Description,
    Thumbnail,
}

/// Extrai títulos, descrição e ideia de thumbnail do conteúdo.
///
/// Linhas fora do formato são ignoradas; o extrator nunca falha.
pub fn extract_video_metadata(content: &str) -> VideoMetadata {
    let lines: Vec<&str> = content.lines().collect();
    let mut metadata = VideoMetadata {
        titles: vec![None; MAX_TITLE_OPTIONS],
        ..Default::default()
    };

    let mut block = Block::None;
    let mut description: Vec<&str> = Vec::new();
    let mut thumbnail: Vec<&str> = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        let trimmed = lines[i].trim();

        if let Some(caps) = THUMBNAIL_LABEL.captures(trimmed) {
            block = Block::Thumbnail;
            thumbnail.push(caps.name("rest").map_or("", |m| m.as_str()));
            i += 1;
            continue;
        }

        if matches!(block, Block::Thumbnail) {
            thumbnail.push(lines[i]);
            i += 1;
            continue;
        }

        if let Some(caps) = DESCRIPTION_LABEL.captures(trimmed) {
            block = Block::Description;
            description.push(caps.name("rest").map_or("", |m| m.as_str()));
            i += 1;
            continue;
        }

        if let Some(caps) = TITLE_OPTION.captures(trimmed) {
            block = Block::None;
            let number: usize = caps["number"].parse().unwrap_or(0);
            let rest = caps.name("rest").map_or("", |m| m.as_str().trim());

            let title = if !rest.is_empty() {
                Some(rest.to_string())
            } else {
                lines
                    .get(i + 1)
                    .map(|l| l.trim())
                    .filter(|l| !l.is_empty() && !is_divider(l))
                    .map(str::to_string)
            };

            if (1..=MAX_TITLE_OPTIONS).contains(&number) {
                if let Some(title) = title {
                    metadata.titles[number - 1] = Some(title);
                }
            }
            i += 1;
            continue;
        }

        match block {
            Block::Description if is_divider(trimmed) => block = Block::None,
            Block::Description => description.push(lines[i]),
            _ => {}
        }
        i += 1;
    }

    metadata.description = finish_block(&description);
    metadata.thumbnail = finish_block(&thumbnail);
    metadata
}
