// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// DIVISOR DE SEÇÕES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Máquina de estados de dois estados (fora de seção / dentro de seção) que
// percorre as linhas de um arquivo e emite a lista ordenada de seções.
//
// - Cada linha é aparada e testada contra a tabela de padrões.
// - Linhas antes do primeiro cabeçalho são descartadas.
// - O corpo acumula as linhas originais (sem aparar) e só é aparado ao fechar.
//
// É síncrono, puro e total: qualquer sequência de linhas produz um resultado.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::sync::Arc;

use super::patterns::{HeadingMatch, PatternTable};
use crate::types::Section;
use crate::utils::text_stats;

/// Seção aberta aguardando o próximo cabeçalho ou o fim do arquivo
#[derive(Debug, Clone)]
struct OpenSection {
    title: String,
    heading: HeadingMatch,
    line_number: usize,
    body_lines: Vec<String>,
}

impl OpenSection {
    fn close(self, source_file: &str, ordinal: usize) -> Section {
        let joined = self.body_lines.join("\n");
        let body = joined.trim().to_string();
        let (word_count, char_count) = text_stats(&body);

        Section {
            title: self.title,
            section_type: self.heading.section_type,
            label: self.heading.label,
            source_file: source_file.to_string(),
            line_number: self.line_number,
            body,
            word_count,
            char_count,
            ordinal,
        }
    }
}

/// Estado do divisor
#[derive(Debug, Clone)]
enum SplitState {
    /// Nenhum cabeçalho visto ainda
    OutsideSection,
    /// Um cabeçalho abriu uma seção
    InsideSection(OpenSection),
}

/// Divide o texto de um arquivo em seções usando uma tabela de padrões.
#[derive(Debug, Clone)]
pub struct SectionSplitter {
    table: Arc<PatternTable>,
}

impl Default for SectionSplitter {
    fn default() -> Self {
        Self::standard()
    }
}

impl SectionSplitter {
    /// Cria um divisor com uma tabela específica
    pub fn new(table: Arc<PatternTable>) -> Self {
        Self { table }
    }

    /// Divisor com a tabela padrão
    pub fn standard() -> Self {
        Self::new(PatternTable::standard())
    }

    /// Tabela usada pelo divisor
    pub fn table(&self) -> &PatternTable {
        &self.table
    }

    /// Divide o conteúdo de um arquivo (aceita `\n` e `\r\n`).
    pub fn split(&self, content: &str, file_name: &str) -> Vec<Section> {
        self.split_lines(content.lines(), file_name)
    }

    /// Divide uma sequência de linhas já separadas.
    pub fn split_lines<'a, I>(&self, lines: I, file_name: &str) -> Vec<Section>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut sections = Vec::new();
        let mut state = SplitState::OutsideSection;

        for (index, line) in lines.into_iter().enumerate() {
            let line_number = index + 1;
            let trimmed = line.trim();

            match self.table.match_line(trimmed) {
                Some(heading) => {
                    if let SplitState::InsideSection(open) = state {
                        let ordinal = sections.len();
                        sections.push(open.close(file_name, ordinal));
                    }
                    state = SplitState::InsideSection(OpenSection {
                        title: trimmed.to_string(),
                        heading,
                        line_number,
                        body_lines: Vec::new(),
                    });
                }
                None => {
                    if let SplitState::InsideSection(open) = &mut state {
                        open.body_lines.push(line.to_string());
                    }
                }
            }
        }

        if let SplitState::InsideSection(open) = state {
            let ordinal = sections.len();
            sections.push(open.close(file_name, ordinal));
        }

        log::debug!("✂️  {}: {} seções", file_name, sections.len());
        sections
    }
}

/// Atalho: divide com a tabela padrão
pub fn split_sections(content: &str, file_name: &str) -> Vec<Section> {
    SectionSplitter::standard().split(content, file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::patterns::HeadingRule;
    use crate::types::SectionType;

    /// Linhas não vazias (aparadas) do texto a partir do primeiro cabeçalho
    fn normalized_from_first_heading(content: &str) -> Vec<String> {
        let table = PatternTable::standard();
        content
            .lines()
            .skip_while(|l| !table.is_heading(l))
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect()
    }

    fn normalized_sections(sections: &[Section]) -> Vec<String> {
        sections
            .iter()
            .flat_map(|s| {
                std::iter::once(s.title.clone()).chain(
                    s.body
                        .lines()
                        .map(|l| l.trim().to_string())
                        .collect::<Vec<_>>(),
                )
            })
            .filter(|l| !l.is_empty())
            .collect()
    }

    #[test]
    fn test_two_acts() {
        let lines = [
            "ATO I - A Queda",
            "Texto um.",
            "",
            "ATO II - A Redenção",
            "Texto dois.",
        ];
        let sections = SectionSplitter::standard().split_lines(lines, "roteiro.txt");

        assert_eq!(sections.len(), 2);

        assert_eq!(sections[0].title, "ATO I - A Queda");
        assert_eq!(sections[0].section_type, SectionType::Ato);
        assert_eq!(sections[0].body, "Texto um.");
        assert_eq!(sections[0].word_count, 2);
        assert_eq!(sections[0].line_number, 1);
        assert_eq!(sections[0].ordinal, 0);
        assert_eq!(sections[0].label.as_deref(), Some("A Queda"));

        assert_eq!(sections[1].title, "ATO II - A Redenção");
        assert_eq!(sections[1].section_type, SectionType::Ato);
        assert_eq!(sections[1].body, "Texto dois.");
        assert_eq!(sections[1].word_count, 2);
        assert_eq!(sections[1].line_number, 4);
        assert_eq!(sections[1].ordinal, 1);
        assert_eq!(sections[1].source_file, "roteiro.txt");
    }

    #[test]
    fn test_no_headings_yields_nothing() {
        let content = "Era uma vez.\n".repeat(500);
        assert!(split_sections(&content, "notas.txt").is_empty());
        assert!(split_sections("", "vazio.txt").is_empty());
    }

    #[test]
    fn test_content_before_first_heading_is_dropped() {
        let content = "Introdução solta\nmais texto\nOPENING - Início\nCorpo.";
        let sections = split_sections(content, "a.txt");

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].body, "Corpo.");
        assert_eq!(sections[0].line_number, 3);
        assert!(!sections.iter().any(|s| s.body.contains("Introdução")));
    }

    #[test]
    fn test_consecutive_headings_yield_empty_body() {
        let content = "HOOK (0:00)\nATO I - A Queda\nTexto.";
        let sections = split_sections(content, "a.txt");

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].section_type, SectionType::Hook);
        assert_eq!(sections[0].body, "");
        assert_eq!(sections[0].word_count, 0);
        assert_eq!(sections[0].char_count, 0);
        assert!(sections[0].is_empty());
    }

    #[test]
    fn test_whitespace_only_body_counts_zero() {
        let sections = split_sections("CENA 1 - Porta\n   \n\t\nCENA 2 - Janela", "a.txt");
        assert_eq!(sections[0].body, "");
        assert_eq!(sections[0].word_count, 0);
    }

    #[test]
    fn test_body_keeps_internal_lines_and_counts_chars() {
        let content = "PARTE 1 - Início\n  linha um  \n\n  linha dois\nPARTE 2 - Fim";
        let sections = split_sections(content, "a.txt");

        assert_eq!(sections[0].body, "linha um  \n\n  linha dois");
        assert_eq!(sections[0].word_count, 4);
        assert_eq!(sections[0].char_count, sections[0].body.chars().count());
    }

    #[test]
    fn test_crlf_line_endings() {
        let content = "CHAPTER ONE - Start\r\nBody text here.\r\nCHAPTER TWO - End\r\nDone.\r\n";
        let sections = split_sections(content, "a.txt");

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].body, "Body text here.");
        assert_eq!(sections[1].body, "Done.");
    }

    #[test]
    fn test_mixed_vocabularies_case_insensitive() {
        let content = "opening\nabertura\nhook (0:15) O segredo\nisca\ncapítulo 2 - Meio\nmeio\nconclusion\nfim";
        let types: Vec<SectionType> = split_sections(content, "a.txt")
            .into_iter()
            .map(|s| s.section_type)
            .collect();

        assert_eq!(
            types,
            vec![
                SectionType::Opening,
                SectionType::Hook,
                SectionType::Capitulo,
                SectionType::Conclusao
            ]
        );
    }

    #[test]
    fn test_coverage_from_first_heading() {
        let content = "preâmbulo\n\nATO I - A Queda\n  Texto um.\n\nsegunda linha\nCENA 2 - A Porta\n\n## Nota\nfinal\n\n";
        let sections = split_sections(content, "a.txt");

        assert_eq!(
            normalized_sections(&sections),
            normalized_from_first_heading(content)
        );
    }

    #[test]
    fn test_idempotent() {
        let content = "ATO I - A Queda\nTexto um.\n\nATO II - A Redenção\nTexto dois.";
        let splitter = SectionSplitter::standard();

        let first = splitter.split(content, "a.txt");
        let second = splitter.split(content, "a.txt");

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_custom_table() {
        let rule = HeadingRule::new("bloco", r"^BLOCO\s+(?P<label>\d+)$", SectionType::Heading).unwrap();
        let splitter = SectionSplitter::new(Arc::new(PatternTable::with_rules(1, vec![rule])));

        let sections = splitter.split("BLOCO 1\num\nATO I - A Queda\nBLOCO 2\ndois", "a.txt");

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].body, "um\nATO I - A Queda");
        assert_eq!(sections[1].label.as_deref(), Some("2"));
    }
}
