// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// INJEÇÃO DE MARCADORES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Transforma intervalos aceitos em linhas `[SECTION n] título` inseridas antes
// de cada intervalo. O título é a primeira linha não vazia do intervalo.
// Intervalos que já começam com um cabeçalho reconhecido ficam como estão.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use super::{validate_ranges, AdvisorError, LineRange};
use crate::parser::PatternTable;
use crate::utils::first_non_blank_line;

/// Prefixo do título de intervalos sem nenhuma linha não vazia
pub const FALLBACK_TITLE_PREFIX: &str = "Seção";

/// Resultado da injeção
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerInjection {
    /// Conteúdo novo do arquivo
    pub content: String,
    /// Marcadores inseridos
    pub injected: usize,
    /// Intervalos que já começavam com cabeçalho
    pub skipped: usize,
}

/// Terminador de linha do arquivo: CRLF se ele aparece no conteúdo, senão LF
fn line_ending(content: &str) -> &'static str {
    if content.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

/// Insere marcadores antes de cada intervalo.
///
/// Os intervalos são validados antes de qualquer alteração; em caso de erro
/// nada é produzido.
pub fn inject_markers(
    content: &str,
    ranges: &[LineRange],
    table: &PatternTable,
) -> Result<MarkerInjection, AdvisorError> {
    let lines: Vec<&str> = content.lines().collect();
    let ranges = validate_ranges(ranges, lines.len())?;

    let mut markers: Vec<Option<String>> = vec![None; lines.len()];
    let mut skipped = 0;
    let mut injected = 0;

    // Numeração contínua: só intervalos que recebem marcador contam
    for range in &ranges {
        let slice = &lines[range.start_line..=range.end_line];

        let title = match first_non_blank_line(slice.iter().copied()) {
            Some(first) if table.is_heading(first) => {
                skipped += 1;
                continue;
            }
            Some(first) => first.to_string(),
            None => format!("{} {}", FALLBACK_TITLE_PREFIX, injected + 1),
        };
        injected += 1;
        markers[range.start_line] = Some(format!("[SECTION {}] {}", injected, title));
    }

    let eol = line_ending(content);
    let mut output: Vec<&str> = Vec::with_capacity(lines.len() + injected);
    for (line, marker) in lines.iter().zip(markers.iter()) {
        if let Some(marker) = marker {
            output.push(marker);
        }
        output.push(line);
    }

    let mut new_content = output.join(eol);
    if content.ends_with('\n') {
        new_content.push_str(eol);
    }

    log::info!("🏷️  {} marcadores inseridos, {} intervalos já tinham cabeçalho", injected, skipped);
    Ok(MarkerInjection {
        content: new_content,
        injected,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::split_sections;
    use crate::types::SectionType;

    const TEXT: &str = "Era uma vez um reino.\nO rei caiu.\n\nAnos depois\no filho voltou.\n";

    #[test]
    fn test_injects_markers_and_splitter_sees_them() {
        let table = PatternTable::standard();
        let ranges = [LineRange::new(0, 2), LineRange::new(3, 4)];

        let result = inject_markers(TEXT, &ranges, &table).unwrap();
        assert_eq!(result.injected, 2);
        assert_eq!(result.skipped, 0);
        assert_eq!(
            result.content,
            "[SECTION 1] Era uma vez um reino.\nEra uma vez um reino.\nO rei caiu.\n\n[SECTION 2] Anos depois\nAnos depois\no filho voltou.\n"
        );

        let sections = split_sections(&result.content, "a.txt");
        assert_eq!(sections.len(), 2);
        assert!(sections.iter().all(|s| s.section_type == SectionType::Marker));
        assert_eq!(sections[0].label.as_deref(), Some("Era uma vez um reino."));
        assert_eq!(sections[1].body, "Anos depois\no filho voltou.");
    }

    #[test]
    fn test_title_comes_from_first_non_blank_line() {
        let table = PatternTable::standard();
        let content = "\n   \n  Começo real  \nresto";
        let result = inject_markers(content, &[LineRange::new(0, 3)], &table).unwrap();

        assert!(result.content.starts_with("[SECTION 1] Começo real\n"));
    }

    #[test]
    fn test_blank_range_gets_fallback_title() {
        let table = PatternTable::standard();
        let result = inject_markers("a\n\n \nb", &[LineRange::new(0, 0), LineRange::new(1, 2)], &table).unwrap();

        assert!(result.content.contains("[SECTION 2] Seção 2"));
    }

    #[test]
    fn test_range_starting_with_heading_is_skipped() {
        let table = PatternTable::standard();
        let content = "ATO I - A Queda\ntexto\noutro bloco";
        let result = inject_markers(content, &[LineRange::new(0, 1), LineRange::new(2, 2)], &table).unwrap();

        assert_eq!(result.injected, 1);
        assert_eq!(result.skipped, 1);
        assert_eq!(split_sections(&result.content, "a.txt").len(), 2);
    }

    #[test]
    fn test_numbering_ignores_skipped_ranges() {
        let table = PatternTable::standard();
        let content = "ATO I - A Queda\ntexto\nsegundo bloco\n\nterceiro bloco";
        let ranges = [LineRange::new(0, 1), LineRange::new(2, 3), LineRange::new(4, 4)];
        let result = inject_markers(content, &ranges, &table).unwrap();

        assert_eq!(result.injected, 2);
        assert!(result.content.contains("[SECTION 1] segundo bloco\n"));
        assert!(result.content.contains("[SECTION 2] terceiro bloco\n"));
        assert!(!result.content.contains("[SECTION 3]"));
    }

    #[test]
    fn test_crlf_line_endings_are_kept() {
        let table = PatternTable::standard();
        let content = "Linha um.\r\nLinha dois.\r\n\r\nLinha tres.\r\n";
        let result = inject_markers(content, &[LineRange::new(0, 1), LineRange::new(3, 3)], &table).unwrap();

        assert_eq!(
            result.content,
            "[SECTION 1] Linha um.\r\nLinha um.\r\nLinha dois.\r\n\r\n[SECTION 2] Linha tres.\r\nLinha tres.\r\n"
        );
        assert!(!result.content.replace("\r\n", "").contains('\n'));

        let sections = split_sections(&result.content, "a.txt");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].body, "Linha um.\nLinha dois.");
    }

    #[test]
    fn test_invalid_ranges_produce_nothing() {
        let table = PatternTable::standard();
        let err = inject_markers(TEXT, &[LineRange::new(0, 10)], &table).unwrap_err();
        assert!(matches!(err, AdvisorError::InvalidRange(_)));
    }

    #[test]
    fn test_unsorted_input_is_numbered_in_file_order() {
        let table = PatternTable::standard();
        let result = inject_markers("um\ndois", &[LineRange::new(1, 1), LineRange::new(0, 0)], &table).unwrap();
        assert_eq!(result.content, "[SECTION 1] um\num\n[SECTION 2] dois\ndois");
    }
}
