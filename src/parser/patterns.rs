// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TABELA DE PADRÕES DE CABEÇALHO
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Lista ordenada de regras (regex, tipo). Cada linha aparada é testada na ordem
// da tabela e a PRIMEIRA regra que casa vence. Alterar a ordem muda o resultado:
// algumas regras são prefixos de outras.
//
// Separadores aceitos: `-`, `–`, `—`, `:`.
// Marcador decorativo: sequência de `▓` no fim da linha (removido do label).
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use crate::types::SectionType;

/// Versão da tabela padrão. Incrementar ao adicionar ou reordenar regras.
pub const PATTERN_TABLE_VERSION: u32 = 3;

/// Especificação estática de uma regra da tabela padrão
struct RuleSpec {
    name: &'static str,
    pattern: &'static str,
    section_type: SectionType,
}

/// Tabela padrão, na ordem autoritativa.
const STANDARD_RULES: &[RuleSpec] = &[
    RuleSpec {
        name: "opening",
        pattern: r"^OPENING\b\s*[-–—:]?\s*(?P<label>.*?)(?:\s*▓+)?$",
        section_type: SectionType::Opening,
    },
    RuleSpec {
        name: "hook",
        pattern: r"^HOOK\s*\((?P<note>.+?)\)\s*[-–—:]?\s*(?P<label>.*?)(?:\s*▓+)?$",
        section_type: SectionType::Hook,
    },
    RuleSpec {
        name: "act",
        pattern: r"^(?:ATO|ACT)\s+(?P<number>[IVXLCDM]+|ONE|TWO|THREE|FOUR|FIVE|SIX|SEVEN|EIGHT|NINE|TEN|\d+)\s*[-–—:]\s*(?P<label>.+?)(?:\s*▓+)?$",
        section_type: SectionType::Ato,
    },
    RuleSpec {
        name: "chapter",
        pattern: r"^CHAPTER\s+(?P<number>ONE|TWO|THREE|FOUR|FIVE|SIX|SEVEN|EIGHT|NINE|TEN|\d+|\w+)\s*[-–—:]\s*(?P<label>.+?)(?:\s*▓+)?$",
        section_type: SectionType::Chapter,
    },
    RuleSpec {
        name: "capitulo",
        pattern: r"^CAP[ÍI]TULO\s+(?P<number>\d+)\s*[-–—:]\s*(?P<label>.+?)(?:\s*▓+)?$",
        section_type: SectionType::Capitulo,
    },
    RuleSpec {
        name: "part",
        pattern: r"^PART\s+(?P<number>\d+)\s*[-–—:]\s*(?P<label>.+?)(?:\s*▓+)?$",
        section_type: SectionType::Part,
    },
    RuleSpec {
        name: "parte",
        pattern: r"^PARTE\s+(?P<number>\d+)\s*[-–—:]\s*(?P<label>.+?)(?:\s*▓+)?$",
        section_type: SectionType::Parte,
    },
    RuleSpec {
        name: "conclusion",
        pattern: r"^(?:CONCLUS[ÃA]O|CONCLUSION)\b\s*[-–—:]?\s*(?P<label>.*?)(?:\s*▓+)?$",
        section_type: SectionType::Conclusao,
    },
    RuleSpec {
        name: "scene",
        pattern: r"^SCENE\s+(?P<number>\d+)\s*[-–—:]\s*(?P<label>.+)$",
        section_type: SectionType::Scene,
    },
    RuleSpec {
        name: "cena",
        pattern: r"^CENA\s+(?P<number>\d+)\s*[-–—:]\s*(?P<label>.+)$",
        section_type: SectionType::Cena,
    },
    RuleSpec {
        name: "markdown",
        pattern: r"^#{2,3}\s*(?P<label>[^#\s].*)$",
        section_type: SectionType::Heading,
    },
    RuleSpec {
        name: "advisor-marker",
        pattern: r"^\[SECTION\s+(?P<number>\d+)\]\s*(?P<label>.*)$",
        section_type: SectionType::Marker,
    },
];

static STANDARD_TABLE: Lazy<Arc<PatternTable>> = Lazy::new(|| {
    let rules = STANDARD_RULES
        .iter()
        .map(|spec| {
            HeadingRule::new(spec.name, spec.pattern, spec.section_type)
                .expect("padrão inválido na tabela padrão")
        })
        .collect();
    Arc::new(PatternTable::with_rules(PATTERN_TABLE_VERSION, rules))
});

/// Uma regra da tabela: reconhece uma linha inteira como cabeçalho.
#[derive(Debug, Clone)]
pub struct HeadingRule {
    name: String,
    section_type: SectionType,
    regex: Regex,
}

impl HeadingRule {
    /// Compila uma regra. O padrão é sempre case-insensitive.
    ///
    /// Um grupo nomeado `label`, se existir, vira o `label` da seção.
    pub fn new(name: &str, pattern: &str, section_type: SectionType) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("(?i){}", pattern))?;
        Ok(Self {
            name: name.to_string(),
            section_type,
            regex,
        })
    }

    /// Nome da regra (para logs e testes)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tipo atribuído às seções reconhecidas por esta regra
    pub fn section_type(&self) -> SectionType {
        self.section_type
    }

    /// Verifica se a linha casa com a regra
    pub fn is_match(&self, line: &str) -> bool {
        self.regex.is_match(line)
    }

    /// Tenta casar a linha; retorna o label capturado (se houver) em caso de sucesso.
    fn capture(&self, line: &str) -> Option<Option<String>> {
        let caps = self.regex.captures(line)?;
        let label = caps
            .name("label")
            .map(|m| m.as_str().trim())
            .filter(|l| !l.is_empty())
            .map(str::to_string);
        Some(label)
    }
}

/// Resultado de casar uma linha contra a tabela
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingMatch {
    /// Tipo da regra vencedora
    pub section_type: SectionType,
    /// Label capturado
    pub label: Option<String>,
    /// Posição da regra vencedora na tabela
    pub rule_index: usize,
}

/// Tabela ordenada de regras de cabeçalho.
#[derive(Debug, Clone)]
pub struct PatternTable {
    version: u32,
    rules: Vec<HeadingRule>,
}

impl PatternTable {
    /// Tabela padrão compartilhada (compilada uma única vez)
    pub fn standard() -> Arc<Self> {
        Arc::clone(&STANDARD_TABLE)
    }

    /// Cria uma tabela com regras customizadas, na ordem dada
    pub fn with_rules(version: u32, rules: Vec<HeadingRule>) -> Self {
        Self { version, rules }
    }

    /// Versão da tabela
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Regras na ordem de avaliação
    pub fn rules(&self) -> &[HeadingRule] {
        &self.rules
    }

    /// Número de regras
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Retorna true se a tabela não tem regras
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Testa a linha contra as regras em ordem; a primeira que casa vence.
    pub fn match_line(&self, line: &str) -> Option<HeadingMatch> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        self.rules.iter().enumerate().find_map(|(rule_index, rule)| {
            rule.capture(line).map(|label| HeadingMatch {
                section_type: rule.section_type,
                label,
                rule_index,
            })
        })
    }

    /// Verifica se a linha é um cabeçalho reconhecido
    pub fn is_heading(&self, line: &str) -> bool {
        self.match_line(line).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(line: &str) -> Option<SectionType> {
        PatternTable::standard().match_line(line).map(|m| m.section_type)
    }

    fn label(line: &str) -> Option<String> {
        PatternTable::standard().match_line(line).and_then(|m| m.label)
    }

    #[test]
    fn test_standard_table_order() {
        let table = PatternTable::standard();
        let order: Vec<SectionType> = table.rules().iter().map(|r| r.section_type()).collect();

        assert_eq!(
            order,
            vec![
                SectionType::Opening,
                SectionType::Hook,
                SectionType::Ato,
                SectionType::Chapter,
                SectionType::Capitulo,
                SectionType::Part,
                SectionType::Parte,
                SectionType::Conclusao,
                SectionType::Scene,
                SectionType::Cena,
                SectionType::Heading,
                SectionType::Marker,
            ]
        );
        assert_eq!(table.version(), PATTERN_TABLE_VERSION);
    }

    #[test]
    fn test_opening_rule() {
        assert_eq!(classify("OPENING"), Some(SectionType::Opening));
        assert_eq!(classify("OPENING - A Noite"), Some(SectionType::Opening));
        assert_eq!(classify("opening: a noite"), Some(SectionType::Opening));
        assert_eq!(classify("Opening – A Noite"), Some(SectionType::Opening));
        assert_eq!(label("OPENING - A Noite ▓▓▓"), Some("A Noite".into()));
        assert_eq!(label("OPENING"), None);
        assert_eq!(classify("OPENINGS"), None);
    }

    #[test]
    fn test_hook_rule() {
        assert_eq!(classify("HOOK (0:00)"), Some(SectionType::Hook));
        assert_eq!(classify("HOOK (0:00 - 0:30) O segredo"), Some(SectionType::Hook));
        assert_eq!(label("HOOK (0:00) - O segredo"), Some("O segredo".into()));
        assert_eq!(classify("HOOK sem parênteses"), None);
        assert_eq!(classify("HOOK ()"), None);
    }

    #[test]
    fn test_act_rule() {
        assert_eq!(classify("ATO I - A Queda"), Some(SectionType::Ato));
        assert_eq!(classify("ACT IV – The Return"), Some(SectionType::Ato));
        assert_eq!(classify("act one: the start"), Some(SectionType::Ato));
        assert_eq!(classify("ATO 3 - Fim"), Some(SectionType::Ato));
        assert_eq!(label("ACT II - The Storm ▓▓▓▓"), Some("The Storm".into()));
        assert_eq!(classify("ATO I"), None);
        assert_eq!(classify("ACT ELEVEN - x"), None);
    }

    #[test]
    fn test_chapter_rule() {
        assert_eq!(classify("CHAPTER ONE - Origins"), Some(SectionType::Chapter));
        assert_eq!(classify("CHAPTER 12: Origins"), Some(SectionType::Chapter));
        assert_eq!(classify("Chapter Eleven - Origins"), Some(SectionType::Chapter));
        assert_eq!(label("CHAPTER 2 — The Road"), Some("The Road".into()));
        assert_eq!(classify("CHAPTER - Origins"), None);
    }

    #[test]
    fn test_capitulo_rule() {
        assert_eq!(classify("CAPÍTULO 1 - O Início"), Some(SectionType::Capitulo));
        assert_eq!(classify("capítulo 2: Meio"), Some(SectionType::Capitulo));
        assert_eq!(classify("CAPITULO 3 - Fim"), Some(SectionType::Capitulo));
        assert_eq!(classify("CAPÍTULO UM - Fim"), None);
    }

    #[test]
    fn test_part_and_parte_rules() {
        assert_eq!(classify("PART 1 - Rise"), Some(SectionType::Part));
        assert_eq!(classify("PARTE 1 - Ascensão"), Some(SectionType::Parte));
        assert_eq!(classify("parte 2: Queda"), Some(SectionType::Parte));
        assert_eq!(classify("PARTE - sem número"), None);
        assert_eq!(classify("PARTICULAR 1 - x"), None);
    }

    #[test]
    fn test_conclusion_rule() {
        assert_eq!(classify("CONCLUSÃO"), Some(SectionType::Conclusao));
        assert_eq!(classify("conclusão - fim"), Some(SectionType::Conclusao));
        assert_eq!(classify("CONCLUSAO: Fim"), Some(SectionType::Conclusao));
        assert_eq!(classify("CONCLUSION – The End ▓▓▓"), Some(SectionType::Conclusao));
        assert_eq!(label("CONCLUSION – The End ▓▓▓"), Some("The End".into()));
        assert_eq!(classify("CONCLUSIONS"), None);
    }

    #[test]
    fn test_scene_and_cena_rules() {
        assert_eq!(classify("SCENE 3 - The Door"), Some(SectionType::Scene));
        assert_eq!(classify("CENA 3 - A Porta"), Some(SectionType::Cena));
        assert_eq!(classify("cena 10: A Porta"), Some(SectionType::Cena));
        assert_eq!(classify("CENA TRÊS - A Porta"), None);
        assert_eq!(classify("SCENE 3"), None);
    }

    #[test]
    fn test_markdown_rule() {
        assert_eq!(classify("## Introdução"), Some(SectionType::Heading));
        assert_eq!(classify("### Detalhes"), Some(SectionType::Heading));
        assert_eq!(label("##Sem espaço"), Some("Sem espaço".into()));
        assert_eq!(classify("# Título"), None);
        assert_eq!(classify("#### Fundo"), None);
        assert_eq!(classify("##"), None);
    }

    #[test]
    fn test_advisor_marker_rule() {
        assert_eq!(classify("[SECTION 1] Era uma vez"), Some(SectionType::Marker));
        assert_eq!(label("[SECTION 12] Era uma vez"), Some("Era uma vez".into()));
        assert_eq!(classify("[SECTION] x"), None);
    }

    #[test]
    fn test_plain_text_is_not_heading() {
        let table = PatternTable::standard();
        assert!(!table.is_heading("Era uma vez um reino distante."));
        assert!(!table.is_heading(""));
        assert!(!table.is_heading("   "));
        assert!(!table.is_heading("O ATO I - começa aqui"));
    }

    #[test]
    fn test_line_is_trimmed_before_matching() {
        assert_eq!(classify("   ATO II - A Redenção   "), Some(SectionType::Ato));
    }

    #[test]
    fn test_first_match_wins() {
        let loose_act = HeadingRule::new("loose-act", r"^ACT\b.*$", SectionType::Heading).unwrap();
        let strict_act = HeadingRule::new(
            "strict-act",
            r"^ACT\s+[IVX]+\s*[-–]\s*(?P<label>.+)$",
            SectionType::Ato,
        )
        .unwrap();

        let strict_first = PatternTable::with_rules(1, vec![strict_act.clone(), loose_act.clone()]);
        let loose_first = PatternTable::with_rules(1, vec![loose_act, strict_act]);

        let line = "ACT II - The Storm";
        let m = strict_first.match_line(line).unwrap();
        assert_eq!(m.section_type, SectionType::Ato);
        assert_eq!(m.rule_index, 0);
        assert_eq!(m.label.as_deref(), Some("The Storm"));

        let m = loose_first.match_line(line).unwrap();
        assert_eq!(m.section_type, SectionType::Heading);
        assert_eq!(m.label, None);
    }

    #[test]
    fn test_empty_table_matches_nothing() {
        let table = PatternTable::with_rules(0, vec![]);
        assert!(table.is_empty());
        assert!(table.match_line("ATO I - A Queda").is_none());
    }
}
