// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ADVISOR DE FRONTEIRAS (IA remota, apenas consultivo)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// O advisor propõe intervalos de linhas; ele nunca cria seções. Ao aceitar,
// o núcleo injeta marcadores `[SECTION n] título` no texto e roda o divisor
// de novo.
//
//   texto → [BoundaryAdvisor] → JSON → parse_ranges → validate_ranges
//         → inject_markers → divisor
//
// A saída remota é tratada como não confiável: o formato é validado antes de
// qualquer uso e títulos vêm sempre do texto local.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

mod markers;
mod openai;

pub use markers::{inject_markers, MarkerInjection, FALLBACK_TITLE_PREFIX};
pub use openai::OpenAiAdvisor;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Intervalo de linhas proposto (0-based, inclusivo nas duas pontas)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineRange {
    pub start_line: usize,
    pub end_line: usize,
}

impl LineRange {
    pub fn new(start_line: usize, end_line: usize) -> Self {
        Self { start_line, end_line }
    }

    /// Número de linhas do intervalo
    pub fn len(&self) -> usize {
        self.end_line.saturating_sub(self.start_line) + 1
    }

    pub fn is_empty(&self) -> bool {
        self.end_line < self.start_line
    }
}

/// Erros do advisor
#[derive(Debug, thiserror::Error)]
pub enum AdvisorError {
    #[error("advisor não configurado (defina ADVISOR_API_KEY)")]
    NotConfigured,

    #[error("erro de rede: {0}")]
    Network(String),

    #[error("API retornou {status}: {body}")]
    Api { status: u16, body: String },

    #[error("resposta inválida: {0}")]
    MalformedResponse(String),

    #[error("intervalo inválido: {0}")]
    InvalidRange(String),
}

impl From<reqwest::Error> for AdvisorError {
    fn from(err: reqwest::Error) -> Self {
        AdvisorError::Network(err.to_string())
    }
}

/// Trait do advisor remoto
///
/// Uma tentativa por chamada; falhas são devolvidas ao chamador sem retry.
#[async_trait]
pub trait BoundaryAdvisor: Send + Sync {
    /// Nome do advisor (para logs)
    fn name(&self) -> &'static str;

    /// Propõe intervalos de seção para o texto
    async fn suggest_boundaries(&self, text: &str) -> Result<Vec<LineRange>, AdvisorError>;

    /// Traduz o texto para o idioma pedido
    async fn translate(&self, text: &str, language: &str) -> Result<String, AdvisorError>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// VALIDAÇÃO DA RESPOSTA
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Primeiro objeto JSON válido dentro de um texto livre.
///
/// Cada `{` é tentado como início; chaves soltas na prosa são puladas.
pub fn extract_json_object(text: &str) -> Option<&str> {
    text.match_indices('{').find_map(|(start, _)| {
        let rest = &text[start..];
        let mut stream = serde_json::Deserializer::from_str(rest).into_iter::<Value>();
        match stream.next() {
            Some(Ok(Value::Object(_))) => Some(&rest[..stream.byte_offset()]),
            _ => None,
        }
    })
}

fn as_line(value: Option<&Value>, field: &str, index: usize) -> Result<usize, AdvisorError> {
    value
        .and_then(Value::as_u64)
        .map(|v| v as usize)
        .ok_or_else(|| {
            AdvisorError::MalformedResponse(format!("item {}: `{}` não é um inteiro não negativo", index, field))
        })
}

/// Converte a resposta do modelo em intervalos.
///
/// Formatos aceitos dentro do objeto JSON (chave `sections` ou `ranges`):
/// - `[{"startLine": 0, "endLine": 4}, ...]`
/// - `[[0, 4], ...]`
pub fn parse_ranges(response: &str) -> Result<Vec<LineRange>, AdvisorError> {
    let json = extract_json_object(response)
        .ok_or_else(|| AdvisorError::MalformedResponse("nenhum objeto JSON na resposta".into()))?;
    let value: Value =
        serde_json::from_str(json).map_err(|e| AdvisorError::MalformedResponse(e.to_string()))?;

    let items = value
        .get("sections")
        .or_else(|| value.get("ranges"))
        .and_then(Value::as_array)
        .ok_or_else(|| AdvisorError::MalformedResponse("lista `sections` ausente".into()))?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Array(pair) if pair.len() == 2 => Ok(LineRange::new(
                as_line(pair.first(), "start", i)?,
                as_line(pair.get(1), "end", i)?,
            )),
            Value::Object(_) => Ok(LineRange::new(
                as_line(item.get("startLine"), "startLine", i)?,
                as_line(item.get("endLine"), "endLine", i)?,
            )),
            _ => Err(AdvisorError::MalformedResponse(format!(
                "item {}: formato desconhecido",
                i
            ))),
        })
        .collect()
}

/// Valida intervalos contra o número de linhas do arquivo.
///
/// Retorna os intervalos ordenados. Rejeita `start > end`, intervalos fora do
/// arquivo e sobreposições.
pub fn validate_ranges(ranges: &[LineRange], line_count: usize) -> Result<Vec<LineRange>, AdvisorError> {
    let mut sorted = ranges.to_vec();
    sorted.sort();

    for range in &sorted {
        if range.start_line > range.end_line {
            return Err(AdvisorError::InvalidRange(format!(
                "início {} maior que fim {}",
                range.start_line, range.end_line
            )));
        }
        if range.end_line >= line_count {
            return Err(AdvisorError::InvalidRange(format!(
                "linha {} fora do arquivo ({} linhas)",
                range.end_line, line_count
            )));
        }
    }

    for pair in sorted.windows(2) {
        if pair[1].start_line <= pair[0].end_line {
            return Err(AdvisorError::InvalidRange(format!(
                "intervalos {}-{} e {}-{} se sobrepõem",
                pair[0].start_line, pair[0].end_line, pair[1].start_line, pair[1].end_line
            )));
        }
    }

    Ok(sorted)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// IMPLEMENTAÇÃO MOCK PARA TESTES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Advisor mock: respostas fixas, ou falha de rede
#[derive(Debug, Default)]
pub struct MockAdvisor {
    /// Resposta bruta do modelo (passa por `parse_ranges`)
    pub raw_response: Option<String>,
    /// Tradução devolvida
    pub translation: Option<String>,
    /// Se definido, toda chamada falha com erro de rede
    pub failure: Option<String>,
    calls: AtomicUsize,
}

impl MockAdvisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock que devolve os intervalos dados
    pub fn with_ranges(ranges: &[LineRange]) -> Self {
        let json = serde_json::json!({ "sections": ranges });
        Self::with_raw_response(&json.to_string())
    }

    /// Mock que devolve um texto bruto
    pub fn with_raw_response(raw: &str) -> Self {
        Self {
            raw_response: Some(raw.to_string()),
            ..Default::default()
        }
    }

    /// Mock que devolve uma tradução
    pub fn with_translation(text: &str) -> Self {
        Self {
            translation: Some(text.to_string()),
            ..Default::default()
        }
    }

    /// Mock que sempre falha
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Default::default()
        }
    }

    /// Quantas chamadas foram feitas
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BoundaryAdvisor for MockAdvisor {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn suggest_boundaries(&self, _text: &str) -> Result<Vec<LineRange>, AdvisorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.failure {
            return Err(AdvisorError::Network(message.clone()));
        }
        parse_ranges(self.raw_response.as_deref().unwrap_or("{\"sections\": []}"))
    }

    async fn translate(&self, text: &str, language: &str) -> Result<String, AdvisorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.failure {
            return Err(AdvisorError::Network(message.clone()));
        }
        Ok(self
            .translation
            .clone()
            .unwrap_or_else(|| format!("[{}] {}", language, text)))
    }
}
