// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TEXT UTILITIES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Utilitários para processamento de texto:
// - Contagem de palavras e caracteres
// - Primeira linha não vazia de um intervalo
// - Prévias curtas para logs e CLI
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Conta palavras em um texto (tokens separados por qualquer sequência de espaços)
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Conta caracteres (não bytes) de um texto
pub fn char_count(text: &str) -> usize {
    text.chars().count()
}

/// Retorna (palavras, caracteres) do texto já aparado.
pub fn text_stats(text: &str) -> (usize, usize) {
    let trimmed = text.trim();
    (word_count(trimmed), char_count(trimmed))
}

/// Primeira linha não vazia (aparada) de uma sequência de linhas
pub fn first_non_blank_line<'a, I>(lines: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    lines.into_iter().map(str::trim).find(|l| !l.is_empty())
}

/// Prévia de um texto limitada a `max_chars` caracteres, em uma linha só
pub fn preview(text: &str, max_chars: usize) -> String {
    let single_line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if char_count(&single_line) <= max_chars {
        single_line
    } else {
        let cut: String = single_line.chars().take(max_chars).collect();
        format!("{}...", cut.trim_end())
    }
}
