// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CLIPBOARD
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Destino das cópias. `SystemClipboard` só existe com a feature `clipboard`.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

/// Erros do clipboard
#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard indisponível: {0}")]
    Unavailable(String),

    #[error("falha ao escrever no clipboard: {0}")]
    WriteFailed(String),
}

/// Destino de texto copiado
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClipboardSink: Send + Sync {
    /// Escreve o texto no clipboard
    async fn write(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Clipboard em memória: guarda tudo que foi escrito
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    writes: Mutex<Vec<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Último texto escrito
    pub async fn last(&self) -> Option<String> {
        self.writes.lock().await.last().cloned()
    }

    /// Quantidade de escritas
    pub async fn write_count(&self) -> usize {
        self.writes.lock().await.len()
    }
}

#[async_trait]
impl ClipboardSink for MemoryClipboard {
    async fn write(&self, text: &str) -> Result<(), ClipboardError> {
        self.writes.lock().await.push(text.to_string());
        Ok(())
    }
}

/// Clipboard do sistema operacional (arboard)
#[cfg(feature = "clipboard")]
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

#[cfg(feature = "clipboard")]
#[async_trait]
impl ClipboardSink for SystemClipboard {
    async fn write(&self, text: &str) -> Result<(), ClipboardError> {
        let text = text.to_string();
        tokio::task::spawn_blocking(move || {
            let mut clipboard =
                arboard::Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
            clipboard
                .set_text(text)
                .map_err(|e| ClipboardError::WriteFailed(e.to_string()))
        })
        .await
        .map_err(|e| ClipboardError::WriteFailed(e.to_string()))?
    }
}
