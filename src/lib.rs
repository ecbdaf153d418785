//! # Script Sections
//!
//! Biblioteca para dividir roteiros e textos de narração em **seções**
//! a partir de padrões de cabeçalho, organizar os arquivos em projetos e
//! acompanhar quais seções já foram copiadas.
//!
//! ## Fluxo de dados
//!
//! ```text
//! pasta raiz → [FolderScanner] → [ProjectAssembler] → [FileSelector]
//!            → [SectionSplitter] → Vec<Section> → cópia / histórico de uso
//! ```
//!
//! O advisor remoto é um caminho alternativo, sempre confirmado pelo usuário:
//! ele só propõe intervalos de linhas, que viram marcadores no texto e passam
//! de novo pelo divisor.
//!
//! ## Arquitetura
//!
//! ### 1. Núcleo de parsing (`parser`)
//! Síncrono e puro:
//! - **PatternTable**: regras (regex, tipo) versionadas e ordenadas; a primeira que casa vence
//! - **SectionSplitter**: máquina de estados fora/dentro de seção
//! - **FileSelector**: prioridade do arquivo de narração
//!
//! ### 2. Projetos (`project`)
//! Agrupamento por subpasta e scan com proteção contra scans concorrentes.
//!
//! ### 3. Colaboradores (`provider`, `store`, `clipboard`, `advisor`)
//! Traits assíncronas com implementações locais e em memória.
//!
//! ### 4. Aplicação (`app`)
//! Estado explícito com `init`/`dispose` e comandos tipados.
//!
//! ## Exemplo de Uso
//!
//! ```rust,ignore
//! use script_sections::prelude::*;
//!
//! let sections = split_sections("ATO I - A Queda\nTexto um.", "roteiro.txt");
//! assert_eq!(sections[0].section_type, SectionType::Ato);
//! ```

#![warn(rust_2018_idioms)]

/// Tipos fundamentais compartilhados por todo o sistema.
///
/// - [`SectionType`]: tag de tipo de cada regra de cabeçalho
/// - [`Section`]: trecho titulado de um arquivo
/// - [`SectionKey`]: identidade de uma seção no histórico
/// - [`SourceFile`]: arquivo de texto lido de uma pasta
pub mod types;

/// Núcleo de parsing: tabela de padrões, divisor, seletor e metadados.
pub mod parser;

/// Projetos, montador e scanner de pastas.
pub mod project;

/// Provider de pastas e arquivos (disco local ou memória).
pub mod provider;

/// Persistência chave-valor com namespaces e snapshots limitados.
pub mod store;

/// Histórico de cópias por (projeto, título).
pub mod usage;

/// Destino das cópias.
pub mod clipboard;

/// Advisor remoto de fronteiras e tradução.
pub mod advisor;

/// Estado da aplicação e comandos tipados.
pub mod app;

/// Configuração via variáveis de ambiente e runtime Tokio.
pub mod config;

/// Utilitários de texto e timing.
pub mod utils;

// Re-exports principais
pub use app::{AppError, AppServices, AppState, Command, Notification, Outcome, SectionRef};
pub use config::{create_runtime, load_app_config, AdvisorConfig, AppConfig};
pub use parser::{split_sections, FileSelector, PatternTable, SectionSplitter};
pub use project::{FolderScanner, Project, ProjectAssembler};
pub use types::*;

/// Versão do crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Importações mais comuns
pub mod prelude {
    pub use crate::advisor::{BoundaryAdvisor, LineRange, MockAdvisor, OpenAiAdvisor};
    pub use crate::app::{AppServices, AppState, Command, Notification, NotificationLevel, Outcome, SectionRef};
    pub use crate::clipboard::{ClipboardSink, MemoryClipboard};
    pub use crate::config::{load_app_config, AppConfig};
    pub use crate::parser::{
        split_sections, FileSelector, HeadingRule, PatternTable, SectionSplitter, VideoMetadata,
    };
    pub use crate::project::{FolderScanner, Project, ProjectAssembler, ScanReport};
    pub use crate::provider::{FolderProvider, LocalFolderProvider, MemoryFolderProvider};
    pub use crate::store::{KeyValueStore, LocalStore, MemoryStore, Namespace, SnapshotStore};
    pub use crate::types::*;
    pub use crate::usage::{UsageRecord, UsageTracker};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_prelude_splits() {
        use crate::prelude::*;

        let sections = split_sections("ATO I - A Queda\nTexto um.", "roteiro.txt");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].section_type, SectionType::Ato);
    }
}
