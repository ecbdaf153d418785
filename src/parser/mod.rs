// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PARSER DE SEÇÕES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Núcleo síncrono e puro:
//
//   texto → [PatternTable] → [SectionSplitter] → Vec<Section>
//   arquivos do projeto → [FileSelector] → arquivos que alimentam o divisor
//
// O extrator de metadados trata o arquivo de títulos/descrição à parte.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

mod metadata;
mod patterns;
mod selector;
mod splitter;

pub use metadata::{
    extract_video_metadata, is_titles_file, VideoMetadata, DEFAULT_TITLES_MARKERS, MAX_TITLE_OPTIONS,
};
pub use patterns::{HeadingMatch, HeadingRule, PatternTable, PATTERN_TABLE_VERSION};
pub use selector::{FileSelector, Selection, DEFAULT_NARRATION_MARKER};
pub use splitter::{split_sections, SectionSplitter};
