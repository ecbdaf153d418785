// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SCRIPT SECTIONS CLI
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// CLI para escanear pastas de roteiros, listar seções e copiar trechos.
//
// Uso:
//   script-sections-cli scan ./Roteiros
//   script-sections-cli sections "Episodio 01"
//   script-sections-cli copy "Episodio 01" 2
//   script-sections-cli suggest "Episodio 01" roteiro.txt --accept
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use script_sections::prelude::*;
use script_sections::{create_runtime, AppError};
use std::path::PathBuf;

fn print_usage(program: &str) {
    eprintln!("Script Sections CLI v{}", script_sections::VERSION);
    eprintln!();
    eprintln!("Uso: {} <comando> [argumentos]", program);
    eprintln!();
    eprintln!("Comandos:");
    eprintln!("  scan [pasta]                        Escaneia a pasta (ou SCRIPT_ROOT)");
    eprintln!("  projects                            Lista os projetos");
    eprintln!("  sections [projeto]                  Lista as seções do projeto");
    eprintln!("  copy <projeto> <índice>             Copia o corpo de uma seção");
    eprintln!("  copy-file <projeto> <arquivo>       Copia o conteúdo de um arquivo");
    eprintln!("  export <projeto> <índice> [pasta]   Salva a seção em <título>.txt");
    eprintln!("  history [projeto]                   Mostra o histórico de cópias");
    eprintln!("  metadata <projeto>                  Títulos, descrição e thumbnail");
    eprintln!("  suggest <projeto> <arquivo> [--accept]");
    eprintln!("                                      Pede fronteiras ao advisor");
    eprintln!("  translate <projeto> <índice> <idioma>");
    eprintln!("  clear-history [projeto]             Limpa o histórico");
    eprintln!("  remove-folder                       Esquece a pasta salva");
    eprintln!();
    eprintln!("Variáveis: SCRIPT_ROOT, NARRATION_MARKER, STORE_DIR, ADVISOR_API_KEY ...");
}

fn parse_index(raw: &str) -> anyhow::Result<usize> {
    raw.parse::<usize>()
        .map_err(|_| anyhow::anyhow!("índice inválido: {}", raw))
}

fn arg<'a>(args: &'a [String], index: usize, name: &str) -> anyhow::Result<&'a str> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| anyhow::anyhow!("argumento ausente: <{}>", name))
}

fn print_sections(state: &AppState, project: &Project) {
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(" {} ({} seções, {} palavras)", project.name, project.sections.len(), project.total_words());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for (i, section) in project.sections.iter().enumerate() {
        let mark = match state.usage_of(&project.name, section) {
            Some(record) => format!("✓ {}x", record.count),
            None => "  ".to_string(),
        };
        println!(
            "{:>3}. [{}] {:<10} {} ({} palavras, {}:{})",
            i,
            mark,
            section.section_type,
            section.title,
            section.word_count,
            section.source_file,
            section.line_number
        );
    }
}

async fn run(state: &mut AppState, args: &[String]) -> anyhow::Result<()> {
    let command = args[1].as_str();

    match command {
        "scan" => {
            let path = match args.get(2) {
                Some(p) => PathBuf::from(p),
                None => state
                    .config()
                    .script_root
                    .clone()
                    .ok_or_else(|| anyhow::anyhow!("informe a pasta ou defina SCRIPT_ROOT"))?,
            };
            if let Outcome::Scanned(report) = state.dispatch(Command::ScanFolder { path }).await? {
                println!("{}", report.summary());
                for warning in &report.warnings {
                    println!("  ⚠ {}: {}", warning.path, warning.message);
                }
            }
        }

        "projects" => {
            for project in state.projects().values() {
                println!(
                    "{} ({} arquivos, {} seções)",
                    project.name,
                    project.files.len(),
                    project.sections.len()
                );
            }
        }

        "sections" => {
            let project = match args.get(2) {
                Some(name) => state.project(name),
                None => state.current_project(),
            };
            match project {
                Some(project) => print_sections(state, project),
                None => anyhow::bail!("nenhum projeto encontrado; rode `scan` primeiro"),
            }
        }

        "copy" => {
            let project = arg(args, 2, "projeto")?;
            let index = parse_index(arg(args, 3, "índice")?)?;
            let section = SectionRef::new(project, index);
            let body = state
                .project(project)
                .and_then(|p| p.sections.get(index))
                .map(|s| s.body.clone());
            if let Outcome::Copied { chars, usage } = state.dispatch(Command::CopySection(section)).await? {
                if cfg!(not(feature = "clipboard")) {
                    println!("{}", body.unwrap_or_default());
                }
                let count = usage.map(|u| u.count).unwrap_or(0);
                eprintln!("📋 {} caracteres copiados (uso nº {})", chars, count);
            }
        }

        "copy-file" => {
            let project = arg(args, 2, "projeto")?.to_string();
            let file = arg(args, 3, "arquivo")?.to_string();
            let content = state
                .project(&project)
                .and_then(|p| p.file(&file))
                .map(|f| f.content.clone());
            if let Outcome::Copied { chars, .. } = state.dispatch(Command::CopyFile { project, file }).await? {
                if cfg!(not(feature = "clipboard")) {
                    println!("{}", content.unwrap_or_default());
                }
                eprintln!("📋 {} caracteres copiados", chars);
            }
        }

        "export" => {
            let project = arg(args, 2, "projeto")?;
            let index = parse_index(arg(args, 3, "índice")?)?;
            let dir = args.get(4).map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
            let command = Command::ExportSection {
                section: SectionRef::new(project, index),
                dir,
            };
            if let Outcome::Exported(path) = state.dispatch(command).await? {
                println!("💾 {}", path.display());
            }
        }

        "history" => {
            let names: Vec<String> = match args.get(2) {
                Some(name) => vec![name.clone()],
                None => state.projects().keys().cloned().collect(),
            };
            for name in names {
                let Some(records) = state.usage().project_records(&name) else {
                    continue;
                };
                println!("{}", name);
                for (title, record) in records {
                    println!(
                        "  {}x  {}  (última: {})",
                        record.count,
                        title,
                        record.last_used.format("%Y-%m-%d %H:%M")
                    );
                }
            }
        }

        "metadata" => {
            let project = arg(args, 2, "projeto")?.to_string();
            match state.dispatch(Command::ShowMetadata { project }).await? {
                Outcome::Metadata(Some(metadata)) => {
                    for (n, title) in metadata.title_options() {
                        println!("Título {}: {}", n, title);
                    }
                    if let Some(description) = &metadata.description {
                        println!("\nDescrição:\n{}", description);
                    }
                    if let Some(thumbnail) = &metadata.thumbnail {
                        println!("\nThumbnail:\n{}", thumbnail);
                    }
                }
                _ => println!("Nenhum arquivo de títulos neste projeto"),
            }
        }

        "suggest" => {
            let project = arg(args, 2, "projeto")?.to_string();
            let file = arg(args, 3, "arquivo")?.to_string();
            let accept = args.iter().any(|a| a == "--accept");

            let ranges = match state
                .dispatch(Command::SuggestBoundaries {
                    project: project.clone(),
                    file: file.clone(),
                })
                .await?
            {
                Outcome::Suggestions(ranges) => ranges,
                _ => Vec::new(),
            };

            for (i, range) in ranges.iter().enumerate() {
                println!("  {}. linhas {}..={}", i + 1, range.start_line + 1, range.end_line + 1);
            }

            if accept && !ranges.is_empty() {
                let outcome = state
                    .dispatch(Command::AcceptSuggestions { project, file, ranges })
                    .await?;
                if let Outcome::SuggestionsApplied { injected, skipped, sections } = outcome {
                    println!(
                        "✓ {} marcadores inseridos, {} já existentes, {} seções",
                        injected, skipped, sections
                    );
                }
            }
        }

        "translate" => {
            let project = arg(args, 2, "projeto")?;
            let index = parse_index(arg(args, 3, "índice")?)?;
            let language = arg(args, 4, "idioma")?.to_string();
            let command = Command::TranslateSection {
                section: SectionRef::new(project, index),
                language,
            };
            if let Outcome::Translated(text) = state.dispatch(command).await? {
                println!("{}", text);
            }
        }

        "clear-history" => {
            let command = match args.get(2) {
                Some(project) => Command::ClearProjectHistory {
                    project: project.clone(),
                },
                None => Command::ClearAllHistory,
            };
            if let Outcome::HistoryCleared { removed } = state.dispatch(command).await? {
                println!("🧹 {} registros removidos", removed);
            }
        }

        "remove-folder" => {
            state.dispatch(Command::RemoveFolder).await?;
            println!("Pasta removida do workspace");
        }

        other => {
            print_usage(&args[0]);
            anyhow::bail!("comando desconhecido: {}", other);
        }
    }

    Ok(())
}

fn print_notifications(notifications: &[Notification]) {
    for notification in notifications {
        match notification.level {
            // Info já sai pelo log
            NotificationLevel::Info => {}
            NotificationLevel::Warning => eprintln!("⚠ {}", notification.message),
            NotificationLevel::Error => eprintln!("✗ {}", notification.message),
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Carregar .env antes de ler a configuração
    if dotenvy::dotenv().is_err() {
        log::debug!("Nenhum .env encontrado");
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage(&args[0]);
        std::process::exit(1);
    }

    let config = load_app_config();
    let services = AppServices::from_config(&config);
    let runtime = create_runtime()?;

    runtime.block_on(async {
        let mut state = AppState::new(config, services);
        state.init().await;

        let result = run(&mut state, &args).await;
        print_notifications(&state.drain_notifications());

        let pending = state.dispose().await;
        print_notifications(&pending);

        match result {
            // Erros de comando já foram notificados
            Err(e) if e.downcast_ref::<AppError>().is_some() => std::process::exit(2),
            other => other,
        }
    })
}
