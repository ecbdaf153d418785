// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// DURAÇÃO DAS OPERAÇÕES LENTAS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Só três operações tocam I/O demorado: scan de pasta, sugestão de fronteiras e
// tradução. Cada uma é medida com um `Stopwatch` e acumulada em um
// `DurationLog`, que o estado da aplicação loga ao encerrar.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::collections::BTreeMap;
use std::fmt;
use std::time::Instant;

/// Operação medida
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimedAction {
    Scan,
    Suggest,
    Translate,
}

impl TimedAction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Scan => "scan",
            Self::Suggest => "sugestão",
            Self::Translate => "tradução",
        }
    }
}

/// Medição concluída
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub action: TimedAction,
    pub elapsed_ms: u128,
}

/// Cronômetro de uma operação em andamento
#[derive(Debug)]
pub struct Stopwatch {
    action: TimedAction,
    subject: String,
    started: Instant,
}

impl Stopwatch {
    /// Começa a medir `action` sobre `subject` (pasta, arquivo, seção)
    pub fn start(action: TimedAction, subject: impl Into<String>) -> Self {
        Self {
            action,
            subject: subject.into(),
            started: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.started.elapsed().as_millis()
    }

    /// Encerra e loga a medição
    pub fn finish(self) -> Timing {
        let elapsed_ms = self.elapsed_ms();
        log::info!("⏱️  {} de {}: {}ms", self.action.label(), self.subject, elapsed_ms);
        Timing {
            action: self.action,
            elapsed_ms,
        }
    }
}

/// Acumulado de uma operação
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DurationSummary {
    pub count: u32,
    pub total_ms: u128,
    pub max_ms: u128,
}

impl DurationSummary {
    /// Média inteira; `None` sem medições
    pub fn mean_ms(&self) -> Option<u128> {
        (self.count > 0).then(|| self.total_ms / u128::from(self.count))
    }
}

/// Medições da sessão, por operação
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DurationLog {
    entries: BTreeMap<TimedAction, DurationSummary>,
}

impl DurationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, timing: Timing) {
        let entry = self.entries.entry(timing.action).or_default();
        entry.count += 1;
        entry.total_ms += timing.elapsed_ms;
        entry.max_ms = entry.max_ms.max(timing.elapsed_ms);
    }

    pub fn get(&self, action: TimedAction) -> Option<&DurationSummary> {
        self.entries.get(&action)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for DurationLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return f.write_str("nenhuma operação medida");
        }
        let parts: Vec<String> = self
            .entries
            .iter()
            .map(|(action, s)| {
                format!(
                    "{} {}x (média {}ms, máx {}ms)",
                    action.label(),
                    s.count,
                    s.mean_ms().unwrap_or(0),
                    s.max_ms
                )
            })
            .collect();
        f.write_str(&parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_stopwatch_measures_elapsed_time() {
        let watch = Stopwatch::start(TimedAction::Scan, "Raiz");
        std::thread::sleep(Duration::from_millis(10));
        let timing = watch.finish();
        assert_eq!(timing.action, TimedAction::Scan);
        assert!(timing.elapsed_ms >= 10);
    }

    #[test]
    fn test_log_accumulates_per_action() {
        let mut log = DurationLog::new();
        log.record(Timing { action: TimedAction::Scan, elapsed_ms: 100 });
        log.record(Timing { action: TimedAction::Scan, elapsed_ms: 200 });
        log.record(Timing { action: TimedAction::Translate, elapsed_ms: 50 });

        let scan = log.get(TimedAction::Scan).unwrap();
        assert_eq!(scan.count, 2);
        assert_eq!(scan.mean_ms(), Some(150));
        assert_eq!(scan.max_ms, 200);
        assert!(log.get(TimedAction::Suggest).is_none());
        assert_eq!(
            log.to_string(),
            "scan 2x (média 150ms, máx 200ms), tradução 1x (média 50ms, máx 50ms)"
        );
    }

    #[test]
    fn test_empty_log() {
        assert!(DurationLog::new().is_empty());
        assert_eq!(DurationSummary::default().mean_ms(), None);
    }
}
