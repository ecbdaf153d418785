// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// HISTÓRICO DE USO (cópias de seções)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Registro por (projeto, título exato): primeira cópia, última cópia, contador.
// Persistido separado dos projetos, sob a chave `copy_history`, então sobrevive
// a rescans. Editar o título de uma seção gera uma chave nova.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::store::{SnapshotStore, StoreError};
use crate::types::SectionKey;

/// Chave do histórico no namespace de snapshots
pub const USAGE_HISTORY_KEY: &str = "copy_history";

/// Uso de uma seção
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    pub first_used: DateTime<Utc>,
    pub last_used: DateTime<Utc>,
    pub count: u32,
}

impl UsageRecord {
    fn new(at: DateTime<Utc>) -> Self {
        Self {
            first_used: at,
            last_used: at,
            count: 1,
        }
    }

    fn touch(&mut self, at: DateTime<Utc>) {
        self.count = self.count.saturating_add(1);
        if at > self.last_used {
            self.last_used = at;
        }
    }
}

/// Histórico de uso: projeto → título → registro
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsageTracker {
    history: BTreeMap<String, BTreeMap<String, UsageRecord>>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra uma cópia agora
    pub fn record(&mut self, key: &SectionKey) -> &UsageRecord {
        self.record_at(key, Utc::now())
    }

    /// Registra uma cópia em um instante específico
    pub fn record_at(&mut self, key: &SectionKey, at: DateTime<Utc>) -> &UsageRecord {
        let record = self
            .history
            .entry(key.project.clone())
            .or_default()
            .entry(key.title.clone())
            .and_modify(|r| r.touch(at))
            .or_insert_with(|| UsageRecord::new(at));
        log::debug!("📋 Uso registrado: {} / {} ({}x)", key.project, key.title, record.count);
        record
    }

    /// Registro de uma seção
    pub fn get(&self, key: &SectionKey) -> Option<&UsageRecord> {
        self.history.get(&key.project)?.get(&key.title)
    }

    /// Verifica se a seção já foi copiada
    pub fn was_used(&self, key: &SectionKey) -> bool {
        self.get(key).is_some()
    }

    /// Registros de um projeto
    pub fn project_records(&self, project: &str) -> Option<&BTreeMap<String, UsageRecord>> {
        self.history.get(project)
    }

    /// Limpa o histórico de um projeto; retorna quantos registros foram removidos
    pub fn clear_project(&mut self, project: &str) -> usize {
        self.history.remove(project).map(|r| r.len()).unwrap_or(0)
    }

    /// Limpa todo o histórico; retorna quantos registros foram removidos
    pub fn clear_all(&mut self) -> usize {
        let removed = self.len();
        self.history.clear();
        removed
    }

    /// Total de registros
    pub fn len(&self) -> usize {
        self.history.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Carrega o histórico persistido (vazio se não existir)
    pub async fn load(store: &SnapshotStore) -> Result<Self, StoreError> {
        Ok(store.load(USAGE_HISTORY_KEY).await?.unwrap_or_default())
    }

    /// Persiste o histórico
    pub async fn persist(&self, store: &SnapshotStore) -> Result<(), StoreError> {
        store.save(USAGE_HISTORY_KEY, self).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::Duration;
    use std::sync::Arc;

    #[test]
    fn test_record_twice_increments() {
        let mut tracker = UsageTracker::new();
        let hook = SectionKey::new("Demo", "HOOK (0:00)");
        let t0 = Utc::now();

        tracker.record_at(&hook, t0);
        let record = tracker.record_at(&hook, t0 + Duration::seconds(5)).clone();

        assert_eq!(record.count, 2);
        assert!(record.last_used >= record.first_used);
        assert_eq!(record.first_used, t0);
    }

    #[test]
    fn test_other_section_untouched() {
        let mut tracker = UsageTracker::new();
        let hook = SectionKey::new("Demo", "HOOK (0:00)");
        let act = SectionKey::new("Demo", "ATO I - A Queda");

        tracker.record(&hook);
        let before = tracker.get(&hook).cloned();
        tracker.record(&act);

        assert_eq!(tracker.get(&hook).cloned(), before);
        assert_eq!(tracker.get(&act).map(|r| r.count), Some(1));
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn test_identity_is_exact_title() {
        let mut tracker = UsageTracker::new();
        tracker.record(&SectionKey::new("Demo", "ATO I - A Queda"));

        assert!(!tracker.was_used(&SectionKey::new("Demo", "ATO I - A queda")));
        assert!(!tracker.was_used(&SectionKey::new("Outro", "ATO I - A Queda")));
    }

    #[test]
    fn test_clear_project_and_all() {
        let mut tracker = UsageTracker::new();
        tracker.record(&SectionKey::new("A", "x"));
        tracker.record(&SectionKey::new("A", "y"));
        tracker.record(&SectionKey::new("B", "z"));

        assert_eq!(tracker.clear_project("A"), 2);
        assert_eq!(tracker.clear_project("A"), 0);
        assert_eq!(tracker.clear_all(), 1);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_serialized_shape() {
        let mut tracker = UsageTracker::new();
        tracker.record(&SectionKey::new("Demo", "HOOK (0:00)"));

        let value = serde_json::to_value(&tracker).unwrap();
        let record = &value["Demo"]["HOOK (0:00)"];
        assert_eq!(record["count"], 1);
        assert!(record["firstUsed"].is_string());
        assert!(record["lastUsed"].is_string());
    }

    #[test]
    fn test_persist_and_load() {
        tokio_test::block_on(async {
            let store = SnapshotStore::new(Arc::new(MemoryStore::new()), 10_000);
            assert!(UsageTracker::load(&store).await.unwrap().is_empty());

            let mut tracker = UsageTracker::new();
            tracker.record(&SectionKey::new("Demo", "HOOK (0:00)"));
            tracker.persist(&store).await.unwrap();

            let loaded = UsageTracker::load(&store).await.unwrap();
            assert_eq!(loaded, tracker);
        });
    }
}
