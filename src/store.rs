// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PERSISTÊNCIA CHAVE-VALOR - Multi-Backend (Local/Memória)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Dois namespaces independentes:
// - `Handles`: pastas raiz salvas (tokens de acesso)
// - `Snapshots`: snapshot do workspace e histórico de uso
//
// Valores são texto JSON. Snapshots têm teto de tamanho: acima dele o save é
// recusado e o valor anterior continua intacto.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Teto padrão de um snapshot serializado (em caracteres)
pub const DEFAULT_MAX_SNAPSHOT_CHARS: usize = 5_000_000;

/// Namespace de persistência
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Pastas raiz salvas
    Handles,
    /// Snapshots do workspace e histórico
    Snapshots,
}

impl Namespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Handles => "handles",
            Namespace::Snapshots => "snapshots",
        }
    }
}

/// Erros de persistência
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("erro de I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("erro de serialização: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Snapshot acima do teto; nada foi gravado
    #[error("snapshot com {size} caracteres excede o limite de {max}")]
    CapacityExceeded { size: usize, max: usize },

    #[error("chave inválida: {0:?}")]
    InvalidKey(String),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TRAIT: KeyValueStore
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Backend de persistência chave-valor.
///
/// Implementações disponíveis:
/// - `LocalStore`: um arquivo JSON por chave
/// - `MemoryStore`: HashMap em memória (testes)
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Nome do backend
    fn name(&self) -> &'static str;

    /// Grava (ou substitui) um valor
    async fn put(&self, ns: Namespace, key: &str, value: &str) -> Result<(), StoreError>;

    /// Lê um valor
    async fn get(&self, ns: Namespace, key: &str) -> Result<Option<String>, StoreError>;

    /// Remove um valor (remover chave inexistente não é erro)
    async fn delete(&self, ns: Namespace, key: &str) -> Result<(), StoreError>;
}

fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
        && !key.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BACKEND: Local (arquivos JSON)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Backend local: `<dir>/<namespace>/<chave>.json`.
///
/// A escrita vai para um arquivo temporário e depois é renomeada,
/// então um valor nunca fica meio gravado.
#[derive(Debug, Clone)]
pub struct LocalStore {
    base_dir: PathBuf,
}

impl LocalStore {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Diretório base
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    fn path_for(&self, ns: Namespace, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(self.base_dir.join(ns.as_str()).join(format!("{}.json", key)))
    }
}

#[async_trait]
impl KeyValueStore for LocalStore {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn put(&self, ns: Namespace, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(ns, key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn get(&self, ns: Namespace, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(ns, key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, ns: Namespace, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(ns, key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BACKEND: Memória
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Backend em memória
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<(Namespace, String), String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Número de valores gravados (todos os namespaces)
    pub async fn len(&self) -> usize {
        self.values.read().await.len()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn put(&self, ns: Namespace, key: &str, value: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        self.values
            .write()
            .await
            .insert((ns, key.to_string()), value.to_string());
        Ok(())
    }

    async fn get(&self, ns: Namespace, key: &str) -> Result<Option<String>, StoreError> {
        validate_key(key)?;
        Ok(self.values.read().await.get(&(ns, key.to_string())).cloned())
    }

    async fn delete(&self, ns: Namespace, key: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        self.values.write().await.remove(&(ns, key.to_string()));
        Ok(())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SERVICE: SnapshotStore
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Camada tipada sobre o backend: JSON + teto de tamanho nos snapshots.
#[derive(Clone)]
pub struct SnapshotStore {
    backend: Arc<dyn KeyValueStore>,
    max_chars: usize,
}

impl SnapshotStore {
    pub fn new(backend: Arc<dyn KeyValueStore>, max_chars: usize) -> Self {
        Self { backend, max_chars }
    }

    /// Teto de caracteres
    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Backend subjacente
    pub fn backend(&self) -> &Arc<dyn KeyValueStore> {
        &self.backend
    }

    /// Serializa e grava no namespace `Snapshots`.
    ///
    /// Acima do teto retorna `CapacityExceeded` sem tocar no valor anterior.
    pub async fn save<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<usize, StoreError> {
        let json = serde_json::to_string(value)?;
        let size = json.chars().count();

        if size > self.max_chars {
            log::warn!(
                "⚠️  Snapshot '{}' não salvo: {} caracteres (limite {})",
                key,
                size,
                self.max_chars
            );
            return Err(StoreError::CapacityExceeded {
                size,
                max: self.max_chars,
            });
        }

        self.backend.put(Namespace::Snapshots, key, &json).await?;
        log::debug!("💾 Snapshot '{}' salvo ({} caracteres)", key, size);
        Ok(size)
    }

    /// Lê e desserializa do namespace `Snapshots`
    pub async fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.backend.get(Namespace::Snapshots, key).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Remove um snapshot
    pub async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.backend.delete(Namespace::Snapshots, key).await
    }

    /// Grava um handle de pasta
    pub async fn put_handle(&self, key: &str, path: &str) -> Result<(), StoreError> {
        self.backend.put(Namespace::Handles, key, path).await
    }

    /// Lê um handle de pasta
    pub async fn get_handle(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.backend.get(Namespace::Handles, key).await
    }

    /// Remove um handle de pasta
    pub async fn delete_handle(&self, key: &str) -> Result<(), StoreError> {
        self.backend.delete(Namespace::Handles, key).await
    }
}
