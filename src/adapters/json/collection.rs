use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::error::{JsonStoreError, Result};

/// JSONコレクションに格納できるレコード
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    fn record_id(&self) -> u32;
}

/// ファイル上の表現
#[derive(Deserialize)]
struct Snapshot<T> {
    next_id: u32,
    records: Vec<T>,
}

#[derive(Serialize)]
struct SnapshotRef<'a, T> {
    next_id: u32,
    records: &'a [T],
}

/// 読み込み時に受け付ける形式
///
/// 採番カウンタを持たない配列だけのファイルも読める。
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredCollection<T> {
    Snapshot(Snapshot<T>),
    Records(Vec<T>),
}

struct State<T> {
    next_id: u32,
    records: Vec<T>,
}

/// JSONファイルを裏に持つ順序付きコレクション
///
/// 変更はメモリ上で行い、`commit` でファイル全体を書き出す。
/// ロックは `.await` をまたいで保持しない。
pub struct JsonCollection<T> {
    path: PathBuf,
    state: Mutex<State<T>>,
    /// 一時ファイルへの書き込みからリネームまでを直列化する
    commit_lock: tokio::sync::Mutex<()>,
}

impl<T: Record> JsonCollection<T> {
    /// ファイルを読み込む。存在しなければ空のコレクションを作成して書き出す。
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let (state, existed) = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let stored: StoredCollection<T> =
                    serde_json::from_slice(&bytes).map_err(|source| {
                        JsonStoreError::Serialization {
                            path: path.clone(),
                            source,
                        }
                    })?;
                (restore(stored, &path)?, true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => (
                State {
                    next_id: 1,
                    records: Vec::new(),
                },
                false,
            ),
            Err(source) => return Err(JsonStoreError::Io { path, source }),
        };

        tracing::debug!(
            path = %path.display(),
            records = state.records.len(),
            next_id = state.next_id,
            "Opened JSON collection"
        );

        let collection = Self {
            path,
            state: Mutex::new(state),
            commit_lock: tokio::sync::Mutex::new(()),
        };

        if !existed {
            collection.commit().await?;
        }

        Ok(collection)
    }

    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn all(&self) -> Vec<T> {
        self.lock().records.clone()
    }

    pub fn find(&self, id: u32) -> Option<T> {
        self.lock()
            .records
            .iter()
            .find(|r| r.record_id() == id)
            .cloned()
    }

    pub fn filter(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        self.lock()
            .records
            .iter()
            .filter(|r| predicate(r))
            .cloned()
            .collect()
    }

    /// 採番カウンタを進めてIDを払い出す
    pub fn allocate_id(&self) -> Result<u32> {
        let mut state = self.lock();
        let id = state.next_id;
        state.next_id = self.successor(id)?;
        Ok(id)
    }

    /// 末尾に追加する。カウンタは追加されたIDより大きく保つ。
    pub fn insert(&self, record: T) -> Result<()> {
        let mut state = self.lock();
        let id = record.record_id();
        if id >= state.next_id {
            state.next_id = self.successor(id)?;
        }
        state.records.push(record);
        Ok(())
    }

    fn successor(&self, id: u32) -> Result<u32> {
        id.checked_add(1).ok_or_else(|| JsonStoreError::IdSpaceExhausted {
            path: self.path.clone(),
        })
    }

    /// 同じIDのレコードを同じ位置で置き換える
    pub fn replace(&self, record: T) -> bool {
        let mut state = self.lock();
        match state
            .records
            .iter_mut()
            .find(|r| r.record_id() == record.record_id())
        {
            Some(existing) => {
                *existing = record;
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, id: u32) -> bool {
        let mut state = self.lock();
        match state.records.iter().position(|r| r.record_id() == id) {
            Some(index) => {
                state.records.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: u32) -> bool {
        self.lock().records.iter().any(|r| r.record_id() == id)
    }

    /// コレクション全体をファイルに書き出す
    ///
    /// 一時ファイルに書いてから置き換えるため、1回の呼び出しは全か無か。
    pub async fn commit(&self) -> Result<()> {
        let _commit = self.commit_lock.lock().await;

        let json = {
            let state = self.lock();
            let snapshot = SnapshotRef {
                next_id: state.next_id,
                records: &state.records,
            };
            serde_json::to_vec_pretty(&snapshot).map_err(|source| {
                JsonStoreError::Serialization {
                    path: self.path.clone(),
                    source,
                }
            })?
        };

        let io_error = |source: std::io::Error| JsonStoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await.map_err(io_error)?;
        }

        let mut tmp_path = self.path.clone().into_os_string();
        tmp_path.push(".tmp");
        tokio::fs::write(&tmp_path, json).await.map_err(io_error)?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(io_error)?;

        tracing::debug!(path = %self.path.display(), "Committed JSON collection");
        Ok(())
    }
}

/// 保存された採番値が記録済みIDより小さい場合は引き上げる
fn restore<T: Record>(stored: StoredCollection<T>, path: &Path) -> Result<State<T>> {
    let (persisted_next_id, records) = match stored {
        StoredCollection::Snapshot(snapshot) => (snapshot.next_id, snapshot.records),
        StoredCollection::Records(records) => (1, records),
    };

    let after_max = match records.iter().map(Record::record_id).max() {
        Some(max) => max
            .checked_add(1)
            .ok_or_else(|| JsonStoreError::IdSpaceExhausted {
                path: path.to_path_buf(),
            })?,
        None => 1,
    };

    Ok(State {
        next_id: persisted_next_id.max(after_max),
        records,
    })
}
