#![allow(dead_code)]

use async_trait::async_trait;
use rb_core::{Error, Record, RecordStore, Result, SourceFetcher, SourceItemDraft, TextTransformer};
use rb_ingest::sources::normalize_community;
use rb_storage::MemoryStore;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

pub fn drafts(n: usize) -> Vec<SourceItemDraft> {
    (1..=n)
        .map(|i| SourceItemDraft::new(format!("post{}", i), format!("Title {}", i), Some(format!("Body {}", i))))
        .collect()
}

/// Returns a fixed batch (or a fixed failure) and records every call.
pub struct ScriptedFetcher {
    drafts: Vec<SourceItemDraft>,
    failure: Option<fn() -> Error>,
    pub calls: Mutex<Vec<(String, u32)>>,
}

impl ScriptedFetcher {
    pub fn returning(drafts: Vec<SourceItemDraft>) -> Self {
        Self {
            drafts,
            failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(failure: fn() -> Error) -> Self {
        Self {
            drafts: Vec::new(),
            failure: Some(failure),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn limits(&self) -> Vec<u32> {
        self.calls.lock().unwrap().iter().map(|(_, n)| *n).collect()
    }
}

#[async_trait]
impl SourceFetcher for ScriptedFetcher {
    fn platform(&self) -> &str {
        "Scripted"
    }

    fn canonical_community(&self, community: &str) -> Result<String> {
        normalize_community(community).map(str::to_string)
    }

    async fn fetch(&self, community: &str, count: u32) -> Result<Vec<SourceItemDraft>> {
        self.calls.lock().unwrap().push((community.to_string(), count));
        if let Some(failure) = self.failure {
            return Err(failure());
        }
        Ok(self.drafts.iter().take(count as usize).cloned().collect())
    }
}

/// Echoes its input, optionally failing on the n-th call (1-based).
pub struct ScriptedTransformer {
    fail_on: Option<usize>,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedTransformer {
    pub fn succeeding() -> Self {
        Self {
            fail_on: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on: Some(call),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl TextTransformer for ScriptedTransformer {
    fn name(&self) -> &str {
        "Scripted"
    }

    async fn transform(&self, title: &str, body: &str) -> Result<String> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((title.to_string(), body.to_string()));
            calls.len()
        };
        if self.fail_on == Some(call) {
            return Err(Error::TransformationFailed("backend quota exhausted".to_string()));
        }
        Ok(format!("Article about {}", title))
    }
}

/// In-memory store whose saves start failing after `successes` writes.
pub struct FlakyStore<T: Record> {
    inner: MemoryStore<T>,
    successes: usize,
    saves: AtomicUsize,
}

impl<T: Record> FlakyStore<T> {
    pub fn failing_after(successes: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            successes,
            saves: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl<T: Record> RecordStore<T> for FlakyStore<T> {
    async fn save(&self, draft: T::Draft) -> Result<T> {
        if self.saves.fetch_add(1, Ordering::SeqCst) >= self.successes {
            return Err(Error::PersistenceFailed("disk full".to_string()));
        }
        self.inner.save(draft).await
    }

    async fn find_all(&self) -> Result<Vec<T>> {
        self.inner.find_all().await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<T> {
        self.inner.find_by_id(id).await
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.inner.delete(id).await
    }
}
