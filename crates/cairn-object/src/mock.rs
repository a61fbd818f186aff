//! Counting, failure-injecting provider for tests.
//!
//! This module is only available when the `test-utils` feature is enabled:
//!
//! ```toml
//! [dev-dependencies]
//! cairn-object = { version = "...", features = ["test-utils"] }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use cairn_object::ErrorKind;
//! use cairn_object::mock::MockProvider;
//!
//! let provider = MockProvider::new().fail_puts(ErrorKind::Transient, 2);
//! // the first two puts fail, later puts reach the in-memory bucket
//! assert_eq!(provider.stats().puts(), 0);
//! ```

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;

use crate::bucket::{BucketHandle, ObjectStoreProvider};
use crate::error::{Error, ErrorKind, Result};
use crate::providers::MemoryProvider;

/// Call counters shared by a [`MockProvider`] and the buckets it opens.
#[derive(Debug, Default)]
pub struct MockStats {
    opens: AtomicUsize,
    creates: AtomicUsize,
    closes: AtomicUsize,
    puts: AtomicUsize,
    gets: AtomicUsize,
    deletes: AtomicUsize,
}

impl MockStats {
    /// Successful and failed `open_bucket` calls.
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// `create_bucket` calls.
    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    /// `close` calls.
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// `put` calls, including injected failures.
    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    /// `get` calls.
    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    /// `delete` calls.
    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    /// Total calls of any kind.
    pub fn total(&self) -> usize {
        self.opens() + self.creates() + self.closes() + self.puts() + self.gets() + self.deletes()
    }

    fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::SeqCst);
    }
}

/// Scripted failures consumed by successive `put` calls.
#[derive(Debug, Default)]
struct FailurePlan {
    queued: VecDeque<ErrorKind>,
    always: Option<ErrorKind>,
}

impl FailurePlan {
    fn next(&mut self) -> Option<ErrorKind> {
        self.queued.pop_front().or(self.always)
    }
}

/// [`ObjectStoreProvider`] over a [`MemoryProvider`] that counts calls and
/// can fail `put`s on demand.
#[derive(Debug, Default)]
pub struct MockProvider {
    inner: MemoryProvider,
    stats: Arc<MockStats>,
    plan: Arc<Mutex<FailurePlan>>,
}

impl MockProvider {
    /// Creates a provider with no buckets and no scripted failures.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a provider with the given buckets already present.
    pub fn with_buckets<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inner: MemoryProvider::with_buckets(names),
            ..Self::default()
        }
    }

    /// Makes the next `count` puts fail with `kind`.
    pub fn fail_puts(self, kind: ErrorKind, count: usize) -> Self {
        if let Ok(mut plan) = self.plan.lock() {
            plan.queued.extend(std::iter::repeat_n(kind, count));
        }
        self
    }

    /// Makes every put fail with `kind`.
    pub fn fail_all_puts(self, kind: ErrorKind) -> Self {
        if let Ok(mut plan) = self.plan.lock() {
            plan.always = Some(kind);
        }
        self
    }

    /// Shared call counters.
    pub fn stats(&self) -> Arc<MockStats> {
        self.stats.clone()
    }

    /// The backing in-memory provider.
    pub fn inner(&self) -> &MemoryProvider {
        &self.inner
    }
}

#[async_trait::async_trait]
impl ObjectStoreProvider for MockProvider {
    fn id(&self) -> &'static str {
        "mock"
    }

    async fn open_bucket(&self, name: &str) -> Result<Box<dyn BucketHandle>> {
        MockStats::bump(&self.stats.opens);
        let inner = self.inner.open_bucket(name).await?;
        Ok(Box::new(MockBucket {
            inner,
            stats: self.stats.clone(),
            plan: self.plan.clone(),
        }))
    }

    async fn create_bucket(&self, name: &str) -> Result<()> {
        MockStats::bump(&self.stats.creates);
        self.inner.create_bucket(name).await
    }
}

/// Bucket opened by a [`MockProvider`].
struct MockBucket {
    inner: Box<dyn BucketHandle>,
    stats: Arc<MockStats>,
    plan: Arc<Mutex<FailurePlan>>,
}

#[async_trait::async_trait]
impl BucketHandle for MockBucket {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn put(&self, key: &str, data: Bytes) -> Result<()> {
        MockStats::bump(&self.stats.puts);
        let injected = self.plan.lock().ok().and_then(|mut plan| plan.next());
        if let Some(kind) = injected {
            return Err(Error::new(kind, format!("injected failure for '{key}'")));
        }
        self.inner.put(key, data).await
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        MockStats::bump(&self.stats.gets);
        self.inner.get(key).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        MockStats::bump(&self.stats.deletes);
        self.inner.delete(key).await
    }

    async fn close(&self) -> Result<()> {
        MockStats::bump(&self.stats.closes);
        self.inner.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn queued_failures_then_success() {
        let provider = MockProvider::with_buckets(["b"]).fail_puts(ErrorKind::Transient, 2);
        let bucket = provider.open_bucket("b").await.unwrap();

        assert!(bucket.put("k", Bytes::new()).await.unwrap_err().is_retryable());
        assert!(bucket.put("k", Bytes::new()).await.is_err());
        bucket.put("k", Bytes::from("v")).await.unwrap();
        bucket.close().await.unwrap();

        let stats = provider.stats();
        assert_eq!(stats.puts(), 3);
        assert_eq!(stats.opens(), 1);
        assert_eq!(stats.closes(), 1);
    }

    #[tokio::test]
    async fn always_failing_puts() {
        let provider = MockProvider::with_buckets(["b"]).fail_all_puts(ErrorKind::PermissionDenied);
        let bucket = provider.open_bucket("b").await.unwrap();

        for _ in 0..3 {
            let err = bucket.put("k", Bytes::new()).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::PermissionDenied);
        }
    }
}
