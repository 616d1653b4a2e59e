//! In-memory collaborators for decision engine tests.

#![allow(dead_code)]

use async_trait::async_trait;
use credgate_adapter_sql::{
    ConnectionError, ConnectionProvider, CredentialConnection, CredentialRow, CredentialRows,
};
use credgate_core::{ConnectionConfig, NodeConfig};
use credgate_runtime::{
    AuditSink, DecisionEngine, DecisionEvent, IdentityDirectory, IdentityRecord, OpenDirectory,
    TransformRegistry,
};
use futures::stream::{self, Stream, StreamExt};
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

/// Counts everything the engine acquires and releases.
#[derive(Default)]
pub struct Ledger {
    pub acquired: AtomicUsize,
    pub cursors_released: AtomicUsize,
    pub connections_released: AtomicUsize,
    pub rows_read: AtomicUsize,
    pub order: Mutex<Vec<&'static str>>,
}

impl Ledger {
    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn cursors_released(&self) -> usize {
        self.cursors_released.load(Ordering::SeqCst)
    }

    pub fn connections_released(&self) -> usize {
        self.connections_released.load(Ordering::SeqCst)
    }

    pub fn rows_read(&self) -> usize {
        self.rows_read.load(Ordering::SeqCst)
    }

    pub fn order(&self) -> Vec<&'static str> {
        self.order.lock().unwrap().clone()
    }
}

/// What the credential statement returns for one username.
#[derive(Clone)]
pub enum Rows {
    NoCursor,
    Values(Vec<Option<String>>),
    /// Yields the values, then a driver error.
    FailAfter(Vec<Option<String>>),
}

impl Rows {
    pub fn one(value: &str) -> Self {
        Rows::Values(vec![Some(value.to_string())])
    }
}

pub struct MockProvider {
    pub ledger: Arc<Ledger>,
    table: HashMap<String, Rows>,
    acquire_fails: bool,
    acquire_delay: Option<Duration>,
    release_fails: bool,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            ledger: Arc::new(Ledger::default()),
            table: HashMap::new(),
            acquire_fails: false,
            acquire_delay: None,
            release_fails: false,
        }
    }

    /// alice has a password, bob has no row, carol has two identical rows and
    /// dave has a NULL password.
    pub fn standard() -> Self {
        Self::new()
            .with_rows("alice", Rows::one("secret123"))
            .with_rows(
                "carol",
                Rows::Values(vec![Some("same".to_string()), Some("same".to_string())]),
            )
            .with_rows("dave", Rows::Values(vec![None]))
    }

    pub fn with_rows(mut self, username: &str, rows: Rows) -> Self {
        self.table.insert(username.to_string(), rows);
        self
    }

    pub fn failing_acquire(mut self) -> Self {
        self.acquire_fails = true;
        self
    }

    pub fn slow_acquire(mut self, delay: Duration) -> Self {
        self.acquire_delay = Some(delay);
        self
    }

    pub fn failing_release(mut self) -> Self {
        self.release_fails = true;
        self
    }
}

#[async_trait]
impl ConnectionProvider for MockProvider {
    async fn acquire(
        &self,
        _config: &ConnectionConfig,
    ) -> Result<Box<dyn CredentialConnection>, ConnectionError> {
        if let Some(delay) = self.acquire_delay {
            tokio::time::sleep(delay).await;
        }
        if self.acquire_fails {
            return Err(ConnectionError::ResourceNotFound("samplePool".to_string()));
        }
        self.ledger.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockConnection {
            ledger: self.ledger.clone(),
            table: self.table.clone(),
            release_fails: self.release_fails,
        }))
    }
}

struct MockConnection {
    ledger: Arc<Ledger>,
    table: HashMap<String, Rows>,
    release_fails: bool,
}

#[async_trait]
impl CredentialConnection for MockConnection {
    fn query<'c>(
        &'c mut self,
        _statement: &'c str,
        username: &'c str,
    ) -> Option<CredentialRows<'c>> {
        let rows = self
            .table
            .get(username)
            .cloned()
            .unwrap_or(Rows::Values(Vec::new()));
        let (values, failure) = match rows {
            Rows::NoCursor => return None,
            Rows::Values(values) => (values, None),
            Rows::FailAfter(values) => (
                values,
                Some(Err(sqlx::Error::Protocol("connection reset".to_string()))),
            ),
        };
        let rows = values
            .into_iter()
            .map(|value| Ok(Box::new(MockRow(value)) as Box<dyn CredentialRow>));
        let inner = stream::iter(rows.chain(failure)).boxed();
        Some(Box::pin(TrackedRows {
            inner,
            ledger: self.ledger.clone(),
        }))
    }

    async fn release(self: Box<Self>) -> Result<(), sqlx::Error> {
        self.ledger.connections_released.fetch_add(1, Ordering::SeqCst);
        self.ledger.order.lock().unwrap().push("connection");
        if self.release_fails {
            Err(sqlx::Error::PoolClosed)
        } else {
            Ok(())
        }
    }
}

struct MockRow(Option<String>);

impl CredentialRow for MockRow {
    fn credential(&self, _column: &str) -> Result<Option<String>, sqlx::Error> {
        Ok(self.0.clone())
    }
}

/// Row stream that records reads and its own release.
struct TrackedRows<'c> {
    inner: CredentialRows<'c>,
    ledger: Arc<Ledger>,
}

impl Stream for TrackedRows<'_> {
    type Item = Result<Box<dyn CredentialRow>, sqlx::Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let polled = self.inner.poll_next_unpin(cx);
        if let Poll::Ready(Some(_)) = &polled {
            self.ledger.rows_read.fetch_add(1, Ordering::SeqCst);
        }
        polled
    }
}

impl Drop for TrackedRows<'_> {
    fn drop(&mut self) {
        self.ledger.cursors_released.fetch_add(1, Ordering::SeqCst);
        self.ledger.order.lock().unwrap().push("cursor");
    }
}

pub struct FailingDirectory;

#[async_trait]
impl IdentityDirectory for FailingDirectory {
    async fn find(&self, _username: &str) -> anyhow::Result<Option<IdentityRecord>> {
        anyhow::bail!("directory unreachable")
    }
}

pub struct SlowDirectory(pub Duration);

#[async_trait]
impl IdentityDirectory for SlowDirectory {
    async fn find(&self, username: &str) -> anyhow::Result<Option<IdentityRecord>> {
        tokio::time::sleep(self.0).await;
        Ok(Some(IdentityRecord {
            username: username.to_string(),
            active: true,
        }))
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub events: Mutex<Vec<DecisionEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<DecisionEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl AuditSink for RecordingSink {
    fn record(&self, event: DecisionEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub type TestEngine = DecisionEngine<MockProvider, Arc<RecordingSink>>;

pub fn build_engine(
    config: NodeConfig,
    directory: Arc<dyn IdentityDirectory>,
    provider: MockProvider,
    transforms: TransformRegistry,
) -> (TestEngine, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let engine = match DecisionEngine::new(config, directory, provider, transforms, sink.clone()) {
        Ok(engine) => engine,
        Err(e) => panic!("invalid test configuration: {}", e),
    };
    (engine, sink)
}

/// Engine with default configuration, an open directory and the built-in transforms.
pub fn standard_engine(provider: MockProvider) -> (TestEngine, Arc<RecordingSink>) {
    build_engine(
        NodeConfig::default(),
        Arc::new(OpenDirectory),
        provider,
        TransformRegistry::builtin(),
    )
}
