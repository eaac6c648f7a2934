use async_trait::async_trait;
use connectors::{
    factory::ConnectionFactory,
    sql::base::{
        connection::WarehouseConnection,
        error::{ConnectorError, DbError},
    },
};
use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

#[derive(Debug, Default)]
struct WarehouseState {
    executed: Vec<String>,
    fail_on: Vec<String>,
    drop_on: Vec<String>,
    panic_on: Vec<String>,
    delay: Duration,
    active: usize,
    peak: usize,
}

/// In-memory stand-in for the warehouse, shared by every connection the
/// mock factory hands out.
#[derive(Debug, Clone, Default)]
pub struct MockWarehouse {
    state: Arc<Mutex<WarehouseState>>,
}

impl MockWarehouse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Statements starting with `prefix` are rejected.
    pub fn fail_on(self, prefix: &str) -> Self {
        self.state.lock().unwrap().fail_on.push(prefix.to_string());
        self
    }

    /// Statements starting with `prefix` lose the session mid-flight.
    pub fn drop_on(self, prefix: &str) -> Self {
        self.state.lock().unwrap().drop_on.push(prefix.to_string());
        self
    }

    /// Statements starting with `prefix` panic the executing task.
    pub fn panic_on(self, prefix: &str) -> Self {
        self.state.lock().unwrap().panic_on.push(prefix.to_string());
        self
    }

    /// Every statement takes this long to complete.
    pub fn with_delay(self, delay: Duration) -> Self {
        self.state.lock().unwrap().delay = delay;
        self
    }

    pub fn executed(&self) -> Vec<String> {
        self.state.lock().unwrap().executed.clone()
    }

    /// Highest number of connections open at the same time.
    pub fn peak_connections(&self) -> usize {
        self.state.lock().unwrap().peak
    }

    pub fn active_connections(&self) -> usize {
        self.state.lock().unwrap().active
    }

    fn connect(&self) -> MockConnection {
        let mut state = self.state.lock().unwrap();
        state.active += 1;
        state.peak = state.peak.max(state.active);
        MockConnection {
            warehouse: self.clone(),
        }
    }
}

pub struct MockConnection {
    warehouse: MockWarehouse,
}

#[async_trait]
impl WarehouseConnection for MockConnection {
    async fn execute(&mut self, sql: &str) -> Result<(), DbError> {
        let delay = self.warehouse.state.lock().unwrap().delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.warehouse.state.lock().unwrap();
        state.executed.push(sql.to_string());

        if state.panic_on.iter().any(|p| sql.starts_with(p.as_str())) {
            drop(state);
            panic!("worker blew up on {sql}");
        }

        if state.drop_on.iter().any(|p| sql.starts_with(p.as_str())) {
            return Err(DbError::Closed(format!("session lost during: {sql}")));
        }

        if state.fail_on.iter().any(|p| sql.starts_with(p.as_str())) {
            return Err(DbError::Unknown(format!("rejected: {sql}")));
        }

        Ok(())
    }
}

impl Drop for MockConnection {
    fn drop(&mut self) {
        if let Ok(mut state) = self.warehouse.state.lock() {
            state.active -= 1;
        }
    }
}

pub struct MockFactory {
    warehouse: MockWarehouse,
    attempts: AtomicUsize,
    refuse_after: Option<usize>,
}

impl MockFactory {
    pub fn new(warehouse: MockWarehouse) -> Self {
        Self {
            warehouse,
            attempts: AtomicUsize::new(0),
            refuse_after: None,
        }
    }

    pub fn refuse_connections(self) -> Self {
        self.refuse_after(0)
    }

    /// Hands out `count` connections, then refuses every further attempt.
    pub fn refuse_after(mut self, count: usize) -> Self {
        self.refuse_after = Some(count);
        self
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConnectionFactory for MockFactory {
    async fn open(&self) -> Result<Box<dyn WarehouseConnection>, ConnectorError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.refuse_after.is_some_and(|limit| attempt >= limit) {
            return Err(ConnectorError::Other("connection refused".into()));
        }

        Ok(Box::new(self.warehouse.connect()))
    }

    fn endpoint(&self) -> String {
        "mock:5439/dev".into()
    }
}
