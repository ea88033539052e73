//! In-memory relational store.

use super::Behavior;
use crate::{DataStore, Filter, PlatformError, PlatformResult};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Default)]
struct State {
    tables: HashMap<String, Vec<Map<String, Value>>>,
    behaviors: HashMap<String, Behavior>,
    next_insert: HashMap<String, Behavior>,
    inserts: HashMap<String, usize>,
    selects: HashMap<String, usize>,
}

/// [`DataStore`] holding tables as vectors of JSON objects.
///
/// Inserted rows get an `id` (uuid v4) and `created_at` when absent, and
/// `id` is unique per table.
#[derive(Default)]
pub struct MemoryDataStore {
    state: Mutex<State>,
}

impl MemoryDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a row without counting it as an insert.
    pub fn seed(&self, table: &str, row: Value) {
        if let Value::Object(row) = row {
            self.state
                .lock()
                .tables
                .entry(table.to_string())
                .or_default()
                .push(row);
        }
    }

    /// Script how the next calls against `table` behave.
    pub fn set_behavior(&self, table: &str, behavior: Behavior) {
        self.state
            .lock()
            .behaviors
            .insert(table.to_string(), behavior);
    }

    /// Script only the next insert into `table`; selects are unaffected.
    pub fn set_next_insert(&self, table: &str, behavior: Behavior) {
        self.state
            .lock()
            .next_insert
            .insert(table.to_string(), behavior);
    }

    /// Successful and failed insert attempts on `table`.
    pub fn insert_count(&self, table: &str) -> usize {
        self.state.lock().inserts.get(table).copied().unwrap_or(0)
    }

    /// Select calls (single or not) on `table`.
    pub fn select_count(&self, table: &str) -> usize {
        self.state.lock().selects.get(table).copied().unwrap_or(0)
    }

    /// Snapshot of every row in `table`.
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.state
            .lock()
            .tables
            .get(table)
            .map(|rows| rows.iter().cloned().map(Value::Object).collect())
            .unwrap_or_default()
    }

    fn behavior(&self, table: &str) -> Behavior {
        self.state
            .lock()
            .behaviors
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    fn matching(&self, table: &str, filter: &Filter) -> Vec<Value> {
        let state = self.state.lock();
        let mut rows: Vec<&Map<String, Value>> = state
            .tables
            .get(table)
            .map(|rows| rows.iter().filter(|row| matches(row, filter)).collect())
            .unwrap_or_default();

        if let Some(order) = &filter.order {
            rows.sort_by(|a, b| {
                let ordering = compare(a.get(&order.column), b.get(&order.column));
                if order.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }
        if let Some(limit) = filter.limit {
            rows.truncate(limit);
        }
        rows.into_iter().cloned().map(Value::Object).collect()
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn matches(row: &Map<String, Value>, filter: &Filter) -> bool {
    filter.eq.iter().all(|(column, expected)| {
        row.get(column)
            .map(|value| as_text(value) == *expected)
            .unwrap_or(false)
    })
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(a), Some(b)) => as_text(a).cmp(&as_text(b)),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

#[async_trait]
impl DataStore for MemoryDataStore {
    async fn select(&self, table: &str, filter: &Filter) -> PlatformResult<Vec<Value>> {
        *self.state.lock().selects.entry(table.to_string()).or_default() += 1;
        self.behavior(table).apply().await?;
        Ok(self.matching(table, filter))
    }

    async fn select_single(&self, table: &str, filter: &Filter) -> PlatformResult<Value> {
        *self.state.lock().selects.entry(table.to_string()).or_default() += 1;
        self.behavior(table).apply().await?;
        let mut rows = self.matching(table, filter);
        match rows.len() {
            0 => Err(PlatformError::NoRows),
            1 => Ok(rows.remove(0)),
            n => Err(PlatformError::Api {
                status: 406,
                code: None,
                message: format!("JSON object requested, {n} rows returned"),
            }),
        }
    }

    async fn insert(&self, table: &str, row: Value) -> PlatformResult<Value> {
        let scripted = {
            let mut state = self.state.lock();
            *state.inserts.entry(table.to_string()).or_default() += 1;
            state.next_insert.remove(table)
        };
        match scripted {
            Some(behavior) => behavior.apply().await?,
            None => self.behavior(table).apply().await?,
        }

        let Value::Object(mut row) = row else {
            return Err(PlatformError::Api {
                status: 400,
                code: None,
                message: "row must be a JSON object".to_string(),
            });
        };
        row.entry("id")
            .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
        row.entry("created_at")
            .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));

        let mut state = self.state.lock();
        let rows = state.tables.entry(table.to_string()).or_default();
        let id = row.get("id").map(as_text);
        if rows.iter().any(|existing| existing.get("id").map(as_text) == id) {
            return Err(PlatformError::Conflict(format!(
                "duplicate key value violates unique constraint \"{table}_pkey\""
            )));
        }
        rows.push(row.clone());
        Ok(Value::Object(row))
    }

    async fn update(&self, table: &str, filter: &Filter, patch: Value) -> PlatformResult<Value> {
        self.behavior(table).apply().await?;
        let Value::Object(patch) = patch else {
            return Err(PlatformError::Api {
                status: 400,
                code: None,
                message: "patch must be a JSON object".to_string(),
            });
        };

        let mut state = self.state.lock();
        let rows = state.tables.entry(table.to_string()).or_default();
        let mut matched = rows.iter_mut().filter(|row| matches(row, filter));
        let Some(row) = matched.next() else {
            return Err(PlatformError::NoRows);
        };
        for (key, value) in patch {
            row.insert(key, value);
        }
        Ok(Value::Object(row.clone()))
    }

    async fn delete(&self, table: &str, filter: &Filter) -> PlatformResult<()> {
        self.behavior(table).apply().await?;
        let mut state = self.state.lock();
        if let Some(rows) = state.tables.get_mut(table) {
            rows.retain(|row| !matches(row, filter));
        }
        Ok(())
    }
}
