//! Relational data store contract.

use crate::PlatformResult;
use async_trait::async_trait;
use serde_json::Value;

/// Sort order for a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// Row filter: equality predicates, optional ordering and limit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub eq: Vec<(String, String)>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for `Filter::new().eq("id", id)`.
    pub fn by_id(id: impl ToString) -> Self {
        Self::new().eq("id", id)
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl ToString) -> Self {
        self.eq.push((column.into(), value.to_string()));
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.into(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Query-string pairs in the platform's REST dialect.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .eq
            .iter()
            .map(|(column, value)| (column.clone(), format!("eq.{value}")))
            .collect();
        if let Some(order) = &self.order {
            let direction = if order.ascending { "asc" } else { "desc" };
            pairs.push(("order".to_string(), format!("{}.{direction}", order.column)));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        pairs
    }
}

/// Row-level access to the hosted relational store. Rows travel as JSON
/// objects; typed repositories deserialize them.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// All rows matching `filter`.
    async fn select(&self, table: &str, filter: &Filter) -> PlatformResult<Vec<Value>>;

    /// Exactly one row. Fails with [`crate::PlatformError::NoRows`] when
    /// nothing matches.
    async fn select_single(&self, table: &str, filter: &Filter) -> PlatformResult<Value>;

    /// Insert one row and return it as stored.
    async fn insert(&self, table: &str, row: Value) -> PlatformResult<Value>;

    /// Patch the single row matching `filter` and return it as stored.
    async fn update(&self, table: &str, filter: &Filter, patch: Value) -> PlatformResult<Value>;

    /// Delete every row matching `filter`.
    async fn delete(&self, table: &str, filter: &Filter) -> PlatformResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_pairs_use_rest_dialect() {
        let filter = Filter::new()
            .eq("is_featured", true)
            .order_by("created_at", false)
            .limit(3);

        assert_eq!(
            filter.query_pairs(),
            vec![
                ("is_featured".to_string(), "eq.true".to_string()),
                ("order".to_string(), "created_at.desc".to_string()),
                ("limit".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn by_id_is_a_single_eq() {
        assert_eq!(
            Filter::by_id("u-1").query_pairs(),
            vec![("id".to_string(), "eq.u-1".to_string())]
        );
    }
}
