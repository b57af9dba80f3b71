use crate::domain::despesa::{Despesa, ValidatedDespesa};
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Process-wide append-only expense store, scoped per user id.
///
/// All access goes through one async mutex so concurrent requests cannot
/// lose appends or observe torn reads. Ids are assigned under the lock and
/// increase monotonically per user.
#[derive(Debug, Default)]
pub struct ExpenseLedger {
    inner: Mutex<HashMap<i64, UserLedger>>,
}

#[derive(Debug, Default)]
struct UserLedger {
    next_id: i64,
    // Oldest first; listing walks it in reverse.
    despesas: Vec<Despesa>,
}

impl ExpenseLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a validated expense, assigning the next id for this user.
    pub async fn add(&self, user_id: i64, nova: ValidatedDespesa) -> Despesa {
        let mut inner = self.inner.lock().await;
        let user = inner.entry(user_id).or_default();

        user.next_id += 1;
        let despesa = Despesa {
            id: user.next_id,
            descricao: nova.descricao,
            valor: nova.valor,
            categoria: nova.categoria,
            criado_em: Utc::now(),
        };
        user.despesas.push(despesa.clone());
        despesa
    }

    /// Up to `limit` records, most recently added first.
    pub async fn list(&self, user_id: i64, limit: usize) -> Vec<Despesa> {
        let inner = self.inner.lock().await;
        match inner.get(&user_id) {
            Some(user) => user.despesas.iter().rev().take(limit).cloned().collect(),
            None => Vec::new(),
        }
    }

    pub async fn len(&self, user_id: i64) -> usize {
        let inner = self.inner.lock().await;
        inner.get(&user_id).map_or(0, |u| u.despesas.len())
    }

    pub async fn is_empty(&self, user_id: i64) -> bool {
        self.len(user_id).await == 0
    }

    /// Replaces this user's records with rows loaded from storage.
    /// `despesas` must be ordered oldest-first by id.
    pub async fn restore(&self, user_id: i64, despesas: Vec<Despesa>) {
        let next_id = despesas.iter().map(|d| d.id).max().unwrap_or(0);
        let mut inner = self.inner.lock().await;
        inner.insert(user_id, UserLedger { next_id, despesas });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::despesa::ValidatedDespesa;
    use std::sync::Arc;

    fn nova(descricao: &str, valor: f64) -> ValidatedDespesa {
        ValidatedDespesa {
            descricao: descricao.to_string(),
            valor,
            categoria: "Geral".to_string(),
        }
    }

    #[tokio::test]
    async fn add_assigns_monotonic_ids_and_grows_by_one() {
        let ledger = ExpenseLedger::new();
        assert!(ledger.is_empty(1).await);

        let a = ledger.add(1, nova("Supermercado", 847.50)).await;
        let b = ledger.add(1, nova("Netflix", 55.90)).await;
        assert_eq!(ledger.len(1).await, 2);
        assert!(b.id > a.id);
    }

    #[tokio::test]
    async fn list_is_most_recent_first_and_capped() {
        let ledger = ExpenseLedger::new();
        for i in 1..=5 {
            ledger.add(1, nova(&format!("despesa {i}"), i as f64)).await;
        }

        let listed = ledger.list(1, 3).await;
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0].valor, 5.0);
        assert_eq!(listed[1].valor, 4.0);
        assert_eq!(listed[2].valor, 3.0);
    }

    #[tokio::test]
    async fn users_do_not_share_ids_or_records() {
        let ledger = ExpenseLedger::new();
        ledger.add(1, nova("a", 1.0)).await;
        let other = ledger.add(2, nova("b", 2.0)).await;

        assert_eq!(other.id, 1);
        assert_eq!(ledger.len(1).await, 1);
        assert_eq!(ledger.len(2).await, 1);
    }

    #[tokio::test]
    async fn restore_continues_id_sequence() {
        let ledger = ExpenseLedger::new();
        ledger.add(1, nova("seed", 1.0)).await;
        let rows = ledger.list(1, 10).await;
        let rows: Vec<_> = rows.into_iter().rev().collect();

        let restored = ExpenseLedger::new();
        restored.restore(1, rows).await;
        let next = restored.add(1, nova("after restore", 2.0)).await;
        assert_eq!(next.id, 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_lose_nothing() {
        let ledger = Arc::new(ExpenseLedger::new());
        let n = 64;

        let mut handles = Vec::with_capacity(n);
        for i in 0..n {
            let ledger = Arc::clone(&ledger);
            handles.push(tokio::spawn(async move {
                ledger.add(1, nova(&format!("parallel {i}"), 1.0)).await.id
            }));
        }

        let mut ids = Vec::with_capacity(n);
        for handle in handles {
            ids.push(handle.await.unwrap());
        }

        assert_eq!(ledger.len(1).await, n);
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), n, "ids must be distinct");
    }
}
