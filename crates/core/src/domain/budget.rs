use crate::domain::despesa::Despesa;
use serde::Serialize;
use std::collections::BTreeMap;

const DEFAULT_ALERT_THRESHOLD: f64 = 5000.0;
const DEFAULT_WINDOW_LIMIT: usize = 10;

/// How wide the aggregation window is and where the alert trips.
/// The window counts records, not days (most-recent-N semantics).
#[derive(Debug, Clone, Copy)]
pub struct BudgetParams {
    pub window_limit: usize,
    pub alert_threshold: f64,
}

impl Default for BudgetParams {
    fn default() -> Self {
        Self {
            window_limit: DEFAULT_WINDOW_LIMIT,
            alert_threshold: DEFAULT_ALERT_THRESHOLD,
        }
    }
}

impl BudgetParams {
    pub fn from_env() -> Self {
        let window_limit = std::env::var("BUDGET_WINDOW_LIMIT")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|v| *v >= 1)
            .unwrap_or(DEFAULT_WINDOW_LIMIT);

        let alert_threshold = std::env::var("BUDGET_ALERT_THRESHOLD")
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v >= 0.0)
            .unwrap_or(DEFAULT_ALERT_THRESHOLD);

        Self {
            window_limit,
            alert_threshold,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetSummary {
    pub total_gastos: f64,
    pub gastos_por_categoria: BTreeMap<String, f64>,
    pub alerta: bool,
    pub media_diaria: f64,
}

/// Sums the first `window_limit` records of `despesas` (callers hand the
/// slice most-recent-first, so this is the N most recent) grouped by
/// categoria. Pure projection: no stored state, no time filtering.
pub fn aggregate(despesas: &[Despesa], params: &BudgetParams) -> BudgetSummary {
    let mut gastos_por_categoria = BTreeMap::<String, f64>::new();
    let mut total_gastos = 0.0;

    for despesa in despesas.iter().take(params.window_limit) {
        *gastos_por_categoria
            .entry(despesa.categoria.clone())
            .or_insert(0.0) += despesa.valor;
        total_gastos += despesa.valor;
    }

    BudgetSummary {
        total_gastos,
        gastos_por_categoria,
        alerta: total_gastos > params.alert_threshold,
        media_diaria: total_gastos / 30.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn despesa(id: i64, categoria: &str, valor: f64) -> Despesa {
        Despesa {
            id,
            descricao: format!("despesa {id}"),
            valor,
            categoria: categoria.to_string(),
            criado_em: Utc::now(),
        }
    }

    #[test]
    fn groups_by_categoria() {
        let records = [
            despesa(1, "A", 100.0),
            despesa(2, "B", 50.0),
            despesa(3, "A", 25.0),
        ];

        let summary = aggregate(&records, &BudgetParams::default());
        assert_eq!(summary.total_gastos, 175.0);
        assert_eq!(summary.gastos_por_categoria.get("A"), Some(&125.0));
        assert_eq!(summary.gastos_por_categoria.get("B"), Some(&50.0));
        assert!(!summary.alerta);
        assert!((summary.media_diaria - 175.0 / 30.0).abs() < 1e-12);
    }

    #[test]
    fn empty_ledger_yields_zeroes() {
        let summary = aggregate(&[], &BudgetParams::default());
        assert_eq!(summary.total_gastos, 0.0);
        assert!(summary.gastos_por_categoria.is_empty());
        assert!(!summary.alerta);
    }

    #[test]
    fn window_limit_caps_the_records_considered() {
        let records: Vec<Despesa> = (1..=5).map(|i| despesa(i, "A", 10.0)).collect();
        let params = BudgetParams {
            window_limit: 3,
            ..BudgetParams::default()
        };
        let summary = aggregate(&records, &params);
        assert_eq!(summary.total_gastos, 30.0);
    }

    #[test]
    fn alert_trips_strictly_above_threshold() {
        let at_threshold = [despesa(1, "A", 4000.0), despesa(2, "B", 1000.0)];
        let summary = aggregate(&at_threshold, &BudgetParams::default());
        assert_eq!(summary.total_gastos, 5000.0);
        assert!(!summary.alerta);

        let above = [despesa(1, "A", 4000.0), despesa(2, "B", 1000.01)];
        let summary = aggregate(&above, &BudgetParams::default());
        assert!(summary.total_gastos > 5000.0);
        assert!(summary.alerta);
    }
}
