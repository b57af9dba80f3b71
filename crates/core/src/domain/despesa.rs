use anyhow::ensure;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One expense record. Append-only: never updated or deleted in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Despesa {
    pub id: i64,
    pub descricao: String,
    pub valor: f64,
    pub categoria: String,
    pub criado_em: DateTime<Utc>,
}

/// Incoming `POST /despesas` body, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct NewDespesa {
    pub descricao: String,
    pub valor: f64,
    pub categoria: String,
}

/// A `NewDespesa` that passed validation; the only way to get into the ledger.
#[derive(Debug, Clone)]
pub struct ValidatedDespesa {
    pub descricao: String,
    pub valor: f64,
    pub categoria: String,
}

impl NewDespesa {
    pub fn validate(self) -> anyhow::Result<ValidatedDespesa> {
        let descricao = self.descricao.trim().to_string();
        ensure!(!descricao.is_empty(), "descricao must be non-empty");

        let categoria = self.categoria.trim().to_string();
        ensure!(!categoria.is_empty(), "categoria must be non-empty");

        ensure!(
            self.valor.is_finite() && self.valor >= 0.0,
            "valor must be a non-negative number (got {})",
            self.valor
        );

        Ok(ValidatedDespesa {
            descricao,
            valor: self.valor,
            categoria,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_well_formed_body() {
        let body: NewDespesa = serde_json::from_value(json!({
            "descricao": "Supermercado",
            "valor": 847.50,
            "categoria": "Alimentação"
        }))
        .unwrap();

        let valid = body.validate().unwrap();
        assert_eq!(valid.descricao, "Supermercado");
        assert_eq!(valid.valor, 847.50);
        assert_eq!(valid.categoria, "Alimentação");
    }

    #[test]
    fn trims_whitespace() {
        let body = NewDespesa {
            descricao: "  Gasolina ".to_string(),
            valor: 245.0,
            categoria: " Transporte".to_string(),
        };
        let valid = body.validate().unwrap();
        assert_eq!(valid.descricao, "Gasolina");
        assert_eq!(valid.categoria, "Transporte");
    }

    #[test]
    fn rejects_empty_descricao() {
        let body = NewDespesa {
            descricao: "   ".to_string(),
            valor: 10.0,
            categoria: "Lazer".to_string(),
        };
        assert!(body.validate().is_err());
    }

    #[test]
    fn rejects_negative_and_non_finite_valor() {
        for valor in [-1.0, f64::NAN, f64::INFINITY] {
            let body = NewDespesa {
                descricao: "Teste".to_string(),
                valor,
                categoria: "Geral".to_string(),
            };
            assert!(body.validate().is_err(), "valor {valor} should be rejected");
        }
    }

    #[test]
    fn rejects_missing_fields_at_deserialization() {
        let res = serde_json::from_value::<NewDespesa>(json!({"descricao": "Netflix"}));
        assert!(res.is_err());
    }

    #[test]
    fn rejects_non_numeric_valor_at_deserialization() {
        let res = serde_json::from_value::<NewDespesa>(json!({
            "descricao": "Netflix",
            "valor": "55.90",
            "categoria": "Lazer"
        }));
        assert!(res.is_err());
    }
}
