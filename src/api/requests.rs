use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::AccountType;

/// `POST /accounts` body (spec.md §6).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub currency: String,
    pub account_type: AccountType,
}

/// `POST /transfers` body (spec.md §6).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub from_account_id: Uuid,
    pub to_account_id: Uuid,
    pub amount: Decimal,
    pub reference_id: Option<String>,
    pub description: Option<String>,
}

/// `POST /accounts/{id}/deposit` body (SPEC_FULL.md §6.1).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositRequest {
    pub amount: Decimal,
    pub reference_id: Option<String>,
    pub description: Option<String>,
}

/// Query parameters for `GET /reports/accounts/{id}/ledger`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerQuery {
    pub page_size: Option<i64>,
    pub page_number: Option<i64>,
}

/// Query parameters for `GET /reports/accounts/{id}/statement`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementQuery {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// Query parameters for `GET /accounts/{id}/transactions`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ListTransactionsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn transfer_request_deserializes_camel_case_fields() {
        let json = r#"{
            "fromAccountId": "00000000-0000-0000-0000-000000000001",
            "toAccountId": "00000000-0000-0000-0000-000000000002",
            "amount": "10.00",
            "referenceId": "r1",
            "description": null
        }"#;
        let req: TransferRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.amount, dec!(10.00));
        assert_eq!(req.reference_id.as_deref(), Some("r1"));
        assert!(req.description.is_none());
    }

    #[test]
    fn create_account_request_deserializes_account_type() {
        let json = r#"{"currency":"EUR","accountType":"MAIN"}"#;
        let req: CreateAccountRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.currency, "EUR");
        assert_eq!(req.account_type, AccountType::Main);
    }
}
