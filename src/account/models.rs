//! Data models for accounts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::money::Currency;

/// Stored account record.
///
/// `secret` holds the PHC-formatted hash, never the raw secret.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub cpf: String,
    pub secret: String,
    pub balance: Currency,
    pub created_at: DateTime<Utc>,
}

/// Account row to insert; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub cpf: String,
    pub secret: String,
    pub balance: Currency,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// API DTOs
// ============================================================================

/// Account registration request
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct AccountCreation {
    #[schema(example = "Jane Doe")]
    pub name: String,
    /// 11 digits, check digits included
    #[schema(example = "52998224725")]
    pub cpf: String,
    #[schema(example = "s3cr3t")]
    pub secret: String,
    /// Initial balance in major units
    #[schema(example = 1000.0)]
    pub balance: f64,
}

/// Account as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AccountView {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Jane Doe")]
    pub name: String,
    #[schema(example = "52998224725")]
    pub cpf: String,
    #[schema(example = 1000.0)]
    pub balance: f64,
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            name: account.name.clone(),
            cpf: account.cpf.clone(),
            balance: account.balance.to_decimal(),
            created_at: account.created_at,
        }
    }
}

/// Login request
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct LoginRequest {
    #[schema(example = "52998224725")]
    pub cpf: String,
    #[schema(example = "s3cr3t")]
    pub secret: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_hides_secret() {
        let account = Account {
            id: 7,
            name: "Jane Doe".to_string(),
            cpf: "52998224725".to_string(),
            secret: "$argon2id$hash".to_string(),
            balance: Currency::from_minor(99_500),
            created_at: Utc::now(),
        };
        let view = AccountView::from(&account);
        assert_eq!(view.balance, 995.0);

        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("secret").is_none());
        assert_eq!(json["cpf"], "52998224725");
    }

    #[test]
    fn test_creation_missing_fields_default() {
        let req: AccountCreation = serde_json::from_str(r#"{"name":"Jane"}"#).unwrap();
        assert_eq!(req.name, "Jane");
        assert!(req.cpf.is_empty());
        assert_eq!(req.balance, 0.0);
    }
}
