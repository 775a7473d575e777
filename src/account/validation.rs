//! Input validation for account registration and login
//!
//! Field checks return the first failing rule as an [`AppError`]; storage
//! dependent checks (cpf uniqueness) live in the account service.

use std::fmt;

use super::models::AccountCreation;
use crate::error::{AppError, AppResult};
use crate::money::Currency;

pub const NAME_MAX_CHARS: usize = 255;
pub const SECRET_MAX_CHARS: usize = 50;
pub const CPF_DIGITS: usize = 11;

// ============================================================================
// Cpf - Validated national identifier (Private Field)
// ============================================================================

/// Validated cpf: 11 ASCII digits, not all identical, with valid check digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cpf(String);

impl Cpf {
    /// # Validation Rules
    /// - Required
    /// - Exactly 11 digits
    /// - Not every digit the same
    /// - Digits 10 and 11 match the mod-11 check digits of the first nine
    pub fn parse(raw: &str) -> AppResult<Self> {
        const FIELD: &str = "cpf";

        if raw.is_empty() {
            return Err(AppError::required(FIELD));
        }
        if raw.len() != CPF_DIGITS || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AppError::invalid_format(FIELD));
        }

        let digits: Vec<u32> = raw.bytes().map(|b| u32::from(b - b'0')).collect();
        if digits.iter().all(|d| *d == digits[0]) {
            return Err(AppError::invalid_format(FIELD));
        }

        let first = check_digit(&digits[..9], 10);
        let second = check_digit(&digits[..10], 11);
        if digits[9] != first || digits[10] != second {
            return Err(AppError::invalid_format(FIELD));
        }

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Cpf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Weighted mod-11 check digit, weights descending from `top_weight` to 2.
fn check_digit(digits: &[u32], top_weight: u32) -> u32 {
    let sum: u32 = digits
        .iter()
        .zip((2..=top_weight).rev())
        .map(|(d, w)| d * w)
        .sum();
    match sum % 11 {
        r if r < 2 => 0,
        r => 11 - r,
    }
}

// ============================================================================
// Field rules
// ============================================================================

pub fn validate_name(name: &str) -> AppResult<()> {
    const FIELD: &str = "name";

    if name.is_empty() {
        return Err(AppError::required(FIELD));
    }
    if name.chars().count() > NAME_MAX_CHARS {
        return Err(AppError::max_size(FIELD, NAME_MAX_CHARS));
    }
    if name.trim() != name {
        return Err(AppError::trailing_whitespace(FIELD));
    }
    Ok(())
}

pub fn validate_secret(secret: &str) -> AppResult<()> {
    const FIELD: &str = "secret";

    if secret.is_empty() {
        return Err(AppError::required(FIELD));
    }
    if secret.chars().count() > SECRET_MAX_CHARS {
        return Err(AppError::max_size(FIELD, SECRET_MAX_CHARS));
    }
    Ok(())
}

/// Registration input that passed every field rule.
#[derive(Debug, Clone)]
pub struct ValidatedAccount {
    pub name: String,
    pub cpf: Cpf,
    pub secret: String,
    pub balance: Currency,
}

/// Field rules in order: name, cpf, secret, balance.
pub fn validate_creation(req: &AccountCreation) -> AppResult<ValidatedAccount> {
    validate_name(&req.name)?;
    let cpf = Cpf::parse(&req.cpf)?;
    validate_secret(&req.secret)?;

    if req.balance < 0.0 {
        return Err(AppError::greater_or_equal("balance", 0));
    }
    let balance =
        Currency::try_from_decimal(req.balance).ok_or_else(|| AppError::out_of_range("balance"))?;
    if balance.is_negative() {
        return Err(AppError::greater_or_equal("balance", 0));
    }

    Ok(ValidatedAccount {
        name: req.name.clone(),
        cpf,
        secret: req.secret.clone(),
        balance,
    })
}

/// Login needs a well-formed cpf and a non-empty secret.
pub fn validate_login(cpf: &str, secret: &str) -> AppResult<Cpf> {
    let cpf = Cpf::parse(cpf)?;
    if secret.is_empty() {
        return Err(AppError::required("secret"));
    }
    Ok(cpf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn creation(name: &str, cpf: &str, secret: &str, balance: f64) -> AccountCreation {
        AccountCreation {
            name: name.to_string(),
            cpf: cpf.to_string(),
            secret: secret.to_string(),
            balance,
        }
    }

    #[test]
    fn test_cpf_valid() {
        for raw in ["52998224725", "11144477735", "39053344705"] {
            let cpf = Cpf::parse(raw).unwrap();
            assert_eq!(cpf.as_str(), raw);
        }
    }

    #[test]
    fn test_cpf_rejections() {
        assert_eq!(
            Cpf::parse("").unwrap_err().message(),
            "field 'cpf' is required"
        );
        for raw in [
            "5299822472",   // 10 digits
            "529982247250", // 12 digits
            "529.982.247-25",
            "5299822472a",
            "11111111111",  // repeated digits pass the checksum
            "52998224726",  // wrong second check digit
            "52998224715",  // wrong first check digit
        ] {
            let err = Cpf::parse(raw).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation, "{raw}");
            assert_eq!(err.message(), "field 'cpf' has an invalid format", "{raw}");
        }
    }

    #[test]
    fn test_name_rules() {
        assert_eq!(
            validate_name("").unwrap_err().message(),
            "field 'name' is required"
        );
        assert_eq!(
            validate_name(&"a".repeat(256)).unwrap_err().message(),
            "field 'name' must have at most 255 characters"
        );
        assert!(validate_name(&"a".repeat(255)).is_ok());
        assert_eq!(
            validate_name(" Jane").unwrap_err().message(),
            "field 'name' can't have trailing whitespace"
        );
        assert!(validate_name("Jane").is_ok());
        assert!(validate_name("Jane Doe").is_ok());
    }

    #[test]
    fn test_secret_rules() {
        assert_eq!(
            validate_secret("").unwrap_err().message(),
            "field 'secret' is required"
        );
        assert_eq!(
            validate_secret(&"x".repeat(51)).unwrap_err().message(),
            "field 'secret' must have at most 50 characters"
        );
        assert!(validate_secret(&"x".repeat(50)).is_ok());
    }

    #[test]
    fn test_creation_order_and_balance() {
        // name is checked before cpf
        let err = validate_creation(&creation("", "bad", "", -1.0)).unwrap_err();
        assert_eq!(err.message(), "field 'name' is required");

        let err = validate_creation(&creation("Jane", "52998224725", "s", -0.01)).unwrap_err();
        assert_eq!(
            err.message(),
            "field 'balance' must be greater than or equal to 0"
        );

        let err = validate_creation(&creation("Jane", "52998224725", "s", 1e17)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.message(), "field 'balance' is out of range");

        let ok = validate_creation(&creation("Jane", "52998224725", "s", 10.5)).unwrap();
        assert_eq!(ok.balance.minor_units(), 1050);
        assert_eq!(ok.cpf.as_str(), "52998224725");
    }

    #[test]
    fn test_login_rules() {
        assert!(validate_login("52998224725", "secret").is_ok());
        assert_eq!(
            validate_login("52998224725", "").unwrap_err().message(),
            "field 'secret' is required"
        );
        assert_eq!(
            validate_login("123", "secret").unwrap_err().kind(),
            ErrorKind::Validation
        );
    }
}
