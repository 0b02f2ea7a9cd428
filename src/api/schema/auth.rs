use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct LoginForm<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct TokenBody {
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LastCollectedBody {
    pub last_collected: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Balance {
    Amount(f64),
    Unavailable,
}

impl Balance {
    pub fn from_value(value: Option<serde_json::Value>) -> Self {
        let amount = match value {
            Some(serde_json::Value::Number(n)) => n.as_f64(),
            Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        };
        amount.map(Balance::Amount).unwrap_or(Balance::Unavailable)
    }
}

impl std::fmt::Display for Balance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Balance::Amount(amount) => write!(f, "{:.2} RUB", amount),
            Balance::Unavailable => f.write_str("balance unavailable"),
        }
    }
}

/// Latest balance reading, as published by the shell's refresher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalanceReading {
    pub balance: Balance,
    pub fetched_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balance_from_number_or_text() {
        assert_eq!(
            Balance::from_value(Some(serde_json::json!(120.5))),
            Balance::Amount(120.5)
        );
        assert_eq!(
            Balance::from_value(Some(serde_json::json!("99"))),
            Balance::Amount(99.0)
        );
        assert_eq!(Balance::from_value(None), Balance::Unavailable);
        assert_eq!(Balance::Amount(3.0).to_string(), "3.00 RUB");
    }
}
