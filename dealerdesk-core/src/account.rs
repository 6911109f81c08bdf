//! Customer accounts.
//!
//! An account is the company or person an opportunity is sold to. Its id is
//! short and human readable: up to ten characters, normally the first three
//! letters of the name followed by four digits (`ACM4821`).

use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub account_id: String,
    pub account_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewAccount {
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub account_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountUpdate {
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub account_name: Option<String>,
}

/// Builds an account id from the name's first three letters and four random digits.
///
/// Names with fewer than three letters are padded with `X`.
pub fn generate_account_id(account_name: &str) -> String {
    let mut prefix: String = account_name
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .take(3)
        .map(|c| c.to_ascii_uppercase())
        .collect();
    while prefix.len() < 3 {
        prefix.push('X');
    }

    let digits: u16 = rand::rng().random_range(0..10_000);
    format!("{prefix}{digits:04}")
}
