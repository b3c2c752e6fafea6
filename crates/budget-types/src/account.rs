use serde::{Deserialize, Serialize};

use crate::Amount;

/// Host-platform identity (executor, recipient, the ledger's own account).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Named permission an account can sign an invocation with.
///
/// Capabilities are opaque tags: the ledger only compares them. Departments
/// carry their own tag so each one can be gated by a different delegated key.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capability(pub String);

impl Capability {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Payment asset: the issuing contract plus the symbol it issues.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetReference {
    /// Account of the contract that issues and transfers the asset
    pub contract: AccountId,
    /// Ticker, e.g. `SYS`
    pub symbol: String,
    /// Number of decimal places in one whole unit
    pub precision: u8,
}

impl AssetReference {
    pub fn new(contract: AccountId, symbol: impl Into<String>, precision: u8) -> Self {
        Self {
            contract,
            symbol: symbol.into(),
            precision,
        }
    }

    /// Render minor units as a decimal quantity, e.g. `123400` -> `"12.3400 SYS"`.
    pub fn format_amount(&self, amount: Amount) -> String {
        let Some(scale) = 10u128.checked_pow(u32::from(self.precision)) else {
            return format!("{} {}", amount, self.symbol);
        };
        let amount = u128::from(amount);
        if self.precision == 0 {
            return format!("{} {}", amount, self.symbol);
        }
        format!(
            "{}.{:0width$} {}",
            amount / scale,
            amount % scale,
            self.symbol,
            width = usize::from(self.precision)
        )
    }
}

impl std::fmt::Display for AssetReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}@{}", self.precision, self.symbol, self.contract)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sys() -> AssetReference {
        AssetReference::new(AccountId::new("token.host"), "SYS", 4)
    }

    #[test]
    fn formats_with_precision() {
        assert_eq!(sys().format_amount(123_400), "12.3400 SYS");
        assert_eq!(sys().format_amount(5), "0.0005 SYS");
    }

    #[test]
    fn formats_whole_units_without_point() {
        let asset = AssetReference::new(AccountId::new("token.host"), "PTS", 0);
        assert_eq!(asset.format_amount(42), "42 PTS");
    }

    #[test]
    fn asset_display_names_contract() {
        assert_eq!(sys().to_string(), "4,SYS@token.host");
    }
}
