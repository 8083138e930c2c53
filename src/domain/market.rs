//! Markets and ticker symbols
//!
//! A [`Symbol`] is what the user types (`2330`, `AAPL`, `BTC`); a [`Market`]
//! decides how that symbol is spelled for the quote provider and which table
//! the result lands in.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Prefix shared by every table this tool writes
pub const TABLE_PREFIX: &str = "fundamental_data_";

/// Market a symbol is quoted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Market {
    /// Taiwan Stock Exchange
    Tw,
    /// Taipei Exchange (OTC)
    Two,
    /// US equities
    Us,
    /// Exchange-traded funds
    Etf,
    /// Market indices
    Index,
    /// Cryptocurrencies quoted in USD
    Crypto,
    /// Currency pairs
    Forex,
    /// Futures contracts
    Futures,
}

impl Market {
    /// Every market, in CLI order
    pub const ALL: [Market; 8] = [
        Market::Tw,
        Market::Two,
        Market::Us,
        Market::Etf,
        Market::Index,
        Market::Crypto,
        Market::Forex,
        Market::Futures,
    ];

    /// Short lowercase code (`tw`, `us`, ...)
    pub fn code(&self) -> &'static str {
        match self {
            Market::Tw => "tw",
            Market::Two => "two",
            Market::Us => "us",
            Market::Etf => "etf",
            Market::Index => "index",
            Market::Crypto => "crypto",
            Market::Forex => "forex",
            Market::Futures => "futures",
        }
    }

    /// Table holding this market's fundamentals
    pub fn table_name(&self) -> String {
        format!("{TABLE_PREFIX}{}", self.code())
    }

    /// Spells `symbol` the way the quote provider expects it
    pub fn provider_symbol(&self, symbol: &Symbol) -> String {
        let s = symbol.as_str();
        match self {
            Market::Tw => format!("{s}.TW"),
            Market::Two => format!("{s}.TWO"),
            Market::Us | Market::Etf => s.to_string(),
            Market::Index if s.starts_with('^') => s.to_string(),
            Market::Index => format!("^{s}"),
            Market::Crypto if s.contains('-') => s.to_string(),
            Market::Crypto => format!("{s}-USD"),
            Market::Forex if s.ends_with("=X") => s.to_string(),
            Market::Forex => format!("{s}=X"),
            Market::Futures if s.ends_with("=F") => s.to_string(),
            Market::Futures => format!("{s}=F"),
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Market {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Market::ALL
            .into_iter()
            .find(|m| m.code() == lower)
            .ok_or_else(|| {
                format!(
                    "Unknown market '{s}'. Must be one of: {}",
                    Market::ALL.map(|m| m.code()).join(", ")
                )
            })
    }
}

fn symbol_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\^?[A-Z0-9][A-Z0-9.\-=]{0,19}$").expect("valid regex"))
}

/// Ticker symbol, upper-cased and validated
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a symbol from user input
    ///
    /// Input is trimmed and upper-cased. Only letters, digits, `.`, `-`,
    /// `=` and a leading `^` are accepted.
    pub fn new(symbol: impl AsRef<str>) -> Result<Self, String> {
        let normalized = symbol.as_ref().trim().to_uppercase();
        if normalized.is_empty() {
            return Err("Symbol cannot be empty".to_string());
        }
        if !symbol_pattern().is_match(&normalized) {
            return Err(format!("Invalid symbol '{}'", symbol.as_ref().trim()));
        }
        Ok(Self(normalized))
    }

    /// Returns the symbol as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Symbol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Market::Tw, "2330", "2330.TW")]
    #[test_case(Market::Two, "6488", "6488.TWO")]
    #[test_case(Market::Us, "aapl", "AAPL")]
    #[test_case(Market::Etf, "SPY", "SPY")]
    #[test_case(Market::Index, "GSPC", "^GSPC")]
    #[test_case(Market::Index, "^TWII", "^TWII")]
    #[test_case(Market::Crypto, "btc", "BTC-USD")]
    #[test_case(Market::Crypto, "ETH-EUR", "ETH-EUR")]
    #[test_case(Market::Forex, "USDTWD", "USDTWD=X")]
    #[test_case(Market::Forex, "EURUSD=X", "EURUSD=X")]
    #[test_case(Market::Futures, "GC", "GC=F")]
    #[test_case(Market::Futures, "CL=F", "CL=F")]
    fn test_provider_symbol(market: Market, input: &str, expected: &str) {
        let symbol = Symbol::new(input).unwrap();
        assert_eq!(market.provider_symbol(&symbol), expected);
    }

    #[test]
    fn test_table_name() {
        assert_eq!(Market::Tw.table_name(), "fundamental_data_tw");
        assert_eq!(Market::Futures.table_name(), "fundamental_data_futures");
    }

    #[test]
    fn test_market_from_str() {
        assert_eq!("US".parse::<Market>().unwrap(), Market::Us);
        assert_eq!(" two ".parse::<Market>().unwrap(), Market::Two);
        let err = "nyse".parse::<Market>().unwrap_err();
        assert!(err.contains("tw, two, us"));
    }

    #[test]
    fn test_symbol_validation() {
        assert_eq!(Symbol::new(" aapl ").unwrap().as_str(), "AAPL");
        assert!(Symbol::new("").is_err());
        assert!(Symbol::new("AAPL; DROP TABLE").is_err());
        assert!(Symbol::new("'--").is_err());
        assert!(Symbol::new("BRK.B").is_ok());
    }
}
