//! Add command implementation
//!
//! This module implements the `add` command: fetching fundamentals for a
//! batch of symbols, or one economic indicator, and storing the result.

use super::{exit_code, merge_exit_code, EXIT_CONFIG, EXIT_OK};
use crate::adapters::database::{create_connector, SqlConnector};
use crate::adapters::fred::FredClient;
use crate::adapters::yahoo::YahooFinanceClient;
use crate::config::ConfigStore;
use crate::core::FundamentalDataService;
use crate::domain::{DateRange, EconomicIndicator, FundamentalRecord, Market, Symbol};
use clap::Args;
use std::sync::Arc;

/// Arguments for the add command
#[derive(Args, Debug, Default)]
pub struct AddArgs {
    /// Symbols to fetch (e.g. 2330 AAPL)
    pub symbols: Vec<String>,

    /// Taiwan Stock Exchange
    #[arg(long, group = "market")]
    pub tw: bool,

    /// Taipei Exchange (OTC)
    #[arg(long, group = "market")]
    pub two: bool,

    /// US equities
    #[arg(long, group = "market")]
    pub us: bool,

    /// Exchange-traded funds
    #[arg(long, group = "market")]
    pub etf: bool,

    /// Market indices
    #[arg(long, group = "market")]
    pub index: bool,

    /// Cryptocurrencies (quoted in USD)
    #[arg(long, group = "market")]
    pub crypto: bool,

    /// Currency pairs
    #[arg(long, group = "market")]
    pub forex: bool,

    /// Futures contracts
    #[arg(long, group = "market")]
    pub futures: bool,

    /// US consumer price index (FRED)
    #[arg(long, group = "indicator", conflicts_with = "market")]
    pub cpi: bool,

    /// US non-farm payrolls (FRED)
    #[arg(long, group = "indicator", conflicts_with = "market")]
    pub nfp: bool,

    /// WTI crude oil price (FRED)
    #[arg(long, group = "indicator", conflicts_with = "market")]
    pub oil: bool,

    /// Gold futures price
    #[arg(long, group = "indicator", conflicts_with = "market")]
    pub gold: bool,

    /// Start date of the indicator range (yyyy/mm/dd)
    #[arg(long, requires = "end", requires = "indicator")]
    pub start: Option<String>,

    /// End date of the indicator range (yyyy/mm/dd)
    #[arg(long, requires = "start")]
    pub end: Option<String>,
}

impl AddArgs {
    /// Selected market, if any
    pub fn market(&self) -> Option<Market> {
        [
            (self.tw, Market::Tw),
            (self.two, Market::Two),
            (self.us, Market::Us),
            (self.etf, Market::Etf),
            (self.index, Market::Index),
            (self.crypto, Market::Crypto),
            (self.forex, Market::Forex),
            (self.futures, Market::Futures),
        ]
        .into_iter()
        .find_map(|(set, market)| set.then_some(market))
    }

    /// Selected indicator, if any
    pub fn indicator(&self) -> Option<EconomicIndicator> {
        [
            (self.cpi, EconomicIndicator::Cpi),
            (self.nfp, EconomicIndicator::Nfp),
            (self.oil, EconomicIndicator::Oil),
            (self.gold, EconomicIndicator::Gold),
        ]
        .into_iter()
        .find_map(|(set, indicator)| set.then_some(indicator))
    }

    /// Execute the add command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let store = ConfigStore::load(config_path);
        let descriptor = store.connection_descriptor();
        let yahoo = Arc::new(YahooFinanceClient::new()?);

        let mut service = FundamentalDataService::new(
            create_connector(&descriptor.driver_name),
            descriptor,
            yahoo.clone(),
            yahoo,
        );
        if let Some(key) = store.fred_api_key() {
            service = service.with_fred(Arc::new(FredClient::new(key.clone())?));
        }

        if let Some(indicator) = self.indicator() {
            return Ok(self.add_indicator(&service, indicator).await);
        }

        if self.symbols.is_empty() {
            println!("Please provide at least one symbol or an indicator");
            println!("Examples: fund add 2330 --tw");
            println!("          fund add AAPL --us");
            println!("          fund add --cpi");
            return Ok(EXIT_CONFIG);
        }

        let Some(market) = self.market() else {
            println!("Please specify a market (e.g. --tw, --us, --crypto)");
            return Ok(EXIT_CONFIG);
        };

        Ok(add_symbols(&service, &self.symbols, market).await)
    }

    async fn add_indicator<C: SqlConnector>(
        &self,
        service: &FundamentalDataService<C>,
        indicator: EconomicIndicator,
    ) -> i32 {
        let range = match (&self.start, &self.end) {
            (Some(start), Some(end)) => match DateRange::parse(start, end) {
                Ok(range) => Some(range),
                Err(e) => {
                    println!("✗ {e}");
                    return exit_code(&e);
                }
            },
            _ => None,
        };

        match &range {
            Some(r) => println!("Fetching {indicator} from {} to {}...", r.start(), r.end()),
            None => println!("Fetching latest {indicator}..."),
        }

        match service.fetch_and_store_indicator(indicator, range).await {
            Ok(observations) => {
                let unit = indicator.unit();
                if range.is_some() {
                    println!("✓ {indicator}:");
                    for o in &observations {
                        println!("  date={} value={} ({unit})", o.date, o.value);
                    }
                } else if let Some(o) = observations.first() {
                    println!("✓ {indicator} latest: date={} value={} ({unit})", o.date, o.value);
                }
                println!("{} observation(s) stored", observations.len());
                EXIT_OK
            }
            Err(e) => {
                crate::log_error_with_context!(&e, indicator.code());
                println!("✗ Failed to fetch {indicator}: {e}");
                exit_code(&e)
            }
        }
    }
}

/// Fetches and stores every symbol; one failure never stops the batch
async fn add_symbols<C: SqlConnector>(
    service: &FundamentalDataService<C>,
    symbols: &[String],
    market: Market,
) -> i32 {
    let mut code = EXIT_OK;

    for input in symbols {
        let symbol = match Symbol::new(input) {
            Ok(symbol) => symbol,
            Err(e) => {
                println!("✗ {input}: {e}");
                code = merge_exit_code(code, EXIT_CONFIG);
                continue;
            }
        };

        println!("Processing {symbol} ({market})...");
        match service.fetch_and_store(&symbol, market).await {
            Ok(record) => {
                println!("✓ {symbol} fundamentals stored");
                display_fundamentals(&record);
            }
            Err(e) => {
                crate::log_error_with_context!(&e, symbol.as_str());
                println!("✗ {symbol} failed: {e}");
                code = merge_exit_code(code, exit_code(&e));
            }
        }
    }

    code
}

/// How a numeric field is rendered
#[derive(Debug, Clone, Copy)]
enum Format {
    Currency,
    Percentage,
    Ratio,
    General,
}

const SECTIONS: &[(&str, &[(&str, &str, Format)])] = &[
    (
        "Valuation",
        &[
            ("Market cap", "marketCap", Format::Currency),
            ("P/E (trailing)", "trailingPE", Format::Ratio),
            ("P/E (forward)", "forwardPE", Format::Ratio),
            ("P/B", "priceToBook", Format::Ratio),
            ("P/S", "priceToSales", Format::Ratio),
            ("PEG ratio", "pegRatio", Format::Ratio),
        ],
    ),
    (
        "Financial health",
        &[
            ("Debt to equity", "debtToEquity", Format::Ratio),
            ("Current ratio", "currentRatio", Format::Ratio),
            ("Quick ratio", "quickRatio", Format::Ratio),
            ("Total cash", "totalCash", Format::Currency),
            ("Total debt", "totalDebt", Format::Currency),
        ],
    ),
    (
        "Profitability",
        &[
            ("ROE", "returnOnEquity", Format::Percentage),
            ("ROA", "returnOnAssets", Format::Percentage),
            ("Profit margin", "profitMargins", Format::Percentage),
            ("Operating margin", "operatingMargins", Format::Percentage),
            ("Gross margin", "grossMargins", Format::Percentage),
        ],
    ),
    (
        "Growth",
        &[
            ("Revenue growth", "revenueGrowth", Format::Percentage),
            ("Earnings growth", "earningsGrowth", Format::Percentage),
            ("Total revenue", "totalRevenue", Format::Currency),
        ],
    ),
    (
        "Dividends",
        &[
            ("Dividend yield", "dividendYield", Format::Percentage),
            ("Dividend rate", "dividendRate", Format::Ratio),
            ("Payout ratio", "payoutRatio", Format::Percentage),
        ],
    ),
    (
        "Trading",
        &[
            ("Beta", "beta", Format::Ratio),
            ("Book value", "bookValue", Format::Ratio),
            ("52-week high", "fiftyTwoWeekHigh", Format::Ratio),
            ("52-week low", "fiftyTwoWeekLow", Format::Ratio),
            ("Average volume", "averageVolume", Format::General),
        ],
    ),
];

fn display_fundamentals(record: &FundamentalRecord) {
    let text = |name: &str| record.text(name).unwrap_or("N/A").to_string();

    println!();
    println!("{}", "=".repeat(60));
    println!("  {} - {}", record.symbol, text("shortName"));
    println!("{}", "=".repeat(60));

    println!();
    println!(" Profile:");
    println!("  Industry: {}", text("industry"));
    println!("  Sector: {}", text("sector"));
    println!("  Country: {}", text("country"));
    println!("  Exchange: {}", text("exchange"));
    println!("  Currency: {}", text("currency"));

    for (title, rows) in SECTIONS {
        println!();
        println!(" {title}:");
        for (label, field, format) in rows.iter() {
            println!("  {label}: {}", format_number(record.number(field), *format));
        }
        if *title == "Dividends" {
            println!("  Ex-dividend date: {}", text("exDividendDate"));
        }
    }
}

fn format_number(value: Option<f64>, format: Format) -> String {
    let Some(value) = value else {
        return "N/A".to_string();
    };
    match format {
        Format::Currency => {
            let abs = value.abs();
            if abs >= 1e12 {
                format!("${:.2}T", value / 1e12)
            } else if abs >= 1e9 {
                format!("${:.2}B", value / 1e9)
            } else if abs >= 1e6 {
                format!("${:.2}M", value / 1e6)
            } else {
                format!("${}", group_thousands(value.round() as i64))
            }
        }
        Format::Percentage => format!("{:.2}%", value * 100.0),
        Format::Ratio => format!("{value:.2}"),
        Format::General if value.fract() == 0.0 && value.abs() < 1e15 => {
            group_thousands(value as i64)
        }
        Format::General => value.to_string(),
    }
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}
