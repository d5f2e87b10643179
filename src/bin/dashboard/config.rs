//! Command line configuration of the dashboard.
//!
//! Connection details and the API key come from the environment (see
//! [`smart_money_sdk::config`]), query filters from CLI arguments.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use smart_money_sdk::types::{
    DateRange, FlowIntelligenceParameters, Pagination, Query, ScreenerParameters,
    SmartMoneyParameters, Timeframe, TokenFlowsParameters,
};

#[derive(Debug, Parser)]
#[command(name = "dashboard")]
#[command(about = "Smart Money dashboard in the terminal")]
pub struct CliConfig {
    /// Write the raw records of the query to this JSON file
    #[arg(long, global = true)]
    pub dump: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Most traded and newly adopted tokens by Smart Money
    Inflows(SmartMoneyArgs),

    /// Tokens Smart Money wallets are holding
    Holdings(SmartMoneyArgs),

    /// Top few holdings as a text report, raw data dumped to a file
    TopHoldings {
        /// Number of tokens to report
        #[arg(long, default_value = "3")]
        limit: u32,

        #[command(flatten)]
        filters: SmartMoneyArgs,
    },

    /// Smart Money net flows per token
    Netflow(SmartMoneyArgs),

    /// Latest DEX trades of Smart Money wallets
    DexTrades(SmartMoneyArgs),

    /// DCA vault events of Smart Money wallets
    Dca(SmartMoneyArgs),

    /// Token screener across chains
    Screener(ScreenerArgs),

    /// Per-cohort flows of a single token
    FlowIntel(TokenArgs),

    /// OHLCV candles of a single token
    Candles {
        #[command(flatten)]
        token: TokenArgs,

        /// Endpoint path, overrides NANSEN_CANDLES_PATH
        #[arg(long)]
        path: Option<String>,
    },

    /// Smart Money price history of a single token
    PriceHistory(TokenArgs),
}

/// Filters shared by the Smart Money endpoints.
#[derive(Debug, Args)]
pub struct SmartMoneyArgs {
    /// Chains to query (comma-separated)
    #[arg(long, value_delimiter = ',', default_value = "ethereum,solana")]
    pub chains: Vec<String>,

    /// Smart Money labels to include (comma-separated)
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "180D Smart Trader,Fund,Smart Trader"
    )]
    pub sm_filter: Vec<String>,

    /// Exclude stablecoins
    #[arg(long)]
    pub no_stablecoins: bool,

    /// Exclude native tokens
    #[arg(long)]
    pub no_native_tokens: bool,

    /// Records per page (10-200)
    #[arg(long, default_value = "100", value_parser = clap::value_parser!(u32).range(10..=200))]
    pub records_per_page: u32,

    /// Max token age in days to consider a token new (1-3650)
    #[arg(long, default_value = "30", value_parser = clap::value_parser!(u32).range(1..=3650))]
    pub new_token_max_days: u32,
}

impl SmartMoneyArgs {
    pub fn to_query(&self) -> Query<SmartMoneyParameters> {
        Query::new(
            SmartMoneyParameters::default()
                .with_chains(self.chains.clone())
                .with_sm_filter(self.sm_filter.clone())
                .with_stablecoins(!self.no_stablecoins)
                .with_native_tokens(!self.no_native_tokens),
            Pagination::first(self.records_per_page),
        )
    }
}

#[derive(Debug, Args)]
pub struct ScreenerArgs {
    /// Chains to screen (comma-separated)
    #[arg(long, value_delimiter = ',', default_value = "ethereum,solana,base")]
    pub chains: Vec<String>,

    /// Start date (YYYY-MM-DD), used together with --to
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// End date (YYYY-MM-DD), used together with --from
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Include tokens without Smart Money activity
    #[arg(long)]
    pub all_wallets: bool,

    /// Records per page (10-200)
    #[arg(long, default_value = "100", value_parser = clap::value_parser!(u32).range(10..=200))]
    pub records_per_page: u32,
}

impl ScreenerArgs {
    pub fn to_query(&self) -> Result<Query<ScreenerParameters>, ConfigError> {
        let date = match (self.from, self.to) {
            (Some(from), Some(to)) if from > to => return Err(ConfigError::InvalidDateRange),
            (Some(from), Some(to)) => Some(DateRange { from, to }),
            _ => None,
        };
        Ok(Query::new(
            ScreenerParameters::new(self.chains.clone(), !self.all_wallets, date),
            Pagination::first(self.records_per_page),
        ))
    }
}

/// Single token selector.
#[derive(Debug, Args)]
pub struct TokenArgs {
    /// Chain of the token
    #[arg(long, default_value = "ethereum")]
    pub chain: String,

    /// Token address (hex)
    #[arg(long, default_value = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48")]
    pub token: String,

    /// Timeframe: 1d, 7d or 30d
    #[arg(long, default_value = "1d")]
    pub timeframe: Timeframe,

    /// Records per page (10-200)
    #[arg(long, default_value = "100", value_parser = clap::value_parser!(u32).range(10..=200))]
    pub records_per_page: u32,
}

impl TokenArgs {
    pub fn to_flow_query(&self) -> Result<Query<FlowIntelligenceParameters>, ConfigError> {
        Ok(Query::new(
            FlowIntelligenceParameters::new(&self.chain, self.token_address()?, self.timeframe),
            Pagination::first(self.records_per_page),
        ))
    }

    pub fn to_history_query(
        &self,
        today: NaiveDate,
    ) -> Result<Query<TokenFlowsParameters>, ConfigError> {
        Ok(Query::new(
            TokenFlowsParameters::smart_money(
                &self.chain,
                self.token_address()?,
                self.timeframe,
                today,
            ),
            Pagination::first(self.records_per_page),
        ))
    }

    fn token_address(&self) -> Result<&str, ConfigError> {
        let token = self.token.trim();
        if token.is_empty() {
            return Err(ConfigError::MissingTokenAddress);
        }
        Ok(token)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("--from must not be after --to")]
    InvalidDateRange,

    #[error("token address must not be empty")]
    MissingTokenAddress,
}
