use std::{fmt, str::FromStr};

use ColumnKind::*;

/// How a column's values are coerced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    /// Kept as given.
    Passthrough,
    /// Coerced to a float, [`super::Cell::Missing`] on failure.
    Numeric,
    /// Lists joined with `", "`, anything else kept as given.
    List,
    /// Parsed to an instant, [`super::Cell::Missing`] on failure.
    Timestamp,
}

/// Column of a schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

/// Numeric sibling column computed from a string column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Derived {
    pub source: &'static str,
    pub name: &'static str,
}

/// Differently-cased key copied into a canonical column when the canonical
/// key is absent from every record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Alias {
    pub canonical: &'static str,
    pub variant: &'static str,
}

/// Structural contract of one endpoint's records.
#[derive(Debug)]
pub struct Schema {
    pub columns: &'static [Column],
    pub derived: &'static [Derived],
    pub aliases: &'static [Alias],
}

impl Schema {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|c| c.name)
    }
}

/// Kind of upstream records, one per endpoint shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SchemaKind {
    Inflows,
    Holdings,
    Screener,
    FlowIntelligence,
    NetFlow,
    DexTrades,
    DcaEvents,
    TokenCandles,
    TokenFlows,
}

impl SchemaKind {
    pub const ALL: [SchemaKind; 9] = [
        SchemaKind::Inflows,
        SchemaKind::Holdings,
        SchemaKind::Screener,
        SchemaKind::FlowIntelligence,
        SchemaKind::NetFlow,
        SchemaKind::DexTrades,
        SchemaKind::DcaEvents,
        SchemaKind::TokenCandles,
        SchemaKind::TokenFlows,
    ];

    pub fn schema(&self) -> &'static Schema {
        match self {
            SchemaKind::Inflows => &INFLOWS,
            SchemaKind::Holdings => &HOLDINGS,
            SchemaKind::Screener => &SCREENER,
            SchemaKind::FlowIntelligence => &FLOW_INTELLIGENCE,
            SchemaKind::NetFlow => &NET_FLOW,
            SchemaKind::DexTrades => &DEX_TRADES,
            SchemaKind::DcaEvents => &DCA_EVENTS,
            SchemaKind::TokenCandles => &TOKEN_CANDLES,
            SchemaKind::TokenFlows => &TOKEN_FLOWS,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SchemaKind::Inflows => "inflows",
            SchemaKind::Holdings => "holdings",
            SchemaKind::Screener => "screener",
            SchemaKind::FlowIntelligence => "flow-intelligence",
            SchemaKind::NetFlow => "netflow",
            SchemaKind::DexTrades => "dex-trades",
            SchemaKind::DcaEvents => "dca-events",
            SchemaKind::TokenCandles => "token-candles",
            SchemaKind::TokenFlows => "token-flows",
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SchemaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SchemaKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| format!("unknown schema kind: {s}"))
    }
}

const fn col(name: &'static str, kind: ColumnKind) -> Column {
    Column { name, kind }
}

const AGE_DAYS_NUM: &[Derived] = &[Derived {
    source: "tokenAgeDays",
    name: "tokenAgeDaysNum",
}];

static INFLOWS: Schema = Schema {
    columns: &[
        col("chain", Passthrough),
        col("tokenAddress", Passthrough),
        col("symbol", Passthrough),
        col("sectors", List),
        col("volume24hUSD", Numeric),
        col("volume7dUSD", Numeric),
        col("volume30dUSD", Numeric),
        col("nofTraders", Passthrough),
        col("tokenAgeDays", Passthrough),
        col("marketCap", Numeric),
    ],
    derived: AGE_DAYS_NUM,
    aliases: &[],
};

static HOLDINGS: Schema = Schema {
    columns: &[
        col("chain", Passthrough),
        col("tokenAddress", Passthrough),
        col("symbol", Passthrough),
        col("sectors", List),
        col("balanceUsd", Numeric),
        col("balancePctChange24H", Numeric),
        col("nofHolders", Passthrough),
        col("shareOfHoldings", Numeric),
        col("tokenAgeDays", Passthrough),
        col("marketCap", Numeric),
    ],
    derived: AGE_DAYS_NUM,
    aliases: &[Alias {
        canonical: "balancePctChange24H",
        variant: "balancePctChange24h",
    }],
};

static SCREENER: Schema = Schema {
    columns: &[
        col("chain", Passthrough),
        col("tokenAddressHex", Passthrough),
        col("tokenSymbol", Passthrough),
        col("tokenAgeDays", Passthrough),
        col("marketCap", Numeric),
        col("liquidity", Numeric),
        col("priceUsd", Numeric),
        col("priceChange", Numeric),
        col("fdv", Numeric),
        col("fdvMcRatio", Numeric),
        col("buyVolume", Numeric),
        col("inflowFdvRatio", Numeric),
        col("outflowFdvRatio", Numeric),
        col("sellVolume", Numeric),
        col("volume", Numeric),
        col("netflow", Numeric),
    ],
    derived: AGE_DAYS_NUM,
    aliases: &[],
};

static FLOW_INTELLIGENCE: Schema = Schema {
    columns: &[
        col("publicFigureFlow", Numeric),
        col("publicFigureAvgAbsFlow", Numeric),
        col("publicFigureWallets", Passthrough),
        col("topPnlFlow", Numeric),
        col("topPnlAvgAbsFlow", Numeric),
        col("topPnlWallets", Passthrough),
        col("whaleFlow", Numeric),
        col("whaleAvgAbsFlow", Numeric),
        col("whaleWallets", Passthrough),
        col("smartTraderFlow", Numeric),
        col("smartTraderAvgAbsFlow", Numeric),
        col("smartTraderWallets", Passthrough),
        col("exchangeFlow", Numeric),
        col("exchangeAvgAbsFlow", Numeric),
        col("exchangeWallets", Passthrough),
        col("freshWalletsFlow", Numeric),
        col("freshWalletsAvgAbsFlow", Numeric),
        col("freshWalletsWallets", Passthrough),
    ],
    derived: &[],
    aliases: &[],
};

static NET_FLOW: Schema = Schema {
    columns: &[
        col("token_address", Passthrough),
        col("token_symbol", Passthrough),
        col("netflow_24h_usd", Numeric),
        col("netflow_7d_usd", Numeric),
        col("netflow_30d_usd", Numeric),
        col("chain", Passthrough),
        col("token_sectors", List),
        col("trader_count", Passthrough),
        col("token_age_days", Passthrough),
        col("market_cap_usd", Numeric),
    ],
    derived: &[Derived {
        source: "token_age_days",
        name: "token_age_days_num",
    }],
    aliases: &[],
};

static DEX_TRADES: Schema = Schema {
    columns: &[
        col("chain", Passthrough),
        col("block_timestamp", Timestamp),
        col("transaction_hash", Passthrough),
        col("trader_address", Passthrough),
        col("trader_address_label", Passthrough),
        col("token_bought_address", Passthrough),
        col("token_sold_address", Passthrough),
        col("token_bought_amount", Numeric),
        col("token_sold_amount", Numeric),
        col("token_bought_symbol", Passthrough),
        col("token_sold_symbol", Passthrough),
        col("token_bought_age_days", Numeric),
        col("token_sold_age_days", Numeric),
        col("token_bought_market_cap", Numeric),
        col("token_sold_market_cap", Numeric),
        col("trade_value_usd", Numeric),
    ],
    derived: &[],
    aliases: &[],
};

static DCA_EVENTS: Schema = Schema {
    columns: &[
        col("dca_created_at", Timestamp),
        col("dca_updated_at", Timestamp),
        col("trader_address", Passthrough),
        col("trader_address_label", Passthrough),
        col("dca_vault_address", Passthrough),
        col("input_token_address", Passthrough),
        col("output_token_address", Passthrough),
        col("deposit_token_amount", Numeric),
        col("token_spent_amount", Numeric),
        col("output_token_redeemed_amount", Numeric),
        col("dca_status", Passthrough),
        col("input_token_symbol", Passthrough),
        col("output_token_symbol", Passthrough),
        col("deposit_value_usd", Numeric),
    ],
    derived: &[],
    aliases: &[],
};

static TOKEN_CANDLES: Schema = Schema {
    columns: &[
        col("time", Timestamp),
        col("open", Numeric),
        col("high", Numeric),
        col("low", Numeric),
        col("close", Numeric),
        col("volume", Numeric),
    ],
    derived: &[],
    aliases: &[],
};

static TOKEN_FLOWS: Schema = Schema {
    columns: &[
        col("blockDate", Timestamp),
        col("priceUsd", Numeric),
        col("tokenAmount", Numeric),
        col("value", Numeric),
        col("holdersCount", Passthrough),
        col("totalInflowsCount", Passthrough),
        col("totalOutflowsCount", Passthrough),
    ],
    derived: &[],
    aliases: &[],
};

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_schema_columns_are_unique() {
        for kind in SchemaKind::ALL {
            let schema = kind.schema();
            let names: HashSet<_> = schema.column_names().collect();
            assert_eq!(names.len(), schema.columns.len(), "{kind}");
            for derived in schema.derived {
                assert!(schema.column(derived.source).is_some(), "{kind}");
                assert!(schema.column(derived.name).is_none(), "{kind}");
            }
            for alias in schema.aliases {
                assert!(schema.column(alias.canonical).is_some(), "{kind}");
            }
        }
    }

    #[test]
    fn test_schema_kind_from_str() {
        for kind in SchemaKind::ALL {
            assert_eq!(kind.name().parse::<SchemaKind>().unwrap(), kind);
        }
        assert!("prices".parse::<SchemaKind>().is_err());
    }

    #[test]
    fn test_flow_intelligence_cohorts() {
        let schema = SchemaKind::FlowIntelligence.schema();
        for cohort in [
            "publicFigure",
            "topPnl",
            "whale",
            "smartTrader",
            "exchange",
            "freshWallets",
        ] {
            for suffix in ["Flow", "AvgAbsFlow", "Wallets"] {
                assert!(schema.column(&format!("{cohort}{suffix}")).is_some());
            }
        }
    }
}
