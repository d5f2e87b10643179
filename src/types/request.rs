use serde::{Deserialize, Serialize};

use super::*;

/// Smart money labels applied when no filter is chosen.
pub const DEFAULT_SM_FILTER: [&str; 3] = ["180D Smart Trader", "Fund", "Smart Trader"];

/// Chains queried by smart money endpoints by default.
pub const DEFAULT_SM_CHAINS: [&str; 2] = ["ethereum", "solana"];

/// Chains the token screener falls back to when none are selected.
pub const DEFAULT_SCREENER_CHAINS: [&str; 3] = ["ethereum", "solana", "base"];

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Filters of the smart money inflows, holdings, netflow, DEX trades and DCA
/// endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartMoneyParameters {
    pub sm_filter: Vec<String>,
    pub chains: Vec<String>,
    pub include_stablecoin: bool,
    pub include_native_tokens: bool,
    pub exclude_sm_filter: Vec<String>,
}

impl Default for SmartMoneyParameters {
    fn default() -> Self {
        Self {
            sm_filter: strings(&DEFAULT_SM_FILTER),
            chains: strings(&DEFAULT_SM_CHAINS),
            include_stablecoin: true,
            include_native_tokens: true,
            exclude_sm_filter: Vec::new(),
        }
    }
}

impl SmartMoneyParameters {
    pub fn with_chains(mut self, chains: Vec<String>) -> Self {
        self.chains = chains;
        self
    }

    pub fn with_sm_filter(mut self, sm_filter: Vec<String>) -> Self {
        self.sm_filter = sm_filter;
        self
    }

    pub fn with_stablecoins(mut self, include: bool) -> Self {
        self.include_stablecoin = include;
        self
    }

    pub fn with_native_tokens(mut self, include: bool) -> Self {
        self.include_native_tokens = include;
        self
    }
}

/// Filters of the token screener.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenerParameters {
    pub chains: Vec<String>,
    pub watchlist_filter: Vec<String>,
    pub sectors_filter: Vec<String>,
    pub sm_label_filter: Vec<String>,
    pub only_smart_money: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateRange>,
}

impl Default for ScreenerParameters {
    fn default() -> Self {
        Self::new(Vec::new(), true, None)
    }
}

impl ScreenerParameters {
    /// Empty `chains` falls back to [`DEFAULT_SCREENER_CHAINS`].
    pub fn new(chains: Vec<String>, only_smart_money: bool, date: Option<DateRange>) -> Self {
        Self {
            chains: if chains.is_empty() {
                strings(&DEFAULT_SCREENER_CHAINS)
            } else {
                chains
            },
            watchlist_filter: Vec::new(),
            sectors_filter: Vec::new(),
            sm_label_filter: Vec::new(),
            only_smart_money,
            date,
        }
    }
}

/// Token selector of the flow intelligence endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowIntelligenceParameters {
    pub chain: String,
    pub token_address: String,
    pub timeframe: Timeframe,
}

impl FlowIntelligenceParameters {
    pub fn new(chain: impl Into<String>, token_address: &str, timeframe: Timeframe) -> Self {
        Self {
            chain: chain.into(),
            token_address: token_address.trim().to_string(),
            timeframe,
        }
    }
}

/// Token selector of the token flows (price history) endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenFlowsParameters {
    pub chain: String,
    pub token_address: String,
    pub date: DateRange,
    pub label: String,
}

impl TokenFlowsParameters {
    /// Smart money flows over `timeframe`, ending at `to`.
    pub fn smart_money(
        chain: impl Into<String>,
        token_address: &str,
        timeframe: Timeframe,
        to: chrono::NaiveDate,
    ) -> Self {
        Self {
            chain: chain.into(),
            token_address: token_address.trim().to_string(),
            date: timeframe.range_ending(to),
            label: "smart_money".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_default_smart_money_query() {
        let query = Query::new(SmartMoneyParameters::default(), Pagination::default());
        assert_eq!(
            query.to_json(),
            json!({
                "parameters": {
                    "smFilter": ["180D Smart Trader", "Fund", "Smart Trader"],
                    "chains": ["ethereum", "solana"],
                    "includeStablecoin": true,
                    "includeNativeTokens": true,
                    "excludeSmFilter": []
                },
                "pagination": {"page": 1, "recordsPerPage": 100}
            })
        );
    }

    #[test]
    fn test_smart_money_builders() {
        let params = SmartMoneyParameters::default()
            .with_chains(vec!["base".to_string()])
            .with_sm_filter(vec!["Fund".to_string()])
            .with_stablecoins(false)
            .with_native_tokens(false);
        assert_eq!(params.chains, ["base"]);
        assert_eq!(params.sm_filter, ["Fund"]);
        assert!(!params.include_stablecoin);
        assert!(!params.include_native_tokens);
    }

    #[test]
    fn test_screener_parameters() {
        let params = ScreenerParameters::new(vec![], true, None);
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({
                "chains": ["ethereum", "solana", "base"],
                "watchlistFilter": [],
                "sectorsFilter": [],
                "smLabelFilter": [],
                "onlySmartMoney": true
            })
        );

        let date = DateRange {
            from: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            to: NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
        };
        let params = ScreenerParameters::new(vec!["solana".to_string()], false, Some(date));
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value["chains"], json!(["solana"]));
        assert_eq!(value["date"], json!({"from": "2025-01-01", "to": "2025-01-31"}));
    }

    #[test]
    fn test_flow_parameters() {
        let params = FlowIntelligenceParameters::new("ethereum", " 0xabc ", Timeframe::Week);
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({"chain": "ethereum", "tokenAddress": "0xabc", "timeframe": "7d"})
        );

        let to = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        let params = TokenFlowsParameters::smart_money("base", "0xdef", Timeframe::Month, to);
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({
                "chain": "base",
                "tokenAddress": "0xdef",
                "date": {"from": "2025-03-01", "to": "2025-03-31"},
                "label": "smart_money"
            })
        );
    }
}
