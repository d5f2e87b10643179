mod request;

pub use request::{
    FlowIntelligenceParameters, ScreenerParameters, SmartMoneyParameters, TokenFlowsParameters,
};

use std::{fmt, str::FromStr};

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Default number of records requested per page.
pub const DEFAULT_RECORDS_PER_PAGE: u32 = 100;

/// Page selector of a query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub records_per_page: u32,
}

impl Pagination {
    pub fn new(page: u32, records_per_page: u32) -> Self {
        Self {
            page,
            records_per_page,
        }
    }

    /// First page with the given size.
    pub fn first(records_per_page: u32) -> Self {
        Self::new(1, records_per_page)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::first(DEFAULT_RECORDS_PER_PAGE)
    }
}

/// Request body accepted by every endpoint: filter parameters plus
/// pagination.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Query<P> {
    pub parameters: P,
    pub pagination: Pagination,
}

impl<P: Serialize> Query<P> {
    pub fn new(parameters: P, pagination: Pagination) -> Self {
        Self {
            parameters,
            pagination,
        }
    }

    /// JSON body as sent upstream.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Lookback window of flow queries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[default]
    #[serde(rename = "1d")]
    Day,
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
}

impl Timeframe {
    pub fn days(&self) -> u64 {
        match self {
            Timeframe::Day => 1,
            Timeframe::Week => 7,
            Timeframe::Month => 30,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Day => "1d",
            Timeframe::Week => "7d",
            Timeframe::Month => "30d",
        }
    }

    /// Date range covering the timeframe and ending at `to`.
    pub fn range_ending(&self, to: NaiveDate) -> DateRange {
        DateRange {
            from: to.checked_sub_days(Days::new(self.days())).unwrap_or(to),
            to,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1d" => Ok(Timeframe::Day),
            "7d" => Ok(Timeframe::Week),
            "30d" => Ok(Timeframe::Month),
            _ => Err(format!("unknown timeframe: {s}, expected one of 1d, 7d, 30d")),
        }
    }
}

/// Inclusive calendar date range, serialized as `YYYY-MM-DD`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}
