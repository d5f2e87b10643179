//! Smart Money dashboard.
//!
//! Runs a single query against the analytics API, normalizes the response
//! and prints the dashboard views for it.

mod config;
mod error;
mod render;

use std::{path::Path, process::exit};

use chrono::Local;
use clap::Parser;
use serde::Serialize;
use smart_money_sdk::{
    Client, SchemaKind, Table,
    snapshot::RawSnapshot,
    table::{self, Record},
    types::{Query, Timeframe},
    view::{self, SortKey},
};
use tracing::{error, info};

use config::{CliConfig, Command, SmartMoneyArgs};
use error::Result;

/// Dump file of the `top-holdings` report when `--dump` is not given.
const TOP_HOLDINGS_DUMP: &str = "smart_money_tokens_data.json";

const SCREENER_CORRELATION: [&str; 6] = [
    "priceUsd",
    "liquidity",
    "volume",
    "netflow",
    "buyVolume",
    "sellVolume",
];

#[tokio::main]
async fn main() {
    // Load .env file
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Warning: Failed to load .env file: {}", e);
    }

    let cli = CliConfig::parse();

    // Set up logging
    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        error!(%e, "dashboard query failed");
        eprintln!("{e}");
        if let Some(hint) = e.hint() {
            eprintln!("{hint}");
        }
        exit(1);
    }
}

async fn run(cli: CliConfig) -> Result<()> {
    let client = Client::from_env()?;
    let dump = cli.dump.as_deref();

    match cli.command {
        Command::Inflows(args) => {
            let query = args.to_query();
            let table = fetch(&client, SchemaKind::Inflows, &query, Timeframe::Day, dump).await?;
            show_inflows(&table, &args);
        }
        Command::Holdings(args) => {
            let query = args.to_query();
            let table = fetch(&client, SchemaKind::Holdings, &query, Timeframe::Day, dump).await?;
            show_holdings(&table);
        }
        Command::TopHoldings { limit, filters } => {
            let mut query = filters.to_query();
            query.pagination.records_per_page = limit;
            let mut records = client.smart_money_holdings(&query).await?;
            records.truncate(limit as usize);
            show_top_holdings(&records);
            if !records.is_empty() {
                let path = dump.unwrap_or(Path::new(TOP_HOLDINGS_DUMP));
                RawSnapshot::now(Timeframe::Day, records).save(path)?;
                println!("Raw data saved to '{}'", path.display());
            }
        }
        Command::Netflow(args) => {
            let query = args.to_query();
            let table = fetch(&client, SchemaKind::NetFlow, &query, Timeframe::Day, dump).await?;
            show_netflow(&table);
        }
        Command::DexTrades(args) => {
            let query = args.to_query();
            let table = fetch(&client, SchemaKind::DexTrades, &query, Timeframe::Day, dump).await?;
            show_dex_trades(&table);
        }
        Command::Dca(args) => {
            let query = args.to_query();
            let table = fetch(&client, SchemaKind::DcaEvents, &query, Timeframe::Day, dump).await?;
            show_dca_events(&table);
        }
        Command::Screener(args) => {
            let query = args.to_query()?;
            let table = fetch(&client, SchemaKind::Screener, &query, Timeframe::Day, dump).await?;
            show_screener(&table);
        }
        Command::FlowIntel(args) => {
            let query = args.to_flow_query()?;
            let kind = SchemaKind::FlowIntelligence;
            let table = fetch(&client, kind, &query, args.timeframe, dump).await?;
            render::title("Flow Intelligence");
            if table.is_empty() {
                println!("No flow intelligence data returned for the selected inputs.");
            } else {
                render::records(&table);
            }
        }
        Command::Candles { token, path } => {
            let query = token.to_flow_query()?;
            let records = client.token_candles(&query, path.as_deref()).await?;
            save_dump(dump, token.timeframe, &records)?;
            let table = table::normalize_records(SchemaKind::TokenCandles, records);
            show_candles(&table);
        }
        Command::PriceHistory(args) => {
            let query = args.to_history_query(Local::now().date_naive())?;
            let kind = SchemaKind::TokenFlows;
            let table = fetch(&client, kind, &query, args.timeframe, dump).await?;
            show_price_history(&table);
        }
    }
    Ok(())
}

/// Queries the endpoint serving `kind`, dumps the raw records if asked to
/// and normalizes them.
async fn fetch<P: Serialize>(
    client: &Client,
    kind: SchemaKind,
    query: &Query<P>,
    timeframe: Timeframe,
    dump: Option<&Path>,
) -> Result<Table> {
    let records = client.records(kind, query).await?;
    info!(%kind, records = records.len(), "fetched");
    save_dump(dump, timeframe, &records)?;
    Ok(table::normalize_records(kind, records))
}

fn save_dump(dump: Option<&Path>, timeframe: Timeframe, records: &[Record]) -> Result<()> {
    if let Some(path) = dump {
        RawSnapshot::now(timeframe, records.to_vec()).save(path)?;
        info!(path = %path.display(), "raw records saved");
    }
    Ok(())
}

fn show_inflows(table: &Table, args: &SmartMoneyArgs) {
    if table.is_empty() {
        println!("No inflows data returned for the selected filters.");
        return;
    }

    render::title("Most commonly traded tokens by Smart Money (last day)");
    let top = view::head(&view::sort_by(table, &[SortKey::desc("volume24hUSD")]), 20);
    render::table(
        &top,
        &[
            ("symbol", "Token"),
            ("chain", "Chain"),
            ("tokenAddress", "Address"),
            ("volume24hUSD", "24h Volume (USD)"),
            ("nofTraders", "#SM Traders"),
            ("sectors", "Sectors"),
            ("marketCap", "Market Cap (USD)"),
        ],
    );
    println!();
    render::bars(&top, "symbol", "volume24hUSD");

    render::title("New tokens significantly adopted by Smart Money");
    let new_tokens = view::max_age(table, "tokenAgeDaysNum", args.new_token_max_days as f64);
    let new_tokens = view::head(&view::sort_by(&new_tokens, &[SortKey::desc("volume24hUSD")]), 20);
    render::table(
        &new_tokens,
        &[
            ("symbol", "Token"),
            ("chain", "Chain"),
            ("tokenAddress", "Address"),
            ("tokenAgeDays", "Age (days)"),
            ("volume24hUSD", "24h Volume (USD)"),
            ("nofTraders", "#SM Traders"),
            ("sectors", "Sectors"),
            ("marketCap", "Market Cap (USD)"),
        ],
    );
}

fn show_holdings(table: &Table) {
    if table.is_empty() {
        println!("No holdings data returned for the selected filters.");
        return;
    }

    render::title("What tokens are Smart Money holding?");
    let top = view::head(&view::sort_by(table, &[SortKey::desc("balanceUsd")]), 50);
    render::table(
        &top,
        &[
            ("symbol", "Token"),
            ("chain", "Chain"),
            ("tokenAddress", "Address"),
            ("balanceUsd", "Balance (USD)"),
            ("balancePctChange24H", "Balance Change 24h (%)"),
            ("nofHolders", "#SM Holders"),
            ("shareOfHoldings", "Share of Holdings"),
            ("sectors", "Sectors"),
            ("marketCap", "Market Cap (USD)"),
        ],
    );
    println!();
    render::bars(&top, "symbol", "balanceUsd");
}

fn show_top_holdings(records: &[Record]) {
    if records.is_empty() {
        println!("No Smart Money token data available for the last 24 hours.");
        return;
    }
    println!("Timestamp: {}\n", Local::now().format("%Y-%m-%d %H:%M:%S"));
    println!("Top {} Tokens Held by Smart Money Wallets", records.len());
    println!("{}\n", "=".repeat(60));

    let holdings = table::normalize_records(SchemaKind::Holdings, records.to_vec());
    for i in 0..holdings.len() {
        let text = |column: &str| {
            holdings
                .get(i, column)
                .filter(|c| !c.is_missing())
                .map(|c| c.to_string())
                .unwrap_or_else(|| "N/A".to_string())
        };
        let number = |column: &str| {
            holdings
                .get(i, column)
                .and_then(|c| c.as_f64())
                .unwrap_or_default()
        };
        println!("{}. {}", i + 1, text("symbol"));
        println!("   Contract: {}", text("tokenAddress"));
        println!("   Chain: {}", text("chain"));
        println!("   Balance USD: ${:.2}", number("balanceUsd"));
        println!("   Holders: {}", text("nofHolders"));
        println!("   Balance Change 24h: {:.2}%", number("balancePctChange24H"));
        println!("   Market Cap: ${:.0}", number("marketCap"));
        println!("   Sectors: {}", text("sectors"));
        println!();
    }
}

fn show_netflow(table: &Table) {
    if table.is_empty() {
        println!("No netflow data returned for the selected filters.");
        return;
    }

    render::title("Smart Money net flows (24h)");
    let top = view::head(
        &view::sort_by(
            table,
            &[SortKey::desc("netflow_24h_usd"), SortKey::desc("netflow_7d_usd")],
        ),
        30,
    );
    render::table(
        &top,
        &[
            ("token_symbol", "Token"),
            ("chain", "Chain"),
            ("netflow_24h_usd", "Netflow 24h (USD)"),
            ("netflow_7d_usd", "Netflow 7d (USD)"),
            ("netflow_30d_usd", "Netflow 30d (USD)"),
            ("trader_count", "#Traders"),
            ("token_age_days", "Age (days)"),
            ("token_sectors", "Sectors"),
            ("market_cap_usd", "Market Cap (USD)"),
        ],
    );
    println!();
    render::bars(&top, "token_symbol", "netflow_24h_usd");
}

fn show_dex_trades(table: &Table) {
    if table.is_empty() {
        println!("No DEX trades returned for the selected filters.");
        return;
    }

    render::title("Latest Smart Money DEX trades");
    let latest = view::head(&view::sort_by(table, &[SortKey::desc("block_timestamp")]), 50);
    render::table(
        &latest,
        &[
            ("block_timestamp", "Time"),
            ("chain", "Chain"),
            ("trader_address_label", "Trader"),
            ("token_sold_symbol", "Sold"),
            ("token_sold_amount", "Sold Amount"),
            ("token_bought_symbol", "Bought"),
            ("token_bought_amount", "Bought Amount"),
            ("trade_value_usd", "Value (USD)"),
        ],
    );
}

fn show_dca_events(table: &Table) {
    if table.is_empty() {
        println!("No DCA events returned for the selected filters.");
        return;
    }

    render::title("Smart Money DCA vaults");
    let latest = view::sort_by(table, &[SortKey::desc("dca_created_at")]);
    render::table(
        &latest,
        &[
            ("dca_created_at", "Created"),
            ("dca_updated_at", "Updated"),
            ("trader_address_label", "Trader"),
            ("input_token_symbol", "Input"),
            ("output_token_symbol", "Output"),
            ("deposit_token_amount", "Deposit"),
            ("token_spent_amount", "Spent"),
            ("deposit_value_usd", "Deposit (USD)"),
            ("dca_status", "Status"),
        ],
    );
}

fn show_screener(table: &Table) {
    if table.is_empty() {
        println!("No screener data available.");
        return;
    }

    render::title("Significant Smart Money activity (by volume/netflow)");
    let significant = view::head(
        &view::sort_by(table, &[SortKey::desc("volume"), SortKey::desc("netflow")]),
        30,
    );
    render::table(
        &significant,
        &[
            ("tokenSymbol", "Token"),
            ("chain", "Chain"),
            ("tokenAddressHex", "Address"),
            ("volume", "Volume (USD)"),
            ("netflow", "Netflow (USD)"),
            ("buyVolume", "Buy Vol (USD)"),
            ("sellVolume", "Sell Vol (USD)"),
        ],
    );
    println!();
    render::bars(&significant, "tokenSymbol", "volume");

    render::title("Market metrics vs Smart Money movements");
    render::correlation(&view::correlation(table, &SCREENER_CORRELATION));
    println!("Correlation between price/liquidity/volume and SM netflow/buys/sells");

    render::title("Strong fundamentals (holder/trading proxies)");
    let fundamentals = view::head(
        &view::sort_by(table, &[SortKey::asc("fdvMcRatio"), SortKey::desc("volume")]),
        30,
    );
    render::table(
        &fundamentals,
        &[
            ("tokenSymbol", "Token"),
            ("chain", "Chain"),
            ("marketCap", "Market Cap (USD)"),
            ("fdv", "FDV (USD)"),
            ("fdvMcRatio", "FDV/MC"),
            ("volume", "Volume (USD)"),
            ("buyVolume", "Buy Vol (USD)"),
            ("sellVolume", "Sell Vol (USD)"),
        ],
    );

    render::title("Emerging tokens with fresh inflows");
    let emerging = view::max_age(table, "tokenAgeDaysNum", 30.0);
    let emerging = view::head(
        &view::sort_by(&emerging, &[SortKey::desc("netflow"), SortKey::desc("volume")]),
        30,
    );
    render::table(
        &emerging,
        &[
            ("tokenSymbol", "Token"),
            ("tokenAddressHex", "Address"),
            ("tokenAgeDays", "Age (days)"),
            ("netflow", "Netflow (USD)"),
            ("volume", "Volume (USD)"),
            ("liquidity", "Liquidity (USD)"),
            ("priceUsd", "Price (USD)"),
        ],
    );
}

fn show_candles(table: &Table) {
    if table.is_empty() {
        println!("No candle data available for this token/timeframe.");
        return;
    }

    render::title("Token Candles");
    let candles = view::sort_by(table, &[SortKey::asc("time")]);
    render::table(
        &candles,
        &[
            ("time", "Time"),
            ("open", "Open"),
            ("high", "High"),
            ("low", "Low"),
            ("close", "Close"),
            ("volume", "Volume"),
        ],
    );
}

fn show_price_history(table: &Table) {
    if table.is_empty() {
        println!("No price history available from flows for this selection.");
        return;
    }

    render::title("Price History");
    let history = view::sort_by(table, &[SortKey::asc("blockDate")]);
    render::table(
        &history,
        &[
            ("blockDate", "Date"),
            ("priceUsd", "Price (USD)"),
            ("value", "Value (USD)"),
            ("holdersCount", "Holders"),
        ],
    );
    println!();
    render::bars(&history, "blockDate", "priceUsd");
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_dump_keeps_timeframe() {
        let path = std::env::temp_dir().join("dashboard_dump_timeframe_test.json");
        let records = vec![json!({"blockDate": "2025-01-01"}).as_object().unwrap().clone()];
        save_dump(Some(&path), Timeframe::Week, &records).unwrap();

        let snapshot = RawSnapshot::load(&path).unwrap();
        assert_eq!(snapshot.timeframe, Timeframe::Week);
        assert_eq!(snapshot.data, records);
        std::fs::remove_file(&path).unwrap();
    }
}
