use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config::{load_settings_from, DEFAULT_SETTINGS_FILE},
    HttpReelsApi, ReelController, SubmitOutcome,
};
use shared::domain::StockOption;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Upload and browse stock-tagged reels")]
struct Args {
    #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List tradable instruments, optionally filtered by label.
    Stocks {
        #[arg(long)]
        filter: Option<String>,
    },
    /// Show one page of the latest reels.
    Reels {
        #[arg(long, default_value_t = 1)]
        page: i64,
    },
    /// Upload a video tagged with a stock identifier or label.
    Upload {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        caption: String,
        #[arg(long)]
        stock: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let args = Args::parse();

    let settings = load_settings_from(&args.config);
    settings.validate()?;
    let api = HttpReelsApi::new(&settings)?;
    let controller = ReelController::new(Arc::new(api), &settings);

    let report = controller.initialize().await;
    for (directory, reason) in &report.failures {
        eprintln!("warning: {} unavailable: {reason}", directory.label());
    }

    match args.command {
        Command::Stocks { filter } => {
            let stocks = controller
                .stock_suggestions(filter.as_deref().unwrap_or_default())
                .await;
            for stock in stocks {
                println!("{:<12} {}", stock.value, stock.label);
            }
        }
        Command::Reels { page } => {
            let current = controller.change_page(page).await;
            let state = controller.snapshot().await;
            println!("Latest Reels (page {current} of {})", state.total_pages());
            for reel in state.current_page_reels() {
                println!("- {}", reel.caption);
                println!("    URL: {}", reel.media_url);
                println!("    Stock Identifier: {}", reel.stock_identifier);
                println!("    Likes: {}", reel.like_count);
            }
        }
        Command::Upload {
            file,
            caption,
            stock,
        } => {
            let state = controller.snapshot().await;
            let selected = resolve_stock(&state.stocks, &stock)
                .ok_or_else(|| anyhow!("unknown stock '{stock}'; run `stocks` to list choices"))?;

            controller.attach_file_from_path(&file).await?;
            controller.set_caption(caption).await;
            controller.select_stock(Some(selected)).await;

            match controller.submit().await? {
                SubmitOutcome::Uploaded => println!("Reel uploaded successfully!"),
                SubmitOutcome::Failed(reason) => bail!("Failed to upload reel reason: {reason}"),
            }
        }
    }

    Ok(())
}

/// Matches an exact identifier first, then a case-insensitive label.
fn resolve_stock(stocks: &[StockOption], wanted: &str) -> Option<StockOption> {
    let wanted = wanted.trim();
    stocks
        .iter()
        .find(|stock| stock.value.as_str() == wanted)
        .or_else(|| {
            stocks
                .iter()
                .find(|stock| stock.label.eq_ignore_ascii_case(wanted))
        })
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::resolve_stock;
    use shared::domain::{StockIdentifier, StockOption};

    fn stocks() -> Vec<StockOption> {
        vec![
            StockOption {
                label: "RELIANCE".into(),
                value: StockIdentifier::from_parts(1, "2885"),
            },
            StockOption {
                label: "TCS".into(),
                value: StockIdentifier::from_parts(1, "11536"),
            },
        ]
    }

    #[test]
    fn resolves_by_identifier_or_label() {
        let stocks = stocks();
        assert_eq!(
            resolve_stock(&stocks, "1@11536").map(|s| s.label),
            Some("TCS".to_string())
        );
        assert_eq!(
            resolve_stock(&stocks, "reliance").map(|s| s.value.0),
            Some("1@2885".to_string())
        );
        assert!(resolve_stock(&stocks, "INFY").is_none());
    }
}
