use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use claim_investigator::app::AppState;
use claim_investigator::model::Config;

/// Claim investigated when no arguments are given
const DEMO_CLAIM_ID: &str = "CLM-2025-88X";
const DEMO_CLAIM_TEXT: &str =
    "I was doing a food delivery when I hit a bumper at 2 AM near the warehouse.";

const USAGE: &str = "usage: claim-investigator [<claim_id> <claim_text>...]";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present (ignore if missing)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut args = std::env::args().skip(1);
    let (claim_id, claim_text) = match args.next() {
        None => (DEMO_CLAIM_ID.to_string(), DEMO_CLAIM_TEXT.to_string()),
        Some(claim_id) => {
            let claim_text = args.collect::<Vec<_>>().join(" ");
            if claim_text.is_empty() {
                eprintln!("{}", USAGE);
                std::process::exit(2);
            }
            (claim_id, claim_text)
        }
    };

    let config = Config::from_env();
    let state = AppState::new(config).await?;

    tracing::info!(claim_id = %claim_id, "Starting claim investigation");

    let case = state.investigate(&claim_id, &claim_text).await?;
    println!("{}", serde_json::to_string_pretty(&case)?);

    Ok(())
}
