//! Export every stored lunch rating as CSV
//!
//! Usage: export-ratings [--output FILE] [--summary]
//!   --output FILE  : Write the CSV to FILE (stdout if not specified)
//!   --summary      : Also log the per-category averages

use std::io::Write;

use clap::Parser;
use serde::Serialize;

use lunch_rating_api::{
    db,
    models::rating::RatingRecord,
    services::{aggregation, ratings::PgRatingStore, store::RatingStore},
};

#[derive(Parser)]
#[command(name = "export-ratings", about = "Export lunch ratings as CSV")]
struct Args {
    /// Destination file (stdout if not specified)
    #[arg(long)]
    output: Option<std::path::PathBuf>,

    /// Log averages, counts and comments after exporting
    #[arg(long)]
    summary: bool,
}

/// One CSV line, flattened from a rating.
#[derive(Serialize)]
struct CsvRow<'a> {
    day: &'a str,
    date: String,
    vegan: u8,
    vegetarian: u8,
    meat_fish: u8,
    salad: u8,
    dessert: u8,
    comment: &'a str,
}

impl<'a> From<&'a RatingRecord> for CsvRow<'a> {
    fn from(r: &'a RatingRecord) -> Self {
        Self {
            day: r.day.label(),
            date: r.date.to_rfc3339(),
            vegan: r.categories.vegan,
            vegetarian: r.categories.vegetarian,
            meat_fish: r.categories.meat_fish,
            salad: r.categories.salad,
            dessert: r.categories.dessert,
            comment: &r.comment,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("Missing required env var: DATABASE_URL"))?;
    let pool = db::create_pool(&database_url, 2).await?;
    let store = PgRatingStore::new(pool);

    let records = store.fetch_all().await?;
    tracing::info!("Exporting {} rating(s)", records.len());

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(std::fs::File::create(path)?),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut writer = csv::Writer::from_writer(sink);
    for record in &records {
        writer.serialize(CsvRow::from(record))?;
    }
    writer.flush()?;

    if args.summary {
        let overview = aggregation::overview(&records);
        tracing::info!("{}", overview.total_label);
        for stats in &overview.categories {
            tracing::info!(
                "{} {}: {} ({})",
                stats.emoji,
                stats.label,
                stats.average_display,
                stats.count_label
            );
        }
        for entry in &overview.comments {
            tracing::info!("[{}] {}", entry.day, entry.comment);
        }
    }

    Ok(())
}
