mod schema;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use diesel::pg::PgConnection;
use diesel::prelude::*;

#[derive(Parser)]
#[command(name = "foodgram")]
#[command(about = "Foodgram operational CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import ingredients from a CSV file with `name,measurement_unit` rows
    ImportIngredients {
        /// Path to the CSV file
        #[arg(long)]
        path: String,
    },
    /// Insert the default tag set for fresh deployments
    SeedTags,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let mut conn = PgConnection::establish(&database_url)
        .context("Failed to connect to the database")?;

    match cli.command {
        Commands::ImportIngredients { path } => import_ingredients(&mut conn, &path),
        Commands::SeedTags => seed_tags(&mut conn),
    }
}

/// Pulls (name, unit) out of a CSV record, skipping blank or short rows.
fn record_to_ingredient(record: &csv::StringRecord) -> Option<(String, String)> {
    let name = record.get(0)?.trim();
    let unit = record.get(1)?.trim();
    if name.is_empty() || unit.is_empty() {
        return None;
    }
    Some((name.to_string(), unit.to_string()))
}

fn import_ingredients(conn: &mut PgConnection, path: &str) -> Result<()> {
    use schema::ingredients;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path))?;

    let mut imported = 0usize;
    let mut skipped = 0usize;

    for result in reader.records() {
        let record = result.context("Failed to read CSV record")?;
        let Some((name, unit)) = record_to_ingredient(&record) else {
            tracing::warn!("Skipping malformed row: {:?}", record);
            skipped += 1;
            continue;
        };

        // Re-running the import over the same file is a no-op
        let inserted = diesel::insert_into(ingredients::table)
            .values((
                ingredients::name.eq(&name),
                ingredients::measurement_unit.eq(&unit),
            ))
            .on_conflict_do_nothing()
            .execute(conn)
            .with_context(|| format!("Failed to insert ingredient {}", name))?;

        if inserted > 0 {
            imported += 1;
        } else {
            tracing::debug!("Ingredient {} ({}) already present", name, unit);
            skipped += 1;
        }
    }

    tracing::info!("Imported {} ingredients, skipped {}", imported, skipped);
    Ok(())
}

const DEFAULT_TAGS: &[(&str, &str)] = &[
    ("Breakfast", "breakfast"),
    ("Lunch", "lunch"),
    ("Dinner", "dinner"),
];

fn seed_tags(conn: &mut PgConnection) -> Result<()> {
    use schema::tags;

    let mut created = 0usize;
    for (name, slug) in DEFAULT_TAGS {
        created += diesel::insert_into(tags::table)
            .values((tags::name.eq(name), tags::slug.eq(slug)))
            .on_conflict_do_nothing()
            .execute(conn)
            .with_context(|| format!("Failed to insert tag {}", name))?;
    }

    tracing::info!("Seeded {} tags", created);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_to_ingredient() {
        let record = csv::StringRecord::from(vec!["flour", "g"]);
        assert_eq!(
            record_to_ingredient(&record),
            Some(("flour".to_string(), "g".to_string()))
        );
    }

    #[test]
    fn test_record_trims_whitespace() {
        let record = csv::StringRecord::from(vec![" flour ", " g "]);
        assert_eq!(
            record_to_ingredient(&record),
            Some(("flour".to_string(), "g".to_string()))
        );
    }

    #[test]
    fn test_record_rejects_blank_fields() {
        let record = csv::StringRecord::from(vec!["", "g"]);
        assert_eq!(record_to_ingredient(&record), None);
    }

    #[test]
    fn test_record_rejects_short_rows() {
        let record = csv::StringRecord::from(vec!["flour"]);
        assert_eq!(record_to_ingredient(&record), None);
    }
}
