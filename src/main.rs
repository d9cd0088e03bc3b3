use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use category_seed::endpoints::endpoint_listing;
use category_seed::{
    label_for, logging, reconcile, report, Catalog, CategoryStore, CategoryType, Config,
    EntryAction, ReconciliationReport, SqliteStore,
};

#[derive(Debug, Parser)]
#[command(name = "category-seed", version)]
#[command(about = "Seed and inspect the categories reference table", long_about = None)]
struct Cli {
    /// SQLite database file (overrides CATEGORIES_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Insert every catalog entry that is not stored yet
    Seed(SeedArgs),
    /// Print the stored categories per type
    Show {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Open the store and drive the read endpoints in-process
    #[cfg(feature = "server")]
    Check,
    /// GET every read endpoint of a running server
    #[cfg(feature = "smoke")]
    Smoke {
        /// Server base URL (overrides CATEGORIES_BASE_URL)
        #[arg(long)]
        base_url: Option<String>,
    },
}

#[derive(Debug, Args)]
struct SeedArgs {
    /// Continue even when the table already holds categories
    #[arg(long, env = "CATEGORIES_SEED_FORCE")]
    force: bool,

    /// JSON catalog to seed instead of the built-in one
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("\n❌ {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    logging::init(config.log_profile);

    match cli.command {
        Commands::Seed(args) => run_seed(&config, args),
        Commands::Show { json } => run_show(&config, json),
        #[cfg(feature = "server")]
        Commands::Check => run_check(&config),
        #[cfg(feature = "smoke")]
        Commands::Smoke { base_url } => run_smoke(&config, base_url),
    }
}

fn open_store(config: &Config) -> Result<SqliteStore> {
    SqliteStore::open(&config.db_path, config.busy_timeout)
        .with_context(|| format!("Failed to open database {}", config.db_path.display()))
}

fn builtin_types() -> Vec<&'static str> {
    CategoryType::ALL.iter().map(|t| t.as_str()).collect()
}

fn run_seed(config: &Config, args: SeedArgs) -> Result<()> {
    let catalog = match &args.catalog {
        Some(path) => Catalog::from_json_file(path)
            .with_context(|| format!("Failed to load catalog {}", path.display()))?,
        None => Catalog::builtin(),
    };

    if !args.json {
        println!("🚀 Categories Data Insertion");
        println!("{}", "=".repeat(50));
        println!("📂 Database: {}", config.db_path.display());
        println!("📚 Catalog: {} entries in {} types", catalog.len(), catalog.category_types().len());
    }

    let mut store = open_store(config)?;

    if let Some(existing) = existing_rows_without_force(&store, args.force)? {
        tracing::info!(existing, "table not empty, seeding cancelled");
        if args.json {
            let json = serde_json::json!({ "cancelled": true, "existing_rows": existing });
            println!("{}", serde_json::to_string_pretty(&json)?);
        } else {
            println!("\n⚠️  Categories table already has {} records.", existing);
            println!("   Operation cancelled. Re-run with --force to add missing entries.");
        }
        return Ok(());
    }

    let outcome = reconcile(&mut store, &catalog).context("Failed to insert categories")?;
    let listing = report(&store, &catalog.category_types())?;

    if args.json {
        let json = serde_json::json!({
            "reconciliation": outcome,
            "categories": listing,
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    print_reconciliation(&outcome);

    print!("{}", listing.render());

    println!("\n✅ Data insertion completed successfully!");
    println!("🔗 You can now use the APIs to access the categories:");
    for line in endpoint_listing() {
        println!("   • {}", line);
    }

    Ok(())
}

/// Row count (soft-deleted rows included) when a non-empty table should stop
/// the seed because `--force` was not given
fn existing_rows_without_force<S: CategoryStore>(store: &S, force: bool) -> Result<Option<i64>> {
    if force {
        return Ok(None);
    }

    let existing = store.count_all()?;
    Ok((existing > 0).then_some(existing))
}

fn print_reconciliation(outcome: &ReconciliationReport) {
    if outcome.existing_before > 0 {
        println!(
            "\n⚠️  Categories table already has {} records.",
            outcome.existing_before
        );
        println!("🔄 Continuing to add new data (skipping duplicates)...");
    }

    for summary in &outcome.per_type {
        println!("\n📝 Processing {} categories...", summary.category_type);

        for entry in outcome
            .outcomes
            .iter()
            .filter(|o| o.category_type == summary.category_type)
        {
            match entry.action {
                EntryAction::Inserted => println!("  ✅ Added: {}", entry.name),
                EntryAction::Skipped => println!("  ⏭️  {} already exists, skipping...", entry.name),
                EntryAction::SkippedConflict => {
                    println!("  ⏭️  {} was added concurrently, skipping...", entry.name)
                }
            }
        }
    }

    println!("\n🎉 Successfully inserted {} new categories!", outcome.inserted_count);
    if outcome.skipped_count > 0 {
        println!("⏭️  Skipped {} existing categories", outcome.skipped_count);
    }

    println!("\n📊 Final Summary by category type:");
    for summary in &outcome.per_type {
        println!(
            "  📋 {}: {} items",
            label_for(&summary.category_type),
            summary.active_count
        );
    }
    println!("\n🎯 Total active categories in database: {}", outcome.total_active);
}

fn run_show(config: &Config, json: bool) -> Result<()> {
    let store = open_store(config)?;
    let listing = report(&store, &builtin_types())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
    } else {
        println!("\n📋 Current Categories in Database:");
        println!("{}", "=".repeat(60));
        print!("{}", listing.render());
    }

    Ok(())
}

#[cfg(feature = "server")]
fn run_check(config: &Config) -> Result<()> {
    use category_seed::api::{check_endpoint, check_paths, router, AppState};

    println!("🔍 Checking category store and endpoints");
    println!("{}", "=".repeat(50));

    let store = open_store(config)?;
    println!("✅ Database connection working - {} active categories", store.count_all_active()?);
    for category_type in CategoryType::ALL {
        println!(
            "   📋 {}: {} items",
            category_type.as_str(),
            store.count_active(category_type.as_str())?
        );
    }

    let app = router(AppState::new(store));
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;

    println!("\n🧪 Testing API endpoints...");
    let mut failed = 0;
    for path in check_paths() {
        let result = runtime.block_on(check_endpoint(app.clone(), &path))?;
        if result.passed() {
            println!("✅ GET {} - Working", path);
        } else {
            failed += 1;
            println!("❌ GET {} - Status: {}", path, result.status);
        }
    }

    if failed > 0 {
        anyhow::bail!("{} endpoint check(s) failed", failed);
    }

    println!("\n🎉 All checks completed! The APIs are ready to use.");
    println!("🚀 To start the server, run: category-server");
    Ok(())
}

#[cfg(feature = "smoke")]
fn run_smoke(config: &Config, base_url: Option<String>) -> Result<()> {
    use category_seed::smoke::{CheckOutcome, SmokeTester};

    let base_url = base_url.unwrap_or_else(|| config.base_url.clone());
    let tester = SmokeTester::new(&base_url)?;

    println!("🚀 Testing Category APIs");
    println!("{}", "=".repeat(50));

    let summary = tester.run();

    for check in &summary.checks {
        println!("\n🔍 Testing: {}", check.description);
        println!("📡 URL: {}", check.url);
        match &check.outcome {
            CheckOutcome::Passed { items: Some(count) } => {
                println!("✅ Success! Found {} items", count)
            }
            CheckOutcome::Passed { items: None } => println!("⚠️  Success but no data returned"),
            CheckOutcome::Failed { status, error } => {
                println!("❌ Failed with status {}", status);
                println!("   Error: {}", error.as_deref().unwrap_or("Unknown error"));
            }
            CheckOutcome::Unreachable { reason } => println!("❌ Connection Error: {}", reason),
        }
    }

    println!("\n{}", "=".repeat(50));
    println!("📊 TEST SUMMARY");
    println!("{}", "=".repeat(50));
    for check in &summary.checks {
        let status = if check.passed() { "✅ PASS" } else { "❌ FAIL" };
        println!("{} - {}", status, check.description);
    }
    println!("\n🎯 Results: {}/{} tests passed", summary.passed(), summary.total());

    if !summary.all_passed() {
        anyhow::bail!(
            "{} of {} smoke checks failed; is the server running at {}?",
            summary.total() - summary.passed(),
            summary.total(),
            summary.base_url
        );
    }

    println!("🎉 All tests passed! APIs are working correctly.");
    Ok(())
}
