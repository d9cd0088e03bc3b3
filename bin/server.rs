// Category Seed - Web Server
// Read-only REST API over the categories table

use anyhow::{Context, Result};
use category_seed::api::{router, AppState};
use category_seed::endpoints::endpoint_listing;
use category_seed::{logging, CategoryStore, Config, SqliteStore};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    logging::init(config.log_profile);

    println!("🚀 Starting Categories Backend Server...");
    println!("{}", "=".repeat(50));

    if !config.db_path.exists() {
        eprintln!("❌ Database not found at {:?}", config.db_path);
        eprintln!("   Run: category-seed seed");
        eprintln!("   to insert the categories first.");
        std::process::exit(1);
    }

    let store = SqliteStore::open(&config.db_path, config.busy_timeout)
        .with_context(|| format!("Failed to open database {}", config.db_path.display()))?;
    println!(
        "✓ Database opened: {:?} ({} active categories)",
        config.db_path,
        store.count_all_active()?
    );

    let app = router(AppState::new(store));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    println!("📡 Server available at: http://{}", config.bind_addr);
    println!("🔗 Category APIs available at:");
    for line in endpoint_listing() {
        println!("   • {}", line);
    }
    println!("{}", "=".repeat(50));
    println!("💡 Press Ctrl+C to stop the server\n");

    tracing::info!(addr = %config.bind_addr, "server listening");

    axum::serve(listener, app)
        .await
        .context("Server stopped with an error")?;

    Ok(())
}
