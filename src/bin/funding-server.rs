//! Startup Funding Dashboard API Binary
//!
//! Run with: `cargo run --bin funding-server`

use funding_insights::{run_server, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Note: Tracing is initialized in run_server()
    // Set RUST_LOG environment variable to control log level:
    //   RUST_LOG=debug cargo run --bin funding-server
    //   RUST_LOG=funding_insights::views=debug cargo run --bin funding-server  (views only)

    // HOST, PORT and DATASET_PATH override the defaults
    let config = ServerConfig::from_env();

    println!("Starting Startup Funding Dashboard API...");
    println!("   Host: {}", config.host);
    println!("   Port: {}", config.port);
    println!("   Dataset: {}", config.dataset_path.display());
    println!();
    println!(
        "Server will be available at: http://{}:{}",
        config.host, config.port
    );
    println!();
    println!("Available endpoints:");
    println!("  GET  /health                    - Health check");
    println!("  GET  /selection                 - Startups, investors and years to pick from");
    println!("  GET  /overview?year=&metric=    - Overall analysis");
    println!("  GET  /startups/:name            - Startup details");
    println!("  GET  /investors/:name           - Investor details");
    println!("  GET  /aggregate/:op/:field      - Sum/count grouped by a field");
    println!("  POST /dataset/reload            - Reload the dataset if it changed");
    println!();

    run_server(config).await?;

    Ok(())
}
