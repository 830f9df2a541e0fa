//! calcfield API server binary
//!
//! HTTP REST API for formula validation and calculated-field building.

use calcfield::api::{run_api_server, server::ApiConfig};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "calcfield-server")]
#[command(version)]
#[command(about = "calcfield API server - HTTP REST API for calculated-field formulas")]
#[command(long_about = r#"
calcfield API server

Endpoints:
  - GET  /api/v1/functions  - List catalog functions (?category=math|string|...)
  - POST /api/v1/validate   - Validate a formula against a field list
  - POST /api/v1/fields     - Build a calculated field (alias + valid formula)

Additional endpoints:
  - GET  /health            - Health check
  - GET  /version           - Server version info
  - GET  /                  - API documentation

Logging is controlled with RUST_LOG (default: info).

Example usage:
  calcfield-server                           # Start on localhost:8080
  calcfield-server --host 0.0.0.0 --port 3000

  curl -X POST http://localhost:8080/api/v1/validate \
    -H "Content-Type: application/json" \
    -d '{"formula": "SUM({claim_amount})", "fields": [{"id": "claim_amount", "name": "Claim Amount", "type": "number"}]}'
"#)]
struct Args {
    /// Host address to bind to (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, default_value = "127.0.0.1", env = "CALCFIELD_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "CALCFIELD_PORT")]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = ApiConfig {
        host: args.host,
        port: args.port,
    };

    run_api_server(config).await
}
