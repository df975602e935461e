use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "tunnelctl")]
#[command(about = "Command-line client for the tunnel panel", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:14333", env = "TUNNEL_PANEL_URL")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show whether the tunnel is running
    Status,
    /// Start the tunnel
    Start,
    /// Stop the tunnel
    Stop,
    /// Print the saved tunnel configuration
    Config,
    /// Print panel build information
    Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let request = match cli.command {
        Commands::Status => client.get(format!("{}/api/status", base)),
        Commands::Start => client
            .post(format!("{}/api/control", base))
            .json(&json!({ "action": "start" })),
        Commands::Stop => client
            .post(format!("{}/api/control", base))
            .json(&json!({ "action": "stop" })),
        Commands::Config => client.get(format!("{}/api/config", base)),
        Commands::Version => client.get(format!("{}/api/version", base)),
    };

    let res = request.send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: panel returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text.trim_end());
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
