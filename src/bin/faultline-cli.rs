use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde_json::Value;
use url::Url;

#[derive(Parser)]
#[command(name = "faultline-cli")]
#[command(about = "Operator CLI for faultline circuit breakers", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    #[arg(short, long, env = "FAULTLINE_ADMIN_KEY")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show overall status and open breaker count
    Status,
    /// List every breaker with its counters
    List,
    /// Show one breaker
    Show { name: String },
    /// Force one breaker closed
    Reset { name: String },
    /// Force every breaker closed
    ResetAll,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    let (method, segments) = match &cli.command {
        Commands::Status => (Method::GET, vec!["admin", "status"]),
        Commands::List => (Method::GET, vec!["admin", "breakers"]),
        Commands::Show { name } => (Method::GET, vec!["admin", "breakers", name.as_str()]),
        Commands::Reset { name } => (Method::POST, vec!["admin", "breakers", name.as_str(), "reset"]),
        Commands::ResetAll => (Method::POST, vec!["admin", "breakers", "reset"]),
    };

    let res = client
        .request(method, admin_url(&cli.url, &segments)?)
        .headers(headers)
        .send()
        .await?;
    print_response(res).await
}

/// Append `segments` to the base URL, percent-encoding each one.
fn admin_url(base: &str, segments: &[&str]) -> Result<Url, Box<dyn std::error::Error>> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| format!("'{}' cannot be used as a base URL", base))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            if !text.is_empty() {
                eprintln!("Response: {}", text);
            }
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breaker_names_are_encoded_as_one_segment() {
        let url = admin_url("http://localhost:8081/", &["admin", "breakers", "geo/lookup v2?x", "reset"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8081/admin/breakers/geo%2Flookup%20v2%3Fx/reset");
    }

    #[test]
    fn test_base_path_is_kept() {
        let url = admin_url("http://ops.internal/faultline", &["admin", "status"]).unwrap();
        assert_eq!(url.as_str(), "http://ops.internal/faultline/admin/status");
    }

    #[test]
    fn test_non_base_url_is_rejected() {
        assert!(admin_url("mailto:ops@example.com", &["admin"]).is_err());
    }
}
