//! reseller-api-cli — issue authenticated requests against the reseller gateway.
//!
//! Usage:
//!   reseller-api-cli get <path>                                 Print the response body
//!   reseller-api-cli list <path> [--page N] [--per-page N]      Print one page of a collection
//!   reseller-api-cli whoami                                     Show claims of the access token

use reseller_api::session::Session;
use reseller_api::types::PageRequest;
use reseller_api::{ApiClient, CredentialSupplier, Error};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let outcome = match args[1].as_str() {
        "get" => cmd_get(&args[2..]).await,
        "list" => cmd_list(&args[2..]).await,
        "whoami" => cmd_whoami(),
        "version" | "--version" | "-V" => {
            println!("reseller-api-cli {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(e) = outcome {
        report(&e);
        std::process::exit(1);
    }
}

fn print_usage() {
    println!(
        r#"reseller-api-cli — reseller gateway command-line client

USAGE:
    reseller-api-cli <COMMAND> [OPTIONS]

COMMANDS:
    get <path>                              GET a path and print the JSON body
    list <path> [--page N] [--per-page N]   GET one page of a collection
    whoami                                  Decode the access token's profile claims
    version                                 Show version information
    help                                    Show this help message

ENVIRONMENT:
    RESELLER_API_BASE_URL       Gateway base URL (required)
    RESELLER_ACCESS_TOKEN       Bearer token; requests are sent unauthenticated when unset
    RUST_LOG                    Log filter (default: warn)"#
    );
}

fn report(err: &anyhow::Error) {
    match err.downcast_ref::<Error>() {
        Some(Error::Remote { status, body, .. }) => {
            eprintln!("error: HTTP {status}");
            if !body.is_empty() {
                eprintln!("{body}");
            }
            if *status == 401 {
                eprintln!("hint: RESELLER_ACCESS_TOKEN is missing or expired");
            }
        }
        _ => eprintln!("error: {err:#}"),
    }
}

fn build_client() -> anyhow::Result<ApiClient> {
    let base_url = required_base_url(std::env::var("RESELLER_API_BASE_URL").ok())?;
    let client = ApiClient::builder()
        .base_url(base_url)
        .credential_supplier(|| std::env::var("RESELLER_ACCESS_TOKEN").ok())
        .on_unauthorized(|| tracing::warn!("gateway rejected the access token"))
        .build()?;
    Ok(client)
}

fn required_base_url(value: Option<String>) -> anyhow::Result<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("missing required environment variable RESELLER_API_BASE_URL"))
}

fn flag_value(args: &[String], name: &str) -> anyhow::Result<Option<u64>> {
    for (i, arg) in args.iter().enumerate() {
        if arg == name {
            let raw = args
                .get(i + 1)
                .ok_or_else(|| anyhow::anyhow!("{name} requires a value"))?;
            let n = raw
                .parse::<u64>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| anyhow::anyhow!("{name} expects a positive integer, got {raw:?}"))?;
            return Ok(Some(n));
        }
    }
    Ok(None)
}

fn require_path(args: &[String]) -> anyhow::Result<&str> {
    args.first()
        .map(String::as_str)
        .filter(|p| !p.starts_with("--"))
        .ok_or_else(|| anyhow::anyhow!("missing <path> argument"))
}

async fn cmd_get(args: &[String]) -> anyhow::Result<()> {
    let path = require_path(args)?;
    let client = build_client()?;
    let body = client.get_json(path).await?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

async fn cmd_list(args: &[String]) -> anyhow::Result<()> {
    let path = require_path(args)?;
    let defaults = PageRequest::default();
    let page = PageRequest::new(
        flag_value(args, "--page")?.unwrap_or(defaults.page),
        flag_value(args, "--per-page")?.unwrap_or(defaults.per_page),
    );
    let client = build_client()?;
    let body: serde_json::Value = client.get_with_query(path, &page.to_query()).await?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

fn cmd_whoami() -> anyhow::Result<()> {
    let token = std::env::var("RESELLER_ACCESS_TOKEN")
        .map_err(|_| anyhow::anyhow!("RESELLER_ACCESS_TOKEN is not set"))?;
    let session = Session::new();
    let user = session.sign_in_with_token(&token)?;
    let expired = session.access_token().is_none();

    println!("{}", serde_json::to_string_pretty(&user)?);
    if expired {
        eprintln!("warning: access token is expired");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_flag_value_rejects_zero_and_garbage() {
        let list = args(&["/v1/vms", "--page", "0"]);
        let err = flag_value(&list, "--page").unwrap_err();
        assert!(err.to_string().contains("positive integer"));

        assert!(flag_value(&args(&["--page", "two"]), "--page").is_err());
        assert!(flag_value(&args(&["--page"]), "--page").is_err());
        assert_eq!(flag_value(&args(&["--page", "3"]), "--page").unwrap(), Some(3));
        assert_eq!(flag_value(&args(&["/v1/vms"]), "--page").unwrap(), None);
    }

    #[test]
    fn test_missing_base_url_names_the_variable() {
        let err = required_base_url(None).unwrap_err();
        assert!(err.to_string().contains("RESELLER_API_BASE_URL"));
        assert!(required_base_url(Some("  ".into())).is_err());
        assert_eq!(
            required_base_url(Some("https://gw.example.com".into())).unwrap(),
            "https://gw.example.com"
        );
    }
}
