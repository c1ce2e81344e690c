//! certpush - deploy TLS certificates to firewall appliances

use std::process::ExitCode;

use certpush_cli::cli::Cli;
use certpush_cli::output::json::format_error;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "certpush_cli=warn",
        1 => "certpush_cli=info",
        _ => "certpush_cli=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let json = cli.json;
    match cli.run().await {
        Ok(code) => code,
        Err(e) => {
            let message = format!("{e:#}");
            match format_error(&message, error_code(&e)) {
                Ok(out) if json => println!("{out}"),
                _ => eprintln!("Error: {message}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn error_code(e: &anyhow::Error) -> &'static str {
    use certpush_cli::domain::{ConfigError, DeployError};
    match e.downcast_ref::<DeployError>() {
        Some(DeployError::ConfigMissing { .. }) => "config_missing",
        Some(DeployError::ArtifactUnreadable { .. }) => "artifact_unreadable",
        Some(DeployError::InvalidCertificateName(_)) => "invalid_certificate_name",
        None if e.downcast_ref::<ConfigError>().is_some() => "invalid_config",
        None => "error",
    }
}
