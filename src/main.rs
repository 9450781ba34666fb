use std::process::ExitCode;
use std::time::Duration;

use acm_factory::config::IssuanceSettings;
use acm_factory::core::types::{CertificateRequest, IssuanceOutcome, ValidationState};
use anyhow::{Context, Result};
use clap::Parser;
use log::error;

#[derive(Parser)]
#[command(name = "acm-factory")]
#[command(version)]
#[command(about = "Request an ACM certificate and validate it through Route 53 DNS records")]
struct Cli {
    /// Primary domain name of the certificate
    domain: String,

    /// Subject alternative name (repeatable)
    #[arg(long = "san", value_name = "NAME")]
    alternative_names: Vec<String>,

    /// AWS profile used for ACM
    #[arg(long)]
    profile: Option<String>,

    /// AWS profile used for Route 53, when the zone lives in another account
    #[arg(long)]
    dns_profile: Option<String>,

    /// AWS region the certificate is requested in
    #[arg(long)]
    region: Option<String>,

    /// Seconds between validation status checks
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    poll_interval: Option<u64>,

    /// Seconds to wait for validation before giving up
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Publish the validation records and exit without waiting
    #[arg(long)]
    no_wait: bool,

    /// Print the outcome as JSON
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn settings(&self) -> IssuanceSettings {
        let mut settings = IssuanceSettings::from_env();
        if let Some(profile) = &self.profile {
            settings.profile = profile.clone();
        }
        if let Some(profile) = &self.dns_profile {
            settings.dns_profile = profile.clone();
        }
        if let Some(region) = &self.region {
            settings.region = region.clone();
        }
        if let Some(secs) = self.poll_interval {
            settings.wait.poll_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = self.timeout {
            settings.wait.validation_timeout = Duration::from_secs(secs);
        }
        if self.no_wait {
            settings.wait.wait_for_validation = false;
        }
        settings
    }
}

fn init_logging(level: Option<&str>) {
    let env = env_logger::Env::default().default_filter_or(level.unwrap_or("info"));
    let mut builder = env_logger::Builder::from_env(env);
    if let Some(level) = level {
        builder.parse_filters(level);
    }
    builder.init();
}

fn print_outcome(outcome: &IssuanceOutcome, json: bool) -> Result<()> {
    if json {
        let rendered =
            serde_json::to_string_pretty(outcome).context("Failed to render outcome as JSON")?;
        println!("{rendered}");
        return Ok(());
    }
    println!("certificate: {}", outcome.certificate_arn);
    println!("zone:        {} ({})", outcome.zone.name, outcome.zone.id);
    for record in &outcome.records {
        println!(
            "record:      {} {} {}",
            record.record_type, record.name, record.value
        );
    }
    println!("state:       {}", outcome.state);
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    let settings = cli.settings();
    let request = CertificateRequest::new(cli.domain.clone(), cli.alternative_names.clone());

    let outcome = match acm_factory::run(&settings, &request) {
        Ok(outcome) => outcome,
        Err(err) => {
            error!("{err:#}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = print_outcome(&outcome, cli.json) {
        error!("{err:#}");
        return ExitCode::FAILURE;
    }

    match outcome.state {
        ValidationState::Failed => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    }
}
