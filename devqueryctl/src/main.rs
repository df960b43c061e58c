//! devquery CLI
//!
//! Command-line interface for reading device values from a device-control server.

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use devquery_core::Query;
use devqueryctl::cli::{
    build_client, generate_completion, handle_get, handle_list, handle_master_state, handle_state,
    Action, Cli,
};
use devqueryctl::config::CliConfig;
use tracing::debug;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let Some(action) = cli.action() else {
        // The required argument group makes this unreachable in practice
        report_error(&anyhow::anyhow!("No action given"), false, cli.quiet);
        std::process::exit(1);
    };

    if let Action::Completions(shell) = action {
        generate_completion(shell);
        return Ok(());
    }

    // Build configuration using priority chain: defaults → file → env → CLI args
    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            report_error(&e.context("Configuration error"), cli.verbose, cli.quiet);
            std::process::exit(1);
        }
    };

    let verbose = config.verbose && !cli.quiet;
    init_tracing(verbose, cli.quiet);
    debug!("Configuration: {:?}", config);

    // Validate the query before any client exists, so bad input never reaches the network
    let query = match &action {
        Action::Get { target, .. } => match Query::parse(target) {
            Ok(query) => Some(query),
            Err(e) => {
                report_error(&e.into(), verbose, cli.quiet);
                std::process::exit(1);
            }
        },
        _ => None,
    };

    let client = match build_client(&config) {
        Ok(client) => client,
        Err(e) => {
            report_error(&e.into(), verbose, cli.quiet);
            std::process::exit(1);
        }
    };

    let result = match (&action, &query) {
        (Action::Get { named, .. }, Some(query)) => {
            handle_get(
                &client,
                query,
                cli.value_type.into(),
                *named,
                &cli.format,
            )
            .await
        }
        (Action::List { device }, _) => handle_list(&client, device, &cli.format).await,
        (Action::State { devices }, _) => handle_state(&client, devices, &cli.format).await,
        (Action::MasterState(condition), _) => {
            handle_master_state(&client, *condition, &cli.format).await
        }
        _ => Ok(()),
    };

    if let Err(e) = result {
        report_error(&e, verbose, cli.quiet);
        std::process::exit(1);
    }

    Ok(())
}

fn build_config(cli: &Cli) -> Result<CliConfig> {
    let mut builder = CliConfig::builder();

    // Load config file (unless --no-config is specified)
    if !cli.no_config {
        builder = builder.with_config_file(cli.config.as_deref())?;
    }

    // Apply environment variable overrides
    builder = builder.with_env_overrides()?;

    // Apply CLI argument overrides (highest priority)
    if let Some(ref url) = cli.url {
        builder = builder.with_server_url(url)?;
    }
    if let Some(ref user) = cli.user {
        builder = builder.with_username(user);
    }
    if let Some(ref password) = cli.password {
        builder = builder.with_password(password);
    }
    if let Some(timeout) = cli.timeout {
        builder = builder.with_timeout(timeout)?;
    }
    if cli.verbose {
        builder = builder.with_verbose(true);
    }

    builder.build()
}

fn report_error(err: &anyhow::Error, verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    eprintln!("{} {:#}", "Error:".red().bold(), err);
    if verbose {
        eprintln!("Error details: {:?}", err);
    }
}

fn init_tracing(verbose: bool, quiet: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("off")
    } else if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // Logs go to stderr so stdout only carries values
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
