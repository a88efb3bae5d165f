use anyhow::{bail, Context};
use clap::Parser;
use serde::Serialize;
use soc_proof::adapters::export::{export_services, write_services};
use soc_proof::config::{CliConfig, ClientConfig, Command};
use soc_proof::utils::{logger, validation::Validate};
use soc_proof::{OrderQuery, SocProofClient};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    if let Err(e) = run(cli).await {
        tracing::error!("❌ {:#}", e);
        if let Some(api_error) = e.downcast_ref::<soc_proof::SocProofError>() {
            eprintln!("💡 {}", api_error.recovery_suggestion());
        }
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: CliConfig) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => ClientConfig::default(),
    };
    if let Some(token) = cli.resolve_token() {
        config.api.token = token;
    }
    if config.api.token.trim().is_empty() {
        bail!("no API token: pass --token, set SOC_PROOF_TOKEN or add [api] token to the config file");
    }
    config.validate()?;
    tracing::debug!(api = %config.api.url, cache = config.cache.enabled, "client configured");

    let client = SocProofClient::from_config(&config)?;

    match cli.command {
        Command::Services {
            language,
            refresh,
            format,
            output,
        } => {
            let services = client.load_services(language, refresh).await?;
            match output {
                Some(path) => {
                    export_services(&path, &services, format)?;
                    println!("✅ {} services written to {}", services.len(), path.display());
                }
                None => {
                    write_services(std::io::stdout().lock(), &services, format)?;
                    println!();
                }
            }
        }
        Command::Service { id, language } => print_json(&client.get_service(id, language).await?)?,
        Command::Descriptions { language } => {
            let catalog = client.load_descriptions(language, false).await?;
            let entries: Vec<_> = catalog.into_values().collect();
            print_json(&entries)?;
        }
        Command::Add {
            service,
            link,
            quantity,
        } => {
            let order_id = client.add_order(service, &link, quantity).await?;
            println!("✅ Order created: {}", order_id);
        }
        Command::Status { orders } => {
            let orders: Vec<String> = orders
                .into_iter()
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
            print_json(&client.get_status(OrderQuery::Many(orders)).await?)?;
        }
        Command::Balance => print_json(&client.get_balance().await?)?,
    }

    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
