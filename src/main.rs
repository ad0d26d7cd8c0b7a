use clap::Parser;
use pact_mock_client::config::cli::{load_interactions, Command};
use pact_mock_client::core::registry::InteractionRegistry;
use pact_mock_client::utils::logger;
use pact_mock_client::{CliConfig, ControlError, MockService};

async fn execute(cli: &CliConfig) -> Result<(), ControlError> {
    let config = cli.resolve()?;
    let service = MockService::connect(
        config.endpoint()?,
        &config.transport_settings(),
        config.retry_policy(),
    )?;

    let mut session = service.session().await;
    match &cli.command {
        Command::Clear => {
            session.clear_all().await?;
            println!("✅ Interactions cleared");
        }
        Command::Add { files } => {
            // 每次呼叫都是獨立的 CLI 行程，註冊前不清除既有 interactions
            let mut interactions = Vec::new();
            for file in files {
                interactions.extend(load_interactions(file)?);
            }
            let retry = config.retry_policy();
            let registry = InteractionRegistry::new(service.transport(), &retry);
            let count = registry.add_all(&interactions).await?;
            println!("✅ Registered {} interactions", count);
        }
        Command::Verify => {
            session.verify().await?;
            println!("✅ All interactions verified");
        }
        Command::Write => {
            session.write_contract().await?;
            println!(
                "✅ Pact written for {} -> {}",
                service.endpoint().consumer,
                service.endpoint().provider
            );
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    logger::init_logger(logger::LogFormat::from_env(), cli.verbose);
    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = execute(&cli).await {
        tracing::error!("❌ {} failed: {}", command_name(&cli.command), e);
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        // mock service 的診斷內容原樣輸出
        eprintln!("❌ {}", e.detail());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }

    Ok(())
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Clear => "clear",
        Command::Add { .. } => "add",
        Command::Verify => "verify",
        Command::Write => "write",
    }
}
