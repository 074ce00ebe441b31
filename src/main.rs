use neonest::cli::{commands, init, output::Output, Cli, Commands};
use neonest::utils::toml_config::{ConfigManager, LoggingConfig, NeonestConfig};
use neonest::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// `RUST_LOG` wins over the configured level; logs go to stderr.
fn init_tracing(logging: &LoggingConfig, verbose: bool) {
    let default_level = if verbose { "debug" } else { logging.level.as_str() };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if logging.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };
    result.ok();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    let config = match &cli.command {
        // init runs before any config exists
        Commands::Init { .. } => NeonestConfig::default(),
        _ => NeonestConfig::load_or_default(&cli.config)?,
    };
    init_tracing(&config.logging, cli.verbose);

    if let Err(e) = run(cli, config, &output).await {
        output.error(&format!("{:#}", e));
        std::process::exit(1);
    }
    Ok(())
}

async fn run(cli: Cli, config: NeonestConfig, output: &Output) -> anyhow::Result<()> {
    let state = |config: NeonestConfig| -> anyhow::Result<AppState> {
        let manager = ConfigManager::from_config(config);
        Ok(AppState::new(manager, cli.lang.as_deref())?)
    };

    match &cli.command {
        Commands::Init {
            path,
            force,
            base_url,
        } => {
            let result = init::run(
                init::InitConfig {
                    path: path.clone(),
                    force: *force,
                    base_url: base_url.clone(),
                },
                output,
            );
            if let init::InitResult::Error(e) = result {
                anyhow::bail!("init failed: {}", e);
            }
        }
        Commands::Config { full, validate } => commands::config(&config, *full, *validate, output)?,
        Commands::Login { email, password } => {
            commands::login(&state(config)?, email, password, output).await?
        }
        Commands::Signup {
            name,
            email,
            password,
        } => commands::signup(&state(config)?, name, email, password, output).await?,
        Commands::Logout => commands::logout(&state(config)?, output)?,
        Commands::Sleep(command) => {
            commands::sleep(&state(config)?, command.clone(), output).await?
        }
        Commands::Resources { filter, kind } => {
            commands::resources(&state(config)?, filter, kind, output)?
        }
        Commands::Faq { filter } => commands::faq(&state(config)?, filter, output)?,
        Commands::Chat {
            message,
            role,
            quick,
            new,
        } => commands::chat(&state(config)?, message, role, *quick, *new, output).await?,
    }

    Ok(())
}
