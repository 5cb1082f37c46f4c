use anyhow::Context;
use ccgen::cli::{Args, ConfigDiscovery, ExecutionMode, GenerateConfig, GenerationDefaults};
use ccgen::config::{ConfigResolver, Environment};
use ccgen::env::defaults;
use ccgen::llm::{CodeGenerator, PromptBuilder, ProviderFactory};
use ccgen::output;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let mode = args.mode();

    let verbose = matches!(&mode, ExecutionMode::Generate(config) if config.verbose);
    init_logging(verbose);

    let result = match mode {
        ExecutionMode::Generate(config) => run_generate(config).await,
        ExecutionMode::ShowConfig => {
            show_config();
            Ok(())
        }
    };

    if let Err(e) = result {
        error!("Code generation failed: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let fallback = if verbose {
        defaults::VERBOSE_LOG_FILTER
    } else {
        defaults::LOG_FILTER
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_generate(config: GenerateConfig) -> anyhow::Result<()> {
    let env = Environment::from_process();

    let provider_config = ConfigResolver::resolve(&env)?;
    ConfigResolver::log_config(&provider_config);

    let file_defaults = match &config.config_override {
        Some(path) => {
            info!("Loading configuration override from: {:?}", path);
            GenerationDefaults::from_toml_file(path)?
        }
        None => ConfigDiscovery::discover_config()?,
    };
    let request = file_defaults.build_request(&config, &env)?;

    info!("Generating code with prompt: {}", request.prompt);

    if config.dry_run {
        println!("Mode: {} ({})", provider_config.mode, provider_config.mode.label());
        println!("Output: {}", request.output_path.display());
        println!();
        println!(
            "{}",
            PromptBuilder::build(&request.prompt, request.system_prompt.as_deref())
        );
        return Ok(());
    }

    let options = ConfigResolver::provider_options(&env);
    let provider = ProviderFactory::create_with(&provider_config, &options)?;

    if let Some(token) = provider.cancellation_token() {
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling agent session");
                token.cancel();
            }
        });
    }

    let code = provider.generate_code(&request).await?;

    output::write_generated_code(&request.output_path, &code, provider.mode().label())
        .await
        .with_context(|| format!("failed to write {}", request.output_path.display()))?;

    if config.json {
        println!("{}", serde_json::to_string_pretty(&code)?);
    }

    Ok(())
}

fn show_config() {
    ConfigDiscovery::show_discovery_info();
    println!();

    let env = Environment::from_process();
    match ConfigResolver::resolve(&env) {
        Ok(config) => {
            println!("Provider mode: {} ({})", config.mode, config.mode.label());
            println!("{:#?}", config);
        }
        Err(e) => println!("Provider mode: not usable ({})", e),
    }

    let options = ConfigResolver::provider_options(&env);
    println!("Transport: {:#?}", options);
}
