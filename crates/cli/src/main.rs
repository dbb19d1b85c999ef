use anyhow::Context;
use bookshelf_authz::TokenService;
use bookshelf_kernel::settings::{load_with_retry, RetryPolicy, Settings};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "bookshelf-cli", version, about = "Operate a bookshelf deployment")]
struct Cli {
    /// How many times to try loading configuration before giving up
    #[arg(
        long,
        global = true,
        env = "BOOKSHELF_CONFIG_ATTEMPTS",
        default_value_t = RetryPolicy::default().max_attempts
    )]
    config_attempts: u32,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server until ctrl-c
    Serve,
    /// Issue or check session tokens signed with the configured secret
    Token {
        #[command(subcommand)]
        action: TokenCommand,
    },
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Debug, Subcommand)]
enum TokenCommand {
    /// Print a fresh token for a user id
    Issue {
        #[arg(long)]
        subject: u64,
    },
    /// Print the user id a token was issued for; fails on an invalid token
    Verify { token: String },
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    /// Load and validate settings, then print a summary
    Check,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let policy = RetryPolicy {
        max_attempts: cli.config_attempts,
        ..RetryPolicy::default()
    };
    let settings = bookshelf_telemetry::with_bootstrap_logging(|| {
        load_with_retry(policy, |_| Settings::load())
    })?;
    settings
        .validate()
        .context("configuration is not usable")?;

    match cli.command {
        Command::Serve => serve(settings),
        Command::Token { action } => token(&settings, action),
        Command::Config {
            action: ConfigCommand::Check,
        } => {
            print_summary(&settings);
            Ok(())
        }
    }
}

fn serve(settings: Settings) -> anyhow::Result<()> {
    bookshelf_telemetry::init(&settings.telemetry)?;
    tracing::info!(env = ?settings.environment, "bookshelf-cli serving");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?
        .block_on(bookshelf_app::bootstrap::run(settings))
}

fn token(settings: &Settings, action: TokenCommand) -> anyhow::Result<()> {
    let tokens = TokenService::new(&settings.auth.jwt_secret)?;

    match action {
        TokenCommand::Issue { subject } => {
            println!("{}", tokens.create_token(subject)?);
        }
        TokenCommand::Verify { token } => {
            let subject = tokens
                .validate_token(token.trim())
                .context("token rejected")?;
            println!("{subject}");
        }
    }
    Ok(())
}

fn print_summary(settings: &Settings) {
    println!("environment: {:?}", settings.environment);
    println!(
        "server: {}:{} (request timeout {} ms)",
        settings.server.host, settings.server.port, settings.server.request_timeout_ms
    );
    if settings.cache.enabled {
        println!("cache: redis at {}", settings.cache.url);
    } else {
        println!("cache: in-process");
    }
    println!(
        "cache ttl: {} s, invalidation deadline: {} ms",
        settings.cache.ttl_secs, settings.cache.invalidate_timeout_ms
    );
    println!("login path: {}", settings.auth.login_path);
    println!(
        "logging: {:?} at {}",
        settings.telemetry.log_format, settings.telemetry.log_level
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_token_issue() {
        let cli = Cli::parse_from(["bookshelf-cli", "token", "issue", "--subject", "7"]);
        assert!(matches!(
            cli.command,
            Command::Token {
                action: TokenCommand::Issue { subject: 7 }
            }
        ));
        assert_eq!(cli.config_attempts, 3);
    }

    #[test]
    fn config_attempts_is_global() {
        let cli = Cli::parse_from(["bookshelf-cli", "config", "check", "--config-attempts", "1"]);
        assert_eq!(cli.config_attempts, 1);
    }
}
