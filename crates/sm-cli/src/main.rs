mod commands;

use clap::{Parser, Subcommand};

/// studymate CLI -- study with an AI tutor from the terminal.
#[derive(Parser)]
#[command(name = "sm", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse available subjects and topics.
    Subjects {
        /// Show topics for one subject only.
        subject: Option<String>,
    },

    /// Ask the tutor a question.
    Chat {
        /// The question to ask.
        message: String,
    },

    /// Run a study session.
    Study {
        #[command(subcommand)]
        mode: commands::study::StudyMode,
    },

    /// Show your progress report.
    Progress,

    /// Log in or create an account.
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },

    /// Inspect configuration.
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let ctx = commands::AppContext::load();

    if ctx.config.general.json_logs {
        sm_telemetry::init_logging_json(&ctx.config.general.log_level);
    } else {
        sm_telemetry::init_logging(&ctx.config.general.log_level);
    }

    match cli.command {
        Commands::Subjects { subject } => commands::subjects::run(subject.as_deref()),
        Commands::Chat { message } => commands::chat::run(&ctx, &message).await,
        Commands::Study { mode } => commands::study::run(&ctx, mode).await,
        Commands::Progress => commands::progress::run(&ctx).await,
        Commands::Auth { action } => commands::auth::run(&ctx, action).await,
        Commands::Config { action } => commands::config::run(&ctx, action),
    }
}
