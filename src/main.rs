use authpipe_lib::types::{EventPhase, LoginRequest, NewUser, OperationKind, RegisterRequest};
use authpipe_lib::{
    ApiError, AppConfig, AppContext, ConfigError, EventDispatcher, FileStore, KeyValueStore,
    LogNavigator, ToastSink, TransportError,
};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

const ENV_LOG_FILTER: &str = "LOG_FILTER";

const ANNOUNCED_KINDS: [OperationKind; 8] = [
    OperationKind::Login,
    OperationKind::Logout,
    OperationKind::Register,
    OperationKind::GetUsers,
    OperationKind::GetUser,
    OperationKind::UpdateUser,
    OperationKind::DeleteUser,
    OperationKind::CreateUser,
];

#[derive(Parser)]
#[command(name = "authpipe", version, about = "Authenticated API session client")]
struct Args {
    /// Session file holding tokens and the cached profile
    #[arg(long, global = true, default_value = "authpipe-session.json")]
    store: PathBuf,

    /// Debug logging (overridden by LOG_FILTER)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session
    Login {
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        remember: bool,
    },
    /// Create an account
    Register {
        name: String,
        email: String,
        #[arg(long)]
        password: String,
    },
    /// List users
    Users,
    /// Show one user
    User { id: String },
    /// Create a user
    CreateUser {
        name: String,
        email: String,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        role: Option<String>,
    },
    /// Delete a user
    DeleteUser { id: String },
    /// End the session
    Logout,
    /// Show the signed-in user
    Whoami,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("{}", .0.user_message())]
    Api(#[from] ApiError),
    #[error("could not render output: {0}")]
    Output(#[from] serde_json::Error),
}

struct ConsoleToasts;

impl ToastSink for ConsoleToasts {
    fn success(&self, message: &str) {
        eprintln!("ok: {message}");
    }

    fn error(&self, message: &str) {
        eprintln!("error: {message}");
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "Command failed");
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_env(ENV_LOG_FILTER)
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

async fn run(args: Args) -> Result<(), CliError> {
    let config = AppConfig::from_env()?;
    let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(args.store));
    let ctx = AppContext::with_reqwest(config, storage, Arc::new(LogNavigator))?;

    let mut dispatcher = EventDispatcher::new(Arc::new(ConsoleToasts));
    for kind in ANNOUNCED_KINDS {
        dispatcher = dispatcher.on(kind, EventPhase::InProgress, |event| {
            eprintln!("{}...", event.kind.as_str());
        });
    }
    let _events = dispatcher.attach(&ctx.events);

    match args.command {
        Commands::Login {
            email,
            password,
            remember,
        } => {
            let request = LoginRequest {
                email,
                password,
                remember_me: remember,
            };
            let response = ctx.auth.login(&request).await?;
            print_json(&response.user)?;
        }
        Commands::Register {
            name,
            email,
            password,
        } => {
            let request = RegisterRequest {
                name,
                email,
                password,
            };
            let response = ctx.auth.register(&request).await?;
            print_json(&response.user)?;
        }
        Commands::Users => print_json(&ctx.users.list_users().await?)?,
        Commands::User { id } => print_json(&ctx.users.get_user(&id).await?)?,
        Commands::CreateUser {
            name,
            email,
            password,
            role,
        } => {
            let user = NewUser {
                name,
                email,
                password,
                role,
            };
            print_json(&ctx.users.create_user(&user).await?)?;
        }
        Commands::DeleteUser { id } => ctx.users.delete_user(&id).await?,
        Commands::Logout => ctx.auth.logout().await,
        Commands::Whoami => match ctx.auth.current_user().await {
            Some(user) => print_json(&user)?,
            None => println!("Not signed in"),
        },
    }

    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
