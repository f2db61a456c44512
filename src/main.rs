use std::path::PathBuf;

use clap::{Parser, Subcommand};
use june::config::BackendKind;
use june::model::TaskStatus;
use june::output::Format;
use june::roster::AgentForm;
use june::session::SessionGate;
use june::store::data_dir::{self, DATA_DIR_NAME, DataDir};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(
    name = "june",
    version,
    about = "Agent roster, tasking and audit trail for the J.U.N.E. demo"
)]
struct Cli {
    /// Data directory (default: nearest .june/ at or above the current directory)
    #[arg(long, global = true, env = "JUNE_DIR")]
    dir: Option<PathBuf>,
    /// Output format
    #[arg(long, global = true, value_enum, default_value = "json")]
    format: Format,
    /// Retain at most this many audit entries (overrides config.json; `init` stores it)
    #[arg(long, global = true, env = "JUNE_AUDIT_CAP")]
    audit_cap: Option<usize>,
    /// Shorthand for --format pretty
    #[arg(long, global = true, hide = true)]
    pretty: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a data directory seeded with the demo roster
    Init {
        /// Storage backend
        #[arg(long, value_enum, default_value = "files")]
        backend: BackendKind,
    },
    /// Show where and how data is stored
    Info,
    /// Manage the agent roster
    Agent {
        #[command(subcommand)]
        action: AgentAction,
    },
    /// Assign and track tasks
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },
    /// Show the audit trail, newest first
    Audit {
        /// Show at most this many entries
        #[arg(long)]
        limit: Option<usize>,
        /// Only entries whose action starts with this prefix (e.g. `agent:`)
        #[arg(long)]
        action: Option<String>,
    },
    /// Admin session and credential settings
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Agent monitoring
    Monitor {
        #[command(subcommand)]
        action: MonitorAction,
    },
    /// Browse agent dossiers
    Dossier {
        #[command(subcommand)]
        action: DossierAction,
    },
}

#[derive(Subcommand)]
enum AgentAction {
    /// List all agents
    List,
    /// Show one agent
    Show { id: String },
    /// Create an agent, or update the one with the same codename
    Save {
        /// Codename (stored uppercased; doubles as the agent id)
        codename: String,
        #[arg(long, default_value = "")]
        real: String,
        /// Role (default: Operative)
        #[arg(long, default_value = "")]
        role: String,
        /// Threat level (default: 3)
        #[arg(long, default_value = "")]
        threat: String,
        /// Clearance level (default: 3)
        #[arg(long, default_value = "")]
        clearance: String,
        /// Secret; generated for new agents when omitted, kept for existing ones
        #[arg(long, default_value = "")]
        secret: String,
    },
    /// Delete an agent (its tasks are kept)
    Delete { id: String },
    /// Replace an agent's secret
    Passwd {
        id: String,
        #[arg(long, env = "JUNE_AGENT_SECRET")]
        secret: String,
    },
    /// Check an agent's secret
    Verify {
        id: String,
        #[arg(long, env = "JUNE_AGENT_SECRET")]
        secret: String,
    },
}

#[derive(Subcommand)]
enum TaskAction {
    /// List tasks
    List {
        /// Only tasks assigned to this agent
        #[arg(long)]
        agent: Option<String>,
        #[arg(long, value_enum)]
        status: Option<TaskStatus>,
    },
    /// Assign a new task to an agent
    Assign {
        agent: String,
        title: String,
        #[arg(long, short)]
        details: Option<String>,
    },
    /// Mark a task complete
    Done { id: String },
    /// Delete a task
    Delete { id: String },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Sign in as the admin
    Login {
        #[arg(long)]
        user: String,
        #[arg(long, env = "JUNE_ADMIN_PASSWORD")]
        password: String,
    },
    /// End the admin session
    Logout,
    /// Rotate the admin password
    Passwd {
        #[arg(long, env = "JUNE_NEW_ADMIN_PASSWORD")]
        password: String,
    },
    /// Restore the demo admin credentials
    Reset,
}

#[derive(Subcommand)]
enum MonitorAction {
    /// Ping an agent
    Ping { id: String },
}

#[derive(Subcommand)]
enum DossierAction {
    /// Show the selected agent's dossier
    Show,
    /// Select an agent and show its dossier
    Select { id: String },
    /// Move to the next agent
    Next,
    /// Move to the previous agent
    Prev,
    /// Forget the selection
    Clear,
    /// Write the selected dossier to <CODENAME>_report.txt
    Export {
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

/// Mutations that only an admin session may perform.
fn requires_session(command: &Commands) -> bool {
    match command {
        Commands::Agent { action } => matches!(
            action,
            AgentAction::Save { .. } | AgentAction::Delete { .. } | AgentAction::Passwd { .. }
        ),
        Commands::Task { action } => !matches!(action, TaskAction::List { .. }),
        Commands::Admin { action } => {
            matches!(action, AdminAction::Passwd { .. } | AdminAction::Reset)
        }
        Commands::Monitor { .. } => true,
        _ => false,
    }
}

fn run(cli: Cli, format: Format) -> june::error::Result<()> {
    if let Commands::Init { backend } = cli.command {
        let root = match cli.dir {
            Some(dir) => dir,
            None => std::env::current_dir()?.join(DATA_DIR_NAME),
        };
        return june::commands::init::run(&root, backend, cli.audit_cap);
    }

    let root = match cli.dir {
        Some(dir) => dir,
        None => data_dir::find_data_dir()?,
    };
    let data = DataDir::open(&root)?.with_audit_cap(cli.audit_cap);
    let gate = SessionGate::new(&data.session_path());
    if requires_session(&cli.command) {
        gate.require()?;
    }
    let mut store = data.open_store()?;

    match cli.command {
        Commands::Init { .. } => unreachable!(),
        Commands::Info => june::commands::info::run(&data, &store, format),
        Commands::Agent { action } => match action {
            AgentAction::List => june::commands::agent::list(&store, format),
            AgentAction::Show { id } => june::commands::agent::show(&store, &id, format),
            AgentAction::Save {
                codename,
                real,
                role,
                threat,
                clearance,
                secret,
            } => june::commands::agent::save(
                &mut store,
                AgentForm {
                    codename,
                    real,
                    role,
                    threat,
                    clearance,
                    secret,
                },
                format,
            ),
            AgentAction::Delete { id } => june::commands::agent::delete(&mut store, &id, format),
            AgentAction::Passwd { id, secret } => {
                june::commands::agent::passwd(&mut store, &id, &secret)
            }
            AgentAction::Verify { id, secret } => {
                june::commands::agent::verify(&store, &id, &secret, format)
            }
        },
        Commands::Task { action } => match action {
            TaskAction::List { agent, status } => {
                june::commands::task::list(&store, agent, status, format)
            }
            TaskAction::Assign {
                agent,
                title,
                details,
            } => june::commands::task::assign(&mut store, &agent, &title, details, format),
            TaskAction::Done { id } => june::commands::task::done(&mut store, &id, format),
            TaskAction::Delete { id } => june::commands::task::delete(&mut store, &id, format),
        },
        Commands::Audit { limit, action } => {
            june::commands::audit::run(&store, limit, action, format)
        }
        Commands::Admin { action } => match action {
            AdminAction::Login { user, password } => {
                june::commands::admin::login(&mut store, &gate, &user, &password, format)
            }
            AdminAction::Logout => june::commands::admin::logout(&gate),
            AdminAction::Passwd { password } => {
                june::commands::admin::passwd(&mut store, &password)
            }
            AdminAction::Reset => june::commands::admin::reset(&mut store),
        },
        Commands::Monitor { action } => match action {
            MonitorAction::Ping { id } => june::commands::monitor::ping(&mut store, &id, format),
        },
        Commands::Dossier { action } => match action {
            DossierAction::Show => june::commands::dossier::show(&store, format),
            DossierAction::Select { id } => {
                june::commands::dossier::select(&mut store, &id, format)
            }
            DossierAction::Next => june::commands::dossier::step(&mut store, 1, format),
            DossierAction::Prev => june::commands::dossier::step(&mut store, -1, format),
            DossierAction::Clear => june::commands::dossier::clear(&mut store),
            DossierAction::Export { out } => {
                june::commands::dossier::export(&store, &out, format)
            }
        },
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("JUNE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}


fn main() {
    init_logging();
    let cli = Cli::parse();
    let format = if cli.pretty {
        Format::Pretty
    } else {
        cli.format
    };
    if let Err(e) = run(cli, format) {
        match format {
            Format::Json => {
                eprintln!(
                    "{}",
                    serde_json::json!({
                        "error": e.code(),
                        "message": e.to_string()
                    })
                );
            }
            _ => eprintln!("error: {e}"),
        }
        std::process::exit(1);
    }
}
