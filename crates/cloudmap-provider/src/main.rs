//! cloudmap: manage AWS Cloud Map HTTP namespaces from the command line
//!
//! Each invocation runs one lifecycle operation against one tracked address
//! and records the result in the local state database.

use anyhow::Result;
use clap::{Parser, Subcommand};
use cloudmap_common::defaults::{DEFAULT_OPERATION_TIMEOUT_SECS, DEFAULT_REGION};
use cloudmap_common::{IgnoreTagsConfig, KeyValueTags};
use cloudmap_provider::aws::{AwsContext, FromAwsContext, ServiceDiscoveryClient};
use cloudmap_provider::config::{AwsConfig, ProviderConfig};
use cloudmap_provider::resource::{
    HttpNamespaceResource, NamespaceConfig, NamespaceError, Plan, ResourceState,
};
use cloudmap_provider::session::Session;
use cloudmap_provider::state::StateStore;
use comfy_table::{Cell, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "cloudmap")]
#[command(about = "Manage AWS Cloud Map HTTP namespaces")]
#[command(version)]
struct Args {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct GlobalArgs {
    /// AWS region
    #[arg(long, env = "AWS_REGION", default_value = DEFAULT_REGION, global = true)]
    region: String,

    /// AWS profile to use (overrides AWS_PROFILE env var)
    #[arg(long, env = "AWS_PROFILE", global = true)]
    profile: Option<String>,

    /// Send API calls to this endpoint instead of AWS
    #[arg(long, global = true)]
    endpoint_url: Option<String>,

    /// State database path (default: platform data directory)
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Tag key to hide from recorded state (repeatable)
    #[arg(long = "ignore-tag-key", global = true)]
    ignore_tag_keys: Vec<String>,

    /// Tag key prefix to hide from recorded state (repeatable)
    #[arg(long = "ignore-tag-prefix", global = true)]
    ignore_tag_prefixes: Vec<String>,

    /// Seconds to wait for an asynchronous Cloud Map operation
    #[arg(long, default_value_t = DEFAULT_OPERATION_TIMEOUT_SECS, global = true)]
    operation_timeout: u64,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,
}

impl From<GlobalArgs> for ProviderConfig {
    fn from(args: GlobalArgs) -> Self {
        Self {
            aws: AwsConfig {
                region: args.region,
                profile: args.profile,
                endpoint_url: args.endpoint_url,
            },
            ignore_tags: IgnoreTagsConfig {
                keys: args.ignore_tag_keys.into_iter().collect(),
                key_prefixes: args.ignore_tag_prefixes,
            },
            operation_timeout: Duration::from_secs(args.operation_timeout),
            state_path: args.state,
        }
    }
}

/// Desired configuration of one namespace
#[derive(clap::Args, Debug)]
struct NamespaceArgs {
    /// Local address the namespace is tracked under
    address: String,

    /// Namespace name (letters, digits, '.', '_' and '-')
    #[arg(long)]
    name: String,

    /// Namespace description
    #[arg(long)]
    description: Option<String>,

    /// Tag as key=value (repeatable)
    #[arg(long = "tag", value_parser = parse_tag)]
    tags: Vec<(String, String)>,
}

impl From<NamespaceArgs> for NamespaceConfig {
    fn from(args: NamespaceArgs) -> Self {
        Self {
            name: args.name,
            description: args.description,
            tags: args.tags.into_iter().collect(),
        }
    }
}

fn parse_tag(s: &str) -> Result<(String, String), cloudmap_common::TagParseError> {
    KeyValueTags::parse_pair(s)
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a namespace and start tracking it
    Create(NamespaceArgs),

    /// Refresh a tracked namespace from AWS
    Read {
        address: String,
    },

    /// Replace a tracked namespace's tags (no --tag removes them all)
    Update {
        address: String,

        /// Tag as key=value (repeatable)
        #[arg(long = "tag", value_parser = parse_tag)]
        tags: Vec<(String, String)>,
    },

    /// Delete a tracked namespace
    Delete {
        address: String,
    },

    /// Track an existing namespace by ID
    Import {
        address: String,

        /// Namespace ID (e.g. ns-abcdef123456)
        #[arg(long)]
        id: String,
    },

    /// Bring a namespace to the given configuration
    Apply(NamespaceArgs),

    /// Show what apply would do
    Plan(NamespaceArgs),

    /// List tracked namespaces
    List,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&e);
        std::process::exit(1);
    }
}

/// Print error in a user-friendly way
fn print_error(e: &anyhow::Error) {
    use std::io::Write;

    let mut stderr = std::io::stderr();

    let _ = writeln!(stderr, "\n\x1b[1;31mError:\x1b[0m {e}");

    let mut source = e.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "  \x1b[33mCaused by:\x1b[0m {cause}");
        source = cause.source();
    }

    let suggestion = e
        .downcast_ref::<NamespaceError>()
        .and_then(NamespaceError::aws_error)
        .and_then(|aws| aws.suggestion());
    if let Some(hint) = suggestion {
        let _ = writeln!(stderr, "\n\x1b[36mHint:\x1b[0m {hint}");
    }

    if std::env::var("RUST_BACKTRACE").is_err() {
        let _ = writeln!(
            stderr,
            "\n\x1b[2mSet RUST_BACKTRACE=1 for a detailed backtrace\x1b[0m"
        );
    } else {
        let backtrace = e.backtrace();
        if backtrace.status() == std::backtrace::BacktraceStatus::Captured {
            let _ = writeln!(stderr, "\n\x1b[2mBacktrace:\x1b[0m\n{backtrace}");
        }
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so --json output stays parseable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
                .add_directive("aws_config=warn".parse()?)
                .add_directive("aws_sdk_servicediscovery=warn".parse()?)
                .add_directive("aws_smithy_runtime=warn".parse()?),
        )
        .init();

    let json = args.global.json;
    let config: ProviderConfig = args.global.into();

    let store = match &config.state_path {
        Some(path) => StateStore::open(path)?,
        None => StateStore::open_default()?,
    };

    if let Command::List = args.command {
        return list_namespaces(&store, json);
    }

    if let Some(profile) = &config.aws.profile {
        info!(profile = %profile, "Using AWS profile");
    }
    let aws = AwsContext::load(&config.aws).await;
    let client = ServiceDiscoveryClient::from_context(&aws);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            on_interrupt.cancel();
        }
    });

    let session = Session::new(
        store,
        HttpNamespaceResource::new(&client)
            .with_ignore_tags(config.ignore_tags.clone())
            .with_wait_config(config.wait_config())
            .with_cancellation(cancel),
        config.ignore_tags.clone(),
    );

    let (address, state) = match args.command {
        Command::Create(ns) => {
            let address = ns.address.clone();
            let state = session.create(&address, &ns.into()).await?;
            (address, state)
        }
        Command::Read { address } => {
            let state = session.read(&address).await?;
            (address, state)
        }
        Command::Update { address, tags } => {
            let state = session
                .update(&address, &tags.into_iter().collect())
                .await?;
            (address, state)
        }
        Command::Delete { address } => return session.delete(&address).await,
        Command::Import { address, id } => {
            let state = session.import(&address, &id).await?;
            (address, state)
        }
        Command::Apply(ns) => {
            let address = ns.address.clone();
            let state = session.apply(&address, &ns.into()).await?;
            (address, state)
        }
        Command::Plan(ns) => {
            let address = ns.address.clone();
            let plan = session.plan(&address, &ns.into()).await?;
            return print_plan(&address, &plan, json);
        }
        Command::List => return Ok(()),
    };

    print_state(&address, &state, json)
}

fn print_state(address: &str, state: &ResourceState, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(state)?);
        return Ok(());
    }

    match state {
        ResourceState::Absent => println!("{address}: absent"),
        ResourceState::Unsynced { id } => println!("{address}: {id} (not yet read)"),
        ResourceState::Synced(record) => {
            println!("{address}:");
            println!("  id:          {}", record.id);
            println!("  name:        {}", record.name);
            if let Some(description) = &record.description {
                println!("  description: {description}");
            }
            println!("  arn:         {}", record.arn);
            println!("  tags:        {}", record.tags);
        }
    }
    Ok(())
}

fn print_plan(address: &str, plan: &Plan, json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "address": address,
                "plan": plan.to_string(),
            }))?
        );
    } else {
        println!("{address}: {plan}");
    }
    Ok(())
}

/// List all tracked namespaces
fn list_namespaces(store: &StateStore, json: bool) -> Result<()> {
    let namespaces = store.list()?;

    if json {
        let rows: Vec<_> = namespaces
            .iter()
            .map(|ns| {
                serde_json::json!({
                    "address": ns.address,
                    "state": ns.state,
                    "updated_at": ns.updated_at.to_rfc3339(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if namespaces.is_empty() {
        println!("No tracked namespaces");
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Address"),
            Cell::new("Namespace ID"),
            Cell::new("Name"),
            Cell::new("Tags"),
            Cell::new("Updated"),
        ]);

    for ns in namespaces {
        let (name, tags) = match ns.state.record() {
            Some(record) => (record.name.clone(), record.tags.to_string()),
            None => ("(not yet read)".to_string(), String::new()),
        };
        table.add_row(vec![
            Cell::new(&ns.address),
            Cell::new(ns.state.id().unwrap_or_default()),
            Cell::new(name),
            Cell::new(tags),
            Cell::new(ns.updated_at.format("%Y-%m-%d %H:%M:%S").to_string()),
        ]);
    }

    println!("{table}");

    Ok(())
}
