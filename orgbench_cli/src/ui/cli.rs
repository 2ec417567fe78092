use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use log::info;
use orgbench_core::api::QueryApi;
use orgbench_core::config::AppConfig;
use orgbench_core::panel::{HostMessage, PageMessage};
use orgbench_core::render::table;
use orgbench_core::storage::{EnvironmentDraft, EnvironmentProvider, KeyringStore};
use orgbench_core::workbench::{ENVIRONMENT_FORM_PANEL, QUERY_EDITOR_PANEL};
use orgbench_core::{EnvironmentStore, HttpQueryApi, PanelHub, Workbench};
use tokio::sync::{broadcast, Mutex};

use super::prompt;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "orgbench", version = "0.1.0", subcommand_required = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage environment records
    Env {
        #[command(subcommand)]
        action: EnvAction,
    },
    /// Run a query against the active environment
    Query {
        /// Query string; omit it for the interactive editor
        #[arg(long)]
        query: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum EnvAction {
    /// Add an environment through the interactive form
    Add,
    /// List stored environments
    List,
    /// Make an environment the active one
    Use { name: String },
    /// Remove an environment and its stored secret
    Remove {
        name: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Log out and clear the last-connection timestamp
    Disconnect { name: Option<String> },
}

pub async fn run_cli(args: Args) -> Result<()> {
    let config = AppConfig::load_default()?;
    let store = EnvironmentStore::open_default()?;
    let provider = Arc::new(Mutex::new(EnvironmentProvider::open(
        store,
        Box::new(KeyringStore::new()),
    )?));
    let api: Arc<dyn QueryApi> = Arc::new(HttpQueryApi::new(&config));
    let workbench = Workbench::new(provider.clone(), api, config.session_ttl());
    let hub = PanelHub::new();

    match args.command {
        Command::Env { action } => match action {
            EnvAction::Add => add_environment(&hub, &workbench).await,
            EnvAction::List => list_environments(&provider, &config).await,
            EnvAction::Use { name } => {
                provider.lock().await.set_active(&name)?;
                println!("'{name}' is now the active environment.");
                Ok(())
            }
            EnvAction::Remove { name, yes } => remove_environment(&provider, &name, yes).await,
            EnvAction::Disconnect { name } => {
                let name = workbench
                    .disconnect(name.as_deref())
                    .await
                    .map_err(|e| anyhow!(e))?;
                println!("Disconnected '{name}'.");
                Ok(())
            }
        },
        Command::Query { query } => run_query(&hub, &workbench, query).await,
    }
}

/// Drive the add-environment form panel: prompt, submit, report.
async fn add_environment(hub: &PanelHub, workbench: &Workbench) -> Result<()> {
    let draft = prompt_draft()?;
    let name = draft.name.clone();
    info!("probing environment '{}'", name);

    hub.open(ENVIRONMENT_FORM_PANEL, workbench.environment_form())
        .await?;
    let mut updates = hub
        .subscribe(ENVIRONMENT_FORM_PANEL)
        .await
        .ok_or_else(|| anyhow!("form panel vanished before it could be used"))?;
    hub.post(ENVIRONMENT_FORM_PANEL, PageMessage::Submit { data: draft })
        .await?;

    let mut failure = None;
    loop {
        match updates.recv().await {
            Ok(HostMessage::Saved { name }) => println!("Environment '{name}' added."),
            Ok(HostMessage::Error { message }) => {
                // One shot per invocation: close the form instead of
                // leaving it open for a retry that will never come.
                failure = Some(message);
                let _ = hub.post(ENVIRONMENT_FORM_PANEL, PageMessage::Cancel).await;
            }
            Ok(HostMessage::Closed) | Err(_) => break,
            Ok(_) => {}
        }
    }
    hub.dispose(ENVIRONMENT_FORM_PANEL).await?;

    match failure {
        Some(message) => bail!(message),
        None => Ok(()),
    }
}

fn prompt_draft() -> Result<EnvironmentDraft> {
    let name = prompt::read_line("Environment name", None)?;
    let login_url = prompt::read_line("Login URL", Some("https://login.salesforce.com"))?;
    let username = prompt::read_line("Username", None)?;
    let password = prompt::read_secret("Password")?;
    let token = prompt::read_secret("Security token (Enter for none)")?;
    Ok(EnvironmentDraft {
        name,
        login_url,
        username,
        password,
        security_token: if token.is_empty() { None } else { Some(token) },
    })
}

async fn list_environments(
    provider: &Arc<Mutex<EnvironmentProvider>>,
    config: &AppConfig,
) -> Result<()> {
    let provider = provider.lock().await;
    let environments = provider.list();
    if environments.is_empty() {
        println!("No environments stored. Run 'orgbench env add' first.");
        return Ok(());
    }

    let now = Utc::now();
    let columns: Vec<String> = ["NAME", "USERNAME", "INSTANCE URL", "ACTIVE", "LAST CONNECTED"]
        .into_iter()
        .map(String::from)
        .collect();
    let rows: Vec<Vec<String>> = environments
        .iter()
        .map(|env| {
            let mut last = age_text(env.last_connected_at, now);
            if env.is_stale(config.session_ttl(), now) {
                last.push_str(" (stale)");
            }
            vec![
                env.name.clone(),
                env.username.clone(),
                env.instance_url.clone().unwrap_or_else(|| "-".into()),
                if env.active { "*".into() } else { String::new() },
                last,
            ]
        })
        .collect();
    print!("{}", table::render(&columns, &rows));
    Ok(())
}

fn age_text(at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(at) = at else {
        return "never".into();
    };
    let elapsed = now.signed_duration_since(at);
    if elapsed.num_days() > 0 {
        format!("{}d ago", elapsed.num_days())
    } else if elapsed.num_hours() > 0 {
        format!("{}h ago", elapsed.num_hours())
    } else {
        format!("{}m ago", elapsed.num_minutes().max(0))
    }
}

async fn remove_environment(
    provider: &Arc<Mutex<EnvironmentProvider>>,
    name: &str,
    yes: bool,
) -> Result<()> {
    if !yes && !prompt::confirm(&format!("Remove environment '{name}'?"))? {
        println!("Aborted.");
        return Ok(());
    }
    provider.lock().await.remove(name)?;
    println!("Environment '{name}' removed.");
    Ok(())
}

/// Drive the query-editor panel: one-shot when a query was given,
/// otherwise a prompt loop until the user leaves.
async fn run_query(hub: &PanelHub, workbench: &Workbench, query: Option<String>) -> Result<()> {
    hub.open(QUERY_EDITOR_PANEL, workbench.query_editor())
        .await?;
    let mut updates = hub
        .subscribe(QUERY_EDITOR_PANEL)
        .await
        .ok_or_else(|| anyhow!("query panel vanished before it could be used"))?;

    let result = match query {
        Some(soql) => {
            hub.post(QUERY_EDITOR_PANEL, PageMessage::RunQuery { query: soql })
                .await?;
            match wait_for_outcome(&mut updates).await? {
                None => Ok(()),
                Some(message) => Err(anyhow!(message)),
            }
        }
        None => editor_loop(hub, &mut updates).await,
    };

    hub.dispose(QUERY_EDITOR_PANEL).await?;
    result
}

async fn editor_loop(
    hub: &PanelHub,
    updates: &mut broadcast::Receiver<HostMessage>,
) -> Result<()> {
    println!("Interactive query editor. Type a query and press Enter; 'exit' leaves.");
    loop {
        let line = match prompt::read_line_opt("soql> ")? {
            Some(line) => line,
            None => break,
        };
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }
        hub.post(QUERY_EDITOR_PANEL, PageMessage::RunQuery { query: line })
            .await?;
        if let Some(message) = wait_for_outcome(updates).await? {
            eprintln!("Error: {message}");
        }
    }
    Ok(())
}

/// Wait for the next query outcome. `Ok(None)` means results were printed;
/// `Ok(Some(message))` carries a failure for the caller to report.
async fn wait_for_outcome(
    updates: &mut broadcast::Receiver<HostMessage>,
) -> Result<Option<String>> {
    loop {
        match updates.recv().await {
            Ok(HostMessage::Results {
                columns,
                rows,
                total_size,
                done,
            }) => {
                let more = if done { "" } else { " (more available)" };
                println!("Total records: {total_size}{more}");
                print!("{}", table::render(&columns, &rows));
                return Ok(None);
            }
            Ok(HostMessage::Error { message }) => return Ok(Some(message)),
            Ok(HostMessage::Closed) | Err(_) => {
                bail!("the query panel closed before an outcome arrived")
            }
            Ok(_) => {}
        }
    }
}
