use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    check_health, store::parse_api_base, ActionOutcome, BlogKind, ControllerContext, FlowState,
    HttpStore, ItemListController, RecordKind, RenderOptions, TodoKind, ViewState,
};
use reqwest::Client;
use shared::{
    domain::RecordId,
    protocol::{BlogPostChanges, NewBlogPost, NewTodo, TodoChanges},
};
use tracing::error;
use tracing_subscriber::EnvFilter;

mod config;
mod terminal;

use config::{load_settings, normalize_api_base, render_options};
use terminal::{TerminalPrompts, TerminalView};

#[derive(Parser, Debug)]
#[command(name = "listdesk", about = "Todo and blog lists backed by a REST server")]
struct Cli {
    #[arg(long)]
    api_base_url: Option<String>,
    #[arg(long, default_value = "listdesk.toml")]
    config: PathBuf,
    #[arg(long, allow_hyphen_values = true)]
    utc_offset_minutes: Option<i32>,
    /// Answer yes to delete confirmations.
    #[arg(long, short = 'y')]
    yes: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(subcommand)]
    Todo(TodoAction),
    #[command(subcommand)]
    Blog(BlogAction),
    /// Check that the backend is up.
    Health,
}

#[derive(Subcommand, Debug)]
enum TodoAction {
    List,
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        content: String,
    },
    Edit {
        id: RecordId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        completed: Option<bool>,
    },
    Delete {
        id: RecordId,
    },
}

#[derive(Subcommand, Debug)]
enum BlogAction {
    List,
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        content: String,
        #[arg(long, default_value = "")]
        tags: String,
    },
    Edit {
        id: RecordId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        tags: Option<String>,
    },
    Delete {
        id: RecordId,
    },
}

type Overlay<C> = Box<dyn FnOnce(C) -> C + Send>;

/// One user action against a single list, independent of the record kind.
enum Action<D, C> {
    List,
    Add(D),
    Edit { id: RecordId, overlay: Overlay<C> },
    Delete(RecordId),
}

impl From<TodoAction> for Action<NewTodo, TodoChanges> {
    fn from(action: TodoAction) -> Self {
        match action {
            TodoAction::List => Action::List,
            TodoAction::Add { title, content } => Action::Add(NewTodo { title, content }),
            TodoAction::Edit {
                id,
                title,
                content,
                completed,
            } => Action::Edit {
                id,
                overlay: Box::new(move |mut fields: TodoChanges| {
                    if let Some(title) = title {
                        fields.title = title;
                    }
                    if let Some(content) = content {
                        fields.content = content;
                    }
                    if let Some(completed) = completed {
                        fields.completed = completed;
                    }
                    fields
                }),
            },
            TodoAction::Delete { id } => Action::Delete(id),
        }
    }
}

impl From<BlogAction> for Action<NewBlogPost, BlogPostChanges> {
    fn from(action: BlogAction) -> Self {
        match action {
            BlogAction::List => Action::List,
            BlogAction::Add {
                title,
                content,
                tags,
            } => Action::Add(NewBlogPost {
                title,
                content,
                tags,
            }),
            BlogAction::Edit {
                id,
                title,
                content,
                tags,
            } => Action::Edit {
                id,
                overlay: Box::new(move |mut fields: BlogPostChanges| {
                    if let Some(title) = title {
                        fields.title = title;
                    }
                    if let Some(content) = content {
                        fields.content = content;
                    }
                    if let Some(tags) = tags {
                        fields.tags = tags;
                    }
                    fields
                }),
            },
            BlogAction::Delete { id } => Action::Delete(id),
        }
    }
}

async fn run_action<K: RecordKind>(
    controller: &ItemListController<K>,
    action: Action<K::Draft, K::Changes>,
) -> ActionOutcome {
    match action {
        Action::List => {
            controller.reload().await;
            ActionOutcome::Completed
        }
        Action::Add(draft) => controller.submit_add(draft).await,
        Action::Edit { id, overlay } => {
            let opened = controller.open_edit(id).await;
            if opened != ActionOutcome::Completed {
                return opened;
            }
            let FlowState::EditOpen(form) = controller.state().await else {
                return ActionOutcome::Ignored;
            };
            controller.submit_edit(overlay(form.fields)).await
        }
        Action::Delete(id) => controller.request_delete(id).await,
    }
}

async fn run_list<K: RecordKind>(
    http: &Client,
    api_base: &str,
    render: RenderOptions,
    assume_yes: bool,
    action: Action<K::Draft, K::Changes>,
) -> Result<ExitCode> {
    let store = HttpStore::<K>::with_client(http.clone(), api_base)
        .with_context(|| format!("invalid api base url '{api_base}'"))?;
    let view = Arc::new(TerminalView::default());
    let prompts = Arc::new(TerminalPrompts::new(assume_yes));
    let controller = ItemListController::<K>::new(ControllerContext {
        store: Arc::new(store),
        view: view.clone(),
        prompts: prompts.clone(),
        render,
    });

    let outcome = run_action(&controller, action).await;
    let failed = matches!(outcome, ActionOutcome::Failed | ActionOutcome::Ignored)
        || prompts.alerted()
        || view.last_state() == Some(ViewState::LoadFailed);

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

async fn run_health(http: &Client, api_base: &str) -> Result<ExitCode> {
    let api_base = parse_api_base(api_base)
        .with_context(|| format!("invalid api base url '{api_base}'"))?;
    match check_health(http, &api_base).await {
        Ok(status) => {
            println!(
                "{} ({})",
                status.status,
                status.service.as_deref().unwrap_or("unknown service")
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            error!(error = %err, "health check failed");
            eprintln!("error: backend is not reachable at {api_base}");
            Ok(ExitCode::FAILURE)
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings(&cli.config);
    if let Some(url) = &cli.api_base_url {
        settings.api_base_url = normalize_api_base(url);
    }
    if cli.utc_offset_minutes.is_some() {
        settings.utc_offset_minutes = cli.utc_offset_minutes;
    }
    let render = render_options(&settings)?;
    let http = Client::new();

    match cli.command {
        Command::Health => run_health(&http, &settings.api_base_url).await,
        Command::Todo(action) => {
            run_list::<TodoKind>(&http, &settings.api_base_url, render, cli.yes, action.into())
                .await
        }
        Command::Blog(action) => {
            run_list::<BlogKind>(&http, &settings.api_base_url, render, cli.yes, action.into())
                .await
        }
    }
}
