use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use colored::*;
use taskmate_client::{
    format_due_date, init_logging, App, Backend, BulkReport, Config, DueIn, Level, Notification,
    Outcome, RemoteTaskStore, SortKey, SortOrder, TaskQuery,
};
use taskmate_core::{Task, TaskDraft, TaskStatus};

#[derive(Parser)]
#[command(name = "taskmate")]
#[command(about = "Manage tasks stored in a remote document collection", long_about = None)]
struct Cli {
    /// Base URL of the remote document store (overrides TASKMATE_STORE_URL)
    #[arg(long)]
    store_url: Option<String>,

    /// Bearer token for the remote store (overrides TASKMATE_STORE_TOKEN)
    #[arg(long)]
    token: Option<String>,

    /// Collection holding the task documents
    #[arg(short, long)]
    collection: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List tasks
    List {
        /// Only tasks whose title contains this text
        #[arg(short, long)]
        filter: Option<String>,

        /// Only tasks with this status (pending, completed, overdue)
        #[arg(short, long)]
        status: Option<TaskStatus>,

        #[arg(long, value_enum)]
        sort: Option<SortKey>,

        /// Sort descending
        #[arg(long, requires = "sort")]
        desc: bool,
    },
    /// Create a new task
    Create {
        #[arg(short, long)]
        title: String,

        #[arg(short, long, default_value = "")]
        description: String,

        #[command(flatten)]
        due: DueArgs,
    },
    /// Edit the title, description or due date of a task
    Edit {
        id: String,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[command(flatten)]
        due: DueArgs,

        /// Remove the due date
        #[arg(long, conflicts_with_all = ["due", "due_in"])]
        no_due: bool,
    },
    /// Mark tasks completed
    Complete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Delete tasks
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(Args)]
struct DueArgs {
    /// Due date as YYYY-MM-DD
    #[arg(long, value_parser = parse_due_date, conflicts_with = "due_in")]
    due: Option<DateTime<Utc>>,

    /// Due date relative to today
    #[arg(long = "in", value_enum)]
    due_in: Option<DueIn>,
}

impl DueArgs {
    fn resolve(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.due.or_else(|| self.due_in.map(|pick| pick.resolve(now)))
    }
}

fn parse_due_date(value: &str) -> Result<DateTime<Utc>, String> {
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD: {}", e))?;
    date.and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("invalid date {}", value))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(base_url) = cli.store_url {
        let token = match config.backend {
            Backend::Http { token, .. } => token,
            Backend::Memory => None,
        };
        config.backend = Backend::Http { base_url, token };
    }
    if let Some(token) = cli.token {
        if let Backend::Http { token: current, .. } = &mut config.backend {
            *current = Some(token);
        }
    }
    if let Some(collection) = cli.collection {
        config.collection = collection;
    }

    init_logging(&config.log_filter);

    if config.backend == Backend::Memory {
        println!(
            "{}",
            "⚠️  No remote store configured; changes will not persist.".yellow()
        );
    }

    let app = config.build_app()?;
    app.notifications().register_callback(print_notification);

    match cli.command {
        Command::List {
            filter,
            status,
            sort,
            desc,
        } => {
            let mut query = TaskQuery::new();
            if let Some(filter) = filter {
                query = query.title_contains(filter);
            }
            if let Some(status) = status {
                query = query.with_status(status);
            }
            if let Some(key) = sort {
                let order = if desc {
                    SortOrder::Descending
                } else {
                    SortOrder::Ascending
                };
                query = query.sorted_by(key, order);
            }
            list_tasks(&app, &query).await;
        }
        Command::Create {
            title,
            description,
            due,
        } => {
            let mut draft = TaskDraft::new(title, description);
            if let Some(date) = due.resolve(Utc::now()) {
                draft = draft.with_date(date);
            }
            if let Outcome::Applied(_) = app.scope().create(draft).await {
                print_tasks(&app.store().snapshot().list);
            }
        }
        Command::Edit {
            id,
            title,
            description,
            due,
            no_due,
        } => {
            app.load().await;
            let Some(task) = app.store().snapshot().find(&id).cloned() else {
                println!("{} {}", "❓ No task with id".red(), id.yellow());
                return Ok(());
            };

            let mut edit = task.to_edit();
            if let Some(title) = title {
                edit.title = title;
            }
            if let Some(description) = description {
                edit.description = description;
            }
            if no_due {
                edit.date = None;
            } else if let Some(date) = due.resolve(Utc::now()) {
                edit.date = Some(date);
            }
            app.scope().edit(edit).await;
        }
        Command::Complete { ids } => {
            let report = app.scope().complete_selected(&ids).await;
            print_report("completed", &report);
        }
        Command::Delete { ids } => {
            let report = app.scope().delete_selected(&ids).await;
            print_report("deleted", &report);
        }
    }

    app.shutdown();
    Ok(())
}

async fn list_tasks<S: RemoteTaskStore + ?Sized>(app: &App<S>, query: &TaskQuery) {
    if let Some(Outcome::Failed(e)) = app.load().await {
        println!("{}", e.to_string().dimmed());
        return;
    }

    let visible = query.apply(&app.store().snapshot().list, Utc::now());
    if visible.is_empty() {
        println!("📭 No tasks found.");
    } else {
        print_tasks(&visible);
    }
}

fn print_tasks(tasks: &[Task]) {
    let now = Utc::now();
    println!("{}", "📋 Tasks:".bold());
    println!("{}", "─".repeat(100).dimmed());

    for task in tasks {
        let status = task.display_status(now);
        let status_label = match status {
            TaskStatus::Completed => status.as_str().green(),
            TaskStatus::Pending => status.as_str().yellow(),
            TaskStatus::Overdue => status.as_str().red(),
        };

        println!(
            "{} {:<10} {:<14} {} {}",
            task.id.blue(),
            status_label,
            format_due_date(task.date.as_ref()),
            task.title.white().bold(),
            if task.description.is_empty() {
                String::new()
            } else {
                format!("- {}", task.description.dimmed())
            }
        );
    }
    println!("{}", "─".repeat(100).dimmed());
}

fn print_notification(notification: &Notification) {
    match notification.level {
        Level::Success => println!("✅ {}", notification.message.green()),
        Level::Error => println!("❌ {}", notification.message.red()),
    }
}

fn print_report(verb: &str, report: &BulkReport) {
    println!(
        "📊 {} {}, {} failed",
        report.succeeded.len().to_string().green(),
        verb,
        report.failed.len().to_string().red()
    );
    for (id, e) in &report.failed {
        println!("   {} {}", id.yellow(), e.to_string().dimmed());
    }
}
