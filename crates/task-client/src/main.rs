use anyhow::{Context, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use db::{
    models::task_item::TaskItem,
    types::{Priority, parse_due_date},
};
use task_client::{
    BoardError, HttpTaskApi, TaskApi, TaskBoard, TaskDraft, TaskFilter, api::DEFAULT_API_URL,
    view,
};
use tracing_subscriber::EnvFilter;

/// Command line front end for the task manager API
#[derive(Parser)]
#[clap(version, about, long_about = None)]
struct Cli {
    /// Base URL of the task API
    #[clap(long, env = "TASKS_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Print JSON instead of text
    #[clap(long, global = true)]
    json: bool,

    /// Increase logging verbosity
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List tasks
    List {
        /// all, active, completed or overdue
        #[arg(short, long, default_value = "all")]
        filter: TaskFilter,
    },

    /// Show task counts
    Stats,

    /// Show a single task
    Show { id: i64 },

    /// Create a task
    Add {
        title: String,
        #[arg(short, long)]
        description: Option<String>,
        /// Due date, e.g. 2025-03-14
        #[arg(long, value_parser = parse_due)]
        due: Option<NaiveDate>,
        /// low, medium, high or 1-3
        #[arg(short, long, value_parser = parse_priority, default_value = "low")]
        priority: i32,
    },

    /// Edit a task; omitted fields keep their value
    Edit {
        id: i64,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long, value_parser = parse_due, conflicts_with = "clear_due")]
        due: Option<NaiveDate>,
        /// Remove the due date
        #[arg(long)]
        clear_due: bool,
        #[arg(short, long, value_parser = parse_priority)]
        priority: Option<i32>,
    },

    /// Flip the completion flag of a task
    Toggle { id: i64 },

    /// Delete a task
    Delete { id: i64 },
}

fn parse_due(raw: &str) -> Result<NaiveDate, String> {
    match parse_due_date(raw) {
        Ok(Some(date)) => Ok(date),
        Ok(None) => Err("due date must not be empty".to_string()),
        Err(err) => Err(err.to_string()),
    }
}

fn parse_priority(raw: &str) -> Result<i32, String> {
    if let Ok(level) = raw.trim().parse::<i32>() {
        return Priority::from_level(level)
            .map(Priority::level)
            .ok_or_else(|| format!("priority level must be 1-3, got {level}"));
    }
    raw.trim()
        .parse::<Priority>()
        .map(Priority::level)
        .map_err(|_| format!("unknown priority '{raw}'"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,task_client={level},taskctl={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let mut board = TaskBoard::new(HttpTaskApi::new(&cli.api_url));
    let today = view::today();

    match cli.command {
        Commands::List { filter } => {
            board.load().await?;
            board.set_filter(filter);
            let tasks = board.visible_tasks(today);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else if tasks.is_empty() {
                println!("No tasks ({})", filter.label());
            } else {
                for task in tasks {
                    println!("{}", format_line(task, today));
                }
            }
        }
        Commands::Stats => {
            board.load().await?;
            let stats = board.stats(today);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                for filter in TaskFilter::ALL {
                    println!("{:<10} {}", filter.label(), filter.count(&stats));
                }
            }
        }
        Commands::Show { id } => {
            let task = match board.api().get_task(id).await {
                Ok(task) => task,
                Err(err) if err.is_not_found() => bail!("Task {id} not found"),
                Err(err) => return Err(err).context("Failed to fetch task"),
            };
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&task)?);
            } else {
                print_details(&task, today);
            }
        }
        Commands::Add {
            title,
            description,
            due,
            priority,
        } => {
            let draft = TaskDraft {
                title,
                description: description.unwrap_or_default(),
                due_date: due,
                priority,
            };
            let task = board.submit(&draft).await?;
            println!("Created task #{}", task.id);
        }
        Commands::Edit {
            id,
            title,
            description,
            due,
            clear_due,
            priority,
        } => {
            board.load().await?;
            let mut draft = board.begin_edit(id).map_err(not_found)?;
            if let Some(title) = title {
                draft.title = title;
            }
            if let Some(description) = description {
                draft.description = description;
            }
            if clear_due {
                draft.due_date = None;
            } else if due.is_some() {
                draft.due_date = due;
            }
            if let Some(priority) = priority {
                draft.priority = priority;
            }
            let task = board.submit(&draft).await?;
            println!("Updated task #{}", task.id);
        }
        Commands::Toggle { id } => {
            board.load().await?;
            let task = board.toggle_complete(id).await.map_err(not_found)?;
            let state = if task.is_completed { "completed" } else { "active" };
            println!("Task #{} is now {state}", task.id);
        }
        Commands::Delete { id } => {
            board.delete(id).await.map_err(not_found)?;
            println!("Deleted task #{id}");
        }
    }

    Ok(())
}

fn not_found(err: BoardError) -> anyhow::Error {
    match err {
        BoardError::UnknownTask(id) => anyhow::anyhow!("Task {id} not found"),
        BoardError::Api { source, .. } if source.is_not_found() => {
            anyhow::anyhow!("Task not found: {source}")
        }
        other => other.into(),
    }
}

fn format_line(task: &TaskItem, today: NaiveDate) -> String {
    let mark = if task.is_completed { "x" } else { " " };
    let mut line = format!(
        "[{mark}] #{:<4} {}  ({})",
        task.id,
        task.title,
        Priority::display_level(task.priority)
    );
    if let Some(due) = task.due_date {
        line.push_str(&format!("  due {due}"));
    }
    if task.is_overdue(today) {
        line.push_str("  OVERDUE");
    }
    line
}

fn print_details(task: &TaskItem, today: NaiveDate) {
    println!("{}", format_line(task, today));
    if let Some(description) = &task.description {
        println!("    {description}");
    }
    println!(
        "    created {}",
        task.created_date.format("%Y-%m-%d %H:%M UTC")
    );
}
