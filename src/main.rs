use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::{Result, eyre};
use std::path::PathBuf;
use tasktrack::render::render_task;
use tasktrack::{
    EditInput, Signifier, Store, SystemClock, Task, TaskDraft, TaskManager, TimerOutcome,
    merge_edits,
};

#[derive(Parser)]
#[command(name = "tasktrack")]
#[command(about = "Personal task tracker with timers, backed by a local SQLite table")]
#[command(version)]
struct Cli {
    /// Path to the task database (default: the platform data directory)
    #[arg(short, long)]
    db_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        /// Task name
        name: String,

        #[arg(short = 'D', long)]
        description: Option<String>,

        /// Marker such as "important" or "repeats"
        #[arg(short, long)]
        signifier: Option<String>,

        /// Date to work on the task (YYYY-MM-DD)
        #[arg(long)]
        do_date: Option<NaiveDate>,

        /// Deadline (YYYY-MM-DD)
        #[arg(long)]
        due_date: Option<NaiveDate>,

        #[arg(short, long)]
        category: Option<String>,

        /// Estimated duration in minutes
        #[arg(short, long)]
        estimate: Option<i64>,
    },

    /// List all tasks
    List {
        /// Emit tasks as JSON instead of cards
        #[arg(long)]
        json: bool,
    },

    /// Show tasks scheduled for today
    Today,

    /// Show tasks past their due date
    Overdue,

    /// Show tasks whose do date has slipped
    Reschedule,

    /// Edit fields of an existing task (omitted flags keep current values)
    Update {
        id: i64,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short = 'D', long)]
        description: Option<String>,

        /// One of incomplete, in-progress, paused, cancelled, completed
        #[arg(long)]
        status: Option<String>,

        #[arg(short, long)]
        signifier: Option<String>,

        #[arg(long)]
        do_date: Option<String>,

        #[arg(long)]
        due_date: Option<String>,

        #[arg(short, long)]
        category: Option<String>,

        /// Estimated duration in minutes
        #[arg(short, long)]
        estimate: Option<String>,
    },

    /// Delete a task permanently
    Delete { id: i64 },

    /// Start (or restart) the timer on a task
    Start { id: i64 },

    /// Pause the timer, banking the elapsed minutes
    Pause { id: i64 },

    /// Complete a task whose timer is running
    Complete { id: i64 },
}

fn main() -> Result<()> {
    // Setup tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let db_path = resolve_db_path(cli.db_path)?;

    // One store per command; dropped (and closed) on every exit path
    let store = Store::open(&db_path)?;

    match cli.command {
        Commands::Add {
            name,
            description,
            signifier,
            do_date,
            due_date,
            category,
            estimate,
        } => {
            let draft = TaskDraft {
                name: name.clone(),
                description,
                signifier: signifier.map(Signifier::from),
                do_date,
                due_date,
                category,
                estimated_duration: estimate,
            };
            let id = store.create(&draft)?;
            println!("{} '{}' added with ID: {}", "SUCCESS:".green(), name.trim(), id);
        }

        Commands::List { json } => {
            let tasks = store.list_all()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else {
                print_task_list("Task List", "No tasks found.", &tasks);
            }
        }

        Commands::Today => {
            let today = Local::now().date_naive();
            let tasks = store.list_for_date(today)?;
            print_task_list("Tasks for Today", "No tasks for today!", &tasks);
        }

        Commands::Overdue => {
            let today = Local::now().date_naive();
            let tasks = store.list_overdue(today)?;
            print_task_list("Overdue Tasks", "No overdue tasks!", &tasks);
        }

        Commands::Reschedule => {
            let today = Local::now().date_naive();
            let tasks = store.list_to_reschedule(today)?;
            print_task_list("Tasks to Reschedule", "No tasks to reschedule!", &tasks);
        }

        Commands::Update {
            id,
            name,
            description,
            status,
            signifier,
            do_date,
            due_date,
            category,
            estimate,
        } => {
            let Some(task) = store.get(id)? else {
                println!("{} Task {} not found.", "ERROR:".red(), id);
                return Ok(());
            };
            let input = EditInput {
                name,
                description,
                status,
                signifier,
                do_date,
                due_date,
                category,
                estimated_duration: estimate,
            };
            let patch = merge_edits(&task, &input)?;
            if patch.is_empty() {
                println!("Nothing to update for task {}.", id);
            } else {
                store.update(id, &patch)?;
                println!("{} Task [{}] updated.", "SUCCESS:".green(), id);
            }
        }

        Commands::Delete { id } => {
            if store.delete(id)? {
                println!("{} Task [{}] deleted.", "SUCCESS:".green(), id);
            } else {
                println!("{} Task {} not found.", "ERROR:".red(), id);
            }
        }

        Commands::Start { id } => {
            let manager = TaskManager::new(&store, &SystemClock);
            print_outcome(manager.start(id)?);
        }

        Commands::Pause { id } => {
            let manager = TaskManager::new(&store, &SystemClock);
            print_outcome(manager.pause(id)?);
        }

        Commands::Complete { id } => {
            let manager = TaskManager::new(&store, &SystemClock);
            print_outcome(manager.complete(id)?);
        }
    }

    Ok(())
}

fn resolve_db_path(override_path: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = override_path {
        return Ok(path);
    }
    let data_dir = dirs::data_dir().ok_or_else(|| eyre!("Could not determine data directory"))?;
    Ok(data_dir.join("tasktrack").join("tasks.db"))
}

fn print_task_list(heading: &str, empty_message: &str, tasks: &[Task]) {
    if tasks.is_empty() {
        println!("\n{empty_message}");
        return;
    }
    println!("\n{}\n{}", heading.bold(), "-".repeat(40));
    for task in tasks {
        println!("{}", render_task(task));
    }
}

fn print_outcome(outcome: TimerOutcome) {
    match outcome {
        TimerOutcome::Started { .. }
        | TimerOutcome::Paused { .. }
        | TimerOutcome::Completed { .. } => {
            println!("{}", outcome.to_string().green())
        }
        TimerOutcome::NotFound { .. } => println!("{}", outcome.to_string().red()),
        _ => println!("{}", outcome.to_string().yellow()),
    }
}
