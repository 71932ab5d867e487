use anyhow::{Context, Result};
use chrono_tz::Tz;
use clap::{Parser, Subcommand, ValueEnum};
use tokio::sync::{mpsc, watch};
use tracing_subscriber::EnvFilter;

use agenda_core::{
    DeadlineAlert, SchedulerStore, SortOrder, Storage, StoreHandle, Task, WatchPolicy,
    format_deadline, run_watcher,
};

mod config;
mod state;

#[derive(Parser, Debug)]
#[command(name = "agenda", version, about = "Priority-and-deadline task scheduler")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default config to ~/.agenda/config.toml
    Init,

    /// Add a task
    Add {
        /// Task name; also the key edit/delete look up
        name: String,

        /// Lower value runs earlier
        #[arg(long)]
        priority: i32,

        /// Due date as DD/MM/YYYY (malformed input means no deadline)
        #[arg(long, default_value = "")]
        date: String,

        /// Due time as HH:MM
        #[arg(long, default_value = "")]
        time: String,
    },

    /// Re-enter a task under new values (every entry with the name is replaced)
    Edit {
        /// Current task name
        name: String,

        /// New name; omit to keep the current one
        #[arg(long)]
        rename: Option<String>,

        #[arg(long)]
        priority: i32,

        #[arg(long, default_value = "")]
        date: String,

        #[arg(long, default_value = "")]
        time: String,
    },

    /// Remove every task with this name
    Delete { name: String },

    /// Pop and print the task that runs next
    Next,

    /// Print all tasks
    List {
        /// Sort order
        #[arg(long, value_enum, default_value_t = OrderBy::Priority)]
        by: OrderBy,
    },

    /// Scan deadlines on an interval and print alerts (Ctrl-C to stop)
    Watch {
        /// Seconds between scans (default from config)
        #[arg(long)]
        interval_secs: Option<u64>,

        /// Alert window in seconds (default from config)
        #[arg(long)]
        window_secs: Option<i64>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OrderBy {
    Priority,
    Deadline,
}

impl From<OrderBy> for SortOrder {
    fn from(by: OrderBy) -> Self {
        match by {
            OrderBy::Priority => SortOrder::Priority,
            OrderBy::Deadline => SortOrder::Deadline,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if let Command::Init = &cli.command {
        return config::init_config();
    }

    let cfg = config::load_config()?;
    let tz = cfg.tz()?;
    let store = open_store(tz)?;

    match cli.command {
        // handled before the store is opened
        Command::Init => {}

        Command::Add {
            name,
            priority,
            date,
            time,
        } => {
            store.add_task(priority, &name, &date, &time)?;
            println!("Added '{name}'.");
        }

        Command::Edit {
            name,
            rename,
            priority,
            date,
            time,
        } => {
            let new_name = rename.as_deref().unwrap_or(&name);
            store.edit_task(&name, new_name, priority, &date, &time)?;
            println!("Updated '{new_name}'.");
        }

        Command::Delete { name } => {
            store.delete_task(&name)?;
            println!("Deleted '{name}'.");
        }

        Command::Next => match store.execute_next()? {
            Some(task) => println!("Executed: {} (priority {})", task.name, task.priority),
            None => println!("No tasks to execute."),
        },

        Command::List { by } => {
            print_tasks(&store.list_tasks(by.into()), tz);
        }

        Command::Watch {
            interval_secs,
            window_secs,
        } => {
            let policy = WatchPolicy {
                interval: std::time::Duration::from_secs(
                    interval_secs.unwrap_or(cfg.watch.interval_secs),
                ),
                window: chrono::Duration::seconds(window_secs.unwrap_or(cfg.watch.window_secs)),
            };
            run_watch(store, policy).await?;
        }
    }

    Ok(())
}

fn open_store(tz: Tz) -> Result<StoreHandle> {
    let path = state::tasks_path()?;
    let store = SchedulerStore::open(Storage::new(path), tz)
        .context("restoring task store (fix or remove the file to start fresh)")?;
    Ok(StoreHandle::new(store))
}

fn print_tasks(tasks: &[Task], tz: Tz) {
    if tasks.is_empty() {
        println!("No tasks.");
        return;
    }
    println!("{:<10} {:<18} {}", "priority", "deadline", "task");
    for t in tasks {
        println!(
            "{:<10} {:<18} {}",
            t.priority,
            format_deadline(t.deadline, tz),
            t.name
        );
    }
}

async fn run_watch(store: StoreHandle, policy: WatchPolicy) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<DeadlineAlert>();
    let (stop_tx, stop_rx) = watch::channel(false);
    let worker = tokio::spawn(run_watcher(store, policy, tx, stop_rx));

    println!(
        "Watching deadlines every {}s (window {}s). Ctrl-C to stop.",
        policy.interval.as_secs(),
        policy.window.num_seconds()
    );

    loop {
        tokio::select! {
            alert = rx.recv() => match alert {
                Some(alert) => println!("{}", alert.message),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                let _ = stop_tx.send(true);
                break;
            }
        }
    }

    worker.await.context("watcher task")?;
    Ok(())
}
