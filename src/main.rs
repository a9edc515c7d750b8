use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::Result;
use std::path::PathBuf;
use taskboard::csv::{format_due_date, parse_due_date};
use taskboard::{
    ChangeEvent, SortKey, SortOrder, Status, Task, TaskDraft, TaskPatch, TaskStore,
    default_store_path,
};

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(about = "Three-lane task board with filtered views and CSV exchange")]
#[command(version)]
struct Cli {
    /// Path to the board file (default: platform data directory)
    #[arg(short, long)]
    store_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a task
    Add {
        title: String,
        #[arg(short, long)]
        description: Option<String>,
        /// current, pending or completed
        #[arg(long, default_value = "current")]
        status: String,
        /// low, medium or high
        #[arg(short, long, default_value = "medium")]
        priority: String,
        /// Due date, RFC 3339 or YYYY-MM-DDTHH:MM
        #[arg(long)]
        due: Option<String>,
        #[arg(short, long)]
        assigned_to: Option<String>,
    },

    /// Edit fields of an existing task
    Edit {
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(short, long)]
        priority: Option<String>,
        #[arg(long)]
        due: Option<String>,
        #[arg(short, long)]
        assigned_to: Option<String>,
    },

    /// Delete a task (absent ids are ignored)
    Delete { id: String },

    /// Move a task to another lane
    Move { id: String, status: String },

    /// Move a task to a new position in the sequence
    Reorder { id: String, index: usize },

    /// Show the board, lane by lane
    List {
        /// Filter by a case-insensitive search term (persisted)
        #[arg(long)]
        search: Option<String>,
        /// dueDate, priority or title (persisted)
        #[arg(long)]
        sort: Option<String>,
        /// asc or desc (persisted)
        #[arg(long)]
        order: Option<String>,
    },

    /// Show one task in full
    Show { id: String },

    /// Replace the board with the rows of a CSV file
    Import { file: PathBuf },

    /// Write the board as CSV to a file, or stdout when omitted
    Export { file: Option<PathBuf> },
}

fn main() -> Result<()> {
    // Setup tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let path = cli.store_path.unwrap_or_else(default_store_path);
    let mut store = TaskStore::open(path);
    store.subscribe(report_change);

    match cli.command {
        Commands::Add {
            title,
            description,
            status,
            priority,
            due,
            assigned_to,
        } => {
            let draft = TaskDraft {
                title,
                description,
                status: status.parse()?,
                priority: priority.parse()?,
                due_date: due.as_deref().and_then(parse_due_date),
                assigned_to,
            };
            let task = store.create(draft)?;
            println!("{}", task.id);
        }

        Commands::Edit {
            id,
            title,
            description,
            status,
            priority,
            due,
            assigned_to,
        } => {
            let patch = TaskPatch {
                title,
                description,
                status: status.map(|s| s.parse()).transpose()?,
                priority: priority.map(|p| p.parse()).transpose()?,
                due_date: due.as_deref().and_then(parse_due_date),
                assigned_to,
            };
            store.update(&id, patch)?;
        }

        Commands::Delete { id } => {
            if !store.remove(&id)? {
                println!("{}", "no such task, nothing deleted".dimmed());
            }
        }

        Commands::Move { id, status } => {
            store.change_status(&id, status.parse()?)?;
        }

        Commands::Reorder { id, index } => {
            store.reorder(&id, Some(index))?;
        }

        Commands::List {
            search,
            sort,
            order,
        } => {
            if let Some(term) = search {
                store.set_search_term(term)?;
            }
            if sort.is_some() || order.is_some() {
                let sort_by: SortKey = match sort {
                    Some(s) => s.parse()?,
                    None => store.sort_by(),
                };
                let sort_order: SortOrder = match order {
                    Some(o) => o.parse()?,
                    None => store.sort_order(),
                };
                store.set_sort(sort_by, sort_order)?;
            }
            print_board(&store);
        }

        Commands::Show { id } => match store.get(&id) {
            Some(task) => print_task_details(task),
            None => println!("{}", format!("task not found: {id}").red()),
        },

        Commands::Import { file } => {
            let text = std::fs::read_to_string(&file)?;
            store.import_csv(&text)?;
        }

        Commands::Export { file } => {
            let blob = store.export_csv();
            match file {
                Some(path) => {
                    std::fs::write(&path, blob)?;
                    println!("exported to {}", path.display());
                }
                None => print!("{blob}"),
            }
        }
    }

    Ok(())
}

/// Outcome notification for every successful mutation.
fn report_change(event: &ChangeEvent) {
    let message = match event {
        ChangeEvent::Created { .. } => "task added".to_string(),
        ChangeEvent::Updated { .. } => "task updated".to_string(),
        ChangeEvent::Removed { .. } => "task deleted".to_string(),
        ChangeEvent::StatusChanged { status, .. } => format!("task moved to {status}"),
        ChangeEvent::Reordered { .. } => "task reordered".to_string(),
        ChangeEvent::Replaced { count } => format!("imported {count} tasks"),
        ChangeEvent::ViewChanged => return,
    };
    eprintln!("{}", message.green());
}

fn print_board(store: &TaskStore) {
    let lanes = store.lanes();
    if lanes.is_empty() {
        println!("{}", "board is empty".dimmed());
        return;
    }

    for status in Status::ALL {
        let header = match status {
            Status::Current => "CURRENT".blue().bold(),
            Status::Pending => "PENDING".yellow().bold(),
            Status::Completed => "COMPLETED".green().bold(),
        };
        println!("{header}");

        let lane = lanes.lane(status);
        if lane.is_empty() {
            println!("  {}", "(none)".dimmed());
        }
        for task in lane {
            print_task_line(task);
        }
        println!();
    }
}

fn print_task_line(task: &Task) {
    let title = if task.status == Status::Completed {
        task.title.strikethrough().to_string()
    } else {
        task.title.clone()
    };
    let due = task
        .due_date
        .map(format_due_date)
        .unwrap_or_else(|| "no due date".to_string());

    println!(
        "  {}  {}  [{}] due: {}",
        task.id.dimmed(),
        title,
        task.priority,
        due
    );
}

fn print_task_details(task: &Task) {
    println!("id:          {}", task.id);
    println!("title:       {}", task.title);
    println!("description: {}", task.description.as_deref().unwrap_or("-"));
    println!("status:      {}", task.status);
    println!("priority:    {}", task.priority);
    println!(
        "due:         {}",
        task.due_date.map(format_due_date).unwrap_or_else(|| "-".to_string())
    );
    println!("assigned to: {}", task.assigned_to.as_deref().unwrap_or("-"));
}
