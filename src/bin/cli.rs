use std::fs;
use std::io::{self, Write};
use std::str::FromStr;

use pert_tool::{
    Config, ExportFormat, ImportFormat, ImportMode, PlanningSession, Task, TaskEstimate, TimeUnit,
    TimeValue, calculate, format_duration, import_tasks, persistence::write_export,
};
use tracing_subscriber::EnvFilter;

fn render_text_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (ci, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            if len > widths[ci] {
                widths[ci] = len;
            }
        }
    }

    let mut sep = String::new();
    sep.push('+');
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    push_row(&mut out, &widths, headers.iter().copied());
    out.push_str(&sep);
    out.push('\n');
    for row in rows {
        push_row(&mut out, &widths, row.iter().map(String::as_str));
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn push_row<'a>(out: &mut String, widths: &[usize], cells: impl Iterator<Item = &'a str>) {
    out.push('|');
    for (ci, cell) in cells.enumerate() {
        out.push(' ');
        out.push_str(cell);
        let pad = widths[ci].saturating_sub(cell.chars().count());
        if pad > 0 {
            out.push_str(&" ".repeat(pad));
        }
        out.push(' ');
        out.push('|');
    }
    out.push('\n');
}

fn render_tasks(tasks: &[Task], unit: TimeUnit) -> String {
    if tasks.is_empty() {
        return "No tasks yet. Use 'add' to create one.".to_string();
    }
    let headers = [
        "#",
        "Id",
        "Name",
        "Optimistic",
        "Nominal",
        "Pessimistic",
        "Expected",
        "Std Dev",
    ];
    let rows: Vec<Vec<String>> = tasks
        .iter()
        .enumerate()
        .map(|(index, task)| {
            let estimate = task.estimate();
            vec![
                (index + 1).to_string(),
                task.id().to_string(),
                task.display_name(index + 1),
                format!("{} {}", estimate.optimistic.magnitude, estimate.optimistic.unit),
                format!("{} {}", estimate.nominal.magnitude, estimate.nominal.unit),
                format!("{} {}", estimate.pessimistic.magnitude, estimate.pessimistic.unit),
                format_duration(task.expected_duration(), unit),
                format_duration(task.standard_deviation(), unit),
            ]
        })
        .collect();
    render_text_table(&headers, &rows)
}

fn print_summary(session: &PlanningSession, unit: TimeUnit) {
    let summary = session.summary();
    println!("Project: {}", session.project_name().unwrap_or("(unnamed)"));
    println!("Tasks: {}", summary.tasks.len());
    println!(
        "Total expected duration: {}",
        format_duration(summary.total_expected_duration, unit)
    );
    println!(
        "Total standard deviation: {}",
        format_duration(summary.total_standard_deviation, unit)
    );
    println!("Total variance: {:.4} hours²", summary.total_variance);
}

fn parse_estimate<'a>(parts: &mut impl Iterator<Item = &'a str>) -> Result<TaskEstimate, String> {
    let (Some(o), Some(n), Some(p), Some(unit)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err("expected <optimistic> <nominal> <pessimistic> <unit>".to_string());
    };
    let unit = TimeUnit::from_str(unit).map_err(|err| err.to_string())?;
    let value = |raw: &str, point: &str| {
        raw.parse::<f64>()
            .map_err(|_| format!("Invalid {point} value '{raw}'"))
    };
    Ok(TaskEstimate::new(
        TimeValue::new(value(o, "optimistic")?, unit),
        TimeValue::new(value(n, "nominal")?, unit),
        TimeValue::new(value(p, "pessimistic")?, unit),
    ))
}

/// Accepts either a 1-based row number from `show` or a task id.
fn resolve_task_id(session: &PlanningSession, key: &str) -> Option<String> {
    if let Ok(position) = key.parse::<usize>() {
        if let Some(task) = position.checked_sub(1).and_then(|i| session.tasks().get(i)) {
            return Some(task.id().to_string());
        }
    }
    session.find_task(key).map(|task| task.id().to_string())
}

fn rest_of_line<'a>(parts: impl Iterator<Item = &'a str>) -> Option<String> {
    let rest = parts.collect::<Vec<_>>().join(" ");
    if rest.is_empty() { None } else { Some(rest) }
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  show                               Show current tasks\n  add <o> <n> <p> <unit> [name...]   Add a task (unit: minutes|hours|days|weeks)\n  calc <o> <n> <p> <unit>            Calculate PERT values without adding a task\n  delete <row|id>                    Delete a task\n  clear                              Delete all tasks\n  summary [unit]                     Show project totals\n  unit <unit>                        Set the display unit\n  name <text...>                     Set the project name\n  export <csv|json|markdown> [path]  Print or write an export\n  import <csv|json> <path> [replace] Import tasks from a file\n  projects                           List saved projects\n  save                               Save the current project\n  open <id>                          Open a saved project\n  remove <id>                        Delete a saved project\n  dup <id> [name...]                 Duplicate a saved project\n  new [name...]                      Start a new, empty project\n  quit|exit                          Exit"
    );
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pert_tool=warn")),
        )
        .with_writer(io::stderr)
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(2);
        }
    };
    let store = match config.open_store() {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Could not open project store: {}", e);
            std::process::exit(2);
        }
    };
    let mut session = PlanningSession::new(store);
    let mut unit = config.display_unit;

    println!("PERT Estimator (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => println!("{}", render_tasks(session.tasks(), unit)),
            "add" => {
                let estimate = match parse_estimate(&mut parts) {
                    Ok(estimate) => estimate,
                    Err(e) => {
                        println!("{}", e);
                        println!("Usage: add <optimistic> <nominal> <pessimistic> <unit> [name...]");
                        continue;
                    }
                };
                match session.add_task(rest_of_line(parts), estimate) {
                    Ok(task) => {
                        println!(
                            "Added task {} ({}).",
                            task.display_name(session.tasks().len()),
                            task.id()
                        );
                        println!("{}", render_tasks(session.tasks(), unit));
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
            "calc" => {
                let estimate = match parse_estimate(&mut parts) {
                    Ok(estimate) => estimate,
                    Err(e) => {
                        println!("{}", e);
                        println!("Usage: calc <optimistic> <nominal> <pessimistic> <unit>");
                        continue;
                    }
                };
                match calculate(&estimate) {
                    Ok(result) => {
                        println!("Expected duration: {}", format_duration(result.expected_duration, unit));
                        println!("Standard deviation: {}", format_duration(result.standard_deviation, unit));
                        println!("Variance: {:.4} hours²", result.variance);
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
            "delete" => match parts.next() {
                Some(key) => match resolve_task_id(&session, key) {
                    Some(id) => {
                        session.remove_task(&id);
                        println!("Deleted task {}.", id);
                    }
                    None => println!("No task matches '{}'.", key),
                },
                None => println!("Usage: delete <row|id>"),
            },
            "clear" => {
                session.clear();
                println!("All tasks cleared.");
            }
            "summary" => {
                let summary_unit = match parts.next().map(TimeUnit::from_str) {
                    Some(Ok(u)) => u,
                    Some(Err(e)) => {
                        println!("{}", e);
                        continue;
                    }
                    None => unit,
                };
                print_summary(&session, summary_unit);
            }
            "unit" => match parts.next().map(TimeUnit::from_str) {
                Some(Ok(u)) => {
                    unit = u;
                    println!("Display unit set to {}.", unit);
                }
                Some(Err(e)) => println!("{}", e),
                None => println!("Usage: unit <minutes|hours|days|weeks>"),
            },
            "name" => match rest_of_line(parts) {
                Some(name) => {
                    session.set_project_name(name);
                    println!("Project name set to '{}'.", session.project_name().unwrap_or_default());
                }
                None => println!("Usage: name <text...>"),
            },
            "export" => {
                let format = match parts.next().map(ExportFormat::from_str) {
                    Some(Ok(format)) => format,
                    Some(Err(e)) => {
                        println!("{}", e);
                        continue;
                    }
                    None => {
                        println!("Usage: export <csv|json|markdown> [path]");
                        continue;
                    }
                };
                match parts.next() {
                    Some(path) => {
                        match write_export(path, format, session.tasks(), session.project_name()) {
                            Ok(()) => println!("Exported {} tasks to {}.", session.tasks().len(), path),
                            Err(e) => println!("Export error: {}", e),
                        }
                    }
                    None => match session.export(format) {
                        Ok(text) => println!("{}", text),
                        Err(e) => println!("Export error: {}", e),
                    },
                }
            }
            "import" => {
                let (Some(format), Some(path)) = (parts.next(), parts.next()) else {
                    println!("Usage: import <csv|json> <path> [replace]");
                    continue;
                };
                let format = match ImportFormat::from_str(format) {
                    Ok(format) => format,
                    Err(e) => {
                        println!("{}", e);
                        continue;
                    }
                };
                let mode = match parts.next() {
                    Some("replace") => ImportMode::Replace,
                    _ => ImportMode::Append,
                };
                let text = match fs::read_to_string(path) {
                    Ok(text) => text,
                    Err(e) => {
                        println!("Could not read {}: {}", path, e);
                        continue;
                    }
                };
                let result = import_tasks(format, &text);
                for error in &result.errors {
                    println!("  {}", error);
                }
                let added = session.apply_import(&result, mode);
                println!(
                    "Imported {} tasks with {} errors.",
                    added,
                    result.errors.len()
                );
            }
            "projects" => match session.list_projects() {
                Ok(projects) if projects.is_empty() => println!("No saved projects."),
                Ok(projects) => {
                    let rows: Vec<Vec<String>> = projects
                        .iter()
                        .map(|project| {
                            vec![
                                project.id.clone(),
                                project.name.clone(),
                                project.tasks.len().to_string(),
                                project.updated_at.format("%Y-%m-%d %H:%M").to_string(),
                            ]
                        })
                        .collect();
                    println!("{}", render_text_table(&["Id", "Name", "Tasks", "Updated"], &rows));
                }
                Err(e) => println!("Error: {}", e),
            },
            "save" => match session.save() {
                Ok(project) => println!("Project '{}' saved ({}).", project.name, project.id),
                Err(e) => println!("Error: {}", e),
            },
            "open" => match parts.next() {
                Some(id) => match session.open(id) {
                    Ok(project) => {
                        println!("Opened project '{}'.", project.name);
                        println!("{}", render_tasks(session.tasks(), unit));
                    }
                    Err(e) => println!("Error: {}", e),
                },
                None => println!("Usage: open <id>"),
            },
            "remove" => match parts.next() {
                Some(id) => match session.delete_project(id) {
                    Ok(true) => println!("Deleted project {}.", id),
                    Ok(false) => println!("No project with id {}.", id),
                    Err(e) => println!("Error: {}", e),
                },
                None => println!("Usage: remove <id>"),
            },
            "dup" => match parts.next() {
                Some(id) => {
                    let name = rest_of_line(parts);
                    match session.duplicate_project(id, name.as_deref()) {
                        Ok(project) => println!("Created '{}' ({}).", project.name, project.id),
                        Err(e) => println!("Error: {}", e),
                    }
                }
                None => println!("Usage: dup <id> [name...]"),
            },
            "new" => {
                session.new_project(rest_of_line(parts));
                println!("Started a new project.");
            }
            _ => {
                println!("Unknown command. Type 'help'.");
            }
        }
    }
}
