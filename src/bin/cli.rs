use chrono::{Local, NaiveDate};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use timesheet_tool::entry::{DATE_FORMAT, format_hours, short_id};
use timesheet_tool::summary::Summary;
use timesheet_tool::triage::shift_counts;
use timesheet_tool::{
    Clipboard, Confirm, EffortType, EntryInput, KeyValueStore, Profile, ShiftType, Timesheet,
    TimesheetConfig, TimesheetEntry,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "timesheet", about = "Interactive timesheet entry tool")]
struct Cli {
    /// Configuration file (defaults to ./timesheet.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the configured profile (classic, daily, triage)
    #[arg(long)]
    profile: Option<Profile>,
    /// Override the storage location
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Override the export directory
    #[arg(long)]
    export_dir: Option<PathBuf>,
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(config_level: &str, verbose: u8) {
    let level = match verbose {
        0 => config_level.to_string(),
        1 => "info".to_string(),
        _ => "debug".to_string(),
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Reads the y/N answer from the same input stream as the commands.
struct LineConfirm<'a, R: BufRead> {
    input: &'a mut R,
}

impl<R: BufRead> Confirm for LineConfirm<'_, R> {
    fn confirm(&mut self, prompt: &str) -> bool {
        print!("{prompt} [y/N] ");
        let _ = io::stdout().flush();
        let mut answer = String::new();
        if self.input.read_line(&mut answer).is_err() {
            return false;
        }
        println!();
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

/// Pipes text into the platform clipboard tool.
struct SystemClipboard;

#[cfg(target_os = "macos")]
const CLIPBOARD_TOOLS: &[(&str, &[&str])] = &[("pbcopy", &[])];
#[cfg(windows)]
const CLIPBOARD_TOOLS: &[(&str, &[&str])] = &[("clip", &[])];
#[cfg(not(any(target_os = "macos", windows)))]
const CLIPBOARD_TOOLS: &[(&str, &[&str])] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
];

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), String> {
        for (program, args) in CLIPBOARD_TOOLS {
            let Ok(mut child) = Command::new(program)
                .args(*args)
                .stdin(Stdio::piped())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()
            else {
                continue;
            };
            if let Some(mut stdin) = child.stdin.take() {
                if stdin.write_all(text.as_bytes()).is_err() {
                    continue;
                }
            }
            match child.wait() {
                Ok(status) if status.success() => return Ok(()),
                _ => continue,
            }
        }
        Err("no clipboard tool found".to_string())
    }
}

fn render_entries_table(entries: &[TimesheetEntry]) -> String {
    let headers = ["id", "date", "task", "category", "effort", "hours"];
    let rows: Vec<[String; 6]> = entries
        .iter()
        .map(|e| {
            [
                short_id(&e.id).to_string(),
                e.date.format(DATE_FORMAT).to_string(),
                e.task.clone(),
                e.category.clone(),
                e.effort_type.as_str().to_string(),
                e.hours.as_str().to_string(),
            ]
        })
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let render_row = |cells: &[&str]| {
        let mut line = String::from("|");
        for (i, cell) in cells.iter().enumerate() {
            let pad = widths[i].saturating_sub(cell.chars().count());
            line.push(' ');
            line.push_str(cell);
            line.push_str(&" ".repeat(pad));
            line.push_str(" |");
        }
        line
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&headers[..]));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        out.push_str(&render_row(&cells));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn render_day_groups<S: KeyValueStore>(timesheet: &Timesheet<S>) -> String {
    let mut out = String::new();
    for group in timesheet.day_groups() {
        let day = group.date.format("%A %Y-%m-%d");
        out.push_str(&format!("{day}  ({}h)", format_hours(group.total_hours)));
        if group.is_overtime(timesheet.overtime_threshold()) {
            out.push_str("  OVERTIME");
        }
        out.push('\n');
        for item in &group.items {
            out.push_str(&format!(
                "  {}  {:<24} {:<14} {:>5}h\n",
                short_id(&item.id),
                item.task,
                item.category,
                item.hours
            ));
        }
    }
    if out.is_empty() {
        out.push_str("No entries.\n");
    }
    out
}

fn show<S: KeyValueStore>(timesheet: &Timesheet<S>) {
    if timesheet.profile().groups_by_day() {
        print!("{}", render_day_groups(timesheet));
    } else {
        print!("{}", render_entries_table(timesheet.entries()));
    }
}

fn print_summary(summary: &Summary) {
    print!("{}", summary.to_clipboard_text());
}

const HELP_LINES: &[(&str, &str)] = &[
    ("help", "Show this help"),
    ("show", "List entries"),
    ("days", "List entries grouped by day"),
    ("add <YYYY-MM-DD> <hours> <category> <task...>", "Log a new entry"),
    ("edit <id> <YYYY-MM-DD> <hours> <category> <task...>", "Replace an entry's fields"),
    ("desc <id> <text...>", "Set an entry's description"),
    ("effort <id> <billable|non-billable>", "Override effort type (classic profile)"),
    ("delete <id>", "Delete an entry (asks first)"),
    ("summary", "Totals by effort type and category"),
    ("week [YYYY-MM-DD]", "Summary for the week containing the date"),
    ("copy", "Copy the summary to the clipboard"),
    ("export", "Export CSV and clear all entries (asks first)"),
    ("categories", "List categories and their effort type"),
];

const TRIAGE_HELP_LINES: &[(&str, &str)] = &[
    ("triage add <YYYY-MM-DD> <s1|s2|s3>", "Log a triage shift"),
    ("triage show", "List triage shifts"),
    ("triage delete <id>", "Delete a triage shift"),
    ("triage clear", "Delete all triage shifts (asks first)"),
];

fn print_help(profile: Profile) {
    println!("Commands:");
    let mut lines: Vec<(&str, &str)> = HELP_LINES.to_vec();
    if profile.has_triage_log() {
        lines.extend_from_slice(TRIAGE_HELP_LINES);
    }
    lines.push(("quit|exit", "Exit"));
    for (usage, description) in lines {
        if usage.len() > 40 {
            println!("  {usage}\n  {:<40} {description}", "");
        } else {
            println!("  {usage:<40} {description}");
        }
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

fn main() {
    let args = Cli::parse();

    let mut config = match TimesheetConfig::load_from(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(2);
        }
    };
    if let Some(profile) = args.profile {
        config.profile = profile;
    }
    if let Some(dir) = args.data_dir {
        config.storage.path = dir;
    }
    if let Some(dir) = args.export_dir {
        config.export_dir = dir;
    }
    init_tracing(&config.log_level, args.verbose);

    let store = match config.open_store() {
        Ok(store) => store,
        Err(err) => {
            eprintln!("Error opening storage: {err}");
            std::process::exit(2);
        }
    };
    let mut timesheet = Timesheet::open(store, config.profile)
        .with_overtime_threshold(config.overtime_threshold_hours);
    let today = Local::now().date_naive();

    println!(
        "Timesheet ({} profile) - type 'help' for commands\n",
        timesheet.profile()
    );
    if let Some(reminder) = timesheet.reminder(today) {
        println!("{}\n", reminder.message());
    }
    show(&timesheet);

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match input.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let command = line.trim().to_string();
        if command.is_empty() {
            continue;
        }

        let mut parts = command.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(timesheet.profile()),
            "quit" | "exit" => break,
            "show" => show(&timesheet),
            "days" => print!("{}", render_day_groups(&timesheet)),
            "categories" => {
                for rule in &timesheet.categories().rules {
                    println!("  {:<16} {}", rule.name, rule.effort);
                }
            }
            "add" | "edit" => {
                let editing = if cmd == "edit" {
                    let Some(prefix) = parts.next() else {
                        println!("Usage: edit <id> <YYYY-MM-DD> <hours> <category> <task...>");
                        continue;
                    };
                    match timesheet.resolve_entry_id(prefix) {
                        Ok(id) => Some(id),
                        Err(e) => {
                            println!("Error: {e}");
                            continue;
                        }
                    }
                } else {
                    None
                };
                let date = parts.next();
                let hours = parts.next();
                let category = parts.next();
                let task: Vec<&str> = parts.collect();
                let (Some(date), Some(hours), Some(category)) = (date, hours, category) else {
                    let id_arg = if editing.is_some() { "<id> " } else { "" };
                    println!("Usage: {cmd} {id_arg}<YYYY-MM-DD> <hours> <category> <task...>");
                    continue;
                };
                let mut form = match editing.as_deref().and_then(|id| timesheet.entry(id)) {
                    Some(existing) => EntryInput::from_entry(existing),
                    None => EntryInput::default(),
                };
                form.date = date.to_string();
                form.hours = hours.to_string();
                form.task = task.join(" ");
                if !form.category.eq_ignore_ascii_case(category) {
                    // A category change re-derives the effort type.
                    form.effort_type = None;
                }
                form.category = category.to_string();
                match timesheet.save_entry(&form, editing.as_deref()) {
                    Ok(entry) => {
                        let verb = if editing.is_some() { "Updated" } else { "Added" };
                        println!(
                            "{verb} entry {} ({}, {}h, {}).",
                            short_id(&entry.id),
                            entry.date,
                            entry.hours,
                            entry.effort_type
                        );
                        show(&timesheet);
                    }
                    Err(e) => println!("Error: {e}"),
                }
            }
            "desc" => {
                let prefix = parts.next();
                let text: Vec<&str> = parts.collect();
                let Some(prefix) = prefix else {
                    println!("Usage: desc <id> <text...>");
                    continue;
                };
                let id = match timesheet.resolve_entry_id(prefix) {
                    Ok(id) => id,
                    Err(e) => {
                        println!("Error: {e}");
                        continue;
                    }
                };
                let Some(existing) = timesheet.entry(&id) else {
                    println!("Error: no entry with id {id}");
                    continue;
                };
                let form = EntryInput::from_entry(existing).with_description(text.join(" "));
                match timesheet.save_entry(&form, Some(&id)) {
                    Ok(_) => println!("Description set."),
                    Err(e) => println!("Error: {e}"),
                }
            }
            "effort" => {
                let (Some(prefix), Some(value)) = (parts.next(), parts.next()) else {
                    println!("Usage: effort <id> <billable|non-billable>");
                    continue;
                };
                let effort = match value.parse::<EffortType>() {
                    Ok(effort) => effort,
                    Err(e) => {
                        println!("Error: {e}");
                        continue;
                    }
                };
                let result = timesheet
                    .resolve_entry_id(prefix)
                    .and_then(|id| timesheet.set_effort(&id, effort));
                match result {
                    Ok(entry) => println!(
                        "Effort set to {} for {}.",
                        entry.effort_type,
                        short_id(&entry.id)
                    ),
                    Err(e) => println!("Error: {e}"),
                }
            }
            "delete" => {
                let Some(prefix) = parts.next() else {
                    println!("Usage: delete <id>");
                    continue;
                };
                let id = match timesheet.resolve_entry_id(prefix) {
                    Ok(id) => id,
                    Err(e) => {
                        println!("Error: {e}");
                        continue;
                    }
                };
                let mut confirm = LineConfirm { input: &mut input };
                match timesheet.delete_entry(&id, &mut confirm) {
                    Ok(true) => println!("Deleted entry {}.", short_id(&id)),
                    Ok(false) => println!("Delete cancelled."),
                    Err(e) => println!("Error: {e}"),
                }
            }
            "summary" => print_summary(&timesheet.summary()),
            "week" => {
                let day = match parts.next() {
                    Some(s) => match parse_date(s) {
                        Some(d) => d,
                        None => {
                            println!("Invalid date (YYYY-MM-DD)");
                            continue;
                        }
                    },
                    None => today,
                };
                let weekly = timesheet.weekly_summary(day);
                println!(
                    "Week {} to {} ({} entries)",
                    weekly.week_start, weekly.week_end, weekly.entry_count
                );
                print_summary(&weekly.summary);
            }
            "copy" => {
                let mut clipboard = SystemClipboard;
                match timesheet.copy_summary(&mut clipboard) {
                    Ok(_) => println!("Summary copied to clipboard."),
                    Err(e) => {
                        println!("{e}; summary follows:");
                        print_summary(&timesheet.summary());
                    }
                }
            }
            "export" => {
                let export_dir = config.export_dir.clone();
                let mut confirm = LineConfirm { input: &mut input };
                match timesheet.export_and_reset(&mut confirm, &export_dir, today) {
                    Ok(Some(report)) => println!(
                        "Exported {} entries to {}. Timesheet cleared.",
                        report.rows,
                        report.path.display()
                    ),
                    Ok(None) => println!("Export cancelled."),
                    Err(e) => println!("Export failed: {e}"),
                }
            }
            "triage" => match parts.next() {
                Some("add") => {
                    let (Some(date_s), Some(shift_s)) = (parts.next(), parts.next()) else {
                        println!("Usage: triage add <YYYY-MM-DD> <s1|s2|s3>");
                        continue;
                    };
                    let Some(date) = parse_date(date_s) else {
                        println!("Invalid date (YYYY-MM-DD)");
                        continue;
                    };
                    let shift = match shift_s.parse::<ShiftType>() {
                        Ok(s) => s,
                        Err(e) => {
                            println!("Error: {e}");
                            continue;
                        }
                    };
                    match timesheet.log_shift(date, shift) {
                        Ok(entry) => println!(
                            "Logged {} shift on {} ({}).",
                            entry.shift_type,
                            entry.date,
                            short_id(&entry.id)
                        ),
                        Err(e) => println!("Error: {e}"),
                    }
                }
                Some("show") => {
                    if !timesheet.profile().has_triage_log() {
                        println!("Error: triage log is not enabled for this profile");
                        continue;
                    }
                    for shift in timesheet.shifts() {
                        println!("  {}  {}  {}", short_id(&shift.id), shift.date, shift.shift_type);
                    }
                    let counts = shift_counts(timesheet.shifts())
                        .into_iter()
                        .map(|(shift, n)| format!("{shift}={n}"))
                        .collect::<Vec<_>>()
                        .join(", ");
                    println!("Shifts: {counts}");
                }
                Some("delete") => {
                    let Some(prefix) = parts.next() else {
                        println!("Usage: triage delete <id>");
                        continue;
                    };
                    let result = timesheet
                        .resolve_shift_id(prefix)
                        .and_then(|id| timesheet.delete_shift(&id));
                    match result {
                        Ok(true) => println!("Deleted triage shift."),
                        Ok(false) => println!("Triage shift not found."),
                        Err(e) => println!("Error: {e}"),
                    }
                }
                Some("clear") => {
                    let mut confirm = LineConfirm { input: &mut input };
                    match timesheet.clear_shifts(&mut confirm) {
                        Ok(true) => println!("Triage log cleared."),
                        Ok(false) => println!("Clear cancelled."),
                        Err(e) => println!("Error: {e}"),
                    }
                }
                _ => println!("Usage: triage <add|show|delete|clear>"),
            },
            _ => println!("Unknown command. Type 'help'."),
        }
    }
}
