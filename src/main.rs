// Entry point and high-level CLI flow.
//
// The agent sheet is loaded once at startup and kept in `SOURCE`. Every menu
// action after that re-runs filter → aggregate → output against it:
// - Option [1] picks the Gender filter.
// - Option [2] picks the Region filter.
// - Option [3] clears both filters.
// - Option [4] renders the dashboard (console previews plus files).
mod cli;
mod dashboard;
mod error;
mod filter;
mod loader;
mod output;
mod reports;
mod reshape;
mod types;
mod util;

use clap::Parser;
use cli::Cli;
use dashboard::SourceTables;
use filter::{parse_picks, Selection};
use once_cell::sync::OnceCell;
use std::io::{self, Write};
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

// Source tables are read once and never mutated afterwards.
static SOURCE: OnceCell<SourceTables> = OnceCell::new();

/// Read a single line of input after printing `prompt`.
///
/// Returns `None` once stdin is closed.
fn read_line(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Ask the user whether to go back to the filter menu after rendering.
///
/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        let Some(resp) = read_line("Back to Filter Selection (Y/N): ") else {
            return false;
        };
        match resp.to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn load_source(cli: &Cli) -> error::Result<SourceTables> {
    let (agents, load_report) = loader::load_agents(&cli.input, &cli.sheet)?;
    println!(
        "Processing dataset... ({} rows loaded)",
        util::format_int(load_report.loaded_rows)
    );
    if load_report.parse_errors > 0 {
        println!(
            "Note: {} rows skipped due to parse errors.",
            util::format_int(load_report.parse_errors)
        );
    }
    if load_report.coerced_cells > 0 {
        println!(
            "Info: {} non-numeric cells read as missing.",
            util::format_int(load_report.coerced_cells)
        );
    }
    println!();
    SourceTables::new(agents)
}

/// Show the options for one attribute and return the user's pick.
fn pick_filter(label: &str, options: &[String], current: &[String]) -> Vec<String> {
    println!("Filter by {}:", label);
    for (i, opt) in options.iter().enumerate() {
        let mark = if current.contains(opt) { "x" } else { " " };
        println!("  [{}] {} {}", i + 1, mark, opt);
    }
    let input = read_line("Enter numbers or names, comma-separated (blank = all): ");
    let picked = parse_picks(input.as_deref().unwrap_or_default(), options);
    info!(attribute = label, selection = ?picked, "filter changed");
    println!();
    picked
}

fn handle_render(
    source: &SourceTables,
    selection: &Selection,
    bins: usize,
    out_dir: &Path,
) -> error::Result<()> {
    let dash = dashboard::build(source, selection, bins);
    println!("Field Officer Data Dashboard");
    if selection.is_empty() {
        println!("(No filters applied)\n");
    } else {
        println!(
            "(Gender: {} | Region: {})\n",
            describe(&selection.genders),
            describe(&selection.regions)
        );
    }
    output::print_dashboard(&dash);
    let written = output::write_dashboard(out_dir, &dash)?;
    println!(
        "(Chart data exported to {} files in {})\n",
        written.len(),
        out_dir.display()
    );
    Ok(())
}

fn describe(values: &[String]) -> String {
    if values.is_empty() {
        "all".to_string()
    } else {
        values.join(", ")
    }
}

fn run(cli: Cli) -> error::Result<()> {
    let source = SOURCE.get_or_try_init(|| load_source(&cli))?;
    let bins = usize::from(cli.bins);
    let mut selection = Selection {
        genders: cli.gender.clone(),
        regions: cli.region.clone(),
    };

    if cli.batch {
        return handle_render(source, &selection, bins, &cli.out_dir);
    }

    loop {
        println!("Select Dashboard Action:");
        println!("[1] Filter by Gender");
        println!("[2] Filter by Region");
        println!("[3] Clear filters");
        println!("[4] Render dashboard\n");
        let Some(choice) = read_line("Enter choice: ") else {
            return Ok(());
        };
        match choice.as_str() {
            "1" => {
                selection.genders =
                    pick_filter("Gender", &source.gender_options, &selection.genders);
            }
            "2" => {
                selection.regions =
                    pick_filter("Region", &source.region_options, &selection.regions);
            }
            "3" => {
                selection = Selection::default();
                info!("filters cleared");
                println!("Filters cleared.\n");
            }
            "4" => {
                println!();
                if let Err(e) = handle_render(source, &selection, bins, &cli.out_dir) {
                    error!(error = %e, "render failed");
                    eprintln!("Write error: {}\n", e);
                }
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    return Ok(());
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1, 2, 3 or 4.\n");
            }
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(io::stderr)
        .init();
    info!(input = %cli.input.display(), sheet = %cli.sheet, "startup");

    if let Err(e) = run(cli) {
        error!(error = %e, "dashboard aborted");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
