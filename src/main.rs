// Entry point and high-level CLI flow.
//
// - Option [1] downloads (or reads) the facility CSV, cleans it and prints
//   diagnostics.
// - Option [2] asks for a region and writes its reports plus a JSON summary.
// - With `--region` the dataset is loaded and a single report is generated
//   without showing the menu.
mod catalog;
mod category;
mod cli;
mod config;
mod error;
#[cfg(test)]
mod fixture;
mod geocode;
mod loader;
mod output;
mod regions;
mod reports;
mod schema;
mod types;
mod util;

use clap::Parser;
use cli::Cli;
use config::Config;
use error::Result;
use geocode::UNRESOLVED_DISPLAY_LIMIT;
use loader::{Dataset, LoadReport, Source};
use log::{debug, warn};
use once_cell::sync::Lazy;
use reports::{RegionView, ViewParams};
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::{Mutex, PoisonError};

const DEFAULT_LOGGING_LEVEL: &str = "warn";

// Loaded once per run; reports are recomputed from it on every selection.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { data: None }));

struct AppState {
    data: Option<(Dataset, LoadReport)>,
}

/// Settings for this run, after merging CLI flags over the config file.
struct Session {
    config: Config,
    source: Source,
}

/// Read a single line of input after printing `prompt`.
fn read_line(prompt: &str) -> String {
    print!("{prompt}");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Ask the user whether to go back to the menu after generating reports.
///
/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        match read_line("Back to Report Selection (Y/N): ").to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Handle option [1]: fetch, decode and clean the CSV.
///
/// On success the dataset is stored in `APP_STATE` and a short summary of
/// the load is printed.
fn handle_load(session: &Session) -> Result<()> {
    println!("Loading dataset...");
    let (dataset, load_report) = loader::load_and_clean(&session.source, &session.config)?;
    println!(
        "Processing dataset... ({} rows read, {} facilities loaded from {})",
        util::format_int(load_report.total_rows),
        util::format_int(dataset.records.len()),
        dataset.source
    );
    if load_report.skipped_rows > 0 {
        println!(
            "Note: {} malformed rows skipped.",
            util::format_int(load_report.skipped_rows)
        );
    }
    if load_report.padded_rows > 0 {
        println!(
            "Info: {} short rows completed with empty cells.",
            util::format_int(load_report.padded_rows)
        );
    }
    if !dataset.has_coordinates {
        println!("Info: the dataset has no coordinate columns; only commune reference points will be mapped.");
    }
    println!();
    let mut state = APP_STATE.lock().unwrap_or_else(PoisonError::into_inner);
    state.data = Some((dataset, load_report));
    Ok(())
}

/// Region selector: regions in north-to-south order with their facility count.
fn prompt_region(dataset: &Dataset) -> Option<String> {
    let counts = reports::reindexed_counts(
        &dataset.records,
        &dataset.region_order,
        reports::Grouping::Region,
    );
    println!("Select a region:");
    for (idx, (region, n)) in counts.iter().enumerate() {
        println!("[{}] {} ({})", idx + 1, region, util::format_int(*n));
    }
    loop {
        let choice = read_line("Enter choice: ");
        match choice.parse::<usize>() {
            Ok(n) if (1..=counts.len()).contains(&n) => return Some(counts[n - 1].0.clone()),
            _ if choice.is_empty() => return None,
            _ => println!("Invalid choice. Please enter 1-{}.", counts.len()),
        }
    }
}

fn prompt_top_communes(default: usize) -> usize {
    let range = reports::TOP_COMMUNES_RANGE;
    loop {
        let input = read_line(&format!(
            "Communes to map ({}-{}, Enter for {}): ",
            range.start(),
            range.end(),
            default
        ));
        if input.is_empty() {
            return default;
        }
        match input.parse::<usize>() {
            Ok(n) if range.contains(&n) => return n,
            _ => println!("Invalid choice."),
        }
    }
}

/// Parse a facility-type count typed at the prompt; empty input keeps `default`.
fn parse_top_types_choice(input: &str, default: usize) -> Option<usize> {
    if input.is_empty() {
        return Some(default);
    }
    input
        .parse::<usize>()
        .ok()
        .filter(|n| reports::TOP_TYPE_CHOICES.contains(n))
}

fn prompt_top_types(default: usize) -> usize {
    loop {
        let input = read_line(&format!(
            "Facility types to show (5 or 10, Enter for {}): ",
            default
        ));
        match parse_top_types_choice(&input, default) {
            Some(n) => return n,
            None => println!("Invalid choice. Please enter 5 or 10."),
        }
    }
}

/// Handle option [2]: ask for a region and generate its reports.
fn handle_generate_reports(session: &Session) -> Result<()> {
    let state = APP_STATE.lock().unwrap_or_else(PoisonError::into_inner);
    let Some((dataset, load_report)) = state.data.as_ref() else {
        println!("Error: No data loaded. Please load the dataset first (option 1).\n");
        return Ok(());
    };
    let Some(region) = prompt_region(dataset) else {
        return Ok(());
    };
    let top_communes = prompt_top_communes(session.config.top_communes);
    let top_types = prompt_top_types(session.config.top_types);
    let params = ViewParams::new(&region, top_communes, top_types)?;
    generate_reports(session, dataset, load_report, &params)
}

/// Compute the region view and write every report for it.
///
/// This function is intentionally side-effectful:
/// - writes the CSV reports,
/// - writes a JSON summary,
/// - and prints previews of each report to the console.
fn generate_reports(
    session: &Session,
    dataset: &Dataset,
    load_report: &LoadReport,
    params: &ViewParams,
) -> Result<()> {
    let view = reports::build_view(dataset, params)?;
    let out_dir = &session.config.output_dir;
    std::fs::create_dir_all(out_dir)?;

    println!("\nGenerating reports for {}...", view.region);
    println!("Outputs saved to {}\n", out_dir.display());

    println!("Key indicators");
    println!("  Total facilities:  {}", util::format_int(view.total));
    println!("  Distinct types:    {}\n", util::format_int(view.distinct_types));

    let r1 = reports::generate_region_report(&view);
    let file1 = out_dir.join("report1_national_by_region.csv");
    output::write_csv(&file1, &r1)?;
    println!("Report 1: Facilities per Region (north to south)\n");
    output::print_bar_chart(&view.national, 40);
    println!("(Full table exported to {})\n", file1.display());

    let r2 = reports::generate_type_report(&view);
    let file2 = out_dir.join("report2_facility_types.csv");
    output::write_csv(&file2, &r2)?;
    println!("Report 2: Facility Types in {}", view.region);
    println!("(Top {} of {} types)\n", params.top_types, view.distinct_types);
    output::preview_table_rows(&r2, params.top_types);
    println!("(Full table exported to {})\n", file2.display());

    let r3 = reports::generate_category_report(&view);
    let file3 = out_dir.join("report3_macro_categories.csv");
    output::write_csv(&file3, &r3)?;
    println!("Report 3: Facilities by Category\n");
    output::preview_table_rows(&r3, r3.len());
    println!("(Full table exported to {})\n", file3.display());

    let r4 = reports::generate_commune_report(&view);
    let file4 = out_dir.join("report4_commune_map.csv");
    output::write_csv(&file4, &r4)?;
    println!("Report 4: Communes on the Map");
    println!("(Top {} communes by facilities)\n", params.top_communes);
    output::preview_table_rows(&r4, params.top_communes);
    print_unresolved(&view);
    println!("(Full table exported to {})\n", file4.display());

    if dataset.has_coordinates {
        let file = out_dir.join("map_points.csv");
        output::write_csv(&file, &view.points)?;
        if view.points.is_empty() {
            println!("No valid coordinates to place on the map.\n");
        } else {
            println!(
                "Map: {} facilities with coordinates exported to {}\n",
                util::format_int(view.points.len()),
                file.display()
            );
        }
    }

    let file5 = out_dir.join("facility_detail.csv");
    output::write_csv(&file5, &view.facilities)?;
    println!("Facility Detail");
    output::preview_table_rows(&view.facilities, 5);
    println!("(Full table exported to {})\n", file5.display());

    let summary = reports::generate_summary(dataset, &view, load_report, UNRESOLVED_DISPLAY_LIMIT);
    output::write_json(&out_dir.join("summary.json"), &summary)?;
    println!("Summary Stats (summary.json):");
    println!(
        "{{\"region\": \"{}\", \"facilities\": {}, \"national_facilities\": {}}}\n",
        summary.region,
        util::format_int(summary.total_facilities),
        util::format_int(summary.national_facilities)
    );

    println!("Conclusion");
    println!(
        "Health facilities are unevenly distributed across Chile's regions. In {}, \
         the {} facilities concentrate in a few types and communes, reflecting how \
         the health network is organised and possible gaps in access to care.\n",
        view.region,
        util::format_int(view.total)
    );
    Ok(())
}

fn print_unresolved(view: &RegionView) {
    let (shown, more) = view.commune_map.unresolved_preview(UNRESOLVED_DISPLAY_LIMIT);
    if shown.is_empty() {
        return;
    }
    warn!("{} communes have no reference coordinates", view.commune_map.unresolved.len());
    println!("Communes without coordinates: {}", shown.join(", "));
    if more > 0 {
        println!("... and {} more", more);
    }
}

fn build_session(args: &Cli) -> Result<Session> {
    let mut config = match &args.config {
        Some(path) => Config::from_toml_file(path)?,
        None => Config::read_default()?,
    };
    if let Some(n) = args.top_communes {
        config.top_communes = usize::from(n);
    }
    if let Some(n) = args.top_types {
        config.top_types = n;
    }
    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }
    debug!("config: {config:?}");
    let source = args.file.clone().map_or(Source::Catalog, Source::File);
    Ok(Session { config, source })
}

/// Non-interactive mode: load, report on one region and exit.
fn run_once(session: &Session, region: &str) -> Result<()> {
    let (dataset, load_report) = loader::load_and_clean(&session.source, &session.config)?;
    let params = ViewParams::new(
        region,
        session.config.top_communes,
        session.config.top_types,
    )?;
    generate_reports(session, &dataset, &load_report, &params)
}

fn run_menu(session: &Session) {
    loop {
        println!("Health Facilities in Chile:");
        println!("[1] Load the dataset");
        println!("[2] Generate Reports\n");
        match read_line("Enter choice: ").as_str() {
            "1" => {
                if let Err(e) = handle_load(session) {
                    eprintln!("Failed to load dataset: {}\n", e);
                }
            }
            "2" => {
                println!();
                if let Err(e) = handle_generate_reports(session) {
                    eprintln!("Report error: {}\n", e);
                }
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1 or 2.\n");
            }
        }
    }
}

fn main() -> ExitCode {
    // Set RUST_LOG to `DEFAULT_LOGGING_LEVEL` if not set
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", DEFAULT_LOGGING_LEVEL);
    }
    pretty_env_logger::init_timed();
    let args = Cli::parse();
    debug!("args: {args:?}");

    let session = match build_session(&args) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match &args.region {
        Some(region) => match run_once(&session, region) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{}", e);
                ExitCode::FAILURE
            }
        },
        None => {
            run_menu(&session);
            ExitCode::SUCCESS
        }
    }
}
