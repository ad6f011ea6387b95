//! inkaux CLI: icon sheet composer and WMF export for Inkscape assets

use clap::{Parser, Subcommand};
use inkaux_engine::{export, Composer, Config, PathResolver, ShellRunner};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Inkscape asset helpers
#[derive(Parser)]
#[command(name = "inkaux")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a drawing to WMF; the result is written to stdout
    Wmf {
        /// File to convert
        input: String,

        /// Path to a JSON config file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Regenerate the icon preview sheets
    Sheets {
        /// Directory holding the template and theme folders
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Path to a JSON config file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the default configuration
    Config {
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    // Logs go to stderr; stdout carries converter output.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Wmf { input, config } => cmd_wmf(&input, config.as_deref()),
        Commands::Sheets { root, config, json } => cmd_sheets(&root, config.as_deref(), json),
        Commands::Config { output } => cmd_config(output.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> Config {
    match Config::load_or_default(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: failed to load config: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_wmf(input: &str, config_path: Option<&Path>) {
    let config = load_config(config_path).converter;
    let resolver = PathResolver::from_config(&config);
    let mut stdout = std::io::stdout().lock();

    if let Err(e) = export(&resolver, &ShellRunner, input, &config, &mut stdout) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn cmd_sheets(root: &Path, config_path: Option<&Path>, json: bool) {
    let config = load_config(config_path).sheets;

    let report = match Composer::new(root, config).and_then(|c| c.run()) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).expect("failed to serialize")
        );
        return;
    }

    for sheet in &report.sheets {
        println!(
            "  {}-{}: {} icon(s) -> {}",
            sheet.theme,
            sheet.variant,
            sheet.icons,
            sheet.path.display()
        );
    }
    for (theme, variant) in &report.skipped {
        println!("  {theme}-{variant}: skipped (no category folder)");
    }
    println!("\n{} sheet(s) written", report.sheets.len());
}

fn cmd_config(output: Option<&Path>) {
    let config = Config::default();

    if let Some(path) = output {
        match config.save(path) {
            Ok(()) => println!("Created {}", path.display()),
            Err(e) => {
                eprintln!("Failed to write config: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    println!(
        "{}",
        serde_json::to_string_pretty(&config).expect("failed to serialize")
    );
}
