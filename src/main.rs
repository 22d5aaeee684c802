//! Quire CLI: paginate a project file and print the pages
//! The main interface is through WASM bindings.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use log::{error, info, LevelFilter};
use quire::{Book, LayoutError, Project, Theme};

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Format {
    /// Plain text, one block per line
    Text,
    /// Display lists as JSON
    Json,
}

/// Lay out a book project onto pages
#[derive(Parser, Debug)]
#[command(author, version, about = "Quire: book pagination")]
struct Cli {
    /// Project JSON file
    project: PathBuf,

    /// Theme JSON file; defaults apply when omitted
    #[arg(short, long)]
    theme: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Enable verbose logging (repeat for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn run(cli: &Cli) -> Result<(), LayoutError> {
    let project = Project::load(&cli.project)?;
    let theme = match &cli.theme {
        Some(path) => Theme::load(path)?,
        None => Theme::default(),
    };
    info!(
        "laying out {:?} with theme {:?}",
        project.book_title, theme.name
    );

    let rendered = Book::new(project, theme).generate()?;
    match cli.format {
        Format::Json => {
            println!("{}", serde_json::to_string_pretty(rendered.pages())?);
        }
        Format::Text => {
            for page in rendered.pages() {
                let number = page
                    .display_number
                    .map_or_else(String::new, |n| format!(" ({})", n));
                println!("=== page {}{} ===", page.page_number, number);
                println!("{}", page.plain_text());
                println!();
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
        .parse_default_env()
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
