use std::path::PathBuf;

use clap::{Parser, Subcommand};
use wtr_core::{CommentStore, CoreConfig, export_rows, flatten, write_csv};

#[derive(Parser)]
#[command(name = "wtr")]
#[command(about = "Web template review-form CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a web template and print the question tree as JSON
    Compile {
        /// Web template JSON file
        template: PathBuf,
    },
    /// List every answerable question with its path
    Questions {
        /// Web template JSON file
        template: PathBuf,
    },
    /// Export all questions and their comments as CSV
    ExportComments {
        /// Web template JSON file
        template: PathBuf,
        /// Directory holding the comment store
        #[arg(long, default_value = "review_data")]
        data_dir: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Compile { template }) => {
            let document = webtemplate::from_file(&template)?;
            let composition = wtr_core::compile(&document);
            println!("{}", serde_json::to_string_pretty(&composition)?);
        }
        Some(Commands::Questions { template }) => {
            let document = webtemplate::from_file(&template)?;
            let composition = wtr_core::compile(&document);
            let questions = flatten(&composition);
            if questions.is_empty() {
                println!("No answerable questions found.");
            } else {
                for question in questions {
                    println!("{}  {}", question.path, question.display_name);
                }
            }
        }
        Some(Commands::ExportComments { template, data_dir }) => {
            let document = webtemplate::from_file(&template)?;
            let composition = wtr_core::compile(&document);
            let config = CoreConfig::new(template, data_dir)?;
            let store = CommentStore::open(&config)?;
            let rows = export_rows(&flatten(&composition), &store);
            print!("{}", write_csv(&rows)?);
        }
        None => {
            println!("Use 'wtr --help' for commands");
        }
    }

    Ok(())
}
