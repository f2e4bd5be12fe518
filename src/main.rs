use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use oas2pg::spec::Document;
use oas2pg::{Options, queries};

#[derive(Parser)]
#[command(
    name = "oas2pg",
    version,
    about = "Generate PostgreSQL DDL from an OpenAPI specification"
)]
struct Cli {
    /// OpenAPI document (YAML or JSON)
    input: PathBuf,

    /// Write schemas.sql (and queries.sql) into this folder instead of stdout
    #[arg(long)]
    output_folder: Option<PathBuf>,

    /// Emit DROP TABLE statements ahead of the CREATE statements
    #[arg(long)]
    delete_statements: bool,

    /// Also generate sqlc-style query templates from the API paths
    #[arg(long)]
    queries: bool,

    /// Skip syntactic validation of the generated SQL
    #[arg(long)]
    no_validate: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let source = fs::read_to_string(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;
    let doc = Document::parse(&source).context("failed to parse OpenAPI document")?;
    log::info!(
        "document has {} schemas and {} paths",
        doc.schema_count(),
        doc.path_count()
    );

    let options = Options {
        drop_tables: cli.delete_statements,
        validate: !cli.no_validate,
    };
    let ddl = oas2pg::document_to_ddl(&doc, &options)?;
    let query_templates = cli.queries.then(|| queries::document_to_queries(&doc));

    match &cli.output_folder {
        Some(folder) => {
            fs::create_dir_all(folder)
                .with_context(|| format!("failed to create output folder {}", folder.display()))?;
            let schema_path = folder.join("schemas.sql");
            fs::write(&schema_path, &ddl)
                .with_context(|| format!("failed to write {}", schema_path.display()))?;
            log::info!("DDL written to {}", schema_path.display());

            if let Some(templates) = &query_templates {
                let query_path = folder.join("queries.sql");
                fs::write(&query_path, templates)
                    .with_context(|| format!("failed to write {}", query_path.display()))?;
                log::info!("query templates written to {}", query_path.display());
            }
        }
        None => {
            print!("{ddl}");
            if let Some(templates) = &query_templates {
                println!();
                print!("{templates}");
            }
        }
    }

    Ok(())
}
