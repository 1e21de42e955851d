use anyhow::Context;
use clap::Parser;
use ensembl_mirror::{
    default_lookup_path, download_datasets, validate_datasets, EmptySelection, Lookup,
    MirrorConfig, LOOKUP_ENV_VAR,
};
use ensembl_mirror::verify::Diagnostic;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "ensembl-mirror")]
#[command(about = "Download and validate Ensembl databases", long_about = None)]
#[command(version)]
struct Args {
    /// Database names to work with. UNIX style globs select several
    /// databases; quote them to avoid shell expansion
    #[arg(value_name = "DB")]
    databases: Vec<String>,

    /// List available databases. Can filter using DB
    #[arg(short, long)]
    list: bool,

    /// Print a JSON blob of database information. Can filter using DB
    #[arg(short, long)]
    info: bool,

    /// Download files as specified by DB
    #[arg(short, long)]
    download: bool,

    /// Validate downloaded files against CHECKSUMS.gz. Can filter using DB
    #[arg(short, long)]
    validate: bool,

    /// Directory where database dumps are located/worked with
    #[arg(short, long, default_value = ".")]
    basedir: PathBuf,

    /// Lookup table (defaults to dblookup.json next to the executable)
    #[arg(long, env = LOOKUP_ENV_VAR)]
    lookup: Option<PathBuf>,

    /// Verbose logging
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize tracing
    let log_level = if args.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("ensembl_mirror={}", log_level).into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<ExitCode> {
    let config = MirrorConfig {
        lookup_path: args.lookup.unwrap_or_else(default_lookup_path),
        basedir: args.basedir,
    };
    debug!("Using lookup table {}", config.lookup_path.display());
    let lookup = Lookup::from_path(&config.lookup_path)?;

    if args.list {
        let resolution = lookup.resolve(&args.databases, EmptySelection::All);
        for name in &resolution.names {
            println!("{}", name);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let resolution = lookup.resolve(&args.databases, EmptySelection::Nothing);

    if args.info {
        let records = lookup.raw_records(&resolution.names);
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(ExitCode::SUCCESS);
    }

    if args.download {
        download_datasets(&config, &lookup, &resolution.names)
            .await
            .context("download failed")?;
    }

    if args.validate {
        if resolution.is_empty() {
            println!("No databases found to test");
            return Ok(ExitCode::SUCCESS);
        }

        for pattern in &resolution.unmatched {
            let pattern = pattern.as_str();
            println!("{}", Diagnostic::UnmatchedPattern { pattern });
        }
        let report = validate_datasets(&config, &lookup, &resolution, |dataset| {
            for diagnostic in dataset.diagnostics() {
                println!("{}", diagnostic);
            }
        })
        .await
        .context("validation aborted")?;
        if !report.is_success() {
            return Ok(ExitCode::FAILURE);
        }
        println!("All files are correct");
        info!("Validated {} databases", report.datasets.len());
    }

    Ok(ExitCode::SUCCESS)
}
