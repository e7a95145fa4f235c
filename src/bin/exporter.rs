//! X9.37 Export - CLI tool for building image cash letter files from a batch manifest.

use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::Parser;
use log::info;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use x937_export::{
    manifest::load_batches, Destination, Error, ExportRequest, Exporter, FormatConfig,
    JsonFileStore, MergeFields, Passthrough, PlainText, Result, Services,
};

#[derive(Parser)]
#[command(name = "x937_export")]
#[command(about = "Build an X9.37 image cash letter from deposited checks", long_about = None)]
struct Cli {
    /// Destination configuration (JSON)
    #[arg(long)]
    config: PathBuf,

    /// Batch manifest (CSV)
    #[arg(long)]
    transactions: PathBuf,

    /// Destination format (dstu, bank-of-the-west, bmo, wells-fargo)
    #[arg(long)]
    destination: String,

    /// Counter state file (JSON), created when missing
    #[arg(long)]
    state: PathBuf,

    /// Output file path (or stdout if not provided)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Business date of the deposit (YYYY-MM-DD), defaults to the export date
    #[arg(long = "business-date")]
    business_date: Option<String>,

    /// Export timestamp (YYYY-MM-DDTHH:MM:SS), defaults to now
    #[arg(long = "export-time")]
    export_time: Option<String>,

    /// TIFF image used for deposit slips
    #[arg(long = "deposit-slip")]
    deposit_slip: Option<PathBuf>,

    /// Directory check images are resolved against, defaults to the manifest's directory
    #[arg(long)]
    images: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        for message in e.messages() {
            eprintln!("Error: {}", message);
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let destination = cli.destination.parse::<Destination>()?;
    let config: FormatConfig = serde_json::from_reader(File::open(&cli.config)?)?;

    let image_root = match cli.images {
        Some(ref dir) => dir.clone(),
        None => cli
            .transactions
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };
    let batches = load_batches(&mut File::open(&cli.transactions)?, &image_root)?;

    let export_time = match cli.export_time {
        Some(ref value) => parse_export_time(value)?,
        None => Local::now().naive_local(),
    };
    let business_date = match cli.business_date {
        Some(ref value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map_err(|_| Error::InvalidDate(value.clone()))?,
        None => export_time.date(),
    };

    let images = match cli.deposit_slip {
        Some(ref path) => Passthrough::with_deposit_slip(fs::read(path)?),
        None => Passthrough::new(),
    };
    let services = Services::new(&PlainText, &images, &MergeFields);
    let format = destination.file_format();
    let exporter = Exporter::new(format.as_ref(), services);

    let request = ExportRequest::new(config, batches, export_time, business_date);
    let mut store = JsonFileStore::open(&cli.state)?;
    let bytes = exporter.export(&request, &mut store)?;
    info!("Counters saved to {}", store.path().display());

    if let Some(ref output_path) = cli.output {
        let mut file = File::create(output_path)?;
        file.write_all(&bytes)?;
        info!("Wrote {}", output_path.display());
    } else {
        let mut stdout = io::stdout();
        stdout.write_all(&bytes)?;
        stdout.flush()?;
    }

    Ok(())
}

fn parse_export_time(value: &str) -> Result<NaiveDateTime> {
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .ok_or_else(|| Error::InvalidDate(value.to_string()))
}
