//! X9.37 Inspect - CLI tool for listing the records of an image cash letter file.

use clap::Parser;
use std::fs::File;
use x937_export::{
    reader::{read_records, RawRecord},
    Error, Result,
};

#[derive(Parser)]
#[command(name = "x937_inspect")]
#[command(about = "List the records of an X9.37 file and check its totals", long_about = None)]
struct Cli {
    /// X9.37 file path
    #[arg(short, long)]
    file: String,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut file = File::open(&cli.file)?;
    let records = read_records(&mut file)?;

    for (index, record) in records.iter().enumerate() {
        println!(
            "{:>6}  {:02}  {:<22} {:>7} bytes",
            index + 1,
            record.record_type,
            record_name(record.record_type),
            record.len()
        );
    }

    println!("{}", summarize(&records)?);
    Ok(())
}

fn record_name(record_type: u8) -> &'static str {
    match record_type {
        1 => "FileHeader",
        10 => "CashLetterHeader",
        20 => "BundleHeader",
        25 => "CheckDetail",
        26 => "CheckDetailAddendumA",
        50 => "ImageViewDetail",
        52 => "ImageViewData",
        61 => "CreditDetail",
        70 => "BundleControl",
        90 => "CashLetterControl",
        99 => "FileControl",
        _ => "Unknown",
    }
}

fn summarize(records: &[RawRecord]) -> Result<String> {
    let mut check_total = 0u64;
    let mut checks = 0usize;
    for record in records.iter().filter(|r| r.record_type == 25) {
        check_total += record.number(48, 10)?;
        checks += 1;
    }

    let file_control = records
        .iter()
        .find(|r| r.record_type == 99)
        .ok_or_else(|| Error::MissingField("file control record".to_string()))?;
    let file_total = file_control.number(25, 16)?;
    let record_count = file_control.number(9, 8)?;

    let mut summary = format!(
        "{} records, {} checks totaling {}.{:02}",
        records.len(),
        checks,
        check_total / 100,
        check_total % 100
    );

    if file_total != check_total {
        return Err(Error::ParseError(format!(
            "{}; file control total {} does not match check details {}",
            summary, file_total, check_total
        )));
    }
    if record_count != records.len() as u64 {
        return Err(Error::ParseError(format!(
            "{}; file control counts {} records",
            summary, record_count
        )));
    }

    summary.push_str("; totals match");
    Ok(summary)
}
