use std::path::PathBuf;

use colored::Colorize;

use crate::aggregator::process_file;
use crate::cli::report::print_report;
use crate::cli::RunArgs;
use crate::error::Result;
use crate::export::{default_stem, upload_all, write_report, FolderUploader, UploadOutcome};

pub fn run(
    file: &str,
    args: &RunArgs,
    output: Option<String>,
    name: Option<String>,
    upload_to: Option<String>,
) -> Result<()> {
    let config = args.resolve()?;
    let report = process_file(&PathBuf::from(file), &config)?;
    print_report(&report, false);
    println!();

    let dir = output.map_or_else(|| PathBuf::from("."), PathBuf::from);
    let stem = name.unwrap_or_else(default_stem);
    let files = write_report(&report, &dir, &stem)?;
    for path in files.all() {
        println!("Wrote {}", path.display());
    }

    let Some(dest) = upload_to else {
        return Ok(());
    };
    let uploader = FolderUploader::new(dest);
    let mut failed = 0usize;
    for (path, outcome) in upload_all(&uploader, &[files.workbook.as_path()]) {
        match outcome {
            UploadOutcome::Uploaded { id } => println!("{} {id}", "Uploaded".green()),
            UploadOutcome::Failed { message } => {
                failed += 1;
                eprintln!("{} {}: {message}", "Upload failed".red(), path.display());
            }
        }
    }
    if failed > 0 {
        println!("The report above and the local files are complete; only the upload failed.");
    }
    Ok(())
}
