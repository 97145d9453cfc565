use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;

use sigcarve::application::dto::ScanOptions;
use sigcarve::application::{CarveImageUseCase, ExtractFilesUseCase};
use sigcarve::domain::repositories::DiskImage;
use sigcarve::domain::services::{BootSectorGeometry, SignatureCatalog, locate_data_region};
use sigcarve::infrastructure::disk_image::MmapDiskImage;
use sigcarve::infrastructure::persistence::LocalFileWriter;
use sigcarve::presentation::cli::{CarveArgs, Cli, Commands, ProgressReporter, init_logging};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.debug);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR -- {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Scan { carve, json } => {
            let (_, report) = carve_image(&carve)?;
            print_report(&report, json)
        }
        Commands::Recover {
            carve,
            output,
            overwrite,
            json,
        } => {
            let (image, report) = carve_image(&carve)?;

            let writer = LocalFileWriter::new(&output, overwrite)
                .with_context(|| format!("Failed to prepare {}", output.display()))?;
            let progress = ProgressReporter::for_recovery(report.records.len() as u64);
            let extraction = ExtractFilesUseCase::new(writer).execute(
                image.bytes(),
                &report.records,
                Some(progress.recovery_callback()),
            );
            progress.finish("Done");

            print_report(&report, json)?;
            eprint!("{}", extraction.summary());
            Ok(())
        }
        Commands::ListSignatures => {
            list_signatures();
            Ok(())
        }
        Commands::Info { image, any_extension } => show_info(&image, any_extension),
    }
}

fn open_image(path: &Path, options: &ScanOptions) -> Result<MmapDiskImage> {
    Ok(MmapDiskImage::open(
        path,
        options.required_extension.as_deref(),
        options.max_image_bytes,
    )?)
}

fn carve_image(args: &CarveArgs) -> Result<(MmapDiskImage, sigcarve::CarveReport)> {
    let options = args.to_options()?;
    let image = open_image(&args.image, &options)?;

    let progress = ProgressReporter::for_scan(image.size());
    let result = CarveImageUseCase::with_standard_catalog().execute(&image, &options);
    progress.clear();

    let report = result?;
    tracing::info!("{}", report.summary().trim_end());
    Ok((image, report))
}

fn print_report(report: &sigcarve::CarveReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        for line in report.lines() {
            println!("{line}");
        }
    }
    Ok(())
}

fn list_signatures() {
    let catalog = SignatureCatalog::standard();
    println!("{:<8} {:<8} {:<14} {}", "KEY", "ROLE", "FORMAT", "BYTES");
    println!("{}", "-".repeat(60));
    for sig in catalog.headers().iter().chain(catalog.trailers()) {
        let mut bytes = hex::encode_upper(sig.pattern());
        if let Some(follow) = sig.follow_bytes() {
            bytes.push_str(&format!(" + [{}]", hex::encode_upper(follow)));
        }
        println!(
            "{:<8} {:<8} {:<14} {}",
            sig.name(),
            sig.role().to_string(),
            sig.format().name(),
            bytes
        );
    }
}

fn show_info(path: &Path, any_extension: bool) -> Result<()> {
    let mut options = ScanOptions::default();
    if any_extension {
        options = options.any_extension();
    }
    let image = open_image(path, &options)?;

    println!("Image:        {}", image.path());
    println!("Size:         {} bytes", image.size());
    match BootSectorGeometry::parse(image.bytes()) {
        Some(geometry) => {
            println!("Bytes/sector: {}", geometry.bytes_per_sector);
            println!("Sectors/clus: {}", geometry.sectors_per_cluster);
            println!("Reserved:     {}", geometry.reserved_sectors);
            println!("FATs:         {}", geometry.fat_count);
            println!("Root entries: {}", geometry.root_entries);
            println!("Sectors/FAT:  {}", geometry.sectors_per_fat);
        }
        None => println!("Boot sector:  unreadable"),
    }
    println!("Data region:  {}", locate_data_region(image.bytes()));
    Ok(())
}
