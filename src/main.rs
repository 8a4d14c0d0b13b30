use std::{
    path::PathBuf,
    process::ExitCode,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::SystemTime,
};

use asi_capture::{
    camera_report, capture_with, list_cameras, AsiSdkFfi, CaptureRequest, CaptureSettings,
    ImageType, OutputFormat, Result,
};
use chrono::{DateTime, Local};
use clap::{CommandFactory, Parser};
use log::warn;

/// List, inspect and capture frames from ZWO ASI cameras.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
struct Args {
    /// Capture frames: <camera>,<prefix>,<number>,<exposure_us>[,<control>=<auto|value>...]
    #[arg(short, long, value_name = "CAPTURE")]
    capture: Option<CaptureRequest>,
    /// Print information and capabilities of a camera.
    #[arg(short, long, value_name = "CAMERA", allow_negative_numbers = true)]
    info: Option<i32>,
    /// List connected cameras.
    #[arg(short, long, default_value_t = false)]
    list: bool,
    /// Read capture settings from an INI file.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Write the effective capture settings to an INI file.
    #[arg(long, value_name = "FILE")]
    write_config: Option<PathBuf>,
    /// Pixel format: raw8, rgb24, raw16 or y8.
    #[arg(long, value_name = "TYPE")]
    image_type: Option<ImageType>,
    /// Output file format: pnm or png.
    #[arg(long, value_name = "FORMAT")]
    format: Option<OutputFormat>,
    /// Binning factor, 1 or more.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    bin: Option<u32>,
    /// Take dark frames.
    #[arg(long, default_value_t = false)]
    dark: bool,
}

impl Args {
    fn has_action(&self) -> bool {
        self.list || self.info.is_some() || self.capture.is_some() || self.write_config.is_some()
    }

    fn settings(&self) -> Result<CaptureSettings> {
        let mut settings = match &self.config {
            Some(path) => CaptureSettings::from_ini(path)?,
            None => CaptureSettings::default(),
        };
        if let Some(image_type) = self.image_type {
            settings.image_type = image_type;
        }
        if let Some(format) = self.format {
            settings.output_format = format;
        }
        if let Some(bin) = self.bin {
            settings.set_bin(bin)?;
        }
        settings.dark_frame |= self.dark;
        Ok(settings)
    }
}

fn stamp() -> String {
    let now: DateTime<Local> = SystemTime::now().into();
    now.format("[%H:%M:%S]").to_string()
}

fn run(args: &Args) -> Result<()> {
    let settings = args.settings()?;
    if let Some(path) = &args.write_config {
        settings.to_ini(path)?;
        println!("{} Settings written to {}", stamp(), path.display());
    }

    let sdk = AsiSdkFfi;
    if args.list {
        for info in list_cameras(&sdk)? {
            println!("{}", info.list_entry());
        }
    }
    if let Some(index) = args.info {
        print!("{}", camera_report(&sdk, index)?);
    }
    if let Some(request) = &args.capture {
        let cancel = Arc::new(AtomicBool::new(false));
        {
            let cancel = cancel.clone();
            if let Err(e) = ctrlc::set_handler(move || {
                cancel.store(true, Ordering::SeqCst);
                println!("\nCtrl + C received!");
            }) {
                warn!("Error setting Ctrl-C handler: {e}");
            }
        }
        println!(
            "{} Capturing {} frame(s) of {:?} from camera {}",
            stamp(),
            request.count,
            request.exposure,
            request.camera
        );
        let written = capture_with(&sdk, request, &settings, &cancel, |index, path| {
            println!(
                "{} Frame {}/{}: {}",
                stamp(),
                index + 1,
                request.count,
                path.display()
            );
        })?;
        println!("{} Done, {} frame(s) written", stamp(), written.len());
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if !args.has_action() {
        if let Err(e) = Args::command().print_help() {
            warn!("Error printing help: {e}");
        }
        return ExitCode::SUCCESS;
    }
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
