//! Print information and capabilities of every connected camera.
use std::process::ExitCode;

use asi_capture::{camera_reports, AsiSdkFfi, Result};

fn run() -> Result<()> {
    let sdk = AsiSdkFfi;
    let reports = camera_reports(&sdk)?;
    match reports.len() {
        1 => println!("1 camera detected!"),
        n => println!("{n} cameras detected!"),
    }
    for report in reports {
        print!("{}", report?);
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
