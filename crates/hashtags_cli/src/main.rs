//! CLI smoke probe.
//!
//! # Responsibility
//! - Verify `hashtags_core` linkage with a deterministic ping/version line.
//! - Optionally load an index file and print its counted tag listing.
//!
//! Usage: `hashtags_cli [PATH] [text|binary]`

use hashtags_core::{HashList, StorageFormat};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("hashtags_core ping={}", hashtags_core::ping());
    println!("hashtags_core version={}", hashtags_core::core_version());

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        return ExitCode::SUCCESS;
    };
    let format = match parse_format(args.next().as_deref()) {
        Ok(format) => format,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };

    let list = match HashList::open(&path, format) {
        Ok(list) => list,
        Err(err) => {
            eprintln!("error_code={} {err}", err.code());
            return ExitCode::FAILURE;
        }
    };

    println!(
        "tags={} associations={} checksum={:08x}",
        list.len(),
        list.len_total(),
        list.checksum()
    );
    for item in list.counted_list() {
        println!("{:>6} {}", item.count, item.tag);
    }
    ExitCode::SUCCESS
}

fn parse_format(arg: Option<&str>) -> Result<StorageFormat, String> {
    match arg {
        None => Ok(StorageFormat::Text),
        Some(value) => value
            .parse::<StorageFormat>()
            .map_err(|err| err.to_string()),
    }
}
