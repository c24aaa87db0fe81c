use std::env;
use std::error::Error;
use std::path::PathBuf;

use adg::{find_device_files, Device};

fn main() -> Result<(), Box<dyn Error>> {
    let root = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    for path in find_device_files(&root)? {
        match Device::open(&path).and_then(|device| device.summary()) {
            Ok(summary) => println!(
                "{:<48} {:<20} pads={:>3} zones={:>3} samples={:>3}",
                path.display(),
                summary.kind.unwrap_or_default(),
                summary.pads,
                summary.sample_parts,
                summary.samples.len()
            ),
            Err(err) => eprintln!("{}: {err}", path.display()),
        }
    }
    Ok(())
}
