use std::fs;
use std::path::{Path, PathBuf};

use adg::{find_device_files, Device, DeviceSummary};
use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::common::{self, Options};

#[derive(Debug, Serialize)]
struct InfoRow {
    path: PathBuf,
    #[serde(flatten)]
    summary: DeviceSummary,
}

/// Print the XML of `input`, or write it to `output`.
pub fn decode(input: &Path, output: Option<&Path>, opts: &Options) -> Result<()> {
    let xml = adg_codec::decode(input).with_context(|| format!("decode {}", input.display()))?;
    match output {
        Some(output) if !opts.dry_run => {
            fs::write(output, &xml).with_context(|| format!("write {}", output.display()))?;
            info!(path = %output.display(), bytes = xml.len(), "wrote XML");
        }
        Some(output) => info!(path = %output.display(), "dry run, not writing"),
        None => print!("{xml}"),
    }
    Ok(())
}

/// Compress an XML file into a device file.
pub fn encode(input: &Path, output: &Path, opts: &Options) -> Result<()> {
    let xml = fs::read_to_string(input).with_context(|| format!("read {}", input.display()))?;
    if opts.dry_run {
        let bytes = adg_codec::encode_bytes(&xml).context("encode XML")?;
        info!(path = %output.display(), bytes = bytes.len(), "dry run, not writing");
    } else {
        adg_codec::encode(&xml, output).with_context(|| format!("encode {}", output.display()))?;
        info!(path = %output.display(), "wrote device");
    }
    Ok(())
}

/// Summarise one device file or every device below a folder.
pub fn info(input: &Path, opts: &Options) -> Result<()> {
    let paths = if input.is_dir() {
        find_device_files(input).with_context(|| format!("scan {}", input.display()))?
    } else {
        vec![input.to_path_buf()]
    };
    let mut rows = Vec::with_capacity(paths.len());
    for path in paths {
        let device = Device::open(&path).with_context(|| format!("open {}", path.display()))?;
        let summary = device
            .summary()
            .with_context(|| format!("inspect {}", path.display()))?;
        rows.push(InfoRow { path, summary });
    }

    if opts.json {
        return common::print_json(&rows);
    }
    for row in rows {
        println!("{}", row.path.display());
        println!("  kind:         {}", row.summary.kind.as_deref().unwrap_or("-"));
        println!("  creator:      {}", row.summary.creator.as_deref().unwrap_or("-"));
        println!("  pads:         {}", row.summary.pads);
        println!("  sample parts: {}", row.summary.sample_parts);
        for sample in &row.summary.samples {
            println!("  sample:       {sample}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const XML: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Ableton>\n\t<MultiSampler />\n</Ableton>\n";

    #[test]
    fn encode_then_decode_to_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let xml_in = dir.path().join("in.xml");
        let device = dir.path().join("out/Preset.adv");
        let xml_out = dir.path().join("out.xml");
        fs::write(&xml_in, XML).expect("write");

        let opts = Options::default();
        encode(&xml_in, &device, &opts).expect("encode");
        decode(&device, Some(&xml_out), &opts).expect("decode");
        assert_eq!(fs::read_to_string(&xml_out).expect("read"), XML);
    }

    #[test]
    fn dry_run_encode_still_validates() {
        let dir = tempfile::tempdir().expect("tempdir");
        let xml_in = dir.path().join("in.txt");
        fs::write(&xml_in, "not xml").expect("write");
        let opts = Options {
            dry_run: true,
            ..Options::default()
        };
        assert!(encode(&xml_in, &dir.path().join("x.adg"), &opts).is_err());
        fs::write(&xml_in, XML).expect("write");
        encode(&xml_in, &dir.path().join("x.adg"), &opts).expect("dry run");
        assert!(!dir.path().join("x.adg").exists());
    }
}
