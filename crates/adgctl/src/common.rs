use std::path::{Path, PathBuf};

use adg::{find_device_files, mirror_output_path, run_batch, AdgError, BatchReport, Device, ToolConfig};
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use tracing::info;

/// Flags shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub json: bool,
    /// Do all the work but never encode the result.
    pub dry_run: bool,
    pub parallel: bool,
    pub config: ToolConfig,
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("serialise JSON output")?;
    println!("{text}");
    Ok(())
}

pub fn load_config(path: Option<&Path>) -> Result<ToolConfig> {
    ToolConfig::load_or_default(path).context("load tool config")
}

/// Template from the command line, else from the config file.
pub fn resolve_template(flag: Option<PathBuf>, configured: Option<&PathBuf>, what: &str) -> Result<PathBuf> {
    flag.or_else(|| configured.cloned())
        .ok_or_else(|| anyhow!("a {what} template is required (--template or the config file)"))
}

/// Encode `device` to `output` unless this is a dry run.
pub fn write_device(device: &Device, output: &Path, dry_run: bool) -> Result<(), AdgError> {
    if dry_run {
        info!(path = %output.display(), "dry run, not writing");
        return Ok(());
    }
    device.save(output)?;
    Ok(())
}

/// Open, patch and write back one device file, or every device file below a
/// folder (mirrored into `output`).
pub fn modify_devices<F>(input: &Path, output: &Path, opts: &Options, patch: F) -> Result<BatchReport>
where
    F: Fn(&mut Device) -> Result<(), AdgError> + Sync,
{
    let folder = input.is_dir();
    let inputs = if folder {
        find_device_files(input).with_context(|| format!("scan {}", input.display()))?
    } else {
        vec![input.to_path_buf()]
    };
    info!(files = inputs.len(), dry_run = opts.dry_run, "processing devices");
    let report = run_batch(&inputs, opts.parallel, |path| {
        let target = if folder {
            mirror_output_path(path, input, output)
        } else {
            output.to_path_buf()
        };
        let mut device = Device::open(path)?;
        patch(&mut device)?;
        write_device(&device, &target, opts.dry_run)
    });
    Ok(report)
}

/// Print a batch outcome; `true` if every file succeeded.
pub fn finish_batch(report: &BatchReport, json: bool) -> Result<bool> {
    if json {
        print_json(report)?;
    } else {
        for path in &report.succeeded {
            println!("ok      {}", path.display());
        }
        for failure in &report.failed {
            println!("FAILED  {}: {}", failure.path.display(), failure.error);
        }
        println!(
            "{} of {} file(s) processed",
            report.succeeded.len(),
            report.total()
        );
    }
    Ok(report.is_success())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const XML: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Ableton>\n\t<GroupDevicePreset />\n</Ableton>\n";

    #[test]
    fn template_flag_wins_over_config() {
        let configured = PathBuf::from("config.adg");
        let chosen = resolve_template(Some(PathBuf::from("flag.adg")), Some(&configured), "drum rack")
            .expect("template");
        assert_eq!(chosen, PathBuf::from("flag.adg"));
        assert_eq!(
            resolve_template(None, Some(&configured), "drum rack").expect("template"),
            configured
        );
        assert!(resolve_template(None, None, "drum rack").is_err());
    }

    #[test]
    fn folder_is_mirrored_and_dry_run_writes_nothing() {
        let input = tempfile::tempdir().expect("input");
        let output = tempfile::tempdir().expect("output");
        fs::create_dir_all(input.path().join("sub")).expect("mkdir");
        let device = Device::from_xml(XML).expect("parse");
        device.save(input.path().join("sub/Kit.adg")).expect("save");
        fs::write(input.path().join("Broken.adg"), "plain text").expect("write");

        let dry = Options {
            dry_run: true,
            ..Options::default()
        };
        let report = modify_devices(input.path(), output.path(), &dry, |_| Ok(())).expect("batch");
        assert_eq!(report.succeeded.len(), 1);
        assert_eq!(report.failed.len(), 1);
        assert!(!output.path().join("sub/Kit.adg").exists());

        let report = modify_devices(input.path(), output.path(), &Options::default(), |_| Ok(()))
            .expect("batch");
        assert!(!report.is_success());
        assert!(output.path().join("sub/Kit.adg").is_file());
    }
}
