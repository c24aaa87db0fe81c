use std::path::{Path, PathBuf};

use adg::{Built, Device, DrumRackBuilder};
use adg_library::NoteLayout;
use anyhow::{Context, Result};
use serde::Serialize;

use crate::common::{self, Options};

/// Layout name meaning "pads in scan order".
pub const SEQUENTIAL: &str = "sequential";

#[derive(Debug, Clone)]
pub struct DrumRackArgs {
    pub samples: PathBuf,
    pub output: PathBuf,
    pub template: Option<PathBuf>,
    pub layout: String,
    pub categorize: bool,
    pub recursive: bool,
    pub max_samples: usize,
}

#[derive(Debug, Serialize)]
pub(crate) struct BuildReport {
    pub output: PathBuf,
    pub pads: usize,
    pub samples: usize,
    pub written: bool,
}

impl BuildReport {
    pub(crate) fn emit(built: &Built, output: &Path, opts: &Options) -> Result<()> {
        common::write_device(&built.device, output, opts.dry_run)
            .with_context(|| format!("write {}", output.display()))?;
        let report = BuildReport {
            output: output.to_path_buf(),
            pads: built.pads,
            samples: built.samples,
            written: !opts.dry_run,
        };
        if opts.json {
            return common::print_json(&report);
        }
        println!(
            "{} sample(s) on {} pad(s) -> {}{}",
            report.samples,
            report.pads,
            report.output.display(),
            if report.written { "" } else { " (dry run)" }
        );
        Ok(())
    }
}

fn open_template(flag: Option<PathBuf>, opts: &Options) -> Result<Device> {
    let path = common::resolve_template(flag, opts.config.drum_template.as_ref(), "drum rack")?;
    Device::open(&path).with_context(|| format!("open template {}", path.display()))
}

pub fn run(args: DrumRackArgs, opts: &Options) -> Result<()> {
    let builder = DrumRackBuilder::new(open_template(args.template, opts)?)
        .recursive(args.recursive)
        .categorize(args.categorize)
        .max_samples(args.max_samples);
    let built = if args.layout.eq_ignore_ascii_case(SEQUENTIAL) {
        builder.from_folder(&args.samples)
    } else {
        let layout: NoteLayout = args
            .layout
            .parse()
            .with_context(|| format!("--layout {}", args.layout))?;
        builder.from_categorized_folders(&args.samples, layout)
    }
    .with_context(|| format!("build drum rack from {}", args.samples.display()))?;
    BuildReport::emit(&built, &args.output, opts)
}

pub fn multivelocity(samples: &Path, output: &Path, template: Option<PathBuf>, opts: &Options) -> Result<()> {
    let built = DrumRackBuilder::new(open_template(template, opts)?)
        .multivelocity(samples)
        .with_context(|| format!("build multi-velocity rack from {}", samples.display()))?;
    BuildReport::emit(&built, output, opts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_layout_is_rejected_before_scanning() {
        let dir = tempfile::tempdir().expect("tempdir");
        let template = dir.path().join("Rack.adg");
        Device::from_xml("<?xml version=\"1.0\"?>\n<Ableton>\n\t<GroupDevicePreset />\n</Ableton>\n")
            .expect("parse")
            .save(&template)
            .expect("save");
        let args = DrumRackArgs {
            samples: dir.path().join("missing"),
            output: dir.path().join("out.adg"),
            template: Some(template),
            layout: "909".into(),
            categorize: false,
            recursive: true,
            max_samples: 32,
        };
        let err = run(args, &Options::default()).expect_err("must fail");
        assert!(format!("{err:#}").contains("909"));
    }

    #[test]
    fn template_is_required() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(multivelocity(dir.path(), &dir.path().join("out.adg"), None, &Options::default()).is_err());
    }
}
