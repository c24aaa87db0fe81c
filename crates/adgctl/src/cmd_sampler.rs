use std::path::PathBuf;

use adg::{Device, SamplerBuilder};
use adg_patch::KeyLayout;
use anyhow::{Context, Result};

use crate::cmd_drum::BuildReport;
use crate::common::{self, Options};

#[derive(Debug, Clone)]
pub struct SamplerArgs {
    pub samples: PathBuf,
    pub output: PathBuf,
    pub template: Option<PathBuf>,
    pub layout: String,
    pub max_samples: Option<usize>,
}

pub fn run(args: SamplerArgs, opts: &Options) -> Result<()> {
    let layout: KeyLayout = args
        .layout
        .parse()
        .with_context(|| format!("--layout {}", args.layout))?;
    let path = common::resolve_template(args.template, opts.config.sampler_template.as_ref(), "sampler")?;
    let template = Device::open(&path).with_context(|| format!("open template {}", path.display()))?;
    let built = SamplerBuilder::new(template)
        .layout(layout)
        .max_samples(args.max_samples)
        .from_folder(&args.samples, false)
        .with_context(|| format!("build sampler from {}", args.samples.display()))?;
    BuildReport::emit(&built, &args.output, opts)
}
