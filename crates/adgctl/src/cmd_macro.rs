use std::path::Path;

use adg_patch::{add_transpose_mapping, apply_cc_mappings, parse_cc_mappings, CcMapping};
use anyhow::{anyhow, bail, Context, Result};
use tracing::info;

use crate::common::{self, Options};

/// Mappings from `--map`, else from the config file.
pub fn resolve_mappings(flag: Option<&str>, opts: &Options) -> Result<Vec<CcMapping>> {
    let mappings = match flag {
        Some(list) => parse_cc_mappings(list).with_context(|| format!("--map {list}"))?,
        None => opts.config.cc_mappings().context("cc_mappings in config")?,
    };
    if mappings.is_empty() {
        bail!("no CC mappings given (--map slot:cc:macro or the config file)");
    }
    Ok(mappings)
}

/// Route CC Control slots to macros.
pub fn cc_map(input: &Path, output: &Path, map: Option<&str>, opts: &Options) -> Result<bool> {
    let mappings = resolve_mappings(map, opts)?;
    let report = common::modify_devices(input, output, opts, |device| {
        apply_cc_mappings(device.document_mut(), &mappings)?;
        Ok(())
    })?;
    common::finish_batch(&report, opts.json)
}

/// Map sampler transpose to macro `macro_number` (1-based, as shown in Live).
pub fn transpose(input: &Path, output: &Path, macro_number: usize, value: f64, opts: &Options) -> Result<bool> {
    let macro_index = macro_number
        .checked_sub(1)
        .ok_or_else(|| anyhow!("--macro counts from 1"))?;
    let report = common::modify_devices(input, output, opts, |device| {
        let report = add_transpose_mapping(device.document_mut(), macro_index, value)?;
        info!(
            found = report.found,
            added = report.added,
            already_mapped = report.already_mapped,
            "mapped transpose"
        );
        Ok(())
    })?;
    common::finish_batch(&report, opts.json)
}
