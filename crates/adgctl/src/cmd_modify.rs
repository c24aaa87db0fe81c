use std::path::Path;

use adg_patch::{apply_pad_colors, remap_notes, trim_pads};
use anyhow::Result;
use tracing::info;

use crate::common::{self, Options};

/// Shift every pad note by `shift` and the pad view by `scroll_shift`.
pub fn remap(input: &Path, output: &Path, shift: i64, scroll_shift: i64, clamp: bool, opts: &Options) -> Result<bool> {
    let report = common::modify_devices(input, output, opts, |device| {
        remap_notes(device.document_mut(), shift, scroll_shift, clamp)?;
        Ok(())
    })?;
    common::finish_batch(&report, opts.json)
}

/// Keep the `keep` highest pads of every drum rack.
pub fn trim(input: &Path, output: &Path, keep: usize, opts: &Options) -> Result<bool> {
    let report = common::modify_devices(input, output, opts, |device| {
        let removed = trim_pads(device.document_mut(), keep)?;
        info!(removed, keep, "trimmed drum rack");
        Ok(())
    })?;
    common::finish_batch(&report, opts.json)
}

/// Color pads by the drum category their name suggests.
pub fn color(input: &Path, output: &Path, opts: &Options) -> Result<bool> {
    let scheme = opts.config.color_scheme();
    let report = common::modify_devices(input, output, opts, |device| {
        let report = apply_pad_colors(device.document_mut(), &scheme)?;
        info!(colored = report.colored, skipped = report.skipped, "colored pads");
        Ok(())
    })?;
    common::finish_batch(&report, opts.json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use adg::Device;
    use adg_patch::note_mappings;

    const RACK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Ableton>
	<GroupDevicePreset>
		<BranchPresets>
			<DrumBranchPreset Id="0">
				<Name Value="Kick" />
				<ZoneSettings>
					<ReceivingNote Value="92" />
				</ZoneSettings>
			</DrumBranchPreset>
			<DrumBranchPreset Id="1">
				<Name Value="Snare" />
				<ZoneSettings>
					<ReceivingNote Value="91" />
				</ZoneSettings>
			</DrumBranchPreset>
		</BranchPresets>
	</GroupDevicePreset>
</Ableton>
"#;

    #[test]
    fn remap_and_trim_single_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("Kit.adg");
        Device::from_xml(RACK).expect("parse").save(&input).expect("save");
        let opts = Options::default();

        let shifted = dir.path().join("Shifted.adg");
        assert!(remap(&input, &shifted, -56, 0, true, &opts).expect("remap"));
        let doc = Device::open(&shifted).expect("open");
        assert_eq!(note_mappings(doc.document()).expect("notes"), vec![36, 35]);

        let trimmed = dir.path().join("Trimmed.adg");
        assert!(trim(&input, &trimmed, 1, &opts).expect("trim"));
        let summary = Device::open(&trimmed).expect("open").summary().expect("summary");
        assert_eq!(summary.pads, 1);
    }

    #[test]
    fn unreadable_input_is_a_failed_batch() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("Missing.adg");
        let ok = trim(&input, &dir.path().join("out.adg"), 16, &Options::default()).expect("batch");
        assert!(!ok);
    }
}
