//! Classify command implementation

use crate::cli::ClassifyArgs;
use crate::output::OutputWriter;
use crate::output_types::ClassifyOutput;
use anyhow::Result;
use cropsight_analysis::classify_zone;
use cropsight_core::models::DEFAULT_MSI;

pub fn execute(args: ClassifyArgs, output: &OutputWriter) -> Result<()> {
    let status = classify_zone(
        args.ndvi,
        args.evi,
        args.ndwi,
        args.msi.unwrap_or(DEFAULT_MSI),
        args.green,
        args.nir,
        args.red,
    );

    if output.is_json() {
        output.result(ClassifyOutput::from(status))?;
    } else {
        output.section("Zone Classification");
        output.kv("Zone", status.zone());
        output.kv("Status", status.description());
    }

    Ok(())
}
