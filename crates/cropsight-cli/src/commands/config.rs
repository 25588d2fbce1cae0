//! Config command implementation

use crate::output::OutputWriter;
use crate::output_types::{ConfigEntry, ConfigRow};
use anyhow::Result;
use cropsight_core::config::LayeredConfig;
use std::collections::BTreeMap;

pub fn execute(config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    // Sorted for stable output
    let entries: BTreeMap<String, ConfigEntry> = config
        .to_inspection_map()
        .into_iter()
        .map(|(key, (value, source))| (key, ConfigEntry { value, source: format!("{:?}", source) }))
        .collect();

    if output.is_json() {
        output.result(entries)?;
    } else {
        output.section("Configuration Values");

        let rows: Vec<ConfigRow> = entries
            .into_iter()
            .map(|(key, entry)| ConfigRow { key, value: entry.value, source: entry.source })
            .collect();
        output.table(rows);

        output.section("Configuration Precedence");
        output.info("CLI arguments > Environment variables > Config file > Defaults");
    }

    Ok(())
}
