use crate::cache::ExportSnapshot;
use crate::ShioriError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes a cache snapshot as pretty-printed JSON
///
/// Missing parent directories are created.
///
/// # Arguments
///
/// * `snapshot` - The snapshot to write
/// * `output_path` - Destination file, overwritten if present
///
/// # Returns
///
/// * `Ok(())` - Snapshot written
/// * `Err(ShioriError)` - Failed to create or write the file
pub fn write_export(snapshot: &ExportSnapshot, output_path: &Path) -> Result<(), ShioriError> {
    tracing::info!("Writing cache export to: {}", output_path.display());

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(output_path)?);
    serde_json::to_writer_pretty(&mut writer, snapshot)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    tracing::info!(
        "Exported {} jobs and {} profiles",
        snapshot.total_jobs,
        snapshot.total_profiles
    );

    Ok(())
}
