//! Record/replay infrastructure for running the pipeline without network
//! access.

pub mod format;
pub mod recorder;
pub mod replayer;

use std::path::Path;

use format::Cassette;
use replayer::CassetteReplayer;

/// Name of the cassette file written by a recording session.
pub const CASSETTE_FILE: &str = "thumbnailer.cassette.yaml";

/// Load a cassette file and create a replayer.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_cassette(path: &Path) -> Result<CassetteReplayer, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read cassette file {}: {e}", path.display()))?;
    let cassette: Cassette = serde_yaml::from_str(&content)
        .map_err(|e| format!("Failed to parse cassette file {}: {e}", path.display()))?;
    Ok(CassetteReplayer::new(&cassette))
}
