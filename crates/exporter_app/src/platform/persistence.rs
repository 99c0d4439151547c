use std::fs;
use std::path::Path;

use exporter_core::ExportSnapshot;
use exporter_engine::{ensure_output_dir, AtomicFileWriter};
use exporter_logging::{export_error, export_info, export_warn};
use serde::{Deserialize, Serialize};

const STATE_FILENAME: &str = ".exporter_state.ron";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedExport {
    title: String,
    url: String,
    exported_at_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PersistedState {
    exports: Vec<PersistedExport>,
}

pub(crate) fn load_recent_exports(output_dir: &Path) -> Vec<ExportSnapshot> {
    let path = output_dir.join(STATE_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Vec::new();
        }
        Err(err) => {
            export_warn!("Failed to read persisted state from {:?}: {}", path, err);
            return Vec::new();
        }
    };

    let state: PersistedState = match ron::from_str(&content) {
        Ok(state) => state,
        Err(err) => {
            export_warn!("Failed to parse persisted state from {:?}: {}", path, err);
            return Vec::new();
        }
    };

    let exports = state
        .exports
        .into_iter()
        .map(|record| ExportSnapshot {
            title: record.title,
            url: record.url,
            exported_at_ms: record.exported_at_ms,
        })
        .collect();

    export_info!("Loaded persisted exports from {:?}", path);
    exports
}

pub(crate) fn save_recent_exports(output_dir: &Path, exports: &[ExportSnapshot]) {
    if let Err(err) = ensure_output_dir(output_dir) {
        export_error!("Failed to ensure output dir {:?}: {}", output_dir, err);
        return;
    }

    let state = PersistedState {
        exports: exports
            .iter()
            .map(|snapshot| PersistedExport {
                title: snapshot.title.clone(),
                url: snapshot.url.clone(),
                exported_at_ms: snapshot.exported_at_ms,
            })
            .collect(),
    };

    let pretty = ron::ser::PrettyConfig::new();
    let content = match ron::ser::to_string_pretty(&state, pretty) {
        Ok(text) => text,
        Err(err) => {
            export_error!("Failed to serialize persisted state: {}", err);
            return;
        }
    };

    let writer = AtomicFileWriter::new(output_dir.to_path_buf());
    if let Err(err) = writer.write(Path::new(STATE_FILENAME), &content) {
        export_error!(
            "Failed to write persisted state to {:?}: {}",
            output_dir,
            err
        );
    }
}
