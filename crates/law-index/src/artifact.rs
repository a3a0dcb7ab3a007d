//! On-disk artifact loading for the persisted state layout in §6: packed `f32` vector
//! matrices with a small binary header plus a JSON metadata sidecar.
use std::io::Read;
use std::path::Path;

use law_core::{DocId, Document};
use serde::Deserialize;

use crate::error::IndexError;
use crate::vector_store::Partition;

const HEADER_LEN: usize = 12; // count: u32, dim: u32, dtype tag: u32 (always 0 = f32)

#[derive(Debug, Deserialize)]
struct VectorSidecar {
    ids: Vec<DocId>,
}

/// Load `vectors/<name>.bin` (header `{count, dim, dtype}` + packed floats) with its
/// `<name>.json` sidecar of metadata in the same row order (§6).
pub fn load_partition(bin_path: &Path, sidecar_path: &Path) -> Result<Partition, IndexError> {
    let mut bytes = Vec::new();
    std::fs::File::open(bin_path)
        .and_then(|mut f| f.read_to_end(&mut bytes))
        .map_err(|e| IndexError::Io(format!("{}: {e}", bin_path.display())))?;

    if bytes.len() < HEADER_LEN {
        return Err(IndexError::ArtifactCorruption {
            component: bin_path.display().to_string(),
            reason: "file shorter than header".to_string(),
        });
    }

    let count = u32::from_le_bytes(bytes[0..4].try_into().unwrap()) as usize;
    let dim = u32::from_le_bytes(bytes[4..8].try_into().unwrap()) as usize;

    let expected_len = HEADER_LEN + count * dim * std::mem::size_of::<f32>();
    if bytes.len() != expected_len {
        return Err(IndexError::ArtifactCorruption {
            component: bin_path.display().to_string(),
            reason: format!(
                "expected {expected_len} bytes for count={count} dim={dim}, found {}",
                bytes.len()
            ),
        });
    }

    let sidecar_raw = std::fs::read_to_string(sidecar_path)
        .map_err(|e| IndexError::Io(format!("{}: {e}", sidecar_path.display())))?;
    let sidecar: VectorSidecar = serde_json::from_str(&sidecar_raw).map_err(|e| {
        IndexError::ArtifactCorruption {
            component: sidecar_path.display().to_string(),
            reason: e.to_string(),
        }
    })?;

    if sidecar.ids.len() != count {
        return Err(IndexError::ArtifactCorruption {
            component: sidecar_path.display().to_string(),
            reason: format!(
                "sidecar has {} ids but header declares count={count}",
                sidecar.ids.len()
            ),
        });
    }

    let mut partition = Partition::with_capacity(count);
    let body = &bytes[HEADER_LEN..];
    for (row, id) in sidecar.ids.into_iter().enumerate() {
        let start = row * dim * 4;
        let mut vector = Vec::with_capacity(dim);
        for col in 0..dim {
            let offset = start + col * 4;
            let v = f32::from_le_bytes(body[offset..offset + 4].try_into().unwrap());
            vector.push(v);
        }
        partition.push(id, vector);
    }

    Ok(partition)
}

/// One row of `kg/mapping.csv`: `(case_id, article_number, confidence, is_primary)` (§6).
#[derive(Debug, Clone)]
pub struct MappingRow {
    pub case_id: String,
    pub article_number: u32,
    pub confidence: f32,
    pub is_primary: bool,
}

pub fn load_mapping_csv(path: &Path) -> Result<Vec<MappingRow>, IndexError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| IndexError::Io(format!("{}: {e}", path.display())))?;
    let mut rows = Vec::new();
    for (lineno, line) in raw.lines().enumerate() {
        if lineno == 0 && line.starts_with("case_id") {
            continue; // header row
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.split(',').collect();
        if parts.len() != 4 {
            return Err(IndexError::ArtifactCorruption {
                component: path.display().to_string(),
                reason: format!("line {}: expected 4 columns, found {}", lineno + 1, parts.len()),
            });
        }
        let article_number: u32 = parts[1].trim().parse().map_err(|_| IndexError::ArtifactCorruption {
            component: path.display().to_string(),
            reason: format!("line {}: invalid article_number", lineno + 1),
        })?;
        let confidence: f32 = parts[2].trim().parse().map_err(|_| IndexError::ArtifactCorruption {
            component: path.display().to_string(),
            reason: format!("line {}: invalid confidence", lineno + 1),
        })?;
        let is_primary = matches!(parts[3].trim(), "true" | "1" | "TRUE");
        rows.push(MappingRow {
            case_id: parts[0].trim().to_string(),
            article_number,
            confidence,
            is_primary,
        });
    }
    Ok(rows)
}

/// Load a corpus file of `Document`s (§3), one JSON array per file (articles, cases).
pub fn load_documents_json(path: &Path) -> Result<Vec<Document>, IndexError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| IndexError::Io(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&raw).map_err(|e| IndexError::ArtifactCorruption {
        component: path.display().to_string(),
        reason: e.to_string(),
    })
}
