//! Keypoint files – JSON holding one [`KeypointSet`] or an array of them.
//!
//! Each frame is validated before it is handed to the estimator, so a file
//! with a NaN or infinite coordinate is rejected with the frame index and the
//! offending landmark instead of producing a meaningless angle.

use std::fs;
use std::path::Path;

use armswing_types::KeypointSet;
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum FrameFile {
    Many(Vec<KeypointSet>),
    Single(KeypointSet),
}

/// Read and validate every frame in the file at `path`.
pub fn load_frames(path: &Path) -> Result<Vec<KeypointSet>, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read keypoints at {}: {}", path.display(), e))?;
    parse_frames(&raw)
}

/// Parse and validate frames from a JSON string.
pub fn parse_frames(raw: &str) -> Result<Vec<KeypointSet>, String> {
    let frames = match serde_json::from_str::<FrameFile>(raw) {
        Ok(FrameFile::Many(frames)) => frames,
        Ok(FrameFile::Single(frame)) => vec![frame],
        Err(_) => {
            // Untagged errors are opaque; re-parse as a single frame so the
            // message names the missing or malformed field.
            let err = serde_json::from_str::<KeypointSet>(raw)
                .err()
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unrecognised layout".to_string());
            return Err(format!("Failed to parse keypoints: {}", err));
        }
    };

    validate_frames(frames)
}

/// Reject empty input and frames with non-finite coordinates.
pub fn validate_frames(frames: Vec<KeypointSet>) -> Result<Vec<KeypointSet>, String> {
    if frames.is_empty() {
        return Err("Keypoint file contains no frames".to_string());
    }

    for (index, frame) in frames.iter().enumerate() {
        frame
            .validate()
            .map_err(|e| format!("Frame {}: {}", index, e))?;
    }
    Ok(frames)
}
