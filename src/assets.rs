use std::path::{Path, PathBuf};

use anyhow::Context;
use tokio::sync::oneshot;
use tracing::{debug, info};

/// One animation clip found in a model file.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipInfo {
    /// Full clip name as authored, e.g. `CharacterArmature|Idle`
    pub name: String,
    /// Last keyframe time in seconds
    pub duration: f32,
}

/// What the frame loop receives once the player model is read.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub path: PathBuf,
    pub scale: f32,
    pub clips: Vec<ClipInfo>,
}

pub type ModelReceiver = oneshot::Receiver<anyhow::Result<LoadedModel>>;

/// Reads the model on tokio's blocking pool.
pub async fn load_model(path: impl Into<PathBuf>, scale: f32) -> anyhow::Result<LoadedModel> {
    let path = path.into();
    info!(path = %path.display(), "Loading player model");

    let task_path = path.clone();
    let clips = tokio::task::spawn_blocking(move || read_clips(&task_path))
        .await
        .context("model loader task did not complete")??;

    info!(path = %path.display(), clips = clips.len(), "Player model loaded");
    Ok(LoadedModel { path, scale, clips })
}

/// Starts loading in the background. The receiver resolves exactly once.
pub fn spawn_model_load(rt: &tokio::runtime::Handle, path: String, scale: f32) -> ModelReceiver {
    let (tx, rx) = oneshot::channel();
    rt.spawn(async move {
        let result = load_model(path, scale).await;
        // The frame loop may already be gone on shutdown
        let _ = tx.send(result);
    });
    rx
}

fn read_clips(path: &Path) -> anyhow::Result<Vec<ClipInfo>> {
    let (document, buffers, _images) =
        gltf::import(path).with_context(|| format!("failed to import glTF '{}'", path.display()))?;
    Ok(clips_from_document(&document, &buffers))
}

fn clips_from_document(document: &gltf::Document, buffers: &[gltf::buffer::Data]) -> Vec<ClipInfo> {
    document
        .animations()
        .map(|animation| {
            let duration = animation
                .channels()
                .filter_map(|channel| {
                    let reader = channel.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));
                    reader.read_inputs().map(|inputs| inputs.fold(0.0f32, f32::max))
                })
                .fold(0.0f32, f32::max);
            let name = animation
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("animation{}", animation.index()));
            debug!(%name, duration, "Found animation clip");
            ClipInfo { name, duration }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-6;

    /// Two clips sharing a 0.0..1.25s translation track on one node.
    const TWO_CLIP_GLTF: &str = r#"{
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [{ "name": "CharacterArmature" }],
        "buffers": [{
            "byteLength": 32,
            "uri": "data:application/octet-stream;base64,AAAAAAAAoD8AAAAAAAAAAAAAAAAAAAAAAAAAAAAAgD8="
        }],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 8 },
            { "buffer": 0, "byteOffset": 8, "byteLength": 24 }
        ],
        "accessors": [
            { "bufferView": 0, "componentType": 5126, "count": 2, "type": "SCALAR", "min": [0.0], "max": [1.25] },
            { "bufferView": 1, "componentType": 5126, "count": 2, "type": "VEC3" }
        ],
        "animations": [
            {
                "name": "CharacterArmature|Idle",
                "channels": [{ "sampler": 0, "target": { "node": 0, "path": "translation" } }],
                "samplers": [{ "input": 0, "output": 1 }]
            },
            {
                "name": "CharacterArmature|Run",
                "channels": [{ "sampler": 0, "target": { "node": 0, "path": "translation" } }],
                "samplers": [{ "input": 0, "output": 1 }]
            }
        ]
    }"#;

    #[test]
    fn test_clips_from_document() {
        let (document, buffers, _) = gltf::import_slice(TWO_CLIP_GLTF.as_bytes()).unwrap();
        let clips = clips_from_document(&document, &buffers);
        let names: Vec<&str> = clips.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["CharacterArmature|Idle", "CharacterArmature|Run"]);
        for clip in &clips {
            assert!((clip.duration - 1.25).abs() < EPSILON);
        }
    }

    #[tokio::test]
    async fn test_load_missing_file_fails() {
        let result = load_model("models/definitely-missing.glb", 25.0).await;
        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("definitely-missing.glb"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_spawned_load_reports_failure_once() {
        let rx = spawn_model_load(&tokio::runtime::Handle::current(), "nope/missing.gltf".into(), 1.0);
        let result = rx.await.unwrap();
        assert!(result.is_err());
    }
}
