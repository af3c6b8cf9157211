// src/engine_lib/scene_loader.rs

use std::path::Path;

use glam::Vec3;
use log::info;
use thiserror::Error;

use crate::engine_lib::scene_types::{Brush, Cube, Scene};

/// Scene file layout (little-endian): f32[3] light direction, i32 brush
/// count, then per brush f32[3] min, f32[3] max, f32[3] rgb.
#[derive(Debug, Error)]
pub enum SceneFileError {
    #[error("failed to read scene file: {0}")]
    Io(#[from] std::io::Error),
    #[error("scene file truncated at byte {offset}")]
    Truncated { offset: usize },
    #[error("scene file declares invalid brush count {0}")]
    InvalidBrushCount(i32),
}

struct ByteReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], SceneFileError> {
        let end = self.offset.checked_add(len).filter(|&e| e <= self.bytes.len());
        match end {
            Some(end) => {
                let slice = &self.bytes[self.offset..end];
                self.offset = end;
                Ok(slice)
            }
            None => Err(SceneFileError::Truncated { offset: self.offset }),
        }
    }

    fn read_f32(&mut self) -> Result<f32, SceneFileError> {
        let bytes = self.take(4)?;
        Ok(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_i32(&mut self) -> Result<i32, SceneFileError> {
        let bytes = self.take(4)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_vec3(&mut self) -> Result<Vec3, SceneFileError> {
        Ok(Vec3::new(self.read_f32()?, self.read_f32()?, self.read_f32()?))
    }
}

/// Parses scene bytes into a fresh scene: portals closed, one seed cube,
/// time zero. The original loader read past EOF unchecked; this one fails
/// with `SceneFileError` instead.
pub fn parse_scene_bytes(bytes: &[u8]) -> Result<Scene, SceneFileError> {
    let mut reader = ByteReader::new(bytes);

    let light_dir = reader.read_vec3()?;
    let brush_count = reader.read_i32()?;
    if brush_count < 0 {
        return Err(SceneFileError::InvalidBrushCount(brush_count));
    }

    let mut brushes = Vec::with_capacity(brush_count as usize);
    for _ in 0..brush_count {
        let min = reader.read_vec3()?;
        let max = reader.read_vec3()?;
        let color = reader.read_vec3()?;
        brushes.push(Brush::new(min, max, color));
    }

    let mut scene = Scene::new(light_dir, brushes);
    scene
        .cubes
        .push(Cube::new(Vec3::new(-10.0, 10.0, 0.0), Vec3::new(1.0, 0.0, 0.0)));
    Ok(scene)
}

/// One-shot blocking load, performed once before the frame loop starts.
pub fn load_scene_file(path: &Path) -> Result<Scene, SceneFileError> {
    let bytes = std::fs::read(path)?;
    let scene = parse_scene_bytes(&bytes)?;
    info!(
        "loaded scene {:?}: {} brushes, light {:?}",
        path,
        scene.brushes.len(),
        scene.light_dir
    );
    Ok(scene)
}
