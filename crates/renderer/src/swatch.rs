use std::collections::HashMap;

use asset::{MaterialCategory, TextureData, TextureHandle};

use crate::RenderSink;

/// 1x1 colour textures for untextured parts, one per material category.
/// Entries are created on first use and live as long as the cache.
#[derive(Debug, Default)]
pub struct SwatchCache {
    handles: HashMap<MaterialCategory, TextureHandle>,
}

impl SwatchCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_upload(
        &mut self,
        category: MaterialCategory,
        sink: &mut dyn RenderSink,
    ) -> TextureHandle {
        *self.handles.entry(category).or_insert_with(|| {
            log::debug!("Creating swatch texture for {:?}", category);
            sink.upload_texture(
                &format!("swatch:{category:?}"),
                &TextureData::solid(category.swatch_rgba()),
            )
        })
    }
}
