use asset::{MeshHandle, MeshVertex, TextureData, TextureHandle};

use crate::{DrawCall, FrameUniforms, RenderSink};

/// Headless sink: hands out handles and logs what would have been drawn.
#[derive(Debug, Default)]
pub struct LogSink {
    next_mesh: u32,
    next_texture: u32,
    live_meshes: usize,
    frame: u64,
    draws: u32,
    vertices: u64,
    uniform_bytes: usize,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> u64 {
        self.frame
    }

    /// Uniform bytes written by the frame in progress, or the last one.
    pub fn uniform_bytes(&self) -> usize {
        self.uniform_bytes
    }

    pub fn live_meshes(&self) -> usize {
        self.live_meshes
    }
}

impl RenderSink for LogSink {
    fn upload_mesh(&mut self, label: &str, vertices: &[MeshVertex]) -> MeshHandle {
        let handle = MeshHandle(self.next_mesh);
        self.next_mesh += 1;
        self.live_meshes += 1;
        log::debug!("Mesh {:?} '{}': {} vertices", handle, label, vertices.len());
        handle
    }

    fn upload_texture(&mut self, label: &str, texture: &TextureData) -> TextureHandle {
        let handle = TextureHandle(self.next_texture);
        self.next_texture += 1;
        log::debug!(
            "Texture {:?} '{}': {}x{}",
            handle,
            label,
            texture.width,
            texture.height
        );
        handle
    }

    fn release_mesh(&mut self, mesh: MeshHandle) {
        self.live_meshes = self.live_meshes.saturating_sub(1);
        log::trace!("Released mesh {:?}", mesh);
    }

    fn begin_frame(&mut self, frame: &FrameUniforms) {
        let (camera, lights) = frame.as_bytes();
        self.draws = 0;
        self.vertices = 0;
        self.uniform_bytes = camera.len() + lights.len();
        log::trace!(
            "Frame {} camera at {:?}, lights on: {}",
            self.frame,
            frame.camera.position,
            frame.lights.iter().filter(|l| l.is_enabled()).count()
        );
    }

    fn draw(&mut self, call: &DrawCall) {
        self.draws += 1;
        self.vertices += u64::from(call.vertex_count);
        self.uniform_bytes += call.material.as_bytes().len();
    }

    fn end_frame(&mut self) {
        log::debug!(
            "Frame {}: {} draws, {} vertices, {} uniform bytes",
            self.frame,
            self.draws,
            self.vertices,
            self.uniform_bytes
        );
        self.frame += 1;
    }
}

/// Everything one frame submitted.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedFrame {
    pub uniforms: FrameUniforms,
    pub draws: Vec<DrawCall>,
}

/// Sink that records every call, for assertions in tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    /// Label and vertex count of each uploaded mesh.
    pub meshes: Vec<(String, usize)>,
    /// Label and first pixel of each uploaded texture.
    pub textures: Vec<(String, [u8; 4])>,
    pub released: Vec<MeshHandle>,
    pub frames: Vec<RecordedFrame>,
    open: Option<RecordedFrame>,
}

impl RecordingSink {
    pub fn last_frame(&self) -> Option<&RecordedFrame> {
        self.frames.last()
    }
}

impl RenderSink for RecordingSink {
    fn upload_mesh(&mut self, label: &str, vertices: &[MeshVertex]) -> MeshHandle {
        self.meshes.push((label.to_string(), vertices.len()));
        MeshHandle(self.meshes.len() as u32 - 1)
    }

    fn upload_texture(&mut self, label: &str, texture: &TextureData) -> TextureHandle {
        let mut pixel = [0u8; 4];
        let n = texture.data.len().min(4);
        pixel[..n].copy_from_slice(&texture.data[..n]);
        self.textures.push((label.to_string(), pixel));
        TextureHandle(self.textures.len() as u32 - 1)
    }

    fn release_mesh(&mut self, mesh: MeshHandle) {
        self.released.push(mesh);
    }

    fn begin_frame(&mut self, frame: &FrameUniforms) {
        self.open = Some(RecordedFrame {
            uniforms: *frame,
            draws: Vec::new(),
        });
    }

    fn draw(&mut self, call: &DrawCall) {
        if let Some(frame) = self.open.as_mut() {
            frame.draws.push(*call);
        }
    }

    fn end_frame(&mut self) {
        if let Some(frame) = self.open.take() {
            self.frames.push(frame);
        }
    }
}

#[cfg(test)]
mod tests {
    use bytemuck::Zeroable;

    use super::*;

    #[test]
    fn log_sink_tracks_meshes_and_frames() {
        let mut sink = LogSink::new();
        let a = sink.upload_mesh("a", &[MeshVertex::default(); 3]);
        let b = sink.upload_mesh("b", &[MeshVertex::default(); 6]);
        assert_ne!(a, b);
        assert_eq!(sink.live_meshes(), 2);

        sink.begin_frame(&FrameUniforms::zeroed());
        sink.end_frame();
        assert_eq!(sink.frames(), 1);

        sink.release_mesh(a);
        assert_eq!(sink.live_meshes(), 1);
    }

    #[test]
    fn log_sink_counts_uniform_bytes_per_frame() {
        let mut sink = LogSink::new();
        let mesh = sink.upload_mesh("a", &[MeshVertex::default(); 3]);
        let call = DrawCall {
            model: glam::Mat4::IDENTITY,
            material: crate::MaterialUniform::zeroed(),
            texture: TextureHandle(0),
            mesh,
            vertex_count: 3,
            selected: false,
        };

        sink.begin_frame(&FrameUniforms::zeroed());
        assert_eq!(sink.uniform_bytes(), 144 + 3 * 32);
        sink.draw(&call);
        sink.draw(&call);
        sink.end_frame();
        assert_eq!(sink.uniform_bytes(), 144 + 3 * 32 + 2 * 48);

        sink.begin_frame(&FrameUniforms::zeroed());
        assert_eq!(sink.uniform_bytes(), 144 + 3 * 32);
    }
}
