//! Runtime scene: models, camera, lights and the interaction state around them.

use std::{collections::HashMap, path::PathBuf};

use corelib::{Vec3, animation::ObjectAnimation, camera::Camera};
use renderer::{
    CLEAR_COLOR, CameraUniform, DrawCall, FrameUniforms, MaterialUniform, RenderSink, SwatchCache,
    TextureData, TextureHandle,
};

use crate::{
    config::SceneConfig,
    input::{Control, ControlTarget, Key, KeyAction, TransformMode},
    lights::LightRig,
    model::{Model, load_model},
};

pub const Z_NEAR: f32 = 0.01;
pub const Z_FAR: f32 = 2000.0;

/// Camera travel per movement key event.
pub const CAMERA_STEP: f32 = 200.0 * 0.016;
pub const TRANSLATE_STEP: f32 = 0.1;
pub const SCALE_STEP: f32 = 0.1;
pub const MIN_SCALE: f32 = 0.01;
pub const ROTATE_STEP_DEG: f32 = 5.0;

pub struct Scene {
    models: Vec<Model>,
    /// Parallel to `models`.
    animations: Vec<ObjectAnimation>,
    camera: Camera,
    lights: LightRig,
    selected: usize,
    mode: TransformMode,
    control: ControlTarget,
    animating: bool,
    clock: f32,
    swatches: SwatchCache,
    /// Uploaded textures by file; `None` records a file that failed to load.
    textures: HashMap<PathBuf, Option<TextureHandle>>,
}

impl Scene {
    /// Load every object in `config`. Objects that fail to load are skipped.
    pub fn from_config(config: &SceneConfig, aspect: f32) -> Self {
        let mut entries = Vec::with_capacity(config.objects.len());
        for object in &config.objects {
            match load_model(object) {
                Ok(model) => entries.push((model, object.animation.clone())),
                Err(err) => log::warn!("Skipping object {:?}: {}", object.path, err),
            }
        }
        log::info!(
            "Scene ready: {} of {} objects loaded",
            entries.len(),
            config.objects.len()
        );
        Self::new(camera_from_config(config, aspect), LightRig::from_config(&config.lights), entries)
    }

    pub fn new(camera: Camera, lights: LightRig, entries: Vec<(Model, ObjectAnimation)>) -> Self {
        let (models, animations) = entries.into_iter().unzip();
        Self {
            models,
            animations,
            camera,
            lights,
            selected: 0,
            mode: TransformMode::default(),
            control: ControlTarget::default(),
            animating: false,
            clock: 0.0,
            swatches: SwatchCache::new(),
            textures: HashMap::new(),
        }
    }

    pub fn models(&self) -> &[Model] {
        &self.models
    }

    pub fn animations(&self) -> &[ObjectAnimation] {
        &self.animations
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn lights(&self) -> &LightRig {
        &self.lights
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn mode(&self) -> TransformMode {
        self.mode
    }

    pub fn control(&self) -> ControlTarget {
        self.control
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub fn set_animating(&mut self, on: bool) {
        self.animating = on;
    }

    /// Seconds of animation played so far.
    pub fn clock(&self) -> f32 {
        self.clock
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.camera.aspect = aspect;
    }

    pub fn handle_key(&mut self, key: Key, action: KeyAction) -> Control {
        if action == KeyAction::Press {
            match key {
                Key::Escape => return Control::Exit,
                Key::Space => {
                    self.control = match self.control {
                        ControlTarget::Object => ControlTarget::Camera,
                        ControlTarget::Camera => ControlTarget::Object,
                    };
                    log::info!("Controlling {:?}", self.control);
                    return Control::Continue;
                }
                Key::F => {
                    self.animating = !self.animating;
                    log::info!("Animation {}", if self.animating { "on" } else { "off" });
                    return Control::Continue;
                }
                Key::Digit1 | Key::Digit2 | Key::Digit3 => {
                    let index = match key {
                        Key::Digit1 => 0,
                        Key::Digit2 => 1,
                        _ => 2,
                    };
                    self.lights.toggle(index);
                    return Control::Continue;
                }
                Key::Tab | Key::T | Key::R | Key::C if self.control == ControlTarget::Object => {
                    self.object_command(key);
                    return Control::Continue;
                }
                _ => {}
            }
        }

        if action.is_down() {
            match self.control {
                ControlTarget::Camera => self.move_camera(key),
                ControlTarget::Object => self.edit_selected(key),
            }
        }
        Control::Continue
    }

    fn object_command(&mut self, key: Key) {
        match key {
            Key::Tab if !self.models.is_empty() => {
                self.selected = (self.selected + 1) % self.models.len();
                log::info!("Selected model {} '{}'", self.selected, self.models[self.selected].name);
            }
            Key::T => self.mode = TransformMode::Translate,
            Key::R => self.mode = TransformMode::Rotate,
            Key::C => self.mode = TransformMode::Scale,
            _ => return,
        }
        log::debug!("Transform mode {:?}", self.mode);
    }

    fn move_camera(&mut self, key: Key) {
        let forward = self.camera.forward();
        let right = self.camera.right();
        let up = self.camera.up;
        let direction = match key {
            Key::W => forward,
            Key::S => -forward,
            Key::D => right,
            Key::A => -right,
            Key::E => up,
            Key::Q => -up,
            _ => return,
        };
        self.camera.fly(direction * CAMERA_STEP);
        log::debug!("Camera at {:?}", self.camera.eye);
    }

    fn edit_selected(&mut self, key: Key) {
        let mode = self.mode;
        let Some(model) = self.models.get_mut(self.selected) else {
            return;
        };
        let t = &mut model.transform;
        match mode {
            TransformMode::Translate => match key {
                Key::A | Key::Left => t.translation.x -= TRANSLATE_STEP,
                Key::D | Key::Right => t.translation.x += TRANSLATE_STEP,
                Key::W | Key::Up => t.translation.y += TRANSLATE_STEP,
                Key::S | Key::Down => t.translation.y -= TRANSLATE_STEP,
                _ => return,
            },
            TransformMode::Scale => {
                let delta = match key {
                    Key::D | Key::W | Key::Right | Key::Up => SCALE_STEP,
                    Key::A | Key::S | Key::Left | Key::Down => -SCALE_STEP,
                    _ => return,
                };
                t.scale = (t.scale + Vec3::splat(delta)).max(Vec3::splat(MIN_SCALE));
            }
            TransformMode::Rotate => match key {
                Key::A | Key::Left => t.rotation_deg.y -= ROTATE_STEP_DEG,
                Key::D | Key::Right => t.rotation_deg.y += ROTATE_STEP_DEG,
                Key::W | Key::Up => t.rotation_deg.x += ROTATE_STEP_DEG,
                Key::S | Key::Down => t.rotation_deg.x -= ROTATE_STEP_DEG,
                _ => return,
            },
        }
        log::debug!("Model '{}' {:?}", model.name, model.transform);
    }

    /// Move the animation clock forward and pose every animated model.
    pub fn advance(&mut self, dt: f32) {
        if !self.animating || !dt.is_finite() || dt <= 0.0 {
            return;
        }
        self.clock += dt;
        for (index, (model, anim)) in self.models.iter_mut().zip(&self.animations).enumerate() {
            if let Some(pose) = anim.animation.evaluate(self.clock, index) {
                model.transform.translation = pose.position;
                pose.orientation.apply(&mut model.transform.rotation_deg);
            }
        }
    }

    /// Upload meshes and diffuse textures. Parts already uploaded are left alone.
    pub fn upload(&mut self, sink: &mut dyn RenderSink) {
        for model in &mut self.models {
            for (i, part) in model.parts.iter_mut().enumerate() {
                if part.mesh.is_none() && part.is_valid() {
                    let label = format!("{}/{}#{}", model.name, part.material.name, i);
                    part.mesh = Some(sink.upload_mesh(&label, &part.interleaved()));
                }

                let material = &mut part.material;
                if material.texture.is_some() {
                    continue;
                }
                let Some(path) = material.texture_path.clone() else {
                    continue;
                };
                let cached = match self.textures.get(&path) {
                    Some(&cached) => cached,
                    None => {
                        let loaded = match TextureData::load(&path) {
                            Ok(data) => Some(sink.upload_texture(&path.display().to_string(), &data)),
                            Err(err) => {
                                log::warn!("Texture {} unusable: {}", path.display(), err);
                                None
                            }
                        };
                        self.textures.insert(path, loaded);
                        loaded
                    }
                };
                match cached {
                    Some(handle) => material.texture = Some(handle),
                    None => {
                        log::debug!("Material '{}' renders untextured", material.name);
                        material.texture_path = None;
                    }
                }
            }
        }
        for model in &self.models {
            for part in model.parts.iter().filter(|p| p.material.texture.is_none()) {
                self.swatches.get_or_upload(part.material.category, sink);
            }
        }
    }

    pub fn frame_uniforms(&self) -> FrameUniforms {
        FrameUniforms {
            clear_color: CLEAR_COLOR,
            camera: CameraUniform::new(self.camera.view(), self.camera.proj(), self.camera.eye),
            lights: self.lights.uniforms(self.animating.then_some(self.clock)),
        }
    }

    /// Submit one frame: uniforms, then one draw per uploaded part.
    pub fn submit(&mut self, sink: &mut dyn RenderSink) {
        sink.begin_frame(&self.frame_uniforms());
        for (index, model) in self.models.iter().enumerate() {
            let matrix = model.transform.matrix();
            for part in &model.parts {
                let Some(mesh) = part.mesh else {
                    continue;
                };
                let texture = match part.material.texture {
                    Some(handle) => handle,
                    None => self.swatches.get_or_upload(part.material.category, sink),
                };
                sink.draw(&DrawCall {
                    model: matrix,
                    material: MaterialUniform::from_material(&part.material),
                    texture,
                    mesh,
                    vertex_count: part.vertex_count() as u32,
                    selected: index == self.selected,
                });
            }
        }
        sink.end_frame();
    }

    /// Free every uploaded mesh.
    pub fn release(&mut self, sink: &mut dyn RenderSink) {
        let mut count = 0;
        for part in self.models.iter_mut().flat_map(|m| m.parts.iter_mut()) {
            if let Some(mesh) = part.mesh.take() {
                sink.release_mesh(mesh);
                count += 1;
            }
        }
        log::info!("Released {} meshes", count);
    }
}

pub fn camera_from_config(config: &SceneConfig, aspect: f32) -> Camera {
    Camera::new_perspective(
        config.camera.position,
        config.camera.target,
        Vec3::Y,
        config.camera.fov_deg.to_radians(),
        Z_NEAR,
        Z_FAR,
        aspect,
    )
}

#[cfg(test)]
mod tests {
    use std::fs;

    use asset::{Material, MaterialCategory, ModelPart};
    use corelib::{
        animation::{Animation, Orbit},
        transform::Transform,
        vec3,
    };
    use renderer::RecordingSink;

    use super::*;

    fn triangle_part(material: Material) -> ModelPart {
        let mut part = ModelPart::new(material);
        part.push_vertex([0.0, 0.0, 0.0], [0.0, 0.0], [0.0, 0.0, 1.0]);
        part.push_vertex([1.0, 0.0, 0.0], [1.0, 0.0], [0.0, 0.0, 1.0]);
        part.push_vertex([0.0, 1.0, 0.0], [0.0, 1.0], [0.0, 0.0, 1.0]);
        part
    }

    fn model(name: &str, category_name: &str) -> Model {
        Model {
            name: name.to_string(),
            parts: vec![triangle_part(Material::named(category_name))],
            transform: Transform::identity(),
        }
    }

    fn scene(entries: Vec<(Model, ObjectAnimation)>) -> Scene {
        let config = SceneConfig::default();
        Scene::new(camera_from_config(&config, 16.0 / 9.0), LightRig::default(), entries)
    }

    fn still(m: Model) -> (Model, ObjectAnimation) {
        (m, ObjectAnimation::default())
    }

    #[test]
    fn escape_exits_and_release_is_ignored() {
        let mut s = scene(vec![]);
        assert_eq!(s.handle_key(Key::Escape, KeyAction::Release), Control::Continue);
        assert_eq!(s.handle_key(Key::Escape, KeyAction::Press), Control::Exit);
    }

    #[test]
    fn empty_scene_handles_every_key() {
        let mut s = scene(vec![]);
        for key in [Key::Tab, Key::W, Key::A, Key::T, Key::C, Key::Left] {
            assert_eq!(s.handle_key(key, KeyAction::Press), Control::Continue);
        }
        assert_eq!(s.selected(), 0);
        s.set_animating(true);
        s.advance(0.5);
        let mut sink = RecordingSink::default();
        s.upload(&mut sink);
        s.submit(&mut sink);
        assert!(sink.last_frame().unwrap().draws.is_empty());
    }

    #[test]
    fn tab_cycles_selection_in_object_mode_only() {
        let mut s = scene(vec![still(model("a", "x")), still(model("b", "y"))]);
        s.handle_key(Key::Tab, KeyAction::Press);
        assert_eq!(s.selected(), 1);
        s.handle_key(Key::Tab, KeyAction::Press);
        assert_eq!(s.selected(), 0);

        s.handle_key(Key::Space, KeyAction::Press);
        assert_eq!(s.control(), ControlTarget::Camera);
        s.handle_key(Key::Tab, KeyAction::Press);
        assert_eq!(s.selected(), 0);
    }

    #[test]
    fn object_mode_edits_selected_transform() {
        let mut s = scene(vec![still(model("a", "x"))]);
        assert_eq!(s.mode(), TransformMode::Rotate);
        s.handle_key(Key::D, KeyAction::Press);
        s.handle_key(Key::W, KeyAction::Repeat);
        assert_eq!(s.models()[0].transform.rotation_deg, vec3(5.0, 5.0, 0.0));

        s.handle_key(Key::T, KeyAction::Press);
        s.handle_key(Key::Left, KeyAction::Press);
        s.handle_key(Key::Up, KeyAction::Repeat);
        s.handle_key(Key::Up, KeyAction::Release);
        let t = s.models()[0].transform.translation;
        assert!((t - vec3(-0.1, 0.1, 0.0)).length() < 1e-6);

        s.handle_key(Key::C, KeyAction::Press);
        for _ in 0..20 {
            s.handle_key(Key::A, KeyAction::Repeat);
        }
        assert_eq!(s.models()[0].transform.scale, Vec3::splat(MIN_SCALE));
        s.handle_key(Key::W, KeyAction::Press);
        assert!((s.models()[0].transform.scale.x - (MIN_SCALE + SCALE_STEP)).abs() < 1e-6);
    }

    #[test]
    fn camera_mode_flies_camera() {
        let mut s = scene(vec![still(model("a", "x"))]);
        s.handle_key(Key::Space, KeyAction::Press);
        let before = s.camera().eye;
        s.handle_key(Key::W, KeyAction::Press);
        // Default camera looks down -Z.
        assert!((s.camera().eye - (before + vec3(0.0, 0.0, -CAMERA_STEP))).length() < 1e-5);
        s.handle_key(Key::E, KeyAction::Repeat);
        assert!((s.camera().eye.y - CAMERA_STEP).abs() < 1e-5);
        s.handle_key(Key::T, KeyAction::Press);
        assert_eq!(s.mode(), TransformMode::Rotate);
        assert_eq!(s.models()[0].transform, Transform::identity());
    }

    #[test]
    fn advance_only_moves_while_animating() {
        let orbit = Animation::Orbit(Orbit::new(Vec3::ZERO, 2.0, 90.0));
        let mut s = scene(vec![
            (model("moon", "x"), ObjectAnimation::new(orbit, Vec3::ZERO)),
            still(model("track", "Asphalt")),
        ]);
        s.advance(1.0);
        assert_eq!(s.clock(), 0.0);
        assert_eq!(s.models()[0].transform.translation, Vec3::ZERO);

        s.handle_key(Key::F, KeyAction::Press);
        s.advance(1.0);
        assert_eq!(s.clock(), 1.0);
        // 90 deg/s for 1s on the XZ plane.
        assert!((s.models()[0].transform.translation - vec3(0.0, 0.0, 2.0)).length() < 1e-5);
        assert_eq!(s.models()[1].transform, Transform::identity());

        s.handle_key(Key::F, KeyAction::Press);
        s.advance(1.0);
        assert_eq!(s.clock(), 1.0);
    }

    #[test]
    fn upload_submit_release() {
        let mut s = scene(vec![still(model("a", "Tire_Front")), still(model("b", "Tire_Back"))]);
        let mut sink = RecordingSink::default();
        s.upload(&mut sink);
        assert_eq!(sink.meshes.len(), 2);
        // Both parts share the Tire swatch.
        assert_eq!(sink.textures.len(), 1);
        assert_eq!(sink.textures[0].1, MaterialCategory::Tire.swatch_rgba());

        s.upload(&mut sink);
        assert_eq!(sink.meshes.len(), 2);

        s.submit(&mut sink);
        let frame = sink.last_frame().unwrap();
        assert_eq!(frame.draws.len(), 2);
        assert!(frame.draws[0].selected);
        assert!(!frame.draws[1].selected);
        assert_eq!(frame.draws[0].vertex_count, 3);
        assert_eq!(frame.draws[0].texture, frame.draws[1].texture);
        assert_eq!(frame.uniforms.camera.position, [0.0, 0.0, 3.0]);
        assert_eq!(frame.uniforms.clear_color, renderer::CLEAR_COLOR);

        s.release(&mut sink);
        assert_eq!(sink.released.len(), 2);
        assert!(s.models().iter().all(|m| m.parts[0].mesh.is_none()));
    }

    #[test]
    fn light_toggles_reach_the_frame() {
        let mut s = scene(vec![]);
        s.handle_key(Key::Digit2, KeyAction::Press);
        let mut sink = RecordingSink::default();
        s.submit(&mut sink);
        let lights = sink.last_frame().unwrap().uniforms.lights;
        assert!(lights[0].is_enabled());
        assert!(!lights[1].is_enabled());
        assert!(lights[2].is_enabled());
    }

    #[test]
    fn missing_texture_falls_back_to_swatch() {
        let mut material = Material::named("Decals");
        material.texture_path = Some(PathBuf::from("/nonexistent/sign.png"));
        let mut s = scene(vec![still(Model {
            name: "sign".into(),
            parts: vec![triangle_part(material)],
            transform: Transform::identity(),
        })]);
        let mut sink = RecordingSink::default();
        s.upload(&mut sink);
        assert_eq!(sink.textures.len(), 1);
        assert_eq!(sink.textures[0].0, "swatch:Decals");
        s.submit(&mut sink);
        assert_eq!(sink.last_frame().unwrap().draws[0].material.is_decal, 1);
    }

    #[test]
    fn arrow_keys_work_in_every_mode() {
        let mut s = scene(vec![still(model("a", "x"))]);

        s.handle_key(Key::Right, KeyAction::Press);
        s.handle_key(Key::Up, KeyAction::Repeat);
        assert_eq!(s.models()[0].transform.rotation_deg, vec3(5.0, 5.0, 0.0));
        s.handle_key(Key::Left, KeyAction::Press);
        s.handle_key(Key::Down, KeyAction::Press);
        assert_eq!(s.models()[0].transform.rotation_deg, Vec3::ZERO);

        s.handle_key(Key::C, KeyAction::Press);
        s.handle_key(Key::Up, KeyAction::Press);
        s.handle_key(Key::Right, KeyAction::Repeat);
        assert!((s.models()[0].transform.scale - Vec3::splat(1.2)).length() < 1e-5);
        s.handle_key(Key::Down, KeyAction::Press);
        s.handle_key(Key::Left, KeyAction::Press);
        assert!((s.models()[0].transform.scale - Vec3::ONE).length() < 1e-5);

        s.handle_key(Key::T, KeyAction::Press);
        s.handle_key(Key::Right, KeyAction::Press);
        s.handle_key(Key::Down, KeyAction::Press);
        let t = s.models()[0].transform.translation;
        assert!((t - vec3(0.1, -0.1, 0.0)).length() < 1e-6);
    }

    #[test]
    fn failed_texture_is_not_retried() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        fs::write(&path, b"not an image").unwrap();

        let textured = |name: &str| {
            let mut material = Material::named("Paint");
            material.texture_path = Some(path.clone());
            still(Model {
                name: name.into(),
                parts: vec![triangle_part(material)],
                transform: Transform::identity(),
            })
        };
        let mut s = scene(vec![textured("a"), textured("b")]);
        let mut sink = RecordingSink::default();
        s.upload(&mut sink);
        assert_eq!(s.textures.get(&path), Some(&None));
        assert_eq!(sink.textures.len(), 1);
        assert_eq!(sink.textures[0].0, "swatch:Generic");

        // A now-valid file at the same path stays untextured for this scene.
        image::RgbaImage::from_pixel(1, 1, image::Rgba([1, 2, 3, 255]))
            .save_with_format(&path, image::ImageFormat::Png)
            .unwrap();
        let (m, a) = textured("c");
        s.models.push(m);
        s.animations.push(a);
        s.upload(&mut sink);
        assert_eq!(sink.textures.len(), 1);
        assert!(s.models().iter().all(|m| m.parts[0].material.texture.is_none()));
    }

    #[test]
    fn from_config_loads_from_disk_and_skips_failures() {
        let dir = tempfile::tempdir().unwrap();
        let obj = dir.path().join("tri.obj");
        fs::write(
            &obj,
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvn 0 0 1\nusemtl Paint\nf 1/1/1 2/1/1 3/1/1\n",
        )
        .unwrap();
        image::RgbaImage::from_pixel(1, 1, image::Rgba([10, 20, 30, 255]))
            .save(dir.path().join("tri.png"))
            .unwrap();
        fs::write(dir.path().join("tri.mtl"), "newmtl Paint\nKd 1 0 0\nmap_Kd tri.png\n").unwrap();
        let text = format!(
            "CAMERA 0 0 5 0 0 0 60\n\
             OBJECT {missing} 0 0 0 0 0 0 1 1 1\n\
             ANIMATION track\n\
             OBJECT {obj} 0 0 0 0 0 0 1 1 1 SHINY\n",
            missing = dir.path().join("missing.obj").display(),
            obj = obj.display(),
        );
        let config = SceneConfig::parse_str(&text);
        assert_eq!(config.objects.len(), 2);

        let mut s = Scene::from_config(&config, 1.0);
        assert_eq!(s.models().len(), 1);
        assert_eq!(s.animations().len(), 1);
        assert!(matches!(s.animations()[0].animation, Animation::Track(_)));

        let mut sink = RecordingSink::default();
        s.upload(&mut sink);
        assert_eq!(sink.textures.len(), 1);
        assert_eq!(sink.textures[0].1, [10, 20, 30, 255]);
        assert_eq!(s.models()[0].parts[0].material.texture, Some(TextureHandle(0)));
    }
}
