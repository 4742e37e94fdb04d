//! Line-oriented scene file.
//!
//! ```text
//! # comment
//! CAMERA 0 2 8  0 0 0  45
//! LIGHT1 2 3 4 1.0
//! ANIMATION orbit 0 0 0 3 45
//! OBJECT models/bike red car.obj  0 0 0  0 0 0  1 1 1  SHINY
//! ```
//!
//! An `ANIMATION` line applies to the next `OBJECT` only.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use corelib::{
    Vec3,
    animation::{Animation, BezierCurve, BezierTrack, ObjectAnimation, Orbit},
    vec3,
};

use crate::{
    error::{SceneError, SceneResult},
    object_line::parse_object_line,
};

/// Maximum number of lights the scene file can declare.
pub const MAX_CONFIG_LIGHTS: usize = 3;

#[derive(Clone, Debug, PartialEq)]
pub struct CameraConfig {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_deg: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: vec3(0.0, 0.0, 3.0),
            target: Vec3::ZERO,
            fov_deg: 45.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LightConfig {
    pub position: Vec3,
    pub intensity: f32,
    pub enabled: bool,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            intensity: 1.0,
            enabled: true,
        }
    }
}

/// One `OBJECT` line plus the animation that preceded it.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectConfig {
    pub path: PathBuf,
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
    pub material_type: String,
    pub animation: ObjectAnimation,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneConfig {
    pub camera: CameraConfig,
    pub lights: Vec<LightConfig>,
    pub objects: Vec<ObjectConfig>,
}

impl SceneConfig {
    /// Open the first existing variant of `path` and parse it.
    /// Returns the config together with the path that was actually read.
    pub fn load(path: impl AsRef<Path>) -> SceneResult<(Self, PathBuf)> {
        let tried = candidate_paths(path.as_ref());
        for candidate in &tried {
            match File::open(candidate) {
                Ok(file) => {
                    log::info!("Loading scene from {:?}", candidate);
                    let config = Self::from_reader(BufReader::new(file)).map_err(|source| {
                        SceneError::Io {
                            path: candidate.clone(),
                            source,
                        }
                    })?;
                    return Ok((config, candidate.clone()));
                }
                Err(err) => log::debug!("Scene config not at {:?}: {}", candidate, err),
            }
        }
        log::warn!("Scene config {:?} not found", path.as_ref());
        Err(SceneError::ConfigNotFound { tried })
    }

    pub fn from_reader<R: BufRead>(reader: R) -> std::io::Result<Self> {
        let mut parser = Parser::default();
        for (i, line) in reader.lines().enumerate() {
            parser.line(i + 1, &line?);
        }
        Ok(parser.finish())
    }

    pub fn parse_str(contents: &str) -> Self {
        let mut parser = Parser::default();
        for (i, line) in contents.lines().enumerate() {
            parser.line(i + 1, line);
        }
        parser.finish()
    }
}

/// Locations tried for a scene file, in order, without duplicates.
pub fn candidate_paths(path: &Path) -> Vec<PathBuf> {
    let mut out: Vec<PathBuf> = Vec::new();
    let mut push = |p: PathBuf| {
        if !p.as_os_str().is_empty() && !out.contains(&p) {
            out.push(p);
        }
    };
    push(path.to_path_buf());
    if path.is_relative() {
        push(Path::new(".").join(path));
        if let Ok(stripped) = path.strip_prefix("src") {
            push(stripped.to_path_buf());
        }
        push(Path::new("..").join(path));
    }
    if let Some(name) = path.file_name() {
        push(PathBuf::from(name));
    }
    out
}

#[derive(Default)]
struct Parser {
    config: SceneConfig,
    pending: Option<Animation>,
}

impl Parser {
    fn line(&mut self, line_no: usize, line: &str) {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() || line.starts_with('#') {
            return;
        }
        let trimmed = line.trim_start();
        let (command, rest) = trimmed
            .split_once(char::is_whitespace)
            .unwrap_or((trimmed, ""));

        match command {
            "CAMERA" => self.camera(rest),
            "LIGHT1" | "LIGHT2" | "LIGHT3" => self.light(line_no, command, rest),
            "ANIMATION" => {
                if let Some(animation) = parse_animation(line_no, rest) {
                    self.pending = Some(animation);
                }
            }
            "OBJECT" => self.object(line_no, rest),
            other => log::debug!("Line {}: ignoring '{}'", line_no, other),
        }
    }

    fn camera(&mut self, rest: &str) {
        let cam = &mut self.config.camera;
        let mut values = rest.split_whitespace().map(str::parse::<f32>);
        let mut next = |slot: &mut f32| {
            if let Some(Ok(v)) = values.next() {
                *slot = v;
            }
        };
        next(&mut cam.position.x);
        next(&mut cam.position.y);
        next(&mut cam.position.z);
        next(&mut cam.target.x);
        next(&mut cam.target.y);
        next(&mut cam.target.z);
        next(&mut cam.fov_deg);
        log::info!("Camera at {:?} looking at {:?}", cam.position, cam.target);
    }

    fn light(&mut self, line_no: usize, tag: &str, rest: &str) {
        let lights = &mut self.config.lights;
        if lights.len() >= MAX_CONFIG_LIGHTS {
            log::warn!("Line {}: {} ignored, at most {} lights", line_no, tag, MAX_CONFIG_LIGHTS);
            return;
        }
        let index = lights.len();
        let expected = format!("LIGHT{}", index + 1);
        if tag != expected {
            log::warn!(
                "Line {}: {} stored as light {} (lights are numbered in file order)",
                line_no,
                tag,
                index + 1
            );
        }
        let v = numbers::<4>(line_no, tag, rest);
        let mut light = LightConfig {
            position: vec3(v[0], v[1], v[2]),
            ..LightConfig::default()
        };
        if rest.split_whitespace().nth(3).is_some() {
            light.intensity = v[3];
        }
        log::info!(
            "Light {} at {:?}, intensity {}",
            index + 1,
            light.position,
            light.intensity
        );
        lights.push(light);
    }

    fn object(&mut self, line_no: usize, rest: &str) {
        let Some(line) = parse_object_line(rest) else {
            log::warn!("Line {}: could not parse OBJECT '{}'", line_no, rest.trim());
            return;
        };
        let animation = self.pending.take().unwrap_or_default();
        log::info!("Object {:?} at {:?}", line.path, line.position);
        self.config.objects.push(ObjectConfig {
            path: PathBuf::from(line.path),
            position: line.position,
            rotation: line.rotation,
            scale: line.scale,
            material_type: line.material_type,
            animation: ObjectAnimation::new(animation, line.position),
        });
    }

    fn finish(self) -> SceneConfig {
        if self.pending.is_some() {
            log::warn!("Trailing ANIMATION has no OBJECT to attach to");
        }
        self.config
    }
}

/// Parse the arguments of an `ANIMATION` line. `None` for an unknown kind.
pub fn parse_animation(line_no: usize, rest: &str) -> Option<Animation> {
    let rest = rest.trim_start();
    let (kind, args) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    match kind {
        "bezier" => {
            let v = numbers::<13>(line_no, "ANIMATION bezier", args);
            let curve = BezierCurve::new(
                vec3(v[0], v[1], v[2]),
                vec3(v[3], v[4], v[5]),
                vec3(v[6], v[7], v[8]),
                vec3(v[9], v[10], v[11]),
                v[12],
                true,
            );
            log::info!("Bezier animation over {}s", curve.duration);
            Some(Animation::Bezier(curve))
        }
        "track" => {
            let track = BezierTrack::drift_circuit();
            log::info!(
                "Track animation: {} segments, {}s",
                track.segments.len(),
                track.total_duration()
            );
            Some(Animation::Track(track))
        }
        "orbit" => {
            let v = numbers::<5>(line_no, "ANIMATION orbit", args);
            let orbit = Orbit::new(vec3(v[0], v[1], v[2]), v[3], v[4]);
            log::info!(
                "Orbit animation around {:?}, radius {}, {} deg/s",
                orbit.center,
                orbit.radius,
                orbit.speed_deg
            );
            Some(Animation::Orbit(orbit))
        }
        "linear" => Some(Animation::Linear),
        other => {
            log::warn!("Line {}: unknown animation kind '{}'", line_no, other);
            None
        }
    }
}

/// Read `N` floats; missing or malformed values become 0.
fn numbers<const N: usize>(line_no: usize, what: &str, args: &str) -> [f32; N] {
    let mut out = [0.0; N];
    let mut tokens = args.split_whitespace();
    let mut bad = 0;
    for slot in &mut out {
        match tokens.next().map(str::parse::<f32>) {
            Some(Ok(v)) => *slot = v,
            _ => bad += 1,
        }
    }
    if bad > 0 {
        log::warn!(
            "Line {}: {} expects {} numbers, {} missing or malformed (using 0)",
            line_no,
            what,
            N,
            bad
        );
    }
    out
}
