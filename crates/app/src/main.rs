//! Entry point: load the scene file and run it.

use anyhow::{Context, Result};
use renderer::LogSink;
use scene::{Scene, SceneConfig, SceneError};

const DEFAULT_CONFIG: &str = "scene.cfg";
const HEADLESS_DT: f32 = 1.0 / 60.0;

fn parse_config_arg() -> String {
    // --config=PATH
    std::env::args()
        .filter_map(|arg| arg.strip_prefix("--config=").map(str::to_string))
        .last()
        .unwrap_or_else(|| DEFAULT_CONFIG.to_string())
}

fn parse_animate_arg() -> bool {
    // --animate[=on|off], off by default
    for arg in std::env::args() {
        if arg == "--animate" {
            return true;
        }
        if let Some(val) = arg.strip_prefix("--animate=") {
            return matches!(
                val.to_ascii_lowercase().as_str(),
                "1" | "true" | "on" | "yes"
            );
        }
    }
    false
}

fn parse_headless_arg() -> Option<u32> {
    // --headless-frames=N
    let mut frames = None;
    for arg in std::env::args() {
        if let Some(v) = arg.strip_prefix("--headless-frames=") {
            match v.parse::<u32>() {
                Ok(n) => frames = Some(n),
                Err(_) => log::warn!("Ignoring --headless-frames='{}'", v),
            }
        }
    }
    frames
}

fn parse_size_args() -> (u32, u32) {
    let mut w: Option<u32> = None;
    let mut h: Option<u32> = None;

    for arg in std::env::args() {
        if let Some(v) = arg.strip_prefix("--size=") {
            if let Some((sw, sh)) = v.split_once('x').or_else(|| v.split_once('X')) {
                if let (Ok(pw), Ok(ph)) = (sw.parse::<u32>(), sh.parse::<u32>()) {
                    w = Some(pw);
                    h = Some(ph);
                }
            }
        } else if let Some(v) = arg.strip_prefix("--width=") {
            if let Ok(pw) = v.parse::<u32>() {
                w = Some(pw);
            }
        } else if let Some(v) = arg.strip_prefix("--height=") {
            if let Ok(ph) = v.parse::<u32>() {
                h = Some(ph);
            }
        }
    }

    let ww = w.unwrap_or(1280).max(1);
    let hh = h.unwrap_or(720).max(1);
    (ww, hh)
}

fn load_config(path: &str) -> SceneConfig {
    match SceneConfig::load(path) {
        Ok((config, used)) => {
            log::info!(
                "Scene file {}: {} objects, {} lights",
                used.display(),
                config.objects.len(),
                config.lights.len()
            );
            config
        }
        Err(err @ SceneError::ConfigNotFound { .. }) => {
            log::warn!("{}; using the default scene", err);
            SceneConfig::default()
        }
        Err(err) => {
            log::warn!("Could not read scene file: {}; using the default scene", err);
            SceneConfig::default()
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = parse_config_arg();
    let animate = parse_animate_arg();
    let headless = parse_headless_arg();
    let (width, height) = parse_size_args();
    log::info!(
        "Starting. config={}, animate={}, window_size={}x{}",
        config_path,
        animate,
        width,
        height
    );

    let config = load_config(&config_path);
    let mut scene = Scene::from_config(&config, width as f32 / height as f32);
    scene.set_animating(animate);

    let mut sink = LogSink::new();
    scene.upload(&mut sink);

    match headless {
        Some(frames) => platform::run_headless(&mut scene, &mut sink, frames, HEADLESS_DT),
        None => platform::run_windowed(&mut scene, &mut sink, width, height)
            .context("Windowed run failed")?,
    }

    log::info!("Rendered {} frames. Graceful shutdown. Bye!", sink.frames());
    Ok(())
}
