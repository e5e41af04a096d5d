/// Viewer configuration and command-line overrides
use std::path::PathBuf;
use std::time::Duration;

use log::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    /// Canvas size in pixels
    pub width: u32,
    pub height: u32,
    /// Interval between animation ticks
    pub tick: Duration,
    /// How far the model is pushed away from the eye
    pub distance: f32,
    /// Vertical field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub light_position: [f32; 4],
    pub clear_color: [f32; 3],
    /// Rotation added per tick around x, y, z (radians)
    pub spin: [f32; 3],
    pub model_path: PathBuf,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            width: 160,
            height: 160,
            tick: Duration::from_millis(30),
            distance: 15.0,
            fov: 45.0,
            near: 0.1,
            far: 1000.0,
            light_position: [5.0, 10.0, 0.0, 1.0],
            clear_color: [0.5, 0.5, 0.5],
            spin: [0.01, 0.015, 0.0],
            model_path: PathBuf::from("assets/test.obj"),
        }
    }
}

impl ViewerConfig {
    /// Build a configuration from command-line arguments (program name excluded).
    ///
    /// Accepts `--size=WxH`, `--tick-ms=N`, `--distance=D`, `--fov=F` and one
    /// positional model path. Unparseable values keep their defaults.
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut config = Self::default();

        for arg in args {
            let arg = arg.as_ref();
            if let Some(v) = arg.strip_prefix("--size=") {
                let size = v
                    .split_once('x')
                    .or_else(|| v.split_once('X'))
                    .and_then(|(w, h)| Some((w.parse::<u32>().ok()?, h.parse::<u32>().ok()?)))
                    .filter(|&(w, h)| w > 0 && h > 0);
                match size {
                    Some((w, h)) => {
                        config.width = w;
                        config.height = h;
                    }
                    None => warn!("Invalid canvas size '{}', keeping {}x{}", v, config.width, config.height),
                }
            } else if let Some(v) = arg.strip_prefix("--tick-ms=") {
                match v.parse::<u64>() {
                    Ok(ms) if ms > 0 => config.tick = Duration::from_millis(ms),
                    _ => warn!("Invalid tick interval '{}', keeping {:?}", v, config.tick),
                }
            } else if let Some(v) = arg.strip_prefix("--distance=") {
                match v.parse::<f32>() {
                    Ok(d) if d.is_finite() => config.distance = d,
                    _ => warn!("Invalid distance '{}', keeping {}", v, config.distance),
                }
            } else if let Some(v) = arg.strip_prefix("--fov=") {
                match v.parse::<f32>() {
                    Ok(f) if f > 0.0 && f < 180.0 => config.fov = f,
                    _ => warn!("Invalid field of view '{}', keeping {}", v, config.fov),
                }
            } else if arg.starts_with("--") {
                warn!("Unknown option '{}' (ignoring)", arg);
            } else {
                config.model_path = PathBuf::from(arg);
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_args() {
        let config = ViewerConfig::from_args(Vec::<String>::new());
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.tick, Duration::from_millis(30));
    }

    #[test]
    fn test_overrides() {
        let config = ViewerConfig::from_args([
            "--size=320x200",
            "--tick-ms=16",
            "--distance=8.5",
            "--fov=60",
            "models/teapot.obj",
        ]);
        assert_eq!((config.width, config.height), (320, 200));
        assert_eq!(config.tick, Duration::from_millis(16));
        assert_eq!(config.distance, 8.5);
        assert_eq!(config.fov, 60.0);
        assert_eq!(config.model_path, PathBuf::from("models/teapot.obj"));
    }

    #[test]
    fn test_bad_values_keep_defaults() {
        let config = ViewerConfig::from_args(["--size=0x10", "--tick-ms=abc", "--fov=400", "--bogus"]);
        let defaults = ViewerConfig::default();
        assert_eq!((config.width, config.height), (defaults.width, defaults.height));
        assert_eq!(config.tick, defaults.tick);
        assert_eq!(config.fov, defaults.fov);
    }
}
