/// Terminal host for the OBJ viewer
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use log::{error, info};
use objview_core::Model;
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod config;
pub mod raster;
pub mod renderer;
pub mod viewer;

pub use config::ViewerConfig;
pub use raster::SoftRasterizer;
pub use renderer::AsciiRenderer;
pub use viewer::{ModelViewer, ViewerError};

/// Size of the built-in mesh shown when the model file can't be loaded
const FALLBACK_CUBE_SIZE: f32 = 2.0;

/// Load `config.model_path` into a fresh model, falling back to a cube
fn load_or_fallback(model: &mut Model, config: &ViewerConfig) {
    match model.load(&config.model_path) {
        Ok(()) => info!(
            "Loaded {} ({} faces)",
            config.model_path.display(),
            model.faces.len()
        ),
        Err(e) => {
            error!("{}; showing the default cube instead", e);
            *model = Model::cube(FALLBACK_CUBE_SIZE);
        }
    }
}

/// Number of pixels in the configured canvas, computed without `u32` overflow
fn canvas_pixels(config: &ViewerConfig) -> usize {
    config.width as usize * config.height as usize
}

/// Main application struct: drives the viewer on a fixed tick and shows the canvas
pub struct TerminalApp {
    config: ViewerConfig,
    model: Model,
    viewer: ModelViewer,
    presenter: AsciiRenderer,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(config: ViewerConfig) -> Result<Self, ViewerError> {
        let (width, height) = terminal::size()?;
        let pixel_count = canvas_pixels(&config);

        let mut model = Model::new();
        let viewer = match ModelViewer::init(
            config.width,
            config.height,
            vec![0; pixel_count],
            &mut model,
            &config.model_path,
            &config,
        ) {
            Ok(viewer) => viewer,
            Err(ViewerError::Load(e)) => {
                error!("{}; showing the default cube instead", e);
                model = Model::cube(FALLBACK_CUBE_SIZE);
                ModelViewer::new(config.width, config.height, vec![0; pixel_count], &config)?
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            config,
            model,
            viewer,
            presenter: AsciiRenderer::new(width as usize, height as usize),
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let tick = self.config.tick;

        while self.running {
            let frame_start = Instant::now();

            if event::poll(Duration::from_millis(0))? {
                self.handle_input()?;
            }

            self.viewer.update(&self.model);
            self.render()?;

            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < tick {
                std::thread::sleep(tick - elapsed);
            }

            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        match event::read()? {
            Event::Key(KeyEvent { code, .. }) => match code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.running = false;
                }
                KeyCode::Char('w') | KeyCode::Up => {
                    self.viewer.rotate(0.1, 0.0, 0.0);
                }
                KeyCode::Char('s') | KeyCode::Down => {
                    self.viewer.rotate(-0.1, 0.0, 0.0);
                }
                KeyCode::Char('a') | KeyCode::Left => {
                    self.viewer.rotate(0.0, -0.1, 0.0);
                }
                KeyCode::Char('d') | KeyCode::Right => {
                    self.viewer.rotate(0.0, 0.1, 0.0);
                }
                KeyCode::Char('e') => {
                    self.viewer.rotate(0.0, 0.0, 0.1);
                }
                KeyCode::Char(' ') => {
                    self.viewer.toggle_spin();
                }
                KeyCode::Char('r') => {
                    load_or_fallback(&mut self.model, &self.config);
                }
                _ => {}
            },
            Event::Resize(width, height) => {
                self.presenter.resize(width as usize, height as usize);
            }
            _ => {}
        }
        Ok(())
    }

    fn render(&mut self) -> io::Result<()> {
        self.presenter.present(
            self.viewer.pixels(),
            self.viewer.width(),
            self.viewer.height(),
            self.viewer.background(),
        );

        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.presenter.draw(&mut stdout)?;

        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "objview | {} faces | FPS: {:.1} | WASD/Arrows=Rotate E=Roll Space=Pause R=Reload Q=Quit",
                self.model.faces.len(),
                self.fps
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_canvas_pixels_for_large_sizes() {
        let config = ViewerConfig {
            width: 70_000,
            height: 70_000,
            ..ViewerConfig::default()
        };
        assert_eq!(canvas_pixels(&config), 4_900_000_000);
        assert_eq!(canvas_pixels(&ViewerConfig::default()), 160 * 160);
    }

    #[test]
    fn test_reload_falls_back_to_cube() {
        let dir = tempfile::tempdir().unwrap();
        let config = ViewerConfig {
            model_path: dir.path().join("missing.obj"),
            ..ViewerConfig::default()
        };

        let mut model = Model::new();
        load_or_fallback(&mut model, &config);
        assert_eq!(model, Model::cube(FALLBACK_CUBE_SIZE));
    }

    #[test]
    fn test_reload_replaces_model() {
        let dir = tempfile::tempdir().unwrap();
        let path: PathBuf = dir.path().join("tri.obj");
        std::fs::write(&path, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();

        let config = ViewerConfig {
            model_path: path,
            ..ViewerConfig::default()
        };
        let mut model = Model::cube(1.0);
        load_or_fallback(&mut model, &config);
        assert_eq!(model.faces.len(), 1);
        assert_eq!(model.vertices.len(), 3);
    }
}
