/// objview - spin an OBJ model in the terminal
///
/// Usage: objview [--size=WxH] [--tick-ms=N] [--distance=D] [--fov=F] [model.obj]
/// Controls:
///   - WASD / Arrow Keys: Rotate the model
///   - E: Roll
///   - Space: Pause spinning
///   - R: Reload the model file
///   - Q/ESC: Quit
use std::io;
use objview_terminal::{TerminalApp, ViewerConfig};

fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = ViewerConfig::from_args(std::env::args().skip(1));
    println!("objview - loading {}...", config.model_path.display());

    let mut app = TerminalApp::new(config)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

    println!(
        "Loaded {} faces, starting renderer (press Q to quit)...",
        app.model().faces.len()
    );
    std::thread::sleep(std::time::Duration::from_secs(1));

    app.run()?;

    println!("Bye!");
    Ok(())
}
