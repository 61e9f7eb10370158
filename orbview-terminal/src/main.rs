/// orbview terminal viewer - three boxes on an orbit camera
///
/// Controls:
///   - Left/Right, C: Orbit around the center
///   - Up/Down, W/S, H: Move the eye up and down
///   - A/D: Move the eye sideways (with --free-camera)
///   - E: Zoom, V: Field of view
///   - Shift: Invert C/H/E/V
///   - Q/ESC: Quit
use anyhow::Result;
use log::LevelFilter;
use orbview_core::logging::{init_logging, LoggingConfig};
use orbview_terminal::{cli::USAGE, CliOptions, TerminalApp};

fn main() -> Result<()> {
    // The alternate screen owns the terminal; keep stderr quiet unless asked
    init_logging(LoggingConfig {
        default_level: LevelFilter::Warn,
        ..LoggingConfig::default()
    });

    let options = match CliOptions::parse(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("{err}\n\n{USAGE}");
            std::process::exit(2);
        }
    };
    if options.help {
        println!("{USAGE}");
        return Ok(());
    }

    let config = options.scene_config();
    log::info!(
        "starting with {} models, {} projection",
        config.models.len(),
        config.camera.projection
    );

    let mut app = TerminalApp::new(&config)?;
    app.run()
}
