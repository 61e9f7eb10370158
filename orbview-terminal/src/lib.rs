/// Terminal front-end: crossterm event loop around the ASCII rasterizer
use anyhow::{Context, Result};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use log::LevelFilter;
use std::io::{stdout, Write};

use orbview_core::{BuiltinShaders, Key, KeyEvent, Renderer, Scene, SceneConfig};

pub mod cli;
pub mod renderer;

pub use cli::CliOptions;
pub use renderer::AsciiRenderer;

/// Terminal cells are roughly twice as tall as they are wide
const CELL_ASPECT: u32 = 2;

/// Main application struct for terminal 3D rendering.
///
/// Frames are only drawn at startup, on a bound key and on resize; the loop
/// blocks on input in between.
pub struct TerminalApp {
    scene: Scene,
    renderer: Renderer<AsciiRenderer>,
    running: bool,
    frames: u64,
}

impl TerminalApp {
    pub fn new(config: &SceneConfig) -> Result<Self> {
        let (width, height) = terminal::size().context("querying terminal size")?;
        let (width, height) = (width as u32, height as u32);

        let scene = Scene::from_config(config, width, height * CELL_ASPECT)
            .context("building scene")?;
        let backend = AsciiRenderer::new(width as usize, height as usize);
        let renderer = Renderer::new(backend, &BuiltinShaders, &scene, width, height)
            .context("initializing renderer")?;

        Ok(Self {
            scene,
            renderer,
            running: true,
            frames: 0,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        // stderr shares the screen with the frame
        let level = log::max_level();
        log::set_max_level(LevelFilter::Off);
        let result = self.main_loop();
        log::set_max_level(level);

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        log::info!("rendered {} frames", self.frames);
        result
    }

    fn main_loop(&mut self) -> Result<()> {
        self.render()?;

        while self.running {
            let redraw = match event::read()? {
                Event::Key(key) => self.handle_input(key),
                Event::Resize(width, height) => {
                    self.resize(width as u32, height as u32);
                    true
                }
                _ => false,
            };

            if redraw && self.running {
                self.render()?;
            }
        }

        Ok(())
    }

    /// Returns `true` when the key changed the camera
    fn handle_input(&mut self, key: event::KeyEvent) -> bool {
        if key.kind == KeyEventKind::Release {
            return false;
        }

        if is_quit(&key) {
            self.running = false;
            return false;
        }

        match translate_key(&key) {
            Some(event) => self.scene.handle_key(event),
            None => false,
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.renderer.resize(&mut self.scene, width, height);
        self.scene.camera.set_viewport(width, height * CELL_ASPECT);
    }

    fn render(&mut self) -> Result<()> {
        let stats = self.renderer.render_frame(&mut self.scene)?;
        self.frames += 1;

        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.renderer.backend().draw(&mut stdout)?;

        // Draw UI overlay
        let camera = &self.scene.camera;
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::DarkBlue),
            Print(format!(
                "orbview | {} | angle {:.0}° distance {:.2} fovy {:.0}° eye.y {:.2} | {} models",
                camera.mode,
                camera.z_angle.to_degrees(),
                camera.distance,
                camera.fovy.to_degrees(),
                camera.eye.y,
                stats.models,
            )),
            cursor::MoveTo(0, 1),
            Print("Arrows/WASD/H=Pan+Orbit C=Orbit E=Zoom V=FOV (Shift inverts C/H/E/V) Q=Quit"),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

/// `q` in either case, Esc or Ctrl-C
pub fn is_quit(key: &event::KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => true,
        KeyCode::Char('c') | KeyCode::Char('C') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Map a crossterm key press onto the camera key bindings. An uppercase
/// letter counts as shifted even when the terminal drops the modifier.
pub fn translate_key(key: &event::KeyEvent) -> Option<KeyEvent> {
    let mut shift = key.modifiers.contains(KeyModifiers::SHIFT);

    let key = match key.code {
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Char(c) => {
            shift |= c.is_ascii_uppercase();
            Key::Char(c.to_ascii_uppercase())
        }
        _ => return None,
    };

    Some(KeyEvent { key, shift })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent as TermKey;

    #[test]
    fn test_translate_arrows() {
        let key = TermKey::new(KeyCode::Left, KeyModifiers::NONE);
        assert_eq!(translate_key(&key), Some(KeyEvent::new(Key::Left)));

        let key = TermKey::new(KeyCode::Up, KeyModifiers::SHIFT);
        assert_eq!(translate_key(&key), Some(KeyEvent::shifted(Key::Up)));
    }

    #[test]
    fn test_translate_letters() {
        let key = TermKey::new(KeyCode::Char('v'), KeyModifiers::NONE);
        assert_eq!(translate_key(&key), Some(KeyEvent::new(Key::Char('V'))));

        // Uppercase without the modifier flag still counts as shifted
        let key = TermKey::new(KeyCode::Char('E'), KeyModifiers::NONE);
        assert_eq!(translate_key(&key), Some(KeyEvent::shifted(Key::Char('E'))));
    }

    #[test]
    fn test_quit_keys() {
        assert!(is_quit(&TermKey::new(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(is_quit(&TermKey::new(KeyCode::Char('Q'), KeyModifiers::SHIFT)));
        assert!(is_quit(&TermKey::new(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(is_quit(&TermKey::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));

        // Plain C orbits
        assert!(!is_quit(&TermKey::new(KeyCode::Char('c'), KeyModifiers::NONE)));
        assert!(!is_quit(&TermKey::new(KeyCode::Char('C'), KeyModifiers::SHIFT)));
    }

    #[test]
    fn test_translate_ignores_other_keys() {
        let key = TermKey::new(KeyCode::Tab, KeyModifiers::NONE);
        assert_eq!(translate_key(&key), None);
    }
}
