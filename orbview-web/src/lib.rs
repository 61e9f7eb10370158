/// orbview web front-end: WebGL2 rendering in a browser canvas
///
/// The page creates the viewer with `WebApp.start("canvas-id")`. Key presses
/// on the window drive the camera; `set_projection` and `set_fill_style`
/// switch modes from page controls.
use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, KeyboardEvent, WebGl2RenderingContext, Window};

use orbview_core::{
    FillStyle, Key, KeyEvent, ProjectionMode, RenderError, Renderer, Scene, SceneConfig,
};

pub mod webgl;

pub use webgl::{DomShaderSource, WebGlBackend};

struct AppState {
    scene: Scene,
    renderer: Renderer<WebGlBackend>,
}

impl AppState {
    fn render(&mut self) -> Result<(), JsValue> {
        let stats = self.renderer.render_frame(&mut self.scene).map_err(to_js)?;
        log::trace!(
            "frame: {} models, {} triangle draws, {} line draws",
            stats.models,
            stats.triangle_draws,
            stats.line_draws
        );
        Ok(())
    }
}

#[wasm_bindgen]
pub struct WebApp {
    state: Rc<RefCell<AppState>>,
    window: Window,
    keydown: Closure<dyn FnMut(KeyboardEvent)>,
}

#[wasm_bindgen]
impl WebApp {
    /// Attach to the canvas with id `canvas_id`, draw the first frame and
    /// start listening for key presses
    pub fn start(canvas_id: &str) -> Result<WebApp, JsValue> {
        let window = web_sys::window().ok_or_else(|| context_error("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| context_error("no document"))?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| context_error(format!("no element with id '{canvas_id}'")))?
            .dyn_into()?;
        let gl: WebGl2RenderingContext = canvas
            .get_context("webgl2")?
            .ok_or_else(|| context_error("WebGL2 is not available"))?
            .dyn_into()?;

        let (width, height) = (canvas.width(), canvas.height());
        let scene = Scene::from_config(&SceneConfig::default(), width, height).map_err(to_js)?;
        let shaders = DomShaderSource::new(document);
        let renderer = Renderer::new(WebGlBackend::new(gl), &shaders, &scene, width, height)
            .map_err(to_js)?;

        let state = Rc::new(RefCell::new(AppState { scene, renderer }));
        state.borrow_mut().render()?;

        let handler_state = Rc::clone(&state);
        let keydown = Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
            let Some(key) = translate_key(&event.key(), event.shift_key()) else {
                return;
            };

            let mut state = handler_state.borrow_mut();
            if state.scene.handle_key(key) {
                event.prevent_default();
                if let Err(err) = state.render() {
                    log::error!("render failed: {err:?}");
                }
            }
        });
        window.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;

        log::info!("orbview started on '{canvas_id}' ({width}x{height})");
        Ok(WebApp {
            state,
            window,
            keydown,
        })
    }

    /// Switch projection by name (`perspective`, `ortho`, `frustum`) and redraw
    pub fn set_projection(&self, name: &str) -> Result<(), JsValue> {
        let mode: ProjectionMode = name.parse().map_err(to_js)?;
        let mut state = self.state.borrow_mut();
        state.scene.camera.set_projection(mode);
        state.render()
    }

    /// Switch every model's fill style by name and redraw
    pub fn set_fill_style(&self, name: &str) -> Result<(), JsValue> {
        let fill_style: FillStyle = name.parse().map_err(to_js)?;
        let mut state = self.state.borrow_mut();
        for model in &mut state.scene.models {
            model.fill_style = fill_style;
        }
        state.render()
    }

    /// Follow a canvas size change
    pub fn resize(&self, width: u32, height: u32) -> Result<(), JsValue> {
        let mut state = self.state.borrow_mut();
        let AppState { scene, renderer } = &mut *state;
        renderer.resize(scene, width, height);
        state.render()
    }

    pub fn render(&self) -> Result<(), JsValue> {
        self.state.borrow_mut().render()
    }
}

impl Drop for WebApp {
    fn drop(&mut self) {
        let _ = self
            .window
            .remove_event_listener_with_callback("keydown", self.keydown.as_ref().unchecked_ref());
    }
}

/// Map a DOM `KeyboardEvent.key` value onto the camera key bindings
pub fn translate_key(key: &str, shift: bool) -> Option<KeyEvent> {
    let key = match key {
        "ArrowUp" => Key::Up,
        "ArrowDown" => Key::Down,
        "ArrowLeft" => Key::Left,
        "ArrowRight" => Key::Right,
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_alphabetic() => Key::Char(c.to_ascii_uppercase()),
                _ => return None,
            }
        }
    };

    Some(KeyEvent { key, shift })
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn context_error(reason: impl Into<String>) -> JsValue {
    to_js(RenderError::Context(reason.into()))
}

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    Ok(())
}
