//! Browser host
//!
//! Owns one boxed cabinet, blits its canvas into an HTML `<canvas>` and
//! drives it from requestAnimationFrame. Each animation frame passes back
//! the handle the cabinet issued; when `frame` returns `None` the loop ends,
//! so a stale loop left over from a restart dies on its next frame.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::Clamped;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData, KeyboardEvent};

use crate::cabinet::{Arcade, cabinet_for};
use crate::persistence::{LocalStorageStore, MemoryStore, ScoreStore};
use crate::platform::{Action, InputEvent, TickHandle};
use crate::settings::Settings;
use crate::sim::{GameKind, Identity};

struct Host {
    arcade: Box<dyn Arcade>,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl Host {
    /// Copy the cabinet's pixels onto the page
    fn present(&self) {
        let frame = self.arcade.canvas();
        let (w, h) = (frame.width(), frame.height());
        if self.canvas.width() != w || self.canvas.height() != h {
            self.canvas.set_width(w);
            self.canvas.set_height(h);
        }
        let image = match ImageData::new_with_u8_clamped_array_and_sh(Clamped(frame.as_bytes()), w, h) {
            Ok(image) => image,
            Err(e) => {
                log::warn!("Failed to wrap frame: {e:?}");
                return;
            }
        };
        if let Err(e) = self.ctx.put_image_data(&image, 0.0, 0.0) {
            log::warn!("Failed to draw frame: {e:?}");
        }
    }

    fn log_events(&mut self) {
        for event in self.arcade.drain_events() {
            log::info!("{:?}", event);
        }
    }
}

fn request_frame(host: Rc<RefCell<Host>>, handle: TickHandle) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let closure = Closure::once(move |time: f64| {
        on_frame(host, handle, time);
    });
    let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
    closure.forget();
}

fn on_frame(host: Rc<RefCell<Host>>, handle: TickHandle, time: f64) {
    let next = {
        let mut h = host.borrow_mut();
        let next = h.arcade.frame(handle, time);
        h.present();
        h.log_events();
        next
    };

    if let Some(next) = next {
        request_frame(host, next);
    }
}

/// Forward arrow/WASD/Space/Enter presses and releases to the cabinet
fn listen_keys(host: &Rc<RefCell<Host>>) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;

    for (kind, active) in [("keydown", true), ("keyup", false)] {
        let host = host.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            if event.repeat() {
                return;
            }
            let Some(action) = Action::from_key_code(&event.code()) else {
                return;
            };
            event.prevent_default();
            host.borrow_mut().arcade.input(InputEvent { action, active });
        });
        window.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}

/// One game bound to a page canvas
#[wasm_bindgen]
pub struct WebCabinet {
    host: Rc<RefCell<Host>>,
}

#[wasm_bindgen]
impl WebCabinet {
    /// `game` is a tag such as "tetris"; `canvas_id` names the target element
    #[wasm_bindgen(constructor)]
    pub fn new(game: &str, canvas_id: &str) -> Result<WebCabinet, JsValue> {
        let kind = GameKind::from_tag(game)
            .ok_or_else(|| JsValue::from_str(&format!("unknown game '{game}'")))?;

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str(&format!("no element '{canvas_id}'")))?
            .dyn_into()?;
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("no 2d context"))?
            .dyn_into()?;

        let store: Box<dyn ScoreStore> = match LocalStorageStore::open() {
            Ok(store) => Box::new(store),
            Err(e) => {
                log::warn!("Scores will not persist: {e:#}");
                Box::new(MemoryStore::new())
            }
        };
        let seed = js_sys::Date::now() as u64;
        let mut arcade = cabinet_for(kind, seed, store, Settings::load());
        arcade.render();

        let host = Rc::new(RefCell::new(Host { arcade, canvas, ctx }));
        host.borrow().present();
        listen_keys(&host)?;
        log::info!("{} ready", kind.title());
        Ok(WebCabinet { host })
    }

    /// Begin a new run at level 1
    pub fn start(&self) {
        let handle = self.host.borrow_mut().arcade.start();
        self.run(handle);
    }

    /// Continue the signed-in player's saved run; false when there is none
    pub fn resume(&self) -> bool {
        let handle = self.host.borrow_mut().arcade.resume_saved();
        let resumed = handle.is_some();
        self.run(handle);
        resumed
    }

    #[wasm_bindgen(js_name = signIn)]
    pub fn sign_in(&self, player_id: &str, display_name: &str) {
        let identity = Identity::new(player_id, display_name);
        let handle = self.host.borrow_mut().arcade.sign_in(identity);
        self.run(handle);
    }

    #[wasm_bindgen(js_name = signOut)]
    pub fn sign_out(&self) {
        self.host.borrow_mut().arcade.sign_out();
    }

    #[wasm_bindgen(js_name = selectShip)]
    pub fn select_ship(&self, index: usize) -> bool {
        let mut h = self.host.borrow_mut();
        let chosen = h.arcade.select_ship(index);
        if chosen {
            h.present();
        }
        chosen
    }

    #[wasm_bindgen(js_name = continueLevel)]
    pub fn continue_level(&self) {
        let handle = self.host.borrow_mut().arcade.continue_level();
        self.run(handle);
    }

    #[wasm_bindgen(js_name = saveAndQuit)]
    pub fn save_and_quit(&self) {
        self.host.borrow_mut().arcade.save_and_quit();
        self.run(None);
    }

    pub fn restart(&self) {
        self.host.borrow_mut().arcade.restart();
        self.run(None);
    }

    /// Feed a key by `KeyboardEvent.code` for on-screen controls
    pub fn key(&self, code: &str, active: bool) -> bool {
        let Some(action) = Action::from_key_code(code) else {
            return false;
        };
        self.host.borrow_mut().arcade.input(InputEvent { action, active });
        true
    }

    /// HUD state as JSON
    pub fn hud(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.host.borrow().arcade.hud())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// This game's leaderboard as JSON
    #[wasm_bindgen(js_name = topScores)]
    pub fn top_scores(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.host.borrow().arcade.top_scores())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl WebCabinet {
    /// Redraw, and start an animation loop when the cabinet issued a handle
    fn run(&self, handle: Option<TickHandle>) {
        {
            let mut h = self.host.borrow_mut();
            h.arcade.render();
            h.present();
            h.log_events();
        }
        if let Some(handle) = handle {
            request_frame(self.host.clone(), handle);
        }
    }
}
