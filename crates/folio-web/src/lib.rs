//! folio web - browser entry point
//!
//! Installs console logging, reads the page's embedded configuration and
//! installs the enhancements against the live document. Only built for
//! `wasm32`.

#![cfg(target_arch = "wasm32")]

mod console;
mod host;

use std::cell::RefCell;
use std::rc::Rc;

use folio_dom::Host;
use folio_enhance::Enhancer;
use wasm_bindgen::prelude::*;

pub use host::{WebError, WebHost};

thread_local! {
    static INSTALLED: RefCell<Option<(Rc<dyn Host>, Enhancer)>> = const { RefCell::new(None) };
}

/// Module entry point
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console::init(console::DEFAULT_FILTER);

    let host: Rc<dyn Host> = Rc::new(WebHost::new().map_err(|e| JsValue::from_str(&e.to_string()))?);
    let config = Enhancer::load_config(host.as_ref());
    let enhancer = Enhancer::install(&host, config);

    let previous = INSTALLED.with(|slot| slot.borrow_mut().replace((host, enhancer)));
    if let Some((_host, mut previous)) = previous {
        previous.teardown();
    }
    Ok(())
}

/// Remove every installed behavior from the page
#[wasm_bindgen]
pub fn teardown() {
    let installed = INSTALLED.with(|slot| slot.borrow_mut().take());
    if let Some((_host, mut enhancer)) = installed {
        enhancer.teardown();
    }
}
