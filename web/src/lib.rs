//! gossi-web - browser bindings for the gossi dispatcher
//!
//! On instantiation the module installs `globalThis.run(program, data)`,
//! so page scripts can call it like any global function. Bundler users can
//! import the `run` export directly instead.

use wasm_bindgen::prelude::*;

const GLOBAL_NAME: &str = "run";

/// Runs `program` over `data` and returns the signed result.
#[wasm_bindgen]
pub fn run(program: &str, data: &str) -> String {
    gossi_shared::run(program, data)
}

/// Registers the global `run` callable.
///
/// The closure is leaked so it outlives this call. The browser keeps the
/// instance resident; nothing here blocks.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    let callback = Closure::<dyn Fn(JsValue, JsValue) -> Result<String, JsValue>>::new(
        |program: JsValue, data: JsValue| {
            let (program, data) = read_args(program.as_string(), data.as_string())
                .map_err(|message| JsValue::from(js_sys::TypeError::new(message)))?;
            Ok(gossi_shared::run(&program, &data))
        },
    );
    js_sys::Reflect::set(
        &js_sys::global(),
        &JsValue::from_str(GLOBAL_NAME),
        callback.as_ref(),
    )?;
    callback.forget();
    Ok(())
}

/// Both arguments must arrive as strings; anything else is a caller bug.
fn read_args(
    program: Option<String>,
    data: Option<String>,
) -> Result<(String, String), &'static str> {
    match (program, data) {
        (Some(program), Some(data)) => Ok((program, data)),
        (None, _) => Err("run: `program` must be a string"),
        (_, None) => Err("run: `data` must be a string"),
    }
}
