//! Gossi guest plugin
//!
//! Exposes the dispatcher to a wasm host over a pointer/length ABI.
//! The host writes program and data into the static input buffer, calls
//! `run`, and collects whatever the plugin hands back through `host.emit`.

#![no_std]

use core::fmt::{self, Write};
use core::panic::PanicInfo;
use core::ptr::addr_of_mut;
use core::{slice, str};

use gossi_shared::plugin_helpers::{
    PluginResult, ERROR_BUFFER_OVERFLOW, ERROR_INVALID_INPUT, ERROR_INVALID_UTF8, INPUT_CAPACITY,
    SUCCESS,
};
use heapless::String;

#[link(wasm_import_module = "host")]
extern "C" {
    fn log(ptr: *const u8, len: usize);
    fn emit(ptr: *const u8, len: usize);
}

fn log_message(message: &str) {
    unsafe {
        log(message.as_ptr(), message.len());
    }
}

static mut INPUT: [u8; INPUT_CAPACITY] = [0; INPUT_CAPACITY];

/// Buffers output and hands it to the host in chunks.
struct Emitter {
    buf: String<128>,
}

impl Emitter {
    fn new() -> Self {
        Self { buf: String::new() }
    }

    fn flush(&mut self) {
        if !self.buf.is_empty() {
            unsafe {
                emit(self.buf.as_ptr(), self.buf.len());
            }
            self.buf.clear();
        }
    }
}

impl Write for Emitter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        s.chars().try_for_each(|c| self.write_char(c))
    }

    fn write_char(&mut self, c: char) -> fmt::Result {
        if self.buf.push(c).is_err() {
            self.flush();
            self.buf.push(c).map_err(|_| fmt::Error)?;
        }
        Ok(())
    }
}

#[no_mangle]
pub extern "C" fn input_ptr() -> *mut u8 {
    addr_of_mut!(INPUT) as *mut u8
}

#[no_mangle]
pub extern "C" fn input_capacity() -> usize {
    INPUT_CAPACITY
}

/// Reads a UTF-8 argument the host placed in linear memory.
fn read_arg<'a>(ptr: *const u8, len: usize) -> PluginResult<&'a str> {
    if ptr.is_null() && len > 0 {
        return Err(ERROR_INVALID_INPUT);
    }
    // Safety: the host guarantees the region is inside linear memory
    let bytes = unsafe { slice::from_raw_parts(ptr, len) };
    str::from_utf8(bytes).map_err(|_| ERROR_INVALID_UTF8)
}

#[no_mangle]
pub extern "C" fn run(
    program_ptr: *const u8,
    program_len: usize,
    data_ptr: *const u8,
    data_len: usize,
) -> i32 {
    let program = match read_arg(program_ptr, program_len) {
        Ok(s) => s,
        Err(code) => {
            log_message("[Gossi] ERROR - Invalid program selector");
            return code;
        }
    };
    let data = match read_arg(data_ptr, data_len) {
        Ok(s) => s,
        Err(code) => {
            log_message("[Gossi] ERROR - Invalid data payload");
            return code;
        }
    };
    log_message("[Gossi] Dispatching");
    let mut emitter = Emitter::new();
    if gossi_shared::write_run(program, data, &mut emitter).is_err() {
        log_message("[Gossi] ERROR - Output buffer overflow");
        return ERROR_BUFFER_OVERFLOW;
    }
    emitter.flush();
    SUCCESS
}

#[panic_handler]
fn panic(_info: &PanicInfo) -> ! {
    log_message("[Gossi] PANIC occurred!");
    loop {}
}

// The plugin never allocates; the stub only satisfies the linker.
#[global_allocator]
static ALLOCATOR: DummyAllocator = DummyAllocator;

struct DummyAllocator;

unsafe impl core::alloc::GlobalAlloc for DummyAllocator {
    unsafe fn alloc(&self, _layout: core::alloc::Layout) -> *mut u8 {
        core::ptr::null_mut()
    }

    unsafe fn dealloc(&self, _ptr: *mut u8, _layout: core::alloc::Layout) {}
}
