/// Guest ABI shared by the plugin and the host.
/// Status codes are returned by the guest `run` export; everything else
/// names the exports and imports both sides agree on.
pub const ERROR_INVALID_UTF8: i32 = -1;
pub const ERROR_INVALID_INPUT: i32 = -2;
pub const ERROR_BUFFER_OVERFLOW: i32 = -3;
pub const ERROR_UNKNOWN: i32 = -99;

/// Success code
pub const SUCCESS: i32 = 0;

/// Size of the guest's static input buffer (program + data).
pub const INPUT_CAPACITY: usize = 64 * 1024;

pub const HOST_MODULE: &str = "host";
pub const HOST_LOG: &str = "log";
pub const HOST_EMIT: &str = "emit";

pub const EXPORT_MEMORY: &str = "memory";
pub const EXPORT_INPUT_PTR: &str = "input_ptr";
pub const EXPORT_INPUT_CAPACITY: &str = "input_capacity";
pub const EXPORT_RUN: &str = "run";

/// Error result wrapper for plugin operations
pub type PluginResult<T> = Result<T, i32>;

pub fn status_message(code: i32) -> &'static str {
    match code {
        SUCCESS => "success",
        ERROR_INVALID_UTF8 => "invalid UTF-8 input",
        ERROR_INVALID_INPUT => "invalid input",
        ERROR_BUFFER_OVERFLOW => "buffer overflow",
        _ => "unknown error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ERROR_INVALID_UTF8, -1);
        assert_eq!(SUCCESS, 0);
        assert_eq!(status_message(ERROR_BUFFER_OVERFLOW), "buffer overflow");
        assert_eq!(status_message(ERROR_UNKNOWN), "unknown error");
        assert_eq!(status_message(42), "unknown error");
    }
}
