#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod dispatch;
pub mod plugin_helpers;

pub use dispatch::{run, write_run, Program, SIGN};

#[cfg(feature = "std")]
pub use protocol::*;

#[cfg(feature = "std")]
mod protocol {
    use alloc::string::String;
    use alloc::vec::Vec;

    use serde::{Deserialize, Serialize};

    pub const SOCKET_PATH: &str = "/tmp/gossi-core.sock";

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ExecutionConfig {
        pub timeout_ms: u64,
        pub memory_limit_mb: u64,
    }

    impl Default for ExecutionConfig {
        fn default() -> Self {
            Self {
                timeout_ms: 5000,
                memory_limit_mb: 64,
            }
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct RunRequest {
        pub program: String,
        pub data: String,
        #[serde(default)]
        pub config: Option<ExecutionConfig>,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct RunResult {
        pub output: String,
        pub return_code: i32,
        pub execution_time_ms: u64,
        pub fuel_consumed: u64,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct DescribeResponse {
        pub programs: Vec<String>,
        pub sign: String,
        pub backend: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(tag = "type")]
    pub enum Command {
        Run(RunRequest),
        Describe,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(tag = "type")]
    pub enum Response {
        Run(Result<RunResult, String>),
        Describe(Result<DescribeResponse, String>),
        Error { message: String },
    }

}
