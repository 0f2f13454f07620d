use anyhow::Result;
use gossi_client::SocketClient;
use gossi_core::{Backend, Executor, GuestModule, Server, SocketServer};
use gossi_shared::*;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use wasmtime::{Config, Engine};

/// Stand-in guest speaking the plugin ABI: emits the data, then the sign.
const ECHO_GUEST: &str = r#"
    (module
      (import "host" "log" (func $log (param i32 i32)))
      (import "host" "emit" (func $emit (param i32 i32)))
      (memory (export "memory") 1)
      (data (i32.const 16) " by gossi")
      (func (export "input_ptr") (result i32) i32.const 1024)
      (func (export "input_capacity") (result i32) i32.const 4096)
      (func (export "run") (param i32 i32 i32 i32) (result i32)
        (call $emit (local.get 2) (local.get 3))
        (call $emit (i32.const 16) (i32.const 9))
        i32.const 0))
"#;

static NEXT_SOCKET: AtomicUsize = AtomicUsize::new(0);

fn socket_path() -> PathBuf {
    let n = NEXT_SOCKET.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!("gossi-test-{}-{}.sock", std::process::id(), n))
}

async fn start_server(backend: Backend) -> Result<(Arc<SocketServer>, PathBuf)> {
    let path = socket_path();
    let socket_server = Arc::new(SocketServer::new(Server::new(backend), &path));
    let listener = socket_server.bind()?;
    let serving = Arc::clone(&socket_server);
    tokio::spawn(async move {
        let _ = serving.serve(listener).await;
    });
    Ok((socket_server, path))
}

async fn create_client(path: &PathBuf) -> Result<SocketClient> {
    for _ in 0..10 {
        match SocketClient::connect_to(path).await {
            Ok(client) => return Ok(client),
            Err(_) => sleep(Duration::from_millis(50)).await,
        }
    }
    Err(anyhow::anyhow!("Failed to connect to server"))
}

fn engine() -> Result<Engine> {
    let mut config = Config::new();
    config.async_support(true);
    config.consume_fuel(true);
    Ok(Engine::new(&config)?)
}

fn wasm_backend(wat: &str) -> Result<Backend> {
    let guest = GuestModule::from_bytes(engine()?, wat.as_bytes(), "echo-guest.wat")?;
    Ok(Backend::Wasm(Executor::new(Arc::new(guest))))
}

/// The built `plugin-gossi` guest, if one is around.
///
/// Build with `cargo build -p plugin-gossi --target wasm32-unknown-unknown --release`
/// or point `GOSSI_GUEST_WASM` at a copy.
fn built_guest() -> Option<PathBuf> {
    let workspace = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("..");
    let candidates = [
        std::env::var_os("GOSSI_GUEST_WASM").map(PathBuf::from),
        Some(workspace.join("plugins/gossi.wasm")),
        Some(workspace.join("target/wasm32-unknown-unknown/release/plugin_gossi.wasm")),
        Some(workspace.join("target/wasm32-unknown-unknown/debug/plugin_gossi.wasm")),
    ];
    candidates.into_iter().flatten().find(|path| path.is_file())
}

#[tokio::test]
async fn test_native_scenarios_over_socket() -> Result<()> {
    let (_server, path) = start_server(Backend::Native).await?;
    let mut client = create_client(&path).await?;

    let cases = [
        ("echo", "hello", "hello by gossi"),
        ("uppercase", "hello", "HELLO by gossi"),
        ("lowercase", "HELLO", "hello by gossi"),
        ("reverse", "hello", " by gossi"),
        ("echo", "", " by gossi"),
        ("Echo", "hi", " by gossi"),
    ];
    for (program, data, expected) in cases {
        let result = client
            .run(program.to_string(), data.to_string(), None)
            .await?;
        assert_eq!(result.output, expected, "run({:?}, {:?})", program, data);
        assert_eq!(result.return_code, plugin_helpers::SUCCESS);
    }

    Ok(())
}

#[tokio::test]
async fn test_sign_is_reapplied() -> Result<()> {
    let (_server, path) = start_server(Backend::Native).await?;
    let mut client = create_client(&path).await?;

    let once = client.run("echo".into(), "x".into(), None).await?.output;
    let twice = client.run("echo".into(), once.clone(), None).await?.output;
    assert_eq!(twice, "x by gossi by gossi");
    assert_ne!(once, twice);

    Ok(())
}

#[tokio::test]
async fn test_describe() -> Result<()> {
    let (_server, path) = start_server(Backend::Native).await?;
    let mut client = create_client(&path).await?;

    let description = client.describe().await?;
    assert_eq!(description.backend, "native");
    assert_eq!(description.sign, SIGN);
    assert_eq!(description.programs.len(), 3);

    Ok(())
}

#[tokio::test]
async fn test_malformed_line_keeps_connection() -> Result<()> {
    let (_server, path) = start_server(Backend::Native).await?;
    let mut client = create_client(&path).await?;

    let response = client.send_line("not json".to_string()).await?;
    match response {
        Response::Error { message } => assert!(message.contains("Invalid command")),
        other => panic!("unexpected response: {:?}", other),
    }

    let result = client.run("echo".into(), "still here".into(), None).await?;
    assert_eq!(result.output, "still here by gossi");

    Ok(())
}

#[tokio::test]
async fn test_wasm_backend_matches_native() -> Result<()> {
    let (_wasm, wasm_path) = start_server(wasm_backend(ECHO_GUEST)?).await?;
    let (_native, native_path) = start_server(Backend::Native).await?;
    let mut wasm_client = create_client(&wasm_path).await?;
    let mut native_client = create_client(&native_path).await?;

    for data in ["hello", "", "Grüße"] {
        let from_guest = wasm_client.run("echo".into(), data.into(), None).await?;
        let from_native = native_client.run("echo".into(), data.into(), None).await?;
        assert_eq!(from_guest.output, from_native.output);
        assert!(from_guest.fuel_consumed > 0);
    }

    Ok(())
}

#[tokio::test]
async fn test_wasm_backend_rejects_oversized_input() -> Result<()> {
    let (_server, path) = start_server(wasm_backend(ECHO_GUEST)?).await?;
    let mut client = create_client(&path).await?;

    let err = client
        .run("echo".into(), "x".repeat(8192), None)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Input too large"), "{}", err);

    let result = client.run("echo".into(), "ok".into(), None).await?;
    assert_eq!(result.output, "ok by gossi");

    Ok(())
}

#[tokio::test]
async fn test_built_guest_matches_native() -> Result<()> {
    let Some(wasm_path) = built_guest() else {
        println!("Skipping: plugin-gossi has not been built for wasm32");
        return Ok(());
    };
    let guest = GuestModule::load(engine()?, &wasm_path).await?;
    let (_wasm, guest_socket) = start_server(Backend::Wasm(Executor::new(guest))).await?;
    let (_native, native_socket) = start_server(Backend::Native).await?;
    let mut guest_client = create_client(&guest_socket).await?;
    let mut native_client = create_client(&native_socket).await?;

    // Multi-byte chars straddle the guest's 128-byte output chunks.
    let long_text = "Grüße aus Köln, ÆØÅ straße ñandú éèê ".repeat(12);
    assert!(long_text.len() > 128);

    let cases = [
        ("echo", "hello", Some("hello by gossi")),
        ("uppercase", "hello", Some("HELLO by gossi")),
        ("lowercase", "HELLO", Some("hello by gossi")),
        ("reverse", "hello", Some(" by gossi")),
        ("echo", "", Some(" by gossi")),
        ("Echo", "hi", Some(" by gossi")),
        ("echo", long_text.as_str(), None),
        ("uppercase", long_text.as_str(), None),
        ("lowercase", long_text.as_str(), None),
    ];
    for (program, data, expected) in cases {
        let from_guest = guest_client
            .run(program.to_string(), data.to_string(), None)
            .await?;
        let from_native = native_client
            .run(program.to_string(), data.to_string(), None)
            .await?;
        assert_eq!(
            from_guest.output, from_native.output,
            "run({:?}, {} bytes)",
            program,
            data.len()
        );
        if let Some(expected) = expected {
            assert_eq!(from_guest.output, expected);
        }
    }

    Ok(())
}
