//! Common test infrastructure for check-icinga integration tests.
//!
//! Provides:
//! - StubServer: a one-route HTTP server standing in for status.cgi
//! - TestProject: temp working directory with isolated environment and optional config
//! - Feed builders and output assertion helpers

#![allow(dead_code)]

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::process::{Command, Output};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use serde_json::{json, Value};

/// Canned response served for every request.
#[derive(Clone)]
struct StubResponse {
    status: u16,
    body: String,
    delay: Duration,
}

/// A local HTTP server that answers every request with the same response.
///
/// Request heads (request line + headers) are recorded for assertions.
pub struct StubServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    /// Serve `body` as a 200 JSON response.
    pub fn json(body: Value) -> Self {
        Self::start(StubResponse {
            status: 200,
            body: body.to_string(),
            delay: Duration::ZERO,
        })
    }

    /// Serve `body` with an arbitrary status code.
    pub fn with_status(status: u16, body: &str) -> Self {
        Self::start(StubResponse {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
        })
    }

    /// Wait `delay` before answering with an empty host feed.
    pub fn slow(delay: Duration) -> Self {
        Self::start(StubResponse {
            status: 200,
            body: host_feed(vec![]).to_string(),
            delay,
        })
    }

    fn start(response: StubResponse) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind stub server");
        let addr = listener.local_addr().expect("Failed to read stub address");
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                let response = response.clone();
                let recorded = Arc::clone(&recorded);
                thread::spawn(move || handle(stream, &response, &recorded));
            }
        });

        Self {
            base_url: format!("http://{}", addr),
            requests,
        }
    }

    /// Recorded request heads, oldest first.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

fn handle(stream: TcpStream, response: &StubResponse, recorded: &Mutex<Vec<String>>) {
    let head = {
        let mut reader = BufReader::new(&stream);
        let mut head = String::new();
        loop {
            let mut line = String::new();
            match reader.read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) if line == "\r\n" => break,
                Ok(_) => head.push_str(&line),
            }
        }
        head
    };
    recorded.lock().unwrap().push(head);

    thread::sleep(response.delay);

    let reason = match response.status {
        200 => "OK",
        401 => "Unauthorized",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Status",
    };
    let reply = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        response.status,
        reason,
        response.body.len(),
        response.body
    );
    // The client may already have given up (timeout tests).
    let mut writer = &stream;
    let _ = writer.write_all(reply.as_bytes());
    let _ = writer.flush();
}

/// A port nothing listens on.
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

// =============================================================================
// Feed builders
// =============================================================================

pub fn host(name: &str, status: &str, attempts: &str) -> Value {
    json!({
        "host": name,
        "status": status,
        "last_check": "01-25-2012 17:15:22",
        "duration": "9d  8h 18m 50s",
        "attempts": attempts,
        "status_information": "PING OK - Packet loss = 0%, RTA = 0.44 ms"
    })
}

pub fn service(host: &str, service: &str, status: &str, attempts: &str) -> Value {
    json!({
        "host": host,
        "service": service,
        "status": status,
        "last_check": "01-25-2012 18:05:30",
        "duration": "15d 19h 55m  1s",
        "attempts": attempts,
        "status_information": "HTTP OK"
    })
}

pub fn host_feed(hosts: Vec<Value>) -> Value {
    json!({"cgi_json_version": "1.5.0", "status": {"host_status": hosts}})
}

pub fn service_feed(services: Vec<Value>) -> Value {
    json!({"cgi_json_version": "1.7.1", "status": {"service_status": services}})
}

// =============================================================================
// Running the binary
// =============================================================================

/// Isolated working directory for one invocation (no stray config or .env).
pub struct TestProject {
    pub dir: tempfile::TempDir,
    env: Vec<(String, String)>,
}

impl TestProject {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
            env: Vec::new(),
        }
    }

    /// Write check-icinga.toml into the project directory.
    pub fn with_config(self, contents: &str) -> Self {
        self.write_file("check-icinga.toml", contents);
        self
    }

    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.push((key.to_string(), value.to_string()));
        self
    }

    pub fn write_file(&self, relative: &str, contents: &str) {
        std::fs::write(self.dir.path().join(relative), contents)
            .expect("Failed to write project file");
    }

    pub fn path(&self, relative: &str) -> std::path::PathBuf {
        self.dir.path().join(relative)
    }

    /// Run check-icinga with isolated environment
    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_check-icinga"))
            .args(args)
            .current_dir(self.dir.path())
            .env_clear()
            .env("HOME", self.dir.path())
            .env("PATH", std::env::var("PATH").unwrap_or_default())
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .output()
            .expect("Failed to execute check-icinga")
    }

    /// Run and assert a specific exit code
    pub fn run_expect(&self, args: &[&str], expected_code: i32) -> Output {
        let output = self.run(args);
        assert_eq!(
            output.status.code(),
            Some(expected_code),
            "check-icinga {:?} expected exit {} but got {:?}:\nstdout: {}\nstderr: {}",
            args,
            expected_code,
            output.status.code(),
            stdout(&output),
            stderr(&output)
        );
        output
    }
}

/// Run check-icinga in a fresh isolated project.
pub fn run(args: &[&str]) -> Output {
    TestProject::new().run(args)
}

/// Run check-icinga in a fresh isolated project and assert the exit code.
pub fn run_expect(args: &[&str], expected_code: i32) -> Output {
    TestProject::new().run_expect(args, expected_code)
}

// =============================================================================
// Output helpers
// =============================================================================

pub fn parse_json(output: &Output) -> Value {
    let out = stdout(output);
    serde_json::from_str(&out).unwrap_or_else(|e| panic!("Invalid JSON: {}\n{}", e, out))
}

pub fn assert_stdout_contains(output: &Output, expected: &str) {
    let out = stdout(output);
    assert!(
        out.contains(expected),
        "Expected stdout to contain '{}', got:\n{}\nstderr:\n{}",
        expected,
        out,
        stderr(output)
    );
}

pub fn assert_stderr_contains(output: &Output, expected: &str) {
    let err = stderr(output);
    assert!(
        err.contains(expected),
        "Expected stderr to contain '{}', got:\n{}",
        expected,
        err
    );
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}
