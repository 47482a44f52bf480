//! Test server management utilities
//!
//! `TestServer` runs the `pshs` binary with its working directory set to a
//! fresh temporary directory, so relative file arguments resolve there.

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::Duration;

use reqwest::Client;
use tempfile::TempDir;
use tokio::time::{sleep, timeout};

use super::network::NetworkTestHelper;

/// Global port counter to avoid port conflicts in parallel tests
static PORT_COUNTER: AtomicU16 = AtomicU16::new(3100);

const START_ATTEMPTS: usize = 3;

pub struct TestServer {
    pub process: Child,
    pub port: u16,
    pub base_url: String,
    pub temp_dir: TempDir,
}

impl TestServer {
    /// Write `files` into a temporary directory and share all of them.
    pub async fn start(
        files: &[(&str, &str)],
        extra_args: &[&str],
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let (temp_dir, args) = prepare(files, extra_args)?;
        Self::spawn(temp_dir, args, "http").await
    }

    /// Like `start`, over HTTPS. `extra_args` must enable TLS.
    pub async fn start_https(
        files: &[(&str, &str)],
        extra_args: &[&str],
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let (temp_dir, args) = prepare(files, extra_args)?;
        Self::spawn(temp_dir, args, "https").await
    }

    async fn spawn(
        temp_dir: TempDir,
        args: Vec<String>,
        scheme: &str,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let mut last_error: Box<dyn std::error::Error> = "server was never started".into();

        // Another suite may grab the port between the scan and the bind.
        for _ in 0..START_ATTEMPTS {
            let port = get_available_port().await?;
            let mut process = Command::new(env!("CARGO_BIN_EXE_pshs"))
                .current_dir(temp_dir.path())
                .args(["--bind", "127.0.0.1", "--port", &port.to_string(), "-T"])
                .args(&args)
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()?;

            let base_url = format!("{}://127.0.0.1:{}", scheme, port);
            match wait_for_server_ready(&base_url, &mut process).await {
                Ok(()) => {
                    return Ok(TestServer {
                        process,
                        port,
                        base_url,
                        temp_dir,
                    })
                }
                Err(e) => {
                    let _ = process.kill();
                    let _ = process.wait();
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    pub fn url(&self) -> &str {
        &self.base_url
    }

    /// Get a URL for a specific path
    pub fn url_for(&self, path: &str) -> String {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };
        format!("{}{}", self.base_url, path)
    }

    /// Location of a shared file on disk
    pub fn file_path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    pub fn stop(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.process.kill()?;
        self.process.wait()?;
        Ok(())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

fn prepare(
    files: &[(&str, &str)],
    extra_args: &[&str],
) -> Result<(TempDir, Vec<String>), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    for (name, content) in files {
        let path = temp_dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
    }

    let mut args: Vec<String> = extra_args.iter().map(|arg| arg.to_string()).collect();
    args.extend(files.iter().map(|(name, _)| name.to_string()));
    Ok((temp_dir, args))
}

async fn get_available_port() -> Result<u16, Box<dyn std::error::Error>> {
    let start_port = PORT_COUNTER.fetch_add(1, Ordering::SeqCst);
    NetworkTestHelper::get_available_port_from(start_port).await
}

/// Poll until the server answers anything at all, or its process exits.
async fn wait_for_server_ready(
    base_url: &str,
    process: &mut Child,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = Client::builder()
        .danger_accept_invalid_certs(true)
        .timeout(Duration::from_secs(5))
        .build()?;
    let max_attempts = 50;
    let delay = Duration::from_millis(100);

    for _ in 0..max_attempts {
        if let Some(status) = process.try_wait()? {
            return Err(format!("Server exited early with {}", status).into());
        }
        match timeout(Duration::from_secs(5), client.get(base_url).send()).await {
            Ok(Ok(_)) => return Ok(()),
            _ => sleep(delay).await,
        }
    }

    Err(format!("Server at {} did not become ready in time", base_url).into())
}
