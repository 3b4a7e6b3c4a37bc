//! Integration test infrastructure: spawns minircd instances and drives
//! them with raw line clients.

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::{sleep, timeout};

/// The host string the test servers are configured with; every numeric
/// reply is prefixed with it.
pub const HOST: &str = "127.0.0.1";

/// Options for spawning a test server.
pub struct ServerOptions {
    pub bot_secret: Option<&'static str>,
    pub idle_limit_seconds: u64,
    pub check_interval_seconds: u64,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            bot_secret: Some("testsecret"),
            idle_limit_seconds: 60,
            check_interval_seconds: 10,
        }
    }
}

/// A minircd instance running as a child process.
pub struct TestServer {
    child: Child,
    port: u16,
    _dir: tempfile::TempDir,
}

impl TestServer {
    /// Spawn a server on the given port with default options.
    pub async fn spawn(port: u16) -> anyhow::Result<Self> {
        Self::spawn_with(port, ServerOptions::default()).await
    }

    /// Spawn a server on the given port.
    pub async fn spawn_with(port: u16, options: ServerOptions) -> anyhow::Result<Self> {
        let dir = tempfile::tempdir()?;
        let config_path = dir.path().join("config.toml");

        let mut config = format!(
            "[server]\nhost = \"{}\"\nport = {}\n\n[limits]\nidle_limit_seconds = {}\ncheck_interval_seconds = {}\n",
            HOST, port, options.idle_limit_seconds, options.check_interval_seconds
        );
        if let Some(secret) = options.bot_secret {
            config.push_str(&format!("\n[bot]\nsecret = \"{}\"\n", secret));
        }
        std::fs::write(&config_path, config)?;

        let binary = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("target/debug/minircd");
        let child = Command::new(&binary)
            .arg("-c")
            .arg(&config_path)
            .env("RUST_LOG", "warn")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        let server = Self {
            child,
            port,
            _dir: dir,
        };
        server.wait_until_ready().await?;
        Ok(server)
    }

    pub fn address(&self) -> String {
        format!("{}:{}", HOST, self.port)
    }

    async fn wait_until_ready(&self) -> anyhow::Result<()> {
        for _ in 0..100 {
            if TcpStream::connect(self.address()).await.is_ok() {
                return Ok(());
            }
            sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not start listening on {}", self.address())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// A raw line-oriented client.
pub struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl TestClient {
    pub async fn connect(address: &str) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(address).await?;
        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer: write_half,
        })
    }

    /// Send one CRLF-terminated line.
    pub async fn send_line(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\r\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Receive one line, terminator included.
    pub async fn recv_line(&mut self) -> anyhow::Result<String> {
        self.recv_line_timeout(Duration::from_secs(5)).await
    }

    pub async fn recv_line_timeout(&mut self, dur: Duration) -> anyhow::Result<String> {
        let mut line = String::new();
        let n = timeout(dur, self.reader.read_line(&mut line)).await??;
        if n == 0 {
            anyhow::bail!("connection closed");
        }
        Ok(line)
    }

    /// Assert the next line matches `expected` (CRLF appended).
    pub async fn expect(&mut self, expected: &str) -> anyhow::Result<()> {
        let line = self.recv_line().await?;
        assert_eq!(line, format!("{}\r\n", expected));
        Ok(())
    }

    /// Register with NICK + USER and consume the exact welcome triplet.
    pub async fn register(&mut self, nick: &str) -> anyhow::Result<()> {
        self.send_line(&format!("NICK {}", nick)).await?;
        self.send_line(&format!("USER {} 0 * :{}", nick, nick)).await?;
        self.expect(&format!(":{} 001 {} :Welcome to the IRC server!", HOST, nick))
            .await?;
        self.expect(&format!(":{} 002 {} :Your host is {}", HOST, nick, HOST))
            .await?;
        self.expect(&format!(":{} 004 {} {}", HOST, nick, HOST)).await?;
        Ok(())
    }

    /// Join a room and consume the JOIN echo plus the 353/366 pair, checking
    /// the name list as a set (member order is not stable).
    pub async fn join(&mut self, nick: &str, room: &str, expected_names: &[&str]) -> anyhow::Result<()> {
        self.send_line(&format!("JOIN {}", room)).await?;
        self.expect(&format!(":{} JOIN {}", nick, room)).await?;

        let names_line = self.recv_line().await?;
        let prefix = format!(":{} 353 {} = {} :", HOST, nick, room);
        assert!(
            names_line.starts_with(&prefix),
            "unexpected 353: {:?}",
            names_line
        );
        let mut got: Vec<&str> = names_line[prefix.len()..].trim_end().split(' ').collect();
        let mut want = expected_names.to_vec();
        got.sort_unstable();
        want.sort_unstable();
        assert_eq!(got, want);

        self.expect(&format!(":{} 366 {} {} :End of /NAMES list.", HOST, nick, room))
            .await?;
        Ok(())
    }
}
