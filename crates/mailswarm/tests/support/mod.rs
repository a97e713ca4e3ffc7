//! Scripted mock SMTP and POP3 servers for exercising real client runs.
#![allow(dead_code)] // Test utility module - not all helpers used in every test
#![allow(clippy::unwrap_used)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use mailswarm_proto::Endpoint;

/// Connection and request counters, optionally shared by several servers.
#[derive(Debug, Default)]
pub struct ServerStats {
    /// Connections accepted.
    pub connections: AtomicUsize,
    /// Connections accepted and not yet closed.
    pub active: AtomicUsize,
    /// Highest value `active` reached.
    pub peak: AtomicUsize,
    /// Complete client requests answered.
    pub requests: AtomicUsize,
    /// Connections the client closed (end-of-stream seen by the server).
    pub client_closes: AtomicUsize,
    /// Client closes that came after a `QUIT` was answered.
    pub closes_after_quit: AtomicUsize,
}

impl ServerStats {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    pub fn client_closes(&self) -> usize {
        self.client_closes.load(Ordering::SeqCst)
    }

    pub fn closes_after_quit(&self) -> usize {
        self.closes_after_quit.load(Ordering::SeqCst)
    }

    /// Waits up to five seconds for `expected` client closes and returns
    /// the count seen.
    pub async fn wait_for_client_closes(&self, expected: usize) -> usize {
        let _ = tokio::time::timeout(Duration::from_secs(5), async {
            while self.client_closes() < expected {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;
        self.client_closes()
    }
}

/// Reply logic for one connection.
type Handler = Box<dyn FnMut(&str) -> Vec<u8> + Send>;
/// Builds a fresh handler for each accepted connection.
type Responder = Arc<dyn Fn() -> Handler + Send + Sync>;

/// A loopback server that greets, then answers each request line.
///
/// After a `DATA` command the server collects body lines until a lone `.`
/// and answers the body as one request named `<message>`.
pub struct MockServer {
    addr: SocketAddr,
    stats: Arc<ServerStats>,
    task: JoinHandle<()>,
}

impl MockServer {
    pub async fn start(
        greeting: &'static [u8],
        respond: Responder,
        hold: Duration,
        stats: Arc<ServerStats>,
    ) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server_stats = Arc::clone(&stats);

        let task = tokio::spawn(async move {
            loop {
                let Ok((socket, _)) = listener.accept().await else {
                    break;
                };
                let stats = Arc::clone(&server_stats);
                let handler = respond();
                stats.connections.fetch_add(1, Ordering::SeqCst);
                let now = stats.active.fetch_add(1, Ordering::SeqCst) + 1;
                stats.peak.fetch_max(now, Ordering::SeqCst);
                tokio::spawn(async move {
                    serve(socket, greeting, handler, hold, &stats).await;
                    stats.active.fetch_sub(1, Ordering::SeqCst);
                });
            }
        });

        Self { addr, stats, task }
    }

    /// SMTP server: `220 ready`, `250 ok`, `354 go`, `250 queued`, `221 bye`.
    pub async fn smtp(hold: Duration, stats: Arc<ServerStats>) -> Self {
        let respond: Responder = Arc::new(|| {
            Box::new(|request: &str| {
                let reply: &[u8] = match request {
                    "DATA" => b"354 go\r\n",
                    "<message>" => b"250 queued\r\n",
                    "QUIT" => b"221 bye\r\n",
                    _ => b"250 ok\r\n",
                };
                reply.to_vec()
            }) as Handler
        });
        Self::start(b"220 ready\r\n", respond, hold, stats).await
    }

    /// POP3 server answering LIST and RETR with the given bodies.
    pub async fn pop3(
        list: &'static [u8],
        retr: &'static [u8],
        hold: Duration,
        stats: Arc<ServerStats>,
    ) -> Self {
        let respond: Responder = Arc::new(move || {
            Box::new(move |request: &str| match request {
                "LIST" => list.to_vec(),
                "RETR 1" => retr.to_vec(),
                _ => b"+OK\r\n".to_vec(),
            }) as Handler
        });
        Self::start(b"+OK\r\n", respond, hold, stats).await
    }

    /// POP3 server with AUTHORIZATION and TRANSACTION states serving a fixed
    /// mailbox of `(id, content)` messages.
    ///
    /// Replies use bare `\n` line endings. `LIST` has no status line and
    /// a missing message gets `-ERR No such message` with no terminator.
    pub async fn pop3_mailbox(
        mailbox: &'static [(u64, &'static str)],
        stats: Arc<ServerStats>,
    ) -> Self {
        let respond: Responder = Arc::new(move || {
            let mut authorized = false;
            Box::new(move |request: &str| {
                mailbox_reply(mailbox, &mut authorized, request).into_bytes()
            }) as Handler
        });
        Self::start(
            b"+OK mail.example.com POP3 server ready\n",
            respond,
            Duration::ZERO,
            stats,
        )
        .await
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new("127.0.0.1", self.addr.port())
    }

    pub fn stats(&self) -> &ServerStats {
        &self.stats
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn mailbox_reply(mailbox: &[(u64, &str)], authorized: &mut bool, request: &str) -> String {
    let (command, arg) = request.split_once(' ').unwrap_or((request, ""));
    let message = |arg: &str| {
        let id = arg.parse::<u64>().ok()?;
        mailbox.iter().find(|(msg_id, _)| *msg_id == id)
    };

    match (command.to_ascii_uppercase().as_str(), *authorized) {
        ("QUIT", _) => "+OK Goodbye\n".to_string(),
        ("USER", false) if !arg.is_empty() => "+OK User accepted\n".to_string(),
        ("PASS", false) if !arg.is_empty() => {
            *authorized = true;
            "+OK Mailbox locked and ready\n".to_string()
        }
        (_, false) => "-ERR Command not allowed in AUTHORIZATION\n".to_string(),
        ("LIST", true) if arg.is_empty() => {
            let mut reply: String = mailbox
                .iter()
                .map(|(id, content)| format!("{id} {}\n", content.len()))
                .collect();
            reply.push_str(".\n");
            reply
        }
        ("RETR", true) => match message(arg) {
            Some((_, content)) => format!("+OK {} octets\n{content}\n.\n", content.len()),
            None => "-ERR No such message\n".to_string(),
        },
        ("NOOP", true) => "+OK\n".to_string(),
        _ => "-ERR Unknown command\n".to_string(),
    }
}

/// Answers requests until the client closes or the connection breaks.
async fn serve(
    socket: TcpStream,
    greeting: &[u8],
    mut handler: Handler,
    hold: Duration,
    stats: &ServerStats,
) {
    let (read_half, mut write_half) = socket.into_split();
    let mut reader = BufReader::new(read_half);
    let mut in_data = false;
    let mut quit_answered = false;

    if write_half.write_all(greeting).await.is_err() {
        return;
    }

    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => {
                stats.client_closes.fetch_add(1, Ordering::SeqCst);
                if quit_answered {
                    stats.closes_after_quit.fetch_add(1, Ordering::SeqCst);
                }
                break;
            }
            Err(_) => break,
            Ok(_) => {}
        }

        let request = if in_data {
            if line.trim_end() != "." {
                continue;
            }
            in_data = false;
            "<message>".to_string()
        } else {
            line.trim_end().to_string()
        };
        if request == "DATA" {
            in_data = true;
        }

        if !hold.is_zero() {
            tokio::time::sleep(hold).await;
        }
        stats.requests.fetch_add(1, Ordering::SeqCst);

        if write_half.write_all(&handler(request.as_str())).await.is_err() {
            break;
        }
        quit_answered |= request.eq_ignore_ascii_case("QUIT");
    }
}

/// Returns an endpoint on which nothing is listening.
pub async fn refused_endpoint() -> Endpoint {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    Endpoint::new("127.0.0.1", port)
}
