//! A scripted `CalDAV` server on a loopback port.
//!
//! Each connection carries one request and is closed after the reply.
//! Requests without an `Authorization` header get 401.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// A canned reply for one method and path.
#[derive(Debug, Clone)]
pub struct MockRoute {
    pub method: &'static str,
    pub path: String,
    pub status: u16,
    pub body: String,
}

impl MockRoute {
    /// A 207 Multi-Status reply.
    #[must_use]
    pub fn multistatus(method: &'static str, path: &str, body: impl Into<String>) -> Self {
        Self {
            method,
            path: path.to_string(),
            status: 207,
            body: body.into(),
        }
    }
}

/// A request as received by the mock server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub depth: Option<String>,
    pub authorization: Option<String>,
    pub body: String,
}

pub struct MockCaldavServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    task: JoinHandle<()>,
}

impl MockCaldavServer {
    /// ## Summary
    /// Starts serving `routes` on an ephemeral loopback port.
    ///
    /// ## Errors
    /// Returns an error if the listener cannot be bound.
    pub async fn start(routes: Vec<MockRoute>) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let requests = Arc::new(Mutex::new(Vec::new()));
        let routes = Arc::new(routes);

        let recorded = Arc::clone(&requests);
        let task = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let routes = Arc::clone(&routes);
                let recorded = Arc::clone(&recorded);
                tokio::spawn(async move {
                    if let Err(e) = serve_connection(stream, &routes, &recorded).await {
                        tracing::warn!(error = %e, "Mock CalDAV connection failed");
                    }
                });
            }
        });

        Ok(Self {
            addr,
            requests,
            task,
        })
    }

    /// Base URL of the server, with a trailing slash.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Requests received so far, in arrival order.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Drop for MockCaldavServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

fn header_value(head: &str, name: &str) -> Option<String> {
    head.lines().skip(1).find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.trim()
            .eq_ignore_ascii_case(name)
            .then(|| value.trim().to_string())
    })
}

async fn read_request(stream: &mut TcpStream) -> std::io::Result<Option<RecordedRequest>> {
    let mut buf = Vec::new();
    let mut chunk = [0_u8; 4096];

    let (head_len, body_len) = loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(None);
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = find_header_end(&buf) {
            let head = String::from_utf8_lossy(&buf[..end]);
            let body_len = header_value(&head, "content-length")
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(0);
            break (end + 4, body_len);
        }
    };

    while buf.len() < head_len + body_len {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let head = String::from_utf8_lossy(&buf[..head_len - 4]).into_owned();
    let body_end = buf.len().min(head_len + body_len);
    let body = String::from_utf8_lossy(&buf[head_len..body_end]).into_owned();

    let mut request_line = head.lines().next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let path = request_line.next().unwrap_or_default().to_string();

    Ok(Some(RecordedRequest {
        method,
        path,
        depth: header_value(&head, "depth"),
        authorization: header_value(&head, "authorization"),
        body,
    }))
}

async fn serve_connection(
    mut stream: TcpStream,
    routes: &[MockRoute],
    recorded: &Mutex<Vec<RecordedRequest>>,
) -> std::io::Result<()> {
    let Some(request) = read_request(&mut stream).await? else {
        return Ok(());
    };

    let (status, body) = if request.authorization.is_none() {
        (401, String::new())
    } else {
        routes
            .iter()
            .find(|route| route.method == request.method && route.path == request.path)
            .map_or((404, String::new()), |route| (route.status, route.body.clone()))
    };

    recorded
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(request);

    let reason = match status {
        207 => "Multi-Status",
        401 => "Unauthorized",
        404 => "Not Found",
        _ => "OK",
    };
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: application/xml; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}
