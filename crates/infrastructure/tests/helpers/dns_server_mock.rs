#![allow(dead_code)]
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBehavior {
    /// NOERROR with one A record.
    Answer(Ipv4Addr),
    /// UDP replies carry TC and no data; TCP on the same port answers.
    TruncateThenTcp(Ipv4Addr),
    NxDomain,
    /// Reads queries and never replies.
    Silent,
    /// Replies with a datagram of exactly this many bytes carrying the query ID.
    Oversized(usize),
}

pub struct MockDnsServer {
    addr: SocketAddr,
    queries: Arc<AtomicUsize>,
    tasks: Vec<JoinHandle<()>>,
}

impl MockDnsServer {
    pub async fn start(behavior: MockBehavior) -> Result<Self, std::io::Error> {
        let socket = UdpSocket::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = socket.local_addr()?;
        let queries = Arc::new(AtomicUsize::new(0));
        let mut tasks = Vec::new();

        let counter = Arc::clone(&queries);
        tasks.push(tokio::spawn(async move {
            let mut buf = vec![0u8; 512];
            loop {
                let Ok((len, peer)) = socket.recv_from(&mut buf).await else {
                    break;
                };
                counter.fetch_add(1, Ordering::SeqCst);

                let response = match behavior {
                    MockBehavior::Answer(ip) => build_response(&buf[..len], Some(ip), 0, false),
                    MockBehavior::TruncateThenTcp(_) => build_response(&buf[..len], None, 0, true),
                    MockBehavior::NxDomain => build_response(&buf[..len], None, 3, false),
                    MockBehavior::Silent => None,
                    MockBehavior::Oversized(size) => oversized_reply(&buf[..len], size),
                };
                if let Some(response) = response {
                    let _ = socket.send_to(&response, peer).await;
                }
            }
        }));

        if let MockBehavior::TruncateThenTcp(ip) = behavior {
            let listener = TcpListener::bind(addr).await?;
            tasks.push(tokio::spawn(async move {
                while let Ok((mut stream, _)) = listener.accept().await {
                    let mut len_buf = [0u8; 2];
                    if stream.read_exact(&mut len_buf).await.is_err() {
                        continue;
                    }
                    let mut query = vec![0u8; u16::from_be_bytes(len_buf) as usize];
                    if stream.read_exact(&mut query).await.is_err() {
                        continue;
                    }
                    if let Some(response) = build_response(&query, Some(ip), 0, false) {
                        let _ = stream
                            .write_all(&(response.len() as u16).to_be_bytes())
                            .await;
                        let _ = stream.write_all(&response).await;
                    }
                }
            }));
        }

        Ok(Self {
            addr,
            queries,
            tasks,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// `udp://` endpoint string for this server.
    pub fn endpoint(&self) -> String {
        format!("udp://{}", self.addr)
    }

    pub fn udp_queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

fn oversized_reply(query: &[u8], size: usize) -> Option<Vec<u8>> {
    let mut reply = vec![0u8; size.max(2)];
    reply[..2].copy_from_slice(query.get(..2)?);
    Some(reply)
}

fn question_end(query: &[u8]) -> Option<usize> {
    let mut pos = 12;
    loop {
        let len = *query.get(pos)? as usize;
        pos += 1;
        if len == 0 {
            break;
        }
        pos += len;
    }
    let end = pos + 4;
    (end <= query.len()).then_some(end)
}

/// Echoes the question; the additional section (the OPT record) is dropped.
pub fn build_response(
    query: &[u8],
    answer: Option<Ipv4Addr>,
    rcode: u8,
    truncated: bool,
) -> Option<Vec<u8>> {
    if query.len() < 12 {
        return None;
    }
    let end = question_end(query)?;

    let mut response = Vec::with_capacity(512);
    response.extend_from_slice(&query[0..2]);
    response.push(if truncated { 0x83 } else { 0x81 });
    response.push(0x80 | (rcode & 0x0F));
    response.extend_from_slice(&[0x00, 0x01]);
    response.extend_from_slice(&[0x00, u8::from(answer.is_some())]);
    response.extend_from_slice(&[0x00, 0x00]);
    response.extend_from_slice(&[0x00, 0x00]);
    response.extend_from_slice(&query[12..end]);

    if let Some(ip) = answer {
        response.extend_from_slice(&[
            0xc0, 0x0c, // pointer to the question name
            0x00, 0x01, // A
            0x00, 0x01, // IN
            0x00, 0x00, 0x00, 0x3c, // TTL 60
            0x00, 0x04,
        ]);
        response.extend_from_slice(&ip.octets());
    }

    Some(response)
}
