use crate::descriptor::DeviceDescriptor;
use crate::error::Result;
use crate::stream::DiscoveryStream;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::time::{timeout_at, Instant};

/// SSDP multicast group and port
pub const SSDP_MULTICAST_ADDR: SocketAddrV4 =
    SocketAddrV4::new(Ipv4Addr::new(239, 255, 255, 250), 1900);

/// Search target sent in the M-SEARCH request
pub const SEARCH_TARGET: &str = "ssdp:all";

/// How long [`Discovery`] listens by default
pub const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(2);

/// Descriptors buffered before the listener waits on the consumer
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

const MAX_DATAGRAM_SIZE: usize = 1500;

/// Build the SSDP search request
pub fn search_request() -> String {
    format!(
        "M-SEARCH * HTTP/1.1\r\n\
         HOST: {SSDP_MULTICAST_ADDR}\r\n\
         MAN: \"ssdp:discover\"\r\n\
         ST: {SEARCH_TARGET}\r\n\
         MX: 10\r\n\
         \r\n"
    )
}

/// Time-boxed SSDP search for thermostats
///
/// Each call to [`Discovery::start`] binds its own ephemeral socket, sends
/// one search request and listens until the timeout elapses. Runs are
/// independent and may overlap.
///
/// The result queue is bounded. While it is full the listener waits for the
/// consumer and does not read the socket, so responses arriving during the
/// stall may be dropped by the OS. The wait never outlives the deadline:
/// a descriptor still undelivered at the deadline is discarded and the
/// stream ends.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use venstar::Discovery;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut found = Discovery::new()
///         .timeout(Duration::from_secs(3))
///         .start()
///         .await?;
///
///     while let Some(device) = found.recv().await {
///         println!("Found thermostat: {}", device);
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Discovery {
    timeout: Duration,
    capacity: usize,
    search_addr: SocketAddr,
}

impl Discovery {
    /// Discovery with the default timeout and queue capacity
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_DISCOVERY_TIMEOUT,
            capacity: DEFAULT_QUEUE_CAPACITY,
            search_addr: SocketAddr::V4(SSDP_MULTICAST_ADDR),
        }
    }

    /// Set how long to listen for responses
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the result queue capacity (at least one)
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Send the search request somewhere other than the SSDP multicast group
    pub fn search_addr(mut self, addr: SocketAddr) -> Self {
        self.search_addr = addr;
        self
    }

    /// Send the search request and start listening in the background
    ///
    /// Failing to bind the socket or send the request is reported here;
    /// anything that goes wrong afterwards only ends the stream.
    pub async fn start(&self) -> Result<DiscoveryStream> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?;
        let deadline = Instant::now() + self.timeout;

        socket
            .send_to(search_request().as_bytes(), self.search_addr)
            .await?;
        tracing::info!(
            "Sent discovery request to {}, listening for {:?}",
            self.search_addr,
            self.timeout
        );

        let (tx, rx) = mpsc::channel(self.capacity);
        tokio::spawn(listen(socket, deadline, tx));

        Ok(DiscoveryStream::new(rx))
    }
}

impl Default for Discovery {
    fn default() -> Self {
        Self::new()
    }
}

/// Search for thermostats for `timeout`
pub async fn discover(timeout: Duration) -> Result<DiscoveryStream> {
    Discovery::new().timeout(timeout).start().await
}

/// Read responses until the deadline, forwarding thermostats to `tx`
async fn listen(socket: UdpSocket, deadline: Instant, tx: mpsc::Sender<DeviceDescriptor>) {
    let mut buf = [0u8; MAX_DATAGRAM_SIZE];

    loop {
        let (len, from) = match timeout_at(deadline, socket.recv_from(&mut buf)).await {
            Ok(Ok(received)) => received,
            Ok(Err(e)) => {
                tracing::error!("Discovery listener read error: {}", e);
                break;
            }
            Err(_) => {
                tracing::debug!("Discovery deadline reached");
                break;
            }
        };

        // the buffer is reused for the next read
        let payload = buf[..len].to_vec();

        let device = match DeviceDescriptor::parse(&payload) {
            Ok(Some(device)) => device,
            Ok(None) => {
                tracing::trace!("Ignoring non-thermostat response from {}", from);
                continue;
            }
            Err(e) => {
                tracing::warn!("Failed to parse discovery response from {}: {}", from, e);
                continue;
            }
        };

        tracing::info!("Found thermostat {} (from {})", device, from);

        match timeout_at(deadline, tx.send(device)).await {
            Ok(Ok(())) => {}
            Ok(Err(_)) => {
                tracing::debug!("Discovery stream dropped, stopping listener");
                break;
            }
            Err(_) => {
                tracing::warn!("Discovery deadline reached while the consumer was stalled");
                break;
            }
        }
    }

    tracing::info!("Discovery finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    fn response(name: &str, host: &str) -> String {
        format!(
            "HTTP/1.1 200 OK\r\n\
             ST: venstar:thermostat:ecp\r\n\
             Location: http://{host}/\r\n\
             USN: ecp:00:23:a7:3a:b2:72:name:{name}:type:residential\r\n\
             \r\n"
        )
    }

    async fn spawn_listener(
        timeout: Duration,
        capacity: usize,
    ) -> (SocketAddr, DiscoveryStream, UdpSocket) {
        let listener = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel(capacity);
        tokio::spawn(listen(listener, Instant::now() + timeout, tx));

        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        (addr, DiscoveryStream::new(rx), sender)
    }

    #[test]
    fn search_request_lines() {
        let req = search_request();
        assert!(req.starts_with("M-SEARCH * HTTP/1.1\r\n"));
        assert!(req.contains("HOST: 239.255.255.250:1900\r\n"));
        assert!(req.contains("MAN: \"ssdp:discover\"\r\n"));
        assert!(req.contains("ST: ssdp:all\r\n"));
        assert!(req.contains("MX: 10\r\n"));
        assert!(req.ends_with("\r\n\r\n"));
    }

    #[test]
    fn capacity_is_at_least_one() {
        assert_eq!(Discovery::new().capacity(0).capacity, 1);
    }

    #[tokio::test]
    async fn forwards_thermostats_and_skips_the_rest() {
        let (addr, stream, sender) = spawn_listener(Duration::from_millis(400), 10).await;

        let other = "HTTP/1.1 200 OK\r\nST: upnp:rootdevice\r\nLocation: http://10.0.0.9/\r\n\r\n";
        sender.send_to(response("Den", "10.0.0.2").as_bytes(), addr).await.unwrap();
        sender.send_to(other.as_bytes(), addr).await.unwrap();
        sender.send_to(b"\x00\x01garbage", addr).await.unwrap();
        sender.send_to(response("Office", "10.0.0.3").as_bytes(), addr).await.unwrap();

        let names: Vec<String> = stream.map(|d| d.name).collect().await;
        assert_eq!(names, ["Den", "Office"]);
    }

    #[tokio::test]
    async fn stream_ends_at_deadline() {
        let timeout = Duration::from_millis(200);
        let started = std::time::Instant::now();
        let (_addr, stream, _sender) = spawn_listener(timeout, 10).await;

        assert!(stream.collect_all().await.is_empty());

        let elapsed = started.elapsed();
        assert!(elapsed >= timeout);
        assert!(elapsed < timeout + Duration::from_secs(1));
    }

    #[tokio::test]
    async fn stalled_consumer_gets_nothing_after_deadline() {
        let timeout = Duration::from_millis(300);
        let (addr, stream, sender) = spawn_listener(timeout, 1).await;

        for name in ["A", "B", "C"] {
            sender.send_to(response(name, "10.0.0.4").as_bytes(), addr).await.unwrap();
        }

        // one descriptor fits in the queue; the listener gives up on the
        // second once the deadline passes
        tokio::time::sleep(timeout + Duration::from_millis(200)).await;
        let names: Vec<String> = stream.collect_all().await.into_iter().map(|d| d.name).collect();
        assert_eq!(names, ["A"]);
    }

    #[tokio::test]
    async fn start_sends_search_and_streams_replies() {
        let responder = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let responder_addr = responder.local_addr().unwrap();

        let found = Discovery::new()
            .timeout(Duration::from_millis(500))
            .search_addr(responder_addr)
            .start()
            .await
            .unwrap();

        let mut buf = [0u8; MAX_DATAGRAM_SIZE];
        let (len, from) = responder.recv_from(&mut buf).await.unwrap();
        let request = String::from_utf8_lossy(&buf[..len]).into_owned();
        assert!(request.starts_with("M-SEARCH"));

        // the discovery socket is bound to the wildcard address
        let reply_to = SocketAddr::from(([127, 0, 0, 1], from.port()));
        responder
            .send_to(response("Kitchen", "10.0.0.7").as_bytes(), reply_to)
            .await
            .unwrap();

        let devices = found.collect_all().await;
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].name, "Kitchen");
        assert_eq!(devices[0].base_url.as_str(), "http://10.0.0.7/");
    }

    /// Answer the first search request with one thermostat response
    async fn respond_once(name: &'static str, host: &'static str) -> SocketAddr {
        let responder = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = responder.local_addr().unwrap();

        tokio::spawn(async move {
            let mut buf = [0u8; MAX_DATAGRAM_SIZE];
            let (_, from) = responder.recv_from(&mut buf).await.unwrap();
            let reply_to = SocketAddr::from(([127, 0, 0, 1], from.port()));
            responder
                .send_to(response(name, host).as_bytes(), reply_to)
                .await
                .unwrap();
        });

        addr
    }

    #[tokio::test]
    async fn overlapping_runs_are_independent() {
        let timeout = Duration::from_millis(500);
        let first_addr = respond_once("Den", "10.0.0.2").await;
        let second_addr = respond_once("Office", "10.0.0.3").await;

        let first = Discovery::new().timeout(timeout).search_addr(first_addr);
        let second = Discovery::new().timeout(timeout).search_addr(second_addr);
        let (first, second) = tokio::join!(first.start(), second.start());

        let started = std::time::Instant::now();
        let (first, second) = tokio::join!(
            first.unwrap().collect_all(),
            second.unwrap().collect_all()
        );

        let names = |found: Vec<DeviceDescriptor>| -> Vec<String> {
            found.into_iter().map(|d| d.name).collect()
        };
        assert_eq!(names(first), ["Den"]);
        assert_eq!(names(second), ["Office"]);

        // both streams closed at their own deadline
        assert!(started.elapsed() < timeout + Duration::from_secs(1));
    }
}
