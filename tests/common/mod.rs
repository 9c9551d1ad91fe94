//! In-process stand-in for a thermostat's HTTP API
//!
//! Serves canned JSON for the query endpoints, acknowledges posts, and
//! records every request so tests can check what reached the device.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use url::Url;
use venstar::Thermostat;

pub const INFO_COOL: &str = r#"{"name":"DEN","mode":2,"state":0,"activestage":0,"fan":0,
"fanstate":0,"tempunits":0,"schedule":1,"schedulepart":1,"away":0,"holiday":0,"override":0,
"overridetime":0,"forceunocc":0,"spacetemp":74.0,"heattemp":66.0,"cooltemp":78.0,
"cooltempmin":35.0,"cooltempmax":99.0,"heattempmin":35.0,"heattempmax":99.0,
"setpointdelta":2,"hum":40,"hum_setpoint":35,"dehum_setpoint":55,"availablemodes":0}"#;

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub body: String,
}

impl Recorded {
    /// Decoded form body
    pub fn form(&self) -> BTreeMap<String, String> {
        url::form_urlencoded::parse(self.body.as_bytes())
            .into_owned()
            .collect()
    }
}

struct StubState {
    info: String,
    sensors: String,
    alerts: String,
    runtimes: String,
    ack: String,
    fail_with: Option<u16>,
    requests: Vec<Recorded>,
}

#[derive(Clone)]
pub struct StubDevice {
    pub base_url: Url,
    state: Arc<Mutex<StubState>>,
}

impl StubDevice {
    /// Start a stub whose `/query/info` returns `info`
    pub async fn start(info: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let state = Arc::new(Mutex::new(StubState {
            info: info.to_string(),
            sensors: r#"{"sensors":[]}"#.to_string(),
            alerts: r#"{"alerts":[]}"#.to_string(),
            runtimes: r#"{"runtimes":[]}"#.to_string(),
            ack: r#"{"success":true}"#.to_string(),
            fail_with: None,
            requests: Vec::new(),
        }));

        let server_state = state.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let state = server_state.clone();
                tokio::spawn(async move {
                    let _ = serve(stream, state).await;
                });
            }
        });

        Self {
            base_url: Url::parse(&format!("http://{addr}/")).unwrap(),
            state,
        }
    }

    pub fn thermostat(&self) -> Thermostat {
        Thermostat::new(self.base_url.clone())
    }

    pub fn set_ack(&self, json: &str) {
        self.state.lock().unwrap().ack = json.to_string();
    }

    pub fn set_sensors(&self, json: &str) {
        self.state.lock().unwrap().sensors = json.to_string();
    }

    pub fn set_alerts(&self, json: &str) {
        self.state.lock().unwrap().alerts = json.to_string();
    }

    pub fn set_runtimes(&self, json: &str) {
        self.state.lock().unwrap().runtimes = json.to_string();
    }

    /// Answer every request with this status and an empty body
    pub fn fail_with(&self, status: u16) {
        self.state.lock().unwrap().fail_with = Some(status);
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().requests.clone()
    }

    /// `"METHOD /path"` for every request so far
    pub fn request_lines(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| format!("{} {}", r.method, r.path))
            .collect()
    }

    /// Form body of the only post received
    pub fn posted_form(&self) -> BTreeMap<String, String> {
        let posts: Vec<Recorded> = self
            .requests()
            .into_iter()
            .filter(|r| r.method == "POST")
            .collect();
        assert_eq!(posts.len(), 1, "expected exactly one post");
        posts[0].form()
    }
}

async fn serve(mut stream: TcpStream, state: Arc<Mutex<StubState>>) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let mut lines = head.lines();
    let mut request_line = lines.next().unwrap_or_default().split(' ');
    let method = request_line.next().unwrap_or_default().to_string();
    let path = request_line.next().unwrap_or_default().to_string();

    let content_length = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[header_end..]).into_owned();

    let (status, reply) = {
        let mut state = state.lock().unwrap();
        state.requests.push(Recorded {
            method: method.clone(),
            path: path.clone(),
            body,
        });

        match state.fail_with {
            Some(code) => (code, String::new()),
            None => match (method.as_str(), path.as_str()) {
                ("GET", "/query/info") => (200, state.info.clone()),
                ("GET", "/query/sensors") => (200, state.sensors.clone()),
                ("GET", "/query/alerts") => (200, state.alerts.clone()),
                ("GET", "/query/runtimes") => (200, state.runtimes.clone()),
                ("POST", "/control") | ("POST", "/settings") => (200, state.ack.clone()),
                _ => (404, String::new()),
            },
        }
    };

    let reason = match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Error",
    };
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\
         \r\n\
         {reply}",
        reply.len()
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}
