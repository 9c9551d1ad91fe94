use crate::error::{Result, VenstarError};
use crate::thermostat::Thermostat;
use std::fmt;
use url::Url;

/// Service type advertised by Venstar thermostats
pub const SERVICE_TYPE: &str = "venstar:thermostat:ecp";

/// A thermostat found on the local network
///
/// Built from one discovery response. The base URL is the authority for
/// every later request to the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    /// Display name from the `USN` header, empty if not advertised
    pub name: String,
    /// Base address from the `Location` header
    pub base_url: Url,
    /// All response headers, in the order received
    pub headers: Vec<(String, String)>,
}

impl DeviceDescriptor {
    /// Parse a raw discovery response
    ///
    /// Returns `Ok(None)` for well-formed responses from other kinds of
    /// device, and an error for payloads that are not an HTTP-style header
    /// block or that advertise the thermostat service without a usable
    /// `Location`.
    pub fn parse(msg: &[u8]) -> Result<Option<Self>> {
        let headers = parse_header_block(msg)?;

        if find_header(&headers, "ST") != Some(SERVICE_TYPE) {
            return Ok(None);
        }

        let location = find_header(&headers, "Location")
            .filter(|v| !v.is_empty())
            .ok_or(VenstarError::MissingHeader("Location"))?;
        let base_url = Url::parse(location)?;

        let name = find_header(&headers, "USN")
            .map(usn_name)
            .unwrap_or_default();

        Ok(Some(Self {
            name,
            base_url,
            headers,
        }))
    }

    /// Look up a response header, ignoring case
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Open a control session with this thermostat
    pub fn connect(&self) -> Thermostat {
        Thermostat::new(self.base_url.clone())
    }
}

impl fmt::Display for DeviceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.base_url)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Extract the display name from a `USN` value
///
/// The value is a colon-separated token list; the token after `name`
/// (matched case-insensitively) is the display name.
fn usn_name(usn: &str) -> String {
    let parts: Vec<&str> = usn.split(':').collect();

    parts
        .iter()
        .position(|part| part.eq_ignore_ascii_case("name"))
        .and_then(|i| parts.get(i + 1))
        .map(|name| name.to_string())
        .unwrap_or_default()
}

/// Parse a status line and header lines, stopping at the first blank line
///
/// The blank line is required; a block that runs out before it is
/// truncated.
fn parse_header_block(msg: &[u8]) -> Result<Vec<(String, String)>> {
    let text = String::from_utf8_lossy(msg);
    let mut lines = text.split_inclusive('\n');

    let status = lines
        .next()
        .map(trim_line_ending)
        .filter(|line| !line.is_empty())
        .ok_or_else(|| VenstarError::MalformedResponse("empty response".to_string()))?;
    check_status_line(status)?;

    let mut headers: Vec<(String, String)> = Vec::new();

    loop {
        let line = match lines.next() {
            Some(line) if line.ends_with('\n') => trim_line_ending(line),
            // a final fragment without a newline is a header, then EOF
            Some(line) if !trim_line_ending(line).is_empty() => {
                push_header_line(&mut headers, trim_line_ending(line))?;
                continue;
            }
            _ => {
                return Err(VenstarError::MalformedResponse(
                    "unexpected end of header block".to_string(),
                ))
            }
        };

        if line.is_empty() {
            return Ok(headers);
        }
        push_header_line(&mut headers, line)?;
    }
}

fn trim_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

fn push_header_line(headers: &mut Vec<(String, String)>, line: &str) -> Result<()> {
    if line.starts_with([' ', '\t']) {
        // obsolete line folding continues the previous value
        let (_, value) = headers.last_mut().ok_or_else(|| {
            VenstarError::MalformedResponse(format!("continuation before first header: {line:?}"))
        })?;
        value.push(' ');
        value.push_str(line.trim());
        return Ok(());
    }

    let (key, value) = line
        .split_once(':')
        .ok_or_else(|| VenstarError::MalformedResponse(format!("malformed header line: {line:?}")))?;

    if key.is_empty() || key.contains([' ', '\t']) {
        return Err(VenstarError::MalformedResponse(format!(
            "invalid header name: {key:?}"
        )));
    }

    headers.push((key.to_string(), value.trim().to_string()));
    Ok(())
}

fn check_status_line(line: &str) -> Result<()> {
    let malformed = || VenstarError::MalformedResponse(format!("malformed status line: {line:?}"));

    let mut parts = line.splitn(3, ' ');
    let proto = parts.next().ok_or_else(malformed)?;
    let code = parts.next().ok_or_else(malformed)?;

    let version = proto.strip_prefix("HTTP/").ok_or_else(malformed)?;
    let (major, minor) = version.split_once('.').ok_or_else(malformed)?;
    let is_number = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !is_number(major) || !is_number(minor) {
        return Err(malformed());
    }

    if code.len() != 3 || !is_number(code) {
        return Err(malformed());
    }

    Ok(())
}
