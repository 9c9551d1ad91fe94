use crate::error::{Result, VenstarError};
use crate::form::{self, FormEncode};
use crate::protocol::{Endpoint, StatusResponse};
use serde::de::DeserializeOwned;
use url::Url;

/// Low-level HTTP access to one thermostat
#[derive(Debug, Clone)]
pub(crate) struct Connection {
    client: reqwest::Client,
    base_url: Url,
}

impl Connection {
    pub fn new(base_url: Url, client: reqwest::Client) -> Self {
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an endpoint against the base address
    fn endpoint_url(&self, endpoint: Endpoint) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| VenstarError::NotABaseUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(endpoint.segments());
        Ok(url)
    }

    /// Fetch an endpoint and decode its JSON body
    pub async fn get<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T> {
        let url = self.endpoint_url(endpoint)?;
        tracing::debug!("GET {}", url);

        let response = check_status(self.client.get(url).send().await?)?;
        decode(response).await
    }

    /// Post a message as a form and interpret the acknowledgement
    pub async fn post_form<T: FormEncode + ?Sized>(&self, endpoint: Endpoint, msg: &T) -> Result<()> {
        let body = form::encode(msg)?;
        let url = self.endpoint_url(endpoint)?;
        tracing::debug!("POST {} {:?}", url, body);

        let response = check_status(self.client.post(url).form(&body).send().await?)?;
        let status: StatusResponse = decode(response).await?;

        if status.error {
            tracing::warn!("Thermostat rejected {:?}: {}", endpoint, status.reason);
        }
        status.into_result()
    }
}

fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if !status.is_success() {
        return Err(VenstarError::Status(status));
    }
    Ok(response)
}

/// Read the whole body, then parse it as JSON
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection(base: &str) -> Connection {
        Connection::new(Url::parse(base).unwrap(), reqwest::Client::new())
    }

    #[test]
    fn joins_endpoint_segments() {
        let conn = connection("http://192.168.1.10/");
        assert_eq!(
            conn.endpoint_url(Endpoint::Info).unwrap().as_str(),
            "http://192.168.1.10/query/info"
        );
        assert_eq!(
            conn.endpoint_url(Endpoint::Control).unwrap().as_str(),
            "http://192.168.1.10/control"
        );
    }

    #[test]
    fn keeps_base_path_prefix() {
        let conn = connection("http://10.0.0.2:8080/ecp/");
        assert_eq!(
            conn.endpoint_url(Endpoint::Runtimes).unwrap().as_str(),
            "http://10.0.0.2:8080/ecp/query/runtimes"
        );

        let bare = connection("http://10.0.0.2");
        assert_eq!(
            bare.endpoint_url(Endpoint::Settings).unwrap().as_str(),
            "http://10.0.0.2/settings"
        );
    }

    #[test]
    fn rejects_non_base_urls() {
        let conn = connection("mailto:someone@example.com");
        assert!(matches!(
            conn.endpoint_url(Endpoint::Info),
            Err(VenstarError::NotABaseUrl(_))
        ));
    }
}
