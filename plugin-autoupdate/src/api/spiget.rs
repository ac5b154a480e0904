use super::{join_segments, stream_into};
use crate::error::UpdaterError;
use crate::files::StagedFile;
use reqwest::{Client, Response, StatusCode, Url};

/// Header carrying the SHA-1 of a hosted resource file.
///
/// External resources have no digest, so the header is absent for them.
pub const SPIGET_SHA1_HEADER: &str = "x-spiget-resource-sha1";

/// Anything that serves resource files by numeric id.
#[allow(async_fn_in_trait)]
pub trait ResourceHost {
    type Download: ResourceDownload;

    async fn request(&self, resource_id: u64) -> Result<Self::Download, UpdaterError>;
}

/// A response whose body has not been read yet.
#[allow(async_fn_in_trait)]
pub trait ResourceDownload {
    fn status(&self) -> StatusCode;

    /// Remote SHA-1 digest as hex, if the host provided one.
    fn sha1(&self) -> Option<&str>;

    async fn write_to(self, file: &mut StagedFile) -> Result<u64, UpdaterError>;
}

#[derive(Debug, Clone)]
pub struct SpigetApi {
    client: Client,
    base: Url,
}

impl SpigetApi {
    pub fn new(client: Client, base: Url) -> Result<Self, UpdaterError> {
        if base.cannot_be_a_base() {
            return Err(UpdaterError::InvalidBaseUrl(base));
        }

        Ok(Self { client, base })
    }

    pub fn download_url(&self, resource_id: u64) -> Result<Url, UpdaterError> {
        join_segments(&self.base, [resource_id.to_string().as_str(), "download"])
    }
}

impl ResourceHost for SpigetApi {
    type Download = SpigetDownload;

    #[tracing::instrument(skip(self))]
    async fn request(&self, resource_id: u64) -> Result<SpigetDownload, UpdaterError> {
        let response = self
            .client
            .get(self.download_url(resource_id)?)
            .send()
            .await?;

        let sha1 = response
            .headers()
            .get(SPIGET_SHA1_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty());

        Ok(SpigetDownload { response, sha1 })
    }
}

#[derive(Debug)]
pub struct SpigetDownload {
    response: Response,
    sha1: Option<String>,
}

impl ResourceDownload for SpigetDownload {
    fn status(&self) -> StatusCode {
        self.response.status()
    }

    fn sha1(&self) -> Option<&str> {
        self.sha1.as_deref()
    }

    async fn write_to(self, file: &mut StagedFile) -> Result<u64, UpdaterError> {
        stream_into(self.response, file).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::GET, MockServer};

    fn api(server: &MockServer) -> SpigetApi {
        SpigetApi::new(Client::new(), Url::parse(&server.url("/v2/resources")).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn request_reads_digest_header_and_streams_body() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/v2/resources/19254/download");
                then.status(200)
                    .header("X-Spiget-Resource-SHA1", "F572D396FAE9206628714FB2CE00F72E94F2258F ")
                    .body("hello\n");
            })
            .await;

        let download = api(&server).request(19254).await.unwrap();

        assert_eq!(download.status(), StatusCode::OK);
        assert_eq!(
            download.sha1(),
            Some("F572D396FAE9206628714FB2CE00F72E94F2258F")
        );

        let dir = tempfile::tempdir().unwrap();
        let mut file = StagedFile::create(dir.path().join("ViaVersion.jar")).unwrap();
        assert_eq!(download.write_to(&mut file).await.unwrap(), 6);
        let saved = file.commit().await.unwrap();

        assert_eq!(std::fs::read(saved).unwrap(), b"hello\n");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn empty_or_missing_digest_header_is_none() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v2/resources/1/download");
                then.status(200).header("X-Spiget-Resource-SHA1", "").body("one");
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v2/resources/2/download");
                then.status(200).body("two");
            })
            .await;

        let api = api(&server);

        assert_eq!(api.request(1).await.unwrap().sha1(), None);
        assert_eq!(api.request(2).await.unwrap().sha1(), None);
    }

    #[tokio::test]
    async fn failed_status_is_passed_through() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v2/resources/52109/download");
                then.status(404).body("not found");
            })
            .await;

        let download = api(&server).request(52109).await.unwrap();

        assert_eq!(download.status(), StatusCode::NOT_FOUND);
        assert_eq!(download.sha1(), None);
    }

    #[test]
    fn download_url_uses_resource_id() {
        let api = SpigetApi::new(
            Client::new(),
            Url::parse("https://api.spiget.org/v2/resources").unwrap(),
        )
        .unwrap();

        assert_eq!(
            api.download_url(27448).unwrap().as_str(),
            "https://api.spiget.org/v2/resources/27448/download"
        );
    }
}
