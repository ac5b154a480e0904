mod github;
mod models;
mod spiget;

pub use github::*;
pub use models::*;
pub use spiget::*;

use crate::error::UpdaterError;
use crate::files::StagedFile;
use reqwest::redirect::Policy;
use reqwest::{Client, Response, Url};

/// Prepare the HTTP client shared by all API clients.
pub fn http_client() -> Result<Client, UpdaterError> {
    let client = Client::builder()
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .redirect(Policy::limited(10))
        .hickory_dns(true)
        .build()?;

    Ok(client)
}

/// Append path segments to a base url.
fn join_segments(
    base: &Url,
    segments: impl IntoIterator<Item = impl AsRef<str>>,
) -> Result<Url, UpdaterError> {
    let mut new_path = base.clone();
    new_path
        .path_segments_mut()
        .map_err(|_| UpdaterError::InvalidBaseUrl(base.clone()))?
        .pop_if_empty()
        .extend(segments);

    Ok(new_path)
}

/// Stream a response body into a staged file, returning the number of bytes written.
async fn stream_into(mut response: Response, file: &mut StagedFile) -> Result<u64, UpdaterError> {
    let mut written = 0;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_segments_with_and_without_trailing_slash() {
        let plain = Url::parse("https://api.spiget.org/v2/resources").unwrap();
        let slashed = Url::parse("https://api.github.com/").unwrap();

        assert_eq!(
            join_segments(&plain, ["19254", "download"]).unwrap().as_str(),
            "https://api.spiget.org/v2/resources/19254/download"
        );
        assert_eq!(
            join_segments(&slashed, ["repos", "owner", "name"]).unwrap().as_str(),
            "https://api.github.com/repos/owner/name"
        );
    }

    #[test]
    fn rejects_bases_without_path() {
        let base = Url::parse("mailto:someone@example.com").unwrap();

        assert!(matches!(
            join_segments(&base, ["x"]),
            Err(UpdaterError::InvalidBaseUrl(_))
        ));
    }
}
