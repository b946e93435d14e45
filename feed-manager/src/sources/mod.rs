// Concrete position sources

pub mod celestrak;
pub mod opensky;

pub use celestrak::CelesTrakSource;
pub use opensky::OpenSkySource;

use skyfuse::FetchError;

/// Map non-2xx responses to [`FetchError::Status`].
pub(crate) fn check_response_status(response: &reqwest::Response) -> Result<(), FetchError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(FetchError::Status {
            status: status.as_u16(),
        })
    }
}
