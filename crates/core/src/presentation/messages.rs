use crate::fetch::FetchError;

/// One human-readable line per fetch failure kind, for display.
pub fn user_message(err: &FetchError) -> String {
    match err {
        FetchError::InvalidUrl(_) => "Invalid URL. Please check the API endpoint.".to_string(),
        FetchError::Http(status) => format!("HTTP error: {status}"),
        FetchError::EmptyResult => "Empty response. Portfolio contains no stocks.".to_string(),
        FetchError::Network(cause) => format!("Network error: {cause}"),
        FetchError::Decoding(cause) => {
            format!("Error decoding data: {cause} Please try again later.")
        }
    }
}
