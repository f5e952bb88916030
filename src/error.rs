use thiserror::Error;

/// Failure of one Entrez round trip.
#[derive(Debug, Error)]
pub enum EntrezError {
    /// The service answered but has nothing for the request (unknown taxid,
    /// zero search hits).
    #[error("not found: {0}")]
    NotFound(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("could not parse response: {0}")]
    Parse(String),
}

impl EntrezError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<reqwest::Error> for EntrezError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the API key as a query parameter.
        EntrezError::Transport(err.without_url().to_string())
    }
}

impl From<quick_xml::DeError> for EntrezError {
    fn from(err: quick_xml::DeError) -> Self {
        EntrezError::Parse(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse config file '{path}': {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("missing required value: {0}")]
    Missing(&'static str),
    #[error("invalid value for {field}: '{value}'")]
    Invalid { field: &'static str, value: String },
    #[error("console input failed: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_distinguished_from_transport() {
        assert!(EntrezError::NotFound("txid1".to_string()).is_not_found());
        assert!(!EntrezError::Transport("reset".to_string()).is_not_found());
        assert!(
            !EntrezError::Http {
                status: 429,
                body: String::new()
            }
            .is_not_found()
        );
    }

    #[test]
    fn http_error_message_carries_status() {
        let err = EntrezError::Http {
            status: 502,
            body: "Bad Gateway".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 502: Bad Gateway");
    }
}
