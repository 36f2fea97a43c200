use crate::client::RecognitionClient;
use crate::config::ClientConfig;

/// State shared by every screen.
#[derive(Debug, Clone)]
pub struct AppState {
    pub client: RecognitionClient,
}

impl AppState {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            client: RecognitionClient::new(config),
        }
    }
}
