use std::sync::Arc;

use iced::{Element, Task};

use super::screens::{Screen, ScreenData, ScreenMessage, loading_page::LoadingPageScreen};
use super::{AppState, Message};
use crate::config::ClientConfig;
use crate::pipeline::Catalogs;

pub struct FingerprintApp {
    state: AppState,
    screen: ScreenData,
}

impl FingerprintApp {
    fn new(config: ClientConfig) -> (Self, Task<ScreenMessage<ScreenData>>) {
        let state = AppState::new(config);
        let client = state.client.clone();
        (
            Self {
                state,
                screen: ScreenData::LoadingPage(LoadingPageScreen),
            },
            Task::perform(async move { Catalogs::load(&client).await }, |loaded| {
                ScreenMessage::ScreenMessage(Message::LoadingPageMessage(
                    ScreenMessage::ParentMessage(loaded.map_err(Arc::new)),
                ))
            }),
        )
    }

    fn update(&mut self, message: ScreenMessage<ScreenData>) -> Task<ScreenMessage<ScreenData>> {
        match message {
            ScreenMessage::ScreenMessage(msg) => self.screen.update(msg, &mut self.state),
            ScreenMessage::ParentMessage(never) => match never {},
        }
    }

    fn view(&self) -> Element<'_, ScreenMessage<ScreenData>> {
        self.screen.view()
    }
}

/// Open the recognition window and block until it closes.
pub fn run(config: ClientConfig) -> anyhow::Result<()> {
    iced::application(
        move || FingerprintApp::new(config.clone()),
        FingerprintApp::update,
        FingerprintApp::view,
    )
    .title("Fingerprint Recognition")
    .run()
    .map_err(|e| anyhow::anyhow!("GUI failed: {}", e))
}
