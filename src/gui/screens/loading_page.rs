use std::convert::Infallible;
use std::sync::Arc;

use iced::{
    Element, Task,
    widget::{container, text},
};

use crate::error::TransportError;
use crate::gui::{
    AppState,
    screens::{Screen, ScreenMessage},
};
use crate::pipeline::Catalogs;

/// Shown while the area and model catalogs load.
#[derive(Debug, Clone)]
pub struct LoadingPageScreen;

impl Screen for LoadingPageScreen {
    type Message = Infallible;
    type ParentMessage = Result<Catalogs, Arc<TransportError>>;

    fn view(&self) -> Element<'_, ScreenMessage<Self>> {
        container(text("Loading..."))
            .center_x(iced::Length::Fill)
            .center_y(iced::Length::Fill)
            .into()
    }

    fn update(
        &mut self,
        message: Self::Message,
        _state: &mut AppState,
    ) -> Task<ScreenMessage<Self>> {
        match message {}
    }
}
