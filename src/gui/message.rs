use crate::gui::screens::{
    ScreenMessage, loading_page::LoadingPageScreen, recognize::RecognizeScreen,
};

#[derive(Debug, Clone)]
pub enum Message {
    LoadingPageMessage(ScreenMessage<LoadingPageScreen>),
    RecognizeMessage(ScreenMessage<RecognizeScreen>),
}
