use std::convert::Infallible;
use std::sync::Arc;

use iced::{
    Color, Element, Length, Task,
    widget::{button, column, container, image, pick_list, row, scrollable, text},
};
use rfd::AsyncFileDialog;

use crate::decode::ACCEPTED_EXTENSIONS;
use crate::error::TransportError;
use crate::gui::{
    AppState,
    screens::{Screen, ScreenMessage},
};
use crate::models::{AccessDirection, AreaRef, ModelRef};
use crate::pipeline::{Catalogs, DecodeCompletion, RecognitionSession, SubmissionCompletion};
use crate::request::BiometricFile;

const ERROR_COLOR: Color = Color { r: 0.8, g: 0.15, b: 0.15, a: 1.0 };
const GRANTED_COLOR: Color = Color { r: 0.1, g: 0.6, b: 0.2, a: 1.0 };
const WARNING_COLOR: Color = Color { r: 0.8, g: 0.6, b: 0.1, a: 1.0 };

#[derive(Debug, Clone)]
pub struct RecognizeScreen {
    session: RecognitionSession,
}

#[derive(Debug, Clone)]
pub enum RecognizeMessage {
    AreaSelected(AreaRef),
    SegmentationModelSelected(ModelRef),
    RecognitionModelSelected(ModelRef),
    DirectionSelected(AccessDirection),
    PickFile,
    FilePicked(Option<BiometricFile>),
    Decoded(DecodeCompletion),
    Submit,
    Submitted(SubmissionCompletion),
}

fn msg(message: RecognizeMessage) -> ScreenMessage<RecognizeScreen> {
    ScreenMessage::ScreenMessage(message)
}

impl Screen for RecognizeScreen {
    type Message = RecognizeMessage;
    type ParentMessage = Infallible;

    fn view(&self) -> Element<'_, ScreenMessage<Self>> {
        let session = &self.session;
        let catalogs = session.catalogs();

        let mut content = column![
            text("Fingerprint Recognition").size(28),
            text("Area"),
            pick_list(catalogs.areas.as_slice(), session.selected_area(), |a| msg(
                RecognizeMessage::AreaSelected(a)
            ))
            .placeholder("Choose an area"),
            text("Segmentation model"),
            pick_list(
                catalogs.segmentation_models.as_slice(),
                session.selected_segmentation_model(),
                |m| msg(RecognizeMessage::SegmentationModelSelected(m))
            )
            .placeholder("Choose a segmentation model"),
            text("Recognition model"),
            pick_list(
                catalogs.recognition_models.as_slice(),
                session.selected_recognition_model(),
                |m| msg(RecognizeMessage::RecognitionModelSelected(m))
            )
            .placeholder("Choose a recognition model"),
            text("Access type"),
            pick_list(&AccessDirection::ALL[..], Some(session.direction()), |d| msg(
                RecognizeMessage::DirectionSelected(d)
            )),
            row![
                button("Choose fingerprint image").on_press(msg(RecognizeMessage::PickFile)),
                text(
                    session
                        .file()
                        .map(|f| f.name.as_str())
                        .unwrap_or("No file chosen")
                ),
            ]
            .spacing(10),
        ]
        .spacing(10)
        .padding(20);

        if let Some(preview) = session.preview() {
            let handle = image::Handle::from_bytes(preview.bytes.clone());
            content = content.push(image(handle).height(Length::Fixed(300.0)));
        } else if session.is_preview_pending() {
            content = content.push(text("Loading preview..."));
        } else if let Some(e) = session.preview_error() {
            content = content.push(text(e).color(WARNING_COLOR));
        }

        if let Some(e) = session.error() {
            content = content.push(text(e).color(ERROR_COLOR));
        }

        content = content.push(
            button("Recognize fingerprint")
                .on_press_maybe((!session.is_submitting()).then(|| msg(RecognizeMessage::Submit))),
        );

        if let Some(report) = session.report() {
            let color = if report.outcome.is_granted() {
                GRANTED_COLOR
            } else if report.outcome.shows_employee() {
                WARNING_COLOR
            } else {
                ERROR_COLOR
            };
            let mut lines = report.lines().into_iter();
            let mut block = column![].spacing(4);
            if let Some(headline) = lines.next() {
                block = block.push(text(headline).size(20).color(color));
            }
            for line in lines {
                block = block.push(text(line));
            }
            content = content.push(block);
        }

        container(scrollable(content))
            .center_x(Length::Fill)
            .into()
    }

    fn update(
        &mut self,
        message: Self::Message,
        state: &mut AppState,
    ) -> Task<ScreenMessage<Self>> {
        match message {
            RecognizeMessage::AreaSelected(area) => {
                self.session.select_area(&area.id);
                Task::none()
            }
            RecognizeMessage::SegmentationModelSelected(model) => {
                self.session.select_segmentation_model(&model.id);
                Task::none()
            }
            RecognizeMessage::RecognitionModelSelected(model) => {
                self.session.select_recognition_model(&model.id);
                Task::none()
            }
            RecognizeMessage::DirectionSelected(direction) => {
                self.session.set_direction(direction);
                Task::none()
            }
            RecognizeMessage::PickFile => Task::perform(pick_file(), |file| {
                msg(RecognizeMessage::FilePicked(file))
            }),
            RecognizeMessage::FilePicked(file) => match self.session.select_file(file) {
                Some(job) => Task::perform(job.run(), |done| msg(RecognizeMessage::Decoded(done))),
                None => Task::none(),
            },
            RecognizeMessage::Decoded(completion) => {
                self.session.complete_decode(completion);
                Task::none()
            }
            RecognizeMessage::Submit => match self.session.prepare_submission() {
                Ok(job) => {
                    let client = state.client.clone();
                    Task::perform(async move { job.run(&client).await }, |done| {
                        msg(RecognizeMessage::Submitted(done))
                    })
                }
                Err(_) => Task::none(),
            },
            RecognizeMessage::Submitted(completion) => {
                self.session.complete_submission(completion);
                Task::none()
            }
        }
    }
}

impl RecognizeScreen {
    pub fn new(loaded: Result<Catalogs, Arc<TransportError>>) -> Self {
        let mut session = RecognitionSession::new();
        // A failed load is recorded on the session and shown as its error
        let _ = session.apply_catalogs(loaded);
        Self { session }
    }
}

async fn pick_file() -> Option<BiometricFile> {
    let handle = AsyncFileDialog::new()
        .add_filter("Fingerprint image", &ACCEPTED_EXTENSIONS[..])
        .pick_file()
        .await?;
    let bytes = handle.read().await;
    Some(BiometricFile::new(handle.file_name(), bytes))
}
