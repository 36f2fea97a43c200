//! Assembly of the multipart recognition request.

use reqwest::multipart::{Form, Part};

use crate::error::{TransportError, ValidationError};
use crate::models::{AccessDirection, AreaRef, ModelRef};

/// Form key of the raw image bytes.
pub const FILE_FIELD: &str = "file";
/// Form key of the access direction.
pub const ACCESS_TYPE_FIELD: &str = "accessType";

pub const AREA_PREFIX: &str = "area";
pub const SEGMENTATION_MODEL_PREFIX: &str = "segmentationModel";
pub const RECOGNITION_MODEL_PREFIX: &str = "recognitionModel";

/// The selected fingerprint image as read from disk.
///
/// Replaced wholesale on every selection, never edited in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BiometricFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl BiometricFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub async fn read(path: impl AsRef<std::path::Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "fingerprint".to_string());
        Ok(Self { name, bytes })
    }

    fn mime(&self) -> &'static str {
        match crate::decode::extension_of(&self.name).as_deref() {
            Some("bmp") => "image/bmp",
            Some("tif") | Some("tiff") => "image/tiff",
            Some("png") => "image/png",
            Some("jpg") | Some("jpeg") => "image/jpeg",
            _ => "application/octet-stream",
        }
    }
}

/// Borrowed view of everything the operator has chosen so far.
#[derive(Debug, Clone, Copy, Default)]
pub struct Selection<'a> {
    pub file: Option<&'a BiometricFile>,
    pub area: Option<&'a AreaRef>,
    pub segmentation_model: Option<&'a ModelRef>,
    pub recognition_model: Option<&'a ModelRef>,
    pub direction: AccessDirection,
}

/// One submission's worth of form data. Built fresh per attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionRequest {
    pub file: BiometricFile,
    /// Text fields in transmission order
    pub fields: Vec<(String, String)>,
}

impl RecognitionRequest {
    /// Check the selection and flatten it into namespaced form fields.
    ///
    /// Only the first missing selection is reported, checked in the order
    /// file, area, segmentation model, recognition model.
    pub fn assemble(selection: &Selection<'_>) -> Result<Self, ValidationError> {
        let file = selection.file.ok_or(ValidationError::MissingFile)?;
        let area = selection.area.ok_or(ValidationError::MissingArea)?;
        let segmentation = selection
            .segmentation_model
            .ok_or(ValidationError::MissingSegmentationModel)?;
        let recognition = selection
            .recognition_model
            .ok_or(ValidationError::MissingRecognitionModel)?;

        let mut fields = Vec::new();
        for (key, value) in area.fields() {
            fields.push((format!("{}.{}", AREA_PREFIX, key), value));
        }
        fields.extend(flatten_model(SEGMENTATION_MODEL_PREFIX, segmentation));
        fields.extend(flatten_model(RECOGNITION_MODEL_PREFIX, recognition));
        fields.push((
            ACCESS_TYPE_FIELD.to_string(),
            selection.direction.as_str().to_string(),
        ));

        Ok(Self {
            file: file.clone(),
            fields,
        })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    /// Convert into a multipart form: the file part first, then every text field.
    pub fn into_form(self) -> Result<Form, TransportError> {
        let mime = self.file.mime();
        let part = Part::bytes(self.file.bytes)
            .file_name(self.file.name)
            .mime_str(mime)
            .map_err(|e| TransportError::Build(format!("Failed to create multipart: {}", e)))?;

        Ok(self
            .fields
            .into_iter()
            .fold(Form::new().part(FILE_FIELD, part), |form, (k, v)| {
                form.text(k, v)
            }))
    }
}

fn flatten_model<'a>(
    prefix: &'a str,
    model: &'a ModelRef,
) -> impl Iterator<Item = (String, String)> + 'a {
    model
        .fields()
        .into_iter()
        .map(move |(key, value)| (format!("{}.{}", prefix, key), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScalarValue;

    fn area() -> AreaRef {
        AreaRef {
            id: "a1".to_string(),
            name: "Server Room".to_string(),
            security_level: 5,
            description: Some("Primary data center".to_string()),
        }
    }

    fn file() -> BiometricFile {
        BiometricFile::new("101_1.tif", vec![1, 2, 3])
    }

    #[test]
    fn test_missing_selections_reported_in_order() {
        let file = file();
        let area = area();
        let seg = ModelRef::new("s1", "seg", 0.9);
        let rec = ModelRef::new("r1", "rec", 0.8);

        let full = Selection {
            file: Some(&file),
            area: Some(&area),
            segmentation_model: Some(&seg),
            recognition_model: Some(&rec),
            direction: AccessDirection::Entry,
        };

        let cases = [
            (Selection { file: None, ..full }, ValidationError::MissingFile),
            (Selection { area: None, ..full }, ValidationError::MissingArea),
            (
                Selection {
                    segmentation_model: None,
                    ..full
                },
                ValidationError::MissingSegmentationModel,
            ),
            (
                Selection {
                    recognition_model: None,
                    ..full
                },
                ValidationError::MissingRecognitionModel,
            ),
        ];
        for (selection, expected) in cases {
            assert_eq!(RecognitionRequest::assemble(&selection), Err(expected));
        }

        // Everything missing reports the file first
        assert_eq!(
            RecognitionRequest::assemble(&Selection::default()),
            Err(ValidationError::MissingFile)
        );
    }

    #[test]
    fn test_model_fields_are_all_namespaced() {
        let file = file();
        let area = area();
        let seg = ModelRef::new("m1", "seg_v2", 0.87)
            .with_field("extra", ScalarValue::String("x".to_string()));
        let rec = ModelRef::new("r1", "rec_v1", 0.9)
            .with_field("pathName", ScalarValue::String("rec_v1.pt".to_string()));

        let request = RecognitionRequest::assemble(&Selection {
            file: Some(&file),
            area: Some(&area),
            segmentation_model: Some(&seg),
            recognition_model: Some(&rec),
            direction: AccessDirection::Exit,
        })
        .unwrap();

        assert_eq!(request.get("segmentationModel.id"), Some("m1"));
        assert_eq!(request.get("segmentationModel.name"), Some("seg_v2"));
        assert_eq!(request.get("segmentationModel.accuracy"), Some("0.87"));
        assert_eq!(request.get("segmentationModel.extra"), Some("x"));
        assert_eq!(request.get("recognitionModel.pathName"), Some("rec_v1.pt"));
        assert_eq!(request.get("area.id"), Some("a1"));
        assert_eq!(request.get("area.securityLevel"), Some("5"));
        assert_eq!(request.get("area.description"), Some("Primary data center"));
        assert_eq!(request.get("accessType"), Some("EXIT"));
        assert_eq!(request.file, file);

        let seg_keys = request
            .keys()
            .filter(|k| k.starts_with("segmentationModel."))
            .count();
        assert_eq!(seg_keys, 4);
    }

    #[test]
    fn test_bare_model_sends_only_its_id() {
        let file = file();
        let area = area();
        let seg: ModelRef = serde_json::from_value(serde_json::json!({"id": "m9"})).unwrap();
        let rec = ModelRef::new("r1", "rec_v1", 0.9);

        let request = RecognitionRequest::assemble(&Selection {
            file: Some(&file),
            area: Some(&area),
            segmentation_model: Some(&seg),
            recognition_model: Some(&rec),
            direction: AccessDirection::Entry,
        })
        .unwrap();

        let seg_keys: Vec<_> = request
            .keys()
            .filter(|k| k.starts_with("segmentationModel."))
            .collect();
        assert_eq!(seg_keys, vec!["segmentationModel.id"]);
        assert_eq!(request.get("segmentationModel.name"), None);
        assert_eq!(request.get("segmentationModel.accuracy"), None);
    }
}
