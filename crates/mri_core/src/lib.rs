use std::fs;
use std::path::{Path, PathBuf};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::Deserialize;

/// Inclusive size ceiling for a candidate image (10 MiB).
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// Prediction service the form talks to.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5070/predict";

/// MIME spellings the service accepts. Both JPEG spellings occur in the
/// wild, so both pass validation.
pub const ALLOWED_MIME_TYPES: [&str; 3] = ["image/png", "image/jpeg", "image/jpg"];

/// Reason a candidate image was rejected before submission. The display
/// strings are shown to the user as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Formato de archivo no permitido. Usa PNG, JPG o JPEG.")]
    UnsupportedFormat,
    #[error("El archivo supera el tamaño máximo permitido de 10MB.")]
    TooLarge,
}

/// Why selecting a file failed.
#[derive(Debug, thiserror::Error)]
pub enum SelectError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("No se pudo leer el archivo seleccionado.")]
    Unreadable(#[source] std::io::Error),
}

/// The currently selected, not-yet-submitted image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateImage {
    pub path: PathBuf,
    /// Declared media type, derived from the file extension.
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl CandidateImage {
    /// Builds a candidate from a picked or dropped file. Validation runs
    /// against the declared type and the on-disk size; an invalid file is
    /// rejected without reading its body.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SelectError> {
        let path = path.as_ref();
        let mime = mime_for_path(path).ok_or(ValidationError::UnsupportedFormat)?;
        let meta = fs::metadata(path).map_err(SelectError::Unreadable)?;
        validate(mime, meta.len())?;
        let bytes = fs::read(path).map_err(SelectError::Unreadable)?;
        Ok(Self {
            path: path.to_path_buf(),
            mime,
            bytes,
        })
    }
}

/// Declared media type for a path, based on its extension.
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    match path.extension().and_then(|s| s.to_str()) {
        Some(ext) => match ext.to_ascii_lowercase().as_str() {
            "png" => Some("image/png"),
            "jpg" | "jpeg" => Some("image/jpeg"),
            _ => None,
        },
        None => None,
    }
}

/// Checks a declared media type and byte size against the upload policy.
/// The type check runs first; exactly one error is reported.
pub fn validate(mime: &str, size: u64) -> Result<(), ValidationError> {
    if !ALLOWED_MIME_TYPES.contains(&mime) {
        return Err(ValidationError::UnsupportedFormat);
    }
    if size > MAX_IMAGE_BYTES {
        return Err(ValidationError::TooLarge);
    }
    Ok(())
}

/// Self-describing text form of the image, suitable for a form field.
pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Why a classification request failed. Detail here is for the log; the
/// UI collapses all variants into one generic message.
#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    #[error("no se pudo contactar el servicio de predicción")]
    Transport(#[source] reqwest::Error),
    #[error("el servicio respondió {0}")]
    Status(reqwest::StatusCode),
    #[error("respuesta sin etiqueta de clasificación")]
    InvalidResponse(#[source] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    resultado: String,
}

/// Blocking client for the remote classification service.
pub struct PredictionClient {
    endpoint: String,
    http: reqwest::blocking::Client,
}

impl PredictionClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: reqwest::blocking::Client::new(),
        }
    }

    /// Submits the image and returns the predicted label. One POST per
    /// call, no retries: the image travels as the sole `image` field of a
    /// multipart form, encoded as a data URL.
    pub fn classify(&self, image: &CandidateImage) -> Result<String, PredictError> {
        let form = reqwest::blocking::multipart::Form::new()
            .text("image", encode_data_url(image.mime, &image.bytes));
        let response = self
            .http
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .map_err(|e| {
                tracing::warn!("fallo de transporte hacia {}: {e}", self.endpoint);
                PredictError::Transport(e)
            })?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!("el servicio {} respondió {status}", self.endpoint);
            return Err(PredictError::Status(status));
        }
        let body: PredictResponse = response.json().map_err(|e| {
            tracing::warn!("respuesta inválida de {}: {e}", self.endpoint);
            PredictError::InvalidResponse(e)
        })?;
        Ok(body.resultado)
    }
}

impl Default for PredictionClient {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs::{self, File};
    use tempfile::tempdir;

    #[rstest]
    #[case("image/png")]
    #[case("image/jpeg")]
    #[case("image/jpg")]
    fn validate_accepts_allowed_types(#[case] mime: &str) {
        assert!(validate(mime, 1024).is_ok());
    }

    #[rstest]
    #[case("image/gif")]
    #[case("image/webp")]
    #[case("application/pdf")]
    #[case("text/plain")]
    fn validate_rejects_other_types(#[case] mime: &str) {
        assert_eq!(validate(mime, 1024), Err(ValidationError::UnsupportedFormat));
    }

    #[test]
    fn validate_accepts_size_exactly_at_ceiling() {
        assert!(validate("image/png", MAX_IMAGE_BYTES).is_ok());
    }

    #[test]
    fn validate_rejects_size_over_ceiling() {
        assert_eq!(
            validate("image/png", MAX_IMAGE_BYTES + 1),
            Err(ValidationError::TooLarge)
        );
    }

    #[test]
    fn type_check_takes_precedence_over_size() {
        assert_eq!(
            validate("image/gif", MAX_IMAGE_BYTES + 1),
            Err(ValidationError::UnsupportedFormat)
        );
    }

    #[rstest]
    #[case("scan.png", Some("image/png"))]
    #[case("scan.PNG", Some("image/png"))]
    #[case("scan.jpg", Some("image/jpeg"))]
    #[case("scan.JpEg", Some("image/jpeg"))]
    #[case("scan.gif", None)]
    #[case("scan", None)]
    fn mime_for_path_maps_extensions(#[case] name: &str, #[case] expected: Option<&'static str>) {
        assert_eq!(mime_for_path(Path::new(name)), expected);
    }

    #[test]
    fn encode_data_url_is_self_describing() {
        let url = encode_data_url("image/png", &[1, 2, 3]);
        assert_eq!(
            url,
            format!("data:image/png;base64,{}", STANDARD.encode([1, 2, 3]))
        );
    }

    #[test]
    fn from_path_reads_valid_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scan.jpg");
        fs::write(&path, b"not really a jpeg").unwrap();

        let image = CandidateImage::from_path(&path).unwrap();
        assert_eq!(image.mime, "image/jpeg");
        assert_eq!(image.bytes, b"not really a jpeg");
        assert_eq!(image.path, path);
    }

    #[test]
    fn from_path_rejects_unknown_extension_before_stat() {
        let dir = tempdir().unwrap();
        // The file does not even exist; the type check must fire first.
        let err = CandidateImage::from_path(dir.path().join("scan.txt")).unwrap_err();
        assert!(matches!(
            err,
            SelectError::Invalid(ValidationError::UnsupportedFormat)
        ));
    }

    #[test]
    fn from_path_rejects_oversized_without_reading_body() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scan.png");
        let file = File::create(&path).unwrap();
        file.set_len(MAX_IMAGE_BYTES + 1).unwrap();

        let err = CandidateImage::from_path(&path).unwrap_err();
        assert!(matches!(
            err,
            SelectError::Invalid(ValidationError::TooLarge)
        ));
    }

    #[test]
    fn from_path_accepts_size_exactly_at_ceiling() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scan.png");
        let file = File::create(&path).unwrap();
        file.set_len(MAX_IMAGE_BYTES).unwrap();

        let image = CandidateImage::from_path(&path).unwrap();
        assert_eq!(image.bytes.len() as u64, MAX_IMAGE_BYTES);
    }

    #[test]
    fn from_path_reports_missing_file_as_unreadable() {
        let dir = tempdir().unwrap();
        let err = CandidateImage::from_path(dir.path().join("gone.png")).unwrap_err();
        assert!(matches!(err, SelectError::Unreadable(_)));
    }
}
