//! Resume file upload. Turns an uploaded PDF or plain-text file into resume text.

use bytes::Bytes;
use tracing::debug;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UploadKind {
    Pdf,
    Text,
}

/// One uploaded file as read from the multipart body.
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl ResumeUpload {
    fn kind(&self) -> Result<UploadKind, AppError> {
        let content_type = self.content_type.as_deref().unwrap_or("").to_lowercase();
        let file_name = self.file_name.as_deref().unwrap_or("").to_lowercase();

        if content_type == "application/pdf" || file_name.ends_with(".pdf") || self.data.starts_with(b"%PDF-") {
            return Ok(UploadKind::Pdf);
        }
        if content_type.starts_with("text/")
            || file_name.ends_with(".txt")
            || file_name.ends_with(".md")
            || (content_type.is_empty() && file_name.is_empty())
        {
            return Ok(UploadKind::Text);
        }

        Err(AppError::Validation(format!(
            "unsupported file type '{}', upload a PDF or plain-text resume",
            if content_type.is_empty() { file_name } else { content_type }
        )))
    }
}

/// Extracts resume text from an upload. PDF parsing runs on the blocking pool.
pub async fn extract_resume_text(upload: ResumeUpload) -> Result<String, AppError> {
    if upload.data.is_empty() {
        return Err(AppError::EmptyInput);
    }

    match upload.kind()? {
        UploadKind::Text => String::from_utf8(upload.data.to_vec())
            .map_err(|_| AppError::Validation("text upload must be UTF-8".to_string())),
        UploadKind::Pdf => {
            debug!("Extracting text from {} byte PDF", upload.data.len());
            let data = upload.data;
            tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&data))
                .await
                .map_err(|e| {
                    // pdf-extract panics on some malformed files instead of returning an error.
                    if e.is_panic() {
                        AppError::Validation("could not read PDF".to_string())
                    } else {
                        AppError::Internal(e.into())
                    }
                })?
                .map_err(|e| AppError::Validation(format!("could not read PDF: {e}")))
        }
    }
}
