//! Draft store and file transfer over the REST backend.
//!
//! Drafts live at the path given by `DraftKind::resource_path`; submission
//! posts to `{path}/submit` and child records live under
//! `{path}/{collection}`. Files go through `/attachments`.

use async_trait::async_trait;
use relief_core::{DraftDocument, DraftKey, ServiceError};
use relief_workflow::{
    ChildRecordKind, DownloadedFile, DraftStore, FileTransfer, SubmissionResult, UploadRequest,
    UploadedFile,
};
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use uuid::Uuid;

use crate::ApiClient;

/// Body returned when a child record is created.
#[derive(Debug, Deserialize)]
struct CreatedRecord {
    id: Uuid,
}

fn draft_path<D: DraftDocument>(key: &DraftKey) -> Result<String, ServiceError> {
    D::KIND.resource_path(key)
}

#[async_trait]
impl<D: DraftDocument> DraftStore<D> for ApiClient {
    #[tracing::instrument(skip_all, fields(draft_kind = %D::KIND, record_id = %key.record_id()))]
    async fn get_draft(&self, key: &DraftKey) -> Result<D, ServiceError> {
        self.get(&draft_path::<D>(key)?).await
    }

    #[tracing::instrument(skip_all, fields(draft_kind = %D::KIND, record_id = %key.record_id()))]
    async fn update_draft(&self, key: &DraftKey, draft: &D) -> Result<(), ServiceError> {
        self.put_json(&draft_path::<D>(key)?, draft).await
    }

    #[tracing::instrument(skip_all, fields(draft_kind = %D::KIND, record_id = %key.record_id()))]
    async fn submit_draft(
        &self,
        key: &DraftKey,
        draft: &D,
    ) -> Result<SubmissionResult, ServiceError> {
        let path = format!("{}/submit", draft_path::<D>(key)?);
        self.post_json(&path, draft).await
    }

    #[tracing::instrument(skip_all, fields(draft_kind = %D::KIND, child_kind = %kind))]
    async fn create_child_record(
        &self,
        key: &DraftKey,
        kind: ChildRecordKind,
        payload: serde_json::Value,
    ) -> Result<Uuid, ServiceError> {
        let path = format!("{}/{}", draft_path::<D>(key)?, kind.path_segment());
        let created: CreatedRecord = self.post_json(&path, &payload).await?;
        Ok(created.id)
    }

    #[tracing::instrument(skip_all, fields(draft_kind = %D::KIND, child_kind = %kind, child_id = %id))]
    async fn delete_child_record(
        &self,
        key: &DraftKey,
        kind: ChildRecordKind,
        id: Uuid,
    ) -> Result<(), ServiceError> {
        let path = format!("{}/{}/{}", draft_path::<D>(key)?, kind.path_segment(), id);
        self.delete(&path).await
    }
}

#[async_trait]
impl FileTransfer for ApiClient {
    #[tracing::instrument(skip_all, fields(record_id = %request.record_id, document_type = %request.document_type))]
    async fn upload(&self, request: UploadRequest) -> Result<UploadedFile, ServiceError> {
        let part = Part::bytes(request.content.to_vec())
            .file_name(request.name)
            .mime_str(&request.content_type)
            .map_err(|e| ServiceError::InvalidRequest(e.to_string()))?;
        let form = Form::new()
            .part("file", part)
            .text("recordId", request.record_id.to_string())
            .text("recordType", request.record_type.to_string())
            .text("documentType", request.document_type.to_string());

        self.post_multipart("/attachments", form).await
    }

    #[tracing::instrument(skip(self))]
    async fn download(&self, attachment_id: Uuid) -> Result<DownloadedFile, ServiceError> {
        let response = self
            .get_raw(&format!("/attachments/{}/download", attachment_id))
            .await?;

        let headers = response.headers();
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let file_name = headers
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(file_name_from_disposition)
            .unwrap_or_else(|| attachment_id.to_string());

        let content = response
            .bytes()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        Ok(DownloadedFile {
            file_name,
            content_type,
            content,
        })
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, attachment_id: Uuid) -> Result<(), ServiceError> {
        ApiClient::delete(self, &format!("/attachments/{}", attachment_id)).await
    }
}

/// File name from a `Content-Disposition` header. Prefers the RFC 5987
/// `filename*` form over the plain `filename`.
fn file_name_from_disposition(header: &str) -> Option<String> {
    let mut plain = None;
    for param in header.split(';').map(str::trim) {
        if let Some(encoded) = param.strip_prefix("filename*=") {
            let value = encoded
                .split_once("''")
                .map_or(encoded, |(_, value)| value);
            if let Ok(decoded) = urlencoding::decode(value) {
                return Some(decoded.into_owned());
            }
        } else if let Some(value) = param.strip_prefix("filename=") {
            plain = Some(value.trim_matches('"').to_string());
        }
    }
    plain.filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_from_disposition() {
        assert_eq!(
            file_name_from_disposition(r#"attachment; filename="invoice.pdf""#).as_deref(),
            Some("invoice.pdf")
        );
        assert_eq!(
            file_name_from_disposition(
                r#"attachment; filename="fallback.pdf"; filename*=UTF-8''re%C3%A7u%20final.pdf"#
            )
            .as_deref(),
            Some("reçu final.pdf")
        );
        assert_eq!(file_name_from_disposition("inline"), None);
        assert_eq!(file_name_from_disposition(r#"attachment; filename="""#), None);
    }
}
