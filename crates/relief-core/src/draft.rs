//! The contract every draft type fulfils.
//!
//! A draft is one in-progress submission (EOI application, full proposal,
//! claim, progress report, forecast or condition clearance request). The
//! workflow controller only talks to drafts through [`DraftDocument`].

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ServiceError;
use crate::models::{AttachmentPolicy, AttachmentRef, RecordType};
use crate::validation::{ConditionalRule, FieldError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DraftKind {
    EoiApplication,
    FullProposal,
    Claim,
    ProgressReport,
    Forecast,
    ConditionRequest,
}

impl DraftKind {
    /// Whether records of this kind live under a project.
    pub fn is_project_scoped(&self) -> bool {
        !matches!(self, DraftKind::EoiApplication | DraftKind::FullProposal)
    }

    /// Resource path of one draft, relative to the API prefix.
    pub fn resource_path(&self, key: &DraftKey) -> Result<String, ServiceError> {
        match (self, key) {
            (DraftKind::EoiApplication, DraftKey::Application(id)) => {
                Ok(format!("/drif-applications/eoi/{}", id))
            }
            (DraftKind::FullProposal, DraftKey::Application(id)) => {
                Ok(format!("/drif-applications/fp/{}", id))
            }
            (kind, DraftKey::ProjectRecord { project_id, record_id })
                if kind.is_project_scoped() =>
            {
                let segment = match kind {
                    DraftKind::Claim => "claims",
                    DraftKind::ProgressReport => "progress-reports",
                    DraftKind::Forecast => "forecasts",
                    _ => "conditions",
                };
                Ok(format!("/projects/{}/{}/{}", project_id, segment, record_id))
            }
            (kind, key) => Err(ServiceError::InvalidRequest(format!(
                "{} drafts cannot be addressed by {:?}",
                kind, key
            ))),
        }
    }
}

impl Display for DraftKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DraftKind::EoiApplication => write!(f, "eoi_application"),
            DraftKind::FullProposal => write!(f, "full_proposal"),
            DraftKind::Claim => write!(f, "claim"),
            DraftKind::ProgressReport => write!(f, "progress_report"),
            DraftKind::Forecast => write!(f, "forecast"),
            DraftKind::ConditionRequest => write!(f, "condition_request"),
        }
    }
}

impl FromStr for DraftKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eoi_application" => Ok(DraftKind::EoiApplication),
            "full_proposal" => Ok(DraftKind::FullProposal),
            "claim" => Ok(DraftKind::Claim),
            "progress_report" => Ok(DraftKind::ProgressReport),
            "forecast" => Ok(DraftKind::Forecast),
            "condition_request" => Ok(DraftKind::ConditionRequest),
            _ => Err(anyhow::anyhow!("Invalid draft kind: {}", s)),
        }
    }
}

/// Identifiers needed to address a draft on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftKey {
    Application(Uuid),
    ProjectRecord { project_id: Uuid, record_id: Uuid },
}

impl DraftKey {
    pub fn record_id(&self) -> Uuid {
        match self {
            DraftKey::Application(id) => *id,
            DraftKey::ProjectRecord { record_id, .. } => *record_id,
        }
    }
}

/// A named group of fields, reported back when it fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub key: &'static str,
    pub title: &'static str,
}

/// A workflow-specific contradiction that blocks submission even though
/// every section is individually valid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct CrossCheckViolation {
    pub rule: &'static str,
    pub message: &'static str,
}

/// Applicant details used to pre-fill representative contact fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub title: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

pub trait DraftDocument: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const KIND: DraftKind;

    fn id(&self) -> Uuid;

    /// Sections in display order.
    fn sections() -> &'static [Section];

    /// Complete list of validation failures for the current state.
    fn validate(&self) -> Vec<FieldError>;

    /// Recompute every derived total and flag from its inputs.
    fn recompute(&mut self);

    fn conditional_rules() -> &'static [ConditionalRule<Self>];

    /// Check run after validation passes and before the backend is called.
    fn cross_check(&self) -> Result<(), CrossCheckViolation> {
        Ok(())
    }

    /// Fill unset fields from the applicant's profile. Returns whether
    /// anything changed. Fields that already hold a value are never touched.
    fn apply_profile_defaults(&mut self, _profile: &UserProfile) -> bool {
        false
    }

    /// The attachment list owned by `record_id` (the draft itself or one of
    /// its child records) and the record's type.
    fn attachment_list_mut(
        &mut self,
        record_id: Uuid,
    ) -> Option<(RecordType, &mut Vec<AttachmentRef>)>;

    /// Every attachment list in the draft.
    fn attachment_lists_mut(&mut self) -> Vec<&mut Vec<AttachmentRef>>;

    /// Every attachment reference in the draft, across all records.
    fn attachments(&self) -> Vec<&AttachmentRef>;

    fn attachment_policy(record_type: RecordType) -> AttachmentPolicy;

    fn find_attachment(&self, attachment_id: Uuid) -> Option<&AttachmentRef> {
        self.attachments()
            .into_iter()
            .find(|reference| reference.id == attachment_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_kind_round_trips_through_str() {
        for kind in [
            DraftKind::EoiApplication,
            DraftKind::FullProposal,
            DraftKind::Claim,
            DraftKind::ProgressReport,
            DraftKind::Forecast,
            DraftKind::ConditionRequest,
        ] {
            assert_eq!(kind.to_string().parse::<DraftKind>().unwrap(), kind);
        }
        assert!("grant".parse::<DraftKind>().is_err());
    }

    #[test]
    fn test_resource_paths() {
        let id = Uuid::new_v4();
        assert_eq!(
            DraftKind::EoiApplication
                .resource_path(&DraftKey::Application(id))
                .unwrap(),
            format!("/drif-applications/eoi/{}", id)
        );

        let project_id = Uuid::new_v4();
        let key = DraftKey::ProjectRecord {
            project_id,
            record_id: id,
        };
        assert_eq!(
            DraftKind::ProgressReport.resource_path(&key).unwrap(),
            format!("/projects/{}/progress-reports/{}", project_id, id)
        );
        assert_eq!(key.record_id(), id);
    }

    #[test]
    fn test_resource_path_rejects_mismatched_key() {
        let err = DraftKind::Claim
            .resource_path(&DraftKey::Application(Uuid::new_v4()))
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidRequest(_)));

        let err = DraftKind::FullProposal
            .resource_path(&DraftKey::ProjectRecord {
                project_id: Uuid::new_v4(),
                record_id: Uuid::new_v4(),
            })
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidRequest(_)));
    }
}
