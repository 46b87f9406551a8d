use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Type of record an attachment hangs off.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    Application,
    Invoice,
    Claim,
    ProgressReport,
    Forecast,
    ConditionRequest,
}

impl Display for RecordType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            RecordType::Application => write!(f, "application"),
            RecordType::Invoice => write!(f, "invoice"),
            RecordType::Claim => write!(f, "claim"),
            RecordType::ProgressReport => write!(f, "progress_report"),
            RecordType::Forecast => write!(f, "forecast"),
            RecordType::ConditionRequest => write!(f, "condition_request"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Invoice,
    ProofOfPayment,
    SupportingDocument,
    ProgressEvidence,
    ConditionEvidence,
    CostEstimate,
    ResolutionFromBoard,
}

impl Display for DocumentType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DocumentType::Invoice => write!(f, "invoice"),
            DocumentType::ProofOfPayment => write!(f, "proof_of_payment"),
            DocumentType::SupportingDocument => write!(f, "supporting_document"),
            DocumentType::ProgressEvidence => write!(f, "progress_evidence"),
            DocumentType::ConditionEvidence => write!(f, "condition_evidence"),
            DocumentType::CostEstimate => write!(f, "cost_estimate"),
            DocumentType::ResolutionFromBoard => write!(f, "resolution_from_board"),
        }
    }
}

impl FromStr for DocumentType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "invoice" => Ok(DocumentType::Invoice),
            "proof_of_payment" => Ok(DocumentType::ProofOfPayment),
            "supporting_document" => Ok(DocumentType::SupportingDocument),
            "progress_evidence" => Ok(DocumentType::ProgressEvidence),
            "condition_evidence" => Ok(DocumentType::ConditionEvidence),
            "cost_estimate" => Ok(DocumentType::CostEstimate),
            "resolution_from_board" => Ok(DocumentType::ResolutionFromBoard),
            _ => Err(anyhow::anyhow!("Invalid document type: {}", s)),
        }
    }
}

/// Reference to an uploaded file. Only `comments` is ever edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentRef {
    pub id: Uuid,
    pub name: String,
    pub document_type: DocumentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

/// How many attachments a record accepts and of which types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentPolicy {
    /// At most one attachment per document type; a new upload replaces it.
    OnePerType {
        allowed: Option<&'static [DocumentType]>,
    },
    /// Any number of attachments of the listed types.
    Multiple {
        allowed: Option<&'static [DocumentType]>,
    },
}

impl AttachmentPolicy {
    pub const fn one_per_type() -> Self {
        AttachmentPolicy::OnePerType { allowed: None }
    }

    pub fn allows(&self, document_type: DocumentType) -> bool {
        let allowed = match self {
            AttachmentPolicy::OnePerType { allowed } | AttachmentPolicy::Multiple { allowed } => {
                allowed
            }
        };
        allowed.map_or(true, |types| types.contains(&document_type))
    }

    /// Insert `reference` into `list`, replacing an existing entry of the same
    /// document type when the policy allows only one. Returns the replaced
    /// reference, if any.
    pub fn insert(
        &self,
        list: &mut Vec<AttachmentRef>,
        reference: AttachmentRef,
    ) -> Option<AttachmentRef> {
        if let AttachmentPolicy::OnePerType { .. } = self {
            if let Some(existing) = list
                .iter_mut()
                .find(|r| r.document_type == reference.document_type)
            {
                return Some(std::mem::replace(existing, reference));
            }
        }
        list.push(reference);
        None
    }
}

/// Remove the reference with `id` from whichever list holds it.
pub fn remove_attachment(lists: Vec<&mut Vec<AttachmentRef>>, id: Uuid) -> Option<AttachmentRef> {
    for list in lists {
        if let Some(position) = list.iter().position(|r| r.id == id) {
            return Some(list.remove(position));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(document_type: DocumentType) -> AttachmentRef {
        AttachmentRef {
            id: Uuid::new_v4(),
            name: format!("{}.pdf", document_type),
            document_type,
            comments: None,
        }
    }

    const INVOICE_PAIR: AttachmentPolicy = AttachmentPolicy::OnePerType {
        allowed: Some(&[DocumentType::Invoice, DocumentType::ProofOfPayment]),
    };

    #[test]
    fn test_one_per_type_replaces_same_type() {
        let mut list = vec![reference(DocumentType::Invoice)];
        let first_id = list[0].id;
        let replacement = reference(DocumentType::Invoice);
        let replacement_id = replacement.id;

        let replaced = INVOICE_PAIR.insert(&mut list, replacement);

        assert_eq!(replaced.map(|r| r.id), Some(first_id));
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, replacement_id);

        INVOICE_PAIR.insert(&mut list, reference(DocumentType::ProofOfPayment));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_multiple_appends() {
        let policy = AttachmentPolicy::Multiple { allowed: None };
        let mut list = Vec::new();
        policy.insert(&mut list, reference(DocumentType::ProgressEvidence));
        policy.insert(&mut list, reference(DocumentType::ProgressEvidence));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_allowed_types() {
        assert!(INVOICE_PAIR.allows(DocumentType::ProofOfPayment));
        assert!(!INVOICE_PAIR.allows(DocumentType::SupportingDocument));
        assert!(AttachmentPolicy::one_per_type().allows(DocumentType::CostEstimate));
    }

    #[test]
    fn test_remove_attachment_searches_all_lists() {
        let mut a = vec![reference(DocumentType::Invoice)];
        let mut b = vec![reference(DocumentType::ProofOfPayment)];
        let target = b[0].id;

        let removed = remove_attachment(vec![&mut a, &mut b], target);

        assert_eq!(removed.map(|r| r.id), Some(target));
        assert!(b.is_empty());
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn test_document_type_from_str() {
        assert_eq!(
            "proof_of_payment".parse::<DocumentType>().unwrap(),
            DocumentType::ProofOfPayment
        );
        assert!("receipt".parse::<DocumentType>().is_err());
    }
}
