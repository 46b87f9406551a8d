//! Draft models for each workflow.

pub mod attachment;
pub mod claim;
pub mod common;
pub mod condition;
pub mod eoi;
pub mod forecast;
pub mod funding;
pub mod progress_report;
pub mod proposal;

pub use attachment::{remove_attachment, AttachmentPolicy, AttachmentRef, DocumentType, RecordType};
pub use claim::{Claim, Invoice};
pub use common::{Contact, Declaration, FundingSource, FundingType, Hazard};
pub use condition::ConditionRequest;
pub use eoi::{EoiApplication, ProjectInformation, ProponentInformation};
pub use forecast::{Forecast, ForecastItem};
pub use funding::FundingInformation;
pub use progress_report::{
    ActivityStatus, DelayReason, ProgressReport, ProjectProgress, Workplan, WorkplanActivity,
};
pub use proposal::{CostCategory, CostEstimate, CostEstimates, FullProposal};
