use thiserror::Error;

use customercenter_core::{DomainError, OptionId, PathId};
use customercenter_offers::CustomerInfoError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CenterError {
    #[error("unknown help path: {0}")]
    UnknownPath(PathId),

    #[error("unknown survey option: {0}")]
    UnknownOption(OptionId),

    #[error("no feedback survey is being shown")]
    NoActiveSurvey,

    #[error("customer has no active subscription")]
    NoActiveSubscription,

    #[error(transparent)]
    CustomerInfo(#[from] CustomerInfoError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}
