use std::fmt::{Debug, Display};
use std::io::Error as IoError;

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use chrono::NaiveDate;
use config::ConfigError;
use derivative::Derivative;
use mongodb::error::Error as DatabaseError;
use serde::{Serialize, Serializer};
use serde_json::Error as JsonError;

use crate::application::{ApplicationId, ApplicationStatus};
use crate::campaign::{CampaignId, CampaignStatus};
use crate::deal::{DealAction, DealId, DealStatus};
use crate::invite::{InviteId, InviteStatus};
use crate::user::{Role, UserId};

#[derive(Debug, Serialize, Derivative)]
#[derivative(PartialEq, Eq)]
#[serde(untagged)]
pub enum Error {
    // 400
    #[serde(serialize_with = "display")]
    InvalidJson(#[derivative(PartialEq = "ignore")] JsonPayloadError),
    #[serde(serialize_with = "display")]
    InvalidPath(#[derivative(PartialEq = "ignore")] PathError),
    #[serde(serialize_with = "display")]
    InvalidQuery(#[derivative(PartialEq = "ignore")] QueryPayloadError),
    MissingIdentity {
        header: &'static str,
    },
    InvalidIdentity {
        header: &'static str,
    },
    ValidationFailed {
        field: &'static str,
        reason: &'static str,
    },
    InvalidFilter {
        value: String,
    },

    // 403
    ForbiddenForRole {
        role: Role,
        action: &'static str,
    },
    NotParticipant {
        actor_id: UserId,
    },

    // 404
    PathNotFound,
    CampaignNotFound {
        campaign_id: CampaignId,
    },
    ApplicationNotFound {
        application_id: ApplicationId,
    },
    InviteNotFound {
        invite_id: InviteId,
    },
    DealNotFound {
        deal_id: DealId,
    },
    DeliverableNotFound {
        deal_id: DealId,
        index: usize,
    },
    CreatorNotFound {
        creator_id: UserId,
    },

    // 409
    AlreadyApplied {
        campaign_id: CampaignId,
        application_id: ApplicationId,
    },
    AlreadyInvited {
        campaign_id: CampaignId,
        influencer_id: UserId,
        invite_id: InviteId,
    },
    CampaignNotAcceptingApplications {
        campaign_id: CampaignId,
        status: CampaignStatus,
    },
    ApplicationDeadlinePassed {
        campaign_id: CampaignId,
        deadline: NaiveDate,
    },
    CampaignLocked {
        campaign_id: CampaignId,
        application_count: usize,
    },
    CampaignTransitionNotAllowed {
        campaign_id: CampaignId,
        from: CampaignStatus,
        to: CampaignStatus,
    },
    ApplicationTransitionNotAllowed {
        application_id: ApplicationId,
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
    InviteTransitionNotAllowed {
        invite_id: InviteId,
        from: InviteStatus,
        to: InviteStatus,
    },
    DealTransitionNotAllowed {
        deal_id: DealId,
        from: DealStatus,
        action: DealAction,
    },

    // 500
    #[serde(serialize_with = "display")]
    FailedDatabaseCall(#[derivative(PartialEq = "ignore")] DatabaseError),
    #[serde(serialize_with = "display")]
    FailedToSerialize(#[derivative(PartialEq = "ignore")] JsonError),
    #[serde(serialize_with = "display")]
    IoError(#[derivative(PartialEq = "ignore")] IoError),
    #[serde(serialize_with = "display")]
    InvalidConfiguration(#[derivative(PartialEq = "ignore")] ConfigError),
}

impl Error {
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::InvalidJson(_) => "E4001000",
            Error::InvalidPath(_) => "E4001001",
            Error::InvalidQuery(_) => "E4001002",
            Error::MissingIdentity { .. } => "E4001003",
            Error::InvalidIdentity { .. } => "E4001004",
            Error::ValidationFailed { .. } => "E4001005",
            Error::InvalidFilter { .. } => "E4001006",
            Error::ForbiddenForRole { .. } => "E4031000",
            Error::NotParticipant { .. } => "E4031001",
            Error::PathNotFound => "E4041000",
            Error::CampaignNotFound { .. } => "E4041001",
            Error::ApplicationNotFound { .. } => "E4041002",
            Error::InviteNotFound { .. } => "E4041003",
            Error::DealNotFound { .. } => "E4041004",
            Error::DeliverableNotFound { .. } => "E4041005",
            Error::CreatorNotFound { .. } => "E4041006",
            Error::AlreadyApplied { .. } => "E4091000",
            Error::AlreadyInvited { .. } => "E4091001",
            Error::CampaignNotAcceptingApplications { .. } => "E4091002",
            Error::ApplicationDeadlinePassed { .. } => "E4091003",
            Error::CampaignLocked { .. } => "E4091004",
            Error::CampaignTransitionNotAllowed { .. } => "E4091005",
            Error::ApplicationTransitionNotAllowed { .. } => "E4091006",
            Error::InviteTransitionNotAllowed { .. } => "E4091007",
            Error::DealTransitionNotAllowed { .. } => "E4091008",
            Error::FailedDatabaseCall(_) => "E5001000",
            Error::FailedToSerialize(_) => "E5001001",
            Error::IoError(_) => "E5001002",
            Error::InvalidConfiguration(_) => "E5001003",
        }
    }

    pub fn error_message(&self) -> &'static str {
        match self {
            Error::InvalidJson(_) => "The given json could not be parsed",
            Error::InvalidPath(_) => "The given path could not be parsed",
            Error::InvalidQuery(_) => "The given query could not be parsed",
            Error::MissingIdentity { .. } => "The request did not identify the acting user",
            Error::InvalidIdentity { .. } => "The acting user could not be parsed",
            Error::ValidationFailed { .. } => "The given input is missing or malformed",
            Error::InvalidFilter { .. } => "The given filter or sort could not be parsed",
            Error::ForbiddenForRole { .. } => "The acting user's role cannot perform this action",
            Error::NotParticipant { .. } => "The acting user is not a party to this record",
            Error::PathNotFound => "The requested path was not found",
            Error::CampaignNotFound { .. } => "The requested campaign was not found",
            Error::ApplicationNotFound { .. } => "The requested application was not found",
            Error::InviteNotFound { .. } => "The requested invite was not found",
            Error::DealNotFound { .. } => "The requested deal was not found",
            Error::DeliverableNotFound { .. } => "The requested deliverable was not found",
            Error::CreatorNotFound { .. } => "The requested creator profile was not found",
            Error::AlreadyApplied { .. } => "The acting user already applied to this campaign",
            Error::AlreadyInvited { .. } => {
                "The influencer already has a pending invite for this campaign"
            }
            Error::CampaignNotAcceptingApplications { .. } => {
                "The requested campaign is not open for applications"
            }
            Error::ApplicationDeadlinePassed { .. } => {
                "The requested campaign's application deadline has passed"
            }
            Error::CampaignLocked { .. } => {
                "The requested campaign already has applications and cannot be edited"
            }
            Error::CampaignTransitionNotAllowed { .. } => {
                "The requested campaign status change is not allowed"
            }
            Error::ApplicationTransitionNotAllowed { .. } => {
                "The requested application status change is not allowed"
            }
            Error::InviteTransitionNotAllowed { .. } => {
                "The requested invite status change is not allowed"
            }
            Error::DealTransitionNotAllowed { .. } => {
                "The requested deal action is not allowed in its current status"
            }
            Error::FailedDatabaseCall(_) => {
                "An error occurred when communicating with the database"
            }
            Error::FailedToSerialize(_) => "An error occurred when serializing a record",
            Error::IoError(_) => "An error occurred during an I/O operation",
            Error::InvalidConfiguration(_) => "The service configuration could not be loaded",
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidJson(_) => StatusCode::BAD_REQUEST,
            Error::InvalidPath(_) => StatusCode::BAD_REQUEST,
            Error::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Error::MissingIdentity { .. } => StatusCode::BAD_REQUEST,
            Error::InvalidIdentity { .. } => StatusCode::BAD_REQUEST,
            Error::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
            Error::InvalidFilter { .. } => StatusCode::BAD_REQUEST,
            Error::ForbiddenForRole { .. } => StatusCode::FORBIDDEN,
            Error::NotParticipant { .. } => StatusCode::FORBIDDEN,
            Error::PathNotFound => StatusCode::NOT_FOUND,
            Error::CampaignNotFound { .. } => StatusCode::NOT_FOUND,
            Error::ApplicationNotFound { .. } => StatusCode::NOT_FOUND,
            Error::InviteNotFound { .. } => StatusCode::NOT_FOUND,
            Error::DealNotFound { .. } => StatusCode::NOT_FOUND,
            Error::DeliverableNotFound { .. } => StatusCode::NOT_FOUND,
            Error::CreatorNotFound { .. } => StatusCode::NOT_FOUND,
            Error::AlreadyApplied { .. } => StatusCode::CONFLICT,
            Error::AlreadyInvited { .. } => StatusCode::CONFLICT,
            Error::CampaignNotAcceptingApplications { .. } => StatusCode::CONFLICT,
            Error::ApplicationDeadlinePassed { .. } => StatusCode::CONFLICT,
            Error::CampaignLocked { .. } => StatusCode::CONFLICT,
            Error::CampaignTransitionNotAllowed { .. } => StatusCode::CONFLICT,
            Error::ApplicationTransitionNotAllowed { .. } => StatusCode::CONFLICT,
            Error::InviteTransitionNotAllowed { .. } => StatusCode::CONFLICT,
            Error::DealTransitionNotAllowed { .. } => StatusCode::CONFLICT,
            Error::FailedDatabaseCall(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::FailedToSerialize(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::InvalidConfiguration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        #[derive(Serialize)]
        struct Dummy<'a> {
            error_code: &'static str,
            error_message: &'static str,
            error_meta: &'a Error,
        }

        HttpResponse::build(self.status_code()).json(&Dummy {
            error_code: self.error_code(),
            error_message: self.error_message(),
            error_meta: self,
        })
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        Debug::fmt(self, f)
    }
}

impl From<DatabaseError> for Error {
    fn from(error: DatabaseError) -> Error {
        Error::FailedDatabaseCall(error)
    }
}

impl From<JsonError> for Error {
    fn from(error: JsonError) -> Error {
        Error::FailedToSerialize(error)
    }
}

impl From<IoError> for Error {
    fn from(error: IoError) -> Error {
        Error::IoError(error)
    }
}

impl From<ConfigError> for Error {
    fn from(error: ConfigError) -> Error {
        Error::InvalidConfiguration(error)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidJson(err) => Some(err),
            Error::InvalidPath(err) => Some(err),
            Error::InvalidQuery(err) => Some(err),
            Error::FailedDatabaseCall(err) => Some(err),
            Error::FailedToSerialize(err) => Some(err),
            Error::IoError(err) => Some(err),
            Error::InvalidConfiguration(err) => Some(err),
            _ => None,
        }
    }
}

fn display<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Display,
    S: Serializer,
{
    serializer.collect_str(value)
}
