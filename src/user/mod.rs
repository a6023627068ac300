use std::fmt::{self, Display};
use std::future::{ready, Ready};
use std::str::FromStr;

use actix_web::dev::Payload;
use actix_web::http::header::HeaderMap;
use actix_web::{FromRequest, HttpRequest};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::typedid::{TypedId, TypedIdMarker};

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

pub type UserId = TypedId<User>;

#[derive(Clone, Debug)]
pub struct User;

impl TypedIdMarker for User {
    fn tag() -> &'static str {
        "USR"
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Business,
    Influencer,
}

impl Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Business => f.write_str("business"),
            Role::Influencer => f.write_str("influencer"),
        }
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Role, ()> {
        match s.trim().to_ascii_lowercase().as_str() {
            "business" => Ok(Role::Business),
            "influencer" | "creator" | "kol" => Ok(Role::Influencer),
            _ => Err(()),
        }
    }
}

/// The acting user as vouched for by the session layer in front of this
/// service. Nothing here authenticates; the role is trusted as given.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct Identity {
    pub actor_id: UserId,
    pub role: Role,
}

impl Identity {
    pub fn business(actor_id: UserId) -> Identity {
        Identity {
            actor_id,
            role: Role::Business,
        }
    }

    pub fn influencer(actor_id: UserId) -> Identity {
        Identity {
            actor_id,
            role: Role::Influencer,
        }
    }

    pub fn require(&self, role: Role, action: &'static str) -> Result<(), Error> {
        if self.role != role {
            return Err(Error::ForbiddenForRole {
                role: self.role,
                action,
            });
        }

        Ok(())
    }

    pub fn from_headers(headers: &HeaderMap) -> Result<Identity, Error> {
        let actor_id = headers
            .get(ACTOR_ID_HEADER)
            .ok_or(Error::MissingIdentity {
                header: ACTOR_ID_HEADER,
            })?
            .to_str()
            .ok()
            .and_then(|value| value.parse::<UserId>().ok())
            .ok_or(Error::InvalidIdentity {
                header: ACTOR_ID_HEADER,
            })?;

        let role = headers
            .get(ACTOR_ROLE_HEADER)
            .ok_or(Error::MissingIdentity {
                header: ACTOR_ROLE_HEADER,
            })?
            .to_str()
            .ok()
            .and_then(|value| value.parse::<Role>().ok())
            .ok_or(Error::InvalidIdentity {
                header: ACTOR_ROLE_HEADER,
            })?;

        Ok(Identity { actor_id, role })
    }
}

impl FromRequest for Identity {
    type Error = Error;
    type Future = Ready<Result<Identity, Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Identity::from_headers(req.headers()))
    }
}
