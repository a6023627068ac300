use chrono::Utc;
use serde::Serialize;

use crate::campaign::CampaignId;
use crate::error::Error;
use crate::marketplace::Marketplace;
use crate::notify::Severity;
use crate::transition::Transition;
use crate::user::{Identity, Role};

use super::{Invite, InviteDraft, InviteId, InviteStatus};

#[derive(Clone, Debug, Serialize)]
pub struct InviteUpdate {
    pub invite: Invite,
    pub transition: Transition<InviteStatus>,
}

#[tracing::instrument(skip(market))]
pub async fn send_invite(
    market: &mut Marketplace,
    identity: &Identity,
    campaign_id: CampaignId,
    draft: InviteDraft,
) -> Result<Invite, Error> {
    identity.require(Role::Business, "send invite")?;
    draft.validate()?;

    let campaign = market
        .campaign(campaign_id)
        .ok_or(Error::CampaignNotFound { campaign_id })?;
    if campaign.owner_id != identity.actor_id {
        return Err(Error::NotParticipant {
            actor_id: identity.actor_id,
        });
    }

    let outstanding = market.invites.values().find(|invite| {
        invite.campaign_id == campaign_id
            && invite.influencer_id == draft.influencer_id
            && invite.status == InviteStatus::Pending
    });
    if let Some(outstanding) = outstanding {
        return Err(Error::AlreadyInvited {
            campaign_id,
            influencer_id: draft.influencer_id,
            invite_id: outstanding.id,
        });
    }

    let now = Utc::now();
    let invite = Invite {
        id: InviteId::new(),
        campaign_id,
        business_id: identity.actor_id,
        influencer_id: draft.influencer_id,
        message: draft.message.trim().to_owned(),
        offer_rate: draft
            .offer_rate
            .map(|rate| rate.trim().to_owned())
            .filter(|rate| !rate.is_empty()),
        status: InviteStatus::Pending,
        sent_date: now,
        modified_at: now,
    };

    market.invites.insert(invite.id, invite.clone());
    market.persist_invites().await;
    market.notify("Invite sent", Severity::Success);

    Ok(invite)
}

/// Sent invites for a business, received invites for an influencer.
#[tracing::instrument(skip(market))]
pub fn get_invites(market: &Marketplace, identity: &Identity) -> Vec<Invite> {
    market
        .invites()
        .into_iter()
        .filter(|invite| match identity.role {
            Role::Business => invite.business_id == identity.actor_id,
            Role::Influencer => invite.influencer_id == identity.actor_id,
        })
        .cloned()
        .collect()
}

#[tracing::instrument(skip(market))]
pub async fn respond_to_invite(
    market: &mut Marketplace,
    identity: &Identity,
    invite_id: InviteId,
    status: InviteStatus,
) -> Result<InviteUpdate, Error> {
    identity.require(Role::Influencer, "respond to invite")?;

    let mut invite = market
        .invite(invite_id)
        .cloned()
        .ok_or(Error::InviteNotFound { invite_id })?;
    if invite.influencer_id != identity.actor_id {
        return Err(Error::NotParticipant {
            actor_id: identity.actor_id,
        });
    }

    let transition = Transition::validate(invite.status, status).ok_or(
        Error::InviteTransitionNotAllowed {
            invite_id,
            from: invite.status,
            to: status,
        },
    )?;

    if transition.changed {
        invite.status = transition.to;
        invite.modified_at = Utc::now();

        market.invites.insert(invite.id, invite.clone());
        market.persist_invites().await;
        market.notify(&format!("Invite {}", transition.to), Severity::Success);
    }

    Ok(InviteUpdate { invite, transition })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invite::db;
    use crate::marketplace::test::{harness, live_campaign};
    use crate::user::UserId;

    fn draft(influencer_id: UserId) -> InviteDraft {
        InviteDraft {
            influencer_id,
            message: "We love your content".into(),
            offer_rate: Some(" SGD 800 ".into()),
        }
    }

    #[tokio::test]
    async fn send_and_accept() {
        let mut h = harness();
        let business = Identity::business(UserId::new());
        let influencer = Identity::influencer(UserId::new());
        let campaign = live_campaign(&mut h.market, business.actor_id);

        let invite = send_invite(&mut h.market, &business, campaign.id, draft(influencer.actor_id))
            .await
            .unwrap();
        assert_eq!(invite.offer_rate.as_deref(), Some("SGD 800"));
        assert_eq!(get_invites(&h.market, &influencer).len(), 1);
        assert_eq!(get_invites(&h.market, &business).len(), 1);

        let update = respond_to_invite(&mut h.market, &influencer, invite.id, InviteStatus::Accepted)
            .await
            .unwrap();
        assert!(update.transition.changed);
        assert_eq!(update.invite.status, InviteStatus::Accepted);

        let stored = db::load_invites(&*h.store).await;
        assert_eq!(stored[0].status, InviteStatus::Accepted);
    }

    #[tokio::test]
    async fn only_one_pending_invite_per_influencer() {
        let mut h = harness();
        let business = Identity::business(UserId::new());
        let influencer_id = UserId::new();
        let campaign = live_campaign(&mut h.market, business.actor_id);
        let first = send_invite(&mut h.market, &business, campaign.id, draft(influencer_id))
            .await
            .unwrap();

        let result = send_invite(&mut h.market, &business, campaign.id, draft(influencer_id)).await;

        assert_eq!(
            result.unwrap_err(),
            Error::AlreadyInvited {
                campaign_id: campaign.id,
                influencer_id,
                invite_id: first.id,
            }
        );
    }

    #[tokio::test]
    async fn declined_invites_stay_declined() {
        let mut h = harness();
        let business = Identity::business(UserId::new());
        let influencer = Identity::influencer(UserId::new());
        let campaign = live_campaign(&mut h.market, business.actor_id);
        let invite = send_invite(&mut h.market, &business, campaign.id, draft(influencer.actor_id))
            .await
            .unwrap();
        respond_to_invite(&mut h.market, &influencer, invite.id, InviteStatus::Declined)
            .await
            .unwrap();

        let result =
            respond_to_invite(&mut h.market, &influencer, invite.id, InviteStatus::Accepted).await;

        assert_eq!(
            result.unwrap_err(),
            Error::InviteTransitionNotAllowed {
                invite_id: invite.id,
                from: InviteStatus::Declined,
                to: InviteStatus::Accepted,
            }
        );
    }

    #[tokio::test]
    async fn only_the_invited_influencer_responds() {
        let mut h = harness();
        let business = Identity::business(UserId::new());
        let campaign = live_campaign(&mut h.market, business.actor_id);
        let invite = send_invite(&mut h.market, &business, campaign.id, draft(UserId::new()))
            .await
            .unwrap();
        let other = Identity::influencer(UserId::new());

        let result = respond_to_invite(&mut h.market, &other, invite.id, InviteStatus::Accepted).await;

        assert_eq!(
            result.unwrap_err(),
            Error::NotParticipant {
                actor_id: other.actor_id
            }
        );
        assert_eq!(h.market.invite(invite.id).unwrap().status, InviteStatus::Pending);
    }
}
