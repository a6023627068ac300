use chrono::Utc;
use serde::Serialize;

use crate::error::Error;
use crate::marketplace::Marketplace;
use crate::notify::Severity;
use crate::transition::Transition;
use crate::user::Identity;

use super::{Deal, DealAction, DealId, DealStatus, EscrowStatus};

#[derive(Clone, Debug, Serialize)]
pub struct DealUpdate {
    pub deal: Deal,
    pub transition: Transition<DealStatus>,
}

/// Deals the actor is a party to, oldest first.
#[tracing::instrument(skip(market))]
pub fn get_deals(market: &Marketplace, identity: &Identity) -> Vec<Deal> {
    market
        .deals()
        .into_iter()
        .filter(|deal| deal.is_participant(identity))
        .cloned()
        .collect()
}

#[tracing::instrument(skip(market))]
pub fn get_deal_by_id(
    market: &Marketplace,
    identity: &Identity,
    deal_id: DealId,
) -> Result<Deal, Error> {
    let deal = market
        .deal(deal_id)
        .cloned()
        .ok_or(Error::DealNotFound { deal_id })?;

    if !deal.is_participant(identity) {
        return Err(Error::NotParticipant {
            actor_id: identity.actor_id,
        });
    }

    Ok(deal)
}

#[tracing::instrument(skip(market))]
pub async fn fund_escrow(
    market: &mut Marketplace,
    identity: &Identity,
    deal_id: DealId,
) -> Result<DealUpdate, Error> {
    advance(market, identity, deal_id, DealAction::FundEscrow, |deal| {
        deal.escrow_status = EscrowStatus::Funded;
    })
    .await
}

/// Moves the deal to review. Any files sent along are appended first.
#[tracing::instrument(skip(market))]
pub async fn submit_deliverables(
    market: &mut Marketplace,
    identity: &Identity,
    deal_id: DealId,
    files: Vec<String>,
) -> Result<DealUpdate, Error> {
    let files = clean_files(files);
    advance(market, identity, deal_id, DealAction::Submit, move |deal| {
        deal.files.extend(files);
    })
    .await
}

#[tracing::instrument(skip(market))]
pub async fn approve_deliverables(
    market: &mut Marketplace,
    identity: &Identity,
    deal_id: DealId,
) -> Result<DealUpdate, Error> {
    advance(market, identity, deal_id, DealAction::Approve, |_| {}).await
}

#[tracing::instrument(skip(market))]
pub async fn request_revision(
    market: &mut Marketplace,
    identity: &Identity,
    deal_id: DealId,
    note: Option<String>,
) -> Result<DealUpdate, Error> {
    let note = note
        .map(|note| note.trim().to_owned())
        .filter(|note| !note.is_empty());
    advance(market, identity, deal_id, DealAction::RequestRevision, move |deal| {
        deal.revision_notes.extend(note);
    })
    .await
}

#[tracing::instrument(skip(market))]
pub async fn complete_and_pay(
    market: &mut Marketplace,
    identity: &Identity,
    deal_id: DealId,
) -> Result<DealUpdate, Error> {
    advance(market, identity, deal_id, DealAction::CompleteAndPay, |_| {}).await
}

// Shared path for every table-driven action. `effect` runs only when the
// status actually changes; a repeated action leaves the deal untouched.
async fn advance<F>(
    market: &mut Marketplace,
    identity: &Identity,
    deal_id: DealId,
    action: DealAction,
    effect: F,
) -> Result<DealUpdate, Error>
where
    F: FnOnce(&mut Deal),
{
    identity.require(action.role(), action.label())?;
    let mut deal = get_deal_by_id(market, identity, deal_id)?;

    let transition = Transition::validate(deal.status, action.target()).ok_or(
        Error::DealTransitionNotAllowed {
            deal_id,
            from: deal.status,
            action,
        },
    )?;

    if !transition.changed {
        return Ok(DealUpdate { deal, transition });
    }

    deal.status = transition.to;
    effect(&mut deal);
    deal.modified_at = Utc::now();

    market.deals.insert(deal.id, deal.clone());
    market.persist_deals().await;
    market.notify(&notice(action), Severity::Success);

    Ok(DealUpdate { deal, transition })
}

fn notice(action: DealAction) -> String {
    match action {
        DealAction::FundEscrow => "Escrow funded, work can begin".to_owned(),
        DealAction::Submit => "Deliverables submitted for review".to_owned(),
        DealAction::Approve => "Deliverables approved".to_owned(),
        DealAction::RequestRevision => "Revision requested".to_owned(),
        DealAction::CompleteAndPay => "Deal completed and payment released".to_owned(),
    }
}

fn clean_files(files: Vec<String>) -> Vec<String> {
    files
        .into_iter()
        .map(|file| file.trim().to_owned())
        .filter(|file| !file.is_empty())
        .collect()
}

/// Flips one checklist item. Either participant may do this in any status.
#[tracing::instrument(skip(market))]
pub async fn toggle_deliverable(
    market: &mut Marketplace,
    identity: &Identity,
    deal_id: DealId,
    index: usize,
) -> Result<Deal, Error> {
    let mut deal = get_deal_by_id(market, identity, deal_id)?;

    let deliverable = deal
        .deliverables
        .get_mut(index)
        .ok_or(Error::DeliverableNotFound { deal_id, index })?;
    deliverable.completed = !deliverable.completed;
    deal.modified_at = Utc::now();

    market.deals.insert(deal.id, deal.clone());
    market.persist_deals().await;
    market.notify("Checklist updated", Severity::Info);

    Ok(deal)
}

#[tracing::instrument(skip(market))]
pub async fn attach_file(
    market: &mut Marketplace,
    identity: &Identity,
    deal_id: DealId,
    file: String,
) -> Result<Deal, Error> {
    let mut deal = get_deal_by_id(market, identity, deal_id)?;

    let file = file.trim();
    if file.is_empty() {
        return Err(Error::ValidationFailed {
            field: "file",
            reason: "must not be blank",
        });
    }

    deal.files.push(file.to_owned());
    deal.modified_at = Utc::now();

    market.deals.insert(deal.id, deal.clone());
    market.persist_deals().await;
    market.notify("File attached", Severity::Info);

    Ok(deal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{Application, ApplicationId, ApplicationStatus};
    use crate::deal::{db, materialize};
    use crate::marketplace::test::{harness, live_campaign, Harness};
    use crate::user::{Role, UserId};
    use crate::views;

    struct Parties {
        business: Identity,
        influencer: Identity,
        deal_id: DealId,
    }

    fn open_deal(h: &mut Harness) -> Parties {
        let business = Identity::business(UserId::new());
        let influencer = Identity::influencer(UserId::new());
        let campaign = live_campaign(&mut h.market, business.actor_id);
        let now = Utc::now();
        let application = Application {
            id: ApplicationId::new(),
            campaign_id: campaign.id,
            business_id: business.actor_id,
            applicant_id: influencer.actor_id,
            applicant_name: "Mia".into(),
            proposed_rate: None,
            pitch: "Hi".into(),
            status: ApplicationStatus::Accepted,
            applied_date: now,
            modified_at: now,
        };
        let deal = materialize(&application, Some(&campaign), business.actor_id, now);
        let deal_id = deal.id;
        h.market.applications.insert(application.id, application);
        h.market.deals.insert(deal.id, deal);

        Parties {
            business,
            influencer,
            deal_id,
        }
    }

    #[tokio::test]
    async fn full_happy_path() {
        let mut h = harness();
        let p = open_deal(&mut h);

        let funded = fund_escrow(&mut h.market, &p.business, p.deal_id).await.unwrap();
        assert_eq!(funded.deal.status, DealStatus::InProgress);
        assert_eq!(funded.deal.escrow_status, EscrowStatus::Funded);

        let submitted = submit_deliverables(
            &mut h.market,
            &p.influencer,
            p.deal_id,
            vec!["reel.mp4".into(), " ".into()],
        )
        .await
        .unwrap();
        assert_eq!(submitted.deal.status, DealStatus::Submitted);
        assert_eq!(submitted.deal.files, vec!["reel.mp4".to_owned()]);

        approve_deliverables(&mut h.market, &p.business, p.deal_id)
            .await
            .unwrap();
        let completed = complete_and_pay(&mut h.market, &p.business, p.deal_id)
            .await
            .unwrap();
        assert_eq!(completed.deal.status, DealStatus::Completed);

        let stored = db::load_deals(&*h.store).await;
        assert_eq!(stored[0].status, DealStatus::Completed);
        assert_eq!(h.notifier.notices().len(), 4);
    }

    #[tokio::test]
    async fn revision_round_trip() {
        let mut h = harness();
        let p = open_deal(&mut h);
        fund_escrow(&mut h.market, &p.business, p.deal_id).await.unwrap();
        submit_deliverables(&mut h.market, &p.influencer, p.deal_id, vec![])
            .await
            .unwrap();

        let revised = request_revision(
            &mut h.market,
            &p.business,
            p.deal_id,
            Some("Brighter lighting please".into()),
        )
        .await
        .unwrap();
        assert_eq!(revised.deal.status, DealStatus::RevisionRequested);
        assert_eq!(revised.deal.revision_notes, vec!["Brighter lighting please"]);

        let resubmitted = submit_deliverables(&mut h.market, &p.influencer, p.deal_id, vec![])
            .await
            .unwrap();
        assert_eq!(resubmitted.deal.status, DealStatus::Submitted);
    }

    #[tokio::test]
    async fn approving_a_pending_deal_is_rejected() {
        let mut h = harness();
        let p = open_deal(&mut h);

        let result = approve_deliverables(&mut h.market, &p.business, p.deal_id).await;

        assert_eq!(
            result.unwrap_err(),
            Error::DealTransitionNotAllowed {
                deal_id: p.deal_id,
                from: DealStatus::Pending,
                action: DealAction::Approve,
            }
        );
        assert_eq!(h.market.deal(p.deal_id).unwrap().status, DealStatus::Pending);
        assert!(h.notifier.notices().is_empty());
    }

    #[tokio::test]
    async fn funding_twice_is_a_no_op() {
        let mut h = harness();
        let p = open_deal(&mut h);
        fund_escrow(&mut h.market, &p.business, p.deal_id).await.unwrap();

        let again = fund_escrow(&mut h.market, &p.business, p.deal_id).await.unwrap();

        assert!(!again.transition.changed);
        assert_eq!(h.notifier.notices().len(), 1);
    }

    #[tokio::test]
    async fn influencer_cannot_fund() {
        let mut h = harness();
        let p = open_deal(&mut h);

        let result = fund_escrow(&mut h.market, &p.influencer, p.deal_id).await;

        assert_eq!(
            result.unwrap_err(),
            Error::ForbiddenForRole {
                role: Role::Influencer,
                action: "fund escrow"
            }
        );
    }

    #[tokio::test]
    async fn outsiders_cannot_see_the_deal() {
        let mut h = harness();
        let p = open_deal(&mut h);
        let stranger = Identity::business(UserId::new());

        assert!(get_deal_by_id(&h.market, &stranger, p.deal_id).is_err());
        assert!(get_deals(&h.market, &stranger).is_empty());
        assert_eq!(get_deals(&h.market, &p.influencer).len(), 1);
    }

    #[tokio::test]
    async fn toggling_reports_progress() {
        let mut h = harness();
        let p = open_deal(&mut h);

        let deal = toggle_deliverable(&mut h.market, &p.influencer, p.deal_id, 0)
            .await
            .unwrap();

        let progress = views::deliverable_progress(&deal);
        assert_eq!((progress.completed, progress.total), (1, 2));

        let result = toggle_deliverable(&mut h.market, &p.business, p.deal_id, 2).await;
        assert_eq!(
            result.unwrap_err(),
            Error::DeliverableNotFound {
                deal_id: p.deal_id,
                index: 2
            }
        );
    }

    #[tokio::test]
    async fn files_are_appended() {
        let mut h = harness();
        let p = open_deal(&mut h);

        attach_file(&mut h.market, &p.influencer, p.deal_id, "draft-1.png".into())
            .await
            .unwrap();
        let deal = attach_file(&mut h.market, &p.business, p.deal_id, "brief.pdf".into())
            .await
            .unwrap();

        assert_eq!(deal.files, vec!["draft-1.png", "brief.pdf"]);
        assert!(
            attach_file(&mut h.market, &p.business, p.deal_id, "".into())
                .await
                .is_err()
        );
    }
}
