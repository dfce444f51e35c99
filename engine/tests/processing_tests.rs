//! Submission processing and collection sweep tests
//!
//! Exercises the host-facing flows end to end:
//! - Effects emitted when a parcel is processed
//! - Premium upgrade with the one-off bonus
//! - Collection calendar, WTN reminders and subscription expiry
//! - JSON job dispatch

use chrono::NaiveDate;
use engine::jobs::{Engine, Job};
use engine::services::{CollectionService, RewardService};
use engine::{Config, Effect, EmailKind, EngineError};
use rust_decimal::Decimal;
use shared::{
    CustomerAccount, MaterialKind, MembershipState, MembershipTier, PremiumMilestone, RateTable,
    RewardPolicy, Submission, SubmissionStatus, Subscriber, Subscription, SubscriptionPlan,
    WasteTransferNote,
};
use uuid::Uuid;

/// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn service() -> RewardService {
    RewardService::new(RewardPolicy::default(), RateTable::standard())
}

fn account(count: u32, weight: &str, is_premium: bool, total_points: u64) -> CustomerAccount {
    CustomerAccount {
        customer_id: Uuid::new_v4(),
        name: "Alex Maker".into(),
        email: "alex@example.com".into(),
        total_points,
        membership: MembershipState {
            is_premium,
            verified_weight_kg: dec(weight),
            processed_submission_count: count,
        },
    }
}

fn processed(account: &CustomerAccount, weights: &[(&str, &str)]) -> Submission {
    let kinds = weights.iter().map(|(k, _)| MaterialKind::new(k));
    let mut submission = Submission::new(account.customer_id, kinds);
    submission.advance(SubmissionStatus::Received).unwrap();
    for (kind, weight) in weights {
        submission
            .record_weight(&MaterialKind::new(kind), dec(weight))
            .unwrap();
    }
    submission.advance(SubmissionStatus::Processed).unwrap();
    submission
}

fn subscriber(name: &str, plan: SubscriptionPlan, reference: NaiveDate) -> Subscriber {
    Subscriber {
        customer_id: Uuid::new_v4(),
        name: name.into(),
        email: format!("{}@example.com", name.to_lowercase()),
        subscription: Subscription::new(plan, reference),
        wtn: WasteTransferNote::default(),
    }
}

// ============================================================================
// Submission Processing
// ============================================================================

mod submission_processing {
    use super::*;

    #[test]
    fn basic_parcel_emits_award_then_email() {
        let account = account(0, "0", false, 0);
        let submission = processed(&account, &[("PLA", "5.0")]);

        let outcome = service()
            .on_submission_processed(&submission, &account)
            .unwrap();

        assert_eq!(outcome.points_awarded, 500);
        assert!(!outcome.premium_unlocked);
        assert_eq!(outcome.total_points, 500);
        assert_eq!(outcome.membership.processed_submission_count, 1);
        assert_eq!(outcome.membership.verified_weight_kg, dec("5.0"));

        assert_eq!(outcome.effects.len(), 3);
        assert_eq!(
            outcome.effects[0],
            Effect::AwardPoints {
                customer_id: account.customer_id,
                submission_id: submission.id,
                points: 500,
            }
        );
        assert_eq!(
            outcome.effects[1],
            Effect::MarkPointsAwarded {
                submission_id: submission.id
            }
        );
        match &outcome.effects[2] {
            Effect::SendEmail(email) => {
                assert_eq!(email.to, "alex@example.com");
                assert_eq!(
                    email.kind,
                    EmailKind::ParcelProcessed {
                        parcel_reference: submission.to_string(),
                        points_awarded: 500,
                        membership: MembershipTier::Basic,
                        total_points: 500,
                    }
                );
            }
            other => panic!("expected an email, got {:?}", other),
        }
    }

    #[test]
    fn premium_member_earns_premium_rate() {
        let account = account(12, "30.0", true, 2_000);
        let submission = processed(&account, &[("PLA", "5.0"), ("PETG", "3.0")]);

        let outcome = service()
            .on_submission_processed(&submission, &account)
            .unwrap();

        // (5.0 x 120) + (3.0 x 120)
        assert_eq!(outcome.points_awarded, 960);
        assert!(!outcome.premium_unlocked);
        assert_eq!(outcome.total_points, 2_960);
        assert_eq!(outcome.effects.len(), 3);
    }

    #[test]
    fn tenth_parcel_unlocks_premium() {
        let account = account(9, "5.0", false, 900);
        let submission = processed(&account, &[("PLA", "1.0")]);

        let outcome = service()
            .on_submission_processed(&submission, &account)
            .unwrap();

        // Points at the basic rate; the upgrade applies from the next parcel
        assert_eq!(outcome.points_awarded, 100);
        assert!(outcome.premium_unlocked);
        assert!(outcome.membership.is_premium);
        assert_eq!(outcome.total_points, 900 + 100 + 500);

        assert_eq!(outcome.effects.len(), 6);
        assert_eq!(
            outcome.effects[3],
            Effect::UpgradeToPremium {
                customer_id: account.customer_id
            }
        );
        assert_eq!(
            outcome.effects[4],
            Effect::AwardBonus {
                customer_id: account.customer_id,
                points: 500
            }
        );
        match &outcome.effects[5] {
            Effect::SendEmail(email) => match &email.kind {
                EmailKind::PremiumUpgrade {
                    milestone,
                    bonus_points,
                    parcel_count,
                    total_points,
                    ..
                } => {
                    assert_eq!(*milestone, PremiumMilestone::ParcelCount(10));
                    assert_eq!(milestone.to_string(), "recycling 10 parcels");
                    assert_eq!(*bonus_points, 500);
                    assert_eq!(*parcel_count, 10);
                    assert_eq!(*total_points, 1_500);
                }
                other => panic!("expected premium upgrade email, got {:?}", other),
            },
            other => panic!("expected an email, got {:?}", other),
        }
    }

    #[test]
    fn verified_weight_unlocks_premium() {
        let account = account(2, "22.5", false, 0);
        let submission = processed(&account, &[("PETG", "3.0")]);

        let outcome = service()
            .on_submission_processed(&submission, &account)
            .unwrap();

        assert!(outcome.premium_unlocked);
        assert_eq!(outcome.membership.verified_weight_kg, dec("25.5"));
        let milestone = outcome.effects.iter().find_map(|e| match e {
            Effect::SendEmail(email) => match &email.kind {
                EmailKind::PremiumUpgrade { milestone, .. } => Some(milestone.clone()),
                _ => None,
            },
            _ => None,
        });
        assert_eq!(
            milestone.map(|m| m.to_string()).as_deref(),
            Some("recycling 25.5kg of plastic")
        );
    }

    #[test]
    fn bonus_follows_configured_policy() {
        let policy = RewardPolicy {
            premium_parcel_threshold: 3,
            premium_bonus_points: 750,
            ..RewardPolicy::default()
        };
        let service = RewardService::new(policy, RateTable::standard());
        let account = account(2, "0", false, 0);
        let submission = processed(&account, &[("PLA", "0.5")]);

        let outcome = service.on_submission_processed(&submission, &account).unwrap();
        assert!(outcome.premium_unlocked);
        assert_eq!(outcome.total_points, 50 + 750);
    }

    #[test]
    fn existing_premium_member_gets_no_second_bonus() {
        let account = account(20, "80.0", true, 0);
        let submission = processed(&account, &[("PLA", "1.0")]);

        let outcome = service()
            .on_submission_processed(&submission, &account)
            .unwrap();
        assert!(!outcome.premium_unlocked);
        assert!(!outcome
            .effects
            .iter()
            .any(|e| matches!(e, Effect::AwardBonus { .. })));
    }

    #[test]
    fn already_awarded_submission_is_a_no_op() {
        let account = account(3, "4.0", false, 1_000);
        let mut submission = processed(&account, &[("PLA", "5.0")]);
        submission.points_awarded = true;

        let outcome = service()
            .on_submission_processed(&submission, &account)
            .unwrap();
        assert!(outcome.effects.is_empty());
        assert_eq!(outcome.points_awarded, 0);
        assert_eq!(outcome.total_points, 1_000);
    }

    #[test]
    fn unknown_material_skipped_by_default() {
        let account = account(0, "0", false, 0);
        let submission = processed(&account, &[("PLA", "1.0"), ("ABS", "4.0")]);

        let outcome = service()
            .on_submission_processed(&submission, &account)
            .unwrap();
        assert_eq!(outcome.points_awarded, 100);
        // Unrated plastic still counts toward the weight threshold
        assert_eq!(outcome.membership.verified_weight_kg, dec("5.0"));
    }

    #[test]
    fn strict_policy_rejects_unknown_material() {
        let policy = RewardPolicy {
            reject_unknown_materials: true,
            ..RewardPolicy::default()
        };
        let service = RewardService::new(policy, RateTable::standard());
        let account = account(0, "0", false, 0);
        let submission = processed(&account, &[("ABS", "4.0")]);

        let err = service
            .on_submission_processed(&submission, &account)
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownMaterial(_)));
        assert_eq!(err.code(), "UNKNOWN_MATERIAL");
    }

    #[test]
    fn zero_point_parcel_is_not_awarded() {
        let account = account(9, "24.0", false, 300);
        let submission = processed(&account, &[("ABS", "3.0")]);

        let outcome = service()
            .on_submission_processed(&submission, &account)
            .unwrap();
        assert_eq!(outcome.points_awarded, 0);
        assert!(outcome.effects.is_empty());
        // Thresholds are met, but the upgrade waits for a parcel that earns points
        assert!(!outcome.premium_unlocked);
        assert_eq!(outcome.total_points, 300);
        assert_eq!(outcome.membership.processed_submission_count, 10);
    }

    #[test]
    fn received_submission_is_rejected() {
        let account = account(0, "0", false, 0);
        let mut submission = Submission::new(account.customer_id, [MaterialKind::pla()]);
        submission.advance(SubmissionStatus::Received).unwrap();

        let err = service()
            .on_submission_processed(&submission, &account)
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_STATE_TRANSITION");
    }
}

// ============================================================================
// Collection Scheduling
// ============================================================================

mod collection_scheduling {
    use super::*;

    #[test]
    fn monthly_calendar_uses_recurrence() {
        let service = CollectionService::new(3);
        let subscribers = vec![
            // 4th Thursday
            subscriber("Thursday", SubscriptionPlan::Monthly, date(2025, 12, 25)),
            // 5th Monday; April 2026 has four
            subscriber("Monday", SubscriptionPlan::Weekly, date(2026, 3, 30)),
        ];

        let events = service
            .collections_for_month(&subscribers, &[], 2026, 4)
            .unwrap();
        let dates: Vec<_> = events.iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![date(2026, 4, 23), date(2026, 4, 27)]);
    }

    #[test]
    fn invalid_month_maps_to_invalid_argument() {
        let err = CollectionService::new(3)
            .collections_for_month(&[], &[], 2026, 13)
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_ARGUMENT");
    }

    #[test]
    fn wtn_reminder_three_working_days_ahead() {
        let service = CollectionService::new(3);
        let due = subscriber("Due", SubscriptionPlan::Monthly, date(2025, 12, 25));
        let later = subscriber("Later", SubscriptionPlan::Monthly, date(2026, 1, 5));
        let mut signed = subscriber("Signed", SubscriptionPlan::Monthly, date(2025, 12, 25));
        signed
            .wtn
            .sign(dec("5.5"), "data:image/png;base64,iVBORw0KGgo", chrono::Utc::now())
            .unwrap();
        let mut reminded = subscriber("Reminded", SubscriptionPlan::Monthly, date(2025, 12, 25));
        reminded.wtn.mark_reminded(chrono::Utc::now());
        let due_id = due.customer_id;

        // Monday 19 Oct 2026; the 4th Thursday is the 22nd
        let effects = service
            .wtn_reminders_due(&[due, later, signed, reminded], date(2026, 10, 19))
            .unwrap();

        assert_eq!(effects.len(), 2);
        match &effects[0] {
            Effect::SendEmail(email) => {
                assert_eq!(email.to, "due@example.com");
                assert_eq!(
                    email.kind,
                    EmailKind::WtnReminder {
                        collection_date: date(2026, 10, 22)
                    }
                );
            }
            other => panic!("expected an email, got {:?}", other),
        }
        assert_eq!(
            effects[1],
            Effect::MarkWtnReminderSent {
                customer_id: due_id,
                collection_date: date(2026, 10, 22),
            }
        );
    }

    #[test]
    fn expiry_sweep_resets_plan() {
        let service = CollectionService::new(3);
        let mut ended = subscriber("Ended", SubscriptionPlan::Weekly, date(2026, 10, 1));
        ended.subscription.cancel();
        let ended_id = ended.customer_id;
        let mut subscribers = vec![ended];

        let sweep = service.expire_subscriptions(&mut subscribers, date(2026, 10, 2));
        assert_eq!(sweep.expired, 1);
        assert_eq!(
            sweep.effects,
            vec![Effect::SubscriptionExpired {
                customer_id: ended_id,
                end_date: date(2026, 10, 1),
            }]
        );
        assert!(!subscribers[0].subscription.has_service_access(date(2026, 10, 2)));

        let again = service.expire_subscriptions(&mut subscribers, date(2026, 10, 3));
        assert_eq!(again.expired, 0);
    }
}

// ============================================================================
// Job Dispatch
// ============================================================================

mod job_dispatch {
    use super::*;
    use serde_json::json;

    fn engine() -> Engine {
        Engine::new(&Config::build("test", None).unwrap())
    }

    #[test]
    fn preview_points_job() {
        let job: Job = serde_json::from_value(json!({
            "job": "preview_points",
            "materials": [
                { "material_kind": "pla", "weight_kg": "2.567" },
                { "material_kind": "PETG", "weight_kg": null }
            ]
        }))
        .unwrap();
        assert_eq!(job.name(), "preview_points");

        let result = engine().run(job).unwrap();
        assert_eq!(result["total"], 256);
        assert_eq!(result["unweighed"], json!(["PETG"]));
    }

    #[test]
    fn premium_progress_job() {
        let job: Job = serde_json::from_value(json!({
            "job": "premium_progress",
            "membership": {
                "is_premium": false,
                "verified_weight_kg": "12.5",
                "processed_submission_count": 4
            }
        }))
        .unwrap();

        let result = engine().run(job).unwrap();
        assert_eq!(result["eligible"], false);
        assert_eq!(result["progress_percent"], 50.0);
        assert_eq!(result["shortfall"]["parcels_remaining"], 6);
    }

    #[test]
    fn process_job_with_overflowing_weights_returns_error_envelope() {
        let account = account(0, "0", false, 0);
        let mut submission = processed(&account, &[("PLA", "1.0"), ("PETG", "1.0")]);
        let huge = dec("79228162514264337593543950335");
        for entry in &mut submission.materials {
            entry.weight_kg = Some(huge);
        }

        let job: Job = serde_json::from_value(json!({
            "job": "process_submission",
            "submission": submission,
            "account": account,
        }))
        .unwrap();

        let err = engine().run(job).unwrap_err();
        let response = serde_json::to_value(err.to_response()).unwrap();
        assert_eq!(response["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(response["error"]["field"], "weight_kg");
    }

    #[test]
    fn calendar_job_lists_payg_requests() {
        let account = account(0, "0", false, 0);
        let mut submission = Submission::new(account.customer_id, [MaterialKind::pla()]);
        submission.submitted_at = "2026-04-09T10:00:00Z".parse().unwrap();

        let job: Job = serde_json::from_value(json!({
            "job": "collection_calendar",
            "year": 2026,
            "month": 4,
            "subscribers": [subscriber("Monthly", SubscriptionPlan::Monthly, date(2025, 12, 25))],
            "requests": [{ "customer_name": "Walk-in", "submission": submission }],
        }))
        .unwrap();

        let result = engine().run(job).unwrap();
        assert_eq!(result[0]["type"], "payg_request");
        assert_eq!(result[0]["date"], "2026-04-09");
        assert_eq!(result[0]["customer_name"], "Walk-in");
        assert_eq!(result[1]["type"], "subscription");
        assert_eq!(result[1]["date"], "2026-04-23");
    }

    #[test]
    fn wtn_jobs_walk_the_lifecycle() {
        let customer = subscriber("Signer", SubscriptionPlan::Monthly, date(2025, 12, 25));

        let unsigned: Job = serde_json::from_value(json!({
            "job": "approve_wtn",
            "subscriber": customer,
            "admin_signature": "data:image/png;base64,admin",
        }))
        .unwrap();
        assert_eq!(engine().run(unsigned).unwrap_err().code(), "INVALID_STATE_TRANSITION");

        let sign: Job = serde_json::from_value(json!({
            "job": "sign_wtn",
            "subscriber": customer,
            "estimated_weight_kg": "5.5",
            "signature": "data:image/png;base64,customer",
        }))
        .unwrap();
        let signed = engine().run(sign).unwrap();
        assert_eq!(signed["wtn_status"], "signed");
        assert_eq!(signed["effects"][0]["effect"], "record_wtn_signature");

        let approve: Job = serde_json::from_value(json!({
            "job": "approve_wtn",
            "subscriber": signed["subscriber"],
            "admin_signature": "data:image/png;base64,admin",
        }))
        .unwrap();
        let approved = engine().run(approve).unwrap();
        assert_eq!(approved["wtn_status"], "approved");
        assert_eq!(approved["effects"][0]["effect"], "approve_wtn");
    }

    #[test]
    fn calendar_job_with_invalid_month_fails() {
        let job: Job = serde_json::from_value(json!({
            "job": "collection_calendar",
            "year": 2026,
            "month": 0,
            "subscribers": []
        }))
        .unwrap();

        let err = engine().run(job).unwrap_err();
        let response = serde_json::to_value(err.to_response()).unwrap();
        assert_eq!(response["error"]["code"], "INVALID_ARGUMENT");
    }
}
