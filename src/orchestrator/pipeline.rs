//! One user action: raw input -> goal message -> dispatch -> report.

use crate::dispatch::{GoalDispatcher, TransportClient};
use crate::goal;
use crate::model::{now_rfc3339, DispatchOutcome, DispatchReport, GoalMessage, GoalRequest};

/// Run the full pipeline for one request.
///
/// Validation failures short-circuit before the transport is touched. With
/// `dry_run` the payload is built and reported but nothing is published: a
/// well-formed payload still yields `Sent`, with `published` left false.
pub(crate) fn send_goal<T: TransportClient>(
    dispatcher: &GoalDispatcher<T>,
    request: &GoalRequest,
    dry_run: bool,
) -> DispatchReport {
    let mut report = DispatchReport {
        timestamp_utc: now_rfc3339(),
        request: request.clone(),
        topic: dispatcher.topic().to_string(),
        message_type: dispatcher.message_type().to_string(),
        payload: None,
        dry_run,
        published: false,
        outcome: DispatchOutcome::Sent,
    };

    let message = match goal::build_from_request(request) {
        Ok(m) => m,
        Err(e) => {
            tracing::info!(map = %request.target_map, "goal rejected: {e}");
            report.outcome = DispatchOutcome::Failed(e.to_string());
            return report;
        }
    };

    // Serialization is deterministic, so this is byte-for-byte what the
    // dispatcher publishes.
    let payload = goal::to_payload(&message);
    tracing::debug!(%payload, "goal built");

    if dry_run {
        report.outcome = check_round_trip(&message, &payload);
    } else {
        report.outcome = dispatcher.dispatch(message);
        report.published = report.outcome.is_sent();
    }
    report.payload = Some(payload);
    report
}

/// Dry runs double as a format check: the payload must read back to the goal.
fn check_round_trip(message: &GoalMessage, payload: &str) -> DispatchOutcome {
    match goal::parse_goal_fields(payload) {
        Ok(fields)
            if fields.target_map == message.target_map()
                && fields.target_x == message.target_x()
                && fields.target_y == message.target_y() =>
        {
            DispatchOutcome::Sent
        }
        Ok(fields) => DispatchOutcome::Failed(format!(
            "payload reads back as a different goal: {fields:?}"
        )),
        Err(e) => DispatchOutcome::Failed(format!("payload is malformed: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::tests::RecordingTransport;

    fn dispatcher(t: RecordingTransport) -> GoalDispatcher<RecordingTransport> {
        GoalDispatcher::new("/navigate_to_goal/goal", "pkg/Type", t)
    }

    #[test]
    fn valid_request_is_sent_once() {
        let d = dispatcher(RecordingTransport::default());
        let report = send_goal(&d, &GoalRequest::new("map2", 1.5, -2.25), false);

        assert_eq!(report.outcome, DispatchOutcome::Sent);
        assert_eq!(report.topic, "/navigate_to_goal/goal");
        let payload = report.payload.as_deref().unwrap();
        assert!(payload.contains("target_x: 1.5"));
        assert!(payload.contains("target_y: -2.25"));
        assert!(payload.contains("target_map: 'map2'"));

        let calls = d.transport().calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].2, payload);
        assert!(report.published);
    }

    #[test]
    fn empty_map_never_reaches_the_transport() {
        let d = dispatcher(RecordingTransport::default());
        let report = send_goal(&d, &GoalRequest::new("", 0.0, 0.0), false);

        assert_eq!(
            report.outcome,
            DispatchOutcome::Failed("Please enter a target_map.".into())
        );
        assert!(report.payload.is_none());
        assert_eq!(d.transport().call_count(), 0);
    }

    #[test]
    fn transport_failure_is_reported() {
        let d = dispatcher(RecordingTransport::failing("No such file or directory"));
        let report = send_goal(&d, &GoalRequest::new("map1", 0.0, 0.0), false);
        assert!(report
            .outcome
            .failure_reason()
            .is_some_and(|r| r.contains("No such file or directory")));
        assert!(report.payload.is_some());
    }

    #[test]
    fn dry_run_builds_without_publishing() {
        let d = dispatcher(RecordingTransport::default());
        let report = send_goal(&d, &GoalRequest::new(" map1 ", 1.0, 2.0), true);
        assert!(report.dry_run);
        assert!(report.outcome.is_sent());
        assert!(report
            .payload
            .as_deref()
            .is_some_and(|p| p.ends_with("target_map: 'map1'")));
        assert_eq!(d.transport().call_count(), 0);
    }

    #[test]
    fn dry_run_round_trips_quoted_maps() {
        let d = dispatcher(RecordingTransport::default());
        let report = send_goal(&d, &GoalRequest::new("o'neil", -1.25, 0.5), true);
        assert_eq!(report.outcome, DispatchOutcome::Sent);
        assert_eq!(d.transport().call_count(), 0);
    }

    #[test]
    fn each_action_is_independent() {
        let d = dispatcher(RecordingTransport::default());
        let req = GoalRequest::new("map1", 2.0, 3.0);
        let a = send_goal(&d, &req, false);
        let b = send_goal(&d, &req, false);
        assert_eq!(a.payload, b.payload);
        assert_eq!(d.transport().call_count(), 2);
    }

    #[test]
    fn dry_run_json_says_nothing_was_published() {
        let d = dispatcher(RecordingTransport::default());
        let report = send_goal(&d, &GoalRequest::new("map2", 1.5, -2.25), true);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["dry_run"], true);
        assert_eq!(json["published"], false);
        assert_eq!(json["outcome"]["status"], "sent");
        assert_eq!(d.transport().call_count(), 0);
    }

    #[test]
    fn failed_launch_is_not_published() {
        let d = dispatcher(RecordingTransport::failing("No such file or directory"));
        let report = send_goal(&d, &GoalRequest::new("map1", 0.0, 0.0), false);
        assert!(!report.published);
    }
}
