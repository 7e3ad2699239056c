use flight_notifier::classify::{StatusType, classify};
use flight_notifier::diff::DiffedFlight;
use flight_notifier::flight::{Airport, Direction, FlightRecord};
use flight_notifier::infra::luxair::parse_flights;
use flight_notifier::infra::luxairport::parse_board;
use flight_notifier::merge::merge_snapshots;
use flight_notifier::normalize::{exclude_carrier, normalize_carrier_records};
use flight_notifier::pipeline::{Reconciler, reconcile};
use flight_notifier::render::render;
use flight_notifier::validate::validate;

fn expected_departure(scheduled: &str, estimated: &str) -> FlightRecord {
    FlightRecord::departure(
        "LG4711",
        "Luxair",
        Airport::new(Some("CDG"), "Paris"),
        scheduled,
        estimated,
    )
    .with_status("Expected", "EXP")
}

#[test]
fn test_new_delayed_departure_against_empty_snapshot() {
    let notifications = reconcile(&[], &[expected_departure("10:00", "10:35")]).unwrap();

    assert_eq!(notifications.len(), 1);
    let notification = &notifications[0];
    assert_eq!(notification.event.status_type, StatusType::InitialDelayedDeparture);
    assert_eq!(notification.event.diff, Some(35));
    assert!(notification.tweet.contains("expected to depart 35 minutes late"));
}

#[test]
fn test_landed_flight_produces_no_event() {
    let landed = FlightRecord::arrival(
        "LG3752",
        "Luxair",
        Airport::new(Some("OPO"), "Porto"),
        "12:00",
        "14:30",
    )
    .with_status("Landed", "ARR");

    assert!(reconcile(&[], &[landed]).unwrap().is_empty());
}

#[test]
fn test_cancellation_after_prior_observation() {
    let mut reconciler = Reconciler::new(vec![expected_departure("10:00", "10:00")]);

    let cancelled = expected_departure("10:00", "10:00").with_status("Cancelled", "CNX");
    let notifications = reconciler.advance(vec![cancelled]).unwrap();

    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].event.status_type, StatusType::Cancelled);
    assert_eq!(notifications[0].event.diff, None);
    assert_eq!(
        notifications[0].tweet,
        "Luxair flight #LG4711 to Paris #CDG at 10:00 has been cancelled."
    );
}

#[test]
fn test_rendered_tweets_pass_validation_only_within_bounds() {
    let short = render(classify(DiffedFlight::new_leg(expected_departure("10:00", "10:45")))).unwrap();
    assert!(validate(&short).is_ok());

    let long_name = "Aeroporto Internazionale ".repeat(6);
    let long = render(classify(DiffedFlight::new_leg(FlightRecord::departure(
        "LG4711",
        "Luxair",
        Airport::new(Some("FCO"), long_name.trim()),
        "10:00",
        "10:45",
    ))))
    .unwrap();
    assert!(long.tweet_length > 140);
    assert!(validate(&long).is_err());
}

#[test]
fn test_full_pipeline_from_fixtures() {
    let html = include_str!("fixtures/departures.html");
    let json = include_str!("fixtures/arrivals.json");

    let carrier = normalize_carrier_records(parse_flights(Direction::Arrival, json).unwrap());
    let airport = exclude_carrier(parse_board(html, Direction::Departure), "LG");
    assert_eq!(airport.len(), 3);

    let snapshot = merge_snapshots(carrier, airport);
    assert_eq!(snapshot.len(), 5);
    assert_eq!(snapshot[0].flight_number, "LG8012");
    assert_eq!(snapshot[0].airline_name, "Luxair");

    let notifications = reconcile(&[], &snapshot).unwrap();
    let tweets: Vec<_> = notifications.iter().map(|n| n.tweet.as_str()).collect();

    assert_eq!(
        tweets,
        vec![
            "Luxair flight #LG8012 from Munich #MUC is expected to arrive 20 minutes late at 00:10.",
            "Lufthansa flight #LH393 to Frankfurt is expected to depart 45 minutes late at 10:50.",
            "TAP Air Portugal flight #TP1223 to Lisbon via Porto at 13:30 has been cancelled.",
        ]
    );
}
