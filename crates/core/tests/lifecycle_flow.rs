//! Automatic lifecycle resolution: completion, no-shows, archival

mod support;

use carebook_domain::constants::RETENTION_WINDOW;
use carebook_domain::{
    AppointmentStatus, BookingRequest, CancelRequest, CarebookError, ConfirmationPolicy, Medium,
    ProfessionalProfile, TimeRange,
};
use chrono::Duration;
use support::{day, TestEngine};
use uuid::Uuid;

fn auto_confirmed_booking(engine: &TestEngine, start_h: u32) -> BookingRequest {
    let professional = engine.seed_professional();
    engine.directory.upsert_professional(
        ProfessionalProfile::new(professional)
            .with_confirmation_policy(ConfirmationPolicy::AutoConfirm),
    );
    BookingRequest {
        professional_id: professional,
        client_id: engine.seed_client(),
        slot: Some(TimeRange::new(day(start_h, 0), day(start_h + 1, 0)).unwrap()),
        window: None,
        duration: None,
        medium: Medium::Video,
        location: None,
        reminder_offsets: vec![],
    }
}

#[tokio::test]
async fn checked_in_appointment_completes_after_end() {
    let engine = TestEngine::new();
    let appointment = engine.coordinator.book(auto_confirmed_booking(&engine, 10)).await.unwrap();

    engine.clock.set(day(10, 5));
    engine.coordinator.report_check_in(appointment.id).unwrap();

    // Mid-appointment the sweep changes nothing
    engine.clock.set(day(10, 30));
    assert_eq!(engine.coordinator.lifecycle_sweep().await.completed, 0);

    engine.clock.set(day(11, 1));
    let report = engine.coordinator.lifecycle_sweep().await;

    assert_eq!(report.completed, 1);
    assert_eq!(report.no_shows, 0);
    assert_eq!(engine.ledger.get(appointment.id).unwrap().status, AppointmentStatus::Completed);
}

#[tokio::test]
async fn missing_check_in_becomes_no_show_after_grace() {
    let engine = TestEngine::new();
    let appointment = engine.coordinator.book(auto_confirmed_booking(&engine, 10)).await.unwrap();

    // Default grace is 15 minutes; at 11:10 the appointment is still in grace
    engine.clock.set(day(11, 10));
    let report = engine.coordinator.lifecycle_sweep().await;
    assert_eq!(report.no_shows, 0);
    assert_eq!(engine.ledger.get(appointment.id).unwrap().status, AppointmentStatus::Confirmed);

    engine.clock.set(day(11, 15));
    let report = engine.coordinator.lifecycle_sweep().await;

    assert_eq!(report.no_shows, 1);
    assert_eq!(engine.ledger.get(appointment.id).unwrap().status, AppointmentStatus::NoShow);
}

#[tokio::test]
async fn late_check_in_during_grace_rescues_completion() {
    let engine = TestEngine::new();
    let appointment = engine.coordinator.book(auto_confirmed_booking(&engine, 10)).await.unwrap();

    // Check-in arrives five minutes after the end, inside the grace window
    engine.clock.set(day(11, 5));
    engine.coordinator.report_check_in(appointment.id).unwrap();

    engine.clock.set(day(11, 20));
    let report = engine.coordinator.lifecycle_sweep().await;

    assert_eq!(report.completed, 1);
    assert_eq!(report.no_shows, 0);
}

#[tokio::test]
async fn check_in_on_pending_appointment_rejected() {
    let engine = TestEngine::new();
    let professional = engine.seed_professional();
    let request = BookingRequest {
        professional_id: professional,
        client_id: engine.seed_client(),
        slot: Some(TimeRange::new(day(10, 0), day(11, 0)).unwrap()),
        window: None,
        duration: None,
        medium: Medium::Video,
        location: None,
        reminder_offsets: vec![],
    };

    let appointment = engine.coordinator.book(request).await.unwrap();
    assert_eq!(appointment.status, AppointmentStatus::Pending);

    let result = engine.coordinator.report_check_in(appointment.id);
    assert!(matches!(result, Err(CarebookError::InvalidTransition(_))));
}

#[tokio::test]
async fn unknown_appointment_check_in_not_found() {
    let engine = TestEngine::new();

    let result = engine.coordinator.report_check_in(Uuid::new_v4());
    assert!(matches!(result, Err(CarebookError::NotFound(_))));
}

#[tokio::test]
async fn archival_removes_terminal_appointments_past_retention() {
    let engine = TestEngine::new();
    let appointment = engine.coordinator.book(auto_confirmed_booking(&engine, 10)).await.unwrap();

    engine
        .coordinator
        .cancel(CancelRequest { appointment_id: appointment.id, reason: "moved away".into() })
        .await
        .unwrap();

    // Within the retention window the cancelled record survives
    engine.clock.advance(Duration::days(30));
    assert_eq!(engine.coordinator.archive_expired(RETENTION_WINDOW), 0);
    assert!(engine.ledger.get(appointment.id).is_ok());

    engine.clock.advance(Duration::days(61));
    assert_eq!(engine.coordinator.archive_expired(RETENTION_WINDOW), 1);
    assert!(matches!(engine.ledger.get(appointment.id), Err(CarebookError::NotFound(_))));
}
