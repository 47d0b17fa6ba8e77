//! Boundary behaviour across both failure channels.
//!
//! Verified properties:
//! - `intake(Ok)` never changes state and returns nothing.
//! - A static fallback wins whenever a render fault is held, even with resolved content stored.
//! - The recovery chain short-circuits on the first success.
//! - A declining transform leaves every later stage looking at the original error.
//! - Stages run in order: transform, report, recovery, override.
//! - `reset` clears both channels and remounts the subtree.
//! - Every taxonomy variant resolves to its own built-in fallback.
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

use boundary_core::{
    AppError, Boundary, Content, Fallback, FallbackAction, FnStrategy, Phase, ResolvedBy, Thrown,
};
use boundary_test_utils::{
    CallLog, CountingStrategy, DecliningTransform, PageControl, RecordingReporter, addr_of,
    init_test_tracing,
};
use tracing::Level;

type Page = Box<dyn FnMut() -> Result<Content, Thrown> + Send>;

fn page() -> Page {
    Box::new(|| Ok(Content::text("page")))
}

#[test]
fn ok_intake_is_a_no_op() {
    init_test_tracing(Level::DEBUG);
    let mut boundary = Boundary::new(page);
    assert_eq!(boundary.intake(Ok::<_, AppError>(42)), None);
    assert_eq!(boundary.intake(Ok::<_, AppError>("anything")), None);
    assert_eq!(boundary.phase(), Phase::Clean);
    assert!(boundary.resolution().is_none());
    assert_eq!(boundary.render(), Content::text("page"));

    boundary.intake(Err::<(), _>(AppError::unknown("x")));
    let before = boundary.view();
    assert_eq!(boundary.intake(Ok::<_, AppError>(())), None);
    assert_eq!(boundary.phase(), Phase::ResultFailure);
    assert_eq!(boundary.view(), before);
}

#[test]
fn static_fallback_wins_over_resolved_content() {
    let control = PageControl::new();
    control.set_failing(true);
    let mut boundary = Boundary::builder(control.mount())
        .static_fallback(Content::text("static"))
        .build();

    assert_eq!(boundary.render(), Content::text("static"));
    let resolved = boundary
        .intake(Err::<(), _>(AppError::network("timeout", true)))
        .expect("content");
    assert!(matches!(resolved, Content::Fallback(Fallback::Network { .. })));

    assert!(boundary.captured().is_some());
    assert!(boundary.resolution().is_some());
    assert_eq!(boundary.render(), Content::text("static"));
}

#[test]
fn resolved_content_shows_when_no_static_fallback() {
    let control = PageControl::new();
    control.set_failing(true);
    let mut boundary = Boundary::new(control.mount());
    boundary.render();
    let resolved = boundary
        .intake(Err::<(), _>(AppError::auth("expired")))
        .expect("content");
    assert_eq!(boundary.render(), resolved);
}

#[test]
fn static_fallback_does_not_apply_to_result_failures() {
    let mut boundary = Boundary::builder(page)
        .static_fallback(Content::text("static"))
        .build();
    let resolved = boundary
        .intake(Err::<(), _>(AppError::unknown("x")))
        .expect("content");
    assert_eq!(boundary.render(), resolved);
}

#[test]
fn recovery_short_circuits_on_first_success() {
    let s1 = CountingStrategy::failing("s1");
    let s2 = CountingStrategy::succeeding("s2", "C");
    let s3 = CountingStrategy::succeeding("s3", "never");
    let mut boundary = Boundary::builder(page)
        .recovery_strategy(s1.clone())
        .recovery_strategy(s2.clone())
        .recovery_strategy(s3.clone())
        .build();

    let content = boundary.intake(Err::<(), _>(AppError::network("timeout", true)));
    assert_eq!(content, Some(Content::text("C")));
    assert_eq!(s1.recover_count(), 1);
    assert_eq!(s2.recover_count(), 1);
    assert_eq!(s3.can_handle_count(), 0);
    assert_eq!(s3.recover_count(), 0);
    assert_eq!(
        boundary.resolution().map(|r| r.resolved_by.clone()),
        Some(ResolvedBy::Strategy {
            index: 1,
            name: "s2".into()
        })
    );
}

#[test]
fn strategies_that_cannot_handle_are_skipped_without_recover() {
    let skip = CountingStrategy::rejecting("skip");
    let mut boundary = Boundary::builder(page)
        .recovery_strategy(skip.clone())
        .build();
    let content = boundary.intake(Err::<(), _>(AppError::auth("expired")));
    assert_eq!(skip.can_handle_count(), 1);
    assert_eq!(skip.recover_count(), 0);
    assert!(matches!(content, Some(Content::Fallback(Fallback::SignIn { .. }))));
}

#[test]
fn exhausted_chain_falls_through_to_builtin() {
    let mut boundary = Boundary::builder(page)
        .recovery_strategy(CountingStrategy::failing("a"))
        .recovery_strategy(CountingStrategy::failing("b"))
        .build();
    boundary.intake(Err::<(), _>(AppError::unknown("nope")));
    assert_eq!(
        boundary.resolution().map(|r| r.resolved_by.clone()),
        Some(ResolvedBy::BuiltIn)
    );
}

#[test]
fn declining_transform_keeps_original_error_identity() {
    let reporter = RecordingReporter::new();
    let strategy_seen = Arc::new(Mutex::new(Vec::<usize>::new()));
    let override_seen = Arc::new(Mutex::new(Vec::<usize>::new()));
    let strategy_log = Arc::clone(&strategy_seen);
    let override_log = Arc::clone(&override_seen);
    let mut boundary = Boundary::builder(page)
        .transform(DecliningTransform::default())
        .report(reporter.clone())
        .recovery_strategy(FnStrategy::new(
            "address-recorder",
            move |e: &AppError| {
                strategy_log.lock().unwrap().push(e as *const AppError as usize);
                false
            },
            || -> Result<Content, AppError> { Err(AppError::unknown("never recovers")) },
        ))
        .on_result_override(move |outcome: Result<(), &AppError>| {
            if let Err(e) = outcome {
                override_log.lock().unwrap().push(e as *const AppError as usize);
            }
            None
        })
        .build();

    let original = Arc::new(AppError::validation("Invalid email").with_field("email"));
    let content = boundary.intake(Err::<(), _>(Arc::clone(&original)));

    assert_eq!(reporter.addresses(), vec![addr_of(&original)]);
    assert_eq!(*strategy_seen.lock().unwrap(), vec![addr_of(&original)]);
    assert_eq!(*override_seen.lock().unwrap(), vec![addr_of(&original)]);
    let resolution = boundary.resolution().expect("resolved");
    assert!(Arc::ptr_eq(&resolution.error, &original));
    assert_eq!(resolution.resolved_by, ResolvedBy::BuiltIn);

    let expected = Content::Fallback(Fallback::InlineAlert {
        message: "Invalid email".into(),
        field: Some("email".into()),
    });
    assert_eq!(content, Some(expected.clone()));
    assert_eq!(boundary.render(), expected);
}

#[test]
fn stages_run_in_order() {
    let log = CallLog::new();
    let override_log = log.clone();
    let mut boundary = Boundary::builder(page)
        .transform(DecliningTransform {
            log: Some(log.clone()),
        })
        .report(RecordingReporter::new().with_log(log.clone()))
        .recovery_strategy(CountingStrategy::failing("first").with_log(log.clone()))
        .recovery_strategy(CountingStrategy::succeeding("second", "ok").with_log(log.clone()))
        .on_result_override(move |_| {
            override_log.record("override");
            None
        })
        .build();

    boundary.intake(Err::<(), _>(AppError::unknown("x")));
    assert_eq!(
        log.entries(),
        vec![
            "transform",
            "report",
            "recover:first",
            "recover:second",
            "override"
        ]
    );
    assert_eq!(boundary.render(), Content::text("ok"));
}

#[test]
fn transformed_error_is_what_reporter_sees() {
    let reporter = RecordingReporter::new();
    let mut boundary = Boundary::builder(page)
        .transform(|e: &AppError| -> Result<AppError, AppError> {
            Ok(e.clone().map_message(|m| format!("{m} [localized]")))
        })
        .report(reporter.clone())
        .build();
    boundary.intake(Err::<(), _>(AppError::unknown("boom")));
    assert_eq!(reporter.messages(), vec!["boom [localized]".to_string()]);
}

#[test]
fn failing_reporter_never_changes_content() {
    let mut quiet = Boundary::new(page);
    let mut noisy = Boundary::builder(page)
        .report(RecordingReporter::failing(AppError::network("collector down", true)))
        .build();
    let err = AppError::business("over quota");
    assert_eq!(
        quiet.intake(Err::<(), _>(err.clone())),
        noisy.intake(Err::<(), _>(err))
    );
}

#[test]
fn override_output_is_used_verbatim() {
    let mut boundary = Boundary::builder(page)
        .recovery_strategy(CountingStrategy::succeeding("cache", "cached"))
        .on_result_override(|result| {
            result
                .err()
                .map(|e| Content::text(format!("custom {}", e.kind())))
        })
        .build();
    let content = boundary.intake(Err::<(), _>(AppError::auth("expired")));
    assert_eq!(content, Some(Content::text("custom auth")));
}

#[test]
fn reset_clears_both_channels_and_remounts() {
    let control = PageControl::new();
    let mut boundary = Boundary::builder(control.mount())
        .static_fallback(Content::text("static"))
        .build();
    assert_eq!(control.mount_count(), 1);
    assert_eq!(boundary.render(), Content::text("page render #1"));
    assert_eq!(boundary.render(), Content::text("page render #2"));

    control.set_failing(true);
    boundary.render();
    boundary.intake(Err::<(), _>(AppError::unknown("x")));
    assert!(boundary.captured().is_some());
    assert!(boundary.resolution().is_some());

    control.set_failing(false);
    boundary.reset();
    assert!(boundary.is_clean());
    assert!(boundary.captured().is_none());
    assert!(boundary.resolution().is_none());
    assert_eq!(control.mount_count(), 2);
    // Fresh mount: the render counter starts over.
    assert_eq!(boundary.render(), Content::text("page render #1"));
}

#[test]
fn render_fault_without_static_fallback_offers_working_retry() {
    let control = PageControl::new();
    control.set_failing(true);
    let mut boundary = Boundary::new(control.mount());

    let content = boundary.render();
    let Content::Fallback(fallback) = content else {
        panic!("expected built-in fallback, got {content:?}");
    };
    assert!(matches!(fallback, Fallback::RenderFault { .. }));
    assert_eq!(fallback.message(), "page exploded");
    assert!(fallback.offers(FallbackAction::Retry));

    control.set_failing(false);
    boundary.dispatch(FallbackAction::Retry);
    assert_eq!(boundary.phase(), Phase::Clean);
    assert_eq!(boundary.render(), Content::text("page render #1"));
}

#[test]
fn render_failure_hook_observes_each_capture_once() {
    let control = PageControl::new();
    control.set_failing(true);
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let mut boundary = Boundary::builder(control.mount())
        .on_render_failure(move |fault, _stack| {
            assert_eq!(fault.message, "page exploded");
            seen.fetch_add(1, Ordering::SeqCst);
        })
        .build();

    boundary.render();
    boundary.render();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    boundary.reset();
    boundary.render();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn each_variant_has_its_own_builtin_fallback() {
    let errors = [
        AppError::network("timeout", true),
        AppError::auth("expired"),
        AppError::business("over quota"),
        AppError::validation("Invalid email").with_field("email"),
        AppError::unknown("???"),
    ];
    let mut discriminants = HashSet::new();
    for err in errors {
        let mut boundary = Boundary::new(page);
        let content = boundary.intake(Err::<(), _>(err)).expect("content");
        let Content::Fallback(fallback) = content else {
            panic!("expected built-in fallback");
        };
        discriminants.insert(std::mem::discriminant(&fallback));
    }
    assert_eq!(discriminants.len(), 5);
}

#[test]
fn network_timeout_scenario() {
    let mut boundary = Boundary::new(page);
    let content = boundary
        .intake(Err::<(), _>(AppError::network("timeout", true)))
        .expect("content");
    let fallback = content.as_fallback().expect("fallback");
    assert_eq!(fallback.message(), "timeout");
    assert!(fallback.offers(FallbackAction::Retry));
}

#[test]
fn validation_scenario_references_field() {
    let mut boundary = Boundary::new(page);
    let content = boundary
        .intake(Err::<(), _>(
            AppError::validation("Invalid email").with_field("email"),
        ))
        .expect("content");
    assert_eq!(
        content,
        Content::Fallback(Fallback::InlineAlert {
            message: "Invalid email".into(),
            field: Some("email".into()),
        })
    );
}
