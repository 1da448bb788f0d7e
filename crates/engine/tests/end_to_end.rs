//! End-to-end flows over the public engine surface, exercising the
//! same sequences a transport layer would drive.

use chrono::NaiveDate;
use ganttlink_core::{Boundary, DependencyKind, DependencySpec, ProjectId, TaskDates, TaskId};
use ganttlink_engine::api::{
    AutoAdjustOutcome, DependencyEnvelope, DependencyListing, DependencyRejection, TaskDatesPatch,
    TaskUpdateRejection, TaskUpdated, ValidateDependencyRequest, ValidateDependencyResponse,
};
use ganttlink_engine::{ConstraintEngine, EngineRegistry, MemoryTaskStore, PropagationOptions};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn engine() -> ConstraintEngine<MemoryTaskStore> {
    // Surfaces engine logs under RUST_LOG; repeat init is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
    ConstraintEngine::new(MemoryTaskStore::new())
}

#[test]
fn reschedule_against_mandatory_dependency() {
    let engine = engine();
    let a = TaskId::new();
    let b = TaskId::new();
    engine
        .register_task(a, TaskDates::new(date(2024, 1, 2), date(2024, 1, 10)))
        .unwrap();
    engine
        .register_task(b, TaskDates::new(date(2024, 1, 10), date(2024, 1, 15)))
        .unwrap();

    // B after A, finish-to-start; currently satisfied.
    let (_, warning) = engine
        .add_dependency(
            DependencySpec::new(a, b, DependencyKind::FinishToStart),
            false,
        )
        .unwrap();
    assert!(warning.is_none());

    // Pulling B's start to Jan 8 breaks the constraint.
    let patch = TaskDatesPatch {
        start_date: Some(Some(date(2024, 1, 8))),
        ..TaskDatesPatch::default()
    };
    let error = engine.update_task_dates(b, &patch).unwrap_err();
    let report = error.violation_report().unwrap();
    assert_eq!(report.mandatory.len(), 1);
    assert_eq!(report.mandatory[0].required, date(2024, 1, 10));

    let rejection = TaskUpdateRejection::from_report(report);
    assert!(rejection.can_force);
    assert_eq!(rejection.violations.len(), 1);
    assert_eq!(rejection.violations[0].required_date, date(2024, 1, 10));
    assert_eq!(rejection.violations[0].actual_date, date(2024, 1, 8));

    // Forcing persists the violating dates, with the breakage echoed
    // back as warnings.
    let forced = TaskDatesPatch {
        force_update: true,
        ..patch
    };
    let (dates, report) = engine.update_task_dates(b, &forced).unwrap();
    assert_eq!(dates.start, Some(date(2024, 1, 8)));
    let body = TaskUpdated::new(b, dates, &report);
    assert_eq!(body.start_date, Some(date(2024, 1, 8)));
    assert_eq!(body.warnings.len(), 1);
    assert_eq!(engine.check_task(b).unwrap().mandatory.len(), 1);

    // Auto-adjust rooted at B moves nothing: the source of a run is
    // never rescheduled, and B has no dependents.
    let outcome = engine.auto_adjust(b, &PropagationOptions::default()).unwrap();
    assert!(outcome.is_noop());
    assert_eq!(engine.check_task(b).unwrap().mandatory.len(), 1);

    // Rooted at A, the cascade repairs B.
    let outcome = engine.auto_adjust(a, &PropagationOptions::default()).unwrap();
    assert_eq!(outcome.moved.len(), 1);
    assert_eq!(outcome.moved[0].task, b);
    assert!(engine.check_task(b).unwrap().is_clean());
}

#[test]
fn dependency_creation_gate_suggests_a_fix() {
    let engine = engine();
    let a = TaskId::new();
    let b = TaskId::new();
    engine
        .register_task(a, TaskDates::new(date(2024, 3, 1), date(2024, 3, 15)))
        .unwrap();
    engine
        .register_task(b, TaskDates::new(date(2024, 3, 10), date(2024, 3, 20)))
        .unwrap();

    let error = engine
        .add_dependency(
            DependencySpec::new(a, b, DependencyKind::FinishToStart),
            false,
        )
        .unwrap_err();
    let rejection = DependencyRejection::from_report(error.violation_report().unwrap()).unwrap();
    assert!(rejection.can_auto_fix);
    assert_eq!(rejection.required_start_date, Some(date(2024, 3, 15)));
    assert_eq!(rejection.suggestion.new_start, Some(date(2024, 3, 15)));
    assert_eq!(rejection.suggestion.new_end, Some(date(2024, 3, 25)));
    assert_eq!(engine.edge_count(), 0);

    // Applying the suggested dates makes the same insertion clean.
    let fix = TaskDatesPatch {
        start_date: Some(rejection.suggestion.new_start),
        end_date: Some(rejection.suggestion.new_end),
        ..TaskDatesPatch::default()
    };
    engine.update_task_dates(b, &fix).unwrap();
    let (_, warning) = engine
        .add_dependency(
            DependencySpec::new(a, b, DependencyKind::FinishToStart),
            false,
        )
        .unwrap();
    assert!(warning.is_none());
}

#[test]
fn advisory_dependency_creates_with_warning_payload() {
    let engine = engine();
    let a = TaskId::new();
    let b = TaskId::new();
    engine
        .register_task(a, TaskDates::new(date(2024, 1, 1), date(2024, 1, 10)))
        .unwrap();
    engine
        .register_task(b, TaskDates::new(date(2024, 1, 5), date(2024, 1, 8)))
        .unwrap();

    let (edge, warning) = engine
        .add_dependency(
            DependencySpec::new(a, b, DependencyKind::FinishToStart).advisory(),
            false,
        )
        .unwrap();
    assert_eq!(engine.edge_count(), 1);

    let envelope = DependencyEnvelope::new(&edge, warning.as_ref());
    let json = serde_json::to_value(&envelope).unwrap();
    assert_eq!(json["dependency"]["dependency_type"], "FS");
    assert_eq!(json["warning"]["mandatory"], false);
    assert_eq!(json["warning"]["required_date"], "2024-01-10");
}

#[test]
fn listing_splits_by_direction() {
    let engine = engine();
    let a = TaskId::new();
    let b = TaskId::new();
    let c = TaskId::new();
    engine
        .add_dependency(
            DependencySpec::new(a, b, DependencyKind::FinishToStart),
            false,
        )
        .unwrap();
    engine
        .add_dependency(
            DependencySpec::new(b, c, DependencyKind::StartToStart).with_lag(2),
            false,
        )
        .unwrap();

    let (dependencies, dependents) = engine.list_dependencies(b);
    let listing = DependencyListing::new(&dependencies, &dependents);
    assert_eq!(listing.dependencies.len(), 1);
    assert_eq!(listing.dependencies[0].depends_on_task_id, a);
    assert_eq!(listing.dependencies[0].task_id, b);
    assert_eq!(listing.dependents.len(), 1);
    assert_eq!(listing.dependents[0].task_id, c);
    assert_eq!(listing.dependents[0].lag_days, 2);
}

#[test]
fn diamond_cascade_takes_the_latest_requirement() {
    let engine = engine();
    let a = TaskId::new();
    let b = TaskId::new();
    let c = TaskId::new();
    let d = TaskId::new();
    for (pred, succ) in [(a, b), (a, c), (b, d), (c, d)] {
        engine
            .add_dependency(
                DependencySpec::new(pred, succ, DependencyKind::FinishToStart),
                false,
            )
            .unwrap();
    }
    engine
        .register_task(a, TaskDates::new(date(2024, 1, 1), date(2024, 1, 10)))
        .unwrap();
    engine
        .register_task(b, TaskDates::new(date(2024, 1, 10), date(2024, 1, 14)))
        .unwrap();
    engine
        .register_task(c, TaskDates::new(date(2024, 1, 10), date(2024, 1, 12)))
        .unwrap();
    engine
        .register_task(d, TaskDates::new(date(2024, 1, 14), date(2024, 1, 15)))
        .unwrap();

    // A slips by ten days.
    let slip = TaskDatesPatch {
        start_date: Some(Some(date(2024, 1, 11))),
        end_date: Some(Some(date(2024, 1, 20))),
        ..TaskDatesPatch::default()
    };
    engine.update_task_dates(a, &slip).unwrap();

    let outcome = engine.auto_adjust(a, &PropagationOptions::default()).unwrap();
    assert_eq!(outcome.moved.len(), 3);
    assert!(outcome.unresolvable.is_empty());

    // D waits for the later of its two predecessors (B, ending Jan 24).
    let moved_d = outcome.moved.iter().find(|shift| shift.task == d).unwrap();
    assert_eq!(moved_d.to, TaskDates::new(date(2024, 1, 24), date(2024, 1, 25)));
    for task in [b, c, d] {
        assert!(engine.check_task(task).unwrap().is_clean());
    }
}

#[test]
fn mixed_kind_chain_respects_each_boundary() {
    let engine = engine();
    let a = TaskId::new();
    let b = TaskId::new();
    let c = TaskId::new();
    engine
        .add_dependency(
            DependencySpec::new(a, b, DependencyKind::StartToStart).with_lag(3),
            false,
        )
        .unwrap();
    engine
        .add_dependency(
            DependencySpec::new(b, c, DependencyKind::FinishToFinish).with_lag(2),
            false,
        )
        .unwrap();
    engine
        .register_task(a, TaskDates::new(date(2024, 1, 10), date(2024, 1, 20)))
        .unwrap();
    engine
        .register_task(b, TaskDates::new(date(2024, 1, 5), date(2024, 1, 9)))
        .unwrap();
    engine
        .register_task(c, TaskDates::new(date(2024, 1, 1), date(2024, 1, 8)))
        .unwrap();

    let outcome = engine.auto_adjust(a, &PropagationOptions::default()).unwrap();
    assert_eq!(outcome.moved.len(), 2);

    // B's start lands three days after A's start.
    assert_eq!(
        outcome.moved[0].to,
        TaskDates::new(date(2024, 1, 13), date(2024, 1, 17))
    );
    // C's end lands two days after B's new end.
    assert_eq!(
        outcome.moved[1].to,
        TaskDates::new(date(2024, 1, 12), date(2024, 1, 19))
    );
}

#[test]
fn unresolvable_conflicts_are_reported_not_thrown() {
    let engine = engine();
    let a = TaskId::new();
    let b = TaskId::new();
    engine
        .add_dependency(
            DependencySpec::new(a, b, DependencyKind::StartToStart),
            false,
        )
        .unwrap();
    engine
        .register_task(
            a,
            TaskDates {
                start: Some(date(2024, 2, 1)),
                end: None,
            },
        )
        .unwrap();
    engine
        .register_task(b, TaskDates::new(date(2024, 1, 5), date(2024, 1, 10)))
        .unwrap();

    // Moving only B's start would push it past B's end.
    let options = PropagationOptions {
        preserve_duration: false,
        ..PropagationOptions::default()
    };
    let outcome = engine.auto_adjust(b, &options).unwrap();
    assert!(outcome.is_noop());

    let outcome = engine.auto_adjust(a, &options).unwrap();
    assert!(outcome.moved.is_empty());
    assert_eq!(outcome.unresolvable.len(), 1);
    assert_eq!(outcome.unresolvable[0].task, b);

    let payload = AutoAdjustOutcome::from(&outcome);
    assert!(payload.moved_tasks.is_empty());
    assert_eq!(payload.unresolvable[0].task_id, b);
    assert_eq!(payload.unresolvable[0].violations[0].boundary, Boundary::Start);

    // B's stored dates were left alone.
    assert_eq!(engine.check_task(b).unwrap().mandatory.len(), 1);
}

#[test]
fn validation_round_trip_through_api_types() {
    let engine = engine();
    let a = TaskId::new();
    let b = TaskId::new();
    engine
        .add_dependency(
            DependencySpec::new(a, b, DependencyKind::FinishToStart),
            false,
        )
        .unwrap();

    // Asking whether A may depend on B: that closes a cycle.
    let body = format!(r#"{{"depends_on_task_id":"{b}","dependency_type":"FS"}}"#);
    let request: ValidateDependencyRequest = serde_json::from_str(&body).unwrap();
    let response = match engine.validate_dependency(&request.spec(a)) {
        Ok(()) => ValidateDependencyResponse::ok(),
        Err(error) => ValidateDependencyResponse::rejected(error.to_string()),
    };
    assert!(!response.valid);
    assert!(response.error.unwrap().contains("cycle"));

    // A brand-new predecessor is fine.
    let fresh = ValidateDependencyRequest {
        depends_on_task_id: TaskId::new(),
        dependency_type: DependencyKind::FinishToFinish,
    };
    assert!(engine.validate_dependency(&fresh.spec(a)).is_ok());
}

#[test]
fn registry_runs_projects_independently() {
    let registry: EngineRegistry<MemoryTaskStore> = EngineRegistry::new();
    let alpha = ProjectId::new();
    let beta = ProjectId::new();
    let a = TaskId::new();
    let b = TaskId::new();

    registry
        .engine(alpha)
        .add_dependency(
            DependencySpec::new(a, b, DependencyKind::FinishToStart),
            false,
        )
        .unwrap();

    // The same pair is no duplicate in another project.
    registry
        .engine(beta)
        .add_dependency(
            DependencySpec::new(a, b, DependencyKind::FinishToStart),
            false,
        )
        .unwrap();

    assert_eq!(registry.engine(alpha).edge_count(), 1);
    assert_eq!(registry.engine(beta).edge_count(), 1);
    assert_eq!(registry.len(), 2);
}
