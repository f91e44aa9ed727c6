//! Unit tests for rally-stage.

use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use rally_arbiter::Arbitrator;
use rally_behavior::{Behavior, BumperEscape, Cruise};
use rally_core::{Capability, CoreError, ResourceFlags, RobotConfig, Signal};
use rally_hal::mock::{DriveCommand, MockHardware};
use rally_hal::HardwareProvider;

use crate::{
    acquire, load_course_reader, CourseRunner, StageContext, StageController, StageError,
    StagePlan, StageResult, StageSolver,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn rig() -> Arc<MockHardware> {
    Arc::new(MockHardware::new())
}

fn controller(
    rig:    &Arc<MockHardware>,
    name:   &str,
    solver: impl StageSolver + 'static,
) -> StageController {
    StageController::new(name, solver, rig.clone(), RobotConfig::default())
}

/// A solver that spins until the stage is aborted.
fn blocking_solver() -> impl StageSolver + 'static {
    move |ctx: &StageContext| -> StageResult<()> {
        while ctx.active() {
            thread::sleep(Duration::from_millis(1));
        }
        Ok(())
    }
}

/// A solver that returns immediately.
fn idle_solver() -> impl StageSolver + 'static {
    move |_ctx: &StageContext| -> StageResult<()> { Ok(()) }
}

fn context_for(rig: &Arc<MockHardware>, flags: ResourceFlags) -> (StageContext, Signal) {
    let config = RobotConfig::default();
    let resources = acquire(rig.as_ref(), flags, &config).unwrap();
    let abort = Signal::new();
    let ctx = StageContext::new(
        "test".to_string(),
        resources,
        abort.clone(),
        Signal::new(),
        rig.display(),
        config,
    );
    (ctx, abort)
}

// ── Resource acquisition ──────────────────────────────────────────────────────

#[cfg(test)]
mod acquisition {
    use super::*;

    #[test]
    fn fixed_order_and_full_release() {
        let rig = rig();
        let res = acquire(
            rig.as_ref(),
            ResourceFlags::MOTORS | ResourceFlags::TOUCH,
            &RobotConfig::default(),
        )
        .unwrap();

        assert_eq!(
            rig.opened(),
            vec![
                "large-motor(B)".to_string(),
                "large-motor(A)".to_string(),
                "touch(S3)".to_string(),
            ]
        );

        drop(res);
        for name in rig.opened() {
            assert_eq!(rig.close_count_of(&name), 1, "{name} not closed exactly once");
        }
    }

    #[test]
    fn diff_pilot_opens_the_motor_pair_itself() {
        let rig = rig();
        let res = acquire(rig.as_ref(), ResourceFlags::DIFF_PILOT, &RobotConfig::default())
            .unwrap();

        assert_eq!(
            rig.opened(),
            vec![
                "large-motor(B)".to_string(),
                "large-motor(A)".to_string(),
                "diff-pilot".to_string(),
            ]
        );

        // The pilot is reachable; the side-effect motors are not a declared
        // capability of this stage.
        assert!(res.drive().is_ok());
        assert!(matches!(
            res.motor_left(),
            Err(StageError::MissingResource(Capability::MotorPair))
        ));
    }

    #[test]
    fn conflict_rejected_before_any_open() {
        let rig = rig();
        let result = acquire(
            rig.as_ref(),
            ResourceFlags::MOTORS | ResourceFlags::UNREG_PILOT,
            &RobotConfig::default(),
        );

        assert!(matches!(
            result,
            Err(StageError::Resource(CoreError::Conflict(_, _)))
        ));
        assert!(rig.opened().is_empty());
    }

    #[test]
    fn partial_failure_rolls_back_earlier_handles() {
        let rig = rig();
        rig.fail_open_after(1); // left motor opens, right motor fails

        let result = acquire(rig.as_ref(), ResourceFlags::MOTORS, &RobotConfig::default());
        assert!(matches!(result, Err(StageError::Hardware(_))));
        assert_eq!(rig.closed(), vec!["large-motor(B)".to_string()]);
    }

    #[test]
    fn release_attempts_every_handle_despite_failures() {
        let rig = rig();
        rig.fail_close_of("large-motor(B)");
        let res = acquire(
            rig.as_ref(),
            ResourceFlags::MOTORS | ResourceFlags::TOUCH,
            &RobotConfig::default(),
        )
        .unwrap();

        drop(res);
        // The failing close was attempted and did not stop the others.
        assert_eq!(rig.close_count_of("large-motor(B)"), 1);
        assert_eq!(rig.close_count_of("large-motor(A)"), 1);
        assert_eq!(rig.close_count_of("touch(S3)"), 1);
    }

    #[test]
    fn undeclared_capability_accessors_fail() {
        let rig = rig();
        let res = acquire(rig.as_ref(), ResourceFlags::MOTORS, &RobotConfig::default())
            .unwrap();

        assert!(matches!(
            res.touch(),
            Err(StageError::MissingResource(Capability::Touch))
        ));
        assert!(matches!(res.drive(), Err(StageError::NoPilotDeclared)));
    }
}

// ── StageController lifecycle ─────────────────────────────────────────────────

#[cfg(test)]
mod controller_lifecycle {
    use super::*;

    #[test]
    fn declare_after_start_is_a_state_error() {
        let rig = rig();
        let mut stage = controller(&rig, "obstacle", blocking_solver());
        stage.declare_resources(ResourceFlags::TOUCH).unwrap();
        stage.start().unwrap();

        assert!(matches!(
            stage.declare_resources(ResourceFlags::COLOR),
            Err(StageError::State(_))
        ));

        stage.stop(Some(Duration::from_secs(2))).unwrap();
    }

    #[test]
    fn declare_validates_immediately() {
        let rig = rig();
        let mut stage = controller(&rig, "obstacle", idle_solver());
        assert!(matches!(
            stage.declare_resources(ResourceFlags::DIFF_PILOT | ResourceFlags::UNREG_PILOT),
            Err(StageError::Resource(CoreError::Conflict(_, _)))
        ));
    }

    #[test]
    fn start_twice_is_a_state_error() {
        let rig = rig();
        let mut stage = controller(&rig, "obstacle", blocking_solver());
        stage.start().unwrap();

        assert!(matches!(stage.start(), Err(StageError::State(_))));

        stage.stop(Some(Duration::from_secs(2))).unwrap();
    }

    #[test]
    fn success_path_releases_each_handle_once() {
        let rig = rig();
        let mut stage = controller(&rig, "obstacle", idle_solver());
        stage
            .declare_resources(ResourceFlags::MOTORS | ResourceFlags::TOUCH)
            .unwrap();
        stage.start().unwrap();
        stage.stop(Some(Duration::from_secs(2))).unwrap();

        let opened = rig.opened();
        assert_eq!(opened.len(), 3);
        for name in opened {
            assert_eq!(rig.close_count_of(&name), 1, "{name} not closed exactly once");
        }
    }

    #[test]
    fn solver_fault_releases_resources_and_surfaces() {
        let rig = rig();
        let solver = move |_ctx: &StageContext| -> StageResult<()> {
            Err(StageError::Parse("injected fault".to_string()))
        };
        let mut stage = controller(&rig, "obstacle", solver);
        stage.declare_resources(ResourceFlags::TOUCH).unwrap();
        stage.start().unwrap();

        let result = stage.stop(Some(Duration::from_secs(2)));
        assert!(matches!(result, Err(StageError::Parse(_))));
        assert_eq!(rig.close_count_of("touch(S3)"), 1);
    }

    #[test]
    fn solver_panic_releases_resources_and_surfaces() {
        let rig = rig();
        let solver = move |_ctx: &StageContext| -> StageResult<()> {
            panic!("solver exploded");
        };
        let mut stage = controller(&rig, "obstacle", solver);
        stage.declare_resources(ResourceFlags::TOUCH).unwrap();
        stage.start().unwrap();

        match stage.stop(Some(Duration::from_secs(2))) {
            Err(StageError::Panicked(text)) => assert!(text.contains("solver exploded")),
            other => panic!("expected panic surface, got {other:?}"),
        }
        assert_eq!(rig.close_count_of("touch(S3)"), 1);
    }

    #[test]
    fn acquisition_failure_propagates_and_allows_retry() {
        let rig = rig();
        rig.fail_open_after(0);

        let mut stage = controller(&rig, "obstacle", idle_solver());
        stage.declare_resources(ResourceFlags::TOUCH).unwrap();
        assert!(matches!(stage.start(), Err(StageError::Hardware(_))));
        assert!(!stage.is_running());

        // Hardware recovered — the same controller may try again.
        rig.fail_open_after(100);
        stage.start().unwrap();
        stage.stop(Some(Duration::from_secs(2))).unwrap();
    }

    #[test]
    fn is_active_tracks_abort_and_thread_liveness() {
        let rig = rig();
        let mut stage = controller(&rig, "obstacle", blocking_solver());
        assert!(!stage.is_active()); // no thread yet

        stage.start().unwrap();
        assert!(stage.is_active());

        stage.stop(None).unwrap(); // abort only, no join
        assert!(!stage.is_active());

        stage.stop(Some(Duration::from_secs(2))).unwrap();
        assert!(!stage.is_running());
    }

    #[test]
    fn stop_is_idempotent_even_before_start() {
        let rig = rig();
        let mut stage = controller(&rig, "obstacle", idle_solver());
        stage.stop(None).unwrap();
        stage.stop(Some(Duration::from_millis(50))).unwrap();

        // A pre-aborted stage still starts and completes cleanly.
        stage.start().unwrap();
        stage.stop(Some(Duration::from_secs(2))).unwrap();
        stage.stop(Some(Duration::from_secs(2))).unwrap();
    }

    #[test]
    fn stage_name_announced_on_display() {
        let rig = rig();
        let mut stage = controller(&rig, "obstacle", idle_solver());
        stage.start().unwrap();
        stage.stop(Some(Duration::from_secs(2))).unwrap();

        let rows = rig.display_rows();
        assert!(rows.contains(&"<clear row 0>".to_string()));
        assert!(rows.contains(&"0,0:obstacle".to_string()));
    }
}

// ── StageContext ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod context {
    use super::*;

    #[test]
    fn wait_for_touch_returns_on_press() {
        let rig = rig();
        rig.press_bumper(true);
        let (ctx, _abort) = context_for(&rig, ResourceFlags::TOUCH);
        assert!(ctx.wait_for_touch().unwrap());
    }

    #[test]
    fn wait_for_touch_observes_abort() {
        let rig = rig();
        let (ctx, abort) = context_for(&rig, ResourceFlags::TOUCH);

        let setter = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            abort.set();
        });
        // Bumper never pressed — only the abort can end the wait.
        assert!(!ctx.wait_for_touch().unwrap());
        setter.join().unwrap();
    }

    #[test]
    fn wait_for_touch_needs_the_touch_capability() {
        let rig = rig();
        let (ctx, _abort) = context_for(&rig, ResourceFlags::NONE);
        assert!(matches!(
            ctx.wait_for_touch(),
            Err(StageError::MissingResource(Capability::Touch))
        ));
    }

    #[test]
    fn head_tilts_by_quarter_turn() {
        let rig = rig();
        let (ctx, _abort) = context_for(&rig, ResourceFlags::HEAD);
        ctx.head_up().unwrap();
        ctx.head_down().unwrap();

        let degrees: Vec<i32> = rig.rotations().into_iter().map(|(_, d)| d).collect();
        assert_eq!(degrees, vec![-90, 90]);
    }

    #[test]
    fn exit_signal_is_shared_with_the_controllers_stop() {
        let rig = rig();
        let (ctx, _abort) = context_for(&rig, ResourceFlags::NONE);
        let observer = ctx.exit_signal();
        ctx.exit_signal().set();
        assert!(observer.is_set());
    }
}

// ── Course plan loader ────────────────────────────────────────────────────────

#[cfg(test)]
mod loader {
    use super::*;

    const PLAN_CSV: &str = "\
stage,resources,timeout_ms
obstacle,unreg-pilot|touch,120000
line-code,diff-pilot|color,
labyrinth,unreg-pilot|touch|distance|head,300000
";

    #[test]
    fn loads_the_course_in_order() {
        let plans = load_course_reader(Cursor::new(PLAN_CSV)).unwrap();
        assert_eq!(plans.len(), 3);
        assert_eq!(plans[0].name, "obstacle");
        assert_eq!(
            plans[0].resources,
            ResourceFlags::UNREG_PILOT | ResourceFlags::TOUCH
        );
        assert_eq!(plans[0].timeout, Some(Duration::from_millis(120_000)));
    }

    #[test]
    fn empty_timeout_means_no_budget() {
        let plans = load_course_reader(Cursor::new(PLAN_CSV)).unwrap();
        assert_eq!(plans[1].timeout, None);
    }

    #[test]
    fn tolerates_spaces_around_tokens() {
        let csv = "stage,resources,timeout_ms\nbridge, motors | head ,\n";
        let plans = load_course_reader(Cursor::new(csv)).unwrap();
        assert_eq!(
            plans[0].resources,
            ResourceFlags::MOTORS | ResourceFlags::HEAD
        );
    }

    #[test]
    fn none_resources_parse_to_empty() {
        let csv = "stage,resources,timeout_ms\nwait,none,\n";
        let plans = load_course_reader(Cursor::new(csv)).unwrap();
        assert!(plans[0].resources.is_empty());
    }

    #[test]
    fn unknown_capability_token_rejected() {
        let csv = "stage,resources,timeout_ms\nobstacle,laser,\n";
        assert!(matches!(
            load_course_reader(Cursor::new(csv)),
            Err(StageError::Parse(_))
        ));
    }

    #[test]
    fn conflicting_plan_row_rejected() {
        let csv = "stage,resources,timeout_ms\nobstacle,motors|unreg-pilot,\n";
        assert!(matches!(
            load_course_reader(Cursor::new(csv)),
            Err(StageError::Resource(CoreError::Conflict(_, _)))
        ));
    }
}

// ── CourseRunner ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod runner {
    use super::*;

    fn plan(name: &str, timeout: Option<Duration>) -> StagePlan {
        StagePlan {
            name:      name.to_string(),
            resources: ResourceFlags::NONE,
            timeout,
        }
    }

    fn recording_solver(log: Arc<Mutex<Vec<String>>>, entry: &str) -> Box<dyn StageSolver> {
        let entry = entry.to_string();
        Box::new(move |_ctx: &StageContext| -> StageResult<()> {
            log.lock().unwrap().push(entry.clone());
            Ok(())
        })
    }

    #[test]
    fn stages_run_in_plan_order() {
        let rig = rig();
        let log: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(vec![]));
        let runner = CourseRunner::new(rig.clone(), RobotConfig::default());

        runner
            .run(vec![
                (plan("first", None), recording_solver(log.clone(), "first")),
                (plan("second", None), recording_solver(log.clone(), "second")),
            ])
            .unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn stage_fault_ends_the_course() {
        let rig = rig();
        let log: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(vec![]));
        let runner = CourseRunner::new(rig.clone(), RobotConfig::default());

        let failing: Box<dyn StageSolver> =
            Box::new(move |_ctx: &StageContext| -> StageResult<()> {
                Err(StageError::Parse("bad stage".to_string()))
            });

        let result = runner.run(vec![
            (plan("first", None), failing),
            (plan("second", None), recording_solver(log.clone(), "second")),
        ]);

        assert!(result.is_err());
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn timed_out_stage_is_aborted_and_course_continues() {
        let rig = rig();
        let log: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(vec![]));
        let runner = CourseRunner::new(rig.clone(), RobotConfig::default());

        let stubborn: Box<dyn StageSolver> =
            Box::new(move |ctx: &StageContext| -> StageResult<()> {
                while ctx.active() {
                    thread::sleep(Duration::from_millis(1));
                }
                Ok(())
            });

        runner
            .run(vec![
                (plan("slow", Some(Duration::from_millis(50))), stubborn),
                (plan("after", None), recording_solver(log.clone(), "after")),
            ])
            .unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["after"]);
    }
}

// ── Arbitrated stage integration ──────────────────────────────────────────────

#[cfg(test)]
mod arbitrated_stage {
    use super::*;

    #[test]
    fn obstacle_stage_reacts_and_stops_via_the_controller() {
        let rig = rig();
        rig.press_bumper(true);

        let bumper_hits = Arc::new(AtomicBool::new(false));
        let hits = bumper_hits.clone();

        let solver = move |ctx: &StageContext| -> StageResult<()> {
            let escape = BumperEscape::new(ctx.touch()?, ctx.drive()?, ctx.display(), 0.2)
                .with_timings(Duration::from_millis(1), Duration::from_millis(1));
            let behaviors: Vec<Box<dyn Behavior>> = vec![
                Box::new(escape),
                Box::new(Cruise::new(ctx.drive()?, 0.5)),
            ];
            let mut arby = Arbitrator::new(behaviors, ctx.exit_signal(), false)?;
            arby.run();
            hits.store(true, Ordering::SeqCst);
            Ok(())
        };

        let mut stage = controller(&rig, "obstacle", solver);
        stage
            .declare_resources(ResourceFlags::UNREG_PILOT | ResourceFlags::TOUCH)
            .unwrap();
        stage.start().unwrap();

        // Let the escape behavior run a few maneuvers, then end the stage.
        thread::sleep(Duration::from_millis(100));
        stage.stop(Some(Duration::from_secs(5))).unwrap();

        assert!(bumper_hits.load(Ordering::SeqCst), "arbitrator never exited");
        assert!(rig.drive_log().contains(&DriveCommand::Backward));
        for name in rig.opened() {
            assert_eq!(rig.close_count_of(&name), 1);
        }
    }
}
