//! course — bench-rig demo for the rally framework.
//!
//! Runs a two-stage course entirely on mock hardware: an arbitrated
//! obstacle stage (`BumperEscape` over `Cruise`) and a sequential
//! line-code stage (mean-filtered edge counting).  Sensor input is
//! scripted, so the run is reproducible on any machine.

use std::io::Cursor;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use rally_arbiter::Arbitrator;
use rally_behavior::{Behavior, BumperEscape, Cruise};
use rally_core::RobotConfig;
use rally_hal::mock::MockHardware;
use rally_hal::{lock, Drive, MeanFilter, StatusDisplay};
use rally_stage::{
    load_course_reader, CourseRunner, StageContext, StageResult, StageSolver,
};

// ── Constants ─────────────────────────────────────────────────────────────────

/// Light/dark separation used by the edge detector.
const EDGE_DELTA: f32 = 0.3;

/// Samples in the color mean window.
const MEAN_WINDOW: usize = 10;

// ── Course plan ───────────────────────────────────────────────────────────────

const COURSE_CSV: &str = "\
stage,resources,timeout_ms
obstacle,unreg-pilot|touch,400
line-code,diff-pilot|color,2000
";

// ── Stage solvers ─────────────────────────────────────────────────────────────

/// Obstacle avoidance: the escape behavior preempts cruising whenever the
/// bumper is pressed.  Runs until the stage's time budget aborts it.
struct ObstacleStage;

impl StageSolver for ObstacleStage {
    fn solve(&mut self, ctx: &StageContext) -> StageResult<()> {
        let speeds = ctx.config().drive;
        let escape = BumperEscape::new(
            ctx.touch()?,
            ctx.drive()?,
            ctx.display(),
            speeds.escape_speed,
        )
        .with_timings(Duration::from_millis(20), Duration::from_millis(40));

        let behaviors: Vec<Box<dyn Behavior>> = vec![
            Box::new(escape),
            Box::new(Cruise::new(ctx.drive()?, speeds.cruise_speed)),
        ];

        let mut arby = Arbitrator::new(behaviors, ctx.exit_signal(), false)?;
        arby.run();
        Ok(())
    }
}

/// Line-code reading: drive forward and count dark→light edges against a
/// running mean, then report the mark count on the display.
struct LineCodeStage {
    marks_needed: u32,
}

impl StageSolver for LineCodeStage {
    fn solve(&mut self, ctx: &StageContext) -> StageResult<()> {
        let drive = ctx.drive()?;
        let color = ctx.color()?;
        let mut filter = MeanFilter::new(color, MEAN_WINDOW);

        {
            let mut d = lock(&drive);
            d.set_speed(ctx.config().drive.cruise_speed);
            d.forward();
        }

        let mut marks = 0;
        let mut was_dark = false;

        while ctx.active() && marks < self.marks_needed {
            let mean = filter.fetch()?;
            let Some(raw) = filter.last_raw() else {
                continue;
            };

            if raw < mean - EDGE_DELTA {
                was_dark = true;
            } else if was_dark && raw > mean + EDGE_DELTA {
                was_dark = false;
                marks += 1;
                let display = ctx.display();
                lock(&display).draw_string(&format!("mark {marks}"), 0, 1);
            }
            thread::sleep(Duration::from_millis(1));
        }

        lock(&drive).stop();
        Ok(())
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_target(false)
        .with_max_level(Level::DEBUG)
        .init();

    println!("=== course — rally bench-rig demo ===");
    println!();

    // 1. Build the rig and script its sensors.
    let rig = Arc::new(MockHardware::new());
    rig.set_color_idle(0.9);
    // Bright approach, a dark bar, then bright again → exactly one mark.
    rig.push_color(&[0.9; 10]);
    rig.push_color(&[0.2; 25]);

    // The bumper is pressed shortly into the obstacle stage and released
    // again, so the demo shows one full escape maneuver plus cruising.
    {
        let rig = rig.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            rig.press_bumper(true);
            thread::sleep(Duration::from_millis(100));
            rig.press_bumper(false);
        });
    }

    // 2. Load the course plan.
    let plans = load_course_reader(Cursor::new(COURSE_CSV))?;
    println!("Course: {} stages", plans.len());
    for plan in &plans {
        println!("  {:<10} resources: {}", plan.name, plan.resources);
    }
    println!();

    // 3. Pair each plan with its solver and run.
    let mut stages: Vec<(rally_stage::StagePlan, Box<dyn StageSolver>)> = Vec::new();
    for plan in plans {
        let solver: Box<dyn StageSolver> = match plan.name.as_str() {
            "obstacle" => Box::new(ObstacleStage),
            "line-code" => Box::new(LineCodeStage { marks_needed: 1 }),
            other => anyhow::bail!("no solver for stage {other:?}"),
        };
        stages.push((plan, solver));
    }

    let runner = CourseRunner::new(rig.clone(), RobotConfig::default());
    runner.run(stages)?;

    // 4. Summary.
    println!();
    println!("Drive commands issued : {}", rig.drive_log().len());
    println!("Display rows written  : {}", rig.display_rows().len());
    println!("Handles opened/closed : {}/{}", rig.opened().len(), rig.closed().len());

    Ok(())
}
