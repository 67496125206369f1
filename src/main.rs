//! weeksplit - Weekly training split planner

use anyhow::{Result, anyhow, bail};
use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

use weeksplit::db::{Database, FitnessGoal};
use weeksplit::health::{self, ManualSteps, Unavailable};
use weeksplit::onboarding::Onboarding;
use weeksplit::profile;
use weeksplit::schedule::{TrainingSchedule, WorkoutType};
use weeksplit::session::{Gate, GateState, SessionProvider};
use weeksplit::store::{AuthStore, UserId, WorkoutStore};
use weeksplit::tui::App;
use weeksplit::FlowError;

#[derive(Parser)]
#[command(name = "weeksplit")]
#[command(author, version, about = "Weekly training split planner")]
struct Cli {
    /// SQLite database file
    #[arg(long, env = "WEEKSPLIT_DB", default_value = "weeksplit.db", global = true)]
    db: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open TUI (schedule builder or workout list)
    Tui,

    /// Create an account and sign in
    Signup { email: String },

    /// Sign in to an existing account
    Login { email: String },

    /// Sign out
    Logout,

    /// Show where the app would route you
    Status,

    /// Set your fitness goal (lose_weight, build_muscle, maintain, endurance)
    Goal {
        goal: FitnessGoal,
        /// Target value (kg for weight goals, km for endurance)
        target: f64,
    },

    /// Save the weekly split, Monday to Sunday, and generate workouts
    /// (push, pull, legs, upper, lower, full_body, rest)
    Schedule {
        #[arg(num_args = 7, required = true)]
        days: Vec<WorkoutType>,
    },

    /// List planned workouts
    Workouts,

    /// Mark a workout as done
    Done { id: i64 },

    /// Delete a workout
    Delete { id: i64 },

    /// Show profile and recent workouts
    Profile,

    /// Today's step count from the device health source
    Steps {
        /// Use a manually entered count instead of the device
        #[arg(long)]
        manual: Option<i64>,
    },
}

/// Log the failure and turn it into the short message shown to the user
fn alert(e: FlowError) -> anyhow::Error {
    error!("{:?}", e);
    anyhow!(e.user_message())
}

fn require_user(db: &Database) -> Result<UserId> {
    db.current_user()?
        .ok_or_else(|| alert(FlowError::NotAuthenticated))
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let db = Database::open(&cli.db)?;

    match cli.command {
        Some(Commands::Tui) | None => {
            let mut app = App::new(db)?;
            app.run()?;
        }

        Some(Commands::Signup { email }) => {
            let id = db.sign_up(&email)?;
            SessionProvider::load(&db)?.sign_in(&db, &email)?;
            println!("Welcome! Account created (id: {})", id);
            println!("Next: `weeksplit goal <goal> <target>` and `weeksplit schedule ...`");
        }

        Some(Commands::Login { email }) => {
            let sessions = SessionProvider::load(&db)?;
            sessions.sign_in(&db, &email)?;
            let state = Gate::new().refresh(sessions.current().as_ref(), &db)?;
            println!("Signed in as {}", email);
            if state == GateState::OnboardingRequired {
                println!("Onboarding not finished yet, run `weeksplit schedule ...`");
            }
        }

        Some(Commands::Logout) => {
            SessionProvider::load(&db)?.sign_out(&db)?;
            println!("Signed out");
        }

        Some(Commands::Status) => {
            let sessions = SessionProvider::load(&db)?;
            let state = Gate::new().refresh(sessions.current().as_ref(), &db)?;
            let route = match state {
                GateState::Loading => "loading",
                GateState::Unauthenticated => "login",
                GateState::OnboardingRequired => "onboarding",
                GateState::Ready => "home",
            };
            println!("Route: {}", route);
        }

        Some(Commands::Goal { goal, target }) => {
            Onboarding::with_database(&db)
                .save_goal(goal, target)
                .map_err(alert)?;
            println!("Goal saved: {} ({} {})", goal, target, goal.target_unit());
        }

        Some(Commands::Schedule { days }) => {
            let workouts: [WorkoutType; 7] = days
                .try_into()
                .map_err(|d: Vec<WorkoutType>| anyhow!("expected 7 days, got {}", d.len()))?;
            let schedule = TrainingSchedule::from_workouts(workouts);

            let report = Onboarding::with_database(&db)
                .complete_schedule(&schedule)
                .map_err(alert)?;

            for slot in schedule.slots() {
                println!("{:10} {} {}", slot.day.name(), slot.workout.emoji(), slot.workout);
            }
            println!(
                "{} training days, {} workouts created",
                report.active_days, report.templates_created
            );
        }

        Some(Commands::Workouts) => {
            let user_id = require_user(&db)?;
            let workouts = db.list_workouts(user_id)?;
            println!("Planned workouts:");
            println!("{:-<60}", "");
            for w in &workouts {
                println!(
                    "{:4} | {} | {:10} | {:2} exercises | {}",
                    w.id,
                    w.weekday.short(),
                    w.title,
                    w.exercises.len(),
                    if w.done { "done" } else { "-" }
                );
            }
        }

        Some(Commands::Done { id }) => {
            let user_id = require_user(&db)?;
            if !db.mark_done(user_id, id)? {
                bail!("no workout with id {}", id);
            }
            println!("Workout {} done", id);
        }

        Some(Commands::Delete { id }) => {
            let user_id = require_user(&db)?;
            if !db.delete_workout(user_id, id)? {
                bail!("no workout with id {}", id);
            }
            println!("Workout {} deleted", id);
        }

        Some(Commands::Profile) => {
            let user_id = require_user(&db)?;
            let view = profile::overview(&db, &db, user_id)?;
            let p = &view.profile;

            println!("{}", p.email);
            println!("{:-<40}", "");
            match (p.goal, p.target_value) {
                (Some(goal), Some(target)) => {
                    println!("Goal: {} ({} {})", goal, target, goal.target_unit())
                }
                (Some(goal), None) => println!("Goal: {}", goal),
                _ => println!("Goal: not set"),
            }
            println!("Training days: {}/week", p.training_days);
            println!("Today: {}", view.today());
            if !view.recent.is_empty() {
                println!("\nRecent workouts:");
                for w in &view.recent {
                    println!("  {} {} {}", w.weekday.short(), w.title, if w.done { "✓" } else { "" });
                }
            }
        }

        Some(Commands::Steps { manual }) => {
            let steps = match manual {
                Some(count) => health::read_steps(&mut ManualSteps::new(count)),
                None => health::read_steps(&mut Unavailable),
            };
            match steps {
                Some(steps) => println!("Steps today: {}", steps),
                None => println!("Step count not available on this device"),
            }
        }
    }

    Ok(())
}
