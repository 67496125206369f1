//! Onboarding flow - goal capture, then the weekly split, then templates

use tracing::{error, info};

use crate::db::{Database, FitnessGoal, ProfileUpdate};
use crate::error::{FlowError, FlowResult};
use crate::generator;
use crate::schedule::TrainingSchedule;
use crate::store::{AuthStore, ProfileStore, UserId, WorkoutStore};

/// Result of confirming the weekly split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionReport {
    pub user_id: UserId,
    pub active_days: usize,
    pub templates_created: usize,
}

/// Drives the onboarding steps against the stores
pub struct Onboarding<'a, A: ?Sized, P: ?Sized, W: ?Sized> {
    auth: &'a A,
    profiles: &'a P,
    workouts: &'a W,
}

impl<'a> Onboarding<'a, Database, Database, Database> {
    pub fn with_database(db: &'a Database) -> Self {
        Self::new(db, db, db)
    }
}

impl<'a, A, P, W> Onboarding<'a, A, P, W>
where
    A: AuthStore + ?Sized,
    P: ProfileStore + ?Sized,
    W: WorkoutStore + ?Sized,
{
    pub fn new(auth: &'a A, profiles: &'a P, workouts: &'a W) -> Self {
        Self { auth, profiles, workouts }
    }

    fn require_user(&self) -> FlowResult<UserId> {
        self.auth.current_user()?.ok_or(FlowError::NotAuthenticated)
    }

    /// Store the goal category and its numeric target on the profile.
    /// The target must be finite and above zero.
    pub fn save_goal(&self, goal: FitnessGoal, target_value: f64) -> FlowResult<UserId> {
        let user_id = self.require_user()?;
        if !target_value.is_finite() || target_value <= 0.0 {
            return Err(FlowError::InvalidTarget(target_value));
        }
        let update = ProfileUpdate {
            goal: Some(goal),
            target_value: Some(target_value),
            ..Default::default()
        };
        self.profiles.update_profile(user_id, &update).inspect_err(|e| {
            error!("Failed to save goal for user {}: {:#}", user_id, e);
        })?;
        info!("User {} goal: {} ({} {})", user_id, goal, target_value, goal.target_unit());
        Ok(user_id)
    }

    /// Persist the split, mark the user onboarded, then generate templates.
    ///
    /// Nothing is written without a session. If generation fails after the
    /// profile write, the profile stays onboarded.
    pub fn complete_schedule(&self, schedule: &TrainingSchedule) -> FlowResult<CompletionReport> {
        let user_id = self.require_user()?;
        let active_days = schedule.active_days_count();

        let update = ProfileUpdate {
            schedule: Some(schedule.clone()),
            training_days: Some(active_days as u32),
            is_onboarded: Some(true),
            ..Default::default()
        };
        self.profiles.update_profile(user_id, &update).inspect_err(|e| {
            error!("Failed to save schedule for user {}: {:#}", user_id, e);
        })?;

        let templates_created =
            generator::generate(schedule, user_id, self.workouts).inspect_err(|e| {
                error!("Failed to generate workouts for user {}: {:#}", user_id, e);
            })?;

        info!(
            "User {} onboarded: {} training days, {} templates",
            user_id, active_days, templates_created
        );
        Ok(CompletionReport {
            user_id,
            active_days,
            templates_created,
        })
    }
}
