//! Workout-template generation from a finished weekly split

use anyhow::Result;
use tracing::info;

use crate::db::NewWorkoutTemplate;
use crate::exercises::default_exercises;
use crate::schedule::TrainingSchedule;
use crate::store::{UserId, WorkoutStore};

/// One template per non-rest day, in calendar order
pub fn build_templates(schedule: &TrainingSchedule, owner: UserId) -> Vec<NewWorkoutTemplate> {
    schedule
        .training_days()
        .map(|slot| NewWorkoutTemplate {
            owner_id: owner,
            title: slot.workout.label().to_string(),
            weekday: slot.day,
            done: false,
            exercises: default_exercises(slot.workout),
        })
        .collect()
}

/// Write the templates for `schedule` and return how many non-rest days
/// were processed.
///
/// Existing templates of the owner are not looked at, so running this twice
/// for the same schedule creates every template twice.
pub fn generate<S: WorkoutStore + ?Sized>(
    schedule: &TrainingSchedule,
    owner: UserId,
    store: &S,
) -> Result<usize> {
    let templates = build_templates(schedule, owner);
    if templates.is_empty() {
        info!("No training days for user {}, nothing to generate", owner);
        return Ok(0);
    }

    let created = store.create_workout_templates(&templates)?;
    info!("Generated {} workout templates for user {}", created, owner);
    Ok(templates.len())
}
