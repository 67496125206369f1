//! Exercise catalog - default exercise sets for each workout type

use serde::{Deserialize, Serialize};

use crate::schedule::WorkoutType;

#[derive(Debug, Clone)]
pub struct Exercise {
    pub id: &'static str,
    pub name: &'static str,
    /// Workout types this exercise is part of by default
    pub workouts: &'static [WorkoutType],
    pub sets: u32,
    pub reps: u32,
}

/// Exercise as stored inside a workout template
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlannedExercise {
    /// Catalog id; empty for rows written before ids were stored
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub sets: u32,
    pub reps: u32,
}

impl From<&Exercise> for PlannedExercise {
    fn from(ex: &Exercise) -> Self {
        Self {
            id: ex.id.to_string(),
            name: ex.name.to_string(),
            sets: ex.sets,
            reps: ex.reps,
        }
    }
}

use crate::schedule::WorkoutType::{FullBody, Legs, Lower, Pull, Push, Upper};

pub const EXERCISES: &[Exercise] = &[
    // Pressing
    Exercise { id: "bench_press", name: "Bench Press", workouts: &[Push, Upper, FullBody], sets: 4, reps: 8 },
    Exercise { id: "overhead_press", name: "Overhead Press", workouts: &[Push, Upper], sets: 3, reps: 8 },
    Exercise { id: "incline_db_press", name: "Incline Dumbbell Press", workouts: &[Push], sets: 3, reps: 10 },
    Exercise { id: "triceps_pushdown", name: "Triceps Pushdown", workouts: &[Push], sets: 3, reps: 12 },
    Exercise { id: "lateral_raise", name: "Lateral Raise", workouts: &[Push, Upper], sets: 3, reps: 15 },
    // Pulling
    Exercise { id: "pull_up", name: "Pull-Up", workouts: &[Pull, Upper, FullBody], sets: 4, reps: 6 },
    Exercise { id: "barbell_row", name: "Barbell Row", workouts: &[Pull, Upper], sets: 4, reps: 8 },
    Exercise { id: "face_pull", name: "Face Pull", workouts: &[Pull], sets: 3, reps: 15 },
    Exercise { id: "biceps_curl", name: "Biceps Curl", workouts: &[Pull], sets: 3, reps: 12 },
    // Legs
    Exercise { id: "back_squat", name: "Back Squat", workouts: &[Legs, Lower, FullBody], sets: 4, reps: 6 },
    Exercise { id: "romanian_deadlift", name: "Romanian Deadlift", workouts: &[Legs, Lower], sets: 3, reps: 8 },
    Exercise { id: "walking_lunge", name: "Walking Lunge", workouts: &[Legs, Lower, FullBody], sets: 3, reps: 12 },
    Exercise { id: "leg_curl", name: "Leg Curl", workouts: &[Legs], sets: 3, reps: 12 },
    Exercise { id: "calf_raise", name: "Calf Raise", workouts: &[Legs, Lower], sets: 4, reps: 15 },
    // Core
    Exercise { id: "plank", name: "Plank", workouts: &[FullBody], sets: 3, reps: 1 },
];

/// Default exercise set for a workout type, in catalog order. Empty for rest.
pub fn default_exercises(workout: WorkoutType) -> Vec<PlannedExercise> {
    EXERCISES
        .iter()
        .filter(|ex| ex.workouts.contains(&workout))
        .map(PlannedExercise::from)
        .collect()
}
