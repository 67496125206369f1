//! Records stored by the database

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::exercises::PlannedExercise;
use crate::schedule::{TrainingSchedule, Weekday};
use crate::store::{UserId, WorkoutId};

/// What the user is training for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FitnessGoal {
    LoseWeight,
    BuildMuscle,
    Maintain,
    Endurance,
}

impl FitnessGoal {
    pub fn all() -> &'static [FitnessGoal] {
        &[
            FitnessGoal::LoseWeight,
            FitnessGoal::BuildMuscle,
            FitnessGoal::Maintain,
            FitnessGoal::Endurance,
        ]
    }

    /// Stable key used in the database and on the command line
    pub fn key(&self) -> &'static str {
        match self {
            FitnessGoal::LoseWeight => "lose_weight",
            FitnessGoal::BuildMuscle => "build_muscle",
            FitnessGoal::Maintain => "maintain",
            FitnessGoal::Endurance => "endurance",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FitnessGoal::LoseWeight => "Lose weight",
            FitnessGoal::BuildMuscle => "Build muscle",
            FitnessGoal::Maintain => "Maintain",
            FitnessGoal::Endurance => "Endurance",
        }
    }

    /// Unit of the numeric target for this goal
    pub fn target_unit(&self) -> &'static str {
        match self {
            FitnessGoal::LoseWeight | FitnessGoal::BuildMuscle | FitnessGoal::Maintain => "kg",
            FitnessGoal::Endurance => "km",
        }
    }
}

impl FromStr for FitnessGoal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let needle = s.trim().to_lowercase().replace(['-', ' '], "_");
        FitnessGoal::all()
            .iter()
            .find(|g| g.key() == needle)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("unknown goal: {}", s))
    }
}

impl fmt::Display for FitnessGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Stored sign-in on this device
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub token: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub goal: Option<FitnessGoal>,
    pub target_value: Option<f64>,
    pub schedule: Option<TrainingSchedule>,
    pub training_days: u32,
    pub is_onboarded: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields to change on a profile; `None` leaves the column as is
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub goal: Option<FitnessGoal>,
    pub target_value: Option<f64>,
    pub schedule: Option<TrainingSchedule>,
    pub training_days: Option<u32>,
    pub is_onboarded: Option<bool>,
}

/// Planned workout derived from one schedule slot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkoutTemplate {
    pub id: WorkoutId,
    pub owner_id: UserId,
    pub title: String,
    pub weekday: Weekday,
    pub done: bool,
    pub exercises: Vec<PlannedExercise>,
    pub created_at: DateTime<Utc>,
}

/// Template row before insertion
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewWorkoutTemplate {
    pub owner_id: UserId,
    pub title: String,
    pub weekday: Weekday,
    pub done: bool,
    pub exercises: Vec<PlannedExercise>,
}
