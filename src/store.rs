//! Store interfaces the flow talks to
//!
//! [`crate::db::Database`] implements all three against SQLite; tests
//! swap in failing or recording stores where needed.

use anyhow::Result;

use crate::db::{NewWorkoutTemplate, ProfileUpdate, Session, UserProfile, WorkoutTemplate};

pub type UserId = i64;
pub type WorkoutId = i64;

/// Account and session bookkeeping
pub trait AuthStore {
    /// User owning the stored session, if any
    fn current_user(&self) -> Result<Option<UserId>>;

    /// Register an account; returns the new user id
    fn sign_up(&self, email: &str) -> Result<UserId>;

    /// Start a session for an existing account, replacing any stored one
    fn sign_in(&self, email: &str) -> Result<Session>;

    /// Drop the stored session
    fn sign_out(&self) -> Result<()>;
}

pub trait ProfileStore {
    fn get_profile(&self, id: UserId) -> Result<Option<UserProfile>>;

    fn update_profile(&self, id: UserId, update: &ProfileUpdate) -> Result<()>;
}

pub trait WorkoutStore {
    /// Insert a batch of templates; returns how many were created
    fn create_workout_templates(&self, records: &[NewWorkoutTemplate]) -> Result<usize>;

    /// Delete one of `owner`'s workouts; returns false if the owner has no
    /// workout with that id
    fn delete_workout(&self, owner: UserId, id: WorkoutId) -> Result<bool>;

    fn list_workouts(&self, owner: UserId) -> Result<Vec<WorkoutTemplate>>;

    /// Most recently created workouts first
    fn recent_workouts(&self, owner: UserId, limit: usize) -> Result<Vec<WorkoutTemplate>>;

    /// Mark one of `owner`'s workouts as done; returns false if the owner
    /// has no workout with that id
    fn mark_done(&self, owner: UserId, id: WorkoutId) -> Result<bool>;
}
