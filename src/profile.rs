//! Profile view - profile record plus recent workouts

use anyhow::{Result, bail};
use chrono::{Datelike, Local};

use crate::db::{UserProfile, WorkoutTemplate};
use crate::schedule::{Weekday, WorkoutType};
use crate::store::{ProfileStore, UserId, WorkoutStore};

/// Number of workouts shown on the profile
pub const RECENT_LIMIT: usize = 5;

#[derive(Debug, Clone)]
pub struct ProfileOverview {
    pub profile: UserProfile,
    pub recent: Vec<WorkoutTemplate>,
}

impl ProfileOverview {
    /// Workout planned for `day`, `Rest` without a saved split
    pub fn workout_on(&self, day: Weekday) -> WorkoutType {
        self.profile
            .schedule
            .as_ref()
            .map(|s| s.workout_on(day))
            .unwrap_or_default()
    }

    pub fn today(&self) -> WorkoutType {
        self.workout_on(Local::now().weekday().into())
    }
}

/// Load the profile and its most recent workouts
pub fn overview<P, W>(profiles: &P, workouts: &W, user_id: UserId) -> Result<ProfileOverview>
where
    P: ProfileStore + ?Sized,
    W: WorkoutStore + ?Sized,
{
    let Some(profile) = profiles.get_profile(user_id)? else {
        bail!("no profile for user {}", user_id);
    };
    let recent = workouts.recent_workouts(user_id, RECENT_LIMIT)?;
    Ok(ProfileOverview { profile, recent })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::generator::generate;
    use crate::onboarding::Onboarding;
    use crate::schedule::TrainingSchedule;
    use crate::store::AuthStore;

    #[test]
    fn test_overview_of_onboarded_user() {
        let db = Database::in_memory().unwrap();
        let id = db.sign_up("view@example.com").unwrap();
        db.sign_in("view@example.com").unwrap();

        let schedule = TrainingSchedule::from_workouts([WorkoutType::FullBody; 7]);
        Onboarding::with_database(&db).complete_schedule(&schedule).unwrap();

        let view = overview(&db, &db, id).unwrap();
        assert!(view.profile.is_onboarded);
        assert_eq!(view.recent.len(), RECENT_LIMIT);
        assert_eq!(view.today(), WorkoutType::FullBody);
        assert_eq!(view.workout_on(Weekday::Sunday), WorkoutType::FullBody);
    }

    #[test]
    fn test_overview_without_schedule() {
        let db = Database::in_memory().unwrap();
        let id = db.sign_up("view@example.com").unwrap();
        generate(&TrainingSchedule::all_rest(), id, &db).unwrap();

        let view = overview(&db, &db, id).unwrap();
        assert!(view.recent.is_empty());
        assert_eq!(view.today(), WorkoutType::Rest);
    }

    #[test]
    fn test_overview_unknown_user() {
        let db = Database::in_memory().unwrap();
        assert!(overview(&db, &db, 3).is_err());
    }
}
