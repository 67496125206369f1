//! Database module - SQLite storage for profiles, sessions and workouts

mod models;

pub use models::{
    FitnessGoal, NewWorkoutTemplate, ProfileUpdate, Session, UserProfile, WorkoutTemplate,
};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use tracing::{debug, info};

use crate::schedule::TrainingSchedule;
use crate::store::{AuthStore, ProfileStore, UserId, WorkoutId, WorkoutStore};

const SESSION_TOKEN_LEN: usize = 32;

/// Database wrapper
pub struct Database {
    conn: Connection,
}

fn parse_date(text: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(text)
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Raw `workouts` row, parsed outside the rusqlite row closure
struct WorkoutRow {
    id: WorkoutId,
    owner_id: UserId,
    title: String,
    weekday: String,
    done: bool,
    exercises: String,
    created_at: String,
}

impl WorkoutRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            title: row.get(2)?,
            weekday: row.get(3)?,
            done: row.get(4)?,
            exercises: row.get(5)?,
            created_at: row.get(6)?,
        })
    }

    fn into_template(self) -> Result<WorkoutTemplate> {
        Ok(WorkoutTemplate {
            id: self.id,
            owner_id: self.owner_id,
            title: self.title,
            weekday: self.weekday.parse::<crate::schedule::Weekday>()?,
            done: self.done,
            exercises: serde_json::from_str(&self.exercises)
                .with_context(|| format!("bad exercises for workout {}", self.id))?,
            created_at: parse_date(&self.created_at),
        })
    }
}

const WORKOUT_COLUMNS: &str = "id, user_id, title, weekday, done, exercises, created_at";

impl Database {
    /// Open or create database
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database {}", path))?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Fresh database that lives only as long as the value
    pub fn in_memory() -> Result<Self> {
        Self::open(":memory:")
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL UNIQUE,
                goal TEXT,
                target_value REAL,
                schedule TEXT,
                training_days INTEGER NOT NULL DEFAULT 0,
                is_onboarded INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS session (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                token TEXT NOT NULL,
                user_id INTEGER NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS workouts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                weekday TEXT NOT NULL,
                done INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );",
        )?;

        // Migration: add exercises column if missing
        let has_exercises: bool = self
            .conn
            .prepare("SELECT exercises FROM workouts LIMIT 1")
            .is_ok();
        if !has_exercises {
            self.conn.execute(
                "ALTER TABLE workouts ADD COLUMN exercises TEXT NOT NULL DEFAULT '[]'",
                [],
            )?;
        }

        Ok(())
    }

    /// Stored session row, if any
    pub fn current_session(&self) -> Result<Option<Session>> {
        let row = self
            .conn
            .query_row(
                "SELECT token, user_id, created_at FROM session WHERE id = 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, UserId>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        Ok(row.map(|(token, user_id, created_at)| Session {
            token,
            user_id,
            created_at: parse_date(&created_at),
        }))
    }
}

impl AuthStore for Database {
    fn current_user(&self) -> Result<Option<UserId>> {
        Ok(self.current_session()?.map(|s| s.user_id))
    }

    fn sign_up(&self, email: &str) -> Result<UserId> {
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            bail!("email must not be empty");
        }
        self.conn
            .execute(
                "INSERT INTO users (email, created_at) VALUES (?1, ?2)",
                params![email, Utc::now().to_rfc3339()],
            )
            .with_context(|| format!("could not create account {}", email))?;
        let id = self.conn.last_insert_rowid();
        info!("Created account {} (id: {})", email, id);
        Ok(id)
    }

    fn sign_in(&self, email: &str) -> Result<Session> {
        let email = email.trim().to_lowercase();
        let user_id: UserId = self
            .conn
            .query_row("SELECT id FROM users WHERE email = ?1", [&email], |row| row.get(0))
            .optional()?
            .with_context(|| format!("no account for {}", email))?;

        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SESSION_TOKEN_LEN)
            .map(char::from)
            .collect();
        let session = Session {
            token,
            user_id,
            created_at: Utc::now(),
        };

        self.conn.execute(
            "INSERT OR REPLACE INTO session (id, token, user_id, created_at) VALUES (1, ?1, ?2, ?3)",
            params![session.token, session.user_id, session.created_at.to_rfc3339()],
        )?;
        info!("User {} signed in", user_id);
        Ok(session)
    }

    fn sign_out(&self) -> Result<()> {
        let removed = self.conn.execute("DELETE FROM session", [])?;
        debug!("Removed {} stored session(s)", removed);
        Ok(())
    }
}

impl ProfileStore for Database {
    fn get_profile(&self, id: UserId) -> Result<Option<UserProfile>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, email, goal, target_value, schedule, training_days, is_onboarded, created_at
                 FROM users WHERE id = ?1",
                [id],
                |row| {
                    Ok((
                        row.get::<_, UserId>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, Option<f64>>(3)?,
                        row.get::<_, Option<String>>(4)?,
                        row.get::<_, u32>(5)?,
                        row.get::<_, bool>(6)?,
                        row.get::<_, String>(7)?,
                    ))
                },
            )
            .optional()?;

        let Some((id, email, goal, target_value, schedule, training_days, is_onboarded, created_at)) =
            row
        else {
            return Ok(None);
        };

        Ok(Some(UserProfile {
            id,
            email,
            goal: goal.map(|g| g.parse::<FitnessGoal>()).transpose()?,
            target_value,
            schedule: schedule
                .map(|s| serde_json::from_str::<TrainingSchedule>(&s))
                .transpose()
                .with_context(|| format!("bad schedule for user {}", id))?,
            training_days,
            is_onboarded,
            created_at: parse_date(&created_at),
        }))
    }

    fn update_profile(&self, id: UserId, update: &ProfileUpdate) -> Result<()> {
        let mut columns: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(goal) = update.goal {
            columns.push("goal = ?");
            values.push(Value::Text(goal.key().to_string()));
        }
        if let Some(target) = update.target_value {
            columns.push("target_value = ?");
            values.push(Value::Real(target));
        }
        if let Some(schedule) = &update.schedule {
            columns.push("schedule = ?");
            values.push(Value::Text(serde_json::to_string(schedule)?));
        }
        if let Some(days) = update.training_days {
            columns.push("training_days = ?");
            values.push(Value::Integer(days.into()));
        }
        if let Some(onboarded) = update.is_onboarded {
            columns.push("is_onboarded = ?");
            values.push(Value::Integer(onboarded.into()));
        }

        if columns.is_empty() {
            return Ok(());
        }

        values.push(Value::Integer(id));
        let sql = format!("UPDATE users SET {} WHERE id = ?", columns.join(", "));
        let changed = self.conn.execute(&sql, params_from_iter(values))?;
        if changed == 0 {
            bail!("no user with id {}", id);
        }
        debug!("Updated profile {} ({})", id, columns.join(", "));
        Ok(())
    }
}

impl WorkoutStore for Database {
    fn create_workout_templates(&self, records: &[NewWorkoutTemplate]) -> Result<usize> {
        // One transaction: a failing row leaves nothing behind
        let tx = self.conn.unchecked_transaction()?;
        let created_at = Utc::now().to_rfc3339();
        {
            let mut stmt = tx.prepare(
                "INSERT INTO workouts (user_id, title, weekday, done, exercises, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for record in records {
                stmt.execute(params![
                    record.owner_id,
                    record.title,
                    record.weekday.name(),
                    record.done,
                    serde_json::to_string(&record.exercises)?,
                    created_at,
                ])?;
            }
        }
        tx.commit()?;
        Ok(records.len())
    }

    fn delete_workout(&self, owner: UserId, id: WorkoutId) -> Result<bool> {
        let removed = self.conn.execute(
            "DELETE FROM workouts WHERE id = ?1 AND user_id = ?2",
            params![id, owner],
        )?;
        Ok(removed > 0)
    }

    fn list_workouts(&self, owner: UserId) -> Result<Vec<WorkoutTemplate>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM workouts WHERE user_id = ?1 ORDER BY id",
            WORKOUT_COLUMNS
        ))?;
        let rows = stmt
            .query_map([owner], WorkoutRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(WorkoutRow::into_template).collect()
    }

    fn recent_workouts(&self, owner: UserId, limit: usize) -> Result<Vec<WorkoutTemplate>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM workouts WHERE user_id = ?1 ORDER BY created_at DESC, id DESC LIMIT ?2",
            WORKOUT_COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![owner, limit as i64], WorkoutRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(WorkoutRow::into_template).collect()
    }

    fn mark_done(&self, owner: UserId, id: WorkoutId) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE workouts SET done = 1 WHERE id = ?1 AND user_id = ?2",
            params![id, owner],
        )?;
        Ok(changed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercises::default_exercises;
    use crate::schedule::{Weekday, WorkoutType};

    fn template(owner: UserId, workout: WorkoutType, weekday: Weekday) -> NewWorkoutTemplate {
        NewWorkoutTemplate {
            owner_id: owner,
            title: workout.label().to_string(),
            weekday,
            done: false,
            exercises: default_exercises(workout),
        }
    }

    #[test]
    fn test_sign_up_and_sign_in() {
        let db = Database::in_memory().unwrap();
        assert_eq!(db.current_user().unwrap(), None);

        let id = db.sign_up("Ann@Example.com").unwrap();
        let session = db.sign_in("ann@example.com").unwrap();
        assert_eq!(session.user_id, id);
        assert_eq!(session.token.len(), SESSION_TOKEN_LEN);
        assert_eq!(db.current_user().unwrap(), Some(id));

        db.sign_out().unwrap();
        assert_eq!(db.current_user().unwrap(), None);
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let db = Database::in_memory().unwrap();
        db.sign_up("ann@example.com").unwrap();
        assert!(db.sign_up("ann@example.com").is_err());
    }

    #[test]
    fn test_sign_in_unknown_email() {
        let db = Database::in_memory().unwrap();
        assert!(db.sign_in("nobody@example.com").is_err());
        assert_eq!(db.current_user().unwrap(), None);
    }

    #[test]
    fn test_second_sign_in_replaces_session() {
        let db = Database::in_memory().unwrap();
        db.sign_up("a@example.com").unwrap();
        let b = db.sign_up("b@example.com").unwrap();
        db.sign_in("a@example.com").unwrap();
        db.sign_in("b@example.com").unwrap();
        assert_eq!(db.current_user().unwrap(), Some(b));
    }

    #[test]
    fn test_new_profile_defaults() {
        let db = Database::in_memory().unwrap();
        let id = db.sign_up("ann@example.com").unwrap();
        let profile = db.get_profile(id).unwrap().unwrap();
        assert_eq!(profile.email, "ann@example.com");
        assert_eq!(profile.goal, None);
        assert_eq!(profile.schedule, None);
        assert_eq!(profile.training_days, 0);
        assert!(!profile.is_onboarded);
        assert!(db.get_profile(id + 1).unwrap().is_none());
    }

    #[test]
    fn test_update_profile_partial() {
        let db = Database::in_memory().unwrap();
        let id = db.sign_up("ann@example.com").unwrap();

        db.update_profile(id, &ProfileUpdate {
            goal: Some(FitnessGoal::BuildMuscle),
            target_value: Some(82.5),
            ..Default::default()
        })
        .unwrap();

        let schedule = TrainingSchedule::from_workouts([
            WorkoutType::Upper,
            WorkoutType::Lower,
            WorkoutType::Rest,
            WorkoutType::Upper,
            WorkoutType::Lower,
            WorkoutType::Rest,
            WorkoutType::Rest,
        ]);
        db.update_profile(id, &ProfileUpdate {
            schedule: Some(schedule.clone()),
            training_days: Some(4),
            is_onboarded: Some(true),
            ..Default::default()
        })
        .unwrap();

        let profile = db.get_profile(id).unwrap().unwrap();
        assert_eq!(profile.goal, Some(FitnessGoal::BuildMuscle));
        assert_eq!(profile.target_value, Some(82.5));
        assert_eq!(profile.schedule, Some(schedule));
        assert_eq!(profile.training_days, 4);
        assert!(profile.is_onboarded);
    }

    #[test]
    fn test_update_missing_profile_fails() {
        let db = Database::in_memory().unwrap();
        let update = ProfileUpdate {
            is_onboarded: Some(true),
            ..Default::default()
        };
        assert!(db.update_profile(42, &update).is_err());
        assert!(db.update_profile(42, &ProfileUpdate::default()).is_ok());
    }

    #[test]
    fn test_workout_lifecycle() {
        let db = Database::in_memory().unwrap();
        let owner = db.sign_up("ann@example.com").unwrap();
        let created = db
            .create_workout_templates(&[
                template(owner, WorkoutType::Push, Weekday::Monday),
                template(owner, WorkoutType::Pull, Weekday::Wednesday),
            ])
            .unwrap();
        assert_eq!(created, 2);

        let workouts = db.list_workouts(owner).unwrap();
        assert_eq!(workouts.len(), 2);
        assert_eq!(workouts[0].title, "Push");
        assert_eq!(workouts[0].weekday, Weekday::Monday);
        assert_eq!(workouts[0].exercises, default_exercises(WorkoutType::Push));
        assert!(!workouts[0].done);

        assert!(db.mark_done(owner, workouts[0].id).unwrap());
        assert!(db.list_workouts(owner).unwrap()[0].done);

        assert!(db.delete_workout(owner, workouts[1].id).unwrap());
        assert!(!db.delete_workout(owner, workouts[1].id).unwrap());
        assert_eq!(db.list_workouts(owner).unwrap().len(), 1);
        assert!(!db.mark_done(owner, 9999).unwrap());
    }

    #[test]
    fn test_cannot_touch_other_users_workouts() {
        let db = Database::in_memory().unwrap();
        let ann = db.sign_up("ann@example.com").unwrap();
        let bob = db.sign_up("bob@example.com").unwrap();
        db.create_workout_templates(&[template(ann, WorkoutType::Push, Weekday::Monday)])
            .unwrap();
        let workout_id = db.list_workouts(ann).unwrap()[0].id;

        db.sign_in("bob@example.com").unwrap();
        assert!(!db.mark_done(bob, workout_id).unwrap());
        assert!(!db.delete_workout(bob, workout_id).unwrap());

        let workouts = db.list_workouts(ann).unwrap();
        assert_eq!(workouts.len(), 1);
        assert!(!workouts[0].done);
    }

    #[test]
    fn test_recent_workouts_newest_first() {
        let db = Database::in_memory().unwrap();
        let owner = db.sign_up("ann@example.com").unwrap();
        db.create_workout_templates(&[template(owner, WorkoutType::Legs, Weekday::Friday)])
            .unwrap();
        db.create_workout_templates(&[template(owner, WorkoutType::Upper, Weekday::Tuesday)])
            .unwrap();

        let recent = db.recent_workouts(owner, 1).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].title, "Upper");
        assert!(db.recent_workouts(owner + 1, 5).unwrap().is_empty());
    }

    #[test]
    fn test_empty_batch_creates_nothing() {
        let db = Database::in_memory().unwrap();
        assert_eq!(db.create_workout_templates(&[]).unwrap(), 0);
    }
}
