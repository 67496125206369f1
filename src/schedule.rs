//! Weekly training split - seven weekday slots, each a workout type or rest

use std::fmt;
use std::str::FromStr;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Calendar weekday, Monday first
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// All weekdays in calendar order
    pub fn all() -> &'static [Weekday; 7] {
        &[
            Weekday::Monday,
            Weekday::Tuesday,
            Weekday::Wednesday,
            Weekday::Thursday,
            Weekday::Friday,
            Weekday::Saturday,
            Weekday::Sunday,
        ]
    }

    pub fn from_index(index: usize) -> Option<Weekday> {
        Weekday::all().get(index).copied()
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn name(&self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }

    pub fn short(&self) -> &'static str {
        &self.name()[..3]
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        // chrono numbers from Monday = 0 as well
        Weekday::all()[day.num_days_from_monday() as usize]
    }
}

impl FromStr for Weekday {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim().to_lowercase();
        Weekday::all()
            .iter()
            .find(|d| d.name().to_lowercase() == needle || d.short().to_lowercase() == needle)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("unknown weekday: {}", s))
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// What a single day of the split is used for
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum WorkoutType {
    Push,
    Pull,
    Legs,
    Upper,
    Lower,
    FullBody,
    #[default]
    Rest,
}

impl WorkoutType {
    /// Every choice offered by the builder, Rest last
    pub fn all() -> &'static [WorkoutType; 7] {
        &[
            WorkoutType::Push,
            WorkoutType::Pull,
            WorkoutType::Legs,
            WorkoutType::Upper,
            WorkoutType::Lower,
            WorkoutType::FullBody,
            WorkoutType::Rest,
        ]
    }

    /// Label shown to the user and used verbatim as a template title
    pub fn label(&self) -> &'static str {
        match self {
            WorkoutType::Push => "Push",
            WorkoutType::Pull => "Pull",
            WorkoutType::Legs => "Legs",
            WorkoutType::Upper => "Upper",
            WorkoutType::Lower => "Lower",
            WorkoutType::FullBody => "Full Body",
            WorkoutType::Rest => "Rest",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            WorkoutType::Push => "💪",
            WorkoutType::Pull => "🏋️",
            WorkoutType::Legs => "🦵",
            WorkoutType::Upper => "🙆",
            WorkoutType::Lower => "🏃",
            WorkoutType::FullBody => "🔥",
            WorkoutType::Rest => "😴",
        }
    }

    pub fn is_rest(&self) -> bool {
        matches!(self, WorkoutType::Rest)
    }

    /// Next choice in the picker, wrapping around
    pub fn next(&self) -> WorkoutType {
        let all = WorkoutType::all();
        let pos = all.iter().position(|w| w == self).unwrap_or(0);
        all[(pos + 1) % all.len()]
    }

    /// Previous choice in the picker, wrapping around
    pub fn prev(&self) -> WorkoutType {
        let all = WorkoutType::all();
        let pos = all.iter().position(|w| w == self).unwrap_or(0);
        all[(pos + all.len() - 1) % all.len()]
    }
}

impl FromStr for WorkoutType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_lowercase();

        WorkoutType::all()
            .iter()
            .find(|w| w.label().replace(' ', "").to_lowercase() == normalized)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("unknown workout type: {}", s))
    }
}

impl fmt::Display for WorkoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// One weekday's assignment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeekdaySlot {
    pub day: Weekday,
    pub workout: WorkoutType,
}

/// Full seven-slot weekly assignment, always in calendar order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<WeekdaySlot>", into = "Vec<WeekdaySlot>")]
pub struct TrainingSchedule {
    slots: [WeekdaySlot; 7],
}

impl TrainingSchedule {
    /// Build a schedule from one workout per weekday, Monday first
    pub fn from_workouts(workouts: [WorkoutType; 7]) -> Self {
        let mut slots = [WeekdaySlot { day: Weekday::Monday, workout: WorkoutType::Rest }; 7];
        for (i, day) in Weekday::all().iter().enumerate() {
            slots[i] = WeekdaySlot { day: *day, workout: workouts[i] };
        }
        Self { slots }
    }

    pub fn all_rest() -> Self {
        Self::from_workouts([WorkoutType::Rest; 7])
    }

    pub fn slots(&self) -> &[WeekdaySlot; 7] {
        &self.slots
    }

    pub fn workout_on(&self, day: Weekday) -> WorkoutType {
        self.slots[day.index()].workout
    }

    /// Number of days that are not rest
    pub fn active_days_count(&self) -> usize {
        self.slots.iter().filter(|s| !s.workout.is_rest()).count()
    }

    /// Non-rest slots in calendar order
    pub fn training_days(&self) -> impl Iterator<Item = &WeekdaySlot> {
        self.slots.iter().filter(|s| !s.workout.is_rest())
    }
}

impl Default for TrainingSchedule {
    fn default() -> Self {
        Self::all_rest()
    }
}

impl TryFrom<Vec<WeekdaySlot>> for TrainingSchedule {
    type Error = anyhow::Error;

    fn try_from(slots: Vec<WeekdaySlot>) -> Result<Self> {
        if slots.len() != 7 {
            bail!("schedule needs 7 slots, got {}", slots.len());
        }
        let mut workouts = [WorkoutType::Rest; 7];
        for (i, slot) in slots.iter().enumerate() {
            if slot.day.index() != i {
                bail!("slot {} is {}, expected {}", i, slot.day, Weekday::all()[i]);
            }
            workouts[i] = slot.workout;
        }
        Ok(Self::from_workouts(workouts))
    }
}

impl From<TrainingSchedule> for Vec<WeekdaySlot> {
    fn from(schedule: TrainingSchedule) -> Self {
        schedule.slots.to_vec()
    }
}

/// In-memory split being edited before the user confirms it
#[derive(Debug, Clone, Default)]
pub struct ScheduleBuilder {
    workouts: [WorkoutType; 7],
    active_days: usize,
}

impl ScheduleBuilder {
    /// Start with every day set to rest
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a previously saved split
    pub fn from_schedule(schedule: &TrainingSchedule) -> Self {
        let mut builder = Self::new();
        for slot in schedule.slots() {
            builder.workouts[slot.day.index()] = slot.workout;
        }
        builder.active_days = schedule.active_days_count();
        builder
    }

    /// Assign a workout type to the day at `day_index` (0 = Monday).
    ///
    /// Choices come from a fixed picker, so an out-of-range index is
    /// ignored rather than reported.
    pub fn set_day_workout(&mut self, day_index: usize, workout: WorkoutType) {
        let Some(slot) = self.workouts.get_mut(day_index) else {
            warn!("Ignoring workout for day index {}", day_index);
            return;
        };
        *slot = workout;
        self.active_days = self.workouts.iter().filter(|w| !w.is_rest()).count();
        debug!(
            "Day {} set to {}, active days: {}",
            day_index,
            workout,
            self.active_days
        );
    }

    pub fn workout_at(&self, day_index: usize) -> Option<WorkoutType> {
        self.workouts.get(day_index).copied()
    }

    pub fn active_days_count(&self) -> usize {
        self.active_days
    }

    pub fn finish(&self) -> TrainingSchedule {
        TrainingSchedule::from_workouts(self.workouts)
    }
}
