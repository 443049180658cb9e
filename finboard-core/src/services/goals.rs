//! Savings goals kept in `goals.json` next to the settings file
//!
//! Goals never touch the dashboard API. The file holds a JSON array of
//! goals; a missing file is an empty list. A file that cannot be parsed is
//! reported rather than overwritten, so a hand edit gone wrong is not lost
//! on the next save.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::domain::result::{Error, Result};
use crate::domain::{Goal, GoalDraft};
use crate::ports::Clock;

pub const GOALS_FILE: &str = "goals.json";

pub struct GoalService {
    path: PathBuf,
    clock: Arc<dyn Clock>,
}

impl GoalService {
    pub fn new(finboard_dir: &Path, clock: Arc<dyn Clock>) -> Self {
        Self {
            path: finboard_dir.join(GOALS_FILE),
            clock,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All goals, in the order they were created
    pub fn list(&self) -> Result<Vec<Goal>> {
        self.read()
    }

    pub fn get(&self, id: i64) -> Result<Goal> {
        self.read()?
            .into_iter()
            .find(|g| g.id == id)
            .ok_or_else(|| not_found(id))
    }

    pub fn add(&self, draft: GoalDraft) -> Result<Goal> {
        draft.validate()?;
        let mut goals = self.read()?;
        let now = self.clock.now();
        let id = goals.iter().map(|g| g.id).max().unwrap_or(0) + 1;

        let goal = Goal {
            id,
            title: draft.title.trim().to_string(),
            description: draft.description.trim().to_string(),
            category: draft.category,
            target_amount: draft.target_amount,
            current_amount: draft.current_amount,
            target_date: draft.target_date,
            created_at: now,
            updated_at: now,
        };
        goals.push(goal.clone());
        self.write(&goals)?;

        tracing::info!(id, title = %goal.title, "added goal");
        Ok(goal)
    }

    /// Replace every editable field; id and creation time are kept
    pub fn update(&self, id: i64, draft: GoalDraft) -> Result<Goal> {
        draft.validate()?;
        let now = self.clock.now();
        self.modify(id, |goal| {
            goal.title = draft.title.trim().to_string();
            goal.description = draft.description.trim().to_string();
            goal.category = draft.category;
            goal.target_amount = draft.target_amount;
            goal.current_amount = draft.current_amount;
            goal.target_date = draft.target_date;
            goal.updated_at = now;
            Ok(())
        })
    }

    /// Set the saved amount outright
    pub fn set_progress(&self, id: i64, current_amount: Decimal) -> Result<Goal> {
        if current_amount < Decimal::ZERO {
            return Err(Error::validation("current amount cannot be negative"));
        }
        let now = self.clock.now();
        self.modify(id, |goal| {
            goal.current_amount = current_amount;
            goal.updated_at = now;
            Ok(())
        })
    }

    /// Add to (or, with a negative amount, withdraw from) the saved amount
    pub fn deposit(&self, id: i64, amount: Decimal) -> Result<Goal> {
        let now = self.clock.now();
        self.modify(id, |goal| {
            let next = goal.current_amount + amount;
            if next < Decimal::ZERO {
                return Err(Error::validation(format!(
                    "cannot withdraw {} from a goal holding {}",
                    -amount, goal.current_amount
                )));
            }
            goal.current_amount = next;
            goal.updated_at = now;
            Ok(())
        })
    }

    pub fn delete(&self, id: i64) -> Result<Goal> {
        let mut goals = self.read()?;
        let index = goals
            .iter()
            .position(|g| g.id == id)
            .ok_or_else(|| not_found(id))?;
        let removed = goals.remove(index);
        self.write(&goals)?;

        tracing::info!(id, "deleted goal");
        Ok(removed)
    }

    fn modify<F>(&self, id: i64, change: F) -> Result<Goal>
    where
        F: FnOnce(&mut Goal) -> Result<()>,
    {
        let mut goals = self.read()?;
        let goal = goals
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| not_found(id))?;
        change(goal)?;
        let updated = goal.clone();
        self.write(&goals)?;

        tracing::debug!(id, current = %updated.current_amount, "updated goal");
        Ok(updated)
    }

    fn read(&self) -> Result<Vec<Goal>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|e| {
            Error::parse(format!("{} is not a valid goals file: {}", self.path.display(), e))
        })
    }

    fn write(&self, goals: &[Goal]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(goals)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

fn not_found(id: i64) -> Error {
    Error::validation(format!("no goal with id {}", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GoalCategory;
    use crate::ports::ManualClock;
    use chrono::{Duration, NaiveDate, TimeZone, Utc};
    use tempfile::TempDir;

    fn service(dir: &TempDir) -> (GoalService, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
        ));
        (GoalService::new(dir.path(), clock.clone()), clock)
    }

    fn draft(title: &str, target: i64) -> GoalDraft {
        GoalDraft {
            title: title.to_string(),
            description: String::new(),
            category: GoalCategory::Travel,
            target_amount: Decimal::from(target),
            current_amount: Decimal::ZERO,
            target_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let (goals, _) = service(&dir);
        assert!(goals.list().unwrap().is_empty());
        assert!(!goals.path().exists());
    }

    #[test]
    fn test_add_assigns_increasing_ids_and_persists() {
        let dir = TempDir::new().unwrap();
        let (goals, _) = service(&dir);

        let first = goals.add(draft("  Japan trip ", 3000)).unwrap();
        let second = goals.add(draft("New laptop", 1500)).unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.title, "Japan trip");

        // A fresh service sees the same file
        let (reopened, _) = service(&dir);
        let listed = reopened.list().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0], first);
    }

    #[test]
    fn test_ids_are_not_reused_after_delete() {
        let dir = TempDir::new().unwrap();
        let (goals, _) = service(&dir);
        goals.add(draft("a", 10)).unwrap();
        goals.add(draft("b", 10)).unwrap();
        goals.delete(1).unwrap();

        let next = goals.add(draft("c", 10)).unwrap();
        assert_eq!(next.id, 3);
        assert!(goals.get(1).is_err());
    }

    #[test]
    fn test_add_rejects_invalid_draft() {
        let dir = TempDir::new().unwrap();
        let (goals, _) = service(&dir);
        assert!(matches!(
            goals.add(draft("", 100)),
            Err(Error::Validation(_))
        ));
        assert!(goals.add(draft("Car", 0)).is_err());
        assert!(goals.list().unwrap().is_empty());
    }

    #[test]
    fn test_deposit_accumulates_and_reaches_completion() {
        let dir = TempDir::new().unwrap();
        let (goals, clock) = service(&dir);
        let goal = goals.add(draft("Emergency", 1000)).unwrap();

        clock.advance(Duration::days(1));
        let after = goals.deposit(goal.id, Decimal::from(400)).unwrap();
        assert_eq!(after.current_amount, Decimal::from(400));
        assert_eq!(after.progress_percentage(), Decimal::from(40));
        assert_eq!(after.created_at, goal.created_at);
        assert!(after.updated_at > goal.updated_at);

        let done = goals.deposit(goal.id, Decimal::from(700)).unwrap();
        assert!(done.is_completed());
        assert_eq!(done.progress_percentage(), Decimal::ONE_HUNDRED);
    }

    #[test]
    fn test_withdrawal_cannot_go_negative() {
        let dir = TempDir::new().unwrap();
        let (goals, _) = service(&dir);
        let goal = goals.add(draft("Bike", 500)).unwrap();
        goals.deposit(goal.id, Decimal::from(100)).unwrap();

        assert!(goals.deposit(goal.id, Decimal::from(-150)).is_err());
        assert_eq!(goals.get(goal.id).unwrap().current_amount, Decimal::from(100));

        let back = goals.deposit(goal.id, Decimal::from(-100)).unwrap();
        assert_eq!(back.current_amount, Decimal::ZERO);
    }

    #[test]
    fn test_set_progress_overwrites_amount() {
        let dir = TempDir::new().unwrap();
        let (goals, _) = service(&dir);
        let goal = goals.add(draft("House", 50_000)).unwrap();
        goals.deposit(goal.id, Decimal::from(1000)).unwrap();

        let set = goals.set_progress(goal.id, Decimal::from(250)).unwrap();
        assert_eq!(set.current_amount, Decimal::from(250));
        assert!(goals.set_progress(goal.id, Decimal::from(-1)).is_err());
        assert!(goals.set_progress(99, Decimal::ONE).is_err());
    }

    #[test]
    fn test_update_keeps_identity() {
        let dir = TempDir::new().unwrap();
        let (goals, clock) = service(&dir);
        let goal = goals.add(draft("Course", 800)).unwrap();
        clock.advance(Duration::hours(2));

        let mut edit = GoalDraft::from(&goal);
        edit.title = "Rust course".to_string();
        edit.category = GoalCategory::Education;
        let updated = goals.update(goal.id, edit).unwrap();

        assert_eq!(updated.id, goal.id);
        assert_eq!(updated.created_at, goal.created_at);
        assert_eq!(updated.title, "Rust course");
        assert_eq!(updated.category, GoalCategory::Education);
        assert_eq!(goals.get(goal.id).unwrap(), updated);
    }

    #[test]
    fn test_corrupt_file_is_reported_not_overwritten() {
        let dir = TempDir::new().unwrap();
        let (goals, _) = service(&dir);
        std::fs::write(goals.path(), "{ not json").unwrap();

        assert!(matches!(goals.list(), Err(Error::Parse(_))));
        assert!(goals.add(draft("x", 10)).is_err());
        assert_eq!(std::fs::read_to_string(goals.path()).unwrap(), "{ not json");
    }

    #[test]
    fn test_reads_goals_written_with_string_amounts() {
        let dir = TempDir::new().unwrap();
        let (goals, _) = service(&dir);
        std::fs::write(
            goals.path(),
            r#"[{"id": 7, "title": "Car", "targetAmount": "12000.50",
                 "targetDate": "2025-01-01",
                 "createdAt": "2024-01-01T00:00:00Z", "updatedAt": "2024-01-01T00:00:00Z"}]"#,
        )
        .unwrap();

        let goal = goals.get(7).unwrap();
        assert_eq!(goal.target_amount, "12000.50".parse::<Decimal>().unwrap());
        assert_eq!(goal.current_amount, Decimal::ZERO);
        assert_eq!(goal.category, GoalCategory::Savings);
    }
}
