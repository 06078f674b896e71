//! Cascading deletes and the orphan-reconciliation sweep.
//!
//! A course owns its lectures, assignments and enrollments: deleting the
//! course must remove all three sets. Deleting a user removes the courses
//! they own (and each course's dependents) plus their own enrollments.
//! Submissions are deliberately not removed with their assignment.

use serde::Serialize;
use uuid::Uuid;

use super::DbPool;

/// Deletes a course and everything keyed by its `course_id`, in one
/// transaction: the course row first, then lectures, assignments and
/// enrollments.
pub async fn delete_course_with_dependents(
    pool: &DbPool,
    course_id: Uuid,
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM courses WHERE id = $1")
        .bind(course_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM lectures WHERE course_id = $1")
        .bind(course_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM assignments WHERE course_id = $1")
        .bind(course_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM enrollments WHERE course_id = $1")
        .bind(course_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await
}

/// Deletes a user together with the courses they own, each such course's
/// lectures/assignments/enrollments, and the user's own enrollments.
/// Course dependents go first so the owned-course subquery still matches.
pub async fn delete_user_with_dependents(pool: &DbPool, user_id: Uuid) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "DELETE FROM lectures WHERE course_id IN (SELECT id FROM courses WHERE instructor_id = $1)",
    )
    .bind(user_id)
    .execute(&mut *tx)
    .await?;
    sqlx::query(
        "DELETE FROM assignments WHERE course_id IN (SELECT id FROM courses WHERE instructor_id = $1)",
    )
    .bind(user_id)
    .execute(&mut *tx)
    .await?;
    sqlx::query(
        "DELETE FROM enrollments WHERE course_id IN (SELECT id FROM courses WHERE instructor_id = $1)",
    )
    .bind(user_id)
    .execute(&mut *tx)
    .await?;
    sqlx::query("DELETE FROM courses WHERE instructor_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM enrollments WHERE student_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await
}

/// Counts of orphaned rows removed by [`sweep_orphans`].
#[derive(Debug, Default, Serialize)]
pub struct SweepReport {
    pub lectures: u64,
    pub assignments: u64,
    pub enrollments: u64,
}

impl SweepReport {
    pub fn total(&self) -> u64 {
        self.lectures + self.assignments + self.enrollments
    }
}

/// Removes lectures, assignments and enrollments whose course no longer
/// exists. Idempotent; safe to re-run at any time. Runs at startup and via
/// the admin maintenance endpoint.
pub async fn sweep_orphans(pool: &DbPool) -> Result<SweepReport, sqlx::Error> {
    let lectures =
        sqlx::query("DELETE FROM lectures WHERE course_id NOT IN (SELECT id FROM courses)")
            .execute(pool)
            .await?
            .rows_affected();
    let assignments =
        sqlx::query("DELETE FROM assignments WHERE course_id NOT IN (SELECT id FROM courses)")
            .execute(pool)
            .await?
            .rows_affected();
    let enrollments =
        sqlx::query("DELETE FROM enrollments WHERE course_id NOT IN (SELECT id FROM courses)")
            .execute(pool)
            .await?
            .rows_affected();

    Ok(SweepReport {
        lectures,
        assignments,
        enrollments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn pool() -> DbPool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::db::run_migrations(&pool).await.unwrap();
        pool
    }

    async fn insert_course(pool: &DbPool, course_id: Uuid) {
        sqlx::query(
            "INSERT INTO courses (id, title, description, instructor_id, instructor_name, thumbnail_url, created_at)
             VALUES ($1, $2, $3, $4, $5, '', $6)",
        )
        .bind(course_id)
        .bind("Algorithms")
        .bind("Sorting and searching")
        .bind(Uuid::new_v4())
        .bind("Ada")
        .bind(Utc::now())
        .execute(pool)
        .await
        .unwrap();
    }

    async fn insert_lecture(pool: &DbPool, course_id: Uuid) {
        sqlx::query(
            r#"INSERT INTO lectures (id, course_id, title, video_url, duration, "order", created_at)
               VALUES ($1, $2, 'Intro', 'https://v/1', 0, 1, $3)"#,
        )
        .bind(Uuid::new_v4())
        .bind(course_id)
        .bind(Utc::now())
        .execute(pool)
        .await
        .unwrap();
    }

    async fn count(pool: &DbPool, sql: &str, course_id: Uuid) -> i64 {
        sqlx::query_scalar(sql)
            .bind(course_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn course_cascade_removes_all_dependents() {
        let pool = pool().await;
        let course_id = Uuid::new_v4();
        insert_course(&pool, course_id).await;
        insert_lecture(&pool, course_id).await;
        insert_lecture(&pool, course_id).await;
        sqlx::query(
            "INSERT INTO assignments (id, course_id, title, description, file_url, due_date, created_at)
             VALUES ($1, $2, 'HW1', 'Do it', '', NULL, $3)",
        )
        .bind(Uuid::new_v4())
        .bind(course_id)
        .bind(Utc::now())
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO enrollments (id, student_id, course_id, enrolled_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(Uuid::new_v4())
        .bind(Uuid::new_v4())
        .bind(course_id)
        .bind(Utc::now())
        .execute(&pool)
        .await
        .unwrap();

        delete_course_with_dependents(&pool, course_id).await.unwrap();

        for sql in [
            "SELECT COUNT(*) FROM courses WHERE id = $1",
            "SELECT COUNT(*) FROM lectures WHERE course_id = $1",
            "SELECT COUNT(*) FROM assignments WHERE course_id = $1",
            "SELECT COUNT(*) FROM enrollments WHERE course_id = $1",
        ] {
            assert_eq!(count(&pool, sql, course_id).await, 0);
        }
    }

    #[tokio::test]
    async fn sweep_removes_only_orphans() {
        let pool = pool().await;
        let live = Uuid::new_v4();
        let dead = Uuid::new_v4();
        insert_course(&pool, live).await;
        insert_lecture(&pool, live).await;
        // Orphan: lecture pointing at a course that was never created.
        insert_lecture(&pool, dead).await;

        let report = sweep_orphans(&pool).await.unwrap();
        assert_eq!(report.lectures, 1);
        assert_eq!(report.total(), 1);
        assert_eq!(
            count(&pool, "SELECT COUNT(*) FROM lectures WHERE course_id = $1", live).await,
            1
        );

        // Re-running finds nothing further to do.
        let report = sweep_orphans(&pool).await.unwrap();
        assert_eq!(report.total(), 0);
    }
}
