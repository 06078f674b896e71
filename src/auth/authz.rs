//! Authorization policy: pure decision functions over the actor's role and
//! the target's ownership fields, plus the shared course-authorization check
//! used by every course-scoped mutation.

use uuid::Uuid;

use crate::{
    db::DbPool,
    errors::AppError,
    models::{Course, User, UserRole},
};

/// Only instructors and admins may create courses
pub fn can_create_course(role: UserRole) -> bool {
    matches!(role, UserRole::Instructor | UserRole::Admin)
}

/// Admins manage any course; instructors only the ones they own
pub fn can_manage_course(actor: &User, course: &Course) -> bool {
    actor.role == UserRole::Admin || course.instructor_id == actor.id
}

/// Check if user has admin role
pub fn require_admin(actor: &User) -> Result<(), AppError> {
    if actor.role != UserRole::Admin {
        return Err(AppError::Forbidden("Admin only".to_string()));
    }
    Ok(())
}

/// Check if user has student role; `action` names the operation in the error
pub fn require_student(actor: &User, action: &str) -> Result<(), AppError> {
    if actor.role != UserRole::Student {
        return Err(AppError::Forbidden(format!("Only students can {}", action)));
    }
    Ok(())
}

/// Shared course-authorization check for course-scoped mutations (update,
/// delete, add/remove lectures and assignments). The existence check runs
/// before any ownership evaluation: a missing course is 404 for everyone.
pub async fn check_course_access(
    pool: &DbPool,
    actor: &User,
    course_id: Uuid,
) -> Result<Course, AppError> {
    let course = sqlx::query_as::<_, Course>(
        "SELECT id, title, description, instructor_id, instructor_name, thumbnail_url, created_at
         FROM courses WHERE id = $1",
    )
    .bind(course_id)
    .fetch_optional(pool)
    .await
    .map_err(AppError::Database)?
    .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

    if !can_manage_course(actor, &course) {
        return Err(AppError::Forbidden("Not authorized".to_string()));
    }

    Ok(course)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(role: UserRole) -> User {
        User {
            id: Uuid::new_v4(),
            email: "u@example.com".to_string(),
            password_hash: String::new(),
            name: "U".to_string(),
            role,
            created_at: Utc::now(),
        }
    }

    fn course_owned_by(instructor_id: Uuid) -> Course {
        Course {
            id: Uuid::new_v4(),
            title: "T".to_string(),
            description: "D".to_string(),
            instructor_id,
            instructor_name: "I".to_string(),
            thumbnail_url: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn course_creation_is_gated_by_role() {
        assert!(can_create_course(UserRole::Instructor));
        assert!(can_create_course(UserRole::Admin));
        assert!(!can_create_course(UserRole::Student));
    }

    #[test]
    fn owner_and_admin_manage_courses() {
        let owner = user(UserRole::Instructor);
        let other = user(UserRole::Instructor);
        let admin = user(UserRole::Admin);
        let student = user(UserRole::Student);
        let course = course_owned_by(owner.id);

        assert!(can_manage_course(&owner, &course));
        assert!(can_manage_course(&admin, &course));
        assert!(!can_manage_course(&other, &course));
        assert!(!can_manage_course(&student, &course));
    }

    #[test]
    fn role_requirements() {
        assert!(require_admin(&user(UserRole::Admin)).is_ok());
        assert!(require_admin(&user(UserRole::Instructor)).is_err());
        assert!(require_student(&user(UserRole::Student), "enroll").is_ok());
        assert!(require_student(&user(UserRole::Admin), "enroll").is_err());
    }
}
