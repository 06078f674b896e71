pub mod authz;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use authz::{can_create_course, can_manage_course, check_course_access, require_admin, require_student};
pub use jwt::{decode_jwt, issue_jwt, JwtClaims};
pub use middleware::auth_required;
pub use password::{hash_password, verify_password};
