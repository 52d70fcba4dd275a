pub mod prelude;

pub mod categories;
pub mod course_categories;
pub mod courses;
pub mod enrollments;
pub mod lessons;
pub mod roles;
pub mod users;
