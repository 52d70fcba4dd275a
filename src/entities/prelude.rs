pub use super::categories::Entity as Categories;
pub use super::course_categories::Entity as CourseCategories;
pub use super::courses::Entity as Courses;
pub use super::enrollments::Entity as Enrollments;
pub use super::lessons::Entity as Lessons;
pub use super::roles::Entity as Roles;
pub use super::users::Entity as Users;
