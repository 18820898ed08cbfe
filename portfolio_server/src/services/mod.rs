//! Portfolio services: queries and mutations over an `AsyncPgConnection`.

pub mod blog_service;
pub mod comment_service;
pub mod education_service;
pub mod engagement_service;
pub mod experience_service;
pub mod media_service;
pub mod newsletter_service;
pub mod project_service;
pub mod research_service;
pub mod singleton_service;
