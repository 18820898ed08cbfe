//! Home page singleton.
//!
//! Stored flat, served as the nested document the site renders.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{default_true, empty_list};
use crate::schema::home_data;

/// Primary key of the single home row.
pub const HOME_ID: i64 = 1;

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = home_data)]
pub struct HomeData {
    pub id: i64,
    pub hero_name: String,
    pub hero_tagline: String,
    pub hero_bio: String,
    pub hero_profile_image: String,
    pub hero_resume_url: String,
    pub hero_cta_primary_text: String,
    pub hero_cta_primary_url: String,
    pub hero_cta_secondary_text: String,
    pub hero_cta_secondary_url: String,
    pub about_title: String,
    pub about_paragraphs: Value,
    pub about_highlights: Value,
    pub stats_years_of_experience: String,
    pub stats_projects_completed: i32,
    pub stats_publications: i32,
    pub stats_technologies_used: i32,
    pub skills_title: String,
    pub skills_categories: Value,
    pub social_github: String,
    pub social_linkedin: String,
    pub social_twitter: String,
    pub social_email: String,
    pub social_scholar: String,
    pub cta_title: String,
    pub cta_paragraph: String,
    pub cta_primary_text: String,
    pub cta_primary_url: String,
    pub cta_secondary_text: String,
    pub cta_secondary_url: String,
    pub show_experience: bool,
    pub show_education: bool,
    pub show_projects: bool,
    pub show_research: bool,
    pub show_blog: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Admin body for the home singleton; the id is always [`HOME_ID`].
#[derive(Debug, Clone, Default, Insertable, AsChangeset, Deserialize)]
#[diesel(table_name = home_data)]
#[serde(default)]
pub struct HomeInput {
    #[serde(skip)]
    pub id: i64,
    pub hero_name: String,
    pub hero_tagline: String,
    pub hero_bio: String,
    pub hero_profile_image: String,
    pub hero_resume_url: String,
    pub hero_cta_primary_text: String,
    pub hero_cta_primary_url: String,
    pub hero_cta_secondary_text: String,
    pub hero_cta_secondary_url: String,
    pub about_title: String,
    #[serde(default = "empty_list")]
    pub about_paragraphs: Value,
    #[serde(default = "empty_list")]
    pub about_highlights: Value,
    pub stats_years_of_experience: String,
    pub stats_projects_completed: i32,
    pub stats_publications: i32,
    pub stats_technologies_used: i32,
    pub skills_title: String,
    #[serde(default = "empty_list")]
    pub skills_categories: Value,
    pub social_github: String,
    pub social_linkedin: String,
    pub social_twitter: String,
    pub social_email: String,
    pub social_scholar: String,
    pub cta_title: String,
    pub cta_paragraph: String,
    pub cta_primary_text: String,
    pub cta_primary_url: String,
    pub cta_secondary_text: String,
    pub cta_secondary_url: String,
    #[serde(default = "default_true")]
    pub show_experience: bool,
    #[serde(default = "default_true")]
    pub show_education: bool,
    #[serde(default = "default_true")]
    pub show_projects: bool,
    #[serde(default = "default_true")]
    pub show_research: bool,
    #[serde(default = "default_true")]
    pub show_blog: bool,
}

fn non_empty(value: &str) -> Value {
    if value.is_empty() {
        Value::Null
    } else {
        Value::String(value.to_string())
    }
}

fn button(text: &str, url: Value) -> Value {
    if text.is_empty() {
        Value::Null
    } else {
        json!({ "text": text, "url": url })
    }
}

impl HomeData {
    /// Nested home document: hero, about, stats, skills, social links,
    /// call-to-action and section toggles.
    pub fn to_document(&self) -> Value {
        let cta_primary_url = if self.cta_primary_url.is_empty() {
            Value::String(format!("mailto:{}", self.social_email))
        } else {
            Value::String(self.cta_primary_url.clone())
        };

        json!({
            "data": {
                "hero": {
                    "name": self.hero_name,
                    "tagline": self.hero_tagline,
                    "bio": self.hero_bio,
                    "profile_image": self.hero_profile_image,
                    "resume_url": non_empty(&self.hero_resume_url),
                    "cta_buttons": {
                        "primary": button(
                            &self.hero_cta_primary_text,
                            Value::String(self.hero_cta_primary_url.clone()),
                        ),
                        "secondary": button(
                            &self.hero_cta_secondary_text,
                            Value::String(self.hero_cta_secondary_url.clone()),
                        ),
                    },
                },
                "about": {
                    "title": self.about_title,
                    "paragraphs": self.about_paragraphs,
                    "highlights": self.about_highlights,
                },
                "stats": {
                    "years_of_experience": non_empty(&self.stats_years_of_experience),
                    "projects_completed": self.stats_projects_completed,
                    "publications": self.stats_publications,
                    "technologies_used": self.stats_technologies_used,
                },
                "skills": {
                    "title": self.skills_title,
                    "categories": self.skills_categories,
                },
                "social_links": {
                    "github": non_empty(&self.social_github),
                    "linkedin": non_empty(&self.social_linkedin),
                    "twitter": non_empty(&self.social_twitter),
                    "email": non_empty(&self.social_email),
                    "scholar": non_empty(&self.social_scholar),
                },
                "cta": {
                    "title": non_empty(&self.cta_title),
                    "paragraph": non_empty(&self.cta_paragraph),
                    "primary": button(&self.cta_primary_text, cta_primary_url),
                    "secondary": button(
                        &self.cta_secondary_text,
                        Value::String(self.cta_secondary_url.clone()),
                    ),
                },
                "featured_sections": {
                    "show_experience": self.show_experience,
                    "show_education": self.show_education,
                    "show_projects": self.show_projects,
                    "show_research": self.show_research,
                    "show_blog": self.show_blog,
                },
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> HomeData {
        let now = Utc::now();
        HomeData {
            id: HOME_ID,
            hero_name: "Ada".into(),
            hero_tagline: "Engineer".into(),
            hero_bio: "Builds things".into(),
            hero_profile_image: "/api/cdn/ada".into(),
            hero_resume_url: String::new(),
            hero_cta_primary_text: "View My Work".into(),
            hero_cta_primary_url: "/project".into(),
            hero_cta_secondary_text: String::new(),
            hero_cta_secondary_url: "mailto:ada@example.com".into(),
            about_title: "About Me".into(),
            about_paragraphs: json!(["one", "two"]),
            about_highlights: json!([]),
            stats_years_of_experience: "5+".into(),
            stats_projects_completed: 12,
            stats_publications: 2,
            stats_technologies_used: 30,
            skills_title: "Technical Skills".into(),
            skills_categories: json!([{ "name": "Backend", "skills": ["Rust"] }]),
            social_github: "https://github.com/ada".into(),
            social_linkedin: String::new(),
            social_twitter: String::new(),
            social_email: "ada@example.com".into(),
            social_scholar: String::new(),
            cta_title: "Let's Work Together".into(),
            cta_paragraph: String::new(),
            cta_primary_text: "Get In Touch".into(),
            cta_primary_url: String::new(),
            cta_secondary_text: String::new(),
            cta_secondary_url: String::new(),
            show_experience: true,
            show_education: true,
            show_projects: false,
            show_research: true,
            show_blog: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn empty_optional_fields_render_as_null() {
        let doc = sample().to_document();
        assert!(doc["data"]["hero"]["resume_url"].is_null());
        assert!(doc["data"]["social_links"]["linkedin"].is_null());
        assert!(doc["data"]["cta"]["paragraph"].is_null());
        assert_eq!(doc["data"]["social_links"]["github"], "https://github.com/ada");
    }

    #[test]
    fn buttons_without_text_are_omitted() {
        let doc = sample().to_document();
        assert_eq!(doc["data"]["hero"]["cta_buttons"]["primary"]["url"], "/project");
        assert!(doc["data"]["hero"]["cta_buttons"]["secondary"].is_null());
        assert!(doc["data"]["cta"]["secondary"].is_null());
    }

    #[test]
    fn cta_primary_falls_back_to_mailto() {
        let doc = sample().to_document();
        assert_eq!(doc["data"]["cta"]["primary"]["url"], "mailto:ada@example.com");
    }

    #[test]
    fn section_toggles_are_passed_through() {
        let doc = sample().to_document();
        assert_eq!(doc["data"]["featured_sections"]["show_projects"], false);
        assert_eq!(doc["data"]["stats"]["years_of_experience"], "5+");
    }
}
