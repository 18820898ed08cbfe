//! Table descriptors for backup and restore.
//!
//! Export, delete and insert each have their own order: children are
//! deleted before parents and parents are inserted before children.

/// One exported table.
#[derive(Debug, Clone, Copy)]
pub struct TableSpec {
    /// Archive name: `json_data/<name>.json`.
    pub name: &'static str,
    /// Model name used in report keys such as `Blog_deleted`.
    pub model: &'static str,
    /// Fixture label, written as `portfolio.<label>`.
    pub label: &'static str,
    pub table: &'static str,
    /// Every column except `id`.
    pub columns: &'static [&'static str],
    /// Legacy fixture field names mapped to columns.
    pub aliases: &'static [(&'static str, &'static str)],
}

impl TableSpec {
    pub fn file_name(&self) -> String {
        format!("{}.json", self.name)
    }

    pub fn model_label(&self) -> String {
        format!("portfolio.{}", self.label)
    }

    pub fn column(&self, field: &str) -> Option<&'static str> {
        self.columns
            .iter()
            .copied()
            .find(|c| *c == field)
            .or_else(|| {
                self.aliases
                    .iter()
                    .find(|(alias, _)| *alias == field)
                    .map(|(_, column)| *column)
            })
    }
}

pub const EDUCATION: TableSpec = TableSpec {
    name: "education",
    model: "EducationEntry",
    label: "educationentry",
    table: "education_entries",
    columns: &[
        "institution",
        "degree",
        "field_of_study",
        "education_type",
        "start_date",
        "end_date",
        "grade",
        "grade_scale",
        "location",
        "is_current",
        "institution_logo_url",
        "description",
        "achievements",
        "certificate_url",
        "is_visible",
        "display_order",
        "created_at",
        "updated_at",
    ],
    aliases: &[],
};

pub const EXPERIENCE: TableSpec = TableSpec {
    name: "experience",
    model: "ExperienceEntry",
    label: "experienceentry",
    table: "experience_entries",
    columns: &[
        "company_name",
        "company_logo_url",
        "role",
        "employment_type",
        "location",
        "work_mode",
        "start_date",
        "end_date",
        "is_current",
        "description",
        "achievements",
        "skills",
        "tech_stack",
        "is_visible",
        "display_order",
        "created_at",
        "updated_at",
    ],
    aliases: &[],
};

pub const PROJECTS: TableSpec = TableSpec {
    name: "projects",
    model: "Project",
    label: "project",
    table: "projects",
    columns: &[
        "slug",
        "title",
        "organization",
        "role",
        "start_date",
        "end_date",
        "project_type",
        "short_description",
        "responsibilities",
        "achievements",
        "skills",
        "tech_stack",
        "project_url",
        "github_url",
        "contributor_count",
        "collaboration",
        "tags",
        "is_visible",
        "display_order",
        "created_at",
        "updated_at",
    ],
    aliases: &[("type", "project_type")],
};

pub const RESEARCH: TableSpec = TableSpec {
    name: "research",
    model: "ResearchPublication",
    label: "researchpublication",
    table: "research_publications",
    columns: &[
        "slug",
        "title",
        "authors",
        "publication_date",
        "institution",
        "publication_type",
        "description",
        "objectives",
        "dataset",
        "metrics",
        "comparison_models",
        "results_summary",
        "highlights",
        "tags",
        "url",
        "is_visible",
        "display_order",
        "cover_image",
        "created_at",
        "updated_at",
    ],
    aliases: &[],
};

pub const RESEARCH_ICONS: TableSpec = TableSpec {
    name: "research_icons",
    model: "ResearchIcon",
    label: "researchicon",
    table: "research_icons",
    columns: &[
        "key",
        "path",
        "title",
    ],
    aliases: &[],
};

pub const HOME_DATA: TableSpec = TableSpec {
    name: "home_data",
    model: "HomeData",
    label: "homedata",
    table: "home_data",
    columns: &[
        "hero_name",
        "hero_tagline",
        "hero_bio",
        "hero_profile_image",
        "hero_resume_url",
        "hero_cta_primary_text",
        "hero_cta_primary_url",
        "hero_cta_secondary_text",
        "hero_cta_secondary_url",
        "about_title",
        "about_paragraphs",
        "about_highlights",
        "stats_years_of_experience",
        "stats_projects_completed",
        "stats_publications",
        "stats_technologies_used",
        "skills_title",
        "skills_categories",
        "social_github",
        "social_linkedin",
        "social_twitter",
        "social_email",
        "social_scholar",
        "cta_title",
        "cta_paragraph",
        "cta_primary_text",
        "cta_primary_url",
        "cta_secondary_text",
        "cta_secondary_url",
        "show_experience",
        "show_education",
        "show_projects",
        "show_research",
        "show_blog",
        "created_at",
        "updated_at",
    ],
    aliases: &[],
};

pub const BLOGS: TableSpec = TableSpec {
    name: "blogs",
    model: "Blog",
    label: "blog",
    table: "blogs",
    columns: &[
        "slug",
        "title",
        "subtitle",
        "excerpt",
        "content_markdown",
        "cover_image",
        "featured_image",
        "category",
        "tags",
        "author",
        "published_date",
        "views",
        "likes",
        "comments_count",
        "shares",
        "is_published",
        "is_featured",
        "is_trending",
        "is_editor_choice",
        "allow_comments",
        "display_order",
        "read_time",
        "meta_description",
        "meta_keywords",
        "created_at",
        "updated_at",
    ],
    aliases: &[],
};

pub const BLOG_COMMENTS: TableSpec = TableSpec {
    name: "blog_comments",
    model: "BlogComment",
    label: "blogcomment",
    table: "blog_comments",
    columns: &[
        "blog_id",
        "author_name",
        "author_email",
        "comment_text",
        "is_approved",
        "created_at",
        "updated_at",
    ],
    aliases: &[("blog", "blog_id")],
};

pub const BLOGS_DATA: TableSpec = TableSpec {
    name: "blogs_data",
    model: "BlogsData",
    label: "blogsdata",
    table: "blogs_data",
    columns: &[
        "metadata",
        "blogs",
        "future_topics",
    ],
    aliases: &[],
};

pub const BLOG_SETTINGS: TableSpec = TableSpec {
    name: "blog_settings",
    model: "BlogSettings",
    label: "blogsettings",
    table: "blog_settings",
    columns: &[
        "duration_update_interval",
        "inactivity_threshold",
        "created_at",
        "updated_at",
    ],
    aliases: &[],
};

pub const MEDIA_FILES: TableSpec = TableSpec {
    name: "media_files",
    model: "MediaFile",
    label: "mediafile",
    table: "media_files",
    columns: &[
        "uuid",
        "slug",
        "file_type",
        "original_filename",
        "file_path",
        "file_size",
        "mime_type",
        "title",
        "alt_text",
        "is_public",
        "uploaded_at",
        "updated_at",
    ],
    aliases: &[],
};

pub const EXPORT_ORDER: [&TableSpec; 11] = [
    &EDUCATION,
    &EXPERIENCE,
    &PROJECTS,
    &RESEARCH,
    &RESEARCH_ICONS,
    &HOME_DATA,
    &BLOGS,
    &BLOG_COMMENTS,
    &BLOGS_DATA,
    &BLOG_SETTINGS,
    &MEDIA_FILES,
];

pub const IMPORT_ORDER: [&TableSpec; 11] = [
    &EDUCATION,
    &EXPERIENCE,
    &PROJECTS,
    &RESEARCH,
    &RESEARCH_ICONS,
    &HOME_DATA,
    &BLOG_SETTINGS,
    &BLOGS_DATA,
    &BLOGS,
    &BLOG_COMMENTS,
    &MEDIA_FILES,
];

/// `(model, table)` pairs cleared before an overwrite import. Engagement
/// records are not exported but must go before their blogs.
pub const DELETE_ORDER: [(&str, &str); 13] = [
    ("BlogComment", "blog_comments"),
    ("BlogLike", "blog_likes"),
    ("BlogView", "blog_views"),
    ("Blog", "blogs"),
    ("BlogsData", "blogs_data"),
    ("BlogSettings", "blog_settings"),
    ("MediaFile", "media_files"),
    ("Project", "projects"),
    ("ResearchPublication", "research_publications"),
    ("ResearchIcon", "research_icons"),
    ("ExperienceEntry", "experience_entries"),
    ("EducationEntry", "education_entries"),
    ("HomeData", "home_data"),
];
