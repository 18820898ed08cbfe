//! Schema migration for the portfolio store.

use diesel_async::AsyncPgConnection;
use diesel_async::SimpleAsyncConnection;

/// SQL migration for all portfolio tables.
///
/// Idempotent: every statement is `IF NOT EXISTS`, so it runs on each startup.
pub const MIGRATION_SQL: &str = r#"
-- ================================================================
-- Portfolio content
-- ================================================================

CREATE TABLE IF NOT EXISTS education_entries (
    id                   BIGSERIAL PRIMARY KEY,
    institution          VARCHAR(255) NOT NULL,
    degree               VARCHAR(255) NOT NULL DEFAULT '',
    field_of_study       VARCHAR(255) NOT NULL DEFAULT '',
    education_type       VARCHAR(100) NOT NULL DEFAULT '',
    start_date           VARCHAR(50) NOT NULL DEFAULT '',
    end_date             VARCHAR(50),
    grade                VARCHAR(20) NOT NULL DEFAULT '',
    grade_scale          VARCHAR(20) NOT NULL DEFAULT '',
    location             VARCHAR(255) NOT NULL DEFAULT '',
    is_current           BOOLEAN NOT NULL DEFAULT FALSE,
    institution_logo_url VARCHAR(500) NOT NULL DEFAULT '',
    description          TEXT NOT NULL DEFAULT '',
    achievements         JSONB NOT NULL DEFAULT '[]'::jsonb,
    certificate_url      VARCHAR(500) NOT NULL DEFAULT '',
    is_visible           BOOLEAN NOT NULL DEFAULT TRUE,
    display_order        INTEGER NOT NULL DEFAULT 0,
    created_at           TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at           TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS experience_entries (
    id               BIGSERIAL PRIMARY KEY,
    company_name     VARCHAR(255) NOT NULL,
    company_logo_url VARCHAR(500) NOT NULL DEFAULT '',
    role             VARCHAR(255) NOT NULL DEFAULT '',
    employment_type  VARCHAR(100) NOT NULL DEFAULT '',
    location         VARCHAR(255) NOT NULL DEFAULT '',
    work_mode        VARCHAR(100) NOT NULL DEFAULT '',
    start_date       VARCHAR(50) NOT NULL DEFAULT '',
    end_date         VARCHAR(50),
    is_current       BOOLEAN NOT NULL DEFAULT FALSE,
    description      TEXT NOT NULL DEFAULT '',
    achievements     JSONB NOT NULL DEFAULT '[]'::jsonb,
    skills           JSONB NOT NULL DEFAULT '[]'::jsonb,
    tech_stack       JSONB NOT NULL DEFAULT '[]'::jsonb,
    is_visible       BOOLEAN NOT NULL DEFAULT TRUE,
    display_order    INTEGER NOT NULL DEFAULT 0,
    created_at       TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at       TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS projects (
    id                BIGSERIAL PRIMARY KEY,
    slug              VARCHAR(200) NOT NULL UNIQUE,
    title             VARCHAR(255) NOT NULL,
    organization      VARCHAR(255) NOT NULL DEFAULT '',
    role              VARCHAR(255) NOT NULL DEFAULT '',
    start_date        VARCHAR(50) NOT NULL DEFAULT '',
    end_date          VARCHAR(50),
    project_type      VARCHAR(100) NOT NULL DEFAULT '',
    short_description TEXT NOT NULL DEFAULT '',
    responsibilities  JSONB NOT NULL DEFAULT '[]'::jsonb,
    achievements      JSONB NOT NULL DEFAULT '[]'::jsonb,
    skills            JSONB NOT NULL DEFAULT '[]'::jsonb,
    tech_stack        JSONB NOT NULL DEFAULT '{}'::jsonb,
    project_url       VARCHAR(500) NOT NULL DEFAULT '',
    github_url        VARCHAR(500) NOT NULL DEFAULT '',
    contributor_count INTEGER NOT NULL DEFAULT 0,
    collaboration     VARCHAR(255) NOT NULL DEFAULT '',
    tags              JSONB NOT NULL DEFAULT '[]'::jsonb,
    is_visible        BOOLEAN NOT NULL DEFAULT TRUE,
    display_order     INTEGER NOT NULL DEFAULT 0,
    created_at        TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at        TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS research_publications (
    id                BIGSERIAL PRIMARY KEY,
    slug              VARCHAR(200) NOT NULL UNIQUE,
    title             VARCHAR(500) NOT NULL,
    authors           JSONB NOT NULL DEFAULT '[]'::jsonb,
    publication_date  VARCHAR(50) NOT NULL DEFAULT '',
    institution       VARCHAR(255) NOT NULL DEFAULT '',
    publication_type  VARCHAR(255) NOT NULL DEFAULT '',
    description       TEXT NOT NULL DEFAULT '',
    objectives        JSONB NOT NULL DEFAULT '[]'::jsonb,
    dataset           VARCHAR(255) NOT NULL DEFAULT '',
    metrics           JSONB NOT NULL DEFAULT '[]'::jsonb,
    comparison_models JSONB NOT NULL DEFAULT '[]'::jsonb,
    results_summary   TEXT NOT NULL DEFAULT '',
    highlights        JSONB NOT NULL DEFAULT '[]'::jsonb,
    tags              JSONB NOT NULL DEFAULT '[]'::jsonb,
    url               VARCHAR(500) NOT NULL DEFAULT '',
    is_visible        BOOLEAN NOT NULL DEFAULT TRUE,
    display_order     INTEGER NOT NULL DEFAULT 0,
    cover_image       VARCHAR(500) NOT NULL DEFAULT '',
    created_at        TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at        TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS research_icons (
    id    BIGSERIAL PRIMARY KEY,
    key   VARCHAR(100) NOT NULL UNIQUE,
    path  TEXT NOT NULL DEFAULT '',
    title VARCHAR(255) NOT NULL DEFAULT ''
);

-- ================================================================
-- Singletons (id = 1)
-- ================================================================

CREATE TABLE IF NOT EXISTS home_data (
    id                        BIGSERIAL PRIMARY KEY,
    hero_name                 VARCHAR(255) NOT NULL DEFAULT '',
    hero_tagline              VARCHAR(500) NOT NULL DEFAULT '',
    hero_bio                  TEXT NOT NULL DEFAULT '',
    hero_profile_image        VARCHAR(500) NOT NULL DEFAULT '',
    hero_resume_url           VARCHAR(500) NOT NULL DEFAULT '',
    hero_cta_primary_text     VARCHAR(100) NOT NULL DEFAULT '',
    hero_cta_primary_url      VARCHAR(500) NOT NULL DEFAULT '',
    hero_cta_secondary_text   VARCHAR(100) NOT NULL DEFAULT '',
    hero_cta_secondary_url    VARCHAR(500) NOT NULL DEFAULT '',
    about_title               VARCHAR(255) NOT NULL DEFAULT 'About Me',
    about_paragraphs          JSONB NOT NULL DEFAULT '[]'::jsonb,
    about_highlights          JSONB NOT NULL DEFAULT '[]'::jsonb,
    stats_years_of_experience VARCHAR(20) NOT NULL DEFAULT '',
    stats_projects_completed  INTEGER NOT NULL DEFAULT 0,
    stats_publications        INTEGER NOT NULL DEFAULT 0,
    stats_technologies_used   INTEGER NOT NULL DEFAULT 0,
    skills_title              VARCHAR(255) NOT NULL DEFAULT 'Technical Skills',
    skills_categories         JSONB NOT NULL DEFAULT '[]'::jsonb,
    social_github             VARCHAR(500) NOT NULL DEFAULT '',
    social_linkedin           VARCHAR(500) NOT NULL DEFAULT '',
    social_twitter            VARCHAR(500) NOT NULL DEFAULT '',
    social_email              VARCHAR(255) NOT NULL DEFAULT '',
    social_scholar            VARCHAR(500) NOT NULL DEFAULT '',
    cta_title                 VARCHAR(255) NOT NULL DEFAULT '',
    cta_paragraph             TEXT NOT NULL DEFAULT '',
    cta_primary_text          VARCHAR(100) NOT NULL DEFAULT '',
    cta_primary_url           VARCHAR(500) NOT NULL DEFAULT '',
    cta_secondary_text        VARCHAR(100) NOT NULL DEFAULT '',
    cta_secondary_url         VARCHAR(500) NOT NULL DEFAULT '',
    show_experience           BOOLEAN NOT NULL DEFAULT TRUE,
    show_education            BOOLEAN NOT NULL DEFAULT TRUE,
    show_projects             BOOLEAN NOT NULL DEFAULT TRUE,
    show_research             BOOLEAN NOT NULL DEFAULT TRUE,
    show_blog                 BOOLEAN NOT NULL DEFAULT TRUE,
    created_at                TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at                TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS blogs_data (
    id            BIGSERIAL PRIMARY KEY,
    metadata      JSONB NOT NULL DEFAULT '{}'::jsonb,
    blogs         JSONB NOT NULL DEFAULT '[]'::jsonb,
    future_topics JSONB NOT NULL DEFAULT '[]'::jsonb
);

CREATE TABLE IF NOT EXISTS blog_settings (
    id                       BIGSERIAL PRIMARY KEY,
    duration_update_interval INTEGER NOT NULL DEFAULT 300,
    inactivity_threshold     INTEGER NOT NULL DEFAULT 120,
    created_at               TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at               TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

-- ================================================================
-- Blog posts, comments, engagement
-- ================================================================

CREATE TABLE IF NOT EXISTS blogs (
    id               BIGSERIAL PRIMARY KEY,
    slug             VARCHAR(200) NOT NULL UNIQUE,
    title            VARCHAR(255) NOT NULL,
    subtitle         VARCHAR(500) NOT NULL DEFAULT '',
    excerpt          TEXT NOT NULL DEFAULT '',
    content_markdown TEXT NOT NULL DEFAULT '',
    cover_image      VARCHAR(500) NOT NULL DEFAULT '',
    featured_image   VARCHAR(500) NOT NULL DEFAULT '',
    category         VARCHAR(100) NOT NULL DEFAULT '',
    tags             JSONB NOT NULL DEFAULT '[]'::jsonb,
    author           VARCHAR(255) NOT NULL DEFAULT 'Admin',
    published_date   TIMESTAMPTZ,
    views            INTEGER NOT NULL DEFAULT 0,
    likes            INTEGER NOT NULL DEFAULT 0,
    comments_count   INTEGER NOT NULL DEFAULT 0,
    shares           INTEGER NOT NULL DEFAULT 0,
    is_published     BOOLEAN NOT NULL DEFAULT FALSE,
    is_featured      BOOLEAN NOT NULL DEFAULT FALSE,
    is_trending      BOOLEAN NOT NULL DEFAULT FALSE,
    is_editor_choice BOOLEAN NOT NULL DEFAULT FALSE,
    allow_comments   BOOLEAN NOT NULL DEFAULT TRUE,
    display_order    INTEGER NOT NULL DEFAULT 0,
    read_time        INTEGER NOT NULL DEFAULT 5,
    meta_description TEXT NOT NULL DEFAULT '',
    meta_keywords    VARCHAR(500) NOT NULL DEFAULT '',
    created_at       TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at       TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_blogs_published ON blogs (is_published, published_date DESC);
CREATE INDEX IF NOT EXISTS idx_blogs_category ON blogs (category);

CREATE TABLE IF NOT EXISTS blog_comments (
    id           BIGSERIAL PRIMARY KEY,
    blog_id      BIGINT NOT NULL REFERENCES blogs(id) ON DELETE CASCADE,
    author_name  VARCHAR(255) NOT NULL,
    author_email VARCHAR(254) NOT NULL,
    comment_text TEXT NOT NULL,
    is_approved  BOOLEAN NOT NULL DEFAULT TRUE,
    created_at   TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at   TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_blog_comments_blog ON blog_comments (blog_id, created_at DESC);

CREATE TABLE IF NOT EXISTS blog_views (
    id               BIGSERIAL PRIMARY KEY,
    blog_id          BIGINT NOT NULL REFERENCES blogs(id) ON DELETE CASCADE,
    fingerprint      VARCHAR(255) NOT NULL,
    session_id       VARCHAR(255) NOT NULL DEFAULT '',
    ip_address       VARCHAR(45),
    user_agent       TEXT NOT NULL DEFAULT '',
    viewed_at        TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    viewed_date      DATE NOT NULL DEFAULT CURRENT_DATE,
    last_seen        TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    duration_seconds INTEGER NOT NULL DEFAULT 0,
    CONSTRAINT uq_blog_views_device UNIQUE (blog_id, fingerprint)
);

CREATE TABLE IF NOT EXISTS blog_likes (
    id          BIGSERIAL PRIMARY KEY,
    blog_id     BIGINT NOT NULL REFERENCES blogs(id) ON DELETE CASCADE,
    fingerprint VARCHAR(255) NOT NULL,
    ip_address  VARCHAR(45),
    user_agent  TEXT NOT NULL DEFAULT '',
    is_active   BOOLEAN NOT NULL DEFAULT TRUE,
    liked_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT uq_blog_likes_device UNIQUE (blog_id, fingerprint)
);

-- ================================================================
-- Media and audience
-- ================================================================

CREATE TABLE IF NOT EXISTS media_files (
    id                BIGSERIAL PRIMARY KEY,
    uuid              UUID NOT NULL UNIQUE,
    slug              VARCHAR(255) NOT NULL UNIQUE,
    file_type         VARCHAR(20) NOT NULL DEFAULT 'other',
    original_filename VARCHAR(255) NOT NULL,
    file_path         VARCHAR(500) NOT NULL,
    file_size         BIGINT NOT NULL DEFAULT 0,
    mime_type         VARCHAR(100) NOT NULL DEFAULT 'application/octet-stream',
    title             VARCHAR(255) NOT NULL DEFAULT '',
    alt_text          VARCHAR(500) NOT NULL DEFAULT '',
    is_public         BOOLEAN NOT NULL DEFAULT TRUE,
    uploaded_at       TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at        TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS newsletter_subscribers (
    id            BIGSERIAL PRIMARY KEY,
    email         VARCHAR(254) NOT NULL UNIQUE,
    is_active     BOOLEAN NOT NULL DEFAULT TRUE,
    subscribed_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
"#;

/// Run the portfolio schema migration.
pub async fn run_migration(conn: &mut AsyncPgConnection) -> anyhow::Result<()> {
    conn.batch_execute(MIGRATION_SQL)
        .await
        .map_err(|e| anyhow::anyhow!("Portfolio migration failed: {e}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_engagement_table_has_a_device_constraint() {
        assert!(MIGRATION_SQL.contains("uq_blog_views_device UNIQUE (blog_id, fingerprint)"));
        assert!(MIGRATION_SQL.contains("uq_blog_likes_device UNIQUE (blog_id, fingerprint)"));
    }

    #[test]
    fn children_reference_blogs_with_cascade() {
        for table in ["blog_comments", "blog_views", "blog_likes"] {
            let start = MIGRATION_SQL
                .find(&format!("CREATE TABLE IF NOT EXISTS {table}"))
                .expect("table present");
            let body = &MIGRATION_SQL[start..];
            let end = body.find(");").expect("statement end");
            assert!(
                body[..end].contains("REFERENCES blogs(id) ON DELETE CASCADE"),
                "{table} must cascade from blogs"
            );
        }
    }
}
