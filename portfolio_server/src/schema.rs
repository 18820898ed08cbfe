//! Diesel table definitions for the portfolio store.
//!
//! Content: education_entries, experience_entries, projects,
//! research_publications, research_icons, blogs, blog_comments.
//! Singletons: home_data, blogs_data, blog_settings.
//! Engagement: blog_views, blog_likes. Uploads: media_files.
//! Audience: newsletter_subscribers.

diesel::table! {
    education_entries (id) {
        id -> Int8,
        institution -> Varchar,
        degree -> Varchar,
        field_of_study -> Varchar,
        education_type -> Varchar,
        start_date -> Varchar,
        end_date -> Nullable<Varchar>,
        grade -> Varchar,
        grade_scale -> Varchar,
        location -> Varchar,
        is_current -> Bool,
        institution_logo_url -> Varchar,
        description -> Text,
        achievements -> Jsonb,
        certificate_url -> Varchar,
        is_visible -> Bool,
        display_order -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    experience_entries (id) {
        id -> Int8,
        company_name -> Varchar,
        company_logo_url -> Varchar,
        role -> Varchar,
        employment_type -> Varchar,
        location -> Varchar,
        work_mode -> Varchar,
        start_date -> Varchar,
        end_date -> Nullable<Varchar>,
        is_current -> Bool,
        description -> Text,
        achievements -> Jsonb,
        skills -> Jsonb,
        tech_stack -> Jsonb,
        is_visible -> Bool,
        display_order -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    projects (id) {
        id -> Int8,
        slug -> Varchar,
        title -> Varchar,
        organization -> Varchar,
        role -> Varchar,
        start_date -> Varchar,
        end_date -> Nullable<Varchar>,
        project_type -> Varchar,
        short_description -> Text,
        responsibilities -> Jsonb,
        achievements -> Jsonb,
        skills -> Jsonb,
        tech_stack -> Jsonb,
        project_url -> Varchar,
        github_url -> Varchar,
        contributor_count -> Int4,
        collaboration -> Varchar,
        tags -> Jsonb,
        is_visible -> Bool,
        display_order -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    research_publications (id) {
        id -> Int8,
        slug -> Varchar,
        title -> Varchar,
        authors -> Jsonb,
        publication_date -> Varchar,
        institution -> Varchar,
        publication_type -> Varchar,
        description -> Text,
        objectives -> Jsonb,
        dataset -> Varchar,
        metrics -> Jsonb,
        comparison_models -> Jsonb,
        results_summary -> Text,
        highlights -> Jsonb,
        tags -> Jsonb,
        url -> Varchar,
        is_visible -> Bool,
        display_order -> Int4,
        cover_image -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    research_icons (id) {
        id -> Int8,
        key -> Varchar,
        path -> Text,
        title -> Varchar,
    }
}

diesel::table! {
    home_data (id) {
        id -> Int8,
        hero_name -> Varchar,
        hero_tagline -> Varchar,
        hero_bio -> Text,
        hero_profile_image -> Varchar,
        hero_resume_url -> Varchar,
        hero_cta_primary_text -> Varchar,
        hero_cta_primary_url -> Varchar,
        hero_cta_secondary_text -> Varchar,
        hero_cta_secondary_url -> Varchar,
        about_title -> Varchar,
        about_paragraphs -> Jsonb,
        about_highlights -> Jsonb,
        stats_years_of_experience -> Varchar,
        stats_projects_completed -> Int4,
        stats_publications -> Int4,
        stats_technologies_used -> Int4,
        skills_title -> Varchar,
        skills_categories -> Jsonb,
        social_github -> Varchar,
        social_linkedin -> Varchar,
        social_twitter -> Varchar,
        social_email -> Varchar,
        social_scholar -> Varchar,
        cta_title -> Varchar,
        cta_paragraph -> Text,
        cta_primary_text -> Varchar,
        cta_primary_url -> Varchar,
        cta_secondary_text -> Varchar,
        cta_secondary_url -> Varchar,
        show_experience -> Bool,
        show_education -> Bool,
        show_projects -> Bool,
        show_research -> Bool,
        show_blog -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    blogs (id) {
        id -> Int8,
        slug -> Varchar,
        title -> Varchar,
        subtitle -> Varchar,
        excerpt -> Text,
        content_markdown -> Text,
        cover_image -> Varchar,
        featured_image -> Varchar,
        category -> Varchar,
        tags -> Jsonb,
        author -> Varchar,
        published_date -> Nullable<Timestamptz>,
        views -> Int4,
        likes -> Int4,
        comments_count -> Int4,
        shares -> Int4,
        is_published -> Bool,
        is_featured -> Bool,
        is_trending -> Bool,
        is_editor_choice -> Bool,
        allow_comments -> Bool,
        display_order -> Int4,
        read_time -> Int4,
        meta_description -> Text,
        meta_keywords -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    blog_comments (id) {
        id -> Int8,
        blog_id -> Int8,
        author_name -> Varchar,
        author_email -> Varchar,
        comment_text -> Text,
        is_approved -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    blogs_data (id) {
        id -> Int8,
        metadata -> Jsonb,
        blogs -> Jsonb,
        future_topics -> Jsonb,
    }
}

diesel::table! {
    blog_settings (id) {
        id -> Int8,
        duration_update_interval -> Int4,
        inactivity_threshold -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    blog_views (id) {
        id -> Int8,
        blog_id -> Int8,
        fingerprint -> Varchar,
        session_id -> Varchar,
        ip_address -> Nullable<Varchar>,
        user_agent -> Text,
        viewed_at -> Timestamptz,
        viewed_date -> Date,
        last_seen -> Timestamptz,
        duration_seconds -> Int4,
    }
}

diesel::table! {
    blog_likes (id) {
        id -> Int8,
        blog_id -> Int8,
        fingerprint -> Varchar,
        ip_address -> Nullable<Varchar>,
        user_agent -> Text,
        is_active -> Bool,
        liked_at -> Timestamptz,
    }
}

diesel::table! {
    media_files (id) {
        id -> Int8,
        uuid -> Uuid,
        slug -> Varchar,
        file_type -> Varchar,
        original_filename -> Varchar,
        file_path -> Varchar,
        file_size -> Int8,
        mime_type -> Varchar,
        title -> Varchar,
        alt_text -> Varchar,
        is_public -> Bool,
        uploaded_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    newsletter_subscribers (id) {
        id -> Int8,
        email -> Varchar,
        is_active -> Bool,
        subscribed_at -> Timestamptz,
    }
}

diesel::joinable!(blog_comments -> blogs (blog_id));
diesel::joinable!(blog_views -> blogs (blog_id));
diesel::joinable!(blog_likes -> blogs (blog_id));

diesel::allow_tables_to_appear_in_same_query!(
    blogs,
    blog_comments,
    blog_views,
    blog_likes,
);
