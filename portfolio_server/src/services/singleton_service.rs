//! Single-row tables: home page, blog landing data and tracking settings.
//!
//! Each lives at id 1 and is written with an upsert.

use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::models::home::{HomeData, HomeInput, HOME_ID};
use crate::models::settings::{
    BlogSettings, BlogsData, BlogsDataInput, TrackingSettings, BLOGS_DATA_ID, SETTINGS_ID,
};
use crate::schema::{blog_settings, blogs_data, home_data};

pub async fn get_home(conn: &mut AsyncPgConnection) -> anyhow::Result<Option<HomeData>> {
    let result = home_data::table
        .find(HOME_ID)
        .select(HomeData::as_select())
        .first(conn)
        .await
        .optional()?;
    Ok(result)
}

pub async fn save_home(
    conn: &mut AsyncPgConnection,
    mut input: HomeInput,
) -> anyhow::Result<HomeData> {
    input.id = HOME_ID;
    let result = diesel::insert_into(home_data::table)
        .values(&input)
        .on_conflict(home_data::id)
        .do_update()
        .set((&input, home_data::updated_at.eq(chrono::Utc::now())))
        .returning(HomeData::as_returning())
        .get_result(conn)
        .await?;
    tracing::info!("Home data saved");
    Ok(result)
}

pub async fn get_blogs_data(conn: &mut AsyncPgConnection) -> anyhow::Result<Option<BlogsData>> {
    let result = blogs_data::table
        .find(BLOGS_DATA_ID)
        .select(BlogsData::as_select())
        .first(conn)
        .await
        .optional()?;
    Ok(result)
}

pub async fn save_blogs_data(
    conn: &mut AsyncPgConnection,
    input: &BlogsDataInput,
) -> anyhow::Result<BlogsData> {
    let result = diesel::insert_into(blogs_data::table)
        .values((blogs_data::id.eq(BLOGS_DATA_ID), input))
        .on_conflict(blogs_data::id)
        .do_update()
        .set(input)
        .returning(BlogsData::as_returning())
        .get_result(conn)
        .await?;
    tracing::info!("Blogs data saved");
    Ok(result)
}

/// Current tracking settings, or the defaults when none are stored.
pub async fn get_settings(conn: &mut AsyncPgConnection) -> anyhow::Result<TrackingSettings> {
    let stored = blog_settings::table
        .find(SETTINGS_ID)
        .select(BlogSettings::as_select())
        .first(conn)
        .await
        .optional()?;
    Ok(stored.map(TrackingSettings::from).unwrap_or_default())
}

pub async fn save_settings(
    conn: &mut AsyncPgConnection,
    settings: &TrackingSettings,
) -> anyhow::Result<BlogSettings> {
    let result = diesel::insert_into(blog_settings::table)
        .values((blog_settings::id.eq(SETTINGS_ID), settings))
        .on_conflict(blog_settings::id)
        .do_update()
        .set((settings, blog_settings::updated_at.eq(chrono::Utc::now())))
        .returning(BlogSettings::as_returning())
        .get_result(conn)
        .await?;
    tracing::info!(
        duration_update_interval = result.duration_update_interval,
        inactivity_threshold = result.inactivity_threshold,
        "Blog settings saved"
    );
    Ok(result)
}
