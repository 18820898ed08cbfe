//! Newsletter subscriptions.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::newsletter_subscribers;

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = newsletter_subscribers)]
pub struct NewsletterSubscriber {
    pub id: i64,
    pub email: String,
    pub is_active: bool,
    pub subscribed_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = newsletter_subscribers)]
pub struct NewSubscriber {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    #[serde(default)]
    pub email: String,
}
