//! Newsletter subscriptions.

use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::models::newsletter::{NewSubscriber, NewsletterSubscriber};
use crate::schema::newsletter_subscribers;

#[derive(Debug, Clone)]
pub enum SubscribeOutcome {
    Subscribed(NewsletterSubscriber),
    Reactivated(NewsletterSubscriber),
    AlreadySubscribed,
}

/// Lower-case and check an address. `None` when it is not an email.
pub fn normalize_email(raw: &str) -> Option<String> {
    let email = raw.trim().to_lowercase();
    crate::format::is_valid_email(&email).then_some(email)
}

/// Subscribe an already normalized address, re-activating a lapsed one.
pub async fn subscribe(
    conn: &mut AsyncPgConnection,
    email: &str,
) -> anyhow::Result<SubscribeOutcome> {
    let existing = newsletter_subscribers::table
        .filter(newsletter_subscribers::email.eq(email))
        .select(NewsletterSubscriber::as_select())
        .first(conn)
        .await
        .optional()?;

    let outcome = match existing {
        Some(sub) if sub.is_active => SubscribeOutcome::AlreadySubscribed,
        Some(sub) => {
            let sub = diesel::update(newsletter_subscribers::table.find(sub.id))
                .set((
                    newsletter_subscribers::is_active.eq(true),
                    newsletter_subscribers::subscribed_at.eq(chrono::Utc::now()),
                ))
                .returning(NewsletterSubscriber::as_returning())
                .get_result(conn)
                .await?;
            SubscribeOutcome::Reactivated(sub)
        }
        None => {
            let sub = diesel::insert_into(newsletter_subscribers::table)
                .values(&NewSubscriber {
                    email: email.to_string(),
                })
                .returning(NewsletterSubscriber::as_returning())
                .get_result(conn)
                .await?;
            SubscribeOutcome::Subscribed(sub)
        }
    };

    match &outcome {
        SubscribeOutcome::Subscribed(_) => crate::metrics::newsletter_subscribed(false),
        SubscribeOutcome::Reactivated(_) => crate::metrics::newsletter_subscribed(true),
        SubscribeOutcome::AlreadySubscribed => {}
    }
    Ok(outcome)
}

pub async fn list(conn: &mut AsyncPgConnection) -> anyhow::Result<Vec<NewsletterSubscriber>> {
    let results = newsletter_subscribers::table
        .order(newsletter_subscribers::subscribed_at.desc())
        .select(NewsletterSubscriber::as_select())
        .load(conn)
        .await?;
    Ok(results)
}

pub async fn delete(conn: &mut AsyncPgConnection, id: i64) -> anyhow::Result<bool> {
    let deleted = diesel::delete(newsletter_subscribers::table.find(id))
        .execute(conn)
        .await?;
    Ok(deleted > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_lowercased() {
        assert_eq!(
            normalize_email("  Jane.Doe@Example.COM "),
            Some("jane.doe@example.com".to_string())
        );
    }

    #[test]
    fn invalid_emails_are_rejected() {
        assert_eq!(normalize_email("jane"), None);
        assert_eq!(normalize_email(""), None);
    }
}
