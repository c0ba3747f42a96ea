//! In-app notification sink.
//!
//! Notifications are fire-and-forget rows created after a workflow
//! transition commits; a failed insert is logged and never surfaces to the
//! operation that triggered it.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::db::entities::{notification, user, user::UserRole};

pub async fn notify(
    db: &DatabaseConnection,
    user_id: Uuid,
    kind: &str,
    title: &str,
    message: &str,
    link: Option<String>,
) {
    let row = notification::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        kind: Set(kind.to_string()),
        title: Set(title.to_string()),
        message: Set(message.to_string()),
        link: Set(link),
        is_read: Set(false),
        created_at: Set(Utc::now().into()),
    };

    if let Err(e) = row.insert(db).await {
        tracing::error!("Failed to create notification for {}: {}", user_id, e);
    }
}

/// Notify every user. Used for news.
pub async fn broadcast(
    db: &DatabaseConnection,
    kind: &str,
    title: &str,
    message: &str,
    link: Option<String>,
) {
    let users = match user::Entity::find().all(db).await {
        Ok(users) => users,
        Err(e) => {
            tracing::error!("Broadcast notification query failed: {}", e);
            return;
        }
    };

    for u in users {
        notify(db, u.id, kind, title, message, link.clone()).await;
    }
}

pub async fn notify_admins(
    db: &DatabaseConnection,
    kind: &str,
    title: &str,
    message: &str,
    link: Option<String>,
) {
    let admins = match user::Entity::find()
        .filter(user::Column::Role.eq(UserRole::Admin))
        .all(db)
        .await
    {
        Ok(admins) => admins,
        Err(e) => {
            tracing::error!("Admin notification query failed: {}", e);
            return;
        }
    };

    for admin in admins {
        notify(db, admin.id, kind, title, message, link.clone()).await;
    }
}
