use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::{AdminUser, CurrentUser},
    db::entities::{
        financial_report, payout_request,
        payout_request::{PayoutMethod, PayoutStatus},
        user,
    },
    error::{AppError, Result},
    services::{notifier, AssetKind},
    state::AppState,
};

#[derive(Deserialize)]
pub struct CreateReportRequest {
    pub artist_id: Uuid,
    pub quarter: String,
    pub title: String,
    pub amount: i64,
    /// base64 data-URI of the report document
    pub file_data: Option<String>,
    pub link_url: Option<String>,
}

#[derive(Deserialize)]
pub struct PayoutRequestBody {
    pub amount: i64,
    pub method: PayoutMethod,
    pub details: String,
}

#[derive(Serialize)]
pub struct PayoutResponse {
    pub id: Uuid,
    pub amount: i64,
    pub method: PayoutMethod,
    pub status: PayoutStatus,
    pub created_at: String,
}

impl From<payout_request::Model> for PayoutResponse {
    fn from(p: payout_request::Model) -> Self {
        Self {
            id: p.id,
            amount: p.amount,
            method: p.method,
            status: p.status,
            created_at: p.created_at.to_string(),
        }
    }
}

#[derive(Serialize)]
pub struct PayoutWithUserResponse {
    #[serde(flatten)]
    pub payout: PayoutResponse,
    pub user_name: String,
    pub user_email: String,
}

/// Create a financial report and credit the artist's balance. The report
/// row and the increment commit in one transaction: a report's existence
/// implies the credit happened exactly once.
pub async fn create_report(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(payload): Json<CreateReportRequest>,
) -> Result<Json<financial_report::Model>> {
    if payload.amount < 0 {
        return Err(AppError::validation("amount", "must not be negative"));
    }
    if payload.quarter.trim().is_empty() {
        return Err(AppError::validation("quarter", "must not be empty"));
    }
    if payload.title.trim().is_empty() {
        return Err(AppError::validation("title", "must not be empty"));
    }

    let artist = user::Entity::find_by_id(payload.artist_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Artist not found".to_string()))?;

    let file_url = match &payload.file_data {
        Some(data) if data.starts_with("data:") => {
            Some(state.storage.store_data_uri(AssetKind::FinanceDoc, data).await?)
        }
        _ => None,
    };

    let txn = state.db.begin().await?;

    let report = financial_report::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(artist.id),
        quarter: Set(payload.quarter),
        title: Set(payload.title.clone()),
        amount: Set(payload.amount),
        file_url: Set(file_url),
        link_url: Set(payload.link_url),
        created_at: Set(Utc::now().into()),
    }
    .insert(&txn)
    .await?;

    user::Entity::update_many()
        .col_expr(
            user::Column::Balance,
            Expr::col(user::Column::Balance).add(payload.amount),
        )
        .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(user::Column::Id.eq(artist.id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    notifier::notify(
        &state.db,
        artist.id,
        "FINANCE",
        "New financial report",
        &format!(
            "A new financial report is available: {}. Amount: {}",
            payload.title, payload.amount
        ),
        Some("/finance".to_string()),
    )
    .await;

    Ok(Json(report))
}

pub async fn list_my_reports(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<financial_report::Model>>> {
    let reports = financial_report::Entity::find()
        .filter(financial_report::Column::UserId.eq(user.id))
        .order_by_desc(financial_report::Column::CreatedAt)
        .all(&state.db)
        .await?;
    Ok(Json(reports))
}

pub async fn list_all_reports(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<financial_report::Model>>> {
    let reports = financial_report::Entity::find()
        .order_by_desc(financial_report::Column::CreatedAt)
        .all(&state.db)
        .await?;
    Ok(Json(reports))
}

/// Open a payout request. The balance check and the decrement are a single
/// conditional update so two concurrent requests cannot both spend the same
/// funds.
pub async fn request_payout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<PayoutRequestBody>,
) -> Result<Json<PayoutResponse>> {
    if payload.amount < 1 {
        return Err(AppError::validation("amount", "must be at least 1"));
    }
    if payload.details.trim().is_empty() {
        return Err(AppError::validation("details", "must not be empty"));
    }

    let txn = state.db.begin().await?;

    let debit = user::Entity::update_many()
        .col_expr(
            user::Column::Balance,
            Expr::col(user::Column::Balance).sub(payload.amount),
        )
        .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(user::Column::Id.eq(user.id))
        .filter(user::Column::Balance.gte(payload.amount))
        .exec(&txn)
        .await?;

    if debit.rows_affected == 0 {
        txn.rollback().await?;
        return Err(AppError::InsufficientFunds);
    }

    let now = Utc::now();
    let payout = payout_request::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.id),
        amount: Set(payload.amount),
        method: Set(payload.method),
        details: Set(payload.details),
        status: Set(PayoutStatus::Pending),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    Ok(Json(payout.into()))
}

pub async fn list_my_payouts(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<PayoutResponse>>> {
    let payouts = payout_request::Entity::find()
        .filter(payout_request::Column::UserId.eq(user.id))
        .order_by_desc(payout_request::Column::CreatedAt)
        .all(&state.db)
        .await?;
    Ok(Json(payouts.into_iter().map(Into::into).collect()))
}

pub async fn list_pending_payouts(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<PayoutWithUserResponse>>> {
    payouts_with_users(&state, Some(PayoutStatus::Pending)).await
}

pub async fn list_all_payouts(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<PayoutWithUserResponse>>> {
    payouts_with_users(&state, None).await
}

async fn payouts_with_users(
    state: &AppState,
    status: Option<PayoutStatus>,
) -> Result<Json<Vec<PayoutWithUserResponse>>> {
    let mut select = payout_request::Entity::find();
    if let Some(status) = status {
        select = select.filter(payout_request::Column::Status.eq(status));
    }

    let payouts = select
        .order_by_desc(payout_request::Column::CreatedAt)
        .find_also_related(user::Entity)
        .all(&state.db)
        .await?;

    Ok(Json(
        payouts
            .into_iter()
            .filter_map(|(p, u)| {
                u.map(|u| PayoutWithUserResponse {
                    payout: p.into(),
                    user_name: u.name,
                    user_email: u.email,
                })
            })
            .collect(),
    ))
}

/// Mark a payout as paid. The money already moved when the request was
/// created; this only flips the status, and only once.
pub async fn approve_payout(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<PayoutResponse>> {
    let payout = payout_request::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Payout request not found".to_string()))?;

    let update = payout_request::Entity::update_many()
        .col_expr(payout_request::Column::Status, Expr::value(PayoutStatus::Paid))
        .col_expr(payout_request::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(payout_request::Column::Id.eq(id))
        .filter(payout_request::Column::Status.eq(PayoutStatus::Pending))
        .exec(&state.db)
        .await?;

    if update.rows_affected == 0 {
        return Err(AppError::Conflict("Payout has already been processed".to_string()));
    }

    if let Some(owner) = user::Entity::find_by_id(payout.user_id).one(&state.db).await? {
        notifier::notify(
            &state.db,
            owner.id,
            "FINANCE",
            "Payout processed",
            &format!("Your payout request for {} has been processed.", payout.amount),
            Some("/finance".to_string()),
        )
        .await;

        state
            .mailer
            .send_payout_paid(&owner.email, &owner.name, payout.amount)
            .await;
    }

    Ok(Json(PayoutResponse {
        id: payout.id,
        amount: payout.amount,
        method: payout.method,
        status: PayoutStatus::Paid,
        created_at: payout.created_at.to_string(),
    }))
}
