use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tarifa_core::{Lead, LeadId, LeadStatus};
use uuid::Uuid;

use super::RepositoryError;
use crate::DbPool;

pub struct SqlLeadRepository {
    pool: DbPool,
}

impl SqlLeadRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, lead: &Lead) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO lead (id, created_at, status, fingerprint, name, phone, email, address, comments, summary, total_price) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(lead.id.0.to_string())
        .bind(lead.created_at.to_rfc3339())
        .bind(status_code(lead.status))
        .bind(&lead.fingerprint)
        .bind(&lead.name)
        .bind(&lead.phone)
        .bind(&lead.email)
        .bind(&lead.address)
        .bind(&lead.comments)
        .bind(serde_json::to_string(&lead.summary).map_err(|error| {
            RepositoryError::Decode(format!("could not encode lead summary: {error}"))
        })?)
        .bind(lead.total_price.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &LeadId) -> Result<Option<Lead>, RepositoryError> {
        let row = sqlx::query(SELECT_LEAD_WHERE_ID)
            .bind(id.0.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(decode_lead).transpose()
    }

    /// Most recent lead sharing the contact fingerprint, used to spot repeat
    /// submissions before inserting.
    pub async fn find_by_fingerprint(
        &self,
        fingerprint: &str,
    ) -> Result<Option<Lead>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, created_at, status, fingerprint, name, phone, email, address, comments, summary, total_price \
             FROM lead WHERE fingerprint = ?1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(fingerprint)
        .fetch_optional(&self.pool)
        .await?;
        row.map(decode_lead).transpose()
    }

    pub async fn list_recent(&self, limit: u32) -> Result<Vec<Lead>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, created_at, status, fingerprint, name, phone, email, address, comments, summary, total_price \
             FROM lead ORDER BY created_at DESC LIMIT ?1",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(decode_lead).collect()
    }

    /// Applies a status transition through the domain guard and persists it.
    pub async fn update_status(
        &self,
        id: &LeadId,
        next: LeadStatus,
    ) -> Result<Lead, RepositoryError> {
        let mut lead = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::Decode(format!("lead {} not found", id.0)))?;
        lead.transition_to(next)?;

        sqlx::query("UPDATE lead SET status = ?1 WHERE id = ?2")
            .bind(status_code(lead.status))
            .bind(id.0.to_string())
            .execute(&self.pool)
            .await?;
        Ok(lead)
    }
}

const SELECT_LEAD_WHERE_ID: &str =
    "SELECT id, created_at, status, fingerprint, name, phone, email, address, comments, summary, total_price \
     FROM lead WHERE id = ?1";

fn status_code(status: LeadStatus) -> &'static str {
    match status {
        LeadStatus::New => "NEW",
        LeadStatus::Contacted => "CONTACTED",
        LeadStatus::Closed => "CLOSED",
    }
}

fn decode_status(raw: &str) -> Result<LeadStatus, RepositoryError> {
    match raw {
        "NEW" => Ok(LeadStatus::New),
        "CONTACTED" => Ok(LeadStatus::Contacted),
        "CLOSED" => Ok(LeadStatus::Closed),
        other => Err(RepositoryError::Decode(format!("unknown lead status `{other}`"))),
    }
}

fn decode_lead(row: SqliteRow) -> Result<Lead, RepositoryError> {
    let id: String = row.get("id");
    let uuid = Uuid::parse_str(&id)
        .map_err(|error| RepositoryError::Decode(format!("bad lead id `{id}`: {error}")))?;
    let created_at: String = row.get("created_at");
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|error| RepositoryError::Decode(format!("bad lead timestamp: {error}")))?
        .with_timezone(&Utc);
    let summary: String = row.get("summary");
    let summary: Vec<String> = serde_json::from_str(&summary)
        .map_err(|error| RepositoryError::Decode(format!("bad lead summary: {error}")))?;
    let total_price: String = row.get("total_price");
    let total_price = Decimal::from_str(&total_price)
        .map_err(|error| RepositoryError::Decode(format!("bad lead price: {error}")))?;

    Ok(Lead {
        id: LeadId(uuid),
        created_at,
        status: decode_status(&row.get::<String, _>("status"))?,
        fingerprint: row.get("fingerprint"),
        name: row.get("name"),
        phone: row.get("phone"),
        email: row.get("email"),
        address: row.get("address"),
        comments: row.get("comments"),
        summary,
        total_price,
    })
}
