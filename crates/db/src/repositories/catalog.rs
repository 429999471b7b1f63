use std::str::FromStr;

use rust_decimal::Decimal;
use sqlx::Row;
use tarifa_core::{
    Bundle, BundleId, CatalogSnapshot, FiberTier, FiberTierId, GbAllowance, LocalizedText,
    MobileTier, MobileTierId, Technology,
};

use super::RepositoryError;
use crate::DbPool;

pub struct SqlCatalogRepository {
    pool: DbPool,
}

impl SqlCatalogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Replaces the persisted rate card with the given snapshot in one
    /// transaction. Row order follows the snapshot's display order.
    pub async fn replace_rate_card(
        &self,
        snapshot: &CatalogSnapshot,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM fiber_tier").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM mobile_tier").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM bundle").execute(&mut *tx).await?;

        for (position, tier) in snapshot.fiber_tiers().iter().enumerate() {
            sqlx::query(
                "INSERT INTO fiber_tier (id, speed_mb, technology, price, name, description_ca, description_es, position) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )
            .bind(&tier.id.0)
            .bind(i64::from(tier.speed_mb))
            .bind(technology_code(tier.technology))
            .bind(tier.price.to_string())
            .bind(&tier.name)
            .bind(tier.description.as_ref().map(|text| text.ca.clone()))
            .bind(tier.description.as_ref().map(|text| text.es.clone()))
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }

        for (position, tier) in snapshot.mobile_tiers().iter().enumerate() {
            sqlx::query(
                "INSERT INTO mobile_tier (id, gb, price, name, position) VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(&tier.id.0)
            .bind(tier.gb.raw())
            .bind(tier.price.to_string())
            .bind(&tier.name)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }

        for (position, bundle) in snapshot.bundles().iter().enumerate() {
            sqlx::query(
                "INSERT INTO bundle (id, name_ca, name_es, speed_mb, mobile_lines, mobile_gb_per_line, has_landline, price, description_ca, description_es, position) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )
            .bind(&bundle.id.0)
            .bind(&bundle.name.ca)
            .bind(&bundle.name.es)
            .bind(i64::from(bundle.speed_mb))
            .bind(i64::from(bundle.mobile_lines))
            .bind(bundle.mobile_gb_per_line.raw())
            .bind(bundle.has_landline)
            .bind(bundle.price.to_string())
            .bind(&bundle.description.ca)
            .bind(&bundle.description.es)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Loads the persisted rate card as a validated snapshot. Malformed rows
    /// fail the load instead of producing a partially usable catalog.
    pub async fn load_snapshot(&self) -> Result<CatalogSnapshot, RepositoryError> {
        let fiber_rows = sqlx::query(
            "SELECT id, speed_mb, technology, price, name, description_ca, description_es \
             FROM fiber_tier ORDER BY position",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut fiber_tiers = Vec::with_capacity(fiber_rows.len());
        for row in fiber_rows {
            let id: String = row.get("id");
            let description = optional_localized(
                row.get("description_ca"),
                row.get("description_es"),
                &id,
            )?;
            fiber_tiers.push(FiberTier {
                speed_mb: decode_u32(row.get::<i64, _>("speed_mb"), "speed_mb", &id)?,
                technology: decode_technology(&row.get::<String, _>("technology"), &id)?,
                price: decode_price(&row.get::<String, _>("price"), &id)?,
                name: row.get("name"),
                description,
                id: FiberTierId(id),
            });
        }

        let mobile_rows =
            sqlx::query("SELECT id, gb, price, name FROM mobile_tier ORDER BY position")
                .fetch_all(&self.pool)
                .await?;

        let mut mobile_tiers = Vec::with_capacity(mobile_rows.len());
        for row in mobile_rows {
            let id: String = row.get("id");
            mobile_tiers.push(MobileTier {
                gb: GbAllowance::new(row.get::<i64, _>("gb"))?,
                price: decode_price(&row.get::<String, _>("price"), &id)?,
                name: row.get("name"),
                id: MobileTierId(id),
            });
        }

        let bundle_rows = sqlx::query(
            "SELECT id, name_ca, name_es, speed_mb, mobile_lines, mobile_gb_per_line, has_landline, price, description_ca, description_es \
             FROM bundle ORDER BY position",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut bundles = Vec::with_capacity(bundle_rows.len());
        for row in bundle_rows {
            let id: String = row.get("id");
            bundles.push(Bundle {
                name: LocalizedText::new(
                    row.get::<String, _>("name_ca"),
                    row.get::<String, _>("name_es"),
                )?,
                speed_mb: decode_u32(row.get::<i64, _>("speed_mb"), "speed_mb", &id)?,
                mobile_lines: decode_u32(row.get::<i64, _>("mobile_lines"), "mobile_lines", &id)?,
                mobile_gb_per_line: GbAllowance::new(row.get::<i64, _>("mobile_gb_per_line"))?,
                has_landline: row.get("has_landline"),
                price: decode_price(&row.get::<String, _>("price"), &id)?,
                description: LocalizedText::new(
                    row.get::<String, _>("description_ca"),
                    row.get::<String, _>("description_es"),
                )?,
                id: BundleId(id),
            });
        }

        Ok(CatalogSnapshot::new(fiber_tiers, mobile_tiers, bundles)?)
    }
}

fn technology_code(technology: Technology) -> &'static str {
    match technology {
        Technology::Fiber => "FIBER",
        Technology::Radio => "RADIO",
    }
}

fn decode_technology(raw: &str, id: &str) -> Result<Technology, RepositoryError> {
    match raw {
        "FIBER" => Ok(Technology::Fiber),
        "RADIO" => Ok(Technology::Radio),
        other => Err(RepositoryError::Decode(format!(
            "fiber tier {id} has unknown technology `{other}`"
        ))),
    }
}

fn decode_price(raw: &str, id: &str) -> Result<Decimal, RepositoryError> {
    Decimal::from_str(raw)
        .map_err(|error| RepositoryError::Decode(format!("bad price for {id}: {error}")))
}

fn decode_u32(raw: i64, column: &str, id: &str) -> Result<u32, RepositoryError> {
    u32::try_from(raw)
        .map_err(|_| RepositoryError::Decode(format!("bad {column} for {id}: {raw}")))
}

fn optional_localized(
    ca: Option<String>,
    es: Option<String>,
    id: &str,
) -> Result<Option<LocalizedText>, RepositoryError> {
    match (ca, es) {
        (None, None) => Ok(None),
        (Some(ca), Some(es)) => Ok(Some(LocalizedText::new(ca, es)?)),
        _ => Err(RepositoryError::Decode(format!(
            "fiber tier {id} has a partially localized description"
        ))),
    }
}
