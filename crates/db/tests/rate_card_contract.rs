use rust_decimal::Decimal;
use tarifa_core::config::DatabaseConfig;
use tarifa_core::{recommend, FiberTierId, GbAllowance, Language, LeadStatus, LeadSubmission, TariffSelection};
use tarifa_db::{
    connect, migrations, production_rate_card, RateCardSeed, SqlCatalogRepository,
    SqlLeadRepository,
};

async fn seeded_pool() -> tarifa_db::DbPool {
    let pool =
        connect(&DatabaseConfig::single_connection("sqlite::memory:")).await.expect("pool");
    migrations::run_pending(&pool).await.expect("migrations");
    RateCardSeed::load(&pool).await.expect("seed");
    pool
}

#[tokio::test]
async fn seeded_rate_card_round_trips_through_snapshot_validation() {
    let pool = seeded_pool().await;

    let verification = RateCardSeed::verify(&pool).await.expect("verify");
    assert!(verification.all_present, "failed checks: {:?}", verification.checks);

    let snapshot =
        SqlCatalogRepository::new(pool.clone()).load_snapshot().await.expect("snapshot");
    assert_eq!(snapshot, production_rate_card().expect("reference card"));

    pool.close().await;
}

#[tokio::test]
async fn seed_is_idempotent() {
    let pool = seeded_pool().await;
    let result = RateCardSeed::load(&pool).await.expect("reseed");
    assert_eq!(result.fiber_tiers, 7);
    assert_eq!(result.mobile_tiers, 5);
    assert_eq!(result.bundles, 6);
    pool.close().await;
}

#[tokio::test]
async fn recommendation_over_the_persisted_catalog_matches_the_reference_scenario() {
    let pool = seeded_pool().await;
    let snapshot =
        SqlCatalogRepository::new(pool.clone()).load_snapshot().await.expect("snapshot");

    // One unlimited line on 300Mb fiber: the catalog has no unlimited mobile
    // tier, so à la carte uses the 25.00 estimate (baseline 50.90) and the
    // 32.90 unlimited bundle wins.
    let mut selection = TariffSelection::new(FiberTierId("f2".to_owned()));
    selection.add_line(GbAllowance::UNLIMITED);
    let result = recommend(&snapshot, &selection, Language::Ca).expect("recommendation");

    assert_eq!(result.custom_price, Decimal::new(5090, 2));
    assert!(result.is_savings);
    assert_eq!(result.recommended_price, Decimal::new(3290, 2));
    assert_eq!(result.recommended_name, "Paquet Extraordinària");
    assert_eq!(result.savings_amount, Decimal::new(1800, 2));

    pool.close().await;
}

#[tokio::test]
async fn lead_lifecycle_and_fingerprint_dedup() {
    let pool = seeded_pool().await;
    let repository = SqlLeadRepository::new(pool.clone());

    let submission = LeadSubmission {
        name: "Marc P.".to_owned(),
        phone: "977353735".to_owned(),
        email: "marc@example.com".to_owned(),
        address: "Tortosa".to_owned(),
        comments: Some("Truqueu a la tarda".to_owned()),
        summary: vec!["Fibra 300Mb + GB Il·limitats".to_owned()],
        total_price: Decimal::new(3290, 2),
    };
    let lead = tarifa_core::Lead::from_submission(submission.clone()).expect("lead");
    repository.insert(&lead).await.expect("insert");

    let fetched = repository.find_by_id(&lead.id).await.expect("query").expect("present");
    assert_eq!(fetched, lead);

    let duplicate = repository
        .find_by_fingerprint(&submission.fingerprint())
        .await
        .expect("query")
        .expect("dedup hit");
    assert_eq!(duplicate.id, lead.id);

    let updated =
        repository.update_status(&lead.id, LeadStatus::Contacted).await.expect("contacted");
    assert_eq!(updated.status, LeadStatus::Contacted);

    // Closed leads cannot reopen; the domain guard must reject it.
    repository.update_status(&lead.id, LeadStatus::Closed).await.expect("closed");
    let error = repository.update_status(&lead.id, LeadStatus::New).await.expect_err("reopen");
    assert!(matches!(error, tarifa_db::RepositoryError::Invalid(_)));

    let recent = repository.list_recent(10).await.expect("list");
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].status, LeadStatus::Closed);

    pool.close().await;
}
