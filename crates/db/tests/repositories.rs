use assert_matches::assert_matches;
use remat_core::bin::BinStatus;
use remat_db::models::bin::CreateBin;
use remat_db::models::user::CreateUser;
use remat_db::repositories::{BinRepo, TransactionRepo, UserRepo};
use sqlx::PgPool;

fn new_bin(name: &str, capacity: i32) -> CreateBin {
    CreateBin {
        name: name.to_string(),
        latitude: None,
        longitude: None,
        capacity,
        fill_level: None,
        status: None,
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn health_check_succeeds(pool: PgPool) {
    remat_db::health_check(&pool).await.unwrap();
}

// ---------------------------------------------------------------------------
// Bins
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn bin_defaults_to_empty_and_active(pool: PgPool) {
    let bin = BinRepo::create(&pool, &new_bin("Library", 50)).await.unwrap();
    assert_eq!(bin.fill_level, 0);
    assert_eq!(bin.parsed_status(), BinStatus::Active);

    let found = BinRepo::find_by_id(&pool, bin.id).await.unwrap().unwrap();
    assert_eq!(found.name, "Library");
    assert!(BinRepo::find_by_id(&pool, bin.id + 1000).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn bins_list_by_name(pool: PgPool) {
    BinRepo::create(&pool, &new_bin("Zeta", 10)).await.unwrap();
    BinRepo::create(&pool, &new_bin("Alpha", 10)).await.unwrap();

    let names: Vec<String> = BinRepo::list(&pool)
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.name)
        .collect();
    assert_eq!(names, vec!["Alpha", "Zeta"]);
}

#[sqlx::test(migrations = "./migrations")]
async fn check_constraints_reject_bad_bins(pool: PgPool) {
    let err = BinRepo::create(&pool, &new_bin("Broken", 0)).await.unwrap_err();
    assert_matches!(err, sqlx::Error::Database(ref db)
        if db.constraint() == Some("ck_bins_capacity_positive"));

    let mut overfull = new_bin("Overfull", 10);
    overfull.fill_level = Some(11);
    let err = BinRepo::create(&pool, &overfull).await.unwrap_err();
    assert_matches!(err, sqlx::Error::Database(ref db)
        if db.constraint() == Some("ck_bins_fill_level_range"));
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn duplicate_email_violates_unique_constraint(pool: PgPool) {
    let input = CreateUser {
        name: "Asha".to_string(),
        email: "asha@example.com".to_string(),
    };
    let user = UserRepo::create(&pool, &input).await.unwrap();
    assert_eq!(user.points, 0);

    let err = UserRepo::create(&pool, &input).await.unwrap_err();
    assert_matches!(err, sqlx::Error::Database(ref db)
        if db.constraint() == Some("uq_users_email"));
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn ledger_is_empty_for_new_records(pool: PgPool) {
    let bin = BinRepo::create(&pool, &new_bin("Quiet", 10)).await.unwrap();
    let user = UserRepo::create(
        &pool,
        &CreateUser {
            name: "Ravi".to_string(),
            email: "ravi@example.com".to_string(),
        },
    )
    .await
    .unwrap();

    assert!(TransactionRepo::list_by_bin(&pool, bin.id, 50).await.unwrap().is_empty());
    assert!(TransactionRepo::list_by_user(&pool, user.id, 0).await.unwrap().is_empty());
    assert_eq!(TransactionRepo::count_by_bin(&pool, bin.id).await.unwrap(), 0);
}
