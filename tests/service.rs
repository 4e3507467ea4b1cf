mod common;

use anyhow::Result;
use rbi_ifsc::{Error, Index, IndexState};
use std::sync::Arc;
use std::sync::Mutex;

#[tokio::test]
async fn test_list_banks_in_index_order() -> Result<()> {
    let upstream = common::rbi_fixture().serve().await?;
    let dir = common::setup_temp_dir()?;
    let service = common::service(dir.path(), &upstream.listing_url());

    let banks = service.list_banks().await?;
    assert_eq!(
        banks,
        vec!["State Bank of India", "HDFC Bank", "State Bank of Travancore"]
    );

    // Same answer again, without another trip to the listing page
    assert_eq!(service.list_banks().await?, banks);
    assert_eq!(upstream.hits("/listing"), 1);
    Ok(())
}

#[tokio::test]
async fn test_build_skips_unusable_files() -> Result<()> {
    let upstream = common::rbi_fixture().serve().await?;
    let dir = common::setup_temp_dir()?;
    let service = common::service(dir.path(), &upstream.listing_url());

    let index = service.index().await?;
    assert_eq!(index.files_indexed, 3);

    let skipped: Vec<&str> = index.skipped_files.iter().map(|s| s.url.as_str()).collect();
    assert_eq!(
        skipped,
        vec![
            upstream.url("/files/broken.xls"),
            upstream.url("/files/missing.xlsx"),
        ]
    );

    // The duplicate link was fetched once
    assert_eq!(upstream.hits("/files/sbi.xlsx"), 1);
    Ok(())
}

#[tokio::test]
async fn test_rows_for_bank_is_case_insensitive() -> Result<()> {
    let upstream = common::rbi_fixture().serve().await?;
    let dir = common::setup_temp_dir()?;
    let service = common::service(dir.path(), &upstream.listing_url());

    let rows = service.rows_for_bank("state bank of india").await?;
    let codes: Vec<&str> = rows.iter().map(|r| r.ifsc.as_str()).collect();
    assert_eq!(codes, vec!["SBIN0000001", "SBIN0000002"]);
    assert_eq!(rows[1].city2, "Chennai");
    let fetched = upstream.hits("/files/sbi.xlsx");

    let again = service.rows_for_bank("  STATE   BANK OF INDIA ").await?;
    assert_eq!(again, rows);
    // Second query served from the sheet cache
    assert_eq!(upstream.hits("/files/sbi.xlsx"), fetched);
    Ok(())
}

#[tokio::test]
async fn test_rows_for_unknown_or_blank_bank() -> Result<()> {
    let upstream = common::rbi_fixture().serve().await?;
    let dir = common::setup_temp_dir()?;
    let service = common::service(dir.path(), &upstream.listing_url());

    let err = service.rows_for_bank("UNKNOWN BANK XYZ").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)), "{:?}", err);

    let err = service.rows_for_bank("   ").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)), "{:?}", err);
    Ok(())
}

#[tokio::test]
async fn test_row_for_ifsc() -> Result<()> {
    let upstream = common::rbi_fixture().serve().await?;
    let dir = common::setup_temp_dir()?;
    let service = common::service(dir.path(), &upstream.listing_url());

    let row = service.row_for_ifsc("SBIN0000001").await?;
    assert_eq!(row.bank, "State Bank of India");
    assert_eq!(row.branch, "Kolkata Main");
    assert_eq!(row.std_code, "33");

    let row = service.row_for_ifsc(" hdfc0000001 ").await?;
    assert_eq!(row.bank, "HDFC Bank");
    assert_eq!(row.city1, "Mumbai");
    assert_eq!(row.phone, "61606161");

    // SBTR is only in the later file
    let row = service.row_for_ifsc("SBTR0000001").await?;
    assert_eq!(row.branch, "Thiruvananthapuram");
    Ok(())
}

#[tokio::test]
async fn test_row_for_ifsc_errors() -> Result<()> {
    let upstream = common::rbi_fixture().serve().await?;
    let dir = common::setup_temp_dir()?;
    let service = common::service(dir.path(), &upstream.listing_url());

    let err = service.row_for_ifsc("SBIN000123").await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)), "{:?}", err);
    // Rejected before the index was touched
    assert_eq!(upstream.hits("/listing"), 0);

    let err = service.row_for_ifsc("SBIN0999999").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)), "{:?}", err);

    let err = service.row_for_ifsc("ZZZZ0000001").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)), "{:?}", err);

    // SBIN belongs to the first file that listed it; the later copy is ignored
    let err = service.row_for_ifsc("SBIN0009999").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)), "{:?}", err);
    Ok(())
}

#[tokio::test]
async fn test_concurrent_first_access_builds_once() -> Result<()> {
    let upstream = common::rbi_fixture().serve().await?;
    let dir = common::setup_temp_dir()?;
    let service = Arc::new(common::service(dir.path(), &upstream.listing_url()));

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..8 {
        let service = Arc::clone(&service);
        tasks.spawn(async move { service.list_banks().await });
    }

    let mut results = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        results.push(joined??);
    }

    assert_eq!(results.len(), 8);
    assert!(results.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(upstream.hits("/listing"), 1);
    assert_eq!(upstream.hits("/files/hdfc.xlsx"), 1);
    assert!(matches!(service.state(), IndexState::Ready(_)));
    Ok(())
}

#[tokio::test]
async fn test_persisted_index_survives_restart() -> Result<()> {
    let upstream = common::rbi_fixture().serve().await?;
    let dir = common::setup_temp_dir()?;

    let first = common::service(dir.path(), &upstream.listing_url());
    let built = first.index().await?;
    let path = dir.path().join("in_banks.json");
    assert!(path.exists());
    assert!(Index::load(&path)?.is_equivalent(&built));
    drop(upstream);

    // Listing unreachable now; the persisted index is enough to list banks
    let second = common::service(dir.path(), "http://127.0.0.1:9/listing");
    let banks = second.list_banks().await?;
    assert_eq!(banks, built.bank_names());

    // Sheets still have to be fetched, so lookups degrade to Unavailable
    let err = second.row_for_ifsc("SBIN0000001").await.unwrap_err();
    assert!(matches!(err, Error::Unavailable(_)), "{:?}", err);
    Ok(())
}

#[tokio::test]
async fn test_rebuild_is_equivalent_for_same_source() -> Result<()> {
    let upstream = common::rbi_fixture().serve().await?;
    let dir = common::setup_temp_dir()?;
    let service = common::service(dir.path(), &upstream.listing_url());

    let first = service.index().await?;
    service.row_for_ifsc("SBIN0000001").await?;
    assert_eq!(service.status().cached_sheets, 1);

    let second = service.rebuild().await?;
    assert!(first.is_equivalent(&second));
    assert_eq!(upstream.hits("/listing"), 2);
    assert_eq!(service.status().cached_sheets, 0);
    Ok(())
}

#[tokio::test]
async fn test_stale_index_is_rebuilt() -> Result<()> {
    let upstream = common::rbi_fixture().serve().await?;
    let dir = common::setup_temp_dir()?;
    let path = dir.path().join("in_banks.json");

    let mut old = Index::new(upstream.listing_url());
    old.built_at = chrono::Utc::now() - chrono::Duration::days(30);
    old.save(&path)?;

    let mut config = common::service_config(dir.path(), &upstream.listing_url());
    config.index_max_age = Some(std::time::Duration::from_secs(7 * 86_400));
    let service = rbi_ifsc::QueryService::new(config)?;

    let banks = service.list_banks().await?;
    assert_eq!(banks.len(), 3);
    assert_eq!(upstream.hits("/listing"), 1);
    Ok(())
}

#[tokio::test]
async fn test_no_usable_files_is_build_error() -> Result<()> {
    let listing = r#"<a href="/files/a.xls">A</a><a href="/files/b.xlsx">B</a>"#;
    let upstream = common::Fixture::new(listing)
        .file("a.xls", b"garbage".to_vec())
        .file("b.xlsx", common::workbook(&[&["BANK", "BRANCH"], &["X", "Y"]]))
        .serve()
        .await?;
    let dir = common::setup_temp_dir()?;
    let service = common::service(dir.path(), &upstream.listing_url());

    let err = service.list_banks().await.unwrap_err();
    assert!(matches!(err, Error::Build(_)), "{:?}", err);
    assert!(matches!(service.state(), IndexState::Uninitialized));
    assert!(!dir.path().join("in_banks.json").exists());
    Ok(())
}

#[tokio::test]
async fn test_listing_without_links_is_build_error() -> Result<()> {
    let upstream = common::Fixture::new("<p>Nothing to see</p>").serve().await?;
    let dir = common::setup_temp_dir()?;
    let service = common::service(dir.path(), &upstream.listing_url());

    let err = service.index().await.unwrap_err();
    assert!(matches!(err, Error::Build(_)), "{:?}", err);
    Ok(())
}

#[tokio::test]
async fn test_build_reports_progress_per_link() -> Result<()> {
    let upstream = common::rbi_fixture().serve().await?;
    let dir = common::setup_temp_dir()?;
    let service = common::service(dir.path(), &upstream.listing_url());

    let seen = Mutex::new(Vec::new());
    let report = |current: usize, total: usize, link: &rbi_ifsc::SourceLink| {
        seen.lock().unwrap().push((current, total, link.title.clone()));
    };
    service.index_with_progress(Some(&report)).await?;

    let seen = seen.into_inner().unwrap();
    // Every spreadsheet link, duplicates included
    assert_eq!(seen.len(), 6);
    assert!(seen.iter().all(|(_, total, _)| *total == 6));
    assert_eq!(seen[0], (1, 6, "State Bank of India".to_string()));
    assert_eq!(seen[5].0, 6);

    // Already loaded: no second build, no progress
    let calls = Mutex::new(0usize);
    let count = |_: usize, _: usize, _: &rbi_ifsc::SourceLink| *calls.lock().unwrap() += 1;
    service.index_with_progress(Some(&count)).await?;
    assert_eq!(*calls.lock().unwrap(), 0);
    Ok(())
}
