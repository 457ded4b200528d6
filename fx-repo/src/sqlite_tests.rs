//! SQLite repository integration tests.

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use fx_types::{
        CurrencyReferenceRow, DateWindow, ProviderCode, RateObservation, RateRepository,
        ReferenceRepository, RepoError, UpsertOutcome,
    };
    use rust_decimal::Decimal;

    use crate::SqliteRepo;

    const EUR: ProviderCode = ProviderCode::new(52170);
    const USD: ProviderCode = ProviderCode::new(52148);

    async fn setup_repo() -> SqliteRepo {
        SqliteRepo::new("sqlite::memory:").await.unwrap()
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn obs(day: u32, rate: i64) -> RateObservation {
        RateObservation::new(d(day), 1, Decimal::new(rate, 4), Decimal::new(-125, 4)).unwrap()
    }

    fn reference(country: &str, name: &str, iso: &str, numeric: Option<i32>) -> CurrencyReferenceRow {
        CurrencyReferenceRow {
            country: country.to_string(),
            currency_name: name.to_string(),
            iso_code: iso.to_string(),
            numeric_code: numeric,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rate store
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_insert_and_get_rate() {
        let repo = setup_repo().await;

        repo.insert_rate(EUR, &obs(1, 991919)).await.unwrap();
        let stored = repo.get_rate(EUR, d(1)).await.unwrap().unwrap();

        assert_eq!(stored.currency_key, EUR);
        assert_eq!(stored.date, d(1));
        assert_eq!(stored.rate, Decimal::new(991919, 4));
        assert_eq!(stored.change, Decimal::new(-125, 4));
        assert_eq!(stored.unit_count, 1);
    }

    #[tokio::test]
    async fn test_get_rate_missing() {
        let repo = setup_repo().await;
        assert!(repo.get_rate(EUR, d(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_insert_rejected() {
        let repo = setup_repo().await;

        repo.insert_rate(EUR, &obs(1, 991919)).await.unwrap();
        let result = repo.insert_rate(EUR, &obs(1, 990000)).await;

        assert!(matches!(result, Err(RepoError::DuplicateKey(_))));
        assert_eq!(repo.list_rates(Some(EUR)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_same_date_different_currencies() {
        let repo = setup_repo().await;

        repo.insert_rate(EUR, &obs(1, 991919)).await.unwrap();
        repo.insert_rate(USD, &obs(1, 896883)).await.unwrap();

        let all = repo.list_rates(None).await.unwrap();
        assert_eq!(all.len(), 2);
        // Same date: ordered by key
        assert_eq!(all[0].currency_key, USD);
        assert_eq!(all[1].currency_key, EUR);
    }

    #[tokio::test]
    async fn test_update_rate() {
        let repo = setup_repo().await;
        repo.insert_rate(EUR, &obs(2, 991919)).await.unwrap();

        let corrected = obs(2, 995000);
        let updated = repo.update_rate(EUR, d(2), &corrected).await.unwrap();
        assert_eq!(updated.rate, Decimal::new(995000, 4));

        let stored = repo.get_rate(EUR, d(2)).await.unwrap().unwrap();
        assert_eq!(stored.rate.to_string(), "99.5");
    }

    #[tokio::test]
    async fn test_update_missing_rate() {
        let repo = setup_repo().await;
        let result = repo.update_rate(EUR, d(2), &obs(2, 995000)).await;
        assert!(matches!(result, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_list_rates_ordered_by_date() {
        let repo = setup_repo().await;

        for day in [3, 1, 2] {
            repo.insert_rate(EUR, &obs(day, 990000 + i64::from(day))).await.unwrap();
        }

        let dates: Vec<_> = repo
            .list_rates(Some(EUR))
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.date)
            .collect();
        assert_eq!(dates, vec![d(1), d(2), d(3)]);
    }

    #[tokio::test]
    async fn test_list_rates_in_window() {
        let repo = setup_repo().await;

        for day in 1..=5 {
            repo.insert_rate(EUR, &obs(day, 990000)).await.unwrap();
        }
        repo.insert_rate(USD, &obs(3, 896883)).await.unwrap();

        let window = DateWindow::new(d(2), d(4)).unwrap();
        let rows = repo.list_rates_in_window(EUR, window).await.unwrap();

        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.currency_key == EUR && window.contains(r.date)));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reference store
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_reference_upsert_outcomes() {
        let repo = setup_repo().await;
        let row = reference("Germany", "Euro", "EUR", Some(978));

        assert_eq!(repo.upsert_reference(&row).await.unwrap(), UpsertOutcome::Inserted);
        assert_eq!(repo.upsert_reference(&row).await.unwrap(), UpsertOutcome::Unchanged);

        let changed = reference("Germany", "Euro", "EUR", None);
        assert_eq!(repo.upsert_reference(&changed).await.unwrap(), UpsertOutcome::Updated);

        let rows = repo.list_references().await.unwrap();
        assert_eq!(rows, vec![changed]);
    }

    #[tokio::test]
    async fn test_reference_country_with_several_currencies() {
        let repo = setup_repo().await;

        repo.upsert_reference(&reference("Zimbabwe", "US Dollar", "USD", Some(840)))
            .await
            .unwrap();
        repo.upsert_reference(&reference("Zimbabwe", "Zimbabwe Gold", "ZWG", Some(924)))
            .await
            .unwrap();
        repo.upsert_reference(&reference("Austria", "Euro", "EUR", Some(978)))
            .await
            .unwrap();

        let rows = repo.list_references().await.unwrap();
        let keys: Vec<_> = rows
            .iter()
            .map(|r| (r.country.as_str(), r.currency_name.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("Austria", "Euro"),
                ("Zimbabwe", "US Dollar"),
                ("Zimbabwe", "Zimbabwe Gold"),
            ]
        );
    }
}
