// Integration tests for end-to-end workflows and critical user scenarios

#[cfg(test)]
mod integration_tests {
    use crate::aggregation::RecordSet;
    use crate::dataset::Dataset;
    use crate::funding_record::{FundingRecord, RecordField};
    use crate::selection::MonthlyMetric;
    use crate::views::{investor_view, overall_view, startup_view, OverallParams, ViewError};
    use chrono::NaiveDate;

    fn three_record_market() -> Vec<FundingRecord> {
        vec![
            FundingRecord::new(
                NaiveDate::from_ymd_opt(2020, 2, 1),
                "X",
                "Fintech",
                "Mumbai",
                "Sequoia",
                "Seed",
                Some(10.0),
            ),
            FundingRecord::new(
                NaiveDate::from_ymd_opt(2021, 5, 1),
                "X",
                "Fintech",
                "Mumbai",
                "Accel",
                "SeriesA",
                Some(5.0),
            ),
            FundingRecord::new(
                NaiveDate::from_ymd_opt(2020, 8, 1),
                "Y",
                "EdTech",
                "Pune",
                "Sequoia",
                "Seed",
                Some(7.0),
            ),
        ]
    }

    /// Test the headline metrics on a tiny market
    #[test]
    fn test_headline_metrics_end_to_end() {
        let records = three_record_market();
        let set = RecordSet::new(&records);

        assert_eq!(set.total_amount(), 22.0);
        assert_eq!(set.distinct_startup_count(), 2);
        assert_eq!(set.max_single_startup_amount(), Some(10.0));
        assert_eq!(set.average_startup_total(), Some(11.0));

        let top = set.top_n(RecordField::Startup, 1, None);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].label, "X");
        assert_eq!(top[0].value, 15.0);
    }

    /// Test that two investors in one field both get credit
    #[test]
    fn test_exploded_investors_end_to_end() {
        let records = vec![FundingRecord::new(
            None,
            "Z",
            "SaaS",
            "Chennai",
            "Sequoia, Accel Partners",
            "Series B",
            Some(3.0),
        )];
        let set = RecordSet::new(&records);
        let names: Vec<&str> = set.explode_investors().iter().map(|p| p.investor).collect();
        assert_eq!(names, vec!["Sequoia", "Accel Partners"]);
    }

    /// Test that group sums partition the total over rows with a key
    #[test]
    fn test_sum_by_category_partitions_total() {
        let mut records = three_record_market();
        records.push(FundingRecord {
            round: None,
            ..records[0].clone()
        });
        records.push(FundingRecord {
            amount: None,
            ..records[1].clone()
        });
        let set = RecordSet::new(&records);

        let by_round = set.sum_by(RecordField::Round);
        let keyed_total: f64 = set
            .iter()
            .filter(|r| r.round.is_some())
            .filter_map(|r| r.amount)
            .sum();
        assert_eq!(by_round.iter().map(|c| c.value).sum::<f64>(), keyed_total);
        assert!(by_round.windows(2).all(|w| w[0].value >= w[1].value));
    }

    /// Test top-N is bounded and repeatable
    #[test]
    fn test_top_n_idempotent() {
        let records = three_record_market();
        let set = RecordSet::new(&records);
        let first = set.top_n(RecordField::City, 1, None);
        let second = set.top_n(RecordField::City, 1, None);
        assert_eq!(first, second);
        assert!(first.len() <= 1);
    }

    /// Test a user walking through all three pages
    #[test]
    fn test_dashboard_walkthrough() {
        let dataset = Dataset::from_records(three_record_market());

        let overall = overall_view(
            &dataset,
            &OverallParams {
                year: Some(2020),
                metric: MonthlyMetric::Total,
            },
        );
        assert_eq!(overall.top_startups_for_year.rows.len(), 2);
        assert_eq!(overall.heatmap.get(2020, 8), Some(7.0));
        assert_eq!(overall.heatmap.get(2021, 1), Some(0.0));

        let startup = startup_view(&dataset, "X").unwrap();
        assert_eq!(startup.funding_history.rows.len(), 2);
        assert!(startup.similar_companies.is_empty());

        let investor = investor_view(&dataset, "Sequoia").unwrap();
        assert_eq!(investor.recent_investments.rows.len(), 2);
        assert_eq!(investor.similar_companies.labels(), vec!["X", "X"]);

        assert_eq!(
            investor_view(&dataset, "Tiger").unwrap_err(),
            ViewError::InvestorNotFound("Tiger".to_string())
        );
    }
}
