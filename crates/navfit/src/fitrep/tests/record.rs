use serde_json::json;

use super::common::*;
use crate::fitrep::record::{
    ConcurrentSenior, Fitrep, PerformanceTrait, PromotionRecommendation, TraitAverage, TraitScore,
    NOT_OBSERVED,
};

#[test]
fn blank_input_builds_an_empty_record() {
    for raw in [json!({}), json!(null), json!("not an object"), json!([1, 2, 3])] {
        let record = record_from(raw);
        assert_eq!(record, Fitrep::default());
    }
}

#[test]
fn mistyped_fields_default_instead_of_failing() {
    let record = record_from(json!({
        "FullName": null,
        "Rate": 0,
        "SSN": 123456789,
        "Active": "on",
        "TAR": 0,
        "Inactive": "",
        "PROF": 4,
        "Comments": false
    }));

    assert_eq!(record.full_name, "");
    assert_eq!(record.rate, "");
    assert_eq!(record.ssn, "123456789");
    assert!(record.active);
    assert!(!record.reserve_active);
    assert!(!record.inactive);
    assert_eq!(record.traits.professional_expertise, "4");
    assert_eq!(record.comments, "");
}

#[test]
fn trait_average_is_not_observed_without_ratings() {
    let record = record_from(json!({
        "PROF": "NOB",
        "EO": "nob",
        "MIL": "",
        "TEAM": "0"
    }));

    assert_eq!(record.member_trait_average(), TraitAverage::NotObserved);
    assert_eq!(record.member_trait_average().to_string(), NOT_OBSERVED);
}

#[test]
fn trait_average_skips_not_observed_and_rounds() {
    let record = record_from(json!({
        "PROF": "4", "EO": "5", "MIL": "3", "TEAM": "NOB",
        "MIS": "4", "LEAD": "5", "TAC": "4"
    }));

    assert_eq!(record.member_trait_average().to_string(), "4.17");
    assert_eq!(record.traits.score(PerformanceTrait::Teamwork), TraitScore::NotObserved);
    assert_eq!(record.summary_group_average, "4.12");

    let snapshot = record.snapshot().expect("mock serializes");
    assert_eq!(Fitrep::from_raw(&snapshot), record);
}

#[test]
fn trait_average_ignores_out_of_range_scores() {
    let record = record_from(json!({
        "PROF": "0", "EO": "-1", "MIL": "7", "TEAM": "abc", "MIS": "3"
    }));

    assert_eq!(record.member_trait_average(), TraitAverage::Mean(3.0));
    assert_eq!(record.member_trait_average().to_string(), "3.00");
}

#[test]
fn fractional_scores_average_as_whole_numbers() {
    let record = record_from(json!({ "PROF": "4.5", "EO": "5" }));

    assert_eq!(
        record.traits.score(PerformanceTrait::ProfessionalExpertise),
        TraitScore::Rated(4)
    );
    assert_eq!(record.member_trait_average().to_string(), "4.50");
}

#[test]
fn trait_scores_classify_with_leading_integer_rules() {
    assert_eq!(TraitScore::classify(""), TraitScore::Unset);
    assert_eq!(TraitScore::classify("NOB"), TraitScore::NotObserved);
    assert_eq!(TraitScore::classify("Nob"), TraitScore::NotObserved);
    assert_eq!(TraitScore::classify("4.0"), TraitScore::Rated(4));
    assert_eq!(TraitScore::classify(" 2 "), TraitScore::Rated(2));
    assert_eq!(TraitScore::classify("6"), TraitScore::Invalid);
    assert_eq!(TraitScore::classify("great"), TraitScore::Invalid);
}

#[test]
fn every_trait_reads_its_own_source_key() {
    let record = record_from(json!({
        "PROF": "1", "EO": "2", "MIL": "3", "TEAM": "4",
        "MIS": "5", "LEAD": "NOB", "TAC": ""
    }));

    let scores: Vec<TraitScore> = PerformanceTrait::ordered()
        .into_iter()
        .map(|performance_trait| record.traits.score(performance_trait))
        .collect();
    assert_eq!(
        scores,
        vec![
            TraitScore::Rated(1),
            TraitScore::Rated(2),
            TraitScore::Rated(3),
            TraitScore::Rated(4),
            TraitScore::Rated(5),
            TraitScore::NotObserved,
            TraitScore::Unset,
        ]
    );
}

#[test]
fn promotion_codes_parse_by_leading_integer() {
    assert_eq!(
        PromotionRecommendation::from_code("1"),
        Some(PromotionRecommendation::NotObserved)
    );
    assert_eq!(
        PromotionRecommendation::from_code("6 (EP)"),
        Some(PromotionRecommendation::EarlyPromote)
    );
    assert_eq!(PromotionRecommendation::from_code("0"), None);
    assert_eq!(PromotionRecommendation::from_code("9"), None);
    assert_eq!(PromotionRecommendation::from_code("EP"), None);
    assert_eq!(PromotionRecommendation::from_code(""), None);
}

#[test]
fn concurrent_senior_joins_discrete_parts() {
    let senior = ConcurrentSenior::from_discrete_fields("SMITH, J", "CAPT", "USS X", "12345");
    assert_eq!(senior.combined(), "SMITH, J, CAPT, USS X, 12345");

    let partial = ConcurrentSenior::from_discrete_fields("JONES", "", "USS Y", "");
    assert_eq!(partial.combined(), "JONES, USS Y");

    assert_eq!(ConcurrentSenior::default().combined(), "");
}

#[test]
fn concurrent_senior_skips_missing_grade_and_command() {
    let senior = ConcurrentSenior::from_discrete_fields("SMITH, J", "", "", "12345");

    assert_eq!(senior.combined(), "SMITH, J, 12345");
}

#[test]
fn empty_combined_description_is_no_concurrent_senior() {
    let senior = ConcurrentSenior::from_combined("");
    assert_eq!(senior, ConcurrentSenior::default());

    let mut record = Fitrep::mock();
    record.concurrent_senior = ConcurrentSenior::from_combined(String::new());
    let snapshot = record.snapshot().expect("record serializes");
    assert_eq!(Fitrep::from_raw(&snapshot), record);
}

#[test]
fn concurrent_senior_keeps_combined_description_verbatim() {
    let senior = ConcurrentSenior::from_combined("SMITH, J CAPT USS X 12345");
    assert_eq!(senior.combined(), "SMITH, J CAPT USS X 12345");

    let record = record_from(json!({
        "RRSCombined": "SMITH, J CAPT USS X 12345",
        "RRSName": "IGNORED",
        "RRSGrade": "CDR"
    }));
    assert_eq!(
        record.concurrent_senior_combined(),
        "SMITH, J CAPT USS X 12345"
    );
}

#[test]
fn concurrent_senior_name_synthesizes_from_split_name_fields() {
    let record = record_from(json!({
        "RRSLastName": "SMITH",
        "RRSFI": "J",
        "RRSGrade": "CAPT",
        "RRSCommand": "USS X",
        "RRSUIC": "12345"
    }));

    assert_eq!(
        record.concurrent_senior_combined(),
        "SMITH, J, CAPT, USS X, 12345"
    );
}

#[test]
fn screening_recommendation_accepts_split_legacy_fields() {
    let record = record_from(json!({
        "RecommendA": "Department Head",
        "RecommendB": "Post-Graduate School"
    }));
    assert_eq!(
        record.recommend_screening,
        "Department Head\nPost-Graduate School"
    );

    let single = record_from(json!({ "RecommendScreening": "XO" }));
    assert_eq!(single.recommend_screening, "XO");
}

#[test]
fn snapshot_reloads_into_an_equal_record() {
    let mut record = Fitrep::mock();
    record.concurrent_senior = ConcurrentSenior::from_combined("SMITH, J CAPT");

    let snapshot = record.snapshot().expect("record serializes");
    assert_eq!(snapshot["FullName"], "DOE, JOHN Q.");
    assert_eq!(snapshot["RRSCombined"], "SMITH, J CAPT");
    assert_eq!(Fitrep::from_raw(&snapshot), record);

    let blank = Fitrep::default();
    let blank_snapshot = blank.snapshot().expect("blank record serializes");
    assert_eq!(Fitrep::from_raw(&blank_snapshot), blank);
}

#[test]
fn mock_record_matches_sample_report() {
    let record = Fitrep::mock();

    assert_eq!(record.full_name, "DOE, JOHN Q.");
    assert_eq!(record.rate, "LT");
    assert!(record.active);
    assert!(record.statement_no);
    assert!(!record.statement_yes);
    assert_eq!(record.promotion(), Some(PromotionRecommendation::EarlyPromote));
    assert_eq!(record.member_trait_average().to_string(), "4.17");
    assert_eq!(record.traits.score(PerformanceTrait::Teamwork), TraitScore::NotObserved);
    assert_eq!(record.summary_group_average, "4.12");

    let snapshot = record.snapshot().expect("mock serializes");
    assert_eq!(Fitrep::from_raw(&snapshot), record);
}
