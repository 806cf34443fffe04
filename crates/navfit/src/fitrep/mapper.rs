use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::fields::{self, CHECKED, TRAIT_MARK};
use super::normalizer::normalize_date;
use super::record::{Fitrep, PerformanceTrait, PromotionRecommendation};

/// Flat template-field-name to value mapping produced for one record.
///
/// Ordered so that mapping the same record twice serializes identically.
/// Absence of a checkbox key means "leave unchecked"; the mapper never emits
/// a negative checkbox value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMap(BTreeMap<String, String>);

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Right-biased union; later rules win on a shared key.
    pub fn merge(mut self, other: FieldMap) -> FieldMap {
        self.0.extend(other.0);
        self
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

impl FromIterator<(&'static str, String)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (&'static str, String)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect(),
        )
    }
}

type Entry = Option<(&'static str, String)>;

fn text(key: &'static str, value: &str) -> Entry {
    Some((key, value.to_string()))
}

fn date(key: &'static str, value: &str) -> Entry {
    normalize_date(value).map(|normalized| (key, normalized))
}

fn checkbox(key: &'static str, flag: bool) -> Entry {
    flag.then(|| (key, CHECKED.to_string()))
}

fn rule(entries: impl IntoIterator<Item = Entry>) -> FieldMap {
    entries.into_iter().flatten().collect()
}

/// Maps a record onto the template's field names. Pure: no clock, no I/O.
pub fn map_fitrep(record: &Fitrep) -> FieldMap {
    let rules = [
        identity(record),
        duty_status(record),
        assignment(record),
        occasion(record),
        report_type(record),
        reporting_senior(record),
        duties(record),
        counseling(record),
        performance_traits(record),
        recommendations(record),
        promotion(record),
        summary_group(record),
        averages(record),
        statement(record),
        concurrent_senior(record),
    ];

    rules.into_iter().fold(FieldMap::new(), FieldMap::merge)
}

fn identity(record: &Fitrep) -> FieldMap {
    rule([
        text(fields::FULL_NAME, &record.full_name),
        text(fields::RATE, &record.rate),
        text(fields::DESIGNATOR, &record.designator),
        text(fields::SSN, &record.ssn),
    ])
}

fn duty_status(record: &Fitrep) -> FieldMap {
    rule([
        checkbox(fields::STATUS_ACTIVE, record.active),
        checkbox(fields::STATUS_TAR, record.reserve_active),
        checkbox(fields::STATUS_INACTIVE, record.inactive),
        checkbox(fields::STATUS_AT_ADSW, record.annual_training),
    ])
}

fn assignment(record: &Fitrep) -> FieldMap {
    rule([
        text(fields::UIC, &record.uic),
        text(fields::SHIP_STATION, &record.ship_station),
        text(fields::PROMOTION_STATUS, &record.promotion_status),
        date(fields::DATE_REPORTED, &record.date_reported),
    ])
}

fn occasion(record: &Fitrep) -> FieldMap {
    rule([
        checkbox(fields::OCCASION_PERIODIC, record.periodic),
        checkbox(
            fields::OCCASION_DETACHMENT_INDIVIDUAL,
            record.detachment_of_individual,
        ),
        checkbox(
            fields::OCCASION_DETACHMENT_SENIOR,
            record.detachment_of_senior,
        ),
        checkbox(fields::OCCASION_SPECIAL, record.special),
        date(fields::PERIOD_FROM, &record.from_date),
        date(fields::PERIOD_TO, &record.to_date),
        checkbox(fields::NOT_OBSERVED_REPORT, record.not_observed),
    ])
}

fn report_type(record: &Fitrep) -> FieldMap {
    rule([
        checkbox(fields::TYPE_REGULAR, record.regular),
        checkbox(fields::TYPE_CONCURRENT, record.concurrent),
        checkbox(fields::TYPE_OPS_CDR, record.operational_commander),
    ])
}

fn reporting_senior(record: &Fitrep) -> FieldMap {
    let senior = &record.reporting_senior;
    rule([
        text(fields::PHYSICAL_READINESS, &record.physical_readiness),
        text(fields::BILLET_SUBCATEGORY, &record.billet_subcategory),
        text(fields::SENIOR_NAME, &senior.name),
        text(fields::SENIOR_GRADE, &senior.grade),
        text(fields::SENIOR_DESIGNATOR, &senior.designator),
        text(fields::SENIOR_TITLE, &senior.title),
        text(fields::SENIOR_UIC, &senior.uic),
        text(fields::SENIOR_SSN, &senior.ssn),
        text(fields::SENIOR_ADDRESS, &senior.address),
    ])
}

fn duties(record: &Fitrep) -> FieldMap {
    rule([
        text(fields::ACHIEVEMENTS, &record.achievements),
        text(fields::PRIMARY_DUTY, &record.primary_duty),
        text(fields::DUTIES, &record.duties),
    ])
}

// Block 32 (counselor signature) is signed on paper and never mapped.
fn counseling(record: &Fitrep) -> FieldMap {
    rule([
        date(fields::DATE_COUNSELED, &record.date_counseled),
        text(fields::COUNSELOR, &record.counselor),
    ])
}

fn performance_traits(record: &Fitrep) -> FieldMap {
    rule(PerformanceTrait::ordered().into_iter().map(|performance_trait| {
        fields::trait_cells(performance_trait)
            .cell_for(record.traits.score(performance_trait))
            .map(|cell| (cell, TRAIT_MARK.to_string()))
    }))
}

fn recommendations(record: &Fitrep) -> FieldMap {
    rule([
        text(fields::SCREENING_RECOMMENDATION, &record.recommend_screening),
        text(fields::COMMENTS, &record.comments),
    ])
}

fn promotion(record: &Fitrep) -> FieldMap {
    rule([record
        .promotion()
        .map(|recommendation: PromotionRecommendation| {
            (fields::promotion_box(recommendation), CHECKED.to_string())
        })])
}

fn summary_group(record: &Fitrep) -> FieldMap {
    let summary = &record.summary;
    rule([
        text(fields::SUMMARY_NOT_OBSERVED, &summary.not_observed),
        text(
            fields::SUMMARY_SIGNIFICANT_PROBLEMS,
            &summary.significant_problems,
        ),
        text(fields::SUMMARY_PROGRESSING, &summary.progressing),
        text(fields::SUMMARY_PROMOTABLE, &summary.promotable),
        text(fields::SUMMARY_MUST_PROMOTE, &summary.must_promote),
        text(fields::SUMMARY_EARLY_PROMOTE, &summary.early_promote),
    ])
}

// Block 45 signature and date are left for the wet signature.
fn averages(record: &Fitrep) -> FieldMap {
    rule([
        text(
            fields::MEMBER_TRAIT_AVERAGE,
            &record.member_trait_average().to_string(),
        ),
        text(fields::SUMMARY_GROUP_AVERAGE, &record.summary_group_average),
    ])
}

fn statement(record: &Fitrep) -> FieldMap {
    rule([
        checkbox(fields::STATEMENT_YES, record.statement_yes),
        checkbox(fields::STATEMENT_NO, record.statement_no),
    ])
}

// TODO: confirm against the production template whether f1_47 is a text box;
// a checkbox there would silently drop this value at fill time. Check the
// printed output at the same time: text fields are written without appearance
// streams (see `AcroFormDocument::set_text`), so viewers that ignore
// NeedAppearances show them blank.
fn concurrent_senior(record: &Fitrep) -> FieldMap {
    rule([text(
        fields::CONCURRENT_SENIOR,
        &record.concurrent_senior_combined(),
    )])
}
