use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

use super::normalizer::{flag_value, leading_integer, text_value};

/// Marker the form uses for a rating that was deliberately not observed.
pub const NOT_OBSERVED: &str = "NOB";

/// The seven scored performance dimensions (blocks 33 through 39).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceTrait {
    ProfessionalExpertise,
    CommandClimate,
    MilitaryBearing,
    Teamwork,
    MissionAccomplishment,
    Leadership,
    TacticalPerformance,
}

impl PerformanceTrait {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::ProfessionalExpertise,
            Self::CommandClimate,
            Self::MilitaryBearing,
            Self::Teamwork,
            Self::MissionAccomplishment,
            Self::Leadership,
            Self::TacticalPerformance,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::ProfessionalExpertise => "Professional Expertise",
            Self::CommandClimate => "Command or Organizational Climate/Equal Opportunity",
            Self::MilitaryBearing => "Military Bearing/Character",
            Self::Teamwork => "Teamwork",
            Self::MissionAccomplishment => "Mission Accomplishment and Initiative",
            Self::Leadership => "Leadership",
            Self::TacticalPerformance => "Tactical Performance",
        }
    }

    /// Key the input layer uses for this trait.
    pub const fn source_key(self) -> &'static str {
        match self {
            Self::ProfessionalExpertise => "PROF",
            Self::CommandClimate => "EO",
            Self::MilitaryBearing => "MIL",
            Self::Teamwork => "TEAM",
            Self::MissionAccomplishment => "MIS",
            Self::Leadership => "LEAD",
            Self::TacticalPerformance => "TAC",
        }
    }
}

/// Classification of one stored trait score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraitScore {
    Unset,
    NotObserved,
    Rated(u8),
    Invalid,
}

impl TraitScore {
    /// Fractional input reads as its integer part (`"4.5"` is 4); scores are
    /// whole numbers by the time they reach the record.
    pub fn classify(raw: &str) -> Self {
        if raw.is_empty() {
            return Self::Unset;
        }
        if raw.eq_ignore_ascii_case(NOT_OBSERVED) {
            return Self::NotObserved;
        }
        match leading_integer(raw) {
            Some(score @ 1..=5) => Self::Rated(score as u8),
            _ => Self::Invalid,
        }
    }
}

/// Block 42 promotion recommendation, ordinal from 1 (not observed) to 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PromotionRecommendation {
    NotObserved = 1,
    SignificantProblems = 2,
    Progressing = 3,
    Promotable = 4,
    MustPromote = 5,
    EarlyPromote = 6,
}

impl PromotionRecommendation {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::NotObserved,
            Self::SignificantProblems,
            Self::Progressing,
            Self::Promotable,
            Self::MustPromote,
            Self::EarlyPromote,
        ]
    }

    pub fn from_code(raw: &str) -> Option<Self> {
        let code = leading_integer(raw)?;
        Self::ordered()
            .into_iter()
            .find(|recommendation| *recommendation as i64 == code)
    }
}

/// Member trait average as derived from the current scores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TraitAverage {
    NotObserved,
    Mean(f64),
}

impl fmt::Display for TraitAverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraitAverage::NotObserved => f.write_str(NOT_OBSERVED),
            TraitAverage::Mean(mean) => {
                let rounded = (mean * 100.0).round() / 100.0;
                write!(f, "{rounded:.2}")
            }
        }
    }
}

/// Block 22 through 27 and 44: the reporting senior.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportingSenior {
    #[serde(rename = "ReportingSenior")]
    pub name: String,
    #[serde(rename = "RSGrade")]
    pub grade: String,
    #[serde(rename = "RSDesig")]
    pub designator: String,
    #[serde(rename = "RSTitle")]
    pub title: String,
    #[serde(rename = "RSUIC")]
    pub uic: String,
    #[serde(rename = "RSSSN")]
    pub ssn: String,
    #[serde(rename = "RSAddress")]
    pub address: String,
}

/// Raw trait scores, each `"1"`..`"5"`, [`NOT_OBSERVED`], or empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TraitScores {
    #[serde(rename = "PROF")]
    pub professional_expertise: String,
    #[serde(rename = "EO")]
    pub command_climate: String,
    #[serde(rename = "MIL")]
    pub military_bearing: String,
    #[serde(rename = "TEAM")]
    pub teamwork: String,
    #[serde(rename = "MIS")]
    pub mission_accomplishment: String,
    #[serde(rename = "LEAD")]
    pub leadership: String,
    #[serde(rename = "TAC")]
    pub tactical_performance: String,
}

impl TraitScores {
    pub fn raw(&self, performance_trait: PerformanceTrait) -> &str {
        match performance_trait {
            PerformanceTrait::ProfessionalExpertise => &self.professional_expertise,
            PerformanceTrait::CommandClimate => &self.command_climate,
            PerformanceTrait::MilitaryBearing => &self.military_bearing,
            PerformanceTrait::Teamwork => &self.teamwork,
            PerformanceTrait::MissionAccomplishment => &self.mission_accomplishment,
            PerformanceTrait::Leadership => &self.leadership,
            PerformanceTrait::TacticalPerformance => &self.tactical_performance,
        }
    }

    pub fn score(&self, performance_trait: PerformanceTrait) -> TraitScore {
        TraitScore::classify(self.raw(performance_trait))
    }

    fn slot_mut(&mut self, performance_trait: PerformanceTrait) -> &mut String {
        match performance_trait {
            PerformanceTrait::ProfessionalExpertise => &mut self.professional_expertise,
            PerformanceTrait::CommandClimate => &mut self.command_climate,
            PerformanceTrait::MilitaryBearing => &mut self.military_bearing,
            PerformanceTrait::Teamwork => &mut self.teamwork,
            PerformanceTrait::MissionAccomplishment => &mut self.mission_accomplishment,
            PerformanceTrait::Leadership => &mut self.leadership,
            PerformanceTrait::TacticalPerformance => &mut self.tactical_performance,
        }
    }

    /// Mean of the scores rated 1 through 5; unset, not-observed, and
    /// out-of-range entries are excluded from both sum and count.
    pub fn average(&self) -> TraitAverage {
        let rated: Vec<u8> = PerformanceTrait::ordered()
            .into_iter()
            .filter_map(|performance_trait| match self.score(performance_trait) {
                TraitScore::Rated(score) => Some(score),
                _ => None,
            })
            .collect();

        if rated.is_empty() {
            return TraitAverage::NotObserved;
        }

        let sum: u32 = rated.iter().map(|score| u32::from(*score)).sum();
        TraitAverage::Mean(f64::from(sum) / rated.len() as f64)
    }
}

/// Block 43 summary group counts, stored as the reporting senior typed them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SummaryGroup {
    #[serde(rename = "SummaryNOB")]
    pub not_observed: String,
    #[serde(rename = "SummarySP")]
    pub significant_problems: String,
    #[serde(rename = "SummaryProg")]
    pub progressing: String,
    #[serde(rename = "SummaryProm")]
    pub promotable: String,
    #[serde(rename = "SummaryMP")]
    pub must_promote: String,
    #[serde(rename = "SummaryEP")]
    pub early_promote: String,
}

/// The four discrete parts of a concurrent reporting senior (block 47).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConcurrentSeniorParts {
    #[serde(rename = "RRSName")]
    pub name: String,
    #[serde(rename = "RRSGrade")]
    pub grade: String,
    #[serde(rename = "RRSCommand")]
    pub command: String,
    #[serde(rename = "RRSUIC")]
    pub unit_code: String,
}

/// Block 47 arrives either as one pre-combined description or as parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ConcurrentSenior {
    Combined {
        #[serde(rename = "RRSCombined")]
        description: String,
    },
    Discrete(ConcurrentSeniorParts),
}

impl Default for ConcurrentSenior {
    fn default() -> Self {
        Self::Discrete(ConcurrentSeniorParts::default())
    }
}

impl ConcurrentSenior {
    /// An empty description carries nothing to combine and is the same as
    /// no concurrent senior at all.
    pub fn from_combined(description: impl Into<String>) -> Self {
        let description = description.into();
        if description.is_empty() {
            return Self::default();
        }
        Self::Combined { description }
    }

    pub fn from_discrete_fields(
        name: impl Into<String>,
        grade: impl Into<String>,
        command: impl Into<String>,
        unit_code: impl Into<String>,
    ) -> Self {
        Self::Discrete(ConcurrentSeniorParts {
            name: name.into(),
            grade: grade.into(),
            command: command.into(),
            unit_code: unit_code.into(),
        })
    }

    /// Text for the block 47 box: a combined description verbatim, otherwise
    /// the non-empty parts joined by `", "`.
    pub fn combined(&self) -> String {
        match self {
            ConcurrentSenior::Combined { description } => description.clone(),
            ConcurrentSenior::Discrete(parts) => [
                parts.name.as_str(),
                parts.grade.as_str(),
                parts.command.as_str(),
                parts.unit_code.as_str(),
            ]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        }
    }
}

/// One fitness report. Every field defaults to empty/false; construction
/// from raw input never fails.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Fitrep {
    #[serde(rename = "FullName")]
    pub full_name: String,
    #[serde(rename = "Rate")]
    pub rate: String,
    #[serde(rename = "Desig")]
    pub designator: String,
    #[serde(rename = "SSN")]
    pub ssn: String,

    #[serde(rename = "Active")]
    pub active: bool,
    #[serde(rename = "TAR")]
    pub reserve_active: bool,
    #[serde(rename = "Inactive")]
    pub inactive: bool,
    #[serde(rename = "ATADSW")]
    pub annual_training: bool,

    #[serde(rename = "UIC")]
    pub uic: String,
    #[serde(rename = "ShipStation")]
    pub ship_station: String,
    #[serde(rename = "PromotionStatus")]
    pub promotion_status: String,
    #[serde(rename = "DateReported")]
    pub date_reported: String,

    #[serde(rename = "Periodic")]
    pub periodic: bool,
    #[serde(rename = "DetInd")]
    pub detachment_of_individual: bool,
    #[serde(rename = "DetRS")]
    pub detachment_of_senior: bool,
    #[serde(rename = "Special")]
    pub special: bool,
    #[serde(rename = "FromDate")]
    pub from_date: String,
    #[serde(rename = "ToDate")]
    pub to_date: String,
    #[serde(rename = "NOB")]
    pub not_observed: bool,

    #[serde(rename = "Regular")]
    pub regular: bool,
    #[serde(rename = "Concurrent")]
    pub concurrent: bool,
    #[serde(rename = "OpsCdr")]
    pub operational_commander: bool,

    #[serde(rename = "PhysicalReadiness")]
    pub physical_readiness: String,
    #[serde(rename = "BilletSubcat")]
    pub billet_subcategory: String,

    #[serde(flatten)]
    pub reporting_senior: ReportingSenior,

    #[serde(rename = "Achievements")]
    pub achievements: String,
    #[serde(rename = "PrimaryDuty")]
    pub primary_duty: String,
    #[serde(rename = "Duties")]
    pub duties: String,

    #[serde(rename = "DateCounseled")]
    pub date_counseled: String,
    #[serde(rename = "Counseler")]
    pub counselor: String,

    #[serde(flatten)]
    pub traits: TraitScores,

    #[serde(rename = "RecommendScreening")]
    pub recommend_screening: String,
    #[serde(rename = "Comments")]
    pub comments: String,
    #[serde(rename = "PromotionRecom")]
    pub promotion_recommendation: String,

    #[serde(flatten)]
    pub summary: SummaryGroup,
    #[serde(rename = "RSCA")]
    pub summary_group_average: String,

    #[serde(rename = "StatementYes")]
    pub statement_yes: bool,
    #[serde(rename = "StatementNo")]
    pub statement_no: bool,

    #[serde(flatten)]
    pub concurrent_senior: ConcurrentSenior,
}

impl Fitrep {
    /// Builds a record from a UI object or stored snapshot. Missing or
    /// mistyped fields default; non-object input yields a blank record.
    pub fn from_raw(raw: &Value) -> Self {
        let empty = Map::new();
        let fields = RawFields(raw.as_object().unwrap_or(&empty));

        let mut traits = TraitScores::default();
        for performance_trait in PerformanceTrait::ordered() {
            *traits.slot_mut(performance_trait) = fields.text(performance_trait.source_key());
        }

        Self {
            full_name: fields.text("FullName"),
            rate: fields.text("Rate"),
            designator: fields.text("Desig"),
            ssn: fields.text("SSN"),
            active: fields.flag("Active"),
            reserve_active: fields.flag("TAR"),
            inactive: fields.flag("Inactive"),
            annual_training: fields.flag("ATADSW"),
            uic: fields.text("UIC"),
            ship_station: fields.text("ShipStation"),
            promotion_status: fields.text("PromotionStatus"),
            date_reported: fields.text("DateReported"),
            periodic: fields.flag("Periodic"),
            detachment_of_individual: fields.flag("DetInd"),
            detachment_of_senior: fields.flag("DetRS"),
            special: fields.flag("Special"),
            from_date: fields.text("FromDate"),
            to_date: fields.text("ToDate"),
            not_observed: fields.flag("NOB"),
            regular: fields.flag("Regular"),
            concurrent: fields.flag("Concurrent"),
            operational_commander: fields.flag("OpsCdr"),
            physical_readiness: fields.text("PhysicalReadiness"),
            billet_subcategory: fields.text("BilletSubcat"),
            reporting_senior: ReportingSenior {
                name: fields.text("ReportingSenior"),
                grade: fields.text("RSGrade"),
                designator: fields.text("RSDesig"),
                title: fields.text("RSTitle"),
                uic: fields.text("RSUIC"),
                ssn: fields.text("RSSSN"),
                address: fields.text("RSAddress"),
            },
            achievements: fields.text("Achievements"),
            primary_duty: fields.text("PrimaryDuty"),
            duties: fields.text("Duties"),
            date_counseled: fields.text("DateCounseled"),
            counselor: fields.text("Counseler"),
            traits,
            recommend_screening: fields.screening_recommendation(),
            comments: fields.text("Comments"),
            promotion_recommendation: fields.text("PromotionRecom"),
            summary: SummaryGroup {
                not_observed: fields.text("SummaryNOB"),
                significant_problems: fields.text("SummarySP"),
                progressing: fields.text("SummaryProg"),
                promotable: fields.text("SummaryProm"),
                must_promote: fields.text("SummaryMP"),
                early_promote: fields.text("SummaryEP"),
            },
            summary_group_average: fields.text("RSCA"),
            statement_yes: fields.flag("StatementYes"),
            statement_no: fields.flag("StatementNo"),
            concurrent_senior: fields.concurrent_senior(),
        }
    }

    pub fn member_trait_average(&self) -> TraitAverage {
        self.traits.average()
    }

    pub fn concurrent_senior_combined(&self) -> String {
        self.concurrent_senior.combined()
    }

    pub fn promotion(&self) -> Option<PromotionRecommendation> {
        PromotionRecommendation::from_code(&self.promotion_recommendation)
    }

    /// Serialized snapshot in the same key layout `from_raw` reads.
    pub fn snapshot(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Fixed sample report used to test form exports end to end.
    pub fn mock() -> Self {
        Self {
            full_name: "DOE, JOHN Q.".to_string(),
            rate: "LT".to_string(),
            designator: "1110".to_string(),
            ssn: "000-00-0000".to_string(),
            active: true,
            uic: "55555".to_string(),
            ship_station: "USS NEVERDOCK (DDG 00)".to_string(),
            promotion_status: "REG".to_string(),
            date_reported: "2023-01-01".to_string(),

            periodic: true,
            from_date: "2023-01-01".to_string(),
            to_date: "2023-12-31".to_string(),
            regular: true,

            physical_readiness: "P".to_string(),
            billet_subcategory: "DIV OFF".to_string(),

            reporting_senior: ReportingSenior {
                name: "CAPTAIN, I. M.".to_string(),
                grade: "CAPT".to_string(),
                designator: "1110".to_string(),
                title: "CO".to_string(),
                uic: "55555".to_string(),
                ssn: "999-99-9999".to_string(),
                address: String::new(),
            },

            achievements: "Specific accomplishment one.\nSpecific accomplishment two."
                .to_string(),
            primary_duty: "DIVO".to_string(),
            duties: "Responsible for division training, maintenance, and personnel."
                .to_string(),

            date_counseled: "2023-07-15".to_string(),
            counselor: "CDR XO".to_string(),

            traits: TraitScores {
                professional_expertise: "4".to_string(),
                command_climate: "5".to_string(),
                military_bearing: "3".to_string(),
                teamwork: NOT_OBSERVED.to_string(),
                mission_accomplishment: "4".to_string(),
                leadership: "5".to_string(),
                tactical_performance: "4".to_string(),
            },

            recommend_screening: "Department Head\nPost-Graduate School".to_string(),
            comments: "1. LT Doe is a superstar. He fixed the entire ship with duct tape.\n2. Highly Recommended."
                .to_string(),
            promotion_recommendation: "6".to_string(),

            summary: SummaryGroup {
                not_observed: String::new(),
                significant_problems: "0".to_string(),
                progressing: "0".to_string(),
                promotable: "2".to_string(),
                must_promote: "5".to_string(),
                early_promote: "1".to_string(),
            },
            summary_group_average: "4.12".to_string(),

            statement_no: true,
            ..Self::default()
        }
    }
}

struct RawFields<'a>(&'a Map<String, Value>);

impl RawFields<'_> {
    fn text(&self, key: &str) -> String {
        text_value(self.0.get(key))
    }

    fn flag(&self, key: &str) -> bool {
        flag_value(self.0.get(key))
    }

    /// Older stores split the screening recommendation across two fields.
    fn screening_recommendation(&self) -> String {
        let mut recommendation = self.text("RecommendScreening");
        if recommendation.is_empty() {
            recommendation = self.text("RecommendA");
        }

        let secondary = self.text("RecommendB");
        if !secondary.is_empty() {
            recommendation.push('\n');
            recommendation.push_str(&secondary);
        }
        recommendation
    }

    fn concurrent_senior(&self) -> ConcurrentSenior {
        let combined = self.text("RRSCombined");
        if !combined.is_empty() {
            return ConcurrentSenior::from_combined(combined);
        }

        let mut name = self.text("RRSName");
        if name.is_empty() {
            let last_name = self.text("RRSLastName");
            if !last_name.is_empty() {
                name = format!(
                    "{last_name}, {} {}",
                    self.text("RRSFI"),
                    self.text("RRSMI")
                )
                .trim_end()
                .to_string();
            }
        }

        ConcurrentSenior::from_discrete_fields(
            name,
            self.text("RRSGrade"),
            self.text("RRSCommand"),
            self.text("RRSUIC"),
        )
    }
}
