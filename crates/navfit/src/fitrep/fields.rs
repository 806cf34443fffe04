//! Physical field names of the NAVPERS 1610/2 fillable template.
//!
//! This module is the single binding between logical record fields and the
//! template's field set. Several names are irregular (`f42_NOB`, `f42_Prom`);
//! they match the template as published and must not be "fixed" here alone.

use super::record::{PerformanceTrait, PromotionRecommendation, TraitScore};

/// Value a checkbox target receives when its flag is set.
pub const CHECKED: &str = "Yes";
/// Mark written into the single selected trait cell.
pub const TRAIT_MARK: &str = "X";

pub const FULL_NAME: &str = "f1_01";
pub const RATE: &str = "f1_02";
pub const DESIGNATOR: &str = "f1_03";
pub const SSN: &str = "f1_04";

pub const STATUS_ACTIVE: &str = "f1_05_ACT";
pub const STATUS_TAR: &str = "f1_05_TAR";
pub const STATUS_INACTIVE: &str = "f1_05_INACT";
pub const STATUS_AT_ADSW: &str = "f1_05_AT_ADSW";

pub const UIC: &str = "f1_06";
pub const SHIP_STATION: &str = "f1_07";
pub const PROMOTION_STATUS: &str = "f1_08";
pub const DATE_REPORTED: &str = "f1_09";

pub const OCCASION_PERIODIC: &str = "f1_10";
pub const OCCASION_DETACHMENT_INDIVIDUAL: &str = "f1_11";
pub const OCCASION_DETACHMENT_SENIOR: &str = "f1_12";
pub const OCCASION_SPECIAL: &str = "f1_13";

pub const PERIOD_FROM: &str = "f1_14";
pub const PERIOD_TO: &str = "f1_15";
pub const NOT_OBSERVED_REPORT: &str = "f1_16";

pub const TYPE_REGULAR: &str = "f1_17";
pub const TYPE_CONCURRENT: &str = "f1_18";
pub const TYPE_OPS_CDR: &str = "f1_19";

pub const PHYSICAL_READINESS: &str = "f1_20";
pub const BILLET_SUBCATEGORY: &str = "f1_21";
pub const SENIOR_NAME: &str = "f1_22";
pub const SENIOR_GRADE: &str = "f1_23";
pub const SENIOR_DESIGNATOR: &str = "f1_24";
pub const SENIOR_TITLE: &str = "f1_25";
pub const SENIOR_UIC: &str = "f1_26";
pub const SENIOR_SSN: &str = "f1_27";

pub const ACHIEVEMENTS: &str = "f1_28";
pub const PRIMARY_DUTY: &str = "f1_29a";
pub const DUTIES: &str = "f1_29b";

pub const DATE_COUNSELED: &str = "f1_30";
pub const COUNSELOR: &str = "f1_31";

pub const SCREENING_RECOMMENDATION: &str = "f1_40";
pub const COMMENTS: &str = "f1_41";

pub const SUMMARY_NOT_OBSERVED: &str = "f1_43_NOB";
pub const SUMMARY_SIGNIFICANT_PROBLEMS: &str = "f1_43_SigProb";
pub const SUMMARY_PROGRESSING: &str = "f1_43_Prog";
pub const SUMMARY_PROMOTABLE: &str = "f1_43_Prom";
pub const SUMMARY_MUST_PROMOTE: &str = "f1_43_MP";
pub const SUMMARY_EARLY_PROMOTE: &str = "f1_43_EP";

pub const SENIOR_ADDRESS: &str = "f1_44";

pub const MEMBER_TRAIT_AVERAGE: &str = "f1_45_member_trait_avg";
pub const SUMMARY_GROUP_AVERAGE: &str = "f1_45_sum_grp_avg";

pub const STATEMENT_YES: &str = "f1_46_yes";
pub const STATEMENT_NO: &str = "f1_46_no";

pub const CONCURRENT_SENIOR: &str = "f1_47";

/// The text cells of one trait row: ratings 1 through 5, then NOB.
#[derive(Debug, Clone, Copy)]
pub struct TraitCells {
    pub rated: [&'static str; 5],
    pub not_observed: &'static str,
}

impl TraitCells {
    /// Cell for a classified score; at most one cell per score.
    pub fn cell_for(&self, score: TraitScore) -> Option<&'static str> {
        match score {
            TraitScore::Rated(rating @ 1..=5) => Some(self.rated[usize::from(rating) - 1]),
            TraitScore::NotObserved => Some(self.not_observed),
            TraitScore::Rated(_) | TraitScore::Unset | TraitScore::Invalid => None,
        }
    }

    pub fn all(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rated
            .iter()
            .copied()
            .chain(std::iter::once(self.not_observed))
    }
}

const TRAIT_CELLS: [TraitCells; 7] = [
    TraitCells {
        rated: ["f1_33_1", "f1_33_2", "f1_33_3", "f1_33_4", "f1_33_5"],
        not_observed: "f1_33_NOB",
    },
    TraitCells {
        rated: ["f1_34_1", "f1_34_2", "f1_34_3", "f1_34_4", "f1_34_5"],
        not_observed: "f1_34_NOB",
    },
    TraitCells {
        rated: ["f1_35_1", "f1_35_2", "f1_35_3", "f1_35_4", "f1_35_5"],
        not_observed: "f1_35_NOB",
    },
    TraitCells {
        rated: ["f1_36_1", "f1_36_2", "f1_36_3", "f1_36_4", "f1_36_5"],
        not_observed: "f1_36_NOB",
    },
    TraitCells {
        rated: ["f1_37_1", "f1_37_2", "f1_37_3", "f1_37_4", "f1_37_5"],
        not_observed: "f1_37_NOB",
    },
    TraitCells {
        rated: ["f1_38_1", "f1_38_2", "f1_38_3", "f1_38_4", "f1_38_5"],
        not_observed: "f1_38_NOB",
    },
    TraitCells {
        rated: ["f1_39_1", "f1_39_2", "f1_39_3", "f1_39_4", "f1_39_5"],
        not_observed: "f1_39_NOB",
    },
];

pub fn trait_cells(performance_trait: PerformanceTrait) -> &'static TraitCells {
    let row = match performance_trait {
        PerformanceTrait::ProfessionalExpertise => 0,
        PerformanceTrait::CommandClimate => 1,
        PerformanceTrait::MilitaryBearing => 2,
        PerformanceTrait::Teamwork => 3,
        PerformanceTrait::MissionAccomplishment => 4,
        PerformanceTrait::Leadership => 5,
        PerformanceTrait::TacticalPerformance => 6,
    };
    &TRAIT_CELLS[row]
}

const PROMOTION_BOXES: [&str; 6] = [
    "f42_NOB",
    "f1_42_SigProb",
    "f1_42_Prog",
    "f42_Prom",
    "f1_42_MP",
    "f1_42_EP",
];

pub fn promotion_box(recommendation: PromotionRecommendation) -> &'static str {
    PROMOTION_BOXES[recommendation as usize - 1]
}

pub fn promotion_boxes() -> &'static [&'static str; 6] {
    &PROMOTION_BOXES
}
