use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(Interpretation {
    Low => "low",
    High => "high",
    Normal => "normal",
    Unknown => "unknown",
});

str_enum!(TriageLevel {
    Low => "Low",
    Medium => "Medium",
    High => "High",
});

str_enum!(ScreenerType {
    Phq9 => "phq9",
    Gad7 => "gad7",
});

str_enum!(ReportStatus {
    Analyzed => "analyzed",
    NoReadableContent => "no_readable_content",
    NothingRecognized => "nothing_recognized",
});

str_enum!(LabSource {
    Upload => "upload",
    Manual => "manual",
});

str_enum!(DietType {
    Veg => "veg",
    NonVeg => "nonveg",
    Vegan => "vegan",
});

str_enum!(DietGoal {
    Balanced => "balanced",
    WeightLoss => "weight_loss",
    MuscleGain => "muscle_gain",
});

impl Interpretation {
    /// Low or high; the two buckets that produce flags.
    pub fn is_abnormal(&self) -> bool {
        matches!(self, Self::Low | Self::High)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn interpretation_round_trip() {
        for (variant, s) in [
            (Interpretation::Low, "low"),
            (Interpretation::High, "high"),
            (Interpretation::Normal, "normal"),
            (Interpretation::Unknown, "unknown"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(Interpretation::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn triage_level_keeps_title_case() {
        assert_eq!(TriageLevel::Medium.as_str(), "Medium");
        assert_eq!(TriageLevel::from_str("High").unwrap(), TriageLevel::High);
        assert!(TriageLevel::from_str("high").is_err());
    }

    #[test]
    fn invalid_value_reports_field() {
        let err = DietType::from_str("keto").unwrap_err();
        match err {
            DatabaseError::InvalidEnum { field, value } => {
                assert_eq!(field, "DietType");
                assert_eq!(value, "keto");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&DietType::NonVeg).unwrap();
        assert_eq!(json, "\"nonveg\"");
        let goal: DietGoal = serde_json::from_str("\"weight_loss\"").unwrap();
        assert_eq!(goal, DietGoal::WeightLoss);
        let status = serde_json::to_string(&ReportStatus::NothingRecognized).unwrap();
        assert_eq!(status, "\"nothing_recognized\"");
    }

    #[test]
    fn abnormal_buckets() {
        assert!(Interpretation::Low.is_abnormal());
        assert!(Interpretation::High.is_abnormal());
        assert!(!Interpretation::Normal.is_abnormal());
        assert!(!Interpretation::Unknown.is_abnormal());
    }
}
