//! The nine intake answers the recommendation pipeline reads.

use serde::{Deserialize, Serialize};

/// The nine intake fields, in the order they are asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    PrimaryGoal,
    TopSpendCategory,
    BrandPreferences,
    TravelFrequency,
    MonthlySpending,
    PaymentBehavior,
    Income,
    CreditScore,
    CreditSituation,
}

impl ProfileField {
    pub const ALL: [ProfileField; 9] = [
        ProfileField::PrimaryGoal,
        ProfileField::TopSpendCategory,
        ProfileField::BrandPreferences,
        ProfileField::TravelFrequency,
        ProfileField::MonthlySpending,
        ProfileField::PaymentBehavior,
        ProfileField::Income,
        ProfileField::CreditScore,
        ProfileField::CreditSituation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileField::PrimaryGoal => "primary_goal",
            ProfileField::TopSpendCategory => "top_spend_category",
            ProfileField::BrandPreferences => "brand_preferences",
            ProfileField::TravelFrequency => "travel_frequency",
            ProfileField::MonthlySpending => "monthly_spending",
            ProfileField::PaymentBehavior => "payment_behavior",
            ProfileField::Income => "income",
            ProfileField::CreditScore => "credit_score",
            ProfileField::CreditSituation => "credit_situation",
        }
    }

    /// Human label used in the profile digest sent to the model.
    pub fn label(&self) -> &'static str {
        match self {
            ProfileField::PrimaryGoal => "Primary goal",
            ProfileField::TopSpendCategory => "Top spending category",
            ProfileField::BrandPreferences => "Brand preferences",
            ProfileField::TravelFrequency => "Travel frequency",
            ProfileField::MonthlySpending => "Monthly spending",
            ProfileField::PaymentBehavior => "Payment behavior",
            ProfileField::Income => "Income",
            ProfileField::CreditScore => "Credit score",
            ProfileField::CreditSituation => "Credit situation",
        }
    }

    /// The question asked for this field. Kept verbatim so clients can map
    /// answers back to fields.
    pub fn question(&self) -> &'static str {
        match self {
            ProfileField::PrimaryGoal => {
                "What's your main goal for a credit card? (Travel rewards, Cash back, Building credit, etc.)"
            }
            ProfileField::TopSpendCategory => {
                "Which category do you spend the most on each month? (Dining, Travel, Shopping, Gas, etc.)"
            }
            ProfileField::BrandPreferences => {
                "Do you regularly shop with any of these brands? (Amazon, Apple, Costco, Walmart, airlines/hotels)"
            }
            ProfileField::TravelFrequency => "How often do you travel by air each year?",
            ProfileField::MonthlySpending => {
                "Approximately how much do you charge on credit cards per month?"
            }
            ProfileField::PaymentBehavior => {
                "Do you typically pay your balance in full each month, or carry a balance?"
            }
            ProfileField::Income => "What is your gross annual income (before taxes)?",
            ProfileField::CreditScore => "What is your credit score range?",
            ProfileField::CreditSituation => {
                "Which describes your credit situation: Student with little history, Building/rebuilding credit, or Established credit?"
            }
        }
    }
}

/// Intake answers. Each field moves once from absent to present and the
/// profile is read-only once the pipeline runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub primary_goal: Option<String>,
    pub top_spend_category: Option<String>,
    pub brand_preferences: Option<String>,
    pub travel_frequency: Option<String>,
    pub monthly_spending: Option<String>,
    pub payment_behavior: Option<String>,
    pub income: Option<String>,
    pub credit_score: Option<String>,
    pub credit_situation: Option<String>,
}

impl UserProfile {
    pub fn get(&self, field: ProfileField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    pub fn set(&mut self, field: ProfileField, value: impl Into<String>) {
        *self.slot_mut(field) = Some(value.into());
    }

    /// Fields that are absent or blank, in question order.
    pub fn missing_fields(&self) -> Vec<ProfileField> {
        ProfileField::ALL
            .into_iter()
            .filter(|f| self.get(*f).map_or(true, |v| v.trim().is_empty()))
            .collect()
    }

    /// First field with no value at all, in question order.
    pub fn next_unanswered(&self) -> Option<ProfileField> {
        ProfileField::ALL
            .into_iter()
            .find(|f| self.get(*f).is_none())
    }

    pub fn answered_count(&self) -> usize {
        ProfileField::ALL
            .iter()
            .filter(|f| self.get(**f).is_some())
            .count()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// True when the credit situation mentions "student", case-insensitively.
    pub fn is_student(&self) -> bool {
        self.credit_situation
            .as_deref()
            .is_some_and(|s| s.to_lowercase().contains("student"))
    }

    /// "Label: value" for every answered field, joined with " | ".
    pub fn summary(&self) -> String {
        ProfileField::ALL
            .iter()
            .filter_map(|f| {
                self.get(*f)
                    .filter(|v| !v.trim().is_empty())
                    .map(|v| format!("{}: {}", f.label(), v))
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }

    fn slot(&self, field: ProfileField) -> &Option<String> {
        match field {
            ProfileField::PrimaryGoal => &self.primary_goal,
            ProfileField::TopSpendCategory => &self.top_spend_category,
            ProfileField::BrandPreferences => &self.brand_preferences,
            ProfileField::TravelFrequency => &self.travel_frequency,
            ProfileField::MonthlySpending => &self.monthly_spending,
            ProfileField::PaymentBehavior => &self.payment_behavior,
            ProfileField::Income => &self.income,
            ProfileField::CreditScore => &self.credit_score,
            ProfileField::CreditSituation => &self.credit_situation,
        }
    }

    fn slot_mut(&mut self, field: ProfileField) -> &mut Option<String> {
        match field {
            ProfileField::PrimaryGoal => &mut self.primary_goal,
            ProfileField::TopSpendCategory => &mut self.top_spend_category,
            ProfileField::BrandPreferences => &mut self.brand_preferences,
            ProfileField::TravelFrequency => &mut self.travel_frequency,
            ProfileField::MonthlySpending => &mut self.monthly_spending,
            ProfileField::PaymentBehavior => &mut self.payment_behavior,
            ProfileField::Income => &mut self.income,
            ProfileField::CreditScore => &mut self.credit_score,
            ProfileField::CreditSituation => &mut self.credit_situation,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::complete_profile;
    use super::*;

    #[test]
    fn test_new_profile_is_empty() {
        let profile = UserProfile::default();
        assert_eq!(profile.missing_fields().len(), 9);
        assert_eq!(profile.next_unanswered(), Some(ProfileField::PrimaryGoal));
        assert_eq!(profile.answered_count(), 0);
        assert!(!profile.is_complete());
    }

    #[test]
    fn test_set_and_get_round_trip_every_field() {
        let mut profile = UserProfile::default();
        for field in ProfileField::ALL {
            profile.set(field, field.as_str());
        }
        for field in ProfileField::ALL {
            assert_eq!(profile.get(field), Some(field.as_str()));
        }
        assert!(profile.is_complete());
        assert_eq!(profile.next_unanswered(), None);
    }

    #[test]
    fn test_blank_answer_counts_as_missing() {
        let mut profile = complete_profile("Established credit");
        profile.set(ProfileField::Income, "   ");
        assert_eq!(profile.missing_fields(), vec![ProfileField::Income]);
        // answered but blank; the dialogue does not ask again
        assert_eq!(profile.next_unanswered(), None);
    }

    #[test]
    fn test_student_detection_is_case_insensitive() {
        assert!(complete_profile("STUDENT with no credit history").is_student());
        assert!(complete_profile("Graduate student").is_student());
        assert!(!complete_profile("Established credit").is_student());
        assert!(!UserProfile::default().is_student());
    }

    #[test]
    fn test_summary_skips_unanswered_fields() {
        let mut profile = UserProfile::default();
        profile.set(ProfileField::PrimaryGoal, "Travel rewards");
        profile.set(ProfileField::CreditScore, "750");
        assert_eq!(
            profile.summary(),
            "Primary goal: Travel rewards | Credit score: 750"
        );
    }

    #[test]
    fn test_field_serializes_as_snake_case_key() {
        for field in ProfileField::ALL {
            let json = serde_json::to_string(&field).unwrap();
            assert_eq!(json, format!("\"{}\"", field.as_str()));
        }
    }
}
