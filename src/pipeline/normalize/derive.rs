use super::policy::UnknownExperiencePolicy;
use crate::constants::{LEAD_ENGINEER, PRINCIPAL_ENGINEER, SENIOR_DATA_ENGINEER, SYSTEM_ENGINEER};

/// `first_name` and `last_name` joined by a single space
pub fn full_name(first_name: &str, last_name: &str) -> String {
    format!("{} {}", first_name, last_name)
}

/// One experience band: values up to `upper` (inclusive when `inclusive`)
#[derive(Debug, Clone, PartialEq)]
pub struct DesignationBand {
    pub upper: f64,
    pub inclusive: bool,
    pub label: &'static str,
}

impl DesignationBand {
    fn contains(&self, years: f64) -> bool {
        years < self.upper || (self.inclusive && years == self.upper)
    }
}

/// Ordered bands evaluated top-down; the first band that contains the value wins.
/// The lowest band has no lower bound, so it also takes the minimum value.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignationBands {
    bands: Vec<DesignationBand>,
}

impl DesignationBands {
    /// Right-inclusive cut points at 3, 5 and 10 years
    pub fn standard() -> Self {
        Self {
            bands: vec![
                DesignationBand { upper: 3.0, inclusive: true, label: SYSTEM_ENGINEER },
                DesignationBand { upper: 5.0, inclusive: true, label: SENIOR_DATA_ENGINEER },
                DesignationBand { upper: 10.0, inclusive: true, label: LEAD_ENGINEER },
                DesignationBand { upper: f64::INFINITY, inclusive: true, label: PRINCIPAL_ENGINEER },
            ],
        }
    }

    /// Label for a known experience value; `None` for NaN
    pub fn label_for(&self, years: f64) -> Option<&'static str> {
        self.bands
            .iter()
            .find(|band| band.contains(years))
            .map(|band| band.label)
    }

    fn lowest(&self) -> &'static str {
        self.bands.first().map(|band| band.label).unwrap_or(SYSTEM_ENGINEER)
    }

    /// Designation for a row; unknown experience is settled by `policy`.
    /// The flag is false when the policy had to decide.
    pub fn assign(&self, years: Option<f64>, policy: &UnknownExperiencePolicy) -> (String, bool) {
        match years.and_then(|y| self.label_for(y)) {
            Some(label) => (label.to_string(), true),
            None => {
                let label = match policy {
                    UnknownExperiencePolicy::LowestBand => self.lowest().to_string(),
                    UnknownExperiencePolicy::Label(label) => label.clone(),
                };
                (label, false)
            }
        }
    }
}

impl Default for DesignationBands {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name() {
        assert_eq!(full_name("John", "Doe"), "John Doe");
        assert_eq!(full_name("Alice", "Missing"), "Alice Missing");
    }

    #[test]
    fn test_boundaries_are_right_inclusive() {
        let bands = DesignationBands::standard();
        let cases = [
            (0.0, SYSTEM_ENGINEER),
            (2.9, SYSTEM_ENGINEER),
            (3.0, SYSTEM_ENGINEER),
            (3.1, SENIOR_DATA_ENGINEER),
            (4.9, SENIOR_DATA_ENGINEER),
            (5.0, SENIOR_DATA_ENGINEER),
            (5.1, LEAD_ENGINEER),
            (9.9, LEAD_ENGINEER),
            (10.0, LEAD_ENGINEER),
            (10.1, PRINCIPAL_ENGINEER),
            (40.0, PRINCIPAL_ENGINEER),
        ];

        for (years, expected) in cases {
            assert_eq!(bands.label_for(years), Some(expected), "years = {}", years);
        }
    }

    #[test]
    fn test_negative_experience_lands_in_lowest_band() {
        assert_eq!(DesignationBands::standard().label_for(-1.0), Some(SYSTEM_ENGINEER));
    }

    #[test]
    fn test_unknown_experience_follows_policy() {
        let bands = DesignationBands::standard();

        let (label, known) = bands.assign(None, &UnknownExperiencePolicy::LowestBand);
        assert_eq!(label, SYSTEM_ENGINEER);
        assert!(!known);

        let policy = UnknownExperiencePolicy::Label("Unassigned".to_string());
        let (label, known) = bands.assign(Some(f64::NAN), &policy);
        assert_eq!(label, "Unassigned");
        assert!(!known);

        let (label, known) = bands.assign(Some(15.0), &policy);
        assert_eq!(label, PRINCIPAL_ENGINEER);
        assert!(known);
    }
}
