//! Advice shown to the tourist for an overall risk score

const HIGH_RISK: [&str; 4] = [
    "Consider leaving this area immediately",
    "Stay in groups and avoid isolated areas",
    "Keep emergency contacts readily available",
    "Inform someone about your whereabouts",
];

const ELEVATED_RISK: [&str; 4] = [
    "Exercise increased caution",
    "Avoid displaying valuable items",
    "Stay in well-lit, populated areas",
    "Keep your phone charged",
];

const LOW_RISK: [&str; 3] = [
    "Area appears safe for tourists",
    "Continue normal precautions",
    "Enjoy your visit responsibly",
];

pub fn recommendations(overall: f64) -> &'static [&'static str] {
    if overall >= 8.0 {
        &HIGH_RISK
    } else if overall >= 5.0 {
        &ELEVATED_RISK
    } else {
        &LOW_RISK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds() {
        assert_eq!(recommendations(8.0)[0], "Consider leaving this area immediately");
        assert_eq!(recommendations(7.99)[0], "Exercise increased caution");
        assert_eq!(recommendations(5.0).len(), 4);
        assert_eq!(recommendations(4.99), &LOW_RISK);
    }
}
