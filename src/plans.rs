/// Coaching plans offered on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Plan {
    #[default]
    PlanOne,
    PlanTwo,
    PlanThree,
}

pub struct PlanDetails {
    pub name: &'static str,
    pub price: &'static str,
    pub tag: &'static str,
    pub features: &'static [&'static str],
    /// Marked "POPULAR" on the page
    pub highlight: bool,
}

impl Plan {
    pub const ALL: [Plan; 3] = [Plan::PlanOne, Plan::PlanTwo, Plan::PlanThree];

    /// Label used in the form and in the submitted payload
    pub fn label(self) -> &'static str {
        match self {
            Plan::PlanOne => "Plan One: ₹1500/mo",
            Plan::PlanTwo => "Plan Two: ₹2000/mo",
            Plan::PlanThree => "Plan Three: ₹3000/mo",
        }
    }

    pub fn details(self) -> PlanDetails {
        match self {
            Plan::PlanOne => PlanDetails {
                name: "Plan One",
                price: "₹1500/mo",
                tag: "Daily Exercise",
                features: &[
                    "Daily guided workouts",
                    "Weekly progress tracking",
                    "Form-correction videos",
                    "Community support",
                ],
                highlight: false,
            },
            Plan::PlanTwo => PlanDetails {
                name: "Plan Two",
                price: "₹2000/mo",
                tag: "Exercise + Diet Plan",
                features: &[
                    "Everything in Plan One",
                    "Personalized calorie target",
                    "Macro-balanced meal plan",
                    "Grocery list templates",
                ],
                highlight: true,
            },
            Plan::PlanThree => PlanDetails {
                name: "Plan Three",
                price: "₹3000/mo",
                tag: "Exercise + Diet + Weekly 1:1",
                features: &[
                    "Everything in Plan Two",
                    "Weekly one-on-one check-in",
                    "Habit coaching + accountability",
                    "Plateau-busting strategy calls",
                ],
                highlight: false,
            },
        }
    }

    pub fn next(self) -> Plan {
        match self {
            Plan::PlanOne => Plan::PlanTwo,
            Plan::PlanTwo => Plan::PlanThree,
            Plan::PlanThree => Plan::PlanOne,
        }
    }

    pub fn prev(self) -> Plan {
        match self {
            Plan::PlanOne => Plan::PlanThree,
            Plan::PlanTwo => Plan::PlanOne,
            Plan::PlanThree => Plan::PlanTwo,
        }
    }
}

/// Feature highlights shown under the plans
pub const HIGHLIGHTS: [(&str, &str); 3] = [
    (
        "Daily Guidance",
        "Follow short, effective workouts with perfect pacing and recovery.",
    ),
    (
        "Personalized Nutrition",
        "Meal plans and macros fit to your lifestyle, not the other way around.",
    ),
    (
        "Accountability",
        "Stay on track with weekly reviews, habit systems, and support.",
    ),
];
