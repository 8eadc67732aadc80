//! Built-in loan approval story.
//!
//! Counts are approval percentages per applicant group. The first section is
//! the title page and the last three carry closing copy; none of them chart.

use super::{Group, NarrativeSection, Story};

const LEAD_IN: usize = 1;
const TRAILING: usize = 3;

fn section(title: &str, groups: &[(&str, i32)]) -> NarrativeSection {
    NarrativeSection::new(
        title,
        groups
            .iter()
            .map(|&(name, count)| Group::new(name, count))
            .collect(),
    )
}

fn blank() -> NarrativeSection {
    section("", &[("", 0)])
}

/// The loan approval story, section by section.
pub fn loan_approval_story() -> Story {
    let sections = vec![
        blank(),
        section("Age", &[("15-29", 32), ("30-44", 87), ("45+", 63)]),
        section("Marital Status", &[("Single", 61), ("Married", 71)]),
        section("Gender", &[("Male", 69), ("Female", 61)]),
        section("Is Graduated", &[("Graduated", 62), ("Not Graduated", 62)]),
        section(
            "Education",
            &[("High School", 40), ("Bachelor's", 63), ("Master's/PhD", 90)],
        ),
        section(
            "Income",
            &[("High Income", 64), ("Medium Income", 63), ("Low Income", 63)],
        ),
        section(
            "Loan Amount",
            &[
                ("Low Loan Amount", 62),
                ("Medium Loan Amount", 65),
                ("High Loan Amount", 52),
            ],
        ),
        section(
            "Dependents",
            &[("No Dependents", 65), ("With Dependents", 62)],
        ),
        section(
            "CIBIL Score",
            &[
                ("750+ (Good)", 99),
                ("500-749 (Fair)", 80),
                ("<500 (Very Poor)", 11),
            ],
        ),
        section(
            "Employment Status",
            &[("Self-employed", 62), ("Not Self-employed", 62)],
        ),
        section(
            "Total Asset Value",
            &[("0M - 8.74M", 65), ("8.75M+", 99)],
        ),
        blank(),
        blank(),
        blank(),
    ];

    Story::new(sections).with_chart_window(LEAD_IN, TRAILING)
}

/// Narrative copy shown beside each section, indexed like the story.
pub fn section_copy(index: usize) -> (&'static str, &'static str) {
    match index {
        0 => (
            "Who Gets Approved?",
            "Over 40% of applicants at Imagine Financial Services are ineligible due to unknown criteria. This tool reveals the truth.",
        ),
        1 => (
            "Age",
            "Approval rates are particularly low between 15-29 years old, and loans are more likely to be approved for applicants aged 30-44.",
        ),
        2 => (
            "Marital Status",
            "Married applicants are approved more often than single applicants.",
        ),
        3 => (
            "Gender",
            "Male applicants see a slightly higher approval rate than female applicants.",
        ),
        4 => (
            "Is Graduated",
            "Graduating makes no difference on its own: both groups are approved at the same rate.",
        ),
        5 => (
            "Education",
            "Approval climbs steadily with education, peaking for Master's and PhD holders.",
        ),
        6 => (
            "Income",
            "Income bands barely separate: high, medium and low earners are approved at nearly the same rate.",
        ),
        7 => (
            "Loan Amount",
            "Larger requests are approved less often than small and medium ones.",
        ),
        8 => (
            "Dependents",
            "Applicants without dependents have a small edge.",
        ),
        9 => (
            "CIBIL Score",
            "Credit score is the strongest signal in the data: below 500, almost nobody is approved.",
        ),
        10 => (
            "Employment Status",
            "Self-employment does not change the odds.",
        ),
        11 => (
            "Total Asset Value",
            "Applicants holding 8.75M or more in assets are almost always approved.",
        ),
        12 => (
            "Meet the DSS",
            "Our Decision Support System analyzes over 10,000 profiles to give you a clear picture of your loan eligibility before you apply. 94% predictive accuracy, based on historical application data.",
        ),
        13 => (
            "What You'll Uncover",
            "Which factors matter, which do not, and where you stand before you apply.",
        ),
        14 => (
            "Data-Driven Decisions",
            "Loan eligibility is a complex story told by your age, income, credit behavior, and more. We use data to bring transparency and equity to lending.",
        ),
        _ => ("", ""),
    }
}
