#![allow(dead_code)]
use menarche_classifiers::io::{parse_survey_table, MissingValuePolicy, SurveyTable};

pub const HEADER: &str = "Generation,Dietary_Pattern,Socioeconomic_Status,Environmental_Factors,Region,Industrialization_Level,Nutrition_Access,BMI,Urban_Upbringing,Menstrual_Onset_Age";

pub const AGES: [u32; 10] = [10, 11, 12, 13, 14, 15, 9, 16, 8, 17];

/// Ten respondents; early-onset rows lean Western/High/Urban.
pub fn survey_csv() -> String {
    let rows = [
        "Gen Z,Western,High,Urban,North,High,Good,23.4,yes",
        "Millennial,Western,Middle,Urban,East,High,Good,22.1,yes",
        "Gen Z,Mixed,High,Urban,South,Medium,Good,21.8,true",
        "Boomer,Traditional,Low,Rural,West,Low,Poor,19.0,no",
        "Millennial,Traditional,Low,Rural,North,Low,Moderate,18.7,no",
        "Boomer,Mixed,Middle,Suburban,South,Medium,Poor,20.2,false",
        "Gen Z,Western,High,Urban,West,High,Good,24.9,yes",
        "Boomer,Traditional,Low,Rural,East,Low,Poor,18.1,no",
        "Gen Z,Western,Middle,Urban,North,High,Good,25.5,yes",
        "Millennial,Traditional,Middle,Rural,West,Medium,Moderate,19.6,no",
    ];
    let mut text = String::from(HEADER);
    text.push('\n');
    for (row, age) in rows.iter().zip(AGES) {
        text.push_str(&format!("{},{}\n", row, age));
    }
    text
}

pub fn survey_table() -> SurveyTable {
    parse_survey_table(survey_csv().as_bytes(), b',', MissingValuePolicy::Reject)
        .expect("fixture table parses")
}
