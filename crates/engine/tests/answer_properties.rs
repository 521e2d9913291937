use proptest::prelude::*;
use samarth_engine::analysis::trend_of;
use samarth_engine::payload::{Payload, TrendDirection};
use samarth_engine::types::YearValue;
use samarth_engine::{DatasetKind, QueryEngine, QueryType, RawBatch, RawRecord, Vocabulary};
use serde_json::json;
use std::collections::BTreeSet;

const CROP_ID: &str = "9ef84268-d588-465a-a308-a864a43d0070";
const RAIN_ID: &str = "b4c3e882-15d4-4a2e-89e0-ff56f19e9f88";

fn engine() -> QueryEngine {
    QueryEngine::with_defaults().unwrap()
}

fn records(value: serde_json::Value) -> Vec<RawRecord> {
    serde_json::from_value(value).unwrap()
}

/// Crop rows in the district-level shape.
fn crop_batch() -> RawBatch {
    let mut rows = Vec::new();
    for (state, district, crop, base) in [
        ("Punjab", "Amritsar", "Rice", 400.0),
        ("Punjab", "Ludhiana", "Rice", 800.0),
        ("Punjab", "Ludhiana", "Wheat", 1200.0),
        ("Haryana", "Karnal", "Rice", 600.0),
        ("Haryana", "Sirsa", "Cotton", 300.0),
        ("Maharashtra", "Nashik", "Jowar", 500.0),
        ("Maharashtra", "Pune", "Sugarcane", 900.0),
        ("Maharashtra", "Solapur", "Bajra", 250.0),
    ] {
        for (i, year) in (2019..=2023).enumerate() {
            rows.push(json!({
                "State_Name": state,
                "District_Name": district,
                "Crop": crop,
                "Crop_Year": year,
                "Production": base + 25.0 * i as f64,
            }));
        }
    }
    RawBatch::new(
        DatasetKind::Crop,
        "District-wise Crop Production Statistics",
        CROP_ID,
        records(serde_json::Value::Array(rows)),
    )
}

/// Rainfall rows in the subdivision shape, with fiscal-year strings.
fn rainfall_batch() -> RawBatch {
    let mut rows = Vec::new();
    for (state, base) in [("PUNJAB", 600.0), ("haryana", 520.0), ("Maharashtra", 1100.0)] {
        for (i, year) in (2019..=2023).enumerate() {
            rows.push(json!({
                "SUBDIVISION": state,
                "YEAR": format!("{}-{}", year, (year + 1) % 100),
                "ANNUAL": base + 10.0 * i as f64,
            }));
        }
    }
    RawBatch::new(
        DatasetKind::Rainfall,
        "IMD Sub-divisional Rainfall",
        RAIN_ID,
        records(serde_json::Value::Array(rows)),
    )
}

fn ask(question: &str) -> samarth_engine::Answer {
    engine().answer(question, &[crop_batch()], &[rainfall_batch()])
}

#[test]
fn test_every_alias_maps_to_one_canonical_state() {
    let vocab = Vocabulary::default();
    for (alias, canonical) in &vocab.state_aliases {
        assert_eq!(&vocab.canonical_state(alias), canonical, "alias {}", alias);
        assert_eq!(&vocab.canonical_state(canonical), canonical);
    }
    for state in &vocab.states {
        assert_eq!(&vocab.canonical_state(state), state);
    }
}

#[test]
fn test_rainfall_comparison_end_to_end() {
    let answer = ask("Compare the average annual rainfall in Punjab and Haryana for the last 3 years and list the top 2 crops");

    assert_eq!(answer.bundle.query_type, QueryType::RainfallComparison);
    let Payload::RainfallComparison(table) = &answer.bundle.payload else {
        panic!("unexpected payload");
    };
    assert_eq!(table.states.len(), 2);
    assert_eq!(table.states[0].years, vec![2021, 2022, 2023]);
    // Punjab rainfall 620, 630, 640.
    assert_eq!(table.states[0].mean_rainfall_mm, Some(630.0));
    // Rice (Amritsar + Ludhiana) 4,050 outweighs Wheat 3,825 over 2021-2023.
    assert_eq!(table.states[0].top_crops[0].crop, "Rice");
    assert_eq!(table.states[0].top_crops.len(), 2);
    assert!(answer.formatted_text.contains("630.00"));
}

#[test]
fn test_district_ranking_end_to_end() {
    let answer = ask(
        "Identify the district in Punjab with the highest production of Rice in the most recent year \
         and compare that with the district with the lowest production of Rice in Haryana",
    );

    assert_eq!(answer.bundle.query_type, QueryType::DistrictRanking);
    let Payload::DistrictRanking(ranking) = &answer.bundle.payload else {
        panic!("unexpected payload");
    };
    assert_eq!(ranking.years, vec![2023]);
    assert_eq!(ranking.groups[0].highest.as_ref().unwrap().district, "Ludhiana");
    assert_eq!(ranking.groups[1].lowest.as_ref().unwrap().district, "Karnal");
}

#[test]
fn test_district_ranking_minimal_rows() {
    let crop = RawBatch::new(
        DatasetKind::Crop,
        "Crop Production",
        CROP_ID,
        records(json!([
            { "state": "Punjab", "district": "Amritsar", "crop": "Rice", "year": 2023, "production": 500 },
            { "state": "Punjab", "district": "Ludhiana", "crop": "Rice", "year": 2023, "production": 900 }
        ])),
    );
    let answer = engine().answer("Which district in Punjab has the highest Rice production?", &[crop], &[]);

    let Payload::DistrictRanking(ranking) = &answer.bundle.payload else {
        panic!("unexpected payload");
    };
    assert_eq!(ranking.years, vec![2023]);
    assert_eq!(ranking.groups[0].highest.as_ref().unwrap().district, "Ludhiana");
    assert_eq!(ranking.groups[0].lowest.as_ref().unwrap().district, "Amritsar");
}

#[test]
fn test_trend_two_point_series() {
    let up = trend_of(&[
        YearValue { year: 2022, value: 100.0 },
        YearValue { year: 2023, value: 150.0 },
    ])
    .unwrap();
    assert_eq!(up.direction, TrendDirection::Increasing);
    assert_eq!(up.percent_change, Some(50.0));

    let to_zero = trend_of(&[
        YearValue { year: 2022, value: 100.0 },
        YearValue { year: 2023, value: 0.0 },
    ])
    .unwrap();
    assert_eq!(to_zero.percent_change, None);
}

#[test]
fn test_trend_end_to_end_reports_undefined_change() {
    let crop = RawBatch::new(
        DatasetKind::Crop,
        "Crop Production",
        CROP_ID,
        records(json!([
            { "state": "Bihar", "crop": "Maize", "year": 2022, "production": 100 },
            { "state": "Bihar", "crop": "Maize", "year": 2023, "production": 0 }
        ])),
    );
    let answer = engine().answer("Show the production trend of Maize in Bihar", &[crop], &[]);
    assert_eq!(answer.bundle.query_type, QueryType::TrendAnalysis);
    assert!(answer.formatted_text.contains("decreasing"));
    assert!(answer.formatted_text.contains("change: undefined"));
}

#[test]
fn test_policy_without_category_crops() {
    let answer = ask("What policy arguments support promoting drought-resistant crops in Punjab?");

    assert_eq!(answer.bundle.query_type, QueryType::PolicySupport);
    let Payload::PolicySupport(brief) = &answer.bundle.payload else {
        panic!("unexpected payload");
    };
    assert!(brief.arguments.len() < 3);
    assert!(brief.notes.iter().any(|n| n.contains("No drought-resistant crops")));
}

#[test]
fn test_policy_full_brief() {
    let answer = ask("Give three arguments to promote drought-resistant crops in Maharashtra");
    let Payload::PolicySupport(brief) = &answer.bundle.payload else {
        panic!("unexpected payload");
    };
    assert_eq!(brief.arguments.len(), 3);
    assert!(answer.formatted_text.contains("### 1. Rainfall profile"));
}

#[test]
fn test_citations_back_every_answer() {
    let input_ids: BTreeSet<&str> = [CROP_ID, RAIN_ID].into_iter().collect();
    for question in [
        "Compare rainfall in Punjab and Haryana",
        "Which district in Haryana has the lowest Rice production?",
        "Analyze the trend of Wheat production in Punjab over the last decade",
        "Arguments to promote drought-resistant crops in Maharashtra",
        "Tell me about Cotton in Haryana",
    ] {
        let answer = ask(question);
        assert!(!answer.bundle.citations.is_empty(), "no citations for {}", question);
        for citation in &answer.bundle.citations {
            assert!(input_ids.contains(citation.dataset_id.as_str()));
        }
        assert!(answer.formatted_text.contains("### Sources"));
    }
}

#[test]
fn test_general_scope_names_entities_without_data() {
    let wheat = RawBatch::new(
        DatasetKind::Crop,
        "Crop Production",
        CROP_ID,
        records(json!([{ "state": "Punjab", "crop": "Wheat", "year": 2022, "production": 700 }])),
    );
    let answer = engine().answer("Tell me about Rice in Goa", &[wheat], &[]);

    assert_eq!(answer.bundle.query_type, QueryType::General);
    assert!(answer.formatted_text.contains("**Question scope:** states: Goa; crops: Rice;"));
    assert_eq!(answer.bundle.data_points, 0);
}

fn state_rice_batch() -> RawBatch {
    RawBatch::new(
        DatasetKind::Crop,
        "Crop Production",
        CROP_ID,
        records(json!([
            { "state": "Punjab", "crop": "Rice", "year": 2022, "production": 900 },
            { "state": "Haryana", "crop": "Rice", "year": 2022, "production": 500 },
            { "state": "Bihar", "crop": "Rice", "year": 2022, "production": 100 }
        ])),
    )
}

#[test]
fn test_state_ranking_lowest_with_top_n() {
    let answer = engine().answer(
        "Which state has the lowest Rice production? List the top 2 states",
        &[state_rice_batch()],
        &[],
    );

    assert_eq!(answer.bundle.query_type, QueryType::StateRanking);
    let Payload::StateRanking(ranking) = &answer.bundle.payload else {
        panic!("unexpected payload");
    };
    let states: Vec<&str> = ranking.states.iter().map(|s| s.state.as_str()).collect();
    assert_eq!(states, vec!["Bihar", "Haryana"]);
    assert!(answer.formatted_text.contains("1. Bihar: 100.00 tonnes"));
    assert!(answer.bundle.citations.iter().all(|c| c.dataset_id == CROP_ID));
}

#[test]
fn test_state_ranking_highest() {
    let answer = engine().answer("Which state produces the most Rice?", &[state_rice_batch()], &[]);

    let Payload::StateRanking(ranking) = &answer.bundle.payload else {
        panic!("unexpected payload");
    };
    assert_eq!(ranking.states[0].state, "Punjab");
    assert_eq!(ranking.states.len(), 3);
}

#[test]
fn test_imd_combined_subdivisions_join_crop_rows() {
    let rain = RawBatch::new(
        DatasetKind::Rainfall,
        "IMD Sub-divisional Rainfall",
        RAIN_ID,
        records(json!([
            { "SUBDIVISION": "PUNJAB AND CHANDIGARH", "YEAR": 2023, "ANNUAL": 600 },
            { "SUBDIVISION": "HARYANA DELHI & CHANDIGARH", "YEAR": 2023, "ANNUAL": 500 }
        ])),
    );
    let answer = engine().answer("Compare rainfall in Punjab and Haryana", &[crop_batch()], &[rain]);

    let Payload::RainfallComparison(table) = &answer.bundle.payload else {
        panic!("unexpected payload");
    };
    assert_eq!(table.states[0].mean_rainfall_mm, Some(600.0));
    assert_eq!(table.states[1].mean_rainfall_mm, Some(500.0));
}

#[test]
fn test_empty_question_is_answered() {
    let answer = ask("");
    assert_eq!(answer.bundle.query_type, QueryType::General);
    assert!(answer.bundle.citations.is_empty());
    assert!(answer.formatted_text.contains("Try asking:"));
    assert!(answer.formatted_text.contains("states: none recognised"));
}

#[test]
fn test_answer_is_deterministic() {
    let question = "Compare rainfall in Maharashtra and Punjab for the last 5 years";
    let first = ask(question);
    let second = ask(question);
    assert_eq!(first.formatted_text, second.formatted_text);
    assert_eq!(first.bundle, second.bundle);
}

fn mixed_case(text: &str, mask: &[bool]) -> String {
    text.chars()
        .zip(mask.iter().cycle())
        .map(|(c, upper)| if *upper { c.to_ascii_uppercase() } else { c })
        .collect()
}

const STATES: [&str; 10] = [
    "Punjab",
    "Haryana",
    "Kerala",
    "Karnataka",
    "Tamil Nadu",
    "West Bengal",
    "Uttar Pradesh",
    "Odisha",
    "Bihar",
    "Gujarat",
];

proptest! {
    #[test]
    fn prop_alias_normalization_is_idempotent(
        index in 0usize..50,
        mask in proptest::collection::vec(any::<bool>(), 1..8),
        pad in "[ \t]{0,3}",
    ) {
        let vocab = Vocabulary::default();
        let (alias, canonical) = vocab.state_aliases.iter().nth(index % vocab.state_aliases.len()).unwrap();
        let raw = format!("{}{}{}", pad, mixed_case(alias, &mask), pad);

        let once = vocab.canonical_state(&raw);
        prop_assert_eq!(&once, canonical);
        prop_assert_eq!(vocab.canonical_state(&once), once.clone());
    }

    #[test]
    fn prop_two_states_with_keyword_compare_rainfall(
        a in 0usize..STATES.len(),
        offset in 1usize..STATES.len(),
        template in 0usize..3,
    ) {
        let first = STATES[a];
        let second = STATES[(a + offset) % STATES.len()];
        let question = match template {
            0 => format!("Compare {} and {}", first, second),
            1 => format!("What was the rainfall in {} and {}?", first, second),
            _ => format!("compare annual rainfall of {} vs {} in 2020", first, second),
        };

        let intent = engine().understand(&question);
        prop_assert_eq!(intent.query_type(), QueryType::RainfallComparison);
        prop_assert_eq!(intent.entities().states.clone(), vec![first.to_string(), second.to_string()]);
    }

    #[test]
    fn prop_any_question_gets_an_answer(question in ".{0,80}") {
        let answer = engine().answer(&question, &[], &[]);
        prop_assert!(answer.formatted_text.contains("### Sources"));
    }
}
