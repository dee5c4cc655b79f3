// ABOUTME: Criterion benchmarks for the deterministic analysis stages
// ABOUTME: Measures label parsing, normalization, merging and scoring latency
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Criterion benchmarks for label parsing and health scoring.
//!
//! Covers the pure stages only; collaborator I/O is excluded.

#![allow(
    clippy::missing_docs_in_private_items,
    clippy::unwrap_used,
    missing_docs
)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use foodscore::pipeline::ManualEntry;
use foodscore_intelligence::{merge, normalize, parse_label, score_with_config, ScoringConfig};

const US_LABEL: &str = "\
Crunchy Oat Clusters
Nutrition Facts
Serving Size 2/3 cup (55g) Servings Per Container 8
Calories 230
Total Fat 8g
Saturated Fat 1g
Trans Fat 0g
Cholesterol 0mg
Sodium 160mg
Total Carbohydrate 37g
Dietary Fiber 4g
Total Sugars 12g
Includes 10g Added Sugars
Protein 3g
Ingredients: Whole grain oats, sugar, canola oil, rice flour, honey, salt, natural flavor, mixed tocopherols (to preserve freshness).
";

const EU_LABEL: &str = "\
Sparkling Orange
Nutrition information per 100ml
Energy 180 kJ / 43 kcal
Fat 0 g
of which saturates 0 g
Carbohydrate 10,5 g
of which sugars 10,5 g
Protein 0 g
Salt 0,02 g
Ingredients: Carbonated water, sugar, orange juice from concentrate (5%), citric acid, preservative (potassium sorbate), colour (paprika extract).
";

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_label");
    for (name, text) in [("us_panel", US_LABEL), ("eu_panel", EU_LABEL)] {
        group.bench_with_input(BenchmarkId::from_parameter(name), text, |b, text| {
            b.iter(|| parse_label(black_box(text)));
        });
    }
    group.finish();
}

fn bench_score_product(c: &mut Criterion) {
    let config = ScoringConfig::default();
    let mut group = c.benchmark_group("score_product");

    for (name, text) in [("us_panel", US_LABEL), ("eu_panel", EU_LABEL)] {
        group.bench_with_input(BenchmarkId::from_parameter(name), text, |b, text| {
            b.iter(|| {
                let mut fragment = parse_label(black_box(text)).into_fragment();
                let outcome = normalize(&fragment.nutrition, fragment.serving_size.as_deref());
                fragment.nutrition = outcome.record;
                let merged = merge(vec![fragment], None);
                score_with_config(
                    &merged.product.nutrition,
                    &merged.product.ingredients,
                    None,
                    &config,
                )
            });
        });
    }

    let entry: ManualEntry = serde_json::from_str(
        r#"{"nutrition": {"dietary_fiber": 7, "added_sugars": 2, "sodium": 681, "protein": 13.4},
            "ingredients": ["Whole wheat flour", "Water", "Yeast", "Salt"]}"#,
    )
    .unwrap();
    group.bench_function("manual_entry", |b| {
        b.iter(|| {
            let (fragment, _) = black_box(entry.clone()).into_fragment();
            let merged = merge(vec![fragment], None);
            score_with_config(
                &merged.product.nutrition,
                &merged.product.ingredients,
                None,
                &config,
            )
        });
    });

    group.finish();
}

criterion_group!(benches, bench_parse, bench_score_product);
criterion_main!(benches);
