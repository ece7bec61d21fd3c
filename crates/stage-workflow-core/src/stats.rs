// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Aggregate statistics over evaluations.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::evaluation::{round1, Evaluation};

/// Score bands, lower bound inclusive.
pub const SCORE_BANDS: [(&str, f64, f64); 5] = [
	("<10", f64::NEG_INFINITY, 10.0),
	("10-12", 10.0, 12.0),
	("12-14", 12.0, 14.0),
	("14-16", 14.0, 16.0),
	(">=16", 16.0, f64::INFINITY),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationStats {
	pub total: usize,
	/// Mean overall score among evaluations with a positive score.
	pub average_score: Option<f64>,
	pub by_status: BTreeMap<String, usize>,
	pub by_type: BTreeMap<String, usize>,
	/// Counts per score band, over evaluations with a positive score.
	pub distribution: BTreeMap<String, usize>,
}

impl EvaluationStats {
	pub fn compute(evaluations: &[Evaluation]) -> Self {
		let mut by_status = BTreeMap::new();
		let mut by_type = BTreeMap::new();
		let mut distribution: BTreeMap<String, usize> =
			SCORE_BANDS.iter().map(|(name, _, _)| (name.to_string(), 0)).collect();

		let mut scored = 0usize;
		let mut sum = 0.0;

		for evaluation in evaluations {
			*by_status.entry(evaluation.status.to_string()).or_insert(0) += 1;
			*by_type.entry(evaluation.evaluation_type.to_string()).or_insert(0) += 1;

			let score = evaluation.overall_score;
			if score > 0.0 {
				scored += 1;
				sum += score;
				if let Some((band, _, _)) = SCORE_BANDS
					.iter()
					.find(|(_, low, high)| score >= *low && score < *high)
				{
					*distribution.entry(band.to_string()).or_insert(0) += 1;
				}
			}
		}

		Self {
			total: evaluations.len(),
			average_score: (scored > 0).then(|| round1(sum / scored as f64)),
			by_status,
			by_type,
			distribution,
		}
	}
}
