// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Placement values for internships created alongside intern accounts.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternshipsConfig {
	pub default_company: String,
	pub default_position: String,
	pub duration_days: u32,
}

impl Default for InternshipsConfig {
	fn default() -> Self {
		InternshipsConfigLayer::default().finalize()
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InternshipsConfigLayer {
	#[serde(default)]
	pub default_company: Option<String>,
	#[serde(default)]
	pub default_position: Option<String>,
	#[serde(default)]
	pub duration_days: Option<u32>,
}

impl InternshipsConfigLayer {
	pub fn merge(&mut self, other: InternshipsConfigLayer) {
		if other.default_company.is_some() {
			self.default_company = other.default_company;
		}
		if other.default_position.is_some() {
			self.default_position = other.default_position;
		}
		if other.duration_days.is_some() {
			self.duration_days = other.duration_days;
		}
	}

	pub fn finalize(self) -> InternshipsConfig {
		InternshipsConfig {
			default_company: self
				.default_company
				.unwrap_or_else(|| "Bridge Technologies Solutions".to_string()),
			default_position: self.default_position.unwrap_or_else(|| "Intern".to_string()),
			duration_days: self.duration_days.unwrap_or(180),
		}
	}
}
