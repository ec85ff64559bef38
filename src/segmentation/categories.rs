// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Garment categories exposed by the `/segment/{category}` routes and the
//! classes each one keeps.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::class_map::{ClassIndex, ClassSelection, FULL_BODY, LOWER_BODY, UPPER_BODY};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown garment category '{0}'")]
pub struct UnknownCategory(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GarmentCategory {
    Top,
    Bottom,
    Skirt,
    Coord,
    Kurta,
    Lehenga,
}

impl GarmentCategory {
    pub const ALL: [GarmentCategory; 6] = [
        GarmentCategory::Top,
        GarmentCategory::Bottom,
        GarmentCategory::Skirt,
        GarmentCategory::Coord,
        GarmentCategory::Kurta,
        GarmentCategory::Lehenga,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GarmentCategory::Top => "top",
            GarmentCategory::Bottom => "bottom",
            GarmentCategory::Skirt => "skirt",
            GarmentCategory::Coord => "coord",
            GarmentCategory::Kurta => "kurta",
            GarmentCategory::Lehenga => "lehenga",
        }
    }

    /// Classes kept for this category, in ascending order
    pub fn classes(self) -> &'static [ClassIndex] {
        match self {
            GarmentCategory::Top => &[UPPER_BODY],
            GarmentCategory::Bottom => &[LOWER_BODY],
            GarmentCategory::Skirt => &[LOWER_BODY, FULL_BODY],
            GarmentCategory::Coord => &[UPPER_BODY, LOWER_BODY],
            GarmentCategory::Kurta => &[FULL_BODY],
            GarmentCategory::Lehenga => &[UPPER_BODY, FULL_BODY],
        }
    }

    pub fn selection(self) -> ClassSelection {
        ClassSelection::from(self.classes())
    }
}

impl FromStr for GarmentCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GarmentCategory::ALL
            .into_iter()
            .find(|category| category.name() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

impl fmt::Display for GarmentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One row of the category table served at `/segment/categories`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub name: String,
    pub classes: Vec<ClassIndex>,
}

pub fn category_table() -> Vec<CategoryInfo> {
    GarmentCategory::ALL
        .into_iter()
        .map(|category| CategoryInfo {
            name: category.name().to_string(),
            classes: category.classes().to_vec(),
        })
        .collect()
}
