// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Per-pixel class predictions and the set of classes kept as foreground

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::error::SegmentationError;

/// Semantic class predicted for a single pixel
pub type ClassIndex = u32;

/// Class indices produced by the cloth segmentation network
pub const BACKGROUND: ClassIndex = 0;
pub const UPPER_BODY: ClassIndex = 1;
pub const LOWER_BODY: ClassIndex = 2;
pub const FULL_BODY: ClassIndex = 3;

/// Row-major grid of class indices at the model's working resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassIndexMap {
    width: u32,
    height: u32,
    data: Vec<ClassIndex>,
}

impl ClassIndexMap {
    pub fn new(width: u32, height: u32, data: Vec<ClassIndex>) -> Result<Self, SegmentationError> {
        if width == 0 || height == 0 {
            return Err(SegmentationError::InvalidClassMap(format!(
                "dimensions must be non-zero (got {}x{})",
                width, height
            )));
        }

        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(SegmentationError::InvalidClassMap(format!(
                "expected {} entries for {}x{}, got {}",
                expected,
                width,
                height,
                data.len()
            )));
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Map where every pixel carries the same class
    pub fn filled(width: u32, height: u32, class: ClassIndex) -> Result<Self, SegmentationError> {
        Self::new(width, height, vec![class; width as usize * height as usize])
    }

    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Result<Self, SegmentationError>
    where
        F: FnMut(u32, u32) -> ClassIndex,
    {
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self::new(width, height, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn get(&self, x: u32, y: u32) -> Option<ClassIndex> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    pub fn as_slice(&self) -> &[ClassIndex] {
        &self.data
    }

    /// Distinct classes that appear anywhere in the map
    pub fn classes_present(&self) -> BTreeSet<ClassIndex> {
        self.data.iter().copied().collect()
    }
}

/// Sorted, de-duplicated set of classes treated as foreground.
///
/// An empty selection is valid and keeps nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<ClassIndex>", into = "Vec<ClassIndex>")]
pub struct ClassSelection(Vec<ClassIndex>);

impl ClassSelection {
    pub fn new(classes: impl IntoIterator<Item = ClassIndex>) -> Self {
        let mut classes: Vec<ClassIndex> = classes.into_iter().collect();
        classes.sort_unstable();
        classes.dedup();
        Self(classes)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn contains(&self, class: ClassIndex) -> bool {
        self.0.binary_search(&class).is_ok()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[ClassIndex] {
        &self.0
    }
}

impl FromIterator<ClassIndex> for ClassSelection {
    fn from_iter<I: IntoIterator<Item = ClassIndex>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl From<&[ClassIndex]> for ClassSelection {
    fn from(classes: &[ClassIndex]) -> Self {
        Self::new(classes.iter().copied())
    }
}

impl From<Vec<ClassIndex>> for ClassSelection {
    fn from(classes: Vec<ClassIndex>) -> Self {
        Self::new(classes)
    }
}

impl From<ClassSelection> for Vec<ClassIndex> {
    fn from(selection: ClassSelection) -> Self {
        selection.0
    }
}

impl FromStr for ClassSelection {
    type Err = String;

    /// Parses a comma-separated list such as `1,3`. An empty string is the
    /// empty selection.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<ClassIndex>()
                    .map_err(|e| format!("invalid class index '{}': {}", part, e))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }
}

impl fmt::Display for ClassSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}
