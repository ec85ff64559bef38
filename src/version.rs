// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the cloth segmentation node

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-garment-segmentation-2025-10-18";

/// Semantic version number
pub const VERSION_NUMBER: &str = "0.1.0";

/// Build date
pub const BUILD_DATE: &str = "2025-10-18";
