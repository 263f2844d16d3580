// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Numeric precisions a network can be scored in.

use std::fmt;
use std::str::FromStr;

/// Enumerates the precisions a model graph can be built for.
///
/// The serialised and displayed form is the long name (`"float32"`,
/// `"float16"`), which is also what the benchmark log lines print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    /// 32-bit IEEE 754 floating point.
    Float32,
    /// 16-bit IEEE 754 floating point.
    Float16,
}

impl DType {
    /// Returns the size of a single element in bytes.
    pub fn size_bytes(self) -> usize {
        match self {
            DType::Float32 => 4,
            DType::Float16 => 2,
        }
    }

    /// Returns the label used in configuration files and log records.
    pub fn as_str(self) -> &'static str {
        match self {
            DType::Float32 => "float32",
            DType::Float16 => "float16",
        }
    }

    /// Parses a precision name, accepting common short forms
    /// (`"f32"`, `"fp16"`, `"half"`, ...).
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "float32" | "f32" | "fp32" | "float" => Some(Self::Float32),
            "float16" | "f16" | "fp16" | "half" => Some(Self::Float16),
            _ => None,
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_loose(s).ok_or_else(|| format!("unknown dtype '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(DType::Float32.to_string(), "float32");
        assert_eq!(DType::Float16.as_str(), "float16");
    }

    #[test]
    fn test_loose_parse() {
        assert_eq!("fp16".parse::<DType>().unwrap(), DType::Float16);
        assert_eq!("F32".parse::<DType>().unwrap(), DType::Float32);
        assert!("int8".parse::<DType>().is_err());
    }

    #[test]
    fn test_size_bytes() {
        assert_eq!(DType::Float32.size_bytes(), 4);
        assert_eq!(DType::Float16.size_bytes(), 2);
    }
}
