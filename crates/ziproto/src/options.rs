//! Immutable encode/decode configuration records.
//!
//! Each mode group is a Rust enum, so "at most one flag per group" is a
//! type-system guarantee once a record exists. The bitmask constructors
//! reproduce the flag-based API of the original format and validate the
//! single-flag invariant at construction.

use crate::error::Error;

/// How the encoder resolves raw byte payloads of unknown semantic intent
/// ([`Value::Bin`](crate::Value::Bin)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrBinMode {
    /// Always encode as string; invalid UTF-8 fails the encode call.
    ForceStr,
    /// Always encode as binary.
    ForceBin,
    /// Encode as string when the bytes are valid UTF-8, binary otherwise.
    #[default]
    Detect,
}

/// How the encoder resolves the list-vs-dictionary ambiguity of
/// [`Value::Map`](crate::Value::Map).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArrMapMode {
    /// Encode the values only, as an array.
    ForceArr,
    /// Always encode as a map.
    ForceMap,
    /// Encode as an array when the keys are a dense 0-based integer run,
    /// as a map otherwise. An empty map encodes as an empty array.
    #[default]
    Detect,
}

/// Wire width for floating-point values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FloatMode {
    /// Emit every float as 4-byte IEEE-754 (narrowing f64 payloads).
    ForceFloat32,
    /// Emit every float as 8-byte IEEE-754 (widening f32 payloads).
    #[default]
    ForceFloat64,
}

/// How the decoder materializes unsigned integers above `i64::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BigintMode {
    /// Fail with [`Error::IntegerOverflow`] carrying the raw value.
    #[default]
    Error,
    /// Materialize as a decimal [`Value::Str`](crate::Value::Str).
    AsStr,
    /// Materialize as [`Value::UInt`](crate::Value::UInt).
    AsUnsigned,
}

/// Encode every ambiguous byte payload as a string.
pub const FORCE_STR: u32 = 0b0000_0001;
/// Encode every ambiguous byte payload as binary.
pub const FORCE_BIN: u32 = 0b0000_0010;
/// Infer string vs. binary from UTF-8 validity (default).
pub const DETECT_STR_BIN: u32 = 0b0000_0100;
/// Encode every map as an array of its values.
pub const FORCE_ARR: u32 = 0b0000_1000;
/// Encode every map as a map.
pub const FORCE_MAP: u32 = 0b0001_0000;
/// Infer array vs. map from the key shape (default).
pub const DETECT_ARR_MAP: u32 = 0b0010_0000;
/// Emit floats as 4-byte IEEE-754.
pub const FORCE_FLOAT32: u32 = 0b0100_0000;
/// Emit floats as 8-byte IEEE-754 (default).
pub const FORCE_FLOAT64: u32 = 0b1000_0000;

/// Decode oversized unsigned integers as decimal strings.
pub const BIGINT_AS_STR: u32 = 0b001;
/// Decode oversized unsigned integers as native unsigned values.
pub const BIGINT_AS_GMP: u32 = 0b010;
/// Fail on oversized unsigned integers (default).
pub const BIGINT_AS_EXCEPTION: u32 = 0b100;

/// Default nesting ceiling for both encode and decode.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Checks that at most one flag of a mutually exclusive group is set.
fn exclusive(mask: u32, group_mask: u32, group: &'static str, allowed: &'static str) -> Result<u32, Error> {
    let bits = mask & group_mask;
    if bits & bits.wrapping_sub(1) != 0 {
        return Err(Error::InvalidOption { group, allowed });
    }
    Ok(bits)
}

/// Immutable encoder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingOptions {
    pub str_bin: StrBinMode,
    pub arr_map: ArrMapMode,
    pub float: FloatMode,
    /// Nesting ceiling; exceeding it fails the encode call.
    pub max_depth: usize,
}

impl Default for EncodingOptions {
    fn default() -> Self {
        Self {
            str_bin: StrBinMode::default(),
            arr_map: ArrMapMode::default(),
            float: FloatMode::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl EncodingOptions {
    /// The documented default modes: detect str/bin, detect arr/map,
    /// force-float64.
    pub fn from_defaults() -> Self {
        Self::default()
    }

    /// Decomposes a bitmask into one mode per group, failing with
    /// [`Error::InvalidOption`] when a group carries more than one flag or
    /// the mask carries unknown bits.
    pub fn from_bitmask(mask: u32) -> Result<Self, Error> {
        const KNOWN: u32 = FORCE_STR
            | FORCE_BIN
            | DETECT_STR_BIN
            | FORCE_ARR
            | FORCE_MAP
            | DETECT_ARR_MAP
            | FORCE_FLOAT32
            | FORCE_FLOAT64;
        if mask & !KNOWN != 0 {
            return Err(Error::InvalidOption {
                group: "encoding",
                allowed: "FORCE_STR, FORCE_BIN, DETECT_STR_BIN, FORCE_ARR, FORCE_MAP, \
                          DETECT_ARR_MAP, FORCE_FLOAT32, FORCE_FLOAT64",
            });
        }

        let str_bin = match exclusive(
            mask,
            FORCE_STR | FORCE_BIN | DETECT_STR_BIN,
            "str/bin",
            "FORCE_STR, FORCE_BIN, DETECT_STR_BIN",
        )? {
            FORCE_STR => StrBinMode::ForceStr,
            FORCE_BIN => StrBinMode::ForceBin,
            _ => StrBinMode::Detect,
        };
        let arr_map = match exclusive(
            mask,
            FORCE_ARR | FORCE_MAP | DETECT_ARR_MAP,
            "arr/map",
            "FORCE_ARR, FORCE_MAP, DETECT_ARR_MAP",
        )? {
            FORCE_ARR => ArrMapMode::ForceArr,
            FORCE_MAP => ArrMapMode::ForceMap,
            _ => ArrMapMode::Detect,
        };
        let float = match exclusive(
            mask,
            FORCE_FLOAT32 | FORCE_FLOAT64,
            "float",
            "FORCE_FLOAT32, FORCE_FLOAT64",
        )? {
            FORCE_FLOAT32 => FloatMode::ForceFloat32,
            _ => FloatMode::ForceFloat64,
        };

        Ok(Self {
            str_bin,
            arr_map,
            float,
            max_depth: DEFAULT_MAX_DEPTH,
        })
    }

    /// Replaces the nesting ceiling.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn is_force_str(&self) -> bool {
        self.str_bin == StrBinMode::ForceStr
    }

    pub fn is_force_bin(&self) -> bool {
        self.str_bin == StrBinMode::ForceBin
    }

    pub fn is_detect_str_bin(&self) -> bool {
        self.str_bin == StrBinMode::Detect
    }

    pub fn is_force_arr(&self) -> bool {
        self.arr_map == ArrMapMode::ForceArr
    }

    pub fn is_force_map(&self) -> bool {
        self.arr_map == ArrMapMode::ForceMap
    }

    pub fn is_detect_arr_map(&self) -> bool {
        self.arr_map == ArrMapMode::Detect
    }

    pub fn is_force_float32(&self) -> bool {
        self.float == FloatMode::ForceFloat32
    }

    pub fn is_force_float64(&self) -> bool {
        self.float == FloatMode::ForceFloat64
    }
}

/// Immutable decoder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodingOptions {
    pub bigint: BigintMode,
    /// Nesting ceiling; exceeding it fails the decode call.
    pub max_depth: usize,
}

impl Default for DecodingOptions {
    fn default() -> Self {
        Self {
            bigint: BigintMode::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl DecodingOptions {
    /// The documented default mode: bigint-as-exception.
    pub fn from_defaults() -> Self {
        Self::default()
    }

    /// Decomposes a bitmask into the bigint mode, failing with
    /// [`Error::InvalidOption`] on conflicting or unknown flags.
    pub fn from_bitmask(mask: u32) -> Result<Self, Error> {
        const KNOWN: u32 = BIGINT_AS_STR | BIGINT_AS_GMP | BIGINT_AS_EXCEPTION;
        if mask & !KNOWN != 0 {
            return Err(Error::InvalidOption {
                group: "decoding",
                allowed: "BIGINT_AS_STR, BIGINT_AS_GMP, BIGINT_AS_EXCEPTION",
            });
        }

        let bigint = match exclusive(
            mask,
            KNOWN,
            "bigint",
            "BIGINT_AS_STR, BIGINT_AS_GMP, BIGINT_AS_EXCEPTION",
        )? {
            BIGINT_AS_STR => BigintMode::AsStr,
            BIGINT_AS_GMP => BigintMode::AsUnsigned,
            _ => BigintMode::Error,
        };

        Ok(Self {
            bigint,
            max_depth: DEFAULT_MAX_DEPTH,
        })
    }

    /// Replaces the nesting ceiling.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn is_bigint_as_str(&self) -> bool {
        self.bigint == BigintMode::AsStr
    }

    pub fn is_bigint_as_unsigned(&self) -> bool {
        self.bigint == BigintMode::AsUnsigned
    }

    pub fn is_bigint_as_exception(&self) -> bool {
        self.bigint == BigintMode::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let enc = EncodingOptions::from_defaults();
        assert!(enc.is_detect_str_bin());
        assert!(enc.is_detect_arr_map());
        assert!(enc.is_force_float64());
        assert_eq!(enc.max_depth, DEFAULT_MAX_DEPTH);

        let dec = DecodingOptions::from_defaults();
        assert!(dec.is_bigint_as_exception());
    }

    #[test]
    fn test_bitmask_selects_modes() {
        let enc = EncodingOptions::from_bitmask(FORCE_BIN | FORCE_MAP | FORCE_FLOAT32).unwrap();
        assert!(enc.is_force_bin());
        assert!(enc.is_force_map());
        assert!(enc.is_force_float32());
    }

    #[test]
    fn test_empty_mask_is_defaults() {
        assert_eq!(
            EncodingOptions::from_bitmask(0).unwrap(),
            EncodingOptions::from_defaults()
        );
        assert_eq!(
            DecodingOptions::from_bitmask(0).unwrap(),
            DecodingOptions::from_defaults()
        );
    }

    #[test]
    fn test_conflicting_str_bin_flags() {
        let err = EncodingOptions::from_bitmask(FORCE_STR | FORCE_BIN).unwrap_err();
        match err {
            Error::InvalidOption { group, allowed } => {
                assert_eq!(group, "str/bin");
                assert!(allowed.contains("FORCE_STR"));
                assert!(allowed.contains("DETECT_STR_BIN"));
            }
            other => panic!("expected InvalidOption, got {other:?}"),
        }
    }

    #[test]
    fn test_conflicting_float_flags() {
        assert!(matches!(
            EncodingOptions::from_bitmask(FORCE_FLOAT32 | FORCE_FLOAT64),
            Err(Error::InvalidOption { group: "float", .. })
        ));
    }

    #[test]
    fn test_unknown_bits_rejected() {
        assert!(EncodingOptions::from_bitmask(1 << 12).is_err());
        assert!(DecodingOptions::from_bitmask(1 << 12).is_err());
    }

    #[test]
    fn test_conflicting_bigint_flags() {
        assert!(matches!(
            DecodingOptions::from_bitmask(BIGINT_AS_STR | BIGINT_AS_GMP),
            Err(Error::InvalidOption { group: "bigint", .. })
        ));
        let dec = DecodingOptions::from_bitmask(BIGINT_AS_GMP).unwrap();
        assert!(dec.is_bigint_as_unsigned());
    }

    #[test]
    fn test_with_max_depth() {
        let enc = EncodingOptions::from_defaults().with_max_depth(4);
        assert_eq!(enc.max_depth, 4);
    }
}
