use std::{cmp, fmt, ops, str};

use thiserror::Error;

use crate::timestamp::{self, InvalidFormat};

/// Represents a time-ordered unique identifier.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct Tuid([u8; 16]);

impl Tuid {
    /// Nil identifier (00000000-0000-0000-0000-000000000000)
    pub const NIL: Self = Self([0x00; 16]);

    /// Max identifier (ffffffff-ffff-ffff-ffff-ffffffffffff)
    pub const MAX: Self = Self([0xff; 16]);

    /// Returns a reference to the underlying byte array.
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Creates an identifier byte array from time-based field values.
    ///
    /// `ticks` counts 100-nanosecond units since the identifier epoch and fills the 60-bit
    /// timestamp field; `clock_seq` fills the 14-bit clock sequence field; `node` fills the
    /// 48-bit node field verbatim. The version and variant markers are overlaid on top.
    ///
    /// # Panics
    ///
    /// Panics if a field value overflows its bit width.
    pub const fn from_fields_v1(ticks: u64, clock_seq: u16, node: u64) -> Self {
        if ticks >= 1 << 60 || clock_seq >= 1 << 14 || node >= 1 << 48 {
            panic!("invalid field value");
        }

        Self([
            (ticks >> 24) as u8,
            (ticks >> 16) as u8,
            (ticks >> 8) as u8,
            ticks as u8,
            (ticks >> 40) as u8,
            (ticks >> 32) as u8,
            0x10 | (ticks >> 56) as u8,
            (ticks >> 48) as u8,
            0x80 | (clock_seq >> 8) as u8,
            clock_seq as u8,
            (node >> 40) as u8,
            (node >> 32) as u8,
            (node >> 24) as u8,
            (node >> 16) as u8,
            (node >> 8) as u8,
            node as u8,
        ])
    }

    /// Returns the variant field value.
    pub const fn variant(&self) -> Variant {
        match self.0[8] >> 5 {
            0b000..=0b011 => Variant::Var0,
            0b100 | 0b101 => Variant::Var10,
            0b110 => Variant::Var110,
            _ => Variant::Var111,
        }
    }

    /// Returns the version number if the variant is [`Variant::Var10`], or `None` otherwise.
    pub const fn version(&self) -> Option<u8> {
        match self.variant() {
            Variant::Var10 => Some(self.0[6] >> 4),
            _ => None,
        }
    }

    /// Returns the 60-bit timestamp field: the number of 100-nanosecond ticks since the
    /// identifier epoch.
    ///
    /// Fails with [`InvalidFormat`] if `self` does not carry the version 1 marker.
    pub fn timestamp(&self) -> Result<u64, InvalidFormat> {
        if self.version() != Some(1) {
            return Err(InvalidFormat::NotTimeBased);
        }

        let time_low = u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]]) as u64;
        let time_mid = u16::from_be_bytes([self.0[4], self.0[5]]) as u64;
        let time_high = ((self.0[6] & 0x0f) as u64) << 8 | self.0[7] as u64;
        Ok(time_high << 48 | time_mid << 32 | time_low)
    }

    /// Extracts the embedded timestamp as Unix-epoch milliseconds.
    ///
    /// Fails with [`InvalidFormat`] if `self` does not carry the version 1 marker.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tuid::Tuid;
    ///
    /// let x = "599c6000-918e-11f1-ae81-9d27b10ef5d3".parse::<Tuid>()?;
    /// assert_eq!(x.to_unix_millis(), Ok(1_786_017_600_000));
    /// # Ok::<(), tuid::ParseError>(())
    /// ```
    pub fn to_unix_millis(&self) -> Result<i64, InvalidFormat> {
        timestamp::to_unix_millis(self.timestamp()?)
    }

    /// Compares two identifiers chronologically, forming a total order usable directly as a
    /// sort key function.
    ///
    /// When both operands carry the version 1 marker, they are ordered by the timestamp
    /// field, with ties broken by the full low 64 bits as an unsigned integer; same-timestamp
    /// identifiers therefore group by clock sequence and node rather than by issuance order.
    /// When either operand carries a different version, both fall back to plain unsigned
    /// 128-bit comparison.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tuid::{Tuid, V1Generator};
    ///
    /// let g = V1Generator::new();
    /// let mut ids: Vec<Tuid> = (0..4).map(|_| g.generate()).collect();
    /// ids.reverse();
    /// ids.sort_by(Tuid::cmp_time_ordered);
    /// ```
    pub fn cmp_time_ordered(&self, other: &Self) -> cmp::Ordering {
        match (self.timestamp(), other.timestamp()) {
            (Ok(a), Ok(b)) => a.cmp(&b).then_with(|| self.lsb().cmp(&other.lsb())),
            _ => u128::from(*self).cmp(&u128::from(*other)),
        }
    }

    /// Returns the low 64 bits (variant, clock sequence, and node fields).
    fn lsb(&self) -> u64 {
        u64::from_be_bytes([
            self.0[8], self.0[9], self.0[10], self.0[11], self.0[12], self.0[13], self.0[14],
            self.0[15],
        ])
    }

    /// Returns the 8-4-4-4-12 hexadecimal string representation stored in a stack-allocated
    /// structure that can be dereferenced as `str` and [`Display`](fmt::Display)ed.
    ///
    /// Use the [`fmt::Display`] trait usually to obtain the canonical string representation;
    /// this method avoids a heap allocation where that matters.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tuid::Tuid;
    ///
    /// let x = "599c6000-918e-11f1-ae81-9d27b10ef5d3".parse::<Tuid>()?;
    /// let y = x.encode();
    /// assert_eq!(&y as &str, "599c6000-918e-11f1-ae81-9d27b10ef5d3");
    /// # Ok::<(), tuid::ParseError>(())
    /// ```
    pub fn encode(&self) -> impl ops::Deref<Target = str> + fmt::Display {
        const DIGITS: &[u8; 16] = b"0123456789abcdef";

        let mut buffer = [0u8; 36];
        let mut buf_iter = buffer.iter_mut();
        for i in 0..16 {
            let e = self.0[i] as usize;
            *buf_iter.next().unwrap() = DIGITS[e >> 4];
            *buf_iter.next().unwrap() = DIGITS[e & 15];
            if i == 3 || i == 5 || i == 7 || i == 9 {
                *buf_iter.next().unwrap() = b'-';
            }
        }
        debug_assert!(buffer.is_ascii());
        TuidStr(buffer)
    }
}

impl fmt::Display for Tuid {
    /// Returns the 8-4-4-4-12 canonical hexadecimal string representation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl str::FromStr for Tuid {
    type Err = ParseError;

    /// Creates an object from the 8-4-4-4-12 hexadecimal string representation.
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        const ERR: ParseError = ParseError {};
        if src.len() != 36 {
            return Err(ERR);
        }

        let src = src.as_bytes();
        let mut dst = [0u8; 16];
        let mut cursor = 0;
        for (i, e) in dst.iter_mut().enumerate() {
            if i == 4 || i == 6 || i == 8 || i == 10 {
                if src[cursor] != b'-' {
                    return Err(ERR);
                }
                cursor += 1;
            }
            let hi = (src[cursor] as char).to_digit(16).ok_or(ERR)? as u8;
            let lo = (src[cursor + 1] as char).to_digit(16).ok_or(ERR)? as u8;
            *e = hi << 4 | lo;
            cursor += 2;
        }
        Ok(Self(dst))
    }
}

impl From<Tuid> for String {
    fn from(src: Tuid) -> Self {
        src.to_string()
    }
}

impl TryFrom<String> for Tuid {
    type Error = ParseError;

    fn try_from(src: String) -> Result<Self, Self::Error> {
        src.parse()
    }
}

impl From<Tuid> for [u8; 16] {
    fn from(src: Tuid) -> Self {
        src.0
    }
}

impl From<[u8; 16]> for Tuid {
    fn from(src: [u8; 16]) -> Self {
        Self(src)
    }
}

impl AsRef<[u8]> for Tuid {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl From<Tuid> for u128 {
    fn from(src: Tuid) -> Self {
        Self::from_be_bytes(src.0)
    }
}

impl From<u128> for Tuid {
    fn from(src: u128) -> Self {
        Self(src.to_be_bytes())
    }
}

/// Concrete return type of [`Tuid::encode()`] containing the stack-allocated 8-4-4-4-12
/// string representation.
struct TuidStr([u8; 36]);

impl ops::Deref for TuidStr {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        debug_assert!(self.0.is_ascii());
        unsafe { str::from_utf8_unchecked(&self.0) }
    }
}

impl fmt::Display for TuidStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self)
    }
}

/// The variant field values distinguishing identifier layout families.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Variant {
    /// Reserved for NCS backward compatibility (`0xx`)
    Var0,
    /// The RFC 4122 variant used by this scheme (`10x`)
    Var10,
    /// Reserved for Microsoft compatibility (`110`)
    Var110,
    /// Reserved for future definition (`111`)
    Var111,
}

/// Error parsing an invalid string representation of an identifier.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Error)]
#[error("invalid string representation")]
pub struct ParseError {}

#[cfg(feature = "uuid")]
#[cfg_attr(docsrs, doc(cfg(feature = "uuid")))]
mod uuid_support {
    use super::Tuid;

    impl From<Tuid> for uuid::Uuid {
        fn from(src: Tuid) -> Self {
            uuid::Uuid::from_bytes(src.0)
        }
    }

    impl From<uuid::Uuid> for Tuid {
        fn from(src: uuid::Uuid) -> Self {
            Self(src.into_bytes())
        }
    }
}

#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
mod serde_support {
    use super::{fmt, Tuid};
    use serde::{de, Deserializer, Serializer};

    impl serde::Serialize for Tuid {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            if serializer.is_human_readable() {
                serializer.serialize_str(&self.encode())
            } else {
                serializer.serialize_bytes(self.as_bytes())
            }
        }
    }

    impl<'de> serde::Deserialize<'de> for Tuid {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            if deserializer.is_human_readable() {
                deserializer.deserialize_str(TuidVisitor)
            } else {
                deserializer.deserialize_bytes(TuidVisitor)
            }
        }
    }

    struct TuidVisitor;

    impl<'de> de::Visitor<'de> for TuidVisitor {
        type Value = Tuid;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(formatter, "an identifier representation")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            value.parse::<Self::Value>().map_err(de::Error::custom)
        }

        fn visit_bytes<E: de::Error>(self, value: &[u8]) -> Result<Self::Value, E> {
            <[u8; 16]>::try_from(value)
                .map(Self::Value::from)
                .map_err(de::Error::custom)
        }
    }

}
