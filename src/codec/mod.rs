//! Integer codec interface (C2): encode/decode posting D-gaps and impacts.
//!
//! Every codec is a scalar implementation of [`IntegerCodec`]; [`Codec`] is a
//! closed enum dispatched through a inherent `match` rather than
//! `Box<dyn IntegerCodec>`, since per-segment decode is the hottest call
//! site in the query path and the set of codecs is fixed at compile time
//! (see DESIGN.md).

mod bitpack;
mod carry8b;
mod carryover12;
mod elias;
mod qmx;
mod relative10;
mod simple16;
mod simple9;
mod stream_vbyte;
mod vbyte;

use crate::core::error::Result;

/// Shared contract for every integer codec. `encode` returns the number of
/// bytes written, or `0` on failure (empty input, overflow, or output
/// buffer too small). `decode` returns the number of bytes consumed from
/// `src`.
pub trait IntegerCodec {
    const NAME: &'static str;
    const MAX_VALUE: u32;

    fn encode(dst: &mut [u8], xs: &[u32]) -> usize;
    fn decode(dst: &mut [u32], src: &[u8]) -> Result<usize>;
}

/// The closed set of codecs this crate implements. SIMD/gather variants
/// named in the original table (Stream-VByte excepted, which is a real
/// grouped-byte layout rather than a vector-register one) are represented
/// here by their scalar equivalent — there is no `std::arch` dependency
/// anywhere in this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    VByte,
    StreamVByte,
    Simple9,
    Simple16,
    RelativeTen,
    Carryover12,
    Carry8b,
    EliasGamma,
    EliasDelta,
    BitPack32,
    Qmx,
}

impl Codec {
    pub fn name(self) -> &'static str {
        match self {
            Codec::VByte => vbyte::VByteCodec::NAME,
            Codec::StreamVByte => stream_vbyte::StreamVByteCodec::NAME,
            Codec::Simple9 => simple9::Simple9Codec::NAME,
            Codec::Simple16 => simple16::Simple16Codec::NAME,
            Codec::RelativeTen => relative10::RelativeTenCodec::NAME,
            Codec::Carryover12 => carryover12::Carryover12Codec::NAME,
            Codec::Carry8b => carry8b::Carry8bCodec::NAME,
            Codec::EliasGamma => elias::EliasGammaCodec::NAME,
            Codec::EliasDelta => elias::EliasDeltaCodec::NAME,
            Codec::BitPack32 => bitpack::BitPack32Codec::NAME,
            Codec::Qmx => qmx::QmxCodec::NAME,
        }
    }

    pub fn max_value(self) -> u32 {
        match self {
            Codec::VByte => vbyte::VByteCodec::MAX_VALUE,
            Codec::StreamVByte => stream_vbyte::StreamVByteCodec::MAX_VALUE,
            Codec::Simple9 => simple9::Simple9Codec::MAX_VALUE,
            Codec::Simple16 => simple16::Simple16Codec::MAX_VALUE,
            Codec::RelativeTen => relative10::RelativeTenCodec::MAX_VALUE,
            Codec::Carryover12 => carryover12::Carryover12Codec::MAX_VALUE,
            Codec::Carry8b => carry8b::Carry8bCodec::MAX_VALUE,
            Codec::EliasGamma => elias::EliasGammaCodec::MAX_VALUE,
            Codec::EliasDelta => elias::EliasDeltaCodec::MAX_VALUE,
            Codec::BitPack32 => bitpack::BitPack32Codec::MAX_VALUE,
            Codec::Qmx => qmx::QmxCodec::MAX_VALUE,
        }
    }

    pub fn encode(self, dst: &mut [u8], xs: &[u32]) -> usize {
        match self {
            Codec::VByte => vbyte::VByteCodec::encode(dst, xs),
            Codec::StreamVByte => stream_vbyte::StreamVByteCodec::encode(dst, xs),
            Codec::Simple9 => simple9::Simple9Codec::encode(dst, xs),
            Codec::Simple16 => simple16::Simple16Codec::encode(dst, xs),
            Codec::RelativeTen => relative10::RelativeTenCodec::encode(dst, xs),
            Codec::Carryover12 => carryover12::Carryover12Codec::encode(dst, xs),
            Codec::Carry8b => carry8b::Carry8bCodec::encode(dst, xs),
            Codec::EliasGamma => elias::EliasGammaCodec::encode(dst, xs),
            Codec::EliasDelta => elias::EliasDeltaCodec::encode(dst, xs),
            Codec::BitPack32 => bitpack::BitPack32Codec::encode(dst, xs),
            Codec::Qmx => qmx::QmxCodec::encode(dst, xs),
        }
    }

    pub fn decode(self, dst: &mut [u32], src: &[u8]) -> Result<usize> {
        match self {
            Codec::VByte => vbyte::VByteCodec::decode(dst, src),
            Codec::StreamVByte => stream_vbyte::StreamVByteCodec::decode(dst, src),
            Codec::Simple9 => simple9::Simple9Codec::decode(dst, src),
            Codec::Simple16 => simple16::Simple16Codec::decode(dst, src),
            Codec::RelativeTen => relative10::RelativeTenCodec::decode(dst, src),
            Codec::Carryover12 => carryover12::Carryover12Codec::decode(dst, src),
            Codec::Carry8b => carry8b::Carry8bCodec::decode(dst, src),
            Codec::EliasGamma => elias::EliasGammaCodec::decode(dst, src),
            Codec::EliasDelta => elias::EliasDeltaCodec::decode(dst, src),
            Codec::BitPack32 => bitpack::BitPack32Codec::decode(dst, src),
            Codec::Qmx => qmx::QmxCodec::decode(dst, src),
        }
    }

    /// Maps the on-disk codec tag byte (§6) to a `Codec`.
    pub fn from_tag(tag: u8) -> Option<Codec> {
        Some(match tag {
            0 => Codec::VByte,
            1 => Codec::StreamVByte,
            2 => Codec::Simple9,
            3 => Codec::Simple16,
            4 => Codec::RelativeTen,
            5 => Codec::Carryover12,
            6 => Codec::Carry8b,
            7 => Codec::EliasGamma,
            8 => Codec::EliasDelta,
            9 => Codec::BitPack32,
            10 => Codec::Qmx,
            _ => return None,
        })
    }

    pub fn tag(self) -> u8 {
        match self {
            Codec::VByte => 0,
            Codec::StreamVByte => 1,
            Codec::Simple9 => 2,
            Codec::Simple16 => 3,
            Codec::RelativeTen => 4,
            Codec::Carryover12 => 5,
            Codec::Carry8b => 6,
            Codec::EliasGamma => 7,
            Codec::EliasDelta => 8,
            Codec::BitPack32 => 9,
            Codec::Qmx => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Codec; 11] = [
        Codec::VByte,
        Codec::StreamVByte,
        Codec::Simple9,
        Codec::Simple16,
        Codec::RelativeTen,
        Codec::Carryover12,
        Codec::Carry8b,
        Codec::EliasGamma,
        Codec::EliasDelta,
        Codec::BitPack32,
        Codec::Qmx,
    ];

    #[test]
    fn tag_round_trips_for_every_codec() {
        for c in ALL {
            assert_eq!(Codec::from_tag(c.tag()), Some(c));
        }
    }
}
