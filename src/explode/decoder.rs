//! Literal and distance/length decoding
//!
//! This module implements the main explode loop on top of the tables built
//! in [`state`](super::state).

use super::state::ExplodeState;
use crate::bits::BitReader;
use crate::common::DecodeStats;
use crate::window::Window;
use crate::Result;

impl ExplodeState {
    /// Decode until `size` bytes have been produced
    ///
    /// The final match may run past `size`; the window drops whatever does
    /// not fit the output.
    pub fn decode(
        &self,
        reader: &mut BitReader<'_>,
        window: &mut Window<'_>,
        size: usize,
    ) -> Result<DecodeStats> {
        let mut stats = DecodeStats::default();
        let mut remaining = size;

        while remaining > 0 {
            if reader.get_bits(1) != 0 {
                remaining -= 1;
                window.push(self.decode_literal(reader)?);
                stats.literal_count += 1;
            } else {
                let (distance, length) = self.decode_match(reader)?;
                remaining = remaining.saturating_sub(length);
                window.copy_match(distance, length);
                stats.match_count += 1;
                stats.longest_match = stats.longest_match.max(length);
            }
        }

        Ok(stats)
    }

    /// Decode one literal byte, coded or raw
    pub fn decode_literal(&self, reader: &mut BitReader<'_>) -> Result<u8> {
        match &self.literal {
            Some(table) => Ok(table.decode_inverted(reader)?.value as u8),
            None => Ok(reader.get_bits(8) as u8),
        }
    }

    /// Decode one back-reference as `(distance, length)`
    pub fn decode_match(&self, reader: &mut BitReader<'_>) -> Result<(usize, usize)> {
        let low = reader.get_bits(self.config.distance_low_bits()) as usize;
        let high = self.distance.decode_inverted(reader)?;
        let distance = low + high.value as usize;

        let symbol = self.length.decode_inverted(reader)?;
        let mut length = symbol.value as usize;
        if symbol.extra != 0 {
            length += reader.get_bits(8) as usize;
        }

        Ok((distance, length))
    }
}
