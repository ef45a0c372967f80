//! Binary character counting stage.

use conveyor_core::prelude::*;
use std::io::{Read, Write};
use std::sync::Arc;

/// Counts letters in a binary stream.
///
/// # Views
/// - Input: "input0" (binary) - The bytes to scan
/// - Output: "output0" (binary) - One `letter:count` line per letter seen
///
/// Input is folded to lowercase and only `a` through `z` are counted.
/// The input stream is fully consumed and released before the output
/// payload is handed over; the payload renders its lines lazily, when
/// the host drains it.
#[derive(Debug, Default)]
pub struct CharacterCounter {
    scanned: u64,
}

impl Stage for CharacterCounter {
    fn info(&self) -> StageInfo {
        StageInfo::new("Character Counter")
            .with_purpose("Counts letter frequencies in a byte stream.")
            .with_inputs(ViewContract::binary(1, 1))
            .with_outputs(ViewContract::binary(1, 1))
            .with_errors(ViewContract::documents(1, 1))
    }

    fn configure(&mut self, _values: &PropertyValues) -> Result<()> {
        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        tracing::info!(scanned = self.scanned, "character counter finished");
        Ok(())
    }
}

impl BinaryWriteStage for CharacterCounter {
    fn process_binary(
        &mut self,
        header: Arc<Header>,
        input: &mut dyn Read,
        views: &mut ViewSet,
    ) -> std::result::Result<(), DataError> {
        let mut counts = [0u64; 26];
        let mut buffer = [0u8; 8192];
        loop {
            let read = input
                .read(&mut buffer)
                .map_err(|e| DataError::new(format!("failed reading binary input: {e}")))?;
            if read == 0 {
                break;
            }
            self.scanned += read as u64;
            for byte in &buffer[..read] {
                let lower = byte.to_ascii_lowercase();
                if lower.is_ascii_lowercase() {
                    counts[(lower - b'a') as usize] += 1;
                }
            }
        }
        views
            .write_binary_output(Box::new(CountsPayload { header, counts }))
            .map_err(|e| DataError::new(e.to_string()))
    }
}

/// Renders one `letter:count` line per alphabet letter on drain.
struct CountsPayload {
    header: Arc<Header>,
    counts: [u64; 26],
}

impl BinaryPayload for CountsPayload {
    fn header(&self) -> Arc<Header> {
        Arc::clone(&self.header)
    }

    fn write(&mut self, out: &mut dyn Write) -> std::io::Result<()> {
        for (i, count) in self.counts.iter().enumerate() {
            let letter = (b'a' + i as u8) as char;
            writeln!(out, "{letter}:{count}")?;
        }
        Ok(())
    }
}
