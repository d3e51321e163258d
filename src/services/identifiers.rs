//! Identifier generators: zero-padded sequential codes, location codes,
//! random serials and rotating box ids.

use rand::Rng;

use crate::error::{ToolError, ToolResult};

const SERIAL_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const SERIAL_LEN: usize = 9;
const LOCATION_PAD: usize = 3;

/// Items generated between cooperative yields in [`generate_serial_batch`].
pub const GENERATION_BATCH: usize = 1000;

/// `prefix` followed by `number` zero-padded to make `total_length` characters.
///
/// Numbers wider than the padding are kept whole, so the result can exceed
/// `total_length`.
pub fn sequential_id(prefix: &str, number: u64, total_length: usize) -> ToolResult<String> {
    let prefix_len = prefix.chars().count();
    if prefix_len >= total_length {
        return Err(ToolError::invalid_config(
            "Prefix length must be less than Total Length.",
        ));
    }
    let width = total_length - prefix_len;
    Ok(format!("{prefix}{number:0>width$}"))
}

/// `count` sequential ids starting at `start`.
pub fn sequential_ids(
    prefix: &str,
    start: u64,
    count: usize,
    total_length: usize,
) -> ToolResult<Vec<String>> {
    (0..count as u64)
        .map(|i| sequential_id(prefix, start.saturating_add(i), total_length))
        .collect()
}

/// Location code for the zero-based `index`: `PREFIX001`, `PREFIX002`, ...
pub fn location_code(prefix: &str, index: usize) -> String {
    format!("{prefix}{:0>width$}", index + 1, width = LOCATION_PAD)
}

pub fn location_codes(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|i| location_code(prefix, i)).collect()
}

/// Nine random characters from `A-Z0-9`.
pub fn random_serial<R: Rng>(rng: &mut R) -> String {
    (0..SERIAL_LEN)
        .map(|_| SERIAL_ALPHABET[rng.random_range(0..SERIAL_ALPHABET.len())] as char)
        .collect()
}

/// `prefix` followed by `digits` random decimal digits.
pub fn random_box_id<R: Rng>(rng: &mut R, prefix: &str, digits: usize) -> String {
    let mut id = String::with_capacity(prefix.len() + digits);
    id.push_str(prefix);
    for _ in 0..digits {
        id.push(char::from(b'0' + rng.random_range(0..10u8)));
    }
    id
}

/// When a secondary token (such as a box id) is replaced during generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationSchedule {
    pub interval: usize,
    /// Whether index 0 counts as a rotation point.
    pub include_first: bool,
}

impl RotationSchedule {
    pub fn new(interval: usize) -> ToolResult<Self> {
        if interval == 0 {
            return Err(ToolError::invalid_config(
                "Rotation interval must be greater than zero.",
            ));
        }
        Ok(Self {
            interval,
            include_first: false,
        })
    }

    pub fn including_first(mut self) -> Self {
        self.include_first = true;
        self
    }

    pub fn rotates_at(&self, index: usize) -> bool {
        index % self.interval == 0 && (index > 0 || self.include_first)
    }
}

/// One generated row: serial with and without its `S`, plus the current box id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialRecord {
    pub serial_with_s: String,
    pub serial: String,
    pub box_id: String,
}

impl SerialRecord {
    pub fn into_row(self) -> Vec<String> {
        vec![self.serial_with_s, self.serial, self.box_id]
    }
}

/// Summary of a random batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialBatch {
    pub records: Vec<SerialRecord>,
    pub unique_box_ids: usize,
}

/// Generate `count` serial records, switching box id on every rotation point.
///
/// Yields to the runtime every [`GENERATION_BATCH`] records.
pub async fn generate_serial_batch(
    count: usize,
    schedule: RotationSchedule,
    box_prefix: &str,
    box_digits: usize,
) -> ToolResult<SerialBatch> {
    if count == 0 {
        return Err(ToolError::invalid_config(
            "Please ensure all configuration fields are filled correctly.",
        ));
    }
    if box_prefix.trim().is_empty() {
        return Err(ToolError::invalid_config("Please enter a box ID prefix."));
    }

    let mut records = Vec::with_capacity(count);
    let mut box_ids = std::collections::HashSet::new();

    let mut current_box = random_box_id(&mut rand::rng(), box_prefix, box_digits);

    for batch_start in (0..count).step_by(GENERATION_BATCH) {
        let batch_end = (batch_start + GENERATION_BATCH).min(count);
        {
            // ThreadRng is not Send; keep it out of the await below.
            let mut rng = rand::rng();
            for index in batch_start..batch_end {
                if schedule.rotates_at(index) {
                    current_box = random_box_id(&mut rng, box_prefix, box_digits);
                }
                box_ids.insert(current_box.clone());

                let serial = random_serial(&mut rng);
                records.push(SerialRecord {
                    serial_with_s: format!("S{serial}"),
                    serial,
                    box_id: current_box.clone(),
                });
            }
        }

        tracing::debug!("Generated {} of {} serials", batch_end, count);
        tokio::task::yield_now().await;
    }

    Ok(SerialBatch {
        records,
        unique_box_ids: box_ids.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_padding() {
        assert_eq!(sequential_id("PLT", 1, 10).unwrap(), "PLT0000001");
        assert_eq!(sequential_id("P", 42, 4).unwrap(), "P042");
    }

    #[test]
    fn test_sequential_never_truncates() {
        assert_eq!(sequential_id("AB", 12345, 4).unwrap(), "AB12345");
    }

    #[test]
    fn test_prefix_too_long() {
        let err = sequential_id("ABCD", 1, 4).unwrap_err();
        assert_eq!(err.to_string(), "Prefix length must be less than Total Length.");
    }

    #[test]
    fn test_location_codes() {
        assert_eq!(location_codes("LOC", 3), vec!["LOC001", "LOC002", "LOC003"]);
        assert_eq!(location_code("A", 999), "A1000");
    }

    #[test]
    fn test_random_serial_shape() {
        let mut rng = rand::rng();
        for _ in 0..50 {
            let serial = random_serial(&mut rng);
            assert_eq!(serial.len(), 9);
            assert!(
                serial
                    .chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
            );
        }
    }

    #[test]
    fn test_random_box_id_shape() {
        let id = random_box_id(&mut rand::rng(), "BOX", 10);
        assert_eq!(id.len(), 13);
        assert!(id.starts_with("BOX"));
        assert!(id[3..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_rotation_schedule() {
        let schedule = RotationSchedule::new(3).unwrap();
        assert!(!schedule.rotates_at(0));
        assert!(!schedule.rotates_at(2));
        assert!(schedule.rotates_at(3));
        assert!(schedule.rotates_at(6));
        assert!(schedule.including_first().rotates_at(0));
        assert!(RotationSchedule::new(0).is_err());
    }

    #[tokio::test]
    async fn test_serial_batch_box_rotation() {
        let schedule = RotationSchedule::new(10).unwrap();
        let batch = generate_serial_batch(25, schedule, "BOX", 10).await.unwrap();
        assert_eq!(batch.records.len(), 25);

        // Records in the same interval share a box id.
        assert_eq!(batch.records[0].box_id, batch.records[9].box_id);
        assert_eq!(batch.records[10].box_id, batch.records[19].box_id);
        assert_eq!(batch.records[20].box_id, batch.records[24].box_id);
        assert!(batch.unique_box_ids <= 3);

        let first = &batch.records[0];
        assert_eq!(first.serial_with_s, format!("S{}", first.serial));
    }
}
