//! Unified CSV loading
//!
//! Reads the flat file written by the unification stage back into
//! [`UnifiedRecord`]s. Empty fields become `None`.

use offerlab_types::UnifiedRecord;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

use crate::errors::{Result, TrainerError};

/// Load every row of the unified file
pub fn read_unified(path: &Path) -> Result<Vec<UnifiedRecord>> {
    info!("Loading unified dataset from: {}", path.display());
    let file = File::open(path).map_err(|source| TrainerError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let rows = parse_unified(file, path)?;
    info!("Loaded {} unified rows", rows.len());
    Ok(rows)
}

/// Parse unified CSV content with a header row. `origin` is only used in errors.
pub fn parse_unified<R: Read>(reader: R, origin: &Path) -> Result<Vec<UnifiedRecord>> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    reader
        .deserialize()
        .map(|row| {
            row.map_err(|source| TrainerError::Csv {
                path: origin.to_path_buf(),
                source,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use offerlab_types::EventKind;

    const HEADER: &str = "account_id,offer_id,event,time,amount,reward,gender,age,credit_card_limit,registered_on,offer_type,discount_value,min_value,duration,web,email,mobile,social";

    #[test]
    fn parses_rows_with_nulls() {
        let content = format!(
            "{HEADER}\n\
             a1,o1,offer received,0.0,,,F,45.0,64000.0,2017-02-12,bogo,10.0,10.0,7.0,0,1,1,1\n\
             a2,,transaction,6.0,12.5,,,,,,,,,,,,,\n"
        );
        let rows = parse_unified(content.as_bytes(), Path::new("inline.csv")).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].event, EventKind::OfferReceived);
        assert_eq!(rows[0].offer_type.as_deref(), Some("bogo"));
        assert_eq!(rows[0].social, Some(1));
        assert_eq!(rows[0].reward, None);
        assert_eq!(rows[1].offer_id, None);
        assert_eq!(rows[1].amount, Some(12.5));
        assert_eq!(rows[1].gender, None);
    }

    #[test]
    fn accepts_legacy_headers() {
        let content = "account_id,event,time_since_test_start,ammount\nb,transaction,3.0,9.75\n";
        let rows = parse_unified(content.as_bytes(), Path::new("legacy.csv")).unwrap();

        assert_eq!(rows[0].time, Some(3.0));
        assert_eq!(rows[0].amount, Some(9.75));
        assert_eq!(rows[0].offer_type, None);
    }

    #[test]
    fn unknown_event_is_an_error() {
        let content = "account_id,event\nb,offer ignored\n";
        let err = parse_unified(content.as_bytes(), Path::new("bad.csv")).unwrap_err();
        assert!(matches!(err, TrainerError::Csv { .. }));
        assert!(err.to_string().contains("bad.csv"));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = read_unified(Path::new("/nonexistent/unified.csv")).unwrap_err();
        assert!(matches!(err, TrainerError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/unified.csv"));
    }
}
