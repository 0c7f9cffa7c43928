// Session archive: one JSON object per line, externally tagged by record type

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::{Lap, Session, SessionKey, TelemetrySample, WeatherSample};
use crate::errors::PaddockError;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ArchiveRecord {
    Header(SessionKey),
    Lap(Lap),
    Telemetry {
        driver: String,
        lap_number: u32,
        samples: Vec<TelemetrySample>,
    },
    Weather(WeatherSample),
}

/// Normalize a circuit or session name for consistent file naming
pub fn normalize_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

/// Location of a session inside an archive directory:
/// `{root}/{year}/{circuit}/{session}.jsonl`
pub fn archive_path(root: &Path, key: &SessionKey) -> PathBuf {
    root.join(key.year.to_string())
        .join(normalize_name(&key.circuit))
        .join(format!("{}.jsonl", normalize_name(&key.session_type)))
}

fn same_session(a: &SessionKey, b: &SessionKey) -> bool {
    a.year == b.year
        && normalize_name(&a.circuit) == normalize_name(&b.circuit)
        && normalize_name(&a.session_type) == normalize_name(&b.session_type)
}

/// Read an archived session. The returned session has not been validated and
/// carries the default quick lap predicate.
pub fn read_session(source_file: &Path, key: &SessionKey) -> Result<Session, PaddockError> {
    let records = serde_jsonlines::json_lines(source_file)
        .map_err(|e| PaddockError::ArchiveDecode {
            path: format!("{:?}", source_file),
            source: e,
        })?
        .collect::<Result<Vec<ArchiveRecord>, io::Error>>()
        .map_err(|e| PaddockError::ArchiveDecode {
            path: format!("{:?}", source_file),
            source: e,
        })?;

    let mut laps = Vec::new();
    let mut weather = Vec::new();
    let mut telemetry = Vec::new();
    for record in records {
        match record {
            ArchiveRecord::Header(header) => {
                if !same_session(&header, key) {
                    return Err(PaddockError::DataShape {
                        reason: format!("archive {:?} holds session {}", source_file, header),
                    });
                }
            }
            ArchiveRecord::Lap(lap) => laps.push(lap),
            ArchiveRecord::Telemetry {
                driver,
                lap_number,
                samples,
            } => telemetry.push((driver, lap_number, samples)),
            ArchiveRecord::Weather(sample) => weather.push(sample),
        }
    }
    weather.sort_by(|a, b| a.offset_s.total_cmp(&b.offset_s));

    info!(
        "Loaded {:?}, found {} laps, {} telemetry tables and {} weather samples",
        source_file,
        laps.len(),
        telemetry.len(),
        weather.len()
    );

    let mut session = Session::new(key.clone(), laps, weather);
    for (driver, lap_number, samples) in telemetry {
        session = session.with_telemetry(driver, lap_number, samples);
    }
    Ok(session)
}

pub fn write_session(file: &Path, session: &Session) -> Result<(), PaddockError> {
    if let Some(parent) = file.parent() {
        fs::create_dir_all(parent).map_err(|e| PaddockError::WriterError { source: e })?;
    }
    let archive_file = File::create(file).map_err(|e| PaddockError::WriterError { source: e })?;
    let mut writer = BufWriter::new(archive_file);

    let mut records = vec![ArchiveRecord::Header(session.key().clone())];
    records.extend(session.laps().iter().cloned().map(ArchiveRecord::Lap));
    records.extend(
        session
            .telemetry_tables()
            .into_iter()
            .map(|(driver, lap_number, samples)| ArchiveRecord::Telemetry {
                driver: driver.to_string(),
                lap_number,
                samples: samples.to_vec(),
            }),
    );
    records.extend(session.weather().iter().cloned().map(ArchiveRecord::Weather));

    for record in &records {
        let line = serde_json::to_string(record)
            .map_err(|e| PaddockError::WriterError { source: e.into() })?;
        writeln!(writer, "{}", line).map_err(|e| PaddockError::WriterError { source: e })?;
    }
    writer
        .flush()
        .map_err(|e| PaddockError::WriterError { source: e })?;
    debug!("Wrote {} records to {:?}", records.len(), file);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Compound;
    use crate::session::test_support::{lap, sample};
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_archive_path_is_normalized() {
        let key = SessionKey::new(2023, "Spa-Francorchamps", "Practice 1");
        let path = archive_path(Path::new("/data"), &key);
        assert_eq!(
            path,
            PathBuf::from("/data/2023/spa_francorchamps/practice_1.jsonl")
        );
    }

    #[test]
    fn test_write_then_read_session() {
        let temp_dir = TempDir::new().unwrap();
        let key = SessionKey::new(2024, "Monza", "Race");
        let session = Session::new(
            key.clone(),
            vec![
                lap("ABC", 1, Some(98.2), Compound::Soft, 1),
                lap("ABC", 2, None, Compound::Unknown, 1),
            ],
            vec![WeatherSample {
                offset_s: 60.,
                air_temp_c: 24.5,
                track_temp_c: 38.1,
                humidity_pct: 41.,
                pressure_mbar: 1012.3,
                wind_speed_ms: 1.4,
                wind_direction_deg: 220.,
                rainfall: false,
            }],
        )
        .with_telemetry("ABC", 1, vec![sample(0.5, 300., false), sample(4.2, 301., true)]);

        let path = archive_path(temp_dir.path(), &key);
        write_session(&path, &session).unwrap();
        let loaded = read_session(&path, &key).unwrap();
        assert_eq!(loaded, session);
    }

    #[test]
    fn test_header_for_other_session_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"Header":{{"year":2023,"circuit":"Monza","session_type":"Race"}}}}"#
        )
        .unwrap();
        file.flush().unwrap();

        let result = read_session(file.path(), &SessionKey::new(2024, "Monza", "Race"));
        match result {
            Err(PaddockError::DataShape { reason }) => assert!(reason.contains("2023 Monza Race")),
            other => panic!("Expected DataShape error, got {:?}", other),
        }
    }

    #[test]
    fn test_garbage_line_is_decode_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not json").unwrap();
        file.flush().unwrap();

        let result = read_session(file.path(), &SessionKey::new(2024, "Monza", "Race"));
        assert!(matches!(result, Err(PaddockError::ArchiveDecode { .. })));
    }
}
