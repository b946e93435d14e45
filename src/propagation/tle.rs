use chrono::{DateTime, Utc};

use crate::entity::OrbitalElements;

/// Result of parsing a TLE catalog: good records plus one message per rejected record.
#[derive(Debug, Default)]
pub struct TleParseOutcome {
    pub elements: Vec<OrbitalElements>,
    pub rejected: Vec<String>,
}

/// Parses two-line or three-line (name + two lines) TLE text.
///
/// Records are parsed one at a time so a single corrupt record (bad checksum,
/// truncated line) only drops that record. Lines that belong to no record are
/// reported as rejected.
pub fn parse_tle_catalog(text: &str) -> TleParseOutcome {
    let lines: Vec<&str> = text
        .lines()
        .map(|l| l.trim_end())
        .filter(|l| !l.trim().is_empty())
        .collect();

    let mut outcome = TleParseOutcome::default();
    let mut i = 0;

    while i < lines.len() {
        let (name, line1, line2, consumed) = if is_line(lines[i], '1') {
            match lines.get(i + 1) {
                Some(l2) if is_line(l2, '2') => (None, lines[i], *l2, 2),
                _ => {
                    outcome.rejected.push(format!("line 1 without line 2: {}", lines[i]));
                    i += 1;
                    continue;
                }
            }
        } else {
            match (lines.get(i + 1), lines.get(i + 2)) {
                (Some(l1), Some(l2)) if is_line(l1, '1') && is_line(l2, '2') => {
                    (Some(lines[i].trim().to_string()), *l1, *l2, 3)
                }
                _ => {
                    outcome.rejected.push(format!("unexpected line: {}", lines[i].trim()));
                    i += 1;
                    continue;
                }
            }
        };
        i += consumed;

        match sgp4::Elements::from_tle(name, line1.as_bytes(), line2.as_bytes()) {
            Ok(parsed) => outcome.elements.push(from_sgp4(parsed)),
            Err(e) => outcome.rejected.push(format!("{}: {}", line1.trim(), e)),
        }
    }

    outcome
}

fn is_line(line: &str, number: char) -> bool {
    let mut chars = line.chars();
    chars.next() == Some(number) && chars.next() == Some(' ')
}

fn from_sgp4(elements: sgp4::Elements) -> OrbitalElements {
    OrbitalElements {
        catalog_number: elements.norad_id,
        name: elements
            .object_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
        epoch: DateTime::<Utc>::from_naive_utc_and_offset(elements.datetime, Utc),
        mean_motion: elements.mean_motion,
        eccentricity: elements.eccentricity,
        inclination_deg: elements.inclination,
        raan_deg: elements.right_ascension,
        arg_perigee_deg: elements.argument_of_perigee,
        mean_anomaly_deg: elements.mean_anomaly,
        bstar: elements.drag_term,
    }
}
