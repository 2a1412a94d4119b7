use anyhow::{Context, Result};
use log::info;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use roastline::chart::ChartPoint;
use roastline::view::RoastView;

use super::{roast_id as parse_roast_id, ChartFormat, Session};

/// Export chart data for one roast
pub fn run(
    session: &Session,
    roast_id: &str,
    format: ChartFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    let id = parse_roast_id(roast_id)?;
    let store = session.open_store()?;
    let view = RoastView::load(&store, &id).with_context(|| format!("Failed to read roast {}", id))?;
    let points = view.chart(&session.config().analytics);
    info!("Assembled {} chart points for {}", points.len(), id);

    match output {
        Some(path) => {
            let file = File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            write_chart(&points, format, &mut writer)?;
            writer.flush()?;
            info!("Wrote {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            write_chart(&points, format, &mut stdout.lock())?;
        }
    }
    Ok(())
}

fn write_chart<W: Write>(points: &[ChartPoint], format: ChartFormat, writer: &mut W) -> Result<()> {
    match format {
        ChartFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, points).context("Failed to encode chart")?;
            writeln!(writer)?;
        }
        ChartFormat::Csv => {
            let mut csv = csv::Writer::from_writer(writer);
            for point in points {
                csv.serialize(point).context("Failed to encode chart row")?;
            }
            csv.flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points() -> Vec<ChartPoint> {
        vec![
            ChartPoint {
                time_s: 0.0,
                primary: Some(200.0),
                secondary: None,
                fan: 5.0,
                charge: true,
                ..ChartPoint::default()
            },
            ChartPoint {
                time_s: 30.0,
                primary: Some(150.5),
                secondary: Some(220.0),
                fan: 5.0,
                heat: 60.0,
                ..ChartPoint::default()
            },
        ]
    }

    #[test]
    fn test_csv_has_header_and_empty_missing_readings() {
        let mut out = Vec::new();
        write_chart(&points(), ChartFormat::Csv, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("time_s,primary,secondary,fan,heat,charge"));
        assert!(lines[1].starts_with("0.0,200.0,,5.0,0.0,true"));
        assert!(lines[2].starts_with("30.0,150.5,220.0,5.0,60.0,false"));
    }

    #[test]
    fn test_json_round_trips() {
        let mut out = Vec::new();
        write_chart(&points(), ChartFormat::Json, &mut out).unwrap();
        let back: Vec<ChartPoint> = serde_json::from_slice(&out).unwrap();
        assert_eq!(back, points());
    }
}
