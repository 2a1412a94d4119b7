use anyhow::{Context, Result};

use roastline::view::RoastView;

use super::{roast_id as parse_roast_id, Session};

/// Print the control channel value series of one roast
pub fn run(session: &Session, roast_id: &str) -> Result<()> {
    let id = parse_roast_id(roast_id)?;
    let store = session.open_store()?;
    let view = RoastView::load(&store, &id).with_context(|| format!("Failed to read roast {}", id))?;

    let series = view.value_series();
    if series.is_empty() {
        println!("No numeric control events stored for roast {}", id);
        return Ok(());
    }

    for s in &series {
        println!(
            "{} ({}): {} points, range {} - {} [{}]",
            s.display_name,
            s.channel,
            s.points.len(),
            s.min,
            s.max,
            s.scale
        );
        for (time_s, value) in &s.points {
            println!("  {:>8.1}s  {}", time_s, value);
        }
    }
    Ok(())
}
