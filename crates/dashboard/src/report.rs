//! Builds the overview printed by the `sca-dashboard` binary.

use std::fmt::Write;

use sca_core::models::{Mission, SpyCatStats};
use sca_query::{Agency, AgencyResult};

/// Load statistics and missions through the hooks and render them.
///
/// Both reads run concurrently; the first failure is returned.
pub async fn load(agency: &Agency) -> AgencyResult<String> {
    let agent_hooks = agency.spy_cats();
    let mission_hooks = agency.missions();
    let (stats, missions) = tokio::join!(agent_hooks.stats(), mission_hooks.list());
    let stats = stats?;
    let missions = missions?;

    tracing::debug!(missions = missions.len(), "Dashboard data loaded");

    let mut out = render_stats(&stats);
    out.push('\n');
    out.push_str(&render_missions(&missions));
    Ok(out)
}

pub fn render_stats(stats: &SpyCatStats) -> String {
    let mut out = String::from("Agency statistics\n");
    let _ = writeln!(out, "  Agents:             {}", stats.total_cats);
    let _ = writeln!(out, "  On active missions: {}", stats.cats_with_active_missions);
    let _ = writeln!(out, "  Available:          {}", stats.available_cats);
    let _ = writeln!(out, "  Avg. experience:    {:.1} years", stats.average_experience);
    let _ = writeln!(out, "  Avg. salary:        ${:.2}", stats.average_salary);
    if let Some(breed) = &stats.most_common_breed {
        let _ = writeln!(out, "  Most common breed:  {breed}");
    }
    if let Some(rate) = stats.success_rate {
        let _ = writeln!(out, "  Success rate:       {rate:.1}%");
    }
    out
}

pub fn render_missions(missions: &[Mission]) -> String {
    let mut out = format!("Missions ({})\n", missions.len());
    if missions.is_empty() {
        out.push_str("  No missions yet\n");
        return out;
    }
    for mission in missions {
        let status = if mission.complete { "complete" } else { "active" };
        let agent = match (&mission.cat, mission.cat_id) {
            (Some(cat), _) => cat.name.clone(),
            (None, Some(id)) => format!("agent #{id}"),
            (None, None) => "unassigned".to_string(),
        };
        let _ = writeln!(
            out,
            "  #{:<4} {:<9} {:>5.1}%  {}/{} targets  {}",
            mission.id,
            status,
            mission.progress_percentage,
            mission.completed_targets_count,
            mission.targets_count,
            agent,
        );
    }
    out
}
