use std::collections::HashSet;

/// Strip markdown code fences around a model reply.
pub(crate) fn strip_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (`json`, `JSON`, ...) on the opening fence line.
    let rest = match rest.find('\n') {
        Some(nl) if rest[..nl].chars().all(char::is_alphanumeric) => &rest[nl + 1..],
        _ => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// Paths proposed by the planner. Anything that is not a JSON array yields an
/// empty plan; non-string elements are ignored.
#[must_use]
pub fn parse_plan(text: &str) -> Vec<String> {
    let cleaned = strip_fences(text);
    let candidate = match (cleaned.find('['), cleaned.rfind(']')) {
        (Some(start), Some(end)) if start < end => &cleaned[start..=end],
        _ => {
            tracing::warn!("planner reply has no JSON array");
            return Vec::new();
        }
    };
    match serde_json::from_str::<Vec<serde_json::Value>>(candidate) {
        Ok(values) => values
            .into_iter()
            .filter_map(|v| match v {
                serde_json::Value::String(s) => Some(s.trim().to_owned()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Err(e) => {
            tracing::warn!("planner reply is not a JSON array: {e}");
            Vec::new()
        }
    }
}

/// Inputs that constrain one round's plan.
#[derive(Debug)]
pub struct PlanFilter<'a> {
    pub listing: &'a HashSet<String>,
    pub visited: &'a HashSet<String>,
    /// README forced in on the first round.
    pub readme: Option<&'a str>,
    pub round: usize,
    pub max_files: usize,
}

/// Planned files that exist, are unvisited and unique, capped at `max_files`.
/// On round 0 an unvisited README is placed first.
#[must_use]
pub fn select_files(planned: Vec<String>, filter: &PlanFilter<'_>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut selected: Vec<String> = planned
        .into_iter()
        .filter(|p| filter.listing.contains(p) && !filter.visited.contains(p))
        .filter(|p| seen.insert(p.clone()))
        .collect();

    if filter.round == 0
        && let Some(readme) = filter.readme
        && !filter.visited.contains(readme)
        && !selected.iter().any(|p| p == readme)
    {
        selected.insert(0, readme.to_owned());
    }

    selected.truncate(filter.max_files);
    selected
}
