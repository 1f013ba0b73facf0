use super::engine::DISQUALIFIED;
use super::reason::Reason;
use crate::config::FilterConfig;

/// Score based on company signals only.
///
/// A missing or blank company name contributes nothing; company metadata is
/// optional and never the reason a posting is skipped. The first blocklist
/// entry found in the lowercased name disqualifies immediately.
pub fn score_company(company: Option<&str>, config: &FilterConfig) -> (f64, Vec<Reason>) {
    let Some(name) = company.map(str::trim).filter(|name| !name.is_empty()) else {
        return (0.0, Vec::new());
    };

    let company_lower = name.to_lowercase();
    let mode = config.match_mode;

    if let Some(entry) = mode.find(&company_lower, &config.company_blocklist) {
        return (
            DISQUALIFIED,
            vec![Reason::CompanyBlocked {
                entry: entry.to_string(),
                company: name.to_string(),
            }],
        );
    }

    let mut score = 0.0;
    let mut reasons = Vec::new();
    for signal in &config.company_signals {
        if let Some(pattern) = mode.find(&company_lower, &signal.patterns) {
            score += signal.weight;
            reasons.push(Reason::CompanySignal {
                signal: signal.name.clone(),
                weight: signal.weight,
                pattern: pattern.to_string(),
                description: signal.description.clone(),
            });
        }
    }

    (score, reasons)
}
