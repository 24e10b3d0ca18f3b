//! Hand-rolled CVSS base-score extraction (spec.md §4.C.2). No published
//! crate in this stack computes CVSS base scores from a vector string, so
//! this implements the published formulas directly: CVSS v2 (FIRST.org
//! v2 spec §3.2.1) and CVSS v3.0/3.1 (FIRST.org v3.1 spec §7.1). CVSS v4
//! replaced the additive formula with a ~240-row MacroVector lookup table;
//! reproducing that table is out of scope, so [`cvss4_base_score`] uses a
//! weighted-metric approximation instead of the official algorithm.

use std::collections::HashMap;

fn parse_vector(vector: &str) -> HashMap<&str, &str> {
    vector
        .split('/')
        .filter_map(|segment| segment.split_once(':'))
        .map(|(metric, value)| (metric, value))
        .collect()
}

fn clamp_score(score: f64) -> f64 {
    (score.max(0.0).min(10.0) * 10.0).round() / 10.0
}

/// CVSS v2 base score (FIRST.org CVSS v2 specification §3.2.1). Accepts
/// bare `AV:N/AC:L/Au:N/C:P/I:P/A:P`-style vectors (no `CVSS:2.0` prefix in
/// the v2 spec).
#[must_use]
pub fn cvss2_base_score(vector: &str) -> Option<f64> {
    let metrics = parse_vector(vector);

    let av = match *metrics.get("AV")? {
        "L" => 0.395,
        "A" => 0.646,
        "N" => 1.0,
        _ => return None,
    };
    let ac = match *metrics.get("AC")? {
        "H" => 0.35,
        "M" => 0.61,
        "L" => 0.71,
        _ => return None,
    };
    let au = match *metrics.get("Au")? {
        "M" => 0.45,
        "S" => 0.56,
        "N" => 0.704,
        _ => return None,
    };
    let impact_metric = |key: &str| -> Option<f64> {
        match *metrics.get(key)? {
            "N" => Some(0.0),
            "P" => Some(0.275),
            "C" => Some(0.660),
            _ => None,
        }
    };
    let conf = impact_metric("C")?;
    let integ = impact_metric("I")?;
    let avail = impact_metric("A")?;

    let impact = 10.41 * (1.0 - (1.0 - conf) * (1.0 - integ) * (1.0 - avail));
    let exploitability = 20.0 * av * ac * au;
    let f_impact = if impact == 0.0 { 0.0 } else { 1.176 };

    let base = ((0.6 * impact) + (0.4 * exploitability) - 1.5) * f_impact;
    Some(clamp_score(base))
}

/// CVSS v3.0/3.1 base score (FIRST.org CVSS v3.1 specification §7.1).
#[must_use]
pub fn cvss3_base_score(vector: &str) -> Option<f64> {
    let metrics = parse_vector(vector);

    let scope_changed = matches!(metrics.get("S").copied(), Some("C"));

    let av = match *metrics.get("AV")? {
        "N" => 0.85,
        "A" => 0.62,
        "L" => 0.55,
        "P" => 0.2,
        _ => return None,
    };
    let ac = match *metrics.get("AC")? {
        "L" => 0.77,
        "H" => 0.44,
        _ => return None,
    };
    let pr = match (*metrics.get("PR")?, scope_changed) {
        ("N", _) => 0.85,
        ("L", false) => 0.62,
        ("L", true) => 0.68,
        ("H", false) => 0.27,
        ("H", true) => 0.50,
        _ => return None,
    };
    let ui = match *metrics.get("UI")? {
        "N" => 0.85,
        "R" => 0.62,
        _ => return None,
    };
    let impact_metric = |key: &str| -> Option<f64> {
        match *metrics.get(key)? {
            "N" => Some(0.0),
            "L" => Some(0.22),
            "H" => Some(0.56),
            _ => None,
        }
    };
    let conf = impact_metric("C")?;
    let integ = impact_metric("I")?;
    let avail = impact_metric("A")?;

    let iss = 1.0 - (1.0 - conf) * (1.0 - integ) * (1.0 - avail);
    let impact = if scope_changed {
        7.52 * (iss - 0.029) - 3.25 * (iss - 0.02).powf(15.0)
    } else {
        6.42 * iss
    };

    if impact <= 0.0 {
        return Some(0.0);
    }

    let exploitability = 8.22 * av * ac * pr * ui;
    let base = if scope_changed {
        (1.08 * (impact + exploitability)).min(10.0)
    } else {
        (impact + exploitability).min(10.0)
    };

    Some(ceil_to_one_decimal(base))
}

/// The CVSS roundup function (spec §7.1's appendix): round up to the
/// nearest 0.1, not the nearest 0.1 by ordinary rounding.
fn ceil_to_one_decimal(value: f64) -> f64 {
    (value * 10.0).ceil() / 10.0
}

/// CVSS v4 vectors carry an explicit `CVSS:4.0` prefix segment; strip it
/// before parsing the remaining metrics.
#[must_use]
pub fn cvss4_base_score(vector: &str) -> Option<f64> {
    let vector = vector.strip_prefix("CVSS:4.0/").unwrap_or(vector);
    let metrics = parse_vector(vector);

    let av = match *metrics.get("AV")? {
        "N" => 1.0,
        "A" => 0.75,
        "L" => 0.5,
        "P" => 0.25,
        _ => return None,
    };
    let ac = match *metrics.get("AC")? {
        "L" => 1.0,
        "H" => 0.5,
        _ => return None,
    };
    let at = match metrics.get("AT").copied().unwrap_or("N") {
        "N" => 1.0,
        "P" => 0.5,
        _ => 1.0,
    };
    let pr = match *metrics.get("PR")? {
        "N" => 1.0,
        "L" => 0.65,
        "H" => 0.3,
        _ => return None,
    };
    let ui = match metrics.get("UI").copied().unwrap_or("N") {
        "N" => 1.0,
        "P" => 0.65,
        "A" => 0.3,
        _ => 1.0,
    };

    let exploitability_weight = av * ac * at * pr * ui;

    let impact_metric = |key: &str| -> Option<f64> {
        match *metrics.get(key)? {
            "N" => Some(0.0),
            "L" => Some(0.3),
            "H" => Some(1.0),
            _ => None,
        }
    };
    let vc = impact_metric("VC")?;
    let vi = impact_metric("VI")?;
    let va = impact_metric("VA")?;
    let sc = impact_metric("SC").unwrap_or(0.0);
    let si = impact_metric("SI").unwrap_or(0.0);
    let sa = impact_metric("SA").unwrap_or(0.0);

    let vulnerable_impact = (vc + vi + va) / 3.0;
    let subsequent_impact = (sc + si + sa) / 3.0;
    let impact_weight = vulnerable_impact.max(subsequent_impact * 0.9);

    // Approximation, not the official ~240-row MacroVector lookup table:
    // scale a 0..10 score by combined exploitability and impact weight.
    let base = 10.0 * exploitability_weight.sqrt() * impact_weight;
    Some(clamp_score(base))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cvss2_log4shell_style_vector() {
        let score = cvss2_base_score("AV:N/AC:L/Au:N/C:C/I:C/A:C").unwrap();
        assert!((score - 10.0).abs() < 0.1, "expected ~10.0, got {score}");
    }

    #[test]
    fn cvss2_low_severity_vector() {
        let score = cvss2_base_score("AV:L/AC:H/Au:M/C:N/I:N/A:P").unwrap();
        assert!(score < 4.0, "expected low severity, got {score}");
    }

    #[test]
    fn cvss3_critical_unauthenticated_rce() {
        let score = cvss3_base_score("CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H").unwrap();
        assert!((score - 9.8).abs() < 0.05, "expected ~9.8, got {score}");
    }

    #[test]
    fn cvss3_no_impact_is_zero() {
        let score = cvss3_base_score("CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:N/I:N/A:N").unwrap();
        assert_eq!(score, 0.0);
    }

    #[test]
    fn cvss4_high_everything_is_near_max() {
        let score =
            cvss4_base_score("CVSS:4.0/AV:N/AC:L/AT:N/PR:N/UI:N/VC:H/VI:H/VA:H/SC:H/SI:H/SA:H").unwrap();
        assert!(score > 9.0, "expected near-critical, got {score}");
    }

    #[test]
    fn unparseable_vector_returns_none() {
        assert_eq!(cvss3_base_score("garbage"), None);
    }
}
