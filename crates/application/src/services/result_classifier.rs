use spark_dns_domain::{DomainError, QueryConfig, ResolutionOutcome, ResultRecord};

pub const TOO_LONG_FOR_PROBE: &str = "is too long for an additional randomization label, refraining";

/// Human-readable response code, e.g. `(3 - nxdomain)`.
pub fn rcode_label(rcode: u16) -> String {
    match rcode {
        0 => "(0 - noerror)".to_string(),
        2 => "(2 - servfail)".to_string(),
        3 => "(3 - nxdomain)".to_string(),
        other => format!("(rcode: {})", other),
    }
}

/// Turns one resolution result into output lines.
///
/// Pure: the same outcome and configuration always give the same lines.
pub struct ResultClassifier;

impl ResultClassifier {
    /// Lines for a successful engine call. `name` is the name that was
    /// queried, including any probe label.
    pub fn classify(
        name: &str,
        outcome: &ResolutionOutcome,
        config: &QueryConfig,
    ) -> Vec<ResultRecord> {
        let mut records = Vec::new();

        if outcome.have_data || outcome.nx_domain {
            if config.print_records {
                records.extend(
                    outcome
                        .records
                        .iter()
                        .map(|rr| ResultRecord::new(name, rr.rdata())),
                );
            }

            if config.check_security {
                records.push(ResultRecord::new(name, Self::security_status(outcome)));
                return records;
            }
        }

        records.push(ResultRecord::new(
            Self::subject(name, outcome),
            format!("nodata {}", rcode_label(outcome.rcode)),
        ));
        records
    }

    /// The single line of a task whose engine call failed.
    pub fn failure(name: &str, error: &DomainError) -> Vec<ResultRecord> {
        vec![ResultRecord::new(name, error.to_string())]
    }

    /// The single line of a task skipped because a probe label would not fit.
    pub fn too_long(name: &str) -> Vec<ResultRecord> {
        vec![ResultRecord::new(name, TOO_LONG_FOR_PROBE)]
    }

    fn security_status(outcome: &ResolutionOutcome) -> String {
        if outcome.secure {
            "secure".to_string()
        } else if outcome.bogus {
            format!("bogus:{}", outcome.why_bogus())
        } else {
            "insecure".to_string()
        }
    }

    fn subject<'a>(name: &'a str, outcome: &'a ResolutionOutcome) -> &'a str {
        if outcome.qname.is_empty() {
            name
        } else {
            &outcome.qname
        }
    }
}
