//! Human status rendering
//!
//! Turns a [`StatusReport`] into the colored terminal view. Pure
//! formatting: all derivation happens in jukre-core, and the output is
//! built as a string so tests can assert on it.

use chrono::{DateTime, Local, Utc};
use owo_colors::OwoColorize;

use jukre_core::StatusReport;

/// Timestamp in the operator's local time, `dd/mm/yyyy HH:MM:SS`
fn human_ts(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%d/%m/%Y %H:%M:%S").to_string()
}

/// Render the full status view
pub fn render(report: &StatusReport) -> String {
    let mut out = String::new();

    out.push_str("JUK.RE DDNS\n");

    if report.token_configured {
        out.push_str("Status: token configured ✓\n");
    } else {
        out.push_str("Status: \"API key not set, edit the configuration file\"\n");
    }

    if report.online {
        out.push_str(&format!("{}\n", "Juk.RE service online".green()));
    } else {
        out.push_str(&format!("{}\n", "Juk.RE service offline".red()));
    }

    if let Some(ping) = &report.ping {
        if let Some(ip) = &ping.client_ip {
            out.push_str(&format!("Your public IP (from the API): {}\n", ip));
        }
        if let Some(version) = &ping.version {
            out.push_str(&format!("API version: {}\n", version));
        }
        if let Some(latency) = ping.latency_ms {
            out.push_str(&format!("Reported latency: {} ms\n", latency));
        }
        if let Some(time) = &ping.time {
            out.push_str(&format!("API clock: {}\n", time));
        }
    }

    let service = if report.service.running {
        "running"
    } else {
        "stopped"
    };
    out.push_str(&format!("Background service: {}\n", service));

    if let Some(uptime) = &report.uptime {
        out.push_str(&format!(
            "Uptime: {} (since {})\n",
            uptime.formatted(),
            human_ts(uptime.since)
        ));
    }

    if let Some(check) = &report.token_check {
        if check.ok {
            out.push_str(&format!(
                "{} — FQDN: {}  IPv4: {}\n",
                "Token OK".green(),
                check.fqdn.as_deref().unwrap_or("?"),
                check.ipv4.as_deref().unwrap_or("?")
            ));
        } else if let Some(error) = &check.error {
            out.push_str(&format!(
                "{} {}\n",
                "Token validation failed:".red(),
                error
            ));
        } else {
            let detail = check
                .detail
                .as_deref()
                .map(|d| format!(" — {}", d))
                .unwrap_or_default();
            out.push_str(&format!("{}{}\n", "Token invalid".red(), detail));
        }
    }

    match &report.last_update {
        Some(last) => {
            out.push_str("\nLast DDNS update recorded by the service:\n");
            out.push_str(&format!("  When: {}\n", human_ts(last.ts)));
            if let Some(fqdn) = &last.fqdn {
                out.push_str(&format!("  FQDN: {}\n", fqdn));
            }
            if let Some(ipv4) = &last.ipv4 {
                out.push_str(&format!("  IPv4: {}\n", ipv4));
            }
            if let Some(detail) = &last.detail {
                out.push_str(&format!("  Error: {}\n", detail));
            } else {
                let success = if last.ok == Some(true) { "yes" } else { "no" };
                out.push_str(&format!("  Success: {}\n", success));
            }
        }
        None => {
            out.push_str("\nNo DDNS update recorded in the log yet.\n");
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use jukre_core::status::{LastUpdate, TokenCheck, Uptime};
    use jukre_core::traits::ServiceState;

    fn base_report() -> StatusReport {
        StatusReport {
            token_configured: false,
            online: false,
            ping: None,
            service: ServiceState {
                running: false,
                raw_state: Some(3),
            },
            uptime: None,
            token_check: None,
            last_update: None,
        }
    }

    #[test]
    fn offline_report_without_token_or_history() {
        let text = render(&base_report());
        assert!(text.contains("API key not set"));
        assert!(text.contains("offline"));
        assert!(text.contains("Background service: stopped"));
        assert!(text.contains("No DDNS update recorded"));
    }

    #[test]
    fn running_report_shows_uptime_and_token_result() {
        let report = StatusReport {
            token_configured: true,
            online: true,
            service: ServiceState {
                running: true,
                raw_state: Some(0),
            },
            uptime: Some(Uptime {
                since: Utc::now(),
                seconds: 3661,
            }),
            token_check: Some(TokenCheck {
                ok: true,
                fqdn: Some("host.juk.re".to_string()),
                ipv4: Some("203.0.113.7".to_string()),
                ..TokenCheck::default()
            }),
            ..base_report()
        };

        let text = render(&report);
        assert!(text.contains("token configured"));
        assert!(text.contains("online"));
        assert!(text.contains("Uptime: 1h 1m 1s"));
        assert!(text.contains("Token OK"));
        assert!(text.contains("host.juk.re"));
    }

    #[test]
    fn failed_last_update_shows_the_detail() {
        let report = StatusReport {
            last_update: Some(LastUpdate {
                ts: Utc::now(),
                ok: Some(false),
                fqdn: None,
                ipv4: None,
                detail: Some("Host/token mismatch".to_string()),
            }),
            ..base_report()
        };

        let text = render(&report);
        assert!(text.contains("Error: Host/token mismatch"));
        assert!(!text.contains("Success:"));
    }
}
