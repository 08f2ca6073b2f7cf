//! Parsing of `vagrant --machine-readable` output
//!
//! Every line is `timestamp,target,type,data...`. Only the positional fields
//! needed here are inspected; anything else the tool emits is ignored.

use crate::types::GuestStatus;

/// Line type carrying a guest's lifecycle state
const STATE_TYPE: &str = "state";

/// Line type carrying a guest-to-host port mapping
const FORWARDED_PORT_TYPE: &str = "forwarded_port";

/// Vagrant's escape for a literal comma inside a field
const ESCAPED_COMMA: &str = "%!(VAGRANT_COMMA)";

/// Split one output line into unescaped fields
fn split_fields(line: &str) -> Vec<String> {
    line.trim_end_matches('\r')
        .split(',')
        .map(|field| field.replace(ESCAPED_COMMA, ","))
        .collect()
}

/// Extract guests from `vagrant status --machine-readable`
///
/// Order follows the output and duplicates are kept.
#[must_use]
pub fn parse_guests(output: &str) -> Vec<GuestStatus> {
    output
        .lines()
        .map(split_fields)
        .filter(|fields| fields.len() >= 3 && fields[2] == STATE_TYPE)
        .map(|fields| GuestStatus {
            name: fields[1].clone(),
            state: fields.get(3).cloned().unwrap_or_default(),
        })
        .collect()
}

/// Find the host port mapped to `internal_port` in `vagrant port --machine-readable`
///
/// Returns the first matching mapping with a non-zero host port, or `None`
/// if the guest port is not forwarded.
#[must_use]
pub fn parse_forwarded_port(output: &str, internal_port: u16) -> Option<u16> {
    output.lines().map(split_fields).find_map(|fields| {
        if fields.len() < 5 || fields[2] != FORWARDED_PORT_TYPE {
            return None;
        }
        let guest: u16 = fields[3].trim().parse().ok()?;
        if guest != internal_port {
            return None;
        }
        fields[4].trim().parse::<u16>().ok().filter(|port| *port != 0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATUS_OUTPUT: &str = "\
1700000000,default,metadata,provider,virtualbox
1700000000,default,provider-name,virtualbox
1700000000,default,state,running
1700000000,default,state-human-short,running
1700000000,db,state,poweroff
1700000000,,ui,info,Current machine states:
";

    const PORT_OUTPUT: &str = "\
1700000000,default,metadata,provider,virtualbox
1700000000,default,forwarded_port,80,8080
1700000000,default,forwarded_port,22,2222
1700000000,default,forwarded_port,22,2200
";

    fn names(guests: &[GuestStatus]) -> Vec<&str> {
        guests.iter().map(|g| g.name.as_str()).collect()
    }

    #[test]
    fn test_parse_guests() {
        let guests = parse_guests(STATUS_OUTPUT);
        assert_eq!(names(&guests), vec!["default", "db"]);
        assert_eq!(guests[0].state, "running");
        assert_eq!(guests[1].state, "poweroff");
    }

    #[test]
    fn test_parse_guests_crlf() {
        let output = "1,web,state,running\r\n1,db,state,not_created\r\n";
        assert_eq!(names(&parse_guests(output)), vec!["web", "db"]);
    }

    #[test]
    fn test_parse_guests_keeps_duplicates() {
        let output = "1,web,state,running\n1,web,state,running\n";
        assert_eq!(names(&parse_guests(output)), vec!["web", "web"]);
    }

    #[test]
    fn test_parse_guests_state_line_without_value() {
        let guests = parse_guests("1,web,state\n");
        assert_eq!(names(&guests), vec!["web"]);
        assert_eq!(guests[0].state, "");
    }

    #[test]
    fn test_parse_guests_no_state_lines() {
        assert!(parse_guests("1,default,metadata,provider,libvirt\n").is_empty());
        assert!(parse_guests("").is_empty());
    }

    #[test]
    fn test_parse_guests_unescapes_commas() {
        let output = "1,a%!(VAGRANT_COMMA)b,state,running\n";
        assert_eq!(names(&parse_guests(output)), vec!["a,b"]);
    }

    #[test]
    fn test_parse_forwarded_port_first_match_wins() {
        assert_eq!(parse_forwarded_port(PORT_OUTPUT, 22), Some(2222));
        assert_eq!(parse_forwarded_port(PORT_OUTPUT, 80), Some(8080));
    }

    #[test]
    fn test_parse_forwarded_port_absent() {
        assert_eq!(parse_forwarded_port(PORT_OUTPUT, 443), None);
        assert_eq!(parse_forwarded_port("", 22), None);
    }

    #[test]
    fn test_parse_forwarded_port_skips_malformed_lines() {
        let output = "\
1,default,forwarded_port,22
1,default,forwarded_port,ssh,2201
1,default,forwarded_port,22,none
1,default,forwarded_port,22,2222
";
        assert_eq!(parse_forwarded_port(output, 22), Some(2222));
    }

    #[test]
    fn test_parse_forwarded_port_skips_zero_host_port() {
        assert_eq!(parse_forwarded_port("1,web,forwarded_port,22,0\n", 22), None);

        let output = "1,web,forwarded_port,22,0\n1,web,forwarded_port,22,2222\n";
        assert_eq!(parse_forwarded_port(output, 22), Some(2222));
    }

    #[test]
    fn test_parse_forwarded_port_example() {
        let output = "default,default,forwarded_port,22,2222\n";
        assert_eq!(parse_forwarded_port(output, 22), Some(2222));
    }
}
