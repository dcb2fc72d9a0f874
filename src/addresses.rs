//! Address list flattening
//!
//! `mailparse::addrparse` returns a tree one level deep: a `MailAddrList` of
//! `MailAddr::Single` entries and `MailAddr::Group` entries, the latter
//! holding their own nested `Vec<MailAddr>` (RFC 5322 group syntax,
//! `name: a@b, c@d;`). This flattens that tree into a plain address list the
//! same way the original's `collect_addresses` walks `InternetAddressList`,
//! recursing into groups and ignoring a group's own display name.

use mailparse::{MailAddr, MailAddrList};

use crate::models::Address;

/// Flattens a parsed address list, descending into any groups it contains
pub fn flatten(list: &MailAddrList) -> Vec<Address> {
    let mut out = Vec::new();
    flatten_into(list.as_ref(), &mut out);
    out
}

fn flatten_into(addrs: &[MailAddr], out: &mut Vec<Address>) {
    for addr in addrs {
        match addr {
            MailAddr::Single(info) => out.push(Address {
                name: info.display_name.clone(),
                address: info.addr.clone(),
            }),
            MailAddr::Group(group) => flatten_into(&group.addrs, out),
        }
    }
}

/// Parses a raw header value into a flattened address list
///
/// Returns an empty `Vec` if the header is absent or fails to parse — an
/// unparseable address header is not a hard error anywhere in this crate.
pub fn parse_and_flatten(raw: Option<&str>) -> Vec<Address> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    match mailparse::addrparse(raw) {
        Ok(list) => flatten(&list),
        Err(err) => {
            tracing::warn!(%err, "failed to parse address header");
            Vec::new()
        }
    }
}

/// Returns the first flattened mailbox, if any
pub fn first(raw: Option<&str>) -> Option<Address> {
    parse_and_flatten(raw).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattens_plain_mailbox_list() {
        let addrs = parse_and_flatten(Some("Alice <alice@example.com>, bob@example.com"));
        assert_eq!(addrs.len(), 2);
        assert_eq!(addrs[0].name.as_deref(), Some("Alice"));
        assert_eq!(addrs[0].address, "alice@example.com");
        assert_eq!(addrs[1].name, None);
        assert_eq!(addrs[1].address, "bob@example.com");
    }

    #[test]
    fn flattens_rfc5322_group_syntax() {
        let addrs =
            parse_and_flatten(Some("undisclosed-recipients: alice@example.com, bob@example.com;"));
        assert_eq!(addrs.len(), 2);
        assert_eq!(addrs[0].address, "alice@example.com");
        assert_eq!(addrs[1].address, "bob@example.com");
    }

    #[test]
    fn missing_header_yields_empty_list() {
        assert!(parse_and_flatten(None).is_empty());
    }

    #[test]
    fn first_returns_only_the_leading_mailbox() {
        let first = first(Some("Alice <alice@example.com>, bob@example.com")).unwrap();
        assert_eq!(first.address, "alice@example.com");
    }
}
