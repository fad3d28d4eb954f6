//! Address and header canonicalization.
//!
//! Every function here is total: absent or malformed input yields `None`
//! (or the input lowercased) and never panics. Returned values are always
//! lowercase and trimmed, so they can be compared directly against contact
//! list identifiers and rule values.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ANGLE_ADDR: Regex = Regex::new(r"<([^>]+)>").unwrap();
    static ref HTTP_HOST: Regex = Regex::new(r"(?i)https?://([^/>,;\s]+)").unwrap();
    static ref MAILTO_DOMAIN: Regex =
        Regex::new(r"(?i)mailto:[^\s<>,;]*@([^>,;\s?]+)").unwrap();
    static ref BARE_DOMAIN: Regex = Regex::new(r"@([^>,;\s]+)").unwrap();
}

fn non_empty(s: &str) -> Option<String> {
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

/// Canonicalize an address: `"John Doe <john+promo@Example.COM>"` becomes
/// `"john@example.com"`. Input without `@` comes back lowercased and trimmed.
pub fn normalize_address(raw: Option<&str>) -> Option<String> {
    let lowered = raw?.trim().to_lowercase();

    let addr = match ANGLE_ADDR.captures(&lowered) {
        Some(caps) => caps[1].trim().to_string(),
        None => lowered,
    };

    if !addr.contains('@') {
        return non_empty(&addr);
    }
    // Only the first two `@`-separated parts survive: `a@b@c` → `a@b`
    let mut parts = addr.split('@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();
    let local = local.split('+').next().unwrap_or_default();
    non_empty(&format!("{local}@{domain}"))
}

/// Domain part of an address after normalization.
pub fn domain_of(address: Option<&str>) -> Option<String> {
    let normalized = normalize_address(address)?;
    normalized.split_once('@').and_then(|(_, d)| non_empty(d))
}

/// Local part of an already normalized address; empty when absent.
pub fn local_part(address: Option<&str>) -> &str {
    address
        .and_then(|a| a.split('@').next())
        .unwrap_or_default()
}

/// `<abc123@mail.example.com>` → `mail.example.com`
pub fn message_id_domain(header: Option<&str>) -> Option<String> {
    let (_, rest) = header?.rsplit_once('@')?;
    let domain = rest.split('>').next().unwrap_or_default();
    non_empty(&domain.to_lowercase())
}

/// `Weekly Digest <digest.news.example.org>` → `digest.news.example.org`
pub fn list_domain(header: Option<&str>) -> Option<String> {
    let caps = ANGLE_ADDR.captures(header?)?;
    non_empty(&caps[1].to_lowercase())
}

/// Domain behind a List-Unsubscribe value. HTTP(S) hosts win over `mailto:`
/// targets, which win over any bare `@domain` token.
///
/// The host is taken verbatim from the link (lowercased), so Unicode hosts
/// stay Unicode and any `:port` or `user@` prefix is kept.
pub fn unsub_domain(link: Option<&str>) -> Option<String> {
    let link = link?;

    if let Some(caps) = HTTP_HOST.captures(link) {
        return non_empty(&caps[1].to_lowercase());
    }

    if let Some(caps) = MAILTO_DOMAIN.captures(link) {
        return non_empty(&caps[1].to_lowercase());
    }

    BARE_DOMAIN
        .captures(link)
        .and_then(|caps| non_empty(&caps[1].to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_display_name_and_tag() {
        assert_eq!(
            normalize_address(Some("John Doe <john+promo@Example.COM>")),
            Some("john@example.com".to_string())
        );
        assert_eq!(
            normalize_address(Some("  Alice@Example.org ")),
            Some("alice@example.org".to_string())
        );
    }

    #[test]
    fn test_normalize_without_at_is_lowercased() {
        assert_eq!(
            normalize_address(Some("  Not An Address ")),
            Some("not an address".to_string())
        );
        assert_eq!(normalize_address(None), None);
        assert_eq!(normalize_address(Some("   ")), None);
    }

    #[test]
    fn test_domain_of() {
        assert_eq!(
            domain_of(Some("Bank <alerts+x@Nordea.FI>")),
            Some("nordea.fi".to_string())
        );
        assert_eq!(domain_of(Some("localhost")), None);
        assert_eq!(domain_of(None), None);
    }

    #[test]
    fn test_local_part() {
        assert_eq!(local_part(Some("jane.doe@example.com")), "jane.doe");
        assert_eq!(local_part(None), "");
    }

    #[test]
    fn test_message_id_domain() {
        assert_eq!(
            message_id_domain(Some("<CAB12.34@Mail.Gmail.com>")),
            Some("mail.gmail.com".to_string())
        );
        assert_eq!(
            message_id_domain(Some("abc@host.example")),
            Some("host.example".to_string())
        );
        assert_eq!(message_id_domain(Some("<no-at-sign>")), None);
    }

    #[test]
    fn test_list_domain() {
        assert_eq!(
            list_domain(Some("Kauppalehti Uutiset <News.Kauppalehti.FI>")),
            Some("news.kauppalehti.fi".to_string())
        );
        assert_eq!(list_domain(Some("plain-list-id")), None);
    }

    #[test]
    fn test_unsub_domain_prefers_http() {
        assert_eq!(
            unsub_domain(Some(
                "<mailto:unsub@lists.example.com>, <https://Click.Example.net/u?id=1>"
            )),
            Some("click.example.net".to_string())
        );
    }

    #[test]
    fn test_unsub_domain_keeps_host_text() {
        assert_eq!(
            unsub_domain(Some("<https://Bücher.example/u?x=1>")),
            Some("bücher.example".to_string())
        );
        assert_eq!(
            unsub_domain(Some("<http://track.example.com:8080/unsub>")),
            Some("track.example.com:8080".to_string())
        );
    }

    #[test]
    fn test_normalize_keeps_first_two_at_parts() {
        assert_eq!(
            normalize_address(Some("a+x@b@c")),
            Some("a@b".to_string())
        );
        assert_eq!(domain_of(Some("a@b@c")), Some("b".to_string()));
    }

    #[test]
    fn test_unsub_domain_mailto_and_bare() {
        assert_eq!(
            unsub_domain(Some("<mailto:leave@Lists.Example.com?subject=unsubscribe>")),
            Some("lists.example.com".to_string())
        );
        assert_eq!(
            unsub_domain(Some("send a note to remove@optout.example.org")),
            Some("optout.example.org".to_string())
        );
        assert_eq!(unsub_domain(Some("no link here")), None);
        assert_eq!(unsub_domain(None), None);
    }
}
